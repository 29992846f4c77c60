pub mod imageproc_painter;
