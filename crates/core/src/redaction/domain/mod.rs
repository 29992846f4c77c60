pub mod mask_color;
pub mod region_painter;
