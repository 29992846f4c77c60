mod server;
mod settings;

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;

use docprivacy_core::detection::infrastructure::shared_recognizer::SharedRecognizer;
use docprivacy_core::detection::infrastructure::tesseract_recognizer::{
    TesseractConfig, TesseractRecognizer,
};
use docprivacy_core::upload::ocr_upload::OcrUploadService;

use server::AppState;
use settings::Settings;

#[derive(Parser, Debug)]
#[command(
    name = "docprivacy-desktop",
    about = "Serve the document privacy web UI and its OCR endpoint locally"
)]
struct Args {
    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to bind
    #[arg(long)]
    port: Option<u16>,

    /// Directory holding the built frontend
    #[arg(long)]
    frontend: Option<PathBuf>,

    /// Tesseract language(s), e.g. "eng" or "deu+eng"
    #[arg(long)]
    lang: Option<String>,

    /// Do not open the browser on start
    #[arg(long)]
    no_browser: bool,

    /// Persist the effective settings for the next start
    #[arg(long)]
    save_settings: bool,
}

impl Args {
    fn apply(self, mut settings: Settings) -> Settings {
        if let Some(host) = self.host {
            settings.host = host;
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        if let Some(frontend) = self.frontend {
            settings.frontend_dir = frontend;
        }
        if let Some(lang) = self.lang {
            settings.ocr_languages = lang;
        }
        if self.no_browser {
            settings.open_browser = false;
        }
        settings
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let save = args.save_settings;
    let settings = args.apply(Settings::load());
    if settings.ocr_languages.trim().is_empty() {
        return Err("OCR language must not be empty".into());
    }
    if save {
        settings.save();
    }

    if !settings.frontend_dir.is_dir() {
        log::warn!(
            "Frontend directory {} not found; only /api routes will answer",
            settings.frontend_dir.display()
        );
    }

    let config = TesseractConfig::default().with_languages(&settings.ocr_languages);
    let recognizer = Arc::new(SharedRecognizer::new(TesseractRecognizer::factory(config)));
    let state = AppState::new(OcrUploadService::new(recognizer));
    let router = server::router(state, &settings.frontend_dir);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let address = format!("{}:{}", settings.host, settings.port);
        let listener = tokio::net::TcpListener::bind(&address).await?;
        let url = settings.url();
        log::info!("Document privacy UI at {url}");
        if settings.open_browser {
            if let Err(e) = open::that(&url) {
                log::warn!("Could not open browser: {e}");
            }
        }
        server::serve(listener, router).await
    })?;
    Ok(())
}
