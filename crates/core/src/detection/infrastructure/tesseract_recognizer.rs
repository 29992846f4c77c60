//! Text recognizer wrapping the Tesseract command-line tool in TSV mode.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use crate::detection::domain::text_recognizer::{LineId, RecognizedWord, TextRecognizer};
use crate::detection::infrastructure::shared_recognizer::RecognizerFactory;
use crate::shared::constants::DEFAULT_OCR_LANGUAGES;
use crate::shared::error::PrivacyError;

const ENGINE: &str = "tesseract";

/// TSV row level for single words.
const WORD_LEVEL: u32 = 5;

/// Page segmentation: fully automatic, no orientation detection.
pub const DEFAULT_PSM: u32 = 3;
/// Engine mode: whatever the installed build defaults to.
pub const DEFAULT_OEM: u32 = 3;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TesseractConfig {
    /// Binary to run; `tesseract` on `PATH` when unset.
    pub binary_path: Option<PathBuf>,
    /// Passed as `TESSDATA_PREFIX`.
    pub tessdata_path: Option<PathBuf>,
    /// `+`-joined language codes, e.g. `deu+eng`.
    pub languages: String,
    pub psm: u32,
    pub oem: u32,
}

impl Default for TesseractConfig {
    fn default() -> Self {
        Self {
            binary_path: None,
            tessdata_path: None,
            languages: DEFAULT_OCR_LANGUAGES.to_string(),
            psm: DEFAULT_PSM,
            oem: DEFAULT_OEM,
        }
    }
}

impl TesseractConfig {
    pub fn with_languages(mut self, languages: impl Into<String>) -> Self {
        self.languages = languages.into();
        self
    }

    fn binary(&self) -> &Path {
        self.binary_path
            .as_deref()
            .unwrap_or_else(|| Path::new("tesseract"))
    }
}

pub struct TesseractRecognizer {
    config: TesseractConfig,
    version: String,
}

impl TesseractRecognizer {
    /// Probes the binary with `--version`.
    ///
    /// A binary that cannot be spawned is `EngineUnavailable`; one that runs
    /// but fails the probe is `EngineInit`.
    pub fn new(config: TesseractConfig) -> Result<Self, PrivacyError> {
        if config.languages.trim().is_empty() {
            return Err(PrivacyError::Configuration(
                "at least one OCR language is required".into(),
            ));
        }
        let output = Command::new(config.binary())
            .arg("--version")
            .output()
            .map_err(|e| spawn_error(config.binary(), e))?;
        if !output.status.success() {
            return Err(PrivacyError::EngineInit {
                engine: ENGINE,
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        let mut banner = String::from_utf8_lossy(&output.stdout).into_owned();
        banner.push_str(&String::from_utf8_lossy(&output.stderr));
        let version = parse_version(&banner).unwrap_or_else(|| "unknown".to_string());

        log::info!(
            "Tesseract {version} ready (languages: {})",
            config.languages
        );
        Ok(Self { config, version })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Factory for a [`SharedRecognizer`](super::shared_recognizer::SharedRecognizer)
    /// that builds this engine on first use.
    pub fn factory(config: TesseractConfig) -> RecognizerFactory {
        Box::new(move || {
            let engine = TesseractRecognizer::new(config.clone())?;
            Ok(Box::new(engine) as Box<dyn TextRecognizer>)
        })
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&mut self, image_path: &Path) -> Result<Vec<RecognizedWord>, PrivacyError> {
        let start = Instant::now();
        let mut cmd = Command::new(self.config.binary());
        cmd.arg(image_path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.config.languages)
            .arg("--psm")
            .arg(self.config.psm.to_string())
            .arg("--oem")
            .arg(self.config.oem.to_string())
            .arg("tsv");
        if let Some(tessdata) = &self.config.tessdata_path {
            cmd.env("TESSDATA_PREFIX", tessdata);
        }
        log::debug!("Running {cmd:?}");

        let output = cmd
            .output()
            .map_err(|e| spawn_error(self.config.binary(), e))?;
        if !output.status.success() {
            return Err(PrivacyError::EngineFailed {
                engine: ENGINE,
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let words = parse_tsv(&String::from_utf8_lossy(&output.stdout));
        log::debug!(
            "Recognized {} word(s) in {} ms",
            words.len(),
            start.elapsed().as_millis()
        );
        Ok(words)
    }
}

fn spawn_error(binary: &Path, e: io::Error) -> PrivacyError {
    let reason = format!("cannot run {}: {e}", binary.display());
    if e.kind() == io::ErrorKind::NotFound {
        PrivacyError::EngineUnavailable {
            engine: ENGINE,
            reason,
        }
    } else {
        PrivacyError::EngineFailed {
            engine: ENGINE,
            reason,
        }
    }
}

/// `tesseract 5.3.0` or `tesseract v5.3.0` on the first matching line.
fn parse_version(banner: &str) -> Option<String> {
    banner
        .lines()
        .filter(|line| line.starts_with("tesseract"))
        .find_map(|line| line.split_whitespace().nth(1))
        .map(|v| v.trim_start_matches('v').to_string())
}

/// Parse Tesseract TSV output into word-level results.
///
/// Columns: level, page_num, block_num, par_num, line_num, word_num, left,
/// top, width, height, conf, text. Only word rows with text and a
/// non-negative confidence are kept; confidence is rescaled to `[0, 1]`.
pub fn parse_tsv(tsv: &str) -> Vec<RecognizedWord> {
    let mut words = Vec::new();

    for row in tsv.lines().skip(1) {
        let cols: Vec<&str> = row.split('\t').collect();
        if cols.len() < 12 {
            continue;
        }
        let level: u32 = cols[0].parse().unwrap_or(0);
        let conf: f32 = cols[10].trim().parse().unwrap_or(-1.0);
        let text = cols[11].trim();
        if level != WORD_LEVEL || text.is_empty() || conf < 0.0 {
            continue;
        }

        let num = |i: usize| cols[i].trim().parse::<u32>().unwrap_or(0);
        let coord = |i: usize| cols[i].trim().parse::<f32>().unwrap_or(0.0);
        let (left, top) = (coord(6), coord(7));
        let (right, bottom) = (left + coord(8), top + coord(9));

        words.push(RecognizedWord {
            polygon: vec![(left, top), (right, top), (right, bottom), (left, bottom)],
            text: text.to_string(),
            confidence: Some(conf / 100.0),
            line: LineId::new(num(2), num(3), num(4)),
        });
    }

    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const HEADER: &str =
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    fn tsv(rows: &[&str]) -> String {
        let mut out = String::from(HEADER);
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out
    }

    // ── TSV parsing ──────────────────────────────────────────────────

    #[test]
    fn test_parses_word_rows() {
        let out = tsv(&[
            "5\t1\t1\t1\t1\t1\t100\t200\t50\t20\t95.5\tHello",
            "5\t1\t1\t1\t1\t2\t160\t200\t60\t20\t92.3\tWorld",
            "5\t1\t2\t1\t1\t1\t100\t250\t100\t20\t88\tTest",
        ]);
        let words = parse_tsv(&out);
        assert_eq!(words.len(), 3);
        assert_eq!(words[0].text, "Hello");
        assert_eq!(
            words[0].polygon,
            vec![(100.0, 200.0), (150.0, 200.0), (150.0, 220.0), (100.0, 220.0)]
        );
        assert_relative_eq!(words[0].confidence.unwrap(), 0.955, epsilon = 1e-6);
        assert_eq!(words[1].line, LineId::new(1, 1, 1));
        assert_eq!(words[2].line, LineId::new(2, 1, 1));
    }

    #[test]
    fn test_skips_structural_rows() {
        let out = tsv(&[
            "1\t1\t0\t0\t0\t0\t0\t0\t640\t480\t-1\t",
            "2\t1\t1\t0\t0\t0\t10\t10\t200\t40\t-1\t",
            "4\t1\t1\t1\t1\t0\t10\t10\t200\t20\t-1\t",
            "5\t1\t1\t1\t1\t1\t10\t10\t50\t20\t90\tName",
        ]);
        let words = parse_tsv(&out);
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].text, "Name");
    }

    #[test]
    fn test_skips_blank_and_unconfident_words() {
        let out = tsv(&[
            "5\t1\t1\t1\t1\t1\t10\t10\t50\t20\t90\t   ",
            "5\t1\t1\t1\t1\t2\t70\t10\t50\t20\t-1\tghost",
        ]);
        assert!(parse_tsv(&out).is_empty());
    }

    #[test]
    fn test_skips_short_rows() {
        let out = tsv(&["5\t1\t1\t1"]);
        assert!(parse_tsv(&out).is_empty());
    }

    #[test]
    fn test_empty_output() {
        assert!(parse_tsv("").is_empty());
        assert!(parse_tsv(HEADER).is_empty());
    }

    // ── Version and process errors ───────────────────────────────────

    #[test]
    fn test_parse_version() {
        assert_eq!(
            parse_version("tesseract 5.3.0\n leptonica-1.82.0\n"),
            Some("5.3.0".to_string())
        );
        assert_eq!(
            parse_version("tesseract v4.1.1-rc2\n"),
            Some("4.1.1-rc2".to_string())
        );
        assert_eq!(parse_version("something else"), None);
    }

    #[test]
    fn test_missing_binary_is_unavailable() {
        let config = TesseractConfig {
            binary_path: Some("/nonexistent/bin/tesseract".into()),
            ..TesseractConfig::default()
        };
        assert!(matches!(
            TesseractRecognizer::new(config),
            Err(PrivacyError::EngineUnavailable { .. })
        ));
    }

    #[test]
    fn test_empty_languages_rejected() {
        let config = TesseractConfig::default().with_languages("  ");
        assert!(matches!(
            TesseractRecognizer::new(config),
            Err(PrivacyError::Configuration(_))
        ));
    }

    #[test]
    fn test_default_config() {
        let config = TesseractConfig::default();
        assert_eq!(config.languages, "eng");
        assert_eq!(config.binary(), Path::new("tesseract"));
    }
}
