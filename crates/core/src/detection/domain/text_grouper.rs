use std::collections::BTreeMap;

use crate::detection::domain::text_recognizer::{LineId, OcrDetection, RecognizedWord};
use crate::shared::constants::{DEFAULT_PARAGRAPH, DEFAULT_WIDTH_THRESHOLD};
use crate::shared::error::PrivacyError;
use crate::shared::rectangle::Rectangle;

/// How recognized words are combined into regions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextGrouping {
    /// In `[0, 1]`. Words on one line merge when the gap between them is at
    /// most `(1 - width_threshold) * line height`, so lower values merge
    /// more aggressively.
    pub width_threshold: f32,
    /// Combine the merged lines of each paragraph into one region.
    pub paragraph: bool,
}

impl Default for TextGrouping {
    fn default() -> Self {
        Self {
            width_threshold: DEFAULT_WIDTH_THRESHOLD,
            paragraph: DEFAULT_PARAGRAPH,
        }
    }
}

impl TextGrouping {
    pub fn new(width_threshold: f32, paragraph: bool) -> Self {
        Self {
            width_threshold,
            paragraph,
        }
    }

    /// Line-level grouping with the default threshold, one result per line
    /// segment.
    pub fn lines() -> Self {
        Self {
            paragraph: false,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), PrivacyError> {
        if !(0.0..=1.0).contains(&self.width_threshold) {
            return Err(PrivacyError::Configuration(format!(
                "width threshold must be between 0.0 and 1.0, got {}",
                self.width_threshold
            )));
        }
        Ok(())
    }

    fn max_gap(&self, height: u32) -> f32 {
        (1.0 - self.width_threshold) * height as f32
    }
}

struct Segment {
    bounds: Rectangle,
    texts: Vec<String>,
    confidences: Vec<f32>,
    line: LineId,
}

impl Segment {
    fn start(bounds: Rectangle, word: &RecognizedWord) -> Self {
        Self {
            bounds,
            texts: vec![word.text.clone()],
            confidences: word.confidence.into_iter().collect(),
            line: word.line,
        }
    }

    fn absorb(&mut self, bounds: Rectangle, word: &RecognizedWord) {
        self.bounds = self.bounds.union(&bounds);
        self.texts.push(word.text.clone());
        self.confidences.extend(word.confidence);
    }

    fn mean_confidence(&self) -> Option<f32> {
        if self.confidences.is_empty() {
            None
        } else {
            Some(self.confidences.iter().sum::<f32>() / self.confidences.len() as f32)
        }
    }

    fn into_detection(self, confidence: Option<f32>) -> OcrDetection {
        OcrDetection {
            polygon: self.bounds.corners().to_vec(),
            text: self.texts.join(" "),
            confidence,
        }
    }
}

/// Groups word-level OCR output into regions, in reading order.
///
/// Words with blank text or an empty polygon are skipped. Paragraph
/// results carry no confidence; line results carry the mean of their
/// words' confidences.
pub fn group_words(words: &[RecognizedWord], grouping: &TextGrouping) -> Vec<OcrDetection> {
    let mut lines: BTreeMap<LineId, Vec<(Rectangle, &RecognizedWord)>> = BTreeMap::new();
    for word in words {
        if word.text.trim().is_empty() {
            continue;
        }
        let Some(bounds) = word.bounds() else {
            continue;
        };
        lines.entry(word.line).or_default().push((bounds, word));
    }

    let segments: Vec<Segment> = lines
        .into_values()
        .flat_map(|line_words| merge_line(line_words, grouping))
        .collect();

    if grouping.paragraph {
        merge_paragraphs(segments)
    } else {
        segments
            .into_iter()
            .map(|s| {
                let confidence = s.mean_confidence();
                s.into_detection(confidence)
            })
            .collect()
    }
}

fn merge_line(mut words: Vec<(Rectangle, &RecognizedWord)>, grouping: &TextGrouping) -> Vec<Segment> {
    words.sort_by_key(|(bounds, _)| bounds.x());

    let mut segments: Vec<Segment> = Vec::new();
    for (bounds, word) in words {
        if let Some(current) = segments.last_mut() {
            let gap = (bounds.x() as i64 - current.bounds.right()) as f32;
            let height = current.bounds.height().max(bounds.height());
            if gap <= grouping.max_gap(height) {
                current.absorb(bounds, word);
                continue;
            }
        }
        segments.push(Segment::start(bounds, word));
    }
    segments
}

fn merge_paragraphs(segments: Vec<Segment>) -> Vec<OcrDetection> {
    let mut paragraphs: Vec<Segment> = Vec::new();
    for segment in segments {
        let open = paragraphs.last_mut().filter(|p| {
            p.line.block == segment.line.block && p.line.paragraph == segment.line.paragraph
        });
        if let Some(p) = open {
            p.bounds = p.bounds.union(&segment.bounds);
            p.texts.extend(segment.texts);
            continue;
        }
        paragraphs.push(segment);
    }
    paragraphs
        .into_iter()
        .map(|p| p.into_detection(None))
        .collect()
}
