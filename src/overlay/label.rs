//! Label text formatting

/// Builds the label string drawn next to a region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LabelFormatter {
    pub show_language_tag: bool,
    pub show_confidence: bool,
}

impl LabelFormatter {
    pub fn new(show_language_tag: bool, show_confidence: bool) -> Self {
        Self {
            show_language_tag,
            show_confidence,
        }
    }

    /// Format `text`, optionally prefixed with its language and suffixed
    /// with the confidence rounded to two decimals.
    ///
    /// No escaping or truncation happens here; surfaces sanitize if needed.
    pub fn format(&self, text: &str, language_tag: &str, confidence: Option<f32>) -> String {
        let label = if self.show_language_tag {
            format!("{}:{}", language_tag, text)
        } else {
            text.to_string()
        };

        match confidence {
            Some(confidence) if self.show_confidence => format!("{} ({:.2})", label, confidence),
            _ => label,
        }
    }
}
