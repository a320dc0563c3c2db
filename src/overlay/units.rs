//! Overlay unit generation
//!
//! Flattens the detection tree into the (label, rect) pairs that get
//! painted. Traversal is lazy and knows nothing about surfaces.

use tracing::{debug, trace};

use crate::detection::{DetectionNode, DetectionRect, Point, TextBlock, TextDocument, TextLine};

use super::label::LabelFormatter;
use super::style::OverlayStyle;
use super::RenderConfig;

/// One label/rectangle pair scheduled for painting
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayUnit {
    /// Formatted label text
    pub label: String,
    /// Region in detection space, possibly unnormalized
    pub rect: DetectionRect,
    /// Corner points of the region, possibly rotated
    pub corners: Vec<Point>,
    /// Height reserved for the label above the region
    pub label_height: f32,
}

/// Lazily produce the overlay units for `document`
///
/// Block mode yields one unit per block. Line mode yields one unit per
/// line; elements and symbols are only logged.
pub fn overlay_units<'a>(
    document: &'a TextDocument,
    config: &'a RenderConfig,
    style: &'a OverlayStyle,
) -> Box<dyn Iterator<Item = OverlayUnit> + 'a> {
    let formatter = config.formatter();
    debug!("Text is: {}", document.text);

    if config.group_by_block {
        Box::new(
            document
                .blocks
                .iter()
                .inspect(|block| log_node("TextBlock", *block))
                .map(move |block| block_unit(block, &formatter, style)),
        )
    } else {
        Box::new(
            document
                .blocks
                .iter()
                .inspect(|block| log_node("TextBlock", *block))
                .flat_map(|block| block.lines.iter())
                .inspect(|line| log_line_tree(line))
                .map(move |line| line_unit(line, &formatter, style)),
        )
    }
}

fn block_unit(block: &TextBlock, formatter: &LabelFormatter, style: &OverlayStyle) -> OverlayUnit {
    OverlayUnit {
        label: formatter.format(&block.text, &block.recognized_language, None),
        rect: block.bounding_box,
        corners: block.corner_points.clone(),
        label_height: style.text_size * block.lines.len() as f32 + 2.0 * style.stroke_width,
    }
}

fn line_unit(line: &TextLine, formatter: &LabelFormatter, style: &OverlayStyle) -> OverlayUnit {
    OverlayUnit {
        label: formatter.format(line.text(), line.recognized_language(), line.confidence()),
        rect: line.bounding_box,
        corners: line.corner_points.clone(),
        label_height: style.text_size + 2.0 * style.stroke_width,
    }
}

fn log_node(kind: &str, node: &dyn DetectionNode) {
    debug!(
        "{} text: {:?} bounds: {:?} corners: {:?} language: {} confidence: {:?} angle: {:?}",
        kind,
        node.text(),
        node.bounding_rect(),
        node.corner_points(),
        node.recognized_language(),
        node.confidence(),
        node.angle()
    );
}

fn log_line_tree(line: &TextLine) {
    log_node("Line", line);
    for element in &line.elements {
        trace!(
            "Element text: {:?} bounds: {:?} corners: {:?} language: {} confidence: {} angle: {}",
            element.text,
            element.bounding_box,
            element.corner_points,
            element.recognized_language,
            element.confidence,
            element.angle
        );
        for symbol in &element.symbols {
            trace!(
                "Symbol text: {:?} bounds: {:?} corners: {:?} confidence: {} angle: {}",
                symbol.text,
                symbol.bounding_box,
                symbol.corner_points,
                symbol.confidence,
                symbol.angle
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{TextElement, TextSymbol};

    fn line(text: &str, confidence: f32) -> TextLine {
        TextLine {
            text: text.to_string(),
            bounding_box: DetectionRect::new(0.0, 0.0, 50.0, 10.0),
            recognized_language: "en".to_string(),
            confidence,
            elements: vec![TextElement {
                text: text.to_string(),
                confidence,
                symbols: vec![TextSymbol::default()],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn document() -> TextDocument {
        TextDocument {
            text: "first\nsecond".to_string(),
            blocks: vec![TextBlock {
                text: "first\nsecond".to_string(),
                bounding_box: DetectionRect::new(0.0, 0.0, 50.0, 20.0),
                recognized_language: "en".to_string(),
                lines: vec![line("first", 0.9), line("second", 0.8)],
                ..Default::default()
            }],
        }
    }

    fn config(group_by_block: bool) -> RenderConfig {
        RenderConfig {
            group_by_block,
            show_language_tag: false,
            show_confidence: true,
        }
    }

    #[test]
    fn test_block_granularity() {
        let doc = document();
        let config = config(true);
        let style = OverlayStyle::default();
        let units: Vec<_> = overlay_units(&doc, &config, &style).collect();

        assert_eq!(units.len(), 1);
        // Blocks carry no confidence, so no suffix even with show_confidence
        assert_eq!(units[0].label, "first\nsecond");
        assert!((units[0].label_height - (20.0 * 2.0 + 2.0)).abs() < 0.001);
    }

    #[test]
    fn test_line_granularity() {
        let doc = document();
        let config = config(false);
        let style = OverlayStyle::default();
        let units: Vec<_> = overlay_units(&doc, &config, &style).collect();

        assert_eq!(units.len(), 2);
        assert_eq!(units[0].label, "first (0.90)");
        assert_eq!(units[1].label, "second (0.80)");
        assert!((units[1].label_height - 22.0).abs() < 0.001);
    }

    #[test]
    fn test_empty_document() {
        let doc = TextDocument::default();
        let style = OverlayStyle::default();

        for group in [true, false] {
            let config = config(group);
            assert_eq!(overlay_units(&doc, &config, &style).count(), 0);
        }
    }

    #[test]
    fn test_line_uses_its_own_language() {
        let mut doc = document();
        doc.blocks[0].lines[1].recognized_language = "fr".to_string();
        let config = RenderConfig {
            group_by_block: false,
            show_language_tag: true,
            show_confidence: false,
        };
        let style = OverlayStyle::default();
        let labels: Vec<_> = overlay_units(&doc, &config, &style).map(|u| u.label).collect();

        assert_eq!(labels, vec!["en:first", "fr:second"]);
    }

    #[test]
    fn test_block_without_lines() {
        let doc = TextDocument {
            text: String::new(),
            blocks: vec![TextBlock::default()],
        };
        let style = OverlayStyle::default();

        let block_config = config(true);
        let units: Vec<_> = overlay_units(&doc, &block_config, &style).collect();
        assert_eq!(units.len(), 1);
        assert!((units[0].label_height - 2.0).abs() < 0.001);

        let line_config = config(false);
        assert_eq!(overlay_units(&doc, &line_config, &style).count(), 0);
    }
}
