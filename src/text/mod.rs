//! Rich text flow: styled runs laid into lines inside a bounded box.
//!
//! The pieces compose bottom-up: [Run]s are the styled input, a
//! [RunQueue] feeds them to a [LineWrapper] one line at a time, and
//! [TextBox] drives the queue against a height budget, applying an
//! [Overflow] policy when the text does not fit. [parser] converts inline
//! markup to runs and back.

mod canvas;
mod metrics;
pub mod parser;
mod queue;
mod run;
mod text_box;
mod wrap;

pub use canvas::{CursorGuard, PageCanvas};
pub use metrics::{FontKey, MetricsProvider};
pub use queue::{LineMetrics, RunQueue};
pub use run::{coalesce, plain_text, FontStyle, Run, Style};
pub use text_box::{Align, BoxOptions, Overflow, TextBox, VAlign};
pub use wrap::LineWrapper;

#[cfg(test)]
pub(crate) mod testutil {
    use super::metrics::{FontKey, MetricsProvider};
    use super::run::FontStyle;
    use crate::units::Pt;
    use crate::FlowError;

    /// A fixed-pitch fake: every glyph is 0.6 em wide, the ascender is
    /// 0.75 em, the descender 0.25 em, and the line height exactly one em.
    /// Keeps layout arithmetic exact in tests.
    pub struct FixedMetrics;

    impl FixedMetrics {
        pub fn new() -> FixedMetrics {
            FixedMetrics
        }
    }

    impl MetricsProvider for FixedMetrics {
        fn resolve(&self, family: &str, style: FontStyle) -> Result<FontKey, FlowError> {
            if family == "Helvetica" {
                Ok(FontKey(match style {
                    FontStyle::Regular => 0,
                    FontStyle::Bold => 1,
                    FontStyle::Italic => 2,
                    FontStyle::BoldItalic => 3,
                }))
            } else {
                Err(FlowError::UnknownFont {
                    family: family.to_string(),
                    style,
                })
            }
        }

        fn width_of(&self, _font: FontKey, size: Pt, text: &str) -> Result<Pt, FlowError> {
            let glyphs = text.chars().filter(|c| *c != '\n').count();
            Ok(size * 0.6 * glyphs as f32)
        }

        fn kerning_pairs(&self, _font: FontKey, _size: Pt, _text: &str) -> Vec<(usize, Pt)> {
            Vec::new()
        }

        fn ascender(&self, _font: FontKey, size: Pt) -> Pt {
            size * 0.75
        }

        fn descender(&self, _font: FontKey, size: Pt) -> Pt {
            size * -0.25
        }

        fn line_height(&self, _font: FontKey, size: Pt) -> Pt {
            size
        }
    }
}
