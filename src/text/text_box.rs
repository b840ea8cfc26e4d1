use std::str::FromStr;

use crate::colour::{colours, Colour};
use crate::page::SpanFont;
use crate::text::canvas::PageCanvas;
use crate::text::metrics::{measured_width, FontKey, MetricsProvider};
use crate::text::parser;
use crate::text::queue::RunQueue;
use crate::text::run::Run;
use crate::text::wrap::LineWrapper;
use crate::units::Pt;
use crate::FlowError;

/// What to do with text that does not fit the box vertically
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Overflow {
    /// Stop laying out and hand the remainder back to the caller
    #[default]
    Truncate,
    /// Truncate, and replace the tail of the last visible line with `...`
    Ellipses,
    /// Ignore the height bound and keep going; the box reports how tall it
    /// actually became
    Expand,
    /// Retry layout at progressively smaller sizes until the text fits or
    /// the minimum size is reached
    ShrinkToFit,
}

impl FromStr for Overflow {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Overflow, FlowError> {
        match s {
            "truncate" => Ok(Overflow::Truncate),
            "ellipses" => Ok(Overflow::Ellipses),
            "expand" => Ok(Overflow::Expand),
            "shrink_to_fit" => Ok(Overflow::ShrinkToFit),
            other => Err(FlowError::UnknownOverflow(other.to_string())),
        }
    }
}

/// Horizontal placement of each line within the box width
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical placement of the laid-out block within the box height
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum VAlign {
    #[default]
    Top,
    Center,
    Bottom,
}

/// Configuration for a [TextBox]. Geometry left as [None] is derived from
/// the target canvas at render time: the origin from the canvas cursor, the
/// width from the cursor to the content box's right edge, and the height
/// from the cursor down to the content box's bottom.
#[derive(Debug, Clone)]
pub struct BoxOptions {
    /// Top-left corner of the box; the first baseline sits one ascender
    /// below it
    pub at: Option<(Pt, Pt)>,
    pub width: Option<Pt>,
    pub height: Option<Pt>,
    pub overflow: Overflow,
    pub align: Align,
    pub valign: VAlign,
    /// Extra space inserted between consecutive baselines
    pub leading: Pt,
    /// Whether to apply pair kerning during measurement and drawing
    pub kerning: bool,
    /// Font family for runs without an explicit face
    pub font_family: String,
    /// Font size for runs without an explicit size
    pub size: Pt,
    /// Colour for runs without an explicit colour
    pub colour: Colour,
    /// The size floor for `shrink_to_fit`
    pub min_font_size: Pt,
}

impl Default for BoxOptions {
    fn default() -> BoxOptions {
        BoxOptions {
            at: None,
            width: None,
            height: None,
            overflow: Overflow::default(),
            align: Align::default(),
            valign: VAlign::default(),
            leading: Pt(0.0),
            kerning: true,
            font_family: "Helvetica".to_string(),
            size: Pt(12.0),
            colour: colours::BLACK,
            min_font_size: Pt(5.0),
        }
    }
}

#[derive(Debug, Clone)]
struct PlacedRun {
    text: String,
    font: FontKey,
    size: Pt,
    colour: Colour,
    /// Offset from the line's left edge
    x: Pt,
    width: Pt,
}

#[derive(Debug, Clone)]
struct PlacedLine {
    runs: Vec<PlacedRun>,
    text: String,
    /// Absolute baseline y
    baseline: Pt,
    width: Pt,
    /// Absolute left edge after alignment
    x: Pt,
}

struct LayoutResult {
    lines: Vec<PlacedLine>,
    height: Pt,
    leftover: Vec<Run>,
    truncated: bool,
}

/// Lays a sequence of styled [Run]s into a rectangle, wrapping greedily at
/// spaces and breaking pages of text against a height budget.
///
/// Layout is a fit-test-commit loop per line: the wrapper tentatively
/// consumes runs for a line, the box checks the line fits the remaining
/// vertical space, and either commits it (advancing the baseline) or rolls
/// the consumption back and applies the overflow policy. Committed glyphs
/// are buffered and only flushed to the canvas once the whole box has
/// settled, so `ellipses` edits and vertical alignment cost nothing extra.
pub struct TextBox {
    runs: Vec<Run>,
    options: BoxOptions,
    lines: Vec<PlacedLine>,
    leftover: Vec<Run>,
    height: Pt,
    scale: f32,
}

impl TextBox {
    pub fn new(runs: Vec<Run>, options: BoxOptions) -> TextBox {
        TextBox {
            runs,
            options,
            lines: Vec::new(),
            leftover: Vec::new(),
            height: Pt(0.0),
            scale: 1.0,
        }
    }

    /// Build a box from inline markup; see [parser](crate::text::parser) for
    /// the tag set
    pub fn from_markup(markup: &str, options: BoxOptions) -> TextBox {
        TextBox::new(parser::parse(markup), options)
    }

    /// Lay the text into the canvas, draw everything that fits, and return
    /// the runs that did not. Afterwards the canvas cursor sits at the box's
    /// left edge just below the consumed height.
    pub fn render<M: MetricsProvider, C: PageCanvas>(
        &mut self,
        metrics: &M,
        canvas: &mut C,
    ) -> Result<Vec<Run>, FlowError> {
        let content_box = canvas.content_box();
        let at = self.options.at.unwrap_or_else(|| canvas.cursor());
        let width = self.options.width.unwrap_or(content_box.x2 - at.0);
        let height = self.options.height.unwrap_or(at.1 - content_box.y1);
        self.settle(metrics, at, width, height)?;

        for line in self.lines.iter() {
            for run in line.runs.iter() {
                canvas.draw_glyphs(
                    &run.text,
                    (line.x + run.x, line.baseline),
                    SpanFont { key: run.font, size: run.size },
                    run.colour,
                    self.options.kerning,
                );
            }
        }
        canvas.set_cursor((at.0, at.1 - self.height));

        Ok(self.leftover.clone())
    }

    /// Lay the text out without a canvas, to measure it or probe what would
    /// be left over. Requires explicit `width` and `height` in the options;
    /// the origin defaults to `(0, height)`.
    pub fn dry_run<M: MetricsProvider>(&mut self, metrics: &M) -> Result<Vec<Run>, FlowError> {
        let (Some(width), Some(height)) = (self.options.width, self.options.height) else {
            return Err(FlowError::InvalidDimensions {
                width: self.options.width.unwrap_or(Pt(0.0)),
                height: self.options.height.unwrap_or(Pt(0.0)),
            });
        };
        let at = self.options.at.unwrap_or((Pt(0.0), height));
        self.settle(metrics, at, width, height)?;
        Ok(self.leftover.clone())
    }

    /// The vertical space the rendered text consumed, from the box top to
    /// the bottom of the last line's height
    pub fn height(&self) -> Pt {
        self.height
    }

    /// The text as it was placed, lines joined with newlines
    pub fn text(&self) -> String {
        let texts: Vec<&str> = self.lines.iter().map(|l| l.text.as_str()).collect();
        texts.join("\n")
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// The base font size the box settled on. Equal to the configured size
    /// unless `shrink_to_fit` stepped it down.
    pub fn font_size(&self) -> Pt {
        if self.scale < 1.0 {
            (self.options.size * self.scale).max(self.options.min_font_size)
        } else {
            self.options.size
        }
    }

    /// Run layout (including the overflow policy and vertical alignment) and
    /// store the placed lines, leftover, and consumed height
    fn settle<M: MetricsProvider>(
        &mut self,
        metrics: &M,
        at: (Pt, Pt),
        width: Pt,
        height: Pt,
    ) -> Result<(), FlowError> {
        if width <= Pt(0.0) || height <= Pt(0.0) {
            return Err(FlowError::InvalidDimensions { width, height });
        }

        let budget = match self.options.overflow {
            Overflow::Expand => Pt(f32::MAX),
            _ => height,
        };

        self.scale = 1.0;
        let mut result = self.layout(metrics, at, width, budget, self.scale)?;

        if self.options.overflow == Overflow::ShrinkToFit {
            while result.truncated {
                let current = self.options.size * self.scale;
                if current <= self.options.min_font_size {
                    break;
                }
                let next = (current - Pt(0.5)).max(self.options.min_font_size);
                self.scale = (next / self.options.size).0;
                result = self.layout(metrics, at, width, budget, self.scale)?;
            }
        }

        if self.options.overflow == Overflow::Ellipses && result.truncated {
            self.apply_ellipsis(metrics, &mut result, at, width)?;
        }

        if self.options.overflow != Overflow::Expand {
            let shift = match self.options.valign {
                VAlign::Top => Pt(0.0),
                VAlign::Center => (height - result.height) / 2.0,
                VAlign::Bottom => height - result.height,
            };
            if shift != Pt(0.0) {
                for line in result.lines.iter_mut() {
                    line.baseline -= shift;
                }
            }
        }

        self.lines = result.lines;
        self.leftover = result.leftover;
        self.height = result.height;
        Ok(())
    }

    /// One full wrapping pass at a fixed scale. Pure with respect to the
    /// box: repeated calls with the same arguments give the same result.
    fn layout<M: MetricsProvider>(
        &self,
        metrics: &M,
        at: (Pt, Pt),
        width: Pt,
        budget: Pt,
        scale: f32,
    ) -> Result<LayoutResult, FlowError> {
        let mut queue = RunQueue::new();
        queue.load(&self.runs);
        let mut wrapper = LineWrapper::new(
            width,
            self.options.kerning,
            &self.options.font_family,
            self.options.size,
            self.options.min_font_size,
        );
        wrapper.set_scale(scale);

        let mut lines: Vec<PlacedLine> = Vec::new();
        // baseline offset below the box top, negative and growing downwards
        let mut baseline_y = Pt(0.0);
        let mut line_height = Pt(0.0);
        let mut ascender = Pt(0.0);
        let mut truncated = false;

        while queue.unfinished() {
            let Some(text) = wrapper.wrap_line(&mut queue, metrics)? else {
                break;
            };
            let lm = queue.line_metrics();

            let required = if lines.is_empty() {
                lm.line_height
            } else {
                lm.line_height + lm.descender
            };
            if baseline_y.abs() + required > budget {
                queue.repack();
                truncated = true;
                break;
            }

            if lines.is_empty() {
                baseline_y = -lm.ascender;
            } else {
                baseline_y -= lm.line_height + self.options.leading;
            }
            line_height = lm.line_height;
            ascender = lm.ascender;

            let mut runs: Vec<PlacedRun> = Vec::new();
            let mut x = Pt(0.0);
            while let Some((slot, run_width)) = queue.retrieve() {
                let run = queue.run(slot);
                if run.is_break() || run.text.is_empty() {
                    continue;
                }
                let font = wrapper.resolve_font(metrics, run)?;
                let size = wrapper.effective_size(run);
                runs.push(PlacedRun {
                    text: run.text.clone(),
                    font,
                    size,
                    colour: run.colour.unwrap_or(self.options.colour),
                    x,
                    width: run_width,
                });
                x += run_width;
            }

            let line_width = wrapper.line_width();
            lines.push(PlacedLine {
                runs,
                text,
                baseline: at.1 + baseline_y,
                width: line_width,
                x: self.align_x(at.0, width, line_width),
            });
        }

        let height = if lines.is_empty() {
            Pt(0.0)
        } else {
            baseline_y.abs() + line_height - ascender
        };

        Ok(LayoutResult {
            lines,
            height,
            leftover: queue.unconsumed_runs(),
            truncated,
        })
    }

    fn align_x(&self, left: Pt, width: Pt, line_width: Pt) -> Pt {
        match self.options.align {
            Align::Left => left,
            Align::Center => left + (width - line_width) / 2.0,
            Align::Right => left + width - line_width,
        }
    }

    /// Trim the tail of the last visible line until `...` fits inside the
    /// box width, then append it
    fn apply_ellipsis<M: MetricsProvider>(
        &self,
        metrics: &M,
        result: &mut LayoutResult,
        at: (Pt, Pt),
        width: Pt,
    ) -> Result<(), FlowError> {
        let Some(line) = result.lines.last_mut() else {
            return Ok(());
        };
        // the dots inherit the format of the run they follow
        let base_font = metrics.resolve(&self.options.font_family, Default::default())?;
        let (mut dots_font, mut dots_size, mut dots_colour) = match line.runs.last() {
            Some(last) => (last.font, last.size, last.colour),
            None => (base_font, self.options.size, self.options.colour),
        };
        let mut dots_width =
            measured_width(metrics, dots_font, dots_size, "...", self.options.kerning)?;

        while line.width + dots_width > width {
            let Some(last) = line.runs.last_mut() else { break };
            last.text.pop();
            if last.text.is_empty() {
                line.runs.pop();
                (dots_font, dots_size, dots_colour) = match line.runs.last() {
                    Some(last) => (last.font, last.size, last.colour),
                    None => (base_font, self.options.size, self.options.colour),
                };
                dots_width =
                    measured_width(metrics, dots_font, dots_size, "...", self.options.kerning)?;
            } else {
                last.width =
                    measured_width(metrics, last.font, last.size, &last.text, self.options.kerning)?;
            }
            line.width = line.runs.iter().map(|r| r.width).sum();
        }

        match line.runs.last_mut() {
            Some(last) => {
                last.text.push_str("...");
                last.width += dots_width;
            }
            None => line.runs.push(PlacedRun {
                text: "...".to_string(),
                font: dots_font,
                size: dots_size,
                colour: dots_colour,
                x: Pt(0.0),
                width: dots_width,
            }),
        }
        line.width += dots_width;
        line.text = line.runs.iter().map(|r| r.text.as_str()).collect();
        line.x = self.align_x(at.0, width, line.width);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::run::plain_text;
    use crate::text::testutil::FixedMetrics;

    fn boxed(text: &str, options: BoxOptions) -> TextBox {
        TextBox::new(vec![Run::new(text)], options)
    }

    #[test]
    fn overflow_parses_from_str() {
        assert_eq!(Overflow::from_str("truncate").unwrap(), Overflow::Truncate);
        assert_eq!(Overflow::from_str("shrink_to_fit").unwrap(), Overflow::ShrinkToFit);
        assert!(matches!(
            Overflow::from_str("overrun"),
            Err(FlowError::UnknownOverflow(s)) if s == "overrun"
        ));
    }

    #[test]
    fn zero_width_is_rejected() {
        let metrics = FixedMetrics::new();
        let mut tb = boxed(
            "hi",
            BoxOptions {
                width: Some(Pt(0.0)),
                height: Some(Pt(100.0)),
                ..BoxOptions::default()
            },
        );
        assert!(matches!(
            tb.dry_run(&metrics),
            Err(FlowError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn wraps_where_expected() {
        let metrics = FixedMetrics::new();
        let mut tb = boxed(
            "Please wrap this text about HERE. More text that should be wrapped",
            BoxOptions {
                width: Some(Pt(220.0)),
                height: Some(Pt(200.0)),
                ..BoxOptions::default()
            },
        );
        let leftover = tb.dry_run(&metrics).unwrap();
        assert!(leftover.is_empty());
        assert_eq!(
            tb.text(),
            "Please wrap this text about\nHERE. More text that should be\nwrapped"
        );
    }

    #[test]
    fn truncate_hands_back_the_remainder_exactly_once() {
        let metrics = FixedMetrics::new();
        // two lines fit: first needs 12pt, the second 12 + 3 = 15pt more
        let mut tb = boxed(
            "one two three four five six seven",
            BoxOptions {
                width: Some(Pt(60.0)),
                height: Some(Pt(27.0)),
                ..BoxOptions::default()
            },
        );
        let leftover = tb.dry_run(&metrics).unwrap();
        assert!(!leftover.is_empty());
        // printed plus leftover reconstructs the input, modulo break spaces
        let printed = tb.text().replace('\n', " ");
        let rebuilt = format!("{} {}", printed, plain_text(&leftover));
        assert_eq!(rebuilt, "one two three four five six seven");
        assert_eq!(tb.line_count(), 2);
    }

    #[test]
    fn expand_ignores_the_height_bound() {
        let metrics = FixedMetrics::new();
        let mut tb = boxed(
            "one two three four five six seven",
            BoxOptions {
                width: Some(Pt(60.0)),
                height: Some(Pt(10.0)),
                overflow: Overflow::Expand,
                ..BoxOptions::default()
            },
        );
        let leftover = tb.dry_run(&metrics).unwrap();
        assert!(leftover.is_empty());
        assert!(tb.height() > Pt(10.0));
        assert!(tb.line_count() >= 4);
    }

    #[test]
    fn ellipses_marks_the_last_visible_line() {
        let metrics = FixedMetrics::new();
        let mut tb = boxed(
            "one two three four five six seven",
            BoxOptions {
                width: Some(Pt(60.0)),
                height: Some(Pt(27.0)),
                overflow: Overflow::Ellipses,
                ..BoxOptions::default()
            },
        );
        tb.dry_run(&metrics).unwrap();
        let text = tb.text();
        assert!(text.ends_with("..."), "got {:?}", text);
        // the marked line still fits the box width
        let last_width = Pt(0.6 * 12.0) * text.lines().last().unwrap().chars().count() as f32;
        assert!(last_width <= Pt(60.0));
    }

    #[test]
    fn shrink_to_fit_steps_down_no_further_than_the_floor() {
        let metrics = FixedMetrics::new();
        let mut tb = boxed(
            "this will need to get smaller to fit in such a cramped space",
            BoxOptions {
                width: Some(Pt(100.0)),
                height: Some(Pt(40.0)),
                overflow: Overflow::ShrinkToFit,
                min_font_size: Pt(5.0),
                ..BoxOptions::default()
            },
        );
        tb.dry_run(&metrics).unwrap();
        assert!(tb.font_size() < Pt(12.0));
        assert!(tb.font_size() >= Pt(5.0));
    }

    #[test]
    fn shrink_to_fit_leaves_fitting_text_alone() {
        let metrics = FixedMetrics::new();
        let mut tb = boxed(
            "short",
            BoxOptions {
                width: Some(Pt(100.0)),
                height: Some(Pt(40.0)),
                overflow: Overflow::ShrinkToFit,
                ..BoxOptions::default()
            },
        );
        tb.dry_run(&metrics).unwrap();
        assert_eq!(tb.font_size(), Pt(12.0));
    }

    #[test]
    fn single_line_height_is_the_ascender() {
        let metrics = FixedMetrics::new();
        let mut tb = boxed(
            "hi",
            BoxOptions {
                width: Some(Pt(100.0)),
                height: Some(Pt(100.0)),
                ..BoxOptions::default()
            },
        );
        tb.dry_run(&metrics).unwrap();
        // |baseline| + line_height - ascender with one line collapses to
        // the line height: 12pt
        assert_eq!(tb.height(), Pt(12.0));
    }

    #[test]
    fn blank_lines_advance_the_baseline() {
        let metrics = FixedMetrics::new();
        let mut tb = boxed(
            "Please wrap only before THIS\n\nword. Don't wrap this",
            BoxOptions {
                width: Some(Pt(200.0)),
                height: Some(Pt(200.0)),
                ..BoxOptions::default()
            },
        );
        tb.dry_run(&metrics).unwrap();
        assert_eq!(
            tb.text(),
            "Please wrap only before\nTHIS\n\nword. Don't wrap this"
        );
        // four baselines: 9 + 3 * 12 + (12 - 9) = 48
        assert_eq!(tb.height(), Pt(48.0));
    }
}
