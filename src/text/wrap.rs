use crate::text::metrics::{measured_width, FontKey, MetricsProvider};
use crate::text::queue::RunQueue;
use crate::text::run::Run;
use crate::units::Pt;
use crate::FlowError;

/// Greedy single-line filler. Pulls runs from a [RunQueue] and consumes as
/// much text as fits into a fixed horizontal budget, splitting the last run
/// at a space when necessary.
///
/// Breaking happens at space boundaries only: each candidate unit is a word
/// together with the spaces preceding it, so a unit either fits whole or
/// forces the break. The one exception is a unit wider than the entire
/// budget starting an empty line, which is placed anyway so layout always
/// makes forward progress.
pub struct LineWrapper {
    width: Pt,
    kerning: bool,
    family: String,
    base_size: Pt,
    scale: f32,
    min_size: Pt,
    line_width: Pt,
}

impl LineWrapper {
    pub fn new(width: Pt, kerning: bool, family: &str, base_size: Pt, min_size: Pt) -> LineWrapper {
        LineWrapper {
            width,
            kerning,
            family: family.to_string(),
            base_size,
            scale: 1.0,
            min_size,
            line_width: Pt(0.0),
        }
    }

    /// Uniform scale applied on top of every run's size, used by the
    /// shrink-to-fit retry loop
    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }

    /// The summed width of the text consumed by the last [wrap_line](LineWrapper::wrap_line)
    /// call, for alignment offsets
    pub fn line_width(&self) -> Pt {
        self.line_width
    }

    /// The concrete face a run draws with, honouring its family override and
    /// bold/italic styles
    pub fn resolve_font<M: MetricsProvider>(&self, metrics: &M, run: &Run) -> Result<FontKey, FlowError> {
        let family = run.font.as_deref().unwrap_or(&self.family);
        metrics.resolve(family, run.font_style())
    }

    /// The size a run draws at, honouring its size override, the current
    /// shrink scale, and the shrink floor
    pub fn effective_size(&self, run: &Run) -> Pt {
        let base = run.size.unwrap_or(self.base_size);
        let scaled = base * self.scale;
        if self.scale < 1.0 {
            scaled.max(self.min_size.min(base))
        } else {
            scaled
        }
    }

    /// Consume runs from the queue to fill one line. Returns the consumed
    /// text (without a trailing newline), or [None] when the queue was
    /// already exhausted. An empty string is a deliberately blank line from
    /// an explicit break token.
    ///
    /// The consumed runs stay in the queue's tentative buffer with their
    /// widths and metrics recorded; the caller either retrieves them for
    /// drawing or repacks them if the line does not fit vertically.
    pub fn wrap_line<M: MetricsProvider>(
        &mut self,
        queue: &mut RunQueue,
        metrics: &M,
    ) -> Result<Option<String>, FlowError> {
        queue.start_line();
        self.line_width = Pt(0.0);
        let mut line = String::new();
        let mut consumed_any = false;

        loop {
            let Some(slot) = queue.next_run() else {
                return Ok(if consumed_any { Some(line) } else { None });
            };
            consumed_any = true;

            let run = queue.run(slot).clone();
            let font = self.resolve_font(metrics, &run)?;
            let size = self.effective_size(&run);
            let ascender = metrics.ascender(font, size);
            let descender = metrics.descender(font, size);
            let line_height = metrics.line_height(font, size);

            if run.is_break() {
                // breaks occupy no width but still size the line, so runs of
                // blank lines advance the baseline
                queue.record_measure(slot, Pt(0.0), ascender, descender, line_height);
                return Ok(Some(line));
            }

            // spaces at the start of a line are swallowed; spaces everywhere
            // else stay attached to the word that follows them, so a rolled
            // back split run still reads back verbatim
            let text = if line.is_empty() {
                run.text.trim_start_matches(' ')
            } else {
                run.text.as_str()
            };
            if text.is_empty() {
                queue.update_last("", "");
                continue;
            }

            let mut printed_end = 0;
            let mut printed_width = Pt(0.0);
            let mut fits_all = true;
            for chunk in break_units(text) {
                let mut chunk_width = measured_width(metrics, font, size, chunk, self.kerning)?;
                if self.kerning {
                    chunk_width += self.boundary_kern(metrics, font, size, &text[..printed_end], chunk);
                }
                let oversized_start = line.is_empty() && printed_end == 0;
                if self.line_width + printed_width + chunk_width <= self.width || oversized_start {
                    printed_end += chunk.len();
                    printed_width += chunk_width;
                } else {
                    fits_all = false;
                    break;
                }
            }

            if fits_all {
                if text.len() != run.text.len() {
                    queue.update_last(text, "");
                }
                queue.record_measure(slot, printed_width, ascender, descender, line_height);
                line.push_str(text);
                self.line_width += printed_width;
                continue;
            }

            // printed_end sits at a word boundary: the leading spaces of the
            // rejected chunk become the line break
            let printed = &text[..printed_end];
            let unprinted = &text[printed_end..];

            if printed.is_empty() {
                // nothing of this run fits after what is already on the line
                queue.update_last("", &run.text);
                return Ok(Some(line));
            }

            queue.update_last(printed, unprinted);
            queue.record_measure(slot, printed_width, ascender, descender, line_height);
            line.push_str(printed);
            self.line_width += printed_width;
            return Ok(Some(line));
        }
    }

    /// The kerning delta across the seam between already-consumed text and
    /// the next unit, which per-chunk measurement misses
    fn boundary_kern<M: MetricsProvider>(
        &self,
        metrics: &M,
        font: FontKey,
        size: Pt,
        printed: &str,
        chunk: &str,
    ) -> Pt {
        let (Some(prev), Some(next)) = (printed.chars().last(), chunk.chars().next()) else {
            return Pt(0.0);
        };
        let pair: String = [prev, next].iter().collect();
        metrics
            .kerning_pairs(font, size, &pair)
            .into_iter()
            .map(|(_, adjustment)| adjustment)
            .sum()
    }
}

/// Split text into indivisible wrap units: each unit is a word preceded by
/// whatever spaces come before it, so breaking between units swallows the
/// break space naturally.
fn break_units(text: &str) -> Vec<&str> {
    let mut units = Vec::new();
    let mut start = 0;
    let mut in_word = false;
    for (i, ch) in text.char_indices() {
        if ch == ' ' {
            if in_word {
                units.push(&text[start..i]);
                start = i;
                in_word = false;
            }
        } else {
            in_word = true;
        }
    }
    if start < text.len() {
        units.push(&text[start..]);
    }
    units
}
