use std::collections::VecDeque;

use crate::text::run::Run;
use crate::units::Pt;

const TABSIZE: usize = 4;

/// Running maxima over the runs slated for the line currently being tested.
/// The descender is kept as a positive magnitude.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct LineMetrics {
    pub ascender: Pt,
    pub descender: Pt,
    pub line_height: Pt,
}

/// The pending/consumed run queues for one layout pass.
///
/// Runs live in an index-addressed arena; the `pending` queue holds text not
/// yet attempted on a line, and the `tentative` queue holds the runs consumed
/// for the line currently under test. Consumption is transactional: a line
/// that fails the vertical fit test is rolled back with [repack](RunQueue::repack),
/// which moves indices only. At any instant the two queues together
/// reconstruct the remaining text exactly.
#[derive(Debug, Default)]
pub struct RunQueue {
    arena: Vec<Run>,
    widths: Vec<Pt>,
    pending: VecDeque<usize>,
    tentative: VecDeque<usize>,
    current: Option<usize>,
    line: LineMetrics,
}

impl RunQueue {
    pub fn new() -> RunQueue {
        RunQueue::default()
    }

    /// Reset both queues from a fresh run sequence. Tabs expand to spaces and
    /// newlines are normalized, then each run is split into text segments and
    /// atomic `"\n"` break tokens.
    pub fn load(&mut self, runs: &[Run]) {
        self.arena.clear();
        self.widths.clear();
        self.pending.clear();
        self.tentative.clear();
        self.current = None;
        self.line = LineMetrics::default();

        for run in runs.iter() {
            let text = run.text.replace('\t', &" ".repeat(TABSIZE));
            let text = text.replace("\r\n", "\n").replace('\r', "\n");

            let mut segment = String::new();
            for ch in text.chars() {
                if ch == '\n' {
                    if !segment.is_empty() {
                        self.push_pending(run, std::mem::take(&mut segment));
                    }
                    self.push_pending(run, "\n".to_string());
                } else {
                    segment.push(ch);
                }
            }
            if !segment.is_empty() {
                self.push_pending(run, segment);
            }
        }
    }

    fn push_pending(&mut self, template: &Run, text: String) {
        let mut run = template.clone();
        run.text = text;
        self.arena.push(run);
        self.widths.push(Pt(0.0));
        self.pending.push_back(self.arena.len() - 1);
    }

    /// Reset the per-line metric maxima; called at the start of each wrapped
    /// line
    pub fn start_line(&mut self) {
        self.line = LineMetrics::default();
    }

    /// Dequeue the next unconsumed run into the consumed buffer, returning
    /// its arena slot, or [None] when the queue is exhausted
    pub fn next_run(&mut self) -> Option<usize> {
        let slot = self.pending.pop_front()?;
        self.tentative.push_back(slot);
        self.current = Some(slot);
        Some(slot)
    }

    pub fn run(&self, slot: usize) -> &Run {
        &self.arena[slot]
    }

    /// Record the measured width and vertical metrics of a consumed run,
    /// folding them into the current line's maxima. `descender` follows font
    /// convention (negative).
    pub fn record_measure(
        &mut self,
        slot: usize,
        width: Pt,
        ascender: Pt,
        descender: Pt,
        line_height: Pt,
    ) {
        self.widths[slot] = width;
        self.line.ascender = self.line.ascender.max(ascender);
        self.line.descender = self.line.descender.max(descender.abs());
        self.line.line_height = self.line.line_height.max(line_height);
    }

    pub fn line_metrics(&self) -> LineMetrics {
        self.line
    }

    /// Replace the just-consumed run's text with the portion that fit; if
    /// `unprinted` is non-empty it is requeued at the front of the pending
    /// queue as a fresh run carrying the same style snapshot.
    pub fn update_last(&mut self, printed: &str, unprinted: &str) {
        let Some(slot) = self.current else { return };
        self.arena[slot].text = printed.to_string();
        if !unprinted.is_empty() {
            let mut rest = self.arena[slot].clone();
            rest.text = unprinted.to_string();
            self.arena.push(rest);
            self.widths.push(Pt(0.0));
            self.pending.push_front(self.arena.len() - 1);
        }
    }

    /// Undo this line's tentative consumption, moving the entire consumed
    /// buffer back to the front of the pending queue in order. O(line length),
    /// index movement only.
    pub fn repack(&mut self) {
        while let Some(slot) = self.tentative.pop_back() {
            self.pending.push_front(slot);
        }
        self.current = None;
    }

    /// Drain the consumed buffer one run at a time for drawing, after the
    /// line has been confirmed to fit. Returns the slot and its measured
    /// width.
    pub fn retrieve(&mut self) -> Option<(usize, Pt)> {
        let slot = self.tentative.pop_front()?;
        Some((slot, self.widths[slot]))
    }

    pub fn finished(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn unfinished(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Clone out whatever remains unconsumed, i.e. the leftover after a
    /// render. Emptied placeholder runs are dropped.
    pub fn unconsumed_runs(&self) -> Vec<Run> {
        self.pending
            .iter()
            .map(|&slot| self.arena[slot].clone())
            .filter(|run| !run.text.is_empty())
            .collect()
    }

    #[cfg(test)]
    fn remaining_text(&self) -> String {
        // tentative ++ pending reconstructs the text still in play
        self.tentative
            .iter()
            .chain(self.pending.iter())
            .map(|&slot| self.arena[slot].text.as_str())
            .collect()
    }
}
