use crate::colour::Colour;
use crate::units::Pt;

/// A character-level style attribute carried by a [Run]. Bold and italic
/// select the font variant drawn; underline and strikethrough are carried
/// through parsing and layout untouched.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Style {
    Bold,
    Italic,
    Underline,
    Strikethrough,
}

/// The font variant a run resolves to, combining its bold and italic styles.
/// Font catalogs register one face per (family, style) pair.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum FontStyle {
    #[default]
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

/// A maximal span of text sharing one flat style snapshot: the unit the
/// layout engine consumes. The engine may split a run at a line break into a
/// printed prefix and a requeued suffix, but never alters its style fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Run {
    pub text: String,
    pub styles: Vec<Style>,
    /// Font family override; when [None] the box's base family is used
    pub font: Option<String>,
    /// Font size override; when [None] the box's base size is used
    pub size: Option<Pt>,
    /// Text colour; when [None] the box's base colour is used
    pub colour: Option<Colour>,
    /// External link target (href)
    pub link: Option<String>,
    /// Internal link target (named anchor)
    pub anchor: Option<String>,
}

impl Run {
    pub fn new<S: ToString>(text: S) -> Run {
        Run {
            text: text.to_string(),
            ..Run::default()
        }
    }

    /// An explicit line-break token. Break tokens are atomic: they are never
    /// split, and never merged with adjacent text.
    pub fn is_break(&self) -> bool {
        self.text == "\n"
    }

    /// The font variant this run's styles select
    pub fn font_style(&self) -> FontStyle {
        let bold = self.styles.contains(&Style::Bold);
        let italic = self.styles.contains(&Style::Italic);
        match (bold, italic) {
            (false, false) => FontStyle::Regular,
            (true, false) => FontStyle::Bold,
            (false, true) => FontStyle::Italic,
            (true, true) => FontStyle::BoldItalic,
        }
    }

    /// Whether two runs share every style attribute (everything but the text),
    /// making them candidates for [coalesce]
    pub fn same_format(&self, other: &Run) -> bool {
        self.styles == other.styles
            && self.font == other.font
            && self.size == other.size
            && self.colour == other.colour
            && self.link == other.link
            && self.anchor == other.anchor
    }
}

/// Merge textually-adjacent runs that share identical style attributes.
/// Explicit line-break tokens stay atomic and are never merged into
/// neighbouring text.
pub fn coalesce(runs: Vec<Run>) -> Vec<Run> {
    let mut out: Vec<Run> = Vec::with_capacity(runs.len());
    for run in runs.into_iter() {
        match out.last_mut() {
            Some(last)
                if !last.is_break() && !run.is_break() && last.same_format(&run) =>
            {
                last.text.push_str(&run.text);
            }
            _ => out.push(run),
        }
    }
    out
}

/// Concatenate the raw text of a run sequence, e.g. to inspect the leftover
/// returned by a render
pub fn plain_text(runs: &[Run]) -> String {
    runs.iter().map(|r| r.text.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coalesce_merges_only_identical_formats() {
        let a = Run::new("one ");
        let b = Run::new("two");
        let mut c = Run::new("three");
        c.styles.push(Style::Bold);
        let merged = coalesce(vec![a, b, c.clone()]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].text, "one two");
        assert_eq!(merged[1], c);
    }

    #[test]
    fn coalesce_keeps_breaks_atomic() {
        let runs = vec![Run::new("a"), Run::new("\n"), Run::new("\n"), Run::new("b")];
        let merged = coalesce(runs);
        assert_eq!(
            merged.iter().map(|r| r.text.as_str()).collect::<Vec<_>>(),
            vec!["a", "\n", "\n", "b"]
        );
    }

    #[test]
    fn font_style_combines_bold_and_italic() {
        let mut run = Run::new("x");
        assert_eq!(run.font_style(), FontStyle::Regular);
        run.styles.push(Style::Bold);
        run.styles.push(Style::Italic);
        assert_eq!(run.font_style(), FontStyle::BoldItalic);
    }
}
