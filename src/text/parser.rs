//! Inline markup for styled text, converting between tagged strings and
//! [Run] sequences in both directions.
//!
//! The tag set is deliberately small: `<b>`/`<strong>`, `<i>`/`<em>`, `<u>`,
//! `<strikethrough>`, `<font name="..." size="...">`, `<color rgb="rrggbb">`
//! (or `c`/`m`/`y`/`k` percentages), and `<link href="...">` /
//! `<link anchor="...">` (`<a>` works too). Tags nest; a closing tag pops
//! the innermost matching attribute frame. Anything after a `<` that is not
//! a recognized tag is taken as literal text, so stray angle brackets never
//! derail parsing.

use crate::colour::Colour;
use crate::text::run::{coalesce, Run, Style};
use crate::units::Pt;

/// Parse inline markup into a flat run sequence. Newlines become their own
/// break runs carrying the style active at that point. Never fails;
/// malformed input degrades to literal text.
pub fn parse(markup: &str) -> Vec<Run> {
    let mut state = ParseState::default();
    let mut rest = markup;
    while let Some(lt) = rest.find('<') {
        let (text, after) = rest.split_at(lt);
        state.text(text);
        match after[1..].find('>') {
            Some(gt) if state.tag(&after[1..1 + gt]) => {
                rest = &after[gt + 2..];
            }
            _ => {
                // not a recognized tag, keep the bracket as text
                state.buf.push('<');
                rest = &after[1..];
            }
        }
    }
    state.text(rest);
    state.flush();
    coalesce(state.runs)
}

/// Render a run sequence back to markup. `parse(serialize(runs))` gives the
/// same runs back (after coalescing); tags are emitted properly nested with
/// styles outermost, then font, colour, and link.
pub fn serialize(runs: &[Run]) -> String {
    let mut out = String::new();
    for run in runs.iter() {
        if run.is_break() {
            out.push('\n');
            continue;
        }
        let mut tags: Vec<(String, String)> = Vec::new();
        for style in run.styles.iter() {
            let name = match style {
                Style::Bold => "b",
                Style::Italic => "i",
                Style::Underline => "u",
                Style::Strikethrough => "strikethrough",
            };
            tags.push((format!("<{name}>"), format!("</{name}>")));
        }
        if run.font.is_some() || run.size.is_some() {
            let mut open = String::from("<font");
            if let Some(name) = &run.font {
                open.push_str(&format!(" name=\"{name}\""));
            }
            if let Some(size) = run.size {
                open.push_str(&format!(" size=\"{}\"", size.0));
            }
            open.push('>');
            tags.push((open, "</font>".to_string()));
        }
        if let Some(colour) = run.colour {
            tags.push((colour_tag(colour), "</color>".to_string()));
        }
        if run.link.is_some() || run.anchor.is_some() {
            let mut open = String::from("<link");
            if let Some(href) = &run.link {
                open.push_str(&format!(" href=\"{href}\""));
            }
            if let Some(anchor) = &run.anchor {
                open.push_str(&format!(" anchor=\"{anchor}\""));
            }
            open.push('>');
            tags.push((open, "</link>".to_string()));
        }

        for (open, _) in tags.iter() {
            out.push_str(open);
        }
        out.push_str(&escape(&run.text));
        for (_, close) in tags.iter().rev() {
            out.push_str(close);
        }
    }
    out
}

/// Escape text so it survives a [parse] round trip verbatim
pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<").replace("&gt;", ">").replace("&amp;", "&")
}

fn colour_tag(colour: Colour) -> String {
    match colour {
        Colour::CMYK { c, m, y, k } => format!(
            "<color c=\"{}\" m=\"{}\" y=\"{}\" k=\"{}\">",
            (c * 100.0).round(),
            (m * 100.0).round(),
            (y * 100.0).round(),
            (k * 100.0).round()
        ),
        _ => match colour.to_rgb_hex() {
            Some(hex) => format!("<color rgb=\"{hex}\">"),
            None => "<color>".to_string(),
        },
    }
}

#[derive(Default)]
struct ParseState {
    styles: Vec<Style>,
    /// Effective (family, size) frames; each frame resolves its inheritance
    /// when pushed
    fonts: Vec<(Option<String>, Option<Pt>)>,
    colours: Vec<Colour>,
    links: Vec<(Option<String>, Option<String>)>,
    runs: Vec<Run>,
    buf: String,
}

impl ParseState {
    fn text(&mut self, raw: &str) {
        for ch in raw.chars() {
            if ch == '\n' {
                self.flush();
                let mut run = self.snapshot();
                run.text = "\n".to_string();
                self.runs.push(run);
            } else {
                self.buf.push(ch);
            }
        }
    }

    fn flush(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let mut run = self.snapshot();
        run.text = unescape(&std::mem::take(&mut self.buf));
        self.runs.push(run);
    }

    fn snapshot(&self) -> Run {
        let (font, size) = self.fonts.last().cloned().unwrap_or((None, None));
        let (link, anchor) = self.links.last().cloned().unwrap_or((None, None));
        Run {
            text: String::new(),
            styles: self.styles.clone(),
            font,
            size,
            colour: self.colours.last().copied(),
            link,
            anchor,
        }
    }

    /// Apply a tag's inner text (between the angle brackets); false means
    /// the tag is not recognized and the caller falls back to literal text
    fn tag(&mut self, inner: &str) -> bool {
        let inner = inner.trim();
        let (closing, rest) = match inner.strip_prefix('/') {
            Some(rest) => (true, rest),
            None => (false, inner),
        };
        let (name, attr_text) = match rest.split_once(char::is_whitespace) {
            Some((name, attrs)) => (name, attrs),
            None => (rest, ""),
        };
        let name = name.to_ascii_lowercase();
        if closing {
            return self.close_tag(&name);
        }

        match name.as_str() {
            "b" | "strong" => self.push_style(Style::Bold),
            "i" | "em" => self.push_style(Style::Italic),
            "u" => self.push_style(Style::Underline),
            "strikethrough" => self.push_style(Style::Strikethrough),
            "font" => {
                let attrs = parse_attrs(attr_text);
                let (family, size) = self.fonts.last().cloned().unwrap_or((None, None));
                let family = attr(&attrs, "name").map(str::to_string).or(family);
                let size = attr(&attrs, "size").and_then(|s| s.parse::<f32>().ok()).map(Pt).or(size);
                self.flush();
                self.fonts.push((family, size));
            }
            "color" => {
                let attrs = parse_attrs(attr_text);
                let colour = parse_colour(&attrs)
                    .or_else(|| self.colours.last().copied())
                    .unwrap_or(crate::colour::colours::BLACK);
                self.flush();
                self.colours.push(colour);
            }
            "link" | "a" => {
                let attrs = parse_attrs(attr_text);
                self.flush();
                self.links.push((
                    attr(&attrs, "href").map(str::to_string),
                    attr(&attrs, "anchor").map(str::to_string),
                ));
            }
            _ => return false,
        }
        true
    }

    fn push_style(&mut self, style: Style) {
        self.flush();
        self.styles.push(style);
    }

    fn close_tag(&mut self, name: &str) -> bool {
        let style = match name {
            "b" | "strong" => Some(Style::Bold),
            "i" | "em" => Some(Style::Italic),
            "u" => Some(Style::Underline),
            "strikethrough" => Some(Style::Strikethrough),
            _ => None,
        };
        if let Some(style) = style {
            self.flush();
            self.styles.retain(|s| *s != style);
            return true;
        }
        match name {
            "font" => {
                self.flush();
                self.fonts.pop();
            }
            "color" => {
                self.flush();
                self.colours.pop();
            }
            "link" | "a" => {
                self.flush();
                self.links.pop();
            }
            _ => return false,
        }
        true
    }
}

fn attr<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

/// Parse `name="value"` pairs; single quotes work too
fn parse_attrs(text: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    let mut rest = text.trim_start();
    while !rest.is_empty() {
        let Some(eq) = rest.find('=') else { break };
        let key = rest[..eq].trim().to_ascii_lowercase();
        rest = rest[eq + 1..].trim_start();
        let Some(quote) = rest.chars().next().filter(|c| *c == '"' || *c == '\'') else {
            break;
        };
        let Some(end) = rest[1..].find(quote) else { break };
        attrs.push((key, rest[1..1 + end].to_string()));
        rest = rest[end + 2..].trim_start();
    }
    attrs
}

fn parse_colour(attrs: &[(String, String)]) -> Option<Colour> {
    if let Some(hex) = attr(attrs, "rgb") {
        return Colour::from_rgb_hex(hex);
    }
    let component = |name: &str| attr(attrs, name).and_then(|v| v.parse::<f32>().ok());
    match (component("c"), component("m"), component("y"), component("k")) {
        (Some(c), Some(m), Some(y), Some(k)) => Some(Colour::new_cmyk(
            c / 100.0,
            m / 100.0,
            y / 100.0,
            k / 100.0,
        )),
        _ => None,
    }
}
