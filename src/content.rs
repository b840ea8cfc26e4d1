//! Translation of buffered page contents into PDF content stream operators.

use std::io::Write;

use id_arena::Arena;

use crate::colour::Colour;
use crate::font::Font;
use crate::page::{PageContents, SpanLayout};
use crate::FlowError;

#[allow(clippy::write_with_newline)]
pub(crate) fn render_contents(
    contents: &[PageContents],
    fonts: &Arena<Font>,
) -> Result<Vec<u8>, FlowError> {
    if contents.is_empty() {
        return Ok(Vec::default());
    }

    let mut content: Vec<u8> = Vec::default();
    for page_content in contents.iter() {
        match page_content {
            PageContents::Text(span) => {
                render_text_span(&mut content, span, fonts)?;
            }
            PageContents::Raw(raw) => {
                write!(&mut content, "q\n")?;
                content.write_all(raw.as_slice())?;
                write!(&mut content, "\nQ\n")?;
            }
        }
    }

    Ok(content)
}

#[allow(clippy::write_with_newline)]
fn render_text_span(
    content: &mut Vec<u8>,
    span: &SpanLayout,
    fonts: &Arena<Font>,
) -> Result<(), FlowError> {
    let font = fonts
        .iter()
        .find(|(id, _)| id.index() == span.font.key.0)
        .map(|(_, font)| font)
        .expect("span font keys index the document font arena");

    write!(content, "q\n")?;
    write!(content, "/F{} {} Tf\n", span.font.key.0, span.font.size)?;
    write_colour(content, span.colour)?;
    write!(content, "BT\n")?;
    write!(content, "{} {} Td\n", span.coords.0, span.coords.1)?;

    let kerns = if span.kerning {
        font.kerning(&span.text, span.font.size)
    } else {
        Vec::new()
    };

    if kerns.is_empty() {
        write!(content, "<")?;
        for ch in span.text.chars() {
            write!(content, "{:04x}", font.glyph_or_replacement(ch)?.0)?;
        }
        write!(content, "> Tj\n")?;
    } else {
        // TJ adjustments are in thousandths of the em, positive moving the
        // following glyphs left
        let mut kerns = kerns.iter().peekable();
        write!(content, "[<")?;
        for (i, ch) in span.text.chars().enumerate() {
            if let Some((at, delta)) = kerns.peek() {
                if *at == i {
                    let adjustment = -(delta.0 / span.font.size.0 * 1000.0);
                    write!(content, "> {} <", adjustment)?;
                    kerns.next();
                }
            }
            write!(content, "{:04x}", font.glyph_or_replacement(ch)?.0)?;
        }
        write!(content, ">] TJ\n")?;
    }

    write!(content, "ET\n")?;
    write!(content, "Q\n")?;
    Ok(())
}

#[allow(clippy::write_with_newline)]
fn write_colour(content: &mut Vec<u8>, colour: Colour) -> Result<(), std::io::Error> {
    match colour {
        Colour::RGB { r, g, b } => write!(content, "{r} {g} {b} rg\n"),
        Colour::CMYK { c, m, y, k } => write!(content, "{c} {m} {y} {k} k\n"),
        Colour::Grey { g } => write!(content, "{g} g\n"),
    }
}
