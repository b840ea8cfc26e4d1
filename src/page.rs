use id_arena::Arena;
use pdf_writer::{Finish, Name, Pdf};

use crate::colour::Colour;
use crate::content::render_contents;
use crate::font::Font;
use crate::pagesize::PageSize;
use crate::rect::Rect;
use crate::refs::{ObjectReferences, RefType};
use crate::text::{FontKey, PageCanvas};
use crate::units::Pt;
use crate::FlowError;

/// The font a span draws with: an index into the document's font arena plus
/// a size. Pages name their font resources `/F{index}`.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SpanFont {
    pub key: FontKey,
    pub size: Pt,
}

/// A single placed piece of text, with its baseline origin in page
/// coordinates
#[derive(Clone, PartialEq, Debug)]
pub struct SpanLayout {
    pub text: String,
    pub font: SpanFont,
    pub colour: Colour,
    pub coords: (Pt, Pt),
    /// Whether to apply pair kerning when the span is written
    pub kerning: bool,
}

#[derive(Clone, PartialEq, Debug)]
pub enum PageContents {
    Text(SpanLayout),
    /// Raw content stream operators, wrapped in a graphics state save and
    /// restore when written
    Raw(Vec<u8>),
}

/// Page margins, in the same clockwise order as CSS. Margins only shape the
/// page's content box; nothing stops content placed outside them.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Margins {
    pub top: Pt,
    pub right: Pt,
    pub bottom: Pt,
    pub left: Pt,
}

impl Margins {
    pub fn trbl(top: Pt, right: Pt, bottom: Pt, left: Pt) -> Margins {
        Margins {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn all<D: Into<Pt>>(value: D) -> Margins {
        let value: Pt = value.into();
        Margins {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    pub fn symmetric(vertical: Pt, horizontal: Pt) -> Margins {
        Margins {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }
}

/// A single page: its geometry, buffered contents, and the drawing cursor
/// that text layout advances down the page.
pub struct Page {
    /// The size of the page
    pub media_box: Rect,
    /// Where content can live, i.e. within the margins
    pub content_box: Rect,
    pub contents: Vec<PageContents>,
    cursor: (Pt, Pt),
}

impl Page {
    pub fn new(size: PageSize, margins: Option<Margins>) -> Page {
        let margins = margins.unwrap_or_default();
        let content_box = Rect {
            x1: margins.left,
            y1: margins.bottom,
            x2: size.0 - margins.right,
            y2: size.1 - margins.top,
        };
        Page {
            media_box: Rect {
                x1: Pt(0.0),
                y1: Pt(0.0),
                x2: size.0,
                y2: size.1,
            },
            content_box,
            contents: Vec::default(),
            cursor: (content_box.x1, content_box.y2),
        }
    }

    pub fn add_span(&mut self, span: SpanLayout) {
        self.contents.push(PageContents::Text(span));
    }

    pub fn add_raw(&mut self, content: Vec<u8>) {
        self.contents.push(PageContents::Raw(content));
    }

    /// Where the first baseline of `font` at `size` sits when starting at
    /// the top-left of the content box
    pub fn baseline_start(&self, font: &Font, size: Pt) -> (Pt, Pt) {
        (
            self.content_box.x1,
            self.content_box.y2 - font.ascent(size),
        )
    }

    pub(crate) fn write(
        &self,
        refs: &mut ObjectReferences,
        page_index: usize,
        fonts: &Arena<Font>,
        writer: &mut Pdf,
    ) -> Result<(), FlowError> {
        let content = render_contents(&self.contents, fonts)?;
        let content_id = refs.gen(RefType::ContentForPage(page_index));
        writer.stream(content_id, &content);

        let page_id = refs
            .get(RefType::Page(page_index))
            .ok_or(FlowError::PageMissing)?;
        let mut page = writer.page(page_id);
        page.media_box(self.media_box.into());
        page.art_box(self.content_box.into());
        if let Some(parent) = refs.get(RefType::PageTree) {
            page.parent(parent);
        }
        page.contents(content_id);

        let mut resources = page.resources();
        let mut resource_fonts = resources.fonts();
        for (id, _) in fonts.iter() {
            if let Some(font_ref) = refs.get(RefType::Font(id.index())) {
                let name = format!("F{}", id.index());
                resource_fonts.pair(Name(name.as_bytes()), font_ref);
            }
        }
        resource_fonts.finish();
        resources.finish();
        page.finish();

        Ok(())
    }
}

impl PageCanvas for Page {
    fn content_box(&self) -> Rect {
        self.content_box
    }

    fn cursor(&self) -> (Pt, Pt) {
        self.cursor
    }

    fn set_cursor(&mut self, at: (Pt, Pt)) {
        self.cursor = at;
    }

    fn draw_glyphs(&mut self, text: &str, at: (Pt, Pt), font: SpanFont, colour: Colour, kerning: bool) {
        self.add_span(SpanLayout {
            text: text.to_string(),
            font,
            colour,
            coords: at,
            kerning,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagesize;

    #[test]
    fn margins_shape_the_content_box() {
        let page = Page::new(pagesize::LETTER, Some(Margins::all(Pt(72.0))));
        assert_eq!(page.content_box.x1, Pt(72.0));
        assert_eq!(page.content_box.y2, Pt(11.0 * 72.0 - 72.0));
        assert_eq!(page.media_box.x2, Pt(8.5 * 72.0));
    }

    #[test]
    fn cursor_starts_at_the_content_top_left() {
        let page = Page::new(pagesize::A4, Some(Margins::symmetric(Pt(36.0), Pt(18.0))));
        assert_eq!(page.cursor(), (page.content_box.x1, page.content_box.y2));
    }
}
