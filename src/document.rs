use std::collections::HashMap;
use std::io::Write;

use id_arena::{Arena, Id};
use pdf_writer::{Pdf, Ref};

use crate::font::Font;
use crate::info::Info;
use crate::page::Page;
use crate::refs::{ObjectReferences, RefType};
use crate::text::{FontKey, FontStyle, MetricsProvider};
use crate::units::Pt;
use crate::FlowError;

/// Maps (family, style) pairs to font keys so styled runs can name fonts
/// symbolically. A missing styled variant falls back to the family's regular
/// face before giving up.
#[derive(Default)]
pub struct FontCatalog {
    entries: HashMap<(String, FontStyle), FontKey>,
}

impl FontCatalog {
    pub fn register<S: ToString>(&mut self, family: S, style: FontStyle, key: FontKey) {
        self.entries.insert((family.to_string(), style), key);
    }

    pub fn resolve(&self, family: &str, style: FontStyle) -> Option<FontKey> {
        self.entries
            .get(&(family.to_string(), style))
            .or_else(|| self.entries.get(&(family.to_string(), FontStyle::Regular)))
            .copied()
    }
}

/// The top-level container: pages, fonts, and document metadata, written out
/// as a PDF with [Document::write].
#[derive(Default)]
pub struct Document {
    pub info: Option<Info>,
    pub pages: Arena<Page>,
    pub page_order: Vec<Id<Page>>,
    pub fonts: Arena<Font>,
    catalog: FontCatalog,
}

impl Document {
    /// Sets information about the document. If not provided, no information
    /// block will be written to the PDF.
    pub fn set_info(&mut self, info: Info) {
        self.info = Some(info);
    }

    /// Add a page to the end of the document, returning its id
    pub fn add_page(&mut self, page: Page) -> Id<Page> {
        let id = self.pages.alloc(page);
        self.page_order.push(id);
        id
    }

    /// Add a page before the page identified by `next`; if `next` is not in
    /// the document the page goes at the end
    pub fn insert_page_before_id(&mut self, page: Page, next: Id<Page>) -> Id<Page> {
        let id = self.pages.alloc(page);
        match self.index_of_page(next) {
            Some(index) => self.page_order.insert(index, id),
            None => self.page_order.push(id),
        }
        id
    }

    /// Add a page after the page identified by `previous`; if `previous` is
    /// not in the document the page goes at the end
    pub fn insert_page_after_id(&mut self, page: Page, previous: Id<Page>) -> Id<Page> {
        let id = self.pages.alloc(page);
        match self.index_of_page(previous) {
            Some(index) => self.page_order.insert(index + 1, id),
            None => self.page_order.push(id),
        }
        id
    }

    /// The 0-based position of a page in the document. Reordering pages
    /// invalidates previously returned indices.
    pub fn index_of_page(&self, page: Id<Page>) -> Option<usize> {
        self.page_order.iter().position(|p| *p == page)
    }

    pub fn id_of_page_index(&self, page_index: usize) -> Option<Id<Page>> {
        self.page_order.get(page_index).copied()
    }

    /// Add a font to the document, registering it in the catalog under the
    /// family and style the face reports about itself. The returned key is
    /// valid as long as fonts are never removed or reordered.
    pub fn add_font(&mut self, font: Font) -> FontKey {
        let family = font.family();
        let style = font.style();
        let id = self.fonts.alloc(font);
        let key = FontKey(id.index());
        self.catalog.register(family, style, key);
        key
    }

    /// Add a font under an explicit family and style instead of the ones the
    /// face reports, e.g. to alias a face as `"monospace"`
    pub fn add_font_as<S: ToString>(&mut self, font: Font, family: S, style: FontStyle) -> FontKey {
        let id = self.fonts.alloc(font);
        let key = FontKey(id.index());
        self.catalog.register(family, style, key);
        key
    }

    pub fn font(&self, key: FontKey) -> Option<&Font> {
        self.fonts
            .iter()
            .find(|(id, _)| id.index() == key.0)
            .map(|(_, font)| font)
    }

    fn font_or_err(&self, key: FontKey) -> Result<&Font, FlowError> {
        self.font(key).ok_or(FlowError::UnknownFont {
            family: format!("#{}", key.0),
            style: FontStyle::Regular,
        })
    }

    /// Write the entire document to the writer. The whole document is
    /// rendered in memory first; object references are only resolved here,
    /// so pages and fonts can be added and reordered freely up to this
    /// point.
    pub fn write<W: Write>(self, mut w: W) -> Result<(), FlowError> {
        let Document {
            info,
            pages,
            page_order,
            fonts,
            catalog: _,
        } = self;

        let mut refs = ObjectReferences::new();
        let catalog_id = refs.gen(RefType::Catalog);
        let page_tree_id = refs.gen(RefType::PageTree);

        let mut writer = Pdf::new();
        if let Some(info) = info {
            info.write(&mut refs, &mut writer);
        }

        // page refs are keyed by document position, not arena index
        let page_refs: Vec<Ref> = page_order
            .iter()
            .enumerate()
            .map(|(i, _)| refs.gen(RefType::Page(i)))
            .collect();
        writer
            .pages(page_tree_id)
            .count(page_refs.len() as i32)
            .kids(page_refs);

        for (id, font) in fonts.iter() {
            font.write(&mut refs, id.index(), &mut writer);
        }

        for (page_index, id) in page_order.iter().enumerate() {
            let page = pages.get(*id).ok_or(FlowError::PageMissing)?;
            page.write(&mut refs, page_index, &fonts, &mut writer)?;
        }

        writer.catalog(catalog_id).pages(page_tree_id);

        w.write_all(writer.finish().as_slice()).map_err(Into::into)
    }
}

impl MetricsProvider for Document {
    fn resolve(&self, family: &str, style: FontStyle) -> Result<FontKey, FlowError> {
        self.catalog
            .resolve(family, style)
            .ok_or_else(|| FlowError::UnknownFont {
                family: family.to_string(),
                style,
            })
    }

    fn width_of(&self, font: FontKey, size: Pt, text: &str) -> Result<Pt, FlowError> {
        self.font_or_err(font)?.width_of(text, size)
    }

    fn kerning_pairs(&self, font: FontKey, size: Pt, text: &str) -> Vec<(usize, Pt)> {
        match self.font(font) {
            Some(font) => font.kerning(text, size),
            None => Vec::new(),
        }
    }

    fn ascender(&self, font: FontKey, size: Pt) -> Pt {
        self.font(font).map(|f| f.ascent(size)).unwrap_or(Pt(0.0))
    }

    fn descender(&self, font: FontKey, size: Pt) -> Pt {
        self.font(font).map(|f| f.descent(size)).unwrap_or(Pt(0.0))
    }

    fn line_height(&self, font: FontKey, size: Pt) -> Pt {
        self.font(font).map(|f| f.line_height(size)).unwrap_or(Pt(0.0))
    }
}
