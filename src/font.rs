use crate::{
    refs::{ObjectReferences, RefType},
    text::FontStyle,
    FlowError, Pt,
};
use owned_ttf_parser::{AsFaceRef, GlyphId, OwnedFace};
use pdf_writer::{
    types::{FontFlags, SystemInfo},
    Finish, Name, Pdf, Ref, Str,
};
use std::collections::HashMap;

/// A parsed TTF or OTF font. Fonts are embedded in their entirety in the
/// generated PDF, so large fonts may dramatically increase the size of the
/// output.
///
/// Alongside embedding, the font answers the measurement queries the layout
/// engine needs: advance widths, kerning pairs, and the vertical metrics that
/// determine line heights.
pub struct Font {
    pub face: OwnedFace,
}

impl Font {
    /// Load a font from raw bytes, returning an error if the face could not
    /// be parsed
    pub fn load(bytes: Vec<u8>) -> Result<Font, FlowError> {
        let face = OwnedFace::from_vec(bytes, 0)?;
        Ok(Font { face })
    }

    /// Obtain the full name of the font. Panics if the font does not have a name
    pub fn name(&self) -> String {
        self.face
            .as_face_ref()
            .names()
            .into_iter()
            .find(|name| name.name_id == owned_ttf_parser::name_id::FULL_NAME && name.is_unicode())
            .and_then(|name| name.to_string())
            .expect("font face has a name")
    }

    /// Obtain the family name of the font. Panics if the font does not have a
    /// font family
    pub fn family(&self) -> String {
        self.face
            .as_face_ref()
            .names()
            .into_iter()
            .find(|name| name.name_id == owned_ttf_parser::name_id::FAMILY && name.is_unicode())
            .and_then(|name| name.to_string())
            .expect("font face has a family")
    }

    /// The style variant this face represents, inferred from its weight and
    /// italic flag. Used to register the face in a [FontCatalog](crate::FontCatalog).
    pub fn style(&self) -> FontStyle {
        let bold = self.face.as_face_ref().weight().to_number() >= 600;
        let italic = self.face.as_face_ref().is_italic();
        match (bold, italic) {
            (false, false) => FontStyle::Regular,
            (true, false) => FontStyle::Bold,
            (false, true) => FontStyle::Italic,
            (true, true) => FontStyle::BoldItalic,
        }
    }

    fn scaling(&self, size: Pt) -> Pt {
        size / Pt(self.face.as_face_ref().units_per_em() as f32)
    }

    /// Calculate the ascent (distance from the baseline to the top of the
    /// font) for the given font size
    pub fn ascent(&self, size: Pt) -> Pt {
        self.scaling(size) * self.face.as_face_ref().ascender() as f32
    }

    /// Calculate the descent (distance from the baseline to the bottom of the
    /// font) for the given font size. Note: this is usually negative
    pub fn descent(&self, size: Pt) -> Pt {
        self.scaling(size) * self.face.as_face_ref().descender() as f32
    }

    /// Calculate the leading (extra space between lines) for the given font size
    pub fn leading(&self, size: Pt) -> Pt {
        self.scaling(size) * self.face.as_face_ref().line_gap() as f32
    }

    /// Calculate the default line height of the font for the given size: how
    /// much to vertically offset a second row of text below a first row.
    pub fn line_height(&self, size: Pt) -> Pt {
        self.leading(size) + self.ascent(size) - self.descent(size)
    }

    pub fn glyph_id(&self, ch: char) -> Option<u16> {
        self.face.as_face_ref().glyph_index(ch).map(|i| i.0)
    }

    /// Look up the glyph for a character, falling back to the font's
    /// replacement glyph (or '?') when absent. Fails when neither exists;
    /// layout treats that as fatal rather than dropping the character.
    pub fn glyph_or_replacement(&self, ch: char) -> Result<GlyphId, FlowError> {
        let face = self.face.as_face_ref();
        face.glyph_index(ch)
            .or_else(|| face.glyph_index('\u{FFFD}'))
            .or_else(|| face.glyph_index('?'))
            .ok_or(FlowError::MissingGlyph(ch))
    }

    /// Measure the advance width of a string at the given size, without
    /// kerning. Newlines measure as zero width.
    pub fn width_of(&self, text: &str, size: Pt) -> Result<Pt, FlowError> {
        let face = self.face.as_face_ref();
        let scaling = self.scaling(size);
        let mut width = Pt(0.0);
        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            let gid = self.glyph_or_replacement(ch)?;
            width += scaling * face.glyph_hor_advance(gid).unwrap_or_default() as f32;
        }
        Ok(width)
    }

    /// The raw kerning adjustment between two characters in font units, from
    /// the font's `kern` table. Negative values tighten the pair.
    pub fn kern_between(&self, left: char, right: char) -> Option<i16> {
        let face = self.face.as_face_ref();
        let kern = face.tables().kern?;
        let l = face.glyph_index(left)?;
        let r = face.glyph_index(right)?;
        kern.subtables
            .into_iter()
            .filter(|st| st.horizontal && !st.variable)
            .find_map(|st| st.glyphs_kerning(l, r))
    }

    /// Kerning adjustments for a string at the given size: for each kerned
    /// pair, the character index of the right-hand glyph and the advance
    /// delta to apply at that position.
    pub fn kerning(&self, text: &str, size: Pt) -> Vec<(usize, Pt)> {
        let scaling = self.scaling(size);
        let mut adjustments = Vec::new();
        let mut prev: Option<char> = None;
        for (i, ch) in text.chars().enumerate() {
            if let Some(p) = prev {
                if let Some(k) = self.kern_between(p, ch) {
                    adjustments.push((i, scaling * k as f32));
                }
            }
            prev = Some(ch);
        }
        adjustments
    }

    fn glyph_ids(&self) -> HashMap<u16, char> {
        let mut map: HashMap<u16, char> = HashMap::new();

        for subtable in self
            .face
            .as_face_ref()
            .tables()
            .cmap
            .expect("font has cmap table")
            .subtables
            .into_iter()
            .filter(|table| table.is_unicode())
        {
            subtable.codepoints(|codepoint: u32| {
                if let Ok(ch) = char::try_from(codepoint) {
                    if let Some(index) = subtable.glyph_index(codepoint).filter(|index| index.0 > 0)
                    {
                        map.entry(index.0).or_insert(ch);
                    }
                }
            });
        }

        map
    }

    /// Advance widths per glyph id, in font units
    fn glyph_widths(&self, ids: &HashMap<u16, char>) -> HashMap<u16, u16> {
        let face = self.face.as_face_ref();
        let mut widths: HashMap<u16, u16> = HashMap::new();
        for (&id, &ch) in ids.iter() {
            if let Some(gid) = face.glyph_index(ch) {
                if let Some(h_advance) = face.glyph_hor_advance(gid) {
                    widths.insert(id, h_advance);
                }
            }
        }
        widths
    }

    fn write_font_data(
        &self,
        refs: &mut ObjectReferences,
        font_index: usize,
        writer: &mut Pdf,
    ) -> Ref {
        let id = refs.gen(RefType::FontData(font_index));
        writer
            .stream(id, self.face.as_slice())
            .pair(Name(b"Length1"), self.face.as_slice().len() as i32);
        id
    }

    fn write_descriptor(
        &self,
        refs: &mut ObjectReferences,
        font_index: usize,
        writer: &mut Pdf,
    ) -> Ref {
        let font_data_stream_id = self.write_font_data(refs, font_index, writer);

        let face = self.face.as_face_ref();
        let scaling = 1000.0 / face.units_per_em() as f32;

        let widths = self.glyph_widths(&self.glyph_ids());
        let max_width = widths.values().copied().max().unwrap_or_default();
        let sum_width: usize = widths.values().map(|&w| w as usize).sum();
        let avg_width = sum_width as f32 / widths.len().max(1) as f32;

        let id = refs.gen(RefType::FontDescriptor(font_index));

        let mut descriptor = writer.font_descriptor(id);
        descriptor.name(Name(self.name().as_bytes()));
        descriptor.family(Str(self.family().as_bytes()));
        descriptor.weight(face.weight().to_number());

        let mut flags: FontFlags = FontFlags::empty();
        if face.is_monospaced() {
            flags.set(FontFlags::FIXED_PITCH, true);
        }
        if face.is_italic() {
            flags.set(FontFlags::ITALIC, true);
        }
        descriptor.flags(flags);

        let bbox = face.global_bounding_box();
        descriptor.bbox(pdf_writer::Rect {
            x1: bbox.x_min as f32 * scaling,
            y1: bbox.y_min as f32 * scaling,
            x2: bbox.x_max as f32 * scaling,
            y2: bbox.y_max as f32 * scaling,
        });
        descriptor.italic_angle(face.italic_angle());
        descriptor.ascent(face.ascender() as f32 * scaling);
        descriptor.descent(face.descender() as f32 * scaling);
        descriptor.leading(face.line_gap() as f32 * scaling);
        descriptor.cap_height(
            face.capital_height()
                .map(|h| h as f32 * scaling)
                .unwrap_or(1000.0),
        );
        descriptor.x_height(
            face.x_height()
                .or_else(|| face.capital_height())
                .unwrap_or_default() as f32
                * scaling,
        );
        descriptor.stem_v(80.0);
        descriptor.avg_width(avg_width * scaling);
        descriptor.max_width(max_width as f32 * scaling);
        descriptor.missing_width(max_width as f32 * scaling);

        descriptor.font_file2(font_data_stream_id);

        id
    }

    fn write_cid(&self, refs: &mut ObjectReferences, font_index: usize, writer: &mut Pdf) -> Ref {
        let font_descriptor_id = self.write_descriptor(refs, font_index, writer);

        let id = refs.gen(RefType::CidFont(font_index));

        let mut cid_font = writer.cid_font(id);
        cid_font.subtype(pdf_writer::types::CidFontType::Type2);
        cid_font.base_font(Name(format!("F{font_index}").as_bytes()));
        cid_font.system_info(SystemInfo {
            registry: Str(b"Adobe"),
            ordering: Str(b"Identity"),
            supplement: 0,
        });
        cid_font.font_descriptor(font_descriptor_id);

        let scaling = 1000.0 / self.face.as_face_ref().units_per_em() as f32;
        let mut id_widths: Vec<(u16, f32)> = self
            .glyph_widths(&self.glyph_ids())
            .into_iter()
            .map(|(id, w)| (id, w as f32 * scaling))
            .collect();
        id_widths.sort_by_key(|&(id, _)| id);

        // write runs of consecutive glyph ids as blocks
        let mut widths = cid_font.widths();
        widths.consecutive(0, [1000.0]);
        let mut block_start: Option<u16> = None;
        let mut block: Vec<f32> = Vec::new();
        for (cid, width) in id_widths.into_iter() {
            match block_start {
                Some(start) if (cid - start) as usize == block.len() => block.push(width),
                Some(start) => {
                    widths.consecutive(start, block.drain(..));
                    block_start = Some(cid);
                    block.push(width);
                }
                None => {
                    block_start = Some(cid);
                    block.push(width);
                }
            }
        }
        if let Some(start) = block_start {
            if !block.is_empty() {
                widths.consecutive(start, block);
            }
        }
        widths.finish();

        cid_font.default_width(1000.0);
        cid_font.cid_to_gid_map_predefined(Name(b"Identity"));

        id
    }

    fn write_to_unicode(
        &self,
        refs: &mut ObjectReferences,
        font_index: usize,
        writer: &mut Pdf,
    ) -> Ref {
        let id = refs.gen(RefType::ToUnicode(font_index));

        let mut map: String = "/CIDInit /ProcSet findresource begin\n\
             12 dict begin\n\
             begincmap\n\
             /CIDSystemInfo\n\
             << /Registry (Adobe)\n\
             /Ordering (UCS) /Supplement 0 >> def\n\
             /CMapName /Adobe-Identity-UCS def\n\
             /CMapType 2 def\n\
             1 begincodespacerange\n\
             <0000> <FFFF>\n\
             endcodespacerange\n"
            .to_string();

        let mut ids: Vec<(u16, char)> = self.glyph_ids().into_iter().collect();
        ids.sort_by_key(|&(id, _)| id);

        // bfchar blocks are capped at 100 entries and share a high byte
        let mut blocks: Vec<Vec<(u16, char)>> = Vec::new();
        for (id, ch) in ids.into_iter() {
            let split = match blocks.last() {
                Some(block) => {
                    let &(first, _) = block.first().expect("blocks are never empty");
                    block.len() >= 100 || (first >> 8) != (id >> 8)
                }
                None => true,
            };
            if split {
                blocks.push(Vec::new());
            }
            blocks.last_mut().expect("just pushed").push((id, ch));
        }

        for block in blocks.into_iter() {
            map.push_str(&format!("{} beginbfchar\n", block.len()));
            for (id, ch) in block.into_iter() {
                let ch: u32 = ch.into();
                map.push_str(&format!("<{id:04x}> <{ch:04x}>\n"));
            }
            map.push_str("endbfchar\n");
        }

        map.push_str("endcmap CMapName currentdict /CMap defineresource pop end end\n");

        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(
            map.as_bytes(),
            miniz_oxide::deflate::CompressionLevel::DefaultCompression as u8,
        );
        let mut stream = writer.stream(id, compressed.as_slice());
        stream.filter(pdf_writer::Filter::FlateDecode);

        id
    }

    pub(crate) fn write(&self, refs: &mut ObjectReferences, font_index: usize, writer: &mut Pdf) {
        let font_id = refs.gen(RefType::Font(font_index));
        let cid_font_id = self.write_cid(refs, font_index, writer);
        let to_unicode_id = self.write_to_unicode(refs, font_index, writer);

        let mut font = writer.type0_font(font_id);
        font.base_font(Name(format!("F{font_index}").as_bytes()));
        font.encoding_predefined(Name(b"Identity-H"));
        font.descendant_font(cid_font_id);
        font.to_unicode(to_unicode_id);
    }
}
