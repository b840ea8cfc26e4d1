use crate::text::FontStyle;
use crate::units::Pt;
use crate::FlowError;

/// An opaque handle to a concrete font face held by a metrics provider.
/// For [Document](crate::Document) this is the index of the font within its
/// font arena, which is also how pages name font resources (`/F0`, `/F1`, …).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FontKey(pub usize);

/// Pure measurement queries over a set of registered fonts.
///
/// The layout engine invokes these arbitrarily often — during dry runs,
/// rollback retries, and `shrink_to_fit` restarts — so implementations must
/// be side-effect free. [Document](crate::Document) implements this over its
/// font arena and catalog; tests substitute fixed-width fakes.
pub trait MetricsProvider {
    /// Resolve a font family and style variant to a concrete font
    fn resolve(&self, family: &str, style: FontStyle) -> Result<FontKey, FlowError>;

    /// The advance width of `text` at `size`, without kerning. Fails if a
    /// glyph is absent and the font has no replacement; layout treats that as
    /// fatal rather than dropping characters.
    fn width_of(&self, font: FontKey, size: Pt, text: &str) -> Result<Pt, FlowError>;

    /// Kerning adjustments for `text` at `size`: for each kerned pair, the
    /// character index of the right-hand glyph and the advance delta
    /// (negative tightens). Only consulted when kerning is requested.
    fn kerning_pairs(&self, font: FontKey, size: Pt, text: &str) -> Vec<(usize, Pt)>;

    /// Distance from the baseline to the top of the font
    fn ascender(&self, font: FontKey, size: Pt) -> Pt;

    /// Distance from the baseline to the bottom of the font; negative by
    /// font convention
    fn descender(&self, font: FontKey, size: Pt) -> Pt;

    /// The default vertical offset between successive baselines
    fn line_height(&self, font: FontKey, size: Pt) -> Pt;
}

/// Measure `text`, including kerning adjustments when `kerning` is set
pub(crate) fn measured_width<M: MetricsProvider>(
    metrics: &M,
    font: FontKey,
    size: Pt,
    text: &str,
    kerning: bool,
) -> Result<Pt, FlowError> {
    let mut width = metrics.width_of(font, size, text)?;
    if kerning {
        for (_, adjustment) in metrics.kerning_pairs(font, size, text) {
            width += adjustment;
        }
    }
    Ok(width)
}
