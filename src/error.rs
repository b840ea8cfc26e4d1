use crate::text::FontStyle;
use crate::units::Pt;
use thiserror::Error;

/// All errors that the crate can generate
#[derive(Error, Debug)]
pub enum FlowError {
    #[error(transparent)]
    /// An I/O error occurred
    Io(#[from] std::io::Error),

    #[error(transparent)]
    /// [owned_ttf_parser] failed to parse the font
    FaceParsing(#[from] owned_ttf_parser::FaceParsingError),

    /// A text box was configured with a non-positive width or height
    #[error("invalid layout: box dimensions must be positive, got {width} x {height}")]
    InvalidDimensions { width: Pt, height: Pt },

    /// An overflow mode string didn't name one of the recognized policies
    #[error("unknown overflow mode {0:?}")]
    UnknownOverflow(String),

    /// No font is registered for the requested family and style combination
    #[error("no font registered for family {family:?} in style {style:?}")]
    UnknownFont { family: String, style: FontStyle },

    /// A glyph was absent from the active font and the font carries no
    /// replacement glyph. Layout never silently drops characters.
    #[error("font has no glyph (or replacement glyph) for {0:?}")]
    MissingGlyph(char),

    /// A page referenced by the document's page order was missing
    #[error("page missing from document")]
    PageMissing,
}
