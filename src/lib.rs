//! Generate PDF documents with rich text flowed into boxes.
//!
//! Styled [text::Run]s (built directly or parsed from inline markup) are
//! laid into a [text::TextBox] on a [Page]: lines wrap greedily at spaces,
//! kerning is applied when the font provides it, and text that does not fit
//! the box is truncated, marked with an ellipsis, expanded past the bound,
//! or shrunk to fit, depending on the box's overflow policy. Whatever does
//! not fit is handed back as runs, ready to flow into a box on the next
//! page.
//!
//! ```no_run
//! use pdf_flow::{Document, Font, Margins, Page, Pt, pagesize};
//! use pdf_flow::text::{BoxOptions, Overflow, TextBox};
//!
//! # fn main() -> Result<(), pdf_flow::FlowError> {
//! let mut doc = Document::default();
//! doc.add_font(Font::load(std::fs::read("fonts/NotoSans-Regular.ttf")?)?);
//!
//! let mut text = TextBox::from_markup(
//!     "Some <b>inline styled</b> text, wrapped to the page.",
//!     BoxOptions {
//!         font_family: "Noto Sans".to_string(),
//!         overflow: Overflow::Truncate,
//!         ..BoxOptions::default()
//!     },
//! );
//!
//! let mut page = Page::new(pagesize::A4, Some(Margins::all(Pt(54.0))));
//! let leftover = text.render(&doc, &mut page)?;
//! assert!(leftover.is_empty());
//! doc.add_page(page);
//!
//! doc.write(std::fs::File::create("out.pdf")?)?;
//! # Ok(())
//! # }
//! ```

mod colour;
pub use colour::*;

pub(crate) mod content;

mod document;
pub use document::*;

mod error;
pub use error::*;

mod font;
pub use font::*;

mod info;
pub use info::*;

mod page;
pub use page::*;

/// Standard page sizes and orientation helpers
pub mod pagesize;

mod rect;
pub use rect::*;

pub(crate) mod refs;

/// Rich text flow: runs, wrapping, text boxes, and inline markup
pub mod text;

mod units;
pub use units::*;

/// Re-export PDF-writer functionality, mostly for custom content generation
pub use pdf_writer;
