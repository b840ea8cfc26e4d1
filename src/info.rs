use chrono::prelude::*;
use pdf_writer::{Date, Pdf, TextStr};

use crate::refs::{ObjectReferences, RefType};

/// Metadata for the PDF information dictionary. Built by chaining, then
/// attached with [Document::set_info](crate::Document::set_info); fields left
/// unset are omitted from the dictionary.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Info {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    /// Conventionally a comma-separated list
    pub keywords: Option<String>,
}

impl Info {
    pub fn new() -> Info {
        Info::default()
    }

    pub fn title<S: ToString>(self, title: S) -> Info {
        Info {
            title: Some(title.to_string()),
            ..self
        }
    }

    pub fn author<S: ToString>(self, author: S) -> Info {
        Info {
            author: Some(author.to_string()),
            ..self
        }
    }

    pub fn subject<S: ToString>(self, subject: S) -> Info {
        Info {
            subject: Some(subject.to_string()),
            ..self
        }
    }

    pub fn keywords<S: ToString>(self, keywords: S) -> Info {
        Info {
            keywords: Some(keywords.to_string()),
            ..self
        }
    }

    pub(crate) fn write(&self, refs: &mut ObjectReferences, writer: &mut Pdf) {
        let id = refs.gen(RefType::Info);
        let mut info = writer.document_info(id);

        if let Some(title) = self.title.as_deref() {
            info.title(TextStr(title));
        }
        if let Some(author) = self.author.as_deref() {
            info.author(TextStr(author));
        }
        if let Some(subject) = self.subject.as_deref() {
            info.subject(TextStr(subject));
        }
        if let Some(keywords) = self.keywords.as_deref() {
            info.keywords(TextStr(keywords));
        }
        info.creator(TextStr(concat!(
            env!("CARGO_PKG_NAME"),
            " v",
            env!("CARGO_PKG_VERSION")
        )));
        info.creation_date(local_pdf_date(Local::now()));
    }
}

/// Express a local timestamp as a PDF date with its UTC offset
fn local_pdf_date(now: DateTime<Local>) -> Date {
    let offset_minutes = now.offset().fix().local_minus_utc() / 60;
    Date::new(now.year() as u16)
        .month(now.month() as u8)
        .day(now.day() as u8)
        .hour(now.hour() as u8)
        .minute(now.minute() as u8)
        .second(now.second() as u8)
        .utc_offset_hour((offset_minutes / 60) as i8)
        .utc_offset_minute((offset_minutes % 60).unsigned_abs() as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chaining_fills_only_the_named_fields() {
        let info = Info::new().title("Flow Report").keywords("layout, text");
        assert_eq!(info.title.as_deref(), Some("Flow Report"));
        assert_eq!(info.keywords.as_deref(), Some("layout, text"));
        assert_eq!(info.author, None);
        assert_eq!(info.subject, None);
    }
}
