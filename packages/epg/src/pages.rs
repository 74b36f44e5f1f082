//! Page-by-page channel line reader.
//!
//! The PDF is parsed once with [`lopdf`]; [`PdfPages`] then extracts the
//! text of one page per step with [`pdf_extract`], and [`ChannelLines`]
//! splits that page into cleaned channel lines before the next page is
//! touched. Only one page's text is held at a time.

use crate::EpgError;
use crate::filter::clean_line;

/// Lazy iterator over the text of each page of an in-memory PDF.
pub struct PdfPages {
    doc: lopdf::Document,
    page_numbers: std::vec::IntoIter<u32>,
}

impl PdfPages {
    /// Parses the document structure without extracting any text.
    ///
    /// # Errors
    ///
    /// Returns [`EpgError::Extraction`] if the bytes are not a readable PDF.
    pub fn load(pdf: &[u8]) -> Result<Self, EpgError> {
        let doc = lopdf::Document::load_mem(pdf)
            .map_err(|e| EpgError::Extraction(format!("failed to parse PDF: {e}")))?;

        let page_numbers: Vec<u32> = doc.get_pages().into_keys().collect();
        log::debug!("Loaded PDF with {} pages", page_numbers.len());

        Ok(Self {
            doc,
            page_numbers: page_numbers.into_iter(),
        })
    }

    /// Number of pages not yet extracted.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.page_numbers.len()
    }

    fn extract(&self, page_number: u32) -> Result<String, EpgError> {
        let mut text = String::new();
        {
            let mut output = pdf_extract::PlainTextOutput::new(&mut text);
            pdf_extract::output_doc_page(&self.doc, &mut output, page_number).map_err(|e| {
                EpgError::Extraction(format!("failed to extract page {page_number}: {e}"))
            })?;
        }
        Ok(text)
    }
}

impl Iterator for PdfPages {
    type Item = Result<String, EpgError>;

    fn next(&mut self) -> Option<Self::Item> {
        let page_number = self.page_numbers.next()?;
        Some(self.extract(page_number))
    }
}

/// Splits page text on the same boundaries as universal line splitting:
/// `\n`, `\r`, vertical tab, form feed, the file/group/record separators,
/// NEL, and the Unicode line/paragraph separators.
const fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r'
            | '\x0b'
            | '\x0c'
            | '\x1c'
            | '\x1d'
            | '\x1e'
            | '\u{85}'
            | '\u{2028}'
            | '\u{2029}'
    )
}

/// Lazy iterator of channel lines across a sequence of page texts.
///
/// Lines are trimmed; blank lines, page numbers, ripper headers, and
/// banners are skipped. A page error is yielded in place and the pages
/// before it have already been fully emitted.
pub struct ChannelLines<I: Iterator<Item = Result<String, EpgError>>> {
    pages: I,
    current: std::vec::IntoIter<String>,
    page_number: usize,
}

impl<I: Iterator<Item = Result<String, EpgError>>> ChannelLines<I> {
    /// Creates a reader that pulls the next page only once the current
    /// page's lines are exhausted.
    #[must_use]
    pub fn new(pages: impl IntoIterator<Item = Result<String, EpgError>, IntoIter = I>) -> Self {
        Self {
            pages: pages.into_iter(),
            current: Vec::new().into_iter(),
            page_number: 0,
        }
    }
}

impl<I: Iterator<Item = Result<String, EpgError>>> Iterator for ChannelLines<I> {
    type Item = Result<String, EpgError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(line) = self.current.next() {
                return Some(Ok(line));
            }

            let page = match self.pages.next()? {
                Ok(page) => page,
                Err(e) => return Some(Err(e)),
            };
            self.page_number += 1;

            let lines: Vec<String> = page
                .split(is_line_break)
                .filter_map(clean_line)
                .map(str::to_owned)
                .collect();

            log::trace!("Page {}: {} channel lines", self.page_number, lines.len());

            self.current = lines.into_iter();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use lopdf::content::{Content, Operation};
    use lopdf::{Dictionary, Document, Object, Stream};

    fn lines(pages: &[&str]) -> Vec<String> {
        ChannelLines::new(pages.iter().map(|p| Ok((*p).to_owned())))
            .map(Result::unwrap)
            .collect()
    }

    /// Builds a PDF with one Helvetica text line per page.
    fn sample_pdf(page_texts: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", "Font".into()),
            ("Subtype", "Type1".into()),
            ("BaseFont", "Helvetica".into()),
        ]));
        let resources_id = doc.add_object(Dictionary::from_iter(vec![(
            "Font",
            Dictionary::from_iter(vec![("F1", font_id.into())]).into(),
        )]));

        let mut kids: Vec<Object> = Vec::new();
        for text in page_texts {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![100.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));
            let page_id = doc.add_object(Dictionary::from_iter(vec![
                ("Type", "Page".into()),
                ("Parent", pages_id.into()),
                ("Contents", content_id.into()),
                ("Resources", resources_id.into()),
                (
                    "MediaBox",
                    vec![0.into(), 0.into(), 595.into(), 842.into()].into(),
                ),
            ]));
            kids.push(page_id.into());
        }

        let count = i64::try_from(kids.len()).unwrap();
        let pages = Dictionary::from_iter(vec![
            ("Type", "Pages".into()),
            ("Kids", kids.into()),
            ("Count", count.into()),
        ]);
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", "Catalog".into()),
            ("Pages", pages_id.into()),
        ]));
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn yields_channels_across_pages_in_order() {
        let result = lines(&[
            "-- epg_ripper_UK1 --\nBBC One.uk\n  BBC Two.uk  \n1\n",
            "2\n-- Sports --\nCNN.us\r\nFrance 2.fr\x0c",
        ]);

        assert_eq!(
            result,
            vec!["BBC One.uk", "BBC Two.uk", "CNN.us", "France 2.fr"]
        );
    }

    #[test]
    fn skips_pages_without_channels() {
        let result = lines(&["", "17\n\n", "Rai 1.it"]);
        assert_eq!(result, vec!["Rai 1.it"]);
    }

    #[test]
    fn keeps_duplicates_for_the_assigner() {
        let result = lines(&["A.uk\nA.uk", "A.uk"]);
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn empty_document_yields_nothing() {
        assert!(lines(&[]).is_empty());
    }

    #[test]
    fn pulls_next_page_only_after_current_page_is_drained() {
        let pulled = Cell::new(0);
        let pages = ["A.uk\nB.uk", "C.us"].into_iter().map(|p| {
            pulled.set(pulled.get() + 1);
            Ok(p.to_owned())
        });
        let mut reader = ChannelLines::new(pages);

        assert_eq!(reader.next().unwrap().unwrap(), "A.uk");
        assert_eq!(pulled.get(), 1);
        assert_eq!(reader.next().unwrap().unwrap(), "B.uk");
        assert_eq!(pulled.get(), 1);
        assert_eq!(reader.next().unwrap().unwrap(), "C.us");
        assert_eq!(pulled.get(), 2);
        assert!(reader.next().is_none());
    }

    #[test]
    fn page_error_follows_earlier_pages_lines() {
        let pages = vec![
            Ok("A.uk".to_owned()),
            Err(EpgError::Extraction("page 2 is broken".to_owned())),
        ];
        let mut reader = ChannelLines::new(pages);

        assert_eq!(reader.next().unwrap().unwrap(), "A.uk");
        assert!(matches!(reader.next(), Some(Err(EpgError::Extraction(_)))));
    }

    #[test]
    fn garbage_bytes_fail_to_load() {
        let result = PdfPages::load(b"definitely not a pdf");
        assert!(matches!(result, Err(EpgError::Extraction(_))));
    }

    #[test]
    fn extracts_one_page_per_step() {
        let pdf = sample_pdf(&["BBC One.uk", "CNN.us"]);
        let mut pages = PdfPages::load(&pdf).unwrap();
        assert_eq!(pages.remaining(), 2);

        let first = pages.next().unwrap().unwrap();
        assert!(first.contains("BBC One.uk"));
        assert_eq!(pages.remaining(), 1);

        let second = pages.next().unwrap().unwrap();
        assert!(second.contains("CNN.us"));
        assert!(pages.next().is_none());
    }
}
