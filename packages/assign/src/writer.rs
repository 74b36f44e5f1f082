//! Streaming JSON writer for grouped ID tables.
//!
//! Writes the two-level document entry by entry so nothing but the current
//! group's bookkeeping is held in memory. The layout is fixed:
//!
//! ```text
//! {
//!   "uk": {
//!     "BBC One.uk": 1,
//!     "BBC Two.uk": 2
//!   },
//!   "us": {
//!     "CNN.us": 3
//!   }
//! }
//! ```

use std::io::Write;

use crate::{AssignError, GroupSink};

/// A [`GroupSink`] that serializes straight to a writer.
///
/// Keys and tokens are JSON-escaped; IDs are written as bare integers.
#[derive(Debug)]
pub struct JsonGroupWriter<W: Write> {
    out: W,
    any_group: bool,
    group_open: bool,
    any_entry: bool,
    finished: bool,
}

impl<W: Write> JsonGroupWriter<W> {
    /// Starts a document on `out` by writing the opening brace.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the opening brace cannot be written.
    pub fn new(mut out: W) -> Result<Self, AssignError> {
        out.write_all(b"{\n")?;
        Ok(Self {
            out,
            any_group: false,
            group_open: false,
            any_entry: false,
            finished: false,
        })
    }

    fn ensure_not_finished(&self) -> Result<(), AssignError> {
        if self.finished {
            return Err(AssignError::UnbalancedGroup(
                "document already finished".to_owned(),
            ));
        }
        Ok(())
    }
}

impl<W: Write> GroupSink for JsonGroupWriter<W> {
    fn open_group(&mut self, key: &str) -> Result<(), AssignError> {
        self.ensure_not_finished()?;
        if self.group_open {
            return Err(AssignError::UnbalancedGroup(format!(
                "cannot open \"{key}\" while another group is open"
            )));
        }

        if self.any_group {
            self.out.write_all(b",\n")?;
        }
        self.out.write_all(b"  ")?;
        serde_json::to_writer(&mut self.out, key)?;
        self.out.write_all(b": {\n")?;

        self.any_group = true;
        self.group_open = true;
        self.any_entry = false;
        Ok(())
    }

    fn entry(&mut self, token: &str, id: u64) -> Result<(), AssignError> {
        if !self.group_open {
            return Err(AssignError::UnbalancedGroup(format!(
                "entry \"{token}\" written outside a group"
            )));
        }

        if self.any_entry {
            self.out.write_all(b",\n")?;
        }
        self.out.write_all(b"    ")?;
        serde_json::to_writer(&mut self.out, token)?;
        write!(self.out, ": {id}")?;

        self.any_entry = true;
        Ok(())
    }

    fn close_group(&mut self) -> Result<(), AssignError> {
        if !self.group_open {
            return Err(AssignError::UnbalancedGroup(
                "close without an open group".to_owned(),
            ));
        }

        self.out.write_all(b"\n  }")?;
        self.group_open = false;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), AssignError> {
        self.ensure_not_finished()?;
        if self.group_open {
            return Err(AssignError::UnbalancedGroup(
                "document finished with a group still open".to_owned(),
            ));
        }

        if self.any_group {
            self.out.write_all(b"\n")?;
        }
        self.out.write_all(b"}\n")?;
        self.out.flush()?;

        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(build: impl FnOnce(&mut JsonGroupWriter<&mut Vec<u8>>)) -> String {
        let mut buf = Vec::new();
        let mut writer = JsonGroupWriter::new(&mut buf).unwrap();
        build(&mut writer);
        writer.finish().unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn writes_nested_layout() {
        let text = render(|w| {
            w.open_group("uk").unwrap();
            w.entry("BBC One.uk", 1).unwrap();
            w.entry("BBC Two.uk", 2).unwrap();
            w.close_group().unwrap();
            w.open_group("us").unwrap();
            w.entry("CNN.us", 3).unwrap();
            w.close_group().unwrap();
        });

        assert_eq!(
            text,
            "{\n  \"uk\": {\n    \"BBC One.uk\": 1,\n    \"BBC Two.uk\": 2\n  },\n  \"us\": {\n    \"CNN.us\": 3\n  }\n}\n"
        );

        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            parsed,
            serde_json::json!({
                "uk": { "BBC One.uk": 1, "BBC Two.uk": 2 },
                "us": { "CNN.us": 3 },
            })
        );
    }

    #[test]
    fn escapes_quotes_and_backslashes() {
        let text = render(|w| {
            w.open_group("x").unwrap();
            w.entry("Say \"Hi\" \\ TV.x", 1).unwrap();
            w.close_group().unwrap();
        });

        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["x"]["Say \"Hi\" \\ TV.x"], 1);
    }

    #[test]
    fn empty_group_is_valid_json() {
        let text = render(|w| {
            w.open_group("empty").unwrap();
            w.close_group().unwrap();
        });

        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, serde_json::json!({ "empty": {} }));
    }

    #[test]
    fn rejects_unbalanced_calls() {
        let mut buf = Vec::new();
        let mut writer = JsonGroupWriter::new(&mut buf).unwrap();

        assert!(matches!(
            writer.entry("orphan", 1),
            Err(AssignError::UnbalancedGroup(_))
        ));
        assert!(matches!(
            writer.close_group(),
            Err(AssignError::UnbalancedGroup(_))
        ));

        writer.open_group("a").unwrap();
        assert!(matches!(
            writer.open_group("b"),
            Err(AssignError::UnbalancedGroup(_))
        ));
        assert!(matches!(
            writer.finish(),
            Err(AssignError::UnbalancedGroup(_))
        ));

        writer.close_group().unwrap();
        writer.finish().unwrap();
        assert!(matches!(
            writer.finish(),
            Err(AssignError::UnbalancedGroup(_))
        ));
    }
}
