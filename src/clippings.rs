//! Clippings CSV Reader
//!
//! Reads highlight exports produced by e-reader "clippings" tools and turns each
//! row into a [`HighlightRecord`] with a definite page number.
//!
//! Some exports leave the page column blank (or fill it with locations such as
//! `loc 1203`). Those rows get a synthetic page number that continues from the
//! last real page seen, so a run of unnumbered highlights stays in reading order:
//!
//! | page    | emitted |
//! |---------|---------|
//! | `5`     | 5       |
//! |         | 6       |
//! |         | 7       |
//! | `10`    | 10      |
//!
//! # Usage
//!
//! ```rust,ignore
//! use clippings::clippings::ClippingsFile;
//!
//! let file = ClippingsFile::open("books/the_art_of_communicating.csv")?;
//! for record in file.records()? {
//!     let record = record?;
//!     println!("p.{} {}", record.page_number, record.highlight_text);
//! }
//! ```

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter};

use crate::error::ImportError;
use crate::model::HighlightRecord;

pub const PAGE_COLUMN: &str = "page";
pub const HIGHLIGHT_COLUMN: &str = "highlight_text";
pub const NOTE_COLUMN: &str = "note_text";

/// Forward-only page counter for one pass over one file.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PageCarry {
    last_page_number: u64,
}

impl PageCarry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(last_page_number: u64) -> Self {
        Self { last_page_number }
    }

    pub fn last_page_number(&self) -> u64 {
        self.last_page_number
    }

    /// Resolves the page for the next row and advances the carry.
    pub fn next_page(&mut self, raw_page: &str) -> u64 {
        let continued = self.last_page_number.saturating_add(1);
        self.last_page_number = if is_page_number(raw_page) {
            raw_page.parse::<u64>().unwrap_or_else(|_| {
                tracing::warn!(
                    page = raw_page,
                    used = continued,
                    "page number out of range, continuing from the previous page"
                );
                continued
            })
        } else {
            continued
        };
        self.last_page_number
    }
}

/// Only ASCII digits count, so Unicode decimal digits such as `٣` fall back
/// to the carry along with signs, decimals and whitespace.
fn is_page_number(raw: &str) -> bool {
    !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit())
}

#[derive(Debug, Clone, Copy)]
struct Columns {
    page: usize,
    highlight: usize,
    note: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self, ImportError> {
        let position = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
        };

        Ok(Self {
            page: position(PAGE_COLUMN).ok_or(ImportError::MissingColumn(PAGE_COLUMN))?,
            highlight: position(HIGHLIGHT_COLUMN)
                .ok_or(ImportError::MissingColumn(HIGHLIGHT_COLUMN))?,
            note: position(NOTE_COLUMN),
        })
    }

    fn to_record(self, row: &StringRecord, carry: &mut PageCarry) -> HighlightRecord {
        let page_number = carry.next_page(row.get(self.page).unwrap_or(""));
        let note_text = self
            .note
            .and_then(|idx| row.get(idx))
            .filter(|note| !note.is_empty())
            .map(str::to_string);

        HighlightRecord {
            page_number,
            highlight_text: row.get(self.highlight).unwrap_or("").to_string(),
            note_text,
        }
    }
}

/// Iterator over the highlights of one clippings export, in file order.
pub struct HighlightRecords<R> {
    rows: Option<StringRecordsIntoIter<R>>,
    columns: Option<Columns>,
    carry: PageCarry,
}

impl<R: Read> Iterator for HighlightRecords<R> {
    type Item = Result<HighlightRecord, ImportError>;

    fn next(&mut self) -> Option<Self::Item> {
        let columns = self.columns?;
        let row = match self.rows.as_mut()?.next()? {
            Ok(row) => row,
            Err(e) => {
                self.rows = None;
                return Some(Err(e.into()));
            }
        };
        Some(Ok(columns.to_record(&row, &mut self.carry)))
    }
}

/// Reads highlights from any CSV source. The header is validated up front; an
/// input with no header at all yields no records.
pub fn read_highlights<R: Read>(reader: R) -> Result<HighlightRecords<R>, ImportError> {
    let mut csv = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = csv.headers()?.clone();

    if headers.is_empty() {
        return Ok(HighlightRecords {
            rows: None,
            columns: None,
            carry: PageCarry::new(),
        });
    }

    let columns = Columns::from_headers(&headers)?;
    Ok(HighlightRecords {
        rows: Some(csv.into_records()),
        columns: Some(columns),
        carry: PageCarry::new(),
    })
}

/// A clippings export on disk. Every call to [`ClippingsFile::records`] starts a
/// fresh pass with its own page carry.
#[derive(Debug, Clone)]
pub struct ClippingsFile {
    path: PathBuf,
}

impl ClippingsFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ImportError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ImportError::NotFound(path.to_path_buf()));
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> Result<HighlightRecords<File>, ImportError> {
        let file = File::open(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ImportError::NotFound(self.path.clone()),
            _ => ImportError::Io(e),
        })?;
        read_highlights(file)
    }

    pub fn load(&self) -> Result<Vec<HighlightRecord>, ImportError> {
        self.records()?.collect()
    }
}

/// Reads the whole export at `path`.
pub fn load_highlights(path: impl AsRef<Path>) -> Result<Vec<HighlightRecord>, ImportError> {
    let file = ClippingsFile::open(path)?;
    let records = file.load()?;
    tracing::debug!(path = %file.path().display(), count = records.len(), "parsed clippings");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn pages(csv: &str) -> Vec<u64> {
        read_highlights(csv.as_bytes())
            .unwrap()
            .map(|r| r.unwrap().page_number)
            .collect()
    }

    #[test]
    fn test_blank_pages_continue_from_last_known() {
        let csv = "page,highlight_text,note_text\n5,a,\n,b,\n,c,\n10,d,\n";
        assert_eq!(pages(csv), vec![5, 6, 7, 10]);
    }

    #[test]
    fn test_leading_blank_pages_start_at_one() {
        let csv = "page,highlight_text\n,a\n,b\n,c\n";
        assert_eq!(pages(csv), vec![1, 2, 3]);
    }

    #[test]
    fn test_non_digit_pages_use_carry() {
        let csv = "page,highlight_text\n12,a\n-3,b\n4.5,c\nloc 90,d\n 7,e\n2,f\n";
        assert_eq!(pages(csv), vec![12, 13, 14, 15, 16, 2]);
    }

    #[test]
    fn test_explicit_page_can_move_backwards() {
        let csv = "page,highlight_text\n40,a\n,b\n3,c\n,d\n";
        assert_eq!(pages(csv), vec![40, 41, 3, 4]);
    }

    #[test]
    fn test_large_page_is_kept_as_written() {
        let csv = "page,highlight_text\n8,a\n4294967296,b\n,c\n";
        assert_eq!(pages(csv), vec![8, 4_294_967_296, 4_294_967_297]);
    }

    #[test]
    fn test_page_beyond_u64_continues_from_carry() {
        let csv = "page,highlight_text\n8,a\n99999999999999999999999,b\n";
        assert_eq!(pages(csv), vec![8, 9]);
    }

    #[test]
    fn test_unicode_digits_use_carry() {
        let csv = "page,highlight_text\n8,a\n\u{663},b\n";
        assert_eq!(pages(csv), vec![8, 9]);
    }

    #[test]
    fn test_page_carry_tracks_last_value() {
        let mut carry = PageCarry::starting_at(20);
        assert_eq!(carry.next_page(""), 21);
        assert_eq!(carry.last_page_number(), 21);
        assert_eq!(carry.next_page("7"), 7);
        assert_eq!(carry.last_page_number(), 7);
    }

    #[test]
    fn test_notes_absent_when_missing_or_empty() {
        let csv = "page,highlight_text,note_text\n1,a,\n2,b,my note\n3,c\n";
        let records: Vec<_> = read_highlights(csv.as_bytes())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(records[0].note_text, None);
        assert_eq!(records[1].note_text.as_deref(), Some("my note"));
        assert_eq!(records[2].note_text, None);
    }

    #[test]
    fn test_note_column_is_optional() {
        let csv = "highlight_text,page\n\"quoted, with comma\",4\n";
        let records: Vec<_> = read_highlights(csv.as_bytes())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(
            records,
            vec![HighlightRecord::new(4, "quoted, with comma")]
        );
    }

    #[test]
    fn test_missing_required_column() {
        let err = read_highlights("page,text\n1,a\n".as_bytes()).err().unwrap();
        assert!(matches!(err, ImportError::MissingColumn("highlight_text")));

        let err = read_highlights("highlight_text\na\n".as_bytes()).err().unwrap();
        assert!(matches!(err, ImportError::MissingColumn("page")));
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        assert!(pages("").is_empty());
        assert!(pages("page,highlight_text,note_text\n").is_empty());
    }

    #[test]
    fn test_missing_file() {
        let err = load_highlights("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, ImportError::NotFound(_)));
    }

    #[test]
    fn test_file_records_restart_from_scratch() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(tmp, "page,highlight_text\n,a\n,b\n").unwrap();

        let file = ClippingsFile::open(tmp.path()).unwrap();
        let first: Vec<u64> = file.load().unwrap().iter().map(|r| r.page_number).collect();
        let second: Vec<u64> = file.load().unwrap().iter().map(|r| r.page_number).collect();

        assert_eq!(first, vec![1, 2]);
        assert_eq!(second, vec![1, 2]);
    }
}
