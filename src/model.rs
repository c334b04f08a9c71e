use std::fmt;

/// One highlight read from a clippings export, with its page already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightRecord {
    pub page_number: u64,
    pub highlight_text: String,
    pub note_text: Option<String>,
}

impl HighlightRecord {
    pub fn new(page_number: u64, highlight_text: impl Into<String>) -> Self {
        Self {
            page_number,
            highlight_text: highlight_text.into(),
            note_text: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note_text = Some(note.into());
        self
    }

    /// The note, if there is one worth rendering. Empty notes count as absent.
    pub fn note(&self) -> Option<&str> {
        self.note_text.as_deref().filter(|note| !note.is_empty())
    }
}

/// Which highlights database a run writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Test,
    Production,
}

impl Target {
    pub fn from_test_flag(test: bool) -> Self {
        if test { Target::Test } else { Target::Production }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Target::Test => "test",
            Target::Production => "production",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
