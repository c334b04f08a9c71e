use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while turning a clippings CSV into highlight records.
///
/// All of these are fatal for a run: nothing is published when the input
/// cannot be read.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("csv file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("csv header is missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("failed to read csv file")]
    Io(#[from] std::io::Error),

    #[error("malformed csv")]
    Csv(#[from] csv::Error),
}

/// Errors returned by the Notion store.
#[derive(Debug, Error)]
pub enum NotionError {
    /// The store answered 401. Nothing else will work with this token.
    #[error("notion rejected the access token: {0}")]
    Unauthorized(String),

    #[error("notion api error {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("notion request failed")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected notion response: {0}")]
    Decode(String),

    #[error("access token cannot be sent as a header")]
    InvalidCredential,
}

impl NotionError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, NotionError::Unauthorized(_))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file")]
    Parse(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_error_messages() {
        let err = ImportError::NotFound(PathBuf::from("books/missing.csv"));
        assert_eq!(err.to_string(), "csv file not found: books/missing.csv");

        let err = ImportError::MissingColumn("highlight_text");
        assert_eq!(
            err.to_string(),
            "csv header is missing required column 'highlight_text'"
        );
    }

    #[test]
    fn test_unauthorized_detection() {
        assert!(NotionError::Unauthorized("API token is invalid.".into()).is_unauthorized());
        assert!(!NotionError::Decode("bad".into()).is_unauthorized());
    }
}
