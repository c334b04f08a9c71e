use std::error::Error;

pub mod clippings;
pub mod config;
pub mod document;
pub mod error;
pub mod import;
pub mod model;
pub mod notion;
pub mod prompt;
pub mod publisher;
pub mod resolver;

pub fn unpack_error(err: &(dyn Error)) -> String {
    let mut parts = Vec::new();
    parts.push(err.to_string());
    let mut current = err.source();
    while let Some(source) = current {
        parts.push(source.to_string());
        current = source.source();
    }
    parts.join(": ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[test]
    fn test_unpack_error_joins_source_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ConfigError::Read {
            path: "cfg.yaml".into(),
            source: io,
        };
        assert_eq!(
            unpack_error(&err),
            "failed to read config file cfg.yaml: denied"
        );
    }
}
