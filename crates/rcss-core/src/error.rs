//! Error types
//!
//! Parsing itself never fails; it reports through diagnostics and rule
//! counts. These errors cover the edges around it: opening sources and
//! validating configuration.

/// Errors raised outside the parse loop
#[derive(Debug, thiserror::Error)]
pub enum CssError {
    #[error("Failed to read stylesheet source '{source_name}': {source}")]
    Io {
        source_name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid parser configuration: {0}")]
    InvalidConfig(String),
}

impl CssError {
    pub(crate) fn io(source_name: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            source_name: source_name.into(),
            source,
        }
    }
}
