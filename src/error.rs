// src/error.rs

/// Everything that can fail a single refresh tick.
#[derive(Debug, thiserror::Error)]
pub enum DashError {
    #[error("fetching {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("malformed tabular text: {message}")]
    Format { message: String },

    #[error("ambiguous column '{column}': several raw headers trim to the same name")]
    Schema { column: String },

    #[error("table has no data rows")]
    EmptyTable,

    #[error("tracked column '{column}' is missing from the table")]
    MissingColumn { column: String },
}

impl DashError {
    pub fn format(message: impl Into<String>) -> Self {
        DashError::Format {
            message: message.into(),
        }
    }

    /// Stable code for logs and API error bodies.
    pub fn error_code(&self) -> &'static str {
        match self {
            DashError::Transport { .. } => "TRANSPORT_ERROR",
            DashError::Format { .. } => "FORMAT_ERROR",
            DashError::Schema { .. } => "SCHEMA_ERROR",
            DashError::EmptyTable => "EMPTY_TABLE",
            DashError::MissingColumn { .. } => "MISSING_COLUMN",
        }
    }
}

impl From<csv::Error> for DashError {
    fn from(err: csv::Error) -> Self {
        DashError::format(err.to_string())
    }
}

pub type DashResult<T> = Result<T, DashError>;
