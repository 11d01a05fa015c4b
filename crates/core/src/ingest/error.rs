use thiserror::Error;

/// Failure at a remote fetch boundary.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("transport error for {target}: {detail}")]
    Transport { target: String, detail: String },

    #[error("malformed response from {target}: {detail}")]
    ResponseFormat { target: String, detail: String },

    #[error("no data for {target}: {detail}")]
    NoData { target: String, detail: String },
}

impl FetchError {
    pub fn transport(target: impl Into<String>, detail: impl ToString) -> Self {
        Self::Transport {
            target: target.into(),
            detail: detail.to_string(),
        }
    }

    pub fn response_format(target: impl Into<String>, detail: impl ToString) -> Self {
        Self::ResponseFormat {
            target: target.into(),
            detail: detail.to_string(),
        }
    }

    pub fn no_data(target: impl Into<String>, detail: impl ToString) -> Self {
        Self::NoData {
            target: target.into(),
            detail: detail.to_string(),
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::ResponseFormat { .. } => "response_format",
            Self::NoData { .. } => "no_data",
        }
    }
}
