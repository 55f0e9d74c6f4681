use thiserror::Error;

/// Failure of a single price fetch.
///
/// Every variant is caught before it leaves the report service; the report
/// keeps a copy next to the field it left empty.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PriceError {
    /// Connection refused, DNS failure, or request timeout
    #[error("Network error: {0}")]
    Network(String),

    /// Bad HTTP status, or a `success: false` envelope
    #[error("API error{}: {message}", .status.map(|s| format!(" ({})", s)).unwrap_or_default())]
    Api {
        status: Option<u16>,
        message: String,
    },

    /// Missing or malformed fields in an otherwise successful response
    #[error("Parse error: {0}")]
    Parse(String),

    /// The provider had nothing for the requested window
    #[error("No data: {0}")]
    NoData(String),
}

impl PriceError {
    /// Short label used by the presentation layer
    pub fn kind(&self) -> &'static str {
        match self {
            PriceError::Network(_) => "network",
            PriceError::Api { .. } => "api",
            PriceError::Parse(_) => "parse",
            PriceError::NoData(_) => "no data",
        }
    }
}

impl From<reqwest::Error> for PriceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() || err.is_request() {
            PriceError::Network(err.to_string())
        } else if err.is_decode() {
            PriceError::Parse(err.to_string())
        } else if let Some(status) = err.status() {
            PriceError::Api {
                status: Some(status.as_u16()),
                message: err.to_string(),
            }
        } else {
            PriceError::Network(err.to_string())
        }
    }
}

/// Invalid start-up configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{var} is not a valid value: '{value}' ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_with_status() {
        let err = PriceError::Api {
            status: Some(503),
            message: "upstream down".to_string(),
        };
        assert_eq!(err.to_string(), "API error (503): upstream down");
    }

    #[test]
    fn test_api_error_display_without_status() {
        let err = PriceError::Api {
            status: None,
            message: "invalid_contract".to_string(),
        };
        assert_eq!(err.to_string(), "API error: invalid_contract");
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(PriceError::Network("x".into()).kind(), "network");
        assert_eq!(PriceError::Parse("x".into()).kind(), "parse");
        assert_eq!(PriceError::NoData("x".into()).kind(), "no data");
    }
}
