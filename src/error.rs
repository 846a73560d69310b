use thiserror::Error;

// ---------------------------------------------------------------------------
// Parse errors – raised before any processing starts
// ---------------------------------------------------------------------------

/// Why a block of scan text could not become a [`Series`](crate::data::model::Series).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// No line held a usable `angle intensity` pair.
    #[error("no numeric data found in scan text")]
    Empty,

    /// Some pairs were found, but fewer than the caller needs.
    #[error("not enough numeric points: found {found}, need at least {required}")]
    InsufficientData { found: usize, required: usize },

    /// Paired x/y arrays disagree in length.
    #[error("x has {x} values but y has {y}")]
    LengthMismatch { x: usize, y: usize },
}

// ---------------------------------------------------------------------------
// Endpoint errors – each one maps onto an HTTP status
// ---------------------------------------------------------------------------

/// Failures of the remote refine endpoint.
#[derive(Error, Debug)]
pub enum EndpointError {
    #[error("Use POST")]
    MethodNotAllowed,

    #[error("not enough numeric data: {0}")]
    InsufficientData(#[from] ParseError),

    #[error("{0}")]
    Malformed(#[from] serde_json::Error),
}

impl EndpointError {
    /// HTTP status code reported for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            EndpointError::MethodNotAllowed => 405,
            EndpointError::InsufficientData(_) => 400,
            EndpointError::Malformed(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_message_names_counts() {
        let err = ParseError::InsufficientData {
            found: 3,
            required: 5,
        };
        let msg = err.to_string();
        assert!(msg.contains("found 3"));
        assert!(msg.contains("at least 5"));
    }

    #[test]
    fn endpoint_errors_map_to_status_codes() {
        assert_eq!(EndpointError::MethodNotAllowed.status_code(), 405);
        assert_eq!(
            EndpointError::from(ParseError::Empty).status_code(),
            400
        );
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(EndpointError::from(json_err).status_code(), 500);
    }
}
