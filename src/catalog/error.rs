use thiserror::Error;

use super::transport::ApiResponse;

/// Errors raised by the catalog client.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The service answered with a 3xx status.
    #[error("{message}")]
    Redirect { status: u16, message: String },

    /// The service answered with a 4xx status, usually because of invalid input.
    #[error("{message}")]
    Client { status: u16, message: String },

    /// The service answered with a 5xx status.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// Any other non-success status.
    #[error("{message}")]
    Generic { status: u16, message: String },

    /// A request was rejected locally before being sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A feature was looked up in a feature collection that does not contain it.
    #[error("could not find {feature_id} in this feature collection")]
    FeatureNotFound { feature_id: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("request error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("could not encode request: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("could not decode response of '{action}': {source}")]
    Decode {
        action: String,
        #[source]
        source: serde_json::Error,
    },
}

impl CatalogError {
    /// Build the error matching the status class of a failed response.
    ///
    /// The message has the form `'<action>' failed due to <class> error '<detail>'`, where the
    /// detail is taken from the `detail` field of a JSON error body when there is one.
    pub fn from_response(response: &ApiResponse, action: &str) -> Self {
        let status = response.status;
        let class = match status / 100 {
            3 => "redirect",
            4 => "client",
            5 => "server",
            _ => "Unknown",
        };
        let message = match server_detail(&response.body) {
            Some(detail) => format!("'{action}' failed due to {class} error '{detail}'"),
            None => format!("'{action}' failed due to {class} error"),
        };
        match status / 100 {
            3 => Self::Redirect { status, message },
            4 => Self::Client { status, message },
            5 => Self::Server { status, message },
            _ => Self::Generic { status, message },
        }
    }

    /// Returns `true` when retrying the request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Redirect { .. } | Self::Server { .. }
        )
    }

    /// HTTP status of the response that caused the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Redirect { status, .. }
            | Self::Client { status, .. }
            | Self::Server { status, .. }
            | Self::Generic { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn server_detail(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(detail) => Some(detail.clone()),
        detail => Some(detail.to_string()),
    }
}

/// Fail with the classified error unless the response has a 2xx status.
pub fn check_response(response: &ApiResponse, action: &str) -> Result<(), CatalogError> {
    if (200..300).contains(&response.status) {
        return Ok(());
    }
    Err(CatalogError::from_response(response, action))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{check_response, CatalogError};
    use crate::catalog::transport::ApiResponse;

    fn response(status: u16, body: &str) -> ApiResponse {
        ApiResponse {
            status,
            body: body.as_bytes().to_vec(),
        }
    }

    #[rstest]
    #[case(200)]
    #[case(201)]
    #[case(204)]
    fn test_success_statuses_pass(#[case] status: u16) {
        assert!(check_response(&response(status, ""), "get product").is_ok());
    }

    #[rstest]
    #[case(301, "redirect", true)]
    #[case(404, "client", false)]
    #[case(422, "client", false)]
    #[case(503, "server", true)]
    #[case(101, "Unknown", false)]
    fn test_status_classification(
        #[case] status: u16,
        #[case] class: &str,
        #[case] transient: bool,
    ) {
        let err = check_response(&response(status, ""), "get product").unwrap_err();
        assert_eq!(
            format!("'get product' failed due to {class} error"),
            err.to_string()
        );
        assert_eq!(transient, err.is_transient());
        assert_eq!(Some(status), err.status());
    }

    #[test]
    fn test_detail_is_included_in_message() {
        let err = check_response(
            &response(409, r#"{"detail": "product already exists"}"#),
            "create product",
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::Client { status: 409, .. }));
        assert_eq!(
            "'create product' failed due to client error 'product already exists'",
            err.to_string()
        );
    }

    #[test]
    fn test_non_json_body_is_ignored() {
        let err = check_response(&response(500, "<html>oops</html>"), "query feature").unwrap_err();
        assert_eq!("'query feature' failed due to server error", err.to_string());
    }
}
