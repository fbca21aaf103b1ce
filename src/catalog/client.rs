use serde::de::DeserializeOwned;
use url::Url;

use super::{
    error::{check_response, CatalogError},
    retry::RetryPolicy,
    transport::{ApiRequest, ApiResponse, HttpTransport, Transport},
};
use crate::config::ClientConfig;

/// Client of the vector catalog service.
///
/// Each operation is a single request/response exchange, retried according to the configured
/// [`RetryPolicy`] when it fails transiently. The product and feature operations are implemented
/// in the `products` and `features` modules.
pub struct VectorClient<T: Transport = HttpTransport> {
    transport: T,
    retry: RetryPolicy,
    api_host: String,
}

impl VectorClient<HttpTransport> {
    /// Client talking HTTP to the configured host.
    pub fn connect(config: &ClientConfig) -> Result<Self, CatalogError> {
        Ok(Self::new(HttpTransport::new(config)?, config))
    }
}

impl<T: Transport> VectorClient<T> {
    pub fn new(transport: T, config: &ClientConfig) -> Self {
        Self {
            transport,
            retry: config.retry_policy(),
            api_host: config.api_host.trim_end_matches('/').to_string(),
        }
    }

    pub fn api_host(&self) -> &str {
        &self.api_host
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub(crate) fn send(
        &self,
        action: &str,
        request: ApiRequest,
    ) -> Result<ApiResponse, CatalogError> {
        self.retry.run(action, || {
            let response = self.transport.send(&request)?;
            check_response(&response, action)?;
            Ok(response)
        })
    }

    pub(crate) fn send_json<R: DeserializeOwned>(
        &self,
        action: &str,
        request: ApiRequest,
    ) -> Result<R, CatalogError> {
        let response = self.send(action, request)?;
        serde_json::from_slice(&response.body).map_err(|source| CatalogError::Decode {
            action: action.to_string(),
            source,
        })
    }
}

/// Reject identifiers that cannot be used as a path segment.
pub(crate) fn check_id(kind: &str, id: &str) -> Result<(), CatalogError> {
    if id.trim().is_empty() {
        return Err(CatalogError::InvalidRequest(format!("{kind} must not be empty")));
    }
    if id.contains('/') || id == "." || id == ".." {
        return Err(CatalogError::InvalidRequest(format!(
            "{kind} {id:?} is not a valid path segment"
        )));
    }
    Ok(())
}

/// Absolute request path made of percent-encoded segments, e.g. `["products", "a b"]` gives
/// `/products/a%20b`.
pub(crate) fn api_path(segments: &[&str]) -> Result<String, CatalogError> {
    let mut url = Url::parse("http://localhost/")
        .map_err(|err| CatalogError::InvalidRequest(err.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| CatalogError::InvalidRequest("cannot build request path".to_string()))?
        .clear()
        .extend(segments);
    Ok(url.path().to_string())
}
