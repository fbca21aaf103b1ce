use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

use super::error::CatalogError;
use crate::config::ClientConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

/// A request to the catalog service, relative to the configured API host.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn with_query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Sends requests to the catalog service. Non-success statuses are returned as responses, only
/// failures to complete the exchange are errors.
pub trait Transport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, CatalogError>;
}

/// Blocking HTTP transport.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    api_host: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, CatalogError> {
        let mut headers = HeaderMap::new();
        match &config.token {
            Some(token) => {
                let mut value = HeaderValue::from_str(token).map_err(|_| {
                    CatalogError::Config("API token contains invalid characters".to_string())
                })?;
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            None => log::warn!("No API token configured, requests will be unauthenticated"),
        }

        // 3xx answers are returned to the caller, which reports them as errors.
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            client,
            api_host: config.api_host.trim_end_matches('/').to_string(),
        })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, CatalogError> {
        let url = format!("{}{}", self.api_host, request.path);
        log::debug!("{:?} {}", request.method, url);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Patch => self.client.patch(&url),
            Method::Delete => self.client.delete(&url),
        };
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.bytes()?.to_vec();
        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::{BufRead, BufReader, Write},
        net::TcpListener,
        thread,
    };

    use super::{ApiRequest, HttpTransport, Method, Transport};
    use crate::catalog::{error::CatalogError, VectorClient};
    use crate::config::ClientConfig;

    /// Serve a single `302 Found` answer on a local port and return its address.
    fn redirecting_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap() > 0 && line != "\r\n" {
                line.clear();
            }
            reader
                .get_mut()
                .write_all(
                    b"HTTP/1.1 302 Found\r\nLocation: /elsewhere\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                )
                .unwrap();
        });
        format!("http://{}", address)
    }

    fn config(api_host: String) -> ClientConfig {
        ClientConfig {
            api_host,
            token: Some("secret".to_string()),
            max_attempts: 1,
            retry_base_delay_ms: 0,
            ..ClientConfig::default()
        }
    }

    #[test]
    fn test_redirects_are_not_followed() {
        let transport = HttpTransport::new(&config(redirecting_server())).unwrap();
        let response = transport
            .send(&ApiRequest::new(Method::Get, "/products/acme:roads"))
            .unwrap();
        assert_eq!(302, response.status);
    }

    #[test]
    fn test_redirect_is_reported_as_error() {
        let client = VectorClient::connect(&config(redirecting_server())).unwrap();
        let err = client.get_product("acme:roads").unwrap_err();
        assert!(
            matches!(err, CatalogError::Redirect { status: 302, .. }),
            "unexpected error: {}",
            err
        );
    }
}

#[cfg(test)]
pub mod testing {
    use std::{cell::RefCell, collections::VecDeque};

    use super::{ApiRequest, ApiResponse, Transport};
    use crate::catalog::error::CatalogError;

    /// Transport that records every request and answers with queued responses.
    #[derive(Default)]
    pub struct RecordingTransport {
        requests: RefCell<Vec<ApiRequest>>,
        responses: RefCell<VecDeque<ApiResponse>>,
    }

    impl RecordingTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(self, status: u16, body: serde_json::Value) -> Self {
            self.responses.borrow_mut().push_back(ApiResponse {
                status,
                body: body.to_string().into_bytes(),
            });
            self
        }

        pub fn respond_empty(self, status: u16) -> Self {
            self.responses
                .borrow_mut()
                .push_back(ApiResponse { status, body: Vec::new() });
            self
        }

        pub fn requests(&self) -> Vec<ApiRequest> {
            self.requests.borrow().clone()
        }
    }

    impl Transport for RecordingTransport {
        fn send(&self, request: &ApiRequest) -> Result<ApiResponse, CatalogError> {
            self.requests.borrow_mut().push(request.clone());
            Ok(self
                .responses
                .borrow_mut()
                .pop_front()
                .unwrap_or(ApiResponse {
                    status: 500,
                    body: br#"{"detail": "no response queued"}"#.to_vec(),
                }))
        }
    }
}
