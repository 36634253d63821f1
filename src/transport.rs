use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client as ReqwestClient, RequestBuilder, Response};
use serde_json::Value;
use url::Url;

use crate::error::{Error, Result};
use crate::observability::{TRANSPORT_ERRORS, TRANSPORT_REQUESTS};
use crate::types::MultipartForm;

/// Default backend location.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Endpoint accepting chat messages.
pub const CHAT_ENDPOINT: &str = "api/chat";

/// Endpoint accepting file uploads.
pub const UPLOAD_ENDPOINT: &str = "api/upload";

/// Endpoint reporting service health.
pub const STATUS_ENDPOINT: &str = "api/status";

/// Endpoint returning the server-side log of one session.
pub fn conversation_endpoint(session_id: &str) -> String {
    format!("api/conversations/{session_id}")
}

//////////////////////////////////////////// Transport /////////////////////////////////////////////

/// One-shot request/response plumbing between the controller and the backend.
///
/// Implementations never retry.  A returned value is the decoded JSON body of a
/// 2xx response; interpreting it is up to the caller.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// POST a JSON payload.
    async fn post_json(&self, endpoint: &str, payload: Value) -> Result<Value>;

    /// POST a multipart form.
    async fn post_multipart(&self, endpoint: &str, form: MultipartForm) -> Result<Value>;

    /// GET a JSON document.
    async fn get_json(&self, endpoint: &str) -> Result<Value>;
}

////////////////////////////////////////// HttpTransport ///////////////////////////////////////////

/// [`Transport`] speaking HTTP via reqwest.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: ReqwestClient,
    base_url: Url,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport for the default base URL and timeout.
    pub fn new() -> Result<Self> {
        Self::with_options(None, None)
    }

    /// Create a transport with custom settings.
    pub fn with_options(base_url: Option<&str>, timeout: Option<Duration>) -> Result<Self> {
        let base_url = normalize_base(base_url.unwrap_or(DEFAULT_BASE_URL))?;
        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .default_headers(Self::default_headers())
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;
        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// The base every endpoint is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve an endpoint against the base URL.
    pub fn endpoint_url(&self, endpoint: &str) -> Result<Url> {
        Ok(self.base_url.join(endpoint.trim_start_matches('/'))?)
    }

    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    /// Send a prepared request and decode the JSON body of a 2xx response.
    async fn execute(&self, method: &str, url: Url, request: RequestBuilder) -> Result<Value> {
        TRANSPORT_REQUESTS.click();
        tracing::debug!(%method, %url, "sending request");
        let result = self.execute_inner(request).await;
        if let Err(err) = &result {
            TRANSPORT_ERRORS.click();
            tracing::warn!(%method, %url, error = %err, "request failed");
        }
        result
    }

    async fn execute_inner(&self, request: RequestBuilder) -> Result<Value> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::network(
                    format!(
                        "request timed out after {:.0}s: {}",
                        self.timeout.as_secs_f64(),
                        e
                    ),
                    Some(Box::new(e)),
                )
            } else if e.is_connect() {
                Error::network(format!("connection failed: {}", e), Some(Box::new(e)))
            } else {
                Error::network(format!("request failed: {}", e), Some(Box::new(e)))
            }
        })?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        let body = response.text().await.map_err(|e| {
            Error::network(format!("failed to read response: {}", e), Some(Box::new(e)))
        })?;
        serde_json::from_str(&body).map_err(|e| {
            Error::malformed_response(format!("body is not JSON: {}", e), Some(Box::new(e)))
        })
    }

    /// Convert a non-2xx response into an [`Error::HttpStatus`].
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();
        match response.text().await {
            Ok(body) => Error::http_status(status_code, body.trim()),
            Err(e) => Error::network(
                format!("failed to read error response: {}", e),
                Some(Box::new(e)),
            ),
        }
    }

    fn multipart(form: MultipartForm) -> Result<Form> {
        let MultipartForm { file, fields } = form;
        let mut part = Part::bytes(file.bytes.to_vec()).file_name(file.name);
        if let Some(content_type) = &file.content_type {
            part = part.mime_str(content_type).map_err(|e| {
                Error::http_client(
                    format!("invalid content type {content_type}: {}", e),
                    Some(Box::new(e)),
                )
            })?;
        }
        let mut multipart = Form::new().part("file", part);
        for (name, value) in fields {
            multipart = multipart.text(name, value);
        }
        Ok(multipart)
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, endpoint: &str, payload: Value) -> Result<Value> {
        let url = self.endpoint_url(endpoint)?;
        let request = self.client.post(url.clone()).json(&payload);
        self.execute("POST", url, request).await
    }

    async fn post_multipart(&self, endpoint: &str, form: MultipartForm) -> Result<Value> {
        let url = self.endpoint_url(endpoint)?;
        let request = self.client.post(url.clone()).multipart(Self::multipart(form)?);
        self.execute("POST", url, request).await
    }

    async fn get_json(&self, endpoint: &str) -> Result<Value> {
        let url = self.endpoint_url(endpoint)?;
        let request = self.client.get(url.clone());
        self.execute("GET", url, request).await
    }
}

fn normalize_base(base: &str) -> Result<Url> {
    let mut url = Url::parse(base)?;
    if url.cannot_be_a_base() {
        return Err(Error::url(format!("{base} cannot be used as a base URL"), None));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FeatureId, UploadFile};

    #[test]
    fn transport_creation() {
        let transport = HttpTransport::new().unwrap();
        assert_eq!(transport.base_url().as_str(), DEFAULT_BASE_URL);
        assert_eq!(transport.timeout(), DEFAULT_TIMEOUT);

        let transport = HttpTransport::with_options(
            Some("https://chat.example.com/backend"),
            Some(Duration::from_secs(30)),
        )
        .unwrap();
        assert_eq!(transport.base_url().as_str(), "https://chat.example.com/backend/");
        assert_eq!(transport.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn endpoints_resolve_under_base_path() {
        let transport =
            HttpTransport::with_options(Some("https://chat.example.com/backend/"), None).unwrap();
        assert_eq!(
            transport.endpoint_url(CHAT_ENDPOINT).unwrap().as_str(),
            "https://chat.example.com/backend/api/chat"
        );
        assert_eq!(
            transport.endpoint_url("/api/upload").unwrap().as_str(),
            "https://chat.example.com/backend/api/upload"
        );
        assert_eq!(
            transport
                .endpoint_url(&conversation_endpoint("session_1_abc"))
                .unwrap()
                .as_str(),
            "https://chat.example.com/backend/api/conversations/session_1_abc"
        );
    }

    #[test]
    fn invalid_base_is_rejected() {
        let err = HttpTransport::with_options(Some("not a url"), None).unwrap_err();
        assert!(matches!(err, Error::Url { .. }));
        let err = HttpTransport::with_options(Some("mailto:someone@example.com"), None).unwrap_err();
        assert!(matches!(err, Error::Url { .. }));
    }

    #[test]
    fn multipart_accepts_known_content_types() {
        let form = MultipartForm::upload(
            UploadFile::new("notes.txt", b"hello".to_vec()),
            &FeatureId::from("file_reader"),
            "session_1_abc",
        );
        assert!(HttpTransport::multipart(form).is_ok());
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_network_error() {
        let transport = HttpTransport::with_options(
            Some("http://127.0.0.1:9/"),
            Some(Duration::from_secs(5)),
        )
        .unwrap();
        let err = transport.get_json(STATUS_ENDPOINT).await.unwrap_err();
        assert!(err.is_network(), "{err:?}");
    }
}
