//! HTTP transport boundary
//!
//! The rest of the crate only sees [`HttpRequest`] and [`HttpResponse`].
//! Anything that can turn the one into the other implements [`Transport`]:
//! [`ReqwestTransport`] for real servers, [`ScriptedTransport`](crate::fakes::ScriptedTransport)
//! for tests.

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::{Client, Method, StatusCode, Url};
use tracing::debug;

use crate::config::{Credentials, ServerConfig};
use crate::error::{StardogError, StardogResult};

/// Characters escaped in a URL path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Escape a database name or transaction ID for use as one path segment
pub(crate) fn encode_path_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

/// A request relative to the server base URL
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Path relative to the server base URL, with leading slash
    pub path: String,
    /// Query-string parameters, in order
    pub params: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub credentials: Option<Credentials>,
}

impl HttpRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: Vec::new(),
            headers: Vec::new(),
            body: None,
            credentials: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.params.push((name.to_string(), value.into()));
        self
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Case-insensitive header lookup
    pub fn header_value(&self, name: &str) -> Option<&str> {
        lookup(&self.headers, name)
    }

    pub fn param_value(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Status, headers and body of a completed request
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(StatusCode::OK).with_body(body)
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        lookup(&self.headers, name)
    }
}

fn lookup<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Executes one HTTP request and returns the raw response.
///
/// Implementations must not retry and must not interpret the status code;
/// classification happens in [`Server`](crate::Server).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> StardogResult<HttpResponse>;
}

/// Transport backed by a pooled `reqwest::Client`
pub struct ReqwestTransport {
    base_url: String,
    http_client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &ServerConfig) -> StardogResult<Self> {
        Url::parse(&config.url)
            .map_err(|e| StardogError::Config(format!("invalid server URL '{}': {}", config.url, e)))?;

        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| StardogError::Config(e.to_string()))?;

        Ok(Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, request: &HttpRequest) -> StardogResult<Url> {
        let raw = format!("{}/{}", self.base_url, request.path.trim_start_matches('/'));
        let mut url = Url::parse(&raw)
            .map_err(|e| StardogError::Config(format!("invalid request URL '{}': {}", raw, e)))?;
        if !request.params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &request.params {
                pairs.append_pair(name, value);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> StardogResult<HttpResponse> {
        let url = self.url_for(&request)?;
        debug!("{} {}", request.method, url);

        let mut builder = self.http_client.request(request.method.clone(), url);

        if let Some(creds) = request.credentials.as_ref().filter(|c| !c.is_empty()) {
            builder = builder.basic_auth(&creds.username, Some(&creds.password));
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await?;

        Ok(HttpResponse { status, headers, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Accept one connection, reply with `reply`, return the raw request text
    async fn serve_once(listener: TcpListener, reply: &'static str) -> String {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];

        let header_end = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before request headers");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
        let content_length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        while buf.len() < header_end + content_length {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }

        socket.write_all(reply.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        String::from_utf8_lossy(&buf).into_owned()
    }

    async fn round_trip(
        request: HttpRequest,
        reply: &'static str,
    ) -> (String, StardogResult<HttpResponse>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let server = tokio::spawn(serve_once(listener, reply));

        // Same shape as `new`, minus any proxy picked up from the environment
        let transport = ReqwestTransport {
            base_url: url,
            http_client: Client::builder().no_proxy().build().unwrap(),
        };
        let response = transport.execute(request).await;
        (server.await.unwrap(), response)
    }

    const OK_REPLY: &str = "HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok";

    #[tokio::test]
    async fn test_basic_auth_header_sent() {
        let mut request = HttpRequest::post("/db/transaction/begin")
            .header("Content-Type", "text/plain")
            .body("payload");
        request.credentials = Some(Credentials::new("admin", "admin"));

        let (raw, response) = round_trip(request, OK_REPLY).await;
        let auth = raw
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("authorization").then(|| value.trim().to_string())
            })
            .expect("no Authorization header");
        assert_eq!(auth, "Basic YWRtaW46YWRtaW4=");

        let lower = raw.to_ascii_lowercase();
        assert!(lower.starts_with("post /db/transaction/begin http/1.1"), "{}", raw);
        assert!(lower.contains("content-type: text/plain"), "{}", raw);
        assert!(raw.ends_with("payload"), "{}", raw);
        assert_eq!(response.unwrap().body, "ok");
    }

    #[tokio::test]
    async fn test_no_auth_header_for_empty_username() {
        let mut request = HttpRequest::get("/db/size");
        request.credentials = Some(Credentials::new("", "ignored"));

        let (raw, _) = round_trip(request, OK_REPLY).await;
        assert!(!raw.to_ascii_lowercase().contains("authorization:"), "{}", raw);

        let (raw, _) = round_trip(HttpRequest::get("/db/size"), OK_REPLY).await;
        assert!(!raw.to_ascii_lowercase().contains("authorization:"), "{}", raw);
    }

    #[tokio::test]
    async fn test_error_response_snapshot() {
        let reply = "HTTP/1.1 404 Not Found\r\nSD-Error-Code: 4\r\nContent-Length: 5\r\nConnection: close\r\n\r\nnope!";
        let request = HttpRequest::get("/db/query").param("query", "ASK {}");

        let (raw, response) = round_trip(request, reply).await;
        assert!(raw.starts_with("GET /db/query?query=ASK+%7B%7D "), "{}", raw);

        let response = response.unwrap();
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.header("SD-Error-Code"), Some("4"));
        assert_eq!(response.body, "nope!");

        let err = crate::error::classify(response).unwrap_err();
        assert_eq!(err.error_code(), Some(4));
    }

    #[test]
    fn test_encode_path_segment() {
        assert_eq!(encode_path_segment("1234567890"), "1234567890");
        assert_eq!(encode_path_segment("a b#c"), "a%20b%23c");
        assert_eq!(encode_path_segment("x/y?z"), "x%2Fy%3Fz");
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let res = HttpResponse::ok("x").with_header("SD-Error-Code", "3");
        assert_eq!(res.header("sd-error-code"), Some("3"));

        let req = HttpRequest::post("/db/size").header("Content-Type", "text/plain");
        assert_eq!(req.header_value("content-type"), Some("text/plain"));
        assert_eq!(req.header_value("accept"), None);
    }

    #[test]
    fn test_url_for_joins_path_and_params() {
        let transport = ReqwestTransport::new(&ServerConfig::new("http://localhost:5820/")).unwrap();
        let req = HttpRequest::get("/mydb/query")
            .param("query", "SELECT * WHERE { ?s ?p ?o }")
            .param("limit", "10");

        let url = transport.url_for(&req).unwrap();
        assert_eq!(url.path(), "/mydb/query");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[0].0, "query");
        assert_eq!(pairs[0].1, "SELECT * WHERE { ?s ?p ?o }");
        assert_eq!(pairs[1], ("limit".to_string(), "10".to_string()));
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let result = ReqwestTransport::new(&ServerConfig::new("not a url"));
        assert!(matches!(result, Err(StardogError::Config(_))));
    }
}
