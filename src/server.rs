//! Server handle
//!
//! Owns the transport and applies the uniform response policy: every request
//! goes out through the transport exactly once and every response comes back
//! through [`classify`].

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::ServerConfig;
use crate::database::Database;
use crate::error::{classify, StardogError, StardogResult};
use crate::transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};

/// Connection to a Stardog server.
///
/// Cheap to clone; clones share the underlying transport.
#[derive(Clone)]
pub struct Server {
    config: Arc<ServerConfig>,
    transport: Arc<dyn Transport>,
}

impl Server {
    /// Connect over HTTP using reqwest
    ///
    /// # Example
    /// ```no_run
    /// # use stardog::{Server, ServerConfig};
    /// let server = Server::new(ServerConfig::new("http://localhost:5820")
    ///     .with_credentials("admin", "admin")).unwrap();
    /// let db = server.db("myDb");
    /// ```
    pub fn new(config: ServerConfig) -> StardogResult<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Use a caller-supplied transport
    pub fn with_transport(mut config: ServerConfig, transport: Arc<dyn Transport>) -> Self {
        config.url = config.url.trim_end_matches('/').to_string();
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Handle to the named database, carrying the server's default credentials
    pub fn db(&self, name: &str) -> Database {
        let mut db = Database::new(self.clone(), name);
        if let Some(creds) = &self.config.credentials {
            db.set_credentials(&creds.username, &creds.password);
        }
        db
    }

    /// Send one request and classify the response.
    ///
    /// `request.path` is relative to the server URL. No retries.
    pub async fn execute_request(&self, request: HttpRequest) -> StardogResult<HttpResponse> {
        let method = request.method.clone();
        let path = request.path.clone();
        debug!("Executing {} {}", method, path);

        let response = self.transport.execute(request).await.map_err(|e| {
            warn!("{} {} failed before a response arrived: {}", method, path, e);
            e
        })?;

        classify(response).map_err(|e| {
            if let StardogError::Response(err) = &e {
                warn!("{} {} -> {}", method, path, err);
            }
            e
        })
    }
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server")
            .field("url", &self.config.url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::ScriptedTransport;
    use crate::error::ErrorKind;

    fn server(transport: Arc<ScriptedTransport>) -> Server {
        Server::with_transport(ServerConfig::new("http://localhost:5820/"), transport)
    }

    #[test]
    fn test_url_normalized() {
        let server = server(Arc::new(ScriptedTransport::new()));
        assert_eq!(server.url(), "http://localhost:5820");
    }

    #[test]
    fn test_db_inherits_credentials() {
        let transport = Arc::new(ScriptedTransport::new());
        let config = ServerConfig::new("http://localhost:5820").with_credentials("admin", "pw");
        let server = Server::with_transport(config, transport);

        let db = server.db("people");
        assert_eq!(db.name(), "people");
        assert_eq!(db.credentials().unwrap().username, "admin");
        assert!(Server::with_transport(ServerConfig::default(), Arc::new(ScriptedTransport::new()))
            .db("x")
            .credentials()
            .is_none());
    }

    #[tokio::test]
    async fn test_execute_request_classifies() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_ok("fine").push_status(403);
        let server = server(transport.clone());

        let ok = server.execute_request(HttpRequest::get("/a")).await.unwrap();
        assert_eq!(ok.body, "fine");

        let err = server.execute_request(HttpRequest::get("/b")).await.unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Forbidden));
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_transport_error("connection refused");
        let server = server(transport);

        let err = server.execute_request(HttpRequest::get("/a")).await.unwrap_err();
        assert!(matches!(err, StardogError::Transport(_)));
        assert!(err.is_retryable());
    }
}
