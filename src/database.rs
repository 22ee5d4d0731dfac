//! Database handle
//!
//! Scopes requests to one database on the server and carries its
//! credentials. Read operations (`size`, `query`) are single stateless
//! requests; writes go through a [`Transaction`].

use tracing::debug;

use crate::config::{Credentials, QueryOptions};
use crate::error::{StardogError, StardogResult};
use crate::results::QueryResults;
use crate::server::Server;
use crate::transaction::Transaction;
use crate::transport::{encode_path_segment, HttpRequest, HttpResponse};

pub const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";
pub const CONNECTION_STRING_HEADER: &str = "SD-Connection-String";

/// Handle to a single database on a server
#[derive(Debug, Clone)]
pub struct Database {
    server: Server,
    name: String,
    credentials: Option<Credentials>,
}

impl Database {
    pub fn new(server: Server, name: &str) -> Self {
        Self {
            server,
            name: name.to_string(),
            credentials: None,
        }
    }

    pub fn with_credentials(mut self, username: &str, password: &str) -> Self {
        self.set_credentials(username, password);
        self
    }

    pub fn set_credentials(&mut self, username: &str, password: &str) {
        self.credentials = Some(Credentials::new(username, password));
    }

    pub fn clear_credentials(&mut self) {
        self.credentials = None;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn server(&self) -> &Server {
        &self.server
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Number of triples in the database
    pub async fn size(&self) -> StardogResult<u64> {
        let response = self.execute_request(HttpRequest::get("/size")).await?;
        let body = response.body.trim();
        body.parse().map_err(|_| {
            StardogError::Protocol(format!("size endpoint returned non-numeric body '{}'", body))
        })
    }

    /// Execute a SPARQL query
    pub async fn query(&self, sparql: &str, options: &QueryOptions) -> StardogResult<QueryResults> {
        let mut request = HttpRequest::get("/query")
            .header("Accept", SPARQL_RESULTS_JSON)
            .header("Content-Type", "text/plain");
        request.params = options.params(sparql);
        if let Some(level) = options.reasoning {
            request = request.header(CONNECTION_STRING_HEADER, level.connection_string());
        }

        let response = self.execute_request(request).await?;
        let results = QueryResults::parse(&response.body)?;
        debug!("Query on '{}' returned {} solution(s)", self.name, results.len());
        Ok(results)
    }

    /// A new transaction bound to this database, not yet started
    pub fn transaction(&self) -> Transaction {
        Transaction::new(self.clone())
    }

    /// Create and start a transaction
    pub async fn begin(&self) -> StardogResult<Transaction> {
        let mut tx = self.transaction();
        tx.start().await?;
        Ok(tx)
    }

    /// Execute a request relative to this database's URL.
    ///
    /// Requests without explicit credentials get the handle's credentials.
    pub async fn execute_request(&self, mut request: HttpRequest) -> StardogResult<HttpResponse> {
        request.path = format!(
            "/{}/{}",
            encode_path_segment(&self.name),
            request.path.trim_start_matches('/')
        );
        if request.credentials.is_none() {
            request.credentials = self.credentials.clone();
        }
        self.server.execute_request(request).await
    }
}
