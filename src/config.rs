//! Client configuration
//!
//! Typed configuration for the server connection and for SPARQL queries.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::StardogError;

/// Default HTTP endpoint of a local Stardog server
pub const DEFAULT_URL: &str = "http://localhost:5820";

/// HTTP Basic credentials
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Requests only carry an `Authorization` header for a non-empty username
    pub fn is_empty(&self) -> bool {
        self.username.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Server connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the server, without trailing slash
    pub url: String,
    /// Default credentials handed to every database handle
    pub credentials: Option<Credentials>,
    /// Client-side request timeout (transport level)
    pub timeout: Option<Duration>,
    /// User-Agent sent with every request
    pub user_agent: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_URL)
    }
}

impl ServerConfig {
    pub fn new(url: &str) -> Self {
        ServerConfig {
            url: url.trim_end_matches('/').to_string(),
            credentials: None,
            timeout: None,
            user_agent: format!("stardog-rs/{}", crate::VERSION),
        }
    }

    /// Read `STARDOG_URL`, `STARDOG_USERNAME` and `STARDOG_PASSWORD`
    pub fn from_env() -> Self {
        let url = std::env::var("STARDOG_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
        let mut config = Self::new(&url);
        if let Ok(username) = std::env::var("STARDOG_USERNAME") {
            let password = std::env::var("STARDOG_PASSWORD").unwrap_or_default();
            config.credentials = Some(Credentials::new(username, password));
        }
        config
    }

    pub fn with_credentials(mut self, username: &str, password: &str) -> Self {
        self.credentials = Some(Credentials::new(username, password));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }
}

/// Server-side inference mode applied while evaluating a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReasoningLevel {
    None,
    Rdfs,
    Ql,
    Rl,
    El,
    Dl,
}

impl ReasoningLevel {
    pub const ALL: [ReasoningLevel; 6] = [
        ReasoningLevel::None,
        ReasoningLevel::Rdfs,
        ReasoningLevel::Ql,
        ReasoningLevel::Rl,
        ReasoningLevel::El,
        ReasoningLevel::Dl,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReasoningLevel::None => "NONE",
            ReasoningLevel::Rdfs => "RDFS",
            ReasoningLevel::Ql => "QL",
            ReasoningLevel::Rl => "RL",
            ReasoningLevel::El => "EL",
            ReasoningLevel::Dl => "DL",
        }
    }

    /// Value of the `SD-Connection-String` header selecting this level
    pub fn connection_string(&self) -> String {
        format!("reasoning={}", self.as_str())
    }
}

impl fmt::Display for ReasoningLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReasoningLevel {
    type Err = StardogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReasoningLevel::ALL
            .iter()
            .copied()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| StardogError::InvalidReasoning(s.to_string()))
    }
}

/// Options for [`Database::query`](crate::Database::query)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    pub base_uri: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub reasoning: Option<ReasoningLevel>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_uri(mut self, base_uri: &str) -> Self {
        self.base_uri = Some(base_uri.to_string());
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_reasoning(mut self, reasoning: ReasoningLevel) -> Self {
        self.reasoning = Some(reasoning);
        self
    }

    /// Query-string parameters for the given SPARQL text
    pub(crate) fn params(&self, sparql: &str) -> Vec<(String, String)> {
        let mut params = vec![("query".to_string(), sparql.to_string())];
        if let Some(base_uri) = &self.base_uri {
            params.push(("baseURI".to_string(), base_uri.clone()));
        }
        if let Some(offset) = self.offset {
            params.push(("offset".to_string(), offset.to_string()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }
}
