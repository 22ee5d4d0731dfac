//! Stardog client
//!
//! Async client for the Stardog RDF triplestore HTTP API:
//!
//! - **`Server`** — owns the HTTP transport and maps every non-2xx response
//!   to a typed [`StardogError`].
//! - **`Database`** — handle to one database: SPARQL queries and size.
//! - **`Transaction`** — begin / add / remove / clear / commit / rollback
//!   over a server-side transaction ID.
//!
//! # Quick Start
//!
//! ```no_run
//! use stardog::{QueryOptions, RdfFormat, ReasoningLevel, Server, ServerConfig};
//!
//! # async fn run() -> stardog::StardogResult<()> {
//! let server = Server::new(
//!     ServerConfig::new("http://localhost:5820").with_credentials("admin", "admin"),
//! )?;
//! let db = server.db("myDb");
//!
//! let mut tx = db.begin().await?;
//! tx.add("<urn:a> <urn:b> <urn:c> .", RdfFormat::NTriples, None).await?;
//! tx.commit().await?;
//!
//! let options = QueryOptions::new().with_reasoning(ReasoningLevel::Rdfs).with_limit(10);
//! let results = db.query("SELECT ?s WHERE { ?s ?p ?o }", &options).await?;
//! for solution in &results {
//!     println!("{:?}", solution.get("s"));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Transport failures, classification and the transaction lifecycle are
//! independent of the HTTP library: implement [`Transport`] to swap it, or use
//! [`fakes::ScriptedTransport`] in tests.

#![warn(clippy::all)]

pub mod config;
pub mod database;
pub mod error;
pub mod fakes;
pub mod format;
pub mod results;
pub mod server;
pub mod transaction;
pub mod transport;

pub use config::{Credentials, QueryOptions, ReasoningLevel, ServerConfig};
pub use database::Database;
pub use error::{classify, ErrorKind, ResponseError, StardogError, StardogResult};
pub use format::RdfFormat;
pub use results::{QueryResults, QuerySolution, RdfTerm};
pub use server::Server;
pub use transaction::{Transaction, TransactionState};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
