//! Transactions
//!
//! A [`Transaction`] wraps a server-side transaction ID and a local
//! lifecycle state:
//!
//! ```text
//! Created --start--> Started --commit--> Committed
//!                           \--rollback--> RolledBack
//! ```
//!
//! The ID is set exactly when the state is not `Created`. Committed and
//! RolledBack are terminal. A failed commit or rollback leaves the state
//! where it was.
//!
//! A transaction is driven by a single caller: every state-changing
//! operation takes `&mut self`.

use tracing::{debug, info, warn};

use crate::database::Database;
use crate::error::{ErrorKind, StardogError, StardogResult};
use crate::format::RdfFormat;
use crate::transport::{encode_path_segment, HttpRequest};

/// Query parameter naming the target graph of add/remove/clear
pub const GRAPH_URI_PARAM: &str = "graph-uri";

/// Lifecycle state of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Created,
    Started,
    Committed,
    RolledBack,
}

impl TransactionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionState::Committed | TransactionState::RolledBack)
    }
}

#[derive(Debug, Clone, Copy)]
enum Termination {
    Commit,
    Rollback,
}

impl Termination {
    fn verb(&self) -> &'static str {
        match self {
            Termination::Commit => "commit",
            Termination::Rollback => "rollback",
        }
    }

    fn conflict_message(&self) -> &'static str {
        match self {
            Termination::Commit => "Conflict - Transaction already committed",
            Termination::Rollback => "Conflict - Transaction already rolled back",
        }
    }

    fn target(&self) -> TransactionState {
        match self {
            Termination::Commit => TransactionState::Committed,
            Termination::Rollback => TransactionState::RolledBack,
        }
    }
}

/// A transaction against one database
#[derive(Debug)]
pub struct Transaction {
    database: Database,
    id: Option<String>,
    state: TransactionState,
}

impl Transaction {
    /// Bind a new transaction to `database`. Nothing is sent until [`start`](Self::start).
    pub fn new(database: Database) -> Self {
        Self {
            database,
            id: None,
            state: TransactionState::Created,
        }
    }

    /// Server-assigned ID, `None` until started
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Whether the transaction has an ID and has left `Created`
    pub fn is_started(&self) -> bool {
        self.state != TransactionState::Created
    }

    pub fn is_committed(&self) -> bool {
        self.state == TransactionState::Committed
    }

    pub fn is_rolled_back(&self) -> bool {
        self.state == TransactionState::RolledBack
    }

    /// Begin the transaction on the server and store the returned ID.
    ///
    /// Issued exactly once; a failure is returned to the caller and never
    /// retried here, since a second begin would open a second server-side
    /// transaction.
    pub async fn start(&mut self) -> StardogResult<&mut Self> {
        if self.state != TransactionState::Created {
            return Err(StardogError::transaction_conflict(
                "Unable to start, transaction already started",
            ));
        }

        let response = self
            .database
            .execute_request(
                HttpRequest::post("/transaction/begin").header("Content-Type", "text/plain"),
            )
            .await?;

        let id = response.body.trim().to_string();
        if id.is_empty() {
            return Err(StardogError::Protocol(
                "begin returned an empty transaction ID".to_string(),
            ));
        }
        info!("Started transaction {} on '{}'", id, self.database.name());
        self.id = Some(id);
        self.state = TransactionState::Started;
        Ok(self)
    }

    /// Add statements, optionally into a named graph
    pub async fn add(
        &self,
        data: &str,
        format: RdfFormat,
        graph_uri: Option<&str>,
    ) -> StardogResult<bool> {
        self.update("add", Some((data, format)), graph_uri).await
    }

    /// Remove statements, optionally from a named graph
    pub async fn remove(
        &self,
        data: &str,
        format: RdfFormat,
        graph_uri: Option<&str>,
    ) -> StardogResult<bool> {
        self.update("remove", Some((data, format)), graph_uri).await
    }

    /// Clear the named graph, or everything when `graph_uri` is `None`
    pub async fn clear(&self, graph_uri: Option<&str>) -> StardogResult<bool> {
        self.update("clear", None, graph_uri).await
    }

    /// Commit the transaction.
    ///
    /// Fails with `TransactionConflict` without contacting the server if the
    /// transaction was never started, and with `TransactionConflict` if the
    /// server reports a conflict (for instance a second commit).
    pub async fn commit(&mut self) -> StardogResult<bool> {
        self.terminate(Termination::Commit).await
    }

    /// Roll the transaction back. Errors mirror [`commit`](Self::commit).
    pub async fn rollback(&mut self) -> StardogResult<bool> {
        self.terminate(Termination::Rollback).await
    }

    async fn update(
        &self,
        operation: &str,
        payload: Option<(&str, RdfFormat)>,
        graph_uri: Option<&str>,
    ) -> StardogResult<bool> {
        let id = self.require_started(operation)?;

        let mut request =
            HttpRequest::post(format!("/{}/{}", encode_path_segment(id), operation));
        if let Some((data, format)) = payload {
            request = request
                .header("Content-Type", format.mime_type())
                .body(data);
        }
        if let Some(graph) = graph_uri {
            request = request.param(GRAPH_URI_PARAM, graph);
        }

        self.database.execute_request(request).await?;
        debug!("Transaction {}: {} succeeded", id, operation);
        Ok(true)
    }

    fn require_started(&self, operation: &str) -> StardogResult<&str> {
        match (self.state, self.id.as_deref()) {
            (TransactionState::Started, Some(id)) => Ok(id),
            (TransactionState::Committed, _) => Err(StardogError::transaction_conflict(format!(
                "Unable to {}, transaction already committed",
                operation
            ))),
            (TransactionState::RolledBack, _) => Err(StardogError::transaction_conflict(format!(
                "Unable to {}, transaction already rolled back",
                operation
            ))),
            _ => Err(StardogError::transaction_conflict(format!(
                "Unable to {}, transaction not started yet",
                operation
            ))),
        }
    }

    async fn terminate(&mut self, termination: Termination) -> StardogResult<bool> {
        let verb = termination.verb();
        let id = match (self.state, self.id.clone()) {
            (TransactionState::Created, _) | (_, None) => {
                return Err(StardogError::transaction_conflict(format!(
                    "Unable to {}, transaction not started yet",
                    verb
                )));
            }
            (_, Some(id)) => id,
        };

        let request =
            HttpRequest::post(format!("/transaction/{}/{}", verb, encode_path_segment(&id)))
            .header("Content-Type", "text/plain");

        match self.database.execute_request(request).await {
            Ok(_) => {
                // Terminal states are final; a late success does not flip them.
                if self.state == TransactionState::Started {
                    self.state = termination.target();
                }
                info!("Transaction {}: {} succeeded", id, verb);
                Ok(true)
            }
            Err(StardogError::Response(err)) if err.kind() == ErrorKind::Conflict => {
                warn!("Transaction {}: {} conflicted ({})", id, verb, err);
                Err(StardogError::TransactionConflict {
                    message: termination.conflict_message().to_string(),
                    source: Some(err),
                })
            }
            Err(err) => Err(err),
        }
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if self.state == TransactionState::Started {
            if let Some(id) = &self.id {
                warn!("Transaction {} dropped without commit or rollback", id);
            }
        }
    }
}
