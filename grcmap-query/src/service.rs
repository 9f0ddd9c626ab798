//! Query execution boundary and search sessions.

use crate::compiler::CompiledQuery;
use crate::descriptor::QueryDescriptor;
use crate::error::QueryResult;
use crate::mega::MegaOverrides;
use crate::response::SearchOutcome;
use async_trait::async_trait;
use grcmap_types::MegaRelation;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Executes query batches.
///
/// Implementations return one response per descriptor, in submission order,
/// each keyed by the descriptor's object name.
#[async_trait]
pub trait QueryService: Send + Sync {
    async fn execute_batch(&self, batch: &[QueryDescriptor]) -> QueryResult<Vec<Value>>;
}

/// Token identifying one request issued by a [`SearchSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Runs searches for one result list; only the latest request's response is
/// applied, earlier ones resolve to `None`.
pub struct SearchSession {
    service: Arc<dyn QueryService>,
    latest: AtomicU64,
}

impl SearchSession {
    pub fn new(service: Arc<dyn QueryService>) -> Self {
        Self {
            service,
            latest: AtomicU64::new(0),
        }
    }

    /// Issues a new token, superseding every earlier one.
    pub fn begin(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }

    /// Executes `batch` and returns the raw responses, or `None` if another
    /// request was issued while this one was in flight. A superseded request
    /// resolves to `None` even when it failed.
    pub async fn execute(&self, batch: &[QueryDescriptor]) -> QueryResult<Option<Vec<Value>>> {
        let token = self.begin();
        let result = self.service.execute_batch(batch).await;
        if !self.is_current(token) {
            match &result {
                Ok(_) => debug!("Discarding superseded search response #{}", token.value()),
                Err(e) => debug!("Ignoring failure of superseded search #{}: {}", token.value(), e),
            }
            return Ok(None);
        }
        result.map(Some)
    }

    /// Executes a compiled search and resolves its outcome.
    pub async fn search(
        &self,
        compiled: &CompiledQuery,
        overrides: &MegaOverrides,
        default_relation: MegaRelation,
    ) -> QueryResult<Option<SearchOutcome>> {
        match self.execute(&compiled.request).await? {
            Some(responses) => compiled
                .resolve(&responses, overrides, default_relation)
                .map(Some),
            None => Ok(None),
        }
    }
}

/// A mock query service for testing.
pub mod mock {
    use super::*;
    use crate::error::QueryError;
    use grcmap_types::ObjectId;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays queued batch responses and records every batch it receives.
    #[derive(Debug, Default)]
    pub struct MockQueryService {
        responses: Mutex<VecDeque<QueryResult<Vec<Value>>>>,
        batches: Mutex<Vec<Vec<QueryDescriptor>>>,
    }

    impl MockQueryService {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queues the response to the next batch.
        pub fn respond(&self, responses: Vec<Value>) {
            self.responses.lock().unwrap().push_back(Ok(responses));
        }

        /// Queues a transport failure for the next batch.
        pub fn fail(&self, message: impl Into<String>) {
            self.responses
                .lock()
                .unwrap()
                .push_back(Err(QueryError::Transport(message.into())));
        }

        /// Batches received so far.
        pub fn batches(&self) -> Vec<Vec<QueryDescriptor>> {
            self.batches.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.batches.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl QueryService for MockQueryService {
        async fn execute_batch(&self, batch: &[QueryDescriptor]) -> QueryResult<Vec<Value>> {
            self.batches.lock().unwrap().push(batch.to_vec());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(QueryError::Transport("no response queued".into())))
        }
    }

    /// `{name: {values, total}}`.
    pub fn values_response(object_name: &str, values: Vec<Value>, total: u64) -> Value {
        json!({ (object_name): { "values": values, "total": total } })
    }

    /// `{name: {ids}}`.
    pub fn ids_response(object_name: &str, ids: &[ObjectId]) -> Value {
        json!({ (object_name): { "ids": ids } })
    }

    /// `{name: {count}}`.
    pub fn count_response(object_name: &str, count: u64) -> Value {
        json!({ (object_name): { "count": count } })
    }

    /// A minimal service object.
    pub fn object(id: ObjectId, object_type: &str) -> Value {
        json!({ "id": id, "type": object_type })
    }

    /// A minimal snapshot object.
    pub fn snapshot(id: ObjectId, child_type: &str, child_id: ObjectId) -> Value {
        json!({
            "id": id,
            "type": grcmap_types::SNAPSHOT_TYPE,
            "child_type": child_type,
            "child_id": child_id,
        })
    }
}
