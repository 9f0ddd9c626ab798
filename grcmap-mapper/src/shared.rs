//! Per-parent ledgers shared between concurrent callers.

use crate::ledger::{CommitReport, PendingJoinLedger};
use crate::service::{MappingService, MappingTarget};
use grcmap_types::{EntityRef, JoinAction};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// Identifies the parent a ledger belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LedgerKey {
    /// A persisted object being edited.
    Object(EntityRef),
    /// An unsaved object, named by a caller-chosen key.
    Draft(String),
}

impl fmt::Display for LedgerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Object(entity) => write!(f, "{entity}"),
            Self::Draft(key) => write!(f, "draft {key}"),
        }
    }
}

impl From<EntityRef> for LedgerKey {
    fn from(entity: EntityRef) -> Self {
        Self::Object(entity)
    }
}

/// Ledgers keyed by parent, each behind its own lock so callers working on
/// different parents never contend.
///
/// The map lock is never held while a ledger lock is awaited.
#[derive(Default)]
pub struct SharedLedgers {
    ledgers: RwLock<HashMap<LedgerKey, Arc<Mutex<PendingJoinLedger>>>>,
}

impl SharedLedgers {
    pub fn new() -> Self {
        Self::default()
    }

    /// The ledger for `key`, created empty on first use.
    pub async fn ledger(&self, key: &LedgerKey) -> Arc<Mutex<PendingJoinLedger>> {
        if let Some(ledger) = self.registered(key).await {
            return ledger;
        }
        self.ledgers
            .write()
            .await
            .entry(key.clone())
            .or_default()
            .clone()
    }

    pub async fn stage(&self, key: &LedgerKey, refs: &[EntityRef], action: JoinAction) {
        self.with_ledger(key, |ledger| ledger.stage(refs, action)).await;
    }

    pub async fn stage_targets(&self, key: &LedgerKey, targets: &[MappingTarget]) {
        self.with_ledger(key, |ledger| ledger.stage_targets(targets)).await;
    }

    /// Copy of the ledger for `key`, empty if none exists.
    pub async fn snapshot(&self, key: &LedgerKey) -> PendingJoinLedger {
        match self.registered(key).await {
            Some(ledger) => ledger.lock().await.clone(),
            None => PendingJoinLedger::new(),
        }
    }

    /// Commits the ledger for `key` against `parent`, the persisted object.
    ///
    /// A ledger the commit leaves empty is dropped. A ledger with a failed
    /// half stays registered so the caller can commit it again.
    pub async fn commit(
        &self,
        key: &LedgerKey,
        parent: &EntityRef,
        service: &dyn MappingService,
    ) -> CommitReport {
        let Some(ledger) = self.registered(key).await else {
            return CommitReport::default();
        };
        let mut guard = ledger.lock().await;
        let report = guard.commit(parent, service).await;
        if guard.is_empty() {
            let mut ledgers = self.ledgers.write().await;
            if ledgers.get(key).is_some_and(|current| Arc::ptr_eq(current, &ledger)) {
                ledgers.remove(key);
                debug!("Released committed ledger for {}", key);
            }
        }
        report
    }

    /// Drops the ledger for `key` and everything staged in it.
    pub async fn discard(&self, key: &LedgerKey) {
        if let Some(ledger) = self.remove(key).await {
            ledger.lock().await.discard();
        }
    }

    pub async fn len(&self) -> usize {
        self.ledgers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.ledgers.read().await.is_empty()
    }

    async fn registered(&self, key: &LedgerKey) -> Option<Arc<Mutex<PendingJoinLedger>>> {
        self.ledgers.read().await.get(key).cloned()
    }

    /// Runs `f` on the ledger registered for `key`. A ledger released by a
    /// concurrent commit or discard while this call waited for its lock is
    /// skipped and the registered one is used instead.
    async fn with_ledger<R>(&self, key: &LedgerKey, f: impl FnOnce(&mut PendingJoinLedger) -> R) -> R {
        let mut guard = loop {
            let ledger = self.ledger(key).await;
            let guard = ledger.clone().lock_owned().await;
            let still_registered = self
                .registered(key)
                .await
                .is_some_and(|current| Arc::ptr_eq(&current, &ledger));
            if still_registered {
                break guard;
            }
        };
        f(&mut guard)
    }

    async fn remove(&self, key: &LedgerKey) -> Option<Arc<Mutex<PendingJoinLedger>>> {
        let removed = self.ledgers.write().await.remove(key);
        if removed.is_some() {
            debug!("Dropped ledger for {}", key);
        }
        removed
    }
}
