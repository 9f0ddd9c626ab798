//! Pending join ledger: map/unmap intents staged against a parent that is
//! unsaved or being edited, committed once the parent is persisted.

use crate::error::MapperError;
use crate::service::{MappingService, MappingTarget};
use grcmap_types::{EntityRef, JoinAction, MegaRelation};
use tracing::{debug, info, warn};

/// One staged intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingJoin {
    pub what: EntityRef,
    pub how: JoinAction,
    /// Mega direction forwarded to the mapping service.
    pub relation: Option<MegaRelation>,
}

/// What a [`PendingJoinLedger::commit`] did.
///
/// `mapped` and `unmapped` list the entries whose half succeeded. A failed
/// half leaves its entries in the ledger and reports the error here.
#[derive(Debug, Default)]
pub struct CommitReport {
    pub mapped: Vec<EntityRef>,
    pub unmapped: Vec<EntityRef>,
    pub map_error: Option<MapperError>,
    pub unmap_error: Option<MapperError>,
}

impl CommitReport {
    pub fn is_success(&self) -> bool {
        self.map_error.is_none() && self.unmap_error.is_none()
    }

    pub fn is_empty(&self) -> bool {
        self.mapped.is_empty() && self.unmapped.is_empty()
    }

    /// The first failure, if any, otherwise the report itself.
    pub fn into_result(mut self) -> Result<Self, MapperError> {
        match self.map_error.take().or_else(|| self.unmap_error.take()) {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }
}

/// Ordered, duplicate-free list of staged intents for one parent.
///
/// Staging an action for an object that already has the opposite action
/// pending cancels both instead of recording a contradictory pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingJoinLedger {
    entries: Vec<PendingJoin>,
}

impl PendingJoinLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages `action` for every ref.
    pub fn stage(&mut self, refs: &[EntityRef], action: JoinAction) {
        for what in refs {
            self.stage_one(what.clone(), action, None);
        }
    }

    /// Stages a map of each target, keeping its mega direction.
    pub fn stage_targets(&mut self, targets: &[MappingTarget]) {
        for target in targets {
            self.stage_one(target.entity.clone(), JoinAction::Map, target.relation);
        }
    }

    /// Stages a single intent. A repeated intent only refreshes its relation.
    pub fn stage_one(&mut self, what: EntityRef, how: JoinAction, relation: Option<MegaRelation>) {
        let opposite = how.opposite();
        if let Some(pos) = self.position(&what, opposite) {
            self.entries.remove(pos);
            debug!("Staged {} of {} cancels pending {}", how, what, opposite);
            return;
        }
        if let Some(pos) = self.position(&what, how) {
            if relation.is_some() {
                self.entries[pos].relation = relation;
            }
            return;
        }
        debug!("Staged {} of {}", how, what);
        self.entries.push(PendingJoin {
            what,
            how,
            relation,
        });
    }

    pub fn entries(&self) -> &[PendingJoin] {
        &self.entries
    }

    pub fn pending_maps(&self) -> Vec<MappingTarget> {
        self.entries
            .iter()
            .filter(|e| e.how == JoinAction::Map)
            .map(|e| MappingTarget {
                entity: e.what.clone(),
                relation: e.relation,
            })
            .collect()
    }

    pub fn pending_unmaps(&self) -> Vec<EntityRef> {
        self.entries
            .iter()
            .filter(|e| e.how == JoinAction::Unmap)
            .map(|e| e.what.clone())
            .collect()
    }

    pub fn is_pending(&self, what: &EntityRef, how: JoinAction) -> bool {
        self.position(what, how).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every staged intent.
    pub fn discard(&mut self) {
        if !self.entries.is_empty() {
            debug!("Discarding {} pending joins", self.entries.len());
        }
        self.entries.clear();
    }

    /// Applies the staged intents to `parent`.
    ///
    /// The map and unmap halves run concurrently and both run to completion
    /// even if one fails. An empty half makes no call, so an empty ledger
    /// commits without touching the service. Succeeded halves are cleared;
    /// a failed half stays staged for a later retry.
    pub async fn commit(&mut self, parent: &EntityRef, service: &dyn MappingService) -> CommitReport {
        if self.entries.is_empty() {
            return CommitReport::default();
        }

        let maps = self.pending_maps();
        let unmaps = self.pending_unmaps();
        info!(
            "Committing {} maps and {} unmaps for {}",
            maps.len(),
            unmaps.len(),
            parent
        );

        let map_half = async {
            if maps.is_empty() {
                Ok(())
            } else {
                service.map(parent, &maps).await
            }
        };
        let unmap_half = async {
            if unmaps.is_empty() {
                Ok(())
            } else {
                service.unmap(parent, &unmaps).await
            }
        };
        let (map_result, unmap_result) = futures::join!(map_half, unmap_half);

        let mut report = CommitReport::default();
        match map_result {
            Ok(()) => {
                self.entries.retain(|e| e.how != JoinAction::Map);
                report.mapped = maps.into_iter().map(|t| t.entity).collect();
            }
            Err(e) => {
                warn!("Map half of commit for {} failed: {}", parent, e);
                report.map_error = Some(e);
            }
        }
        match unmap_result {
            Ok(()) => {
                self.entries.retain(|e| e.how != JoinAction::Unmap);
                report.unmapped = unmaps;
            }
            Err(e) => {
                warn!("Unmap half of commit for {} failed: {}", parent, e);
                report.unmap_error = Some(e);
            }
        }
        report
    }

    fn position(&self, what: &EntityRef, how: JoinAction) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.how == how && e.what == *what)
    }
}
