//! Mapper facade: checks compatibility, then stages or applies changes.

use crate::config::MapperConfig;
use crate::error::{MapperError, MapperResult};
use crate::ledger::CommitReport;
use crate::service::{MappingService, MappingTarget};
use crate::shared::{LedgerKey, SharedLedgers};
use grcmap_query::{MegaOverrides, QueryCompiler, QuerySpec, ResultItem};
use grcmap_rules::{CompatibilityEvaluator, MapOptions, PermissionOracle};
use grcmap_types::{EntityLike, EntityRef, JoinAction, TypeName};
use std::sync::Arc;
use tracing::{debug, info};

/// Where accepted changes go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapMode {
    /// Call the mapping service now. The parent must be persisted.
    Immediate,
    /// Stage into the ledger for the given parent until it is committed.
    Deferred(LedgerKey),
}

/// Result of a [`Mapper::map`] or [`Mapper::unmap`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingOutcome {
    /// Sent to the mapping service.
    pub applied: Vec<EntityRef>,
    /// Recorded in the parent's ledger.
    pub staged: Vec<EntityRef>,
    /// Managed by an external system; the caller must hand these off.
    pub external: Vec<EntityRef>,
}

impl MappingOutcome {
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty() && self.staged.is_empty() && self.external.is_empty()
    }
}

pub struct Mapper {
    compiler: QueryCompiler,
    service: Arc<dyn MappingService>,
    ledgers: Arc<SharedLedgers>,
    config: MapperConfig,
}

impl Mapper {
    pub fn new(compiler: QueryCompiler, service: Arc<dyn MappingService>, config: MapperConfig) -> Self {
        Self {
            compiler,
            service,
            ledgers: Arc::new(SharedLedgers::new()),
            config,
        }
    }

    /// Builds the registry, rule graph and compiler `config` points at.
    pub fn from_config(
        config: MapperConfig,
        permissions: Arc<dyn PermissionOracle>,
        service: Arc<dyn MappingService>,
    ) -> Self {
        let evaluator = CompatibilityEvaluator::new(Arc::new(config.rule_graph()), permissions);
        let compiler = QueryCompiler::new(Arc::new(config.registry()), evaluator)
            .with_snapshot_type(config.snapshot_type());
        Self::new(compiler, service, config)
    }

    /// Shares ledgers with other mappers.
    #[must_use]
    pub fn with_ledgers(mut self, ledgers: Arc<SharedLedgers>) -> Self {
        self.ledgers = ledgers;
        self
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    pub fn compiler(&self) -> &QueryCompiler {
        &self.compiler
    }

    pub fn evaluator(&self) -> &CompatibilityEvaluator {
        self.compiler.evaluator()
    }

    pub fn ledgers(&self) -> &Arc<SharedLedgers> {
        &self.ledgers
    }

    /// First-page search for `target_type` objects to map to `base`.
    pub fn search_spec(&self, base: &EntityLike, target_type: &TypeName) -> QuerySpec {
        self.compiler
            .mapper_spec(base, target_type)
            .with_paging(self.config.paging())
    }

    /// Targets for the selectable items of `selected`, tagged with their
    /// mega direction where one was resolved.
    pub fn selection(&self, selected: &[ResultItem], overrides: &MegaOverrides) -> Vec<MappingTarget> {
        let relations = overrides.collect(selected);
        selected
            .iter()
            .filter(|item| !item.disabled)
            .map(|item| MappingTarget {
                entity: item.entity.clone(),
                relation: relations.get(&item.entity.id).copied(),
            })
            .collect()
    }

    /// Maps `targets` to `parent`.
    ///
    /// Every target is checked before anything is staged or sent; one refused
    /// target fails the whole call. Externally managed targets are set aside
    /// in [`MappingOutcome::external`].
    pub async fn map(
        &self,
        parent: &EntityLike,
        targets: &[MappingTarget],
        mode: &MapMode,
    ) -> MapperResult<MappingOutcome> {
        let parent_type = parent.effective_type();
        let source = parent.entity();
        let options = MapOptions {
            parent_is_snapshot: parent.is_snapshot(),
            ..MapOptions::default()
        };

        let mut outcome = MappingOutcome::default();
        let mut accepted = Vec::new();
        for target in targets {
            let target_type = target.entity.effective_type();
            if self
                .evaluator()
                .is_externally_mapped(parent_type.as_str(), target_type.as_str())
            {
                debug!("Mapping {} to {} is externally managed", target.entity, parent_type);
                outcome.external.push(target.entity.clone());
                continue;
            }
            let candidate = EntityLike::Ref(target.entity.clone());
            if !self.evaluator().can_map(parent, &candidate, &options) {
                return Err(MapperError::NotAllowed {
                    action: JoinAction::Map,
                    parent: parent_type.clone(),
                    target: target.entity.clone(),
                });
            }
            let mut target = target.clone();
            if target.relation.is_none() && self.evaluator().is_mega_mapping(parent, &candidate) {
                target.relation = Some(self.config.default_relation);
            }
            accepted.push(target);
        }
        if accepted.is_empty() {
            return Ok(outcome);
        }

        let entities: Vec<EntityRef> = accepted.iter().map(|t| t.entity.clone()).collect();
        match (mode, source) {
            (MapMode::Deferred(key), _) => {
                self.ledgers.stage_targets(key, &accepted).await;
                outcome.staged = entities;
            }
            (MapMode::Immediate, Some(source)) => {
                self.service.map(source, &accepted).await?;
                info!("Mapped {} objects to {}", entities.len(), source);
                outcome.applied = entities;
            }
            (MapMode::Immediate, None) => {
                return Err(MapperError::ParentNotPersisted(parent_type.clone()));
            }
        }
        Ok(outcome)
    }

    /// Unmaps `targets` from `parent`; the mirror of [`Self::map`].
    pub async fn unmap(
        &self,
        parent: &EntityLike,
        targets: &[EntityRef],
        mode: &MapMode,
    ) -> MapperResult<MappingOutcome> {
        let parent_type = parent.effective_type();
        let source = parent.entity();

        let mut outcome = MappingOutcome::default();
        let mut accepted = Vec::new();
        for target in targets {
            let target_type = target.effective_type();
            if self
                .evaluator()
                .is_externally_unmapped(parent_type.as_str(), target_type.as_str())
            {
                debug!("Unmapping {} from {} is externally managed", target, parent_type);
                outcome.external.push(target.clone());
                continue;
            }
            if !self.evaluator().can_unmap(parent, &EntityLike::Ref(target.clone())) {
                return Err(MapperError::NotAllowed {
                    action: JoinAction::Unmap,
                    parent: parent_type.clone(),
                    target: target.clone(),
                });
            }
            accepted.push(target.clone());
        }
        if accepted.is_empty() {
            return Ok(outcome);
        }

        match (mode, source) {
            (MapMode::Deferred(key), _) => {
                self.ledgers.stage(key, &accepted, JoinAction::Unmap).await;
                outcome.staged = accepted;
            }
            (MapMode::Immediate, Some(source)) => {
                self.service.unmap(source, &accepted).await?;
                info!("Unmapped {} objects from {}", accepted.len(), source);
                outcome.applied = accepted;
            }
            (MapMode::Immediate, None) => {
                return Err(MapperError::ParentNotPersisted(parent_type.clone()));
            }
        }
        Ok(outcome)
    }

    /// Applies the ledger for `key` to the now persisted `parent`.
    pub async fn commit(&self, key: &LedgerKey, parent: &EntityRef) -> CommitReport {
        self.ledgers.commit(key, parent, self.service.as_ref()).await
    }

    pub async fn discard(&self, key: &LedgerKey) {
        self.ledgers.discard(key).await;
    }
}
