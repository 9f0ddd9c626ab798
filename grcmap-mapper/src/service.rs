//! Map/unmap execution boundary.

use crate::error::MapperResult;
use async_trait::async_trait;
use grcmap_types::{EntityRef, MegaRelation};
use serde::{Deserialize, Serialize};

/// One object to relate to a parent, with its mega direction if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingTarget {
    pub entity: EntityRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<MegaRelation>,
}

impl MappingTarget {
    pub fn new(entity: EntityRef) -> Self {
        Self {
            entity,
            relation: None,
        }
    }

    #[must_use]
    pub fn with_relation(mut self, relation: MegaRelation) -> Self {
        self.relation = Some(relation);
        self
    }
}

impl From<EntityRef> for MappingTarget {
    fn from(entity: EntityRef) -> Self {
        Self::new(entity)
    }
}

/// Creates and removes relationships in the system of record.
#[async_trait]
pub trait MappingService: Send + Sync {
    /// Relates every target to `source`.
    async fn map(&self, source: &EntityRef, targets: &[MappingTarget]) -> MapperResult<()>;

    /// Removes the relationship between `source` and every target.
    ///
    /// Implementations report a relationship that does not exist as
    /// [`crate::MapperError::RelationshipNotFound`].
    async fn unmap(&self, source: &EntityRef, targets: &[EntityRef]) -> MapperResult<()>;
}

/// A mock mapping service for testing.
pub mod mock {
    use super::*;
    use crate::error::MapperError;
    use std::collections::{HashSet, VecDeque};
    use std::sync::Mutex;

    /// A call received by [`MockMappingService`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum MappingCall {
        Map {
            source: EntityRef,
            targets: Vec<MappingTarget>,
        },
        Unmap {
            source: EntityRef,
            targets: Vec<EntityRef>,
        },
    }

    /// Records calls and keeps the set of existing relationships.
    #[derive(Debug, Default)]
    pub struct MockMappingService {
        calls: Mutex<Vec<MappingCall>>,
        relationships: Mutex<HashSet<(EntityRef, EntityRef)>>,
        map_failures: Mutex<VecDeque<String>>,
        unmap_failures: Mutex<VecDeque<String>>,
    }

    impl MockMappingService {
        pub fn new() -> Self {
            Self::default()
        }

        /// Seeds an existing relationship.
        pub fn relate(&self, source: EntityRef, target: EntityRef) {
            self.relationships.lock().unwrap().insert((source, target));
        }

        pub fn is_related(&self, source: &EntityRef, target: &EntityRef) -> bool {
            self.relationships
                .lock()
                .unwrap()
                .contains(&(source.clone(), target.clone()))
        }

        /// The next `map` call fails with a transport error.
        pub fn fail_next_map(&self, message: impl Into<String>) {
            self.map_failures.lock().unwrap().push_back(message.into());
        }

        /// The next `unmap` call fails with a transport error.
        pub fn fail_next_unmap(&self, message: impl Into<String>) {
            self.unmap_failures.lock().unwrap().push_back(message.into());
        }

        pub fn calls(&self) -> Vec<MappingCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl MappingService for MockMappingService {
        async fn map(&self, source: &EntityRef, targets: &[MappingTarget]) -> MapperResult<()> {
            self.calls.lock().unwrap().push(MappingCall::Map {
                source: source.clone(),
                targets: targets.to_vec(),
            });
            if let Some(message) = self.map_failures.lock().unwrap().pop_front() {
                return Err(MapperError::Transport(message));
            }
            let mut relationships = self.relationships.lock().unwrap();
            for target in targets {
                relationships.insert((source.clone(), target.entity.clone()));
            }
            Ok(())
        }

        async fn unmap(&self, source: &EntityRef, targets: &[EntityRef]) -> MapperResult<()> {
            self.calls.lock().unwrap().push(MappingCall::Unmap {
                source: source.clone(),
                targets: targets.to_vec(),
            });
            if let Some(message) = self.unmap_failures.lock().unwrap().pop_front() {
                return Err(MapperError::Transport(message));
            }
            let mut relationships = self.relationships.lock().unwrap();
            if let Some(missing) = targets
                .iter()
                .find(|t| !relationships.contains(&(source.clone(), (*t).clone())))
            {
                return Err(MapperError::RelationshipNotFound {
                    parent: source.clone(),
                    target: missing.clone(),
                });
            }
            for target in targets {
                relationships.remove(&(source.clone(), target.clone()));
            }
            Ok(())
        }
    }
}
