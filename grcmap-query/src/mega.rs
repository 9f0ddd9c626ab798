//! Mega-relation resolution and "already mapped" marking of search results.

use crate::response::ResultItem;
use grcmap_types::{EntityRef, MegaRelation, ObjectId};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Assigns each item's mega direction.
///
/// Precedence, first match wins: membership in `child_ids`, membership in
/// `parent_ids`, a user override, `default_relation`. The base object itself
/// is then forced to `map_as_child = None`, flagged `is_self` and disabled
/// whatever the earlier steps decided.
pub fn classify(
    items: &mut [ResultItem],
    parent_ids: &HashSet<ObjectId>,
    child_ids: &HashSet<ObjectId>,
    overrides: &MegaOverrides,
    default_relation: MegaRelation,
    base: Option<&EntityRef>,
) {
    for item in items.iter_mut() {
        let id = item.entity.id;
        let (relation, fixed) = if child_ids.contains(&id) {
            (MegaRelation::Child, true)
        } else if parent_ids.contains(&id) {
            (MegaRelation::Parent, true)
        } else if let Some(relation) = overrides.get(id) {
            (relation, false)
        } else {
            (default_relation, false)
        };
        item.map_as_child = Some(relation.is_child());
        item.relation_fixed = fixed;
        item.is_self = false;

        if base.is_some_and(|base| *base == item.entity) {
            item.map_as_child = None;
            item.is_self = true;
            item.disabled = true;
        }
    }
}

/// Flags items whose id is in `mapped_ids` as mapped and not selectable.
pub fn mark_mapped(items: &mut [ResultItem], mapped_ids: &HashSet<ObjectId>) {
    for item in items.iter_mut() {
        if mapped_ids.contains(&item.entity.id) {
            item.is_mapped = true;
            item.disabled = true;
        }
    }
}

/// Per-object direction toggles made by the user in a mega mapper.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MegaOverrides {
    relations: HashMap<ObjectId, MegaRelation>,
}

impl MegaOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, id: ObjectId, relation: MegaRelation) {
        self.relations.insert(id, relation);
    }

    pub fn get(&self, id: ObjectId) -> Option<MegaRelation> {
        self.relations.get(&id).copied()
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<MegaRelation> {
        self.relations.remove(&id)
    }

    pub fn clear(&mut self) {
        self.relations.clear();
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    /// Relation tag for each selected item, as sent to the mapping service.
    ///
    /// A direction fixed by a backend relation always wins. Otherwise an
    /// override recorded after [`classify`] ran replaces the classified
    /// default. The base object is never included.
    pub fn collect(&self, selected: &[ResultItem]) -> BTreeMap<ObjectId, MegaRelation> {
        selected
            .iter()
            .filter(|item| !item.is_self)
            .filter_map(|item| {
                let relation = if item.relation_fixed {
                    item.relation()
                } else {
                    self.get(item.entity.id).or_else(|| item.relation())
                };
                relation.map(|relation| (item.entity.id, relation))
            })
            .collect()
    }
}
