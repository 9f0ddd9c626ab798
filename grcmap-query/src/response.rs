//! Decoding of query batch responses.

use crate::compiler::CompiledQuery;
use crate::descriptor::{QueryDescriptor, ResultKind};
use crate::error::{QueryError, QueryResult};
use crate::mega::{self, MegaOverrides};
use grcmap_types::{EntityRef, MegaRelation, ObjectId};
use serde_json::Value;
use std::collections::HashSet;

/// The decoded result of one descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultSet {
    Values { values: Vec<Value>, total: u64 },
    Ids(Vec<ObjectId>),
    Count(u64),
}

impl ResultSet {
    /// Decodes `response`, which is keyed by the descriptor's object name.
    pub fn decode(descriptor: &QueryDescriptor, response: &Value) -> QueryResult<Self> {
        let name = descriptor.object_name().as_str();
        let body = response
            .get(name)
            .ok_or_else(|| QueryError::MalformedResponse(format!("missing result for {name}")))?;

        match descriptor.result_kind() {
            ResultKind::Values => {
                let values = body
                    .get("values")
                    .and_then(Value::as_array)
                    .cloned()
                    .ok_or_else(|| {
                        QueryError::MalformedResponse(format!("{name}: missing values"))
                    })?;
                let total = body
                    .get("total")
                    .and_then(Value::as_u64)
                    .unwrap_or(values.len() as u64);
                Ok(Self::Values { values, total })
            }
            ResultKind::Ids => {
                let ids = body
                    .get("ids")
                    .and_then(Value::as_array)
                    .ok_or_else(|| QueryError::MalformedResponse(format!("{name}: missing ids")))?
                    .iter()
                    .map(|id| {
                        id.as_i64().ok_or_else(|| {
                            QueryError::MalformedResponse(format!("{name}: non-integer id {id}"))
                        })
                    })
                    .collect::<QueryResult<Vec<_>>>()?;
                Ok(Self::Ids(ids))
            }
            ResultKind::Count => body
                .get("count")
                .and_then(Value::as_u64)
                .map(Self::Count)
                .ok_or_else(|| QueryError::MalformedResponse(format!("{name}: missing count"))),
        }
    }

    pub fn ids(&self) -> HashSet<ObjectId> {
        match self {
            Self::Ids(ids) => ids.iter().copied().collect(),
            Self::Values { values, .. } => values
                .iter()
                .filter_map(|v| v.get("id").and_then(Value::as_i64))
                .collect(),
            Self::Count(_) => HashSet::new(),
        }
    }
}

/// One search hit as presented to the selection list.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultItem {
    pub entity: EntityRef,
    /// The raw object as returned by the service.
    pub data: Value,
    /// Already mapped to the base object.
    pub is_mapped: bool,
    /// Not selectable.
    pub disabled: bool,
    /// Mega direction: `Some(true)` child, `Some(false)` parent, `None` undecided.
    pub map_as_child: Option<bool>,
    /// `map_as_child` comes from an existing backend relation and is not
    /// subject to user overrides.
    pub relation_fixed: bool,
    /// The base object itself.
    pub is_self: bool,
}

impl ResultItem {
    pub fn new(entity: EntityRef) -> Self {
        Self {
            entity,
            data: Value::Null,
            is_mapped: false,
            disabled: false,
            map_as_child: None,
            relation_fixed: false,
            is_self: false,
        }
    }

    /// Builds an item from a service object carrying at least `id` and `type`.
    pub fn from_value(data: Value) -> QueryResult<Self> {
        let entity: EntityRef = serde_json::from_value(data.clone())?;
        Ok(Self {
            data,
            ..Self::new(entity)
        })
    }

    pub fn relation(&self) -> Option<MegaRelation> {
        self.map_as_child.map(MegaRelation::from_is_child)
    }
}

/// A decoded search batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOutcome {
    pub items: Vec<ResultItem>,
    /// Ids of a primary `ids` query ("select all").
    pub ids: Vec<ObjectId>,
    /// Total matches of the primary query.
    pub total: u64,
    pub related_ids: HashSet<ObjectId>,
    pub parent_ids: HashSet<ObjectId>,
    pub child_ids: HashSet<ObjectId>,
}

impl CompiledQuery {
    /// Decodes a positionally-ordered response to this batch.
    pub fn decode(&self, responses: &[Value]) -> QueryResult<SearchOutcome> {
        if responses.len() != self.request.len() {
            return Err(QueryError::MalformedResponse(format!(
                "expected {} results, got {}",
                self.request.len(),
                responses.len()
            )));
        }
        let decode_at = |index: usize| ResultSet::decode(&self.request[index], &responses[index]);
        let ids_at = |index: Option<usize>| -> QueryResult<HashSet<ObjectId>> {
            index.map_or(Ok(HashSet::new()), |i| decode_at(i).map(|set| set.ids()))
        };

        let mut outcome = SearchOutcome {
            related_ids: ids_at(self.indices.related)?,
            parent_ids: ids_at(self.indices.parent)?,
            child_ids: ids_at(self.indices.child)?,
            ..SearchOutcome::default()
        };

        match decode_at(self.indices.primary)? {
            ResultSet::Values { values, total } => {
                outcome.items = values
                    .into_iter()
                    .map(ResultItem::from_value)
                    .collect::<QueryResult<_>>()?;
                outcome.total = total;
            }
            ResultSet::Ids(ids) => {
                outcome.total = ids.len() as u64;
                outcome.ids = ids;
            }
            ResultSet::Count(count) => outcome.total = count,
        }
        Ok(outcome)
    }

    /// Decodes, marks already-mapped items and, in mega mode, classifies each
    /// item's direction.
    pub fn resolve(
        &self,
        responses: &[Value],
        overrides: &MegaOverrides,
        default_relation: MegaRelation,
    ) -> QueryResult<SearchOutcome> {
        let mut outcome = self.decode(responses)?;
        if self.is_mega() {
            let mapped: HashSet<ObjectId> = outcome
                .parent_ids
                .union(&outcome.child_ids)
                .copied()
                .collect();
            mega::mark_mapped(&mut outcome.items, &mapped);
            mega::classify(
                &mut outcome.items,
                &outcome.parent_ids,
                &outcome.child_ids,
                overrides,
                default_relation,
                self.base.as_ref(),
            );
        } else {
            mega::mark_mapped(&mut outcome.items, &outcome.related_ids);
        }
        Ok(outcome)
    }
}
