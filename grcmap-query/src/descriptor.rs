//! Query descriptors: one entry of a batch sent to the query execution service.

use crate::filter::FilterExpression;
use grcmap_types::{ObjectId, TypeName};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a descriptor asks the service to return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    /// Full objects plus a total, one page at a time.
    #[default]
    Values,
    /// Every matching id, unpaged.
    Ids,
    /// Just the number of matches.
    Count,
}

impl ResultKind {
    /// Only value queries are paged and sorted.
    pub fn is_paged(&self) -> bool {
        matches!(self, Self::Values)
    }
}

/// Relationship operation of a relevance filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelevanceOp {
    Relevant,
    Parent,
    Child,
    Owned,
}

impl fmt::Display for RelevanceOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Relevant => "relevant",
            Self::Parent => "parent",
            Self::Child => "child",
            Self::Owned => "owned",
        })
    }
}

/// "Objects related to `object_name#ids` via `op`".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelevanceFilter {
    pub object_name: TypeName,
    pub ids: Vec<ObjectId>,
    pub op: RelevanceOp,
}

impl RelevanceFilter {
    pub fn new(object_name: impl Into<TypeName>, ids: Vec<ObjectId>, op: RelevanceOp) -> Self {
        Self {
            object_name: object_name.into(),
            ids,
            op,
        }
    }

    pub fn relevant(object_name: impl Into<TypeName>, id: ObjectId) -> Self {
        Self::new(object_name, vec![id], RelevanceOp::Relevant)
    }
}

/// Permission level results must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryPermission {
    Read,
    Update,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// One-based page selection plus sort order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Paging {
    pub current: u32,
    pub page_size: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<SortKey>,
}

impl Paging {
    pub fn new(current: u32, page_size: u32) -> Self {
        Self {
            current: current.max(1),
            page_size,
            sort: Vec::new(),
        }
    }

    #[must_use]
    pub fn sorted_by(mut self, key: SortKey) -> Self {
        self.sort.push(key);
        self
    }

    /// Zero-based `[first, last)` slice this page covers.
    pub fn limit(&self) -> (u64, u64) {
        let first = u64::from(self.current.saturating_sub(1)) * u64::from(self.page_size);
        (first, first + u64::from(self.page_size))
    }
}

impl Default for Paging {
    fn default() -> Self {
        Self::new(1, 10)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct QueryFilters {
    pub expression: FilterExpression,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub relevance: Vec<RelevanceFilter>,
}

/// A single query in a batch.
///
/// Built through [`QueryDescriptor::builder`], which guarantees that only
/// `values` queries carry paging.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct QueryDescriptor {
    object_name: TypeName,
    filters: QueryFilters,
    #[serde(skip_serializing_if = "Option::is_none")]
    paging: Option<Paging>,
    #[serde(rename = "type")]
    result_kind: ResultKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    permissions: Option<QueryPermission>,
}

impl QueryDescriptor {
    pub fn builder(object_name: impl Into<TypeName>) -> QueryDescriptorBuilder {
        QueryDescriptorBuilder {
            object_name: object_name.into(),
            expression: FilterExpression::Empty,
            relevance: Vec::new(),
            paging: None,
            result_kind: ResultKind::Values,
            permissions: None,
        }
    }

    pub fn object_name(&self) -> &TypeName {
        &self.object_name
    }

    pub fn expression(&self) -> &FilterExpression {
        &self.filters.expression
    }

    pub fn relevance(&self) -> &[RelevanceFilter] {
        &self.filters.relevance
    }

    pub fn paging(&self) -> Option<&Paging> {
        self.paging.as_ref()
    }

    pub fn result_kind(&self) -> ResultKind {
        self.result_kind
    }

    pub fn permissions(&self) -> Option<QueryPermission> {
        self.permissions
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[derive(Debug, Clone)]
pub struct QueryDescriptorBuilder {
    object_name: TypeName,
    expression: FilterExpression,
    relevance: Vec<RelevanceFilter>,
    paging: Option<Paging>,
    result_kind: ResultKind,
    permissions: Option<QueryPermission>,
}

impl QueryDescriptorBuilder {
    /// ANDs `expression` onto the filter built so far.
    #[must_use]
    pub fn filter(mut self, expression: FilterExpression) -> Self {
        self.expression = std::mem::take(&mut self.expression).join(expression);
        self
    }

    #[must_use]
    pub fn relevant_to(mut self, filter: RelevanceFilter) -> Self {
        self.relevance.push(filter);
        self
    }

    #[must_use]
    pub fn paging(mut self, paging: Paging) -> Self {
        self.paging = Some(paging);
        self
    }

    #[must_use]
    pub fn result_kind(mut self, kind: ResultKind) -> Self {
        self.result_kind = kind;
        self
    }

    #[must_use]
    pub fn permissions(mut self, permissions: QueryPermission) -> Self {
        self.permissions = Some(permissions);
        self
    }

    pub fn build(self) -> QueryDescriptor {
        let paging = if self.result_kind.is_paged() {
            self.paging
        } else {
            None
        };
        QueryDescriptor {
            object_name: self.object_name,
            filters: QueryFilters {
                expression: self.expression,
                relevance: self.relevance,
            },
            paging,
            result_kind: self.result_kind,
            permissions: self.permissions,
        }
    }
}
