//! Type pairs that may never be mapped through the generic mapper.

use grcmap_types::TypeName;

/// Forbidden `(source, target)` pairs, compared case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForbiddenPairs {
    /// Ordered pairs: mapping `source` onto `target` is refused, the reverse
    /// direction and unmapping are not.
    one_way: Vec<(TypeName, TypeName)>,
    /// Unordered pairs refused in both directions.
    two_way: Vec<(TypeName, TypeName)>,
}

impl ForbiddenPairs {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn one_way(mut self, source: &str, target: &str) -> Self {
        self.one_way.push((source.into(), target.into()));
        self
    }

    #[must_use]
    pub fn two_way(mut self, a: &str, b: &str) -> Self {
        self.two_way.push((a.into(), b.into()));
        self
    }

    pub fn is_one_way_forbidden(&self, source: &str, target: &str) -> bool {
        self.one_way
            .iter()
            .any(|(s, t)| s.eq_ignore_case(source) && t.eq_ignore_case(target))
    }

    pub fn is_two_way_forbidden(&self, a: &str, b: &str) -> bool {
        self.two_way.iter().any(|(x, y)| {
            (x.eq_ignore_case(a) && y.eq_ignore_case(b))
                || (x.eq_ignore_case(b) && y.eq_ignore_case(a))
        })
    }

    pub fn one_way_pairs(&self) -> &[(TypeName, TypeName)] {
        &self.one_way
    }

    pub fn two_way_pairs(&self) -> &[(TypeName, TypeName)] {
        &self.two_way
    }
}
