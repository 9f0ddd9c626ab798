//! The mapping rule graph: declarations resolved into flat per-type rule sets.

use crate::builtin::{builtin_declarations, builtin_forbidden};
use crate::decl::{Mixin, RuleAccumulator, RuleDecl};
use crate::error::{RuleDiagnostic, RuleResult};
use crate::file::RulesFile;
use crate::forbidden::ForbiddenPairs;
use crate::ruleset::{RuleField, TypeRuleSet};
use grcmap_model::load_or_fallback;
use grcmap_types::TypeName;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Resolved, immutable mapping rules for every declared type and mixin.
#[derive(Debug, Clone, Default)]
pub struct RuleGraph {
    resolved: HashMap<TypeName, TypeRuleSet>,
    forbidden: ForbiddenPairs,
    diagnostics: Vec<RuleDiagnostic>,
    empty: TypeRuleSet,
}

impl RuleGraph {
    /// Resolves all declarations. Problems are logged and recorded as
    /// diagnostics; resolution always completes.
    pub fn build(
        declarations: impl IntoIterator<Item = (TypeName, RuleDecl)>,
        forbidden: ForbiddenPairs,
    ) -> Self {
        let declarations: HashMap<TypeName, RuleDecl> = declarations.into_iter().collect();
        let mut resolver = Resolver {
            declarations: &declarations,
            cache: HashMap::new(),
            stack: Vec::new(),
            diagnostics: Vec::new(),
        };

        let mut names: Vec<&TypeName> = declarations.keys().collect();
        names.sort();
        for name in names {
            resolver.resolve_named(name.as_str());
        }

        let Resolver {
            cache, diagnostics, ..
        } = resolver;
        let resolved = cache
            .into_iter()
            .map(|(name, acc)| (name, acc.finish()))
            .collect();

        Self {
            resolved,
            forbidden,
            diagnostics,
            empty: TypeRuleSet::default(),
        }
    }

    /// The built-in GRC rule table.
    pub fn builtin() -> Self {
        Self::build(builtin_declarations(), builtin_forbidden())
    }

    /// Parses declarations and forbidden pairs from TOML.
    pub fn from_toml_str(contents: &str) -> RuleResult<Self> {
        let file: RulesFile = toml::from_str(contents)?;
        let (declarations, forbidden) = file.into_parts()?;
        Ok(Self::build(declarations, forbidden))
    }

    /// Loads a rules file, falling back to [`RuleGraph::builtin`] with a
    /// warning when the file is missing or malformed.
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        load_or_fallback(path.as_ref(), "rules file", Self::from_toml_str, Self::builtin)
    }

    /// Resolved rules for a type or mixin name; an empty set for names that
    /// were never declared.
    pub fn resolve(&self, name: &str) -> &TypeRuleSet {
        match self.resolved.get(name) {
            Some(rules) => rules,
            None => {
                debug!("No mapping rules declared for {}", name);
                &self.empty
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolved.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    pub fn forbidden(&self) -> &ForbiddenPairs {
        &self.forbidden
    }

    /// Problems encountered during resolution.
    pub fn diagnostics(&self) -> &[RuleDiagnostic] {
        &self.diagnostics
    }

    /// Returns true if `target` is in `source`'s `field` set.
    pub fn allows(&self, source: &str, field: RuleField, target: &str) -> bool {
        self.resolve(source).allows(field, target)
    }

    pub fn mappable_types(&self, source: &str) -> Vec<TypeName> {
        self.listed(source, RuleField::Map)
    }

    pub fn unmappable_types(&self, source: &str) -> Vec<TypeName> {
        self.listed(source, RuleField::Unmap)
    }

    pub fn creatable_types(&self, source: &str) -> Vec<TypeName> {
        self.listed(source, RuleField::Create)
    }

    pub fn indirect_types(&self, source: &str) -> Vec<TypeName> {
        self.listed(source, RuleField::Indirect)
    }

    fn listed(&self, source: &str, field: RuleField) -> Vec<TypeName> {
        self.resolve(source).field(field).iter().cloned().collect()
    }
}

struct Resolver<'a> {
    declarations: &'a HashMap<TypeName, RuleDecl>,
    cache: HashMap<TypeName, RuleAccumulator>,
    stack: Vec<String>,
    diagnostics: Vec<RuleDiagnostic>,
}

impl Resolver<'_> {
    fn resolve_named(&mut self, name: &str) -> Option<RuleAccumulator> {
        if let Some(done) = self.cache.get(name) {
            return Some(done.clone());
        }

        if let Some(pos) = self.stack.iter().position(|n| n == name) {
            let mut path = self.stack[pos..].to_vec();
            path.push(name.to_string());
            self.report(RuleDiagnostic::MixinCycle { path });
            return None;
        }

        let declarations = self.declarations;
        let (key, decl) = declarations.get_key_value(name)?;

        self.stack.push(name.to_string());
        let acc = self.resolve_decl(name, decl);
        self.stack.pop();

        self.cache.insert(key.clone(), acc.clone());
        Some(acc)
    }

    fn resolve_decl(&mut self, owner: &str, decl: &RuleDecl) -> RuleAccumulator {
        let mut acc = RuleAccumulator::default();

        for mixin in &decl.mixins {
            match mixin {
                Mixin::Named(mixin_name) => {
                    if self.declarations.contains_key(mixin_name.as_str()) {
                        if let Some(inherited) = self.resolve_named(mixin_name) {
                            acc.merge(&inherited);
                        }
                    } else {
                        self.report(RuleDiagnostic::UnknownMixin {
                            owner: owner.to_string(),
                            mixin: mixin_name.clone(),
                        });
                    }
                }
                Mixin::Inline(inline) => {
                    let inherited = self.resolve_decl(owner, inline);
                    acc.merge(&inherited);
                }
                Mixin::Transform(transform) => {
                    debug!("Applying rule transform {} to {}", transform.name(), owner);
                    transform.apply(&mut acc);
                }
            }
        }

        for field in RuleField::ALL {
            acc.rules
                .field_mut(field)
                .extend(decl.field(field).iter().cloned());
        }
        if decl.mega.is_some() {
            acc.mega = decl.mega;
        }

        // Inherited self-references are dropped; only a literal one survives.
        for field in [RuleField::Map, RuleField::Unmap] {
            if acc.contains(field, owner) && !decl.field(field).contains(owner) {
                acc.remove(field, owner);
            }
        }

        acc
    }

    fn report(&mut self, diagnostic: RuleDiagnostic) {
        if !self.diagnostics.contains(&diagnostic) {
            warn!("Mapping rules: {}", diagnostic);
            self.diagnostics.push(diagnostic);
        }
    }
}
