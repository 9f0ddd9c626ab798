//! TOML shape of a rules file.
//!
//! ```toml
//! [forbidden]
//! one_way = [["Issue", "Audit"]]
//! two_way = [["Audit", "Program"]]
//!
//! [rules.related_object]
//! map = ["Program", "Control"]
//!
//! [rules.Control]
//! mixins = ["related_object", { map = ["Objective"] }]
//! map = ["Control"]
//! ```

use crate::decl::{Mixin, RuleDecl};
use crate::error::RuleResult;
use crate::forbidden::ForbiddenPairs;
use grcmap_types::TypeName;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Deserialize)]
pub(crate) struct RulesFile {
    #[serde(default)]
    forbidden: ForbiddenSection,
    #[serde(default)]
    rules: BTreeMap<String, DeclSection>,
}

#[derive(Deserialize, Default)]
struct ForbiddenSection {
    #[serde(default)]
    one_way: Vec<[String; 2]>,
    #[serde(default)]
    two_way: Vec<[String; 2]>,
}

#[derive(Deserialize, Default)]
struct DeclSection {
    #[serde(default)]
    mixins: Vec<MixinEntry>,
    #[serde(default)]
    create: Vec<String>,
    #[serde(default)]
    map: Vec<String>,
    #[serde(default)]
    unmap: Vec<String>,
    #[serde(default)]
    external_map: Vec<String>,
    #[serde(default)]
    external_unmap: Vec<String>,
    #[serde(default)]
    indirect: Vec<String>,
    #[serde(default)]
    mega: Option<bool>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MixinEntry {
    Named(String),
    Inline(Box<DeclSection>),
}

impl RulesFile {
    pub(crate) fn into_parts(self) -> RuleResult<(Vec<(TypeName, RuleDecl)>, ForbiddenPairs)> {
        let mut forbidden = ForbiddenPairs::new();
        for [source, target] in &self.forbidden.one_way {
            forbidden = forbidden.one_way(source, target);
        }
        for [a, b] in &self.forbidden.two_way {
            forbidden = forbidden.two_way(a, b);
        }

        let mut declarations = Vec::with_capacity(self.rules.len());
        for (name, section) in self.rules {
            let name = TypeName::parse(&name)?;
            declarations.push((name, section.into_decl()?));
        }
        Ok((declarations, forbidden))
    }
}

impl DeclSection {
    fn into_decl(self) -> RuleResult<RuleDecl> {
        let mut mixins = Vec::with_capacity(self.mixins.len());
        for entry in self.mixins {
            mixins.push(match entry {
                MixinEntry::Named(name) => Mixin::Named(name),
                MixinEntry::Inline(section) => Mixin::Inline(Box::new(section.into_decl()?)),
            });
        }

        Ok(RuleDecl {
            mixins,
            create: names(self.create)?,
            map: names(self.map)?,
            unmap: names(self.unmap)?,
            external_map: names(self.external_map)?,
            external_unmap: names(self.external_unmap)?,
            indirect: names(self.indirect)?,
            mega: self.mega,
        })
    }
}

fn names(raw: Vec<String>) -> RuleResult<BTreeSet<TypeName>> {
    raw.iter()
        .map(|name| TypeName::parse(name).map_err(Into::into))
        .collect()
}
