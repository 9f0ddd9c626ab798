use grcmap_rules::{RuleDiagnostic, RuleGraph};
use grcmap_types::TypeName;
use std::collections::BTreeSet;
use std::io::Write;

const RULES_TOML: &str = r#"
[forbidden]
one_way = [["Issue", "Audit"]]
two_way = [["Audit", "Program"]]

[rules.related_object]
map = ["Program", "Control", "Objective"]
unmap = ["Program", "Control", "Objective"]

[rules.Control]
mixins = ["related_object", { indirect = ["Audit"] }]
map = ["Control"]

[rules.Objective]
mixins = ["related_object", "nonexistent"]

[rules.Program]
mixins = ["related_object"]
map = ["Program"]
create = ["Audit"]
mega = true
"#;

fn set(names: &[&str]) -> BTreeSet<TypeName> {
    names.iter().map(|n| TypeName::from(*n)).collect()
}

#[test]
fn parses_rules_and_forbidden_pairs() {
    let g = RuleGraph::from_toml_str(RULES_TOML).unwrap();

    assert_eq!(g.resolve("Control").map, set(&["Program", "Control", "Objective"]));
    assert_eq!(g.resolve("Control").indirect, set(&["Audit"]));
    assert_eq!(g.resolve("Objective").map, set(&["Program", "Control"]));
    assert!(g.resolve("Program").mega);
    assert_eq!(g.resolve("Program").create, set(&["Audit"]));

    assert!(g.forbidden().is_one_way_forbidden("issue", "AUDIT"));
    assert!(!g.forbidden().is_one_way_forbidden("Audit", "Issue"));
    assert!(g.forbidden().is_two_way_forbidden("Program", "Audit"));
}

#[test]
fn unknown_mixin_in_file_is_a_diagnostic_not_an_error() {
    let g = RuleGraph::from_toml_str(RULES_TOML).unwrap();
    assert_eq!(
        g.diagnostics(),
        &[RuleDiagnostic::UnknownMixin {
            owner: "Objective".into(),
            mixin: "nonexistent".into(),
        }]
    );
}

#[test]
fn invalid_type_name_is_an_error() {
    let bad = "[rules.Control]\nmap = [\"Data Asset\"]\n";
    assert!(RuleGraph::from_toml_str(bad).is_err());
}

#[test]
fn malformed_toml_is_an_error() {
    assert!(RuleGraph::from_toml_str("[rules.Control\nmap = ").is_err());
}

#[test]
fn load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(RULES_TOML.as_bytes()).unwrap();
    let g = RuleGraph::load_from(file.path());
    assert_eq!(g.len(), 4);
    assert!(g.contains("related_object"));
}

#[test]
fn load_from_missing_file_uses_builtin() {
    let dir = tempfile::tempdir().unwrap();
    let g = RuleGraph::load_from(dir.path().join("rules.toml"));
    assert!(g.contains("Program"));
    assert!(g.resolve("Program").mega);
}

#[test]
fn load_from_malformed_file_uses_builtin() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"rules = 3").unwrap();
    let g = RuleGraph::load_from(file.path());
    assert!(g.contains("Control"));
}
