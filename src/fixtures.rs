#[cfg(test)]
pub mod test {
    use std::collections::HashMap;

    /// A pyproject file with a typical release section next to unrelated tables.
    pub const PYPROJECT: &str = r#"[project]
name = "demo"
version = "1.2.0"

[tool.black]
line-length = 88

[tool.semantic_release]
version_toml = ["pyproject.toml:project.version"]
commit_parser = "angular"
build_command = "python -m build"

[tool.semantic_release.branches.main]
match = "(main|master)"
prerelease = false

[tool.semantic_release.branches.beta]
match = "beta/.*"
prerelease = true
prerelease_token = "beta"

[tool.semantic_release.remote]
type = "github"
"#;

    pub fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    pub fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        vars(pairs).into_iter().collect()
    }

    #[test]
    fn pyproject_fixture_is_valid_toml() {
        let document: toml::Table = toml::from_str(PYPROJECT).unwrap();
        assert!(document["tool"]["semantic_release"].is_table());
    }
}
