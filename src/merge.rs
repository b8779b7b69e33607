use toml::{Table, Value};

/// Deep-merge `overlay` on top of `base`.
///
/// Tables present on both sides are merged recursively; for any other pair the
/// overlay's value replaces the base's. Arrays are replaced, not concatenated.
pub fn deep_merge(mut base: Table, overlay: Table) -> Table {
    for (key, overlay_val) in overlay {
        let merged = match (base.remove(&key), overlay_val) {
            (Some(Value::Table(base_tbl)), Value::Table(overlay_tbl)) => {
                Value::Table(deep_merge(base_tbl, overlay_tbl))
            }
            (_, overlay_val) => overlay_val,
        };
        base.insert(key, merged);
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(toml_str: &str) -> Table {
        toml_str.parse::<Table>().unwrap()
    }

    #[test]
    fn overlay_adds_and_replaces_scalars() {
        let merged = deep_merge(
            table("tag_format = \"v{version}\"\nmajor_on_zero = true"),
            table("major_on_zero = false"),
        );
        assert_eq!(merged["tag_format"].as_str(), Some("v{version}"));
        assert_eq!(merged["major_on_zero"].as_bool(), Some(false));
    }

    #[test]
    fn sections_merge_key_by_key() {
        let base = table(
            r#"
            [remote]
            type = "gitlab"
            domain = "git.example.com"
            "#,
        );
        let overlay = table(
            r#"
            [remote]
            type = "gitea"
            "#,
        );
        let merged = deep_merge(base, overlay);
        let remote = merged["remote"].as_table().unwrap();
        assert_eq!(remote["type"].as_str(), Some("gitea"));
        assert_eq!(remote["domain"].as_str(), Some("git.example.com"));
    }

    #[test]
    fn arrays_are_replaced() {
        let merged = deep_merge(
            table("assets = [\"a.txt\", \"b.txt\"]"),
            table("assets = [\"c.txt\"]"),
        );
        let assets = merged["assets"].as_array().unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].as_str(), Some("c.txt"));
    }

    #[test]
    fn scalar_overlay_replaces_section() {
        let merged = deep_merge(
            table("[remote]\ntype = \"github\""),
            table("remote = \"origin\""),
        );
        assert_eq!(merged["remote"].as_str(), Some("origin"));
    }

    #[test]
    fn env_reference_table_merges_like_any_section() {
        let merged = deep_merge(
            table("[remote.token]\nenv = \"GH_TOKEN\""),
            table("[remote.token]\ndefault = \"dummy\""),
        );
        let token = merged["remote"]["token"].as_table().unwrap();
        assert_eq!(token["env"].as_str(), Some("GH_TOKEN"));
        assert_eq!(token["default"].as_str(), Some("dummy"));
    }

    #[test]
    fn empty_sides() {
        let base = table("tag_format = \"{version}\"");
        assert_eq!(deep_merge(base.clone(), Table::new()), base);
        assert_eq!(deep_merge(Table::new(), base.clone()), base);
    }

    #[test]
    fn later_layers_win() {
        let file = table("[branches.main]\nmatch = \"main\"\nprerelease = false");
        let env = table("[branches.main]\nprerelease = true");
        let cli = table("[branches.main]\nmatch = \"trunk\"");
        let merged = deep_merge(deep_merge(file, env), cli);
        let main = merged["branches"]["main"].as_table().unwrap();
        assert_eq!(main["match"].as_str(), Some("trunk"));
        assert_eq!(main["prerelease"].as_bool(), Some(true));
    }
}
