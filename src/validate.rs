//! Best-effort line numbers for validation errors in TOML documents.

use crate::error::ValidationFailure;

/// Fill in `line` for every error whose key can be found in `content`.
///
/// `root` is the table the configuration was read from, e.g.
/// `["tool", "semantic_release"]` for a pyproject file, or empty.
pub fn locate_lines(mut failure: ValidationFailure, content: &str, root: &[&str]) -> ValidationFailure {
    for error in failure.errors_mut() {
        let key = strip_index(&error.path);
        let mut full: Vec<&str> = root.to_vec();
        full.extend(key.split('.'));
        let line = find_key_line(content, &full);
        if line > 0 {
            error.line = Some(line);
        }
    }
    failure
}

/// `changelog.exclude_commit_patterns[2]` → `changelog.exclude_commit_patterns`
fn strip_index(path: &str) -> &str {
    match path.find('[') {
        Some(i) => &path[..i],
        None => path,
    }
}

/// Find the 1-indexed line number for a key in TOML content.
///
/// Tracks the current `[section]` header while scanning and only matches the
/// leaf key inside the expected section. Also matches a whole section by its
/// header (`[remote]` for the path `remote`) and one level of dotted keys
/// (`remote.type = ...` at the parent level). Quoted keys and inline tables are
/// not handled. Returns 0 if the key cannot be located.
fn find_key_line(content: &str, segments: &[&str]) -> usize {
    let Some((leaf, expected_section)) = segments.split_last() else {
        return 0;
    };

    let mut current_section: Vec<String> = Vec::new();

    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim();

        if trimmed.starts_with('[') && !trimmed.starts_with("[[") {
            let header = trimmed.trim_start_matches('[').trim_end_matches(']').trim();
            current_section = header.split('.').map(|s| s.trim().to_string()).collect();
            if current_section.iter().map(String::as_str).eq(segments.iter().copied()) {
                return i + 1;
            }
            continue;
        }

        let in_section = |section: &[&str]| {
            section.len() == current_section.len()
                && section.iter().zip(&current_section).all(|(a, b)| *a == b)
        };

        if in_section(expected_section) && assigns(trimmed, leaf) {
            return i + 1;
        }

        if let Some((parent_leaf, grandparent)) = expected_section.split_last()
            && in_section(grandparent)
            && assigns(trimmed, &format!("{parent_leaf}.{leaf}"))
        {
            return i + 1;
        }
    }
    0
}

fn assigns(line: &str, key: &str) -> bool {
    line.strip_prefix(key)
        .is_some_and(|after| after.trim_start().starts_with('='))
}
