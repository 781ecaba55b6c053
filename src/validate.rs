//! Unknown-key detection for config files.
//!
//! A key is known when it is a leaf's dotted name, or a section on the way to
//! one. In strict mode unknown keys fail the invocation with their file path
//! and best-effort line number; otherwise they are logged and ignored.

use std::collections::HashSet;
use std::path::Path;

use toml::Table;

use crate::error::CmdError;

/// Collect the dotted paths in `table` that no leaf accounts for.
pub(crate) fn unknown_keys<'a>(table: &Table, leaves: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let leaves: HashSet<&str> = leaves.into_iter().collect();
    let mut unknown = Vec::new();
    walk(table, "", &leaves, &mut unknown);
    unknown
}

fn walk(table: &Table, prefix: &str, leaves: &HashSet<&str>, unknown: &mut Vec<String>) {
    for (key, value) in table {
        let dotted = format!("{prefix}{key}");
        if leaves.contains(dotted.as_str()) {
            continue;
        }
        let section = format!("{dotted}.");
        match value.as_table() {
            Some(inner) if leaves.iter().any(|leaf| leaf.starts_with(&section)) => {
                walk(inner, &section, leaves, unknown);
            }
            _ => unknown.push(dotted),
        }
    }
}

/// Fail with one [`CmdError::UnknownKey`] per unknown key in the file.
pub(crate) fn reject_unknown_keys(
    keys: Vec<String>,
    content: &str,
    path: &Path,
) -> Result<(), CmdError> {
    if keys.is_empty() {
        return Ok(());
    }
    let errors = keys
        .into_iter()
        .map(|key| CmdError::UnknownKey {
            line: find_key_line(content, &key),
            key,
            path: path.to_path_buf(),
        })
        .collect();
    Err(CmdError::UnknownKeys(errors))
}

/// Find the 1-indexed line of a dotted key in TOML content.
///
/// Tracks `[section]` headers while scanning so `child.typo` only matches a
/// `typo =` line inside `[child]`. Matching ignores case, since file keys
/// are lowercased before validation. Quoted keys, inline tables and other
/// formats aren't handled; returns 0 when the key can't be located.
fn find_key_line(content: &str, dotted_key: &str) -> usize {
    let (section, leaf) = match dotted_key.rsplit_once('.') {
        Some((s, l)) => (s, l),
        None => ("", dotted_key),
    };

    let mut current = String::new();
    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim().to_lowercase();
        if trimmed.starts_with('[') && !trimmed.starts_with("[[") {
            current = trimmed
                .trim_start_matches('[')
                .trim_end_matches(']')
                .split('.')
                .map(str::trim)
                .collect::<Vec<_>>()
                .join(".");
            continue;
        }
        if current == section
            && let Some(rest) = trimmed.strip_prefix(&leaf.to_lowercase())
            && rest.trim_start().starts_with('=')
        {
            return i + 1;
        }
    }
    0
}
