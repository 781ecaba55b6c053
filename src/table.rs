//! Dotted-key access and layering for `toml::Table`.
//!
//! Every source (defaults, file, env, flags) is built as a sparse nested table
//! keyed by the leaves' dotted names, then layered with [`deep_merge`].

use toml::{Table, Value};

/// Insert `value` at a dotted path, creating intermediate tables.
///
/// `("child.decimal", 1.2)` becomes `{child = {decimal = 1.2}}`. An existing
/// non-table value on the way is replaced by a table.
pub(crate) fn insert_dotted(table: &mut Table, dotted_key: &str, value: Value) {
    let mut segments = dotted_key.split('.').peekable();
    let mut current = table;

    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            current.insert(segment.to_string(), value);
            return;
        }
        let entry = current
            .entry(segment)
            .or_insert_with(|| Value::Table(Table::new()));
        if !entry.is_table() {
            *entry = Value::Table(Table::new());
        }
        let Value::Table(next) = entry else {
            return;
        };
        current = next;
    }
}

/// Navigate a table by dotted key path (e.g. `"child.decimal"`).
pub(crate) fn get_dotted<'a>(table: &'a Table, dotted_key: &str) -> Option<&'a Value> {
    let (path, leaf) = match dotted_key.rsplit_once('.') {
        Some((p, l)) => (Some(p), l),
        None => (None, dotted_key),
    };

    let mut current = table;
    if let Some(path) = path {
        for segment in path.split('.') {
            current = current.get(segment)?.as_table()?;
        }
    }
    current.get(leaf)
}

/// Deep-merge `overlay` on top of `base`.
/// Tables present on both sides are merged recursively; otherwise `overlay` wins.
pub(crate) fn deep_merge(mut base: Table, overlay: Table) -> Table {
    for (key, overlay_val) in overlay {
        let merged = match (base.remove(&key), overlay_val) {
            (Some(Value::Table(lower)), Value::Table(upper)) => {
                Value::Table(deep_merge(lower, upper))
            }
            (_, upper) => upper,
        };
        base.insert(key, merged);
    }
    base
}

/// Copy of `table` with every key lowercased, at every depth. Keys that only
/// differ in case are merged, the later one winning.
pub(crate) fn lowercase_keys(table: &Table) -> Table {
    let mut out = Table::new();
    for (key, value) in table {
        let value = match value {
            Value::Table(nested) => Value::Table(lowercase_keys(nested)),
            other => other.clone(),
        };
        let mut single = Table::new();
        single.insert(key.to_lowercase(), value);
        out = deep_merge(out, single);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(toml_str: &str) -> Table {
        toml_str.parse::<Table>().unwrap()
    }

    #[test]
    fn insert_flat_key() {
        let mut t = Table::new();
        insert_dotted(&mut t, "foo", Value::String("x".into()));
        assert_eq!(t["foo"].as_str(), Some("x"));
    }

    #[test]
    fn insert_nested_keys_share_section() {
        let mut t = Table::new();
        insert_dotted(&mut t, "child.decimal", Value::Float(1.5));
        insert_dotted(&mut t, "child.boolean", Value::Boolean(true));
        let child = t["child"].as_table().unwrap();
        assert_eq!(child.len(), 2);
        assert_eq!(child["decimal"].as_float(), Some(1.5));
    }

    #[test]
    fn insert_replaces_scalar_in_the_way() {
        let mut t = table("a = 1");
        insert_dotted(&mut t, "a.b", Value::Integer(2));
        assert_eq!(t["a"]["b"].as_integer(), Some(2));
    }

    #[test]
    fn get_nested_and_missing() {
        let t = table("[server]\nport = 8080\n");
        assert_eq!(get_dotted(&t, "server.port").unwrap().as_integer(), Some(8080));
        assert!(get_dotted(&t, "server.host").is_none());
        assert!(get_dotted(&t, "nope.port").is_none());
    }

    #[test]
    fn overlay_scalar_wins() {
        let merged = deep_merge(table("port = 8080"), table("port = 3000"));
        assert_eq!(merged["port"].as_integer(), Some(3000));
    }

    #[test]
    fn nested_tables_keep_untouched_siblings() {
        let base = table("[db]\nurl = \"pg://old\"\npool = 5\n");
        let overlay = table("[db]\npool = 20\n");
        let merged = deep_merge(base, overlay);
        assert_eq!(merged["db"]["url"].as_str(), Some("pg://old"));
        assert_eq!(merged["db"]["pool"].as_integer(), Some(20));
    }

    #[test]
    fn empty_overlay_returns_base() {
        let base = table("port = 8080");
        assert_eq!(deep_merge(base.clone(), Table::new()), base);
    }

    #[test]
    fn lowercase_keys_at_every_depth() {
        let lowered = lowercase_keys(&table("Bar = 1\n[Child]\nDecimal = 2.5\n[Child.Deep]\nX = true\n"));
        assert_eq!(lowered, table("bar = 1\n[child]\ndecimal = 2.5\n[child.deep]\nx = true\n"));
    }

    #[test]
    fn lowercase_keys_merges_sections_differing_in_case() {
        let lowered = lowercase_keys(&table("[Child]\na = 1\n[child]\nb = 2\n"));
        assert_eq!(lowered["child"]["a"].as_integer(), Some(1));
        assert_eq!(lowered["child"]["b"].as_integer(), Some(2));
    }
}
