//! Sample config file generated from the descriptors.
//!
//! Every leaf appears, hidden ones included, under its section with its
//! description as a comment above it and its default (or zero value) as the
//! value. Leaves of a kind with no known zero value and no default are left
//! out.

use toml_edit::{DocumentMut, Item, Table};

use crate::descriptor::ConfigDescriptor;
use crate::value;

/// Render the sample config for `descriptors`.
pub(crate) fn generate(descriptors: &[ConfigDescriptor]) -> String {
    let mut doc = DocumentMut::new();

    for descriptor in descriptors {
        let Some(default) = descriptor.default.to_value() else {
            continue;
        };
        let Some(rendered) = edit_value(&default) else {
            continue;
        };
        let (table, leaf) = match descriptor.name.rsplit_once('.') {
            Some((section, leaf)) => (section_mut(&mut doc, section), leaf),
            None => (doc.as_table_mut(), descriptor.name.as_str()),
        };
        table.insert(leaf, Item::Value(rendered));
        if !descriptor.description.is_empty()
            && let Some(mut key) = table.key_mut(leaf)
        {
            key.leaf_decor_mut().set_prefix(comment(&descriptor.description));
        }
    }

    doc.to_string()
}

fn comment(description: &str) -> String {
    description.lines().map(|line| format!("# {line}\n")).collect()
}

fn edit_value(value: &toml::Value) -> Option<toml_edit::Value> {
    match value {
        toml::Value::String(s) => Some(s.as_str().into()),
        toml::Value::Integer(i) => Some((*i).into()),
        toml::Value::Boolean(b) => Some((*b).into()),
        // Use the shortest form, so an f32 `1.2` isn't written as 1.2000000476837158.
        toml::Value::Float(_) => value::display(value).parse::<f64>().ok().map(Into::into),
        other => other.to_string().parse().ok(),
    }
}

/// Get or create the table for a dotted section path.
fn section_mut<'a>(doc: &'a mut DocumentMut, section: &str) -> &'a mut Table {
    let mut current = doc.as_table_mut();
    for segment in section.split('.') {
        let item = &mut current[segment];
        if !item.is_table() {
            let mut table = Table::new();
            table.set_implicit(true);
            *item = Item::Table(table);
        }
        current = item
            .as_table_mut()
            .expect("cmdbind: section item was just set to a table");
    }
    current
}
