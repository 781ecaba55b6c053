use std::collections::HashMap;

use toml::Table;

use crate::error::CmdError;
use crate::resolve::KeyBinding;
use crate::table::insert_dotted;
use crate::value;

/// Build a `toml::Table` from the environment variables bound to each key.
///
/// Every leaf, hidden or not, is bound to one variable named
/// `[PREFIX_]PATH`, uppercased with dots turned into underscores
/// (`child.decimal` → `APP_CHILD_DECIMAL`). Empty values count as unset.
///
/// Values are parsed by the leaf's kind; a value that doesn't parse is an
/// error naming the variable.
///
/// Takes an iterator so tests can pass synthetic data instead of `std::env::vars()`.
pub(crate) fn env_to_table(
    bindings: &[KeyBinding],
    vars: impl IntoIterator<Item = (String, String)>,
) -> Result<Table, CmdError> {
    let vars: HashMap<String, String> = vars.into_iter().collect();
    let mut table = Table::new();

    for binding in bindings {
        let Some(var) = &binding.env_var else {
            continue;
        };
        let Some(raw) = vars.get(var).filter(|v| !v.is_empty()) else {
            continue;
        };
        let parsed = value::parse_raw(binding.kind, binding.range, raw).map_err(|reason| CmdError::InvalidEnv {
            var: var.clone(),
            value: raw.clone(),
            reason,
        })?;
        tracing::debug!(key = %binding.key, var = %var, "Bound value from environment");
        insert_dotted(&mut table, &binding.key, parsed);
    }

    Ok(table)
}
