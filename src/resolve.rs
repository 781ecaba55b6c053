//! Layered value resolver: merge every source and produce a typed config.
//!
//! Keys are registered once at construction ([`Resolver::bind_descriptor`]):
//! a default is seeded, an env var is bound, and (unless hidden) a flag is
//! bound. At execution, [`Resolver::resolve`] works on pre-loaded data with
//! no I/O:
//!
//! 1. Start from the seeded defaults
//! 2. Validate the file layer's keys (error in strict mode, warn otherwise)
//! 3. Coerce the file's values to each leaf's kind and merge them on top.
//!    File keys are matched case-insensitively
//! 4. Merge env vars on top
//! 5. Merge command-line flags on top (highest priority)
//! 6. Deserialize the merged table into `C`

use std::fmt;

use serde::de::DeserializeOwned;
use toml::{Table, Value};
use tracing::warn;

use crate::descriptor::ConfigDescriptor;
use crate::env;
use crate::error::CmdError;
use crate::file::LoadedFile;
use crate::schema::{IntRange, Kind};
use crate::table::{deep_merge, get_dotted, insert_dotted, lowercase_keys};
use crate::validate;
use crate::value;

/// The sources bound to one leaf key.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct KeyBinding {
    pub key: String,
    pub kind: Kind,
    pub range: Option<IntRange>,
    pub env_var: Option<String>,
    pub flag: Option<String>,
}

/// Which layer a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Default,
    File,
    Env,
    Flag,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Source::Default => "default",
            Source::File => "file",
            Source::Env => "env",
            Source::Flag => "flag",
        };
        f.write_str(name)
    }
}

/// One resolved leaf, for listings.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub key: String,
    pub value: String,
    pub source: Source,
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {} ({})", self.key, self.value, self.source)
    }
}

/// All per-invocation data the resolver needs. No I/O happens during resolution.
#[derive(Debug, Default)]
pub(crate) struct Layers {
    pub file: Option<LoadedFile>,
    /// Raw environment variable pairs (pass `std::env::vars().collect()` or synthetic data).
    pub env_vars: Vec<(String, String)>,
    /// Values given on the command line, already typed and keyed by dotted name.
    pub flags: Table,
    /// Whether to reject unknown keys in the config file.
    pub strict: bool,
}

#[derive(Debug)]
pub(crate) struct Resolved<C> {
    pub config: C,
    pub entries: Vec<Entry>,
}

#[derive(Debug, Default)]
pub(crate) struct Resolver {
    defaults: Table,
    bindings: Vec<KeyBinding>,
}

impl Resolver {
    /// Register a leaf key. Sources are bound to it afterwards.
    pub fn register(&mut self, key: &str, kind: Kind, range: Option<IntRange>) {
        self.bindings.push(KeyBinding {
            key: key.to_string(),
            kind,
            range,
            env_var: None,
            flag: None,
        });
    }

    pub fn set_default(&mut self, key: &str, value: Value) {
        insert_dotted(&mut self.defaults, key, value);
    }

    pub fn bind_env(&mut self, key: &str, var: String) {
        if let Some(binding) = self.binding_mut(key) {
            binding.env_var = Some(var);
        }
    }

    pub fn bind_flag(&mut self, key: &str, flag: String) {
        if let Some(binding) = self.binding_mut(key) {
            binding.flag = Some(flag);
        }
    }

    /// Register a descriptor: seed its default, bind its env var, and bind
    /// its flag unless it is hidden.
    pub fn bind_descriptor(&mut self, descriptor: &ConfigDescriptor, env_prefix: Option<&str>) {
        let key = descriptor.name.as_str();
        self.register(key, descriptor.kind, descriptor.range);
        if let Some(default) = descriptor.default.to_value() {
            self.set_default(key, default);
        }
        self.bind_env(key, descriptor.env_var(env_prefix));
        if !descriptor.hidden {
            self.bind_flag(key, descriptor.flag_name());
        }
    }

    pub fn bindings(&self) -> &[KeyBinding] {
        &self.bindings
    }

    #[cfg(test)]
    pub fn defaults(&self) -> &Table {
        &self.defaults
    }

    fn binding_mut(&mut self, key: &str) -> Option<&mut KeyBinding> {
        self.bindings.iter_mut().find(|b| b.key == key)
    }

    /// Merge all layers (flag > env > file > default) and deserialize into `C`.
    pub fn resolve<C: DeserializeOwned>(&self, layers: Layers) -> Result<Resolved<C>, CmdError> {
        let file = match &layers.file {
            Some(file) => self.file_table(file, layers.strict)?,
            None => Table::new(),
        };
        let env = env::env_to_table(&self.bindings, layers.env_vars)?;
        let flags = layers.flags;

        let entries = self.entries(&file, &env, &flags);

        let merged = [file, env, flags]
            .into_iter()
            .fold(self.defaults.clone(), deep_merge);

        let mut ignored = Vec::new();
        let config: C = serde_ignored::deserialize(Value::Table(merged), |path| {
            ignored.push(path.to_string());
        })
        .map_err(CmdError::Unmarshal)?;

        for key in ignored {
            warn!(key = %key, "Config key has no matching struct field");
        }

        Ok(Resolved { config, entries })
    }

    /// The file layer, restricted to bound keys and coerced to their kinds.
    /// File keys match case-insensitively, like the dotted names they bind to.
    fn file_table(&self, file: &LoadedFile, strict: bool) -> Result<Table, CmdError> {
        let source = lowercase_keys(&file.table);
        let unknown = validate::unknown_keys(&source, self.bindings.iter().map(|b| b.key.as_str()));
        if strict {
            validate::reject_unknown_keys(unknown, &file.content, &file.path)?;
        } else {
            for key in unknown {
                warn!(key = %key, path = %file.path.display(), "Ignoring unknown config key");
            }
        }

        let mut table = Table::new();
        for binding in &self.bindings {
            let Some(raw) = get_dotted(&source, &binding.key) else {
                continue;
            };
            let coerced = value::coerce(binding.kind, binding.range, raw.clone()).map_err(|reason| {
                CmdError::InvalidValue {
                    key: binding.key.clone(),
                    reason,
                }
            })?;
            insert_dotted(&mut table, &binding.key, coerced);
        }
        Ok(table)
    }

    fn entries(&self, file: &Table, env: &Table, flags: &Table) -> Vec<Entry> {
        let layers = [
            (Source::Flag, flags),
            (Source::Env, env),
            (Source::File, file),
            (Source::Default, &self.defaults),
        ];
        self.bindings
            .iter()
            .filter_map(|binding| {
                layers.iter().find_map(|(source, table)| {
                    get_dotted(table, &binding.key).map(|v| Entry {
                        key: binding.key.clone(),
                        value: value::display(v),
                        source: *source,
                    })
                })
            })
            .collect()
    }

    #[cfg(test)]
    pub fn for_schema<C: crate::schema::Schema>(env_prefix: Option<&str>) -> Self {
        let mut resolver = Self::default();
        for descriptor in crate::descriptor::extract::<C>() {
            resolver.bind_descriptor(&descriptor, env_prefix);
        }
        resolver
    }
}
