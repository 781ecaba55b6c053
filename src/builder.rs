use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::{self, CommandText};
use crate::command::{Command, Settings};
use crate::descriptor;
use crate::error::{BoxError, CmdError};
use crate::file::ConfigFile;
use crate::resolve::Resolver;
use crate::schema::Schema;

/// Entry point for binding a config struct to a command.
pub struct Cmdbind;

impl Cmdbind {
    pub fn builder<C: Schema>() -> CommandBuilder<C> {
        CommandBuilder::new()
    }
}

/// Builder for a [`Command`] bound to the config struct `C`.
///
/// Every option is applied before the schema is walked, so the env prefix is
/// already known when env var names are derived.
pub struct CommandBuilder<C: Schema> {
    name: Option<String>,
    short_desc: Option<String>,
    long_desc: Option<String>,
    version: Option<String>,
    env_prefix: Option<String>,
    config_file: Option<ConfigFile>,
    strict: bool,
    help_on_empty: bool,
    _phantom: PhantomData<C>,
}

impl<C: Schema> CommandBuilder<C> {
    fn new() -> Self {
        Self {
            name: None,
            short_desc: None,
            long_desc: None,
            version: None,
            env_prefix: None,
            config_file: None,
            strict: false,
            help_on_empty: true,
            _phantom: PhantomData,
        }
    }

    /// Set the command name shown in usage (default: the executable's file stem).
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// One-line description shown in `--help`.
    pub fn short_desc(mut self, desc: &str) -> Self {
        self.short_desc = Some(desc.to_string());
        self
    }

    /// Longer description shown in `--help`.
    pub fn long_desc(mut self, desc: &str) -> Self {
        self.long_desc = Some(desc.to_string());
        self
    }

    /// Set the version string. This also registers `--version`, which prints
    /// `version {version}` and exits.
    pub fn version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    /// Prefix for env var names: with prefix `APP`, the leaf `child.port` is
    /// read from `APP_CHILD_PORT`. Without a prefix it is read from `CHILD_PORT`.
    pub fn env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self
    }

    /// Read the config file layer from an explicit path.
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(ConfigFile::Path(path.into()));
        self
    }

    /// Read the config file layer from `{app_name}.toml` in the platform
    /// config directory (`~/.config/{app_name}/` on Linux).
    pub fn platform_config(mut self, app_name: &str) -> Self {
        self.config_file = Some(ConfigFile::Platform(app_name.to_string()));
        self
    }

    /// Enable or disable strict mode (default: `false`).
    /// In strict mode, unknown keys in the config file produce errors.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Print help when invoked without arguments (default: `true`).
    /// Resolution and the finalize callback still run afterwards.
    pub fn help_on_empty(mut self, help_on_empty: bool) -> Self {
        self.help_on_empty = help_on_empty;
        self
    }

    /// Resolve the effective command name.
    fn effective_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        std::env::args_os()
            .next()
            .and_then(|arg0| {
                Path::new(&arg0)
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "app".to_string())
    }

    /// Resolve the effective env prefix. An empty prefix counts as none.
    fn effective_env_prefix(&self) -> Option<&str> {
        self.env_prefix.as_deref().filter(|p| !p.is_empty())
    }

    /// Walk the schema and bind every leaf to a flag, an env var and the
    /// config file. `on_finalize` runs with the resolved config on every
    /// successful execution.
    pub fn build<F, E>(self, config: C, mut on_finalize: F) -> Result<Command<C>, CmdError>
    where
        C: 'static,
        F: FnMut(&C) -> Result<(), E> + 'static,
        E: Into<BoxError>,
    {
        let descriptors = descriptor::extract::<C>();
        cli::check_names(&descriptors, self.version.is_some())?;

        let name = self.effective_name();
        let env_prefix = self.effective_env_prefix();
        let mut clap_cmd = cli::new_command(&CommandText {
            name: name.clone(),
            short_desc: self.short_desc.clone(),
            long_desc: self.long_desc.clone(),
            version: self.version.clone(),
        });

        let mut resolver = Resolver::default();
        for descriptor in &descriptors {
            if !descriptor.hidden {
                clap_cmd = clap_cmd.arg(cli::flag_arg(descriptor)?);
            }
            resolver.bind_descriptor(descriptor, env_prefix);
        }
        debug!(
            command = %name,
            leaves = descriptors.len(),
            env_prefix = ?env_prefix,
            "Bound config schema"
        );

        Ok(Command {
            config,
            descriptors,
            cli: clap_cmd,
            resolver,
            settings: Settings {
                version: self.version,
                config_file: self.config_file,
                strict: self.strict,
                help_on_empty: self.help_on_empty,
            },
            entries: Vec::new(),
            on_finalize: Box::new(move |config: &C| on_finalize(config).map_err(Into::into)),
        })
    }
}
