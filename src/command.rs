//! The bound command and its execution pipeline.
//!
//! Execution runs in a fixed order, and the finalize callback only runs once
//! every step has succeeded:
//!
//! 1. Parse the arguments. `--help` and `--version` print and return early.
//! 2. Type the flag values and check required flags.
//! 3. Load the config file, if one is configured.
//! 4. Print help if invoked without arguments (and `help_on_empty` is set).
//! 5. Resolve flag > env > file > default into `C`.
//! 6. Call the finalize callback with the resolved config.

use std::ffi::OsString;
use std::fmt;
use std::io::Write;

use tracing::debug;

use crate::cli::{self, Parsed};
use crate::descriptor::ConfigDescriptor;
use crate::error::{BoxError, CmdError};
use crate::file::{self, ConfigFile};
use crate::resolve::{Entry, Layers, Resolved, Resolver, Source};
use crate::schema::Schema;
use crate::template;

pub(crate) type Finalize<C> = Box<dyn FnMut(&C) -> Result<(), BoxError>>;

/// Execution settings captured from the builder.
#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub version: Option<String>,
    pub config_file: Option<ConfigFile>,
    pub strict: bool,
    pub help_on_empty: bool,
}

/// A command line bound to the config struct `C`.
///
/// Built by [`Cmdbind::builder`](crate::Cmdbind::builder). Holds the config
/// value, which every successful execution overwrites with the resolved one.
pub struct Command<C> {
    pub(crate) config: C,
    pub(crate) descriptors: Vec<ConfigDescriptor>,
    pub(crate) cli: clap::Command,
    pub(crate) resolver: Resolver,
    pub(crate) settings: Settings,
    pub(crate) entries: Vec<Entry>,
    pub(crate) on_finalize: Finalize<C>,
}

impl<C: Schema> Command<C> {
    /// Execute with the process arguments and environment, printing to stdout.
    pub fn execute(&mut self) -> Result<(), CmdError> {
        let env_vars = std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)));
        let mut stdout = std::io::stdout().lock();
        self.execute_with(std::env::args_os(), env_vars, &mut stdout)
    }

    /// Execute with explicit arguments (program name first), environment
    /// variables and output.
    pub fn execute_with<I, T>(
        &mut self,
        args: I,
        env_vars: impl IntoIterator<Item = (String, String)>,
        out: &mut impl Write,
    ) -> Result<(), CmdError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let no_args = args.len() <= 1;

        let matches = match cli::parse(&mut self.cli, args)? {
            Parsed::Help(help) => return write_out(out, &help),
            Parsed::Version => {
                let version = self.settings.version.as_deref().unwrap_or_default();
                return write_out(out, &format!("version {version}\n"));
            }
            Parsed::Matches(matches) => matches,
        };

        let flags = cli::flags_to_table(&matches, self.resolver.bindings())?;
        let missing = cli::missing_required(&matches, &self.descriptors);
        if !missing.is_empty() {
            return Err(CmdError::MissingRequired(missing));
        }

        let file = match &self.settings.config_file {
            Some(config_file) => file::load(config_file)?,
            None => None,
        };

        if no_args && self.settings.help_on_empty {
            let help = self.cli.render_help().to_string();
            write_out(out, &help)?;
        }

        let Resolved { config, entries } = self.resolver.resolve::<C>(Layers {
            file,
            env_vars: env_vars.into_iter().collect(),
            flags,
            strict: self.settings.strict,
        })?;
        debug!(
            leaves = entries.len(),
            flags = entries.iter().filter(|e| e.source == Source::Flag).count(),
            "Resolved config"
        );
        self.config = config;
        self.entries = entries;

        (self.on_finalize)(&self.config).map_err(CmdError::Finalize)
    }

    /// The config value: the initial one until an execution succeeds, the
    /// resolved one afterwards.
    pub fn config(&self) -> &C {
        &self.config
    }

    pub fn descriptors(&self) -> &[ConfigDescriptor] {
        &self.descriptors
    }

    /// Every leaf from the last successful execution, with its value and the
    /// layer it came from. Empty before the first execution.
    pub fn listing(&self) -> &[Entry] {
        &self.entries
    }

    /// A sample config file listing every leaf with its description and default.
    pub fn template(&self) -> String {
        template::generate(&self.descriptors)
    }

    /// The underlying clap command.
    pub fn clap_command(&self) -> &clap::Command {
        &self.cli
    }

    /// Render the `--help` text.
    pub fn render_help(&mut self) -> String {
        self.cli.render_help().to_string()
    }
}

impl<C> fmt::Debug for Command<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.cli.get_name())
            .field("descriptors", &self.descriptors)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

fn write_out(out: &mut impl Write, text: &str) -> Result<(), CmdError> {
    out.write_all(text.as_bytes()).map_err(CmdError::Output)
}
