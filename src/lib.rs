//! Bind a typed config struct to command-line flags, environment variables
//! and a config file. Declare the schema once, and go.
//!
//! cmdbind walks your config struct's schema, registers one
//! [clap](https://docs.rs/clap) flag and one environment variable per leaf,
//! layers an optional config file underneath, and hands the merged, typed
//! struct to your callback.
//!
//! ```ignore
//! let mut cmd = Cmdbind::builder::<AppConfig>()
//!     .name("myapp")
//!     .version("1.2.3")
//!     .env_prefix("MYAPP")
//!     .platform_config("myapp")
//!     .build(AppConfig::default(), |config| run(config))?;
//! cmd.execute()?;
//! ```
//!
//! # Schema
//!
//! The struct derives `Deserialize` and implements [`Schema`], listing its
//! fields in declaration order:
//!
//! ```ignore
//! impl Schema for AppConfig {
//!     fn fields() -> Vec<Field> {
//!         vec![
//!             Field::leaf::<String>("Directory").desc("Directory to browse").default("."),
//!             Field::nested::<ServerConfig>("Server"),
//!         ]
//!     }
//! }
//! ```
//!
//! The [`Kind`] of each leaf comes from its Rust type (see [`LeafType`]).
//! `String`, `bool`, signed integers and `f32` can become flags. Other kinds
//! (unsigned integers, `f64`, lists) can be declared but must be
//! [`hidden`](Field::hidden), since they can't be registered as flags;
//! building a command with a visible one fails with
//! [`CmdError::UnsupportedKind`].
//!
//! Integer leaves keep the bounds of their Rust type (see [`IntRange`]), so a
//! value that doesn't fit an `i32` field is rejected by the layer it came
//! from rather than at deserialization. Likewise an `f32` leaf rejects finite
//! values too large for `f32`.
//!
//! Field names are lowercased. Nested sections prefix their leaves with
//! their own name and a dot, so `Server.Port` becomes the key `server.port`.
//!
//! # Names
//!
//! Every leaf gets three names, all derived from its dotted key:
//!
//! | Layer | Name for `server.port` (prefix `MYAPP`) |
//! |-------|-----------------------------------------|
//! | Flag | `--server-port` |
//! | Env var | `MYAPP_SERVER_PORT` (`SERVER_PORT` without a prefix) |
//! | Config file | `port` under `[server]` |
//!
//! Hidden leaves get no flag but keep their env var and file key.
//!
//! # Layer precedence
//!
//! ```text
//! Zero value            "", false, 0, 0.0
//!        ↑ overridden by
//! Default               Field::default("...")
//!        ↑ overridden by
//! Config file           .config_file() / .platform_config()
//!        ↑ overridden by
//! Environment vars      [PREFIX_]KEY
//!        ↑ overridden by
//! Flags                 --key
//! ```
//!
//! Flag defaults are shown in `--help` but never layered, so a default can't
//! shadow an env var or a file value. Empty env vars count as unset.
//!
//! # Execution
//!
//! [`Command::execute`] parses the arguments, then:
//!
//! - `--help` prints help and returns `Ok`.
//! - `--version` (registered only when a version is set) prints
//!   `version {version}` and returns `Ok`.
//! - Flag values are typed by kind; a bad one fails with
//!   [`CmdError::InvalidArgument`].
//! - [`Field::required`] leaves must be given as flags, or execution fails
//!   with [`CmdError::MissingRequired`].
//! - The config file is loaded. A missing file is skipped; a malformed one
//!   is an error.
//! - With no arguments at all, help is printed (see
//!   [`help_on_empty`](CommandBuilder::help_on_empty)) and execution goes on.
//! - The layers are merged and deserialized into the struct, which is stored
//!   in the command and passed to the finalize callback.
//!
//! The callback never sees a partially resolved config. Its error is returned
//! as [`CmdError::Finalize`].
//!
//! [`Command::execute_with`] takes the arguments, environment and output
//! explicitly, which is what tests want.
//!
//! # Config file
//!
//! TOML, or JSON with the `json` feature (on by default), picked by
//! extension. Keys match regardless of case, and values are coerced to the
//! leaf's kind, so `Port = "80"` works. Unknown keys are logged and ignored; with
//! [`.strict(true)`](CommandBuilder::strict) they fail with the file path,
//! key and line number:
//!
//! ```text
//! Unknown key 'typo' in /home/user/.config/myapp/myapp.toml (line 5)
//! ```
//!
//! [`Command::template`] renders a sample config file with every leaf, its
//! description and its default.
//!
//! # Logging
//!
//! The crate logs through [tracing](https://docs.rs/tracing): layer decisions
//! at `debug`, ignored keys and unparseable defaults at `warn`. Install a
//! subscriber to see them.

pub mod descriptor;
pub mod error;
pub mod schema;

mod builder;
mod cli;
mod command;
mod env;
mod file;
mod resolve;
mod table;
mod template;
mod validate;
mod value;

#[cfg(test)]
mod fixtures;

pub use builder::{Cmdbind, CommandBuilder};
pub use command::Command;
pub use descriptor::{ConfigDescriptor, DefaultValue, extract, extract_fields};
pub use error::{BoxError, CmdError};
pub use file::ConfigFile;
pub use resolve::{Entry, Source};
pub use schema::{Field, IntRange, Kind, LeafType, Schema, Shape};
