//! Flag layer, built on clap's runtime builder API.
//!
//! Every non-hidden leaf becomes one `--flag` named after its dotted path with
//! dots turned into hyphens (`child.decimal` → `--child-decimal`). Flags take
//! their values as strings and are typed here by the leaf's kind, so a bad
//! value reports the flag and the offending input the same way for every kind.
//!
//! Defaults are registered with clap only for `--help` display. When reading
//! matches, values whose source isn't the command line are skipped, so a flag
//! default never shadows the env or file layers.

use std::collections::HashSet;
use std::ffi::OsString;

use clap::error::ErrorKind;
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches};
use toml::Table;

use crate::descriptor::ConfigDescriptor;
use crate::error::CmdError;
use crate::resolve::KeyBinding;
use crate::schema::Kind;
use crate::table::insert_dotted;
use crate::value;

const VERSION_ID: &str = "cmdbind-version";

/// Command-level text applied before any flag is registered.
#[derive(Debug, Clone, Default)]
pub(crate) struct CommandText {
    pub name: String,
    pub short_desc: Option<String>,
    pub long_desc: Option<String>,
    pub version: Option<String>,
}

/// Outcome of parsing the command line.
#[derive(Debug)]
pub(crate) enum Parsed {
    /// `--help` was requested; the rendered help text.
    Help(String),
    /// `--version` was requested.
    Version,
    Matches(ArgMatches),
}

/// Create the bare clap command: name, help text and the optional `--version`.
pub(crate) fn new_command(text: &CommandText) -> clap::Command {
    let mut cmd = clap::Command::new(text.name.clone())
        .disable_version_flag(true)
        .args_override_self(true);

    if let Some(short) = &text.short_desc {
        cmd = cmd.about(short.clone());
    }
    if let Some(long) = &text.long_desc {
        cmd = cmd.long_about(long.clone());
    }
    if text.version.is_some() {
        cmd = cmd.arg(
            Arg::new(VERSION_ID)
                .long("version")
                .action(ArgAction::SetTrue)
                .help("Print version"),
        );
    }
    cmd
}

/// Reject descriptor sets whose keys, env vars or flags would collide.
/// Env vars are compared unprefixed; a prefix can't separate two leaves.
pub(crate) fn check_names(
    descriptors: &[ConfigDescriptor],
    has_version: bool,
) -> Result<(), CmdError> {
    let mut keys = HashSet::new();
    let mut env_vars = HashSet::new();
    let mut flags = HashSet::new();
    for descriptor in descriptors {
        if !keys.insert(descriptor.name.as_str()) || !env_vars.insert(descriptor.env_var(None)) {
            return Err(CmdError::DuplicateKey(descriptor.name.clone()));
        }
        if descriptor.hidden {
            continue;
        }
        let flag = descriptor.flag_name();
        if flag == "help" || (has_version && flag == "version") {
            return Err(CmdError::ReservedFlag(flag));
        }
        if !flags.insert(flag) {
            return Err(CmdError::DuplicateKey(descriptor.name.clone()));
        }
    }
    Ok(())
}

/// Build the flag for a non-hidden descriptor.
pub(crate) fn flag_arg(descriptor: &ConfigDescriptor) -> Result<Arg, CmdError> {
    if !descriptor.kind.is_supported() {
        return Err(CmdError::UnsupportedKind {
            name: descriptor.name.clone(),
            kind: descriptor.kind,
        });
    }

    let flag = descriptor.flag_name();
    let mut arg = Arg::new(flag.clone())
        .long(flag)
        .value_name(descriptor.kind.value_name())
        .action(ArgAction::Set);

    if !descriptor.description.is_empty() {
        arg = arg.help(descriptor.description.clone());
    }
    if descriptor.kind == Kind::Bool {
        arg = arg.num_args(0..=1).default_missing_value("true");
    }
    if descriptor.has_default
        && let Some(default) = descriptor.default.to_value()
    {
        arg = arg.default_value(value::display(&default));
    }
    Ok(arg)
}

/// Parse `args` (program name first). Help and version requests short-circuit.
pub(crate) fn parse(cmd: &mut clap::Command, args: Vec<OsString>) -> Result<Parsed, CmdError> {
    match cmd.try_get_matches_from_mut(args) {
        Ok(matches) if matches!(matches.try_get_one::<bool>(VERSION_ID), Ok(Some(true))) => {
            Ok(Parsed::Version)
        }
        Ok(matches) => Ok(Parsed::Matches(matches)),
        Err(e)
            if matches!(
                e.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ) =>
        {
            Ok(Parsed::Help(e.render().to_string()))
        }
        Err(e) => Err(CmdError::Cli(e)),
    }
}

/// Type the flags given on the command line into a table keyed by dotted name.
pub(crate) fn flags_to_table(
    matches: &ArgMatches,
    bindings: &[KeyBinding],
) -> Result<Table, CmdError> {
    let mut table = Table::new();
    for binding in bindings {
        let Some(flag) = &binding.flag else {
            continue;
        };
        if !from_command_line(matches, flag) {
            continue;
        }
        let Some(raw) = matches.get_one::<String>(flag) else {
            continue;
        };
        let parsed = value::parse_raw(binding.kind, binding.range, raw).map_err(|reason| {
            CmdError::InvalidArgument {
                value: raw.clone(),
                flag: flag.clone(),
                reason,
            }
        })?;
        insert_dotted(&mut table, &binding.key, parsed);
    }
    Ok(table)
}

/// Dotted names of required leaves whose flag wasn't given.
pub(crate) fn missing_required(
    matches: &ArgMatches,
    descriptors: &[ConfigDescriptor],
) -> Vec<String> {
    descriptors
        .iter()
        .filter(|d| d.required && !d.hidden)
        .filter(|d| !from_command_line(matches, &d.flag_name()))
        .map(|d| d.name.clone())
        .collect()
}

fn from_command_line(matches: &ArgMatches, id: &str) -> bool {
    matches.value_source(id) == Some(ValueSource::CommandLine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{extract, extract_fields};
    use crate::fixtures::test::RootConfig;
    use crate::resolve::Resolver;
    use crate::schema::Field;

    fn command(version: Option<&str>) -> clap::Command {
        let text = CommandText {
            name: "test".into(),
            version: version.map(String::from),
            ..CommandText::default()
        };
        let mut cmd = new_command(&text);
        for d in extract::<RootConfig>().iter().filter(|d| !d.hidden) {
            cmd = cmd.arg(flag_arg(d).unwrap());
        }
        cmd
    }

    fn args(list: &[&str]) -> Vec<OsString> {
        std::iter::once("test")
            .chain(list.iter().copied())
            .map(OsString::from)
            .collect()
    }

    fn matches(list: &[&str]) -> ArgMatches {
        match parse(&mut command(None), args(list)).unwrap() {
            Parsed::Matches(m) => m,
            other => panic!("Expected matches, got {other:?}"),
        }
    }

    fn flags(list: &[&str]) -> Result<Table, CmdError> {
        let resolver = Resolver::for_schema::<RootConfig>(None);
        flags_to_table(&matches(list), resolver.bindings())
    }

    #[test]
    fn flags_are_typed_and_keyed_by_dotted_name() {
        let table = flags(&["--foo", "im a foo", "--bar", "4", "--child-decimal", "2.5"]).unwrap();
        assert_eq!(table["foo"].as_str(), Some("im a foo"));
        assert_eq!(table["bar"].as_integer(), Some(4));
        assert_eq!(table["child"]["decimal"].as_float(), Some(2.5));
    }

    #[test]
    fn defaults_are_not_layered() {
        let table = flags(&["--foo", "x"]).unwrap();
        assert!(table.get("bar").is_none());
        assert!(table.get("child").is_none());
    }

    #[test]
    fn bare_bool_flag_is_true() {
        let table = flags(&["--child-boolean"]).unwrap();
        assert_eq!(table["child"]["boolean"].as_bool(), Some(true));
    }

    #[test]
    fn bool_flag_takes_explicit_value() {
        let table = flags(&["--child-boolean=false"]).unwrap();
        assert_eq!(table["child"]["boolean"].as_bool(), Some(false));
    }

    #[test]
    fn repeated_flag_last_wins() {
        let table = flags(&["--bar", "1", "--bar", "5"]).unwrap();
        assert_eq!(table["bar"].as_integer(), Some(5));
    }

    #[test]
    fn invalid_int_names_flag_and_value() {
        let err = flags(&["--foo", "foo", "--bar", "bar"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid argument \"bar\" for \"--bar\" flag: invalid digit found in string"
        );
    }

    #[test]
    fn hidden_leaf_has_no_flag() {
        let err = parse(&mut command(None), args(&["--child-hidden", "x"])).unwrap_err();
        match err {
            CmdError::Cli(e) => assert_eq!(e.kind(), ErrorKind::UnknownArgument),
            other => panic!("Expected clap error, got {other:?}"),
        }
    }

    #[test]
    fn missing_required_uses_dotted_name() {
        let descriptors = extract_fields(&[
            Field::section("child", vec![Field::leaf::<String>("name").required()]),
            Field::leaf::<i64>("count").required(),
        ]);
        let mut cmd = new_command(&CommandText {
            name: "test".into(),
            ..CommandText::default()
        });
        for d in &descriptors {
            cmd = cmd.arg(flag_arg(d).unwrap());
        }
        let Parsed::Matches(m) = parse(&mut cmd, args(&["--count", "1"])).unwrap() else {
            panic!("Expected matches");
        };
        assert_eq!(missing_required(&m, &descriptors), vec!["child.name"]);
    }

    #[test]
    fn help_is_rendered() {
        match parse(&mut command(None), args(&["--help"])).unwrap() {
            Parsed::Help(text) => {
                assert!(text.contains("--foo"));
                assert!(text.contains("--child-decimal"));
                assert!(!text.contains("--child-hidden"));
            }
            other => panic!("Expected help, got {other:?}"),
        }
    }

    #[test]
    fn version_flag_only_when_configured() {
        assert!(matches!(
            parse(&mut command(Some("1.2.3")), args(&["--version"])).unwrap(),
            Parsed::Version
        ));
        assert!(parse(&mut command(None), args(&["--version"])).is_err());
    }

    #[test]
    fn unsupported_kind_is_rejected() {
        let descriptors = extract_fields(&[Field::leaf::<u64>("size")]);
        let err = flag_arg(&descriptors[0]).unwrap_err();
        assert!(matches!(err, CmdError::UnsupportedKind { kind: Kind::Uint, .. }));
    }

    #[test]
    fn reserved_and_duplicate_names() {
        let help = extract_fields(&[Field::leaf::<bool>("help")]);
        assert!(matches!(check_names(&help, false), Err(CmdError::ReservedFlag(_))));

        let version = extract_fields(&[Field::leaf::<String>("version")]);
        assert!(check_names(&version, false).is_ok());
        assert!(matches!(check_names(&version, true), Err(CmdError::ReservedFlag(_))));

        let dup = extract_fields(&[Field::leaf::<i64>("Port"), Field::leaf::<i64>("port")]);
        assert!(matches!(check_names(&dup, false), Err(CmdError::DuplicateKey(_))));

        let clash = extract_fields(&[
            Field::leaf::<i64>("a-b"),
            Field::section("a", vec![Field::leaf::<i64>("b")]),
        ]);
        assert!(matches!(check_names(&clash, false), Err(CmdError::DuplicateKey(_))));
    }

    #[test]
    fn env_var_collisions_are_rejected() {
        let clash = extract_fields(&[
            Field::leaf::<i64>("a_b").hidden(),
            Field::section("a", vec![Field::leaf::<i64>("b").hidden()]),
        ]);
        assert!(matches!(
            check_names(&clash, false),
            Err(CmdError::DuplicateKey(ref key)) if key == "a.b"
        ));
    }
}
