//! # cmdbind demo application
//!
//! A sample CLI tool that binds [`AppConfig`](config::AppConfig) to flags, env
//! vars and a config file. It exists to demonstrate and manually verify
//! cmdbind's features.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example cmdbind_demo -- --directory /tmp
//! ```
//!
//! ## Features demonstrated
//!
//! | Feature            | How to exercise it                                                     |
//! |--------------------|------------------------------------------------------------------------|
//! | Defaults           | `cargo run --example cmdbind_demo -- --verbose`                        |
//! | Flags              | `cargo run --example cmdbind_demo -- --server-port 9000`               |
//! | Env vars           | `DEMO_SERVER_URL=example.com cargo run --example cmdbind_demo -- --verbose` |
//! | Hidden leaf        | `DEMO_SERVER_TOKEN=s3cret cargo run --example cmdbind_demo -- --verbose` |
//! | Config file        | Write `cmdbind-demo.toml` in the platform config dir                   |
//! | Sample config      | `DEMO_TEMPLATE=1 cargo run --example cmdbind_demo`                      |
//! | Help               | `cargo run --example cmdbind_demo -- --help`                           |
//! | Version            | `cargo run --example cmdbind_demo -- --version`                        |
//! | Library logs       | `RUST_LOG=cmdbind=debug cargo run --example cmdbind_demo -- --verbose` |

mod config;

use std::process::ExitCode;

use cmdbind::{BoxError, Cmdbind, CmdError, Command};
use tracing_subscriber::EnvFilter;

use config::AppConfig;

fn browse(config: &AppConfig) -> Result<(), BoxError> {
    if config.server.port <= 0 {
        return Err(format!("invalid server port {}", config.server.port).into());
    }
    println!(
        "Directory: {}\nUrl: {}:{}",
        config.directory, config.server.url, config.server.port
    );
    Ok(())
}

fn make_command() -> Result<Command<AppConfig>, CmdError> {
    Cmdbind::builder::<AppConfig>()
        .name("cmdbind-demo")
        .short_desc("Browse a directory on a remote server")
        .version(env!("CARGO_PKG_VERSION"))
        .env_prefix("DEMO")
        .platform_config("cmdbind-demo")
        .help_on_empty(false)
        .build(AppConfig::default(), browse)
}

fn run() -> Result<(), CmdError> {
    let mut cmd = make_command()?;

    if std::env::var_os("DEMO_TEMPLATE").is_some() {
        print!("{}", cmd.template());
        return Ok(());
    }

    cmd.execute()?;

    if cmd.config().verbose {
        println!();
        for entry in cmd.listing() {
            println!("{entry}");
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(CmdError::Cli(e)) => {
            let _ = e.print();
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
