//! Configuration structs for the cmdbind demo application.
//!
//! Two levels: a few top-level keys and a nested [`ServerConfig`] that lives
//! under `[server]` in the config file.
//!
//! # Names
//!
//! With the prefix `DEMO`, each leaf maps to:
//!
//! | Config key    | Flag            | Env var            |
//! |---------------|-----------------|--------------------|
//! | `directory`   | `--directory`   | `DEMO_DIRECTORY`   |
//! | `verbose`     | `--verbose`     | `DEMO_VERBOSE`     |
//! | `server.url`  | `--server-url`  | `DEMO_SERVER_URL`  |
//! | `server.port` | `--server-port` | `DEMO_SERVER_PORT` |
//! | `server.token` | (hidden)       | `DEMO_SERVER_TOKEN` |

use cmdbind::{Field, Schema};
use serde::Deserialize;

/// Root configuration for the demo application.
#[derive(Deserialize, Debug, Default)]
pub struct AppConfig {
    pub directory: String,
    pub verbose: bool,
    pub server: ServerConfig,
}

/// Server the demo pretends to browse.
#[derive(Deserialize, Debug, Default)]
pub struct ServerConfig {
    pub url: String,
    pub port: i64,
    pub token: String,
}

impl Schema for AppConfig {
    fn fields() -> Vec<Field> {
        vec![
            Field::leaf::<String>("Directory")
                .desc("Directory to browse")
                .default("."),
            Field::leaf::<bool>("Verbose").desc("List where every value came from"),
            Field::nested::<ServerConfig>("Server"),
        ]
    }
}

impl Schema for ServerConfig {
    fn fields() -> Vec<Field> {
        vec![
            Field::leaf::<String>("Url").desc("Server url").default("localhost"),
            Field::leaf::<i64>("Port").desc("Server port").default("8080"),
            // Secrets stay off the command line.
            Field::leaf::<String>("Token").desc("API token").hidden(),
        ]
    }
}
