//! Config file location and loading.
//!
//! The file layer is optional and single-file: the builder either names an
//! explicit path or asks for the platform config directory
//! (`~/.config/{app}/{app}.toml` on Linux). A missing file is not an error; the
//! layer is simply empty. Any other read failure, and any parse failure, is
//! fatal.
//!
//! The format follows the extension: `.toml`, or `.json` with the `json`
//! feature. A file without an extension is read as TOML.

use std::path::{Path, PathBuf};

use toml::Table;
use tracing::debug;

use crate::error::CmdError;

/// Where the config file lives.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigFile {
    /// An explicit path.
    Path(PathBuf),
    /// `{app}.toml` in the platform config directory for `app`.
    Platform(String),
}

/// A loaded config file.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedFile {
    pub path: PathBuf,
    pub content: String,
    pub table: Table,
}

/// Resolve a [`ConfigFile`] to a concrete path.
///
/// Returns `None` if the platform directory cannot be determined (e.g. no
/// home directory).
pub fn resolve_path(file: &ConfigFile) -> Option<PathBuf> {
    match file {
        ConfigFile::Path(path) => Some(path.clone()),
        ConfigFile::Platform(app_name) => {
            let proj = directories::ProjectDirs::from("", "", app_name)?;
            Some(proj.config_dir().join(format!("{app_name}.toml")))
        }
    }
}

/// Read and parse the config file, if it exists.
pub fn load(file: &ConfigFile) -> Result<Option<LoadedFile>, CmdError> {
    let Some(path) = resolve_path(file) else {
        debug!(?file, "No config directory on this platform, skipping file layer");
        return Ok(None);
    };

    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "Config file not found, skipping file layer");
            return Ok(None);
        }
        Err(e) => return Err(CmdError::Io { path, source: e }),
    };

    let table = parse(&path, &content)?;
    debug!(path = %path.display(), keys = table.len(), "Loaded config file");
    Ok(Some(LoadedFile {
        path,
        content,
        table,
    }))
}

/// Parse file content into a table, choosing the format by extension.
pub fn parse(path: &Path, content: &str) -> Result<Table, CmdError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        None | Some("toml") => toml::from_str(content).map_err(|e| CmdError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }),
        #[cfg(feature = "json")]
        Some("json") => serde_json::from_str(content).map_err(|e| CmdError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }),
        Some(_) => Err(CmdError::UnsupportedFormat(path.to_path_buf())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        let loaded = load(&ConfigFile::Path(dir.path().join("absent.toml"))).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn toml_file_loads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.toml");
        fs::write(&path, "foo = \"im a foo\"\n[child]\ndecimal = 3.14\n").unwrap();

        let loaded = load(&ConfigFile::Path(path.clone())).unwrap().unwrap();
        assert_eq!(loaded.path, path);
        assert_eq!(loaded.table["foo"].as_str(), Some("im a foo"));
        assert_eq!(loaded.table["child"]["decimal"].as_float(), Some(3.14));
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_file_loads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.json");
        fs::write(&path, r#"{"bar": 3, "child": {"boolean": false}}"#).unwrap();

        let loaded = load(&ConfigFile::Path(path)).unwrap().unwrap();
        assert_eq!(loaded.table["bar"].as_integer(), Some(3));
        assert_eq!(loaded.table["child"]["boolean"].as_bool(), Some(false));
    }

    #[test]
    fn malformed_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.toml");
        fs::write(&path, "foo = = broken").unwrap();

        let err = load(&ConfigFile::Path(path)).unwrap_err();
        assert!(matches!(err, CmdError::Parse { .. }));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.ini");
        fs::write(&path, "foo=bar").unwrap();

        let err = load(&ConfigFile::Path(path)).unwrap_err();
        assert!(matches!(err, CmdError::UnsupportedFormat(_)));
    }

    #[test]
    fn directory_path_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let err = load(&ConfigFile::Path(dir.path().to_path_buf())).unwrap_err();
        assert!(matches!(err, CmdError::Io { .. }));
    }

    #[test]
    fn platform_path_ends_with_app_file() {
        if let Some(path) = resolve_path(&ConfigFile::Platform("myapp".into())) {
            assert!(path.ends_with("myapp.toml"));
        }
    }
}
