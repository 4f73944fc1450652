//! Locations of the pyatv command-line tools

use std::path::{Path, PathBuf};

/// Directory under the storage path that holds the bridge's own data
pub const STORAGE_SUBDIR: &str = "appletv-enhanced";

/// Paths of `atvremote` and `atvscript`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PyatvPaths {
    pub atvremote: PathBuf,
    pub atvscript: PathBuf,
}

impl PyatvPaths {
    /// Tools installed in the bridge's virtualenv:
    /// `<storage>/appletv-enhanced/.venv/bin/{atvremote,atvscript}`
    pub fn from_storage(storage_path: impl AsRef<Path>) -> Self {
        let bin = storage_path
            .as_ref()
            .join(STORAGE_SUBDIR)
            .join(".venv")
            .join("bin");
        Self {
            atvremote: bin.join("atvremote"),
            atvscript: bin.join("atvscript"),
        }
    }

    /// Bare tool names, resolved through `PATH`
    pub fn system() -> Self {
        Self {
            atvremote: PathBuf::from("atvremote"),
            atvscript: PathBuf::from("atvscript"),
        }
    }

    /// Virtualenv tools when they exist, otherwise the ones on `PATH`
    pub fn detect(storage_path: impl AsRef<Path>) -> Self {
        let venv = Self::from_storage(storage_path);
        if venv.atvremote.exists() && venv.atvscript.exists() {
            venv
        } else {
            Self::system()
        }
    }
}
