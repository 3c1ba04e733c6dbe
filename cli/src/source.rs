//! Filesystem-backed [`SourceProvider`](goif_core::loader::SourceProvider).
//!
//! The only collaborator the core hands off file-system access to (§1, §6):
//! reading the root program, locating `std.goif` beside the installed
//! binary, and resolving `LOAD` paths relative to the root file's directory.

use std::fs;
use std::path::{Path, PathBuf};

use goif_core::constants::MAIN_DISPLAY_NAME;
use goif_core::loader::SourceProvider;

pub struct FileSourceProvider {
    root_path: Option<PathBuf>,
}

impl FileSourceProvider {
    pub fn new(root_path: Option<PathBuf>) -> FileSourceProvider {
        FileSourceProvider { root_path }
    }

    /// The directory `LOAD` paths without a `/` resolve against: the root
    /// source file's own directory, or `.` in REPL mode with no preload.
    fn root_dir(&self) -> PathBuf {
        self.root_path
            .as_ref()
            .and_then(|p| p.parent())
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

impl SourceProvider for FileSourceProvider {
    fn load_root(&mut self) -> Result<(String, String), String> {
        match &self.root_path {
            Some(path) => read_file(path).map(|text| (text, path.display().to_string())),
            None => Ok((String::new(), MAIN_DISPLAY_NAME.to_owned())),
        }
    }

    /// `std.goif` is resolved relative to the interpreter's own install
    /// location (§6). A missing standard library is not an error: fid 2 is
    /// simply an empty, always-valid file.
    fn load_std_lib(&mut self) -> Result<String, String> {
        let exe = std::env::current_exe().map_err(|e| e.to_string())?;
        let std_path = match exe.parent() {
            Some(dir) => dir.join("std.goif"),
            None => return Ok(String::new()),
        };
        if std_path.exists() {
            read_file(&std_path)
        } else {
            Ok(String::new())
        }
    }

    fn load_referenced(&mut self, path: &str) -> Result<(String, String), String> {
        let resolved = if path.contains('/') {
            PathBuf::from(path)
        } else {
            self.root_dir().join(path)
        };
        read_file(&resolved).map(|text| (text, path.to_owned()))
    }
}

fn read_file(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|err| format!("Reading '{}' failed: {}", path.display(), err))
}
