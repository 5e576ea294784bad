//! # Encoder Path Resolver
//!
//! Finds the external encoders (`cwebp`, `cjxl`) used by the codec:
//! - `IMAGE_CONVERTER_TOOLS_DIR` override (bundled binaries)
//! - System `PATH`

use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable pointing to a directory with bundled encoders
pub const TOOLS_DIR_ENV: &str = "IMAGE_CONVERTER_TOOLS_DIR";

/// Resolves encoder binaries on the current system
#[derive(Debug, Clone)]
pub struct ToolPathResolver {
    /// Directory searched before `PATH`
    tools_dir: Option<PathBuf>,
    /// Raw `PATH` value captured at construction
    search_path: Option<std::ffi::OsString>,
}

impl ToolPathResolver {
    /// Create a resolver from the process environment
    pub fn new() -> Self {
        let tools_dir = env::var_os(TOOLS_DIR_ENV)
            .map(PathBuf::from)
            .filter(|dir| dir.is_dir());

        if let Some(ref dir) = tools_dir {
            debug!("Using bundled tools directory: {:?}", dir);
        }

        Self {
            tools_dir,
            search_path: env::var_os("PATH"),
        }
    }

    /// Create a resolver with an explicit tools directory and search path
    pub fn with_dirs(tools_dir: Option<PathBuf>, search_path: Option<std::ffi::OsString>) -> Self {
        Self {
            tools_dir,
            search_path,
        }
    }

    /// Resolve the path to a specific tool
    pub fn resolve_tool(&self, tool_name: &str) -> Option<PathBuf> {
        let file_name = Self::executable_name(tool_name);

        if let Some(ref tools_dir) = self.tools_dir {
            let bundled_path = tools_dir.join(&file_name);
            if bundled_path.is_file() {
                debug!("Using bundled tool: {} -> {:?}", tool_name, bundled_path);
                return Some(bundled_path);
            }
        }

        if let Some(system_path) = self.find_in_system_path(&file_name) {
            debug!("Using system tool: {} -> {:?}", tool_name, system_path);
            return Some(system_path);
        }

        warn!("Tool not found: {}", tool_name);
        None
    }

    fn executable_name(tool_name: &str) -> String {
        if cfg!(windows) {
            format!("{}.exe", tool_name)
        } else {
            tool_name.to_string()
        }
    }

    /// Find tool in system PATH
    fn find_in_system_path(&self, file_name: &str) -> Option<PathBuf> {
        let search_path = self.search_path.as_ref()?;
        env::split_paths(search_path)
            .map(|dir| dir.join(file_name))
            .find(|path| Self::is_executable(path))
    }

    #[cfg(unix)]
    fn is_executable(path: &Path) -> bool {
        use std::os::unix::fs::PermissionsExt;
        path.metadata()
            .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    fn is_executable(path: &Path) -> bool {
        path.is_file()
    }

    /// Check if a specific tool is available
    pub fn is_tool_available(&self, tool_name: &str) -> bool {
        self.resolve_tool(tool_name).is_some()
    }

    /// Get installation instructions for a tool
    pub fn install_instructions(tool_name: &str) -> String {
        match tool_name {
            "cwebp" => "Install the WebP tools (e.g. `sudo apt-get install webp` or `brew install webp`).".to_string(),
            "cjxl" => "Install libjxl tools (e.g. `sudo apt-get install libjxl-tools` or `brew install jpeg-xl`).".to_string(),
            _ => format!("Install '{}' and make sure it is on PATH or in ${}.", tool_name, TOOLS_DIR_ENV),
        }
    }
}

impl Default for ToolPathResolver {
    fn default() -> Self {
        Self::new()
    }
}
