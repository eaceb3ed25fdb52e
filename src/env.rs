use std::env;
use std::path::PathBuf;

/// State the interpreter tracks across commands.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Working directory for builtins and spawned children.
    pub current_dir: PathBuf,
    /// PATH entries captured at startup, in search order.
    pub path_dirs: Vec<PathBuf>,
}

impl Environment {
    pub fn new() -> Self {
        let current_dir = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let path_dirs = env::var_os("PATH")
            .map(|paths| env::split_paths(&paths).collect())
            .unwrap_or_default();
        Self {
            current_dir,
            path_dirs,
        }
    }
}
