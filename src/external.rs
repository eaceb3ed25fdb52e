use crate::command::{CommandFactory, ExecutableCommand, Flow};
use crate::env::Environment;
use crate::interpreter::Factory;
use anyhow::Result;
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Command that is not a builtin: a program launched as a child process.
pub(crate) struct ExternalCommand {
    /// Resolved path of the executable.
    program: PathBuf,
    /// Name as typed, passed to the child as argument zero.
    name: OsString,
    args: Vec<OsString>,
}

impl CommandFactory for Factory<ExternalCommand> {
    fn try_create(
        &self,
        env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        let program = resolve_program(&env.path_dirs, name)?;
        Some(Box::new(ExternalCommand {
            program,
            name: name.into(),
            args: args.iter().map(|arg| arg.into()).collect(),
        }))
    }
}

impl ExecutableCommand for ExternalCommand {
    fn execute(
        self: Box<Self>,
        _out: &mut dyn Write,
        err: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<Flow> {
        let mut command = Command::new(&self.program);
        command.args(&self.args).current_dir(&env.current_dir);
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.arg0(&self.name);
        }

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(cause) => {
                writeln!(err, "minish: {}: {cause}", self.name.to_string_lossy())?;
                return Ok(Flow::Continue);
            }
        };
        // Returns only once the child has exited or been killed by a signal;
        // a merely stopped child keeps the wait alive.
        if let Err(cause) = child.wait() {
            writeln!(err, "minish: {}: {cause}", self.name.to_string_lossy())?;
        }
        Ok(Flow::Continue)
    }
}

/// Resolve a program name the way a normal program launch would.
///
/// Behavior:
/// - Absolute path, or relative path with more than one component: taken
///   as-is when it names an executable regular file.
/// - Bare name: each directory of `path_dirs` is searched in order and the
///   first executable match wins.
/// - Empty name: never resolves.
pub(crate) fn resolve_program(path_dirs: &[PathBuf], name: &str) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }
    let path = Path::new(name);
    if path.is_absolute() || path.components().count() > 1 {
        return is_executable(path).then(|| path.to_path_buf());
    }
    path_dirs
        .iter()
        .map(|dir| dir.join(path))
        .find(|candidate| is_executable(candidate))
}

fn is_executable(path: &Path) -> bool {
    let Ok(metadata) = fs::metadata(path) else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        true
    }
}
