use crate::env::Environment;
use anyhow::Result;
use std::io::Write;

/// Loop-continuation signal produced by every dispatched command.
///
/// The command loop keeps running on [`Flow::Continue`] and terminates on
/// [`Flow::Exit`]. A failed command is not a reason to stop: failures are
/// reported on the error stream and map to `Continue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep reading commands.
    Continue,
    /// Terminate the command loop.
    Exit,
}

/// Object-safe trait for any command the interpreter can execute.
///
/// Implemented by built-ins via a blanket impl and by the external launcher.
/// `out` and `err` are the interpreter's output and error streams; external
/// children inherit the real standard streams instead.
pub trait ExecutableCommand {
    /// Executes the command and reports how the loop should proceed.
    fn execute(
        self: Box<Self>,
        out: &mut dyn Write,
        err: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<Flow>;
}

/// Factory that tries to create a command from a name and its arguments.
///
/// Returns `None` when the factory doesn't recognize the `name`; the
/// dispatcher then moves on to the next factory and finally reports the
/// command as not found.
pub trait CommandFactory {
    /// Attempt to create a command instance for the provided name and arguments.
    fn try_create(
        &self,
        env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>>;
}
