use crate::command::{CommandFactory, ExecutableCommand, Flow};
use crate::env::Environment;
use crate::interpreter::Factory;
use anyhow::{Context, Result, bail};
use argh::{EarlyExit, FromArgs};
use std::env;
use std::io::Write;
use std::path::PathBuf;

/// Names of the commands executed in-process, in dispatch order.
pub(crate) const BUILTIN_NAMES: &[&str] = &["cd", "help", "exit"];

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed
/// directly in-process without spawning a child.
pub(crate) trait Builtin: Sized + FromArgs {
    /// Canonical name of the command, e.g. "cd" or "exit".
    fn name() -> &'static str;

    /// Executes the command. An `Err` is reported on the error stream by the
    /// blanket [`ExecutableCommand`] impl and never stops the loop.
    fn run(self, out: &mut dyn Write, env: &mut Environment) -> Result<Flow>;
}

impl<T: Builtin> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        out: &mut dyn Write,
        err: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<Flow> {
        match T::run(*self, out, env) {
            Ok(flow) => Ok(flow),
            Err(cause) => {
                writeln!(err, "minish: {cause:#}")?;
                Ok(Flow::Continue)
            }
        }
    }
}

/// Produced when argh rejects the arguments or handles `--help` itself.
struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(
        self: Box<Self>,
        out: &mut dyn Write,
        err: &mut dyn Write,
        _env: &mut Environment,
    ) -> Result<Flow> {
        let sink: &mut dyn Write = if self.is_error { err } else { out };
        sink.write_all(self.output.as_bytes())?;
        if !self.output.ends_with('\n') {
            writeln!(sink)?;
        }
        Ok(Flow::Continue)
    }
}

impl<T: Builtin + 'static> CommandFactory for Factory<T> {
    fn try_create(
        &self,
        _env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        if name == T::name() {
            Some(match T::from_args(&[name], args) {
                Ok(cmd) => Box::new(cmd),
                Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                    output,
                    is_error: status.is_err(),
                }),
            })
        } else {
            None
        }
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
pub(crate) struct Cd {
    #[argh(positional)]
    /// directory to switch to, absolute or relative to the current directory
    pub target: Option<String>,
}

impl Builtin for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn run(self, _out: &mut dyn Write, env: &mut Environment) -> Result<Flow> {
        let Some(target) = self.target.as_deref().filter(|t| !t.is_empty()) else {
            bail!("cd: expected a directory argument");
        };
        let target = PathBuf::from(target);
        let new_dir = if target.is_absolute() {
            target
        } else {
            env.current_dir.join(target)
        };
        env::set_current_dir(&new_dir).with_context(|| format!("cd: {}", new_dir.display()))?;
        env.current_dir =
            env::current_dir().context("cd: failed to read the new working directory")?;
        Ok(Flow::Continue)
    }
}

#[derive(FromArgs)]
/// Show the usage banner and the list of built-in commands.
pub(crate) struct Help {
    #[argh(positional, greedy)]
    /// ignored
    pub _args: Vec<String>,
}

impl Builtin for Help {
    fn name() -> &'static str {
        "help"
    }

    fn run(self, out: &mut dyn Write, _env: &mut Environment) -> Result<Flow> {
        writeln!(out, "minish: a minimal command interpreter")?;
        writeln!(out, "Type a program name with its arguments, then press enter.")?;
        writeln!(out, "The following commands are built in:")?;
        for name in BUILTIN_NAMES {
            writeln!(out, "  {name}")?;
        }
        writeln!(out, "Use man for documentation on external programs.")?;
        Ok(Flow::Continue)
    }
}

#[derive(FromArgs)]
/// Leave the shell.
pub(crate) struct Exit {
    #[argh(positional, greedy)]
    /// ignored
    pub _args: Vec<String>,
}

impl Builtin for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn run(self, _out: &mut dyn Write, _env: &mut Environment) -> Result<Flow> {
        Ok(Flow::Exit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard, OnceLock};

    // Tests that touch the process-wide working directory must not interleave.
    fn lock_current_dir() -> MutexGuard<'static, ()> {
        static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
        MUTEX.get_or_init(|| Mutex::new(())).lock().unwrap()
    }

    #[test]
    fn cd_without_target_reports_usage_and_continues() {
        let _lock = lock_current_dir();
        let before = env::current_dir().unwrap();

        let mut env = Environment::new();
        let mut out = Vec::new();
        let mut err = Vec::new();
        let cmd: Box<dyn ExecutableCommand> = Box::new(Cd { target: None });
        let flow = cmd.execute(&mut out, &mut err, &mut env).unwrap();

        assert_eq!(flow, Flow::Continue);
        assert!(out.is_empty());
        let message = String::from_utf8(err).unwrap();
        assert!(
            message.starts_with("minish: cd:"),
            "unexpected report: {message}"
        );
        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    fn cd_changes_to_an_existing_directory() {
        let _lock = lock_current_dir();
        let before = env::current_dir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let target = scratch.path().canonicalize().unwrap();

        let mut env = Environment::new();
        let mut out = Vec::new();
        let mut err = Vec::new();
        let cmd: Box<dyn ExecutableCommand> = Box::new(Cd {
            target: Some(target.to_string_lossy().into_owned()),
        });
        let flow = cmd.execute(&mut out, &mut err, &mut env).unwrap();

        assert_eq!(flow, Flow::Continue);
        assert!(err.is_empty(), "{}", String::from_utf8_lossy(&err));
        assert_eq!(env::current_dir().unwrap().canonicalize().unwrap(), target);
        assert_eq!(env.current_dir.canonicalize().unwrap(), target);

        env::set_current_dir(before).unwrap();
    }

    #[test]
    fn cd_to_missing_path_reports_and_keeps_directory() {
        let _lock = lock_current_dir();
        let before = env::current_dir().unwrap();

        let mut env = Environment::new();
        let mut out = Vec::new();
        let mut err = Vec::new();
        let cmd: Box<dyn ExecutableCommand> = Box::new(Cd {
            target: Some("/no/such/directory/anywhere".into()),
        });
        let flow = cmd.execute(&mut out, &mut err, &mut env).unwrap();

        assert_eq!(flow, Flow::Continue);
        let message = String::from_utf8(err).unwrap();
        assert!(message.contains("/no/such/directory/anywhere"));
        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    fn help_prints_banner_with_builtin_names() {
        let mut env = Environment::new();
        let mut out = Vec::new();
        let mut err = Vec::new();
        let cmd: Box<dyn ExecutableCommand> = Box::new(Help {
            _args: vec!["extra".into()],
        });
        let flow = cmd.execute(&mut out, &mut err, &mut env).unwrap();

        assert_eq!(flow, Flow::Continue);
        assert!(err.is_empty());
        let banner = String::from_utf8(out).unwrap();
        for name in BUILTIN_NAMES {
            assert!(banner.contains(name), "banner is missing {name}");
        }
    }

    #[test]
    fn exit_stops_regardless_of_arguments() {
        let mut env = Environment::new();
        let mut out = Vec::new();
        let mut err = Vec::new();
        let cmd: Box<dyn ExecutableCommand> = Box::new(Exit {
            _args: vec!["1".into(), "now".into()],
        });

        assert_eq!(cmd.execute(&mut out, &mut err, &mut env).unwrap(), Flow::Exit);
        assert!(out.is_empty());
        assert!(err.is_empty());
    }

    #[test]
    fn builtin_name_list_matches_factories() {
        assert_eq!(BUILTIN_NAMES, [Cd::name(), Help::name(), Exit::name()]);
    }

    #[test]
    fn factory_only_matches_its_own_name() {
        let env = Environment::new();
        let factory = Factory::<Cd>::default();
        assert!(factory.try_create(&env, "pwd", &[]).is_none());
        assert!(factory.try_create(&env, "cd", &[]).is_some());
    }

    #[test]
    fn unknown_flag_reports_and_continues() {
        let mut env = Environment::new();
        let factory = Factory::<Cd>::default();
        let cmd = factory
            .try_create(&env, "cd", &["--bogus"])
            .expect("cd factory matches cd");

        let mut out = Vec::new();
        let mut err = Vec::new();
        let flow = cmd.execute(&mut out, &mut err, &mut env).unwrap();

        assert_eq!(flow, Flow::Continue);
        assert!(!err.is_empty());
    }
}
