use crate::builtin::{Cd, Exit, Help};
use crate::command::{CommandFactory, Flow};
use crate::env::Environment;
use crate::external::ExternalCommand;
use crate::lexer;
use crate::reader::{LineReader, ReadOutcome};
use anyhow::Result;
use std::io::Write;

const PROMPT: &str = "> ";

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports commands defined in this crate, builtins and ExternalCommand.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// A minimal command interpreter that executes built-in and external commands.
///
/// The interpreter maintains an [`Environment`] and an immutable list of
/// [`CommandFactory`] objects queried in order to create commands by name.
/// See [`Default`] for the factories included out of the box.
///
/// Example
/// ```
/// use minish::{Flow, Interpreter};
/// let mut sh = Interpreter::default();
/// let mut out = Vec::new();
/// let mut err = Vec::new();
/// let flow = sh.dispatch(&["help"], &mut out, &mut err).unwrap();
/// assert_eq!(flow, Flow::Continue);
/// ```
pub struct Interpreter {
    env: Environment,
    commands: Vec<Box<dyn CommandFactory>>,
}

impl Interpreter {
    /// Create a new interpreter with a custom set of command factories.
    pub fn new(commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self {
            env: Environment::new(),
            commands,
        }
    }

    /// Dispatch one tokenized command line.
    ///
    /// An empty `argv` is a no-op that still continues the loop. A name no
    /// factory recognizes is reported on `err` as not found; the loop
    /// continues in every case except the exit builtin.
    pub fn dispatch(
        &mut self,
        argv: &[&str],
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> Result<Flow> {
        let Some((name, args)) = argv.split_first() else {
            return Ok(Flow::Continue);
        };
        for factory in &self.commands {
            if let Some(cmd) = factory.try_create(&self.env, name, args) {
                return cmd.execute(out, err, &mut self.env);
            }
        }
        writeln!(err, "minish: {name}: command not found")?;
        Ok(Flow::Continue)
    }

    /// Read, tokenize and dispatch until the exit builtin or end of input.
    ///
    /// The line and its token list are scoped to one iteration and released
    /// on every path through the loop body.
    pub fn repl(&mut self, reader: &mut dyn LineReader) -> Result<()> {
        loop {
            let line = match reader.read_line(PROMPT)? {
                ReadOutcome::Line(line) => line,
                ReadOutcome::EndOfInput => break,
            };
            let argv = lexer::split_line(&line);
            if argv.is_empty() {
                continue;
            }
            let flow = self.dispatch(&argv, &mut std::io::stdout(), &mut std::io::stderr())?;
            if flow == Flow::Exit {
                break;
            }
        }
        Ok(())
    }
}

impl Default for Interpreter {
    /// Create an interpreter with the default set of commands:
    /// the `cd`, `help` and `exit` builtins plus the external launcher.
    fn default() -> Self {
        Self::new(vec![
            Box::new(Factory::<Cd>::default()),
            Box::new(Factory::<Help>::default()),
            Box::new(Factory::<Exit>::default()),
            Box::new(Factory::<ExternalCommand>::default()),
        ])
    }
}
