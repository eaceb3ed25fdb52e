use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::BufRead;

/// One acquisition from the input stream.
#[derive(Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A full line with its trailing newline removed. May be empty.
    Line(String),
    /// The stream ended with nothing read. Distinct from an empty line.
    EndOfInput,
}

/// Source of command lines for the interpreter loop.
pub trait LineReader {
    /// Read the next line, displaying `prompt` where the medium supports it.
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome>;
}

/// Interactive reader backed by a rustyline editor.
///
/// Non-empty lines are added to the in-memory history.
pub struct EditorReader {
    editor: DefaultEditor,
}

impl EditorReader {
    pub fn new() -> Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineReader for EditorReader {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(ReadOutcome::Line(line))
            }
            // Ctrl-C abandons the current line; the loop prompts again.
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Line(String::new())),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::EndOfInput),
            Err(err) => Err(err.into()),
        }
    }
}

/// Reader over any buffered source, for driving the loop from non-terminal
/// input. The prompt is accepted and ignored.
pub struct BufferedReader<R> {
    input: R,
}

impl<R: BufRead> BufferedReader<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }

    /// Hand back the underlying source, with any unread input still buffered.
    pub fn into_inner(self) -> R {
        self.input
    }
}

impl<R: BufRead> LineReader for BufferedReader<R> {
    fn read_line(&mut self, _prompt: &str) -> Result<ReadOutcome> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(ReadOutcome::EndOfInput);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(ReadOutcome::Line(line))
    }
}

#[cfg(test)]
mod tests {
    use super::{BufferedReader, LineReader, ReadOutcome};
    use std::io::Cursor;

    #[test]
    fn empty_line_is_not_end_of_input() {
        let mut reader = BufferedReader::new(Cursor::new(b"\n".to_vec()));
        assert_eq!(
            reader.read_line("> ").unwrap(),
            ReadOutcome::Line(String::new())
        );
        assert_eq!(reader.read_line("> ").unwrap(), ReadOutcome::EndOfInput);
    }

    #[test]
    fn strips_crlf_line_endings() {
        let mut reader = BufferedReader::new(Cursor::new(b"ls -l\r\n".to_vec()));
        assert_eq!(
            reader.read_line("> ").unwrap(),
            ReadOutcome::Line("ls -l".into())
        );
    }

    #[test]
    fn last_line_without_newline_is_still_a_line() {
        let mut reader = BufferedReader::new(Cursor::new(b"exit".to_vec()));
        assert_eq!(
            reader.read_line("> ").unwrap(),
            ReadOutcome::Line("exit".into())
        );
        assert_eq!(reader.read_line("> ").unwrap(), ReadOutcome::EndOfInput);
    }

    #[test]
    fn long_lines_survive_buffer_growth() {
        let long = "x".repeat(64 * 1024);
        let mut input = long.clone().into_bytes();
        input.push(b'\n');
        let mut reader = BufferedReader::new(Cursor::new(input));
        match reader.read_line("> ").unwrap() {
            ReadOutcome::Line(line) => assert_eq!(line, long),
            ReadOutcome::EndOfInput => panic!("expected a line"),
        }
    }
}
