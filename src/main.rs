use anyhow::Result;
use minish::{EditorReader, Interpreter};

fn main() -> Result<()> {
    let mut reader = EditorReader::new()?;
    Interpreter::default().repl(&mut reader)
}
