//! CLI utilities for the driver.
//!
//! The utilities present in this module can be used to create an interactive
//! shell around a session.
use std::io::{BufRead, Write};

/// Possible commands from a user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Exit command `.exit`
    Exit,
    /// Statement to send to the connected node
    Statement(String),
}

/// Prompt user for a statement or shell command.
///
/// End of input behaves like an explicit `.exit`.
pub fn prompt<R, W>(mut reader: R, mut writer: W) -> Result<Command, String>
where
    R: BufRead,
    W: Write,
{
    let mut s = String::default();
    write!(&mut writer, "cql> ").map_err(|e| e.to_string())?;
    writer.flush().map_err(|e| e.to_string())?;

    if reader.read_line(&mut s).map_err(|e| e.to_string())? == 0 {
        return Ok(Command::Exit);
    }

    match s.trim_end() {
        ".exit" => Ok(Command::Exit),
        s if !s.starts_with('.') => Ok(Command::Statement(s.to_string())),
        s => Err(format!("unrecognized command '{s}'")),
    }
}
