//! Command line parsing for the interactive prompt

use crate::error::CalcError;

/// A parsed prompt command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exit,
    History,
    Help,
    /// `<a> <op> <b>`; the operator is checked by the calculator
    Calculate { a: i64, op: String, b: i64 },
}

/// Parse one line of user input
pub fn parse_command(line: &str) -> Result<Command, CalcError> {
    let line = line.trim();

    match line.to_lowercase().as_str() {
        "exit" => return Ok(Command::Exit),
        "history" => return Ok(Command::History),
        "help" => return Ok(Command::Help),
        _ => {}
    }

    let parts: Vec<&str> = line.split_whitespace().collect();
    let [a, op, b] = parts.as_slice() else {
        return Err(CalcError::InvalidFormat);
    };

    Ok(Command::Calculate {
        a: parse_operand(a)?,
        op: op.to_string(),
        b: parse_operand(b)?,
    })
}

fn parse_operand(token: &str) -> Result<i64, CalcError> {
    token.parse().map_err(|_| CalcError::InvalidNumber {
        token: token.to_string(),
    })
}
