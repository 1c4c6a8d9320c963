//! Tokenization of a single command line.
//!
//! The lexer only splits; arity and range checks depend on the command and are done
//! by the command types themselves through the helpers on [`Tokens`].

use crate::error::CommandError;
use regex::Regex;
use std::sync::LazyLock;

/// Separators allowed inside numeric lists such as `pencolour 255, 128, 0`.
static LIST_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s,]+").expect("valid separator pattern"));

/// A tokenized command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokens {
    /// The trimmed line exactly as typed. This is what goes into the history.
    pub raw: String,
    /// Lower-cased command name.
    pub command: String,
    /// Whitespace separated arguments, in order.
    pub args: Vec<String>,
    /// Everything after the command word, trimmed.
    pub rest: String,
}

impl Tokens {
    /// Parse argument `index` as an integer.
    ///
    /// `expected` names the argument in the `MissingArgument` error.
    pub fn int_arg(&self, index: usize, expected: &'static str) -> Result<i64, CommandError> {
        match self.args.get(index) {
            Some(value) => self.parse_int(value),
            None => Err(CommandError::MissingArgument {
                command: self.command.clone(),
                expected,
            }),
        }
    }

    /// Parse argument `index` as an integer if it is present.
    pub fn optional_int_arg(&self, index: usize) -> Result<Option<i64>, CommandError> {
        self.args
            .get(index)
            .map(|value| self.parse_int(value))
            .transpose()
    }

    /// Parse the whole remainder as a list of integers separated by commas and/or whitespace.
    pub fn int_list(&self) -> Result<Vec<i64>, CommandError> {
        if self.rest.is_empty() {
            return Ok(Vec::new());
        }
        LIST_SEPARATOR
            .split(&self.rest)
            .filter(|part| !part.is_empty())
            .map(|part| self.parse_int(part))
            .collect()
    }

    fn parse_int(&self, value: &str) -> Result<i64, CommandError> {
        value
            .parse::<i64>()
            .map_err(|_| CommandError::InvalidNumber {
                command: self.command.clone(),
                value: value.to_string(),
            })
    }

    pub(crate) fn out_of_range(&self, value: i64, expected: &'static str) -> CommandError {
        CommandError::OutOfRangeValue {
            command: self.command.clone(),
            value,
            expected,
        }
    }
}

/// The main entry point function to perform lexical analysis.
///
/// # Arguments
/// * `line` - The raw line typed by the user or read from a command log.
///
/// # Returns
/// `Result<Tokens, CommandError>`: the command name (lower-cased) and its arguments,
/// or `EmptyInput` if the line is blank.
pub fn split_into_tokens(line: &str) -> Result<Tokens, CommandError> {
    let raw = line.trim();
    let mut words = raw.split_whitespace();
    let Some(first) = words.next() else {
        return Err(CommandError::EmptyInput);
    };
    let args = words.map(str::to_string).collect();
    let rest = raw[first.len()..].trim().to_string();

    Ok(Tokens {
        raw: raw.to_string(),
        command: first.to_lowercase(),
        args,
        rest,
    })
}
