use thiserror::Error;

/// Everything that can go wrong while processing a single command line.
///
/// None of these are fatal: the interpreter reports the error and goes on
/// accepting commands. A command that fails never leaves a partial change
/// behind.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    /// The line was blank after trimming.
    #[error("empty input")]
    EmptyInput,

    /// A required argument is absent, or the argument count is wrong.
    #[error("{command}: missing {expected}")]
    MissingArgument {
        command: String,
        expected: &'static str,
    },

    /// An argument that should be an integer is not one.
    #[error("{command}: invalid number '{value}'")]
    InvalidNumber { command: String, value: String },

    /// A numeric argument parsed fine but is not allowed (negative distance, RGB above 255, ...).
    #[error("{command}: {value} is out of range, expected {expected}")]
    OutOfRangeValue {
        command: String,
        value: i64,
        expected: &'static str,
    },

    /// The movement would leave the canvas.
    #[error("{command}: movement out of bounds (would reach {x:.1}, {y:.1})")]
    OutOfBounds { command: String, x: f64, y: f64 },

    /// The requested triangle cannot exist or its argument is malformed.
    #[error("{command}: shape cannot be drawn")]
    DegenerateShape { command: String },

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Reading or writing a file on behalf of a delegated command failed.
    #[error("{0}")]
    Persistence(String),
}

impl CommandError {
    /// Whether the error should be shown to the user.
    ///
    /// Blank lines and best-effort shapes fail silently.
    pub fn is_surfaced(&self) -> bool {
        !matches!(
            self,
            CommandError::EmptyInput | CommandError::DegenerateShape { .. }
        )
    }

    pub(crate) fn persistence(err: anyhow::Error) -> Self {
        CommandError::Persistence(format!("{err:#}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_errors_are_not_surfaced() {
        assert!(!CommandError::EmptyInput.is_surfaced());
        assert!(
            !CommandError::DegenerateShape {
                command: "triangle".to_string()
            }
            .is_surfaced()
        );
        assert!(CommandError::UnknownCommand("jump".to_string()).is_surfaced());
    }

    #[test]
    fn test_messages_name_the_command() {
        let err = CommandError::OutOfRangeValue {
            command: "pencolour".to_string(),
            value: 999,
            expected: "0..=255",
        };
        assert_eq!(
            err.to_string(),
            "pencolour: 999 is out of range, expected 0..=255"
        );
        assert_eq!(
            CommandError::UnknownCommand("jump 3".to_string()).to_string(),
            "Unknown command: jump 3"
        );
    }

    #[test]
    fn test_persistence_keeps_context_chain() {
        let err = anyhow::anyhow!("disk full").context("cannot write drawing.txt");
        assert_eq!(
            CommandError::persistence(err),
            CommandError::Persistence("cannot write drawing.txt: disk full".to_string())
        );
    }
}
