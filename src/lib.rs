//! A turtle graphics command interpreter.
//!
//! The crate parses short text commands (`move 50`, `right 90`, `square 40`,
//! `pencolour 0,128,255`, ...), keeps track of the turtle, checks every movement
//! against the canvas before anything is drawn, records what was typed, and can
//! replay a recorded log to rebuild a drawing.
//!
//! The main entry point is [`Interpreter`]. Drawing, user dialogs and image files
//! are reached only through the small traits in [`command`], so the interpreter
//! runs the same way behind a window, a terminal or a test. Headless
//! implementations live in [`io_adapters`].

mod builtin;
pub mod command;
mod error;
mod external;
pub mod geometry;
mod history;
mod interpreter;
pub mod io_adapters;
mod lexer;
mod replay;
mod state;

/// Just a convenient re-export of the command interpreter.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::Interpreter;

pub use error::CommandError;
pub use history::CommandHistory;
pub use lexer::{Tokens, split_into_tokens};
pub use replay::ReplayReport;
pub use state::{Rgb, TurtleState};
