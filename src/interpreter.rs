use crate::command::{
    Canvas, CommandFactory, Context, Dialogs, ImageStore, Mode, Outcome, Workspace,
};
use crate::error::CommandError;
use crate::history::CommandHistory;
use crate::lexer::split_into_tokens;
use crate::state::TurtleState;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::Write;

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports commands defined in this crate, builtin and delegated alike.
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

/// Commands that never end up in the history.
const UNRECORDED: &[&str] = &["save", "savecommands", "clear"];

/// One turtle drawing session.
///
/// The interpreter owns the [`TurtleState`], the [`CommandHistory`] and the
/// collaborators, and processes one command line at a time.
///
/// Example
/// ```
/// use turtle_commands::geometry::CanvasBounds;
/// use turtle_commands::io_adapters::{FileImageStore, MemWriter, RecordingCanvas, ScriptedDialogs};
/// use turtle_commands::Interpreter;
///
/// let (canvas, _) = RecordingCanvas::with_handle(CanvasBounds::new(400, 400));
/// let (dialogs, _) = ScriptedDialogs::with_handle();
/// let (out, _) = MemWriter::with_handle();
/// let mut turtle = Interpreter::new(
///     Box::new(canvas),
///     Box::new(dialogs),
///     Box::new(FileImageStore),
///     Box::new(out),
/// );
/// turtle.process_command("square 50").unwrap();
/// assert_eq!(turtle.state().heading, 90);
/// ```
pub struct Interpreter {
    state: TurtleState,
    history: CommandHistory,
    workspace: Workspace,
    canvas: Box<dyn Canvas>,
    dialogs: Box<dyn Dialogs>,
    images: Box<dyn ImageStore>,
    out: Box<dyn Write>,
    commands: Vec<Box<dyn CommandFactory>>,
}

impl Interpreter {
    /// Create a session with the default command set.
    pub fn new(
        canvas: Box<dyn Canvas>,
        dialogs: Box<dyn Dialogs>,
        images: Box<dyn ImageStore>,
        out: Box<dyn Write>,
    ) -> Self {
        Self::with_commands(default_commands(), canvas, dialogs, images, out)
    }

    /// Create a session with a custom set of command factories.
    pub fn with_commands(
        commands: Vec<Box<dyn CommandFactory>>,
        mut canvas: Box<dyn Canvas>,
        dialogs: Box<dyn Dialogs>,
        images: Box<dyn ImageStore>,
        out: Box<dyn Write>,
    ) -> Self {
        let state = TurtleState::new(canvas.bounds());
        canvas.set_color(state.pen_color);
        canvas.set_width(state.pen_width);
        Self {
            state,
            history: CommandHistory::new(),
            workspace: Workspace::default(),
            canvas,
            dialogs,
            images,
            out,
            commands,
        }
    }

    pub fn state(&self) -> &TurtleState {
        &self.state
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Process one line typed by the user.
    pub fn process_command(&mut self, line: &str) -> Result<Outcome, CommandError> {
        self.dispatch(line, Mode::Interactive)
    }

    /// Tokenize, record, execute and report a single command line.
    ///
    /// Errors are already reported to the diagnostic stream (and, in interactive
    /// mode, to the dialogs) when this returns; the result is for the caller's
    /// information only.
    pub fn dispatch(&mut self, line: &str, mode: Mode) -> Result<Outcome, CommandError> {
        let tokens = split_into_tokens(line)?;

        if mode == Mode::Interactive && !UNRECORDED.contains(&tokens.command.as_str()) {
            self.history.push(tokens.raw.clone());
        }
        if let Err(err) = writeln!(self.out, "{}", tokens.raw) {
            tracing::debug!(error = %err, "diagnostic stream write failed");
        }
        tracing::debug!(command = %tokens.command, ?mode, "dispatching");

        let cmd = self
            .commands
            .iter()
            .find_map(|factory| factory.try_create(&tokens));
        let result = match cmd {
            Some(cmd) => {
                let mut ctx = self.context(mode);
                cmd.execute(&mut ctx)
            }
            None => Err(CommandError::UnknownCommand(tokens.raw.clone())),
        };
        self.canvas.repaint();

        match result {
            Ok(Outcome::Replay(log)) if mode == Mode::Interactive => {
                self.replay(&log);
                Ok(Outcome::Replay(log))
            }
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                self.report(&err, mode);
                Err(err)
            }
        }
    }

    pub(crate) fn context(&mut self, mode: Mode) -> Context<'_> {
        Context {
            state: &mut self.state,
            history: &mut self.history,
            workspace: &mut self.workspace,
            canvas: self.canvas.as_mut(),
            dialogs: self.dialogs.as_mut(),
            images: self.images.as_mut(),
            out: self.out.as_mut(),
            mode,
        }
    }

    pub(crate) fn history_mut(&mut self) -> &mut CommandHistory {
        &mut self.history
    }

    fn report(&mut self, err: &CommandError, mode: Mode) {
        if !err.is_surfaced() {
            tracing::debug!(error = %err, "silently ignored");
            return;
        }
        tracing::warn!(error = %err, ?mode, "command failed");
        let message = err.to_string();
        if let Err(err) = writeln!(self.out, "{}", message) {
            tracing::debug!(error = %err, "diagnostic stream write failed");
        }
        if mode == Mode::Interactive {
            self.dialogs.show_error(&message);
        }
    }

    /// Interactive Read-Eval-Print Loop on the terminal.
    ///
    /// Stops on Ctrl-C, Ctrl-D, `exit` or `quit`.
    pub fn repl(&mut self) -> rustyline::Result<()> {
        let mut rl = DefaultEditor::new()?;

        loop {
            match rl.readline("turtle> ") {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    if matches!(trimmed, "exit" | "quit") {
                        break;
                    }
                    rl.add_history_entry(trimmed)?;
                    // Errors were reported by the interpreter already.
                    let _ = self.process_command(trimmed);
                }
                Err(ReadlineError::Interrupted) => {
                    println!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    println!("Error: {:?}", err);
                    break;
                }
            }
        }

        Ok(())
    }
}

/// The default command set:
/// - drawing: `pendown`, `penup`, `move`/`forward`, `reverse`, `left`/`right`,
///   `square`, `triangle`, `square_spiral`
/// - pen: `red`, `green`, `blue`, `yellow`, `pencolour`, `penwidth`
/// - surface: `clear`, `reset`
/// - delegated: `save`, `savecommands`, `load`, `loadcommands`, `about`
fn default_commands() -> Vec<Box<dyn CommandFactory>> {
    use crate::builtin::*;
    use crate::external::*;
    vec![
        Box::new(Factory::<PenDown>::default()),
        Box::new(Factory::<PenUp>::default()),
        Box::new(Factory::<Move>::default()),
        Box::new(Factory::<Reverse>::default()),
        Box::new(Factory::<Turn>::default()),
        Box::new(Factory::<PresetColor>::default()),
        Box::new(Factory::<PenColour>::default()),
        Box::new(Factory::<PenWidth>::default()),
        Box::new(Factory::<Clear>::default()),
        Box::new(Factory::<Reset>::default()),
        Box::new(Factory::<Square>::default()),
        Box::new(Factory::<Triangle>::default()),
        Box::new(Factory::<SquareSpiral>::default()),
        Box::new(Factory::<Save>::default()),
        Box::new(Factory::<SaveCommands>::default()),
        Box::new(Factory::<Load>::default()),
        Box::new(Factory::<LoadCommands>::default()),
        Box::new(Factory::<About>::default()),
    ]
}
