use crate::error::CommandError;
use crate::geometry::{self, CanvasBounds, Step};
use crate::history::CommandHistory;
use crate::lexer::Tokens;
use crate::state::{Rgb, TurtleState};
use anyhow::Result;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Minimal drawing instruction handed to the [`Canvas`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawPrimitive {
    /// Move the pen to `(x, y)`, leaving a stroke if `stroke_visible`.
    MoveTo { x: f64, y: f64, stroke_visible: bool },
    /// Point the turtle at `heading` degrees.
    TurnTo { heading: i32 },
}

/// Encoded picture of the canvas, as produced by [`Canvas::snapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot(pub Vec<u8>);

/// A decoded image shown behind the drawing.
///
/// The interpreter never looks inside; it only knows whether one is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHandle(pub Vec<u8>);

/// The drawing surface.
///
/// The interpreter computes all geometry itself and tells the canvas only what to show.
pub trait Canvas {
    /// Current size of the surface. Queried before every movement.
    fn bounds(&self) -> CanvasBounds;

    fn draw(&mut self, primitive: DrawPrimitive);

    fn set_color(&mut self, color: Rgb);

    fn set_width(&mut self, width: u32);

    /// Erase everything drawn so far.
    fn clear_surface(&mut self);

    /// Show `image` behind the drawing, or remove the current one.
    fn set_background(&mut self, image: Option<&ImageHandle>);

    /// Picture of what is currently shown.
    fn snapshot(&self) -> Snapshot;

    /// Called once after every completed command.
    fn repaint(&mut self) {}
}

/// User interaction that the interpreter delegates.
///
/// Every method is synchronous. `None` or `false` means the user cancelled.
pub trait Dialogs {
    fn confirm(&mut self, message: &str) -> bool;

    fn choose_save_path(&mut self, suggested_extension: &str) -> Option<PathBuf>;

    fn choose_open_path(&mut self, filter_extension: &str) -> Option<PathBuf>;

    /// Blocking error notification.
    fn show_error(&mut self, message: &str);

    fn show_message(&mut self, title: &str, message: &str);
}

/// Image encoding and decoding.
pub trait ImageStore {
    /// File extension, without the dot, used for saved images.
    fn extension(&self) -> &str;

    fn encode(&mut self, snapshot: &Snapshot, path: &Path) -> Result<()>;

    fn decode(&mut self, path: &Path) -> Result<ImageHandle>;
}

/// Whether a command comes from the user or from a command log being replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Interactive,
    /// Nothing is recorded and nothing opens a dialog.
    Replay,
}

/// What a successfully executed command did.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Applied,
    /// The user declined or dismissed a dialog. Nothing changed.
    Cancelled,
    /// The command makes no sense while replaying and was ignored.
    Skipped,
    /// Replace the session with this log. Carried out by the interpreter.
    Replay(CommandHistory),
}

/// Session state that is not about the turtle itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workspace {
    /// While set, pen strokes stay invisible.
    pub background: Option<ImageHandle>,
    pub last_image: Option<PathBuf>,
    pub last_commands: Option<PathBuf>,
}

/// Everything a command may touch while it executes.
pub struct Context<'a> {
    pub state: &'a mut TurtleState,
    pub history: &'a mut CommandHistory,
    pub workspace: &'a mut Workspace,
    pub canvas: &'a mut dyn Canvas,
    pub dialogs: &'a mut dyn Dialogs,
    pub images: &'a mut dyn ImageStore,
    /// Plain diagnostic stream.
    pub out: &'a mut dyn Write,
    pub mode: Mode,
}

impl Context<'_> {
    /// Run a drawing plan as one unit.
    ///
    /// Every position the plan visits is checked against the canvas first. If any
    /// of them is outside, nothing is drawn and the state stays as it was.
    pub fn run(&mut self, command: &str, steps: &[Step]) -> Result<Outcome, CommandError> {
        let bounds = self.canvas.bounds();
        let poses = geometry::trace(self.state.pose(), steps, bounds).map_err(|escaped| {
            CommandError::OutOfBounds {
                command: command.to_string(),
                x: escaped.x,
                y: escaped.y,
            }
        })?;

        let stroke_visible = self.state.pen_down && self.workspace.background.is_none();
        for (step, pose) in steps.iter().zip(&poses) {
            let primitive = match step {
                Step::Forward(_) => DrawPrimitive::MoveTo {
                    x: pose.position.x,
                    y: pose.position.y,
                    stroke_visible,
                },
                Step::Turn { .. } => DrawPrimitive::TurnTo {
                    heading: pose.heading,
                },
            };
            self.canvas.draw(primitive);
        }

        if let Some(last) = poses.last() {
            self.state.position = last.position;
            self.state.heading = last.heading;
            self.state.dirty = true;
        }
        Ok(Outcome::Applied)
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.state.pen_color = color;
        self.canvas.set_color(color);
    }

    pub fn set_width(&mut self, width: u32) {
        self.state.pen_width = width;
        self.canvas.set_width(width);
    }

    pub fn set_background(&mut self, image: Option<ImageHandle>) {
        self.canvas.set_background(image.as_ref());
        self.workspace.background = image;
    }

    /// Put the turtle back to its defaults and bring the canvas pen along.
    pub fn restore_defaults(&mut self) {
        self.state.reset(self.canvas.bounds());
        self.canvas.set_color(self.state.pen_color);
        self.canvas.set_width(self.state.pen_width);
        self.canvas.draw(DrawPrimitive::MoveTo {
            x: self.state.position.x,
            y: self.state.position.y,
            stroke_visible: false,
        });
        self.canvas.draw(DrawPrimitive::TurnTo {
            heading: self.state.heading,
        });
    }

    /// Write a line to the diagnostic stream.
    pub fn say(&mut self, message: impl std::fmt::Display) {
        if let Err(err) = writeln!(self.out, "{}", message) {
            tracing::debug!(error = %err, "diagnostic stream write failed");
        }
    }
}

/// Object-safe trait for any command the interpreter can execute.
pub trait ExecutableCommand {
    fn execute(self: Box<Self>, ctx: &mut Context<'_>) -> Result<Outcome, CommandError>;
}

/// Factory that tries to create a command from a tokenized line.
///
/// Returns `None` when the factory doesn't recognize the command name.
pub trait CommandFactory {
    fn try_create(&self, tokens: &Tokens) -> Option<Box<dyn ExecutableCommand>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io_adapters::{FileImageStore, RecordingCanvas, ScriptedDialogs};

    #[test]
    fn test_background_hides_strokes_while_pen_is_down() {
        let bounds = CanvasBounds::new(100, 100);
        let (mut canvas, log) = RecordingCanvas::with_handle(bounds);
        let (mut dialogs, _) = ScriptedDialogs::with_handle();
        let mut images = FileImageStore;
        let mut out = Vec::new();
        let mut state = TurtleState::new(bounds);
        state.pen_down = true;
        let mut history = CommandHistory::new();
        let mut workspace = Workspace {
            background: Some(ImageHandle(b"<svg/>".to_vec())),
            ..Workspace::default()
        };

        let mut ctx = Context {
            state: &mut state,
            history: &mut history,
            workspace: &mut workspace,
            canvas: &mut canvas,
            dialogs: &mut dialogs,
            images: &mut images,
            out: &mut out,
            mode: Mode::Interactive,
        };
        ctx.run("move", &[Step::Forward(10.0)]).unwrap();
        assert!(log.borrow().strokes.is_empty());
        assert!(matches!(
            log.borrow().primitives[0],
            DrawPrimitive::MoveTo {
                stroke_visible: false,
                ..
            }
        ));

        ctx.set_background(None);
        ctx.run("move", &[Step::Forward(10.0)]).unwrap();
        assert_eq!(log.borrow().strokes.len(), 1);
        assert!((ctx.state.position.y - 30.0).abs() < 1e-9);
    }
}
