//! Commands delegated to collaborators outside the interpreter: file pickers,
//! image encoding, command-log files and the about box.
//!
//! None of these draw. They only flip the "unsaved changes" flag, swap the
//! background image, or hand a loaded log to the replay engine.

use crate::builtin::BuiltinCommand;
use crate::command::{Context, Mode, Outcome};
use crate::error::CommandError;
use crate::history::CommandHistory;
use crate::lexer::Tokens;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Extension of saved command logs.
pub const COMMAND_LOG_EXTENSION: &str = "txt";

/// Append `.extension` unless `path` already ends with it (case-insensitively).
pub fn with_extension(path: PathBuf, extension: &str) -> PathBuf {
    let has_it = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
    if has_it {
        return path;
    }
    let mut name = OsString::from(path);
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// Commands that would open dialogs or reload files are meaningless inside a replayed log.
fn skip_during_replay(ctx: &mut Context<'_>, name: &str) -> Option<Outcome> {
    if ctx.mode == Mode::Replay {
        ctx.say(format!("{}: skipped while replaying", name));
        Some(Outcome::Skipped)
    } else {
        None
    }
}

/// Reuse `last` if the file is still there, otherwise ask the user.
fn open_path(ctx: &mut Context<'_>, last: Option<PathBuf>, extension: &str) -> Option<PathBuf> {
    last.filter(|path| path.exists())
        .or_else(|| ctx.dialogs.choose_open_path(extension))
}

fn ensure_exists(path: &Path, what: &str) -> Result<(), CommandError> {
    if path.exists() {
        Ok(())
    } else {
        Err(CommandError::Persistence(format!(
            "Selected {} file does not exist: {}",
            what,
            path.display()
        )))
    }
}

/// Save the current drawing as an image.
pub struct Save;

impl BuiltinCommand for Save {
    fn names() -> &'static [&'static str] {
        &["save"]
    }

    fn parse(_tokens: &Tokens) -> Result<Self, CommandError> {
        Ok(Save)
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<Outcome, CommandError> {
        if let Some(outcome) = skip_during_replay(ctx, "save") {
            return Ok(outcome);
        }
        let snapshot = ctx.canvas.snapshot();
        let extension = ctx.images.extension().to_string();
        let Some(path) = ctx.dialogs.choose_save_path(&extension) else {
            return Ok(Outcome::Cancelled);
        };
        let path = with_extension(path, &extension);

        ctx.images
            .encode(&snapshot, &path)
            .map_err(CommandError::persistence)?;
        tracing::info!(path = %path.display(), "image saved");
        ctx.say(format!("Image saved as {}", path.display()));
        ctx.workspace.last_image = Some(path);
        ctx.state.dirty = false;
        Ok(Outcome::Applied)
    }
}

/// Write the command history to a text file.
pub struct SaveCommands;

impl BuiltinCommand for SaveCommands {
    fn names() -> &'static [&'static str] {
        &["savecommands"]
    }

    fn parse(_tokens: &Tokens) -> Result<Self, CommandError> {
        Ok(SaveCommands)
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<Outcome, CommandError> {
        if let Some(outcome) = skip_during_replay(ctx, "savecommands") {
            return Ok(outcome);
        }
        let Some(path) = ctx.dialogs.choose_save_path(COMMAND_LOG_EXTENSION) else {
            return Ok(Outcome::Cancelled);
        };
        let path = with_extension(path, COMMAND_LOG_EXTENSION);

        ctx.history
            .save(&path)
            .map_err(CommandError::persistence)?;
        tracing::info!(path = %path.display(), commands = ctx.history.len(), "commands saved");
        ctx.say(format!("Commands saved to {}", path.display()));
        ctx.workspace.last_commands = Some(path);
        Ok(Outcome::Applied)
    }
}

/// Show an image as background. The turtle starts over in front of it.
pub struct Load;

impl BuiltinCommand for Load {
    fn names() -> &'static [&'static str] {
        &["load"]
    }

    fn parse(_tokens: &Tokens) -> Result<Self, CommandError> {
        Ok(Load)
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<Outcome, CommandError> {
        if let Some(outcome) = skip_during_replay(ctx, "load") {
            return Ok(outcome);
        }
        let extension = ctx.images.extension().to_string();
        let last = ctx.workspace.last_image.clone();
        let Some(path) = open_path(ctx, last, &extension) else {
            return Ok(Outcome::Cancelled);
        };
        ensure_exists(&path, "image")?;
        let image = ctx
            .images
            .decode(&path)
            .map_err(CommandError::persistence)?;

        ctx.canvas.clear_surface();
        ctx.restore_defaults();
        ctx.set_background(Some(image));
        // The log can't reproduce a picture that came from a file.
        ctx.history.clear();
        tracing::info!(path = %path.display(), "image loaded");
        ctx.say(format!("Image loaded from {}", path.display()));
        ctx.workspace.last_image = Some(path);
        Ok(Outcome::Applied)
    }
}

/// Read a command log and replay it from a clean state.
pub struct LoadCommands;

impl BuiltinCommand for LoadCommands {
    fn names() -> &'static [&'static str] {
        &["loadcommands"]
    }

    fn parse(_tokens: &Tokens) -> Result<Self, CommandError> {
        Ok(LoadCommands)
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<Outcome, CommandError> {
        if let Some(outcome) = skip_during_replay(ctx, "loadcommands") {
            return Ok(outcome);
        }
        let last = ctx.workspace.last_commands.clone();
        let Some(path) = open_path(ctx, last, COMMAND_LOG_EXTENSION) else {
            return Ok(Outcome::Cancelled);
        };
        ensure_exists(&path, "commands")?;
        let log = CommandHistory::load(&path).map_err(CommandError::persistence)?;
        ctx.workspace.last_commands = Some(path);
        Ok(Outcome::Replay(log))
    }
}

pub struct About;

impl About {
    pub fn message() -> String {
        format!(
            "{} {}: a turtle graphics command interpreter",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        )
    }
}

impl BuiltinCommand for About {
    fn names() -> &'static [&'static str] {
        &["about"]
    }

    fn parse(_tokens: &Tokens) -> Result<Self, CommandError> {
        Ok(About)
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<Outcome, CommandError> {
        let message = About::message();
        if ctx.mode == Mode::Interactive {
            ctx.dialogs.show_message("About", &message);
        }
        ctx.say(message);
        Ok(Outcome::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_extension_appends_only_when_missing() {
        assert_eq!(
            with_extension(PathBuf::from("/tmp/drawing"), "txt"),
            PathBuf::from("/tmp/drawing.txt")
        );
        assert_eq!(
            with_extension(PathBuf::from("/tmp/drawing.TXT"), "txt"),
            PathBuf::from("/tmp/drawing.TXT")
        );
        assert_eq!(
            with_extension(PathBuf::from("/tmp/drawing.png"), "svg"),
            PathBuf::from("/tmp/drawing.png.svg")
        );
    }

    #[test]
    fn test_about_names_the_package() {
        assert!(About::message().starts_with("turtle_commands "));
    }
}
