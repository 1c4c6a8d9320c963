mod terminal;

use anyhow::{Context, Result};
use argh::FromArgs;
use std::fs;
use std::path::PathBuf;
use terminal::TerminalDialogs;
use turtle_commands::command::Dialogs;
use turtle_commands::geometry::CanvasBounds;
use turtle_commands::io_adapters::{FileImageStore, RecordingCanvas, ScriptedDialogs};
use turtle_commands::{CommandHistory, Interpreter};

#[derive(FromArgs)]
/// Draw with a turtle by typing commands.
struct Args {
    /// canvas width in pixels
    #[argh(option, default = "800")]
    width: u32,

    /// canvas height in pixels
    #[argh(option, default = "600")]
    height: u32,

    /// command log to replay before anything else
    #[argh(option)]
    script: Option<PathBuf>,

    /// exit after the script instead of reading commands from the terminal
    #[argh(switch)]
    batch: bool,

    /// write the final drawing to this SVG file on exit
    #[argh(option)]
    svg: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Args = argh::from_env();
    if args.width == 0 || args.height == 0 {
        anyhow::bail!("canvas size must be positive, got {}x{}", args.width, args.height);
    }

    let (canvas, drawing) = RecordingCanvas::with_handle(CanvasBounds::new(args.width, args.height));
    let dialogs: Box<dyn Dialogs> = if args.batch {
        Box::new(ScriptedDialogs::with_handle().0)
    } else {
        Box::new(TerminalDialogs::new().context("Failed to open the terminal")?)
    };
    let mut turtle = Interpreter::new(
        Box::new(canvas),
        dialogs,
        Box::new(FileImageStore),
        Box::new(std::io::stdout()),
    );

    if let Some(script) = &args.script {
        let log = CommandHistory::load(script)?;
        let report = turtle.replay(&log);
        tracing::info!(
            script = %script.display(),
            failed = report.failures.len(),
            "start-up script done"
        );
    }

    if !args.batch {
        turtle.repl().context("Terminal error")?;
    }

    if let Some(path) = &args.svg {
        fs::write(path, drawing.borrow().to_svg())
            .with_context(|| format!("Error writing drawing: {}", path.display()))?;
    }
    Ok(())
}
