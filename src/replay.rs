//! Replaying a command log from a clean state.

use crate::command::Mode;
use crate::error::CommandError;
use crate::history::CommandHistory;
use crate::interpreter::Interpreter;

/// What happened while a log was replayed.
#[derive(Debug, Default, PartialEq)]
pub struct ReplayReport {
    /// Non-blank lines that were dispatched, failures included.
    pub executed: usize,
    /// 1-based line number and error of every line that failed visibly.
    pub failures: Vec<(usize, CommandError)>,
}

impl Interpreter {
    /// Start over and run every line of `log` in order.
    ///
    /// The turtle and the surface are reset first. Failing lines are reported and
    /// skipped. Afterwards the history holds exactly the non-blank lines of `log`.
    pub fn replay(&mut self, log: &CommandHistory) -> ReplayReport {
        {
            let mut ctx = self.context(Mode::Replay);
            ctx.canvas.clear_surface();
            ctx.set_background(None);
            ctx.restore_defaults();
        }

        let mut report = ReplayReport::default();
        let mut kept = CommandHistory::new();
        for (index, line) in log.iter().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            report.executed += 1;
            kept.push(line);
            match self.dispatch(line, Mode::Replay) {
                Ok(_) => {}
                Err(err) if err.is_surfaced() => report.failures.push((index + 1, err)),
                Err(_) => {}
            }
        }
        *self.history_mut() = kept;

        tracing::info!(
            executed = report.executed,
            failed = report.failures.len(),
            "command log replayed"
        );
        self.context(Mode::Replay).say(format!(
            "Replayed {} commands, {} failed",
            report.executed,
            report.failures.len()
        ));
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Outcome;
    use crate::interpreter::tests::harness;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(name: &str, extension: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!(
            "{}_{}_{}.{}",
            name,
            std::process::id(),
            nanos,
            extension
        ))
    }

    const DRAWING: &[&str] = &[
        "pendown",
        "green",
        "penwidth 3",
        "square 40",
        "right 30",
        "move 25",
        "triangle 30,40,50",
        "left 75",
        "square_spiral 4 5",
        "reverse 20",
        "pencolour 10,20,30",
    ];

    #[test]
    fn test_replay_reproduces_the_session() {
        let mut original = harness();
        original.run_all(DRAWING);

        let mut copy = harness();
        copy.turtle.process_command("right 123").unwrap();
        copy.turtle.process_command("move 12").unwrap();
        let report = copy.turtle.replay(original.turtle.history());

        assert_eq!(report.executed, DRAWING.len());
        assert!(report.failures.is_empty());
        assert_eq!(copy.turtle.state(), original.turtle.state());
        assert_eq!(copy.turtle.history(), original.turtle.history());
        assert_eq!(
            copy.canvas.borrow().strokes,
            original.canvas.borrow().strokes
        );
    }

    #[test]
    fn test_replay_continues_past_failures() {
        let mut h = harness();
        let log: CommandHistory = ["move 10", "", "jump", "move -3", "triangle 1,1,9", "left 90"]
            .into_iter()
            .collect();
        let report = h.turtle.replay(&log);

        assert_eq!(report.executed, 5);
        let lines: Vec<usize> = report.failures.iter().map(|(line, _)| *line).collect();
        assert_eq!(lines, vec![3, 4]);
        assert_eq!(h.turtle.state().heading, 0);
        assert!(h.dialogs.borrow().errors.is_empty());
        assert!(h.output().contains("Unknown command: jump"));
        assert_eq!(
            h.turtle.history().iter().collect::<Vec<_>>(),
            vec!["move 10", "jump", "move -3", "triangle 1,1,9", "left 90"]
        );
    }

    #[test]
    fn test_replay_never_opens_dialogs() {
        let mut h = harness();
        h.run_all(&["pendown", "move 10"]);
        let log: CommandHistory = ["pendown", "move 20", "clear", "save", "load", "about"]
            .into_iter()
            .collect();
        let report = h.turtle.replay(&log);

        assert!(report.failures.is_empty());
        let dialogs = h.dialogs.borrow();
        assert!(dialogs.prompts.is_empty());
        assert!(dialogs.messages.is_empty());
        assert!(h.canvas.borrow().strokes.is_empty());
        assert!(h.output().contains("save: skipped while replaying"));
    }

    #[test]
    fn test_savecommands_then_loadcommands() {
        let path = temp_path("turtle_log", "txt");
        let mut first = harness();
        first.run_all(DRAWING);
        first.dialogs.borrow_mut().save_paths.push_back(path.clone());
        assert_eq!(
            first.turtle.process_command("savecommands"),
            Ok(Outcome::Applied)
        );
        assert!(first.output().contains("Commands saved to"));

        let mut second = harness();
        second.dialogs.borrow_mut().open_paths.push_back(path.clone());
        assert!(matches!(
            second.turtle.process_command("loadcommands"),
            Ok(Outcome::Replay(_))
        ));
        assert_eq!(second.turtle.state(), first.turtle.state());
        assert_eq!(second.turtle.history(), first.turtle.history());
        assert_eq!(second.turtle.workspace().last_commands, Some(path.clone()));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_loadcommands_reports_missing_file() {
        let mut h = harness();
        let path = temp_path("turtle_missing", "txt");
        h.dialogs.borrow_mut().open_paths.push_back(path);
        let err = h.turtle.process_command("loadcommands").unwrap_err();
        assert!(matches!(err, CommandError::Persistence(_)));
        assert_eq!(h.dialogs.borrow().errors.len(), 1);
    }

    #[test]
    fn test_save_then_load_image() {
        let stem = temp_path("turtle_image", "tmp");
        let saved = stem.with_extension("tmp.svg");
        let mut h = harness();
        h.run_all(&["pendown", "move 30", "right", "move 30"]);
        assert!(h.turtle.state().dirty);

        h.dialogs.borrow_mut().save_paths.push_back(stem);
        assert_eq!(h.turtle.process_command("save"), Ok(Outcome::Applied));
        assert!(!h.turtle.state().dirty);
        assert_eq!(h.turtle.workspace().last_image, Some(saved.clone()));
        let svg = std::fs::read_to_string(&saved).unwrap();
        assert!(svg.starts_with("<svg"));

        // The last image is reused without asking.
        h.turtle.process_command("load").unwrap();
        assert!(h.turtle.workspace().background.is_some());
        assert!(h.turtle.history().is_empty());
        assert_eq!(h.turtle.state().heading, 90);
        assert!(h.canvas.borrow().has_background);
        assert_eq!(h.dialogs.borrow().prompts, vec!["save .svg".to_string()]);

        // Loading lifts the pen; lowering it again drops the image.
        h.run_all(&["pencolour 0 0 0", "move 10"]);
        assert!(h.canvas.borrow().strokes.is_empty());
        h.run_all(&["pendown", "move 10"]);
        assert!(!h.canvas.borrow().has_background);
        assert_eq!(h.canvas.borrow().strokes.len(), 1);

        std::fs::remove_file(&saved).unwrap();
    }
}
