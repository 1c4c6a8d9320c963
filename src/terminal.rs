use rustyline::DefaultEditor;
use std::path::PathBuf;
use turtle_commands::command::Dialogs;

/// Dialogs answered on the terminal through a line editor.
///
/// An empty answer, Ctrl-C and Ctrl-D all cancel.
pub struct TerminalDialogs {
    editor: DefaultEditor,
}

impl TerminalDialogs {
    pub fn new() -> rustyline::Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }

    fn ask(&mut self, prompt: &str) -> Option<String> {
        match self.editor.readline(prompt) {
            Ok(answer) => {
                let answer = answer.trim();
                (!answer.is_empty()).then(|| answer.to_string())
            }
            Err(err) => {
                tracing::debug!(error = %err, "dialog dismissed");
                None
            }
        }
    }
}

impl Dialogs for TerminalDialogs {
    fn confirm(&mut self, message: &str) -> bool {
        self.ask(&format!("{} [y/N] ", message))
            .is_some_and(|answer| matches!(answer.to_lowercase().as_str(), "y" | "yes"))
    }

    fn choose_save_path(&mut self, suggested_extension: &str) -> Option<PathBuf> {
        self.ask(&format!("Save as (.{}): ", suggested_extension))
            .map(PathBuf::from)
    }

    fn choose_open_path(&mut self, filter_extension: &str) -> Option<PathBuf> {
        self.ask(&format!("Open (.{}): ", filter_extension))
            .map(PathBuf::from)
    }

    fn show_error(&mut self, message: &str) {
        eprintln!("Error: {}", message);
    }

    fn show_message(&mut self, title: &str, message: &str) {
        println!("[{}] {}", title, message);
    }
}
