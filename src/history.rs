use anyhow::{Context, Result};
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// Ordered, append-only log of the raw command lines of a session.
///
/// The log doubles as a replay script. On disk it is plain UTF-8 text with one
/// command per line and nothing else.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandHistory {
    entries: Vec<String>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.entries.push(line.into());
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Read a log, one command per line. `\r\n` endings are accepted.
    pub fn read_from(reader: impl BufRead) -> Result<Self> {
        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line.context("command log is not valid UTF-8 text")?;
            entries.push(line.trim_end_matches('\r').to_string());
        }
        Ok(Self { entries })
    }

    pub fn write_to(&self, writer: &mut dyn Write) -> Result<()> {
        for entry in &self.entries {
            writeln!(writer, "{}", entry)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file =
            fs::File::open(path).with_context(|| format!("can't open {}", path.display()))?;
        Self::read_from(BufReader::new(file))
            .with_context(|| format!("can't read {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut file =
            fs::File::create(path).with_context(|| format!("can't create {}", path.display()))?;
        self.write_to(&mut file)
            .with_context(|| format!("can't write {}", path.display()))
    }
}

impl<S: Into<String>> FromIterator<S> for CommandHistory {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env as stdenv;
    use std::io::Cursor;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn test_read_accepts_crlf() {
        let input = b"pendown\r\nmove 50\r\n\r\nleft 90\n".to_vec();
        let history = CommandHistory::read_from(Cursor::new(input)).unwrap();
        assert_eq!(
            history.iter().collect::<Vec<_>>(),
            vec!["pendown", "move 50", "", "left 90"]
        );
    }

    #[test]
    fn test_write_is_one_command_per_line() {
        let history: CommandHistory = ["pendown", "square 50"].into_iter().collect();
        let mut out = Vec::new();
        history.write_to(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "pendown\nsquare 50\n");
    }

    #[test]
    fn test_invalid_utf8_is_an_error() {
        let input = vec![b'm', 0xff, b'\n'];
        assert!(CommandHistory::read_from(Cursor::new(input)).is_err());
    }

    #[test]
    fn test_save_and_load_file() {
        let mut path = stdenv::temp_dir();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        path.push(format!("history_test_{}_{}.txt", std::process::id(), nanos));

        let history: CommandHistory = ["PenDown", "triangle 3, 4, 5", "reverse"]
            .into_iter()
            .collect();
        history.save(&path).unwrap();
        assert_eq!(CommandHistory::load(&path).unwrap(), history);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_load_missing_file_mentions_path() {
        let path = stdenv::temp_dir().join(format!("no_such_log_{}.txt", std::process::id()));
        let err = CommandHistory::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("no_such_log_"));
    }
}
