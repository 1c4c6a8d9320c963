//! Headless collaborators.
//!
//! These let the interpreter run without a window: in tests, in batch mode, and
//! behind the terminal front end. Each adapter hands out an `Rc<RefCell<_>>` handle
//! so the caller can inspect or script it after giving the adapter away.

use crate::command::{Canvas, Dialogs, DrawPrimitive, ImageHandle, ImageStore, Snapshot};
use crate::geometry::{CanvasBounds, Point};
use crate::state::{DEFAULT_HEADING, DEFAULT_PEN_COLOR, DEFAULT_PEN_WIDTH, Rgb};
use anyhow::{Context, Result};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt::Write as _;
use std::fs;
use std::io::{Result as IoResult, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Memory-backed writer for capturing the diagnostic stream.
pub struct MemWriter {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl MemWriter {
    /// Convenience: create writer and return (writer, rc_handle).
    pub fn with_handle() -> (Self, Rc<RefCell<Vec<u8>>>) {
        let buf = Rc::new(RefCell::new(Vec::new()));
        (Self { buf: buf.clone() }, buf)
    }
}

impl Write for MemWriter {
    fn write(&mut self, data: &[u8]) -> IoResult<usize> {
        self.buf.borrow_mut().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> IoResult<()> {
        Ok(())
    }
}

/// A visible line left by the pen.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub from: Point,
    pub to: Point,
    pub color: Rgb,
    pub width: u32,
}

/// Everything a [`RecordingCanvas`] has been told.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasLog {
    pub bounds: CanvasBounds,
    /// Every primitive ever drawn, including ones erased later.
    pub primitives: Vec<DrawPrimitive>,
    /// Strokes currently on the surface.
    pub strokes: Vec<Stroke>,
    pub pen: Point,
    pub heading: i32,
    pub color: Rgb,
    pub width: u32,
    pub has_background: bool,
    pub clears: usize,
    pub repaints: usize,
}

impl CanvasLog {
    /// Distances of the visible and invisible moves, in order.
    pub fn move_lengths(&self) -> Vec<f64> {
        let mut from = self.bounds.center();
        let mut lengths = Vec::new();
        for primitive in &self.primitives {
            if let DrawPrimitive::MoveTo { x, y, .. } = *primitive {
                lengths.push((x - from.x).hypot(y - from.y));
                from = Point::new(x, y);
            }
        }
        lengths
    }

    /// SVG document with the strokes currently on the surface.
    pub fn to_svg(&self) -> String {
        let CanvasBounds { width, height } = self.bounds;
        let mut svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">\n"
        );
        for stroke in &self.strokes {
            let _ = writeln!(
                svg,
                "  <line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"{}\" stroke-linecap=\"round\"/>",
                stroke.from.x, stroke.from.y, stroke.to.x, stroke.to.y, stroke.color, stroke.width
            );
        }
        svg.push_str("</svg>\n");
        svg
    }
}

/// Canvas that draws nothing on screen but remembers everything.
///
/// Its snapshot is an SVG rendering of the visible strokes.
pub struct RecordingCanvas {
    log: Rc<RefCell<CanvasLog>>,
}

impl RecordingCanvas {
    pub fn with_handle(bounds: CanvasBounds) -> (Self, Rc<RefCell<CanvasLog>>) {
        let log = Rc::new(RefCell::new(CanvasLog {
            bounds,
            primitives: Vec::new(),
            strokes: Vec::new(),
            pen: bounds.center(),
            heading: DEFAULT_HEADING,
            color: DEFAULT_PEN_COLOR,
            width: DEFAULT_PEN_WIDTH,
            has_background: false,
            clears: 0,
            repaints: 0,
        }));
        (Self { log: log.clone() }, log)
    }
}

impl Canvas for RecordingCanvas {
    fn bounds(&self) -> CanvasBounds {
        self.log.borrow().bounds
    }

    fn draw(&mut self, primitive: DrawPrimitive) {
        let mut log = self.log.borrow_mut();
        log.primitives.push(primitive);
        match primitive {
            DrawPrimitive::MoveTo {
                x,
                y,
                stroke_visible,
            } => {
                let to = Point::new(x, y);
                if stroke_visible {
                    let stroke = Stroke {
                        from: log.pen,
                        to,
                        color: log.color,
                        width: log.width,
                    };
                    log.strokes.push(stroke);
                }
                log.pen = to;
            }
            DrawPrimitive::TurnTo { heading } => log.heading = heading,
        }
    }

    fn set_color(&mut self, color: Rgb) {
        self.log.borrow_mut().color = color;
    }

    fn set_width(&mut self, width: u32) {
        self.log.borrow_mut().width = width;
    }

    fn clear_surface(&mut self) {
        let mut log = self.log.borrow_mut();
        log.strokes.clear();
        log.clears += 1;
    }

    fn set_background(&mut self, image: Option<&ImageHandle>) {
        self.log.borrow_mut().has_background = image.is_some();
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot(self.log.borrow().to_svg().into_bytes())
    }

    fn repaint(&mut self) {
        self.log.borrow_mut().repaints += 1;
    }
}

/// Prepared answers for [`ScriptedDialogs`], plus a record of what was asked.
#[derive(Debug, Default)]
pub struct DialogScript {
    pub confirmations: VecDeque<bool>,
    /// Answer used once `confirmations` runs out.
    pub confirm_by_default: bool,
    pub save_paths: VecDeque<PathBuf>,
    pub open_paths: VecDeque<PathBuf>,
    pub prompts: Vec<String>,
    pub errors: Vec<String>,
    pub messages: Vec<(String, String)>,
}

/// Dialogs that answer from a script instead of asking anyone.
///
/// Path pickers cancel when their queue is empty.
pub struct ScriptedDialogs {
    script: Rc<RefCell<DialogScript>>,
}

impl ScriptedDialogs {
    pub fn with_handle() -> (Self, Rc<RefCell<DialogScript>>) {
        let script = Rc::new(RefCell::new(DialogScript::default()));
        (
            Self {
                script: script.clone(),
            },
            script,
        )
    }
}

impl Dialogs for ScriptedDialogs {
    fn confirm(&mut self, message: &str) -> bool {
        let mut script = self.script.borrow_mut();
        script.prompts.push(message.to_string());
        let default = script.confirm_by_default;
        script.confirmations.pop_front().unwrap_or(default)
    }

    fn choose_save_path(&mut self, suggested_extension: &str) -> Option<PathBuf> {
        let mut script = self.script.borrow_mut();
        script.prompts.push(format!("save .{}", suggested_extension));
        script.save_paths.pop_front()
    }

    fn choose_open_path(&mut self, filter_extension: &str) -> Option<PathBuf> {
        let mut script = self.script.borrow_mut();
        script.prompts.push(format!("open .{}", filter_extension));
        script.open_paths.pop_front()
    }

    fn show_error(&mut self, message: &str) {
        self.script.borrow_mut().errors.push(message.to_string());
    }

    fn show_message(&mut self, title: &str, message: &str) {
        self.script
            .borrow_mut()
            .messages
            .push((title.to_string(), message.to_string()));
    }
}

/// Stores snapshots verbatim as files and reads any non-empty file back as an image.
#[derive(Debug, Default)]
pub struct FileImageStore;

impl ImageStore for FileImageStore {
    fn extension(&self) -> &str {
        "svg"
    }

    fn encode(&mut self, snapshot: &Snapshot, path: &Path) -> Result<()> {
        fs::write(path, &snapshot.0)
            .with_context(|| format!("Error saving image: {}", path.display()))
    }

    fn decode(&mut self, path: &Path) -> Result<ImageHandle> {
        let bytes = fs::read(path)
            .with_context(|| format!("Error loading image: {}", path.display()))?;
        if bytes.is_empty() {
            anyhow::bail!(
                "Failed to load image. The file may be corrupted: {}",
                path.display()
            );
        }
        Ok(ImageHandle(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env as stdenv;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        stdenv::temp_dir().join(format!("{}_{}_{}", name, std::process::id(), nanos))
    }

    #[test]
    fn test_mem_writer_shares_buffer() {
        let (mut writer, handle) = MemWriter::with_handle();
        write!(writer, "hello").unwrap();
        assert_eq!(handle.borrow().as_slice(), b"hello");
    }

    #[test]
    fn test_recording_canvas_tracks_visible_strokes() {
        let (mut canvas, log) = RecordingCanvas::with_handle(CanvasBounds::new(100, 100));
        canvas.set_color(Rgb::BLUE);
        canvas.draw(DrawPrimitive::MoveTo {
            x: 50.0,
            y: 20.0,
            stroke_visible: true,
        });
        canvas.draw(DrawPrimitive::MoveTo {
            x: 10.0,
            y: 20.0,
            stroke_visible: false,
        });

        let log = log.borrow();
        assert_eq!(log.primitives.len(), 2);
        assert_eq!(
            log.strokes,
            vec![Stroke {
                from: Point::new(50.0, 50.0),
                to: Point::new(50.0, 20.0),
                color: Rgb::BLUE,
                width: 1,
            }]
        );
        assert_eq!(log.move_lengths(), vec![30.0, 40.0]);
    }

    #[test]
    fn test_snapshot_is_svg_of_strokes() {
        let (mut canvas, _log) = RecordingCanvas::with_handle(CanvasBounds::new(40, 30));
        canvas.draw(DrawPrimitive::MoveTo {
            x: 0.0,
            y: 0.0,
            stroke_visible: true,
        });
        let svg = String::from_utf8(canvas.snapshot().0).unwrap();
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"40\" height=\"30\""));
        assert!(svg.contains(
            "<line x1=\"20.00\" y1=\"15.00\" x2=\"0.00\" y2=\"0.00\" stroke=\"#ff0000\" stroke-width=\"1\""
        ));

        canvas.clear_surface();
        let svg = String::from_utf8(canvas.snapshot().0).unwrap();
        assert!(!svg.contains("<line"));
    }

    #[test]
    fn test_scripted_dialogs_answer_in_order() {
        let (mut dialogs, script) = ScriptedDialogs::with_handle();
        script.borrow_mut().confirmations.push_back(false);
        script.borrow_mut().confirm_by_default = true;
        script
            .borrow_mut()
            .save_paths
            .push_back(PathBuf::from("/tmp/a.txt"));

        assert!(!dialogs.confirm("sure?"));
        assert!(dialogs.confirm("really?"));
        assert_eq!(
            dialogs.choose_save_path("txt"),
            Some(PathBuf::from("/tmp/a.txt"))
        );
        assert_eq!(dialogs.choose_save_path("txt"), None);
        assert_eq!(dialogs.choose_open_path("svg"), None);
        assert_eq!(script.borrow().prompts.len(), 5);
    }

    #[test]
    fn test_file_image_store_roundtrip_and_errors() -> Result<()> {
        let mut store = FileImageStore;
        let path = temp_path("image_store_test.svg");
        store.encode(&Snapshot(b"<svg/>".to_vec()), &path)?;
        assert_eq!(store.decode(&path)?, ImageHandle(b"<svg/>".to_vec()));

        fs::write(&path, b"")?;
        assert!(store.decode(&path).is_err());
        fs::remove_file(&path)?;

        assert!(store.decode(&path).is_err());
        Ok(())
    }
}
