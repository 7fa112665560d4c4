//! Capture shell
//!
//! Owns one capture-annotate-export round: the captured raster, the
//! editor session driving it and the export sink. Input forwards to the
//! session; session lifecycle signals map to shell events the embedding
//! host can act on.

use std::path::PathBuf;

use image::RgbaImage;
use log::{error, info};
use snipmark_core::{EditorSession, Key, Modifiers, Point, Rect, SessionConfig, SessionEvent};
use snipmark_render::flatten;

use crate::export::{export_image, ExportError, ExportSink};

/// Signal surfaced to the embedding host.
#[derive(Debug, PartialEq)]
pub enum ShellEvent {
    /// The user locked in a region.
    SelectionConfirmed(Rect),

    /// The session was cancelled; nothing was exported.
    SelectionCancelled,

    /// Export finished. The path is `None` for the clipboard sink.
    ExportCompleted(Option<PathBuf>),

    /// Export failed; the session stays open so the user can retry.
    ExportFailed(String),
}

/// One interactive capture round.
pub struct CaptureShell {
    raster: RgbaImage,
    session: EditorSession,
    sink: ExportSink,
}

impl CaptureShell {
    /// Build a shell around an already-captured raster.
    pub fn new(raster: RgbaImage, config: SessionConfig, sink: ExportSink) -> Self {
        let (width, height) = raster.dimensions();
        Self {
            raster,
            session: EditorSession::new(width, height, config),
            sink,
        }
    }

    /// The session driving this round.
    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    /// Mutable session access for direct state inspection or tool changes.
    pub fn session_mut(&mut self) -> &mut EditorSession {
        &mut self.session
    }

    /// The captured raster.
    pub fn raster(&self) -> &RgbaImage {
        &self.raster
    }

    /// Forward a pointer press.
    pub fn pointer_down(&mut self, point: Point) {
        self.session.pointer_down(point);
    }

    /// Forward a pointer move.
    pub fn pointer_move(&mut self, point: Point) {
        self.session.pointer_move(point);
    }

    /// Forward a pointer release.
    pub fn pointer_up(&mut self, point: Point) -> Option<ShellEvent> {
        let event = self.session.pointer_up(point);
        event.map(|event| self.dispatch(event))
    }

    /// Forward a key press.
    pub fn key_down(&mut self, key: Key, modifiers: Modifiers) -> Option<ShellEvent> {
        let event = self.session.key_down(key, modifiers);
        event.map(|event| self.dispatch(event))
    }

    /// Forward a focus loss.
    pub fn focus_lost(&mut self) {
        self.session.focus_lost();
    }

    fn dispatch(&mut self, event: SessionEvent) -> ShellEvent {
        match event {
            SessionEvent::SelectionConfirmed(rect) => {
                info!(
                    "selection confirmed at ({}, {}) {}x{}",
                    rect.x, rect.y, rect.width, rect.height
                );
                ShellEvent::SelectionConfirmed(rect)
            }
            SessionEvent::SelectionCancelled => {
                info!("session cancelled");
                ShellEvent::SelectionCancelled
            }
            SessionEvent::ExportRequested => self.export(),
        }
    }

    /// Flatten the confirmed region and push it to the sink.
    ///
    /// A failed crop fails the export. The session is left untouched
    /// either way, so the host can retry.
    pub fn export(&mut self) -> ShellEvent {
        let Some(region) = self.session.region() else {
            return ShellEvent::ExportFailed(String::from("no confirmed region to export"));
        };

        let output = match flatten(
            &self.raster,
            &region,
            self.session.annotations(),
            self.session.preview(),
        ) {
            Ok(output) => output,
            Err(e) => {
                let err = ExportError::CropFailed(e.to_string());
                error!("{err}");
                return ShellEvent::ExportFailed(err.to_string());
            }
        };

        match export_image(&output, &self.sink) {
            Ok(()) => {
                let path = match &self.sink {
                    ExportSink::File { path, .. } => Some(path.clone()),
                    ExportSink::Clipboard => None,
                };
                ShellEvent::ExportCompleted(path)
            }
            Err(err) => {
                error!("export failed: {err}");
                ShellEvent::ExportFailed(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::OutputFormat;
    use image::Rgba;
    use snipmark_core::Tool;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn file_sink(path: PathBuf) -> ExportSink {
        ExportSink::File {
            path,
            format: OutputFormat::Png,
        }
    }

    fn shell_with_sink(sink: ExportSink) -> CaptureShell {
        let raster = RgbaImage::from_pixel(800, 600, WHITE);
        CaptureShell::new(raster, SessionConfig::default(), sink)
    }

    fn select_region(shell: &mut CaptureShell) {
        shell.pointer_down(Point::new(50.0, 50.0));
        shell.pointer_move(Point::new(150.0, 100.0));
        let event = shell.pointer_up(Point::new(250.0, 150.0));
        assert_eq!(
            event,
            Some(ShellEvent::SelectionConfirmed(Rect::new(
                50.0, 50.0, 200.0, 100.0
            )))
        );
    }

    #[test]
    fn test_enter_exports_to_file_sink() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("capture.png");
        let mut shell = shell_with_sink(file_sink(path.clone()));

        select_region(&mut shell);
        shell.session_mut().set_tool(Tool::Rectangle);
        shell.pointer_down(Point::new(60.0, 60.0));
        shell.pointer_move(Point::new(150.0, 130.0));
        assert!(shell.pointer_up(Point::new(150.0, 130.0)).is_none());

        let event = shell.key_down(Key::Enter, Modifiers::NONE);
        assert_eq!(event, Some(ShellEvent::ExportCompleted(Some(path.clone()))));

        let saved = image::open(&path).unwrap().to_rgba8();
        assert_eq!(saved.dimensions(), (200, 100));
        assert_ne!(*saved.get_pixel(10, 10), WHITE);
        assert_eq!(*saved.get_pixel(55, 45), WHITE);
    }

    #[test]
    fn test_export_at_the_capture_edge_succeeds() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("edge.png");
        let mut shell = shell_with_sink(file_sink(path.clone()));

        shell.pointer_down(Point::new(600.0, 400.0));
        shell.pointer_move(Point::new(800.0, 600.0));
        let event = shell.pointer_up(Point::new(800.0, 600.0));
        assert_eq!(
            event,
            Some(ShellEvent::SelectionConfirmed(Rect::new(
                600.0, 400.0, 200.0, 200.0
            )))
        );

        let event = shell.key_down(Key::Enter, Modifiers::NONE);
        assert_eq!(event, Some(ShellEvent::ExportCompleted(Some(path.clone()))));

        let saved = image::open(&path).unwrap().to_rgba8();
        assert_eq!(saved.dimensions(), (200, 200));
    }

    #[test]
    fn test_escape_cancels_without_exporting() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("capture.png");
        let mut shell = shell_with_sink(file_sink(path.clone()));

        select_region(&mut shell);
        let event = shell.key_down(Key::Escape, Modifiers::NONE);

        assert_eq!(event, Some(ShellEvent::SelectionCancelled));
        assert!(!path.exists());
    }

    #[test]
    fn test_export_without_region_fails() {
        let temp = tempfile::tempdir().unwrap();
        let mut shell = shell_with_sink(file_sink(temp.path().join("capture.png")));

        match shell.export() {
            ShellEvent::ExportFailed(message) => {
                assert!(message.contains("no confirmed region"));
            }
            other => panic!("expected export failure, got {:?}", other),
        }
    }

    #[test]
    fn test_export_leaves_session_open_for_retry() {
        let temp = tempfile::tempdir().unwrap();
        let mut shell = shell_with_sink(file_sink(temp.path().join("capture.png")));

        select_region(&mut shell);
        shell.export();

        assert!(shell.session().region().is_some());
        assert!(!shell.session().is_cancelled());
    }
}
