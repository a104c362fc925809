// app.rs
pub mod gui;
pub mod image_processing;
pub mod file_dialogs;
pub mod settings;
pub mod svg_writer;

use eframe::egui;
use eframe::App as EframeApp;
use std::path::PathBuf;
use std::sync::Arc;
use parking_lot::Mutex;
use std::time::{Duration, Instant};
use std::sync::mpsc::{Receiver, TryRecvError};

use crate::error::ConvertError;
use crate::utils::timestamped;
use settings::{ConversionMode, ReductionMode, Settings};

pub struct App {
    pub input_dir: Option<PathBuf>,
    pub convert_enabled: bool,
    pub reduce_enabled: bool,
    pub settings: Settings,
    // Settings tab drafts, applied to `settings` only by "Save Settings".
    pub draft_conversion_mode: ConversionMode,
    pub draft_reduction_mode: ReductionMode,
    pub scale_text: String,
    pub active_tab: Tab,
    pub conversion_progress: ConversionProgress,
    pub log_messages: Arc<Mutex<Vec<String>>>,
    pub file_details: Vec<FileDetail>,
    pub currently_processing: Option<usize>,
    pub conversion_start_time: Option<Instant>,
    pub last_summary: Option<RunSummary>,
    pub conversion_receiver: Option<Receiver<ConversionUpdate>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tab {
    Main,
    Settings,
}

#[derive(Clone, Debug)]
pub enum ConversionUpdate {
    Queued(Vec<FileDetail>),
    Progress(usize, usize),  // (completed, total) for the running step
    StatusUpdate(usize, FileStatus, Option<String>),  // (index, status, error_message)
    ItemProcessed(usize, PathBuf, Option<u64>),  // (index, output_path, output_size)
    Completed(RunSummary),
    Failed(String),
}

#[derive(Default)]
pub struct ConversionProgress {
    pub total: usize,
    pub completed: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskKind {
    Convert,
    Reduce,
}

impl TaskKind {
    pub fn label(&self) -> &'static str {
        match self {
            TaskKind::Convert => "Convert",
            TaskKind::Reduce => "Reduce",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileStatus {
    Queued,
    Processing,
    Done,
    Failed,
}

impl FileStatus {
    pub fn label(&self) -> &'static str {
        match self {
            FileStatus::Queued => "Queued",
            FileStatus::Processing => "Processing...",
            FileStatus::Done => "Done",
            FileStatus::Failed => "Failed",
        }
    }
}

#[derive(Clone, Debug)]
pub struct FileDetail {
    pub name: String,
    pub task: TaskKind,
    pub original_size: u64,
    pub output_name: Option<String>,
    pub output_size: Option<u64>,
    pub status: FileStatus,
    pub error_message: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunSummary {
    pub converted: usize,
    pub reduced: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

impl Default for App {
    fn default() -> Self {
        let settings = Settings::default();
        Self {
            input_dir: None,
            convert_enabled: false,
            reduce_enabled: false,
            settings,
            draft_conversion_mode: settings.conversion_mode,
            draft_reduction_mode: settings.reduction_mode,
            scale_text: settings.reduction_scale.to_string(),
            active_tab: Tab::Main,
            conversion_progress: ConversionProgress::default(),
            log_messages: Arc::new(Mutex::new(Vec::new())),
            file_details: Vec::new(),
            currently_processing: None,
            conversion_start_time: None,
            last_summary: None,
            conversion_receiver: None,
        }
    }
}

impl App {
    pub fn log(&self, message: &str) {
        self.log_messages.lock().push(timestamped(message));
    }

    pub fn is_running(&self) -> bool {
        self.conversion_receiver.is_some()
    }

    /// Folds one worker message into the GUI state. Returns the run outcome
    /// once the worker is finished.
    pub fn apply_update(&mut self, update: ConversionUpdate) -> Option<Result<RunSummary, String>> {
        match update {
            ConversionUpdate::Queued(details) => {
                self.file_details.extend(details);
            }
            ConversionUpdate::Progress(completed, total) => {
                self.conversion_progress.completed = completed;
                self.conversion_progress.total = total;
            }
            ConversionUpdate::StatusUpdate(index, status, error_message) => {
                if status == FileStatus::Processing {
                    self.currently_processing = Some(index);
                } else if self.currently_processing == Some(index) {
                    self.currently_processing = None;
                }
                if let Some(detail) = self.file_details.get_mut(index) {
                    detail.status = status;
                    detail.error_message = error_message;
                }
            }
            ConversionUpdate::ItemProcessed(index, output_path, output_size) => {
                if let Some(detail) = self.file_details.get_mut(index) {
                    detail.output_name = output_path
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned());
                    detail.output_size = output_size;
                }
            }
            ConversionUpdate::Completed(summary) => {
                self.currently_processing = None;
                self.last_summary = Some(summary.clone());
                return Some(Ok(summary));
            }
            ConversionUpdate::Failed(message) => {
                self.currently_processing = None;
                return Some(Err(message));
            }
        }
        None
    }

    /// Applies every pending worker message. Returns the run outcome once the
    /// worker reports completion or its channel closes without doing so.
    pub fn drain_updates(&mut self) -> Option<Result<RunSummary, String>> {
        let receiver = self.conversion_receiver.take()?;
        loop {
            match receiver.try_recv() {
                Ok(update) => {
                    if let Some(result) = self.apply_update(update) {
                        return Some(result);
                    }
                }
                Err(TryRecvError::Empty) => {
                    self.conversion_receiver = Some(receiver);
                    return None;
                }
                Err(TryRecvError::Disconnected) => {
                    self.currently_processing = None;
                    self.log("Processing stopped unexpectedly.");
                    return Some(Err("Processing stopped unexpectedly".to_string()));
                }
            }
        }
    }

    /// Replaces `settings` with the Settings tab drafts. A bad scale keeps
    /// the previous settings in full.
    pub fn save_settings(&mut self) -> Result<Settings, ConvertError> {
        let settings = self.settings.with_changes(
            self.draft_conversion_mode,
            self.draft_reduction_mode,
            &self.scale_text,
        )?;
        self.settings = settings;
        Ok(settings)
    }
}

impl EframeApp for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let needs_redraw = self.conversion_receiver.is_some();
        let outcome = self.drain_updates();

        // Render the GUI
        gui::render(self, ctx);

        match outcome {
            Some(Ok(summary)) => {
                file_dialogs::show_info(
                    "Process Complete",
                    &format!(
                        "The selected processes have been completed.\n\nConverted: {}\nReduced: {}\nFailed: {}",
                        summary.converted, summary.reduced, summary.failed
                    ),
                );
            }
            Some(Err(message)) => {
                file_dialogs::show_error("Error", &message);
            }
            None => {}
        }

        if needs_redraw || self.is_running() {
            ctx.request_repaint();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(name: &str) -> FileDetail {
        FileDetail {
            name: name.to_string(),
            task: TaskKind::Convert,
            original_size: 10,
            output_name: None,
            output_size: None,
            status: FileStatus::Queued,
            error_message: None,
        }
    }

    #[test]
    fn test_default_settings_mirror_drafts() {
        let app = App::default();
        assert_eq!(app.draft_conversion_mode, app.settings.conversion_mode);
        assert_eq!(app.draft_reduction_mode, app.settings.reduction_mode);
        assert_eq!(app.scale_text, "1");
        assert!(!app.is_running());
    }

    #[test]
    fn test_apply_update_tracks_rows() {
        let mut app = App::default();
        assert!(app.apply_update(ConversionUpdate::Queued(vec![detail("a.png"), detail("b.png")])).is_none());

        app.apply_update(ConversionUpdate::StatusUpdate(1, FileStatus::Processing, None));
        assert_eq!(app.currently_processing, Some(1));

        app.apply_update(ConversionUpdate::ItemProcessed(1, PathBuf::from("/x/b.svg"), Some(300)));
        app.apply_update(ConversionUpdate::StatusUpdate(1, FileStatus::Done, None));
        assert_eq!(app.currently_processing, None);
        assert_eq!(app.file_details[1].output_name.as_deref(), Some("b.svg"));
        assert_eq!(app.file_details[1].output_size, Some(300));
        assert_eq!(app.file_details[1].status, FileStatus::Done);

        app.apply_update(ConversionUpdate::StatusUpdate(0, FileStatus::Failed, Some("bad".to_string())));
        assert_eq!(app.file_details[0].error_message.as_deref(), Some("bad"));

        // Out-of-range indices are ignored.
        app.apply_update(ConversionUpdate::StatusUpdate(9, FileStatus::Done, None));
        assert_eq!(app.file_details.len(), 2);
    }

    #[test]
    fn test_drain_updates_finishes_on_completion() {
        let mut app = App::default();
        let (sender, receiver) = std::sync::mpsc::channel();
        app.conversion_receiver = Some(receiver);

        sender.send(ConversionUpdate::Queued(vec![detail("a.svg")])).unwrap();
        assert!(app.drain_updates().is_none());
        assert!(app.is_running());
        assert_eq!(app.file_details.len(), 1);

        sender.send(ConversionUpdate::Completed(RunSummary::default())).unwrap();
        assert_eq!(app.drain_updates(), Some(Ok(RunSummary::default())));
        assert!(!app.is_running());
    }

    #[test]
    fn test_drain_updates_stops_when_worker_vanishes() {
        let mut app = App::default();
        let (sender, receiver) = std::sync::mpsc::channel();
        app.conversion_receiver = Some(receiver);

        sender.send(ConversionUpdate::StatusUpdate(0, FileStatus::Processing, None)).unwrap();
        drop(sender);

        let outcome = app.drain_updates();
        assert!(matches!(outcome, Some(Err(_))));
        assert!(!app.is_running());
        assert_eq!(app.currently_processing, None);
        assert!(app.drain_updates().is_none());
    }

    #[test]
    fn test_save_settings_rejects_bad_scale() {
        let mut app = App::default();
        let before = app.settings;
        app.draft_conversion_mode = ConversionMode::Replace;
        app.draft_reduction_mode = ReductionMode::KeepOriginal;
        app.scale_text = "big".to_string();

        assert!(matches!(app.save_settings(), Err(ConvertError::InvalidScale(_))));
        assert_eq!(app.settings, before);
    }

    #[test]
    fn test_save_settings_applies_drafts() {
        let mut app = App::default();
        app.draft_conversion_mode = ConversionMode::Subfolder;
        app.draft_reduction_mode = ReductionMode::KeepOriginal;
        app.scale_text = " 0.25 ".to_string();

        let saved = app.save_settings().unwrap();

        assert_eq!(saved, app.settings);
        assert_eq!(app.settings.conversion_mode, ConversionMode::Subfolder);
        assert_eq!(app.settings.reduction_mode, ReductionMode::KeepOriginal);
        assert_eq!(app.settings.reduction_scale, 0.25);
    }

    #[test]
    fn test_apply_update_completion() {
        let mut app = App::default();
        let summary = RunSummary { converted: 2, reduced: 1, failed: 0, elapsed: Duration::from_millis(5) };

        let outcome = app.apply_update(ConversionUpdate::Completed(summary.clone()));
        assert_eq!(outcome, Some(Ok(summary.clone())));
        assert_eq!(app.last_summary, Some(summary));

        let outcome = app.apply_update(ConversionUpdate::Failed("gone".to_string()));
        assert_eq!(outcome, Some(Err("gone".to_string())));
    }
}
