// image_processing.rs
use crate::app::settings::{ConversionMode, Settings};
use crate::app::svg_writer;
use crate::app::{ConversionUpdate, FileDetail, FileStatus, RunSummary, TaskKind};
use crate::error::ConvertError;
use crate::utils::{get_memory_usage, measure_time, Logger};
use image::io::Reader as ImageReader;
use parking_lot::Mutex;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Instant;

pub const RASTER_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "gif"];
pub const SVG_EXTENSION: &str = "svg";
pub const REDUCED_SUFFIX: &str = "_reduced";

/// Everything one run needs, captured when "Start" is pressed.
#[derive(Clone, Debug)]
pub struct Job {
    pub input_dir: PathBuf,
    pub convert: bool,
    pub reduce: bool,
    pub settings: Settings,
}

impl Job {
    /// Fails before any file is touched if the folder is unset, missing, or
    /// not a directory, or if neither step is enabled.
    pub fn new(
        input_dir: Option<&Path>,
        convert: bool,
        reduce: bool,
        settings: Settings,
    ) -> Result<Self, ConvertError> {
        let input_dir = input_dir.ok_or(ConvertError::NoInputFolder)?;
        if !input_dir.exists() {
            return Err(ConvertError::MissingFolder(input_dir.to_path_buf()));
        }
        if !input_dir.is_dir() {
            return Err(ConvertError::NotAFolder(input_dir.to_path_buf()));
        }
        if !convert && !reduce {
            return Err(ConvertError::NothingSelected);
        }

        Ok(Job {
            input_dir: input_dir.to_path_buf(),
            convert,
            reduce,
            settings,
        })
    }
}

/// Worker thread entry point.
pub fn process_folder(job: Job, log_messages: Arc<Mutex<Vec<String>>>, sender: Sender<ConversionUpdate>) {
    let logger = Logger::new(log_messages);

    match run_job(&job, &logger, &sender) {
        Ok(summary) => {
            let _ = sender.send(ConversionUpdate::Completed(summary));
        }
        Err(e) => {
            logger.log(format!("Run failed: {}", e));
            let _ = sender.send(ConversionUpdate::Failed(e.to_string()));
        }
    }
}

pub fn run_job(job: &Job, logger: &Logger, sender: &Sender<ConversionUpdate>) -> Result<RunSummary, ConvertError> {
    let start_time = Instant::now();
    logger.log(format!("Processing folder {}", job.input_dir.display()));
    logger.log(get_memory_usage());

    let mut summary = RunSummary::default();
    let mut next_index = 0;

    if job.convert {
        let mode = job.settings.conversion_mode;
        let output_dir = prepare_output_dir(&mode.output_dir(&job.input_dir))?;
        let images = list_files(&job.input_dir, is_raster_image)?;
        logger.log(format!("Converting {} image(s) into {}", images.len(), output_dir.display()));

        let counts = run_step(&images, TaskKind::Convert, next_index, logger, sender, |path| {
            convert_image(path, &output_dir, mode)
        });
        next_index += images.len();
        summary.converted = counts.succeeded;
        summary.failed += counts.failed;
    }

    // Listed only now so that SVGs written in place by the conversion step are included.
    if job.reduce {
        let output_dir = prepare_output_dir(&job.settings.reduction_mode.output_dir(&job.input_dir))?;
        let svgs = list_files(&job.input_dir, is_svg)?;
        logger.log(format!("Reducing {} SVG file(s) into {}", svgs.len(), output_dir.display()));

        let counts = run_step(&svgs, TaskKind::Reduce, next_index, logger, sender, |path| {
            reduce_svg(path, &output_dir)
        });
        summary.reduced = counts.succeeded;
        summary.failed += counts.failed;
    }

    summary.elapsed = start_time.elapsed();
    logger.log(format!(
        "Process completed in {:?}: {} converted, {} reduced, {} failed",
        summary.elapsed, summary.converted, summary.reduced, summary.failed
    ));
    logger.log(get_memory_usage());
    Ok(summary)
}

struct StepCounts {
    succeeded: usize,
    failed: usize,
}

fn run_step<F>(
    files: &[PathBuf],
    task: TaskKind,
    base_index: usize,
    logger: &Logger,
    sender: &Sender<ConversionUpdate>,
    op: F,
) -> StepCounts
where
    F: Fn(&Path) -> Result<PathBuf, ConvertError> + Sync,
{
    let total = files.len();
    let details = files.iter().map(|path| queued_detail(path, task)).collect();
    let _ = sender.send(ConversionUpdate::Queued(details));
    let _ = sender.send(ConversionUpdate::Progress(0, total));

    let completed = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);

    let groups = group_by_stem(files);
    for group in groups.iter().filter(|group| group.len() > 1) {
        let names: Vec<String> = group.iter().map(|&offset| files[offset].display().to_string()).collect();
        logger.log(format!(
            "Name collision: {} write the same output; processing them in order, the last one wins",
            names.join(", ")
        ));
    }

    let process = |offset: usize| {
        let path = &files[offset];
        let index = base_index + offset;
        let _ = sender.send(ConversionUpdate::StatusUpdate(index, FileStatus::Processing, None));

        let (result, duration) = measure_time(|| op(path));
        match result {
            Ok(output_path) => {
                logger.log(format!("{} -> {} took {:?}", path.display(), output_path.display(), duration));
                let output_size = fs::metadata(&output_path).map(|m| m.len()).ok();
                let _ = sender.send(ConversionUpdate::ItemProcessed(index, output_path, output_size));
                let _ = sender.send(ConversionUpdate::StatusUpdate(index, FileStatus::Done, None));
            }
            Err(e) => {
                failed.fetch_add(1, Ordering::SeqCst);
                logger.log(format!("{} failed for {}: {}", task.label(), path.display(), e));
                let _ = sender.send(ConversionUpdate::StatusUpdate(index, FileStatus::Failed, Some(e.to_string())));
            }
        }

        let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
        let _ = sender.send(ConversionUpdate::Progress(done, total));
    };

    // Files sharing a stem target the same output file, so each group runs serially.
    groups.par_iter().for_each(|group| {
        for &offset in group {
            process(offset);
        }
    });

    let failed = failed.into_inner();
    StepCounts {
        succeeded: total - failed,
        failed,
    }
}

/// Offsets into `files` grouped by file stem, each group in listing order.
fn group_by_stem(files: &[PathBuf]) -> Vec<Vec<usize>> {
    let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (offset, path) in files.iter().enumerate() {
        groups.entry(file_stem(path)).or_default().push(offset);
    }
    groups.into_values().collect()
}

fn queued_detail(path: &Path, task: TaskKind) -> FileDetail {
    FileDetail {
        name: path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
        task,
        original_size: fs::metadata(path).map(|m| m.len()).unwrap_or(0),
        output_name: None,
        output_size: None,
        status: FileStatus::Queued,
        error_message: None,
    }
}

fn prepare_output_dir(dir: &Path) -> Result<PathBuf, ConvertError> {
    fs::create_dir_all(dir).map_err(|e| ConvertError::Io(dir.to_path_buf(), e))?;
    Ok(dir.to_path_buf())
}

/// Regular files directly inside `dir` accepted by `filter`, sorted by name.
pub fn list_files(dir: &Path, filter: fn(&Path) -> bool) -> Result<Vec<PathBuf>, ConvertError> {
    let entries = fs::read_dir(dir).map_err(|e| ConvertError::Io(dir.to_path_buf(), e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConvertError::Io(dir.to_path_buf(), e))?;
        let path = entry.path();
        if path.is_file() && filter(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|candidate| ext.eq_ignore_ascii_case(candidate)))
        .unwrap_or(false)
}

pub fn is_raster_image(path: &Path) -> bool {
    has_extension(path, &RASTER_EXTENSIONS)
}

pub fn is_svg(path: &Path) -> bool {
    has_extension(path, &[SVG_EXTENSION])
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Wraps one raster and, in replace mode, removes it once the SVG is on disk.
pub fn convert_image(image_path: &Path, output_dir: &Path, mode: ConversionMode) -> Result<PathBuf, ConvertError> {
    let svg_path = wrap_image(image_path, output_dir)?;
    if mode.deletes_source() {
        fs::remove_file(image_path).map_err(|e| ConvertError::Io(image_path.to_path_buf(), e))?;
    }
    Ok(svg_path)
}

/// Writes `<stem>.svg` into `output_dir`, sized like the image and
/// referencing it by path.
pub fn wrap_image(image_path: &Path, output_dir: &Path) -> Result<PathBuf, ConvertError> {
    let (width, height) = read_dimensions(image_path)?;
    let document = svg_writer::image_wrapper_document(&image_path.to_string_lossy(), width, height)?;

    let svg_path = output_dir.join(format!("{}.{}", file_stem(image_path), SVG_EXTENSION));
    fs::write(&svg_path, document).map_err(|e| ConvertError::Io(svg_path.clone(), e))?;
    Ok(svg_path)
}

fn read_dimensions(path: &Path) -> Result<(u32, u32), ConvertError> {
    ImageReader::open(path)
        .map_err(|e| ConvertError::Io(path.to_path_buf(), e))?
        .with_guessed_format()
        .map_err(|e| ConvertError::Io(path.to_path_buf(), e))?
        .into_dimensions()
        .map_err(|e| ConvertError::Image(path.to_path_buf(), e))
}

/// Copies the SVG byte for byte to `<stem>_reduced.svg` in `output_dir`.
pub fn reduce_svg(svg_path: &Path, output_dir: &Path) -> Result<PathBuf, ConvertError> {
    let content = fs::read(svg_path).map_err(|e| ConvertError::Io(svg_path.to_path_buf(), e))?;

    let reduced_path = output_dir.join(format!("{}{}.{}", file_stem(svg_path), REDUCED_SUFFIX, SVG_EXTENSION));
    fs::write(&reduced_path, content).map_err(|e| ConvertError::Io(reduced_path.clone(), e))?;
    Ok(reduced_path)
}
