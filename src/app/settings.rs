// settings.rs
use crate::error::ConvertError;
use std::path::{Path, PathBuf};

pub const CONVERT_FOLDER: &str = "ConvertedToSvg";
pub const REDUCE_FOLDER: &str = "ReducedSvg";

/// Where wrapped SVGs go, and whether the source raster survives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConversionMode {
    Replace,
    KeepBoth,
    Subfolder,
}

impl ConversionMode {
    pub const ALL: [ConversionMode; 3] = [
        ConversionMode::Replace,
        ConversionMode::KeepBoth,
        ConversionMode::Subfolder,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ConversionMode::Replace => "Replace Images with SVG",
            ConversionMode::KeepBoth => "Keep Both Images and SVGs",
            ConversionMode::Subfolder => "Save SVGs in 'ConvertedToSvg' Folder",
        }
    }

    pub fn output_dir(&self, input_dir: &Path) -> PathBuf {
        match self {
            ConversionMode::Subfolder => input_dir.join(CONVERT_FOLDER),
            ConversionMode::Replace | ConversionMode::KeepBoth => input_dir.to_path_buf(),
        }
    }

    pub fn deletes_source(&self) -> bool {
        matches!(self, ConversionMode::Replace)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReductionMode {
    Subfolder,
    KeepOriginal,
}

impl ReductionMode {
    pub const ALL: [ReductionMode; 2] = [ReductionMode::Subfolder, ReductionMode::KeepOriginal];

    pub fn label(&self) -> &'static str {
        match self {
            ReductionMode::Subfolder => "Save Reduced SVGs in 'ReducedSvg' Folder",
            ReductionMode::KeepOriginal => "Keep Original SVGs",
        }
    }

    pub fn output_dir(&self, input_dir: &Path) -> PathBuf {
        match self {
            ReductionMode::Subfolder => input_dir.join(REDUCE_FOLDER),
            ReductionMode::KeepOriginal => input_dir.to_path_buf(),
        }
    }
}

/// Snapshot of the Settings tab. Replaced wholesale on save, never patched.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Settings {
    pub conversion_mode: ConversionMode,
    pub reduction_mode: ReductionMode,
    /// Stored for display only; no operation reads it.
    pub reduction_scale: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            conversion_mode: ConversionMode::KeepBoth,
            reduction_mode: ReductionMode::Subfolder,
            reduction_scale: 1.0,
        }
    }
}

impl Settings {
    /// Returns a copy with the given modes and the scale parsed from `scale_text`.
    /// On a parse failure `self` is untouched and the caller keeps it.
    pub fn with_changes(
        &self,
        conversion_mode: ConversionMode,
        reduction_mode: ReductionMode,
        scale_text: &str,
    ) -> Result<Settings, ConvertError> {
        let reduction_scale = parse_scale(scale_text)?;
        Ok(Settings {
            conversion_mode,
            reduction_mode,
            reduction_scale,
        })
    }
}

pub fn parse_scale(text: &str) -> Result<f32, ConvertError> {
    let trimmed = text.trim();
    match trimmed.parse::<f32>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ConvertError::InvalidScale(trimmed.to_string())),
    }
}
