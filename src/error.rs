// error.rs
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Please select an input folder.")]
    NoInputFolder,

    #[error("Input folder `{0}` does not exist")]
    MissingFolder(PathBuf),

    #[error("`{0}` is not a folder")]
    NotAFolder(PathBuf),

    #[error("Please enable at least one process (convert or reduce).")]
    NothingSelected,

    #[error("IO error on `{0}`: {1}")]
    Io(PathBuf, std::io::Error),

    #[error("Failed to read image `{0}`: {1}")]
    Image(PathBuf, image::ImageError),

    #[error("Failed to write SVG document: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Invalid scale value `{0}`. Please enter a number.")]
    InvalidScale(String),
}
