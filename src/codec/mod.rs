//! Raster I/O adapter.
//!
//! OpenEXR files go through the `exr` crate so arbitrary named channels and
//! the original header survive a round trip. Everything else goes through
//! the `image` crate as 8-bit rasters.

pub mod openexr;
pub mod standard;

use crate::error::CodecError;
use crate::Raster;
use image::ImageFormat;
use openexr::ExrHeader;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Container family, detected from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// OpenEXR, float channels with a reusable header
    OpenExr,
    /// Any 8-bit container the `image` crate can both read and write
    Standard(ImageFormat),
}

impl ContainerKind {
    /// Detects the container from the extension of `path`, case-insensitively.
    ///
    /// # Errors
    ///
    /// * `CodecError::UnsupportedFormat` - missing or unknown extension, or a
    ///   format this build cannot both decode and encode
    pub fn from_path(path: &Path) -> Result<Self, CodecError> {
        let extension = path
            .extension()
            .and_then(|extension| extension.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| {
                CodecError::UnsupportedFormat(format!("{} has no extension", path.display()))
            })?;

        if extension == "exr" {
            return Ok(Self::OpenExr);
        }

        match ImageFormat::from_extension(&extension) {
            Some(format) if format.reading_enabled() && format.writing_enabled() => {
                Ok(Self::Standard(format))
            }
            _ => Err(CodecError::UnsupportedFormat(extension)),
        }
    }
}

/// A decoded raster together with what is needed to write it back the same way
#[derive(Debug, Clone, PartialEq)]
pub struct SourceImage {
    pub raster: Raster,
    /// Header of the source EXR file; `None` for standard containers
    pub exr_header: Option<ExrHeader>,
}

/// Reads the raster stored at `path`.
///
/// # Errors
///
/// * `CodecError::UnsupportedFormat` - unknown container
/// * `CodecError::Io`, `CodecError::Image`, `CodecError::Exr` - the file
///   is missing, unreadable or corrupt
pub fn read(path: impl AsRef<Path>) -> Result<SourceImage, CodecError> {
    let path = path.as_ref();
    let kind = ContainerKind::from_path(path)?;
    tracing::debug!(path = %path.display(), ?kind, "reading raster");

    match kind {
        ContainerKind::OpenExr => {
            let (raster, header) = openexr::read_exr(path)?;
            Ok(SourceImage {
                raster,
                exr_header: Some(header),
            })
        }
        ContainerKind::Standard(format) => Ok(SourceImage {
            raster: standard::read_standard(path, format)?,
            exr_header: None,
        }),
    }
}

/// Writes `raster` to `path`, creating or replacing the file.
///
/// EXR output needs `exr_header`: the header captured when the source was
/// read, or one from [`ExrHeader::for_raster`]. Standard output ignores it.
///
/// The file is first written to a hidden sibling and renamed into place, so
/// a failed write never leaves a truncated file at `path`.
///
/// # Errors
///
/// * `CodecError::MissingHeader` - EXR output without a header
/// * `CodecError::HeaderMismatch` - the raster does not fit the header
/// * `CodecError::UnsupportedFormat` - unknown container or a channel count
///   the container cannot store
/// * `CodecError::Io`, `CodecError::Image`, `CodecError::Exr` - encode or
///   filesystem failure
pub fn write(
    path: impl AsRef<Path>,
    raster: &Raster,
    exr_header: Option<&ExrHeader>,
) -> Result<(), CodecError> {
    let path = path.as_ref();
    let kind = ContainerKind::from_path(path)?;
    tracing::debug!(path = %path.display(), ?kind, "writing raster");

    match kind {
        ContainerKind::OpenExr => {
            let header = exr_header.ok_or(CodecError::MissingHeader)?;
            openexr::write_exr(path, raster, header)
        }
        ContainerKind::Standard(format) => standard::write_standard(path, raster, format),
    }
}

/// Hidden sibling of `path` that encoders write into before the rename.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(".partial");
    path.with_file_name(name)
}

/// Runs `encode` against a staging file and moves the result to `path`.
///
/// The staging file is removed when either step fails.
pub(crate) fn write_atomically<F>(path: &Path, encode: F) -> Result<(), CodecError>
where
    F: FnOnce(&Path) -> Result<(), CodecError>,
{
    let staging = staging_path(path);

    let result = encode(&staging).and_then(|()| {
        fs::rename(&staging, path).map_err(|source| CodecError::Io {
            path: path.to_path_buf(),
            source,
        })
    });

    if result.is_err() {
        // best effort; the staging file may never have been created
        let _ = fs::remove_file(&staging);
    }
    result
}
