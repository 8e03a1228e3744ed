//! Read → blur → write for one texture file.
//!
//! This is the whole sequence a node editor runs when the user asks for a
//! blurred copy of a texture: nothing is written unless the read and the
//! blur both succeed, and the source file is never replaced.

use crate::codec::openexr::ExrHeader;
use crate::codec::{read, write, ContainerKind, SourceImage};
use crate::error::{BlurError, CodecError, Error};
use crate::{BlurRequest, NarrowPanoramaPolicy, SeamlessBlur, TextureKind, WorkingPrecision};
use std::fs;
use std::path::{Path, PathBuf};

/// Appended to the file stem of the source to name the output
pub const BLURRED_SUFFIX: &str = "_blurred";

/// Sibling path of `source` with [`BLURRED_SUFFIX`] before the extension.
///
/// `maps/studio.exr` becomes `maps/studio_blurred.exr`.
///
/// # Errors
///
/// * `CodecError::UnsupportedFormat` - `source` has no file name (`/`, `..`)
pub fn blurred_path(source: &Path) -> Result<PathBuf, CodecError> {
    let stem = source.file_stem().ok_or_else(|| {
        CodecError::UnsupportedFormat(format!("{} does not name a file", source.display()))
    })?;

    let mut name = stem.to_os_string();
    name.push(BLURRED_SUFFIX);
    if let Some(extension) = source.extension() {
        name.push(".");
        name.push(extension);
    }
    Ok(source.with_file_name(name))
}

/// Whether `a` and `b` name the same file, through `..`, symlinks or
/// relative spellings. Paths that do not both exist only match literally.
fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// One blur invocation on a texture file
#[derive(Debug, Clone, PartialEq)]
pub struct BlurJob {
    source: PathBuf,
    destination: Option<PathBuf>,
    kind: TextureKind,
    request: BlurRequest,
}

impl BlurJob {
    /// Creates a job writing next to `source`, wrapping when `kind` is an
    /// environment texture.
    ///
    /// # Errors
    ///
    /// * `BlurError::InvalidParameter` - `radius` is not a finite positive number
    pub fn new(
        source: impl Into<PathBuf>,
        kind: TextureKind,
        radius: f32,
    ) -> Result<Self, BlurError> {
        Ok(Self {
            source: source.into(),
            destination: None,
            kind,
            request: BlurRequest::for_texture(kind, radius)?,
        })
    }

    /// Writes to `destination` instead of the derived sibling path.
    #[must_use]
    pub fn with_destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    #[must_use]
    pub fn with_precision(mut self, precision: WorkingPrecision) -> Self {
        self.request = self.request.with_precision(precision);
        self
    }

    #[must_use]
    pub fn with_narrow_policy(mut self, policy: NarrowPanoramaPolicy) -> Self {
        self.request = self.request.with_narrow_policy(policy);
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Output path: the explicit destination, or [`blurred_path`] of the source
    pub fn destination(&self) -> Result<PathBuf, CodecError> {
        match &self.destination {
            Some(destination) => Ok(destination.clone()),
            None => blurred_path(&self.source),
        }
    }

    pub const fn kind(&self) -> TextureKind {
        self.kind
    }

    pub const fn request(&self) -> &BlurRequest {
        &self.request
    }
}

/// Runs `job` and returns the path of the written file.
///
/// # Errors
///
/// * `Error::WouldOverwriteSource` - the destination resolves to the source file
/// * `Error::Codec` - the source cannot be read, has no file name to derive
///   the output from, or the result cannot be written
/// * `Error::Blur` - the blur rejected the raster
#[tracing::instrument(skip_all, fields(source = %job.source.display(), kind = ?job.kind))]
pub fn run(job: &BlurJob) -> Result<PathBuf, Error> {
    let destination = job.destination()?;
    if same_file(&destination, &job.source) {
        return Err(Error::WouldOverwriteSource(destination));
    }
    // fail on an unwritable container before spending time on the blur
    let destination_kind = ContainerKind::from_path(&destination)?;

    let SourceImage { raster, exr_header } = read(&job.source)?;
    let blurred = raster.seamless_blur(&job.request)?;

    let header = match (destination_kind, exr_header) {
        (ContainerKind::OpenExr, Some(header)) => Some(header),
        (ContainerKind::OpenExr, None) => Some(ExrHeader::for_raster(&blurred)?),
        (ContainerKind::Standard(_), _) => None,
    };
    write(&destination, &blurred, header.as_ref())?;

    tracing::info!(destination = %destination.display(), "wrote blurred texture");
    Ok(destination)
}
