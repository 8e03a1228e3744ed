use std::path::PathBuf;

use thiserror::Error;

/// Error type for raster construction and channel-plane access
///
/// These errors guard the raster invariant: every channel plane covers
/// exactly `width × height` samples.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RasterError {
    /// Width or height is zero
    #[error("Raster dimensions must be non-zero, got {width}x{height}")]
    EmptyRaster { width: u32, height: u32 },

    /// The raster has no channel planes
    #[error("Raster must have at least one channel")]
    NoChannels,

    /// The sample buffer does not match `width * height * channels`
    #[error("Sample buffer length mismatch: expected {expected}, got {actual}")]
    SampleCountMismatch {
        /// Expected number of samples
        expected: usize,
        /// Actual number of samples
        actual: usize,
    },

    /// A channel index past the last plane was requested
    #[error("Channel index {index} is out of range for a raster with {channels} channels")]
    ChannelOutOfRange { index: usize, channels: usize },
}

/// Error type for the seamless blur engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BlurError {
    /// Invalid parameter provided to the blur
    ///
    /// Returned for a radius that is zero, negative, or not finite.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Wrap padding needs more columns than the panorama has
    ///
    /// Only returned under [`NarrowPanoramaPolicy::Reject`](crate::NarrowPanoramaPolicy);
    /// the default policy clamps the pad width instead.
    #[error("Wrap padding of {pad} columns exceeds half the raster width ({width})")]
    RadiusTooLargeForWidth { pad: u32, width: u32 },

    /// The blurred planes could not be reassembled into a raster
    #[error(transparent)]
    Raster(#[from] RasterError),
}

/// Error type for the raster I/O adapter
///
/// Every variant except `UnsupportedFormat` belongs to the I/O failure
/// category: the file boundary could not be crossed and no result was
/// produced.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The file extension does not name a readable/writable container
    #[error("Unsupported image container: {0}")]
    UnsupportedFormat(String),

    /// Plain filesystem failure (missing file, permission denied, rename)
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Decode or encode failure in a standard raster container
    #[error("Image codec error on {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Decode or encode failure in an OpenEXR container
    #[error("OpenEXR error on {}: {source}", .path.display())]
    Exr {
        path: PathBuf,
        #[source]
        source: exr::error::Error,
    },

    /// The raster does not fit the header it is being written with
    #[error("Raster does not match the EXR header: {0}")]
    HeaderMismatch(String),

    /// EXR output was requested without a header to write it with
    #[error("Writing an EXR file requires a header template")]
    MissingHeader,

    /// The decoded pixels do not form a valid raster
    #[error(transparent)]
    Raster(#[from] RasterError),
}

/// Umbrella error for the read → blur → write pipeline
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Blur(#[from] BlurError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Raster(#[from] RasterError),

    /// The destination would overwrite the source file
    #[error("Refusing to overwrite the source image {}", .0.display())]
    WouldOverwriteSource(PathBuf),
}
