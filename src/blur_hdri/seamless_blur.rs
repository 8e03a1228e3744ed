//! Seamless Gaussian blur for rasters that may be horizontally cyclic.
//!
//! For an equirectangular panorama the columns beyond the right edge are the
//! columns at the left edge. A plain 2-D blur extends edge pixels instead,
//! which leaves a visible seam where the panorama closes. This module pads
//! each channel plane with the opposite edge's columns before blurring and
//! crops the padding away afterwards, so both edges are filtered with the
//! neighbours they actually have on the sphere.
//!
//! ## Pipeline
//!
//! 1. Float rasters are quantized into the 8-bit working buffer
//!    (clamp to `[0, 1]`, scale, round). Skipped under
//!    [`WorkingPrecision::NativeFloat`].
//! 2. With `wrap_horizontal`, every plane gets `floor(radius) * 2` wrapped
//!    columns on each side (clamped to half the width, see
//!    [`NarrowPanoramaPolicy`]).
//! 3. Each plane is blurred independently with σ = `radius`; edges that are
//!    not wrapped are extended.
//! 4. The padding is cropped off and float rasters are expanded back.
//!
//! The input raster is never modified; a new raster is returned.

use crate::blur_hdri::raster::{merge_planes, split_planes, Raster, Samples};
use crate::blur_hdri::texture::TextureKind;
use crate::blur_hdri::working_buffer::{from_working, to_working};
use crate::blur_hdri::wrap_padding::{pad_width_for, NarrowPanoramaPolicy, WrapPadding};
use crate::error::BlurError;
use crate::Image;
use image::{Luma, Pixel, Primitive};
use imageproc::filter::gaussian_blur_f32;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Numeric space the blur runs in for float rasters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WorkingPrecision {
    /// Quantize to the 8-bit working buffer; values above 1.0 are clamped
    #[default]
    Clamped8Bit,
    /// Convolve the float planes directly, keeping HDR highlights
    NativeFloat,
}

/// Parameters of one blur call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlurRequest {
    radius: f32,
    wrap_horizontal: bool,
    precision: WorkingPrecision,
    narrow_policy: NarrowPanoramaPolicy,
}

impl BlurRequest {
    /// Creates a request with the default precision and narrow-panorama policy.
    ///
    /// # Errors
    ///
    /// * `BlurError::InvalidParameter` - `radius` is not a finite positive number
    pub fn new(radius: f32, wrap_horizontal: bool) -> Result<Self, BlurError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(BlurError::InvalidParameter(format!(
                "blur radius must be a finite positive number, got {radius}"
            )));
        }

        Ok(Self {
            radius,
            wrap_horizontal,
            precision: WorkingPrecision::default(),
            narrow_policy: NarrowPanoramaPolicy::default(),
        })
    }

    /// Creates a request whose wrap flag follows the texture kind.
    pub fn for_texture(kind: TextureKind, radius: f32) -> Result<Self, BlurError> {
        Self::new(radius, kind.wraps_horizontally())
    }

    #[must_use]
    pub const fn with_precision(mut self, precision: WorkingPrecision) -> Self {
        self.precision = precision;
        self
    }

    #[must_use]
    pub const fn with_narrow_policy(mut self, narrow_policy: NarrowPanoramaPolicy) -> Self {
        self.narrow_policy = narrow_policy;
        self
    }

    pub const fn radius(&self) -> f32 {
        self.radius
    }

    pub const fn wrap_horizontal(&self) -> bool {
        self.wrap_horizontal
    }

    pub const fn precision(&self) -> WorkingPrecision {
        self.precision
    }

    pub const fn narrow_policy(&self) -> NarrowPanoramaPolicy {
        self.narrow_policy
    }
}

/// Seamless blur over a whole raster
pub trait SeamlessBlur {
    /// Blurs every channel plane, wrapping horizontally when requested.
    ///
    /// # Returns
    ///
    /// A new raster with the same dimensions, channel names and sample type.
    ///
    /// # Errors
    ///
    /// * `BlurError::RadiusTooLargeForWidth` - wrap padding does not fit and
    ///   the request uses [`NarrowPanoramaPolicy::Reject`]
    fn seamless_blur(&self, request: &BlurRequest) -> Result<Raster, BlurError>;
}

impl SeamlessBlur for Raster {
    fn seamless_blur(&self, request: &BlurRequest) -> Result<Raster, BlurError> {
        let (width, height) = self.dimensions();
        let channels = self.channel_count();
        let sigma = request.radius();

        let pad = if request.wrap_horizontal() {
            pad_width_for(sigma, width, request.narrow_policy())?
        } else {
            0
        };

        tracing::debug!(
            width,
            height,
            channels,
            sigma,
            pad,
            sample_type = ?self.sample_type(),
            precision = ?request.precision(),
            "blurring raster"
        );

        let samples = match (self.samples(), request.precision()) {
            (Samples::U8(data), _) => Samples::U8(blur_planes(
                data,
                (width, height),
                channels,
                pad,
                |plane| gaussian_blur_f32(plane, sigma),
            )?),
            (Samples::F32(data), WorkingPrecision::Clamped8Bit) => {
                let working = to_working(data);
                let blurred = blur_planes(&working, (width, height), channels, pad, |plane| {
                    gaussian_blur_f32(plane, sigma)
                })?;
                Samples::F32(from_working(&blurred))
            }
            (Samples::F32(data), WorkingPrecision::NativeFloat) => Samples::F32(blur_planes(
                data,
                (width, height),
                channels,
                pad,
                |plane| gaussian_blur_f32(plane, sigma),
            )?),
        };

        Ok(Raster::new(width, height, self.channels().to_vec(), samples)?)
    }
}

/// Blurs `raster` according to `request`.
///
/// Equivalent to [`SeamlessBlur::seamless_blur`].
pub fn blur(raster: &Raster, request: &BlurRequest) -> Result<Raster, BlurError> {
    raster.seamless_blur(request)
}

/// Splits interleaved samples into planes, blurs each one with wrap padding
/// of `pad` columns and interleaves the result again.
fn blur_planes<T, F>(
    data: &[T],
    (width, height): (u32, u32),
    channels: usize,
    pad: u32,
    blur_plane: F,
) -> Result<Vec<T>, BlurError>
where
    T: Primitive + Send + Sync + 'static,
    Luma<T>: Pixel<Subpixel = T>,
    F: Fn(&Image<Luma<T>>) -> Image<Luma<T>> + Send + Sync,
{
    let planes = split_planes(data, width, height, channels);

    let blur_one = |plane: &Image<Luma<T>>| -> Result<Image<Luma<T>>, BlurError> {
        if pad == 0 {
            return Ok(blur_plane(plane));
        }
        blur_plane(&plane.wrap_pad_horizontal(pad)).crop_horizontal(pad)
    };

    #[cfg(feature = "rayon")]
    let blurred = planes
        .par_iter()
        .map(blur_one)
        .collect::<Result<Vec<_>, _>>()?;
    #[cfg(not(feature = "rayon"))]
    let blurred = planes
        .iter()
        .map(blur_one)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(merge_planes(&blurred))
}
