//! In-memory raster shared by the codec and the blur engine.
//!
//! A [`Raster`] is a dense `[row][col][channel]` grid with named channel
//! planes. It is built once by the codec, consumed by the blur engine and
//! replaced by a new raster; nothing mutates it in place.

use crate::error::RasterError;
use crate::Image;
use image::{ImageBuffer, Luma, Pixel, Primitive};
use itertools::iproduct;

/// Numeric representation of every sample in a raster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleType {
    /// 8-bit samples in `[0, 255]`, read as `[0, 1]` after normalization
    NormalizedU8,
    /// Linear light, unbounded and non-negative in practice (HDR)
    LinearF32,
}

/// Interleaved sample storage
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    U8(Vec<u8>),
    F32(Vec<f32>),
}

impl Samples {
    pub fn len(&self) -> usize {
        match self {
            Self::U8(data) => data.len(),
            Self::F32(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub const fn sample_type(&self) -> SampleType {
        match self {
            Self::U8(_) => SampleType::NormalizedU8,
            Self::F32(_) => SampleType::LinearF32,
        }
    }
}

/// A rectangular multi-channel image with named channel planes
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    width: u32,
    height: u32,
    channels: Vec<String>,
    samples: Samples,
}

impl Raster {
    /// Builds a raster from interleaved samples.
    ///
    /// # Errors
    ///
    /// * `RasterError::EmptyRaster` - width or height is zero
    /// * `RasterError::NoChannels` - `channels` is empty
    /// * `RasterError::SampleCountMismatch` - `samples` does not hold
    ///   exactly `width * height * channels.len()` values
    pub fn new(
        width: u32,
        height: u32,
        channels: Vec<String>,
        samples: Samples,
    ) -> Result<Self, RasterError> {
        if width == 0 || height == 0 {
            return Err(RasterError::EmptyRaster { width, height });
        }
        if channels.is_empty() {
            return Err(RasterError::NoChannels);
        }

        let expected = width as usize * height as usize * channels.len();
        if samples.len() != expected {
            return Err(RasterError::SampleCountMismatch {
                expected,
                actual: samples.len(),
            });
        }

        Ok(Self {
            width,
            height,
            channels,
            samples,
        })
    }

    /// Builds an 8-bit raster from interleaved samples.
    pub fn from_u8<I, S>(
        width: u32,
        height: u32,
        channels: I,
        data: Vec<u8>,
    ) -> Result<Self, RasterError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let channels = channels.into_iter().map(Into::into).collect();
        Self::new(width, height, channels, Samples::U8(data))
    }

    /// Builds a float raster from interleaved samples.
    pub fn from_f32<I, S>(
        width: u32,
        height: u32,
        channels: I,
        data: Vec<f32>,
    ) -> Result<Self, RasterError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let channels = channels.into_iter().map(Into::into).collect();
        Self::new(width, height, channels, Samples::F32(data))
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Position of the channel called `name`, if present
    pub fn channel_index(&self, name: &str) -> Option<usize> {
        self.channels.iter().position(|channel| channel == name)
    }

    pub const fn sample_type(&self) -> SampleType {
        self.samples.sample_type()
    }

    pub const fn samples(&self) -> &Samples {
        &self.samples
    }

    fn sample_index(&self, x: u32, y: u32, channel: usize) -> Option<usize> {
        if x >= self.width || y >= self.height || channel >= self.channels.len() {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * self.channels.len() + channel)
    }

    /// Sample at `(x, y)` on `channel`, widened to `f32`.
    ///
    /// 8-bit samples are returned on their `[0, 255]` scale, not normalized.
    pub fn sample(&self, x: u32, y: u32, channel: usize) -> Option<f32> {
        let index = self.sample_index(x, y, channel)?;
        match &self.samples {
            Samples::U8(data) => data.get(index).map(|&value| f32::from(value)),
            Samples::F32(data) => data.get(index).copied(),
        }
    }

    /// Copies one channel out as a single-plane image.
    ///
    /// # Errors
    ///
    /// * `RasterError::ChannelOutOfRange` - `channel` is past the last plane
    pub fn channel_plane(&self, channel: usize) -> Result<Image<Luma<f32>>, RasterError> {
        if channel >= self.channels.len() {
            return Err(RasterError::ChannelOutOfRange {
                index: channel,
                channels: self.channels.len(),
            });
        }

        Ok(ImageBuffer::from_fn(self.width, self.height, |x, y| {
            // sample() is total inside the bounds checked above
            Luma([self.sample(x, y, channel).unwrap_or_default()])
        }))
    }
}

/// Splits interleaved samples into one single-channel image per plane.
pub(crate) fn split_planes<T>(
    data: &[T],
    width: u32,
    height: u32,
    channels: usize,
) -> Vec<Image<Luma<T>>>
where
    T: Primitive + 'static,
    Luma<T>: Pixel<Subpixel = T>,
{
    (0..channels)
        .map(|channel| {
            ImageBuffer::from_fn(width, height, |x, y| {
                let index = (y as usize * width as usize + x as usize) * channels + channel;
                Luma([data[index]])
            })
        })
        .collect()
}

/// Interleaves single-channel planes back into `[row][col][channel]` order.
///
/// All planes must share the dimensions of the first one.
pub(crate) fn merge_planes<T>(planes: &[Image<Luma<T>>]) -> Vec<T>
where
    T: Primitive + 'static,
    Luma<T>: Pixel<Subpixel = T>,
{
    let Some(first) = planes.first() else {
        return Vec::new();
    };
    let (width, height) = first.dimensions();

    iproduct!(0..height, 0..width, planes)
        .map(|(y, x, plane)| plane.get_pixel(x, y)[0])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_rgb_raster;

    #[test]
    fn test_new_rejects_empty_dimensions() {
        let result = Raster::from_u8(0, 4, ["R"], vec![]);
        assert_eq!(
            result.unwrap_err(),
            RasterError::EmptyRaster {
                width: 0,
                height: 4
            }
        );
    }

    #[test]
    fn test_new_rejects_missing_channels() {
        let result = Raster::from_u8(1, 1, Vec::<String>::new(), vec![0]);
        assert_eq!(result.unwrap_err(), RasterError::NoChannels);
    }

    #[test]
    fn test_new_rejects_wrong_sample_count() {
        let result = Raster::from_f32(2, 2, ["R", "G", "B"], vec![0.0; 11]);
        assert_eq!(
            result.unwrap_err(),
            RasterError::SampleCountMismatch {
                expected: 12,
                actual: 11
            }
        );
    }

    #[test]
    fn test_sample_access_is_row_major() {
        let raster = create_test_rgb_raster();
        assert_eq!(raster.sample(0, 0, 0), Some(200.0));
        assert_eq!(raster.sample(1, 0, 1), Some(200.0));
        assert_eq!(raster.sample(0, 1, 2), Some(200.0));
        assert_eq!(raster.sample(1, 1, 0), Some(50.0));
        assert_eq!(raster.sample(2, 0, 0), None);
        assert_eq!(raster.sample(0, 0, 3), None);
    }

    #[test]
    fn test_channel_lookup_by_name() {
        let raster = create_test_rgb_raster();
        assert_eq!(raster.channel_index("G"), Some(1));
        assert_eq!(raster.channel_index("Z"), None);
        assert_eq!(raster.sample_type(), SampleType::NormalizedU8);
    }

    #[test]
    fn test_channel_plane_out_of_range() {
        let raster = create_test_rgb_raster();
        assert!(raster.channel_plane(2).is_ok());
        assert_eq!(
            raster.channel_plane(3).unwrap_err(),
            RasterError::ChannelOutOfRange {
                index: 3,
                channels: 3
            }
        );
    }

    #[test]
    fn test_split_then_merge_restores_interleaving() {
        let raster = create_test_rgb_raster();
        let Samples::U8(data) = raster.samples() else {
            panic!("fixture is 8-bit");
        };

        let planes = split_planes(data, 2, 2, 3);
        assert_eq!(planes.len(), 3);
        assert_eq!(planes[1].get_pixel(1, 0)[0], 200);
        assert_eq!(merge_planes(&planes), *data);
    }
}
