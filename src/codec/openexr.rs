//! OpenEXR side of the raster I/O adapter.
//!
//! The first valid layer is read at its largest resolution with every
//! channel, whatever its name. Samples are widened to `f32` for the raster;
//! the header remembers how each channel was stored so writing puts them
//! back as F16, F32 or U32 with the original attributes and data window.

use super::write_atomically;
use crate::blur_hdri::working_buffer::from_working;
use crate::error::CodecError;
use crate::{Raster, Samples};
use exr::prelude::{
    f16, read_first_flat_layer_from_file, AnyChannel, AnyChannels, Encoding, FlatSamples,
    Image as ExrImage, ImageAttributes, IntegerBounds, Layer, LayerAttributes, Text, Vec2,
    WritableImage,
};
use itertools::iproduct;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StoredSampleType {
    F16,
    F32,
    U32,
}

#[derive(Debug, Clone, PartialEq)]
struct ChannelTemplate {
    name: Text,
    stored_as: StoredSampleType,
    quantize_linearly: bool,
}

/// Everything about an EXR file except its pixels
///
/// Captured when a file is read and reused when the blurred raster is
/// written, so the output keeps the source's channel layout, data window,
/// compression and attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct ExrHeader {
    image_attributes: ImageAttributes,
    layer_attributes: LayerAttributes,
    encoding: Encoding,
    size: Vec2<usize>,
    channels: Vec<ChannelTemplate>,
}

impl ExrHeader {
    /// Builds a single-layer header with lossless compression and one F32
    /// channel per raster channel.
    ///
    /// # Errors
    ///
    /// * `CodecError::HeaderMismatch` - a channel name is not valid EXR text
    pub fn for_raster(raster: &Raster) -> Result<Self, CodecError> {
        let size = Vec2(raster.width() as usize, raster.height() as usize);
        let channels = raster
            .channels()
            .iter()
            .map(|name| {
                let name = Text::new_or_none(name).ok_or_else(|| {
                    CodecError::HeaderMismatch(format!("channel name {name:?} is not valid"))
                })?;
                Ok(ChannelTemplate {
                    name,
                    stored_as: StoredSampleType::F32,
                    quantize_linearly: false,
                })
            })
            .collect::<Result<Vec<_>, CodecError>>()?;

        Ok(Self {
            image_attributes: ImageAttributes::new(IntegerBounds::from_dimensions(size)),
            layer_attributes: LayerAttributes::default(),
            encoding: Encoding::FAST_LOSSLESS,
            size,
            channels,
        })
    }

    /// Width and height of the data window
    pub fn dimensions(&self) -> (usize, usize) {
        (self.size.0, self.size.1)
    }

    /// Channel names in file order
    pub fn channel_names(&self) -> Vec<String> {
        self.channels
            .iter()
            .map(|channel| channel.name.to_string())
            .collect()
    }

    fn check_matches(&self, raster: &Raster) -> Result<(), CodecError> {
        let (width, height) = raster.dimensions();
        if (width as usize, height as usize) != self.dimensions() {
            return Err(CodecError::HeaderMismatch(format!(
                "raster is {width}x{height}, header data window is {}x{}",
                self.size.0, self.size.1
            )));
        }

        let header_names = self.channel_names();
        if header_names != raster.channels() {
            return Err(CodecError::HeaderMismatch(format!(
                "raster channels {:?} differ from header channels {header_names:?}",
                raster.channels()
            )));
        }

        Ok(())
    }
}

pub(crate) fn read_exr(path: &Path) -> Result<(Raster, ExrHeader), CodecError> {
    let image = read_first_flat_layer_from_file(path).map_err(|source| CodecError::Exr {
        path: path.to_path_buf(),
        source,
    })?;

    let layer = image.layer_data;
    let Vec2(width, height) = layer.size;
    let (raster_width, raster_height) = match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => {
            return Err(CodecError::UnsupportedFormat(format!(
                "EXR data window {width}x{height} is too large"
            )))
        }
    };

    let mut templates = Vec::with_capacity(layer.channel_data.list.len());
    let mut planes: Vec<Vec<f32>> = Vec::with_capacity(layer.channel_data.list.len());

    for channel in layer.channel_data.list {
        if channel.sampling != Vec2(1, 1) {
            return Err(CodecError::UnsupportedFormat(format!(
                "subsampled EXR channel {}",
                channel.name
            )));
        }

        let (stored_as, plane) = match channel.sample_data {
            FlatSamples::F16(samples) => (
                StoredSampleType::F16,
                samples.into_iter().map(f16::to_f32).collect(),
            ),
            FlatSamples::F32(samples) => (StoredSampleType::F32, samples),
            FlatSamples::U32(samples) => (
                StoredSampleType::U32,
                samples.into_iter().map(|value| value as f32).collect(),
            ),
        };

        templates.push(ChannelTemplate {
            name: channel.name,
            stored_as,
            quantize_linearly: channel.quantize_linearly,
        });
        planes.push(plane);
    }

    let header = ExrHeader {
        image_attributes: image.attributes,
        layer_attributes: layer.attributes,
        encoding: layer.encoding,
        size: layer.size,
        channels: templates,
    };

    let data = iproduct!(0..width * height, &planes)
        .map(|(index, plane)| plane[index])
        .collect();
    let raster = Raster::from_f32(raster_width, raster_height, header.channel_names(), data)?;

    tracing::debug!(
        path = %path.display(),
        width,
        height,
        channels = ?raster.channels(),
        "decoded EXR layer"
    );

    Ok((raster, header))
}

pub(crate) fn write_exr(path: &Path, raster: &Raster, header: &ExrHeader) -> Result<(), CodecError> {
    header.check_matches(raster)?;

    let samples = match raster.samples() {
        Samples::F32(data) => data.clone(),
        Samples::U8(data) => from_working(data),
    };
    let channel_count = raster.channel_count();

    let list: Vec<AnyChannel<FlatSamples>> = header
        .channels
        .iter()
        .enumerate()
        .map(|(index, template)| {
            let plane = samples.iter().skip(index).step_by(channel_count).copied();
            let sample_data = match template.stored_as {
                StoredSampleType::F16 => FlatSamples::F16(plane.map(f16::from_f32).collect()),
                StoredSampleType::F32 => FlatSamples::F32(plane.collect()),
                StoredSampleType::U32 => {
                    FlatSamples::U32(plane.map(|value| value.max(0.0).round() as u32).collect())
                }
            };

            AnyChannel {
                name: template.name.clone(),
                sample_data,
                quantize_linearly: template.quantize_linearly,
                sampling: Vec2(1, 1),
            }
        })
        .collect();

    let image = ExrImage {
        attributes: header.image_attributes.clone(),
        layer_data: Layer {
            channel_data: AnyChannels::sort(list.into()),
            attributes: header.layer_attributes.clone(),
            size: header.size,
            encoding: header.encoding,
        },
    };

    write_atomically(path, |staging| {
        image.write().to_file(staging).map_err(|source| CodecError::Exr {
            path: path.to_path_buf(),
            source,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_rgb_raster;

    #[test]
    fn test_header_for_raster_mirrors_layout() {
        let raster = create_test_rgb_raster();
        let header = ExrHeader::for_raster(&raster).unwrap();

        assert_eq!(header.dimensions(), (2, 2));
        assert_eq!(header.channel_names(), vec!["R", "G", "B"]);
        assert!(header.check_matches(&raster).is_ok());
    }

    #[test]
    fn test_header_rejects_other_geometry() {
        let header = ExrHeader::for_raster(&create_test_rgb_raster()).unwrap();
        let wider = Raster::from_f32(3, 2, ["R", "G", "B"], vec![0.0; 18]).unwrap();
        assert!(matches!(
            header.check_matches(&wider),
            Err(CodecError::HeaderMismatch(_))
        ));
    }

    #[test]
    fn test_header_rejects_other_channels() {
        let header = ExrHeader::for_raster(&create_test_rgb_raster()).unwrap();
        let renamed = Raster::from_f32(2, 2, ["R", "G", "Z"], vec![0.0; 12]).unwrap();
        assert!(matches!(
            header.check_matches(&renamed),
            Err(CodecError::HeaderMismatch(_))
        ));
    }

    #[test]
    fn test_non_ascii_channel_name_is_rejected() {
        let raster = Raster::from_f32(1, 1, ["赤"], vec![0.0]).unwrap();
        assert!(matches!(
            ExrHeader::for_raster(&raster),
            Err(CodecError::HeaderMismatch(_))
        ));
    }
}
