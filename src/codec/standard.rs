use super::write_atomically;
use crate::blur_hdri::working_buffer::to_working;
use crate::error::{CodecError, RasterError};
use crate::{Raster, Samples};
use image::{DynamicImage, ImageBuffer, ImageFormat, ImageReader, Luma, LumaA, Rgb, Rgba};
use std::path::Path;

const LUMA: [&str; 1] = ["Y"];
const LUMA_ALPHA: [&str; 2] = ["Y", "A"];
const RGB: [&str; 3] = ["R", "G", "B"];
const RGBA: [&str; 4] = ["R", "G", "B", "A"];

/// Decodes a standard container into an 8-bit raster.
///
/// The channel layout follows the decoded color type (Y, YA, RGB or RGBA);
/// deeper pixel types are reduced to 8 bits per channel.
pub(crate) fn read_standard(path: &Path, format: ImageFormat) -> Result<Raster, CodecError> {
    let mut reader = ImageReader::open(path).map_err(|source| CodecError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    reader.set_format(format);

    let image = reader.decode().map_err(|source| CodecError::Image {
        path: path.to_path_buf(),
        source,
    })?;

    let (width, height) = (image.width(), image.height());
    let color = image.color();
    let (channels, data): (&[&str], Vec<u8>) = match (color.has_color(), color.has_alpha()) {
        (false, false) => (&LUMA[..], image.into_luma8().into_raw()),
        (false, true) => (&LUMA_ALPHA[..], image.into_luma_alpha8().into_raw()),
        (true, false) => (&RGB[..], image.into_rgb8().into_raw()),
        (true, true) => (&RGBA[..], image.into_rgba8().into_raw()),
    };

    Ok(Raster::from_u8(width, height, channels.iter().copied(), data)?)
}

/// Encodes `raster` as 8 bits per channel.
///
/// Float rasters are quantized the same way the blur's working buffer is.
/// Channels are placed by name, so the raster must carry exactly the
/// channels of a Y, YA, RGB or RGBA layout, in any order.
pub(crate) fn write_standard(
    path: &Path,
    raster: &Raster,
    format: ImageFormat,
) -> Result<(), CodecError> {
    let image = to_dynamic_image(raster, format)?;

    write_atomically(path, |staging| {
        image
            .save_with_format(staging, format)
            .map_err(|source| CodecError::Image {
                path: path.to_path_buf(),
                source,
            })
    })
}

/// Channel layouts a standard container can store, widest first
const LAYOUTS: [&[&str]; 4] = [&RGBA, &RGB, &LUMA_ALPHA, &LUMA];

/// Matches the raster's channel names to one of [`LAYOUTS`].
///
/// Returns the layout and, for each of its slots, the raster channel that
/// fills it. Names are matched regardless of their order in the raster.
fn standard_layout(raster: &Raster) -> Option<(&'static [&'static str], Vec<usize>)> {
    LAYOUTS.iter().find_map(|&layout| {
        if layout.len() != raster.channel_count() {
            return None;
        }
        let sources = layout
            .iter()
            .map(|name| raster.channel_index(name))
            .collect::<Option<Vec<_>>>()?;
        Some((layout, sources))
    })
}

fn to_dynamic_image(raster: &Raster, format: ImageFormat) -> Result<DynamicImage, CodecError> {
    let (width, height) = raster.dimensions();
    let (layout, sources) = standard_layout(raster).ok_or_else(|| {
        CodecError::UnsupportedFormat(format!(
            "channels {:?} cannot be stored as {format:?}",
            raster.channels()
        ))
    })?;

    let interleaved = match raster.samples() {
        Samples::U8(data) => data.clone(),
        Samples::F32(data) => to_working(data),
    };
    let data: Vec<u8> = interleaved
        .chunks_exact(raster.channel_count())
        .flat_map(|pixel| sources.iter().map(move |&source| pixel[source]))
        .collect();

    let actual = data.len();
    let mismatch = || {
        CodecError::Raster(RasterError::SampleCountMismatch {
            expected: width as usize * height as usize * layout.len(),
            actual,
        })
    };

    let image = match layout.len() {
        1 => DynamicImage::from(
            ImageBuffer::<Luma<u8>, _>::from_raw(width, height, data).ok_or_else(mismatch)?,
        ),
        2 => DynamicImage::from(
            ImageBuffer::<LumaA<u8>, _>::from_raw(width, height, data).ok_or_else(mismatch)?,
        ),
        3 => DynamicImage::from(
            ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, data).ok_or_else(mismatch)?,
        ),
        _ => DynamicImage::from(
            ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, data).ok_or_else(mismatch)?,
        ),
    };

    Ok(image)
}
