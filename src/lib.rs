mod blur_hdri;
mod codec;
mod error;
mod pipeline;

#[cfg(test)]
mod test_utils;

use image::{ImageBuffer, Pixel};

pub use blur_hdri::raster::{Raster, SampleType, Samples};
pub use blur_hdri::seamless_blur::{blur, BlurRequest, SeamlessBlur, WorkingPrecision};
pub use blur_hdri::texture::TextureKind;
pub use blur_hdri::working_buffer::{
    from_working, from_working_sample, to_working, to_working_sample,
};
pub use blur_hdri::wrap_padding::{
    pad_width_for, requested_pad_width, NarrowPanoramaPolicy, WrapPadding,
};
pub use codec::openexr::ExrHeader;
pub use codec::{read, write, ContainerKind, SourceImage};
pub use error::{BlurError, CodecError, Error, RasterError};
pub use pipeline::{blurred_path, run, BlurJob, BLURRED_SUFFIX};

pub type Image<P> = ImageBuffer<P, Vec<<P as Pixel>::Subpixel>>;
