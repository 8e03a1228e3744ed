pub mod raster;
pub mod seamless_blur;
pub mod texture;
pub mod working_buffer;
pub mod wrap_padding;
