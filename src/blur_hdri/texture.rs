/// Kind of texture node the source image was taken from.
///
/// Environment textures map an equirectangular panorama onto the world
/// sphere, so their left and right edges meet; image textures are flat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    /// Flat image texture
    Image,
    /// 360° environment (world) texture
    Environment,
}

impl TextureKind {
    /// Whether blurring must treat the raster as horizontally cyclic.
    pub const fn wraps_horizontally(self) -> bool {
        matches!(self, Self::Environment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_environment_textures_wrap() {
        assert!(TextureKind::Environment.wraps_horizontally());
        assert!(!TextureKind::Image.wraps_horizontally());
    }
}
