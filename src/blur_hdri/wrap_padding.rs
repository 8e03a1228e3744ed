use crate::error::BlurError;
use crate::Image;
use image::{imageops, ImageBuffer, Pixel};

/// パノラマの幅が足りない場合の扱いを指定する列挙型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NarrowPanoramaPolicy {
    /// パディング幅を `floor(width / 2)` に切り詰めて続行する
    #[default]
    Clamp,
    /// `BlurError::RadiusTooLargeForWidth` を返す
    Reject,
}

/// ぼかし半径から要求されるラップパディング幅を計算する
///
/// 半径の整数部の2倍を返す。丸めではなく切り捨てを用いる。
///
/// # 引数
///
/// * `radius` - ガウスぼかしの半径（標準偏差）
#[inline]
pub fn requested_pad_width(radius: f32) -> u32 {
    (radius.max(0.0).floor() as u32).saturating_mul(2)
}

/// 画像幅とポリシーを考慮した実際のパディング幅を計算する
///
/// # 引数
///
/// * `radius` - ガウスぼかしの半径
/// * `width` - 元画像の幅
/// * `policy` - 幅が足りない場合の扱い
///
/// # 戻り値
///
/// 左右それぞれに追加する列数
///
/// # エラー
///
/// * `policy` が `Reject` で、要求幅が `floor(width / 2)` を超える場合
pub fn pad_width_for(
    radius: f32,
    width: u32,
    policy: NarrowPanoramaPolicy,
) -> Result<u32, BlurError> {
    let requested = requested_pad_width(radius);
    let limit = width / 2;

    if requested <= limit {
        return Ok(requested);
    }

    match policy {
        NarrowPanoramaPolicy::Clamp => {
            tracing::warn!(
                requested,
                clamped = limit,
                width,
                "wrap padding exceeds half the panorama width; clamping"
            );
            Ok(limit)
        }
        NarrowPanoramaPolicy::Reject => Err(BlurError::RadiusTooLargeForWidth {
            pad: requested,
            width,
        }),
    }
}

/// 水平方向に循環するパノラマ用のパディング操作を提供するトレイト
pub trait WrapPadding<P: Pixel> {
    /// 左右に反対側の端の列をコピーしてパディングする
    ///
    /// 左側には右端の `pad` 列、右側には左端の `pad` 列が追加される。
    /// 上下方向はそのまま。
    ///
    /// # 引数
    ///
    /// * `pad` - 左右それぞれに追加する列数
    ///
    /// # 戻り値
    ///
    /// 幅 `width + 2 * pad` のパディング済み画像
    fn wrap_pad_horizontal(&self, pad: u32) -> Image<P>;

    /// 左右から `pad` 列ずつ取り除く
    ///
    /// # エラー
    ///
    /// * 取り除く列数が画像幅以上の場合
    fn crop_horizontal(&self, pad: u32) -> Result<Image<P>, BlurError>;
}

impl<P: Pixel + 'static> WrapPadding<P> for ImageBuffer<P, Vec<P::Subpixel>> {
    fn wrap_pad_horizontal(&self, pad: u32) -> Image<P> {
        let (width, height) = self.dimensions();
        if pad == 0 || width == 0 {
            return self.clone();
        }

        // 列 x (パディング後) は元画像の列 (x - pad) mod width に対応する
        let offset = width - pad % width;
        ImageBuffer::from_fn(width + 2 * pad, height, |x, y| {
            *self.get_pixel((x + offset) % width, y)
        })
    }

    fn crop_horizontal(&self, pad: u32) -> Result<Image<P>, BlurError> {
        let (width, height) = self.dimensions();
        let removed = pad.saturating_mul(2);

        if removed >= width {
            return Err(BlurError::RadiusTooLargeForWidth { pad, width });
        }
        if pad == 0 {
            return Ok(self.clone());
        }

        Ok(imageops::crop_imm(self, pad, 0, width - removed, height).to_image())
    }
}
