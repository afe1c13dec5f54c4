//! Hue/saturation/value conversion on the 8-bit half-degree hue scale.
//!
//! Hue is stored in `[0, 180)` (degrees halved so it fits a byte), saturation
//! and value in `[0, 255]`. HSV pages reuse the three-channel `RgbImage`
//! buffer with channels reinterpreted as `(h, s, v)`.

use image::{GrayImage, Luma, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

/// One HSV triple on the 8-bit scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hsv {
    /// Hue in half degrees, `0..=180`.
    pub h: u8,
    /// Saturation, `0..=255`.
    pub s: u8,
    /// Value, `0..=255`.
    pub v: u8,
}

impl Hsv {
    /// Creates an HSV triple.
    pub const fn new(h: u8, s: u8, v: u8) -> Self {
        Self { h, s, v }
    }

    /// Returns true when every channel lies within `[lower, upper]` inclusive.
    pub fn within(self, lower: Hsv, upper: Hsv) -> bool {
        (lower.h..=upper.h).contains(&self.h)
            && (lower.s..=upper.s).contains(&self.s)
            && (lower.v..=upper.v).contains(&self.v)
    }
}

/// Converts one RGB pixel to HSV.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> Hsv {
    let (rf, gf, bf) = (f32::from(r), f32::from(g), f32::from(b));
    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let diff = max - min;

    let s = if max > 0.0 { diff * 255.0 / max } else { 0.0 };
    let mut h = if diff <= 0.0 {
        0.0
    } else if max == rf {
        60.0 * (gf - bf) / diff
    } else if max == gf {
        120.0 + 60.0 * (bf - rf) / diff
    } else {
        240.0 + 60.0 * (rf - gf) / diff
    };
    if h < 0.0 {
        h += 360.0;
    }

    Hsv {
        h: (h / 2.0).round().min(180.0) as u8,
        s: s.round().min(255.0) as u8,
        v: max as u8,
    }
}

/// Converts a whole RGB page into an HSV-encoded buffer.
pub fn to_hsv(img: &RgbImage) -> RgbImage {
    let mut out = RgbImage::new(img.width(), img.height());
    for (src, dst) in img.pixels().zip(out.pixels_mut()) {
        let hsv = rgb_to_hsv(src[0], src[1], src[2]);
        *dst = Rgb([hsv.h, hsv.s, hsv.v]);
    }
    out
}

/// Builds a binary mask (255 inside the range, 0 outside) from an HSV page.
pub fn in_range(hsv: &RgbImage, lower: Hsv, upper: Hsv) -> GrayImage {
    let mut mask = GrayImage::new(hsv.width(), hsv.height());
    for (src, dst) in hsv.pixels().zip(mask.pixels_mut()) {
        let px = Hsv::new(src[0], src[1], src[2]);
        *dst = Luma([if px.within(lower, upper) { 255 } else { 0 }]);
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::{in_range, rgb_to_hsv, to_hsv, Hsv};
    use image::{Rgb, RgbImage};

    #[test]
    fn primaries_map_to_half_degree_hues() {
        assert_eq!(rgb_to_hsv(255, 0, 0), Hsv::new(0, 255, 255));
        assert_eq!(rgb_to_hsv(0, 255, 0), Hsv::new(60, 255, 255));
        assert_eq!(rgb_to_hsv(0, 0, 255), Hsv::new(120, 255, 255));
    }

    #[test]
    fn grays_have_zero_saturation() {
        assert_eq!(rgb_to_hsv(255, 255, 255), Hsv::new(0, 0, 255));
        assert_eq!(rgb_to_hsv(30, 30, 30), Hsv::new(0, 0, 30));
        assert_eq!(rgb_to_hsv(0, 0, 0), Hsv::new(0, 0, 0));
    }

    #[test]
    fn magenta_side_of_red_wraps_high() {
        let hsv = rgb_to_hsv(255, 0, 40);
        assert!(hsv.h >= 170, "hue {}", hsv.h);
    }

    #[test]
    fn in_range_is_inclusive() {
        let mut img = RgbImage::from_pixel(2, 1, Rgb([255, 255, 255]));
        img.put_pixel(1, 0, Rgb([255, 0, 0]));
        let hsv = to_hsv(&img);
        let mask = in_range(&hsv, Hsv::new(0, 50, 50), Hsv::new(10, 255, 255));
        assert_eq!(mask.get_pixel(0, 0)[0], 0);
        assert_eq!(mask.get_pixel(1, 0)[0], 255);
    }
}
