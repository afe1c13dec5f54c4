//! Grayscale pyramids for coarse-to-fine template search.
//!
//! Each level halves the previous one with a 2x2 box filter and integer
//! rounding: `dst = ((a + b + c + d) + 2) / 4`. A trailing odd row or column
//! is dropped. Pages and templates are reduced with the same filter so their
//! levels stay comparable.

use image::GrayImage;

/// Halves an image with the rounding 2x2 box filter.
///
/// Returns `None` when either side is shorter than 2 pixels.
pub fn downsample_box(src: &GrayImage) -> Option<GrayImage> {
    let (width, height) = src.dimensions();
    if width < 2 || height < 2 {
        return None;
    }
    let dst_width = width / 2;
    let dst_height = height / 2;
    let stride = width as usize;

    let mut dst = Vec::with_capacity(dst_width as usize * dst_height as usize);
    for rows in src.as_raw().chunks_exact(stride * 2).take(dst_height as usize) {
        let (row0, row1) = rows.split_at(stride);
        for (top, bottom) in row0
            .chunks_exact(2)
            .zip(row1.chunks_exact(2))
            .take(dst_width as usize)
        {
            let sum = u16::from(top[0]) + u16::from(top[1]) + u16::from(bottom[0]) + u16::from(bottom[1]);
            dst.push(((sum + 2) / 4) as u8);
        }
    }
    GrayImage::from_raw(dst_width, dst_height, dst)
}

/// Owned pyramid; level 0 is the base resolution.
#[derive(Clone, Debug)]
pub struct GrayPyramid {
    levels: Vec<GrayImage>,
}

impl GrayPyramid {
    /// Builds up to `max_levels` levels from `base`.
    ///
    /// `max_levels` is clamped to at least 1 so the base is always present.
    /// Reduction stops early once a level can no longer be halved.
    pub fn build(base: &GrayImage, max_levels: usize) -> Self {
        let max_levels = max_levels.max(1);
        let mut levels = Vec::with_capacity(max_levels);
        levels.push(base.clone());
        while levels.len() < max_levels {
            let Some(next) = levels.last().and_then(downsample_box) else {
                break;
            };
            levels.push(next);
        }
        Self { levels }
    }

    /// All levels, finest first.
    pub fn levels(&self) -> &[GrayImage] {
        &self.levels
    }

    /// One level, if present.
    pub fn level(&self, index: usize) -> Option<&GrayImage> {
        self.levels.get(index)
    }

    /// Number of levels.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Always false; the base level is kept.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{downsample_box, GrayPyramid};
    use image::{GrayImage, Luma};

    #[test]
    fn box_filter_rounds_to_nearest() {
        let src = GrayImage::from_raw(4, 2, vec![0, 1, 10, 10, 1, 1, 10, 11]).unwrap();
        let dst = downsample_box(&src).unwrap();
        assert_eq!(dst.dimensions(), (2, 1));
        // (0 + 1 + 1 + 1 + 2) / 4 = 1, (10 + 10 + 10 + 11 + 2) / 4 = 10
        assert_eq!(dst.as_raw(), &vec![1, 10]);
    }

    #[test]
    fn odd_edges_are_dropped() {
        let src = GrayImage::from_pixel(5, 7, Luma([90]));
        let dst = downsample_box(&src).unwrap();
        assert_eq!(dst.dimensions(), (2, 3));
        assert!(dst.pixels().all(|p| p[0] == 90));
        assert!(downsample_box(&GrayImage::new(1, 8)).is_none());
    }

    #[test]
    fn pyramid_stops_when_level_cannot_halve() {
        let base = GrayImage::new(12, 9);
        let pyramid = GrayPyramid::build(&base, 10);
        let dims: Vec<_> = pyramid.levels().iter().map(|l| l.dimensions()).collect();
        assert_eq!(dims, vec![(12, 9), (6, 4), (3, 2), (1, 1)]);
    }

    #[test]
    fn zero_levels_keeps_base() {
        let base = GrayImage::new(8, 8);
        let pyramid = GrayPyramid::build(&base, 0);
        assert_eq!(pyramid.len(), 1);
        assert_eq!(pyramid.level(0).map(|l| l.dimensions()), Some((8, 8)));
    }
}
