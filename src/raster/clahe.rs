//! Contrast limited adaptive histogram equalization for grayscale pages.
//!
//! The page is split into a grid of tiles. Each tile gets its own clipped
//! histogram equalization table and every output pixel bilinearly blends the
//! tables of the four nearest tile centers, which keeps tile seams invisible.

use image::GrayImage;

const BINS: usize = 256;

/// CLAHE tuning parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClaheParams {
    /// Histogram clip limit relative to a flat histogram; `<= 0` disables clipping.
    pub clip_limit: f32,
    /// Tile grid size as `(columns, rows)`.
    pub tiles: (u32, u32),
}

impl Default for ClaheParams {
    fn default() -> Self {
        Self {
            clip_limit: 2.0,
            tiles: (8, 8),
        }
    }
}

/// Applies CLAHE and returns the equalized page.
pub fn clahe(img: &GrayImage, params: ClaheParams) -> GrayImage {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return img.clone();
    }

    let tile_w = width.div_ceil(params.tiles.0.max(1));
    let tile_h = height.div_ceil(params.tiles.1.max(1));
    let tiles_x = width.div_ceil(tile_w) as usize;
    let tiles_y = height.div_ceil(tile_h) as usize;

    let mut luts = vec![[0u8; BINS]; tiles_x * tiles_y];
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let x0 = tx as u32 * tile_w;
            let y0 = ty as u32 * tile_h;
            let x1 = (x0 + tile_w).min(width);
            let y1 = (y0 + tile_h).min(height);
            luts[ty * tiles_x + tx] = tile_lut(img, x0, y0, x1, y1, params.clip_limit);
        }
    }

    let inv_tw = 1.0 / tile_w as f32;
    let inv_th = 1.0 / tile_h as f32;
    let mut out = GrayImage::new(width, height);
    for y in 0..height {
        let tyf = y as f32 * inv_th - 0.5;
        let ty1f = tyf.floor();
        let ya = tyf - ty1f;
        let ty1 = (ty1f as i64).clamp(0, tiles_y as i64 - 1) as usize;
        let ty2 = ((ty1f as i64) + 1).clamp(0, tiles_y as i64 - 1) as usize;

        for x in 0..width {
            let txf = x as f32 * inv_tw - 0.5;
            let tx1f = txf.floor();
            let xa = txf - tx1f;
            let tx1 = (tx1f as i64).clamp(0, tiles_x as i64 - 1) as usize;
            let tx2 = ((tx1f as i64) + 1).clamp(0, tiles_x as i64 - 1) as usize;

            let v = img.get_pixel(x, y)[0] as usize;
            let l11 = f32::from(luts[ty1 * tiles_x + tx1][v]);
            let l12 = f32::from(luts[ty1 * tiles_x + tx2][v]);
            let l21 = f32::from(luts[ty2 * tiles_x + tx1][v]);
            let l22 = f32::from(luts[ty2 * tiles_x + tx2][v]);

            let top = l11 * (1.0 - xa) + l12 * xa;
            let bottom = l21 * (1.0 - xa) + l22 * xa;
            let value = top * (1.0 - ya) + bottom * ya;
            out.put_pixel(x, y, image::Luma([value.round().clamp(0.0, 255.0) as u8]));
        }
    }
    out
}

fn tile_lut(img: &GrayImage, x0: u32, y0: u32, x1: u32, y1: u32, clip_limit: f32) -> [u8; BINS] {
    let mut hist = [0u32; BINS];
    for y in y0..y1 {
        for x in x0..x1 {
            hist[img.get_pixel(x, y)[0] as usize] += 1;
        }
    }
    let area = (x1 - x0) * (y1 - y0);

    if clip_limit > 0.0 {
        let limit = ((clip_limit * area as f32 / BINS as f32) as u32).max(1);
        clip_histogram(&mut hist, limit);
    }

    let scale = 255.0 / area.max(1) as f32;
    let mut lut = [0u8; BINS];
    let mut cdf = 0u32;
    for (bin, slot) in hist.iter().zip(lut.iter_mut()) {
        cdf += bin;
        *slot = (cdf as f32 * scale).round().min(255.0) as u8;
    }
    lut
}

/// Clips histogram bins at `limit` and spreads the excess over all bins.
fn clip_histogram(hist: &mut [u32; BINS], limit: u32) {
    let mut excess = 0u32;
    for bin in hist.iter_mut() {
        if *bin > limit {
            excess += *bin - limit;
            *bin = limit;
        }
    }

    let batch = excess / BINS as u32;
    let mut residual = excess as usize % BINS;
    for bin in hist.iter_mut() {
        *bin += batch;
    }
    if residual > 0 {
        let step = (BINS / residual).max(1);
        let mut i = 0;
        while i < BINS && residual > 0 {
            hist[i] += 1;
            residual -= 1;
            i += step;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{clahe, clip_histogram, ClaheParams, BINS};
    use image::{GrayImage, Luma};

    #[test]
    fn uniform_page_is_unchanged_at_extremes() {
        let white = GrayImage::from_pixel(64, 48, Luma([255]));
        let out = clahe(&white, ClaheParams::default());
        assert!(out.pixels().all(|p| p[0] == 255));
    }

    #[test]
    fn preserves_dimensions_for_odd_sizes() {
        let img = GrayImage::from_fn(37, 5, |x, y| Luma([((x * 7 + y * 3) % 256) as u8]));
        let out = clahe(&img, ClaheParams::default());
        assert_eq!(out.dimensions(), (37, 5));
    }

    #[test]
    fn dark_ink_stays_darker_than_paper() {
        let mut img = GrayImage::from_pixel(80, 80, Luma([240]));
        for y in 30..50 {
            for x in 30..50 {
                img.put_pixel(x, y, Luma([20]));
            }
        }
        let out = clahe(&img, ClaheParams::default());
        assert!(out.get_pixel(40, 40)[0] < out.get_pixel(5, 5)[0]);
    }

    #[test]
    fn clipping_conserves_mass() {
        let mut hist = [0u32; BINS];
        hist[10] = 1000;
        hist[200] = 3;
        clip_histogram(&mut hist, 20);
        let total: u32 = hist.iter().sum();
        assert_eq!(total, 1003);
        assert!(hist[10] <= 20 + 4);
    }
}
