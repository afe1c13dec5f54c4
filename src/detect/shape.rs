//! Outline geometry shared by the contour and color detectors.

use image::{GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType};
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometry::{arc_length, convex_hull};
use imageproc::point::Point;

/// Measurements of one external outline.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Shape {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Polygon area enclosed by the outline through pixel centres.
    pub area: f64,
    /// Closed outline length.
    pub perimeter: f64,
    /// Area of the convex hull of the outline.
    pub hull_area: f64,
}

impl Shape {
    /// Measures an outline. Returns `None` for an empty point list.
    pub fn from_points(points: &[Point<i32>]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        let hull = convex_hull(points);
        Some(Self {
            x: min_x.max(0) as u32,
            y: min_y.max(0) as u32,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
            area: polygon_area(points),
            perimeter: arc_length(points, true),
            hull_area: polygon_area(&hull),
        })
    }

    /// True for outlines that enclose nothing or have no length.
    pub fn is_degenerate(&self) -> bool {
        self.area <= 0.0 || self.perimeter <= 0.0
    }

    /// Bounding box area in pixels.
    pub fn bbox_area(&self) -> f64 {
        f64::from(self.width) * f64::from(self.height)
    }

    /// Bounding box width over height.
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

/// Shoelace area of a closed polygon.
pub(crate) fn polygon_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice = 0i64;
    for (i, p) in points.iter().enumerate() {
        let q = &points[(i + 1) % points.len()];
        twice += i64::from(p.x) * i64::from(q.y) - i64::from(q.x) * i64::from(p.y);
    }
    twice.abs() as f64 / 2.0
}

/// Measures every outermost outline of the foreground (non-zero) pixels.
pub(crate) fn external_shapes(binary: &GrayImage) -> Vec<Shape> {
    find_contours::<i32>(binary)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .filter_map(|c| Shape::from_points(&c.points))
        .collect()
}

/// Inverse adaptive threshold against a Gaussian-weighted local mean.
///
/// A pixel becomes foreground (255) when it is at least `offset` darker than
/// its neighbourhood.
pub(crate) fn adaptive_threshold_inv(gray: &GrayImage, sigma: f32, offset: f32) -> GrayImage {
    let local_mean = gaussian_blur_f32(gray, sigma);
    let mut out = GrayImage::new(gray.width(), gray.height());
    for (x, y, pixel) in gray.enumerate_pixels() {
        let mean = f32::from(local_mean.get_pixel(x, y)[0]);
        if f32::from(pixel[0]) <= mean - offset {
            out.put_pixel(x, y, Luma([255]));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{adaptive_threshold_inv, external_shapes, polygon_area, Shape};
    use image::{GrayImage, Luma};
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::point::Point;
    use imageproc::rect::Rect;

    #[test]
    fn shoelace_area_of_rectangle() {
        let pts = [
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 4),
            Point::new(0, 4),
        ];
        assert_eq!(polygon_area(&pts), 40.0);
        assert_eq!(polygon_area(&pts[..2]), 0.0);
    }

    #[test]
    fn bounding_box_is_inclusive() {
        let pts = [Point::new(2, 3), Point::new(6, 3), Point::new(6, 5), Point::new(2, 5)];
        let shape = Shape::from_points(&pts).unwrap();
        assert_eq!((shape.x, shape.y, shape.width, shape.height), (2, 3, 5, 3));
        assert_eq!(shape.area, 8.0);
        assert_eq!(shape.hull_area, 8.0);
        assert!((shape.perimeter - 12.0).abs() < 1e-9);
        assert!(Shape::from_points(&[]).is_none());
    }

    #[test]
    fn nested_outlines_are_not_external() {
        let mut img = GrayImage::new(40, 40);
        draw_filled_rect_mut(&mut img, Rect::at(5, 5).of_size(30, 30), Luma([255]));
        draw_filled_rect_mut(&mut img, Rect::at(10, 10).of_size(20, 20), Luma([0]));
        draw_filled_rect_mut(&mut img, Rect::at(15, 15).of_size(10, 10), Luma([255]));

        let shapes = external_shapes(&img);
        assert_eq!(shapes.len(), 1);
        assert_eq!((shapes[0].x, shapes[0].y), (5, 5));
        assert_eq!((shapes[0].width, shapes[0].height), (30, 30));
    }

    #[test]
    fn dark_strokes_become_foreground() {
        let mut img = GrayImage::from_pixel(30, 30, Luma([255]));
        draw_filled_rect_mut(&mut img, Rect::at(10, 0).of_size(3, 30), Luma([0]));
        let binary = adaptive_threshold_inv(&img, 2.0, 2.0);
        assert_eq!(binary.get_pixel(11, 15)[0], 255);
        assert_eq!(binary.get_pixel(20, 15)[0], 0);
        assert_eq!(binary.get_pixel(2, 2)[0], 0);
    }
}
