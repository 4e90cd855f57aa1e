// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! Helpers shared by gesture handling, validation and rendering. All
//! inputs and outputs are in the same coordinate space.

use crate::models::annotation::{BoundingBox, Point};

/// Axis-aligned rectangle spanned by two opposite corners, in any order.
pub fn rect_from_corners(a: Point, b: Point) -> BoundingBox {
    BoundingBox {
        x: a.x.min(b.x),
        y: a.y.min(b.y),
        width: (a.x - b.x).abs(),
        height: (a.y - b.y).abs(),
    }
}

/// Unsigned area enclosed by a polygon (shoelace formula).
pub fn polygon_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice: f64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(p, q)| p.x * q.y - q.x * p.y)
        .sum();
    twice.abs() / 2.0
}

/// Smallest rectangle containing all points.
pub fn bounds(points: &[Point]) -> Option<BoundingBox> {
    let first = points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in &points[1..] {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Some(BoundingBox::new(min_x, min_y, max_x - min_x, max_y - min_y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_from_corners_any_order() {
        let a = Point::new(50.0, 10.0);
        let b = Point::new(20.0, 40.0);

        let r1 = rect_from_corners(a, b);
        let r2 = rect_from_corners(b, a);

        assert_eq!(r1, r2);
        assert_eq!(r1, BoundingBox::new(20.0, 10.0, 30.0, 30.0));
    }

    #[test]
    fn test_polygon_area() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        assert!((polygon_area(&square) - 100.0).abs() < 0.0001);

        // Winding direction does not matter
        let mut reversed = square;
        reversed.reverse();
        assert!((polygon_area(&reversed) - 100.0).abs() < 0.0001);

        assert_eq!(polygon_area(&square[..2]), 0.0);
    }

    #[test]
    fn test_bounds() {
        assert_eq!(bounds(&[]), None);

        let pts = [Point::new(3.0, 8.0), Point::new(-2.0, 4.0), Point::new(6.0, 1.0)];
        assert_eq!(bounds(&pts), Some(BoundingBox::new(-2.0, 1.0, 8.0, 7.0)));
    }
}
