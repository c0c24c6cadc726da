//! Polygon primitives used to classify pixels into lanes.
//!
//! Polygons are ordered vertex lists that are implicitly closed (the last
//! vertex connects back to the first). Containment uses even-odd ray casting
//! towards `+x`; with that rule the left and top edges of an axis-aligned
//! rectangle are inside while the right and bottom edges are outside, so two
//! rectangles sharing an edge partition the pixel grid without overlap.

use nalgebra::Point2;

/// Area of a polygon via the shoelace formula.
///
/// Winding is discarded, so the result is never negative. Fewer than three
/// points yield `0.0`. Self-intersecting polygons get whatever the signed sum
/// produces (a symmetric bow-tie has zero area).
pub fn polygon_area(points: &[Point2<f32>]) -> f32 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let twice_signed: f64 = (0..n)
        .map(|i| {
            let p0 = points[i];
            let p1 = points[(i + 1) % n];
            p0.x as f64 * p1.y as f64 - p1.x as f64 * p0.y as f64
        })
        .sum();

    (twice_signed.abs() * 0.5) as f32
}

/// Even-odd containment test for an implicitly closed polygon.
///
/// Allocation free, but recomputes every edge slope. Prefer [`Polygon`] when
/// the same polygon is queried many times.
pub fn point_in_polygon(points: &[Point2<f32>], x: f32, y: f32) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut prev = points[n - 1];
    for &cur in points {
        if let Some(edge) = Edge::between(prev, cur) {
            if edge.crossed_by(x, y) {
                inside = !inside;
            }
        }
        prev = cur;
    }
    inside
}

/// Non-horizontal polygon edge with its inverse slope cached.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Edge {
    x0: f32,
    y0: f32,
    y1: f32,
    dx_dy: f32,
}

impl Edge {
    /// `None` for horizontal edges, which never cross a horizontal ray.
    #[inline]
    fn between(a: Point2<f32>, b: Point2<f32>) -> Option<Self> {
        if a.y == b.y {
            return None;
        }
        Some(Self {
            x0: a.x,
            y0: a.y,
            y1: b.y,
            dx_dy: (b.x - a.x) / (b.y - a.y),
        })
    }

    /// Whether the ray from `(x, y)` towards `+x` crosses this edge.
    #[inline]
    fn crossed_by(&self, x: f32, y: f32) -> bool {
        (self.y0 > y) != (self.y1 > y) && x < self.x0 + (y - self.y0) * self.dx_dy
    }
}

/// Closed polygon with a precomputed edge list for repeated containment tests.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point2<f32>>,
    edges: Vec<Edge>,
    min_y: f32,
    max_y: f32,
}

impl Polygon {
    pub fn new(vertices: &[Point2<f32>]) -> Self {
        let mut polygon = Self::default();
        polygon.rebuild(vertices);
        polygon
    }

    /// Replace the vertices, reusing the existing allocations.
    pub fn rebuild(&mut self, vertices: &[Point2<f32>]) {
        self.vertices.clear();
        self.vertices.extend_from_slice(vertices);

        self.edges.clear();
        if vertices.len() >= 3 {
            let mut prev = vertices[vertices.len() - 1];
            for &cur in vertices {
                self.edges.extend(Edge::between(prev, cur));
                prev = cur;
            }
        }

        self.min_y = vertices.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        self.max_y = vertices
            .iter()
            .map(|p| p.y)
            .fold(f32::NEG_INFINITY, f32::max);
    }

    pub fn vertices(&self) -> &[Point2<f32>] {
        &self.vertices
    }

    pub fn area(&self) -> f32 {
        polygon_area(&self.vertices)
    }

    /// Same answer as [`point_in_polygon`] on the vertex list.
    #[inline]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        // No edge can straddle a row outside [min_y, max_y).
        if !(y >= self.min_y && y < self.max_y) {
            return false;
        }
        self.edges
            .iter()
            .fold(false, |inside, edge| inside ^ edge.crossed_by(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pts(raw: &[[f32; 2]]) -> Vec<Point2<f32>> {
        raw.iter().map(|&[x, y]| Point2::new(x, y)).collect()
    }

    #[test]
    fn rectangle_area_ignores_start_vertex_and_winding() {
        let rect = pts(&[[0.0, 0.0], [10.0, 0.0], [10.0, 5.0], [0.0, 5.0]]);
        assert_relative_eq!(polygon_area(&rect), 50.0);

        for shift in 1..rect.len() {
            let mut rotated = rect.clone();
            rotated.rotate_left(shift);
            assert_relative_eq!(polygon_area(&rotated), 50.0);
        }

        let mut reversed = rect.clone();
        reversed.reverse();
        assert_relative_eq!(polygon_area(&reversed), 50.0);
    }

    #[test]
    fn area_is_translation_invariant() {
        let quad = pts(&[[1.0, 2.0], [9.0, 1.0], [12.0, 7.5], [0.5, 6.0]]);
        let moved: Vec<_> = quad
            .iter()
            .map(|p| Point2::new(p.x + 300.0, p.y - 120.0))
            .collect();
        assert_relative_eq!(polygon_area(&quad), polygon_area(&moved), epsilon = 1e-3);
    }

    #[test]
    fn degenerate_inputs_have_zero_area() {
        assert_eq!(polygon_area(&[]), 0.0);
        assert_eq!(polygon_area(&pts(&[[0.0, 0.0], [4.0, 4.0]])), 0.0);
        let collinear = pts(&[[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [3.0, 3.0]]);
        assert_eq!(polygon_area(&collinear), 0.0);
    }

    #[test]
    fn bow_tie_area_cancels() {
        let bow_tie = pts(&[[0.0, 0.0], [4.0, 4.0], [4.0, 0.0], [0.0, 4.0]]);
        assert_eq!(polygon_area(&bow_tie), 0.0);
    }

    #[test]
    fn rectangle_keeps_top_left_edges_only() {
        let rect = pts(&[[0.0, 0.0], [4.0, 0.0], [4.0, 3.0], [0.0, 3.0]]);
        assert!(point_in_polygon(&rect, 0.0, 0.0));
        assert!(point_in_polygon(&rect, 3.0, 2.0));
        assert!(point_in_polygon(&rect, 0.0, 2.5));
        assert!(!point_in_polygon(&rect, 4.0, 1.0));
        assert!(!point_in_polygon(&rect, 1.0, 3.0));
        assert!(!point_in_polygon(&rect, -0.5, 1.0));

        let inside = (0..3)
            .flat_map(|y| (0..4).map(move |x| (x as f32, y as f32)))
            .filter(|&(x, y)| point_in_polygon(&rect, x, y))
            .count();
        assert_eq!(inside, 12);
    }

    #[test]
    fn adjacent_rectangles_partition_pixels() {
        let left = Polygon::new(&pts(&[[0.0, 0.0], [5.0, 0.0], [5.0, 4.0], [0.0, 4.0]]));
        let right = Polygon::new(&pts(&[[5.0, 0.0], [10.0, 0.0], [10.0, 4.0], [5.0, 4.0]]));
        for y in 0..4 {
            for x in 0..10 {
                let (x, y) = (x as f32, y as f32);
                assert!(
                    left.contains(x, y) ^ right.contains(x, y),
                    "pixel ({x}, {y}) must belong to exactly one lane"
                );
            }
        }
    }

    #[test]
    fn cached_polygon_matches_free_function() {
        let quad = pts(&[[3.0, 1.0], [17.0, 4.0], [14.0, 15.0], [1.0, 11.0]]);
        let polygon = Polygon::new(&quad);
        for y in -1..18 {
            for x in -1..20 {
                let (x, y) = (x as f32, y as f32);
                assert_eq!(polygon.contains(x, y), point_in_polygon(&quad, x, y));
            }
        }
        assert_relative_eq!(polygon.area(), polygon_area(&quad));
    }

    #[test]
    fn rebuild_replaces_previous_shape() {
        let mut polygon = Polygon::new(&pts(&[[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0]]));
        assert!(polygon.contains(1.0, 1.0));
        polygon.rebuild(&pts(&[[10.0, 10.0], [12.0, 10.0], [12.0, 12.0], [10.0, 12.0]]));
        assert!(!polygon.contains(1.0, 1.0));
        assert!(polygon.contains(11.0, 11.0));
    }

    #[test]
    fn too_few_vertices_contain_nothing() {
        let line = pts(&[[0.0, 0.0], [5.0, 5.0]]);
        assert!(!point_in_polygon(&line, 1.0, 1.0));
        let polygon = Polygon::new(&line);
        assert_eq!(polygon.area(), 0.0);
        assert!(!polygon.contains(1.0, 1.0));
    }
}
