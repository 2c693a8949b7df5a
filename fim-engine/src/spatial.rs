//! Point-in-polygon test over a single planar ring.
//!
//! Crossing-number test with an inclusive boundary: a point lying on an edge
//! or a vertex counts as inside. Rings are validated once when built, so the
//! per-record test cannot fail.

use fim_model::{GeometryError, Location};

/// Distance (in coordinate units) within which a point counts as on an edge.
pub const ON_EDGE_TOLERANCE: f64 = 1e-12;

/// A validated, closed polygon ring ready for containment tests.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    vertices: Vec<Location>,
    min: Location,
    max: Location,
}

impl Ring {
    /// Validate a ring of (lon, lat) vertices.
    ///
    /// A repeated closing vertex and consecutive duplicates are dropped. Fails
    /// for non-finite coordinates, fewer than three distinct vertices, or a
    /// ring enclosing no area.
    pub fn new(vertices: &[Location]) -> Result<Ring, GeometryError> {
        if let Some(index) = vertices.iter().position(|v| !v.is_finite()) {
            return Err(GeometryError::NonFiniteCoordinate { index });
        }

        let mut ring: Vec<Location> = Vec::with_capacity(vertices.len());
        for v in vertices {
            if ring.last() != Some(v) {
                ring.push(*v);
            }
        }
        while ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        if ring.len() < 3 {
            return Err(GeometryError::TooFewVertices { found: ring.len() });
        }

        let mut min = ring[0];
        let mut max = ring[0];
        for v in &ring {
            min.lon = min.lon.min(v.lon);
            min.lat = min.lat.min(v.lat);
            max.lon = max.lon.max(v.lon);
            max.lat = max.lat.max(v.lat);
        }
        let extent = (max.lon - min.lon).max(max.lat - min.lat);
        if signed_area(&ring).abs() <= ON_EDGE_TOLERANCE * extent * extent {
            return Err(GeometryError::ZeroArea);
        }

        Ok(Ring {
            vertices: ring,
            min,
            max,
        })
    }

    pub fn vertices(&self) -> &[Location] {
        &self.vertices
    }

    /// Shoelace area; positive for counter-clockwise rings.
    pub fn signed_area(&self) -> f64 {
        signed_area(&self.vertices)
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: Location) -> bool {
        if !point.is_finite()
            || point.lon < self.min.lon
            || point.lon > self.max.lon
            || point.lat < self.min.lat
            || point.lat > self.max.lat
        {
            return false;
        }

        let n = self.vertices.len();
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let a = self.vertices[j];
            let b = self.vertices[i];
            if on_segment(point, a, b) {
                return true;
            }
            if (b.lat > point.lat) != (a.lat > point.lat) {
                let crossing = (a.lon - b.lon) * (point.lat - b.lat) / (a.lat - b.lat) + b.lon;
                if point.lon < crossing {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}

/// One-shot containment test. Prefer building a [`Ring`] once when testing many points.
pub fn point_in_polygon(point: Location, ring: &[Location]) -> Result<bool, GeometryError> {
    Ok(Ring::new(ring)?.contains(point))
}

fn signed_area(ring: &[Location]) -> f64 {
    let n = ring.len();
    let mut twice_area = 0.0;
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        twice_area += a.lon * b.lat - b.lon * a.lat;
    }
    twice_area / 2.0
}

fn on_segment(p: Location, a: Location, b: Location) -> bool {
    let dx = b.lon - a.lon;
    let dy = b.lat - a.lat;
    let cross = dx * (p.lat - a.lat) - dy * (p.lon - a.lon);
    let length = dx.hypot(dy);
    if cross.abs() > ON_EDGE_TOLERANCE * length.max(f64::MIN_POSITIVE) {
        return false;
    }
    p.lon >= a.lon.min(b.lon)
        && p.lon <= a.lon.max(b.lon)
        && p.lat >= a.lat.min(b.lat)
        && p.lat <= a.lat.max(b.lat)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(lon: f64, lat: f64) -> Location {
        Location::new(lon, lat)
    }

    fn unit_square() -> Vec<Location> {
        vec![loc(0.0, 0.0), loc(1.0, 0.0), loc(1.0, 1.0), loc(0.0, 1.0)]
    }

    #[test]
    fn test_unit_square_contains_center_not_outside() {
        let square = unit_square();
        assert_eq!(point_in_polygon(loc(0.5, 0.5), &square), Ok(true));
        assert_eq!(point_in_polygon(loc(2.0, 2.0), &square), Ok(false));
        assert_eq!(point_in_polygon(loc(-0.1, 0.5), &square), Ok(false));
    }

    #[test]
    fn test_boundary_points_are_inside() {
        let ring = Ring::new(&unit_square()).unwrap();
        assert!(ring.contains(loc(1.0, 0.5)));
        assert!(ring.contains(loc(0.5, 0.0)));
        assert!(ring.contains(loc(0.0, 0.0)));
        assert!(ring.contains(loc(1.0, 1.0)));
        assert!(ring.contains(loc(0.0, 0.7)));
        assert!(!ring.contains(loc(1.0 + 1e-6, 0.5)));
    }

    #[test]
    fn test_diagonal_edge_is_inclusive() {
        let triangle = Ring::new(&[loc(0.0, 0.0), loc(4.0, 0.0), loc(0.0, 4.0)]).unwrap();
        assert!(triangle.contains(loc(2.0, 2.0)));
        assert!(triangle.contains(loc(1.0, 1.0)));
        assert!(!triangle.contains(loc(2.5, 2.5)));
    }

    #[test]
    fn test_concave_ring() {
        // U shape opening upwards
        let u = Ring::new(&[
            loc(0.0, 0.0),
            loc(3.0, 0.0),
            loc(3.0, 3.0),
            loc(2.0, 3.0),
            loc(2.0, 1.0),
            loc(1.0, 1.0),
            loc(1.0, 3.0),
            loc(0.0, 3.0),
        ])
        .unwrap();
        assert!(u.contains(loc(0.5, 2.5)));
        assert!(u.contains(loc(2.5, 2.5)));
        assert!(!u.contains(loc(1.5, 2.0)));
        assert!(u.contains(loc(1.5, 0.5)));
    }

    #[test]
    fn test_closed_ring_equals_open_ring() {
        let mut closed = unit_square();
        closed.push(loc(0.0, 0.0));
        let a = Ring::new(&closed).unwrap();
        let b = Ring::new(&unit_square()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.vertices().len(), 4);
        assert_eq!(a.signed_area(), 1.0);
    }

    #[test]
    fn test_degenerate_rings_fail() {
        assert_eq!(
            Ring::new(&[loc(0.0, 0.0), loc(1.0, 1.0)]),
            Err(GeometryError::TooFewVertices { found: 2 })
        );
        assert_eq!(
            Ring::new(&[loc(0.0, 0.0), loc(1.0, 1.0), loc(0.0, 0.0)]),
            Err(GeometryError::TooFewVertices { found: 2 })
        );
        assert_eq!(
            Ring::new(&[loc(0.0, 0.0), loc(1.0, 1.0), loc(2.0, 2.0)]),
            Err(GeometryError::ZeroArea)
        );
        assert_eq!(
            Ring::new(&[loc(0.0, 0.0), loc(f64::NAN, 1.0), loc(2.0, 0.0)]),
            Err(GeometryError::NonFiniteCoordinate { index: 1 })
        );
        assert!(point_in_polygon(loc(0.0, 0.0), &[]).is_err());
    }

    #[test]
    fn test_non_finite_point_is_outside() {
        let ring = Ring::new(&unit_square()).unwrap();
        assert!(!ring.contains(loc(f64::NAN, 0.5)));
    }

    #[test]
    fn test_city_scale_coordinates() {
        let lasso = Ring::new(&[
            loc(-3.20, 55.94),
            loc(-3.17, 55.94),
            loc(-3.17, 55.96),
            loc(-3.20, 55.96),
        ])
        .unwrap();
        assert!(lasso.contains(loc(-3.1883, 55.9533)));
        assert!(!lasso.contains(loc(-3.25, 55.9533)));
    }
}
