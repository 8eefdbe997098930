// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vector and plane math used by the mesh algorithms.
//!
//! Points and directions are both `nalgebra::Vector3<f64>`; the mesh never
//! needs the affine distinction `Point3` would add.

use nalgebra::Vector3;

use crate::error::{Error, Result};

/// 3D coordinate / direction.
pub type Vec3 = Vector3<f64>;

/// Squared length below which a normal is treated as degenerate.
const DEGENERATE_NORMAL_SQ: f64 = 1e-24;

/// An infinite plane given by a point on it and a unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub point: Vec3,
    pub normal: Vec3,
}

impl Plane {
    /// Creates a plane from a point and a (not necessarily unit) normal.
    pub fn new(point: Vec3, normal: Vec3) -> Result<Self> {
        let normal = normal
            .try_normalize(DEGENERATE_NORMAL_SQ.sqrt())
            .ok_or(Error::DegeneratePlane)?;
        Ok(Self { point, normal })
    }

    /// Creates the plane through three non-collinear points.
    pub fn from_points(a: &Vec3, b: &Vec3, c: &Vec3) -> Result<Self> {
        let normal = (b - a).cross(&(c - a));
        if normal.norm_squared() < DEGENERATE_NORMAL_SQ {
            return Err(Error::DegeneratePlane);
        }
        Self::new(*a, normal)
    }

    /// Signed distance from `p` to the plane, positive on the normal side.
    pub fn signed_distance(&self, p: &Vec3) -> f64 {
        (p - self.point).dot(&self.normal)
    }

    /// Returns `true` if `p` lies on the plane within `epsilon`.
    pub fn point_on_plane(&self, p: &Vec3, epsilon: f64) -> bool {
        self.signed_distance(p).abs() < epsilon
    }
}

/// Euclidean distance between two points.
pub fn distance(a: &Vec3, b: &Vec3) -> f64 {
    (b - a).norm()
}

/// Arithmetic mean of a set of points, `None` when empty.
pub fn centroid<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Option<Vec3> {
    let mut sum = Vec3::zeros();
    let mut count = 0usize;
    for p in points {
        sum += p;
        count += 1;
    }
    (count > 0).then(|| sum / count as f64)
}

/// Polygon normal by Newell's method, `None` for degenerate outlines.
///
/// The direction follows the right-hand rule over the given winding.
pub fn newell_normal(points: &[Vec3]) -> Option<Vec3> {
    if points.len() < 3 {
        return None;
    }

    let mut normal = Vec3::zeros();
    let n = points.len();
    for i in 0..n {
        let curr = &points[i];
        let next = &points[(i + 1) % n];
        normal.x += (curr.y - next.y) * (curr.z + next.z);
        normal.y += (curr.z - next.z) * (curr.x + next.x);
        normal.z += (curr.x - next.x) * (curr.y + next.y);
    }

    if normal.norm_squared() < DEGENERATE_NORMAL_SQ {
        return None;
    }
    Some(normal.normalize())
}

/// Any unit vector perpendicular to `n`.
pub(crate) fn any_perpendicular(n: &Vec3) -> Vec3 {
    let helper = if n.x.abs() < 0.9 {
        Vec3::x()
    } else {
        Vec3::y()
    };
    n.cross(&helper).normalize()
}

/// Sorts `points` (given by index) counter-clockwise around `normal`,
/// seen from the side the normal points to.
///
/// Returns the permutation of `0..points.len()`.
pub fn angular_order(points: &[Vec3], normal: &Vec3) -> Vec<usize> {
    let Some(center) = centroid(points.iter()) else {
        return Vec::new();
    };
    let normal = normal.normalize();

    // In-plane basis anchored on the first point that is off the axis.
    let u = points
        .iter()
        .map(|p| {
            let d = p - center;
            d - normal * d.dot(&normal)
        })
        .find(|d| d.norm_squared() > DEGENERATE_NORMAL_SQ)
        .map(|d| d.normalize())
        .unwrap_or_else(|| any_perpendicular(&normal));
    let w = normal.cross(&u);

    let mut keyed: Vec<(f64, usize)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let d = p - center;
            let angle = d.dot(&w).atan2(d.dot(&u));
            (angle.rem_euclid(std::f64::consts::TAU), i)
        })
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    keyed.into_iter().map(|(_, i)| i).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn plane_from_points_has_unit_normal() {
        let plane = Plane::from_points(
            &Vec3::new(0.0, 0.0, 1.0),
            &Vec3::new(1.0, 0.0, 1.0),
            &Vec3::new(0.0, 1.0, 1.0),
        )
        .unwrap();
        assert_relative_eq!(plane.normal.norm(), 1.0);
        assert_relative_eq!(plane.normal.z.abs(), 1.0);
    }

    #[test]
    fn collinear_points_have_no_plane() {
        let result = Plane::from_points(
            &Vec3::new(0.0, 0.0, 0.0),
            &Vec3::new(1.0, 1.0, 1.0),
            &Vec3::new(2.0, 2.0, 2.0),
        );
        assert!(matches!(result, Err(Error::DegeneratePlane)));
    }

    #[test]
    fn point_on_plane_respects_epsilon() {
        let plane = Plane::new(Vec3::zeros(), Vec3::new(0.0, 0.0, 2.0)).unwrap();
        assert!(plane.point_on_plane(&Vec3::new(5.0, -3.0, 0.0), 1e-5));
        assert!(plane.point_on_plane(&Vec3::new(5.0, -3.0, -9e-6), 1e-5));
        assert!(!plane.point_on_plane(&Vec3::new(5.0, -3.0, 2e-5), 1e-5));
        assert_relative_eq!(plane.signed_distance(&Vec3::new(0.0, 0.0, -3.0)), -3.0);
    }

    #[test]
    fn newell_normal_of_square() {
        let square = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let n = newell_normal(&square).unwrap();
        assert_relative_eq!(n, Vec3::new(0.0, 0.0, 1.0));
        assert!(newell_normal(&square[..2]).is_none());
    }

    #[test]
    fn centroid_and_distance() {
        let pts = [Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 4.0, 6.0)];
        assert_relative_eq!(centroid(pts.iter()).unwrap(), Vec3::new(1.0, 2.0, 3.0));
        assert!(centroid(std::iter::empty()).is_none());
        assert_relative_eq!(distance(&pts[0], &Vec3::new(3.0, 4.0, 0.0)), 5.0);
    }

    #[test]
    fn angular_order_recovers_ring() {
        // Square corners given in a scrambled order.
        let pts = [
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
        ];
        let order = angular_order(&pts, &Vec3::z());
        assert_eq!(order, vec![0, 2, 1, 3]);

        let reversed = angular_order(&pts, &-Vec3::z());
        assert_eq!(reversed, vec![0, 3, 1, 2]);
    }
}
