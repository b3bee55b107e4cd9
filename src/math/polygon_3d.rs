use super::{Point3, Vector2, Vector3, TOLERANCE};

/// Computes the unit normal of a closed polygon using Newell's method.
///
/// The normal follows the right-hand rule over the point order, so a
/// counter-clockwise loop seen from above yields an upward normal.
/// Returns `None` for degenerate polygons (collinear or coincident points).
#[must_use]
pub fn newell_normal(points: &[Point3]) -> Option<Vector3> {
    let n = points.len();
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let curr = &points[i];
        let next = &points[(i + 1) % n];
        normal.x += (curr.y - next.y) * (curr.z + next.z);
        normal.y += (curr.z - next.z) * (curr.x + next.x);
        normal.z += (curr.x - next.x) * (curr.y + next.y);
    }
    let len = normal.norm();
    if len < TOLERANCE {
        return None;
    }
    Some(normal / len)
}

/// Arithmetic mean of a set of points, or the origin for an empty set.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn centroid(points: &[Point3]) -> Point3 {
    if points.is_empty() {
        return Point3::origin();
    }
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Point3::from(sum / points.len() as f64)
}

/// Planar texture projection of `point` onto the `u_axis`/`v_axis` plane.
///
/// `scale` is the number of object-space units covered by one texture repeat.
#[must_use]
pub fn planar_uv(point: &Point3, u_axis: &Vector3, v_axis: &Vector3, scale: f64) -> Vector2 {
    let p = point.coords / scale;
    Vector2::new(u_axis.dot(&p), v_axis.dot(&p))
}
