use crate::domain::model::{PointSet, Triangle, TriangulationResult};
use crate::utils::error::{Result, TriangulatorError};

/// Fan triangulation anchored at the first point.
///
/// Emits `(p0, p[i], p[i+1])` for every `i` in `1..n-1`, giving exactly
/// `n - 2` triangles. Only convex, simple polygons in boundary order are
/// triangulated correctly. Concave input may produce overlapping or
/// inverted triangles, and repeated or collinear consecutive points produce
/// zero-area triangles; none of these are filtered.
pub fn triangulate(point_set: &PointSet) -> Result<TriangulationResult> {
    let points = &point_set.points;
    if points.len() < 3 {
        return Err(TriangulatorError::InsufficientPoints {
            count: points.len(),
        });
    }

    let anchor = points[0];
    let triangles = points[1..]
        .windows(2)
        .map(|pair| Triangle::new(anchor, pair[0], pair[1]))
        .collect::<Vec<_>>();

    tracing::debug!(
        "Triangulated point set {} into {} triangles",
        point_set.id,
        triangles.len()
    );

    Ok(TriangulationResult::new(triangles))
}
