use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::config::MeshConfig;
use crate::error::{OperationError, Result, TopologyError};
use crate::math::polygon_3d::{newell_normal, planar_uv};
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::mesh::{to_index, EditableMesh, MeshData, Vertex};
use crate::topology::{find_triangle, MeshPart, PartKey, PartKind};

/// Extrudes a quad face along its normal.
///
/// The face's four positions are duplicated and offset by `distance` along
/// the Newell normal of its outline. The face's two triangles move onto new
/// cap vertices, and four side walls connect the original outline to the
/// cap. Positions, vertices and indices only grow.
pub struct ExtrudeFace {
    part: MeshPart,
    distance: f64,
}

impl ExtrudeFace {
    /// Creates a new `ExtrudeFace` operation.
    #[must_use]
    pub fn new(part: MeshPart, distance: f64) -> Self {
        Self { part, distance }
    }

    /// Executes the extrusion. Afterwards only the new cap face is selected.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if the part is not a face or
    /// the distance is zero, [`OperationError::Failed`] for a degenerate
    /// face, and a [`TopologyError`] if the face no longer matches the mesh.
    pub fn execute(&self, mesh: &mut EditableMesh) -> Result<()> {
        check_distance(self.distance)?;
        let located = locate(mesh.data(), &self.part)?;
        let mut edited = mesh.data().clone();
        let cap = extrude_into(&mut edited, &located, self.distance, mesh.config())?;
        mesh.commit(edited, &HashSet::from([cap]))
    }
}

/// Extrudes every selected face independently.
///
/// Selected faces must not share a triangle. Neighbouring quads on a strip
/// or grid do, and are rejected before anything is changed.
pub struct ExtrudeSelection {
    distance: f64,
}

impl ExtrudeSelection {
    /// Creates a new `ExtrudeSelection` operation.
    #[must_use]
    pub fn new(distance: f64) -> Self {
        Self { distance }
    }

    /// Executes the extrusion. Afterwards the new cap faces are selected.
    ///
    /// Does nothing when no face is selected.
    ///
    /// # Errors
    ///
    /// See [`ExtrudeFace::execute`]. Also returns
    /// [`OperationError::InvalidInput`] if two selected faces share a
    /// triangle. A failure on any face leaves the whole mesh untouched.
    pub fn execute(&self, mesh: &mut EditableMesh) -> Result<()> {
        check_distance(self.distance)?;
        let faces: Vec<MeshPart> = mesh.selection().filter(|p| p.is_face()).copied().collect();
        if faces.is_empty() {
            trace!("extrude with no selected faces");
            return Ok(());
        }

        // Triangles are resolved against the unedited data; extruding one
        // face retargets its triangles, so later lookups would miss them.
        let mut located = Vec::with_capacity(faces.len());
        let mut claimed: HashMap<usize, [u32; 4]> = HashMap::new();
        for face in &faces {
            let next = locate(mesh.data(), face)?;
            for t in next.triangles {
                if let Some(other) = claimed.insert(t, next.corners) {
                    return Err(OperationError::InvalidInput(format!(
                        "faces {other:?} and {:?} share triangle {t} and cannot be extruded together",
                        next.corners
                    ))
                    .into());
                }
            }
            located.push(next);
        }

        let mut edited = mesh.data().clone();
        let mut caps = HashSet::with_capacity(located.len());
        for face in &located {
            caps.insert(extrude_into(&mut edited, face, self.distance, mesh.config())?);
        }
        mesh.commit(edited, &caps)
    }
}

fn check_distance(distance: f64) -> Result<()> {
    if !distance.is_finite() || distance.abs() < TOLERANCE {
        return Err(OperationError::InvalidInput(format!(
            "extrude distance must be finite and non-zero, got {distance}"
        ))
        .into());
    }
    Ok(())
}

/// A face part together with the numbers of its two triangles.
struct LocatedFace {
    corners: [u32; 4],
    triangles: [usize; 2],
}

fn locate(data: &MeshData, part: &MeshPart) -> Result<LocatedFace> {
    let PartKind::Face(corners @ [a, b, c, d]) = part.kind else {
        return Err(OperationError::InvalidInput(format!(
            "only faces can be extruded, got {:?}",
            part.kind
        ))
        .into());
    };

    let stale = |corners: [u32; 3]| TopologyError::StalePart(format!("no triangle {corners:?} for face"));
    let first = find_triangle(&data.indices, [a, b, c]).ok_or_else(|| stale([a, b, c]))?;
    let second = find_triangle(&data.indices, [a, b, d]).ok_or_else(|| stale([a, b, d]))?;
    Ok(LocatedFace {
        corners,
        triangles: [first, second],
    })
}

/// Extrudes a located face inside `data` and returns the key of the new cap.
fn extrude_into(
    data: &mut MeshData,
    face: &LocatedFace,
    distance: f64,
    config: &MeshConfig,
) -> Result<PartKey> {
    let [a, b, c, d] = face.corners;

    // Outline in the triangles' winding: the later triangle runs a -> b.
    let ring = [a, c, b, d];
    let base_positions = [
        data.position_index_of(a)?,
        data.position_index_of(c)?,
        data.position_index_of(b)?,
        data.position_index_of(d)?,
    ];
    let base = [
        data.position(base_positions[0])?,
        data.position(base_positions[1])?,
        data.position(base_positions[2])?,
        data.position(base_positions[3])?,
    ];
    let normal = newell_normal(&base)
        .ok_or_else(|| OperationError::Failed("degenerate face: cannot compute normal".into()))?;
    let offset = normal * distance;
    let top = base.map(|p| p + offset);

    let mut top_positions = [0u32; 4];
    for (k, point) in top.iter().enumerate() {
        top_positions[k] = to_index(data.positions.len())?;
        data.positions.push(*point);
    }

    let mut cap = [0u32; 4];
    for k in 0..4 {
        cap[k] = to_index(data.vertices.len())?;
        let source = data.vertices[ring[k] as usize].clone();
        data.vertices.push(Vertex {
            position: top[k],
            position_index: top_positions[k],
            ..source
        });
    }

    for t in face.triangles {
        for slot in &mut data.indices[t * 3..t * 3 + 3] {
            if let Some(k) = ring.iter().position(|&v| v == *slot) {
                *slot = cap[k];
            }
        }
    }

    for k in 0..4 {
        let j = (k + 1) % 4;
        push_wall(
            data,
            [base[k], base[j], top[j], top[k]],
            [base_positions[k], base_positions[j], top_positions[j], top_positions[k]],
            normal,
            config.uv_scale,
        )?;
    }

    debug!(
        face = ?face.corners,
        distance,
        positions = data.positions.len(),
        vertices = data.vertices.len(),
        indices = data.indices.len(),
        "extruded face"
    );

    Ok(PartKind::Face([cap[0], cap[2], cap[1], cap[3]]).key())
}

/// Appends one side wall quad with its own flat-shaded vertices.
///
/// `corners` run base edge start, base edge end, top edge end, top edge start,
/// which winds the wall away from the extruded volume.
fn push_wall(
    data: &mut MeshData,
    corners: [Point3; 4],
    position_indices: [u32; 4],
    face_normal: Vector3,
    uv_scale: f64,
) -> Result<()> {
    let normal = newell_normal(&corners).unwrap_or(face_normal);
    let tangent = (corners[1] - corners[0])
        .try_normalize(TOLERANCE)
        .unwrap_or_else(Vector3::zeros);
    let bitangent = normal.cross(&tangent);

    let first = to_index(data.vertices.len())?;
    for (point, position_index) in corners.iter().zip(position_indices) {
        data.vertices.push(Vertex {
            position: *point,
            normal,
            tangent,
            texcoord: planar_uv(point, &tangent, &bitangent, uv_scale),
            position_index,
        });
    }
    data.indices
        .extend_from_slice(&[first, first + 1, first + 2, first, first + 2, first + 3]);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::EditMeshError;
    use crate::operations::creation::MakeCube;
    use crate::topology::reconstruct_quads;
    use approx::assert_relative_eq;

    const TOP: PartKey = PartKey::Face([0, 1, 2, 3]);

    fn cube() -> EditableMesh {
        MakeCube::new(Vector3::new(128.0, 128.0, 128.0)).execute().unwrap()
    }

    fn top_index(mesh: &EditableMesh) -> usize {
        mesh.parts().iter().position(|p| p.key() == TOP).unwrap()
    }

    #[test]
    fn extruding_top_face_grows_buffers() {
        let mut mesh = cube();
        mesh.extrude_face(top_index(&mesh), 64.0).unwrap();

        assert_eq!(mesh.positions().len(), 12);
        assert_eq!(mesh.vertices().len(), 24 + 4 + 16);
        assert_eq!(mesh.indices().len(), 36 + 24);
        assert!(mesh.data().validate().is_ok());
        assert_relative_eq!(mesh.bounds().unwrap().max.z, 128.0);
    }

    #[test]
    fn new_positions_are_offset_copies() {
        let mut mesh = cube();
        mesh.extrude_face(top_index(&mesh), 64.0).unwrap();

        // Originals stay put; the four new ones sit directly above the top.
        for p in &mesh.positions()[..8] {
            assert_relative_eq!(p.z.abs(), 64.0);
        }
        for new in &mesh.positions()[8..] {
            assert_relative_eq!(new.z, 128.0);
            assert!(mesh.positions()[..4]
                .iter()
                .any(|old| old.x == new.x && old.y == new.y));
        }
    }

    #[test]
    fn cap_and_walls_become_quads() {
        let mut mesh = cube();
        mesh.extrude_face(top_index(&mesh), 64.0).unwrap();
        assert_eq!(reconstruct_quads(mesh.indices()).len(), 6 + 4);
    }

    #[test]
    fn cap_is_selected_afterwards() {
        let mut mesh = cube();
        mesh.select_key(&TOP);
        mesh.extrude_selection(32.0).unwrap();

        let selected: Vec<_> = mesh.selection().collect();
        assert_eq!(selected.len(), 1);
        assert!(selected[0].is_face());
        assert_relative_eq!(mesh.selection_center().unwrap(), Point3::new(0.0, 0.0, 96.0));
    }

    #[test]
    fn repeated_extrusion_stacks() {
        let mut mesh = cube();
        mesh.select_key(&TOP);
        mesh.extrude_selection(10.0).unwrap();
        mesh.extrude_selection(10.0).unwrap();
        assert_relative_eq!(mesh.bounds().unwrap().max.z, 84.0);
        assert_eq!(mesh.positions().len(), 16);
    }

    #[test]
    fn wall_normals_face_outward() {
        let mut mesh = cube();
        mesh.extrude_face(top_index(&mesh), 64.0).unwrap();
        for v in &mesh.vertices()[28..] {
            let outward = Vector3::new(v.position.x, v.position.y, 0.0);
            assert!(v.normal.dot(&outward) > 0.0, "wall normal {:?} at {:?}", v.normal, v.position);
            assert_relative_eq!(v.normal.z, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn triangles_wind_along_vertex_normals() {
        let mut mesh = cube();
        mesh.extrude_face(top_index(&mesh), 64.0).unwrap();
        for tri in mesh.indices().chunks_exact(3) {
            let pts: Vec<Point3> = tri.iter().map(|&i| mesh.vertices()[i as usize].position).collect();
            let winding = newell_normal(&pts).unwrap();
            assert_relative_eq!(winding, mesh.vertices()[tri[0] as usize].normal, epsilon = 1e-12);
        }
    }

    #[test]
    fn negative_distance_insets() {
        let mut mesh = cube();
        mesh.extrude_face(top_index(&mesh), -32.0).unwrap();
        assert_relative_eq!(mesh.positions()[8].z, 32.0);
        assert_relative_eq!(mesh.bounds().unwrap().max.z, 64.0);
    }

    #[test]
    fn edge_part_is_rejected() {
        let mut mesh = cube();
        let edge = mesh.parts().iter().position(|p| matches!(p.kind, PartKind::Edge(_))).unwrap();
        let err = mesh.extrude_face(edge, 10.0).unwrap_err();
        assert!(matches!(err, EditMeshError::Operation(OperationError::InvalidInput(_))));
        assert_eq!(mesh.generation(), 1);
    }

    #[test]
    fn zero_distance_is_rejected() {
        let mut mesh = cube();
        let err = mesh.extrude_face(top_index(&mesh), 0.0).unwrap_err();
        assert!(matches!(err, EditMeshError::Operation(OperationError::InvalidInput(_))));
    }

    #[test]
    fn no_selected_faces_is_a_noop() {
        let mut mesh = cube();
        assert!(mesh.select_key(&PartKey::Vertex(0)));
        mesh.extrude_selection(10.0).unwrap();
        assert_eq!(mesh.generation(), 1);
        assert_eq!(mesh.positions().len(), 8);
    }

    #[test]
    fn two_faces_extrude_independently() {
        let mut mesh = cube();
        mesh.select_key(&TOP);
        mesh.select_key(&PartKey::Face([4, 5, 6, 7]));
        mesh.extrude_selection(16.0).unwrap();

        assert_eq!(mesh.positions().len(), 16);
        let bounds = mesh.bounds().unwrap();
        assert_relative_eq!(bounds.max.z, 80.0);
        assert_relative_eq!(bounds.min.z, -80.0);
        assert_eq!(mesh.selection().count(), 2);
    }

    /// Flat strip of four triangles in the z = 0 plane, wound toward +z.
    fn strip() -> EditableMesh {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
        ];
        let vertices = positions
            .iter()
            .zip(0u32..)
            .map(|(p, i)| Vertex::at(*p, i))
            .collect();
        let data = MeshData {
            positions,
            vertices,
            indices: vec![0, 1, 2, 2, 1, 3, 2, 3, 4, 4, 3, 5],
        };
        EditableMesh::new(data, MeshConfig::default()).unwrap()
    }

    #[test]
    fn neighbouring_faces_sharing_a_triangle_are_rejected() {
        let mut mesh = strip();
        assert_eq!(reconstruct_quads(mesh.indices()).len(), 3);
        assert!(mesh.select_key(&PartKey::Face([0, 1, 2, 3])));
        assert!(mesh.select_key(&PartKey::Face([1, 2, 3, 4])));
        let before = mesh.data().clone();

        let err = mesh.extrude_selection(1.0).unwrap_err();

        assert!(matches!(err, EditMeshError::Operation(OperationError::InvalidInput(_))));
        assert_eq!(mesh.data(), &before);
        assert_eq!(mesh.generation(), 1);
    }

    #[test]
    fn disjoint_faces_on_a_strip_extrude_together() {
        let mut mesh = strip();
        assert!(mesh.select_key(&PartKey::Face([0, 1, 2, 3])));
        assert!(mesh.select_key(&PartKey::Face([2, 3, 4, 5])));

        mesh.extrude_selection(1.0).unwrap();

        assert_eq!(mesh.positions().len(), 6 + 8);
        assert_eq!(mesh.indices().len(), 12 + 2 * 24);
        assert_relative_eq!(mesh.bounds().unwrap().max.z, 1.0);
        assert_eq!(mesh.selection().count(), 2);
        assert!(mesh.data().validate().is_ok());
    }
}
