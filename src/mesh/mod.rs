mod buffers;
mod data;

pub use buffers::{CollisionGeometry, RenderBuffers, RenderVertex};
pub use data::{to_index, MeshData, Vertex};

use std::collections::HashSet;
use std::fmt;

use tracing::debug;

use crate::config::MeshConfig;
use crate::error::{Result, TopologyError};
use crate::math::{Point3, Vector3};
use crate::operations::modification::DeleteParts;
use crate::operations::query::{Aabb, BoundingBox, SelectionCenter};
use crate::operations::shaping::{ExtrudeFace, ExtrudeSelection};
use crate::operations::transform::TranslateSelection;
use crate::topology::{reconstruct_parts, MeshPart, PartKey};

type ChangeListener = Box<dyn FnMut()>;

/// An indexed triangle mesh with derived, selectable quad topology.
///
/// The mesh exclusively owns its positions, vertices and indices. Every
/// mutation goes through [`EditableMesh::commit`], which validates the new
/// data, swaps it in and rebuilds all derived state.
pub struct EditableMesh {
    data: MeshData,
    config: MeshConfig,
    parts: Vec<MeshPart>,
    render: RenderBuffers,
    bounds: Option<Aabb>,
    generation: u64,
    on_changed: Option<ChangeListener>,
}

impl fmt::Debug for EditableMesh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditableMesh")
            .field("positions", &self.data.positions.len())
            .field("vertices", &self.data.vertices.len())
            .field("indices", &self.data.indices.len())
            .field("parts", &self.parts.len())
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl EditableMesh {
    /// Takes ownership of `data` and builds its derived state.
    ///
    /// # Errors
    ///
    /// Returns a [`TopologyError`] if any index in `data` is out of range.
    pub fn new(data: MeshData, config: MeshConfig) -> Result<Self> {
        data.validate()?;
        let mut mesh = Self {
            data,
            render: RenderBuffers {
                material: config.material.clone(),
                ..RenderBuffers::default()
            },
            config,
            parts: Vec::new(),
            bounds: None,
            generation: 0,
            on_changed: None,
        };
        mesh.rebuild()?;
        Ok(mesh)
    }

    // --- Storage ---

    #[must_use]
    pub fn data(&self) -> &MeshData {
        &self.data
    }

    #[must_use]
    pub fn positions(&self) -> &[Point3] {
        &self.data.positions
    }

    #[must_use]
    pub fn vertices(&self) -> &[Vertex] {
        &self.data.vertices
    }

    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.data.indices
    }

    #[must_use]
    pub fn config(&self) -> &MeshConfig {
        &self.config
    }

    // --- Derived state ---

    /// Current derived topology: faces, then edges, then vertices.
    #[must_use]
    pub fn parts(&self) -> &[MeshPart] {
        &self.parts
    }

    /// Returns part `index`.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::IndexOutOfRange`] if there is no such part.
    pub fn part(&self, index: usize) -> Result<&MeshPart> {
        self.parts.get(index).ok_or_else(|| {
            TopologyError::IndexOutOfRange {
                kind: "part",
                index,
                len: self.parts.len(),
            }
            .into()
        })
    }

    /// Parts whose `selected` flag is set.
    pub fn selection(&self) -> impl Iterator<Item = &MeshPart> + '_ {
        self.parts.iter().filter(|p| p.selected)
    }

    #[must_use]
    pub fn has_selection(&self) -> bool {
        self.parts.iter().any(|p| p.selected)
    }

    /// Bounding box of all positions, `None` when there are none.
    #[must_use]
    pub fn bounds(&self) -> Option<Aabb> {
        self.bounds
    }

    #[must_use]
    pub fn render_buffers(&self) -> &RenderBuffers {
        &self.render
    }

    /// Geometry for the host's static collision shape.
    ///
    /// Regenerate it whenever the change listener fires.
    #[must_use]
    pub fn collision_geometry(&self) -> CollisionGeometry {
        CollisionGeometry::from(&self.data)
    }

    /// Number of rebuilds performed since construction.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    // --- Change notification ---

    /// Registers the listener fired after every rebuild, replacing any
    /// previous one.
    pub fn set_on_changed(&mut self, listener: impl FnMut() + 'static) {
        self.on_changed = Some(Box::new(listener));
    }

    pub fn clear_on_changed(&mut self) {
        self.on_changed = None;
    }

    // --- Rebuild ---

    /// Rewrites every derived buffer and the part list from current data,
    /// then notifies the listener.
    ///
    /// Selection flags are carried over to parts with the same [`PartKey`].
    ///
    /// # Errors
    ///
    /// Returns a [`TopologyError`] if the stored data references missing
    /// entries.
    pub fn rebuild(&mut self) -> Result<()> {
        let selected = self.selected_keys();
        self.rebuild_with_selection(&selected)
    }

    fn rebuild_with_selection(&mut self, selected: &HashSet<PartKey>) -> Result<()> {
        self.data.sync_vertex_positions();
        self.render.rewrite(&self.data);
        self.bounds = BoundingBox::new().execute(&self.data);

        let mut parts = reconstruct_parts(&self.data.indices, &self.data.vertices)?;
        for part in &mut parts {
            part.selected = selected.contains(&part.key());
        }
        self.parts = parts;
        self.generation += 1;

        debug!(
            generation = self.generation,
            positions = self.data.positions.len(),
            vertices = self.data.vertices.len(),
            triangles = self.data.triangle_count(),
            parts = self.parts.len(),
            "rebuilt editable mesh"
        );

        if let Some(listener) = self.on_changed.as_mut() {
            listener();
        }
        Ok(())
    }

    /// Replaces the mesh data with an edited copy and rebuilds.
    ///
    /// `selected` names the parts to mark selected afterwards. Nothing
    /// changes if `data` fails validation.
    ///
    /// # Errors
    ///
    /// Returns a [`TopologyError`] if `data` violates an invariant.
    pub(crate) fn commit(&mut self, data: MeshData, selected: &HashSet<PartKey>) -> Result<()> {
        data.validate()?;
        self.data = data;
        self.rebuild_with_selection(selected)
    }

    // --- Selection ---

    /// Keys of all currently selected parts.
    #[must_use]
    pub fn selected_keys(&self) -> HashSet<PartKey> {
        self.selection().map(MeshPart::key).collect()
    }

    /// Sets the selection flag of part `index`.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::IndexOutOfRange`] if there is no such part.
    pub fn set_part_selected(&mut self, index: usize, selected: bool) -> Result<()> {
        let len = self.parts.len();
        let part = self.parts.get_mut(index).ok_or(TopologyError::IndexOutOfRange {
            kind: "part",
            index,
            len,
        })?;
        part.selected = selected;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`TopologyError::IndexOutOfRange`] if there is no such part.
    pub fn select_part(&mut self, index: usize) -> Result<()> {
        self.set_part_selected(index, true)
    }

    /// # Errors
    ///
    /// Returns [`TopologyError::IndexOutOfRange`] if there is no such part.
    pub fn deselect_part(&mut self, index: usize) -> Result<()> {
        self.set_part_selected(index, false)
    }

    /// Flips the selection flag of part `index` and returns the new value.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::IndexOutOfRange`] if there is no such part.
    pub fn toggle_part(&mut self, index: usize) -> Result<bool> {
        let selected = !self.part(index)?.selected;
        self.set_part_selected(index, selected)?;
        Ok(selected)
    }

    /// Selects the part with structural key `key`, returning whether one exists.
    pub fn select_key(&mut self, key: &PartKey) -> bool {
        match self.parts.iter_mut().find(|p| p.key() == *key) {
            Some(part) => {
                part.selected = true;
                true
            }
            None => false,
        }
    }

    pub fn select_all(&mut self) {
        for part in &mut self.parts {
            part.selected = true;
        }
    }

    pub fn clear_selection(&mut self) {
        for part in &mut self.parts {
            part.selected = false;
        }
    }

    // --- Edit operations ---

    /// Average of the positions referenced by the selection.
    ///
    /// # Errors
    ///
    /// Returns a [`TopologyError`] if a selected part is stale.
    pub fn selection_center(&self) -> Result<Point3> {
        SelectionCenter::new().execute(self)
    }

    /// Moves every position referenced by the selection by `delta`.
    ///
    /// # Errors
    ///
    /// Returns a [`TopologyError`] if a selected part is stale.
    pub fn translate_selection(&mut self, delta: Vector3) -> Result<()> {
        TranslateSelection::new(delta).execute(self)
    }

    /// Deletes part `index` and the triangles that depend on it.
    ///
    /// # Errors
    ///
    /// Returns a [`TopologyError`] if the part does not exist.
    pub fn delete_part(&mut self, index: usize) -> Result<()> {
        let part = *self.part(index)?;
        DeleteParts::new(vec![part]).execute(self)
    }

    /// Deletes every selected part.
    ///
    /// # Errors
    ///
    /// Returns a [`TopologyError`] if a selected part is stale.
    pub fn delete_selection(&mut self) -> Result<()> {
        DeleteParts::selection(self).execute(self)
    }

    /// Extrudes face part `index` by `distance` along its normal.
    ///
    /// # Errors
    ///
    /// Returns an error if the part is not a face or `distance` is zero.
    pub fn extrude_face(&mut self, index: usize, distance: f64) -> Result<()> {
        let part = *self.part(index)?;
        ExtrudeFace::new(part, distance).execute(self)
    }

    /// Extrudes every selected face by `distance`.
    ///
    /// # Errors
    ///
    /// Returns an error if `distance` is zero or a selected face is stale.
    pub fn extrude_selection(&mut self, distance: f64) -> Result<()> {
        ExtrudeSelection::new(distance).execute(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::error::EditMeshError;
    use crate::operations::creation::MakeCube;
    use crate::topology::PartKind;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn cube() -> EditableMesh {
        init_tracing();
        MakeCube::new(Vector3::new(128.0, 128.0, 128.0)).execute().unwrap()
    }

    fn counter(mesh: &mut EditableMesh) -> Rc<Cell<u32>> {
        let fired = Rc::new(Cell::new(0));
        let seen = Rc::clone(&fired);
        mesh.set_on_changed(move || seen.set(seen.get() + 1));
        fired
    }

    #[test]
    fn parts_are_faces_then_edges_then_vertices() {
        let mesh = cube();
        let kinds: Vec<u8> = mesh
            .parts()
            .iter()
            .map(|p| match p.kind {
                PartKind::Face(_) => 0,
                PartKind::Edge(_) => 1,
                PartKind::Vertex(_) => 2,
            })
            .collect();
        assert_eq!(kinds.len(), 26);
        assert!(kinds.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(kinds.iter().filter(|&&k| k == 0).count(), 6);
        assert_eq!(kinds.iter().filter(|&&k| k == 1).count(), 12);
    }

    #[test]
    fn rebuild_twice_is_identical() {
        let mut mesh = cube();
        mesh.select_part(3).unwrap();
        mesh.rebuild().unwrap();
        let parts = mesh.parts().to_vec();
        let render = mesh.render_buffers().clone();
        let bounds = mesh.bounds();
        mesh.rebuild().unwrap();
        assert_eq!(mesh.parts(), parts.as_slice());
        assert_eq!(mesh.render_buffers(), &render);
        assert_eq!(mesh.bounds(), bounds);
    }

    #[test]
    fn rebuild_notifies_once() {
        let mut mesh = cube();
        let fired = counter(&mut mesh);
        mesh.rebuild().unwrap();
        assert_eq!(fired.get(), 1);
        assert_eq!(mesh.generation(), 2);

        mesh.clear_on_changed();
        mesh.rebuild().unwrap();
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn construction_does_not_notify() {
        let mesh = cube();
        assert_eq!(mesh.generation(), 1);
        assert_eq!(mesh.render_buffers().vertices.len(), 24);
        assert_eq!(mesh.render_buffers().indices.len(), 36);
        assert_eq!(mesh.render_buffers().material, MeshConfig::default().material);
    }

    #[test]
    fn rebuild_resyncs_cached_positions() {
        let mut data = MakeCube::new(Vector3::new(2.0, 2.0, 2.0)).build().unwrap();
        data.vertices[0].position = Point3::new(9.0, 9.0, 9.0);
        let mesh = EditableMesh::new(data, MeshConfig::default()).unwrap();
        let canonical = mesh.positions()[mesh.vertices()[0].position_index as usize];
        assert_eq!(mesh.vertices()[0].position, canonical);
    }

    #[test]
    fn invalid_data_is_rejected() {
        let mut data = MakeCube::new(Vector3::new(2.0, 2.0, 2.0)).build().unwrap();
        data.indices[5] = 24;
        let err = EditableMesh::new(data, MeshConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            EditMeshError::Topology(TopologyError::IndexOutOfRange { kind: "vertex", index: 24, len: 24 })
        ));
    }

    #[test]
    fn selection_helpers() {
        let mut mesh = cube();
        assert!(!mesh.has_selection());
        mesh.select_part(0).unwrap();
        assert!(mesh.toggle_part(1).unwrap());
        assert_eq!(mesh.selection().count(), 2);
        assert!(!mesh.toggle_part(1).unwrap());
        mesh.deselect_part(0).unwrap();
        assert!(!mesh.has_selection());

        mesh.select_all();
        assert_eq!(mesh.selection().count(), mesh.parts().len());
        mesh.clear_selection();
        assert!(!mesh.has_selection());
    }

    #[test]
    fn selecting_missing_part_fails() {
        let mut mesh = cube();
        let err = mesh.select_part(26).unwrap_err();
        assert!(matches!(
            err,
            EditMeshError::Topology(TopologyError::IndexOutOfRange { kind: "part", index: 26, len: 26 })
        ));
        assert!(!mesh.select_key(&PartKey::Vertex(1000)));
    }

    #[test]
    fn collision_geometry_is_per_vertex() {
        let mesh = cube();
        let collision = mesh.collision_geometry();
        assert_eq!(collision.positions.len(), mesh.vertices().len());
        assert_eq!(collision.indices, mesh.indices());
    }

    #[test]
    fn listener_sees_updated_state() {
        let mut mesh = cube();
        mesh.select_key(&PartKey::Face([0, 1, 2, 3]));
        let fired = counter(&mut mesh);
        mesh.translate_selection(Vector3::new(0.0, 0.0, 8.0)).unwrap();
        mesh.extrude_selection(8.0).unwrap();
        mesh.delete_selection().unwrap();
        assert_eq!(fired.get(), 3);
        assert_eq!(mesh.generation(), 4);
    }
}
