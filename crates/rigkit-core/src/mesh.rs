//! Mesh data: geometry, edit selection, vertex groups and shape keys

use std::collections::BTreeMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::driver::ShapeKeyDriver;
use crate::math::{average, polygon_area_normal};

/// Name of the reference shape key every keyed mesh starts with
pub const BASIS_SHAPE_KEY: &str = "Basis";

/// A polygon referencing mesh vertices by index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Face {
    pub vertices: Vec<u32>,
    pub select: bool,
}

/// Named per-vertex weights (one per joint for skinning)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexGroup {
    pub name: String,
    pub weights: BTreeMap<u32, f32>,
}

impl VertexGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weights: BTreeMap::new(),
        }
    }

    pub fn contains(&self, vertex: u32) -> bool {
        self.weights.contains_key(&vertex)
    }
}

/// A shape key with its slider range and optional driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeKey {
    pub name: String,
    pub value: f32,
    pub slider_min: f32,
    pub slider_max: f32,
    pub driver: Option<ShapeKeyDriver>,
}

impl ShapeKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: 0.0,
            slider_min: 0.0,
            slider_max: 1.0,
            driver: None,
        }
    }
}

/// Area-weighted summary of a face selection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceSelectionSummary {
    pub centroid: Vec3,
    /// Unit normal
    pub normal: Vec3,
    pub total_area: f32,
}

/// Polygon mesh in object-local space
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    /// Edit-mode selection, parallel to `vertices`
    pub vertex_select: Vec<bool>,
    pub edges: Vec<[u32; 2]>,
    pub faces: Vec<Face>,
    /// Most recently selected edge (index into `edges`)
    pub active_edge: Option<usize>,
    pub vertex_groups: Vec<VertexGroup>,
    pub shape_keys: Vec<ShapeKey>,
}

impl Mesh {
    /// Create a mesh from vertices with nothing selected
    pub fn new(vertices: Vec<Vec3>) -> Self {
        let vertex_select = vec![false; vertices.len()];
        Self {
            vertices,
            vertex_select,
            ..Default::default()
        }
    }

    /// Add a face (and its boundary edges if not yet present)
    pub fn with_face(mut self, vertices: &[u32]) -> Self {
        self.add_face(vertices);
        self
    }

    pub fn add_face(&mut self, vertices: &[u32]) -> usize {
        for (i, &a) in vertices.iter().enumerate() {
            let b = vertices[(i + 1) % vertices.len()];
            if self.find_edge(a, b).is_none() {
                self.edges.push([a, b]);
            }
        }
        self.faces.push(Face {
            vertices: vertices.to_vec(),
            select: false,
        });
        self.faces.len() - 1
    }

    /// Index of the edge joining `a` and `b` in either direction
    pub fn find_edge(&self, a: u32, b: u32) -> Option<usize> {
        self.edges
            .iter()
            .position(|&[x, y]| (x == a && y == b) || (x == b && y == a))
    }

    pub fn select_all(&mut self, select: bool) {
        self.vertex_select = vec![select; self.vertices.len()];
        for face in &mut self.faces {
            face.select = select;
        }
    }

    pub fn select_vertices(&mut self, indices: &[u32]) {
        self.vertex_select.resize(self.vertices.len(), false);
        for &i in indices {
            if let Some(s) = self.vertex_select.get_mut(i as usize) {
                *s = true;
            }
        }
    }

    /// Select a face and its vertices
    pub fn select_face(&mut self, face: usize) {
        if let Some(f) = self.faces.get_mut(face) {
            f.select = true;
            let verts = f.vertices.clone();
            self.select_vertices(&verts);
        }
    }

    pub fn selected_vertex_indices(&self) -> Vec<u32> {
        self.vertex_select
            .iter()
            .enumerate()
            .filter(|(i, s)| **s && *i < self.vertices.len())
            .map(|(i, _)| i as u32)
            .collect()
    }

    pub fn has_selected_vertices(&self) -> bool {
        self.vertex_select.iter().any(|s| *s)
    }

    pub fn has_selected_faces(&self) -> bool {
        self.faces.iter().any(|f| f.select)
    }

    /// Mean of the selected vertices (object space)
    pub fn selected_centroid(&self) -> Option<Vec3> {
        average(
            self.selected_vertex_indices()
                .into_iter()
                .map(|i| self.vertices[i as usize]),
        )
    }

    /// Mean of all vertices (object space)
    pub fn vertex_average(&self) -> Option<Vec3> {
        average(self.vertices.iter().copied())
    }

    fn face_points(&self, face: &Face) -> Vec<Vec3> {
        face.vertices
            .iter()
            .filter_map(|&i| self.vertices.get(i as usize).copied())
            .collect()
    }

    /// Area-weighted centroid and normal over all selected faces
    ///
    /// Returns `None` when nothing is selected or the total area is zero.
    pub fn selected_faces_summary(&self) -> Option<FaceSelectionSummary> {
        let mut total_area = 0.0;
        let mut centroid = Vec3::ZERO;
        let mut normal = Vec3::ZERO;
        for face in self.faces.iter().filter(|f| f.select) {
            let (area, n, c) = polygon_area_normal(&self.face_points(face));
            centroid += c * area;
            normal += n * area;
            total_area += area;
        }
        if total_area == 0.0 {
            return None;
        }
        Some(FaceSelectionSummary {
            centroid: centroid / total_area,
            normal: normal.try_normalize()?,
            total_area,
        })
    }

    /// Direction of the active edge (object space, not normalized)
    pub fn active_edge_vector(&self) -> Option<Vec3> {
        let [a, b] = *self.edges.get(self.active_edge?)?;
        Some(*self.vertices.get(b as usize)? - *self.vertices.get(a as usize)?)
    }

    pub fn vertex_group(&self, name: &str) -> Option<&VertexGroup> {
        self.vertex_groups.iter().find(|g| g.name == name)
    }

    /// Get a vertex group by name, creating it if missing
    pub fn ensure_vertex_group(&mut self, name: &str) -> &mut VertexGroup {
        let index = match self.vertex_groups.iter().position(|g| g.name == name) {
            Some(i) => i,
            None => {
                self.vertex_groups.push(VertexGroup::new(name));
                self.vertex_groups.len() - 1
            }
        };
        &mut self.vertex_groups[index]
    }

    /// Remove the given vertices from every vertex group
    pub fn remove_from_all_groups(&mut self, vertices: &[u32]) {
        for group in &mut self.vertex_groups {
            for v in vertices {
                group.weights.remove(v);
            }
        }
    }

    pub fn shape_key(&self, name: &str) -> Option<&ShapeKey> {
        self.shape_keys.iter().find(|k| k.name == name)
    }

    pub fn shape_key_mut(&mut self, name: &str) -> Option<&mut ShapeKey> {
        self.shape_keys.iter_mut().find(|k| k.name == name)
    }

    /// Shape keys that can be driven (everything except the basis)
    pub fn drivable_shape_keys(&self) -> impl Iterator<Item = &ShapeKey> {
        self.shape_keys
            .iter()
            .filter(|k| k.name != BASIS_SHAPE_KEY)
    }
}
