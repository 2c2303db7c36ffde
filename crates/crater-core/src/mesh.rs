//! Crater mesh data: positions, triangles, per-corner UVs, and material zones.

use std::collections::HashSet;

use glam::Vec3;

use crate::material::MaterialZone;

/// Profile ring and segment a vertex was generated from.
///
/// Rings `0..=N` are the crater surface. With a closed bottom of `W` skirt
/// rings, rings `N + 1..=N + W` run down the side wall (the last is the floor
/// edge) and ring `N + W + 1` is the floor center.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VertexTag {
    /// Profile ring index.
    pub ring: u32,
    /// Angular segment index. `0` for single-vertex rings.
    pub segment: u32,
}

/// Triangle mesh of one crater.
///
/// `faces`, `uvs`, and `zones` are parallel arrays. `positions` and `tags`
/// are parallel arrays. Winding is counter-clockwise seen from outside.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CraterMesh {
    /// Vertex positions, Z up.
    pub positions: Vec<[f32; 3]>,
    /// Triangles as indices into `positions`.
    pub faces: Vec<[u32; 3]>,
    /// UV coordinate of each face corner.
    pub uvs: Vec<[[f32; 2]; 3]>,
    /// Material zone of each face.
    pub zones: Vec<MaterialZone>,
    /// Origin ring of each vertex.
    pub tags: Vec<VertexTag>,
}

impl CraterMesh {
    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.faces.len()
    }

    /// Returns `true` if the mesh has no triangles.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Number of faces assigned to `zone`.
    pub fn zone_face_count(&self, zone: MaterialZone) -> usize {
        self.zones.iter().filter(|&&z| z == zone).count()
    }

    /// Area-weighted smooth normal per vertex.
    ///
    /// Vertices not used by any face get `+Z`.
    pub fn vertex_normals(&self) -> Vec<[f32; 3]> {
        let mut sums = vec![Vec3::ZERO; self.positions.len()];
        for face in &self.faces {
            let [a, b, c] = face.map(|i| Vec3::from_array(self.positions[i as usize]));
            // Cross product length is twice the area, which gives the weighting.
            let n = (b - a).cross(c - a);
            for &i in face {
                sums[i as usize] += n;
            }
        }
        sums.into_iter()
            .map(|n| n.try_normalize().unwrap_or(Vec3::Z).to_array())
            .collect()
    }

    /// Directed edges without an opposite twin, sorted.
    ///
    /// Empty for a closed mesh. For an open crater shell this is the rim loop.
    pub fn boundary_edges(&self) -> Vec<[u32; 2]> {
        let directed = self.directed_edges();
        let mut boundary: Vec<[u32; 2]> = directed
            .iter()
            .filter(|&&(a, b)| !directed.contains(&(b, a)))
            .map(|&(a, b)| [a, b])
            .collect();
        boundary.sort_unstable();
        boundary
    }

    /// Returns `true` if every directed edge is used once and has exactly one
    /// opposite twin, i.e. the mesh is a closed, consistently wound 2-manifold.
    pub fn is_closed(&self) -> bool {
        if self.faces.is_empty() {
            return false;
        }
        let mut seen = HashSet::with_capacity(self.faces.len() * 3);
        for face in &self.faces {
            for i in 0..3 {
                if !seen.insert((face[i], face[(i + 1) % 3])) {
                    return false;
                }
            }
        }
        seen.iter().all(|&(a, b)| seen.contains(&(b, a)))
    }

    /// Axis-aligned bounding box, `None` for an empty vertex list.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self.positions.iter().map(|p| Vec3::from_array(*p));
        let first = iter.next()?;
        Some(iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p))))
    }

    /// Expand into an unwelded GPU vertex buffer (one vertex per face corner)
    /// and a sequential index buffer.
    pub fn to_gpu_buffers(&self) -> (Vec<CraterVertex>, Vec<u32>) {
        let normals = self.vertex_normals();
        let mut vertices = Vec::with_capacity(self.faces.len() * 3);
        for ((face, uvs), zone) in self.faces.iter().zip(&self.uvs).zip(&self.zones) {
            for (corner, &index) in face.iter().enumerate() {
                vertices.push(CraterVertex {
                    position: self.positions[index as usize],
                    normal: normals[index as usize],
                    uv: uvs[corner],
                    material: zone.slot(),
                });
            }
        }
        let indices = (0..vertices.len() as u32).collect();
        (vertices, indices)
    }

    fn directed_edges(&self) -> HashSet<(u32, u32)> {
        self.faces
            .iter()
            .flat_map(|f| [(f[0], f[1]), (f[1], f[2]), (f[2], f[0])])
            .collect()
    }
}

// ---------------------------------------------------------------------------
// GPU vertex
// ---------------------------------------------------------------------------

/// Interleaved vertex for upload, 36 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CraterVertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Smooth vertex normal.
    pub normal: [f32; 3],
    /// Texture coordinates in `[0, 1]`.
    pub uv: [f32; 2],
    /// Material slot (0 = inner, 1 = outer).
    pub material: u32,
}

static_assertions::assert_eq_size!(CraterVertex, [u8; 36]);
