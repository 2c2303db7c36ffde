//! Material zones and their default surface definitions.
//!
//! Faces are classified by the profile ring they were built from, not by
//! their final radius, so noise can push vertices around without flipping
//! faces between the bowl and the ejecta blanket.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mesh::VertexTag;

// ---------------------------------------------------------------------------
// MaterialZone
// ---------------------------------------------------------------------------

/// Which half of the crater a face belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialZone {
    /// The bowl, from the center out to the boundary ring.
    Inner,
    /// The raised rim, outer slope, side wall, and floor.
    Outer,
}

impl MaterialZone {
    /// Material slot index (`0` inner, `1` outer).
    pub fn slot(self) -> u32 {
        match self {
            Self::Inner => 0,
            Self::Outer => 1,
        }
    }
}

/// Assign a zone to every face.
///
/// A face is [`MaterialZone::Inner`] when at least two of its three vertices
/// come from rings at or inside `boundary_ring`. Closure rings are tagged past
/// `rim_ring`, and any face touching one (side wall and floor) lands in
/// [`MaterialZone::Outer`].
pub fn assign_zones(
    faces: &[[u32; 3]],
    tags: &[VertexTag],
    boundary_ring: usize,
    rim_ring: usize,
) -> Vec<MaterialZone> {
    let boundary = boundary_ring as u32;
    let rim = rim_ring as u32;
    faces
        .iter()
        .map(|face| {
            let rings = face.map(|v| tags[v as usize].ring);
            let inside = rings.iter().filter(|&&ring| ring <= boundary).count();
            if inside >= 2 && rings.iter().all(|&ring| ring <= rim) {
                MaterialZone::Inner
            } else {
                MaterialZone::Outer
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Zone materials
// ---------------------------------------------------------------------------

/// Errors returned during material validation.
#[derive(Debug, Error)]
pub enum MaterialError {
    /// The material name must not be empty.
    #[error("material name must not be empty")]
    EmptyName,
}

/// PBR surface description handed to the host for one zone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoneMaterial {
    /// Name used for the host material (e.g. in an MTL file).
    pub name: String,
    /// Base color in linear RGBA.
    pub albedo: [f32; 4],
    /// 0.0 = mirror-smooth, 1.0 = fully rough.
    pub roughness: f32,
    /// 0.0 = dielectric, 1.0 = pure metal.
    pub metallic: f32,
}

impl ZoneMaterial {
    /// Validates the name and clamps all factors to `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`MaterialError::EmptyName`] if the name is empty.
    pub fn validated(mut self) -> Result<Self, MaterialError> {
        if self.name.trim().is_empty() {
            return Err(MaterialError::EmptyName);
        }
        for c in &mut self.albedo {
            *c = c.clamp(0.0, 1.0);
        }
        self.roughness = self.roughness.clamp(0.0, 1.0);
        self.metallic = self.metallic.clamp(0.0, 1.0);
        Ok(self)
    }
}

/// One material per zone, indexed by [`MaterialZone::slot`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneMaterials {
    /// Dark basalt of the bowl.
    pub inner: ZoneMaterial,
    /// Lighter earth of the ejecta blanket.
    pub outer: ZoneMaterial,
}

impl Default for ZoneMaterials {
    fn default() -> Self {
        Self {
            inner: ZoneMaterial {
                name: String::from("Crater_Inner"),
                albedo: [0.15, 0.1, 0.08, 1.0],
                roughness: 0.9,
                metallic: 0.0,
            },
            outer: ZoneMaterial {
                name: String::from("Crater_Outer"),
                albedo: [0.5, 0.4, 0.3, 1.0],
                roughness: 0.8,
                metallic: 0.0,
            },
        }
    }
}

impl ZoneMaterials {
    /// Material for `zone`.
    pub fn get(&self, zone: MaterialZone) -> &ZoneMaterial {
        match zone {
            MaterialZone::Inner => &self.inner,
            MaterialZone::Outer => &self.outer,
        }
    }

    /// Both materials in slot order.
    pub fn slots(&self) -> [&ZoneMaterial; 2] {
        [&self.inner, &self.outer]
    }

    /// Validates and clamps both materials.
    ///
    /// # Errors
    ///
    /// Returns [`MaterialError::EmptyName`] if either name is empty.
    pub fn validated(self) -> Result<Self, MaterialError> {
        Ok(Self {
            inner: self.inner.validated()?,
            outer: self.outer.validated()?,
        })
    }
}
