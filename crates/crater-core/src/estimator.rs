//! Polygon budget and GPU footprint estimate for a generated crater.

use serde::{Deserialize, Serialize};

use crate::mesh::{CraterMesh, CraterVertex};
use crate::params::CraterParameters;

/// Rough rendering cost class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PerformanceBucket {
    /// Cheap enough to scatter freely.
    Low,
    /// Fine for a handful of hero craters.
    Medium,
    /// Expensive; consider fewer rings or segments.
    High,
}

impl std::fmt::Display for PerformanceBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        f.write_str(label)
    }
}

/// Triangle counts at which a crater moves into the next bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceThresholds {
    /// Above this many triangles the crater is [`PerformanceBucket::Medium`].
    pub medium_triangles: usize,
    /// Above this many triangles the crater is [`PerformanceBucket::High`].
    pub high_triangles: usize,
}

impl Default for PerformanceThresholds {
    fn default() -> Self {
        Self {
            medium_triangles: 800,
            high_triangles: 5000,
        }
    }
}

impl PerformanceThresholds {
    /// Bucket for `triangles`.
    pub fn classify(&self, triangles: usize) -> PerformanceBucket {
        if triangles > self.high_triangles {
            PerformanceBucket::High
        } else if triangles > self.medium_triangles {
            PerformanceBucket::Medium
        } else {
            PerformanceBucket::Low
        }
    }
}

/// Size and cost summary of a finished mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceReport {
    /// Unique vertices in the mesh.
    pub vertex_count: usize,
    /// Triangles in the mesh.
    pub triangle_count: usize,
    /// Cost class from the thresholds.
    pub bucket: PerformanceBucket,
    /// Bytes of the unwelded vertex buffer plus a `u32` index buffer.
    pub gpu_bytes: usize,
}

/// Summarize `mesh` without modifying it.
pub fn estimate(mesh: &CraterMesh, thresholds: &PerformanceThresholds) -> PerformanceReport {
    let triangle_count = mesh.triangle_count();
    PerformanceReport {
        vertex_count: mesh.vertex_count(),
        triangle_count,
        bucket: thresholds.classify(triangle_count),
        gpu_bytes: gpu_bytes(triangle_count),
    }
}

fn gpu_bytes(triangles: usize) -> usize {
    let corners = triangles * 3;
    corners * std::mem::size_of::<CraterVertex>() + corners * std::mem::size_of::<u32>()
}

/// Vertex and triangle counts `(vertices, triangles)` before any merging,
/// computed from parameters alone.
///
/// The open shell has `N * S + 1` vertices and `S * (N - 1) * 2 + S`
/// triangles. A closed bottom with `W` skirt rings adds `W * S + 1` vertices
/// and `2 * W * S + S` triangles.
pub fn predict_counts(params: &CraterParameters) -> (usize, usize) {
    let n = params.rings();
    let s = params.segments();
    let mut vertices = n * s + 1;
    let mut triangles = s * (n - 1) * 2 + s;
    if params.is_closed() {
        let w = params.skirt_rings.max(1) as usize;
        vertices += w * s + 1;
        triangles += 2 * w * s + s;
    }
    (vertices, triangles)
}
