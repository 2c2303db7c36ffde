//! Ring mesher: tessellates the perturbed grid into a triangle mesh.
//!
//! Ring 0 becomes one center vertex fanned to ring 1. Each band between two
//! rings becomes a strip of quads, each split into two triangles. With a
//! bottom thickness the rim is extruded down through the skirt rings to a
//! floor edge and capped, so the result is a closed solid.
//!
//! Samples closer than the merge tolerance share a vertex: first with the
//! same segment on the ring below, then with the preceding vertex on their
//! own ring. Quads touching a merged vertex lose their collapsed triangles.

use glam::DVec3;

use crate::mesh::{CraterMesh, VertexTag};
use crate::params::CraterParameters;
use crate::periodic::{det_cos, det_sin, segment_angle};
use crate::perturb::PerturbedGrid;

/// Default distance under which two samples collapse onto one vertex.
pub const DEFAULT_MERGE_TOLERANCE: f64 = 1e-5;

/// Exponent of the skirt's outward flare along its height.
const FLARE_EXPONENT: f64 = 1.5;

/// A ring keeps at least this many distinct vertices when merging along it.
const MIN_RING_VERTICES: usize = 3;

/// Side wall and floor that close the solid below the rim.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Skirt {
    /// Floor distance below the lowest surface point.
    pub thickness: f64,
    /// Outward lean of the wall from vertical, in degrees.
    pub flare: f64,
    /// Wall rings below the rim. The last one is the floor edge.
    pub rings: usize,
}

impl Skirt {
    /// The skirt described by `params`, or `None` for an open shell.
    pub fn from_params(params: &CraterParameters) -> Option<Self> {
        params.is_closed().then(|| Self {
            thickness: params.bottom_thickness,
            flare: params.skirt_flare,
            rings: params.skirt_rings.max(1) as usize,
        })
    }

    /// Outward offset at height fraction `t` of a wall dropping `drop`.
    fn offset(&self, drop: f64, t: f64) -> f64 {
        drop * libm::tan(self.flare.to_radians()) * libm::pow(t, FLARE_EXPONENT)
    }
}

/// Where one ring sample's vertex comes from.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Target {
    /// An existing vertex on the ring below.
    Below(u32),
    /// The vertex created for an earlier segment of the same ring.
    SameAs(usize),
    /// A vertex of its own.
    New,
}

/// Accumulates vertices, rings, and triangles, dropping collapsed triangles.
struct MeshBuilder {
    positions: Vec<DVec3>,
    faces: Vec<[u32; 3]>,
    tags: Vec<VertexTag>,
    /// Vertex index per segment for every pushed ring.
    rings: Vec<Vec<u32>>,
    tolerance: f64,
}

impl MeshBuilder {
    fn new(tolerance: f64) -> Self {
        Self {
            positions: Vec::new(),
            faces: Vec::new(),
            tags: Vec::new(),
            rings: Vec::new(),
            tolerance,
        }
    }

    fn push_vertex(&mut self, position: DVec3, tag: VertexTag) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position);
        self.tags.push(tag);
        index
    }

    fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        if a == b || b == c || c == a {
            return;
        }
        self.faces.push([a, b, c]);
    }

    /// Push a quad given counter-clockwise, split along the diagonal through
    /// its lowest-index corner.
    fn push_quad(&mut self, quad: [u32; 4]) {
        let lowest = (0..4).min_by_key(|&i| quad[i]).unwrap_or(0);
        let [p0, p1, p2, p3] = std::array::from_fn(|i| quad[(lowest + i) % 4]);
        self.push_triangle(p0, p1, p2);
        self.push_triangle(p0, p2, p3);
    }

    /// Start the ring list with a single center vertex shared by all segments.
    fn push_center(&mut self, position: DVec3, tag: VertexTag, segments: usize) -> u32 {
        let center = self.push_vertex(position, tag);
        self.rings.push(vec![center; segments]);
        center
    }

    /// Add one ring of samples, merging them onto nearby vertices.
    fn push_ring(&mut self, ring: u32, points: &[DVec3]) {
        let plan = self.plan_ring(points);
        let mut indices: Vec<u32> = Vec::with_capacity(points.len());
        for (segment, target) in plan.into_iter().enumerate() {
            let index = match target {
                Target::Below(index) => index,
                Target::SameAs(rep) => indices[rep],
                Target::New => self.push_vertex(
                    points[segment],
                    VertexTag {
                        ring,
                        segment: segment as u32,
                    },
                ),
            };
            indices.push(index);
        }
        self.rings.push(indices);
    }

    fn plan_ring(&self, points: &[DVec3]) -> Vec<Target> {
        let below = self.rings.last().map(Vec::as_slice).unwrap_or_default();
        let near_below = |segment: usize| {
            below
                .get(segment)
                .copied()
                .filter(|&i| self.positions[i as usize].distance(points[segment]) <= self.tolerance)
        };

        let mut plan = Vec::with_capacity(points.len());
        // Segment whose new vertex the current run along the ring collapses onto.
        let mut run: Option<usize> = None;
        for (segment, &point) in points.iter().enumerate() {
            if let Some(index) = near_below(segment) {
                plan.push(Target::Below(index));
                run = None;
            } else if let Some(rep) = run
                && points[rep].distance(point) <= self.tolerance
            {
                plan.push(Target::SameAs(rep));
            } else {
                plan.push(Target::New);
                run = Some(segment);
            }
        }

        // The last run wraps around onto segment 0.
        if let Some(last) = run
            && last != 0
            && plan[0] == Target::New
            && points[last].distance(points[0]) <= self.tolerance
        {
            plan[last..].fill(Target::SameAs(0));
        }

        let new = plan.iter().filter(|t| **t == Target::New).count();
        let mut shared: Vec<u32> = plan
            .iter()
            .filter_map(|t| match t {
                Target::Below(index) => Some(*index),
                _ => None,
            })
            .collect();
        shared.sort_unstable();
        shared.dedup();
        if new > 0 && new + shared.len() < MIN_RING_VERTICES {
            // Too small to stay a loop: keep every sample that the ring below
            // does not absorb.
            return (0..points.len())
                .map(|segment| near_below(segment).map_or(Target::New, Target::Below))
                .collect();
        }
        plan
    }

    /// Quad strip between ring `lower` and the ring above it.
    fn connect(&mut self, lower: usize) {
        let segments = self.rings[lower].len();
        for s in 0..segments {
            let next = (s + 1) % segments;
            let (a, b) = (&self.rings[lower], &self.rings[lower + 1]);
            let quad = [a[s], b[s], b[next], a[next]];
            self.push_quad(quad);
        }
    }

    fn finish(self) -> CraterMesh {
        CraterMesh {
            positions: self
                .positions
                .iter()
                .map(|p| p.as_vec3().to_array())
                .collect(),
            faces: self.faces,
            uvs: Vec::new(),
            zones: Vec::new(),
            tags: self.tags,
        }
    }
}

/// Tessellate `grid` into a mesh without UVs or zones.
///
/// A `skirt` adds the side wall and floor cap.
pub fn build_mesh(grid: &PerturbedGrid, skirt: Option<Skirt>, merge_tolerance: f64) -> CraterMesh {
    let levels = grid.levels();
    let segments = grid.segments();
    let rim = levels - 1;
    let mut builder = MeshBuilder::new(merge_tolerance);

    let trig: Vec<(f64, f64)> = (0..segments)
        .map(|s| {
            let theta = segment_angle(s, segments);
            (det_cos(theta), det_sin(theta))
        })
        .collect();
    let ring_points = |ring: usize| -> Vec<DVec3> {
        trig.iter()
            .enumerate()
            .map(|(segment, &(cos, sin))| {
                let sample = grid.get(ring, segment);
                let radius = sample.radius();
                DVec3::new(radius * cos, radius * sin, sample.height())
            })
            .collect()
    };

    let center = builder.push_center(
        DVec3::new(0.0, 0.0, grid.get(0, 0).height()),
        VertexTag { ring: 0, segment: 0 },
        segments,
    );
    for ring in 1..levels {
        builder.push_ring(ring as u32, &ring_points(ring));
    }

    for s in 0..segments {
        let (a, b) = (builder.rings[1][s], builder.rings[1][(s + 1) % segments]);
        builder.push_triangle(center, a, b);
    }
    for ring in 1..rim {
        builder.connect(ring);
    }

    if let Some(skirt) = skirt {
        close_bottom(&mut builder, &ring_points(rim), &trig, rim, skirt);
    }

    log::trace!(
        "meshed {} rings x {} segments: {} vertices, {} triangles",
        levels,
        segments,
        builder.positions.len(),
        builder.faces.len()
    );
    builder.finish()
}

/// Extrude the rim down through the skirt rings to a floor and cap it.
fn close_bottom(
    builder: &mut MeshBuilder,
    rim_points: &[DVec3],
    trig: &[(f64, f64)],
    rim: usize,
    skirt: Skirt,
) {
    let segments = rim_points.len();
    let lowest = builder
        .positions
        .iter()
        .map(|p| p.z)
        .fold(f64::INFINITY, f64::min);
    let floor_z = lowest - skirt.thickness;

    for level in 1..=skirt.rings {
        let t = level as f64 / skirt.rings as f64;
        let points: Vec<DVec3> = rim_points
            .iter()
            .zip(trig)
            .map(|(top, &(cos, sin))| {
                let drop = top.z - floor_z;
                let out = skirt.offset(drop, t);
                DVec3::new(top.x + out * cos, top.y + out * sin, top.z - drop * t)
            })
            .collect();
        builder.push_ring((rim + level) as u32, &points);
        builder.connect(rim + level - 1);
    }

    let floor_center = builder.push_vertex(
        DVec3::new(0.0, 0.0, floor_z),
        VertexTag {
            ring: (rim + skirt.rings + 1) as u32,
            segment: 0,
        },
    );
    let floor = rim + skirt.rings;
    for s in 0..segments {
        let (a, b) = (builder.rings[floor][s], builder.rings[floor][(s + 1) % segments]);
        builder.push_triangle(floor_center, b, a);
    }
}
