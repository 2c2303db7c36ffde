//! UV layout: two polar disc islands packed side by side in the unit square.
//!
//! Island radius follows profile path distance and island angle follows the
//! segment angle, so texel density is even along the profile and the 0/2π
//! seam is continuous.

use glam::DVec2;

use crate::error::CraterError;
use crate::material::MaterialZone;
use crate::mesh::{CraterMesh, VertexTag};
use crate::periodic::{det_cos, det_sin, segment_angle};
use crate::params::CraterParameters;
use crate::profile::RadialProfile;

/// Default gap between islands and around the border.
pub const DEFAULT_UV_MARGIN: f64 = 0.02;

/// Bounds for the hole left in the outer island of an open shell.
const MIN_HOLE: f64 = 0.05;
const MAX_HOLE: f64 = 0.95;

/// Placement of the two islands in UV space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UvLayout {
    /// Radius shared by both islands.
    pub island_radius: f64,
    /// Center of the inner (bowl) island.
    pub inner_center: DVec2,
    /// Center of the outer (rim and base) island.
    pub outer_center: DVec2,
}

impl UvLayout {
    /// Lay out both islands with `margin` on every side and between them.
    ///
    /// # Errors
    ///
    /// Returns [`CraterError::InvalidParameter`] unless `margin` is in `[0, 1/3)`.
    pub fn new(margin: f64) -> Result<Self, CraterError> {
        if !(0.0..1.0 / 3.0).contains(&margin) {
            return Err(CraterError::invalid(
                "uv_margin",
                format!("{margin} is outside [0, 1/3)"),
            ));
        }
        let island_radius = (1.0 - 3.0 * margin) / 4.0;
        Ok(Self {
            island_radius,
            inner_center: DVec2::new(margin + island_radius, 0.5),
            outer_center: DVec2::new(2.0 * margin + 3.0 * island_radius, 0.5),
        })
    }
}

/// Maps profile rings to normalized island radii.
struct RingMapping {
    boundary: u32,
    rim: u32,
    /// Outermost ring an inner face can reach: one past the boundary.
    inner_edge: u32,
    /// Cumulative path length per profile ring.
    arc: Vec<f64>,
    skirt_rings: u32,
    /// Path distance from the boundary ring to the rim, the floor edge, and
    /// the floor center.
    rim_end: f64,
    wall_end: f64,
    cap_end: f64,
    /// Path distance mapped onto the full outer island radius.
    outer_span: f64,
}

impl RingMapping {
    fn new(profile: &RadialProfile, params: &CraterParameters) -> Self {
        let rim_end = profile.outer_length();
        let drop = params.rim_height + params.depth + params.bottom_thickness;
        let flare = params.skirt_flare.to_radians();
        let wall_end = rim_end + drop / libm::cos(flare);
        let cap_end = wall_end + params.outer_radius + drop * libm::tan(flare);
        let outer_span = if params.is_closed() {
            cap_end
        } else {
            let hole = (params.inner_radius / params.outer_radius).clamp(MIN_HOLE, MAX_HOLE);
            rim_end / (1.0 - hole)
        };
        let boundary = profile.boundary_ring() as u32;
        let rim = profile.rim_ring() as u32;
        Self {
            boundary,
            rim,
            inner_edge: (boundary + 1).min(rim),
            arc: profile.rings().iter().map(|r| r.arc_length).collect(),
            skirt_rings: params.skirt_rings.max(1),
            rim_end,
            wall_end,
            cap_end,
            outer_span,
        }
    }

    /// `0` at the center, `1` one ring past the boundary.
    fn inner_rho(&self, ring: u32) -> f64 {
        let edge_arc = self.arc[self.inner_edge as usize];
        if edge_arc <= f64::EPSILON {
            return 1.0;
        }
        let ring = ring.min(self.inner_edge) as usize;
        (self.arc[ring] / edge_arc).clamp(0.0, 1.0)
    }

    /// `1` at the boundary ring, shrinking outward over the rim, down the
    /// skirt, and across the floor.
    fn outer_rho(&self, ring: u32) -> f64 {
        if self.outer_span <= f64::EPSILON {
            return 1.0;
        }
        let boundary_arc = self.arc[self.boundary as usize];
        let s = if ring <= self.rim {
            (self.arc[ring as usize] - boundary_arc).max(0.0)
        } else if ring <= self.rim + self.skirt_rings {
            let t = (ring - self.rim) as f64 / self.skirt_rings as f64;
            self.rim_end + t * (self.wall_end - self.rim_end)
        } else {
            self.cap_end
        };
        (1.0 - s / self.outer_span).clamp(0.0, 1.0)
    }
}

/// Per-corner UVs for every face of `mesh`, using the island of each face's zone.
///
/// `mesh.zones` must already be assigned.
pub fn compute_uvs(
    mesh: &CraterMesh,
    profile: &RadialProfile,
    params: &CraterParameters,
    layout: &UvLayout,
) -> Vec<[[f32; 2]; 3]> {
    let mapping = RingMapping::new(profile, params);
    let segments = params.segments();

    let corner = |tag: VertexTag, zone: MaterialZone| -> [f32; 2] {
        let theta = segment_angle(tag.segment as usize, segments);
        let (center, rho, theta) = match zone {
            MaterialZone::Inner => (layout.inner_center, mapping.inner_rho(tag.ring), theta),
            MaterialZone::Outer => (layout.outer_center, mapping.outer_rho(tag.ring), -theta),
        };
        let uv = center + DVec2::new(det_cos(theta), det_sin(theta)) * (rho * layout.island_radius);
        uv.as_vec2().to_array()
    };

    mesh.faces
        .iter()
        .zip(&mesh.zones)
        .map(|(face, &zone)| face.map(|v| corner(mesh.tags[v as usize], zone)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::assign_zones;
    use crate::mesher::{DEFAULT_MERGE_TOLERANCE, Skirt, build_mesh};
    use crate::perturb::{NoiseSeeds, perturb};
    use crate::sampler::RandomSampler;

    fn uv_mesh(params: &CraterParameters, margin: f64) -> (CraterMesh, UvLayout) {
        let profile = RadialProfile::build(params);
        let seeds = NoiseSeeds::draw(&mut RandomSampler::new(params.seed));
        let grid = perturb(&profile, params, seeds, usize::MAX);
        let mut mesh = build_mesh(&grid, Skirt::from_params(params), DEFAULT_MERGE_TOLERANCE);
        mesh.zones = assign_zones(
            &mesh.faces,
            &mesh.tags,
            profile.boundary_ring(),
            profile.rim_ring(),
        );
        let layout = UvLayout::new(margin).unwrap();
        mesh.uvs = compute_uvs(&mesh, &profile, params, &layout);
        (mesh, layout)
    }

    fn signed_area(uv: &[[f32; 2]; 3]) -> f32 {
        let [a, b, c] = uv;
        (b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1])
    }

    #[test]
    fn test_layout_rejects_bad_margin() {
        assert!(UvLayout::new(-0.1).is_err());
        assert!(UvLayout::new(0.34).is_err());
        assert!(UvLayout::new(0.0).is_ok());
    }

    #[test]
    fn test_islands_fill_width() {
        let m = 0.05;
        let layout = UvLayout::new(m).unwrap();
        let r = layout.island_radius;
        assert!((layout.inner_center.x - r - m).abs() < 1e-12);
        assert!((layout.outer_center.x + r - (1.0 - m)).abs() < 1e-12);
        let gap = (layout.outer_center.x - r) - (layout.inner_center.x + r);
        assert!((gap - m).abs() < 1e-12);
    }

    #[test]
    fn test_uvs_stay_inside_islands() {
        for closed in [0.0, 1.0] {
            let params = CraterParameters {
                bottom_thickness: closed,
                ..Default::default()
            };
            let margin = DEFAULT_UV_MARGIN;
            let (mesh, layout) = uv_mesh(&params, margin);
            assert_eq!(mesh.uvs.len(), mesh.faces.len());
            for (uvs, zone) in mesh.uvs.iter().zip(&mesh.zones) {
                let center = match zone {
                    MaterialZone::Inner => layout.inner_center,
                    MaterialZone::Outer => layout.outer_center,
                };
                for uv in uvs {
                    assert!(
                        uv.iter().all(|c| (0.0..=1.0).contains(c)),
                        "uv {uv:?} outside unit square"
                    );
                    let d = DVec2::new(uv[0] as f64, uv[1] as f64).distance(center);
                    assert!(d <= layout.island_radius + 1e-6, "uv {uv:?} outside its island");
                }
            }
        }
    }

    #[test]
    fn test_uv_winding_is_counter_clockwise() {
        for (thickness, flare) in [(0.0, 0.0), (1.0, 0.0), (1.0, 25.0)] {
            let params = CraterParameters {
                bottom_thickness: thickness,
                skirt_flare: flare,
                skirt_rings: 4,
                ..Default::default()
            };
            let (mesh, _) = uv_mesh(&params, DEFAULT_UV_MARGIN);
            for (i, uvs) in mesh.uvs.iter().enumerate() {
                assert!(
                    signed_area(uvs) > 0.0,
                    "face {i} ({:?}) flipped in UV space: {uvs:?}",
                    mesh.zones[i]
                );
            }
        }
    }

    #[test]
    fn test_boundary_band_maps_to_island_rims() {
        let params = CraterParameters::default();
        let profile = RadialProfile::build(&params);
        let mapping = RingMapping::new(&profile, &params);
        let k = profile.boundary_ring() as u32;
        assert_eq!(mapping.inner_rho(0), 0.0);
        assert!(mapping.inner_rho(k) < 1.0);
        assert!(mapping.inner_rho(k) > mapping.inner_rho(k - 1));
        assert_eq!(mapping.inner_rho(k + 1), 1.0);
        assert_eq!(mapping.outer_rho(k), 1.0);
        let floor_center = profile.rim_ring() as u32 + params.skirt_rings + 1;
        assert!(mapping.outer_rho(floor_center).abs() < 1e-12);
    }

    #[test]
    fn test_skirt_rings_step_down_the_wall() {
        let params = CraterParameters {
            skirt_rings: 4,
            skirt_flare: 20.0,
            ..Default::default()
        };
        let profile = RadialProfile::build(&params);
        let mapping = RingMapping::new(&profile, &params);
        let rim = profile.rim_ring() as u32;
        let mut previous = mapping.outer_rho(rim);
        for ring in rim + 1..=rim + 5 {
            let rho = mapping.outer_rho(ring);
            assert!(rho < previous, "ring {ring} does not move inward on the island");
            previous = rho;
        }
    }

    #[test]
    fn test_open_shell_leaves_hole() {
        let params = CraterParameters {
            bottom_thickness: 0.0,
            ..Default::default()
        };
        let profile = RadialProfile::build(&params);
        let mapping = RingMapping::new(&profile, &params);
        let rim = mapping.outer_rho(profile.rim_ring() as u32);
        let expected = params.inner_radius / params.outer_radius;
        assert!((rim - expected).abs() < 1e-9, "rim rho {rim} expected {expected}");
    }

    #[test]
    fn test_seam_has_no_stretched_faces() {
        // A broken seam would drag one corner across the island.
        let (mesh, layout) = uv_mesh(&CraterParameters::default(), DEFAULT_UV_MARGIN);
        let limit = (0.65 * layout.island_radius) as f32;
        for (i, uvs) in mesh.uvs.iter().enumerate() {
            for e in 0..3 {
                let (a, b) = (uvs[e], uvs[(e + 1) % 3]);
                let length = ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt();
                assert!(length < limit, "face {i} has a UV edge of length {length}");
            }
        }
    }
}
