//! Perturbation stage: turns the radial profile into a ring x segment grid of
//! noisy samples.
//!
//! Every sample is a pure function of the profile, the parameters, the noise
//! seeds, and its (ring, segment) position. That makes the grid independent
//! of evaluation order, so it can be split across threads freely.

use crate::params::CraterParameters;
use crate::periodic::{PeriodicNoise, det_cos, det_sin, segment_angle};
use crate::profile::RadialProfile;
use crate::sampler::RandomSampler;

/// Width of the inner/outer surface noise blend, as a fraction of `inner_radius`
/// on each side of the boundary.
const SURFACE_BLEND: f64 = 0.3;
/// Surface noise never exceeds this fraction of the crater relief.
const SURFACE_GUARD_FRACTION: f64 = 0.2;
/// Absolute cap on surface noise, in world units.
const SURFACE_GUARD_MAX: f64 = 0.5;

// ---------------------------------------------------------------------------
// Seeds
// ---------------------------------------------------------------------------

/// Seeds for the independent noise channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NoiseSeeds {
    /// Rim fragmentation noise.
    pub fragmentation: u32,
    /// Rim height noise.
    pub rim: u32,
    /// Surface detail noise.
    pub surface: u32,
}

impl NoiseSeeds {
    /// Draw all seeds in a fixed order.
    pub fn draw(sampler: &mut RandomSampler) -> Self {
        let fragmentation = sampler.next_seed_u32();
        let rim = sampler.next_seed_u32();
        let surface = sampler.next_seed_u32();
        Self {
            fragmentation,
            rim,
            surface,
        }
    }
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// One perturbed (ring, segment) sample.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PerturbedSample {
    /// Profile ring index.
    pub ring: usize,
    /// Angular segment index.
    pub segment: usize,
    /// Radius before perturbation.
    pub base_radius: f64,
    /// Height before perturbation.
    pub base_height: f64,
    /// Offset added to the radius.
    pub radius_offset: f64,
    /// Offset added to the height.
    pub height_offset: f64,
}

impl PerturbedSample {
    /// Final radius.
    pub fn radius(&self) -> f64 {
        self.base_radius + self.radius_offset
    }

    /// Final height.
    pub fn height(&self) -> f64 {
        self.base_height + self.height_offset
    }
}

/// `(N + 1) x S` samples, stored one segment column at a time.
///
/// Segment indices wrap modulo the segment count, so `get(r, S)` is the same
/// sample as `get(r, 0)`.
#[derive(Clone, Debug, PartialEq)]
pub struct PerturbedGrid {
    samples: Vec<PerturbedSample>,
    levels: usize,
    segments: usize,
}

impl PerturbedGrid {
    /// Sample at `ring` and `segment` (wrapped).
    pub fn get(&self, ring: usize, segment: usize) -> &PerturbedSample {
        &self.samples[(segment % self.segments) * self.levels + ring]
    }

    /// Number of rings including the center (`N + 1`).
    pub fn levels(&self) -> usize {
        self.levels
    }

    /// Number of angular segments.
    pub fn segments(&self) -> usize {
        self.segments
    }
}

// ---------------------------------------------------------------------------
// Perturbation
// ---------------------------------------------------------------------------

/// Noise sources and constants shared by every column.
struct Perturber<'a> {
    profile: &'a RadialProfile,
    params: &'a CraterParameters,
    fragmentation: PeriodicNoise,
    rim: PeriodicNoise,
    surface: PeriodicNoise,
    blast_direction: f64,
    ramp_start: usize,
    ramp_width: usize,
    surface_guard: f64,
}

impl<'a> Perturber<'a> {
    fn new(profile: &'a RadialProfile, params: &'a CraterParameters, seeds: NoiseSeeds) -> Self {
        let n = profile.rim_ring();
        let k = profile.boundary_ring();
        // Fragmentation ramps up over the outer third of the outer zone.
        let ramp_width = (n - k).div_ceil(3).max(1);
        let relief = params.rim_height.max(params.depth);
        Self {
            profile,
            params,
            fragmentation: PeriodicNoise::new(seeds.fragmentation),
            rim: PeriodicNoise::new(seeds.rim),
            surface: PeriodicNoise::new(seeds.surface),
            blast_direction: params.blast_direction.to_radians(),
            ramp_start: n - ramp_width,
            ramp_width,
            surface_guard: (relief * SURFACE_GUARD_FRACTION).min(SURFACE_GUARD_MAX),
        }
    }

    /// Fill one segment column, center first.
    fn column(&self, segment: usize, segments: usize, out: &mut [PerturbedSample]) {
        let theta = segment_angle(segment, segments);
        let (sin, cos) = (det_sin(theta), det_cos(theta));
        let n = self.profile.rim_ring();
        let k = self.profile.boundary_ring();
        let p = self.params;
        let mut previous_radius = 0.0_f64;

        for (ring, slot) in out.iter_mut().enumerate() {
            let base = self.profile.ring(ring);
            let mut radius = base.radius;
            let mut height = base.height;

            if ring > 0 {
                if ring > k {
                    if p.blast_asymmetry > 0.0 {
                        let stretch =
                            1.0 + p.blast_asymmetry * det_cos(theta - self.blast_direction);
                        radius = p.inner_radius + (radius - p.inner_radius) * stretch;
                        height *= stretch;
                    }

                    if p.edge_fragmentation > 0.0 && ring > self.ramp_start {
                        let t = (ring - self.ramp_start) as f64 / self.ramp_width as f64;
                        let weight = t * t;
                        let jag = self
                            .fragmentation
                            .sample(theta, ring, p.fragmentation_frequency);
                        radius += p.edge_fragmentation * jag * weight;
                        height -= p.edge_fragmentation * jag.max(0.0) * weight;
                    }
                }

                if ring == n && p.rim_noise > 0.0 {
                    height += p.rim_noise * self.rim.sample(theta, 0, p.rim_noise_frequency);
                }

                radius = radius.max(previous_radius).max(0.0);
            }

            let (x, y) = if ring == 0 {
                (0.0, 0.0)
            } else {
                (radius * cos, radius * sin)
            };
            height += self.surface_offset(x, y, base.radius);
            previous_radius = radius;

            *slot = PerturbedSample {
                ring,
                segment,
                base_radius: base.radius,
                base_height: base.height,
                radius_offset: radius - base.radius,
                height_offset: height - base.height,
            };
        }
    }

    /// Surface detail at a ground point, blended between the bowl and slope
    /// amplitudes around `inner_radius`.
    fn surface_offset(&self, x: f64, y: f64, base_radius: f64) -> f64 {
        let p = self.params;
        if p.inner_surface_noise == 0.0 && p.outer_surface_noise == 0.0 {
            return 0.0;
        }
        let band = p.inner_radius * SURFACE_BLEND;
        let t = ((base_radius - (p.inner_radius - band)) / (2.0 * band)).clamp(0.0, 1.0);
        let amplitude = p.inner_surface_noise * (1.0 - t) + p.outer_surface_noise * t;
        let value = amplitude * self.surface.sample_planar(x, y, p.surface_noise_frequency);
        value.clamp(-self.surface_guard, self.surface_guard)
    }
}

/// Perturb `profile` into a full grid.
///
/// Columns are split across worker threads when the grid holds at least
/// `parallel_threshold` samples. The result does not depend on the split.
pub fn perturb(
    profile: &RadialProfile,
    params: &CraterParameters,
    seeds: NoiseSeeds,
    parallel_threshold: usize,
) -> PerturbedGrid {
    let levels = profile.rings().len();
    let segments = params.segments();
    let perturber = Perturber::new(profile, params, seeds);
    let mut samples = vec![PerturbedSample::default(); levels * segments];

    let workers = num_cpus::get().clamp(1, segments);
    if samples.len() < parallel_threshold || workers == 1 {
        for (segment, column) in samples.chunks_mut(levels).enumerate() {
            perturber.column(segment, segments, column);
        }
    } else {
        let per_worker = segments.div_ceil(workers);
        log::debug!(
            "perturbing {} samples on {} workers ({} segments each)",
            samples.len(),
            workers,
            per_worker
        );
        let perturber = &perturber;
        std::thread::scope(|scope| {
            for (chunk_index, chunk) in samples.chunks_mut(per_worker * levels).enumerate() {
                scope.spawn(move || {
                    let first = chunk_index * per_worker;
                    for (offset, column) in chunk.chunks_mut(levels).enumerate() {
                        perturber.column(first + offset, segments, column);
                    }
                });
            }
        });
    }

    PerturbedGrid {
        samples,
        levels,
        segments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_for(params: &CraterParameters, threshold: usize) -> (RadialProfile, PerturbedGrid) {
        let profile = RadialProfile::build(params);
        let seeds = NoiseSeeds::draw(&mut RandomSampler::new(params.seed));
        let grid = perturb(&profile, params, seeds, threshold);
        (profile, grid)
    }

    fn noisy() -> CraterParameters {
        CraterParameters {
            blast_asymmetry: 0.4,
            blast_direction: 30.0,
            edge_fragmentation: 0.3,
            rim_noise: 0.2,
            inner_surface_noise: 0.3,
            outer_surface_noise: 0.2,
            ring_count: 10,
            segment_count: 32,
            seed: 77,
            ..Default::default()
        }
    }

    #[test]
    fn test_zero_noise_keeps_profile() {
        let params = CraterParameters::default().without_noise();
        let (profile, grid) = grid_for(&params, usize::MAX);
        for ring in profile.rings() {
            for s in 0..params.segments() {
                let sample = grid.get(ring.index, s);
                assert!((sample.radius() - ring.radius).abs() < 1e-12);
                assert!((sample.height() - ring.height).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_grid_wraps_segments() {
        let params = noisy();
        let (_, grid) = grid_for(&params, usize::MAX);
        let s = params.segments();
        for ring in 0..grid.levels() {
            assert_eq!(grid.get(ring, s), grid.get(ring, 0));
            assert_eq!(grid.get(ring, s + 3), grid.get(ring, 3));
        }
    }

    #[test]
    fn test_center_is_a_single_point() {
        let params = noisy();
        let (_, grid) = grid_for(&params, usize::MAX);
        let first = grid.get(0, 0);
        for s in 1..params.segments() {
            let sample = grid.get(0, s);
            assert_eq!(sample.radius(), 0.0);
            assert_eq!(sample.height().to_bits(), first.height().to_bits());
        }
    }

    #[test]
    fn test_radii_never_fold() {
        let params = CraterParameters {
            edge_fragmentation: 2.0,
            blast_asymmetry: 1.0,
            ..noisy()
        };
        let (_, grid) = grid_for(&params, usize::MAX);
        for s in 0..grid.segments() {
            for ring in 1..grid.levels() {
                let inner = grid.get(ring - 1, s).radius();
                let outer = grid.get(ring, s).radius();
                assert!(
                    outer >= inner && outer >= 0.0,
                    "segment {s}: ring {ring} radius {outer} folded inside {inner}"
                );
            }
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let params = CraterParameters {
            segment_count: 97,
            ring_count: 20,
            ..noisy()
        };
        let (_, sequential) = grid_for(&params, usize::MAX);
        let (_, parallel) = grid_for(&params, 0);
        assert_eq!(sequential, parallel, "parallel perturbation must be bit-identical");
    }

    #[test]
    fn test_blast_stretches_toward_direction() {
        let params = CraterParameters {
            blast_asymmetry: 0.5,
            blast_direction: 0.0,
            segment_count: 8,
            ..CraterParameters::default().without_noise()
        };
        let (profile, grid) = grid_for(&params, usize::MAX);
        let rim = profile.rim_ring();
        let toward = grid.get(rim, 0).radius();
        let away = grid.get(rim, 4).radius();
        let side = grid.get(rim, 2).radius();
        assert!(toward > side && side > away, "{toward} > {side} > {away} expected");
        assert!((side - params.outer_radius).abs() < 1e-9);
        // Inner zone is untouched by the blast.
        let k = profile.boundary_ring();
        assert_eq!(grid.get(k, 0).radius(), params.inner_radius);
        assert_eq!(grid.get(k, 4).radius(), params.inner_radius);
    }

    #[test]
    fn test_rim_noise_only_moves_rim_heights() {
        let params = CraterParameters {
            rim_noise: 0.3,
            ..CraterParameters::default().without_noise()
        };
        let (profile, grid) = grid_for(&params, usize::MAX);
        let rim = profile.rim_ring();
        let mut moved = false;
        for s in 0..grid.segments() {
            for ring in 0..rim {
                assert_eq!(grid.get(ring, s).height_offset, 0.0);
            }
            let offset = grid.get(rim, s).height_offset;
            assert!(offset.abs() <= params.rim_noise + 1e-12);
            moved |= offset != 0.0;
        }
        assert!(moved, "rim noise should change at least one rim height");
    }

    #[test]
    fn test_surface_noise_is_guarded() {
        let params = CraterParameters {
            inner_surface_noise: 5.0,
            outer_surface_noise: 5.0,
            ..CraterParameters::default().without_noise()
        };
        let (_, grid) = grid_for(&params, usize::MAX);
        let guard = (params.rim_height.max(params.depth) * 0.2).min(0.5);
        for s in 0..grid.segments() {
            for ring in 0..grid.levels() {
                let offset = grid.get(ring, s).height_offset;
                assert!(offset.abs() <= guard + 1e-12, "offset {offset} exceeds guard {guard}");
            }
        }
    }
}
