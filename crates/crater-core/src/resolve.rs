//! Replaces ranged parameters with concrete samples.

use crate::error::CraterError;
use crate::params::{CraterParameters, ParamRange, RandomRanges, RangeDistribution};
use crate::sampler::{RANGE_STREAM, RandomSampler};

/// Fraction of the outer radius used when a fixed inner radius does not fit
/// inside a sampled outer radius.
const INNER_FALLBACK_RATIO: f64 = 0.7;

impl ParamRange {
    /// Draw one value from this range.
    pub fn sample(&self, sampler: &mut RandomSampler) -> f64 {
        match self.distribution {
            RangeDistribution::Uniform => sampler.next_in_range(self.min, self.max),
            RangeDistribution::Triangular => {
                let a = sampler.next_in_range(self.min, self.max);
                let b = sampler.next_in_range(self.min, self.max);
                ((a + b) * 0.5).clamp(self.min, self.max)
            }
        }
    }
}

/// Resolve every range in `params` with a sampler seeded from `params.seed`.
///
/// The same parameters always resolve to the same values.
///
/// # Errors
///
/// Returns [`CraterError::InvalidParameter`] if a range is malformed or the
/// resolved parameters violate a constraint.
pub fn resolve_random_ranges(params: &CraterParameters) -> Result<CraterParameters, CraterError> {
    let mut sampler = RandomSampler::stream(params.seed, RANGE_STREAM);
    resolve_random_ranges_with(params, &mut sampler)
}

/// Resolve every range in `params`, drawing from a caller-owned sampler.
///
/// Fields are sampled in declaration order. The inner radius is drawn after
/// the outer radius and never exceeds it. The result has no ranges left.
///
/// # Errors
///
/// Returns [`CraterError::InvalidParameter`] if a range is malformed, the
/// inner radius range lies entirely above the sampled outer radius, or the
/// resolved parameters violate a constraint.
pub fn resolve_random_ranges_with(
    params: &CraterParameters,
    sampler: &mut RandomSampler,
) -> Result<CraterParameters, CraterError> {
    let ranges = &params.ranges;
    ranges.validate()?;

    let mut resolved = params.clone();
    resolved.ranges = RandomRanges::default();

    if let Some(range) = ranges.outer_radius {
        resolved.outer_radius = range.sample(sampler);
    }
    match ranges.inner_radius {
        Some(range) => {
            let max = range.max.min(resolved.outer_radius);
            if range.min > max {
                return Err(CraterError::invalid(
                    "ranges.inner_radius",
                    format!(
                        "minimum {} exceeds the sampled outer radius {}",
                        range.min, resolved.outer_radius
                    ),
                ));
            }
            resolved.inner_radius = ParamRange { max, ..range }.sample(sampler);
        }
        None if ranges.outer_radius.is_some() && resolved.inner_radius > resolved.outer_radius => {
            resolved.inner_radius = resolved.outer_radius * INNER_FALLBACK_RATIO;
        }
        None => {}
    }

    macro_rules! sample_fields {
        ($($field:ident),+ $(,)?) => {
            $(
                if let Some(range) = ranges.$field {
                    resolved.$field = range.sample(sampler);
                }
            )+
        };
    }

    sample_fields!(
        depth,
        rim_height,
        outer_wall_angle,
        inner_wall_angle,
        bottom_thickness,
        skirt_flare,
        blast_direction,
        blast_asymmetry,
        edge_fragmentation,
        fragmentation_frequency,
        rim_noise,
        rim_noise_frequency,
        inner_surface_noise,
        outer_surface_noise,
        surface_noise_frequency,
    );

    if let Some(range) = ranges.ring_count {
        resolved.ring_count = sampler.next_int_in_range(range.min, range.max);
    }
    if let Some(range) = ranges.segment_count {
        resolved.segment_count = sampler.next_int_in_range(range.min, range.max);
    }
    if let Some(range) = ranges.skirt_rings {
        resolved.skirt_rings = sampler.next_int_in_range(range.min, range.max);
    }

    resolved.validate()?;
    log::debug!(
        "resolved seed {}: outer {:.3}, inner {:.3}, depth {:.3}, {} rings x {} segments",
        params.seed,
        resolved.outer_radius,
        resolved.inner_radius,
        resolved.depth,
        resolved.ring_count,
        resolved.segment_count
    );
    Ok(resolved)
}
