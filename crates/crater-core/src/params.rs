//! Crater shape parameters and their randomization ranges.

use serde::{Deserialize, Serialize};

use crate::error::CraterError;

/// Smallest accepted inner or outer radius, in world units.
pub const MIN_RADIUS: f64 = 1e-3;
/// Minimum number of profile rings (excluding the center point).
pub const MIN_RINGS: u32 = 3;
/// Maximum number of profile rings.
pub const MAX_RINGS: u32 = 1024;
/// Minimum number of angular segments per ring.
pub const MIN_SEGMENTS: u32 = 3;
/// Maximum number of angular segments per ring.
pub const MAX_SEGMENTS: u32 = 4096;
/// Steepest wall angle in degrees (a vertical wall).
pub const MAX_WALL_ANGLE: f64 = 90.0;
/// Widest skirt flare in degrees from vertical.
pub const MAX_SKIRT_FLARE: f64 = 75.0;
/// Maximum number of skirt rings between the rim and the floor edge.
pub const MAX_SKIRT_RINGS: u32 = 64;

/// Complete description of one crater.
///
/// Lengths are in world units, angles in degrees. Wall angles are measured
/// from the horizontal, so `90.0` is a vertical wall and small angles give a
/// shallow slope. Every numeric field can be randomized by setting the
/// matching entry in [`CraterParameters::ranges`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CraterParameters {
    /// Radius of the outer rim, where the outer slope reaches `rim_height`.
    pub outer_radius: f64,
    /// Radius of the bowl edge, where the profile crosses ground level.
    pub inner_radius: f64,
    /// Depth of the bowl floor below ground level.
    pub depth: f64,
    /// Height of the outer rim above ground level.
    pub rim_height: f64,
    /// Slope of the outer wall rising toward the rim, in degrees.
    pub outer_wall_angle: f64,
    /// Slope of the inner bowl wall, in degrees.
    pub inner_wall_angle: f64,
    /// Extra solid thickness below the lowest point. `0.0` leaves an open shell.
    pub bottom_thickness: f64,
    /// Outward lean of the closing skirt, in degrees from vertical.
    pub skirt_flare: f64,
    /// Rings in the closing skirt. The last one is the floor edge.
    pub skirt_rings: u32,
    /// Direction the blast pushed the ejecta toward, in degrees around +Z.
    pub blast_direction: f64,
    /// Blast asymmetry strength in `[0, 1]`. `0.0` is perfectly round.
    pub blast_asymmetry: f64,
    /// Amplitude of the jagged rim fragmentation, in world units.
    pub edge_fragmentation: f64,
    /// Angular frequency of the fragmentation noise.
    pub fragmentation_frequency: f64,
    /// Amplitude of the rim height variation, in world units.
    pub rim_noise: f64,
    /// Angular frequency of the rim height noise.
    pub rim_noise_frequency: f64,
    /// Surface detail amplitude inside the bowl.
    pub inner_surface_noise: f64,
    /// Surface detail amplitude on the outer slope.
    pub outer_surface_noise: f64,
    /// Spatial frequency of the surface detail noise.
    pub surface_noise_frequency: f64,
    /// Number of profile rings from the center to the outer rim.
    pub ring_count: u32,
    /// Number of angular segments around each ring.
    pub segment_count: u32,
    /// Seed for every stochastic stage.
    pub seed: u64,
    /// Optional randomization ranges, applied by [`crate::resolve_random_ranges`].
    pub ranges: RandomRanges,
}

impl Default for CraterParameters {
    fn default() -> Self {
        Self {
            outer_radius: 2.6,
            inner_radius: 1.3,
            depth: 0.5,
            rim_height: 0.58,
            outer_wall_angle: 35.0,
            inner_wall_angle: 50.0,
            bottom_thickness: 1.0,
            skirt_flare: 0.0,
            skirt_rings: 1,
            blast_direction: 0.0,
            blast_asymmetry: 0.0,
            edge_fragmentation: 0.0,
            fragmentation_frequency: 2.0,
            rim_noise: 0.0,
            rim_noise_frequency: 3.0,
            inner_surface_noise: 0.05,
            outer_surface_noise: 0.02,
            surface_noise_frequency: 1.0,
            ring_count: 8,
            segment_count: 24,
            seed: 0,
            ranges: RandomRanges::default(),
        }
    }
}

impl CraterParameters {
    /// Number of profile rings as an index bound.
    pub fn rings(&self) -> usize {
        self.ring_count as usize
    }

    /// Number of angular segments as an index bound.
    pub fn segments(&self) -> usize {
        self.segment_count as usize
    }

    /// Returns `true` if the generated solid gets a side wall and floor cap.
    pub fn is_closed(&self) -> bool {
        self.bottom_thickness > 0.0
    }

    /// Returns `true` if every noise and asymmetry amplitude is zero.
    pub fn is_noise_free(&self) -> bool {
        self.blast_asymmetry == 0.0
            && self.edge_fragmentation == 0.0
            && self.rim_noise == 0.0
            && self.inner_surface_noise == 0.0
            && self.outer_surface_noise == 0.0
    }

    /// Returns a copy with every noise and asymmetry amplitude set to zero.
    pub fn without_noise(&self) -> Self {
        Self {
            blast_asymmetry: 0.0,
            edge_fragmentation: 0.0,
            rim_noise: 0.0,
            inner_surface_noise: 0.0,
            outer_surface_noise: 0.0,
            ..self.clone()
        }
    }

    /// Checks every constraint on the fixed values and on the declared ranges.
    ///
    /// # Errors
    ///
    /// Returns [`CraterError::InvalidParameter`] naming the first offending field.
    pub fn validate(&self) -> Result<(), CraterError> {
        for (name, value) in self.float_fields() {
            if !value.is_finite() {
                return Err(CraterError::invalid(name, format!("{value} is not finite")));
            }
        }

        at_least("outer_radius", self.outer_radius, MIN_RADIUS)?;
        at_least("inner_radius", self.inner_radius, MIN_RADIUS)?;
        if self.inner_radius > self.outer_radius {
            return Err(CraterError::invalid(
                "inner_radius",
                format!(
                    "{} exceeds outer_radius {}",
                    self.inner_radius, self.outer_radius
                ),
            ));
        }

        at_least("depth", self.depth, 0.0)?;
        at_least("rim_height", self.rim_height, 0.0)?;
        wall_angle("outer_wall_angle", self.outer_wall_angle)?;
        wall_angle("inner_wall_angle", self.inner_wall_angle)?;
        at_least("bottom_thickness", self.bottom_thickness, 0.0)?;
        if !(0.0..=MAX_SKIRT_FLARE).contains(&self.skirt_flare) {
            return Err(CraterError::invalid(
                "skirt_flare",
                format!("{} degrees is outside [0, {MAX_SKIRT_FLARE}]", self.skirt_flare),
            ));
        }
        count_in("skirt_rings", self.skirt_rings, 1, MAX_SKIRT_RINGS)?;

        if !(0.0..=1.0).contains(&self.blast_asymmetry) {
            return Err(CraterError::invalid(
                "blast_asymmetry",
                format!("{} is outside [0, 1]", self.blast_asymmetry),
            ));
        }

        at_least("edge_fragmentation", self.edge_fragmentation, 0.0)?;
        at_least("rim_noise", self.rim_noise, 0.0)?;
        at_least("inner_surface_noise", self.inner_surface_noise, 0.0)?;
        at_least("outer_surface_noise", self.outer_surface_noise, 0.0)?;
        above_zero("fragmentation_frequency", self.fragmentation_frequency)?;
        above_zero("rim_noise_frequency", self.rim_noise_frequency)?;
        above_zero("surface_noise_frequency", self.surface_noise_frequency)?;

        count_in("ring_count", self.ring_count, MIN_RINGS, MAX_RINGS)?;
        count_in("segment_count", self.segment_count, MIN_SEGMENTS, MAX_SEGMENTS)?;

        self.ranges.validate()
    }

    fn float_fields(&self) -> [(&'static str, f64); 17] {
        [
            ("outer_radius", self.outer_radius),
            ("inner_radius", self.inner_radius),
            ("depth", self.depth),
            ("rim_height", self.rim_height),
            ("outer_wall_angle", self.outer_wall_angle),
            ("inner_wall_angle", self.inner_wall_angle),
            ("bottom_thickness", self.bottom_thickness),
            ("skirt_flare", self.skirt_flare),
            ("blast_direction", self.blast_direction),
            ("blast_asymmetry", self.blast_asymmetry),
            ("edge_fragmentation", self.edge_fragmentation),
            ("fragmentation_frequency", self.fragmentation_frequency),
            ("rim_noise", self.rim_noise),
            ("rim_noise_frequency", self.rim_noise_frequency),
            ("inner_surface_noise", self.inner_surface_noise),
            ("outer_surface_noise", self.outer_surface_noise),
            ("surface_noise_frequency", self.surface_noise_frequency),
        ]
    }
}

fn at_least(name: &'static str, value: f64, min: f64) -> Result<(), CraterError> {
    if value < min {
        return Err(CraterError::invalid(
            name,
            format!("{value} is below the minimum {min}"),
        ));
    }
    Ok(())
}

fn above_zero(name: &'static str, value: f64) -> Result<(), CraterError> {
    if value <= 0.0 {
        return Err(CraterError::invalid(name, format!("{value} must be positive")));
    }
    Ok(())
}

fn wall_angle(name: &'static str, degrees: f64) -> Result<(), CraterError> {
    if degrees <= 0.0 || degrees > MAX_WALL_ANGLE {
        return Err(CraterError::invalid(
            name,
            format!("{degrees} degrees is outside (0, {MAX_WALL_ANGLE}]"),
        ));
    }
    Ok(())
}

fn count_in(name: &'static str, value: u32, min: u32, max: u32) -> Result<(), CraterError> {
    if !(min..=max).contains(&value) {
        return Err(CraterError::invalid(
            name,
            format!("{value} is outside [{min}, {max}]"),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Randomization ranges
// ---------------------------------------------------------------------------

/// How values are drawn from a [`ParamRange`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeDistribution {
    /// Every value in `[min, max]` is equally likely.
    #[default]
    Uniform,
    /// Mean of two uniform draws: peaked at the midpoint, never outside the range.
    Triangular,
}

/// Inclusive `[min, max]` range for a floating-point parameter.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamRange {
    /// Lower bound (inclusive).
    pub min: f64,
    /// Upper bound (inclusive).
    pub max: f64,
    /// Distribution used when sampling.
    #[serde(default)]
    pub distribution: RangeDistribution,
}

impl ParamRange {
    /// A uniform range.
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            distribution: RangeDistribution::Uniform,
        }
    }

    /// A range sampled with [`RangeDistribution::Triangular`].
    pub fn triangular(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            distribution: RangeDistribution::Triangular,
        }
    }

    /// Returns `true` if `value` lies inside the inclusive range.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    fn validate(&self, name: &'static str) -> Result<(), CraterError> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(CraterError::invalid(name, "range bounds must be finite"));
        }
        if self.min > self.max {
            return Err(CraterError::invalid(
                name,
                format!("range min {} exceeds max {}", self.min, self.max),
            ));
        }
        Ok(())
    }
}

/// Inclusive `[min, max]` range for an integer parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    /// Lower bound (inclusive).
    pub min: u32,
    /// Upper bound (inclusive).
    pub max: u32,
}

impl CountRange {
    /// Creates a new count range.
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Returns `true` if `value` lies inside the inclusive range.
    pub fn contains(&self, value: u32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Per-parameter randomization ranges. `None` keeps the fixed value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomRanges {
    pub outer_radius: Option<ParamRange>,
    pub inner_radius: Option<ParamRange>,
    pub depth: Option<ParamRange>,
    pub rim_height: Option<ParamRange>,
    pub outer_wall_angle: Option<ParamRange>,
    pub inner_wall_angle: Option<ParamRange>,
    pub bottom_thickness: Option<ParamRange>,
    pub skirt_flare: Option<ParamRange>,
    pub blast_direction: Option<ParamRange>,
    pub blast_asymmetry: Option<ParamRange>,
    pub edge_fragmentation: Option<ParamRange>,
    pub fragmentation_frequency: Option<ParamRange>,
    pub rim_noise: Option<ParamRange>,
    pub rim_noise_frequency: Option<ParamRange>,
    pub inner_surface_noise: Option<ParamRange>,
    pub outer_surface_noise: Option<ParamRange>,
    pub surface_noise_frequency: Option<ParamRange>,
    pub ring_count: Option<CountRange>,
    pub segment_count: Option<CountRange>,
    pub skirt_rings: Option<CountRange>,
}

impl RandomRanges {
    /// The ranges used by the "random crater" action of the classic generator.
    pub fn classic() -> Self {
        Self {
            outer_radius: Some(ParamRange::new(1.0, 20.0)),
            inner_radius: Some(ParamRange::new(0.5, 10.0)),
            depth: Some(ParamRange::new(0.1, 10.0)),
            rim_height: Some(ParamRange::new(0.0, 5.0)),
            blast_direction: Some(ParamRange::new(0.0, 360.0)),
            blast_asymmetry: Some(ParamRange::new(0.0, 0.5)),
            edge_fragmentation: Some(ParamRange::new(0.0, 0.3)),
            rim_noise: Some(ParamRange::new(0.0, 0.3)),
            rim_noise_frequency: Some(ParamRange::new(1.0, 8.0)),
            inner_surface_noise: Some(ParamRange::new(0.0, 1.0)),
            outer_surface_noise: Some(ParamRange::new(0.0, 1.0)),
            segment_count: Some(CountRange::new(8, 64)),
            ..Self::default()
        }
    }

    /// Returns `true` if no range is set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub(crate) fn validate(&self) -> Result<(), CraterError> {
        let float_ranges = [
            ("ranges.outer_radius", self.outer_radius),
            ("ranges.inner_radius", self.inner_radius),
            ("ranges.depth", self.depth),
            ("ranges.rim_height", self.rim_height),
            ("ranges.outer_wall_angle", self.outer_wall_angle),
            ("ranges.inner_wall_angle", self.inner_wall_angle),
            ("ranges.bottom_thickness", self.bottom_thickness),
            ("ranges.skirt_flare", self.skirt_flare),
            ("ranges.blast_direction", self.blast_direction),
            ("ranges.blast_asymmetry", self.blast_asymmetry),
            ("ranges.edge_fragmentation", self.edge_fragmentation),
            ("ranges.fragmentation_frequency", self.fragmentation_frequency),
            ("ranges.rim_noise", self.rim_noise),
            ("ranges.rim_noise_frequency", self.rim_noise_frequency),
            ("ranges.inner_surface_noise", self.inner_surface_noise),
            ("ranges.outer_surface_noise", self.outer_surface_noise),
            ("ranges.surface_noise_frequency", self.surface_noise_frequency),
        ];
        for (name, range) in float_ranges {
            if let Some(range) = range {
                range.validate(name)?;
            }
        }

        for (name, range) in [
            ("ranges.ring_count", self.ring_count),
            ("ranges.segment_count", self.segment_count),
            ("ranges.skirt_rings", self.skirt_rings),
        ] {
            if let Some(range) = range
                && range.min > range.max
            {
                return Err(CraterError::invalid(
                    name,
                    format!("range min {} exceeds max {}", range.min, range.max),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_invalid(params: &CraterParameters, field: &str) {
        match params.validate() {
            Err(CraterError::InvalidParameter { name, .. }) => assert_eq!(name, field),
            other => panic!("expected InvalidParameter for {field}, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(CraterParameters::default().validate().is_ok());
    }

    #[test]
    fn test_inner_radius_above_outer_is_rejected() {
        let params = CraterParameters {
            outer_radius: 1.0,
            inner_radius: 1.5,
            ..Default::default()
        };
        assert_invalid(&params, "inner_radius");
    }

    #[test]
    fn test_equal_radii_are_accepted() {
        let params = CraterParameters {
            outer_radius: 1.0,
            inner_radius: 1.0,
            ..Default::default()
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_non_positive_radius_is_rejected() {
        let params = CraterParameters {
            outer_radius: 0.0,
            ..Default::default()
        };
        assert_invalid(&params, "outer_radius");
    }

    #[test]
    fn test_wall_angle_bounds() {
        for bad in [0.0, -10.0, 90.5] {
            let params = CraterParameters {
                inner_wall_angle: bad,
                ..Default::default()
            };
            assert_invalid(&params, "inner_wall_angle");
        }
        let vertical = CraterParameters {
            outer_wall_angle: 90.0,
            inner_wall_angle: 90.0,
            ..Default::default()
        };
        assert!(vertical.validate().is_ok());
    }

    #[test]
    fn test_skirt_bounds() {
        for bad in [-1.0, MAX_SKIRT_FLARE + 1.0] {
            let params = CraterParameters {
                skirt_flare: bad,
                ..Default::default()
            };
            assert_invalid(&params, "skirt_flare");
        }
        for bad in [0, MAX_SKIRT_RINGS + 1] {
            let params = CraterParameters {
                skirt_rings: bad,
                ..Default::default()
            };
            assert_invalid(&params, "skirt_rings");
        }
        let flared = CraterParameters {
            skirt_flare: 40.0,
            skirt_rings: 5,
            ..Default::default()
        };
        assert!(flared.validate().is_ok());
    }

    #[test]
    fn test_ring_count_below_minimum_is_rejected() {
        let params = CraterParameters {
            ring_count: 2,
            ..Default::default()
        };
        assert_invalid(&params, "ring_count");
    }

    #[test]
    fn test_segment_count_above_maximum_is_rejected() {
        let params = CraterParameters {
            segment_count: MAX_SEGMENTS + 1,
            ..Default::default()
        };
        assert_invalid(&params, "segment_count");
    }

    #[test]
    fn test_nan_is_rejected() {
        let params = CraterParameters {
            depth: f64::NAN,
            ..Default::default()
        };
        assert_invalid(&params, "depth");
    }

    #[test]
    fn test_asymmetry_above_one_is_rejected() {
        let params = CraterParameters {
            blast_asymmetry: 1.2,
            ..Default::default()
        };
        assert_invalid(&params, "blast_asymmetry");
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let params = CraterParameters {
            ranges: RandomRanges {
                depth: Some(ParamRange::new(2.0, 1.0)),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_invalid(&params, "ranges.depth");
    }

    #[test]
    fn test_inverted_count_range_is_rejected() {
        let params = CraterParameters {
            ranges: RandomRanges {
                ring_count: Some(CountRange::new(9, 4)),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_invalid(&params, "ranges.ring_count");
    }

    #[test]
    fn test_classic_ranges_are_valid() {
        let params = CraterParameters {
            ranges: RandomRanges::classic(),
            ..Default::default()
        };
        assert!(params.validate().is_ok());
        assert!(!params.ranges.is_empty());
        assert!(RandomRanges::default().is_empty());
    }

    #[test]
    fn test_without_noise_clears_every_amplitude() {
        let params = CraterParameters {
            blast_asymmetry: 0.4,
            edge_fragmentation: 0.2,
            rim_noise: 0.1,
            ..Default::default()
        };
        assert!(!params.is_noise_free());
        assert!(params.without_noise().is_noise_free());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let params: CraterParameters = ron::from_str("(depth: 2.0)").unwrap();
        assert_eq!(params.depth, 2.0);
        assert_eq!(params.outer_radius, CraterParameters::default().outer_radius);
    }

    #[test]
    fn test_ron_roundtrip_with_ranges() {
        let params = CraterParameters {
            ranges: RandomRanges {
                rim_height: Some(ParamRange::triangular(0.1, 0.4)),
                ring_count: Some(CountRange::new(4, 12)),
                ..Default::default()
            },
            ..Default::default()
        };
        let text = ron::to_string(&params).unwrap();
        let back: CraterParameters = ron::from_str(&text).unwrap();
        assert_eq!(params, back);
    }
}
