//! Seam-free noise for ring perturbation plus deterministic trigonometry.
//!
//! Angular noise is sampled on a circle in 3D noise space, so the value at
//! θ = 0 and θ = 2π is the same point and ring seams never show a jump.

use noise::{NoiseFn, Simplex};

// ---------------------------------------------------------------------------
// Deterministic math (libm)
// ---------------------------------------------------------------------------

/// Deterministic sine using libm (not platform libc).
#[inline]
pub fn det_sin(x: f64) -> f64 {
    libm::sin(x)
}

/// Deterministic cosine using libm.
#[inline]
pub fn det_cos(x: f64) -> f64 {
    libm::cos(x)
}

/// Angle of segment `segment` out of `segments`, in radians.
#[inline]
pub fn segment_angle(segment: usize, segments: usize) -> f64 {
    std::f64::consts::TAU * segment as f64 / segments as f64
}

// ---------------------------------------------------------------------------
// Periodic fBm
// ---------------------------------------------------------------------------

/// Offset between rings along the third noise axis. Irrational-ish so ring
/// samples never land on simplex lattice points.
const RING_STEP: f64 = 0.37;
/// Fixed third coordinate for planar samples.
const PLANAR_SLICE: f64 = 17.13;

/// Multi-octave simplex noise with a circular angular domain.
///
/// Output is normalized by the geometric sum of octave amplitudes and clamped
/// to `[-1, 1]`.
#[derive(Clone, Debug)]
pub struct PeriodicNoise {
    noise: Simplex,
    octaves: u32,
    lacunarity: f64,
    persistence: f64,
}

impl PeriodicNoise {
    /// Octave count used by the perturbation stage.
    pub const DEFAULT_OCTAVES: u32 = 3;

    /// Create a noise source with [`Self::DEFAULT_OCTAVES`].
    pub fn new(seed: u32) -> Self {
        Self::with_octaves(seed, Self::DEFAULT_OCTAVES)
    }

    /// Create a noise source with an explicit octave count (at least 1).
    pub fn with_octaves(seed: u32, octaves: u32) -> Self {
        Self {
            noise: Simplex::new(seed),
            octaves: octaves.max(1),
            lacunarity: 2.0,
            persistence: 0.5,
        }
    }

    /// Sample at angle `theta` on ring `ring`.
    ///
    /// `frequency` is the radius of the sampling circle in noise space, so
    /// higher values give more lobes around the ring.
    pub fn sample(&self, theta: f64, ring: usize, frequency: f64) -> f64 {
        let x = det_cos(theta) * frequency;
        let y = det_sin(theta) * frequency;
        self.fbm([x, y, ring as f64 * RING_STEP])
    }

    /// Sample at a point on the ground plane.
    pub fn sample_planar(&self, x: f64, y: f64, frequency: f64) -> f64 {
        self.fbm([x * frequency, y * frequency, PLANAR_SLICE])
    }

    fn fbm(&self, point: [f64; 3]) -> f64 {
        let mut total = 0.0;
        let mut norm = 0.0;
        let mut frequency = 1.0;
        let mut amplitude = 1.0;

        for _ in 0..self.octaves {
            let p = [point[0] * frequency, point[1] * frequency, point[2] * frequency];
            total += self.noise.get(p) * amplitude;
            norm += amplitude;

            frequency *= self.lacunarity;
            amplitude *= self.persistence;
        }

        (total / norm).clamp(-1.0, 1.0)
    }
}
