//! Radial cross-section of the crater before any noise is applied.
//!
//! The profile is a 2D path in (radius, height) space from the bottom center
//! to the outer rim. Rings are spaced evenly by path length so steep walls get
//! as many rings as flat floors of the same length.

use glam::DVec2;

use crate::material::MaterialZone;
use crate::params::CraterParameters;

/// One ring of the unperturbed profile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProfileRing {
    /// 0 is the bottom center, N is the outer rim.
    pub index: usize,
    /// Distance from the crater axis.
    pub radius: f64,
    /// Height relative to ground level.
    pub height: f64,
    /// Zone this ring belongs to.
    pub zone: MaterialZone,
    /// Cumulative path length from the bottom center.
    pub arc_length: f64,
}

/// Ordered rings `0..=N` plus the index of the inner/outer boundary ring.
#[derive(Clone, Debug)]
pub struct RadialProfile {
    rings: Vec<ProfileRing>,
    boundary: usize,
    inner_length: f64,
    outer_length: f64,
}

impl RadialProfile {
    /// Build the profile for `params`. Parameters are expected to be validated.
    pub fn build(params: &CraterParameters) -> Self {
        let n = params.rings();
        let inner = inner_path(params);
        let outer = outer_path(params);
        let inner_length = inner.length();
        let outer_length = outer.length();

        let boundary = boundary_index(n, inner_length, inner_length + outer_length);
        let mut rings = Vec::with_capacity(n + 1);

        rings.push(ProfileRing {
            index: 0,
            radius: 0.0,
            height: -params.depth,
            zone: MaterialZone::Inner,
            arc_length: 0.0,
        });

        for index in 1..=n {
            let (point, arc_length) = if index == boundary {
                (DVec2::new(params.inner_radius, 0.0), inner_length)
            } else if index == n {
                (
                    DVec2::new(params.outer_radius, params.rim_height),
                    inner_length + outer_length,
                )
            } else if index < boundary {
                let s = inner_length * index as f64 / boundary as f64;
                let p = inner.point_at(s);
                let p = DVec2::new(p.x.min(params.inner_radius), p.y.min(0.0));
                (p, s)
            } else {
                let t = (index - boundary) as f64 / (n - boundary) as f64;
                let s = outer_length * t;
                let p = outer.point_at(s);
                let p = DVec2::new(
                    p.x.clamp(params.inner_radius, params.outer_radius),
                    p.y.clamp(0.0, params.rim_height),
                );
                (p, inner_length + s)
            };

            rings.push(ProfileRing {
                index,
                radius: point.x,
                height: point.y,
                zone: if index <= boundary {
                    MaterialZone::Inner
                } else {
                    MaterialZone::Outer
                },
                arc_length,
            });
        }

        Self {
            rings,
            boundary,
            inner_length,
            outer_length,
        }
    }

    /// All rings, center first.
    pub fn rings(&self) -> &[ProfileRing] {
        &self.rings
    }

    /// Ring at `index`.
    pub fn ring(&self, index: usize) -> &ProfileRing {
        &self.rings[index]
    }

    /// Index of the outermost ring of the inner zone (`k`).
    pub fn boundary_ring(&self) -> usize {
        self.boundary
    }

    /// Index of the outer rim ring (`N`).
    pub fn rim_ring(&self) -> usize {
        self.rings.len() - 1
    }

    /// Path length from the bottom center to the boundary ring.
    pub fn inner_length(&self) -> f64 {
        self.inner_length
    }

    /// Path length from the boundary ring to the rim.
    pub fn outer_length(&self) -> f64 {
        self.outer_length
    }
}

/// `k` in proportion to the inner path's share, clamped to `[1, N - 1]`.
fn boundary_index(n: usize, inner_length: f64, total_length: f64) -> usize {
    let share = if total_length > 0.0 {
        inner_length / total_length
    } else {
        0.5
    };
    let k = (n as f64 * share).round() as usize;
    k.clamp(1, n - 1)
}

/// Horizontal run of a wall of `rise` at `degrees` from the horizontal.
///
/// Written as `rise · cos / sin` so a vertical wall gives a run of ~0
/// instead of dividing by `tan(90°)`.
fn wall_run(rise: f64, degrees: f64) -> f64 {
    let angle = degrees.to_radians();
    let sin = libm::sin(angle);
    if sin <= 0.0 {
        return f64::INFINITY;
    }
    (rise * libm::cos(angle) / sin).max(0.0)
}

fn inner_path(params: &CraterParameters) -> Polyline {
    let run = wall_run(params.depth, params.inner_wall_angle).min(params.inner_radius);
    Polyline::new(&[
        DVec2::new(0.0, -params.depth),
        DVec2::new(params.inner_radius - run, -params.depth),
        DVec2::new(params.inner_radius, 0.0),
    ])
}

fn outer_path(params: &CraterParameters) -> Polyline {
    let width = params.outer_radius - params.inner_radius;
    let run = wall_run(params.rim_height, params.outer_wall_angle).min(width);
    Polyline::new(&[
        DVec2::new(params.inner_radius, 0.0),
        DVec2::new(params.inner_radius + run, params.rim_height),
        DVec2::new(params.outer_radius, params.rim_height),
    ])
}

// ---------------------------------------------------------------------------
// Polyline
// ---------------------------------------------------------------------------

/// Piecewise-linear path with cumulative segment lengths.
#[derive(Clone, Debug)]
struct Polyline {
    points: Vec<DVec2>,
    cumulative: Vec<f64>,
}

impl Polyline {
    /// Consecutive duplicate points are dropped.
    fn new(points: &[DVec2]) -> Self {
        let mut kept: Vec<DVec2> = Vec::with_capacity(points.len());
        let mut cumulative = Vec::with_capacity(points.len());
        for &p in points {
            match kept.last() {
                Some(last) if last.distance(p) <= f64::EPSILON => {}
                Some(last) => {
                    let total = cumulative.last().copied().unwrap_or(0.0) + last.distance(p);
                    kept.push(p);
                    cumulative.push(total);
                }
                None => {
                    kept.push(p);
                    cumulative.push(0.0);
                }
            }
        }
        Self {
            points: kept,
            cumulative,
        }
    }

    fn length(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Point at path distance `s`, clamped to the ends.
    fn point_at(&self, s: f64) -> DVec2 {
        let Some(&first) = self.points.first() else {
            return DVec2::ZERO;
        };
        if s <= 0.0 {
            return first;
        }
        for i in 1..self.points.len() {
            let (start, end) = (self.cumulative[i - 1], self.cumulative[i]);
            if s <= end {
                let t = (s - start) / (end - start);
                return self.points[i - 1].lerp(self.points[i], t);
            }
        }
        self.points[self.points.len() - 1]
    }
}
