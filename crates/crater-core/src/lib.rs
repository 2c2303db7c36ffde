//! Procedural impact crater mesh generation.
//!
//! The pipeline runs strictly forward: [`CraterParameters`] (with optional
//! randomization ranges) build a [`profile::RadialProfile`], the
//! [`perturb`](perturb::perturb) stage adds blast asymmetry, rim
//! fragmentation, and surface noise, the [`mesher`] tessellates the rings
//! into a [`CraterMesh`], and material zones, UVs, and a
//! [`PerformanceReport`] are attached before the result is returned.
//!
//! ```no_run
//! use crater_core::{CraterParameters, generate};
//!
//! let crater = generate(&CraterParameters::default())?;
//! println!("{} triangles", crater.report.triangle_count);
//! # Ok::<(), crater_core::CraterError>(())
//! ```

pub mod error;
pub mod estimator;
pub mod generator;
pub mod material;
pub mod mesh;
pub mod mesher;
pub mod params;
pub mod periodic;
pub mod perturb;
pub mod profile;
pub mod resolve;
pub mod sampler;
pub mod uv;

pub use error::CraterError;
pub use estimator::{
    PerformanceBucket, PerformanceReport, PerformanceThresholds, estimate, predict_counts,
};
pub use generator::{CraterGenerator, GeneratedCrater, GeneratorSettings, generate};
pub use material::{MaterialError, MaterialZone, ZoneMaterial, ZoneMaterials, assign_zones};
pub use mesh::{CraterMesh, CraterVertex, VertexTag};
pub use mesher::{DEFAULT_MERGE_TOLERANCE, Skirt, build_mesh};
pub use params::{
    CountRange, CraterParameters, MAX_RINGS, MAX_SEGMENTS, MIN_RADIUS, MIN_RINGS, MIN_SEGMENTS,
    ParamRange, RandomRanges, RangeDistribution,
};
pub use periodic::PeriodicNoise;
pub use perturb::{NoiseSeeds, PerturbedGrid, PerturbedSample};
pub use profile::{ProfileRing, RadialProfile};
pub use resolve::{resolve_random_ranges, resolve_random_ranges_with};
pub use sampler::RandomSampler;
pub use uv::{DEFAULT_UV_MARGIN, UvLayout};
