//! End-to-end crater generation: parameters in, mesh and report out.

use serde::{Deserialize, Serialize};

use crate::error::CraterError;
use crate::estimator::{PerformanceReport, PerformanceThresholds, estimate};
use crate::material::assign_zones;
use crate::mesh::CraterMesh;
use crate::mesher::{DEFAULT_MERGE_TOLERANCE, Skirt, build_mesh};
use crate::params::CraterParameters;
use crate::perturb::{NoiseSeeds, perturb};
use crate::profile::RadialProfile;
use crate::resolve::resolve_random_ranges;
use crate::sampler::{BATCH_STREAM, PERTURBATION_STREAM, RandomSampler};
use crate::uv::{DEFAULT_UV_MARGIN, UvLayout, compute_uvs};

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Generator tuning that is not part of a crater's shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    /// Gap between UV islands and around the border, in `[0, 1/3)`.
    pub uv_margin: f64,
    /// Samples closer than this to a neighbouring vertex are merged.
    pub merge_tolerance: f64,
    /// Triangle thresholds for the performance buckets.
    pub thresholds: PerformanceThresholds,
    /// Grid size (rings x segments) at which perturbation goes parallel.
    pub parallel_threshold: usize,
    /// Worker threads for batch generation. `0` uses one per logical CPU.
    pub worker_threads: usize,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            uv_margin: DEFAULT_UV_MARGIN,
            merge_tolerance: DEFAULT_MERGE_TOLERANCE,
            thresholds: PerformanceThresholds::default(),
            parallel_threshold: 16_384,
            worker_threads: 0,
        }
    }
}

impl GeneratorSettings {
    /// Checks every setting.
    ///
    /// # Errors
    ///
    /// Returns [`CraterError::InvalidParameter`] naming the offending setting.
    pub fn validate(&self) -> Result<(), CraterError> {
        UvLayout::new(self.uv_margin)?;
        if !self.merge_tolerance.is_finite() || self.merge_tolerance < 0.0 {
            return Err(CraterError::invalid(
                "merge_tolerance",
                format!("{} must be finite and non-negative", self.merge_tolerance),
            ));
        }
        if self.thresholds.medium_triangles > self.thresholds.high_triangles {
            return Err(CraterError::invalid(
                "thresholds",
                format!(
                    "medium threshold {} exceeds high threshold {}",
                    self.thresholds.medium_triangles, self.thresholds.high_triangles
                ),
            ));
        }
        Ok(())
    }

    fn workers(&self, jobs: usize) -> usize {
        let wanted = if self.worker_threads == 0 {
            num_cpus::get()
        } else {
            self.worker_threads
        };
        wanted.clamp(1, jobs.max(1))
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// A finished crater.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedCrater {
    /// Parameters after range resolution. Feeding these back in reproduces
    /// the same mesh.
    pub params: CraterParameters,
    /// The mesh with UVs and material zones.
    pub mesh: CraterMesh,
    /// Size and cost summary.
    pub report: PerformanceReport,
}

impl GeneratedCrater {
    /// Split into parameters, mesh, and report.
    pub fn into_parts(self) -> (CraterParameters, CraterMesh, PerformanceReport) {
        (self.params, self.mesh, self.report)
    }
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Crater generator holding its settings.
///
/// Generation is a pure function of the parameters and settings: the same
/// input always yields the same mesh, bit for bit.
#[derive(Clone, Debug, Default)]
pub struct CraterGenerator {
    settings: GeneratorSettings,
}

impl CraterGenerator {
    /// Create a generator with custom settings.
    pub fn new(settings: GeneratorSettings) -> Self {
        Self { settings }
    }

    /// Current settings.
    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    /// Generate one crater.
    ///
    /// Ranges in `params` are resolved first with a sampler seeded from
    /// `params.seed`.
    ///
    /// # Errors
    ///
    /// Returns [`CraterError::InvalidParameter`] for invalid parameters or
    /// settings, and [`CraterError::DegenerateGeometry`] if no faces survive.
    pub fn generate(&self, params: &CraterParameters) -> Result<GeneratedCrater, CraterError> {
        self.settings.validate()?;
        let layout = UvLayout::new(self.settings.uv_margin)?;

        let params = if params.ranges.is_empty() {
            params.validate()?;
            params.clone()
        } else {
            resolve_random_ranges(params)?
        };

        let profile = RadialProfile::build(&params);
        let seeds = NoiseSeeds::draw(&mut RandomSampler::stream(params.seed, PERTURBATION_STREAM));
        let grid = perturb(&profile, &params, seeds, self.settings.parallel_threshold);

        let skirt = Skirt::from_params(&params);
        let mut mesh = build_mesh(&grid, skirt, self.settings.merge_tolerance);
        if mesh.is_empty() {
            return Err(CraterError::DegenerateGeometry(format!(
                "{} rings x {} segments collapsed to no faces",
                params.ring_count, params.segment_count
            )));
        }

        mesh.zones = assign_zones(
            &mesh.faces,
            &mesh.tags,
            profile.boundary_ring(),
            profile.rim_ring(),
        );
        mesh.uvs = compute_uvs(&mesh, &profile, &params, &layout);
        let report = estimate(&mesh, &self.settings.thresholds);

        log::debug!(
            "generated crater seed {}: {} vertices, {} triangles ({} cost)",
            params.seed,
            report.vertex_count,
            report.triangle_count,
            report.bucket
        );

        Ok(GeneratedCrater {
            params,
            mesh,
            report,
        })
    }

    /// Generate `count` craters from `base`, each with its own seed.
    ///
    /// Seeds are drawn up front from `base.seed`, so the output depends only
    /// on `base` and `count`, never on thread scheduling. Results are in
    /// index order.
    ///
    /// # Errors
    ///
    /// Returns the error of the lowest-index crater that failed.
    pub fn generate_batch(
        &self,
        base: &CraterParameters,
        count: usize,
    ) -> Result<Vec<GeneratedCrater>, CraterError> {
        self.settings.validate()?;
        base.ranges.validate()?;

        let mut seeder = RandomSampler::stream(base.seed, BATCH_STREAM);
        let jobs: Vec<(usize, CraterParameters)> = (0..count)
            .map(|index| {
                let params = CraterParameters {
                    seed: seeder.next_seed_u64(),
                    ..base.clone()
                };
                (index, params)
            })
            .collect();

        let workers = self.settings.workers(count);
        log::info!("generating batch of {count} craters on {workers} workers");

        type Job = (usize, CraterParameters);
        type Outcome = (usize, Result<GeneratedCrater, CraterError>);
        let capacity = count.max(1);
        let (job_tx, job_rx) = crossbeam_channel::bounded::<Job>(capacity);
        let (result_tx, result_rx) = crossbeam_channel::bounded::<Outcome>(capacity);
        for job in jobs {
            // Capacity covers every job, so this never blocks.
            let _ = job_tx.send(job);
        }
        drop(job_tx);

        std::thread::scope(|scope| {
            for _ in 0..workers {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    while let Ok((index, params)) = job_rx.recv() {
                        let _ = result_tx.send((index, self.generate(&params)));
                    }
                });
            }
        });
        drop(result_tx);

        let mut slots: Vec<Option<Result<GeneratedCrater, CraterError>>> =
            (0..count).map(|_| None).collect();
        for (index, result) in result_rx.iter() {
            slots[index] = Some(result);
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| {
                    Err(CraterError::DegenerateGeometry(format!(
                        "batch crater {index} produced no result"
                    )))
                })
            })
            .collect()
    }
}

/// Generate one crater with default settings.
///
/// # Errors
///
/// See [`CraterGenerator::generate`].
pub fn generate(params: &CraterParameters) -> Result<GeneratedCrater, CraterError> {
    CraterGenerator::default().generate(params)
}
