//! Observation pipeline orchestration.
//!
//! [`observe`] runs the full synthesis: frame transform, grid and mask
//! construction, cell assignment, per-cell flux and velocity composition,
//! and per-slice seeing blur. It owns the only parallel decomposition
//! layer: per-cell and per-slice work fans out over one `rayon` pool and
//! nothing downstream spawns further parallelism, so callers must not wrap
//! pipeline calls in a parallel region of their own. The pool size
//! defaults from the `SPAXEL_NUM_THREADS` environment variable, read once
//! at first use and fixed for the process lifetime.

use ndarray::Array3;
use once_cell::sync::Lazy;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::assign::CellIndex;
use crate::blur;
use crate::config::{Environment, Instrument};
use crate::cube::composite_cell;
use crate::error::ObservationError;
use crate::flux::{cell_fluxes, FluxContext};
use crate::frame::to_observer_frame;
use crate::grid::ObservationGrid;
use crate::particle::Particle;
use crate::photometry::{bandpass_for, SedModel};

/// Name of the thread-count environment variable.
pub const THREADS_ENV_VAR: &str = "SPAXEL_NUM_THREADS";

/// Process-wide default worker count, read from the environment exactly
/// once. Unset, empty or unparsable values fall back to 1 (sequential).
static ENV_THREADS: Lazy<usize> = Lazy::new(|| {
    std::env::var(THREADS_ENV_VAR)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(1)
});

/// Worker pool size for one observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadCount(usize);

impl ThreadCount {
    /// Explicit worker count; zero is treated as 1.
    pub fn new(threads: usize) -> Self {
        Self(threads.max(1))
    }

    /// The process-wide default from `SPAXEL_NUM_THREADS`.
    pub fn from_env() -> Self {
        Self(*ENV_THREADS)
    }

    /// Number of workers.
    pub fn get(&self) -> usize {
        self.0
    }
}

impl Default for ThreadCount {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Terminal artifact of one observation.
#[derive(Debug, Clone)]
pub struct Observation {
    /// Flux cube indexed `(x, y, velocity)`, erg/s/cm^2 per voxel.
    pub cube: Array3<f64>,
    /// Derived observation parameters, for the cube exporter's header.
    pub summary: ObservationGrid,
    /// Particles dropped for non-finite records.
    pub skipped_particles: usize,
}

/// Synthesize an IFU observation of `particles`.
///
/// The catalog must already be in the observer frame (see
/// [`to_observer_frame`]); use [`observe`] for the full pipeline. Splitting
/// the frame transform out lets callers cache the transformed catalog
/// across repeated observations, the dominant cost for large catalogs.
///
/// # Errors
/// All configuration errors surface here, synchronously, before the cube
/// is allocated: invalid instrument/environment parameters, malformed
/// bandpass tables, and missing SED models for stellar population
/// catalogs. An empty aperture is not an error; it yields an all-zero
/// cube.
pub fn observe_frame(
    particles: &[Particle],
    instrument: &Instrument,
    environment: &Environment,
    sed: Option<&dyn SedModel>,
    threads: ThreadCount,
) -> Result<Observation, ObservationError> {
    let grid = ObservationGrid::build(instrument, environment)?;
    let band = instrument.filter.map(bandpass_for).transpose()?;
    let filter = instrument.filter.zip(band.as_ref());
    let context = FluxContext::new(&grid, environment, filter, sed);

    // Fail fast: never start parallel work that would error mid-run.
    if let Some(filter) = context.missing_spectral_data(particles) {
        return Err(ObservationError::MissingSpectralData { filter });
    }

    let index = CellIndex::build(particles, &grid);
    if index.skipped_nonfinite > 0 {
        warn!(
            skipped = index.skipped_nonfinite,
            "dropped particles with non-finite records"
        );
    }

    let mut cube = Array3::zeros((grid.sbin, grid.sbin, grid.vbin));
    if index.is_empty() {
        info!("no particles inside the aperture, returning an all-zero cube");
        return Ok(Observation {
            cube,
            summary: grid,
            skipped_particles: index.skipped_nonfinite,
        });
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads.get())
        .build()?;

    info!(
        cells = index.occupied_cells().count(),
        particles = index.assigned,
        workers = threads.get(),
        "compositing cube"
    );

    // Per-cell flux generation and velocity composition. Cells are
    // independent; results are collected in cell order and written
    // sequentially, so output does not depend on the worker count.
    let occupied: Vec<((usize, usize), &[usize])> = index.occupied_cells().collect();
    let columns: Result<Vec<Vec<f64>>, ObservationError> = pool.install(|| {
        occupied
            .par_iter()
            .map(|(_, indices)| {
                let fluxes = cell_fluxes(particles, indices, &context)?;
                let velocities: Vec<f64> = indices
                    .iter()
                    .map(|&i| particles[i].los_velocity())
                    .collect();
                Ok(composite_cell(
                    &fluxes,
                    &velocities,
                    &grid.velocity_edges,
                    grid.lsf_sigma_kms,
                ))
            })
            .collect()
    });
    let columns = columns?;

    for (((x, y), _), spectrum) in occupied.iter().zip(columns.into_iter()) {
        for (v, value) in spectrum.into_iter().enumerate() {
            cube[[*x, *y, v]] = value;
        }
    }

    // Per-slice seeing blur, inside the same pool.
    if let Some(kernel) = &environment.blur {
        let raster = blur::rasterize_kernel(kernel, grid.spatial_scale_arcsec);
        info!(kernel = ?kernel, support = ?raster.dim(), "applying seeing blur");
        pool.install(|| blur::blur_slices(&mut cube, &raster, &grid));
    }

    Ok(Observation {
        cube,
        summary: grid,
        skipped_particles: index.skipped_nonfinite,
    })
}

/// Full pipeline: frame transform, then [`observe_frame`].
pub fn observe(
    particles: &[Particle],
    instrument: &Instrument,
    environment: &Environment,
    sed: Option<&dyn SedModel>,
    threads: ThreadCount,
) -> Result<Observation, ObservationError> {
    // Validate before spending time on the frame transform.
    instrument.validate()?;
    environment.validate()?;
    let frame = to_observer_frame(particles, environment.inclination_deg);
    observe_frame(&frame, instrument, environment, sed, threads)
}
