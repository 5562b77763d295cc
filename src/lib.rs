//! Synthetic IFU observations of simulated galaxies.
//!
//! This crate builds a mock integral-field-unit datacube (two spatial
//! axes and one velocity axis) from a catalog of simulation particles,
//! under a configurable instrument ([`Instrument`]) and observational
//! setup ([`Environment`]). The pipeline stages are public so callers can
//! run them individually (and cache the frame transform across repeated
//! observations of one catalog):
//!
//! 1. [`frame::to_observer_frame`] recenters and inclines the catalog.
//! 2. [`grid::ObservationGrid::build`] derives the spatial grid, aperture
//!    mask, velocity bin edges and line-spread sigma.
//! 3. [`assign::CellIndex::build`] bins particles into spatial cells.
//! 4. [`flux::FluxContext`] converts particle luminosity to observed
//!    flux, through SED synthesis for stellar populations.
//! 5. [`cube::composite_cell`] spreads each particle's flux over the
//!    velocity bins through the line-spread function.
//! 6. [`blur::blur_slices`] applies the seeing kernel per velocity slice.
//!
//! [`observe`] runs the whole pipeline over a worker pool sized by
//! [`ThreadCount`] (default from `SPAXEL_NUM_THREADS`, read once per
//! process). Catalog readers, instrument preset registries, SED model
//! internals and FITS export live outside this crate; the seams are
//! `&[Particle]`, serde-ready descriptor values, the [`SedModel`] trait
//! and the plain-data [`Observation`] result.

pub mod algo;
pub mod assign;
pub mod blur;
pub mod config;
pub mod cosmology;
pub mod cube;
pub mod error;
pub mod flux;
pub mod frame;
pub mod grid;
pub mod particle;
pub mod photometry;
pub mod pipeline;

pub use assign::CellIndex;
pub use config::{ApertureShape, BlurKernel, Environment, FilterId, Instrument};
pub use error::ObservationError;
pub use flux::FluxContext;
pub use frame::to_observer_frame;
pub use grid::ObservationGrid;
pub use particle::{select_types, Particle, ParticleType, Source};
pub use photometry::{Bandpass, SedModel};
pub use pipeline::{observe, observe_frame, Observation, ThreadCount, THREADS_ENV_VAR};
