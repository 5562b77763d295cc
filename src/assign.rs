//! Cell assignment: binning particles into spatial pixels.
//!
//! Every particle lands in at most one spatial cell; particles outside the
//! grid or the aperture mask are excluded outright, and particles with
//! non-finite records are skipped and counted rather than failing the run.
//! Per-cell index lists preserve catalog order, which keeps floating-point
//! summation order, and therefore the output cube, reproducible.

use tracing::debug;

use crate::grid::ObservationGrid;
use crate::particle::Particle;

/// Per-cell particle index, the decomposition unit for parallel work.
///
/// Cells are stored flat in `x * sbin + y` order; each entry is the list
/// of catalog indices whose position falls in that cell.
#[derive(Debug, Clone)]
pub struct CellIndex {
    sbin: usize,
    cells: Vec<Vec<usize>>,
    /// Particles assigned to an in-aperture cell.
    pub assigned: usize,
    /// Particles dropped for non-finite mass, position or velocity.
    pub skipped_nonfinite: usize,
}

impl CellIndex {
    /// Bin an observer-frame catalog into grid cells.
    pub fn build(particles: &[Particle], grid: &ObservationGrid) -> Self {
        let sbin = grid.sbin;
        let half_bins = sbin as f64 / 2.0;
        let mut cells = vec![Vec::new(); sbin * sbin];
        let mut assigned = 0;
        let mut skipped_nonfinite = 0;

        for (index, particle) in particles.iter().enumerate() {
            if !particle.is_finite() {
                skipped_nonfinite += 1;
                debug!(index, "skipping particle with non-finite record");
                continue;
            }
            // Floor division of the centered position by the pixel size,
            // expressed as pixel offsets from the grid center so a particle
            // exactly at the origin bins exactly.
            let x = (particle.position.x / grid.spatial_bin_kpc + half_bins).floor();
            let y = (particle.position.y / grid.spatial_bin_kpc + half_bins).floor();
            if x < 0.0 || y < 0.0 || x >= sbin as f64 || y >= sbin as f64 {
                continue;
            }
            let (ix, iy) = (x as usize, y as usize);
            if !grid.mask[[ix, iy]] {
                continue;
            }
            cells[ix * sbin + iy].push(index);
            assigned += 1;
        }

        Self {
            sbin,
            cells,
            assigned,
            skipped_nonfinite,
        }
    }

    /// Particle indices in cell `(x, y)`, in catalog order.
    pub fn cell(&self, x: usize, y: usize) -> &[usize] {
        &self.cells[x * self.sbin + y]
    }

    /// Iterate over non-empty cells as `((x, y), indices)`.
    pub fn occupied_cells(&self) -> impl Iterator<Item = ((usize, usize), &[usize])> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, indices)| !indices.is_empty())
            .map(move |(flat, indices)| ((flat / self.sbin, flat % self.sbin), indices.as_slice()))
    }

    /// True when no particle fell inside the aperture.
    pub fn is_empty(&self) -> bool {
        self.assigned == 0
    }
}
