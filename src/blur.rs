//! Spatial seeing blur.
//!
//! Convolves every velocity slice of the cube with a Gaussian or Moffat
//! kernel. Kernels are truncated at 4 times the shape parameter and
//! normalized to unit sum, so flux is conserved in the grid interior;
//! near the grid edge the zero-padded convolution loses flux to the
//! outside, and cells outside the aperture mask are re-zeroed afterwards.
//! Both losses are expected observational behavior, not defects. With no
//! kernel configured the stage is an exact identity.

use ndarray::{Array2, Array3, ArrayView2, Axis, Zip};
use rayon::prelude::*;
use tracing::debug;

use crate::config::BlurKernel;
use crate::grid::ObservationGrid;

/// Kernel support half-width in units of sigma (Gaussian) or alpha
/// (Moffat).
const KERNEL_SUPPORT_SCALES: f64 = 4.0;

/// Rasterize a seeing kernel to pixels, unit sum.
///
/// Shape parameters are in arcseconds and convert to pixels with the
/// grid's spatial scale. Returns a 1x1 identity kernel when the support
/// rounds below one pixel.
pub fn rasterize_kernel(kernel: &BlurKernel, spatial_scale_arcsec: f64) -> Array2<f64> {
    match *kernel {
        BlurKernel::Gaussian { sigma_arcsec } => {
            let sigma_px = sigma_arcsec / spatial_scale_arcsec;
            kernel_from_profile(sigma_px, |r2| (-r2 / (2.0 * sigma_px * sigma_px)).exp())
        }
        BlurKernel::Moffat { beta, alpha_arcsec } => {
            let alpha_px = alpha_arcsec / spatial_scale_arcsec;
            kernel_from_profile(alpha_px, |r2| {
                (1.0 + r2 / (alpha_px * alpha_px)).powf(-beta)
            })
        }
    }
}

/// Sample a radial profile on a square grid of `2 ceil(4 scale) + 1`
/// pixels and normalize to unit sum.
fn kernel_from_profile<F>(scale_px: f64, profile: F) -> Array2<f64>
where
    F: Fn(f64) -> f64,
{
    let half = (KERNEL_SUPPORT_SCALES * scale_px).ceil() as usize;
    let size = 2 * half + 1;
    let mut kernel = Array2::zeros((size, size));
    let center = half as isize;
    let mut sum = 0.0;
    for i in 0..size {
        for j in 0..size {
            let dx = (i as isize - center) as f64;
            let dy = (j as isize - center) as f64;
            let value = profile(dx * dx + dy * dy);
            kernel[[i, j]] = value;
            sum += value;
        }
    }
    if sum > 0.0 {
        kernel.mapv_inplace(|v| v / sum);
    }
    kernel
}

/// Zero-padded "same" convolution of one image with a kernel.
pub fn convolve_same(image: &ArrayView2<f64>, kernel: &ArrayView2<f64>) -> Array2<f64> {
    let (rows, cols) = image.dim();
    let (krows, kcols) = kernel.dim();
    let pad_r = (krows / 2) as isize;
    let pad_c = (kcols / 2) as isize;

    let mut output = Array2::zeros((rows, cols));
    for i in 0..rows {
        for j in 0..cols {
            let mut sum = 0.0;
            for ki in 0..krows {
                for kj in 0..kcols {
                    let r = i as isize + ki as isize - pad_r;
                    let c = j as isize + kj as isize - pad_c;
                    if r >= 0 && r < rows as isize && c >= 0 && c < cols as isize {
                        sum += image[[r as usize, c as usize]] * kernel[[ki, kj]];
                    }
                }
            }
            output[[i, j]] = sum;
        }
    }
    output
}

/// Blur every velocity slice in place and re-apply the aperture mask.
///
/// Slices are independent planes of the cube; the caller runs this inside
/// the orchestrator's worker pool and each slice is written by exactly one
/// worker. A 1x1 kernel short-circuits to the identity.
pub fn blur_slices(cube: &mut Array3<f64>, kernel: &Array2<f64>, grid: &ObservationGrid) {
    if kernel.dim() == (1, 1) {
        debug!("seeing kernel support below one pixel, skipping blur");
        return;
    }
    cube.axis_iter_mut(Axis(2))
        .into_par_iter()
        .for_each(|mut slice| {
            let blurred = convolve_same(&slice.view(), &kernel.view());
            slice.assign(&blurred);
            // Blur leaks flux across the aperture boundary; the cube
            // invariant keeps out-of-aperture cells at exactly zero.
            Zip::from(&mut slice).and(&grid.mask).for_each(|v, &inside| {
                if !inside {
                    *v = 0.0;
                }
            });
        });
}
