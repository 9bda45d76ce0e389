use crate::color::{site_rgb, GAP_RGB};
use crate::error::Result;
use crate::lattice::{Grid, Percolation};
use gif::{Encoder, Frame, Repeat};
use image::{Rgb, RgbImage};
use rand::Rng;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Delay between sweep frames, in hundredths of a second
const SWEEP_FRAME_DELAY: u16 = 25;

/// Image edge length for a lattice drawn with `cell_px` sites and 1px gaps
pub fn image_extent(grid_size: usize, cell_px: u32) -> u32 {
    grid_size as u32 * (cell_px + 1) + 1
}

/// Rasterize a lattice: each site is a `cell_px` square, separated by 1px gap lines
pub fn rasterize(grid: &Grid, cell_px: u32) -> RgbImage {
    let cell_px = cell_px.max(1);
    let extent = image_extent(grid.size(), cell_px);
    let pitch = cell_px + 1;

    RgbImage::from_fn(extent, extent, |x, y| {
        if x % pitch == 0 || y % pitch == 0 {
            return Rgb(GAP_RGB);
        }
        let col = (x / pitch) as usize;
        let row = (y / pitch) as usize;
        match grid.get(row, col) {
            Some(cell) => Rgb(site_rgb(cell.occupied, cell.cluster)),
            None => Rgb(GAP_RGB),
        }
    })
}

/// Save a labeled lattice as an image; format follows the file extension
pub fn export_png(grid: &Grid, cell_px: u32, path: &Path) -> Result<()> {
    rasterize(grid, cell_px).save(path)?;
    tracing::info!(path = %path.display(), size = grid.size(), "exported image");
    Ok(())
}

/// Probabilities visited by a sweep of `frames` steps from 0.0 to 1.0 inclusive
pub fn sweep_probabilities(frames: usize) -> Vec<f64> {
    match frames {
        0 => Vec::new(),
        1 => vec![1.0],
        n => (0..n).map(|i| i as f64 / (n - 1) as f64).collect(),
    }
}

/// Write an animated GIF sweeping the occupation probability from 0 to 1.
/// Every frame is an independent generate-and-label run at `size`.
/// Returns the cluster count of each frame.
pub fn export_sweep_gif<R: Rng + ?Sized>(
    size: usize,
    frames: usize,
    cell_px: u32,
    rng: &mut R,
    path: &Path,
) -> Result<Vec<usize>> {
    let extent = image_extent(size, cell_px.max(1)).min(u16::MAX as u32) as u16;

    let file = BufWriter::new(File::create(path)?);
    let mut encoder = Encoder::new(file, extent, extent, &[])?;
    encoder.set_repeat(Repeat::Infinite)?;

    let mut counts = Vec::with_capacity(frames);
    for probability in sweep_probabilities(frames) {
        let percolation = Percolation::run(size, probability, rng)?;
        tracing::debug!(probability, clusters = percolation.cluster_count, "sweep frame");

        let image = rasterize(&percolation.grid, cell_px);
        let mut frame = Frame::from_rgb(extent, extent, image.as_raw());
        frame.delay = SWEEP_FRAME_DELAY;
        encoder.write_frame(&frame)?;
        counts.push(percolation.cluster_count);
    }

    tracing::info!(path = %path.display(), frames, "exported sweep");
    Ok(counts)
}
