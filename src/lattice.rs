use crate::error::{PercolationError, Result};
use crate::settings::{MAX_SIZE, MIN_SIZE};
use rand::Rng;

/// Orthogonal neighbour offsets (row, col). Diagonals do not connect sites.
const NEIGHBOR_OFFSETS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// A single lattice site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cell {
    pub occupied: bool,
    /// Cluster id, 0 while unlabeled and always 0 for empty sites
    pub cluster: usize,
}

/// Square lattice of sites stored row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Build an unlabeled grid from a row-major occupancy pattern.
    /// Panics if `occupancy.len()` is not `size * size`.
    pub fn from_occupancy(size: usize, occupancy: &[bool]) -> Self {
        assert_eq!(occupancy.len(), size * size, "occupancy must be size x size");
        Self {
            size,
            cells: occupancy
                .iter()
                .map(|&occupied| Cell { occupied, cluster: 0 })
                .collect(),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Get the cell at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        if row < self.size && col < self.size {
            Some(&self.cells[row * self.size + col])
        } else {
            None
        }
    }

    /// Iterate rows top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        // chunks(0) panics, so an empty grid yields no rows
        self.cells.chunks(self.size.max(1))
    }
}

/// Fill a `size x size` lattice, occupying each site independently with `probability`.
pub fn generate<R: Rng + ?Sized>(size: usize, probability: f64, rng: &mut R) -> Result<Grid> {
    if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
        return Err(PercolationError::InvalidSize(size));
    }
    // NaN fails the range check too
    if !(0.0..=1.0).contains(&probability) {
        return Err(PercolationError::InvalidProbability(probability));
    }

    let occupancy: Vec<bool> = (0..size * size)
        .map(|_| rng.gen::<f64>() < probability)
        .collect();

    Ok(Grid::from_occupancy(size, &occupancy))
}

/// Label every 4-connected cluster of occupied sites in place.
///
/// Ids are assigned in row-major scan order starting at 1, so the returned
/// count `k` means the grid uses exactly the ids `1..=k`. Any previous
/// labeling is discarded first.
pub fn label(grid: &mut Grid) -> usize {
    let size = grid.size;
    for cell in grid.cells.iter_mut() {
        cell.cluster = 0;
    }

    let mut visited = vec![false; size * size];
    let mut stack: Vec<(usize, usize)> = Vec::new();
    let mut cluster_count = 0;

    for row in 0..size {
        for col in 0..size {
            let idx = row * size + col;
            if visited[idx] || !grid.cells[idx].occupied {
                continue;
            }

            cluster_count += 1;
            visited[idx] = true;
            grid.cells[idx].cluster = cluster_count;
            stack.push((row, col));

            while let Some((r, c)) = stack.pop() {
                for &(dr, dc) in &NEIGHBOR_OFFSETS {
                    let (Some(nr), Some(nc)) = (r.checked_add_signed(dr), c.checked_add_signed(dc))
                    else {
                        continue;
                    };
                    if nr >= size || nc >= size {
                        continue;
                    }
                    let nidx = nr * size + nc;
                    if visited[nidx] || !grid.cells[nidx].occupied {
                        continue;
                    }
                    visited[nidx] = true;
                    grid.cells[nidx].cluster = cluster_count;
                    stack.push((nr, nc));
                }
            }
        }
    }

    cluster_count
}

/// A generated and labeled lattice, handed to the renderer as one unit
#[derive(Debug, Clone)]
pub struct Percolation {
    pub grid: Grid,
    pub cluster_count: usize,
}

impl Percolation {
    /// Generate a fresh lattice and label its clusters
    pub fn run<R: Rng + ?Sized>(size: usize, probability: f64, rng: &mut R) -> Result<Self> {
        let mut grid = generate(size, probability, rng)?;
        let cluster_count = label(&mut grid);
        Ok(Self { grid, cluster_count })
    }
}

/// Summary statistics over a labeled lattice
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterStats {
    /// Site count per cluster, index `id - 1`
    pub sizes: Vec<usize>,
    pub occupied: usize,
    pub largest: usize,
    /// Some cluster touches both opposite edges
    pub spans: bool,
}

impl ClusterStats {
    /// Stats are sized by the ids present in the grid, so a `cluster_count`
    /// that disagrees with the labels cannot index out of bounds.
    pub fn from_percolation(percolation: &Percolation) -> Self {
        let grid = &percolation.grid;
        let size = grid.size();
        let max_id = grid
            .rows()
            .flatten()
            .map(|cell| cell.cluster)
            .max()
            .unwrap_or(0);
        let mut sizes = vec![0usize; max_id];

        // Bit flags per cluster: top, bottom, left, right
        let mut edges = vec![0u8; max_id];

        for (row, cells) in grid.rows().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                if cell.cluster == 0 {
                    continue;
                }
                let id = cell.cluster - 1;
                sizes[id] += 1;
                if row == 0 {
                    edges[id] |= 0b0001;
                }
                if row + 1 == size {
                    edges[id] |= 0b0010;
                }
                if col == 0 {
                    edges[id] |= 0b0100;
                }
                if col + 1 == size {
                    edges[id] |= 0b1000;
                }
            }
        }

        let spans = edges
            .iter()
            .any(|&e| e & 0b0011 == 0b0011 || e & 0b1100 == 0b1100);

        Self {
            occupied: sizes.iter().sum(),
            largest: sizes.iter().copied().max().unwrap_or(0),
            sizes,
            spans,
        }
    }
}

impl ClusterStats {
    /// Cluster sizes sorted largest first, at most `n`
    pub fn top_sizes(&self, n: usize) -> Vec<usize> {
        let mut sorted = self.sizes.clone();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        sorted.truncate(n);
        sorted
    }
}
