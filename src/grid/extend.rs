use ahash::AHashSet;
use anyhow::{bail, ensure, Result};
use geo::{BoundingRect, Geometry, Intersects};
use tracing::debug;

use crate::cells::Cells;
use crate::geom::{reproject, Crs, Neighbors};

/// Indices of the cells a line (in `crs`) passes through, ascending.
pub fn cells_crossing(cells: &Cells, line: &Geometry<f64>, crs: &Crs) -> Result<Vec<usize>> {
    let line = reproject(line, crs, cells.geoms().crs())?;
    let Some(rect) = line.bounding_rect() else { return Ok(Vec::new()) };

    Ok(cells.geoms().query_indices(&rect).into_iter()
        .filter(|&i| line.intersects(&cells.geoms().shapes()[i]))
        .collect())
}

/// Pull `grid_dist` down around newly electrified `seeds`.
///
/// Seeds get distance 0. Each ring of cells lowered in one round hands its
/// neighbours (minus the ring itself) to the next round at `+ step`, until a
/// round lowers nothing. Only strictly larger distances are lowered; a
/// missing distance counts as unreachable. Returns the number of updates.
pub fn extend_grid(grid_dist: &mut [Option<f64>], adjacency: &[Neighbors], seeds: &[usize], step: f64) -> Result<usize> {
    ensure!(
        grid_dist.len() == adjacency.len(),
        "grid_dist has {} values for {} adjacency lists",
        grid_dist.len(), adjacency.len()
    );
    ensure!(step > 0.0, "ring step must be positive, got {step}");
    if let Some(&bad) = seeds.iter().find(|&&i| i >= grid_dist.len()) {
        bail!("seed cell {bad} is out of range ({} cells)", grid_dist.len());
    }

    let mut seen = AHashSet::new();
    let mut ring = seeds.iter().copied().filter(|&i| seen.insert(i)).collect::<Vec<_>>();
    let mut dist = 0.0;
    let mut updates = 0;

    while !ring.is_empty() {
        let members = ring.iter().copied().collect::<AHashSet<_>>();
        let mut queued = AHashSet::new();
        let mut next = Vec::new();

        for &i in &ring {
            if grid_dist[i].is_some_and(|current| current <= dist) { continue }
            grid_dist[i] = Some(dist);
            updates += 1;

            for &n in &adjacency[i] {
                let n = n as usize;
                if !members.contains(&n) && queued.insert(n) { next.push(n) }
            }
        }

        debug!("[grid] ring at {dist}: {} cells, {} queued", ring.len(), next.len());
        ring = next;
        dist += step;
    }

    Ok(updates)
}
