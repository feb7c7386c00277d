use anyhow::Result;
use geo::{BoundingRect, Relate};
use rstar::AABB;
use smallvec::SmallVec;

use crate::geom::Geometries;

/// Neighbour list of a single shape; hexagons have at most six.
pub type Neighbors = SmallVec<[u32; 6]>;

impl Geometries {
    /// Rook contiguity (shared edge with positive length) for every shape.
    /// Uses DE-9IM: require `touches` AND boundary/boundary has dimension 1.
    pub fn adjacencies(&self) -> Result<Vec<Neighbors>> {
        let mut adj_list = vec![Neighbors::new(); self.len()];

        for (i, shape) in self.shapes().iter().enumerate() {
            let Some(bbox) = shape.bounding_rect() else { continue };
            let search = AABB::from_corners(bbox.min().into(), bbox.max().into());

            for cand in self.query(&search) {
                let j = cand.idx();
                if j <= i { continue } // check each unordered pair once

                let im = shape.relate(&self.shapes()[j]);
                if im.is_touches() && im.matches("****1****")? {
                    adj_list[i].push(j as u32);
                    adj_list[j].push(i as u32);
                }
            }
        }

        for nbrs in &mut adj_list { nbrs.sort_unstable() }
        Ok(adj_list)
    }
}
