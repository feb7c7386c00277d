use geo::{BoundingRect, MultiPolygon, Rect};
use rstar::{RTree, AABB};

use crate::geom::{BoundingBox, Crs};

/// Geometries is an ordered collection of MultiPolygons with an R-tree over their bounds.
#[derive(Debug, Clone)]
pub struct Geometries {
    shapes: Vec<MultiPolygon<f64>>,
    rtree: RTree<BoundingBox>,
    crs: Crs,
}

impl Geometries {
    /// Construct a Geometries object from a vector of MultiPolygons in `crs`.
    pub fn new(shapes: Vec<MultiPolygon<f64>>, crs: Crs) -> Self {
        Self {
            rtree: RTree::bulk_load(
                shapes.iter().enumerate()
                    .filter_map(|(i, shape)| shape.bounding_rect().map(|rect| BoundingBox::new(i, rect)))
                    .collect()
            ),
            shapes,
            crs,
        }
    }

    /// Get the number of MultiPolygons.
    #[inline] pub fn len(&self) -> usize { self.shapes.len() }

    /// Check if there are no MultiPolygons.
    #[inline] pub fn is_empty(&self) -> bool { self.shapes.is_empty() }

    /// Get a reference to the list of MultiPolygons.
    #[inline] pub fn shapes(&self) -> &[MultiPolygon<f64>] { &self.shapes }

    #[inline] pub fn crs(&self) -> &Crs { &self.crs }

    /// Query the R-tree for bounding boxes intersecting the given envelope.
    #[inline]
    pub(crate) fn query(&self, envelope: &AABB<[f64; 2]>) -> impl Iterator<Item = &BoundingBox> {
        self.rtree.locate_in_envelope_intersecting(envelope)
    }

    /// Indices of shapes whose bounds intersect `rect`.
    pub(crate) fn query_indices(&self, rect: &Rect<f64>) -> Vec<usize> {
        let envelope = AABB::from_corners(rect.min().into(), rect.max().into());
        let mut indices = self.query(&envelope).map(|bbox| bbox.idx()).collect::<Vec<_>>();
        indices.sort_unstable();
        indices
    }
}
