use geo::MultiPolygon;

use crate::raster::{rasterize::for_each_cell_inside, Raster, Stat};

/// Aggregate the valid cells of `raster` whose centre lies inside each shape.
/// Cells equal to nodata, NaN, or outside the raster extent are skipped. A
/// shape without any valid cell counts 0 and yields `None` for every other
/// statistic. Shapes must share the raster's CRS.
pub fn zonal_stats(shapes: &[MultiPolygon<f64>], raster: &Raster, stat: Stat) -> Vec<Option<f64>> {
    let (rows, cols) = raster.data.dim();
    let mut values = Vec::new();

    shapes.iter()
        .map(|shape| {
            values.clear();
            for_each_cell_inside(shape, raster.transform(), rows, cols, |row, col| {
                let value = raster.data[[row, col]];
                if raster.is_valid(value) { values.push(value) }
            });
            stat.reduce(&mut values)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};
    use ndarray::Array2;

    use crate::raster::GeoTransform;

    fn square(x0: f64, y0: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![
            (x: x0, y: y0), (x: x0 + size, y: y0), (x: x0 + size, y: y0 + size), (x: x0, y: y0 + size), (x: x0, y: y0),
        ]])
    }

    fn ramp() -> Raster {
        // 4x4 grid, values 0..16 row-major, covering [0, 4] x [0, 4]
        let data = Array2::from_shape_fn((4, 4), |(r, c)| (r * 4 + c) as f64);
        Raster::new(data, GeoTransform::from_origin(0.0, 4.0, 1.0, 1.0), None, Some(5.0))
    }

    #[test]
    fn aggregates_cells_by_centre() {
        let raster = ramp();
        // Covers the two top-left rows and columns: cells 0, 1, 4, 5 (5 is nodata)
        let shapes = [square(0.0, 2.0, 2.0)];
        assert_eq!(zonal_stats(&shapes, &raster, Stat::Sum), vec![Some(5.0)]);
        assert_eq!(zonal_stats(&shapes, &raster, Stat::Count), vec![Some(3.0)]);
        assert_eq!(zonal_stats(&shapes, &raster, Stat::Max), vec![Some(4.0)]);
        assert_eq!(zonal_stats(&shapes, &raster, Stat::Min), vec![Some(0.0)]);
    }

    #[test]
    fn misses_are_none_and_order_is_kept() {
        let raster = ramp();
        let shapes = [square(10.0, 10.0, 1.0), square(3.0, 0.0, 1.0), square(0.2, 0.2, 0.1)];
        assert_eq!(zonal_stats(&shapes, &raster, Stat::Mean), vec![None, Some(15.0), None]);
    }

    #[test]
    fn empty_zones_count_zero() {
        let raster = ramp();
        // Off the grid, and a cell whose only pixel is nodata
        let shapes = [square(10.0, 10.0, 1.0), square(1.0, 2.0, 1.0)];
        assert_eq!(zonal_stats(&shapes, &raster, Stat::Count), vec![Some(0.0), Some(0.0)]);
        assert_eq!(zonal_stats(&shapes, &raster, Stat::Max), vec![None, None]);
    }
}
