use geo::{BoundingRect, Contains, Coord, Geometry, LineString, MultiPolygon, Polygon};
use ndarray::Array2;

use crate::raster::{GeoTransform, RasterMeta};

/// Visit every cell of a `rows x cols` grid whose centre lies inside `shape`.
pub(crate) fn for_each_cell_inside<F>(shape: &MultiPolygon<f64>, transform: &GeoTransform, rows: usize, cols: usize, mut visit: F)
where
    F: FnMut(usize, usize),
{
    let Some(rect) = shape.bounding_rect() else { return };
    let Some((col0, col1, row0, row1)) = transform.window(&rect, rows, cols) else { return };

    for row in row0..row1 {
        for col in col0..col1 {
            if shape.contains(&transform.pixel_center(col, row)) {
                visit(row, col);
            }
        }
    }
}

/// Burn target that ignores writes falling outside the grid.
struct Canvas<'a> {
    grid: &'a mut Array2<f64>,
    transform: &'a GeoTransform,
    value: f64,
    all_touched: bool,
}

impl Canvas<'_> {
    #[inline]
    fn burn(&mut self, col: i64, row: i64) {
        let (rows, cols) = self.grid.dim();
        if col < 0 || row < 0 || col as usize >= cols || row as usize >= rows { return }
        self.grid[[row as usize, col as usize]] = self.value;
    }

    fn point(&mut self, coord: Coord<f64>) {
        let (col, row) = self.transform.to_pixel(coord);
        self.burn(col.floor() as i64, row.floor() as i64);
    }

    /// Walk every cell crossed by a segment (Amanatides & Woo grid traversal).
    fn segment(&mut self, from: Coord<f64>, to: Coord<f64>) {
        let (x0, y0) = self.transform.to_pixel(from);
        let (x1, y1) = self.transform.to_pixel(to);

        let (mut cx, mut cy) = (x0.floor() as i64, y0.floor() as i64);
        let (ex, ey) = (x1.floor() as i64, y1.floor() as i64);
        let (dx, dy) = (x1 - x0, y1 - y0);

        let step_x = if dx > 0.0 { 1 } else { -1 };
        let step_y = if dy > 0.0 { 1 } else { -1 };

        let boundary = |c: i64, step: i64| if step > 0 { (c + 1) as f64 } else { c as f64 };
        let mut t_max_x = if dx != 0.0 { (boundary(cx, step_x) - x0) / dx } else { f64::INFINITY };
        let mut t_max_y = if dy != 0.0 { (boundary(cy, step_y) - y0) / dy } else { f64::INFINITY };
        let t_delta_x = if dx != 0.0 { (1.0 / dx).abs() } else { f64::INFINITY };
        let t_delta_y = if dy != 0.0 { (1.0 / dy).abs() } else { f64::INFINITY };

        let steps = (ex - cx).abs() + (ey - cy).abs();
        self.burn(cx, cy);
        for _ in 0..steps {
            if t_max_x < t_max_y {
                t_max_x += t_delta_x;
                cx += step_x;
            } else {
                t_max_y += t_delta_y;
                cy += step_y;
            }
            self.burn(cx, cy);
        }
    }

    fn line_string(&mut self, line: &LineString<f64>) {
        match line.0.as_slice() {
            [] => {}
            [only] => self.point(*only),
            coords => for pair in coords.windows(2) { self.segment(pair[0], pair[1]) },
        }
    }

    fn polygon(&mut self, polygon: &Polygon<f64>) {
        let shape = MultiPolygon(vec![polygon.clone()]);
        let (rows, cols) = self.grid.dim();
        let transform = *self.transform;
        let mut inside = Vec::new();
        for_each_cell_inside(&shape, &transform, rows, cols, |row, col| inside.push((row, col)));
        for (row, col) in inside {
            self.burn(col as i64, row as i64);
        }

        if self.all_touched {
            self.line_string(polygon.exterior());
            for ring in polygon.interiors() { self.line_string(ring) }
        }
    }

    fn geometry(&mut self, geometry: &Geometry<f64>) {
        match geometry {
            Geometry::Point(p) => self.point(p.0),
            Geometry::MultiPoint(mp) => for p in mp { self.point(p.0) },
            Geometry::Line(l) => self.segment(l.start, l.end),
            Geometry::LineString(ls) => self.line_string(ls),
            Geometry::MultiLineString(mls) => for ls in mls { self.line_string(ls) },
            Geometry::Polygon(p) => self.polygon(p),
            Geometry::MultiPolygon(mp) => for p in mp { self.polygon(p) },
            Geometry::Rect(r) => self.polygon(&r.to_polygon()),
            Geometry::Triangle(t) => self.polygon(&t.to_polygon()),
            Geometry::GeometryCollection(gc) => for g in gc { self.geometry(g) },
        }
    }
}

/// Burn `shapes` onto a new grid shaped like `meta`.
/// Cells touched by a shape get `default_value`, all others `fill`.
/// Polygons burn the cells whose centre they contain, plus every cell their
/// boundary crosses when `all_touched` is set; lines and points always burn
/// every cell they cross.
pub fn rasterize(shapes: &[Geometry<f64>], meta: &RasterMeta, fill: f64, default_value: f64, all_touched: bool) -> Array2<f64> {
    let mut grid = Array2::from_elem(meta.shape(), fill);
    let mut canvas = Canvas { grid: &mut grid, transform: &meta.transform, value: default_value, all_touched };
    for shape in shapes {
        canvas.geometry(shape);
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, point, polygon};

    fn meta(rows: usize, cols: usize) -> RasterMeta {
        RasterMeta { crs: None, transform: GeoTransform::from_origin(0.0, rows as f64, 1.0, 1.0), rows, cols, nodata: None }
    }

    #[test]
    fn horizontal_line_burns_one_row() {
        let line: Geometry<f64> = line_string![(x: 0.5, y: 2.5), (x: 4.5, y: 2.5)].into();
        let grid = rasterize(&[line], &meta(5, 5), 1.0, 0.0, true);
        // y = 2.5 is row 2 counted from the top of a 5-row grid
        for col in 0..5 { assert_eq!(grid[[2, col]], 0.0) }
        assert_eq!(grid.iter().filter(|&&v| v == 0.0).count(), 5);
    }

    #[test]
    fn diagonal_line_is_connected() {
        let line: Geometry<f64> = line_string![(x: 0.2, y: 0.2), (x: 3.8, y: 3.9)].into();
        let grid = rasterize(&[line], &meta(4, 4), 0.0, 1.0, true);
        for i in 0..4 { assert_eq!(grid[[3 - i, i]], 1.0) }
    }

    #[test]
    fn points_burn_their_cell_and_outside_is_ignored() {
        let shapes: Vec<Geometry<f64>> = vec![point!(x: 1.5, y: 0.5).into(), point!(x: 10.0, y: 10.0).into()];
        let grid = rasterize(&shapes, &meta(2, 2), 0.0, 7.0, false);
        assert_eq!(grid[[1, 1]], 7.0);
        assert_eq!(grid.sum(), 7.0);
    }

    #[test]
    fn polygon_all_touched_covers_more() {
        let square: Geometry<f64> = polygon![
            (x: 1.2, y: 1.2), (x: 2.8, y: 1.2), (x: 2.8, y: 2.8), (x: 1.2, y: 2.8), (x: 1.2, y: 1.2),
        ].into();
        let centres = rasterize(std::slice::from_ref(&square), &meta(4, 4), 0.0, 1.0, false);
        let touched = rasterize(&[square], &meta(4, 4), 0.0, 1.0, true);
        assert_eq!(centres.sum(), 4.0);
        assert_eq!(touched.sum(), 4.0);

        let thin: Geometry<f64> = polygon![
            (x: 0.1, y: 0.1), (x: 3.9, y: 0.1), (x: 3.9, y: 0.3), (x: 0.1, y: 0.3), (x: 0.1, y: 0.1),
        ].into();
        assert_eq!(rasterize(std::slice::from_ref(&thin), &meta(4, 4), 0.0, 1.0, false).sum(), 0.0);
        assert_eq!(rasterize(&[thin], &meta(4, 4), 0.0, 1.0, true).sum(), 4.0);
    }
}
