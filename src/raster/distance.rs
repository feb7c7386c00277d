use ndarray::{Array2, ArrayViewMut1, Axis};

/// Stand-in for "infinitely far" that keeps the parabola arithmetic finite.
const FAR: f64 = 1e20;

/// 1D squared distance transform of sampled function `f` (Felzenszwalb & Huttenlocher).
fn edt_1d(f: &[f64], out: &mut [f64], v: &mut [usize], z: &mut [f64]) {
    let n = f.len();
    if n == 0 { return }

    let mut k = 0;
    v[0] = 0;
    z[0] = f64::NEG_INFINITY;
    z[1] = f64::INFINITY;

    for q in 1..n {
        let fq = f[q] + (q * q) as f64;
        let mut s;
        loop {
            let p = v[k];
            s = (fq - (f[p] + (p * p) as f64)) / (2 * q - 2 * p) as f64;
            if s <= z[k] && k > 0 { k -= 1 } else { break }
        }
        k += 1;
        v[k] = q;
        z[k] = s;
        z[k + 1] = f64::INFINITY;
    }

    k = 0;
    for (q, slot) in out.iter_mut().enumerate() {
        while z[k + 1] < q as f64 { k += 1 }
        let p = v[k];
        let d = q as f64 - p as f64;
        *slot = d * d + f[p];
    }
}

/// Run the 1D transform along one axis, in place.
fn edt_axis(grid: &mut Array2<f64>, axis: Axis) {
    let n = grid.len_of(axis);
    let mut f = vec![0.0; n];
    let mut out = vec![0.0; n];
    let mut v = vec![0usize; n];
    let mut z = vec![0.0; n + 1];

    for mut lane in grid.lanes_mut(axis) {
        for (dst, src) in f.iter_mut().zip(lane.iter()) { *dst = *src }
        edt_1d(&f, &mut out, &mut v, &mut z);
        write_lane(&mut lane, &out);
    }
}

#[inline]
fn write_lane(lane: &mut ArrayViewMut1<f64>, values: &[f64]) {
    for (dst, src) in lane.iter_mut().zip(values) { *dst = *src }
}

/// Exact Euclidean distance, in pixels, from every non-zero cell to the nearest
/// zero cell. Zero cells map to 0; if the grid has no zero cell every cell is `+inf`.
pub fn distance_transform_edt(grid: &Array2<f64>) -> Array2<f64> {
    let mut squared = grid.mapv(|value| if value == 0.0 { 0.0 } else { FAR });

    edt_axis(&mut squared, Axis(0));
    edt_axis(&mut squared, Axis(1));

    squared.mapv_into(|d| if d >= FAR { f64::INFINITY } else { d.sqrt() })
}
