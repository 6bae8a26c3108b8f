//! Elementwise and matrix numeric kernels. Pure functions over flat,
//! row-major float slices - the core's operations consume these the same
//! way the surrounding facade consumes matmul/softmax/add as external,
//! stateless numeric building blocks. Single precision throughout; no
//! broadcasting beyond the explicit row-broadcast helpers.

pub fn add(a: &[f32], b: &[f32]) -> Vec<f32> {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| x + y).collect()
}

pub fn sub(a: &[f32], b: &[f32]) -> Vec<f32> {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| x - y).collect()
}

pub fn hadamard(a: &[f32], b: &[f32]) -> Vec<f32> {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| x * y).collect()
}

pub fn scale(a: &[f32], s: f32) -> Vec<f32> {
    a.iter().map(|x| x * s).collect()
}

/// Row-major (m,k) . (k,n) -> (m,n).
pub fn matmul(a: &[f32], m: usize, k: usize, b: &[f32], n: usize) -> Vec<f32> {
    debug_assert_eq!(a.len(), m * k);
    debug_assert_eq!(b.len(), k * n);
    let mut out = vec![0.0f32; m * n];
    for i in 0..m {
        for p in 0..k {
            let a_ip = a[i * k + p];
            if a_ip == 0.0 {
                continue;
            }
            for j in 0..n {
                out[i * n + j] += a_ip * b[p * n + j];
            }
        }
    }
    out
}

pub fn transpose(a: &[f32], rows: usize, cols: usize) -> Vec<f32> {
    debug_assert_eq!(a.len(), rows * cols);
    let mut out = vec![0.0f32; rows * cols];
    for i in 0..rows {
        for j in 0..cols {
            out[j * rows + i] = a[i * cols + j];
        }
    }
    out
}

pub fn leaky_relu(x: &[f32], alpha: f32) -> Vec<f32> {
    x.iter()
        .map(|&v| if v > 0.0 { v } else { alpha * v })
        .collect()
}

/// dL/dX = dL/dY * (x > 0 ? 1 : alpha).
pub fn leaky_relu_backward(x: &[f32], alpha: f32, grad_out: &[f32]) -> Vec<f32> {
    debug_assert_eq!(x.len(), grad_out.len());
    x.iter()
        .zip(grad_out)
        .map(|(&v, &g)| if v > 0.0 { g } else { alpha * g })
        .collect()
}

/// Softmax along each row of an (rows, cols) matrix, max-subtracted for
/// numerical stability.
pub fn softmax_rows(x: &[f32], rows: usize, cols: usize) -> Vec<f32> {
    debug_assert_eq!(x.len(), rows * cols);
    let mut out = vec![0.0f32; rows * cols];
    for r in 0..rows {
        let row = &x[r * cols..(r + 1) * cols];
        let max = row.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let mut sum = 0.0f32;
        for (j, &v) in row.iter().enumerate() {
            let e = (v - max).exp();
            out[r * cols + j] = e;
            sum += e;
        }
        for j in 0..cols {
            out[r * cols + j] /= sum;
        }
    }
    out
}

/// Sum an (rows, cols) matrix down to a length-`cols` vector by summing
/// over the row (batch) dimension. Used by broadcast-bias backward.
pub fn sum_rows(grad: &[f32], rows: usize, cols: usize) -> Vec<f32> {
    debug_assert_eq!(grad.len(), rows * cols);
    let mut out = vec![0.0f32; cols];
    for r in 0..rows {
        for c in 0..cols {
            out[c] += grad[r * cols + c];
        }
    }
    out
}

/// Replicate a length-`cols` row vector across `rows` rows, row-major.
pub fn broadcast_rows(vector: &[f32], rows: usize) -> Vec<f32> {
    let cols = vector.len();
    let mut out = vec![0.0f32; rows * cols];
    for r in 0..rows {
        out[r * cols..(r + 1) * cols].copy_from_slice(vector);
    }
    out
}
