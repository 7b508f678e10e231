//! Test data generators for synthetic raster values.
//!
//! These generators create predictable, verifiable patterns so tests can
//! check exactly which cells ended up where after loading, merging and
//! trimming.

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// # Returns
///
/// A `Vec<f32>` in row-major order (row 0 first, then row 1, etc.)
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50); // 10 * 5
/// assert_eq!(grid[0], 0.0);   // col=0, row=0 -> 0*1000 + 0
/// assert_eq!(grid[1], 1000.0); // col=1, row=0 -> 1*1000 + 0
/// assert_eq!(grid[10], 1.0);  // col=0, row=1 -> 0*1000 + 1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// Creates a test grid offset by `base`, so tiles can be told apart.
pub fn create_offset_grid(width: usize, height: usize, base: f32) -> Vec<f32> {
    create_test_grid(width, height)
        .into_iter()
        .map(|v| v + base)
        .collect()
}

/// Creates a test grid where every `nan_every`-th cell is NaN.
pub fn create_grid_with_nans(width: usize, height: usize, nan_every: usize) -> Vec<f32> {
    create_test_grid(width, height)
        .into_iter()
        .enumerate()
        .map(|(i, v)| if nan_every > 0 && i % nan_every == 0 { f32::NAN } else { v })
        .collect()
}

/// Creates an `n x n` SRTM-like height grid: `row * 10 + col`, clamped to `i16`.
pub fn create_height_grid(n: usize) -> Vec<i16> {
    let mut data = Vec::with_capacity(n * n);
    for row in 0..n {
        for col in 0..n {
            data.push((row * 10 + col).min(i16::MAX as usize) as i16);
        }
    }
    data
}
