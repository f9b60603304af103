//! Options controlling how a tricubic function is built.
#[cfg(feature = "parallel")]
use std::sync::Arc;

/// Numeric options for grid construction.
///
/// ### Default Values
/// - `single_precision`: `false`
/// - `task_size`: `1000`
/// - `integer_fast_path`: `true`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuildOptions {
    /// Store cell coefficients as f32, halving memory use at the cost of
    /// about 7 significant digits of precision in the coefficients.
    pub single_precision: bool,

    /// Minimum number of cells per parallel task. Grids with no more
    /// cells than this are always built on the calling thread.
    pub task_size: usize,

    /// Skip normalization and derivative rescaling on axes with unit spacing.
    /// Disabling this forces every axis through the general scaled path.
    pub integer_fast_path: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            single_precision: false,
            task_size: 1000,
            integer_fast_path: true,
        }
    }
}

/// Where the cells of a grid are built.
#[derive(Clone, Debug, Default)]
pub enum Parallelism {
    /// On the calling thread
    Serial,

    /// On rayon's global thread pool
    #[default]
    Global,

    /// On a caller-supplied rayon thread pool
    #[cfg(feature = "parallel")]
    Pool(Arc<rayon::ThreadPool>),
}

impl Parallelism {
    #[cfg(feature = "parallel")]
    pub fn pool(pool: Arc<rayon::ThreadPool>) -> Self {
        Parallelism::Pool(pool)
    }

    pub fn is_serial(&self) -> bool {
        matches!(self, Parallelism::Serial)
    }
}
