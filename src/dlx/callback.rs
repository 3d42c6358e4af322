//! Callback hooks for the enumerating search.
//!
//! The engine owns the traversal; callbacks observe it and steer it
//! cooperatively. `on_iteration` fires once per search node and its
//! verdict decides whether the search keeps going, so a stop always
//! unwinds through the normal cover/uncover pairing and leaves the
//! matrix restored.

/// Verdict returned by [`Callback::on_iteration`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SearchFlow {
    /// Keep searching.
    Continue,
    /// Unwind and return; [`Callback::on_abort`] fires once on the way
    /// out.
    Stop,
}

/// Hooks into [`Matrix::solve`]. All methods have no-op defaults.
///
/// Solutions are reported as vectors of 0-based row indices. The matrix
/// reference is read-only: between covers its public accessors are safe
/// to query, but it must not be mutated mid-search.
///
/// [`Matrix::solve`]: crate::dlx::Matrix::solve
pub trait Callback<M> {
    fn on_solution(&mut self, _sol: Vec<usize>, _mat: &M) {}
    fn on_iteration(&mut self, _mat: &M) -> SearchFlow {
        SearchFlow::Continue
    }
    fn on_abort(&mut self, _mat: &M) {}
    fn on_finish(&mut self) {}
}

/// Collects solutions, optionally stopping once it has enough.
pub struct SolutionCallback {
    pub solutions: Vec<Vec<usize>>,
    limit: Option<usize>,
}

impl SolutionCallback {
    /// Collects every solution the search finds.
    pub fn all() -> SolutionCallback {
        SolutionCallback {
            solutions: Vec::new(),
            limit: None,
        }
    }

    /// Stops the search once `limit` solutions have been collected.
    pub fn up_to(limit: usize) -> SolutionCallback {
        SolutionCallback {
            solutions: Vec::new(),
            limit: Some(limit),
        }
    }
}

impl<M> Callback<M> for SolutionCallback {
    fn on_solution(&mut self, sol: Vec<usize>, _mat: &M) {
        self.solutions.push(sol);
    }

    fn on_iteration(&mut self, _mat: &M) -> SearchFlow {
        match self.limit {
            Some(limit) if self.solutions.len() >= limit => SearchFlow::Stop,
            _ => SearchFlow::Continue,
        }
    }
}
