//! A solver facade that runs a generic [`Problem`] through the DLX engine.

use crate::dlx::{Matrix, SolutionCallback};
use crate::problem::{Problem, Value};

/// A solver for a [`Problem`] instance.
///
/// Constraint elements become matrix columns and subsets become rows, in
/// insertion order; solutions are mapped back to subset names. The
/// solver is synchronous and single-threaded, like the engine it drives.
pub struct Solver<N: Value, E: Value> {
    problem: Problem<N, E>,
}

impl<N: Value, E: Value> Solver<N, E> {
    /// Creates a new solver that solves `problem`.
    pub fn new(problem: Problem<N, E>) -> Solver<N, E> {
        Solver { problem }
    }

    /// Returns a reference to the problem being solved.
    pub fn problem(&self) -> &Problem<N, E> {
        &self.problem
    }

    /// Generates the DLX matrix for the problem.
    ///
    /// Panics if a subset mentions an element that was never added as a
    /// constraint.
    pub fn matrix(&self) -> Matrix {
        let constraints = self.problem.constraints();
        let mut mat = Matrix::new(constraints.len());

        for subset in self.problem.subsets().values() {
            let row: Vec<usize> = subset
                .iter()
                .map(|e| {
                    constraints
                        .get_index_of(e)
                        .expect("subset element missing from constraints")
                })
                .collect();
            mat.add_row(&row);
        }
        mat
    }

    /// Returns the first solution, as subset names in search order.
    pub fn first_solution(&self) -> Option<Vec<N>> {
        self.nth_solution(1)
    }

    /// Skips `nth - 1` solutions and returns the next one.
    ///
    /// Solutions are ordered by the search; with a fixed problem the
    /// ordering is deterministic. Returns `None` if fewer than `nth`
    /// solutions exist.
    pub fn nth_solution(&self, nth: usize) -> Option<Vec<N>> {
        let mut mat = self.matrix();
        let mut solution = Vec::new();
        let mut remaining = nth;
        mat.exact_cover(&mut solution, &mut remaining);
        if remaining != 0 {
            return None;
        }

        let names = solution
            .iter()
            .filter_map(|choice| mat.row_of(choice.node))
            .filter_map(|row| self.problem.subsets().get_index(row))
            .map(|(name, _)| name.clone())
            .collect();
        Some(names)
    }

    /// Enumerates every solution.
    pub fn solutions(&self) -> Vec<Vec<N>> {
        let mut mat = self.matrix();
        let mut callback = SolutionCallback::all();
        mat.solve(&mut callback);

        callback
            .solutions
            .into_iter()
            .map(|rows| {
                rows.into_iter()
                    .filter_map(|row| self.problem.subsets().get_index(row))
                    .map(|(name, _)| name.clone())
                    .collect()
            })
            .collect()
    }
}
