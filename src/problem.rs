//! A generic problem type that defines constraints and subsets.
//!
//! Puzzle-like problems (polyomino packing, Sudoku, N-queens, ...) first
//! generate this basic [`Problem`] instance before handing it to a
//! [`Solver`](crate::solver::Solver), which turns it into a 0/1 matrix:
//! one column per constraint element, one row per subset.

use std::hash::Hash;

use indexmap::{IndexMap, IndexSet};

/// Base trait for subset names and set elements.
pub trait Value: Clone + Hash + Eq {}
impl<T: Clone + Hash + Eq> Value for T {}

/// An exact cover problem instance.
///
/// The set elements are of type `E`; each constraint element must be
/// covered exactly once. The subsets are identified by names of type `N`.
///
/// # Ordering
///
/// The order of the subsets and the elements is determined by the
/// insertion order, tracked with [`IndexMap`]/[`IndexSet`]. It decides
/// the column and row numbering of the generated matrix and therefore
/// the order in which solutions are found.
#[derive(Clone)]
#[cfg_attr(test, derive(Debug))]
pub struct Problem<N: Value, E: Value> {
    constraints: IndexSet<E>,
    subsets: IndexMap<N, Vec<E>>,
}

impl<N: Value, E: Value> Default for Problem<N, E> {
    fn default() -> Problem<N, E> {
        Problem {
            constraints: Default::default(),
            subsets: Default::default(),
        }
    }
}

impl<N: Value, E: Value> Problem<N, E> {
    /// Returns a reference to the constraints of the problem.
    pub fn constraints(&self) -> &IndexSet<E> {
        &self.constraints
    }

    /// Returns a reference to the subsets of the problem.
    pub fn subsets(&self) -> &IndexMap<N, Vec<E>> {
        &self.subsets
    }

    /// Adds a subset to the problem.
    ///
    /// If the subset name already exists, it replaces the corresponding
    /// subset.
    pub fn add_subset(&mut self, name: N, subset: Vec<E>) {
        self.subsets.insert(name, subset);
    }

    /// Adds a constraint element that has to be covered exactly once.
    pub fn add_constraint(&mut self, elem: E) {
        self.constraints.insert(elem);
    }

    /// Adds several constraints.
    pub fn add_constraints<I: IntoIterator<Item = E>>(&mut self, constraints: I) {
        for constraint in constraints {
            self.add_constraint(constraint);
        }
    }
}
