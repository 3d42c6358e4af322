//! [Exact cover] solver library using Knuth's [dancing links (DLX)] algorithm.
//!
//! [exact cover]: https://en.wikipedia.org/wiki/Exact_cover
//! [dancing links (DLX)]: https://en.wikipedia.org/wiki/Dancing_Links
//!
//! # Concept
//!
//! Many puzzle-like problems, such as polyomino packing, Sudoku, N-queens
//! problem, etc. can be modeled as exact cover problems: pick a subset of
//! the rows of a 0/1 matrix so that every column has a 1 in exactly one
//! picked row. This library provides the classic DLX solver for the
//! generic problem, along with a streaming loader for matrices written as
//! lines of `0`s and `1`s.
//!
//! # Basic example
//!
//! ```
//! use dlx_cover::{Problem, Solver};
//!
//! let mut prob = Problem::default();
//! prob.add_constraints(1..=3);
//! prob.add_subset("A", vec![1, 2, 3]);
//! prob.add_subset("B", vec![1]);
//! prob.add_subset("C", vec![2]);
//! prob.add_subset("D", vec![3]);
//! prob.add_subset("E", vec![1, 2]);
//! prob.add_subset("F", vec![2, 3]);
//!
//! let solver = Solver::new(prob);
//! assert_eq!(solver.first_solution(), Some(vec!["A"]));
//! assert_eq!(solver.solutions().len(), 4);
//! ```
//!
//! # Text matrices
//!
//! Matrices can also come from a byte stream of `'0'`/`'1'`/newline
//! characters, one row per line, trailing zeros optional:
//!
//! ```
//! use dlx_cover::{read_csr, Matrix};
//!
//! let (csr, cols) = read_csr("100\n010\n001\n".as_bytes()).unwrap();
//! let mut mat = Matrix::from_csr(&csr, cols).unwrap();
//!
//! let mut solution = Vec::new();
//! let mut remaining = 1;
//! let size = mat.exact_cover(&mut solution, &mut remaining);
//! let rows: Vec<_> = solution.iter().filter_map(|c| mat.row_of(c.node)).collect();
//! assert_eq!(size, 3);
//! assert_eq!(rows, vec![0, 1, 2]);
//! ```

pub mod buf;
pub mod csr;
pub mod error;
pub mod reader;

pub mod dlx;
pub mod problem;
pub mod solver;

pub use crate::csr::Csr;
pub use crate::dlx::{Callback, Choice, Matrix, PreselectError, SearchFlow, SolutionCallback};
pub use crate::error::Error;
pub use crate::problem::Problem;
pub use crate::reader::read_csr;
pub use crate::solver::Solver;
