//! The dancing links matrix and the exact cover search.
//!
//! The toroidal structure is flattened into one arena of nodes indexed by
//! `usize`: slot 0 is the head, slots `1..=col_cnt` are the column
//! headers, and entry nodes follow in row-major order. Node handles that
//! appear in the public API ([`Choice::node`], [`Matrix::force_row`], ...)
//! are indices into that arena.

use log::debug;
use thiserror::Error;

use crate::csr::Csr;
use crate::dlx::callback::{Callback, SearchFlow};
use crate::error::Error as BuildError;

/// A single node of [`Matrix`].
#[derive(Default)]
#[cfg_attr(test, derive(Clone, PartialEq, Debug))]
struct Node {
    // col is 1-based b/c of the head node (only internally); row is the
    // external 0-based row index.
    row: usize,
    col: usize,
    left: usize,
    right: usize,
    up: usize,
    down: usize,
}

/// One row of a solution: the chosen row's node handle, the id of the
/// column the search branched on, and how many candidate rows that column
/// offered at the moment of branching.
#[derive(Default, Clone)]
#[cfg_attr(test, derive(Debug))]
pub struct Choice {
    pub node: usize,
    pub col_id: usize,
    pub candidates: usize,
}

/// A rejected row preselection. The matrix is left untouched.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum PreselectError {
    /// The row has already been removed from the matrix, either by an
    /// earlier preselection it conflicts with or by one of its own.
    #[error("row is already removed from the matrix")]
    AlreadyRemoved,
    /// The row is still linked into the matrix and cannot be unselected.
    #[error("row is still linked into the matrix")]
    StillInMatrix,
}

/// A sparse 0/1 matrix linked for the dancing links algorithm.
#[cfg_attr(test, derive(Debug))]
pub struct Matrix {
    row_cnt: usize,
    col_cnt: usize,
    pool: Vec<Node>, // head: 0, column headers: 1..=col_cnt, entries after
    col_size: Vec<usize>,
    col_id: Vec<usize>,
    row_off: Vec<usize>, // entry offset of each row start, len row_cnt + 1
    stopped: bool,
}

impl Default for Matrix {
    fn default() -> Matrix {
        Matrix {
            row_cnt: 0,
            col_cnt: 0,
            pool: vec![Node::default()],
            col_size: vec![0],
            col_id: vec![0],
            row_off: vec![0],
            stopped: false,
        }
    }
}

// Methods for initializing Matrix
impl Matrix {
    const HEAD: usize = 0;

    /// Creates an empty matrix with `col_cnt` columns and no rows.
    ///
    /// Column ids default to the column's own 0-based index.
    pub fn new(col_cnt: usize) -> Matrix {
        let mut mat = Matrix {
            col_cnt,
            col_size: vec![0; col_cnt + 1],
            col_id: vec![0; col_cnt + 1],
            ..Matrix::default()
        };
        mat.link_headers();
        mat
    }

    /// Links a CSR matrix into dancing links form.
    ///
    /// `col_cnt` may exceed any column index present in `csr`; the extra
    /// columns come up empty, which makes padded problems unsolvable by
    /// construction. The whole working set is allocated here, up front;
    /// solving performs no further allocation.
    pub fn from_csr(csr: &Csr, col_cnt: usize) -> Result<Matrix, BuildError> {
        let mut pool = reserved(1 + col_cnt + csr.entries())?;
        pool.push(Node::default());
        let mut col_size = reserved(col_cnt + 1)?;
        col_size.resize(col_cnt + 1, 0);
        let mut col_id = reserved(col_cnt + 1)?;
        col_id.resize(col_cnt + 1, 0);
        let mut row_off = reserved(csr.rows() + 1)?;
        row_off.push(0);

        let mut mat = Matrix {
            row_cnt: 0,
            col_cnt,
            pool,
            col_size,
            col_id,
            row_off,
            stopped: false,
        };
        mat.link_headers();
        for i in 0..csr.rows() {
            mat.add_row(csr.row(i));
        }
        debug!(
            "linked {} entries across {} columns in {} rows",
            csr.entries(),
            col_cnt,
            csr.rows()
        );
        Ok(mat)
    }

    /// Appends a row given its 0-based column indices, ascending.
    ///
    /// The row's nodes form a circular left-right list and each one is
    /// appended to the bottom of its column. An empty slice is a valid
    /// all-zero row.
    pub fn add_row(&mut self, cols: &[usize]) {
        let row_num = self.row_cnt;
        self.row_cnt += 1;
        let mut prev_in_row = 0;

        for &col in cols {
            assert!(col < self.col_cnt, "column {} out of range", col);
            let header = col + 1;
            let node = self.alloc_node(row_num, header);

            // Below the bottommost node keeps the column in insertion order.
            self.splice_below(self.pool[header].up, node);
            if prev_in_row != 0 {
                self.splice_right(prev_in_row, node);
            }

            self.col_size[header] += 1;
            prev_in_row = node;
        }

        self.row_off.push(self.pool.len() - 1 - self.col_cnt);
    }

    fn link_headers(&mut self) {
        for col in 1..=self.col_cnt {
            let header = self.alloc_node(0, col);
            self.splice_right(header - 1, header);
            self.col_id[col] = col - 1;
        }
    }

    /// Assigns an opaque id to a column. The engine only copies it into
    /// [`Choice::col_id`] when the column is branched on.
    pub fn set_col_id(&mut self, col: usize, id: usize) {
        self.col_id[col + 1] = id;
    }

    /// Number of rows added so far.
    pub fn rows(&self) -> usize {
        self.row_cnt
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.col_cnt
    }
}

// Row identity
impl Matrix {
    /// The 0-based row index a node handle belongs to, or `None` for the
    /// head, a column header, or an out-of-range handle.
    pub fn row_of(&self, node: usize) -> Option<usize> {
        if node <= self.col_cnt || node >= self.pool.len() {
            return None;
        }
        Some(self.pool[node].row)
    }

    /// A handle to the first entry node of `row`, or `None` for a row
    /// with no entries.
    pub fn row_node(&self, row: usize) -> Option<usize> {
        let (start, end) = (self.row_off[row], self.row_off[row + 1]);
        if start == end {
            return None;
        }
        Some(1 + self.col_cnt + start)
    }
}

// Main algorithm (dancing links)
impl Matrix {
    /// Searches for the `remaining`-th solution, counting every leaf
    /// success down from the initial value of `remaining`.
    ///
    /// On success the counter is left at 0, `solution` holds one
    /// [`Choice`] per chosen row (depth order) and the solution size is
    /// returned. If fewer solutions exist, 0 is returned and the counter
    /// holds the initial value minus the number of solutions found. An
    /// empty matrix counts as a single solution of size 0, which is
    /// indistinguishable from failure by the return value alone —
    /// inspect the counter.
    ///
    /// A zero `remaining` is treated as a request for the first solution.
    /// The matrix is restored to its exact pre-call state before
    /// returning. Rows preselected with
    /// [`force_row`](Matrix::force_row) stay out of the search; any other
    /// interleaving of preselection and search is unsupported.
    pub fn exact_cover(&mut self, solution: &mut Vec<Choice>, remaining: &mut usize) -> usize {
        if *remaining == 0 {
            *remaining = 1;
        }
        solution.clear();
        solution.resize_with(self.col_cnt, Choice::default);
        let n = self.search(0, solution, remaining);
        solution.truncate(n);
        n
    }

    fn search(&mut self, k: usize, solution: &mut [Choice], remaining: &mut usize) -> usize {
        if self.pool[Matrix::HEAD].right == Matrix::HEAD {
            *remaining -= 1;
            return k;
        }

        // The terminal check above guarantees a live column. A zero-count
        // column makes the candidate loop empty and fails this depth.
        let (header, _) = match self.best_column() {
            Some(best) => best,
            None => return 0,
        };
        self.cover_col(header);
        solution[k].col_id = self.col_id[header];
        solution[k].candidates = self.col_size[header];

        let mut n = 0;
        let mut candidate = self.pool[header].down;
        while candidate != header {
            self.cover_other_cols(candidate);
            let found = self.search(k + 1, solution, remaining);
            self.uncover_other_cols(candidate);

            if found > 0 {
                solution[k].node = candidate;
                n = found;
            }
            if *remaining == 0 {
                break;
            }
            candidate = self.pool[candidate].down;
        }

        self.uncover_col(header);
        // Partial finds bubble up through `n` only while the counter is
        // being drained; a subtree that exhausted without reaching the
        // requested solution reports failure.
        if *remaining == 0 {
            n
        } else {
            0
        }
    }

    /// Enumerates every solution, reporting each to `callback` as a
    /// vector of 0-based row indices.
    ///
    /// `on_iteration` fires once per search node; returning
    /// [`SearchFlow::Stop`] from it ends the enumeration, which then
    /// unwinds with every cover paired to an uncover so the matrix is
    /// restored exactly as after a completed run.
    pub fn solve(&mut self, callback: &mut impl Callback<Matrix>) {
        self.stopped = false;
        let mut partial = Vec::new();
        self.solve_rec(&mut partial, callback);
        callback.on_finish();
    }

    fn solve_rec(&mut self, partial: &mut Vec<usize>, callback: &mut impl Callback<Matrix>) {
        if self.pool[Matrix::HEAD].right == Matrix::HEAD {
            callback.on_solution(partial.clone(), self);
        }

        if callback.on_iteration(self) == SearchFlow::Stop {
            self.stopped = true;
            callback.on_abort(self);
            return;
        }

        let (header, count) = match self.best_column() {
            Some(best) => best,
            None => return, // Terminal; the solution was reported above
        };
        if count == 0 {
            return; // Dead end
        }

        self.cover_col(header);

        let mut candidate = self.pool[header].down;
        while candidate != header {
            partial.push(self.pool[candidate].row);
            self.cover_other_cols(candidate);

            self.solve_rec(partial, callback);

            self.uncover_other_cols(candidate);
            partial.pop();

            if self.stopped {
                break;
            }
            candidate = self.pool[candidate].down;
        }

        self.uncover_col(header);
    }
}

// Row preselection
impl Matrix {
    /// Forces a row into every future solution: covers the row's primary
    /// column (the one `node` sits in), then every other column of the
    /// row.
    ///
    /// Fails with [`PreselectError::AlreadyRemoved`] if the row is gone,
    /// i.e. a previously forced row conflicts with it. Preselections must
    /// be undone in LIFO order with
    /// [`unselect_row`](Matrix::unselect_row); interleaving them with
    /// [`exact_cover`](Matrix::exact_cover) other than strictly around it
    /// is unsupported.
    pub fn force_row(&mut self, node: usize) -> Result<(), PreselectError> {
        assert!(
            node > self.col_cnt && node < self.pool.len(),
            "not an entry node handle"
        );
        if self.detached_ud(node) {
            return Err(PreselectError::AlreadyRemoved);
        }
        self.cover_col(self.pool[node].col);
        self.cover_other_cols(node);
        Ok(())
    }

    /// Undoes the most recent [`force_row`](Matrix::force_row) of `node`.
    ///
    /// Fails with [`PreselectError::StillInMatrix`] if the row was never
    /// removed. Must be called in exact LIFO order versus prior
    /// `force_row` calls.
    pub fn unselect_row(&mut self, node: usize) -> Result<(), PreselectError> {
        assert!(
            node > self.col_cnt && node < self.pool.len(),
            "not an entry node handle"
        );
        if !self.detached_ud(node) {
            return Err(PreselectError::StillInMatrix);
        }
        self.uncover_other_cols(node);
        self.uncover_col(self.pool[node].col);
        Ok(())
    }
}

// Link surgery. Unlink and relink are exact inverses as long as the
// excised node's neighbours have not moved in between; the search only
// ever relinks in the reverse order of its unlinks, which is what keeps
// the structure restorable.
impl Matrix {
    fn alloc_node(&mut self, row: usize, col: usize) -> usize {
        let id = self.pool.len();
        self.pool.push(Node {
            row,
            col,
            left: id,
            right: id,
            up: id,
            down: id,
        });
        id
    }

    // Splices a fresh node into the horizontal ring to the right of `at`.
    fn splice_right(&mut self, at: usize, node: usize) {
        let next = self.pool[at].right;
        self.pool[node].left = at;
        self.pool[node].right = next;
        self.pool[at].right = node;
        self.pool[next].left = node;
    }

    // Splices a fresh node into the vertical ring below `at`.
    fn splice_below(&mut self, at: usize, node: usize) {
        let next = self.pool[at].down;
        self.pool[node].up = at;
        self.pool[node].down = next;
        self.pool[at].down = node;
        self.pool[next].up = node;
    }

    // Neighbours skip over `node`; its own links stay put.
    #[inline]
    fn unlink_lr(&mut self, node: usize) {
        let Node { left, right, .. } = self.pool[node];
        self.pool[left].right = right;
        self.pool[right].left = left;
    }

    #[inline]
    fn relink_lr(&mut self, node: usize) {
        let Node { left, right, .. } = self.pool[node];
        self.pool[left].right = node;
        self.pool[right].left = node;
    }

    #[inline]
    fn unlink_ud(&mut self, node: usize) {
        let Node { up, down, .. } = self.pool[node];
        self.pool[up].down = down;
        self.pool[down].up = up;
    }

    #[inline]
    fn relink_ud(&mut self, node: usize) {
        let Node { up, down, .. } = self.pool[node];
        self.pool[up].down = node;
        self.pool[down].up = node;
    }

    // A node is vertically excised iff its neighbours skip over it.
    #[inline]
    fn detached_ud(&self, node: usize) -> bool {
        self.pool[self.pool[node].up].down != node
    }
}

// Cover and uncover
impl Matrix {
    // Removes `header` from the live header ring, then excises every row
    // of the column from all other columns it touches. The column's own
    // vertical ring is left intact so uncover can find the rows again.
    fn cover_col(&mut self, header: usize) {
        self.unlink_lr(header);

        let mut row = self.pool[header].down;
        while row != header {
            let mut entry = self.pool[row].right;
            while entry != row {
                self.unlink_ud(entry);
                self.col_size[self.pool[entry].col] -= 1;
                entry = self.pool[entry].right;
            }
            row = self.pool[row].down;
        }
    }

    // Strict mirror of cover_col: rows bottom-up, entries leftward.
    fn uncover_col(&mut self, header: usize) {
        let mut row = self.pool[header].up;
        while row != header {
            let mut entry = self.pool[row].left;
            while entry != row {
                self.col_size[self.pool[entry].col] += 1;
                self.relink_ud(entry);
                entry = self.pool[entry].left;
            }
            row = self.pool[row].up;
        }

        self.relink_lr(header);
    }

    // Covers every column of `node`'s row except the one `node` is in.
    fn cover_other_cols(&mut self, node: usize) {
        let mut mate = self.pool[node].right;
        while mate != node {
            self.cover_col(self.pool[mate].col);
            mate = self.pool[mate].right;
        }
    }

    fn uncover_other_cols(&mut self, node: usize) {
        let mut mate = self.pool[node].left;
        while mate != node {
            self.uncover_col(self.pool[mate].col);
            mate = self.pool[mate].left;
        }
    }

    // S-heuristic: the live column with the fewest candidate rows, the
    // first one encountered winning ties. `None` means the matrix has no
    // live columns left.
    fn best_column(&self) -> Option<(usize, usize)> {
        let mut best: Option<(usize, usize)> = None;

        let mut header = self.pool[Matrix::HEAD].right;
        while header != Matrix::HEAD {
            let count = self.col_size[header];
            if best.map_or(true, |(_, fewest)| count < fewest) {
                best = Some((header, count));
            }
            header = self.pool[header].right;
        }
        best
    }
}

fn reserved<T>(capacity: usize) -> Result<Vec<T>, BuildError> {
    let mut v = Vec::new();
    v.try_reserve_exact(capacity)
        .map_err(|_| BuildError::MemoryExhausted)?;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dlx::callback::SolutionCallback;
    use crate::reader::read_csr;

    fn matrix(text: &str) -> Matrix {
        let (csr, cols) = read_csr(text.as_bytes()).unwrap();
        Matrix::from_csr(&csr, cols).unwrap()
    }

    fn snapshot(mat: &Matrix) -> (Vec<Node>, Vec<usize>) {
        (mat.pool.clone(), mat.col_size.clone())
    }

    fn first_solution_rows(mat: &mut Matrix) -> Option<Vec<usize>> {
        let mut solution = Vec::new();
        let mut remaining = 1;
        mat.exact_cover(&mut solution, &mut remaining);
        if remaining != 0 {
            return None;
        }
        let mut rows: Vec<usize> = solution
            .iter()
            .filter_map(|c| mat.row_of(c.node))
            .collect();
        rows.sort_unstable();
        Some(rows)
    }

    // Knuth's classic 6x7 instance; the unique cover is rows {0, 3, 4}.
    const KNUTH: &str = "0010110\n1001001\n0110010\n1001000\n0100001\n0001101\n";

    #[test]
    fn build_counts_match_the_columns() {
        let mat = matrix(KNUTH);
        assert_eq!(mat.rows(), 6);
        assert_eq!(mat.cols(), 7);
        assert_eq!(&mat.col_size[1..], &[2, 2, 2, 3, 2, 3, 3]);

        // Counted again by walking each column's circular list.
        for col_num in 1..=mat.col_cnt {
            let mut count = 0;
            let mut i = mat.pool[col_num].down;
            while i != col_num {
                count += 1;
                i = mat.pool[i].down;
            }
            assert_eq!(count, mat.col_size[col_num]);
        }
    }

    #[test]
    fn every_node_is_symmetrically_linked_after_build() {
        let mat = matrix(KNUTH);
        for (x, node) in mat.pool.iter().enumerate() {
            assert_eq!(mat.pool[node.left].right, x);
            assert_eq!(mat.pool[node.right].left, x);
            assert_eq!(mat.pool[node.up].down, x);
            assert_eq!(mat.pool[node.down].up, x);
        }
    }

    #[test]
    fn knuth_instance_has_the_known_unique_cover() {
        let mut mat = matrix(KNUTH);
        assert_eq!(first_solution_rows(&mut mat), Some(vec![0, 3, 4]));

        // Unique: asking for a second solution exhausts the tree.
        let mut solution = Vec::new();
        let mut remaining = 2;
        assert_eq!(mat.exact_cover(&mut solution, &mut remaining), 0);
        assert_eq!(remaining, 1);
    }

    #[test]
    fn branch_metadata_is_recorded_per_depth() {
        let mut mat = matrix(KNUTH);
        let mut solution = Vec::new();
        let mut remaining = 1;
        let n = mat.exact_cover(&mut solution, &mut remaining);
        assert_eq!(n, 3);
        // Depth 0 branches on column 0, the leftmost of the size-2 ties.
        assert_eq!(solution[0].col_id, 0);
        assert_eq!(solution[0].candidates, 2);
        assert_eq!(mat.row_of(solution[0].node), Some(3));
    }

    #[test]
    fn unsatisfiable_matrix_reports_no_solution() {
        let mut mat = matrix("11\n11\n");
        assert_eq!(first_solution_rows(&mut mat), None);
    }

    #[test]
    fn empty_matrix_counts_as_one_vacuous_solution() {
        let mut mat = matrix("");
        let mut solution = Vec::new();
        let mut remaining = 2;
        assert_eq!(mat.exact_cover(&mut solution, &mut remaining), 0);
        assert_eq!(remaining, 1);
    }

    #[test]
    fn padded_columns_make_the_matrix_unsolvable() {
        let (csr, _) = read_csr("1\n".as_bytes()).unwrap();
        let mut mat = Matrix::from_csr(&csr, 2).unwrap();
        assert_eq!(first_solution_rows(&mut mat), None);
    }

    #[test]
    fn skip_counter_walks_the_solution_sequence() {
        // Four covers: {0,1}, {0,3}, {2,1}, {2,3} in search order.
        let text = "10\n01\n10\n01\n";

        let mut mat = matrix(text);
        let mut solution = Vec::new();
        let mut remaining = 2;
        assert_eq!(mat.exact_cover(&mut solution, &mut remaining), 2);
        assert_eq!(remaining, 0);
        let rows: Vec<_> = solution.iter().filter_map(|c| mat.row_of(c.node)).collect();
        assert_eq!(rows, vec![0, 3]);

        let mut remaining = 3;
        assert_eq!(mat.exact_cover(&mut solution, &mut remaining), 2);
        assert_eq!(remaining, 0);
        let rows: Vec<_> = solution.iter().filter_map(|c| mat.row_of(c.node)).collect();
        assert_eq!(rows, vec![2, 1]);

        let mut remaining = 5;
        assert_eq!(mat.exact_cover(&mut solution, &mut remaining), 0);
        assert_eq!(remaining, 1);
    }

    #[test]
    fn zero_skip_counter_degenerates_to_first_solution() {
        let mut mat = matrix("10\n01\n");
        let mut solution = Vec::new();
        let mut remaining = 0;
        assert_eq!(mat.exact_cover(&mut solution, &mut remaining), 2);
        assert_eq!(remaining, 0);
    }

    #[test]
    fn search_restores_the_matrix_exactly() {
        let mut mat = matrix(KNUTH);
        let before = snapshot(&mat);

        let mut solution = Vec::new();
        let mut remaining = 1;
        mat.exact_cover(&mut solution, &mut remaining);
        assert_eq!(snapshot(&mat), before);

        // Exhausting the whole tree restores it too.
        let mut remaining = 100;
        mat.exact_cover(&mut solution, &mut remaining);
        assert_eq!(snapshot(&mat), before);
    }

    #[test]
    fn balanced_preselection_restores_the_matrix() {
        let mut mat = matrix(KNUTH);
        let before = snapshot(&mat);

        // Row 0 covers columns {2, 4, 5}.
        let node = mat.row_node(0).unwrap();
        mat.force_row(node).unwrap();
        // With row 0 forced the rest of the cover is forced as well.
        assert_eq!(first_solution_rows(&mut mat), Some(vec![3, 4]));

        mat.unselect_row(node).unwrap();
        assert_eq!(snapshot(&mat), before);
    }

    #[test]
    fn forcing_a_conflicting_row_is_rejected() {
        let mut mat = matrix(KNUTH);
        // Rows 0 and 2 share column 2; forcing row 0 removes row 2.
        let forced = mat.row_node(0).unwrap();
        mat.force_row(forced).unwrap();

        let conflicting = mat.row_node(2).unwrap();
        assert_eq!(
            mat.force_row(conflicting),
            Err(PreselectError::AlreadyRemoved)
        );

        mat.unselect_row(forced).unwrap();
    }

    #[test]
    fn unselecting_a_live_row_is_rejected() {
        let mut mat = matrix(KNUTH);
        let node = mat.row_node(1).unwrap();
        assert_eq!(mat.unselect_row(node), Err(PreselectError::StillInMatrix));
    }

    #[test]
    fn solve_enumerates_every_solution() {
        let mut mat = matrix("10\n01\n10\n01\n");
        let mut callback = SolutionCallback::all();
        mat.solve(&mut callback);
        assert_eq!(
            callback.solutions,
            vec![vec![0, 1], vec![0, 3], vec![2, 1], vec![2, 3]]
        );
    }

    #[test]
    fn stopping_the_enumeration_early_restores_the_matrix() {
        let mut mat = matrix("10\n01\n10\n01\n");
        let before = snapshot(&mat);

        let mut callback = SolutionCallback::up_to(1);
        mat.solve(&mut callback);
        assert_eq!(callback.solutions, vec![vec![0, 1]]);
        assert_eq!(snapshot(&mat), before);
    }

    #[test]
    fn row_identity_round_trips() {
        let mat = matrix("10\n01\n");
        assert_eq!(mat.row_of(Matrix::HEAD), None);
        assert_eq!(mat.row_of(1), None); // column header
        let node = mat.row_node(1).unwrap();
        assert_eq!(mat.row_of(node), Some(1));

        let empty_rows = matrix("\n10\n");
        assert_eq!(empty_rows.row_node(0), None);
        assert_eq!(empty_rows.row_node(1).and_then(|n| empty_rows.row_of(n)), Some(1));
    }
}
