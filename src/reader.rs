//! Streaming loader for textual 0/1 matrices.
//!
//! The input alphabet is exactly `'0'`, `'1'` and `'\n'`. Newlines
//! terminate rows; trailing zeros of a row may be omitted, so the matrix
//! width is the width of the widest row. End-of-stream without a final
//! newline still completes the last row; end-of-stream right after a
//! newline adds nothing.

use std::io::{BufRead, ErrorKind};

use log::debug;

use crate::buf::IndexBuf;
use crate::csr::Csr;
use crate::error::Error;

// Staging capacities; any non-zero value is correct.
const COL_IND_CAPACITY: usize = 512;
const ROW_PTR_CAPACITY: usize = 256;

/// Reads a 0/1 matrix from `input` into CSR form.
///
/// Returns the matrix together with its column count. Any byte outside
/// the input alphabet fails with [`Error::MalformedInput`]; stream
/// failures other than end-of-stream fail with [`Error::Io`].
pub fn read_csr<R: BufRead>(mut input: R) -> Result<(Csr, usize), Error> {
    let mut col_ind = IndexBuf::with_capacity(COL_IND_CAPACITY)?;
    let mut row_ptr = IndexBuf::with_capacity(ROW_PTR_CAPACITY)?;
    row_ptr.push(0)?;

    let mut col = 0;
    let mut max_cols = 0;
    let mut last_was_newline = true;

    loop {
        let used = {
            let chunk = match input.fill_buf() {
                Ok(chunk) => chunk,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::Io(e)),
            };
            if chunk.is_empty() {
                break; // end of stream
            }

            for &byte in chunk {
                match byte {
                    b'1' => {
                        col_ind.push(col)?;
                        col += 1;
                        last_was_newline = false;
                    }
                    b'0' => {
                        col += 1;
                        last_was_newline = false;
                    }
                    b'\n' => {
                        row_ptr.push(col_ind.len())?;
                        max_cols = max_cols.max(col);
                        col = 0;
                        last_was_newline = true;
                    }
                    other => return Err(Error::MalformedInput(other)),
                }
            }
            chunk.len()
        };
        input.consume(used);
    }

    // A stream ending mid-row terminates an implicit final row.
    if !last_was_newline {
        row_ptr.push(col_ind.len())?;
        max_cols = max_cols.max(col);
    }

    let csr = Csr::new(row_ptr.into_boxed_slice(), col_ind.into_boxed_slice());
    debug!(
        "parsed {} rows x {} cols, {} entries",
        csr.rows(),
        max_cols,
        csr.entries()
    );
    Ok((csr, max_cols))
}

#[cfg(test)]
mod tests {
    use std::io::{self, BufReader, Read};

    use super::*;

    fn parse(text: &str) -> (Csr, usize) {
        read_csr(text.as_bytes()).unwrap()
    }

    #[test]
    fn identity_matrix_parses() {
        let (csr, cols) = parse("100\n010\n001\n");
        assert_eq!((csr.rows(), cols), (3, 3));
        assert_eq!(csr.row(0), &[0]);
        assert_eq!(csr.row(1), &[1]);
        assert_eq!(csr.row(2), &[2]);
    }

    #[test]
    fn empty_input_is_an_empty_matrix() {
        let (csr, cols) = parse("");
        assert_eq!((csr.rows(), cols), (0, 0));
        assert_eq!(csr.entries(), 0);
    }

    #[test]
    fn missing_final_newline_keeps_the_last_row() {
        let (csr, cols) = parse("10\n01");
        assert_eq!((csr.rows(), cols), (2, 2));
        assert_eq!(csr.row(1), &[1]);
    }

    #[test]
    fn ragged_rows_widen_to_the_widest() {
        let (csr, cols) = parse("1\n01\n001\n");
        assert_eq!((csr.rows(), cols), (3, 3));
        assert_eq!(csr.row(0), &[0]);
        assert_eq!(csr.row(1), &[1]);
        assert_eq!(csr.row(2), &[2]);
    }

    #[test]
    fn empty_lines_are_all_zero_rows() {
        let (csr, cols) = parse("11\n\n01\n");
        assert_eq!((csr.rows(), cols), (3, 2));
        assert_eq!(csr.row(1), &[] as &[usize]);
    }

    #[test]
    fn rejects_bytes_outside_the_alphabet() {
        assert!(matches!(
            read_csr("1 0\n".as_bytes()),
            Err(Error::MalformedInput(b' '))
        ));
        assert!(matches!(
            read_csr("10\r\n".as_bytes()),
            Err(Error::MalformedInput(b'\r'))
        ));
    }

    #[test]
    fn stream_failure_is_an_io_error() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
            }
        }
        let result = read_csr(BufReader::new(Broken));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn render_and_reread_round_trips() {
        let inputs = ["100\n010\n001\n", "1\n01\n001\n", "11\n\n01\n", "10\n01"];
        for input in inputs {
            let (csr, cols) = parse(input);
            let (again, cols_again) = parse(&csr.render(cols));
            assert_eq!(cols, cols_again);
            assert_eq!(csr, again);
        }
    }
}
