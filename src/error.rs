//! Error kinds surfaced by the sparse matrix loader and builder.

use std::io;

use thiserror::Error;

/// Failures of the loader pipeline (text reader, staging buffers, DLX builder).
///
/// The three kinds are mutually exclusive and are reported at the interface
/// where they arise; the engine itself never produces them.
#[derive(Debug, Error)]
pub enum Error {
    /// An allocation or buffer growth failed. Partially built state is
    /// released before this is returned.
    #[error("out of memory while building the matrix")]
    MemoryExhausted,

    /// A byte outside `{'0', '1', '\n'}` was found in the input stream.
    #[error("unexpected byte {0:#04x} in matrix input")]
    MalformedInput(u8),

    /// The underlying stream failed with something other than end-of-stream.
    #[error("reading matrix input failed")]
    Io(#[from] io::Error),
}

impl Error {
    /// Numeric code for thin CLI or FFI surfaces. Success is the absence of
    /// an error and maps to 0.
    pub fn code(&self) -> i32 {
        match self {
            Error::MemoryExhausted => -1,
            Error::MalformedInput(_) => -2,
            Error::Io(_) => -3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_the_interface_table() {
        assert_eq!(Error::MemoryExhausted.code(), -1);
        assert_eq!(Error::MalformedInput(b' ').code(), -2);
        let io_err = io::Error::new(io::ErrorKind::Other, "boom");
        assert_eq!(Error::Io(io_err).code(), -3);
    }

    #[test]
    fn malformed_input_reports_the_byte() {
        let msg = Error::MalformedInput(b'\r').to_string();
        assert!(msg.contains("0x0d"), "unexpected message: {}", msg);
    }
}
