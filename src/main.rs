//! Test driver: reads a 0/1 matrix on stdin, prints its dimensions and
//! the first exact cover as 0-indexed row numbers.

use std::io;
use std::process::ExitCode;

use env_logger::Env;

use dlx_cover::{read_csr, Error, Matrix};

fn main() -> ExitCode {
    env_logger::init_from_env(Env::default().default_filter_or("warn")); // RUST_LOG

    match run(io::stdin().lock()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {} (code {})", err, err.code());
            ExitCode::from((-err.code()) as u8)
        }
    }
}

fn run(input: impl io::BufRead) -> Result<ExitCode, Error> {
    let (csr, cols) = read_csr(input)?;
    let mut mat = Matrix::from_csr(&csr, cols)?;
    println!("Dimensions: [{}, {}]", csr.rows(), cols);

    let mut solution = Vec::new();
    let mut remaining = 1;
    mat.exact_cover(&mut solution, &mut remaining);
    if remaining != 0 {
        eprintln!("no solution");
        return Ok(ExitCode::FAILURE);
    }

    let mut rows: Vec<usize> = solution
        .iter()
        .filter_map(|choice| mat.row_of(choice.node))
        .collect();
    rows.sort_unstable();
    let line: Vec<String> = rows.iter().map(ToString::to_string).collect();
    println!("{}", line.join(","));
    Ok(ExitCode::SUCCESS)
}
