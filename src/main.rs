use std::env;
use std::process;

use songlint::cli::{init_tracing, run_with_args};

fn main() {
    init_tracing();
    let args: Vec<String> = env::args().collect();
    process::exit(run_with_args(&args));
}
