use std::{env, process};

use dashboard_forms::cli::{self, output};
use dashboard_forms::init;

fn main() {
    init();

    if let Err(err) = cli::run(env::args().skip(1)) {
        output::error(&err);
        process::exit(err.exit_code());
    }
}
