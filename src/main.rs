//! Form Fill Binary

use formfill::FormCli;
use std::process;

fn main() {
    let mut cli = FormCli::new();
    if let Err(e) = cli.run() {
        eprintln!("❌ {}", e);
        process::exit(1);
    }
}
