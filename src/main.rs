// Genesis block generator - CLI

use bng_genesis::{Cli, handle};
use clap::Parser;

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = handle(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
