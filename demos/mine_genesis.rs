// Mine a regtest-difficulty genesis block and print it

use bng_genesis::{GenesisParams, GenesisReport, Miner, OutputScript, mine_genesis};

fn main() {
    env_logger::init();

    println!("Mining genesis block...\n");

    let params = GenesisParams::new(
        "Bitcoin-NG regtest genesis",
        1769169600,
        0x207fffff,
        OutputScript::ConstantTrue,
    );

    match mine_genesis(&params, &Miner::new()).and_then(|block| GenesisReport::new(&params.message, &block)) {
        Ok(report) => {
            println!("✓ Genesis block mined successfully!\n");
            println!("{}", report.to_text());
            println!("\n--- chainparams ---");
            println!("{}", report.to_snippet());
        }
        Err(e) => {
            println!("✗ Mining failed: {}", e);
            std::process::exit(1);
        }
    }
}
