// End-to-end genesis fixtures

use bng_genesis::consensus::pow::verify_solution;
use bng_genesis::{
    GenesisError, GenesisParams, GenesisReport, Miner, OutputScript, ParallelMiner, Target, build_template,
    mine_genesis, verify_genesis,
};

const BNG_MESSAGE: &str = "Bitcoin-NG 22/Jan/2026 Network Identity genesis";
const BNG_TIME: u32 = 1769040000;

const SATOSHI_MESSAGE: &str = "The Times 03/Jan/2009 Chancellor on brink of second bailout for banks";
const SATOSHI_PUBKEY: &str = "04678afdb0fe5548271967f1a67130b7105cd6a828e03909a67962e0ea1f61deb649f6bc3f4cef38c4f35504e51ec112de5c384df7ba0b8d578a4c702b6bf11d5f";

fn bng_params(time: u32) -> GenesisParams {
    GenesisParams::new(BNG_MESSAGE, time, 0x1d00ffff, OutputScript::ConstantTrue)
}

fn satoshi_params() -> GenesisParams {
    let pubkey = hex::decode(SATOSHI_PUBKEY).unwrap();
    GenesisParams::new(SATOSHI_MESSAGE, 1231006505, 0x1d00ffff, OutputScript::PayToPubkey(pubkey))
}

#[test]
fn bng_coinbase_is_pinned() {
    let block = build_template(&bng_params(BNG_TIME)).unwrap();

    assert_eq!(
        hex::encode(&block.coinbase.input.script_sig),
        "04ffff001d01042f426974636f696e2d4e472032322f4a616e2f32303236204e6574776f726b204964656e746974792067656e65736973"
    );
    assert_eq!(
        hex::encode(block.coinbase.serialize().unwrap()),
        "01000000010000000000000000000000000000000000000000000000000000000000000000ffffffff37\
         04ffff001d01042f426974636f696e2d4e472032322f4a616e2f32303236204e6574776f726b204964656e746974792067656e65736973\
         ffffffff0100f2052a01000000015100000000"
    );
    assert_eq!(
        block.header.merkle_root.to_hex(),
        "4436725c85cc48abb85145cd176c4cb541f8d65fe7fc57639ccc6e4464639856"
    );
    assert_eq!(
        hex::encode(&block.header.serialize()[..76]),
        "0100000000000000000000000000000000000000000000000000000000000000000000005698636444\
         6ecc9c6357fce75fd6f841b54c6c17cd4551b8ab48cc855c72364480687169ffff001d"
    );
}

#[test]
fn bng_template_is_deterministic() {
    let first = build_template(&bng_params(BNG_TIME)).unwrap();
    let second = build_template(&bng_params(BNG_TIME)).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.header.serialize(), second.header.serialize());

    // Time is a header field only
    let later = build_template(&bng_params(BNG_TIME + 1)).unwrap();
    assert_eq!(later.coinbase, first.coinbase);
    assert_eq!(later.header.merkle_root, first.header.merkle_root);
    assert_ne!(later.header.hash(), first.header.hash());
}

#[test]
fn bng_mainnet_time_has_no_solution_near_the_top() {
    // No nonce in 0..=u32::MAX solves this header; the search ends without wrapping
    let params = GenesisParams {
        start_nonce: u32::MAX - 1000,
        ..bng_params(BNG_TIME)
    };
    let err = mine_genesis(&params, &Miner::new()).unwrap_err();
    assert_eq!(
        err,
        GenesisError::NonceSpaceExhausted {
            start_nonce: u32::MAX - 1000,
            attempts: 1001
        }
    );
}

#[test]
fn bng_first_solvable_time() {
    // One second later, 2284535935 is the smallest solving nonce
    let params = GenesisParams {
        start_nonce: 2284533935,
        ..bng_params(BNG_TIME + 1)
    };

    let first = mine_genesis(&params, &Miner::new()).unwrap();
    let second = mine_genesis(&params, &Miner::new()).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.serialize().unwrap(), second.serialize().unwrap());

    assert_eq!(first.header.nonce, 2284535935);
    assert_eq!(
        first.hash().to_hex(),
        "000000006fb1f27580fce40505716c8d2f763dd4e925bbb4b3362b8fc26bb06a"
    );
    assert_eq!(
        first.header.merkle_root.to_hex(),
        "4436725c85cc48abb85145cd176c4cb541f8d65fe7fc57639ccc6e4464639856"
    );
    assert_eq!(
        first.header.to_hex(),
        "0100000000000000000000000000000000000000000000000000000000000000000000005698636444\
         6ecc9c6357fce75fd6f841b54c6c17cd4551b8ab48cc855c72364481687169ffff001d7f402b88"
    );

    let report = GenesisReport::new(BNG_MESSAGE, &first).unwrap();
    assert_eq!(report.nonce, 2284535935);
    assert_eq!(report.time, 1769040001);
    assert_eq!(report.script_pubkey, "51");
    assert!(report.to_snippet().contains("1769040001, 2284535935, 0x1d00ffff, 1, 50 * COIN);"));

    assert_eq!(verify_genesis(&bng_params(BNG_TIME + 1), 2284535935).unwrap(), first);
}

#[test]
fn satoshi_genesis_through_pipeline() {
    let params = GenesisParams {
        start_nonce: 2083236000,
        ..satoshi_params()
    };

    let block = mine_genesis(&params, &Miner::new()).unwrap();
    assert_eq!(block.header.nonce, 2083236893);
    assert_eq!(
        block.hash().to_hex(),
        "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f"
    );
    assert_eq!(
        block.header.merkle_root.to_hex(),
        "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b"
    );
    assert_eq!(
        block.header.to_hex(),
        "0100000000000000000000000000000000000000000000000000000000000000000000003ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4a29ab5f49ffff001d1dac2b7c"
    );
    assert_eq!(block.serialize().unwrap().len(), 285);

    let parallel = mine_genesis(&params, &ParallelMiner::new(3)).unwrap();
    assert_eq!(parallel, block);

    assert_eq!(verify_genesis(&satoshi_params(), 2083236893).unwrap(), block);
}

#[test]
fn satoshi_report() {
    let block = verify_genesis(&satoshi_params(), 2083236893).unwrap();
    let report = GenesisReport::new(SATOSHI_MESSAGE, &block).unwrap();

    assert_eq!(report.nonce, 2083236893);
    assert_eq!(report.bits, "0x1d00ffff");
    assert_eq!(report.coinbase_txid, report.merkle_root);
    assert_eq!(
        report.coinbase_txid_internal,
        "3ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4a"
    );
    assert!(report.script_pubkey.starts_with("41") && report.script_pubkey.ends_with("ac"));

    let snippet = report.to_snippet();
    assert!(snippet.contains("1231006505, 2083236893, 0x1d00ffff, 1, 50 * COIN);"));
    assert!(snippet.contains("000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f"));
}

#[test]
fn wrong_nonce_is_rejected() {
    let err = verify_genesis(&satoshi_params(), 2083236894).unwrap_err();
    assert!(matches!(err, GenesisError::AcceleratorContractViolation(_)));

    let template = build_template(&satoshi_params()).unwrap().header;
    let target = Target::from_bits(0x1d00ffff).unwrap();
    assert!(verify_solution(&template, &template.with_nonce(2083236893), &target).is_ok());
}
