use serde_json::Value;
use std::process::{Command, Output};

const UNSIGNED: &str =
    "0x02ee01058459682f0084d1cef00082520894abcdabcdabcdabcdabcdabcdabcdabcdabcdabcd87038d7ea4c6800080c0";
const HASH: &str = "0x9cd1cb4a1a982b47f588b0efb46611c1732ea33a240238509746f2db1ad924bb";
const SIGNATURE: &str = "0x880584661b0dd05360fbd49f5b24ff8ea5a5f6b6fca6c9c26c3ed5ef23996fb4\
                         0712ec3702d40681e1086fbf71fb60d57e86de99323762f8d1df21364b7a33c7";
const SOURCE: &str = "0x9d8a62f656a8d1615c1294fd71e9cfb3e4855a4f";
const SOURCE_PUBKEY: &str = "024bc2a31265153f07e70e0bab08724e6b85e217f8cd628ceb62974247bb493382";
const SIGNED: &str = "0x02f87101058459682f0084d1cef00082520894abcdabcdabcdabcdabcdabcdabcdabcdabcdabcd\
                      87038d7ea4c6800080c080a0880584661b0dd05360fbd49f5b24ff8ea5a5f6b6fca6c9c26c3ed5ef2399\
                      6fb4a00712ec3702d40681e1086fbf71fb60d57e86de99323762f8d1df21364b7a33c7";

fn run_cli(args: &[&str]) -> Output {
    let binary_path = assert_cmd::cargo::cargo_bin!("ethereum-tool");
    Command::new(binary_path)
        .args(args)
        .env_remove("ETHEREUM_NETWORK_CHAIN_ID")
        .env_remove("ETHEREUM_NODE_URL")
        .env_remove("ETHEREUM_TOOL_DEBUG")
        .output()
        .expect("cli runs")
}

fn json_stdout(output: &Output) -> Value {
    assert!(output.status.success(), "cli exited unsuccessfully: {:?}", output);
    let stdout = String::from_utf8(output.stdout.clone()).expect("stdout is utf8");
    serde_json::from_str(&stdout).expect("stdout is valid json")
}

#[test]
fn hash_tx_prints_signing_hash() {
    let output = run_cli(&["hash-tx", "--chain-id", "1", "--unsigned", UNSIGNED]);
    let json = json_stdout(&output);

    assert_eq!(json["hash"], HASH);
    assert_eq!(json["payload"], UNSIGNED);
    assert_eq!(json["transaction"]["kind"], "fee_market_transfer");
    assert_eq!(json["transaction"]["nonce"], 5);
}

#[test]
fn hash_tx_rejects_other_chain() {
    let output = run_cli(&["hash-tx", "--chain-id", "5", "--unsigned", UNSIGNED]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("chain id"), "stderr: {}", stderr);
}

#[test]
fn add_signature_produces_signed_transaction() {
    let output = run_cli(&[
        "add-signature",
        "--chain-id",
        "1",
        "--source",
        SOURCE,
        "--unsigned",
        UNSIGNED,
        "--signature",
        SIGNATURE,
        "--hash",
        HASH,
    ]);
    let json = json_stdout(&output);

    assert_eq!(json["raw"], SIGNED);
    assert_eq!(json["hash"], "0xa730681e445399001becbe76f6d4f5fa56c8ca0ae6ac69e4b31e6ff625fd04e0");
    assert_eq!(json["v"], 0);
}

#[test]
fn add_signature_accepts_public_key_source() {
    let output = run_cli(&[
        "add-signature",
        "--chain-id",
        "1",
        "--source",
        SOURCE_PUBKEY,
        "--unsigned",
        UNSIGNED,
        "--signature",
        SIGNATURE,
        "--hash",
        HASH,
    ]);
    assert_eq!(json_stdout(&output)["raw"], SIGNED);
}

#[test]
fn add_signature_rejects_wrong_source() {
    let output = run_cli(&[
        "add-signature",
        "--chain-id",
        "1",
        "--source",
        "0xabcdabcdabcdabcdabcdabcdabcdabcdabcdabcd",
        "--unsigned",
        UNSIGNED,
        "--signature",
        SIGNATURE,
        "--hash",
        HASH,
    ]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("SignatureVerificationFailed"), "stderr: {}", stderr);
}

#[test]
fn node_commands_require_node_url() {
    let output = run_cli(&["balance", "--address", SOURCE]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ETHEREUM_NODE_URL"), "stderr: {}", stderr);
}
