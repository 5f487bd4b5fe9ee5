//! End-to-end signing tests against pinned vectors.
//!
//! Signatures come from the well-known test key `0x46..46` through the
//! deterministic RFC 6979 signer, standing in for the external signer.

use ethers_core::types::U256;
use secp256k1::{Message, Secp256k1, SecretKey};

use super::*;
use crate::abi::transfer_calldata;
use crate::error::ErrorCode;
use crate::tx::{TransactionBuilder, UnsignedTransaction};
use crate::types::Address;

const SOURCE: &str = "0x9d8a62f656a8d1615c1294fd71e9cfb3e4855a4f";

fn source() -> Address {
    SOURCE.parse().unwrap()
}

fn destination() -> Address {
    "0xabcdabcdabcdabcdabcdabcdabcdabcdabcdabcd".parse().unwrap()
}

fn sign(hash: &[u8; 32]) -> DetachedSignature {
    let secp = Secp256k1::new();
    let key = SecretKey::from_slice(&[0x46; 32]).unwrap();
    let message = Message::from_digest_slice(hash).unwrap();
    let (_, compact) = secp.sign_ecdsa_recoverable(&message, &key).serialize_compact();
    DetachedSignature::from_bytes(&compact).unwrap()
}

fn fee_market_transfer() -> UnsignedTransaction {
    TransactionBuilder::new(1)
        .build_transfer(
            5,
            destination(),
            U256::exp10(15),
            U256::from(1_500_000_000u64),
            U256::from(3_520_000_000u64),
            21_000,
        )
        .unwrap()
}

fn legacy_transfer(chain_id: u64) -> UnsignedTransaction {
    TransactionBuilder::new(chain_id)
        .build_legacy_transfer(5, destination(), U256::exp10(15), U256::from(20_000_000_000u64), 21_000)
        .unwrap()
}

#[test]
fn test_fee_market_signing_hash() {
    let hash = signing_hash(&fee_market_transfer(), 1).unwrap();
    assert_eq!(
        hex::encode(hash),
        "9cd1cb4a1a982b47f588b0efb46611c1732ea33a240238509746f2db1ad924bb"
    );
}

#[test]
fn test_fee_market_golden_signature() {
    let tx = fee_market_transfer();
    let hash = signing_hash(&tx, 1).unwrap();
    let signature = sign(&hash);

    assert_eq!(
        format!("{:064x}", signature.r),
        "880584661b0dd05360fbd49f5b24ff8ea5a5f6b6fca6c9c26c3ed5ef23996fb4"
    );
    assert_eq!(
        format!("{:064x}", signature.s),
        "0712ec3702d40681e1086fbf71fb60d57e86de99323762f8d1df21364b7a33c7"
    );

    let signed = attach(&tx, 1, &source(), &signature, &hash).unwrap();
    assert_eq!(signed.v, 0);
    assert_eq!(
        signed.raw_hex(),
        "0x02f87101058459682f0084d1cef00082520894abcdabcdabcdabcdabcdabcdabcdabcdabcdabcd\
         87038d7ea4c6800080c080a0880584661b0dd05360fbd49f5b24ff8ea5a5f6b6fca6c9c26c3ed5ef2399\
         6fb4a00712ec3702d40681e1086fbf71fb60d57e86de99323762f8d1df21364b7a33c7"
    );
    assert_eq!(
        signed.hash_hex(),
        "0xa730681e445399001becbe76f6d4f5fa56c8ca0ae6ac69e4b31e6ff625fd04e0"
    );
}

#[test]
fn test_embedded_v_recovers_source() {
    let tx = fee_market_transfer();
    let hash = signing_hash(&tx, 1).unwrap();
    let signed = attach(&tx, 1, &source(), &sign(&hash), &hash).unwrap();

    let recoverable = RecoverableSignature {
        r: signed.r,
        s: signed.s,
        recovery_id: signed.v as u8,
    };
    assert_eq!(recoverable.recover(&hash), Some(source()));
}

#[test]
fn test_high_s_is_canonicalized() {
    let tx = fee_market_transfer();
    let hash = signing_hash(&tx, 1).unwrap();
    let low = sign(&hash);
    let high = DetachedSignature::new(low.r, SECP256K1_N - low.s).unwrap();

    assert_eq!(
        format!("{:064x}", high.s),
        "f8ed13c8fd2bf97e1ef790408e049f293c27fe4d7d113d42edf33d5684bc0d7a"
    );
    assert!(!high.is_low_s());

    let from_high = attach(&tx, 1, &source(), &high, &hash).unwrap();
    let from_low = attach(&tx, 1, &source(), &low, &hash).unwrap();
    assert!(from_high.s < high.s);
    assert_eq!(from_high, from_low);
}

#[test]
fn test_contract_call_golden_signature() {
    let contract: Address = "0xdac17f958d2ee523a2206206994597c13d831ec7".parse().unwrap();
    let calldata = transfer_calldata(destination(), U256::from(1_000_000u64)).unwrap();
    let tx = TransactionBuilder::new(1)
        .build_contract_call(
            7,
            contract,
            U256::from(1_500_000_000u64),
            U256::from(3_520_000_000u64),
            65_000,
            calldata,
        )
        .unwrap();

    let hash = signing_hash(&tx, 1).unwrap();
    assert_eq!(
        hex::encode(hash),
        "1bf97a53c9ca9f72dc65afa9e98bcbb7518dd0350c3634aacd649ca7d4547269"
    );

    let signed = attach(&tx, 1, &source(), &sign(&hash), &hash).unwrap();
    assert_eq!(signed.v, 1);
    assert_eq!(
        signed.raw_hex(),
        "0x02f8af01078459682f0084d1cef00082fde894dac17f958d2ee523a2206206994597c13d831ec780b844\
         a9059cbb000000000000000000000000abcdabcdabcdabcdabcdabcdabcdabcdabcdabcd\
         00000000000000000000000000000000000000000000000000000000000f4240c001a0d72025dfc33f2f\
         880fbb08d6c15027efdd97514a0bbd0d2bdd9a7b2c7f0bed23a05f013d1aaf8e360efede18e61ff8aa3c\
         40ef4b0b467c0d6ca061ab2a4d0e6769"
    );
}

#[test]
fn test_legacy_eip155_golden_signature() {
    let tx = legacy_transfer(1);
    let hash = signing_hash(&tx, 1).unwrap();
    assert_eq!(
        hex::encode(hash),
        "306f9ced28d87e4796fc8a89000939b464501439dab9878376d9b0eba378550a"
    );

    let signed = attach(&tx, 1, &source(), &sign(&hash), &hash).unwrap();
    assert_eq!(signed.v, 38);
    assert_eq!(
        signed.raw_hex(),
        "0xf86b058504a817c80082520894abcdabcdabcdabcdabcdabcdabcdabcdabcdabcd87038d7ea4c68000\
         8026a040c9329a2cc637afd4524fd947dc3c3e12df50a5a5327fcad925b70b9cafb540a0609f2c2689f3\
         e53d28cb7c5e68569b0dc6cec3c0948368976bd42d34a8180db7"
    );
}

#[test]
fn test_legacy_unprotected_golden_signature() {
    let tx = legacy_transfer(0);
    let hash = signing_hash(&tx, 0).unwrap();
    assert_eq!(
        hex::encode(hash),
        "f4da5fd0631f1cd97ce5e9590886601cae42773980ceb76ddc2bd7c5eef278bf"
    );

    let signed = attach(&tx, 0, &source(), &sign(&hash), &hash).unwrap();
    assert_eq!(signed.v, 28);
    assert_eq!(
        signed.raw_hex(),
        "0xf86b058504a817c80082520894abcdabcdabcdabcdabcdabcdabcdabcdabcdabcd87038d7ea4c68000\
         801ca0e0e55c83f3e20d3c4939af9687ec0d12d94c5a0c145330222491943cd813a287a04523cdfac834\
         747b6bc93e08c042c015ca9fdb610c421870247b7513ef686202"
    );
}

#[test]
fn test_unprotected_payload_is_shorter() {
    let protected = signing_payload(&legacy_transfer(1), 1).unwrap();
    let unprotected = signing_payload(&legacy_transfer(0), 0).unwrap();
    assert!(unprotected.len() < protected.len());
}

#[test]
fn test_wrong_source_fails_verification() {
    let tx = fee_market_transfer();
    let hash = signing_hash(&tx, 1).unwrap();
    let err = attach(&tx, 1, &destination(), &sign(&hash), &hash).unwrap_err();
    assert_eq!(err.code, ErrorCode::SignatureVerificationFailed);
}

#[test]
fn test_signature_over_other_hash_fails_verification() {
    let tx = fee_market_transfer();
    let hash = signing_hash(&tx, 1).unwrap();
    let signature = sign(&[0x11; 32]);
    let err = attach(&tx, 1, &source(), &signature, &hash).unwrap_err();
    assert_eq!(err.code, ErrorCode::SignatureVerificationFailed);
}

#[test]
fn test_hash_mismatch_is_rejected_before_recovery() {
    let tx = fee_market_transfer();
    let other = [0x22; 32];
    let err = attach(&tx, 1, &source(), &sign(&other), &other).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
    assert!(err.message.contains("does not match"));
}

#[test]
fn test_chain_id_mismatch() {
    let tx = fee_market_transfer();
    assert_eq!(signing_hash(&tx, 5).unwrap_err().code, ErrorCode::InvalidInput);

    let legacy = legacy_transfer(1);
    assert_eq!(signing_payload(&legacy, 0).unwrap_err().code, ErrorCode::InvalidInput);
}

#[test]
fn test_unencodable_recovery_id() {
    let err = encode_v(&fee_market_transfer(), 1, 2).unwrap_err();
    assert_eq!(err.code, ErrorCode::SignatureVerificationFailed);
}

#[test]
fn test_eip155_v_values() {
    let tx = legacy_transfer(137);
    assert_eq!(encode_v(&tx, 137, 0).unwrap(), 309);
    assert_eq!(encode_v(&tx, 137, 1).unwrap(), 310);
    assert_eq!(encode_v(&legacy_transfer(0), 0, 0).unwrap(), 27);
}

#[test]
fn test_attach_encoded_accepts_65_byte_signature() {
    let tx = fee_market_transfer();
    let hash = signing_hash(&tx, 1).unwrap();
    let mut bytes = sign(&hash).to_compact().to_vec();
    bytes.push(0x1b);
    let signature = DetachedSignature::from_hex(&format!("0x{}", hex::encode(&bytes))).unwrap();

    let unsigned = crate::tx::encode_unsigned(&tx);
    let signed = attach_encoded(&unsigned, 1, &source(), &signature, &hash).unwrap();
    assert_eq!(
        signed.hash_hex(),
        "0xa730681e445399001becbe76f6d4f5fa56c8ca0ae6ac69e4b31e6ff625fd04e0"
    );
}
