use ethereum_tool::signing::{attach, signing_hash, DetachedSignature, SECP256K1_N};
use ethereum_tool::tx::{decode_unsigned, encode_unsigned, TransactionBuilder, UnsignedTransaction};
use ethereum_tool::types::Address;
use ethereum_tool::utils::{keccak256, to_checksum_address};
use ethers_core::types::U256;
use proptest::prelude::*;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};

fn any_secret_key() -> impl Strategy<Value = SecretKey> {
    prop::array::uniform32(any::<u8>()).prop_filter_map("valid secp256k1 scalar", |bytes| {
        SecretKey::from_slice(&bytes).ok()
    })
}

fn any_u256() -> impl Strategy<Value = U256> {
    prop::array::uniform32(any::<u8>()).prop_map(|bytes| U256::from_big_endian(&bytes))
}

fn transfer(nonce: u64, value: U256, gas_limit: u64, chain_id: u64) -> UnsignedTransaction {
    TransactionBuilder::new(chain_id)
        .build_transfer(
            nonce,
            Address([0xab; 20]),
            value,
            U256::from(1_500_000_000u64),
            U256::from(3_520_000_000u64),
            gas_limit,
        )
        .expect("valid transfer")
}

proptest! {
    #[test]
    fn checksum_addresses_roundtrip(bytes in prop::array::uniform20(any::<u8>())) {
        let checksummed = to_checksum_address(&bytes);
        prop_assert!(checksummed.starts_with("0x"));

        let lower_expected = hex::encode(bytes);
        let hash = keccak256(lower_expected.as_bytes());
        let mut expected = String::from("0x");
        for (i, ch) in lower_expected.chars().enumerate() {
            let byte = hash[i / 2];
            let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
            if ch.is_ascii_digit() || nibble < 8 {
                expected.push(ch);
            } else {
                expected.push(ch.to_ascii_uppercase());
            }
        }
        prop_assert_eq!(&checksummed, &expected);

        // any case parses to the same bytes
        let parsed: Address = checksummed.parse().expect("checksummed parses");
        let upper: Address = format!("0X{}", lower_expected.to_uppercase()).parse().expect("upper parses");
        prop_assert_eq!(parsed, Address(bytes));
        prop_assert_eq!(upper, Address(bytes));
    }

    #[test]
    fn signing_hash_depends_on_every_field(
        nonce in 0u64..u64::MAX,
        value in any_u256(),
        gas_limit in 1u64..u64::MAX,
        chain_id in 1u64..1_000_000,
    ) {
        let base = signing_hash(&transfer(nonce, value, gas_limit, chain_id), chain_id).expect("hash");
        prop_assert_eq!(
            base,
            signing_hash(&transfer(nonce, value, gas_limit, chain_id), chain_id).expect("hash")
        );

        let next_value = value.overflowing_add(U256::one()).0;
        prop_assert_ne!(base, signing_hash(&transfer(nonce + 1, value, gas_limit, chain_id), chain_id).expect("hash"));
        prop_assert_ne!(base, signing_hash(&transfer(nonce, next_value, gas_limit, chain_id), chain_id).expect("hash"));
        prop_assert_ne!(base, signing_hash(&transfer(nonce, value, gas_limit + 1, chain_id), chain_id).expect("hash"));
        prop_assert_ne!(base, signing_hash(&transfer(nonce, value, gas_limit, chain_id + 1), chain_id + 1).expect("hash"));
    }

    #[test]
    fn unsigned_encoding_decodes_back(
        nonce in any::<u64>(),
        value in any_u256(),
        gas_limit in 1u64..u64::MAX,
        chain_id in 0u64..1_000_000,
        data in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        let builder = TransactionBuilder::new(chain_id);
        let tx = if data.is_empty() {
            builder.build_legacy_transfer(nonce, Address([0x11; 20]), value, U256::from(7u64), gas_limit)
        } else {
            builder.build_legacy_contract_call(nonce, Address([0x11; 20]), U256::from(7u64), gas_limit, data)
        }
        .expect("valid legacy transaction");

        prop_assert_eq!(decode_unsigned(&encode_unsigned(&tx)).expect("decodes"), tx);
    }

    #[test]
    fn attached_signature_is_canonical_and_recovers(secret in any_secret_key(), nonce in any::<u64>()) {
        let secp = Secp256k1::new();
        let source = Address::from_public_key(&PublicKey::from_secret_key(&secp, &secret));

        let tx = transfer(nonce, U256::exp10(15), 21_000, 1);
        let hash = signing_hash(&tx, 1).expect("hash");
        let message = Message::from_digest_slice(&hash).expect("32-byte digest");
        let (_, compact) = secp.sign_ecdsa_recoverable(&message, &secret).serialize_compact();
        let low = DetachedSignature::from_bytes(&compact).expect("valid signature");
        let high = DetachedSignature::new(low.r, SECP256K1_N - low.s).expect("valid scalar");

        let from_low = attach(&tx, 1, &source, &low, &hash).expect("low-s attaches");
        let from_high = attach(&tx, 1, &source, &high, &hash).expect("high-s attaches");

        prop_assert!(from_high.s < high.s);
        prop_assert_eq!(&from_low, &from_high);
        prop_assert!(from_low.v <= 1);

        let recovered = low.recover_address(&hash, from_low.v as u8);
        prop_assert_eq!(recovered, Some(source));
    }
}
