//! Property-based tests for the counter and address codecs.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated inputs.

use proptest::prelude::*;

use filminerctl::core::address::{Address, Network, Protocol};
use filminerctl::core::datastore::{Datastore, Key, MemoryDatastore};
use filminerctl::core::metadata::{decode_counter, encode_counter, StoredCounter};

/// Strategy for addresses of every protocol.
fn any_address() -> impl Strategy<Value = Address> {
    prop_oneof![
        (0u64..=i64::MAX as u64).prop_map(Address::Id),
        any::<[u8; 20]>().prop_map(Address::Secp256k1),
        any::<[u8; 20]>().prop_map(Address::Actor),
        prop::collection::vec(any::<u8>(), 48).prop_map(|v| {
            let mut key = [0u8; 48];
            key.copy_from_slice(&v);
            Address::Bls(key)
        }),
    ]
}

fn any_network() -> impl Strategy<Value = Network> {
    prop_oneof![Just(Network::Mainnet), Just(Network::Testnet)]
}

proptest! {
    /// The stored counter encoding is exactly eight big-endian bytes.
    #[test]
    fn counter_encoding_is_big_endian(value in any::<u64>()) {
        let encoded = encode_counter(value);
        prop_assert_eq!(encoded, value.to_be_bytes());
        prop_assert_eq!(decode_counter(&encoded), Some(value));
    }

    /// Anything other than eight bytes is rejected.
    #[test]
    fn counter_rejects_other_lengths(bytes in prop::collection::vec(any::<u8>(), 0..32)) {
        prop_assume!(bytes.len() != 8);
        prop_assert_eq!(decode_counter(&bytes), None);
    }

    /// Allocation after a repair continues consecutively from the repaired value.
    #[test]
    fn allocations_are_consecutive(start in 0u64..u64::MAX - 64, count in 1usize..32) {
        let ds = MemoryDatastore::new();
        let counter = StoredCounter::new(&ds, Key::new("/storage/nextid"));
        counter.overwrite(start).unwrap();

        for i in 0..count {
            prop_assert_eq!(counter.next().unwrap(), start + i as u64);
        }
        prop_assert_eq!(counter.peek().unwrap(), Some(start + count as u64));
    }

    /// A value rejected as corrupt is never replaced by `next`.
    #[test]
    fn corrupt_counter_is_left_alone(bytes in prop::collection::vec(any::<u8>(), 0..16)) {
        prop_assume!(bytes.len() != 8);
        let ds = MemoryDatastore::new();
        let key = Key::new("/storage/nextid");
        ds.put(&key, &bytes).unwrap();

        let counter = StoredCounter::new(&ds, key.clone());
        prop_assert!(counter.next().is_err());
        prop_assert_eq!(ds.get(&key).unwrap(), bytes);
    }

    /// String rendering parses back to the same address and network.
    #[test]
    fn address_string_roundtrip(addr in any_address(), network in any_network()) {
        let s = addr.to_string_with(network);
        let (parsed_network, parsed) = Address::parse_with_network(&s).unwrap();
        prop_assert_eq!(parsed_network, network);
        prop_assert_eq!(parsed, addr);
    }

    /// Binary form leads with the protocol byte and decodes to the same address.
    #[test]
    fn address_bytes_roundtrip(addr in any_address()) {
        let bytes = addr.to_bytes();
        prop_assert_eq!(bytes[0], addr.protocol() as u8);
        prop_assert_eq!(Address::from_bytes(&bytes).unwrap(), addr);
    }

    /// Flipping any body character of a hashed address breaks its checksum.
    #[test]
    fn corrupted_secp_strings_rejected(payload in any::<[u8; 20]>(), pos in 2usize..41) {
        let s = Address::Secp256k1(payload).to_string();
        let mut chars: Vec<char> = s.chars().collect();
        chars[pos] = if chars[pos] == 'a' { 'b' } else { 'a' };
        let corrupted: String = chars.into_iter().collect();
        prop_assert!(corrupted.parse::<Address>().is_err());
    }

    /// Id addresses render as plain decimal.
    #[test]
    fn id_strings_are_decimal(id in 0u64..=i64::MAX as u64) {
        let addr = Address::Id(id);
        prop_assert_eq!(addr.protocol(), Protocol::Id);
        prop_assert_eq!(addr.to_string(), format!("f0{}", id));
    }
}
