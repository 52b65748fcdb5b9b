//! core::address
//!
//! Account/actor addresses in their string and binary encodings.
//!
//! # Binary form
//!
//! `[protocol byte] ++ payload`, where the payload is:
//! - `Id`: unsigned LEB128 varint of the actor id (minimal, id < 2^63)
//! - `Secp256k1`, `Actor`: 20 bytes
//! - `Bls`: 48 bytes
//!
//! # String form
//!
//! `<network char><protocol digit><body>`, network `f` (mainnet) or `t`
//! (testnet). The `Id` body is the decimal id. Every other body is
//! lowercase unpadded base32 of `payload ++ checksum`, the checksum being
//! a 4-byte BLAKE2b digest of `protocol byte ++ payload`.
//!
//! # Example
//!
//! ```
//! use filminerctl::core::address::{Address, Network};
//!
//! let addr: Address = "f01024".parse().unwrap();
//! assert_eq!(addr, Address::new_id(1024).unwrap());
//! assert_eq!(addr.to_bytes(), vec![0x00, 0x80, 0x08]);
//! assert_eq!(addr.to_string_with(Network::Testnet), "t01024");
//!
//! assert!("not-an-address".parse::<Address>().is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use blake2::digest::consts::U4;
use blake2::{Blake2b, Digest};
use data_encoding::BASE32_NOPAD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Payload length of secp256k1 and actor addresses.
pub const PAYLOAD_HASH_LEN: usize = 20;

/// Payload length of BLS addresses (a public key).
pub const BLS_PUBLIC_KEY_LEN: usize = 48;

/// Length of the string-form checksum.
pub const CHECKSUM_LEN: usize = 4;

/// Longest valid string form: prefix plus base32 of a BLS payload and checksum.
pub const MAX_ADDRESS_STRING_LEN: usize = 2 + 84;

/// Most decimal digits an id body may carry.
const MAX_ID_DIGITS: usize = 20;

/// Ids are limited to 63 bits.
const MAX_ID: u64 = i64::MAX as u64;

type Blake2b32 = Blake2b<U4>;

/// Errors from address parsing and decoding.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("address is empty")]
    Empty,

    #[error("address string has invalid length {0}")]
    InvalidLength(usize),

    #[error("unknown network prefix '{0}'")]
    UnknownNetwork(char),

    #[error("unknown address protocol '{0}'")]
    UnknownProtocol(String),

    #[error("invalid {protocol} payload length {actual}, expected {expected}")]
    InvalidPayloadLength {
        protocol: Protocol,
        expected: usize,
        actual: usize,
    },

    #[error("invalid address encoding: {0}")]
    InvalidEncoding(String),

    #[error("address checksum does not match")]
    InvalidChecksum,

    #[error("invalid actor id '{0}'")]
    InvalidId(String),

    #[error("actor id {0} is out of range (ids must be below 2^63)")]
    IdOutOfRange(u64),

    #[error("invalid id varint: {0}")]
    InvalidVarint(&'static str),
}

/// Network an address string is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

impl Network {
    /// The leading character of address strings on this network.
    pub fn prefix(&self) -> char {
        match self {
            Network::Mainnet => 'f',
            Network::Testnet => 't',
        }
    }

    fn from_prefix(c: char) -> Result<Self, AddressError> {
        match c {
            'f' => Ok(Network::Mainnet),
            't' => Ok(Network::Testnet),
            other => Err(AddressError::UnknownNetwork(other)),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => f.write_str("mainnet"),
            Network::Testnet => f.write_str("testnet"),
        }
    }
}

/// Address protocol, the first byte of the binary form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Id = 0,
    Secp256k1 = 1,
    Actor = 2,
    Bls = 3,
}

impl Protocol {
    fn from_byte(b: u8) -> Result<Self, AddressError> {
        match b {
            0 => Ok(Protocol::Id),
            1 => Ok(Protocol::Secp256k1),
            2 => Ok(Protocol::Actor),
            3 => Ok(Protocol::Bls),
            other => Err(AddressError::UnknownProtocol(other.to_string())),
        }
    }

    fn from_digit(c: char) -> Result<Self, AddressError> {
        c.to_digit(10)
            .and_then(|d| u8::try_from(d).ok())
            .ok_or_else(|| AddressError::UnknownProtocol(c.to_string()))
            .and_then(Self::from_byte)
    }

    /// Fixed payload length, `None` for the variable-length id payload.
    fn payload_len(&self) -> Option<usize> {
        match self {
            Protocol::Id => None,
            Protocol::Secp256k1 | Protocol::Actor => Some(PAYLOAD_HASH_LEN),
            Protocol::Bls => Some(BLS_PUBLIC_KEY_LEN),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Id => f.write_str("id"),
            Protocol::Secp256k1 => f.write_str("secp256k1"),
            Protocol::Actor => f.write_str("actor"),
            Protocol::Bls => f.write_str("bls"),
        }
    }
}

/// A validated address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Address {
    /// Actor id address (`f0...`).
    Id(u64),
    /// Hash of a secp256k1 public key (`f1...`).
    Secp256k1([u8; PAYLOAD_HASH_LEN]),
    /// Hash identifying an actor (`f2...`).
    Actor([u8; PAYLOAD_HASH_LEN]),
    /// BLS public key (`f3...`).
    Bls([u8; BLS_PUBLIC_KEY_LEN]),
}

impl Address {
    /// Create an id address.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::IdOutOfRange` for ids of 2^63 and above.
    pub fn new_id(id: u64) -> Result<Self, AddressError> {
        if id > MAX_ID {
            return Err(AddressError::IdOutOfRange(id));
        }
        Ok(Address::Id(id))
    }

    /// Get the protocol.
    pub fn protocol(&self) -> Protocol {
        match self {
            Address::Id(_) => Protocol::Id,
            Address::Secp256k1(_) => Protocol::Secp256k1,
            Address::Actor(_) => Protocol::Actor,
            Address::Bls(_) => Protocol::Bls,
        }
    }

    /// Get the actor id for id addresses.
    pub fn id(&self) -> Option<u64> {
        match self {
            Address::Id(id) => Some(*id),
            _ => None,
        }
    }

    /// Get the payload bytes (the binary form without the protocol byte).
    pub fn payload(&self) -> Vec<u8> {
        match self {
            Address::Id(id) => {
                let mut out = Vec::with_capacity(10);
                encode_uvarint(*id, &mut out);
                out
            }
            Address::Secp256k1(hash) | Address::Actor(hash) => hash.to_vec(),
            Address::Bls(key) => key.to_vec(),
        }
    }

    /// Encode to the binary form stored in the datastore.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![self.protocol() as u8];
        out.extend(self.payload());
        out
    }

    /// Decode the binary form.
    ///
    /// # Errors
    ///
    /// Fails on empty input, an unknown protocol byte, a payload of the
    /// wrong length, or a malformed id varint.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AddressError> {
        let (&first, payload) = bytes.split_first().ok_or(AddressError::Empty)?;
        let protocol = Protocol::from_byte(first)?;
        Self::from_payload(protocol, payload)
    }

    fn from_payload(protocol: Protocol, payload: &[u8]) -> Result<Self, AddressError> {
        if let Some(expected) = protocol.payload_len() {
            if payload.len() != expected {
                return Err(AddressError::InvalidPayloadLength {
                    protocol,
                    expected,
                    actual: payload.len(),
                });
            }
        }

        match protocol {
            Protocol::Id => Self::new_id(decode_uvarint(payload)?),
            Protocol::Secp256k1 => Ok(Address::Secp256k1(to_array(payload)?)),
            Protocol::Actor => Ok(Address::Actor(to_array(payload)?)),
            Protocol::Bls => Ok(Address::Bls(to_array(payload)?)),
        }
    }

    /// Parse a string address, returning the network it was written for.
    pub fn parse_with_network(s: &str) -> Result<(Network, Self), AddressError> {
        if s.is_empty() {
            return Err(AddressError::Empty);
        }
        if s.len() < 3 || s.len() > MAX_ADDRESS_STRING_LEN {
            return Err(AddressError::InvalidLength(s.len()));
        }
        if !s.is_ascii() {
            return Err(AddressError::InvalidEncoding(
                "address must be ascii".into(),
            ));
        }

        let mut chars = s.chars();
        let network = chars
            .next()
            .ok_or(AddressError::Empty)
            .and_then(Network::from_prefix)?;
        let protocol = chars
            .next()
            .ok_or(AddressError::Empty)
            .and_then(Protocol::from_digit)?;
        let body = &s[2..];

        let address = match protocol {
            Protocol::Id => Self::new_id(parse_id(body)?)?,
            _ => {
                let raw = decode_base32(body)?;
                if raw.len() < CHECKSUM_LEN {
                    return Err(AddressError::InvalidEncoding(
                        "address body too short".into(),
                    ));
                }
                let (payload, checksum) = raw.split_at(raw.len() - CHECKSUM_LEN);
                let address = Self::from_payload(protocol, payload)?;
                if checksum != address_checksum(protocol, payload) {
                    return Err(AddressError::InvalidChecksum);
                }
                address
            }
        };

        Ok((network, address))
    }

    /// Render the string form for `network`.
    pub fn to_string_with(&self, network: Network) -> String {
        let protocol = self.protocol();
        let body = match self {
            Address::Id(id) => id.to_string(),
            _ => {
                let payload = self.payload();
                let mut raw = payload.clone();
                raw.extend_from_slice(&address_checksum(protocol, &payload));
                BASE32_NOPAD.encode(&raw).to_ascii_lowercase()
            }
        };
        format!("{}{}{}", network.prefix(), protocol as u8, body)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_with_network(s).map(|(_, address)| address)
    }
}

/// Renders for mainnet; use [`Address::to_string_with`] for another network.
impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with(Network::Mainnet))
    }
}

/// 4-byte BLAKE2b over the protocol byte and payload.
fn address_checksum(protocol: Protocol, payload: &[u8]) -> [u8; CHECKSUM_LEN] {
    let digest = Blake2b32::new()
        .chain_update([protocol as u8])
        .chain_update(payload)
        .finalize();
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&digest);
    out
}

fn parse_id(body: &str) -> Result<u64, AddressError> {
    let canonical = !body.is_empty()
        && body.len() <= MAX_ID_DIGITS
        && body.bytes().all(|b| b.is_ascii_digit())
        && (body == "0" || !body.starts_with('0'));
    if !canonical {
        return Err(AddressError::InvalidId(body.to_string()));
    }
    body.parse::<u64>()
        .map_err(|_| AddressError::InvalidId(body.to_string()))
}

fn decode_base32(body: &str) -> Result<Vec<u8>, AddressError> {
    if !body.bytes().all(|b| matches!(b, b'a'..=b'z' | b'2'..=b'7')) {
        return Err(AddressError::InvalidEncoding(
            "body must be lowercase base32".into(),
        ));
    }
    BASE32_NOPAD
        .decode(body.to_ascii_uppercase().as_bytes())
        .map_err(|e| AddressError::InvalidEncoding(e.to_string()))
}

fn to_array<const N: usize>(payload: &[u8]) -> Result<[u8; N], AddressError> {
    payload
        .try_into()
        .map_err(|_| AddressError::InvalidEncoding("payload length mismatch".into()))
}

fn encode_uvarint(mut value: u64, out: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

fn decode_uvarint(bytes: &[u8]) -> Result<u64, AddressError> {
    let mut value: u64 = 0;
    for (i, &byte) in bytes.iter().enumerate() {
        let low = u64::from(byte & 0x7f);
        if i == 9 && low > 1 {
            return Err(AddressError::InvalidVarint("overflows 64 bits"));
        }
        if i > 9 {
            return Err(AddressError::InvalidVarint("too long"));
        }
        value |= low << (7 * i);

        if byte & 0x80 == 0 {
            if i + 1 != bytes.len() {
                return Err(AddressError::InvalidVarint("trailing bytes"));
            }
            if byte == 0 && i > 0 {
                return Err(AddressError::InvalidVarint("not minimally encoded"));
            }
            return Ok(value);
        }
    }
    Err(AddressError::InvalidVarint("truncated"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECP: &str = "f15ihq5ibzwki2b4ep2f46avlkrqzhpqgtga7pdrq";
    const SECP_PAYLOAD: &str = "ea0f0ea039b291a0f08fd179e0556a8c3277c0d3";
    const ACTOR: &str = "f2aebagbafaydqqcikbmga2dqpcaireeyu6f3drwq";
    const BLS: &str = "f3aaaqeayeaudaocajbifqydiob4ibceqtcqkrmfyydenbwha5dypsaijcemsckjrhfausukzmfuxc7xayzmkq";

    #[test]
    fn parse_id_address() {
        let addr: Address = "f01024".parse().expect("parse");
        assert_eq!(addr, Address::Id(1024));
        assert_eq!(addr.to_bytes(), vec![0x00, 0x80, 0x08]);
        assert_eq!(addr.to_string(), "f01024");
    }

    #[test]
    fn parse_zero_id() {
        let addr: Address = "t00".parse().expect("parse");
        assert_eq!(addr.id(), Some(0));
        assert_eq!(addr.to_bytes(), vec![0x00, 0x00]);
    }

    #[test]
    fn parse_secp_address() {
        let addr: Address = SECP.parse().expect("parse");
        assert_eq!(addr.protocol(), Protocol::Secp256k1);
        assert_eq!(hex::encode(addr.payload()), SECP_PAYLOAD);
        assert_eq!(addr.to_string(), SECP);
    }

    #[test]
    fn parse_actor_address() {
        let addr: Address = ACTOR.parse().expect("parse");
        let expected: Vec<u8> = (1..=20).collect();
        assert_eq!(addr.protocol(), Protocol::Actor);
        assert_eq!(addr.payload(), expected);
        assert_eq!(addr.to_string(), ACTOR);
    }

    #[test]
    fn parse_bls_address() {
        assert_eq!(BLS.len(), MAX_ADDRESS_STRING_LEN);
        let addr: Address = BLS.parse().expect("parse");
        let expected: Vec<u8> = (0..48).collect();
        assert_eq!(addr.protocol(), Protocol::Bls);
        assert_eq!(addr.payload(), expected);
        assert_eq!(addr.to_string(), BLS);
    }

    #[test]
    fn network_is_reported_and_rendered() {
        let (network, addr) = Address::parse_with_network("t01024").expect("parse");
        assert_eq!(network, Network::Testnet);
        assert_eq!(addr.to_string_with(Network::Testnet), "t01024");
        assert_eq!(addr.to_string_with(Network::Mainnet), "f01024");
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(
            "not-an-address".parse::<Address>(),
            Err(AddressError::UnknownNetwork('n'))
        );
        assert_eq!("".parse::<Address>(), Err(AddressError::Empty));
        assert_eq!("f0".parse::<Address>(), Err(AddressError::InvalidLength(2)));
        assert!(matches!(
            "f91234".parse::<Address>(),
            Err(AddressError::UnknownProtocol(_))
        ));
    }

    #[test]
    fn rejects_bad_checksum() {
        let corrupted = "f15ihq5ibzwki2b4ep2f46avlkrqzhpqgtge7pdrq";
        assert_eq!(
            corrupted.parse::<Address>(),
            Err(AddressError::InvalidChecksum)
        );
    }

    #[test]
    fn rejects_uppercase_body() {
        let upper = format!("f1{}", SECP[2..].to_ascii_uppercase());
        assert!(matches!(
            upper.parse::<Address>(),
            Err(AddressError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn rejects_non_canonical_ids() {
        assert!(matches!(
            "f0012".parse::<Address>(),
            Err(AddressError::InvalidId(_))
        ));
        assert!(matches!(
            "f0-1".parse::<Address>(),
            Err(AddressError::InvalidId(_))
        ));
        assert_eq!(
            "f09223372036854775808".parse::<Address>(),
            Err(AddressError::IdOutOfRange(1 << 63))
        );
        assert_eq!(
            "f09223372036854775807".parse::<Address>().expect("max id"),
            Address::Id(MAX_ID)
        );
    }

    #[test]
    fn rejects_wrong_payload_length() {
        // Valid base32 and checksum shape, but a 19-byte payload.
        let payload = [7u8; 19];
        let mut raw = payload.to_vec();
        raw.extend_from_slice(&address_checksum(Protocol::Secp256k1, &payload));
        let s = format!("f1{}", BASE32_NOPAD.encode(&raw).to_ascii_lowercase());

        assert!(matches!(
            s.parse::<Address>(),
            Err(AddressError::InvalidPayloadLength { actual: 19, .. })
        ));
    }

    #[test]
    fn from_bytes_validates() {
        assert_eq!(Address::from_bytes(&[]), Err(AddressError::Empty));
        assert!(matches!(
            Address::from_bytes(&[9, 1]),
            Err(AddressError::UnknownProtocol(_))
        ));
        assert!(matches!(
            Address::from_bytes(&[1, 0, 0]),
            Err(AddressError::InvalidPayloadLength { expected: 20, .. })
        ));
        assert_eq!(Address::from_bytes(&[0, 0x80, 0x08]), Ok(Address::Id(1024)));
    }

    #[test]
    fn id_varint_edge_cases() {
        assert_eq!(
            Address::from_bytes(&[0, 0x80]),
            Err(AddressError::InvalidVarint("truncated"))
        );
        assert_eq!(
            Address::from_bytes(&[0, 0x01, 0x02]),
            Err(AddressError::InvalidVarint("trailing bytes"))
        );
        assert_eq!(
            Address::from_bytes(&[0, 0x81, 0x00]),
            Err(AddressError::InvalidVarint("not minimally encoded"))
        );
        let max = Address::Id(MAX_ID).to_bytes();
        assert_eq!(Address::from_bytes(&max), Ok(Address::Id(MAX_ID)));
    }

    #[test]
    fn new_id_range() {
        assert!(Address::new_id(MAX_ID).is_ok());
        assert_eq!(
            Address::new_id(u64::MAX),
            Err(AddressError::IdOutOfRange(u64::MAX))
        );
    }

    #[test]
    fn network_serde_names() {
        let n: Network = toml::from_str::<std::collections::HashMap<String, Network>>(
            "network = \"testnet\"",
        )
        .expect("parse")["network"];
        assert_eq!(n, Network::Testnet);
        assert_eq!(Network::default(), Network::Mainnet);
    }
}
