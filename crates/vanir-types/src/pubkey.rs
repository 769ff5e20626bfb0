use std::fmt::{self, Display};

use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::Chain;

/// An address on some chain, carried as its canonical string form.
#[derive(
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Encode,
    Decode,
    Serialize,
    Deserialize,
)]
pub struct Address(pub String);

impl Address {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A secp256k1 public key, carried as raw bytes and rendered as hex.
///
/// The key carries a derivation that yields one address per supported chain;
/// the bech32 and chain-specific encodings live in the chain clients, so the
/// state machine derives a stable hex form instead.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode)]
pub struct PubKey(pub Vec<u8>);

impl PubKey {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        Ok(Self(hex::decode(s)?))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Derive this key's address on the given chain: the first 20 bytes of
    /// SHA-256 over the chain tag and the key bytes, hex encoded.
    pub fn address(&self, chain: Chain) -> Address {
        if self.is_empty() {
            return Address::default();
        }
        let mut hasher = Sha256::new();
        hasher.update(chain.as_str().as_bytes());
        hasher.update(b":");
        hasher.update(&self.0);
        let digest = hasher.finalize();
        Address::new(hex::encode(&digest[..20]))
    }
}

impl Display for PubKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

impl Serialize for PubKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for PubKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        PubKey::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// The pair of keys a node registers: one for TSS vault membership, one for
/// signing its own observations.
#[derive(
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Encode,
    Decode,
    Serialize,
    Deserialize,
)]
pub struct PubKeySet {
    pub secp256k1: PubKey,
    pub ed25519: PubKey,
}

impl PubKeySet {
    pub fn new(secp256k1: PubKey, ed25519: PubKey) -> Self {
        Self { secp256k1, ed25519 }
    }

    pub fn contains(&self, key: &PubKey) -> bool {
        !key.is_empty() && (&self.secp256k1 == key || &self.ed25519 == key)
    }
}
