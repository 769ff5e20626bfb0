use color_eyre::Report;
use parity_scale_codec::{Decode, Encode};

/// Canonical encoding boundary for every value persisted in the store.
///
/// Encodings are length-prefixed and deterministic, so that every replica
/// writes byte-identical state for the same sequence of blocks.
pub trait DomainType: Encode + Decode + Sized {
    fn encode_to_vec(&self) -> Vec<u8> {
        self.encode()
    }

    fn decode_all(bytes: &[u8]) -> Result<Self, Report> {
        let mut input = bytes;
        let value = Self::decode(&mut input)?;
        if !input.is_empty() {
            color_eyre::eyre::bail!("trailing bytes after decoding value");
        }
        Ok(value)
    }
}

impl<T: Encode + Decode> DomainType for T {}
