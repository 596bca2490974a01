//! # Merkle Proofs
//!
//! Sibling path plus positional bits, with the stable wire form:
//! `u32-BE sibling count ‖ siblings(32 each) ‖ u32-BE position count ‖
//! packed bitvector (LSB = level 0)`.

use crate::errors::MerkleError;
use serde::{Deserialize, Serialize};
use shared_types::Digest;

/// An ordered Merkle inclusion proof.
///
/// `positions[i] = true` means the proven node was the right child at level
/// `i` and `siblings[i]` sits on the left.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    /// Sibling digest at each level, leaf level first.
    pub siblings: Vec<Digest>,
    /// Child position of the proven node at each level.
    pub positions: Vec<bool>,
}

impl MerkleProof {
    /// An empty proof: valid only for a single-leaf tree.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            siblings: Vec::new(),
            positions: Vec::new(),
        }
    }

    /// Creates a proof from siblings and positions.
    #[must_use]
    pub const fn new(siblings: Vec<Digest>, positions: Vec<bool>) -> Self {
        Self {
            siblings,
            positions,
        }
    }

    /// Number of levels in the proof.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.siblings.len()
    }

    /// Returns true if siblings and positions agree in length.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.siblings.len() == self.positions.len()
    }

    /// Encodes the proof into its wire form.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let bit_bytes = self.positions.len().div_ceil(8);
        let mut out = Vec::with_capacity(4 + self.siblings.len() * 32 + 4 + bit_bytes);

        out.extend_from_slice(&u32::try_from(self.siblings.len()).unwrap_or(u32::MAX).to_be_bytes());
        for sibling in &self.siblings {
            out.extend_from_slice(sibling.as_bytes());
        }

        out.extend_from_slice(&u32::try_from(self.positions.len()).unwrap_or(u32::MAX).to_be_bytes());
        let mut bits = vec![0u8; bit_bytes];
        for (i, &is_right) in self.positions.iter().enumerate() {
            if is_right {
                bits[i / 8] |= 1 << (i % 8);
            }
        }
        out.extend_from_slice(&bits);
        out
    }

    /// Decodes a proof from its wire form.
    ///
    /// The input must be exactly one proof: trailing bytes and non-zero
    /// padding bits are rejected.
    pub fn decode(bytes: &[u8]) -> Result<Self, MerkleError> {
        let (proof, consumed) = Self::decode_prefix(bytes)?;
        if consumed != bytes.len() {
            return Err(MerkleError::InvalidProofEncoding(format!(
                "trailing bytes: {}",
                bytes.len() - consumed
            )));
        }
        Ok(proof)
    }

    /// Decodes a proof from the front of `bytes`, returning the proof and the
    /// number of bytes consumed. Used by container formats that embed proofs.
    pub fn decode_prefix(bytes: &[u8]) -> Result<(Self, usize), MerkleError> {
        let mut offset = 0usize;

        let sibling_count = read_u32(bytes, &mut offset)? as usize;
        // Don't trust the claimed count for allocation; truncated input
        // fails on the first short read.
        let mut siblings = Vec::with_capacity(sibling_count.min(64));
        for _ in 0..sibling_count {
            let slice = read_slice(bytes, &mut offset, 32)?;
            // from_slice cannot fail on a 32-byte slice
            siblings.push(Digest::from_slice(slice).ok_or(MerkleError::InvalidProof)?);
        }

        let position_count = read_u32(bytes, &mut offset)? as usize;
        let bit_bytes = position_count.div_ceil(8);
        let bits = read_slice(bytes, &mut offset, bit_bytes)?;

        let mut positions = Vec::with_capacity(position_count);
        for i in 0..position_count {
            positions.push(bits[i / 8] & (1 << (i % 8)) != 0);
        }
        // Padding bits beyond position_count must be zero.
        if position_count % 8 != 0 {
            let last = bits[bit_bytes - 1];
            let used = position_count % 8;
            if last >> used != 0 {
                return Err(MerkleError::InvalidProofEncoding(
                    "non-zero padding bits".to_string(),
                ));
            }
        }

        Ok((
            Self {
                siblings,
                positions,
            },
            offset,
        ))
    }
}

fn read_u32(bytes: &[u8], offset: &mut usize) -> Result<u32, MerkleError> {
    let slice = read_slice(bytes, offset, 4)?;
    let mut buf = [0u8; 4];
    buf.copy_from_slice(slice);
    Ok(u32::from_be_bytes(buf))
}

fn read_slice<'a>(bytes: &'a [u8], offset: &mut usize, len: usize) -> Result<&'a [u8], MerkleError> {
    let end = offset
        .checked_add(len)
        .ok_or_else(|| MerkleError::InvalidProofEncoding("length overflow".to_string()))?;
    if end > bytes.len() {
        return Err(MerkleError::InvalidProofEncoding(format!(
            "truncated: need {} bytes at offset {}, have {}",
            len,
            offset,
            bytes.len() - *offset
        )));
    }
    let slice = &bytes[*offset..end];
    *offset = end;
    Ok(slice)
}

// =============================================================================
// TESTS
// =============================================================================
