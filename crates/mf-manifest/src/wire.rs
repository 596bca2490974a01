//! # Compact Wire Form
//!
//! Fixed-width big-endian transport encoding:
//!
//! ```text
//! u16-BE version_len ‖ version (utf8)
//! u32-BE route_count
//!   per route: selector(4) ‖ facet(20) ‖ code_hash(32) ‖ proof wire
//! root(32)
//! ```
//!
//! Decoding re-derives the root from the decoded routes; a stored root that
//! disagrees is rejected, so a compact document can never claim a root its
//! routes do not produce.

use crate::builder::{Manifest, ManifestRoute};
use crate::errors::ManifestError;
use mf_merkle::{MerkleProof, OrderedMerkleTree};
use shared_types::{Address, Digest, Route, Selector};

impl Manifest {
    /// Serializes the compact transport view.
    pub fn to_compact(&self) -> Result<Vec<u8>, ManifestError> {
        let version_len = u16::try_from(self.version.len())
            .map_err(|_| ManifestError::SerializationFailed("version too long".to_string()))?;
        let route_count = u32::try_from(self.routes.len())
            .map_err(|_| ManifestError::SerializationFailed("too many routes".to_string()))?;

        let mut out = Vec::with_capacity(2 + self.version.len() + 4 + self.routes.len() * 64 + 32);
        out.extend_from_slice(&version_len.to_be_bytes());
        out.extend_from_slice(self.version.as_bytes());
        out.extend_from_slice(&route_count.to_be_bytes());

        for entry in &self.routes {
            out.extend_from_slice(entry.selector.as_bytes());
            out.extend_from_slice(entry.facet.as_bytes());
            out.extend_from_slice(entry.code_hash.as_bytes());
            out.extend_from_slice(&entry.proof.encode());
        }

        out.extend_from_slice(self.root.as_bytes());
        Ok(out)
    }

    /// Parses the compact transport view.
    pub fn from_compact(bytes: &[u8]) -> Result<Self, ManifestError> {
        let mut offset = 0usize;

        let version_len = usize::from(read_u16(bytes, &mut offset)?);
        let version_bytes = read_slice(bytes, &mut offset, version_len)?;
        let version = String::from_utf8(version_bytes.to_vec())
            .map_err(|e| ManifestError::SerializationFailed(e.to_string()))?;

        let route_count = read_u32(bytes, &mut offset)? as usize;
        // Don't trust the claimed count for allocation; truncated input
        // fails on the first short read.
        let mut routes = Vec::with_capacity(route_count.min(1024));
        for _ in 0..route_count {
            let selector = Selector::from_slice(read_slice(bytes, &mut offset, Selector::LEN)?)
                .ok_or_else(|| malformed("selector"))?;
            let facet = Address::from_slice(read_slice(bytes, &mut offset, Address::LEN)?)
                .ok_or_else(|| malformed("facet"))?;
            let code_hash = Digest::from_slice(read_slice(bytes, &mut offset, Digest::LEN)?)
                .ok_or_else(|| malformed("code_hash"))?;

            let (proof, consumed) = MerkleProof::decode_prefix(&bytes[offset..])
                .map_err(|e| ManifestError::SerializationFailed(e.to_string()))?;
            offset += consumed;

            routes.push(ManifestRoute {
                selector,
                facet,
                code_hash,
                proof,
            });
        }

        let root = Digest::from_slice(read_slice(bytes, &mut offset, Digest::LEN)?)
            .ok_or_else(|| malformed("root"))?;
        if offset != bytes.len() {
            return Err(ManifestError::SerializationFailed(format!(
                "trailing bytes: {}",
                bytes.len() - offset
            )));
        }

        // Normalize: the decoded routes must reproduce the stored root.
        let triples: Vec<Route> = routes.iter().map(ManifestRoute::route).collect();
        let derived = OrderedMerkleTree::from_routes(&triples)
            .map_err(|e| ManifestError::SerializationFailed(e.to_string()))?
            .root();
        if derived != root {
            return Err(ManifestError::SerializationFailed(format!(
                "root mismatch: document claims {root}, routes derive {derived}"
            )));
        }

        Ok(Self {
            version,
            routes,
            root,
        })
    }
}

fn malformed(field: &str) -> ManifestError {
    ManifestError::SerializationFailed(format!("malformed {field} field"))
}

fn read_u16(bytes: &[u8], offset: &mut usize) -> Result<u16, ManifestError> {
    let slice = read_slice(bytes, offset, 2)?;
    Ok(u16::from_be_bytes([slice[0], slice[1]]))
}

fn read_u32(bytes: &[u8], offset: &mut usize) -> Result<u32, ManifestError> {
    let slice = read_slice(bytes, offset, 4)?;
    Ok(u32::from_be_bytes([slice[0], slice[1], slice[2], slice[3]]))
}

fn read_slice<'a>(
    bytes: &'a [u8],
    offset: &mut usize,
    len: usize,
) -> Result<&'a [u8], ManifestError> {
    let end = offset
        .checked_add(len)
        .ok_or_else(|| ManifestError::SerializationFailed("length overflow".to_string()))?;
    if end > bytes.len() {
        return Err(ManifestError::SerializationFailed(format!(
            "truncated at offset {offset}: need {len} more bytes"
        )));
    }
    let slice = &bytes[*offset..end];
    *offset = end;
    Ok(slice)
}

// =============================================================================
// TESTS
// =============================================================================
