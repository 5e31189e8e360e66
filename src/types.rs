//
// Copyright 2024 The namenet Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
//!
//! # Name chain data model
//!
//! `NameHeader`, `NameBlock` and `NameBlockIndex` are the three wire-visible
//! records this engine gossips and reassembles. Hashing and proof-of-work
//! scoring themselves are external concerns (see crate docs); this module
//! only fixes the byte layout hashed and the 64-bit truncation used as a
//! short id.
//!

use bitcoin_hashes::{sha256d, Hash as HashesHash};
use byteorder::{BigEndian, ByteOrder, WriteBytesExt};
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// Full hash of a name transaction or block.
pub type NameHash = sha256d::Hash;
/// Full hash identifying a block, same representation as `NameHash`.
pub type NameId = sha256d::Hash;
/// 64-bit truncation of a `NameHash`, used as a compact handle inside a
/// block index and as the key of the transaction broadcast manager.
pub type ShortNameId = u64;

/// Opaque compressed ECC public key. Cryptographic verification lives
/// outside this crate; we only ever compare these bytes for equality
/// against the all-zero "revoked" convention.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PubKeyBytes(pub [u8; 33]);

impl PubKeyBytes {
    /// The sentinel public key meaning "this name has been revoked".
    pub const ZERO: PubKeyBytes = PubKeyBytes([0u8; 33]);

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 33]
    }
}

impl fmt::Debug for PubKeyBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PubKeyBytes({})", hex::encode(self.0))
    }
}

fn truncate_to_short_id(hash: &NameHash) -> ShortNameId {
    BigEndian::read_u64(&hash.as_ref()[0..8])
}

/// Hash a human-readable name the same way a `NameHeader` binding it would,
/// so callers can go from `name` to `NameHash` without hashing it themselves
/// (spec §6 `lookup_name(name)`).
pub fn hash_name(name: &str) -> NameHash {
    sha256d::Hash::hash(name.as_bytes())
}

/// A signed, proof-of-worked record binding a hashed name to a public key
/// at a point in time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NameHeader {
    /// Hash of the human-readable name this transaction registers.
    pub name_hash: NameHash,
    /// The public key the name is being bound to (or `PubKeyBytes::ZERO`
    /// to revoke it).
    pub pub_key: PubKeyBytes,
    /// UTC seconds at which this transaction was minted.
    pub utc_sec: u32,
    /// Monotonic age counter carried forward from the previous registration
    /// of the same name, if any.
    pub age: u32,
    /// Accumulated reputation points.
    pub repute_points: u32,
    /// Proof-of-work nonce.
    pub pow_nonce: u64,
}

impl NameHeader {
    fn hash_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(32 + 33 + 4 + 4 + 4 + 8);
        buf.extend_from_slice(&self.name_hash.as_ref()[..]);
        buf.extend_from_slice(&self.pub_key.0);
        buf.write_u32::<BigEndian>(self.utc_sec).unwrap();
        buf.write_u32::<BigEndian>(self.age).unwrap();
        buf.write_u32::<BigEndian>(self.repute_points).unwrap();
        buf.write_u64::<BigEndian>(self.pow_nonce).unwrap();
        buf
    }

    /// Full content hash of this transaction.
    pub fn full_id(&self) -> NameHash {
        sha256d::Hash::hash(&self.hash_bytes())
    }

    /// 64-bit truncation of `full_id()`, used as the compact handle this
    /// transaction is referenced by inside a block index and the
    /// transaction broadcast manager.
    pub fn short_id(&self) -> ShortNameId {
        truncate_to_short_id(&self.full_id())
    }
}

/// Header shared by `NameBlock` and `NameBlockIndex`.
///
/// Miners publish a single proof-of-worked artifact (`artifact`, itself a
/// `NameHeader`-shaped record) alongside the id of the block it extends.
/// Whether that artifact confirms a full block or merely seeds a new
/// pending name transaction depends only on whether `artifact.pow_nonce`
/// crosses `NameDb::target_difficulty()` (spec §4.7) — this header shape is
/// what lets the same artifact be read either way.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NameBlockHeader {
    /// Id of the previous block in the chain.
    pub prev_block_id: NameId,
    /// The proof-of-worked artifact. Its `pow_nonce` is the block's
    /// aggregate difficulty score; below target it is instead submitted as
    /// a lone name transaction.
    pub artifact: NameHeader,
}

impl NameBlockHeader {
    pub fn id(&self) -> NameId {
        let mut buf = Vec::with_capacity(32 + 32);
        buf.extend_from_slice(&self.prev_block_id.as_ref()[..]);
        buf.extend_from_slice(&self.artifact.full_id().as_ref()[..]);
        sha256d::Hash::hash(&buf)
    }
}

/// Ordered sequence of name transactions plus a block header.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NameBlock {
    pub header: NameBlockHeader,
    pub name_trxs: Vec<NameHeader>,
}

impl NameBlock {
    pub fn id(&self) -> NameId {
        self.header.id()
    }

    /// The block's aggregate proof-of-work score. Real difficulty scoring
    /// of a proof-of-work nonce is a cryptographic concern external to this
    /// crate (spec §1); `pow_nonce` stands in for whatever that scoring
    /// function would return.
    pub fn difficulty(&self) -> u64 {
        self.header.artifact.pow_nonce
    }
}

/// Compact block announcement: a block header plus the ordered short ids
/// of its constituent transactions, sent in lieu of the full block to
/// exploit the receiver's transaction cache.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NameBlockIndex {
    pub header: NameBlockHeader,
    pub name_trxs: Vec<ShortNameId>,
}

impl NameBlockIndex {
    pub fn id(&self) -> NameId {
        self.header.id()
    }
}

/// A confirmed name's current state, as exposed by `lookup_name`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NameRecord {
    /// UTC seconds of the most recent registering transaction.
    pub last_update: u32,
    pub pub_key: PubKeyBytes,
    pub age: u32,
    pub repute: u32,
    /// True iff `pub_key` is the all-zero sentinel key.
    pub revoked: bool,
    /// Hex encoding of the name's hash.
    pub name_hash: String,
    pub name: String,
}

impl NameRecord {
    /// Build a record from a confirmed transaction, as `lookup_name` does.
    pub fn from_trx(name: &str, trx: &NameHeader) -> NameRecord {
        NameRecord {
            last_update: trx.utc_sec,
            pub_key: trx.pub_key,
            age: trx.age,
            repute: trx.repute_points,
            revoked: trx.pub_key.is_zero(),
            name_hash: hex::encode(&trx.name_hash.as_ref()[..]),
            name: name.to_string(),
        }
    }
}
