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
//! # Block reassembler
//!
//! Reconstitutes a full `NameBlock` from a `NameBlockIndex` and a stream of
//! arriving `NameHeader`s, for the short ids the local transaction cache
//! did not already hold.
//!

use crate::types::{NameBlock, NameBlockIndex, NameHeader, ShortNameId};
use bitcoin_hashes::{sha256d, Hash};
use std::collections::HashMap;

/// One in-flight block reconstruction.
pub struct BlockReassembler {
    /// Partial block; unfilled transaction slots are left as a placeholder
    /// and only ever read once `unknown` is empty.
    incomplete: NameBlock,
    index: NameBlockIndex,
    /// short id -> slot index, for slots not yet filled.
    unknown: HashMap<ShortNameId, usize>,
}

impl BlockReassembler {
    /// Begin reassembling `index`. `lookup` is consulted for each
    /// referenced short id; ids it resolves are placed immediately, ids it
    /// does not are recorded as missing. Returns `Err` if `index` names the
    /// same short id twice (spec §4.8: malformed).
    pub fn start(
        index: NameBlockIndex,
        mut lookup: impl FnMut(ShortNameId) -> Option<NameHeader>,
    ) -> Result<BlockReassembler, ShortNameId> {
        let placeholder = NameHeader {
            name_hash: sha256d::Hash::hash(&[]),
            pub_key: crate::types::PubKeyBytes::ZERO,
            utc_sec: 0,
            age: 0,
            repute_points: 0,
            pow_nonce: 0,
        };
        let mut slots = vec![placeholder; index.name_trxs.len()];
        let mut unknown = HashMap::new();
        let mut seen = std::collections::HashSet::new();
        for (i, short_id) in index.name_trxs.iter().enumerate() {
            if !seen.insert(*short_id) {
                return Err(*short_id);
            }
            match lookup(*short_id) {
                Some(header) => slots[i] = header,
                None => {
                    unknown.insert(*short_id, i);
                }
            }
        }
        let incomplete = NameBlock { header: index.header.clone(), name_trxs: slots };
        Ok(BlockReassembler { incomplete, index, unknown })
    }

    /// True once every referenced transaction has been filled in; the
    /// block is ready to submit.
    pub fn is_complete(&self) -> bool {
        self.unknown.is_empty()
    }

    /// If `header.short_id()` is one of this reassembler's missing slots,
    /// fill it and return whether the block is now complete. Otherwise a
    /// no-op returning `false`.
    pub fn try_accept(&mut self, header: &NameHeader) -> bool {
        let short_id = header.short_id();
        if let Some(slot) = self.unknown.remove(&short_id) {
            self.incomplete.name_trxs[slot] = header.clone();
        }
        self.unknown.is_empty()
    }

    /// Short ids still awaited.
    pub fn missing(&self) -> impl Iterator<Item = &ShortNameId> {
        self.unknown.keys()
    }

    /// Consume this reassembler once complete, yielding the finished block.
    pub fn into_block(self) -> NameBlock {
        debug_assert!(self.unknown.is_empty());
        self.incomplete
    }

    /// The index this reassembler is working from, e.g. for logging.
    pub fn index(&self) -> &NameBlockIndex {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NameBlockHeader, PubKeyBytes};
    use bitcoin_hashes::{sha256d, Hash};

    fn header(nonce: u64) -> NameHeader {
        NameHeader {
            name_hash: sha256d::Hash::hash(format!("name{}", nonce).as_bytes()),
            pub_key: PubKeyBytes([1u8; 33]),
            utc_sec: 1,
            age: 0,
            repute_points: 0,
            pow_nonce: nonce,
        }
    }

    fn index_for(headers: &[NameHeader]) -> NameBlockIndex {
        NameBlockIndex {
            header: NameBlockHeader { prev_block_id: sha256d::Hash::hash(b"genesis"), artifact: header(999) },
            name_trxs: headers.iter().map(|h| h.short_id()).collect(),
        }
    }

    #[test]
    fn immediately_complete_when_all_known() {
        let h1 = header(1);
        let h2 = header(2);
        let index = index_for(&[h1.clone(), h2.clone()]);
        let known = vec![h1.clone(), h2.clone()];
        let reassembler = BlockReassembler::start(index, |sid| {
            known.iter().find(|h| h.short_id() == sid).cloned()
        })
        .unwrap();
        assert!(reassembler.is_complete());
    }

    #[test]
    fn fills_missing_slots_out_of_order() {
        let h1 = header(1);
        let h2 = header(2);
        let h3 = header(3);
        let index = index_for(&[h1.clone(), h2.clone(), h3.clone()]);
        // only h1 known locally
        let mut reassembler = BlockReassembler::start(index, |sid| {
            if sid == h1.short_id() { Some(h1.clone()) } else { None }
        })
        .unwrap();
        assert!(!reassembler.is_complete());
        assert_eq!(reassembler.missing().count(), 2);

        // h3 arrives first, out of order
        assert!(!reassembler.try_accept(&h3));
        assert!(reassembler.try_accept(&h2));
        assert!(reassembler.is_complete());

        let block = reassembler.into_block();
        assert_eq!(block.name_trxs[0].short_id(), h1.short_id());
        assert_eq!(block.name_trxs[1].short_id(), h2.short_id());
        assert_eq!(block.name_trxs[2].short_id(), h3.short_id());
    }

    #[test]
    fn unrelated_header_is_ignored() {
        let h1 = header(1);
        let h2 = header(2);
        let index = index_for(&[h1.clone()]);
        let mut reassembler = BlockReassembler::start(index, |_| None).unwrap();
        assert!(!reassembler.try_accept(&h2));
        assert!(!reassembler.is_complete());
    }

    #[test]
    fn duplicate_short_id_in_index_is_rejected() {
        let h1 = header(1);
        let index = NameBlockIndex {
            header: NameBlockHeader { prev_block_id: sha256d::Hash::hash(b"genesis"), artifact: header(999) },
            name_trxs: vec![h1.short_id(), h1.short_id()],
        };
        let result = BlockReassembler::start(index, |_| None);
        assert_eq!(result.unwrap_err(), h1.short_id());
    }
}
