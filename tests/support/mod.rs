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
//! # Test support
//!
//! In-memory stand-ins for the two external collaborators (`NameDb`,
//! `PeerSink`) so `ChannelCore` can be exercised without a real database or
//! transport.
//!

use bitcoin_hashes::{sha256d, Hash};
use namenet::{NameBlock, NameHash, NameHeader, NameId, NameNetError, NameDb, PeerId, PeerSink, NameMessage};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

/// An in-memory `NameDb`: accepts everything whose proof-of-work nonce is
/// at or above a configurable target, keyed by a fake, strictly
/// incrementing block height.
pub struct MockNameDb {
    pub target_difficulty: u64,
    trxs: HashMap<NameHash, NameHeader>,
    blocks: HashMap<NameId, NameBlock>,
    head_id: NameId,
    head_num: u32,
}

impl MockNameDb {
    pub fn new(target_difficulty: u64) -> MockNameDb {
        MockNameDb {
            target_difficulty,
            trxs: HashMap::new(),
            blocks: HashMap::new(),
            head_id: sha256d::Hash::hash(b"genesis"),
            head_num: 0,
        }
    }
}

impl NameDb for MockNameDb {
    fn open(_dir: &Path, _create: bool) -> Result<Self, NameNetError> {
        Ok(MockNameDb::new(1))
    }

    fn validate_trx(&mut self, h: &NameHeader) -> Result<(), NameNetError> {
        self.trxs.insert(h.name_hash, h.clone());
        Ok(())
    }

    fn push_block(&mut self, b: &NameBlock) -> Result<(), NameNetError> {
        if b.header.prev_block_id != self.head_id {
            return Err(NameNetError::StaleBlock("parent is not the current head".to_string()));
        }
        for trx in &b.name_trxs {
            self.trxs.insert(trx.name_hash, trx.clone());
        }
        self.head_id = b.id();
        self.head_num += 1;
        self.blocks.insert(b.id(), b.clone());
        Ok(())
    }

    fn fetch_block(&self, id: &NameId) -> Result<NameBlock, NameNetError> {
        self.blocks.get(id).cloned().ok_or_else(|| NameNetError::PersistentStoreFailure("not found".to_string()))
    }

    fn fetch_trx(&self, name_hash: &NameHash) -> Result<NameHeader, NameNetError> {
        self.trxs.get(name_hash).cloned().ok_or_else(|| NameNetError::PersistentStoreFailure("not found".to_string()))
    }

    fn target_difficulty(&self) -> u64 {
        self.target_difficulty
    }

    fn head_block_num(&self) -> u32 {
        self.head_num
    }

    fn head_block_id(&self) -> NameId {
        self.head_id
    }
}

/// A `PeerSink` that records every outbound message instead of sending it
/// anywhere, so tests can assert on what a handler would have written to
/// the wire.
pub struct MockPeerSink {
    pub id: PeerId,
    pub sent: Mutex<Vec<NameMessage>>,
}

impl MockPeerSink {
    pub fn new(id: PeerId) -> MockPeerSink {
        MockPeerSink { id, sent: Mutex::new(Vec::new()) }
    }

    pub fn sent_messages(&self) -> Vec<NameMessage> {
        self.sent.lock().unwrap().clone()
    }
}

impl PeerSink for MockPeerSink {
    fn peer_id(&self) -> PeerId {
        self.id
    }

    fn send(&self, msg: &NameMessage) -> Result<(), NameNetError> {
        self.sent.lock().unwrap().push(msg.clone());
        Ok(())
    }
}
