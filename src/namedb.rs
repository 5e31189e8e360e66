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
//! # Name database interface
//!
//! The persistent store is an external collaborator (spec §1): this trait
//! is the entire surface `ChannelCore` depends on. A concrete on-disk
//! implementation is out of scope for this crate.
//!

use crate::error::NameNetError;
use crate::types::{NameBlock, NameHash, NameHeader, NameId};
use std::path::Path;

/// Persistent store for confirmed names and blocks.
pub trait NameDb: Send {
    /// Open (or, if `create`, initialize) the store rooted at `dir`.
    ///
    /// `where Self: Sized` keeps this out of the trait's vtable so `NameDb`
    /// stays usable as `Box<dyn NameDb>` elsewhere; callers construct a
    /// concrete implementation with this and hand the trait object to
    /// `ChannelCore::new`.
    fn open(dir: &Path, create: bool) -> Result<Self, NameNetError>
    where
        Self: Sized;

    /// Validate (and, on success, durably record as pending) a name
    /// transaction. Errors if the transaction is malformed, its proof of
    /// work is insufficient, or it conflicts with a more recent
    /// registration already on file.
    fn validate_trx(&mut self, h: &NameHeader) -> Result<(), NameNetError>;

    /// Validate and integrate a full block, advancing the confirmed chain.
    /// Errors on bad proof of work, an unknown parent, or a stale/shorter
    /// chain than the one already stored.
    fn push_block(&mut self, b: &NameBlock) -> Result<(), NameNetError>;

    /// Fetch a previously confirmed block by id.
    fn fetch_block(&self, id: &NameId) -> Result<NameBlock, NameNetError>;

    /// Fetch the most recent confirmed transaction for a name's hash.
    fn fetch_trx(&self, name_hash: &NameHash) -> Result<NameHeader, NameNetError>;

    /// Current minimum proof-of-work score for a submission to count as a
    /// block rather than a lone name transaction (spec §4.7).
    fn target_difficulty(&self) -> u64;

    /// Height of the current chain tip.
    fn head_block_num(&self) -> u32;

    /// Id of the current chain tip.
    fn head_block_id(&self) -> NameId;

    /// Debug dump of store contents; a no-op for most implementations.
    fn dump(&self) {}
}
