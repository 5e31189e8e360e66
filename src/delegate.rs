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
//! # Delegate
//!
//! A single optional observer the host may register to be notified of
//! newly pending transactions and newly confirmed blocks. Defaulted no-op
//! methods stand in for the nullable raw callback pointer of the original
//! implementation (Design Notes §9).
//!

use crate::types::{NameBlock, NameHeader};

/// Host-supplied observer of channel events.
pub trait NameChannelDelegate: Send + Sync {
    /// A name transaction passed validation and is now pending.
    fn pending_name_trx(&self, _trx: &NameHeader) {}

    /// A block was validated and appended to the confirmed chain.
    fn name_block_added(&self, _block: &NameBlock) {}
}
