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
//! # Errors
//!

use std::fmt;

/// Errors surfaced by the gossip/sync engine.
///
/// Every variant carries a short context string so public-API failures are
/// structured and explain where they came from, without pulling in an
/// error-handling crate the rest of the stack does not use.
#[derive(Clone, Debug)]
pub enum NameNetError {
    /// A name transaction failed `NameDb::validate_trx`.
    InvalidTransaction(String),
    /// A block failed `NameDb::push_block` for reasons other than staleness.
    InvalidBlock(String),
    /// A block was rejected because a better chain already superseded it.
    StaleBlock(String),
    /// A block index referenced the same short id twice.
    DuplicateShortId(String),
    /// `get_name_header` targeted an id absent from the broadcast cache.
    UnknownNameInBroadcastCache(String),
    /// Sending to a peer failed.
    TransportFailure(String),
    /// The persistent name database returned an error.
    PersistentStoreFailure(String),
    /// The fetch loop or channel was cancelled mid-operation.
    Cancelled,
}

impl fmt::Display for NameNetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameNetError::InvalidTransaction(ctx) => write!(f, "invalid name transaction: {}", ctx),
            NameNetError::InvalidBlock(ctx) => write!(f, "invalid block: {}", ctx),
            NameNetError::StaleBlock(ctx) => write!(f, "stale block: {}", ctx),
            NameNetError::DuplicateShortId(ctx) => write!(f, "duplicate short id in block index: {}", ctx),
            NameNetError::UnknownNameInBroadcastCache(ctx) => {
                write!(f, "name transaction not in broadcast cache: {}", ctx)
            }
            NameNetError::TransportFailure(ctx) => write!(f, "transport failure: {}", ctx),
            NameNetError::PersistentStoreFailure(ctx) => write!(f, "name database failure: {}", ctx),
            NameNetError::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::error::Error for NameNetError {}

impl NameNetError {
    /// True for a `NameDb` failure that represents "record not found", the
    /// only store error `lookup_name` is specified to swallow (spec §7).
    pub fn is_not_found(&self) -> bool {
        matches!(self, NameNetError::PersistentStoreFailure(ctx) if ctx == "not found")
    }
}
