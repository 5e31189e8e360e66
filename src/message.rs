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
//! # Wire messages
//!
//! The nine message kinds exchanged on this channel (spec §6). Framing and
//! the numeric tag that precedes one of these on the wire are the
//! transport's concern; this crate only defines the payload shapes and a
//! `kind()` accessor used for logging.
//!

use crate::types::{NameBlock, NameHeader, NameId, ShortNameId};
use serde_derive::{Deserialize, Serialize};

/// A range specification for the (reserved) `get_headers` exchange.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeaderRange {
    pub from_block_num: u32,
    pub count: u32,
}

/// One of the nine message kinds carried on the name channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum NameMessage {
    /// Advertise transactions we hold.
    NameInv(Vec<ShortNameId>),
    /// Advertise blocks we hold.
    BlockInv(Vec<NameId>),
    /// Ask the peer for their full transaction inventory.
    GetNameInv,
    /// Reserved: ask for a range of block headers.
    GetHeaders(HeaderRange),
    /// Ask for a full block by id.
    GetBlock(NameId),
    /// Ask for a single transaction by short id.
    GetNameHeader(ShortNameId),
    /// A transaction body, solicited or pushed.
    NameHeader(NameHeader),
    /// A full block.
    Block(NameBlock),
    /// Reserved: a batch of headers.
    Headers(Vec<NameHeader>),
}

impl NameMessage {
    /// Short tag for logging, mirroring the message-type names in spec §6.
    pub fn kind(&self) -> &'static str {
        match self {
            NameMessage::NameInv(_) => "name_inv",
            NameMessage::BlockInv(_) => "block_inv",
            NameMessage::GetNameInv => "get_name_inv",
            NameMessage::GetHeaders(_) => "get_headers",
            NameMessage::GetBlock(_) => "get_block",
            NameMessage::GetNameHeader(_) => "get_name_header",
            NameMessage::NameHeader(_) => "name_header",
            NameMessage::Block(_) => "block",
            NameMessage::Headers(_) => "headers",
        }
    }
}
