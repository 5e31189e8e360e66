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
//! # Message dispatcher
//!
//! Routes an inbound `NameMessage` from a given peer to the matching
//! `ChannelCore` handler (spec §4.5). Kept separate from `ChannelCore`
//! itself so the routing table reads as a flat match rather than being
//! interleaved with the handlers' own logic.
//!

use crate::channel::ChannelCore;
use crate::error::NameNetError;
use crate::message::NameMessage;
use crate::peer::PeerId;

/// Dispatches inbound wire messages against a shared `ChannelCore`.
pub struct MessageDispatcher;

impl MessageDispatcher {
    /// Route one inbound message. Most malformed or rejected payloads are
    /// logged and swallowed, mirroring the original's per-message "log and
    /// move on" handling so a single bad message never tears down the
    /// connection - except `name_header`, where spec §4.5 requires a failed
    /// `submit_name` to be surfaced to the caller after logging, not
    /// swallowed like the other eight arms.
    pub fn dispatch(core: &mut ChannelCore, peer: PeerId, msg: NameMessage) -> Result<(), NameNetError> {
        log::debug!("peer={} recv {}", peer, msg.kind());
        match msg {
            NameMessage::NameInv(ids) => {
                core.handle_name_inv(peer, ids);
                Ok(())
            }
            NameMessage::BlockInv(ids) => {
                core.handle_block_inv(peer, ids);
                Ok(())
            }
            NameMessage::GetNameInv => core.handle_get_name_inv(peer),
            NameMessage::GetHeaders(range) => {
                core.handle_get_headers(peer, range);
                Ok(())
            }
            NameMessage::GetBlock(id) => {
                if let Err(e) = core.handle_get_block(peer, id) {
                    log::debug!("peer={} get_block {} failed: {}", peer, id, e);
                }
                Ok(())
            }
            NameMessage::GetNameHeader(id) => {
                if let Err(e) = core.handle_get_name_header(peer, id) {
                    log::debug!("peer={} get_name_header {} failed: {}", peer, id, e);
                }
                Ok(())
            }
            NameMessage::NameHeader(trx) => core.handle_name_header(peer, trx).map_err(|e| {
                log::debug!("peer={} name_header rejected: {}", peer, e);
                e
            }),
            NameMessage::Block(block) => {
                if let Err(e) = core.handle_block(peer, block) {
                    log::warn!("peer={} block rejected: {}", peer, e);
                }
                Ok(())
            }
            NameMessage::Headers(headers) => {
                core.handle_headers(peer, headers);
                Ok(())
            }
        }
    }
}
