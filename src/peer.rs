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
//! # Peer transport boundary
//!
//! The actual connection/transport object is an external collaborator
//! (spec §1); this crate only needs an identity to key per-peer state by,
//! and a way to hand it an outbound message.
//!

use crate::error::NameNetError;
use crate::message::NameMessage;

/// Opaque identity of a connected peer, assigned by the transport layer.
pub type PeerId = u64;

/// What the gossip engine needs from a connection: an id to key state by,
/// and a send primitive. Framing, encryption and the socket itself live
/// entirely on the other side of this trait.
pub trait PeerSink: Send + Sync {
    fn peer_id(&self) -> PeerId;
    fn send(&self, msg: &NameMessage) -> Result<(), NameNetError>;
}
