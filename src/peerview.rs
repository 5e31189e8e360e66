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
//! # Peer view
//!
//! Per-connection projection of a `BroadcastManager`: what a given peer is
//! known (or told) to already possess, and whether we currently have an
//! outbound request pending towards them for this stream.
//!

use std::collections::HashSet;
use std::hash::Hash;

/// One connection's inventory bookkeeping for one broadcast stream (either
/// transactions or block indices).
#[derive(Default)]
pub struct PeerView<K> {
    known: HashSet<K>,
    pending_request: bool,
}

impl<K> PeerView<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        PeerView { known: HashSet::new(), pending_request: false }
    }

    pub fn knows(&self, k: &K) -> bool {
        self.known.contains(k)
    }

    /// Record that the peer now knows every key in `ks`, e.g. because we
    /// just sent them (or they just sent us) an inventory message naming
    /// them.
    pub fn update_known(&mut self, ks: impl IntoIterator<Item = K>) {
        self.known.extend(ks);
    }

    pub fn has_pending_request(&self) -> bool {
        self.pending_request
    }

    /// Mark that we have asked this peer for `k`. Also folds `k` into
    /// `known`, since a peer we are asking for content must have advertised
    /// (or be assumed to have) it.
    pub fn requested(&mut self, k: K) {
        self.pending_request = true;
        self.known.insert(k);
    }

    /// The peer answered (or otherwise resolved) our outstanding request.
    pub fn received_response(&mut self, k: K) {
        self.pending_request = false;
        self.known.insert(k);
    }
}
