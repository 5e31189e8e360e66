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
//! # Broadcast manager
//!
//! Generic per-channel inventory cache: for every key ever seen on this
//! channel, tracks whether we merely heard about it, have a request in
//! flight for it, hold its validated content, or have it marked invalid.
//!

use crate::peerview::PeerView;
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// Lifecycle state of a single item inside a `BroadcastManager`.
#[derive(Clone, Debug, PartialEq)]
enum ItemState<V> {
    /// Advertised by a peer, no content held yet.
    Unknown,
    /// An outbound fetch is in flight.
    Requested,
    /// Content present; `bool` is whether it passed validation.
    Held(V, bool),
    /// Content present but validation rejected it.
    Invalid(V),
}

struct Entry<V> {
    state: ItemState<V>,
    /// Set only when the item entered `Held(_, true)`; orders `get_inventory`.
    sequence: Option<u64>,
    /// `invalidate_all` epoch at which this entry was last touched, used by
    /// `clear_old_inventory` to evict stale entries.
    epoch: u64,
}

/// Tracks, for every key seen on one channel, its lifecycle state and
/// whether new validated items have appeared since the last broadcast.
///
/// `K` is the compact handle (e.g. `ShortNameId` or `NameId`); `V` is the
/// full value fetched once the key is known (e.g. `NameHeader`/`NameBlock`).
pub struct BroadcastManager<K, V> {
    entries: HashMap<K, Entry<V>>,
    /// FIFO of keys currently `Unknown`, providing round-robin fairness for
    /// `find_next_query` so no item starves (spec §4.1).
    unknown_order: VecDeque<K>,
    new_since_broadcast: bool,
    next_sequence: u64,
    epoch: u64,
    /// Entries older than this many `invalidate_all` epochs are evicted by
    /// `clear_old_inventory` (spec §4.1: "at least two confirmed-block
    /// epochs").
    retention_epochs: u64,
}

impl<K, V> Default for BroadcastManager<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        BroadcastManager::new()
    }
}

impl<K, V> BroadcastManager<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        BroadcastManager {
            entries: HashMap::new(),
            unknown_order: VecDeque::new(),
            new_since_broadcast: false,
            next_sequence: 0,
            epoch: 0,
            retention_epochs: 2,
        }
    }

    /// Record that a peer advertised `k`, if we have never heard of it.
    /// A no-op for keys already in any other state.
    pub fn received_inventory_notice(&mut self, k: K) {
        if self.entries.contains_key(&k) {
            return;
        }
        self.entries.insert(
            k.clone(),
            Entry { state: ItemState::Unknown, sequence: None, epoch: self.epoch },
        );
        self.unknown_order.push_back(k);
    }

    /// Pick an `Unknown` key with no in-flight request, rotating through
    /// arrival order so the same item is not returned repeatedly without
    /// progress. Returns `false` if there is nothing to query.
    pub fn find_next_query(&mut self, out: &mut K) -> bool
    where
        K: Clone,
    {
        while let Some(candidate) = self.unknown_order.pop_front() {
            match self.entries.get(&candidate) {
                Some(e) if e.state == ItemState::Unknown => {
                    self.unknown_order.push_back(candidate.clone());
                    *out = candidate;
                    return true;
                }
                // entry moved on (e.g. validated through a push rather than
                // a fetch); drop the stale FIFO slot.
                _ => continue,
            }
        }
        false
    }

    /// Transition `k` from `Unknown` to `Requested`. No-op if `k` is not
    /// currently `Unknown` (e.g. already `Held`, per spec §4.1).
    pub fn item_queried(&mut self, k: &K) {
        if let Some(entry) = self.entries.get_mut(k) {
            if entry.state == ItemState::Unknown {
                entry.state = ItemState::Requested;
            }
        }
    }

    /// Record the validation result for `k`'s content. Transitions to
    /// `Held(v, true)` (marking new-since-broadcast) or `Invalid(v)`.
    /// If `k` was unseen, it is created in place (a pushed, unsolicited
    /// value is as valid an entry point as an inventory notice).
    pub fn validated(&mut self, k: K, v: V, ok: bool) {
        let epoch = self.epoch;
        let sequence = if ok {
            let seq = self.next_sequence;
            self.next_sequence += 1;
            Some(seq)
        } else {
            None
        };
        let state = if ok { ItemState::Held(v, true) } else { ItemState::Invalid(v) };
        self.entries.insert(k, Entry { state, sequence, epoch });
        if ok {
            self.new_since_broadcast = true;
        }
    }

    /// The held value for `k`, iff its state is `Held(_, true)`.
    pub fn get_value(&self, k: &K) -> Option<&V> {
        match self.entries.get(k) {
            Some(Entry { state: ItemState::Held(v, true), .. }) => Some(v),
            _ => None,
        }
    }

    pub fn has_new_since_broadcast(&self) -> bool {
        self.new_since_broadcast
    }

    pub fn set_new_since_broadcast(&mut self, v: bool) {
        self.new_since_broadcast = v;
    }

    /// Keys whose content is held and validated, that `peer_view` does not
    /// already know, in the order they were validated.
    pub fn get_inventory(&self, peer_view: &PeerView<K>) -> Vec<K> {
        let mut held: Vec<(u64, K)> = self
            .entries
            .iter()
            .filter_map(|(k, e)| match &e.state {
                ItemState::Held(_, true) if !peer_view.knows(k) => {
                    e.sequence.map(|seq| (seq, k.clone()))
                }
                _ => None,
            })
            .collect();
        held.sort_by_key(|(seq, _)| *seq);
        held.into_iter().map(|(_, k)| k).collect()
    }

    /// All currently held-and-validated values, in no particular order.
    pub fn get_inventory_values(&self) -> Vec<&V> {
        self.entries
            .values()
            .filter_map(|e| match &e.state {
                ItemState::Held(v, true) => Some(v),
                _ => None,
            })
            .collect()
    }

    /// Purge every non-`Invalid` entry. Called when a block confirms and
    /// retires all now-obsolete pending transactions; bumps the epoch
    /// counter `clear_old_inventory` measures retention against.
    pub fn invalidate_all(&mut self) {
        self.entries.retain(|_, e| matches!(e.state, ItemState::Invalid(_)));
        self.unknown_order.clear();
        self.epoch += 1;
    }

    /// Evict entries older than the retention horizon (default two
    /// `invalidate_all` epochs).
    pub fn clear_old_inventory(&mut self) {
        let epoch = self.epoch;
        let horizon = self.retention_epochs;
        let unknown_order = &mut self.unknown_order;
        self.entries.retain(|k, e| {
            let keep = epoch.saturating_sub(e.epoch) < horizon;
            if !keep {
                unknown_order.retain(|u| u != k);
            }
            keep
        });
    }
}
