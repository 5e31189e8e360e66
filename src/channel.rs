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
//! # Channel core
//!
//! `ChannelCore` owns the two broadcast managers, the in-flight block
//! reassemblers, the per-peer views, the `NameDb` handle and the optional
//! delegate, and exposes the public API described in spec §6. It is the
//! only place that mutates that state; the dispatcher and fetch loop both
//! call into it while holding the same lock (see `NameChannel`).
//!

use crate::broadcast::BroadcastManager;
use crate::delegate::NameChannelDelegate;
use crate::error::NameNetError;
use crate::message::{HeaderRange, NameMessage};
use crate::namedb::NameDb;
use crate::peer::{PeerId, PeerSink};
use crate::peerview::PeerView;
use crate::reassembler::BlockReassembler;
use crate::types::{NameBlock, NameBlockIndex, NameHeader, NameId, NameRecord, ShortNameId};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Where the name database lives. Opening/creating the database itself is
/// the caller's responsibility (the `NameDb` implementation is injected
/// already open); this is recorded for diagnostics and parity with the
/// original `configure(cfg)` entry point (spec §6).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameChannelConfig {
    pub name_db_dir: PathBuf,
}

struct ConnState {
    sink: Arc<dyn PeerSink>,
    trx_view: PeerView<ShortNameId>,
    block_view: PeerView<NameId>,
}

/// Owns every piece of mutable channel state (spec §3 "Ownership").
pub struct ChannelCore {
    name_db: Box<dyn NameDb>,
    trx_mgr: BroadcastManager<ShortNameId, NameHeader>,
    block_mgr: BroadcastManager<NameId, NameBlock>,
    reassemblers: Vec<BlockReassembler>,
    connections: HashMap<PeerId, ConnState>,
    delegate: Option<Arc<dyn NameChannelDelegate>>,
    config: Option<NameChannelConfig>,
}

impl ChannelCore {
    pub fn new(name_db: Box<dyn NameDb>) -> ChannelCore {
        ChannelCore {
            name_db,
            trx_mgr: BroadcastManager::new(),
            block_mgr: BroadcastManager::new(),
            reassemblers: Vec::new(),
            connections: HashMap::new(),
            delegate: None,
            config: None,
        }
    }

    pub fn configure(&mut self, cfg: NameChannelConfig) {
        log::info!("configured name database dir={}", cfg.name_db_dir.display());
        self.config = Some(cfg);
    }

    pub fn set_delegate(&mut self, delegate: Option<Arc<dyn NameChannelDelegate>>) {
        self.delegate = delegate;
    }

    /// Register a newly connected peer's sink, creating fresh empty views
    /// for both broadcast streams (spec §3 "Connection (external)").
    pub fn add_connection(&mut self, sink: Arc<dyn PeerSink>) {
        let peer_id = sink.peer_id();
        self.connections.insert(
            peer_id,
            ConnState { sink, trx_view: PeerView::new(), block_view: PeerView::new() },
        );
    }

    pub fn remove_connection(&mut self, peer_id: PeerId) {
        self.connections.remove(&peer_id);
    }

    // ---- 4.3 broadcast_inv -------------------------------------------------

    /// Send any inventory validated since the last broadcast to every
    /// connection that does not yet know it, for both streams
    /// independently (spec §4.3).
    pub fn broadcast_inv(&mut self) {
        let ChannelCore { trx_mgr, connections, .. } = self;
        if trx_mgr.has_new_since_broadcast() {
            for conn in connections.values_mut() {
                let inv = trx_mgr.get_inventory(&conn.trx_view);
                if !inv.is_empty() {
                    if let Err(e) = conn.sink.send(&NameMessage::NameInv(inv.clone())) {
                        log::warn!("send name_inv to peer={} failed: {}", conn.sink.peer_id(), e);
                    }
                }
                conn.trx_view.update_known(inv);
            }
            trx_mgr.set_new_since_broadcast(false);
        }

        let ChannelCore { block_mgr, connections, .. } = self;
        if block_mgr.has_new_since_broadcast() {
            for conn in connections.values_mut() {
                let inv = block_mgr.get_inventory(&conn.block_view);
                if !inv.is_empty() {
                    if let Err(e) = conn.sink.send(&NameMessage::BlockInv(inv.clone())) {
                        log::warn!("send block_inv to peer={} failed: {}", conn.sink.peer_id(), e);
                    }
                }
                conn.block_view.update_known(inv);
            }
            block_mgr.set_new_since_broadcast(false);
        }
    }

    // ---- 4.2 / 4.4 fetch loop support --------------------------------------

    /// Find an unsolicited transaction to fetch next, for the fetch loop.
    pub fn find_next_trx_query(&mut self, out: &mut ShortNameId) -> bool {
        self.trx_mgr.find_next_query(out)
    }

    pub fn mark_trx_queried(&mut self, id: &ShortNameId) {
        self.trx_mgr.item_queried(id);
    }

    /// Send `get_name_header(id)` to the first connection that does not
    /// already know it and has no outstanding request, per spec §4.4. A
    /// silent no-op if no connection qualifies; the item stays `Unknown`
    /// and is retried on the next fetch loop iteration.
    pub fn fetch_from_best_connection(&mut self, id: ShortNameId) {
        for conn in self.connections.values_mut() {
            if !conn.trx_view.knows(&id) && !conn.trx_view.has_pending_request() {
                conn.trx_view.requested(id);
                if let Err(e) = conn.sink.send(&NameMessage::GetNameHeader(id)) {
                    log::warn!("fetch name_header {} from peer={} failed: {}", id, conn.sink.peer_id(), e);
                }
                return;
            }
        }
    }

    // ---- 4.5 message handling -----------------------------------------------

    pub fn handle_name_inv(&mut self, peer: PeerId, ids: Vec<ShortNameId>) {
        for id in &ids {
            self.trx_mgr.received_inventory_notice(*id);
        }
        if let Some(conn) = self.connections.get_mut(&peer) {
            conn.trx_view.update_known(ids);
        }
    }

    pub fn handle_block_inv(&mut self, peer: PeerId, ids: Vec<NameId>) {
        for id in &ids {
            self.block_mgr.received_inventory_notice(*id);
        }
        if let Some(conn) = self.connections.get_mut(&peer) {
            conn.block_view.update_known(ids);
        }
    }

    pub fn handle_get_name_inv(&mut self, peer: PeerId) -> Result<(), NameNetError> {
        let ChannelCore { trx_mgr, connections, .. } = self;
        let conn = connections
            .get_mut(&peer)
            .ok_or_else(|| NameNetError::TransportFailure(format!("unknown peer {}", peer)))?;
        let inv = trx_mgr.get_inventory(&conn.trx_view);
        conn.trx_view.update_known(inv.clone());
        conn.sink.send(&NameMessage::NameInv(inv))
    }

    /// Reserved: headers range lookup is not implemented (spec §4.5).
    pub fn handle_get_headers(&self, _peer: PeerId, _range: HeaderRange) {}

    pub fn handle_get_block(&mut self, peer: PeerId, id: NameId) -> Result<(), NameNetError> {
        let block = self.name_db.fetch_block(&id)?;
        let conn = self
            .connections
            .get(&peer)
            .ok_or_else(|| NameNetError::TransportFailure(format!("unknown peer {}", peer)))?;
        conn.sink.send(&NameMessage::Block(block))
    }

    /// Individual transactions are only served out of the live broadcast
    /// cache, never out of the confirmed database (spec §4.5: avoids a
    /// large secondary index).
    pub fn handle_get_name_header(&self, peer: PeerId, id: ShortNameId) -> Result<(), NameNetError> {
        let trx = self
            .trx_mgr
            .get_value(&id)
            .ok_or_else(|| NameNetError::UnknownNameInBroadcastCache(id.to_string()))?;
        let conn = self
            .connections
            .get(&peer)
            .ok_or_else(|| NameNetError::TransportFailure(format!("unknown peer {}", peer)))?;
        conn.sink.send(&NameMessage::NameHeader(trx.clone()))
    }

    pub fn handle_name_header(&mut self, peer: PeerId, trx: NameHeader) -> Result<(), NameNetError> {
        let short_id = trx.short_id();
        if let Some(conn) = self.connections.get_mut(&peer) {
            conn.trx_view.received_response(short_id);
        }
        // feed reassemblers before validating, so a block can complete even
        // if this transaction later fails its own standalone validation
        // (spec §4.5/§4.8).
        self.update_block_reassemblers(&trx);
        match self.submit_name(trx.clone()) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.trx_mgr.validated(short_id, trx, false);
                Err(e)
            }
        }
    }

    /// `block` messages push straight to the database; they do not run the
    /// full `submit_block` flow (spec §4.5 keeps this distinct from §4.6 -
    /// the broadcast managers are only touched when a block is produced by
    /// reassembly or by the public `submit_block` entry point).
    pub fn handle_block(&mut self, _peer: PeerId, block: NameBlock) -> Result<(), NameNetError> {
        self.name_db.push_block(&block)
    }

    /// Reserved, no-op (spec §4.5).
    pub fn handle_headers(&self, _peer: PeerId, _headers: Vec<NameHeader>) {}

    // ---- 4.6 submit_name / submit_block -------------------------------------

    fn submit_name(&mut self, h: NameHeader) -> Result<(), NameNetError> {
        self.name_db.validate_trx(&h)?;
        self.trx_mgr.validated(h.short_id(), h.clone(), true);
        if let Some(d) = &self.delegate {
            d.pending_name_trx(&h);
        }
        Ok(())
    }

    fn submit_block_internal(&mut self, b: NameBlock) -> Result<(), NameNetError> {
        self.name_db.push_block(&b)?;
        self.trx_mgr.invalidate_all();
        self.block_mgr.clear_old_inventory();
        self.trx_mgr.clear_old_inventory();
        self.block_mgr.validated(b.id(), b.clone(), true);
        self.name_db.dump();
        if let Some(d) = &self.delegate {
            d.name_block_added(&b);
        }
        Ok(())
    }

    // ---- 4.8 block reconstruction -------------------------------------------

    /// Entry point for a future `get_block_index`/`block_index` exchange
    /// (reserved on the wire, spec §4.8): given an announced index, resolve
    /// what is already held locally, submit immediately if nothing is
    /// missing, or start a reassembler and fetch the rest.
    pub fn admit_block_index(&mut self, index: NameBlockIndex) -> Result<(), NameNetError> {
        let trx_mgr = &self.trx_mgr;
        let reassembler = BlockReassembler::start(index, |short_id| trx_mgr.get_value(&short_id).cloned())
            .map_err(|dup| NameNetError::DuplicateShortId(dup.to_string()))?;

        if reassembler.is_complete() {
            return self.submit_block_internal(reassembler.into_block());
        }

        let missing: Vec<ShortNameId> = reassembler.missing().cloned().collect();
        self.reassemblers.push(reassembler);
        for short_id in missing {
            self.trx_mgr.received_inventory_notice(short_id);
        }
        Ok(())
    }

    /// Feed an arriving transaction to every in-flight reassembler; any
    /// that become complete are submitted and removed. Safe against
    /// mid-iteration removal (spec §4.8).
    fn update_block_reassemblers(&mut self, trx: &NameHeader) {
        let mut i = 0;
        while i < self.reassemblers.len() {
            if self.reassemblers[i].try_accept(trx) {
                let reassembler = self.reassemblers.remove(i);
                let block = reassembler.into_block();
                if let Err(e) = self.submit_block_internal(block) {
                    log::warn!("unable to submit block after download: {}", e);
                }
            } else {
                i += 1;
            }
        }
    }

    // ---- 4.7 public submit_block API ----------------------------------------

    /// Public entry point (spec §4.7): compares the artifact's difficulty
    /// against `NameDb::target_difficulty()`. At or above target, it is a
    /// block; below, the same artifact is instead submitted as a lone name
    /// transaction.
    pub fn submit_block(&mut self, artifact: NameBlock) -> Result<(), NameNetError> {
        if artifact.difficulty() >= self.name_db.target_difficulty() {
            self.submit_block_internal(artifact)
        } else {
            self.submit_name(artifact.header.artifact)
        }
    }

    // ---- public read API -----------------------------------------------------

    pub fn lookup_name(&self, name: &str) -> Result<Option<NameRecord>, NameNetError> {
        let name_hash = crate::types::hash_name(name);
        match self.name_db.fetch_trx(&name_hash) {
            Ok(trx) => Ok(Some(NameRecord::from_trx(name, &trx))),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn get_head_block_number(&self) -> u32 {
        self.name_db.head_block_num()
    }

    pub fn get_head_block_id(&self) -> NameId {
        self.name_db.head_block_id()
    }

    pub fn get_pending_name_trxs(&self) -> Vec<NameHeader> {
        self.trx_mgr.get_inventory_values().into_iter().cloned().collect()
    }
}
