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
//! namenet is a gossip and synchronization engine for a name-registration
//! blockchain: a single logical channel that disseminates pending name
//! transactions and confirmed blocks between peers, reassembles blocks
//! announced by compact index, and exposes a small public API to submit
//! and look up names. Transport, persistence and cryptographic scoring
//! are external collaborators, represented here only by the traits this
//! crate depends on (`PeerSink`, `NameDb`).
//!

pub mod broadcast;
pub mod channel;
pub mod delegate;
pub mod dispatcher;
pub mod error;
pub mod fetchloop;
pub mod message;
pub mod namedb;
pub mod peer;
pub mod peerview;
pub mod reassembler;
pub mod types;

pub use channel::{ChannelCore, NameChannelConfig};
pub use delegate::NameChannelDelegate;
pub use dispatcher::MessageDispatcher;
pub use error::NameNetError;
pub use message::{HeaderRange, NameMessage};
pub use namedb::NameDb;
pub use peer::{PeerId, PeerSink};
pub use types::{
    NameBlock, NameBlockHeader, NameBlockIndex, NameHash, NameHeader, NameId, NameRecord, PubKeyBytes, ShortNameId,
};

use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Host-facing handle to a running channel: the shared core plus the
/// background fetch loop and its cancellation switch (spec §5).
pub struct NameChannel {
    core: Arc<Mutex<ChannelCore>>,
    cancel: watch::Sender<bool>,
    fetch_loop: Option<JoinHandle<()>>,
}

impl NameChannel {
    /// Start a channel backed by `name_db`, spawning its fetch loop task
    /// onto the current tokio runtime.
    pub fn spawn(name_db: Box<dyn NameDb>) -> NameChannel {
        let core = Arc::new(Mutex::new(ChannelCore::new(name_db)));
        let (tx, rx) = watch::channel(false);
        let fetch_loop = tokio::spawn(fetchloop::run(core.clone(), rx));
        NameChannel { core, cancel: tx, fetch_loop: Some(fetch_loop) }
    }

    pub fn configure(&self, cfg: NameChannelConfig) {
        self.core.lock().expect("channel core lock poisoned").configure(cfg);
    }

    pub fn set_delegate(&self, delegate: Option<Arc<dyn NameChannelDelegate>>) {
        self.core.lock().expect("channel core lock poisoned").set_delegate(delegate);
    }

    pub fn add_connection(&self, sink: Arc<dyn PeerSink>) {
        self.core.lock().expect("channel core lock poisoned").add_connection(sink);
    }

    pub fn remove_connection(&self, peer_id: PeerId) {
        self.core.lock().expect("channel core lock poisoned").remove_connection(peer_id);
    }

    pub fn dispatch(&self, peer: PeerId, msg: NameMessage) -> Result<(), NameNetError> {
        let mut core = self.core.lock().expect("channel core lock poisoned");
        MessageDispatcher::dispatch(&mut core, peer, msg)
    }

    pub fn submit_block(&self, artifact: NameBlock) -> Result<(), NameNetError> {
        self.core.lock().expect("channel core lock poisoned").submit_block(artifact)
    }

    pub fn lookup_name(&self, name: &str) -> Result<Option<NameRecord>, NameNetError> {
        self.core.lock().expect("channel core lock poisoned").lookup_name(name)
    }

    pub fn get_head_block_number(&self) -> u32 {
        self.core.lock().expect("channel core lock poisoned").get_head_block_number()
    }

    pub fn get_head_block_id(&self) -> NameId {
        self.core.lock().expect("channel core lock poisoned").get_head_block_id()
    }

    pub fn get_pending_name_trxs(&self) -> Vec<NameHeader> {
        self.core.lock().expect("channel core lock poisoned").get_pending_name_trxs()
    }

    /// Tear the channel down: null out the delegate, signal the fetch loop
    /// to stop, and wait for it to exit (spec §5 "Cancellation" - unsubscribe,
    /// null the delegate, request cancel, await termination). Any error
    /// surfacing from the loop's join is logged and swallowed, never
    /// propagated, matching "any exception during teardown is logged and
    /// swallowed".
    pub async fn shutdown(mut self) {
        self.set_delegate(None);
        let _ = self.cancel.send(true);
        if let Some(handle) = self.fetch_loop.take() {
            if let Err(e) = handle.await {
                log::warn!("fetch loop task panicked during shutdown: {}", e);
            }
        }
    }
}

impl Drop for NameChannel {
    fn drop(&mut self) {
        let _ = self.cancel.send(true);
    }
}
