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

mod support;

use bitcoin_hashes::{sha256d, Hash};
use namenet::{ChannelCore, NameBlock, NameBlockHeader, NameHeader, NameMessage, PubKeyBytes};
use std::sync::Arc;
use support::{MockNameDb, MockPeerSink};

fn header(name: &str, nonce: u64) -> NameHeader {
    NameHeader {
        name_hash: sha256d::Hash::hash(name.as_bytes()),
        pub_key: PubKeyBytes([9u8; 33]),
        utc_sec: 1_700_000_000,
        age: 0,
        repute_points: 0,
        pow_nonce: nonce,
    }
}

#[test]
fn inv_then_fetch_requests_from_the_advertising_peer() {
    let mut core = ChannelCore::new(Box::new(MockNameDb::new(1_000)));
    let peer = Arc::new(MockPeerSink::new(1));
    core.add_connection(peer.clone());

    let h = header("alice", 1);
    core.handle_name_inv(1, vec![h.short_id()]);

    let mut id = 0;
    assert!(core.find_next_trx_query(&mut id));
    assert_eq!(id, h.short_id());
    core.mark_trx_queried(&id);
    core.fetch_from_best_connection(id);

    let sent = peer.sent_messages();
    assert_eq!(sent, vec![NameMessage::GetNameHeader(h.short_id())]);

    // already queried: nothing left to fetch until it resolves or expires
    let mut next = 0;
    assert!(!core.find_next_trx_query(&mut next));
}

#[test]
fn block_reassembly_completes_from_arriving_headers() {
    let mut core = ChannelCore::new(Box::new(MockNameDb::new(1_000)));
    let genesis = sha256d::Hash::hash(b"genesis");
    let peer = Arc::new(MockPeerSink::new(1));
    core.add_connection(peer.clone());

    let h1 = header("alice", 1);
    let h2 = header("bob", 2);
    let index = namenet::NameBlockIndex {
        header: NameBlockHeader { prev_block_id: genesis, artifact: header("miner", 5_000) },
        name_trxs: vec![h1.short_id(), h2.short_id()],
    };
    core.admit_block_index(index).unwrap();
    assert_eq!(core.get_head_block_number(), 0);

    // h2 arrives first, out of order relative to the index
    core.handle_name_header(1, h2.clone()).unwrap();
    core.handle_name_header(1, h1.clone()).unwrap();

    assert_eq!(core.get_head_block_number(), 1);
    let head_id = core.get_head_block_id();
    core.handle_get_block(1, head_id).unwrap();
    let block = peer
        .sent_messages()
        .into_iter()
        .find_map(|m| if let NameMessage::Block(b) = m { Some(b) } else { None })
        .expect("block was served");
    assert_eq!(block.name_trxs, vec![h1, h2]);
}

#[test]
fn sub_target_artifact_becomes_a_pending_name_trx() {
    let mut core = ChannelCore::new(Box::new(MockNameDb::new(10_000)));
    let artifact = header("carol", 50);
    let block = NameBlock {
        header: NameBlockHeader { prev_block_id: sha256d::Hash::hash(b"genesis"), artifact: artifact.clone() },
        name_trxs: vec![],
    };

    core.submit_block(block).unwrap();

    assert_eq!(core.get_head_block_number(), 0);
    let pending = core.get_pending_name_trxs();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].short_id(), artifact.short_id());
}

#[test]
fn duplicate_inventory_is_not_rebroadcast() {
    let mut core = ChannelCore::new(Box::new(MockNameDb::new(1_000)));
    let peer_a = Arc::new(MockPeerSink::new(1));
    let peer_b = Arc::new(MockPeerSink::new(2));
    core.add_connection(peer_a.clone());
    core.add_connection(peer_b.clone());

    let block = NameBlock {
        header: NameBlockHeader {
            prev_block_id: sha256d::Hash::hash(b"genesis"),
            artifact: header("miner", 5_000),
        },
        name_trxs: vec![],
    };
    core.submit_block(block).unwrap();

    core.broadcast_inv();
    assert_eq!(peer_a.sent_messages().len(), 1);
    assert_eq!(peer_b.sent_messages().len(), 1);

    // peer_a tells us it already knows; peer_b stays silent about it
    core.handle_block_inv(1, peer_a.sent_messages().iter().filter_map(|m| {
        if let NameMessage::BlockInv(ids) = m { Some(ids.clone()) } else { None }
    }).flatten().collect());

    core.broadcast_inv();
    assert_eq!(peer_a.sent_messages().len(), 1, "peer_a already knew, nothing new to send");
    assert_eq!(peer_b.sent_messages().len(), 1, "no new validated inventory since last broadcast");
}

#[test]
fn lookup_after_revoke_reports_revoked() {
    let mut core = ChannelCore::new(Box::new(MockNameDb::new(1_000)));
    let mut trx = header("alice", 1);
    core.handle_name_header(1, trx.clone()).unwrap();

    trx.pub_key = PubKeyBytes::ZERO;
    trx.utc_sec += 1;
    core.handle_name_header(1, trx.clone()).unwrap();

    let record = core.lookup_name("alice").unwrap().expect("name was registered");
    assert!(record.revoked);
}

#[tokio::test(flavor = "current_thread")]
async fn shutdown_stops_the_fetch_loop() {
    let channel = namenet::NameChannel::spawn(Box::new(MockNameDb::new(1_000)));
    let peer = Arc::new(MockPeerSink::new(1));
    channel.add_connection(peer);
    channel.shutdown().await;
}
