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
//! # Fetch loop
//!
//! A single cooperative task drives inventory fan-out and unsolicited
//! fetches for the whole channel (spec §5 "one task per channel"). Every
//! iteration briefly locks the shared `ChannelCore`, does its work, drops
//! the lock, then sleeps a randomized short interval before the next
//! iteration - the only suspension points are the sleep and cancellation
//! check, never while the lock is held.
//!

use crate::channel::ChannelCore;
use rand::Rng;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::watch;

/// Lower and upper bounds (microseconds) of the randomized spacing between
/// fetch loop iterations (spec §4.2/§9).
const MIN_INTERVAL_MICROS: u64 = 100;
const MAX_INTERVAL_MICROS: u64 = 20_100;

fn random_interval() -> Duration {
    let micros = rand::thread_rng().gen_range(MIN_INTERVAL_MICROS..MAX_INTERVAL_MICROS);
    Duration::from_micros(micros)
}

/// Runs until `cancel` is set to `true`. Checked both at the top of each
/// iteration and again immediately before the sleep, so a shutdown
/// requested mid-iteration is never missed for more than one pass (spec
/// §5 "cancellation is observable before each sleep and each iteration
/// head").
pub async fn run(core: std::sync::Arc<Mutex<ChannelCore>>, mut cancel: watch::Receiver<bool>) {
    loop {
        if *cancel.borrow() {
            return;
        }

        {
            let mut core = core.lock().expect("channel core lock poisoned");
            core.broadcast_inv();

            let mut id = 0;
            if core.find_next_trx_query(&mut id) {
                core.fetch_from_best_connection(id);
                core.mark_trx_queried(&id);
            }
        }

        if *cancel.borrow() {
            return;
        }

        tokio::select! {
            _ = tokio::time::sleep(random_interval()) => {}
            _ = cancel.changed() => {
                if *cancel.borrow() {
                    return;
                }
            }
        }
    }
}
