// This file is part of Nitrogen.
//
// Nitrogen is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// Nitrogen is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with Nitrogen.  If not, see <http://www.gnu.org/licenses/>.
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Shared state between the main thread and the single background tile-reading worker.
/// The ring itself is capacity-bounded (`4*R*K + 4*R^2`, per the active-window perimeter);
/// overflow indices spill into a plain `Vec` drained opportunistically as room frees up.
struct Shared {
    ring: Mutex<VecDeque<u32>>,
    overflow: Mutex<Vec<u32>>,
    condvar: Condvar,
    capacity: usize,
    pending: AtomicUsize,
    running: AtomicBool,
}

/// The main-thread handle: pushes tile indices and reads the result of background reads.
#[derive(Clone)]
pub struct PrefetchQueue {
    shared: Arc<Shared>,
}

impl PrefetchQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                ring: Mutex::new(VecDeque::with_capacity(capacity)),
                overflow: Mutex::new(Vec::new()),
                condvar: Condvar::new(),
                capacity,
                pending: AtomicUsize::new(0),
                running: AtomicBool::new(true),
            }),
        }
    }

    /// Push a tile index to fetch. Returns `true` if it landed in the ring, `false` if it
    /// overflowed to the deferred list instead.
    pub fn push(&self, tile_index: u32) -> bool {
        let mut ring = self.shared.ring.lock();
        if ring.len() >= self.shared.capacity {
            drop(ring);
            self.shared.overflow.lock().push(tile_index);
            return false;
        }
        ring.push_back(tile_index);
        self.shared.pending.fetch_add(1, Ordering::Release);
        self.shared.condvar.notify_one();
        true
    }

    /// Promote as many overflow entries as currently fit into the ring. Called once per
    /// frame after recycling may have freed chunks.
    pub fn promote_overflow(&self) -> usize {
        let mut promoted = 0;
        let mut ring = self.shared.ring.lock();
        let mut overflow = self.shared.overflow.lock();
        while ring.len() < self.shared.capacity {
            let Some(tile_index) = overflow.pop() else {
                break;
            };
            ring.push_back(tile_index);
            promoted += 1;
        }
        if promoted > 0 {
            self.shared.pending.fetch_add(promoted, Ordering::Release);
            self.shared.condvar.notify_one();
        }
        promoted
    }

    pub fn pending(&self) -> usize {
        self.shared.pending.load(Ordering::Acquire)
    }

    pub fn overflow_len(&self) -> usize {
        self.shared.overflow.lock().len()
    }

    /// Clear the pending counter and wake the worker so it observes shutdown promptly. The
    /// worker has no per-read timeout; an in-flight read is always allowed to finish.
    pub fn shutdown(&self) {
        self.shared.running.store(false, Ordering::Release);
        self.shared.pending.store(0, Ordering::Release);
        self.shared.condvar.notify_one();
    }

    /// Worker-side: block until a tile index is available or shutdown is requested.
    pub(crate) fn wait_for_work(&self) -> Option<u32> {
        let mut ring = self.shared.ring.lock();
        loop {
            if let Some(tile_index) = ring.pop_front() {
                self.shared.pending.fetch_sub(1, Ordering::AcqRel);
                return Some(tile_index);
            }
            if !self.shared.running.load(Ordering::Acquire) {
                return None;
            }
            self.shared.condvar.wait(&mut ring);
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_push_until_overflow() {
        let q = PrefetchQueue::new(2);
        assert!(q.push(1));
        assert!(q.push(2));
        assert!(!q.push(3));
        assert_eq!(q.overflow_len(), 1);
    }

    #[test]
    fn test_promote_overflow_after_drain() {
        let q = PrefetchQueue::new(1);
        assert!(q.push(1));
        assert!(!q.push(2));
        q.wait_for_work();
        assert_eq!(q.promote_overflow(), 1);
        assert_eq!(q.overflow_len(), 0);
    }

    #[test]
    fn test_shutdown_wakes_worker() {
        let q = PrefetchQueue::new(4);
        q.shutdown();
        assert_eq!(q.wait_for_work(), None);
    }
}
