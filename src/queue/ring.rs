use log::debug;

use crate::queue::message::{Priority, Slot};
use crate::utils::clock::elapsed_ms;

/// Fixed-capacity circular queue of serialized messages.
///
/// `head` is the next write index, `tail` the next read index. The span between
/// them holds valid entries and reclaimable tombstones; `used` counts that span
/// and `valid` counts only live entries. The queue is full when the span covers
/// every slot, at which point enqueueing evicts.
///
/// Entries are dequeued in strict FIFO order relative to enqueue time. Priority
/// never reorders reads; it only selects which entry is dropped when a write
/// arrives under pressure.
///
/// Single-writer, single-reader: all methods take `&mut self` and the queue is
/// only ever touched from the client's tick context. It is not synchronized for
/// use from another thread.
#[derive(Debug)]
pub struct MessageQueue {
    slots: Vec<Slot>,
    head: usize,
    tail: usize,
    used: usize,
    valid: usize,
    max_message_size: usize,
}

impl MessageQueue {
    /// Creates a queue of `capacity` slots, each able to hold messages up to
    /// `max_message_size - 1` bytes. All storage is allocated here.
    pub fn new(capacity: usize, max_message_size: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: (0..capacity).map(|_| Slot::new(max_message_size)).collect(),
            head: 0,
            tail: 0,
            used: 0,
            valid: 0,
            max_message_size,
        }
    }

    /// Number of live messages.
    pub fn len(&self) -> usize {
        self.valid
    }

    pub fn is_empty(&self) -> bool {
        self.valid == 0
    }

    /// True when every slot is occupied and the next enqueue must evict.
    pub fn is_full(&self) -> bool {
        self.used == self.slots.len()
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Adds a message stamped with `now_ms`. Returns false only when the
    /// payload itself is unusable (empty, or too large for a slot).
    ///
    /// When the queue is full, room is made first: an urgent message tombstones
    /// the oldest entry below `High` priority if one exists; in any case the
    /// write position is then reclaimed by evicting the oldest remaining entry,
    /// whatever its priority. Eviction is never surfaced as an error.
    pub fn enqueue(&mut self, payload: &[u8], priority: Priority, now_ms: u32) -> bool {
        if payload.is_empty() || payload.len() >= self.max_message_size {
            return false;
        }

        self.reclaim_tail_tombstones();

        if self.is_full() {
            if priority.is_urgent() {
                let mut idx = self.tail;
                for _ in 0..self.used {
                    let slot = &mut self.slots[idx];
                    if slot.valid && !slot.priority.is_urgent() {
                        let displaced = slot.priority;
                        slot.valid = false;
                        self.valid -= 1;
                        debug!("queue full: displaced a {displaced:?} entry");
                        break;
                    }
                    idx = self.next(idx);
                }
                self.reclaim_tail_tombstones();
            }
            if self.is_full() {
                // No eligible victim: the oldest entry goes, whatever it is.
                if self.slots[self.tail].valid {
                    self.valid -= 1;
                    let dropped = self.slots[self.tail].priority;
                    debug!("queue full: dropped oldest {dropped:?} entry");
                }
                self.slots[self.tail].valid = false;
                self.tail = self.next(self.tail);
                self.used -= 1;
                self.reclaim_tail_tombstones();
            }
        }

        let slot = &mut self.slots[self.head];
        slot.data[..payload.len()].copy_from_slice(payload);
        slot.len = payload.len();
        slot.enqueued_at = now_ms;
        slot.priority = priority;
        slot.valid = true;

        self.head = self.next(self.head);
        self.used += 1;
        self.valid += 1;
        true
    }

    /// Removes the oldest message, copying it into `buf`. Payloads longer than
    /// `buf` are truncated to fit; the entry is consumed either way. Returns
    /// the number of bytes copied, 0 when the queue is empty.
    pub fn dequeue(&mut self, buf: &mut [u8]) -> usize {
        self.reclaim_tail_tombstones();
        if self.valid == 0 {
            return 0;
        }

        let slot = &mut self.slots[self.tail];
        let copy_len = slot.len.min(buf.len());
        buf[..copy_len].copy_from_slice(&slot.data[..copy_len]);
        slot.valid = false;

        self.tail = self.next(self.tail);
        self.used -= 1;
        self.valid -= 1;
        copy_len
    }

    /// Copies the oldest message into `buf` without removing it. The scan index
    /// is local, so tombstones are skipped without moving the tail.
    pub fn peek(&self, buf: &mut [u8]) -> usize {
        if self.valid == 0 {
            return 0;
        }
        let mut idx = self.tail;
        for _ in 0..self.used {
            let slot = &self.slots[idx];
            if slot.valid {
                let copy_len = slot.len.min(buf.len());
                buf[..copy_len].copy_from_slice(&slot.data[..copy_len]);
                return copy_len;
            }
            idx = self.next(idx);
        }
        0
    }

    /// Concatenates up to `max_messages` of the oldest entries into a JSON
    /// array in `buf`, hands the text to `send`, and removes exactly the
    /// batched entries when `send` reports success.
    ///
    /// Building and clearing are one operation by design: there is no way for
    /// the queue to change between the batch text and the entries it covers.
    /// Returns the number of messages removed; 0 when nothing fit or the send
    /// failed (entries are then retained for a later attempt).
    pub fn drain_batch<F>(&mut self, buf: &mut [u8], max_messages: usize, send: F) -> usize
    where
        F: FnOnce(&str) -> bool,
    {
        if self.valid == 0 || buf.len() < 2 || max_messages == 0 {
            return 0;
        }

        let mut pos = 0;
        buf[pos] = b'[';
        pos += 1;

        let mut batched = 0;
        let mut idx = self.tail;
        for _ in 0..self.used {
            if batched == max_messages {
                break;
            }
            let slot = &self.slots[idx];
            if slot.valid {
                let sep = usize::from(batched > 0);
                // One byte stays reserved for the closing bracket.
                if pos + sep + slot.len + 1 > buf.len() {
                    break;
                }
                if sep == 1 {
                    buf[pos] = b',';
                    pos += 1;
                }
                buf[pos..pos + slot.len].copy_from_slice(&slot.data[..slot.len]);
                pos += slot.len;
                batched += 1;
            }
            idx = self.next(idx);
        }

        if batched == 0 {
            return 0;
        }
        buf[pos] = b']';
        pos += 1;

        let Ok(text) = std::str::from_utf8(&buf[..pos]) else {
            return 0;
        };
        if !send(text) {
            return 0;
        }

        // The batch covered the oldest `batched` valid entries; remove those.
        for _ in 0..batched {
            self.reclaim_tail_tombstones();
            self.slots[self.tail].valid = false;
            self.tail = self.next(self.tail);
            self.used -= 1;
            self.valid -= 1;
        }
        self.reclaim_tail_tombstones();
        batched
    }

    /// Tombstones every entry older than `timeout_ms` as seen from `now_ms`,
    /// correct across clock wrap. Returns the number removed.
    pub fn remove_expired(&mut self, now_ms: u32, timeout_ms: u32) -> usize {
        if self.valid == 0 {
            return 0;
        }

        let mut removed = 0;
        let mut idx = self.tail;
        for _ in 0..self.used {
            let slot = &mut self.slots[idx];
            if slot.valid && elapsed_ms(now_ms, slot.enqueued_at) > timeout_ms {
                slot.valid = false;
                self.valid -= 1;
                removed += 1;
            }
            idx = self.next(idx);
        }

        self.reclaim_tail_tombstones();
        if removed > 0 {
            debug!("expired {removed} queued message(s)");
        }
        removed
    }

    /// Drops everything and resets the ring.
    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.used = 0;
        self.valid = 0;
        for slot in &mut self.slots {
            slot.valid = false;
        }
    }

    fn next(&self, idx: usize) -> usize {
        (idx + 1) % self.slots.len()
    }

    fn reclaim_tail_tombstones(&mut self) {
        while self.used > 0 && !self.slots[self.tail].valid {
            self.tail = self.next(self.tail);
            self.used -= 1;
        }
    }
}
