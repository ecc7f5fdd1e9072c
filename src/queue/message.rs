/// Delivery priority of a queued message.
///
/// `High` and `Critical` messages may evict lower-priority entries when the
/// queue is full; they receive no protection from each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    Low = 0,
    Normal = 1,
    High = 2,
    Critical = 3,
}

impl Priority {
    /// True for priorities allowed to displace lower-priority entries.
    pub fn is_urgent(self) -> bool {
        self >= Priority::High
    }
}

/// One ring slot. The payload buffer is sized to the queue's maximum message
/// size at construction and reused in place for the life of the queue.
///
/// Lifecycle: empty, then valid on enqueue, then tombstoned on dequeue,
/// eviction, or expiry. A tombstoned slot is logically absent but physically
/// retained until the tail sweeps past it.
#[derive(Debug)]
pub(crate) struct Slot {
    pub data: Box<[u8]>,
    pub len: usize,
    pub enqueued_at: u32,
    pub priority: Priority,
    pub valid: bool,
}

impl Slot {
    pub fn new(max_message_size: usize) -> Self {
        Self {
            data: vec![0; max_message_size].into_boxed_slice(),
            len: 0,
            enqueued_at: 0,
            priority: Priority::Normal,
            valid: false,
        }
    }
}
