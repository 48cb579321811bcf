//! Single-producer single-consumer bounded array queue.
//!
//! # Design
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ head (cache-line padded) - items removed so far          │
//! ├──────────────────────────────────────────────────────────┤
//! │ tail (cache-line padded) - items inserted so far         │
//! ├──────────────────────────────────────────────────────────┤
//! │ slots[0]: { occupied: AtomicBool, value: T }             │
//! │ slots[1]: { occupied: AtomicBool, value: T }             │
//! │ ...                                                      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Each slot carries its own occupancy flag, and that flag is the
//! synchronization point: the producer publishes a value by storing
//! `occupied = true` with Release ordering, the consumer takes it after an
//! Acquire load, clears the flag with Release, and the producer's next
//! Acquire load of the same slot observes the cleared state. Because the
//! producer only ever writes an empty slot and the consumer only ever clears
//! an occupied one, writes to any given slot strictly alternate between the
//! two threads and never race.
//!
//! The logical `head` and `tail` counters increase monotonically; the low
//! bits (via a power-of-two mask) select the physical slot. Each endpoint
//! owns its counter outright and keeps a plain local copy for the hot path;
//! the shared atomics exist for `len()` snapshots and teardown.
//!
//! Neither operation blocks, spins, yields, or allocates. "Full" and "empty"
//! are steady-state answers returned immediately; a caller that needs to wait
//! layers its own strategy (busy-spin, yield, sleep) on top.
//!
//! # Teardown
//!
//! Values still resident when both endpoints have been dropped are dropped
//! in place along with the buffer. Drain the queue first if you need the
//! remaining values.
//!
//! # Example
//!
//! ```
//! use ferry_queue::spsc;
//!
//! let (mut tx, mut rx) = spsc::queue::<u64>(4);
//!
//! tx.offer(1).unwrap();
//! tx.offer(2).unwrap();
//!
//! assert_eq!(rx.poll(), Some(1));
//! assert_eq!(rx.poll(), Some(2));
//! assert_eq!(rx.poll(), None);
//! ```

use std::cell::UnsafeCell;
use std::fmt;
use std::mem::{ManuallyDrop, MaybeUninit};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crossbeam_utils::CachePadded;
use ferry_bits::find_next_power_of_two;

/// Creates a new SPSC array queue with the given capacity.
///
/// Returns a `(Producer, Consumer)` pair. Each half is `Send` but not
/// `Sync` and takes `&mut self`, so the single-producer/single-consumer
/// discipline is enforced by the type system rather than trusted.
///
/// The actual capacity is `requested_capacity` rounded up to the next power
/// of two; a requested capacity of `0` is normalized to `1`.
///
/// # Example
///
/// ```
/// use ferry_queue::spsc;
///
/// let (tx, _rx) = spsc::queue::<String>(5);
/// assert_eq!(tx.capacity(), 8);
/// ```
pub fn queue<T>(requested_capacity: usize) -> (Producer<T>, Consumer<T>) {
    let capacity = find_next_power_of_two(requested_capacity);
    let mask = capacity - 1;

    // Single contiguous slot allocation, every slot starts empty.
    let mut slots = ManuallyDrop::new(Vec::<Slot<T>>::with_capacity(capacity));
    for _ in 0..capacity {
        slots.push(Slot {
            occupied: AtomicBool::new(false),
            value: UnsafeCell::new(MaybeUninit::uninit()),
        });
    }
    let buffer = slots.as_mut_ptr();

    let inner = Arc::new(Inner {
        head: CachePadded::new(AtomicUsize::new(0)),
        tail: CachePadded::new(AtomicUsize::new(0)),
        buffer,
        capacity,
        mask,
    });

    let head_atomic = &*inner.head as *const AtomicUsize;
    let tail_atomic = &*inner.tail as *const AtomicUsize;

    (
        Producer {
            local_tail: 0,
            buffer,
            mask,
            tail_atomic,
            head_atomic,
            inner: Arc::clone(&inner),
        },
        Consumer {
            local_head: 0,
            buffer,
            mask,
            head_atomic,
            tail_atomic,
            inner,
        },
    )
}

/// One cell of the ring buffer.
///
/// `occupied` is the synchronization word: `false` means empty, `true` means
/// `value` holds a fully-formed item. Keeping it next to the value puts the
/// flag and the data on the same cache line.
#[repr(C)]
struct Slot<T> {
    occupied: AtomicBool,
    value: UnsafeCell<MaybeUninit<T>>,
}

/// Shared state between producer and consumer.
#[repr(C)]
struct Inner<T> {
    /// Count of items removed so far. Written only by the consumer.
    head: CachePadded<AtomicUsize>,
    /// Count of items inserted so far. Written only by the producer.
    tail: CachePadded<AtomicUsize>,

    buffer: *mut Slot<T>,
    capacity: usize,
    mask: usize,
}

// Safety: slot occupancy flags and the two counters provide the required
// synchronization; each counter has exactly one writer.
unsafe impl<T: Send> Send for Inner<T> {}
unsafe impl<T: Send> Sync for Inner<T> {}

impl<T> Drop for Inner<T> {
    fn drop(&mut self) {
        // Sole owner at this point, plain loads are enough. Any value still
        // resident is dropped with its slot.
        for i in 0..self.capacity {
            let slot = unsafe { &*self.buffer.add(i) };
            if slot.occupied.load(Ordering::Relaxed) {
                unsafe { (*slot.value.get()).assume_init_drop() };
            }
        }

        // Free the slot allocation.
        unsafe {
            let _ = Vec::from_raw_parts(self.buffer, self.capacity, self.capacity);
        }
    }
}

/// The producer half of an SPSC array queue.
///
/// Use [`offer`](Producer::offer) to insert values. Takes `&mut self` to
/// statically ensure single-producer access; the handle can be sent to
/// another thread but not shared.
#[repr(C)]
pub struct Producer<T> {
    // === Hot path fields ===
    local_tail: usize,
    buffer: *mut Slot<T>,
    mask: usize,
    tail_atomic: *const AtomicUsize,

    // === Cold path fields ===
    head_atomic: *const AtomicUsize,
    inner: Arc<Inner<T>>,
}

unsafe impl<T: Send> Send for Producer<T> {}

impl<T> Producer<T> {
    /// Attempts to insert a value at the tail of the queue.
    ///
    /// Returns `Err(Full(value))` if the target slot is still occupied,
    /// giving ownership of the value back to the caller. There is no retry
    /// and no blocking; "full" is a steady-state answer.
    ///
    /// On success the value now belongs to the queue and the tail advances
    /// by exactly one.
    ///
    /// # Example
    ///
    /// ```
    /// use ferry_queue::spsc::{self, Full};
    ///
    /// let (mut tx, mut rx) = spsc::queue::<u32>(2);
    ///
    /// assert!(tx.offer(1).is_ok());
    /// assert!(tx.offer(2).is_ok());
    ///
    /// // Queue is now full
    /// assert_eq!(tx.offer(3), Err(Full::new(3)));
    ///
    /// // Space opens up once the consumer takes an item
    /// assert_eq!(rx.poll(), Some(1));
    /// assert!(tx.offer(3).is_ok());
    /// ```
    #[inline]
    #[must_use = "offer returns Err if the queue is full, which should be handled"]
    pub fn offer(&mut self, value: T) -> Result<(), Full<T>> {
        let tail = self.local_tail;
        let slot = unsafe { &*self.buffer.add(tail & self.mask) };

        // Acquire pairs with the consumer's Release clear of this slot.
        if slot.occupied.load(Ordering::Acquire) {
            return Err(Full::new(value));
        }

        unsafe { (*slot.value.get()).write(value) };

        // The new tail must be stored before the flag flips: a consumer that
        // acquires the flag then cannot observe a tail older than this item,
        // keeping len() snapshots within [0, capacity].
        let next_tail = tail.wrapping_add(1);
        unsafe { (*self.tail_atomic).store(next_tail, Ordering::Release) };

        // Release publishes the fully-formed value to the consumer.
        slot.occupied.store(true, Ordering::Release);
        self.local_tail = next_tail;

        Ok(())
    }

    /// Returns the capacity of the queue.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.mask + 1
    }

    /// Returns the number of items currently in the queue.
    ///
    /// Note: This is a snapshot and may be immediately stale in concurrent
    /// contexts.
    #[inline]
    pub fn len(&self) -> usize {
        let tail = unsafe { (*self.tail_atomic).load(Ordering::Relaxed) };
        let head = unsafe { (*self.head_atomic).load(Ordering::Relaxed) };
        tail.wrapping_sub(head)
    }

    /// Returns `true` if the queue is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if the consumer has been dropped.
    #[inline]
    pub fn is_disconnected(&self) -> bool {
        Arc::strong_count(&self.inner) == 1
    }
}

impl<T> fmt::Debug for Producer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

/// The consumer half of an SPSC array queue.
///
/// Use [`poll`](Consumer::poll) to remove values in FIFO order. Takes
/// `&mut self` to statically ensure single-consumer access; the handle can
/// be sent to another thread but not shared.
#[repr(C)]
pub struct Consumer<T> {
    // === Hot path fields ===
    local_head: usize,
    buffer: *mut Slot<T>,
    mask: usize,
    head_atomic: *const AtomicUsize,

    // === Cold path fields ===
    tail_atomic: *const AtomicUsize,
    inner: Arc<Inner<T>>,
}

unsafe impl<T: Send> Send for Consumer<T> {}

impl<T> Consumer<T> {
    /// Attempts to remove the value at the head of the queue.
    ///
    /// Returns `Some(value)` if the head slot holds an item, transferring
    /// ownership to the caller, or `None` if the queue is empty. Values come
    /// out in exactly the order their `offer` calls succeeded.
    ///
    /// # Example
    ///
    /// ```
    /// use ferry_queue::spsc;
    ///
    /// let (mut tx, mut rx) = spsc::queue::<u32>(8);
    ///
    /// assert_eq!(rx.poll(), None); // Empty
    ///
    /// tx.offer(42).unwrap();
    /// assert_eq!(rx.poll(), Some(42));
    /// ```
    #[inline]
    pub fn poll(&mut self) -> Option<T> {
        let head = self.local_head;
        let slot = unsafe { &*self.buffer.add(head & self.mask) };

        // Acquire pairs with the producer's Release publish of this slot.
        if !slot.occupied.load(Ordering::Acquire) {
            return None;
        }

        let value = unsafe { (*slot.value.get()).assume_init_read() };

        // The new head must be stored before the flag clears: a producer that
        // acquires the empty slot then cannot observe a head older than this
        // removal, keeping len() snapshots within [0, capacity].
        let next_head = head.wrapping_add(1);
        unsafe { (*self.head_atomic).store(next_head, Ordering::Release) };

        // Release hands the slot back before the producer's next publish.
        slot.occupied.store(false, Ordering::Release);
        self.local_head = next_head;

        Some(value)
    }

    /// Returns the capacity of the queue.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.mask + 1
    }

    /// Returns the number of items currently in the queue.
    ///
    /// Note: This is a snapshot and may be immediately stale in concurrent
    /// contexts.
    #[inline]
    pub fn len(&self) -> usize {
        let tail = unsafe { (*self.tail_atomic).load(Ordering::Relaxed) };
        let head = unsafe { (*self.head_atomic).load(Ordering::Relaxed) };
        tail.wrapping_sub(head)
    }

    /// Returns `true` if the queue is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if the producer has been dropped.
    #[inline]
    pub fn is_disconnected(&self) -> bool {
        Arc::strong_count(&self.inner) == 1
    }
}

impl<T> fmt::Debug for Consumer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

/// Error returned by [`Producer::offer`] when the queue is full.
///
/// Contains the value that could not be inserted, so the caller can retry
/// or handle it differently.
///
/// # Example
///
/// ```
/// use ferry_queue::spsc;
///
/// let (mut tx, _rx) = spsc::queue::<u32>(1);
///
/// tx.offer(1).unwrap();
///
/// // Queue is full, get our value back
/// let err = tx.offer(2).unwrap_err();
/// assert_eq!(err.into_inner(), 2);
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Full<T>(T);

impl<T> Full<T> {
    /// Creates a new `Full` error containing the given value.
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Returns the value that could not be inserted.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Display for Full<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "queue is full")
    }
}

impl<T> fmt::Debug for Full<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Full").finish_non_exhaustive()
    }
}

impl<T> std::error::Error for Full<T> {}
