//! # ferry-queue
//!
//! A lock-free, wait-free bounded queue for exactly one producer thread and
//! exactly one consumer thread. It is intended as the hand-off primitive
//! between two threads inside larger messaging or pipeline systems: no
//! blocking, no waiting, no allocation after construction.
//!
//! ## Design Goals
//!
//! - Every operation completes in a bounded number of steps regardless of
//!   what the other thread is doing
//! - Strict FIFO hand-off of owned values
//! - Acquire/release synchronization only, no compare-and-swap on any path
//! - Cache-line isolation of the shared counters to prevent false sharing
//!
//! ## Example
//!
//! ```
//! use ferry_queue::spsc;
//!
//! // Requested capacity is rounded up to the next power of two.
//! let (mut tx, mut rx) = spsc::queue::<u64>(1000);
//! assert_eq!(tx.capacity(), 1024);
//!
//! tx.offer(42).unwrap();
//! assert_eq!(rx.poll(), Some(42));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod spsc;

pub use spsc::{Consumer, Full, Producer};
