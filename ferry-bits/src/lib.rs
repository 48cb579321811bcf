//! Bit-level sizing utilities.
//!
//! `ferry-bits` holds the small bit-twiddling helpers shared by the ferry
//! queue crates. The main one is [`find_next_power_of_two`], which the queues
//! use to normalize a requested capacity so that logical indices can be
//! reduced to physical slots with a single bitwise AND.
//!
//! # Example
//!
//! ```
//! use ferry_bits::find_next_power_of_two;
//!
//! assert_eq!(find_next_power_of_two(5), 8);
//! assert_eq!(find_next_power_of_two(1024), 1024);
//! ```

#![no_std]
#![warn(missing_docs)]

/// Returns the smallest power of two greater than or equal to `value`.
///
/// Both `0` and `1` map to `1`, so the result is always a positive power of
/// two. This is the crate's policy for degenerate capacity requests: a queue
/// sized from this function always has at least one slot.
///
/// # Panics
///
/// The result is unrepresentable when `value` exceeds the largest `usize`
/// power of two (`1 << (usize::BITS - 1)`); debug builds panic on the shift
/// overflow in that case.
///
/// # Example
///
/// ```
/// use ferry_bits::find_next_power_of_two;
///
/// assert_eq!(find_next_power_of_two(0), 1);
/// assert_eq!(find_next_power_of_two(1), 1);
/// assert_eq!(find_next_power_of_two(3), 4);
/// assert_eq!(find_next_power_of_two(100), 128);
/// ```
#[inline]
#[must_use]
pub const fn find_next_power_of_two(value: usize) -> usize {
    if value <= 1 {
        return 1;
    }

    1 << (usize::BITS - (value - 1).leading_zeros())
}
