//! Address decomposition.
//!
//! Splits a 64-bit address into the three fields a set-associative cache
//! looks at:
//!
//! ```text
//!  63                         s+b   b          0
//! ┌──────────────────────────┬─────┬───────────┐
//! │           tag            │ set │  offset   │
//! └──────────────────────────┴─────┴───────────┘
//! ```
//!
//! Both `s` and `b` may be zero. A zero-width field decodes to `0`, and a
//! field wide enough to swallow the whole address leaves nothing for the
//! fields above it.

use crate::config::CacheConfig;

/// An address split into `(tag, set, offset)` for a particular [`CacheConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    /// High-order bits identifying the block within its set.
    pub tag: u64,
    /// Index of the set the block maps to.
    pub set: u64,
    /// Byte offset within the block. Not used by the replacement logic.
    pub offset: u64,
}

impl Address {
    /// Decodes `address` using the bit widths in `config`.
    ///
    /// ```
    /// use csim::address::Address;
    /// use csim::config::CacheConfig;
    ///
    /// let config = CacheConfig::new(1, 1, 1).unwrap();
    /// let decoded = Address::decode(0x10, &config);
    /// assert_eq!((decoded.tag, decoded.set, decoded.offset), (4, 0, 0));
    /// ```
    #[inline]
    pub fn decode(address: u64, config: &CacheConfig) -> Self {
        let s = config.set_index_bits;
        let b = config.block_offset_bits;

        let block = shr(address, b);
        Address {
            tag: shr(block, s),
            set: block & low_mask(s),
            offset: address & low_mask(b),
        }
    }

    /// Reassembles the address: `((tag << s) | set) << b | offset`.
    ///
    /// Inverse of [`Address::decode`] for the same configuration.
    #[inline]
    pub fn compose(&self, config: &CacheConfig) -> u64 {
        let s = config.set_index_bits;
        let b = config.block_offset_bits;
        shl(shl(self.tag, s) | self.set, b) | self.offset
    }

    /// Set index as a slice index.
    ///
    /// The set is always below `2^s`, which a validated configuration keeps
    /// within `usize`.
    #[inline]
    pub fn set_index(&self) -> usize {
        self.set as usize
    }
}

/// Mask with the low `bits` bits set; all ones once `bits` reaches 64.
#[inline]
fn low_mask(bits: u32) -> u64 {
    match 1u64.checked_shl(bits) {
        Some(bound) => bound - 1,
        None => u64::MAX,
    }
}

#[inline]
fn shr(value: u64, bits: u32) -> u64 {
    value.checked_shr(bits).unwrap_or(0)
}

#[inline]
fn shl(value: u64, bits: u32) -> u64 {
    value.checked_shl(bits).unwrap_or(0)
}
