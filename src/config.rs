//! Cache Configuration Module
//!
//! This module provides the geometry of a simulated set-associative cache.
//!
//! # Design Philosophy
//!
//! [`CacheConfig`] has all public fields for simple instantiation, matching the
//! way the geometry is usually written down: `s` set-index bits, `E` lines per
//! set and `b` block-offset bits. Use [`CacheConfig::new`] when the values come
//! from an untrusted source (command line, config file); it rejects geometries
//! that the simulator cannot represent.
//!
//! # Sizing Guidelines
//!
//! ```text
//! num_sets       = 2^s
//! block_size     = 2^b bytes
//! capacity_bytes = num_sets × E × block_size
//! ```
//!
//! **Example**: a 32KB, 8-way cache with 64-byte blocks:
//! - `b = 6` (64-byte blocks)
//! - `E = 8`
//! - `s = 6` (32768 / (8 × 64) = 64 sets)
//!
//! The simulator allocates `num_sets × E` line slots and the same number of
//! recency slots up front, so very large `s` values translate directly into
//! memory usage.
//!
//! # Examples
//!
//! ```
//! use csim::config::CacheConfig;
//! use core::num::NonZeroUsize;
//!
//! // Direct-mapped, 16 sets, 16-byte blocks
//! let config = CacheConfig {
//!     set_index_bits: 4,
//!     lines_per_set: NonZeroUsize::new(1).unwrap(),
//!     block_offset_bits: 4,
//! };
//! assert_eq!(config.num_sets(), 16);
//!
//! // Validated construction
//! let config = CacheConfig::new(6, 8, 6).unwrap();
//! assert_eq!(config.capacity_bytes(), Some(32 * 1024));
//! assert!(CacheConfig::new(4, 0, 4).is_err());
//! ```

extern crate alloc;

use core::fmt;
use core::mem::size_of;
use core::num::NonZeroUsize;

use crate::line_table::Line;

/// Width of a simulated address in bits.
pub const ADDRESS_BITS: u32 = u64::BITS;

/// Bytes of simulator storage per line slot: the line itself plus its
/// recency entry.
const SLOT_BYTES: usize = size_of::<Line>() + size_of::<Option<u64>>();

/// Largest single allocation the global allocator can be asked for.
const MAX_ALLOCATION: usize = isize::MAX as usize;

/// Geometry of a set-associative cache.
///
/// # Fields
///
/// - `set_index_bits`: `s`, the number of address bits selecting a set. The
///   cache has `2^s` sets.
/// - `lines_per_set`: `E`, the associativity.
/// - `block_offset_bits`: `b`, the number of address bits addressing a byte
///   within a block.
///
/// The tag occupies the remaining `64 - s - b` high-order bits, so
/// `s + b` must not exceed 64.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Number of set-index bits (`s`).
    pub set_index_bits: u32,
    /// Number of lines per set (`E`).
    pub lines_per_set: NonZeroUsize,
    /// Number of block-offset bits (`b`).
    pub block_offset_bits: u32,
}

impl CacheConfig {
    /// Creates a validated configuration from raw `s`, `E`, `b` values.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::ZeroLinesPerSet`] if `lines_per_set` is zero
    /// - [`ConfigError::AddressBitsExceeded`] if `s + b > 64`
    /// - [`ConfigError::TooManyLines`] if the `2^s × E` line slots cannot be
    ///   addressed or their storage exceeds the largest possible allocation
    pub fn new(
        set_index_bits: u32,
        lines_per_set: usize,
        block_offset_bits: u32,
    ) -> Result<Self, ConfigError> {
        let lines_per_set = NonZeroUsize::new(lines_per_set).ok_or(ConfigError::ZeroLinesPerSet)?;
        let config = CacheConfig {
            set_index_bits,
            lines_per_set,
            block_offset_bits,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks that the geometry can be simulated.
    ///
    /// Configurations built with struct literal syntax skip [`CacheConfig::new`];
    /// the simulator calls this before allocating any storage.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let address_bits = self.set_index_bits.checked_add(self.block_offset_bits);
        if address_bits.map_or(true, |bits| bits > ADDRESS_BITS) {
            return Err(ConfigError::AddressBitsExceeded {
                set_index_bits: self.set_index_bits,
                block_offset_bits: self.block_offset_bits,
            });
        }
        if !self.storage_bytes().is_some_and(|bytes| bytes <= MAX_ALLOCATION) {
            return Err(ConfigError::TooManyLines {
                set_index_bits: self.set_index_bits,
                lines_per_set: self.lines_per_set.get(),
            });
        }
        Ok(())
    }

    /// Number of sets, `2^s`.
    ///
    /// Saturates at `usize::MAX` when `2^s` does not fit; such configurations
    /// fail [`CacheConfig::validate`].
    #[inline]
    pub fn num_sets(&self) -> usize {
        1usize.checked_shl(self.set_index_bits).unwrap_or(usize::MAX)
    }

    /// Associativity `E` as a plain `usize`.
    #[inline]
    pub fn ways(&self) -> usize {
        self.lines_per_set.get()
    }

    /// Total number of line slots, `2^s × E`, or `None` if it overflows.
    pub fn total_lines(&self) -> Option<usize> {
        if self.set_index_bits >= usize::BITS {
            return None;
        }
        self.num_sets().checked_mul(self.ways())
    }

    /// Bytes the simulator needs to hold every line and its recency slot, or
    /// `None` on overflow.
    ///
    /// Passing [`CacheConfig::validate`] only bounds this by `isize::MAX`; the
    /// allocation itself can still fail, which [`crate::CacheSimulator::new`]
    /// reports as [`ConfigError::TooManyLines`].
    pub fn storage_bytes(&self) -> Option<usize> {
        self.total_lines()?.checked_mul(SLOT_BYTES)
    }

    /// Block size in bytes, `2^b`, or `None` if it does not fit in a `u64`.
    pub fn block_size(&self) -> Option<u64> {
        1u64.checked_shl(self.block_offset_bits)
    }

    /// Number of tag bits left once set index and offset are taken.
    pub fn tag_bits(&self) -> u32 {
        ADDRESS_BITS.saturating_sub(self.set_index_bits.saturating_add(self.block_offset_bits))
    }

    /// Data capacity in bytes (`num_sets × E × block_size`), or `None` on overflow.
    pub fn capacity_bytes(&self) -> Option<u64> {
        let lines = u64::try_from(self.total_lines()?).ok()?;
        lines.checked_mul(self.block_size()?)
    }
}

impl fmt::Debug for CacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheConfig")
            .field("set_index_bits", &self.set_index_bits)
            .field("lines_per_set", &self.lines_per_set)
            .field("block_offset_bits", &self.block_offset_bits)
            .finish()
    }
}

impl fmt::Display for CacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "s={} E={} b={}",
            self.set_index_bits, self.lines_per_set, self.block_offset_bits
        )
    }
}

/// Reasons a [`CacheConfig`] is rejected before simulation starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// `E` was zero.
    ZeroLinesPerSet,
    /// `s + b` exceeds the 64-bit address width.
    AddressBitsExceeded {
        /// Requested set-index bits.
        set_index_bits: u32,
        /// Requested block-offset bits.
        block_offset_bits: u32,
    },
    /// `2^s × E` line slots cannot be allocated.
    TooManyLines {
        /// Requested set-index bits.
        set_index_bits: u32,
        /// Requested lines per set.
        lines_per_set: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroLinesPerSet => write!(f, "lines per set (E) must be positive"),
            ConfigError::AddressBitsExceeded {
                set_index_bits,
                block_offset_bits,
            } => write!(
                f,
                "set index bits ({set_index_bits}) plus block offset bits ({block_offset_bits}) exceed the {ADDRESS_BITS}-bit address width"
            ),
            ConfigError::TooManyLines {
                set_index_bits,
                lines_per_set,
            } => write!(
                f,
                "2^{set_index_bits} sets of {lines_per_set} lines cannot be allocated"
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}
