//! # Error Types
//!
//! Error handling for every packet buffer operation.
//!
//! Bounds are checked before every access, so each violation surfaces here at
//! the point where it happens instead of as corrupted or garbage data.
//!
//! ## Error Categories
//! - **Underflow**: a read asked for more bytes than remain, or a delimiter
//!   scan ran off the end of the inbound region
//! - **Framing**: negative or oversized length prefixes, invalid UTF-8 text
//! - **Allocation**: growth could not obtain memory or hit the configured limit
//! - **I/O**: dump and restore helpers failed on the filesystem
//!
//! ## Example Usage
//! ```rust
//! use packet_buffer::core::packet::PacketBuffer;
//! use packet_buffer::error::PacketError;
//!
//! let mut packet = PacketBuffer::from_inbound(&[0x01, 0x02], Default::default()).unwrap();
//! match packet.read_int() {
//!     Err(e) if e.is_underflow() => assert_eq!(packet.in_pos(), 0),
//!     other => panic!("unexpected: {other:?}"),
//! }
//! # let _ = PacketError::DelimiterNotFound;
//! ```

use std::io;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    /// Configuration errors
    pub const ERR_ZERO_INITIAL_CAPACITY: &str = "Initial capacity must be greater than 0";
    pub const ERR_CAPACITY_ORDER: &str = "Initial capacity cannot exceed max capacity";
    pub const ERR_ROTATION_RANGE: &str = "Obfuscation rotation must be between 1 and 7";
}

/// PacketError is the error type for all buffer operations
#[derive(Error, Debug)]
pub enum PacketError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Not enough data: needed {needed} bytes, {available} available")]
    Underflow { needed: usize, available: usize },

    #[error("Delimiter not found in remaining data")]
    DelimiterNotFound,

    #[error("Invalid length prefix: {0}")]
    InvalidLength(i32),

    #[error("Length does not fit a 4-byte prefix: {0}")]
    LengthOverflow(usize),

    #[error("Text is not valid UTF-8")]
    InvalidUtf8,

    #[error("Allocation failed while growing to {0} bytes")]
    AllocationFailure(usize),

    #[error("Capacity limit exceeded: requested {requested} bytes, limit {limit}")]
    CapacityExceeded { requested: usize, limit: usize },

    #[error("Packet buffer has been invalidated")]
    Invalidated,

    #[error("Packet too large: {0} bytes")]
    OversizedPacket(usize),

    #[error("Position {pos} out of range for {size} written bytes")]
    InvalidPosition { pos: usize, size: usize },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl PacketError {
    /// True for errors caused by the inbound region running out of data.
    ///
    /// A missing delimiter is an underflow too: the scan exhausted the
    /// region before finding its marker.
    pub fn is_underflow(&self) -> bool {
        matches!(
            self,
            PacketError::Underflow { .. } | PacketError::DelimiterNotFound
        )
    }
}

/// Type alias for Results using PacketError
pub type Result<T> = std::result::Result<T, PacketError>;
