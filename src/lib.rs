//! # packet-buffer
//!
//! A growable, bidirectional packet buffer for hand-rolled binary protocols.
//!
//! Values are written to an outbound region and read back from an inbound
//! region with explicit cursors, bounds checks before every access, and a
//! documented wire format for primitives, strings and float vectors.
//!
//! ## Modules
//! - [`core`]: the buffer, wire encoding, codec and dump helpers
//! - [`config`]: per-buffer settings loaded from TOML or the environment
//! - [`error`]: the crate error type
//! - [`utils`]: rotation obfuscation and logging setup
//!
//! ## Example
//! ```rust
//! use packet_buffer::core::packet::PacketBuffer;
//!
//! let mut out = PacketBuffer::new();
//! out.write_string("hello").unwrap();
//! out.write_float(1.5).unwrap();
//!
//! let mut inbound = PacketBuffer::new();
//! inbound.push_inbound(&out.take_outbound()).unwrap();
//! assert_eq!(inbound.read_string().unwrap(), "hello");
//! assert_eq!(inbound.read_float().unwrap(), 1.5);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

pub mod config;
pub mod core;
pub mod error;
pub mod utils;

pub use crate::config::{BufferConfig, PacketConfig};
pub use crate::core::codec::PacketCodec;
pub use crate::core::packet::{BufferState, PacketBuffer};
pub use crate::error::{PacketError, Result};
