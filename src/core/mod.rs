//! # Core Packet Components
//!
//! The packet buffer, its wire encoding, and the codec that moves it over a
//! byte stream.
//!
//! ## Components
//! - **Packet**: the bidirectional buffer with typed reads and writes
//! - **Byte order**: explicit fixed-width encoding
//! - **Vector**: two- and three-float composite values
//! - **Codec**: Tokio codec for framing over byte streams
//! - **Dump**: raw region snapshots for capture and replay
//!
//! ## Wire Format
//! ```text
//! [Length(4), optional] [Payload(N), optionally obfuscated]
//! ```

pub mod byte_order;
pub mod codec;
pub mod dump;
pub mod packet;
pub mod vector;
