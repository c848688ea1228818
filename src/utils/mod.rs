//! # Utility Modules
//!
//! Supporting utilities used by the packet buffer.
//!
//! ## Components
//! - **Obfuscation**: reversible per-byte bit rotation (not cryptography)
//! - **Logging**: structured logging configuration

pub mod logging;
pub mod obfuscation;

pub use obfuscation::{deobfuscate, obfuscate, rol, ror};
