//! # Rotation Obfuscation
//!
//! Reversible per-byte bit rotation used to keep packet contents from being
//! readable at a glance on the wire.
//!
//! This is NOT encryption. Anyone who knows (or guesses among the seven
//! possible values) the rotation can read the traffic.
//!
//! The sender rotates right, the receiver rotates left by the same amount.
//! Using any other pairing corrupts data silently, so callers should go
//! through [`obfuscate`] / [`deobfuscate`] (or the packet codec, which pairs
//! them for you) rather than mixing `rol`/`ror` by hand.

use tracing::trace;

/// Rotate a byte right by `num` bits
#[inline]
pub fn ror(val: u8, num: u32) -> u8 {
    val.rotate_right(num % 8)
}

/// Rotate a byte left by `num` bits
#[inline]
pub fn rol(val: u8, num: u32) -> u8 {
    val.rotate_left(num % 8)
}

/// Obscure `buffer` in place before sending
pub fn obfuscate(buffer: &mut [u8], rotation: u32) {
    trace!(len = buffer.len(), rotation, "Obfuscating buffer");
    for byte in buffer.iter_mut() {
        *byte = ror(*byte, rotation);
    }
}

/// Restore a buffer produced by [`obfuscate`] with the same rotation
pub fn deobfuscate(buffer: &mut [u8], rotation: u32) {
    trace!(len = buffer.len(), rotation, "Deobfuscating buffer");
    for byte in buffer.iter_mut() {
        *byte = rol(*byte, rotation);
    }
}
