//! # Packet Buffer
//!
//! A bidirectional byte buffer: typed values are appended to the outbound
//! region and consumed, in order, from the inbound region.
//!
//! ## Regions
//! ```text
//! outbound: [ written ................ | spare capacity ]
//!                                      ^ out_pos == out_size
//! inbound:  [ consumed | unread ....... | spare capacity ]
//!                      ^ in_pos         ^ in_size
//! ```
//!
//! The two regions are independent. Writing never makes bytes readable; the
//! transport (or a dump file) supplies inbound data.
//!
//! ## Wire Format
//! - Fixed-width values: `short`=2, `int`=4, `long`=8, `float`=4, `double`=8,
//!   in the configured [`ByteOrder`] (host order by default)
//! - Length-prefixed data: `[len: i32][payload]`, no terminator
//! - Null-terminated strings: `[payload][0x00]`
//! - Raw strings: `[payload]`, framing is the caller's business
//! - Lines: `[payload][\n]`
//! - Vectors: 2 or 3 consecutive floats
//!
//! ## Safety
//! - Every read checks `in_pos + width <= in_size` first and fails with an
//!   underflow instead of touching bytes past the logical end
//! - A failed read never moves the cursor
//! - Multi-part writes reserve their full size up front, so a failure leaves
//!   no partial value behind
//! - Growth doubles capacity (or jumps straight to what is needed) and is
//!   bounded by `max_capacity`
//!
//! A buffer is not synchronized. Use one per connection, or wrap it in a lock.

use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, trace, warn};

use crate::config::{BufferConfig, LENGTH_PREFIX_SIZE};
use crate::core::byte_order::{ByteOrder, Primitive};
use crate::core::vector::{Vector2, Vector3};
use crate::error::{PacketError, Result};
use crate::utils::obfuscation;

/// Lifecycle of a buffer instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferState {
    /// Usable for reads and writes
    Live,
    /// Growth failed or `invalidate()` was called; writes are refused
    Invalidated,
}

/// Growable inbound/outbound packet buffer
#[derive(Debug, Clone)]
pub struct PacketBuffer {
    /// Written bytes; `len()` is both the write cursor and the logical size
    outbound: Vec<u8>,
    /// Received bytes; `len()` is the logical size
    inbound: Vec<u8>,
    in_pos: usize,
    state: BufferState,
    config: BufferConfig,
}

impl Default for PacketBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketBuffer {
    /// Create an empty buffer with the default configuration
    pub fn new() -> Self {
        let config = BufferConfig::default();
        Self {
            outbound: Vec::with_capacity(config.initial_capacity),
            inbound: Vec::with_capacity(config.initial_capacity),
            in_pos: 0,
            state: BufferState::Live,
            config,
        }
    }

    /// Create an empty buffer, rejecting invalid configurations
    ///
    /// # Errors
    /// - `PacketError::ConfigError` if `config` fails validation
    /// - `PacketError::AllocationFailure` if the initial regions cannot be reserved
    pub fn with_config(config: BufferConfig) -> Result<Self> {
        config.validate_strict()?;

        let mut outbound = Vec::new();
        let mut inbound = Vec::new();
        for region in [&mut outbound, &mut inbound] {
            region
                .try_reserve_exact(config.initial_capacity)
                .map_err(|_| PacketError::AllocationFailure(config.initial_capacity))?;
        }

        Ok(Self {
            outbound,
            inbound,
            in_pos: 0,
            state: BufferState::Live,
            config,
        })
    }

    /// Create a buffer whose inbound region holds a copy of `data`
    pub fn from_inbound(data: &[u8], config: BufferConfig) -> Result<Self> {
        let mut packet = Self::with_config(config)?;
        packet.push_inbound(data)?;
        Ok(packet)
    }

    /// Configuration this buffer was built with
    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    pub fn state(&self) -> BufferState {
        self.state
    }

    /// Whether the buffer still accepts writes
    pub fn is_valid(&self) -> bool {
        self.state == BufferState::Live
    }

    /// Refuse all further writes and inbound pushes until `reset()`
    pub fn invalidate(&mut self) {
        if self.state == BufferState::Live {
            warn!("Packet buffer invalidated");
        }
        self.state = BufferState::Invalidated;
    }

    /// Reset cursors and sizes to zero, keeping allocated capacity
    pub fn clear(&mut self) {
        self.clear_outbound();
        self.clear_inbound();
    }

    pub fn clear_outbound(&mut self) {
        self.outbound.clear();
    }

    pub fn clear_inbound(&mut self) {
        self.inbound.clear();
        self.in_pos = 0;
    }

    /// Release both regions and start over with the initial capacity
    ///
    /// This is the only way back to `Live` after an invalidation.
    pub fn reset(&mut self) {
        let capacity = self.config.initial_capacity;
        self.outbound = Vec::with_capacity(capacity);
        self.inbound = Vec::with_capacity(capacity);
        self.in_pos = 0;
        self.state = BufferState::Live;
        debug!(capacity, "Packet buffer reset");
    }

    fn ensure_live(&self) -> Result<()> {
        match self.state {
            BufferState::Live => Ok(()),
            BufferState::Invalidated => Err(PacketError::Invalidated),
        }
    }

    // ------------------------------------------------------------------
    // Cursors and regions
    // ------------------------------------------------------------------

    /// Next write offset
    pub fn out_pos(&self) -> usize {
        self.outbound.len()
    }

    /// Bytes written so far
    pub fn out_size(&self) -> usize {
        self.outbound.len()
    }

    pub fn out_capacity(&self) -> usize {
        self.outbound.capacity()
    }

    /// Next read offset
    pub fn in_pos(&self) -> usize {
        self.in_pos
    }

    /// Bytes available in the inbound region, consumed or not
    pub fn in_size(&self) -> usize {
        self.inbound.len()
    }

    pub fn in_capacity(&self) -> usize {
        self.inbound.capacity()
    }

    /// Logical outbound bytes
    pub fn outbound(&self) -> &[u8] {
        &self.outbound
    }

    /// Logical inbound bytes, including already consumed ones
    pub fn inbound(&self) -> &[u8] {
        &self.inbound
    }

    /// Unread inbound bytes
    pub fn remaining(&self) -> &[u8] {
        &self.inbound[self.in_pos..]
    }

    // ------------------------------------------------------------------
    // Growth
    // ------------------------------------------------------------------

    /// Make room for `required` more outbound bytes
    pub fn check_space_out(&mut self, required: usize) -> Result<()> {
        self.ensure_live()?;
        let needed = self.required_size(self.outbound.len(), required)?;
        if needed > self.outbound.capacity() {
            self.allocate_more_space_out(needed)?;
        }
        Ok(())
    }

    fn allocate_more_space_out(&mut self, needed: usize) -> Result<()> {
        let target = self.growth_target(self.outbound.capacity(), needed);
        let additional = target - self.outbound.len();
        if self.outbound.try_reserve_exact(additional).is_err() {
            warn!(target, "Outbound allocation failed");
            self.state = BufferState::Invalidated;
            return Err(PacketError::AllocationFailure(target));
        }
        debug!(
            len = self.outbound.len(),
            capacity = self.outbound.capacity(),
            "Grew outbound region"
        );
        Ok(())
    }

    /// Make room for `required` more inbound bytes
    pub fn check_space_in(&mut self, required: usize) -> Result<()> {
        self.ensure_live()?;
        let needed = self.required_size(self.inbound.len(), required)?;
        if needed > self.inbound.capacity() {
            self.allocate_more_space_in(needed)?;
        }
        Ok(())
    }

    fn allocate_more_space_in(&mut self, needed: usize) -> Result<()> {
        let target = self.growth_target(self.inbound.capacity(), needed);
        let additional = target - self.inbound.len();
        if self.inbound.try_reserve_exact(additional).is_err() {
            warn!(target, "Inbound allocation failed");
            self.state = BufferState::Invalidated;
            return Err(PacketError::AllocationFailure(target));
        }
        debug!(
            len = self.inbound.len(),
            capacity = self.inbound.capacity(),
            "Grew inbound region"
        );
        Ok(())
    }

    fn required_size(&self, size: usize, required: usize) -> Result<usize> {
        let limit = self.config.max_capacity;
        match size.checked_add(required) {
            Some(needed) if needed <= limit => Ok(needed),
            Some(needed) => Err(PacketError::CapacityExceeded {
                requested: needed,
                limit,
            }),
            None => Err(PacketError::CapacityExceeded {
                requested: usize::MAX,
                limit,
            }),
        }
    }

    /// `max(capacity * 2, needed)`, clamped to the configured limit
    fn growth_target(&self, capacity: usize, needed: usize) -> usize {
        capacity
            .saturating_mul(2)
            .max(needed)
            .min(self.config.max_capacity)
    }

    // ------------------------------------------------------------------
    // Write path
    // ------------------------------------------------------------------

    /// Append bytes whose space has already been checked
    fn put(&mut self, bytes: &[u8]) {
        self.outbound.extend_from_slice(bytes);
    }

    fn put_primitive<T: Primitive>(&mut self, value: T) {
        let mut scratch = [0u8; 8];
        value.encode(self.config.byte_order, &mut scratch);
        self.put(&scratch[..T::WIDTH]);
    }

    fn put_length(&mut self, len: usize) -> Result<()> {
        let prefix = i32::try_from(len).map_err(|_| PacketError::LengthOverflow(len))?;
        self.put_primitive(prefix);
        Ok(())
    }

    fn write_primitive<T: Primitive>(&mut self, value: T) -> Result<()> {
        self.check_space_out(T::WIDTH)?;
        self.put_primitive(value);
        Ok(())
    }

    pub fn write_byte(&mut self, value: u8) -> Result<()> {
        self.write_primitive(value)
    }

    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_primitive(value as u8)
    }

    pub fn write_short(&mut self, value: i16) -> Result<()> {
        self.write_primitive(value)
    }

    pub fn write_ushort(&mut self, value: u16) -> Result<()> {
        self.write_primitive(value)
    }

    pub fn write_int(&mut self, value: i32) -> Result<()> {
        self.write_primitive(value)
    }

    pub fn write_uint(&mut self, value: u32) -> Result<()> {
        self.write_primitive(value)
    }

    pub fn write_long(&mut self, value: i64) -> Result<()> {
        self.write_primitive(value)
    }

    pub fn write_ulong(&mut self, value: u64) -> Result<()> {
        self.write_primitive(value)
    }

    pub fn write_float(&mut self, value: f32) -> Result<()> {
        self.write_primitive(value)
    }

    pub fn write_double(&mut self, value: f64) -> Result<()> {
        self.write_primitive(value)
    }

    /// Append raw bytes, optionally preceded by an `i32` length
    pub fn write_bytes(&mut self, data: &[u8], send_size: bool) -> Result<()> {
        let prefix = if send_size { LENGTH_PREFIX_SIZE } else { 0 };
        self.check_space_out(prefix + data.len())?;
        if send_size {
            self.put_length(data.len())?;
        }
        self.put(data);
        Ok(())
    }

    /// Length-prefixed string: `[len: i32][bytes]`
    pub fn write_string(&mut self, value: &str) -> Result<()> {
        self.write_bytes(value.as_bytes(), true)
    }

    /// Null-terminated string: `[bytes][0]`
    ///
    /// An interior NUL ends the string early for the reader.
    pub fn write_string_nt(&mut self, value: &str) -> Result<()> {
        self.write_terminated(value.as_bytes(), 0)
    }

    /// String bytes only, no length and no terminator
    pub fn write_string_raw(&mut self, value: &str) -> Result<()> {
        self.write_bytes(value.as_bytes(), false)
    }

    /// String bytes followed by `\n`
    ///
    /// `read_line` drops one `\r` before the `\n`, so a value ending in `\r`
    /// reads back without it. Use `read_bytes_until(b"\n")` to keep it.
    pub fn write_line(&mut self, value: &str) -> Result<()> {
        self.write_terminated(value.as_bytes(), b'\n')
    }

    fn write_terminated(&mut self, data: &[u8], terminator: u8) -> Result<()> {
        self.check_space_out(data.len() + 1)?;
        self.put(data);
        self.put(&[terminator]);
        Ok(())
    }

    pub fn write_vector2(&mut self, value: &Vector2) -> Result<()> {
        self.check_space_out(2 * f32::WIDTH)?;
        self.put_primitive(value.x);
        self.put_primitive(value.y);
        Ok(())
    }

    pub fn write_vector3(&mut self, value: &Vector3) -> Result<()> {
        self.check_space_out(3 * f32::WIDTH)?;
        self.put_primitive(value.x);
        self.put_primitive(value.y);
        self.put_primitive(value.z);
        Ok(())
    }

    /// Overwrite an already-written value at `pos` without moving the cursor
    ///
    /// Typical use is reserving a length with `write_int(0)` and filling it in
    /// once the payload size is known.
    pub fn patch_at<T: Primitive>(&mut self, pos: usize, value: T) -> Result<()> {
        let size = self.outbound.len();
        match pos.checked_add(T::WIDTH) {
            Some(end) if end <= size => {
                value.encode(self.config.byte_order, &mut self.outbound[pos..end]);
                Ok(())
            }
            _ => Err(PacketError::InvalidPosition { pos, size }),
        }
    }

    // ------------------------------------------------------------------
    // Read path
    // ------------------------------------------------------------------

    /// Whether `len` more bytes can be read
    pub fn can_read(&self, len: usize) -> bool {
        len <= self.data_left()
    }

    /// Whether `seq` occurs in the unread bytes; never moves the cursor
    pub fn can_read_seq<S: AsRef<[u8]>>(&self, seq: S) -> bool {
        self.find(seq.as_ref()).is_some()
    }

    pub fn has_data_left(&self) -> bool {
        self.in_pos < self.inbound.len()
    }

    /// Number of unread bytes
    pub fn data_left(&self) -> usize {
        self.inbound.len() - self.in_pos
    }

    /// Offset of `seq` relative to `in_pos`
    fn find(&self, seq: &[u8]) -> Option<usize> {
        if seq.is_empty() {
            return Some(0);
        }
        self.remaining()
            .windows(seq.len())
            .position(|window| window == seq)
    }

    fn underflow(&self, needed: usize) -> PacketError {
        PacketError::Underflow {
            needed,
            available: self.data_left(),
        }
    }

    /// Consume `len` bytes
    fn take(&mut self, len: usize) -> Result<&[u8]> {
        if !self.can_read(len) {
            trace!(len, in_pos = self.in_pos, "Read underflow");
            return Err(self.underflow(len));
        }
        let start = self.in_pos;
        self.in_pos += len;
        Ok(&self.inbound[start..self.in_pos])
    }

    fn read_primitive<T: Primitive>(&mut self) -> Result<T> {
        let order = self.config.byte_order;
        let bytes = self.take(T::WIDTH)?;
        Ok(T::decode(order, bytes))
    }

    /// Decode the length prefix at the cursor without consuming it
    fn peek_length(&self) -> Result<usize> {
        if !self.can_read(LENGTH_PREFIX_SIZE) {
            return Err(self.underflow(LENGTH_PREFIX_SIZE));
        }
        decode_length(self.config.byte_order, self.remaining())
    }

    /// Consume a length prefix and its payload as one step
    fn take_sized(&mut self) -> Result<&[u8]> {
        let len = self.peek_length()?;
        let total = LENGTH_PREFIX_SIZE + len;
        if !self.can_read(total) {
            return Err(self.underflow(total));
        }
        self.in_pos += LENGTH_PREFIX_SIZE;
        self.take(len)
    }

    pub fn read_byte(&mut self) -> Result<u8> {
        self.read_primitive()
    }

    /// Any non-zero byte reads as `true`
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_byte()? != 0)
    }

    pub fn read_short(&mut self) -> Result<i16> {
        self.read_primitive()
    }

    pub fn read_ushort(&mut self) -> Result<u16> {
        self.read_primitive()
    }

    pub fn read_int(&mut self) -> Result<i32> {
        self.read_primitive()
    }

    pub fn read_uint(&mut self) -> Result<u32> {
        self.read_primitive()
    }

    pub fn read_long(&mut self) -> Result<i64> {
        self.read_primitive()
    }

    pub fn read_ulong(&mut self) -> Result<u64> {
        self.read_primitive()
    }

    pub fn read_float(&mut self) -> Result<f32> {
        self.read_primitive()
    }

    pub fn read_double(&mut self) -> Result<f64> {
        self.read_primitive()
    }

    /// Copy of the next `len` bytes
    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        self.take(len).map(<[u8]>::to_vec)
    }

    /// Payload written by `write_bytes(data, true)`
    pub fn read_sized_bytes(&mut self) -> Result<Vec<u8>> {
        self.take_sized().map(<[u8]>::to_vec)
    }

    /// Skip `len` bytes
    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.take(len).map(|_| ())
    }

    /// Length-prefixed string written by `write_string`
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.peek_length()?;
        let total = LENGTH_PREFIX_SIZE + len;
        if !self.can_read(total) {
            return Err(self.underflow(total));
        }
        let text = to_text(&self.remaining()[LENGTH_PREFIX_SIZE..total])?;
        self.in_pos += total;
        Ok(text)
    }

    /// Exactly `len` bytes as text
    pub fn read_string_exact(&mut self, len: usize) -> Result<String> {
        if !self.can_read(len) {
            return Err(self.underflow(len));
        }
        let text = to_text(&self.remaining()[..len])?;
        self.in_pos += len;
        Ok(text)
    }

    /// Bytes before `seq`; the cursor moves past the delimiter
    pub fn read_bytes_until<S: AsRef<[u8]>>(&mut self, seq: S) -> Result<Vec<u8>> {
        let seq = seq.as_ref();
        let offset = self.find(seq).ok_or(PacketError::DelimiterNotFound)?;
        let data = self.remaining()[..offset].to_vec();
        self.in_pos += offset + seq.len();
        Ok(data)
    }

    /// Text before `seq`; the cursor moves past the delimiter
    pub fn read_until<S: AsRef<[u8]>>(&mut self, seq: S) -> Result<String> {
        let seq = seq.as_ref();
        let offset = self.find(seq).ok_or(PacketError::DelimiterNotFound)?;
        let text = to_text(&self.remaining()[..offset])?;
        self.in_pos += offset + seq.len();
        Ok(text)
    }

    /// Null-terminated string; the terminator is consumed, not returned
    pub fn read_string_nt(&mut self) -> Result<String> {
        self.read_until([0u8])
    }

    /// Line written by `write_line`, without `\n` or a trailing `\r`
    pub fn read_line(&mut self) -> Result<String> {
        let mut line = self.read_until(b"\n")?;
        if line.ends_with('\r') {
            line.pop();
        }
        Ok(line)
    }

    /// All unread bytes as text
    pub fn read_string_all(&mut self) -> Result<String> {
        let text = to_text(self.remaining())?;
        self.in_pos = self.inbound.len();
        Ok(text)
    }

    /// Copy of all unread bytes
    pub fn read_remaining(&mut self) -> Vec<u8> {
        let data = self.remaining().to_vec();
        self.in_pos = self.inbound.len();
        data
    }

    pub fn read_vector2(&mut self) -> Result<Vector2> {
        if !self.can_read(2 * f32::WIDTH) {
            return Err(self.underflow(2 * f32::WIDTH));
        }
        Ok(Vector2::new(self.read_float()?, self.read_float()?))
    }

    pub fn read_vector3(&mut self) -> Result<Vector3> {
        if !self.can_read(3 * f32::WIDTH) {
            return Err(self.underflow(3 * f32::WIDTH));
        }
        Ok(Vector3::new(
            self.read_float()?,
            self.read_float()?,
            self.read_float()?,
        ))
    }

    // ------------------------------------------------------------------
    // Transport boundary
    // ------------------------------------------------------------------

    /// Append received bytes to the inbound tail
    pub fn push_inbound(&mut self, data: &[u8]) -> Result<()> {
        self.check_space_in(data.len())?;
        self.inbound.extend_from_slice(data);
        trace!(len = data.len(), in_size = self.inbound.len(), "Pushed inbound data");
        Ok(())
    }

    /// Replace the inbound region with `data`, taking ownership of it
    pub(crate) fn replace_inbound(&mut self, data: Vec<u8>) -> Result<()> {
        self.ensure_live()?;
        if data.len() > self.config.max_capacity {
            return Err(PacketError::CapacityExceeded {
                requested: data.len(),
                limit: self.config.max_capacity,
            });
        }
        self.inbound = data;
        self.in_pos = 0;
        Ok(())
    }

    /// Drop consumed inbound bytes so the next push reuses their space
    pub fn compact_inbound(&mut self) {
        if self.in_pos > 0 {
            self.inbound.drain(..self.in_pos);
            self.in_pos = 0;
        }
    }

    /// Hand the outbound bytes to the caller and clear the outbound region
    pub fn take_outbound(&mut self) -> Bytes {
        let data = Bytes::copy_from_slice(&self.outbound);
        self.clear_outbound();
        data
    }

    /// Outbound bytes framed for sending, then clear the outbound region
    ///
    /// Prepends the length when `insert_length_on_send` is set and obscures
    /// the payload when obfuscation is enabled. The packet codec decodes
    /// exactly this framing.
    pub fn frame_outbound(&mut self) -> Result<Bytes> {
        let mut frame = BytesMut::new();
        encode_frame(&self.config, &self.outbound, &mut frame)?;
        self.clear_outbound();
        Ok(frame.freeze())
    }
}

/// Write `payload` into `dst` with the send framing `config` describes
pub(crate) fn encode_frame(config: &BufferConfig, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > config.max_capacity {
        return Err(PacketError::OversizedPacket(payload.len()));
    }

    let prefix = if config.insert_length_on_send {
        LENGTH_PREFIX_SIZE
    } else {
        0
    };
    dst.reserve(prefix + payload.len());

    if config.insert_length_on_send {
        let len = i32::try_from(payload.len())
            .map_err(|_| PacketError::LengthOverflow(payload.len()))?;
        let mut scratch = [0u8; LENGTH_PREFIX_SIZE];
        len.encode(config.byte_order, &mut scratch);
        dst.put_slice(&scratch);
    }

    let start = dst.len();
    dst.put_slice(payload);
    if let Some(rotation) = config.obfuscation.active_rotation() {
        obfuscation::obfuscate(&mut dst[start..], rotation);
    }
    Ok(())
}

/// Decode a length prefix in `order` from the first four bytes of `bytes`
pub(crate) fn decode_length(order: ByteOrder, bytes: &[u8]) -> Result<usize> {
    let len = i32::decode(order, bytes);
    usize::try_from(len).map_err(|_| PacketError::InvalidLength(len))
}

fn to_text(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|_| PacketError::InvalidUtf8)
}
