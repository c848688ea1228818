//! # Packet Codec
//!
//! `tokio_util` framing between a byte stream and [`PacketBuffer`]s.
//!
//! The codec applies the same send policy as
//! [`PacketBuffer::frame_outbound`], taken from a [`BufferConfig`]:
//!
//! ```text
//! insert_length_on_send = true:   [len: i32][payload(len)]
//! insert_length_on_send = false:  [payload]  (each read chunk is one packet)
//! ```
//!
//! When obfuscation is enabled the payload is rotated on encode and rotated
//! back on decode; the length prefix stays in clear. Both directions come from
//! the codec's configuration, and a buffer written in a different byte order
//! is refused on encode rather than framed and misread on the other side.

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, trace};

use crate::config::{BufferConfig, LENGTH_PREFIX_SIZE};
use crate::core::packet::{decode_length, encode_frame, PacketBuffer};
use crate::error::{PacketError, Result};
use crate::utils::obfuscation;

/// Frames packet buffers over a byte stream
#[derive(Debug, Clone, Default)]
pub struct PacketCodec {
    config: BufferConfig,
}

impl PacketCodec {
    /// Build a codec, rejecting invalid configurations
    pub fn new(config: BufferConfig) -> Result<Self> {
        config.validate_strict()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    /// Refuse buffers whose payload was encoded in another byte order
    fn check_compatible(&self, item: &PacketBuffer) -> Result<()> {
        let order = item.config().byte_order;
        if order != self.config.byte_order {
            debug!(%order, codec_order = %self.config.byte_order, "Rejected buffer for encode");
            return Err(PacketError::ConfigError(format!(
                "Buffer byte order {order} does not match codec byte order {}",
                self.config.byte_order
            )));
        }
        Ok(())
    }

    fn packet_from(&self, mut payload: BytesMut) -> Result<PacketBuffer> {
        if let Some(rotation) = self.config.obfuscation.active_rotation() {
            obfuscation::deobfuscate(&mut payload, rotation);
        }
        PacketBuffer::from_inbound(&payload, self.config.clone())
    }
}

impl Decoder for PacketCodec {
    type Item = PacketBuffer;
    type Error = PacketError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if !self.config.insert_length_on_send {
            if src.is_empty() {
                return Ok(None);
            }
            let take = src.len().min(self.config.max_capacity);
            let payload = src.split_to(take);
            trace!(len = take, "Decoded unframed chunk");
            return self.packet_from(payload).map(Some);
        }

        if src.len() < LENGTH_PREFIX_SIZE {
            return Ok(None);
        }

        let len = decode_length(self.config.byte_order, &src[..LENGTH_PREFIX_SIZE])?;
        if len > self.config.max_capacity {
            debug!(len, "Rejected oversized frame");
            return Err(PacketError::OversizedPacket(len));
        }

        let total = LENGTH_PREFIX_SIZE + len;
        if src.len() < total {
            src.reserve(total - src.len());
            return Ok(None);
        }

        src.advance(LENGTH_PREFIX_SIZE);
        let payload = src.split_to(len);
        trace!(len, "Decoded length-prefixed frame");
        self.packet_from(payload).map(Some)
    }
}

impl Encoder<PacketBuffer> for PacketCodec {
    type Error = PacketError;

    fn encode(&mut self, item: PacketBuffer, dst: &mut BytesMut) -> Result<()> {
        self.check_compatible(&item)?;
        encode_frame(&self.config, item.outbound(), dst)
    }
}

impl Encoder<&mut PacketBuffer> for PacketCodec {
    type Error = PacketError;

    /// Frames the outbound bytes and clears them, like `frame_outbound`
    fn encode(&mut self, item: &mut PacketBuffer, dst: &mut BytesMut) -> Result<()> {
        self.check_compatible(item)?;
        encode_frame(&self.config, item.outbound(), dst)?;
        item.clear_outbound();
        Ok(())
    }
}
