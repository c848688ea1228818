//! Property-based tests using proptest
//!
//! These tests validate buffer invariants across a wide range of randomly
//! generated inputs.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use packet_buffer::config::{BufferConfig, ObfuscationConfig};
use packet_buffer::core::byte_order::ByteOrder;
use packet_buffer::core::packet::PacketBuffer;
use packet_buffer::utils::obfuscation::{deobfuscate, obfuscate, rol, ror};
use proptest::prelude::*;

fn reader_for(writer: &PacketBuffer) -> PacketBuffer {
    PacketBuffer::from_inbound(writer.outbound(), writer.config().clone())
        .expect("Config should be valid")
}

fn any_order() -> impl Strategy<Value = ByteOrder> {
    prop_oneof![
        Just(ByteOrder::Native),
        Just(ByteOrder::Little),
        Just(ByteOrder::Big),
    ]
}

// Property: Every integer type reads back exactly what was written
proptest! {
    #[test]
    fn prop_integer_roundtrip(
        order in any_order(),
        a in any::<u8>(),
        b in any::<i16>(),
        c in any::<u16>(),
        d in any::<i32>(),
        e in any::<u32>(),
        f in any::<i64>(),
        g in any::<u64>(),
    ) {
        let config = BufferConfig { byte_order: order, ..BufferConfig::default() };
        let mut writer = PacketBuffer::with_config(config).unwrap();
        writer.write_byte(a).unwrap();
        writer.write_short(b).unwrap();
        writer.write_ushort(c).unwrap();
        writer.write_int(d).unwrap();
        writer.write_uint(e).unwrap();
        writer.write_long(f).unwrap();
        writer.write_ulong(g).unwrap();

        let mut reader = reader_for(&writer);
        prop_assert_eq!(reader.read_byte().unwrap(), a);
        prop_assert_eq!(reader.read_short().unwrap(), b);
        prop_assert_eq!(reader.read_ushort().unwrap(), c);
        prop_assert_eq!(reader.read_int().unwrap(), d);
        prop_assert_eq!(reader.read_uint().unwrap(), e);
        prop_assert_eq!(reader.read_long().unwrap(), f);
        prop_assert_eq!(reader.read_ulong().unwrap(), g);
        prop_assert!(!reader.has_data_left());
    }
}

// Property: Floats are bit-exact, NaN payloads and infinities included
proptest! {
    #[test]
    fn prop_float_bits_preserved(order in any_order(), f_bits in any::<u32>(), d_bits in any::<u64>()) {
        let config = BufferConfig { byte_order: order, ..BufferConfig::default() };
        let mut writer = PacketBuffer::with_config(config).unwrap();
        writer.write_float(f32::from_bits(f_bits)).unwrap();
        writer.write_double(f64::from_bits(d_bits)).unwrap();

        let mut reader = reader_for(&writer);
        prop_assert_eq!(reader.read_float().unwrap().to_bits(), f_bits);
        prop_assert_eq!(reader.read_double().unwrap().to_bits(), d_bits);
    }
}

// Property: Length-prefixed strings cost 4 bytes plus their UTF-8 length
proptest! {
    #[test]
    fn prop_string_roundtrip(text in ".{0,200}") {
        let mut writer = PacketBuffer::new();
        writer.write_string(&text).unwrap();
        prop_assert_eq!(writer.out_size(), 4 + text.len());

        let mut reader = reader_for(&writer);
        prop_assert_eq!(reader.read_string().unwrap(), text);
    }
}

// Property: Null-terminated strings stop right after their terminator
proptest! {
    #[test]
    fn prop_string_nt_cursor(text in "[a-zA-Z0-9 ]{0,100}", trailer in any::<u32>()) {
        let mut writer = PacketBuffer::new();
        writer.write_string_nt(&text).unwrap();
        writer.write_uint(trailer).unwrap();

        let mut reader = reader_for(&writer);
        prop_assert_eq!(reader.read_string_nt().unwrap(), text.clone());
        prop_assert_eq!(reader.in_pos(), text.len() + 1);
        prop_assert_eq!(reader.read_uint().unwrap(), trailer);
    }
}

// Property: Byte-by-byte writes past the initial capacity never lose data
proptest! {
    #[test]
    fn prop_growth_preserves_bytes(
        initial in 1usize..32,
        data in prop::collection::vec(any::<u8>(), 0..4096),
    ) {
        let config = BufferConfig { initial_capacity: initial, ..BufferConfig::default() };
        let mut writer = PacketBuffer::with_config(config).unwrap();
        for byte in &data {
            writer.write_byte(*byte).unwrap();
        }
        prop_assert_eq!(writer.outbound(), data.as_slice());
        prop_assert!(writer.out_pos() <= writer.out_capacity());
    }
}

// Property: Chunked writes equal the concatenation of the chunks
proptest! {
    #[test]
    fn prop_chunked_writes_concatenate(
        chunks in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..300), 0..20),
    ) {
        let config = BufferConfig { initial_capacity: 1, ..BufferConfig::default() };
        let mut writer = PacketBuffer::with_config(config).unwrap();
        for chunk in &chunks {
            writer.write_bytes(chunk, false).unwrap();
        }
        prop_assert_eq!(writer.outbound().to_vec(), chunks.concat());
    }
}

// Property: A read that needs more bytes than remain fails and leaves the cursor
proptest! {
    #[test]
    fn prop_underflow_never_moves_cursor(
        data in prop::collection::vec(any::<u8>(), 0..8),
        skip in 0usize..8,
    ) {
        let mut reader = PacketBuffer::from_inbound(&data, BufferConfig::default()).unwrap();
        let skip = skip.min(data.len());
        reader.skip(skip).unwrap();

        let left = reader.data_left();
        if left < 8 {
            prop_assert!(reader.read_long().unwrap_err().is_underflow());
            prop_assert_eq!(reader.in_pos(), skip);
        }
        if left < 4 {
            prop_assert!(reader.read_int().unwrap_err().is_underflow());
            prop_assert_eq!(reader.in_pos(), skip);
        }
    }
}

// Property: can_read_seq is idempotent and never consumes
proptest! {
    #[test]
    fn prop_can_read_seq_non_destructive(
        data in prop::collection::vec(any::<u8>(), 0..256),
        seq in prop::collection::vec(any::<u8>(), 1..4),
    ) {
        let reader = PacketBuffer::from_inbound(&data, BufferConfig::default()).unwrap();
        let first = reader.can_read_seq(&seq);
        let second = reader.can_read_seq(&seq);
        prop_assert_eq!(first, second);
        prop_assert_eq!(reader.in_pos(), 0);
        prop_assert_eq!(first, data.windows(seq.len()).any(|w| w == seq.as_slice()));
    }
}

// Property: Rotations are an involution pair
proptest! {
    #[test]
    fn prop_rotation_involution(data in prop::collection::vec(any::<u8>(), 0..1024), k in 0u32..64) {
        for byte in &data {
            prop_assert_eq!(rol(ror(*byte, k), k), *byte);
        }

        let mut buffer = data.clone();
        obfuscate(&mut buffer, k);
        deobfuscate(&mut buffer, k);
        prop_assert_eq!(buffer, data);
    }
}

// Property: Obfuscated send framing restores the original payload on receive
proptest! {
    #[test]
    fn prop_obfuscated_frame_roundtrip(
        payload in prop::collection::vec(any::<u8>(), 0..2048),
        rotation in 1u32..8,
    ) {
        use bytes::BytesMut;
        use packet_buffer::core::codec::PacketCodec;
        use tokio_util::codec::Decoder;

        let config = BufferConfig {
            insert_length_on_send: true,
            obfuscation: ObfuscationConfig::with_rotation(rotation),
            ..BufferConfig::default()
        };
        let mut writer = PacketBuffer::with_config(config.clone()).unwrap();
        writer.write_bytes(&payload, false).unwrap();
        let frame = writer.frame_outbound().unwrap();

        let mut codec = PacketCodec::new(config).unwrap();
        let mut wire = BytesMut::from(&frame[..]);
        let mut reader = codec.decode(&mut wire).unwrap().unwrap();
        prop_assert_eq!(reader.read_remaining(), payload);
    }
}
