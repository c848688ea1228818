#![no_main]

use bytes::BytesMut;
use libfuzzer_sys::fuzz_target;
use packet_buffer::config::{BufferConfig, ObfuscationConfig};
use packet_buffer::core::codec::PacketCodec;
use tokio_util::codec::Decoder;

fuzz_target!(|data: &[u8]| {
    let config = BufferConfig {
        insert_length_on_send: true,
        obfuscation: ObfuscationConfig::with_rotation(3),
        max_capacity: 64 * 1024,
        ..BufferConfig::default()
    };
    let Ok(mut codec) = PacketCodec::new(config) else {
        return;
    };

    // Malformed frames must produce errors, never panics
    let mut wire = BytesMut::from(data);
    while let Ok(Some(mut packet)) = codec.decode(&mut wire) {
        let _ = packet.read_string();
        let _ = packet.read_string_all();
    }
});
