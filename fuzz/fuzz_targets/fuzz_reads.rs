#![no_main]

use libfuzzer_sys::fuzz_target;
use packet_buffer::config::BufferConfig;
use packet_buffer::core::packet::PacketBuffer;

fuzz_target!(|data: &[u8]| {
    // First byte picks the read sequence, the rest is inbound data
    let Some((&selector, body)) = data.split_first() else {
        return;
    };
    let Ok(mut packet) = PacketBuffer::from_inbound(body, BufferConfig::default()) else {
        return;
    };

    for step in 0..16u8 {
        let before = packet.in_pos();
        let result = match selector.wrapping_add(step) % 10 {
            0 => packet.read_int().map(|_| ()),
            1 => packet.read_string().map(|_| ()),
            2 => packet.read_string_nt().map(|_| ()),
            3 => packet.read_until("\r\n").map(|_| ()),
            4 => packet.read_vector3().map(|_| ()),
            5 => packet.read_sized_bytes().map(|_| ()),
            6 => packet.read_double().map(|_| ()),
            7 => packet.read_line().map(|_| ()),
            8 => packet.read_bytes(step as usize).map(|_| ()),
            _ => packet.read_string_exact(3).map(|_| ()),
        };

        // A failed read never moves the cursor, and nothing reads past the end
        if result.is_err() {
            assert_eq!(packet.in_pos(), before);
        }
        assert!(packet.in_pos() <= packet.in_size());
    }
});
