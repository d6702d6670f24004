use byteorder::{BigEndian, ByteOrder};

/// Encodes a message key as four big-endian bytes, the wire layout Kafka
/// integer keys use, so other clients can decode what this tool sends.
pub fn serialize_key(key: i32) -> [u8; 4] {
    let mut buf = [0u8; 4];
    BigEndian::write_i32(&mut buf, key);
    buf
}

/// Decodes a key produced by [`serialize_key`]. Returns `None` for any
/// other payload length.
pub fn deserialize_key(bytes: &[u8]) -> Option<i32> {
    if bytes.len() != 4 {
        return None;
    }
    Some(BigEndian::read_i32(bytes))
}

/// Message values go on the wire as plain UTF-8.
pub fn serialize_value(value: &str) -> &[u8] {
    value.as_bytes()
}
