use crate::{common::MIN_PACKET_SIZE, errors::RconError};

const SIZE_FIELD_LEN: usize = 4;
const HEADER_LEN: usize = 12;
const TERMINATOR_LEN: usize = 2;

/// One decoded frame. `size` is the value of the size field as sent by the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    size: i32,
    id: i32,
    kind: i32,
    body: Vec<u8>,
}

impl Packet {
    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    /// Raw packet type value, see [`crate::common`].
    pub fn kind(&self) -> i32 {
        self.kind
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The body as text, if it is valid UTF-8.
    pub fn body_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }
}

/// Builds the wire bytes for a packet: size, id, type, body and two null terminators.
pub fn encode(kind: i32, id: i32, body: &str) -> Vec<u8> {
    let body_bytes = body.as_bytes();
    let size = MIN_PACKET_SIZE as usize + body_bytes.len();

    let mut buffer = Vec::with_capacity(SIZE_FIELD_LEN + size);
    buffer.extend_from_slice(&(size as i32).to_le_bytes());
    buffer.extend_from_slice(&id.to_le_bytes());
    buffer.extend_from_slice(&kind.to_le_bytes());
    buffer.extend_from_slice(body_bytes);
    buffer.extend_from_slice(&[0, 0]);
    buffer
}

/// Parses one frame. The body runs from the end of the header to the declared
/// size minus the terminators, clamped to the bytes actually present.
pub fn decode(bytes: &[u8]) -> Result<Packet, RconError> {
    if bytes.len() < HEADER_LEN {
        return Err(RconError::MalformedPacket(format!(
            "header needs {} bytes, got {}",
            HEADER_LEN,
            bytes.len()
        )));
    }

    let size = read_i32(bytes, 0);
    if size < MIN_PACKET_SIZE {
        return Err(RconError::MalformedPacket(format!("declared size {} is below {}", size, MIN_PACKET_SIZE)));
    }
    let id = read_i32(bytes, 4);
    let kind = read_i32(bytes, 8);

    let body_end = (SIZE_FIELD_LEN + size as usize - TERMINATOR_LEN).min(bytes.len());
    let body = bytes[HEADER_LEN..body_end].to_vec();

    Ok(Packet { size, id, kind, body })
}

/// Length of the first complete frame in `buf`, size field included, or
/// `None` while more bytes are needed.
pub fn frame_len(buf: &[u8]) -> Result<Option<usize>, RconError> {
    if buf.len() < SIZE_FIELD_LEN {
        return Ok(None);
    }

    let size = read_i32(buf, 0);
    if size < MIN_PACKET_SIZE {
        return Err(RconError::MalformedPacket(format!("declared size {} is below {}", size, MIN_PACKET_SIZE)));
    }

    let total = SIZE_FIELD_LEN + size as usize;
    Ok((buf.len() >= total).then_some(total))
}

fn read_i32(bytes: &[u8], offset: usize) -> i32 {
    let mut field = [0u8; 4];
    field.copy_from_slice(&bytes[offset..offset + 4]);
    i32::from_le_bytes(field)
}
