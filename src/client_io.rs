use rand::Rng;
use tokio::io::{
    AsyncReadExt,
    AsyncWriteExt,
};

use crate::packet::{
    Packet,
    decode,
    encode,
    frame_len,
};
use crate::{
    client::RconSession,
    common::PacketType,
    errors::RconError,
    transport::Connector,
};

const READ_CHUNK: usize = 4096;

impl<C: Connector> RconSession<C> {
    /// Picks the id for the next command, uniformly in `1..=255`.
    pub(crate) fn next_command_id(&mut self) -> i32 {
        self.rng.random_range(1..=255)
    }

    /// Encodes and sends one packet.
    /// Packets larger than `max_packet_size` are rejected before anything is written.
    pub(crate) async fn write_packet(&mut self, packet_type: PacketType, id: i32, body: &str) -> Result<(), RconError> {
        let buf = encode(packet_type.into(), id, body);

        let max = self.client_config.max_packet_size;
        if max > 0 && buf.len() > max {
            return Err(RconError::PacketTooLarge { size: buf.len(), max });
        }

        let stream = self.stream.as_mut().ok_or(RconError::NotConnected)?;
        stream.write_all(&buf).await?;
        stream.flush().await?;
        log::debug!("Sent {:?} packet with id: {:?}", packet_type, id);
        Ok(())
    }

    /// Returns the next complete packet, reading more chunks from the stream as needed.
    ///
    /// Partial frames stay in the session buffer, so dropping this future
    /// (for example on a timeout) loses no bytes.
    pub(crate) async fn read_packet(&mut self) -> Result<Packet, RconError> {
        loop {
            if let Some(len) = frame_len(&self.inbound)? {
                let packet = decode(&self.inbound[..len])?;
                self.inbound.drain(..len);
                log::debug!("Received packet: {:?}", packet);
                return Ok(packet);
            }

            let stream = self.stream.as_mut().ok_or(RconError::NotConnected)?;
            self.inbound.reserve(READ_CHUNK);
            let read = stream.read_buf(&mut self.inbound).await?;
            if read == 0 {
                return Err(RconError::Connection(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "connection closed by server",
                )));
            }
        }
    }
}
