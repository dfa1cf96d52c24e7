//! Packet type values and reserved ids of the Source RCON protocol.
//!
//! Reference: <https://developer.valvesoftware.com/wiki/Source_RCON_Protocol>

pub const SERVERDATA_AUTH: i32 = 3;
pub const SERVERDATA_EXECCOMMAND: i32 = 2;
/// Same wire value as [`SERVERDATA_EXECCOMMAND`]; only the direction tells them apart.
pub const SERVERDATA_AUTH_RESPONSE: i32 = 2;
pub const SERVERDATA_RESPONSE_VALUE: i32 = 0;

/// Id carried by the auth request.
pub const ID_AUTH: i32 = 0x999;
/// Id of the empty probe packet used to mark the end of a multi-packet response.
pub const ID_TERM: i32 = 0x888;
/// Id the server answers with when the password is rejected.
pub const ID_AUTH_FAILED: i32 = -1;

/// Smallest legal value of the size field: id + type + two terminators.
pub const MIN_PACKET_SIZE: i32 = 10;

/// Responses whose size field exceeds this may be followed by more fragments.
pub const MULTI_PACKET_THRESHOLD: i32 = 3700;

/// Outbound packet kinds. Inbound packets keep their raw type value because
/// `2` is ambiguous between an exec command and an auth response.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PacketType {
    ServerDataAuth,
    ServerDataExecCommand,
    ServerDataResponseValue,
}

impl From<PacketType> for i32 {
    fn from(kind: PacketType) -> i32 {
        match kind {
            PacketType::ServerDataAuth => SERVERDATA_AUTH,
            PacketType::ServerDataExecCommand => SERVERDATA_EXECCOMMAND,
            PacketType::ServerDataResponseValue => SERVERDATA_RESPONSE_VALUE,
        }
    }
}
