//! Minimal async RCON client.
//!
//! Packets are little-endian `length | request_id | type | body | 0x00 | 0x00`, where
//! `length` counts everything after itself. A session is a login (type 3) followed
//! by one command (type 2); each call opens a fresh connection.

use std::time::Duration;

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
};

use crate::error::transport::TransportError;

const PACKET_LOGIN: i32 = 3;
const PACKET_COMMAND: i32 = 2;
const PACKET_AUTH_RESPONSE: i32 = 2;
const PACKET_RESPONSE: i32 = 0;

const LOGIN_ID: i32 = 1;
const COMMAND_ID: i32 = 2;
const AUTH_FAILED_ID: i32 = -1;

/// Largest payload a vanilla server sends in one packet, plus header.
const MAX_PACKET_LEN: i32 = 4096 + 10;
const MIN_PACKET_LEN: i32 = 10;

/// One decoded RCON packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub id: i32,
    pub kind: i32,
    pub body: String,
}

impl Packet {
    pub fn encode(&self) -> Vec<u8> {
        let body = self.body.as_bytes();
        let length = (body.len() + 10) as i32;

        let mut buf = Vec::with_capacity(body.len() + 14);
        buf.extend_from_slice(&length.to_le_bytes());
        buf.extend_from_slice(&self.id.to_le_bytes());
        buf.extend_from_slice(&self.kind.to_le_bytes());
        buf.extend_from_slice(body);
        buf.extend_from_slice(&[0, 0]);
        buf
    }

    /// Reads one packet from the stream.
    pub async fn read<R>(reader: &mut R) -> Result<Self, TransportError>
    where
        R: AsyncReadExt + Unpin,
    {
        let length = reader.read_i32_le().await?;
        if !(MIN_PACKET_LEN..=MAX_PACKET_LEN).contains(&length) {
            return Err(TransportError::Protocol(format!(
                "invalid packet length {}",
                length
            )));
        }

        let mut payload = vec![0u8; length as usize];
        reader.read_exact(&mut payload).await?;

        let id = i32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]);
        let kind = i32::from_le_bytes([payload[4], payload[5], payload[6], payload[7]]);
        let body = &payload[8..payload.len() - 2];

        Ok(Self {
            id,
            kind,
            body: String::from_utf8_lossy(body).into_owned(),
        })
    }
}

/// RCON endpoint settings.
#[derive(Debug, Clone)]
pub struct RconClient {
    address: String,
    password: String,
    timeout: Duration,
}

impl RconClient {
    pub fn new(host: &str, port: u16, password: &str, timeout: Duration) -> Self {
        Self {
            address: format!("{}:{}", host, port),
            password: password.to_string(),
            timeout,
        }
    }

    /// Authenticates and runs one command, bounded by the client timeout.
    ///
    /// # Returns
    /// - `Ok(String)` - Reply body, possibly empty
    /// - `Err(TransportError::Unavailable)` - Connection failed or timed out
    /// - `Err(TransportError::AuthenticationFailed)` - Password rejected
    /// - `Err(TransportError::Protocol)` - Malformed reply
    pub async fn execute(&self, command: &str) -> Result<String, TransportError> {
        match tokio::time::timeout(self.timeout, self.session(command)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Unavailable(format!(
                "no RCON reply from {} within {}s",
                self.address,
                self.timeout.as_secs()
            ))),
        }
    }

    async fn session(&self, command: &str) -> Result<String, TransportError> {
        let mut stream = TcpStream::connect(&self.address).await?;

        send(
            &mut stream,
            Packet {
                id: LOGIN_ID,
                kind: PACKET_LOGIN,
                body: self.password.clone(),
            },
        )
        .await?;

        // Some servers send an empty response packet before the auth response.
        loop {
            let reply = Packet::read(&mut stream).await?;
            if reply.id == AUTH_FAILED_ID {
                return Err(TransportError::AuthenticationFailed);
            }
            if reply.kind == PACKET_AUTH_RESPONSE {
                break;
            }
        }

        send(
            &mut stream,
            Packet {
                id: COMMAND_ID,
                kind: PACKET_COMMAND,
                body: command.to_string(),
            },
        )
        .await?;

        let reply = Packet::read(&mut stream).await?;
        if reply.kind != PACKET_RESPONSE || reply.id != COMMAND_ID {
            return Err(TransportError::Protocol(format!(
                "unexpected packet id={} type={}",
                reply.id, reply.kind
            )));
        }

        Ok(reply.body)
    }
}

async fn send(stream: &mut TcpStream, packet: Packet) -> Result<(), TransportError> {
    stream.write_all(&packet.encode()).await?;
    stream.flush().await?;
    Ok(())
}
