//! Blocking TCP transport: per-peer frame I/O and the version-sniffing
//! handshake.
//!
//! Deliberately built over `std::net` blocking sockets rather than the
//! teacher's `mio`-multiplexed `Endpoint`/`Channel`: the arbiter talks to
//! exactly one player at a time and blocks on that read, so an event loop
//! has no payoff here. See DESIGN.md for the full justification.

use daifugo_wire::{decode_u32, encode_u32, Table, WireError, FRAME_BYTES, LEGACY_PROTOCOL_VERSION};
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::time::Duration;

/// Bounded interval the listener waits for a profile frame before treating
/// the peer as a legacy client. Matches the original's `HANDSHAKE_TIMEOUT`.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_millis(2500);

#[derive(Debug, thiserror::Error)]
pub enum NetError {
    #[error(transparent)]
    Wire(#[from] WireError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("connection closed by peer")]
    ConnectionClosed,
}

fn is_timeout(err: &io::Error) -> bool {
    matches!(err.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}

/// One peer's socket, framed in terms of the wire protocol's two frame
/// shapes: the 480-byte table and the bare u32.
pub struct Connection {
    stream: TcpStream,
}

impl Connection {
    pub fn new(stream: TcpStream) -> Connection {
        Connection { stream }
    }

    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        self.stream.peer_addr()
    }

    pub fn try_clone(&self) -> io::Result<Connection> {
        Ok(Connection {
            stream: self.stream.try_clone()?,
        })
    }

    pub fn shutdown(&self) -> io::Result<()> {
        self.stream.shutdown(std::net::Shutdown::Both)
    }

    /// Reads exactly `len` bytes, looping over partial reads. A zero-byte
    /// read means the peer closed the socket: fatal, per spec.md §5.
    fn read_exact_frame(&mut self, len: usize) -> Result<Vec<u8>, NetError> {
        let mut buf = vec![0u8; len];
        let mut read = 0;
        while read < len {
            let n = self.stream.read(&mut buf[read..])?;
            if n == 0 {
                return Err(NetError::ConnectionClosed);
            }
            read += n;
        }
        Ok(buf)
    }

    pub fn read_table(&mut self) -> Result<Table, NetError> {
        let buf = self.read_exact_frame(FRAME_BYTES)?;
        Ok(Table::decode(&buf)?)
    }

    pub fn write_table(&mut self, table: &Table) -> Result<(), NetError> {
        self.stream.write_all(&table.encode())?;
        Ok(())
    }

    pub fn read_u32(&mut self) -> Result<u32, NetError> {
        let buf = self.read_exact_frame(4)?;
        Ok(decode_u32(&buf)?)
    }

    pub fn write_u32(&mut self, value: u32) -> Result<(), NetError> {
        self.stream.write_all(&encode_u32(value as i32))?;
        Ok(())
    }

    /// Attempts a full profile-table read bounded by `timeout`. Returns
    /// `Ok(None)` if no byte of the frame arrived before the deadline,
    /// matching the original's coarse `socket.timeout` catch-all around the
    /// whole handshake read rather than a per-byte deadline.
    fn try_read_table_with_timeout(&mut self, timeout: Duration) -> Result<Option<Table>, NetError> {
        self.stream.set_read_timeout(Some(timeout))?;
        let mut buf = vec![0u8; FRAME_BYTES];
        let mut read = 0;
        let result = loop {
            match self.stream.read(&mut buf[read..]) {
                Ok(0) => break Err(NetError::ConnectionClosed),
                Ok(n) => {
                    read += n;
                    if read == FRAME_BYTES {
                        break Table::decode(&buf).map(Some).map_err(NetError::from);
                    }
                }
                Err(e) if is_timeout(&e) => break Ok(None),
                Err(e) => break Err(NetError::Io(e)),
            }
        };
        self.stream.set_read_timeout(None)?;
        result
    }
}

/// A connected peer's version and display name, established at handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub protocol_version: u32,
    pub name: String,
}

impl Profile {
    fn from_table(table: &Table) -> Profile {
        let protocol_version = table.get(0, 0) as u32;
        let mut bytes = Vec::new();
        for col in 0..14 {
            let value = table.get(1, col);
            if value == 0 {
                break;
            }
            bytes.push(value as u8);
        }
        Profile {
            protocol_version,
            name: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    fn legacy(player_id: u32) -> Profile {
        Profile {
            protocol_version: LEGACY_PROTOCOL_VERSION,
            name: format!("Player{}", player_id),
        }
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.set(0, 0, self.protocol_version as i32);
        for (col, byte) in self.name.bytes().take(14).enumerate() {
            table.set(1, col, byte as i32);
        }
        table
    }
}

pub struct Handshake {
    pub connection: Connection,
    pub profile: Profile,
}

/// Serial accept loop: the next accept blocks until the previous peer has
/// been handed a player id.
pub struct Listener {
    listener: TcpListener,
}

impl Listener {
    pub fn bind(addr: SocketAddr) -> io::Result<Listener> {
        Ok(Listener {
            listener: TcpListener::bind(addr)?,
        })
    }

    /// Accepts one peer and performs the version-sniffing handshake,
    /// assigning it `player_id`. A handshake failure (short read, closed
    /// socket) is reported to the caller, who aborts the whole session per
    /// spec.md §4.2.
    pub fn accept_and_handshake(&self, player_id: u32) -> Result<Handshake, NetError> {
        let (stream, _addr) = self.listener.accept()?;
        let mut connection = Connection::new(stream);
        let profile = match connection.try_read_table_with_timeout(HANDSHAKE_TIMEOUT)? {
            Some(table) => Profile::from_table(&table),
            None => Profile::legacy(player_id),
        };
        connection.write_u32(player_id)?;
        Ok(Handshake {
            connection,
            profile,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpStream as StdTcpStream;

    #[test]
    fn profile_round_trips_through_table() {
        let profile = Profile {
            protocol_version: daifugo_wire::PROTOCOL_VERSION,
            name: "Alice".to_string(),
        };
        let table = profile.to_table();
        let back = Profile::from_table(&table);
        assert_eq!(profile, back);
    }

    #[test]
    fn legacy_profile_uses_synthetic_name_and_version() {
        let profile = Profile::legacy(3);
        assert_eq!(profile.name, "Player3");
        assert_eq!(profile.protocol_version, LEGACY_PROTOCOL_VERSION);
    }

    #[test]
    fn full_handshake_round_trip_over_loopback() {
        let listener = Listener::bind("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.listener.local_addr().unwrap();

        let client = std::thread::spawn(move || -> io::Result<()> {
            let mut stream = StdTcpStream::connect(addr)?;
            let profile = Profile {
                protocol_version: daifugo_wire::PROTOCOL_VERSION,
                name: "Bob".to_string(),
            };
            stream.write_all(&profile.to_table().encode())?;
            let mut id_buf = [0u8; 4];
            stream.read_exact(&mut id_buf)?;
            assert_eq!(decode_u32(&id_buf).unwrap(), 2);
            Ok(())
        });

        let handshake = listener.accept_and_handshake(2).unwrap();
        assert_eq!(handshake.profile.name, "Bob");
        client.join().unwrap().unwrap();
    }
}
