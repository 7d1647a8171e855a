//! # Transport Layer
//!
//! Async TCP transport carrying length-prefixed frames. One transport per
//! connection; reads and writes carry deadlines so a stalled peer is
//! indistinguishable from a disconnected one.

use std::net::SocketAddr;

use bytes::Bytes;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{timeout, Duration};

use crate::error::{ProtocolError, ProtocolResult};
use crate::frame::{read_frame, write_frame, FRAME_HEADER_SIZE};

/// Connection timeout
const CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Read timeout
const READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Write timeout
const WRITE_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport connection wrapping a TCP stream
pub struct Transport {
    /// The underlying TCP stream
    stream: TcpStream,
    /// Peer address
    peer_addr: SocketAddr,
    /// Local address
    local_addr: SocketAddr,
    /// Bytes sent
    bytes_sent: u64,
    /// Bytes received
    bytes_received: u64,
}

impl Transport {
    /// Create a transport from an existing TCP stream
    pub fn new(stream: TcpStream) -> ProtocolResult<Self> {
        let peer_addr = stream.peer_addr()?;
        let local_addr = stream.local_addr()?;

        Ok(Self {
            stream,
            peer_addr,
            local_addr,
            bytes_sent: 0,
            bytes_received: 0,
        })
    }

    /// Connect to a remote address
    pub async fn connect(addr: SocketAddr) -> ProtocolResult<Self> {
        let stream = timeout(CONNECTION_TIMEOUT, TcpStream::connect(addr))
            .await
            .map_err(|_| ProtocolError::Timeout(CONNECTION_TIMEOUT.as_secs()))?
            .map_err(ProtocolError::Io)?;

        stream.set_nodelay(true)?;

        Self::new(stream)
    }

    /// Get the peer address
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Get the local address
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Get bytes sent
    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }

    /// Get bytes received
    pub fn bytes_received(&self) -> u64 {
        self.bytes_received
    }

    /// Send one frame
    pub async fn send_frame(&mut self, payload: &[u8]) -> ProtocolResult<()> {
        timeout(WRITE_TIMEOUT, write_frame(&mut self.stream, payload))
            .await
            .map_err(|_| ProtocolError::Timeout(WRITE_TIMEOUT.as_secs()))??;

        self.bytes_sent += (FRAME_HEADER_SIZE + payload.len()) as u64;

        Ok(())
    }

    /// Receive one complete frame
    pub async fn recv_frame(&mut self) -> ProtocolResult<Bytes> {
        let payload = timeout(READ_TIMEOUT, read_frame(&mut self.stream))
            .await
            .map_err(|_| ProtocolError::Timeout(READ_TIMEOUT.as_secs()))??;

        self.bytes_received += (FRAME_HEADER_SIZE + payload.len()) as u64;

        Ok(payload)
    }
}

/// TCP listener wrapper
pub struct TransportListener {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl TransportListener {
    /// Bind to an address
    pub async fn bind(addr: SocketAddr) -> ProtocolResult<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;

        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Get the local address
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accept a new connection
    pub async fn accept(&self) -> ProtocolResult<(Transport, SocketAddr)> {
        let (stream, addr) = self.listener.accept().await?;
        stream.set_nodelay(true)?;
        let transport = Transport::new(stream)?;
        Ok((transport, addr))
    }
}
