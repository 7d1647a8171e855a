//! # Message Framing
//!
//! Wire format for protocol frames:
//!
//! ```text
//! +----------+----------+
//! | Length   | Payload  |
//! | 4 bytes  | variable |
//! +----------+----------+
//! ```
//!
//! The length is a big-endian `u32` counting payload bytes only and must
//! fall in `1..=MAX_FRAME_SIZE`. Reads are two-phase: the header is read
//! and validated before any body byte is consumed, then the body is read
//! to completion. Partial frames are never delivered upward.

use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{ProtocolError, ProtocolResult};
use crate::MAX_FRAME_SIZE;

/// Frame header size in bytes
pub const FRAME_HEADER_SIZE: usize = 4;

fn map_eof(e: std::io::Error) -> ProtocolError {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        ProtocolError::ConnectionClosed
    } else {
        ProtocolError::Io(e)
    }
}

/// Read one complete frame from the stream.
///
/// Returns the frame payload, or an error if the length prefix is out of
/// bounds or either read half completes short.
pub async fn read_frame<S>(stream: &mut S) -> ProtocolResult<Bytes>
where
    S: AsyncRead + Unpin,
{
    let mut header = [0u8; FRAME_HEADER_SIZE];
    stream.read_exact(&mut header).await.map_err(map_eof)?;

    let len = u32::from_be_bytes(header);
    if len == 0 || len as usize > MAX_FRAME_SIZE {
        return Err(ProtocolError::Framing(len));
    }

    let mut body = vec![0u8; len as usize];
    stream.read_exact(&mut body).await.map_err(map_eof)?;

    Ok(Bytes::from(body))
}

/// Write one frame, coalescing header and payload into a single write.
pub async fn write_frame<S>(stream: &mut S, payload: &[u8]) -> ProtocolResult<()>
where
    S: AsyncWrite + Unpin,
{
    if payload.is_empty() || payload.len() > MAX_FRAME_SIZE {
        return Err(ProtocolError::Framing(payload.len() as u32));
    }

    let mut buf = BytesMut::with_capacity(FRAME_HEADER_SIZE + payload.len());
    buf.put_u32(payload.len() as u32);
    buf.put_slice(payload);

    stream.write_all(&buf).await?;
    Ok(())
}
