//! Wire framing for the peer-to-peer channel (spec §6).
//!
//! Scalar framing: `msgid:u32-be | share:u32-be` (8 bytes).
//! Vector framing (width `S`, fixed per channel): `msgid:u32-be | share_1..share_S:u32-be`
//! (`4 + 4*S` bytes).

use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::TransportError;

/// Write one frame: `msgid` followed by exactly `width` shares. `values` is zero-padded or
/// truncated to `width` entries before going on the wire (spec §4.B).
pub async fn write_frame<W: AsyncWriteExt + Unpin>(
    writer: &mut W,
    msgid: u32,
    values: &[u32],
    width: usize,
) -> Result<(), TransportError> {
    let mut buf = Vec::with_capacity(4 + 4 * width);
    buf.extend_from_slice(&msgid.to_be_bytes());
    for i in 0..width {
        let v = values.get(i).copied().unwrap_or(0);
        buf.extend_from_slice(&v.to_be_bytes());
    }
    writer.write_all(&buf).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one frame of `width` shares, returning `(msgid, values)`. An incomplete read (peer
/// closed mid-frame) is reported as [`TransportError::ProtocolAbort`].
pub async fn read_frame<R: AsyncReadExt + Unpin>(
    reader: &mut R,
    width: usize,
) -> Result<(u32, Vec<u32>), TransportError> {
    let mut msgid_buf = [0u8; 4];
    read_exact_or_abort(reader, &mut msgid_buf).await?;
    let msgid = u32::from_be_bytes(msgid_buf);

    let mut values = Vec::with_capacity(width);
    for _ in 0..width {
        let mut buf = [0u8; 4];
        read_exact_or_abort(reader, &mut buf).await?;
        values.push(u32::from_be_bytes(buf));
    }

    Ok((msgid, values))
}

async fn read_exact_or_abort<R: AsyncReadExt + Unpin>(
    reader: &mut R,
    buf: &mut [u8],
) -> Result<(), TransportError> {
    match reader.read_exact(buf).await {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            Err(TransportError::ProtocolAbort {
                reason: "peer closed connection".to_string(),
            })
        }
        Err(e) => Err(e.into()),
    }
}

/// The 17-byte handshake frame: `conn_id:u8 | election_id:u128-be` (spec §6).
pub async fn write_handshake<W: AsyncWriteExt + Unpin>(
    writer: &mut W,
    conn_id: u8,
    election_id: u128,
) -> Result<(), TransportError> {
    let mut buf = [0u8; 17];
    buf[0] = conn_id;
    buf[1..].copy_from_slice(&election_id.to_be_bytes());
    writer.write_all(&buf).await?;
    writer.flush().await?;
    Ok(())
}

pub async fn read_handshake<R: AsyncReadExt + Unpin>(
    reader: &mut R,
) -> Result<(u8, u128), TransportError> {
    let mut buf = [0u8; 17];
    read_exact_or_abort(reader, &mut buf).await?;
    let conn_id = buf[0];
    let election_id = u128::from_be_bytes(buf[1..].try_into().unwrap());
    Ok((conn_id, election_id))
}
