//! Framed wire codec: 4-byte big-endian length prefix + bincode payload.
//!
//! One frame carries exactly one [`Message`]. The decoder buffers
//! partial input and never assumes a single read delivers a full
//! frame; a declared length of zero is a protocol error, not an
//! empty message.

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::PulseError;
use crate::message::Message;

/// Size of the length prefix on every frame.
pub const LENGTH_PREFIX: usize = 4;

/// Upper bound on a frame payload. The four message kinds are tiny;
/// anything near this limit is a corrupt or hostile peer.
pub const MAX_FRAME_SIZE: usize = 64 * 1024;

/// Symmetric codec used by both client and server.
#[derive(Debug, Default)]
pub struct PulseCodec;

impl Decoder for PulseCodec {
    type Item = Message;
    type Error = PulseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < LENGTH_PREFIX {
            return Ok(None);
        }

        let declared =
            u32::from_be_bytes(src[..LENGTH_PREFIX].try_into().expect("4-byte slice")) as usize;
        if declared == 0 {
            return Err(PulseError::ZeroLengthFrame);
        }
        if declared > MAX_FRAME_SIZE {
            return Err(PulseError::FrameTooLarge {
                size: declared,
                max: MAX_FRAME_SIZE,
            });
        }

        if src.len() < LENGTH_PREFIX + declared {
            // Partial frame — reserve what the rest will need and wait.
            src.reserve(LENGTH_PREFIX + declared - src.len());
            return Ok(None);
        }

        src.advance(LENGTH_PREFIX);
        let payload = src.split_to(declared);
        let message = bincode::deserialize(&payload)
            .map_err(|e| PulseError::MalformedMessage(e.to_string()))?;
        Ok(Some(message))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(message) => Ok(Some(message)),
            // Clean close at a frame boundary.
            None if src.is_empty() => Ok(None),
            None => Err(PulseError::TruncatedFrame {
                buffered: src.len(),
            }),
        }
    }
}

impl Encoder<Message> for PulseCodec {
    type Error = PulseError;

    fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let payload = bincode::serialize(&item)?;
        if payload.len() > MAX_FRAME_SIZE {
            return Err(PulseError::FrameTooLarge {
                size: payload.len(),
                max: MAX_FRAME_SIZE,
            });
        }
        dst.reserve(LENGTH_PREFIX + payload.len());
        dst.put_u32(payload.len() as u32);
        dst.extend_from_slice(&payload);
        Ok(())
    }
}
