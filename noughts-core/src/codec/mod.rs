//! `tokio_util` codec that frames one [`Move`] per message.
//!
//! A frame is a [`FrameHeader`] followed by the bincode-encoded move.
//! The decoder only yields a move once the whole frame is buffered, so
//! callers never observe a partially decoded move.

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::NoughtsError;
use crate::header::{FrameHeader, HEADER_SIZE};
use crate::message::Move;

/// Upper bound on a frame payload. A move encodes to a single byte.
pub const MAX_PAYLOAD_SIZE: usize = 64;

/// Codec for [`Move`] frames.
#[derive(Debug, Default, Clone, Copy)]
pub struct MoveCodec;

impl Decoder for MoveCodec {
    type Item = Move;
    type Error = NoughtsError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < HEADER_SIZE {
            return Ok(None);
        }

        let header = FrameHeader::decode(&src[..HEADER_SIZE])?;
        let payload_length = header.payload_length();
        if payload_length > MAX_PAYLOAD_SIZE {
            return Err(NoughtsError::PayloadTooLarge {
                size: payload_length,
                max: MAX_PAYLOAD_SIZE,
            });
        }

        let frame_length = HEADER_SIZE + payload_length;
        if src.len() < frame_length {
            src.reserve(frame_length - src.len());
            return Ok(None);
        }

        src.advance(HEADER_SIZE);
        let payload = src.split_to(payload_length);
        if !header.verify(&payload) {
            return Err(NoughtsError::ChecksumMismatch);
        }

        let raw: Move = bincode::deserialize(&payload)?;
        // Re-validate: the derive does not know the board bounds.
        let mv = Move::new(raw.cell())?;
        Ok(Some(mv))
    }
}

impl Encoder<Move> for MoveCodec {
    type Error = NoughtsError;

    fn encode(&mut self, item: Move, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let payload = bincode::serialize(&item)?;
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(NoughtsError::PayloadTooLarge {
                size: payload.len(),
                max: MAX_PAYLOAD_SIZE,
            });
        }

        let header = FrameHeader::for_payload(&payload);
        dst.reserve(HEADER_SIZE + payload.len());
        dst.extend_from_slice(&header.encode());
        dst.extend_from_slice(&payload);
        Ok(())
    }
}
