//! RTP packet buffer and header parsing.
//!
//! The SRTP core transforms packets in place. [`RtpPacket`] is the byte
//! buffer it operates on: the bytes from `offset` to the end are the logical
//! packet, [`RtpPacket::append`] grows it (authentication tag on send) and
//! [`RtpPacket::shrink`] cuts it back (tag removal on receive).

use nom::bytes::complete::take;
use nom::number::complete::{be_u16, be_u32, be_u8};
use nom::{Err, IResult};

use crate::Error;

/// Fixed part of the RTP header: V/P/X/CC, M/PT, sequence, timestamp, SSRC.
pub const RTP_FIXED_HEADER_LEN: usize = 12;

/// Parsed view of an RTP header.
///
/// Only the fields the SRTP transforms need are kept; CSRC entries and
/// extension contents are skipped but counted into `header_length`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtpHeader {
    /// RTP version, must be 2.
    pub version: u8,
    /// Payload type.
    pub payload_type: u8,
    /// 16-bit sequence number.
    pub sequence_number: u16,
    /// RTP timestamp.
    pub timestamp: u32,
    /// Synchronization source.
    pub ssrc: u32,
    /// Total header length: fixed part, CSRC list and extension.
    pub header_length: usize,
}

impl RtpHeader {
    /// Parse the header at the start of `input`.
    pub fn parse(input: &[u8]) -> IResult<&[u8], RtpHeader> {
        let original = input;

        let (input, b0) = be_u8(input)?;
        let (input, b1) = be_u8(input)?;
        let (input, sequence_number) = be_u16(input)?;
        let (input, timestamp) = be_u32(input)?;
        let (input, ssrc) = be_u32(input)?;

        let version = b0 >> 6;
        if version != 2 {
            return Err(Err::Failure(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Tag,
            )));
        }

        let csrc_count = (b0 & 0x0F) as usize;
        let (input, _csrc) = take(csrc_count * 4)(input)?;

        let has_extension = b0 & 0x10 != 0;
        let input = if has_extension {
            let (input, _profile) = be_u16(input)?;
            let (input, words) = be_u16(input)?;
            let (input, _data) = take(words as usize * 4)(input)?;
            input
        } else {
            input
        };

        let header_length = original.len() - input.len();

        Ok((
            input,
            RtpHeader {
                version,
                payload_type: b1 & 0x7F,
                sequence_number,
                timestamp,
                ssrc,
                header_length,
            },
        ))
    }
}

/// A mutable RTP/SRTP packet.
///
/// Wraps the datagram bytes plus the offset at which the RTP header starts
/// (non-zero when the transport keeps its own framing in front).
#[derive(Debug, Clone)]
pub struct RtpPacket {
    buf: Vec<u8>,
    offset: usize,
}

impl RtpPacket {
    /// Wrap a datagram whose RTP header starts at byte 0.
    pub fn new(buf: Vec<u8>) -> Self {
        RtpPacket { buf, offset: 0 }
    }

    /// Wrap a datagram whose RTP header starts at `offset`.
    pub fn with_offset(buf: Vec<u8>, offset: usize) -> Self {
        assert!(offset <= buf.len());
        RtpPacket { buf, offset }
    }

    /// Offset of the RTP header in the backing buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Logical packet length (from the header start to the end).
    pub fn len(&self) -> usize {
        self.buf.len() - self.offset
    }

    /// The logical packet bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[self.offset..]
    }

    /// The logical packet bytes, mutable.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.buf[self.offset..]
    }

    /// Append bytes at the end, growing the packet.
    pub fn append(&mut self, src: &[u8]) {
        self.buf.extend_from_slice(src);
    }

    /// Drop the last `n` bytes.
    pub fn shrink(&mut self, n: usize) {
        let new_len = self.buf.len().saturating_sub(n);
        self.buf.truncate(new_len.max(self.offset));
    }

    /// Copy `n` bytes starting at logical position `at` into `dst`.
    pub fn read_region_to(&self, at: usize, n: usize, dst: &mut [u8]) {
        dst[..n].copy_from_slice(&self.buf[self.offset + at..self.offset + at + n]);
    }

    /// Parse the RTP header.
    pub fn header(&self) -> Result<RtpHeader, Error> {
        let (_, header) = RtpHeader::parse(self.as_slice())?;
        Ok(header)
    }

    /// Consume the packet, returning the backing buffer.
    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }
}
