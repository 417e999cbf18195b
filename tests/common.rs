#![allow(unused)]

use std::sync::Arc;

use simpl::{CryptoContext, RtpPacket, SrtpPolicy};

/// 32 bytes so the same material serves 128- and 256-bit policies; each
/// context copies the prefix its policy asks for.
pub const MASTER_KEY: [u8; 32] = [
    0xE1, 0xF9, 0x7A, 0x0D, 0x3E, 0x01, 0x8B, 0xE0, //
    0xD6, 0x4F, 0xA3, 0x2C, 0x06, 0xDE, 0x41, 0x39, //
    0x0B, 0xE4, 0x21, 0x53, 0x77, 0x95, 0x08, 0x1C, //
    0x61, 0x3A, 0xD2, 0xF0, 0x4C, 0x8E, 0x9A, 0x25,
];

pub const MASTER_SALT: [u8; 14] = [
    0x0E, 0xC6, 0x75, 0xAD, 0x49, 0x8A, 0xFE, 0xEB, //
    0xB6, 0x96, 0x0B, 0x3A, 0xAB, 0xE6,
];

pub const SSRC: u32 = 0x4011_CAFE;

/// Sender/receiver pair sharing master material, both ready for packets.
pub fn pair(policy: SrtpPolicy) -> (CryptoContext, CryptoContext) {
    let policy = Arc::new(policy);

    let mut tx =
        CryptoContext::new(SSRC, 0, 0, &MASTER_KEY, &MASTER_SALT, policy.clone()).unwrap();
    let mut rx = CryptoContext::new(SSRC, 0, 0, &MASTER_KEY, &MASTER_SALT, policy).unwrap();

    tx.derive_srtp_keys(0);
    rx.derive_srtp_keys(0);

    (tx, rx)
}

/// A minimal RTP packet: fixed 12-byte header plus payload.
pub fn rtp_packet(ssrc: u32, seq: u16, payload: &[u8]) -> RtpPacket {
    let mut buf = vec![0u8; 12];
    buf[0] = 0x80;
    buf[1] = 96;
    buf[2..4].copy_from_slice(&seq.to_be_bytes());
    buf[4..8].copy_from_slice(&(seq as u32).wrapping_mul(160).to_be_bytes());
    buf[8..12].copy_from_slice(&ssrc.to_be_bytes());
    buf.extend_from_slice(payload);
    RtpPacket::new(buf)
}

/// Protect `payload` under `tx` and hand the wire bytes to `rx`.
///
/// Returns what the receiver made of it: `None` when rejected, the
/// recovered payload when accepted.
pub fn send_one(
    tx: &mut CryptoContext,
    rx: &mut CryptoContext,
    seq: u16,
    payload: &[u8],
) -> Option<Vec<u8>> {
    let mut pkt = rtp_packet(SSRC, seq, payload);
    tx.protect(&mut pkt).unwrap();

    if !rx.unprotect(&mut pkt).unwrap() {
        return None;
    }
    Some(pkt.as_slice()[12..].to_vec())
}
