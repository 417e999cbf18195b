//! Replay protection across the 64-packet window.

mod common;

use common::*;

use simpl::{RtpPacket, SrtpPolicy};

#[test]
fn out_of_order_accepted_once_replays_rejected() {
    let (mut tx, mut rx) = pair(SrtpPolicy::aes_cm_128_hmac_sha1_80());

    // Protect in wire order, deliver 5, 3, 4.
    let mut p3 = rtp_packet(SSRC, 3, b"three");
    let mut p4 = rtp_packet(SSRC, 4, b"four");
    let mut p5 = rtp_packet(SSRC, 5, b"five");
    tx.protect(&mut p3).unwrap();
    tx.protect(&mut p4).unwrap();
    tx.protect(&mut p5).unwrap();

    let (w3, w4, w5) = (p3.clone(), p4.clone(), p5.clone());

    assert!(rx.unprotect(&mut p5).unwrap());
    assert!(rx.unprotect(&mut p3).unwrap());
    assert!(rx.unprotect(&mut p4).unwrap());

    // Replaying any of them is rejected.
    for wire in [w3, w4, w5] {
        let mut replayed = wire.clone();
        assert!(!rx.unprotect(&mut replayed).unwrap());
    }

    // The replays must not have wedged the stream.
    let mut p6 = rtp_packet(SSRC, 6, b"six");
    tx.protect(&mut p6).unwrap();
    assert!(rx.unprotect(&mut p6).unwrap());
}

#[test]
fn window_edge_is_exactly_64() {
    let (mut tx, mut rx) = pair(SrtpPolicy::aes_cm_128_hmac_sha1_80());

    let mut protect = |seq: u16| {
        let mut pkt = rtp_packet(SSRC, seq, b"x");
        tx.protect(&mut pkt).unwrap();
        pkt
    };

    // Establish the index at 0x0100.
    let mut head = protect(0x0100);
    assert!(rx.unprotect(&mut head).unwrap());

    // 65 behind the newest index: too old.
    let mut too_old = protect(0x00BF);
    assert!(!rx.unprotect(&mut too_old).unwrap());

    // 63 behind and never seen: accepted.
    let mut edge = protect(0x00C1);
    assert!(rx.unprotect(&mut edge).unwrap());
}

#[test]
fn any_order_within_window_is_accepted_exactly_once() {
    let (mut tx, mut rx) = pair(SrtpPolicy::aes_cm_128_hmac_sha1_80());

    let mut wire: Vec<RtpPacket> = Vec::new();
    for seq in 100..164u16 {
        let mut pkt = rtp_packet(SSRC, seq, b"window");
        tx.protect(&mut pkt).unwrap();
        wire.push(pkt);
    }

    // Deliver the 64 packets in a scrambled order (stride 7 walks all of
    // 0..64); every one lands within the window of the max seen so far.
    for i in 0..64usize {
        let mut pkt = wire[i * 7 % 64].clone();
        assert!(rx.unprotect(&mut pkt).unwrap(), "packet {} rejected", i);
    }

    // Second delivery: every single one is a replay now.
    for (i, pkt) in wire.iter().enumerate() {
        let mut replayed = pkt.clone();
        assert!(!rx.unprotect(&mut replayed).unwrap(), "packet {} replayed", i);
    }
}

#[test]
fn forged_packet_does_not_close_the_window() {
    let (mut tx, mut rx) = pair(SrtpPolicy::aes_cm_128_hmac_sha1_80());

    let mut first = rtp_packet(SSRC, 10, b"legit");
    tx.protect(&mut first).unwrap();
    assert!(rx.unprotect(&mut first).unwrap());

    // An attacker races the real seq 11 with a garbage tag.
    let mut forged = rtp_packet(SSRC, 11, b"forged");
    forged.append(&[0u8; 10]);
    assert!(!rx.unprotect(&mut forged).unwrap());

    // The real packet must still get through.
    let mut real = rtp_packet(SSRC, 11, b"legit 11");
    tx.protect(&mut real).unwrap();
    assert!(rx.unprotect(&mut real).unwrap());
}
