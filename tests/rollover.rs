//! Roll-over counter behavior across 16-bit sequence wraparound.

mod common;

use common::*;

use simpl::SrtpPolicy;

#[test]
fn first_256_sequences_leave_roc_untouched() {
    let (mut tx, mut rx) = pair(SrtpPolicy::aes_cm_128_hmac_sha1_80());

    for seq in 0x0000..=0x00FFu16 {
        let payload = seq.to_be_bytes();
        let recovered = send_one(&mut tx, &mut rx, seq, &payload).expect("accepted");
        assert_eq!(recovered, payload);
    }

    assert_eq!(tx.roc(), 0);
    assert_eq!(rx.roc(), 0);
}

#[test]
fn wraparound_increments_roc_on_both_sides() {
    let (mut tx, mut rx) = pair(SrtpPolicy::aes_cm_128_hmac_sha1_80());

    assert!(send_one(&mut tx, &mut rx, 0xFFFE, b"before").is_some());
    assert_eq!(tx.roc(), 0);

    // The wrapping packet itself is still protected under ROC 0 ...
    assert!(send_one(&mut tx, &mut rx, 0xFFFF, b"wrap").is_some());
    // ... and the counter moves the moment it leaves.
    assert_eq!(tx.roc(), 1);
    assert_eq!(rx.roc(), 0);

    // Index of the next packet is 0x0001_0000: the receiver promotes its
    // ROC when it accepts it.
    assert!(send_one(&mut tx, &mut rx, 0x0000, b"after").is_some());
    assert_eq!(rx.roc(), 1);
}

#[test]
fn late_packet_from_previous_rollover_is_accepted() {
    let (mut tx, mut rx) = pair(SrtpPolicy::aes_cm_128_hmac_sha1_80());

    let mut before = rtp_packet(SSRC, 0xFFFE, b"in order");
    let mut wrap = rtp_packet(SSRC, 0xFFFF, b"straggler");
    let mut after = rtp_packet(SSRC, 0x0000, b"new era");
    tx.protect(&mut before).unwrap();
    tx.protect(&mut wrap).unwrap();
    tx.protect(&mut after).unwrap();

    assert!(rx.unprotect(&mut before).unwrap());

    // 0x0000 overtakes 0xFFFF on the network.
    assert!(rx.unprotect(&mut after).unwrap());
    assert_eq!(rx.roc(), 1);
    assert_eq!(&after.as_slice()[12..], b"new era");

    // The straggler belongs to the earlier roll-over. It is accepted and
    // decrypted under ROC 0 while the receiver's ROC stays promoted.
    assert!(rx.unprotect(&mut wrap).unwrap());
    assert_eq!(&wrap.as_slice()[12..], b"straggler");
    assert_eq!(rx.roc(), 1);

    // And it cannot be replayed.
    assert!(!rx.unprotect(&mut wrap).unwrap());
}

#[test]
fn contexts_can_start_at_a_nonzero_roc() {
    use simpl::CryptoContext;
    use std::sync::Arc;

    let policy = Arc::new(SrtpPolicy::aes_cm_128_hmac_sha1_80());
    let mut tx =
        CryptoContext::new(SSRC, 5, 0, &MASTER_KEY, &MASTER_SALT, policy.clone()).unwrap();
    let mut rx = CryptoContext::new(SSRC, 5, 0, &MASTER_KEY, &MASTER_SALT, policy).unwrap();
    tx.derive_srtp_keys(0);
    rx.derive_srtp_keys(0);

    let mut pkt = rtp_packet(SSRC, 1000, b"mid-stream join");
    tx.protect(&mut pkt).unwrap();
    assert!(rx.unprotect(&mut pkt).unwrap());
    assert_eq!(&pkt.as_slice()[12..], b"mid-stream join");
    assert_eq!(rx.roc(), 5);
}
