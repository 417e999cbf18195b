//! F8 mode keystream generation (RFC 3711 §4.1.2).
//!
//! F8 runs two cipher instances. The inner one is keyed once, at key
//! derivation time, with the session key XORed against the session salt
//! padded with 0x55; per packet it encrypts the IV into IV'. The outer one
//! is keyed with the session key and produces the stream
//! `S(j) = E(IV' ^ j ^ S(j-1))` with `S(-1) = 0` and `j` a big-endian
//! 32-bit block counter in the low four bytes.

use super::{BlockCipher, BLOCK_LEN};
use crate::buffer::KeyBuf;

/// The inner cipher's key: `session_key ^ (salt || 0x55 padding)`.
///
/// Computed once during key derivation, before the session key is wiped.
pub fn masked_key(session_key: &[u8], salt: &[u8]) -> KeyBuf {
    let mut masked = KeyBuf::from_slice(session_key);
    for (i, b) in masked.iter_mut().enumerate() {
        *b ^= if i < salt.len() { salt[i] } else { 0x55 };
    }
    masked
}

/// XOR the F8 keystream over `data` in place.
pub fn xor_in_place(outer: &BlockCipher, inner: &BlockCipher, iv: &[u8; 16], data: &mut [u8]) {
    let mut iv_accent = *iv;
    inner.encrypt_block(&mut iv_accent);

    // stream carries S(j-1) between rounds.
    let mut stream = [0u8; BLOCK_LEN];
    let mut j: u32 = 0;

    for chunk in data.chunks_mut(BLOCK_LEN) {
        for (s, a) in stream.iter_mut().zip(iv_accent.iter()) {
            *s ^= a;
        }
        for (s, c) in stream[BLOCK_LEN - 4..].iter_mut().zip(j.to_be_bytes()) {
            *s ^= c;
        }
        outer.encrypt_block(&mut stream);

        for (d, s) in chunk.iter_mut().zip(stream.iter()) {
            *d ^= s;
        }
        j = j.wrapping_add(1);
    }
}
