//! Counter mode keystream generation (RFC 3711 §4.1.1).
//!
//! The 16-byte IV doubles as the counter block: bytes 0-13 are fixed for the
//! whole call and bytes 14-15 are a big-endian block counter starting at 0.
//! The same generator serves two masters: the key derivation function fills
//! zeroed buffers with raw keystream, and packet processing XORs the
//! keystream over the payload in place.

use super::{BlockCipher, BLOCK_LEN};

/// Fill `out` with keystream.
pub fn keystream(cipher: &BlockCipher, iv: &[u8; 16], out: &mut [u8]) {
    let mut block = [0u8; BLOCK_LEN];
    let mut ctr: u16 = 0;

    for chunk in out.chunks_mut(cipher.block_size()) {
        next_block(cipher, iv, ctr, &mut block);
        chunk.copy_from_slice(&block[..chunk.len()]);
        ctr = ctr.wrapping_add(1);
    }
}

/// XOR keystream over `data` in place.
///
/// Applying this twice with the same IV is the identity, which is the whole
/// of counter-mode decryption.
pub fn xor_in_place(cipher: &BlockCipher, iv: &[u8; 16], data: &mut [u8]) {
    let mut block = [0u8; BLOCK_LEN];
    let mut ctr: u16 = 0;

    for chunk in data.chunks_mut(BLOCK_LEN) {
        next_block(cipher, iv, ctr, &mut block);
        for (d, k) in chunk.iter_mut().zip(block.iter()) {
            *d ^= k;
        }
        ctr = ctr.wrapping_add(1);
    }
}

fn next_block(cipher: &BlockCipher, iv: &[u8; 16], ctr: u16, block: &mut [u8; BLOCK_LEN]) {
    block[..14].copy_from_slice(&iv[..14]);
    block[14..].copy_from_slice(&ctr.to_be_bytes());
    cipher.encrypt_block(block);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::CipherKind;

    // RFC 3711 appendix B.2: AES-CM keystream segment.
    const SESSION_KEY: [u8; 16] = [
        0x2B, 0x7E, 0x15, 0x16, 0x28, 0xAE, 0xD2, 0xA6, //
        0xAB, 0xF7, 0x15, 0x88, 0x09, 0xCF, 0x4F, 0x3C,
    ];
    const IV: [u8; 16] = [
        0xF0, 0xF1, 0xF2, 0xF3, 0xF4, 0xF5, 0xF6, 0xF7, //
        0xF8, 0xF9, 0xFA, 0xFB, 0xFC, 0xFD, 0x00, 0x00,
    ];
    const KEYSTREAM: [u8; 32] = [
        0xE0, 0x3E, 0xAD, 0x09, 0x35, 0xC9, 0x5E, 0x80, //
        0xE1, 0x66, 0xB1, 0x6D, 0xD9, 0x2B, 0x4E, 0xB4, //
        0xD2, 0x35, 0x13, 0x16, 0x2B, 0x02, 0xD0, 0xF7, //
        0x2A, 0x43, 0xA2, 0xFE, 0x4A, 0x5F, 0x97, 0xAB,
    ];

    #[test]
    fn rfc3711_b2_keystream() {
        let cipher = BlockCipher::new(CipherKind::AesCm, &SESSION_KEY).unwrap();
        let mut out = [0u8; 32];
        keystream(&cipher, &IV, &mut out);
        assert_eq!(out, KEYSTREAM);
    }

    #[test]
    fn partial_block_keystream() {
        let cipher = BlockCipher::new(CipherKind::AesCm, &SESSION_KEY).unwrap();
        let mut out = [0u8; 21];
        keystream(&cipher, &IV, &mut out);
        assert_eq!(out, KEYSTREAM[..21]);
    }

    #[test]
    fn xor_twice_is_identity() {
        let cipher = BlockCipher::new(CipherKind::AesCm, &SESSION_KEY).unwrap();
        let mut data = *b"some not very secret payload";
        let orig = data;
        xor_in_place(&cipher, &IV, &mut data);
        assert_ne!(data, orig);
        xor_in_place(&cipher, &IV, &mut data);
        assert_eq!(data, orig);
    }

    #[test]
    fn xor_matches_keystream() {
        let cipher = BlockCipher::new(CipherKind::AesCm, &SESSION_KEY).unwrap();
        let mut data = [0u8; 32];
        xor_in_place(&cipher, &IV, &mut data);
        assert_eq!(data, KEYSTREAM);
    }
}
