use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncrypt, KeyInit};
use aes::{Aes128, Aes256};
use twofish::Twofish;

use crate::policy::CipherKind;
use crate::Error;

/// Block size shared by AES and Twofish.
pub const BLOCK_LEN: usize = 16;

/// A block cipher keyed for encryption.
///
/// Dispatch is a closed enum rather than a trait object: the set of ciphers
/// is fixed by [`CipherKind`] and the per-block call sits on the hot path.
pub enum BlockCipher {
    /// AES with a 128-bit key.
    Aes128(Aes128),
    /// AES with a 256-bit key.
    Aes256(Aes256),
    /// Twofish (128/192/256-bit key).
    Twofish(Twofish),
}

impl BlockCipher {
    /// Key a cipher of the kind the policy selects.
    ///
    /// For `CipherKind::None` this keys AES, the default PRF of the key
    /// derivation function (RFC 3711 §4.3.2); no packet cipher is built.
    pub fn new(kind: CipherKind, key: &[u8]) -> Result<BlockCipher, Error> {
        match kind {
            CipherKind::None | CipherKind::AesCm | CipherKind::AesF8 => match key.len() {
                16 => Aes128::new_from_slice(key)
                    .map(BlockCipher::Aes128)
                    .map_err(|_| bad_key(kind, key.len())),
                32 => Aes256::new_from_slice(key)
                    .map(BlockCipher::Aes256)
                    .map_err(|_| bad_key(kind, key.len())),
                n => Err(bad_key(kind, n)),
            },
            CipherKind::TwofishCm | CipherKind::TwofishF8 => Twofish::new_from_slice(key)
                .map(BlockCipher::Twofish)
                .map_err(|_| bad_key(kind, key.len())),
        }
    }

    /// Encrypt one 16-byte block in place.
    pub fn encrypt_block(&self, block: &mut [u8; BLOCK_LEN]) {
        let block = GenericArray::from_mut_slice(block);
        match self {
            BlockCipher::Aes128(c) => c.encrypt_block(block),
            BlockCipher::Aes256(c) => c.encrypt_block(block),
            BlockCipher::Twofish(c) => c.encrypt_block(block),
        }
    }

    /// The cipher block size in bytes.
    pub fn block_size(&self) -> usize {
        BLOCK_LEN
    }
}

fn bad_key(kind: CipherKind, len: usize) -> Error {
    Error::UnsupportedPolicy(format!("{:?} cannot take a {}-byte key", kind, len))
}
