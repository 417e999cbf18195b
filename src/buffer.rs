use std::fmt;
use std::ops::{Deref, DerefMut};

use zeroize::Zeroize;

/// Owned key material.
///
/// The backing memory is zeroized when the buffer is dropped. [`KeyBuf::wipe`]
/// additionally zero-fills in place without changing the length, for the
/// points in the key schedule where a key has been loaded into a cipher or
/// MAC and must not linger in its buffer.
pub struct KeyBuf(Vec<u8>);

impl KeyBuf {
    /// An all-zero buffer of `len` bytes.
    pub fn zeroed(len: usize) -> Self {
        KeyBuf(vec![0; len])
    }

    /// Copy `src` into a fresh buffer.
    pub fn from_slice(src: &[u8]) -> Self {
        KeyBuf(src.to_vec())
    }

    /// Zero-fill in place. The length is unchanged.
    pub fn wipe(&mut self) {
        self.0.as_mut_slice().zeroize();
    }
}

impl Deref for KeyBuf {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for KeyBuf {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl Drop for KeyBuf {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for KeyBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key material.
        f.debug_struct("KeyBuf").field("len", &self.0.len()).finish()
    }
}
