//! Algorithm selection for one SRTP stream.

use crate::Error;

/// Length of the session salt, fixed by RFC 3711 (112 bits).
pub const SALT_LEN: usize = 14;

/// Encryption transform selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherKind {
    /// No encryption. The payload travels in the clear.
    None,
    /// AES in counter mode (RFC 3711 §4.1.1).
    AesCm,
    /// AES in F8 mode (RFC 3711 §4.1.2).
    AesF8,
    /// Twofish in counter mode.
    TwofishCm,
    /// Twofish in F8 mode.
    TwofishF8,
}

/// Authentication transform selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthKind {
    /// No authentication tag.
    None,
    /// HMAC-SHA1, truncated (RFC 3711 default).
    HmacSha1,
    /// Keyed Skein-512, truncated.
    SkeinMac,
}

/// Immutable description of the algorithms and key lengths of one stream.
///
/// A policy is shared read-only between the contexts of a session, typically
/// behind an `Arc`. It is validated once at construction; a
/// [`crate::CryptoContext`] built from a policy never re-checks it.
#[derive(Debug, Clone)]
pub struct SrtpPolicy {
    enc: CipherKind,
    auth: AuthKind,
    enc_key_length: usize,
    salt_key_length: usize,
    auth_key_length: usize,
    auth_tag_length: usize,
}

impl SrtpPolicy {
    /// Create a policy from explicit algorithm selectors and lengths.
    pub fn new(
        enc: CipherKind,
        auth: AuthKind,
        enc_key_length: usize,
        salt_key_length: usize,
        auth_key_length: usize,
        auth_tag_length: usize,
    ) -> Result<SrtpPolicy, Error> {
        match enc {
            // The null cipher still keys the AES-CM key derivation function.
            CipherKind::None | CipherKind::AesCm | CipherKind::AesF8 => {
                if enc_key_length != 16 && enc_key_length != 32 {
                    return Err(Error::UnsupportedPolicy(format!(
                        "AES key length {} (must be 16 or 32)",
                        enc_key_length
                    )));
                }
            }
            CipherKind::TwofishCm | CipherKind::TwofishF8 => {
                if enc_key_length != 16 && enc_key_length != 24 && enc_key_length != 32 {
                    return Err(Error::UnsupportedPolicy(format!(
                        "Twofish key length {} (must be 16, 24 or 32)",
                        enc_key_length
                    )));
                }
            }
        }

        if salt_key_length != SALT_LEN {
            return Err(Error::UnsupportedPolicy(format!(
                "salt length {} (must be {})",
                salt_key_length, SALT_LEN
            )));
        }

        match auth {
            AuthKind::None => {
                if auth_tag_length != 0 {
                    return Err(Error::UnsupportedPolicy(
                        "tag length without authentication".to_string(),
                    ));
                }
            }
            AuthKind::HmacSha1 => {
                if auth_key_length == 0 || auth_tag_length == 0 || auth_tag_length > 20 {
                    return Err(Error::UnsupportedPolicy(format!(
                        "HMAC-SHA1 key/tag lengths {}/{}",
                        auth_key_length, auth_tag_length
                    )));
                }
            }
            AuthKind::SkeinMac => {
                if auth_key_length == 0 || auth_tag_length == 0 || auth_tag_length > 64 {
                    return Err(Error::UnsupportedPolicy(format!(
                        "Skein key/tag lengths {}/{}",
                        auth_key_length, auth_tag_length
                    )));
                }
            }
        }

        Ok(SrtpPolicy {
            enc,
            auth,
            enc_key_length,
            salt_key_length,
            auth_key_length,
            auth_tag_length,
        })
    }

    /// AES-128 counter mode with an 80-bit HMAC-SHA1 tag.
    ///
    /// The default WebRTC/SDES profile (`SRTP_AES128_CM_SHA1_80`).
    pub fn aes_cm_128_hmac_sha1_80() -> SrtpPolicy {
        SrtpPolicy {
            enc: CipherKind::AesCm,
            auth: AuthKind::HmacSha1,
            enc_key_length: 16,
            salt_key_length: SALT_LEN,
            auth_key_length: 20,
            auth_tag_length: 10,
        }
    }

    /// AES-128 counter mode with a 32-bit HMAC-SHA1 tag.
    pub fn aes_cm_128_hmac_sha1_32() -> SrtpPolicy {
        SrtpPolicy {
            auth_tag_length: 4,
            ..Self::aes_cm_128_hmac_sha1_80()
        }
    }

    /// AES-128 F8 mode with an 80-bit HMAC-SHA1 tag.
    pub fn aes_f8_128_hmac_sha1_80() -> SrtpPolicy {
        SrtpPolicy {
            enc: CipherKind::AesF8,
            ..Self::aes_cm_128_hmac_sha1_80()
        }
    }

    /// Twofish-128 counter mode with a 64-bit Skein tag.
    pub fn twofish_cm_128_skein_64() -> SrtpPolicy {
        SrtpPolicy {
            enc: CipherKind::TwofishCm,
            auth: AuthKind::SkeinMac,
            enc_key_length: 16,
            salt_key_length: SALT_LEN,
            auth_key_length: 32,
            auth_tag_length: 8,
        }
    }

    /// The encryption transform.
    #[inline(always)]
    pub fn enc_type(&self) -> CipherKind {
        self.enc
    }

    /// The authentication transform.
    #[inline(always)]
    pub fn auth_type(&self) -> AuthKind {
        self.auth
    }

    /// Encryption key length in bytes.
    #[inline(always)]
    pub fn enc_key_length(&self) -> usize {
        self.enc_key_length
    }

    /// Session salt length in bytes.
    #[inline(always)]
    pub fn salt_key_length(&self) -> usize {
        self.salt_key_length
    }

    /// Authentication key length in bytes.
    #[inline(always)]
    pub fn auth_key_length(&self) -> usize {
        self.auth_key_length
    }

    /// Authentication tag length in bytes, after truncation.
    #[inline(always)]
    pub fn auth_tag_length(&self) -> usize {
        self.auth_tag_length
    }
}
