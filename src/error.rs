/// Errors raised by the SRTP core.
///
/// Replay rejection and authentication failure are not errors: they are
/// reported as `Ok(false)` from [`crate::CryptoContext::unprotect`] and the
/// packet is discarded by the caller.
#[derive(Debug)]
pub enum Error {
    /// The RTP header could not be parsed because the input ended early.
    ParseIncomplete,
    /// The RTP header could not be parsed.
    ParseError(nom::error::ErrorKind),
    /// The policy names an algorithm/key-length combination the
    /// implementation does not support.
    UnsupportedPolicy(String),
    /// `protect`/`unprotect` called before `derive_srtp_keys`.
    NotDerived,
    /// `derive_context` called after `derive_srtp_keys` already zeroized
    /// the master material. Fork new SSRC contexts before deriving.
    MasterKeyConsumed,
}

impl<'a> From<nom::Err<nom::error::Error<&'a [u8]>>> for Error {
    fn from(value: nom::Err<nom::error::Error<&'a [u8]>>) -> Self {
        match value {
            nom::Err::Incomplete(_) => Error::ParseIncomplete,
            nom::Err::Error(x) => Error::ParseError(x.code),
            nom::Err::Failure(x) => Error::ParseError(x.code),
        }
    }
}
