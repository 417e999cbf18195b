use hmac::{Hmac, Mac, SimpleHmac};
use sha1::Sha1;
use skein::consts::U64;
use skein::Skein512;

use crate::policy::AuthKind;

type HmacSha1 = Hmac<Sha1>;
type SkeinMac = SimpleHmac<Skein512<U64>>;

/// Uniform wrapper over the supported packet MACs.
///
/// The adapter is keyed once per key derivation and then reused for every
/// packet: `update` calls feed the packet and the serialized roll-over
/// counter, `finalize_into` writes the tag and resets for the next packet.
/// Truncation to the policy's tag length happens in the context at append
/// and compare time, not here.
pub enum MacAdapter {
    /// HMAC-SHA1, 20 byte native output.
    HmacSha1(HmacSha1),
    /// Keyed Skein-512, 64 byte native output.
    Skein(SkeinMac),
}

impl MacAdapter {
    /// Key a MAC of the given kind. `AuthKind::None` has no MAC.
    pub fn new(kind: AuthKind, key: &[u8]) -> Option<MacAdapter> {
        match kind {
            AuthKind::None => None,
            AuthKind::HmacSha1 => Some(MacAdapter::HmacSha1(
                HmacSha1::new_from_slice(key).expect("HMAC accepts any key length"),
            )),
            AuthKind::SkeinMac => Some(MacAdapter::Skein(
                SkeinMac::new_from_slice(key).expect("HMAC accepts any key length"),
            )),
        }
    }

    /// Feed packet bytes.
    pub fn update(&mut self, data: &[u8]) {
        match self {
            MacAdapter::HmacSha1(m) => m.update(data),
            MacAdapter::Skein(m) => m.update(data),
        }
    }

    /// Write the first `out.len()` bytes of the tag into `out` and reset.
    ///
    /// `out` must not exceed the native output length; the policy check at
    /// construction guarantees that.
    pub fn finalize_into(&mut self, out: &mut [u8]) {
        match self {
            MacAdapter::HmacSha1(m) => {
                let tag = m.finalize_reset().into_bytes();
                out.copy_from_slice(&tag[..out.len()]);
            }
            MacAdapter::Skein(m) => {
                let tag = m.finalize_reset().into_bytes();
                out.copy_from_slice(&tag[..out.len()]);
            }
        }
    }
}
