//! simpl — SRTP packet protection (Sans-IO, Sync)
//!
//! simpl is a focused implementation of the SRTP packet transforms
//! ([RFC 3711]) aimed at WebRTC and VoIP stacks. It is the per-source core
//! you embed into your own RTP session handling: one [`CryptoContext`] per
//! SSRC per direction, fed with master key material from your key
//! management (ZRTP, MIKEY, DTLS-SRTP export), transforming packets in
//! place as they pass.
//!
//! # Goals
//! - **RFC 3711 packet transforms**: AES/Twofish in counter and F8 modes,
//!   HMAC-SHA1 and Skein tags, key derivation, index estimation and replay
//!   protection.
//! - **Safety**: `forbid(unsafe_code)` throughout the crate; key material is
//!   zeroized at the points RFC 3711 retires it and when contexts drop.
//! - **Minimal Rust-only deps**: small, well-maintained Rust crypto crates.
//! - **Low overhead**: scratch buffers are allocated once per context;
//!   `protect`/`unprotect` never allocate.
//!
//! ## Non-goals
//! - **Key negotiation** (bring your own ZRTP/MIKEY/DTLS-SRTP)
//! - **SRTCP**
//! - **MKI-based rekeying** (the MKI field is reserved, length 0)
//! - **SSRC demultiplexing** (drive one context per source yourself)
//!
//! # Cryptography surface
//! - **Encryption**: AES-128/256 and Twofish in SRTP counter mode and F8
//!   mode, or none.
//! - **Authentication**: HMAC-SHA1 and keyed Skein-512, truncated to the
//!   policy's tag length, or none.
//! - **Key derivation**: the AES-CM/Twofish-CM PRF of RFC 3711 §4.3 with a
//!   configurable key derivation rate.
//!
//! ## Integration model
//! Construct a [`SrtpPolicy`], build a [`CryptoContext`] per SSRC and
//! direction, call [`CryptoContext::derive_srtp_keys`] once, then pump
//! packets through [`CryptoContext::protect`] / [`CryptoContext::unprotect`].
//! Everything is synchronous and bounded by the packet size; a context must
//! be driven by one thread at a time, different contexts are independent.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use simpl::{CryptoContext, RtpPacket, SrtpPolicy};
//!
//! let master_key = [7u8; 16];
//! let master_salt = [3u8; 14];
//!
//! let policy = Arc::new(SrtpPolicy::aes_cm_128_hmac_sha1_80());
//!
//! // Sender and receiver share master material out of band.
//! let mut tx = CryptoContext::new(0x1234, 0, 0, &master_key, &master_salt, policy.clone())?;
//! let mut rx = CryptoContext::new(0x1234, 0, 0, &master_key, &master_salt, policy)?;
//! tx.derive_srtp_keys(0);
//! rx.derive_srtp_keys(0);
//!
//! // A minimal RTP packet: 12 byte header, sequence 1, SSRC 0x1234.
//! let mut header = vec![0x80u8, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0x12, 0x34];
//! let payload = b"hello srtp";
//! header.extend_from_slice(payload);
//!
//! let mut pkt = RtpPacket::new(header);
//! tx.protect(&mut pkt)?;
//! assert_ne!(&pkt.as_slice()[12..12 + payload.len()], payload);
//!
//! let accepted = rx.unprotect(&mut pkt)?;
//! assert!(accepted);
//! assert_eq!(&pkt.as_slice()[12..], payload);
//! # Ok::<(), simpl::Error>(())
//! ```
//!
//! ### MSRV
//! Rust 1.81.0
//!
//! ### Status
//! - SRTP only; SRTCP protection is out of scope.
//! - The MKI field is not emitted.
//!
//! [RFC 3711]: https://www.rfc-editor.org/rfc/rfc3711
//!
#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![deny(missing_docs)]

#[macro_use]
extern crate log;

mod buffer;
mod context;
mod crypto;
mod error;
pub mod packet;
mod policy;
mod window;

pub use context::CryptoContext;
pub use error::Error;
pub use packet::{RtpHeader, RtpPacket};
pub use policy::{AuthKind, CipherKind, SrtpPolicy};
