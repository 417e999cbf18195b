//! The per-source SRTP cryptographic context.

use std::sync::Arc;

use subtle::ConstantTimeEq;

use crate::buffer::KeyBuf;
use crate::crypto::{ctr, f8, BlockCipher, MacAdapter};
use crate::packet::{RtpHeader, RtpPacket};
use crate::policy::{AuthKind, CipherKind, SrtpPolicy, SALT_LEN};
use crate::window::ReplayWindow;
use crate::Error;

/// Key derivation labels (RFC 3711 §4.3.1).
const LABEL_ENCRYPTION: u8 = 0x00;
const LABEL_AUTHENTICATION: u8 = 0x01;
const LABEL_SALT: u8 = 0x02;

/// Crypto state for one direction of one RTP synchronization source.
///
/// The context owns the master material for its SSRC, derives session keys
/// from it, tracks the 48-bit packet index across 16-bit sequence number
/// wraparounds, and applies the policy's encryption and authentication
/// transforms. One instance protects exactly one SSRC in one direction and
/// must be driven by one thread at a time; contexts for different SSRCs are
/// independent.
///
/// Lifecycle: [`CryptoContext::new`] constructs a fresh context holding
/// master material, [`CryptoContext::derive_srtp_keys`] turns it into
/// session keys (zeroizing the master material), after which
/// [`CryptoContext::protect`] and [`CryptoContext::unprotect`] transform
/// packets in place. Additional SSRCs fork off via
/// [`CryptoContext::derive_context`] *before* the first derivation.
pub struct CryptoContext {
    ssrc: u32,
    roc: u32,
    guessed_roc: u32,
    seq_num: u16,
    seq_num_set: bool,
    kdr: u64,
    replay: ReplayWindow,
    derived: bool,

    master_key: KeyBuf,
    master_salt: KeyBuf,
    enc_key: KeyBuf,
    auth_key: KeyBuf,
    salt_key: KeyBuf,

    cipher: Option<BlockCipher>,
    /// Inner cipher for F8 IV masking, keyed during derivation.
    cipher_f8: Option<BlockCipher>,
    mac: Option<MacAdapter>,

    policy: Arc<SrtpPolicy>,

    // Scratch, allocated once. protect/unprotect never allocate.
    tag_store: Vec<u8>,
    tmp_store: [u8; 64],
    iv_store: [u8; 16],
    rb_store: [u8; 4],
}

impl CryptoContext {
    /// Construct a fresh context.
    ///
    /// `roc` is the initial roll-over counter (the upper 32 bits of the
    /// 48-bit packet index) and `kdr` the key derivation rate, where 0
    /// means session keys are derived once. Master key and salt are copied
    /// in; the caller keeps ownership of its slices.
    pub fn new(
        ssrc: u32,
        roc: u32,
        kdr: u64,
        master_key: &[u8],
        master_salt: &[u8],
        policy: Arc<SrtpPolicy>,
    ) -> Result<CryptoContext, Error> {
        if master_key.len() < policy.enc_key_length() {
            return Err(Error::UnsupportedPolicy(format!(
                "master key is {} bytes, policy needs {}",
                master_key.len(),
                policy.enc_key_length()
            )));
        }
        if master_salt.len() < policy.salt_key_length() {
            return Err(Error::UnsupportedPolicy(format!(
                "master salt is {} bytes, policy needs {}",
                master_salt.len(),
                policy.salt_key_length()
            )));
        }

        // HMAC-SHA1 always produces its native tag; Skein is parameterized
        // down to the configured tag length.
        let tag_len = match policy.auth_type() {
            AuthKind::None => 0,
            AuthKind::HmacSha1 => 20,
            AuthKind::SkeinMac => policy.auth_tag_length(),
        };

        Ok(CryptoContext {
            ssrc,
            roc,
            guessed_roc: 0,
            seq_num: 0,
            seq_num_set: false,
            kdr,
            replay: ReplayWindow::new(),
            derived: false,
            master_key: KeyBuf::from_slice(&master_key[..policy.enc_key_length()]),
            master_salt: KeyBuf::from_slice(&master_salt[..policy.salt_key_length()]),
            enc_key: KeyBuf::zeroed(policy.enc_key_length()),
            auth_key: KeyBuf::zeroed(policy.auth_key_length()),
            salt_key: KeyBuf::zeroed(policy.salt_key_length()),
            cipher: None,
            cipher_f8: None,
            mac: None,
            tag_store: vec![0; tag_len],
            tmp_store: [0; 64],
            iv_store: [0; 16],
            rb_store: [0; 4],
            policy,
        })
    }

    /// Derive session encryption, authentication and salt keys
    /// (RFC 3711 §4.3) for the given 48-bit packet index.
    ///
    /// Consumes the master material: once the session keys are loaded into
    /// the cipher and MAC instances, the master key, master salt and the
    /// derived key buffers are zero-filled. A second call is a no-op.
    pub fn derive_srtp_keys(&mut self, index: u64) {
        if self.derived {
            return;
        }

        // The KDF is the counter mode PRF keyed with the master key. The
        // master key leaves its buffer as soon as the cipher holds it.
        let kdf = BlockCipher::new(self.policy.enc_type(), &self.master_key)
            .expect("policy validated at construction");
        self.master_key.wipe();

        self.compute_label_iv(LABEL_ENCRYPTION, index);
        ctr::keystream(&kdf, &self.iv_store, &mut self.enc_key);

        if self.policy.auth_type() != AuthKind::None {
            self.compute_label_iv(LABEL_AUTHENTICATION, index);
            ctr::keystream(&kdf, &self.iv_store, &mut self.auth_key);
            self.mac = MacAdapter::new(self.policy.auth_type(), &self.auth_key);
            self.auth_key.wipe();
        }

        self.compute_label_iv(LABEL_SALT, index);
        ctr::keystream(&kdf, &self.iv_store, &mut self.salt_key);
        self.master_salt.wipe();

        match self.policy.enc_type() {
            CipherKind::None => self.enc_key.wipe(),
            kind @ (CipherKind::AesF8 | CipherKind::TwofishF8) => {
                let masked = f8::masked_key(&self.enc_key, &self.salt_key);
                self.cipher_f8 = Some(
                    BlockCipher::new(kind, &masked).expect("policy validated at construction"),
                );
                self.cipher = Some(
                    BlockCipher::new(kind, &self.enc_key)
                        .expect("policy validated at construction"),
                );
                self.enc_key.wipe();
            }
            kind => {
                self.cipher = Some(
                    BlockCipher::new(kind, &self.enc_key)
                        .expect("policy validated at construction"),
                );
                self.enc_key.wipe();
            }
        }

        self.derived = true;
        trace!("derived session keys for ssrc {:#010x}", self.ssrc);
    }

    /// Transform an RTP packet into an SRTP packet in place.
    ///
    /// Encrypts the payload, appends the truncated authentication tag and
    /// advances the roll-over counter when the sequence number wraps.
    /// Packets must be submitted in wire order.
    pub fn protect(&mut self, pkt: &mut RtpPacket) -> Result<(), Error> {
        if !self.derived {
            return Err(Error::NotDerived);
        }

        let header = pkt.header()?;

        match self.policy.enc_type() {
            CipherKind::AesCm | CipherKind::TwofishCm => {
                self.ctr_transform(pkt, &header, self.roc)
            }
            CipherKind::AesF8 | CipherKind::TwofishF8 => self.f8_transform(pkt, &header, self.roc),
            CipherKind::None => {}
        }

        if self.mac.is_some() {
            self.authenticate(pkt, self.roc);
            pkt.append(&self.tag_store[..self.policy.auth_tag_length()]);
        }

        // The packet that wraps the sequence is still protected under the
        // pre-increment counter; the new value applies from the next packet.
        if header.sequence_number == 0xFFFF {
            self.roc = self.roc.wrapping_add(1);
        }

        Ok(())
    }

    /// Transform a received SRTP packet back into an RTP packet in place.
    ///
    /// Returns `Ok(false)` and leaves the index state untouched when the
    /// packet is a replay, outside the 64-packet window, or fails
    /// authentication. Returns `Ok(true)` after the payload has been
    /// decrypted and the index committed.
    pub fn unprotect(&mut self, pkt: &mut RtpPacket) -> Result<bool, Error> {
        if !self.derived {
            return Err(Error::NotDerived);
        }

        let header = pkt.header()?;
        let seq = header.sequence_number;

        if !self.seq_num_set {
            self.seq_num_set = true;
            self.seq_num = seq;
        }

        let guessed_index = self.guess_index(seq);
        let local_index = ((self.roc as i64) << 16) | self.seq_num as i64;
        let delta = guessed_index - local_index;

        if !self.replay.check(delta) {
            debug!("replay rejected seq {} for ssrc {:#010x}", seq, self.ssrc);
            return Ok(false);
        }

        if self.mac.is_some() {
            let tag_length = self.policy.auth_tag_length();
            if pkt.len() < header.header_length + tag_length {
                return Err(Error::ParseIncomplete);
            }

            // Set the received tag aside and recompute over the shrunk packet.
            pkt.read_region_to(pkt.len() - tag_length, tag_length, &mut self.tmp_store);
            pkt.shrink(tag_length);

            let guessed_roc = self.guessed_roc;
            self.authenticate(pkt, guessed_roc);

            let ok: bool = self.tag_store[..tag_length]
                .ct_eq(&self.tmp_store[..tag_length])
                .into();
            if !ok {
                debug!("auth failed seq {} for ssrc {:#010x}", seq, self.ssrc);
                return Ok(false);
            }
        }

        // Decrypt under the guessed counter, so packets on either side of a
        // wraparound come back with the index they were protected under.
        match self.policy.enc_type() {
            CipherKind::AesCm | CipherKind::TwofishCm => {
                let roc = self.guessed_roc;
                self.ctr_transform(pkt, &header, roc);
            }
            CipherKind::AesF8 | CipherKind::TwofishF8 => {
                let roc = self.guessed_roc;
                self.f8_transform(pkt, &header, roc);
            }
            CipherKind::None => {}
        }

        self.update(seq, delta);

        Ok(true)
    }

    /// Fork a fresh context for another SSRC sharing this context's master
    /// material and policy.
    ///
    /// Must happen before [`CryptoContext::derive_srtp_keys`], which
    /// zeroizes the master material; afterwards this returns
    /// [`Error::MasterKeyConsumed`]. The fork itself must call
    /// `derive_srtp_keys` before use.
    pub fn derive_context(&self, ssrc: u32, roc: u32, kdr: u64) -> Result<CryptoContext, Error> {
        if self.derived {
            return Err(Error::MasterKeyConsumed);
        }
        CryptoContext::new(
            ssrc,
            roc,
            kdr,
            &self.master_key,
            &self.master_salt,
            Arc::clone(&self.policy),
        )
    }

    /// The truncated authentication tag length in bytes.
    pub fn auth_tag_length(&self) -> usize {
        self.policy.auth_tag_length()
    }

    /// The MKI length in bytes. This core does not emit an MKI; always 0.
    pub fn mki_length(&self) -> usize {
        0
    }

    /// The SSRC this context protects.
    pub fn ssrc(&self) -> u32 {
        self.ssrc
    }

    /// The current roll-over counter.
    pub fn roc(&self) -> u32 {
        self.roc
    }

    /// Overwrite the roll-over counter.
    pub fn set_roc(&mut self, roc: u32) {
        self.roc = roc;
    }

    /// IV for the key derivation PRF (RFC 3711 §4.3.1): master salt XOR
    /// `key_id`, where `key_id = (label << 48) | (index / kdr)`.
    fn compute_label_iv(&mut self, label: u8, index: u64) {
        let key_id: u64 = if self.kdr == 0 {
            (label as u64) << 48
        } else {
            ((label as u64) << 48) | (index / self.kdr)
        };

        self.iv_store[..7].copy_from_slice(&self.master_salt[..7]);
        for i in 7..SALT_LEN {
            self.iv_store[i] = ((key_id >> (8 * (13 - i))) & 0xFF) as u8 ^ self.master_salt[i];
        }
        self.iv_store[14] = 0;
        self.iv_store[15] = 0;
    }

    /// Counter mode over the payload (RFC 3711 §4.1.1).
    fn ctr_transform(&mut self, pkt: &mut RtpPacket, header: &RtpHeader, roc: u32) {
        let index: u64 = ((roc as u64) << 16) | header.sequence_number as u64;

        // IV = salt XOR (0 || SSRC || index), block counter bytes zeroed.
        self.iv_store[..4].copy_from_slice(&self.salt_key[..4]);
        for (i, b) in header.ssrc.to_be_bytes().into_iter().enumerate() {
            self.iv_store[4 + i] = b ^ self.salt_key[4 + i];
        }
        for i in 0..6 {
            self.iv_store[8 + i] = ((index >> (8 * (5 - i))) & 0xFF) as u8 ^ self.salt_key[8 + i];
        }
        self.iv_store[14] = 0;
        self.iv_store[15] = 0;

        let payload = &mut pkt.as_mut_slice()[header.header_length..];
        // Unwrap is OK: a derived context with a CM policy holds a cipher.
        let cipher = self.cipher.as_ref().unwrap();
        ctr::xor_in_place(cipher, &self.iv_store, payload);
    }

    /// F8 mode over the payload (RFC 3711 §4.1.2).
    fn f8_transform(&mut self, pkt: &mut RtpPacket, header: &RtpHeader, roc: u32) {
        // IV = first 12 header bytes with byte 0 zeroed, then the ROC.
        self.iv_store[..12].copy_from_slice(&pkt.as_slice()[..12]);
        self.iv_store[0] = 0;
        self.iv_store[12..].copy_from_slice(&roc.to_be_bytes());

        let payload = &mut pkt.as_mut_slice()[header.header_length..];
        // Unwrap is OK: a derived context with an F8 policy holds both ciphers.
        let outer = self.cipher.as_ref().unwrap();
        let inner = self.cipher_f8.as_ref().unwrap();
        f8::xor_in_place(outer, inner, &self.iv_store, payload);
    }

    /// MAC over the whole packet followed by the ROC, into `tag_store`.
    fn authenticate(&mut self, pkt: &RtpPacket, roc: u32) {
        self.rb_store = roc.to_be_bytes();
        // Unwrap is OK: only called when the policy carries a MAC.
        let mac = self.mac.as_mut().unwrap();
        mac.update(pkt.as_slice());
        mac.update(&self.rb_store);
        mac.finalize_into(&mut self.tag_store);
    }

    /// Guess the 48-bit index of a received sequence (RFC 3711 §3.3.1),
    /// remembering the guessed ROC pending authentication.
    ///
    /// Computed in i64: a guess one roll-over before index zero comes out
    /// negative and falls out of the replay window as too old.
    fn guess_index(&mut self, seq: u16) -> i64 {
        let roc = self.roc as i64;

        let guessed = if self.seq_num < 0x8000 {
            if seq as i64 - self.seq_num as i64 > 0x8000 {
                roc - 1
            } else {
                roc
            }
        } else if self.seq_num as i64 - 0x8000 > seq as i64 {
            roc + 1
        } else {
            roc
        };

        self.guessed_roc = guessed as u32;
        (guessed << 16) | seq as i64
    }

    /// Commit an accepted index (RFC 3711 §3.3.1). Runs only after replay
    /// and authentication checks passed.
    fn update(&mut self, seq: u16, delta: i64) {
        self.replay.commit(delta);

        if seq > self.seq_num {
            self.seq_num = seq;
        }
        if self.guessed_roc > self.roc {
            self.roc = self.guessed_roc;
            self.seq_num = seq;
        }
    }
}
