// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM seal/open of short secrets.
//!
//! Blobs are laid out as `nonce (12) || ciphertext || tag (16)`. Every call
//! to [`encrypt`] draws a fresh nonce from the system CSPRNG.

use lockbox_core::{CryptoError, LockboxError};
use ring::aead::{AES_256_GCM, Aad, LessSafeKey, NONCE_LEN, Nonce, UnboundKey};
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

/// AES-256 key size in bytes.
pub const KEY_LEN: usize = 32;

/// GCM authentication tag size in bytes.
pub const TAG_LEN: usize = 16;

/// A validated 256-bit key. The bytes are wiped on drop.
#[derive(Clone)]
pub struct EncryptionKey(Zeroizing<[u8; KEY_LEN]>);

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EncryptionKey([REDACTED])")
    }
}

impl EncryptionKey {
    /// Use `bytes` verbatim as the key. No derivation is performed.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let key: [u8; KEY_LEN] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidKeyLength {
                expected: KEY_LEN,
                actual: bytes.len(),
            })?;
        Ok(Self(Zeroizing::new(key)))
    }

    /// Generate a random key.
    pub fn generate() -> Result<Self, LockboxError> {
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        SystemRandom::new()
            .fill(&mut key[..])
            .map_err(|_| LockboxError::Internal("failed to generate random key".into()))?;
        Ok(Self(key))
    }

    fn aead(&self) -> Result<LessSafeKey, CryptoError> {
        let unbound = UnboundKey::new(&AES_256_GCM, &self.0[..]).map_err(|_| {
            CryptoError::InvalidKeyLength {
                expected: KEY_LEN,
                actual: self.0.len(),
            }
        })?;
        Ok(LessSafeKey::new(unbound))
    }
}

/// Encrypt `plaintext`, returning `nonce || ciphertext_with_tag`.
pub fn encrypt(plaintext: &[u8], key: &EncryptionKey) -> Result<Vec<u8>, LockboxError> {
    let aead = key.aead()?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    SystemRandom::new()
        .fill(&mut nonce_bytes)
        .map_err(|_| LockboxError::Internal("failed to generate random nonce".into()))?;

    let mut in_out = plaintext.to_vec();
    aead.seal_in_place_append_tag(
        Nonce::assume_unique_for_key(nonce_bytes),
        Aad::empty(),
        &mut in_out,
    )
    .map_err(|_| LockboxError::Internal("AES-256-GCM encryption failed".into()))?;

    let mut blob = Vec::with_capacity(NONCE_LEN + in_out.len());
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&in_out);
    Ok(blob)
}

/// Authenticate and decrypt a blob produced by [`encrypt`].
///
/// Truncated input, a wrong key and tampering all fail with
/// [`CryptoError::AuthenticationFailed`].
pub fn decrypt(blob: &[u8], key: &EncryptionKey) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let aead = key.aead()?;

    if blob.len() < NONCE_LEN + TAG_LEN {
        return Err(CryptoError::AuthenticationFailed);
    }
    let (nonce_bytes, sealed) = blob.split_at(NONCE_LEN);
    let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)
        .map_err(|_| CryptoError::AuthenticationFailed)?;

    let mut in_out = Zeroizing::new(sealed.to_vec());
    let len = aead
        .open_in_place(nonce, Aad::empty(), &mut in_out[..])
        .map_err(|_| CryptoError::AuthenticationFailed)?
        .len();
    in_out.truncate(len);
    Ok(in_out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn key() -> EncryptionKey {
        EncryptionKey::generate().unwrap()
    }

    #[test]
    fn roundtrip() {
        let key = key();
        let blob = encrypt(b"p@ss", &key).unwrap();
        assert_eq!(decrypt(&blob, &key).unwrap().as_slice(), b"p@ss");
    }

    #[test]
    fn blob_layout_is_nonce_ciphertext_tag() {
        let blob = encrypt(b"hello", &key()).unwrap();
        assert_eq!(blob.len(), NONCE_LEN + 5 + TAG_LEN);
    }

    #[test]
    fn same_plaintext_encrypts_differently() {
        let key = key();
        let a = encrypt(b"same input twice", &key).unwrap();
        let b = encrypt(b"same input twice", &key).unwrap();
        assert_ne!(a[..NONCE_LEN], b[..NONCE_LEN]);
        assert_ne!(a, b);
    }

    #[test]
    fn tampered_blob_fails_authentication() {
        let key = key();
        let mut blob = encrypt(b"do not tamper", &key).unwrap();
        let last = blob.len() - 1;
        blob[last] ^= 0x01;
        assert_eq!(
            decrypt(&blob, &key).unwrap_err(),
            CryptoError::AuthenticationFailed
        );
    }

    #[test]
    fn truncated_blob_fails_authentication() {
        let key = key();
        let blob = encrypt(b"x", &key).unwrap();
        for len in [0, 5, NONCE_LEN, NONCE_LEN + TAG_LEN] {
            assert_eq!(
                decrypt(&blob[..len], &key).unwrap_err(),
                CryptoError::AuthenticationFailed,
                "length {len}"
            );
        }
    }

    #[test]
    fn empty_plaintext_roundtrips() {
        let key = key();
        let blob = encrypt(b"", &key).unwrap();
        assert!(decrypt(&blob, &key).unwrap().is_empty());
    }

    #[test]
    fn wrong_key_length_is_rejected() {
        for len in [0usize, 16, 31, 33, 64] {
            let err = EncryptionKey::from_bytes(&vec![7u8; len]).unwrap_err();
            assert_eq!(
                err,
                CryptoError::InvalidKeyLength {
                    expected: KEY_LEN,
                    actual: len
                }
            );
        }
    }

    #[test]
    fn key_debug_is_redacted() {
        let key = EncryptionKey::from_bytes(b"0123456789abcdef0123456789abcdef").unwrap();
        assert_eq!(format!("{key:?}"), "EncryptionKey([REDACTED])");
    }

    proptest! {
        #[test]
        fn decrypt_inverts_encrypt(
            plaintext in proptest::collection::vec(any::<u8>(), 0..512),
            raw in proptest::array::uniform32(any::<u8>()),
        ) {
            let key = EncryptionKey::from_bytes(&raw).unwrap();
            let blob = encrypt(&plaintext, &key).unwrap();
            let out = decrypt(&blob, &key).unwrap();
            prop_assert_eq!(out.as_slice(), plaintext.as_slice());
        }

        #[test]
        fn other_key_fails_authentication(
            plaintext in proptest::collection::vec(any::<u8>(), 0..128),
            raw1 in proptest::array::uniform32(any::<u8>()),
            raw2 in proptest::array::uniform32(any::<u8>()),
        ) {
            prop_assume!(raw1 != raw2);
            let key1 = EncryptionKey::from_bytes(&raw1).unwrap();
            let key2 = EncryptionKey::from_bytes(&raw2).unwrap();
            let blob = encrypt(&plaintext, &key1).unwrap();
            prop_assert_eq!(decrypt(&blob, &key2).unwrap_err(), CryptoError::AuthenticationFailed);
        }
    }
}
