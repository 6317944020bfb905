//! Field-level AES-256-CBC encryption with a fixed key and IV.
//!
//! Encryption is deterministic: the same plaintext always produces the same
//! ciphertext, which is what allows equality lookups on encrypted columns
//! (finding a user by encrypted email). The cost is that equal values are
//! visible as equal to anyone with database access. Do not switch to
//! per-call random IVs without also replacing the lookup strategy.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

pub const KEY_LEN: usize = 32;
pub const IV_LEN: usize = 16;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),
    #[error("invalid ciphertext: {0}")]
    InvalidCiphertext(String),
    #[error("ciphertext must not be empty")]
    NullInput,
}

/// Encrypts and decrypts individual string fields for at-rest storage.
#[derive(Clone)]
#[cfg_attr(test, derive(Debug))]
pub struct FieldCipher {
    key: [u8; KEY_LEN],
    iv: [u8; IV_LEN],
}

impl FieldCipher {
    pub fn new(key: &[u8], iv: &[u8]) -> Result<Self, CryptoError> {
        let key: [u8; KEY_LEN] = key.try_into().map_err(|_| {
            CryptoError::InvalidKeyMaterial(format!(
                "key must be {KEY_LEN} bytes, got {}",
                key.len()
            ))
        })?;
        let iv: [u8; IV_LEN] = iv.try_into().map_err(|_| {
            CryptoError::InvalidKeyMaterial(format!("iv must be {IV_LEN} bytes, got {}", iv.len()))
        })?;
        Ok(Self { key, iv })
    }

    /// Build from the base64 form used in configuration.
    pub fn from_base64(key_b64: &str, iv_b64: &str) -> Result<Self, CryptoError> {
        let key = BASE64
            .decode(key_b64)
            .map_err(|e| CryptoError::InvalidKeyMaterial(format!("key is not valid base64: {e}")))?;
        let iv = BASE64
            .decode(iv_b64)
            .map_err(|e| CryptoError::InvalidKeyMaterial(format!("iv is not valid base64: {e}")))?;
        Self::new(&key, &iv)
    }

    /// Encrypt a field value to standard base64. Infallible for any input;
    /// the empty string yields one full padding block.
    pub fn encrypt(&self, plaintext: &str) -> String {
        let ciphertext = Aes256CbcEnc::new(&self.key.into(), &self.iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
        BASE64.encode(ciphertext)
    }

    /// Inverse of [`encrypt`](Self::encrypt). An empty input is rejected as
    /// [`CryptoError::NullInput`]; the ciphertext of the empty string is
    /// non-empty and decrypts to `""`.
    pub fn decrypt(&self, ciphertext: &str) -> Result<String, CryptoError> {
        if ciphertext.is_empty() {
            return Err(CryptoError::NullInput);
        }
        let raw = BASE64
            .decode(ciphertext)
            .map_err(|e| CryptoError::InvalidCiphertext(format!("not valid base64: {e}")))?;
        let plaintext = Aes256CbcDec::new(&self.key.into(), &self.iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(&raw)
            .map_err(|_| CryptoError::InvalidCiphertext("bad block padding".into()))?;
        String::from_utf8(plaintext)
            .map_err(|e| CryptoError::InvalidCiphertext(format!("not valid utf-8: {e}")))
    }
}

/// Fresh random key material, base64-encoded, for provisioning dev and test
/// environments.
pub fn generate_key_iv() -> (String, String) {
    let mut key = [0u8; KEY_LEN];
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut key);
    OsRng.fill_bytes(&mut iv);
    (BASE64.encode(key), BASE64.encode(iv))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> FieldCipher {
        FieldCipher::new(&[7u8; KEY_LEN], &[3u8; IV_LEN]).expect("valid key material")
    }

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let c = cipher();
        for s in ["a@b.com", "Ayrton Senna", "héllo wörld 🏁", ""] {
            let ct = c.encrypt(s);
            assert!(!ct.is_empty());
            assert_eq!(c.decrypt(&ct).expect("decrypt should succeed"), s);
        }
    }

    #[test]
    fn encrypt_is_deterministic() {
        let c = cipher();
        assert_eq!(c.encrypt("a@b.com"), c.encrypt("a@b.com"));
    }

    #[test]
    fn ciphertext_differs_from_plaintext() {
        assert_ne!(cipher().encrypt("a@b.com"), "a@b.com");
    }

    #[test]
    fn empty_string_encrypts_to_one_padding_block() {
        let c = cipher();
        let ct = c.encrypt("");
        let raw = BASE64.decode(&ct).expect("valid base64");
        assert_eq!(raw.len(), 16);
        assert_eq!(c.decrypt(&ct).expect("decrypt should succeed"), "");
    }

    #[test]
    fn rejects_short_key_material() {
        let err = FieldCipher::new(&[0u8; 16], &[0u8; IV_LEN]).unwrap_err();
        assert!(matches!(err, CryptoError::InvalidKeyMaterial(_)));
        let err = FieldCipher::new(&[0u8; KEY_LEN], &[0u8; 8]).unwrap_err();
        assert!(matches!(err, CryptoError::InvalidKeyMaterial(_)));
    }

    #[test]
    fn from_base64_rejects_garbage_key() {
        let err = FieldCipher::from_base64("not base64!!!", "AAAAAAAAAAAAAAAAAAAAAA==").unwrap_err();
        assert!(matches!(err, CryptoError::InvalidKeyMaterial(_)));
    }

    #[test]
    fn decrypt_rejects_empty_input() {
        let err = cipher().decrypt("").unwrap_err();
        assert!(matches!(err, CryptoError::NullInput));
    }

    #[test]
    fn decrypt_rejects_invalid_base64() {
        let err = cipher().decrypt("%%%not-base64%%%").unwrap_err();
        assert!(matches!(err, CryptoError::InvalidCiphertext(_)));
    }

    #[test]
    fn decrypt_rejects_partial_block() {
        // "YWJj" decodes to 3 bytes, not a whole cipher block
        let err = cipher().decrypt("YWJj").unwrap_err();
        assert!(matches!(err, CryptoError::InvalidCiphertext(_)));
    }

    #[test]
    fn different_keys_produce_different_ciphertext() {
        let a = FieldCipher::new(&[1u8; KEY_LEN], &[0u8; IV_LEN]).expect("valid key material");
        let b = FieldCipher::new(&[2u8; KEY_LEN], &[0u8; IV_LEN]).expect("valid key material");
        assert_ne!(a.encrypt("a@b.com"), b.encrypt("a@b.com"));
    }

    #[test]
    fn generated_key_iv_is_usable() {
        let (key_b64, iv_b64) = generate_key_iv();
        let c = FieldCipher::from_base64(&key_b64, &iv_b64).expect("generated material is valid");
        assert_eq!(c.decrypt(&c.encrypt("x")).expect("roundtrip"), "x");
    }
}
