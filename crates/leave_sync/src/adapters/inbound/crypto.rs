// Event callback cryptography of the Lark open platform.
//
// - Encrypted bodies: base64(iv || AES-256-CBC(plaintext)), key = SHA-256(encrypt key).
// - Signatures: hex(SHA-256(timestamp + nonce + encrypt key + raw body)).

use aes::cipher::block_padding::NoPadding;
use aes::cipher::{BlockDecryptMut, KeyIvInit};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;

type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

const IV_LEN: usize = 16;

#[derive(Debug, Error)]
pub enum DecryptError {
    #[error("encrypted body is not base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("encrypted body too short ({0} bytes)")]
    TooShort(usize),

    #[error("cipher text is not a whole number of blocks")]
    Cipher,

    #[error("decrypted body holds no JSON object")]
    NoJsonObject,
}

/// Decrypts an `encrypt` field and returns the JSON object it wraps.
pub fn decrypt(encrypted: &str, encrypt_key: &str) -> Result<Vec<u8>, DecryptError> {
    let raw = BASE64.decode(encrypted.trim())?;
    if raw.len() <= IV_LEN {
        return Err(DecryptError::TooShort(raw.len()));
    }
    let (iv, ciphertext) = raw.split_at(IV_LEN);
    let key = Sha256::digest(encrypt_key.as_bytes());

    let plaintext = Aes256CbcDec::new_from_slices(&key, iv)
        .map_err(|_| DecryptError::Cipher)?
        .decrypt_padded_vec_mut::<NoPadding>(ciphertext)
        .map_err(|_| DecryptError::Cipher)?;

    let start = plaintext.iter().position(|b| *b == b'{');
    let end = plaintext.iter().rposition(|b| *b == b'}');
    match (start, end) {
        (Some(start), Some(end)) if start < end => Ok(plaintext[start..=end].to_vec()),
        _ => Err(DecryptError::NoJsonObject),
    }
}

pub fn signature(timestamp: &str, nonce: &str, encrypt_key: &str, body: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(timestamp.as_bytes());
    hasher.update(nonce.as_bytes());
    hasher.update(encrypt_key.as_bytes());
    hasher.update(body);
    format!("{:x}", hasher.finalize())
}

pub fn verify_signature(
    timestamp: &str,
    nonce: &str,
    encrypt_key: &str,
    body: &[u8],
    expected: &str,
) -> bool {
    let computed = signature(timestamp, nonce, encrypt_key, body);
    let expected = expected.trim().to_ascii_lowercase();
    bool::from(computed.as_bytes().ct_eq(expected.as_bytes()))
}


#[cfg(test)]
mod crypto_tests {
    use super::test_cipher::encrypt;
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn it_should_decrypt_an_encrypted_event() {
        let body = br#"{"schema":"2.0","header":{"event_type":"leave_approval"}}"#;
        let encrypted = encrypt(body, "kudryavka");

        let decrypted = decrypt(&encrypted, "kudryavka").unwrap();

        assert_eq!(decrypted, body.to_vec());
    }

    #[rstest]
    fn it_should_not_yield_json_with_the_wrong_key() {
        let encrypted = encrypt(br#"{"type":"url_verification"}"#, "right");
        let decrypted = decrypt(&encrypted, "wrong");
        assert!(match decrypted {
            Ok(bytes) => serde_json::from_slice::<serde_json::Value>(&bytes).is_err(),
            Err(_) => true,
        });
    }

    #[rstest]
    #[case("%%%", "base64")]
    #[case("AAAA", "too short")]
    #[case("AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA==", "blocks")]
    fn it_should_reject_a_malformed_encrypted_body(#[case] encrypted: &str, #[case] reason: &str) {
        let error = decrypt(encrypted, "key").unwrap_err();
        assert!(error.to_string().contains(reason), "{error}");
    }

    #[rstest]
    fn it_should_compute_the_callback_signature() {
        let expected = format!(
            "{:x}",
            Sha256::digest(b"1700000000nonce-1secret{\"a\":1}")
        );
        assert_eq!(signature("1700000000", "nonce-1", "secret", br#"{"a":1}"#), expected);
        assert!(verify_signature(
            "1700000000",
            "nonce-1",
            "secret",
            br#"{"a":1}"#,
            &expected.to_uppercase()
        ));
        assert!(!verify_signature("1700000000", "nonce-2", "secret", br#"{"a":1}"#, &expected));
    }

    #[rstest]
    #[case::truncated(63)]
    #[case::single_char(1)]
    #[case::empty(0)]
    fn it_should_reject_a_signature_prefix(#[case] len: usize) {
        let full = signature("1700000000", "nonce-1", "secret", br#"{"a":1}"#);
        assert!(!verify_signature(
            "1700000000",
            "nonce-1",
            "secret",
            br#"{"a":1}"#,
            &full[..len]
        ));
    }

    #[test]
    fn it_should_reject_a_signature_with_trailing_bytes() {
        let full = signature("1700000000", "nonce-1", "secret", br#"{"a":1}"#);
        assert!(!verify_signature(
            "1700000000",
            "nonce-1",
            "secret",
            br#"{"a":1}"#,
            &format!("{full}00")
        ));
    }
}
