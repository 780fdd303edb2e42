//! Reversible password obfuscation for pool files.
//!
//! This is not encryption. It keeps passwords out of plain sight in the
//! token file and guarantees the stored value is delimiter-free hex.

use anyhow::{bail, Context, Result};
use zeroize::Zeroizing;

pub trait Obfuscator {
    fn encrypt(&self, plaintext: &str) -> String;
    fn decrypt(&self, ciphertext: &str) -> Result<Zeroizing<String>>;
}

/// Repeating-key XOR, hex encoded.
pub struct XorObfuscator {
    key: Zeroizing<Vec<u8>>,
}

impl XorObfuscator {
    pub fn new(key: &str) -> Result<Self> {
        if key.is_empty() {
            bail!("obfuscation key cannot be empty");
        }
        Ok(Self {
            key: Zeroizing::new(key.as_bytes().to_vec()),
        })
    }

    fn apply(&self, data: &mut [u8]) {
        for (b, k) in data.iter_mut().zip(self.key.iter().cycle()) {
            *b ^= k;
        }
    }
}

impl Obfuscator for XorObfuscator {
    fn encrypt(&self, plaintext: &str) -> String {
        let mut bytes = Zeroizing::new(plaintext.as_bytes().to_vec());
        self.apply(&mut bytes);
        hex::encode(&*bytes)
    }

    fn decrypt(&self, ciphertext: &str) -> Result<Zeroizing<String>> {
        let mut bytes = Zeroizing::new(hex::decode(ciphertext).context("decode obfuscated value")?);
        self.apply(&mut bytes);
        let plain = String::from_utf8(bytes.to_vec()).context("obfuscated value is not utf-8")?;
        Ok(Zeroizing::new(plain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let ob = XorObfuscator::new("k3y").unwrap();
        let hidden = ob.encrypt("s3cr3t:with:colons");
        assert_ne!(hidden, "s3cr3t:with:colons");
        assert!(hidden.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(ob.decrypt(&hidden).unwrap().as_str(), "s3cr3t:with:colons");
    }

    #[test]
    fn test_wrong_key_does_not_reveal() {
        let hidden = XorObfuscator::new("one").unwrap().encrypt("password");
        let other = XorObfuscator::new("two").unwrap();
        match other.decrypt(&hidden) {
            Ok(plain) => assert_ne!(plain.as_str(), "password"),
            Err(_) => {}
        }
    }

    #[test]
    fn test_empty_key_rejected() {
        assert!(XorObfuscator::new("").is_err());
    }

    #[test]
    fn test_invalid_hex_rejected() {
        let ob = XorObfuscator::new("k").unwrap();
        assert!(ob.decrypt("zz").is_err());
    }
}
