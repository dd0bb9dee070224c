//! Employer signing certificates
//!
//! A [`CertificateContext`] carries everything needed to sign requests on
//! behalf of one employer: the registration id used as the signature `keyId`,
//! the employer registration number, and the password-protected private key.

use crate::config::{CertificateConfig, SecretString};
use crate::domain::errors::{PayeError, SigningError};
use rsa::pkcs8::DecodePrivateKey;
use rsa::RsaPrivateKey;
use secrecy::ExposeSecret;
use std::fmt;
use std::sync::OnceLock;

/// An employer's signing identity
///
/// Read-only after construction. The private key is decrypted on first use
/// and kept for the lifetime of the context.
#[derive(Clone)]
pub struct CertificateContext {
    registration_id: u64,
    employer_number: String,
    name: String,
    secret: SecretString,
    key_pem: String,
    key: OnceLock<RsaPrivateKey>,
}

impl CertificateContext {
    /// Creates a context from an encrypted PKCS#8 PEM document
    pub fn new(
        registration_id: u64,
        employer_number: impl Into<String>,
        name: impl Into<String>,
        secret: SecretString,
        key_pem: impl Into<String>,
    ) -> Self {
        Self {
            registration_id,
            employer_number: employer_number.into(),
            name: name.into(),
            secret,
            key_pem: key_pem.into(),
            key: OnceLock::new(),
        }
    }

    /// Builds a context from a configured certificate, reading the key file
    pub fn from_config(config: &CertificateConfig) -> Result<Self, PayeError> {
        let key_pem = std::fs::read_to_string(&config.key_path).map_err(|e| {
            PayeError::Configuration(format!(
                "Failed to read key file {} for certificate {}: {}",
                config.key_path.display(),
                config.id,
                e
            ))
        })?;

        Ok(Self::new(
            config.id,
            config.employer_number.clone(),
            config.name.clone(),
            config.password.clone(),
            key_pem,
        ))
    }

    /// Registration id, used as the signature `keyId`
    pub fn registration_id(&self) -> u64 {
        self.registration_id
    }

    /// Employer registration number
    pub fn employer_number(&self) -> &str {
        &self.employer_number
    }

    /// Certificate display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the decrypted private key
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::KeyDerivationFailure`] when the secret does not
    /// decrypt the key or the PEM document is malformed.
    pub fn private_key(&self) -> Result<&RsaPrivateKey, SigningError> {
        if let Some(key) = self.key.get() {
            return Ok(key);
        }

        let password = self.secret.expose_secret();
        let key = RsaPrivateKey::from_pkcs8_encrypted_pem(&self.key_pem, password.as_ref().as_bytes())
            .map_err(|e| {
                SigningError::KeyDerivationFailure(format!(
                    "certificate {}: {}",
                    self.registration_id, e
                ))
            })?;

        Ok(self.key.get_or_init(|| key))
    }
}

impl fmt::Debug for CertificateContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateContext")
            .field("registration_id", &self.registration_id)
            .field("employer_number", &self.employer_number)
            .field("name", &self.name)
            .field("secret", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::config::SecretValue;
    use secrecy::Secret;

    pub const TEST_KEY_PEM: &str = include_str!("../../tests/fixtures/test_cert_key.pem");
    pub const TEST_KEY_PASSWORD: &str = "test-cert-password";

    pub fn test_certificate() -> CertificateContext {
        CertificateContext::new(
            999963,
            "8000242TH",
            "TEST CERT",
            Secret::new(SecretValue::from(TEST_KEY_PASSWORD.to_string())),
            TEST_KEY_PEM,
        )
    }

    pub fn certificate_with_password(password: &str) -> CertificateContext {
        CertificateContext::new(
            999963,
            "8000242TH",
            "TEST CERT",
            Secret::new(SecretValue::from(password.to_string())),
            TEST_KEY_PEM,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use rsa::traits::PublicKeyParts;

    #[test]
    fn test_private_key_decrypts_with_secret() {
        let cert = test_certificate();
        let key = cert.private_key().unwrap();
        assert_eq!(key.size(), 128);
    }

    #[test]
    fn test_private_key_is_memoized() {
        let cert = test_certificate();
        let first = cert.private_key().unwrap() as *const RsaPrivateKey;
        let second = cert.private_key().unwrap() as *const RsaPrivateKey;
        assert_eq!(first, second);
    }

    #[test]
    fn test_wrong_password_fails_key_derivation() {
        let cert = certificate_with_password("not-the-password");
        assert!(matches!(
            cert.private_key(),
            Err(SigningError::KeyDerivationFailure(_))
        ));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let debug = format!("{:?}", test_certificate());
        assert!(debug.contains("999963"));
        assert!(!debug.contains(TEST_KEY_PASSWORD));
        assert!(!debug.contains("BEGIN"));
    }
}
