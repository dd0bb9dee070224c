//! Request signing engine
//!
//! Builds a canonical signing string from a request's method, path and
//! selected headers, signs it with the certificate's RSA key and returns the
//! `Signature` header value.
//!
//! Signing is a pure function of the request and the certificate context:
//! RSASSA-PKCS1-v1_5 is deterministic, so the same inputs always produce the
//! same header value, and a retried request carries the same signature.
//!
//! ```rust,no_run
//! use paye_sync::core::signing::{sign, RequestDescriptor, SignatureAlgorithm};
//! use paye_sync::domain::CertificateContext;
//! use chrono::Utc;
//!
//! # fn example(certificate: &CertificateContext) -> Result<(), Box<dyn std::error::Error>> {
//! let mut request = RequestDescriptor::get("/paye-employers/v1/rest/rpn/8000242TH/2024");
//! request.prepare("softwaretest.ros.ie", Utc::now(), SignatureAlgorithm::RsaSha512);
//!
//! let signature = sign(&request, certificate)?;
//! println!("Signature: {signature}");
//! # Ok(())
//! # }
//! ```

pub mod canonical;
pub mod header;
pub mod request;

pub use canonical::{canonical_string, CanonicalString, SigningProfile, REQUEST_TARGET};
pub use header::{SignatureHeaderValue, SIGNATURE_HEADER};
pub use request::{Headers, RequestDescriptor, HTTP_DATE_FORMAT};

use crate::domain::certificate::CertificateContext;
use crate::domain::errors::SigningError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rsa::pkcs1v15::{Signature, SigningKey};
use rsa::signature::{SignatureEncoding, Signer};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};
use std::fmt;
use std::str::FromStr;

/// Supported signature algorithms, both RSASSA-PKCS1-v1_5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SignatureAlgorithm {
    #[serde(rename = "rsa-sha256")]
    RsaSha256,
    #[default]
    #[serde(rename = "rsa-sha512")]
    RsaSha512,
}

impl SignatureAlgorithm {
    /// Name used in the `algorithm` parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureAlgorithm::RsaSha256 => "rsa-sha256",
            SignatureAlgorithm::RsaSha512 => "rsa-sha512",
        }
    }

    /// Label used in the `digest` header
    pub fn digest_label(&self) -> &'static str {
        match self {
            SignatureAlgorithm::RsaSha256 => "SHA-256",
            SignatureAlgorithm::RsaSha512 => "SHA-512",
        }
    }

    /// Hashes `data` with this algorithm's digest
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            SignatureAlgorithm::RsaSha256 => Sha256::digest(data).to_vec(),
            SignatureAlgorithm::RsaSha512 => Sha512::digest(data).to_vec(),
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rsa-sha256" => Ok(SignatureAlgorithm::RsaSha256),
            "rsa-sha512" => Ok(SignatureAlgorithm::RsaSha512),
            other => Err(format!(
                "Unsupported signature algorithm '{}'. Must be one of: rsa-sha256, rsa-sha512",
                other
            )),
        }
    }
}

/// Signs requests with a fixed algorithm and header profile
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSigner {
    algorithm: SignatureAlgorithm,
    profile: SigningProfile,
}

impl RequestSigner {
    pub fn new(algorithm: SignatureAlgorithm) -> Self {
        Self {
            algorithm,
            profile: SigningProfile::default(),
        }
    }

    pub fn with_profile(mut self, profile: SigningProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    /// Computes the signature header value for `request`
    ///
    /// # Errors
    ///
    /// - [`SigningError::MissingHeader`] if a signed header is absent
    /// - [`SigningError::KeyDerivationFailure`] if the certificate's key
    ///   cannot be decrypted
    pub fn sign(
        &self,
        request: &RequestDescriptor,
        certificate: &CertificateContext,
    ) -> Result<SignatureHeaderValue, SigningError> {
        let canonical = canonical_string(request, &self.profile)?;
        let key = certificate.private_key()?;

        let bytes = match self.algorithm {
            SignatureAlgorithm::RsaSha256 => {
                let signature: Signature = SigningKey::<Sha256>::new(key.clone())
                    .try_sign(canonical.text.as_bytes())
                    .map_err(|e| SigningError::Signature(e.to_string()))?;
                signature.to_bytes()
            }
            SignatureAlgorithm::RsaSha512 => {
                let signature: Signature = SigningKey::<Sha512>::new(key.clone())
                    .try_sign(canonical.text.as_bytes())
                    .map_err(|e| SigningError::Signature(e.to_string()))?;
                signature.to_bytes()
            }
        };

        Ok(SignatureHeaderValue {
            key_id: certificate.registration_id().to_string(),
            algorithm: self.algorithm.as_str().to_string(),
            headers: canonical.headers,
            signature: STANDARD.encode(bytes),
        })
    }
}

/// Signs `request` with the default algorithm (`rsa-sha512`) and header profile
pub fn sign(
    request: &RequestDescriptor,
    certificate: &CertificateContext,
) -> Result<SignatureHeaderValue, SigningError> {
    RequestSigner::default().sign(request, certificate)
}
