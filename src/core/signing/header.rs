//! The `Signature` header value

use std::fmt;

/// Name of the header carrying the signature
pub const SIGNATURE_HEADER: &str = "Signature";

/// A computed request signature
///
/// Displays as the transport-ready header value:
/// `keyId="..",algorithm="..",headers="..",signature=".."`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeaderValue {
    pub key_id: String,
    pub algorithm: String,
    /// Signed header names, in canonical-string order
    pub headers: Vec<String>,
    /// Base64 of the signature bytes
    pub signature: String,
}

impl fmt::Display for SignatureHeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "keyId=\"{}\",algorithm=\"{}\",headers=\"{}\",signature=\"{}\"",
            self.key_id,
            self.algorithm,
            self.headers.join(" "),
            self.signature
        )
    }
}
