//! Canonical signing string construction

use super::request::RequestDescriptor;
use crate::domain::errors::SigningError;

/// Pseudo-header carrying the lower-cased method and the target path
pub const REQUEST_TARGET: &str = "(request-target)";

/// Header that is only signed when the request has a body
pub const DIGEST: &str = "digest";

/// Ordered list of header names to sign
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningProfile {
    headers: Vec<String>,
}

impl SigningProfile {
    /// Creates a profile; names are lower-cased
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            headers: headers
                .into_iter()
                .map(|h| h.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Header names signed for `request`, in order
    ///
    /// `digest` is dropped for body-less requests.
    pub fn signed_headers(&self, request: &RequestDescriptor) -> Vec<&str> {
        self.headers
            .iter()
            .map(String::as_str)
            .filter(|name| *name != DIGEST || request.body().is_some())
            .collect()
    }
}

impl Default for SigningProfile {
    fn default() -> Self {
        Self::new([REQUEST_TARGET, "host", "date", DIGEST])
    }
}

/// The exact text that gets signed, with the header names it covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalString {
    pub headers: Vec<String>,
    pub text: String,
}

/// Builds the canonical signing string for `request`
///
/// One `name: value` line per signed header, joined by `\n` with no trailing
/// newline.
///
/// # Errors
///
/// [`SigningError::MissingHeader`] naming the first signed header the request
/// does not carry.
pub fn canonical_string(
    request: &RequestDescriptor,
    profile: &SigningProfile,
) -> Result<CanonicalString, SigningError> {
    let names = profile.signed_headers(request);
    let mut lines = Vec::with_capacity(names.len());

    for name in &names {
        let value = if *name == REQUEST_TARGET {
            format!(
                "{} {}",
                request.method().to_ascii_lowercase(),
                request.path()
            )
        } else {
            request
                .headers()
                .get(name)
                .ok_or_else(|| SigningError::MissingHeader((*name).to_string()))?
                .trim()
                .to_string()
        };
        lines.push(format!("{}: {}", name, value));
    }

    Ok(CanonicalString {
        headers: names.into_iter().map(str::to_string).collect(),
        text: lines.join("\n"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prepared_get() -> RequestDescriptor {
        RequestDescriptor::get("/rpn/8000242TH/2024?dateLastUpdated=2024-03-01")
            .with_header("Host", "softwaretest.ros.ie")
            .with_header("Date", "Fri, 01 Mar 2024 09:30:00 GMT")
    }

    #[test]
    fn test_canonical_string_without_body() {
        let canonical = canonical_string(&prepared_get(), &SigningProfile::default()).unwrap();

        assert_eq!(
            canonical.text,
            "(request-target): get /rpn/8000242TH/2024?dateLastUpdated=2024-03-01\n\
             host: softwaretest.ros.ie\n\
             date: Fri, 01 Mar 2024 09:30:00 GMT"
        );
        assert_eq!(canonical.headers, vec![REQUEST_TARGET, "host", "date"]);
        assert!(!canonical.text.ends_with('\n'));
    }

    #[test]
    fn test_canonical_string_with_body_includes_digest() {
        let request = RequestDescriptor::post("/payroll", "{}")
            .with_header("host", "h")
            .with_header("date", "d")
            .with_header("Digest", "SHA-512=abc");
        let canonical = canonical_string(&request, &SigningProfile::default()).unwrap();

        assert_eq!(canonical.headers.last().map(String::as_str), Some("digest"));
        assert!(canonical.text.ends_with("digest: SHA-512=abc"));
        assert!(canonical.text.starts_with("(request-target): post /payroll\n"));
    }

    #[test]
    fn test_missing_digest_with_body() {
        let request = RequestDescriptor::post("/payroll", "{}")
            .with_header("host", "h")
            .with_header("date", "d");
        assert_eq!(
            canonical_string(&request, &SigningProfile::default()),
            Err(SigningError::MissingHeader("digest".to_string()))
        );
    }

    #[test]
    fn test_empty_headers_fail_on_first_real_header() {
        let request = RequestDescriptor::get("/rpn");
        assert_eq!(
            canonical_string(&request, &SigningProfile::default()),
            Err(SigningError::MissingHeader("host".to_string()))
        );
    }

    #[test]
    fn test_custom_profile_order() {
        let profile = SigningProfile::new(["Date", "(request-target)"]);
        let canonical = canonical_string(&prepared_get(), &profile).unwrap();
        assert!(canonical.text.starts_with("date: "));
        assert_eq!(canonical.headers, vec!["date", REQUEST_TARGET]);
    }
}
