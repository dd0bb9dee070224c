//! Outbound request descriptors
//!
//! A [`RequestDescriptor`] is everything the signing engine looks at: the
//! method, the target path (including query), an ordered header list with
//! case-insensitive names, and an optional body.

use super::SignatureAlgorithm;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};

/// IMF-fixdate, the format HTTP uses for the `date` header
pub const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Ordered header list with case-insensitive names
///
/// Names keep the case they were inserted with; lookups ignore case.
/// Inserting a name that already exists replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a header, replacing any existing value for the same name
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .0
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some(entry) => entry.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self
            .0
            .iter()
            .position(|(existing, _)| existing.eq_ignore_ascii_case(name))?;
        Some(self.0.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// An outbound HTTP request, as seen by the signing engine
///
/// # Examples
///
/// ```
/// use paye_sync::core::signing::{RequestDescriptor, SignatureAlgorithm};
/// use chrono::{TimeZone, Utc};
///
/// let mut request = RequestDescriptor::get("/paye-employers/v1/rest/rpn/8000242TH/2024");
/// let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
/// request.prepare("softwaretest.ros.ie", now, SignatureAlgorithm::RsaSha512);
///
/// assert_eq!(request.headers().get("Date"), Some("Fri, 01 Mar 2024 09:30:00 GMT"));
/// assert!(request.headers().get("digest").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    method: String,
    path: String,
    headers: Headers,
    body: Option<Vec<u8>>,
}

impl RequestDescriptor {
    /// Creates a descriptor; the method is normalised to upper case
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into().to_ascii_uppercase(),
            path: path.into(),
            headers: Headers::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new("GET", path)
    }

    pub fn post(path: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self::new("POST", path).with_body(body)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Target path including any query string
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Whether the transport may resend this request unchanged
    pub fn is_idempotent(&self) -> bool {
        matches!(self.method.as_str(), "GET" | "HEAD")
    }

    /// Adds the headers every signed request carries
    ///
    /// Sets `host` and `date`. When a body is present, also sets `digest`
    /// (hash matching `algorithm`) and, unless already given,
    /// `content-type: application/json`.
    pub fn prepare(&mut self, host: &str, now: DateTime<Utc>, algorithm: SignatureAlgorithm) {
        self.headers.insert("host", host);
        self.headers
            .insert("date", now.format(HTTP_DATE_FORMAT).to_string());

        if let Some(body) = &self.body {
            let digest = format!(
                "{}={}",
                algorithm.digest_label(),
                STANDARD.encode(algorithm.digest(body))
            );
            self.headers.insert("digest", digest);
            if !self.headers.contains("content-type") {
                self.headers.insert("content-type", "application/json");
            }
        }
    }
}
