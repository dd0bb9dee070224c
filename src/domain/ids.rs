//! Domain identifier types with validation
//!
//! Newtype wrappers keep artifact names and employee identifiers from being
//! mixed up with arbitrary strings.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of one run's artifact
///
/// Format: `<prefix>_<YYYYMMDD>`, where the date is the end of the run's
/// coverage window. The rendered file adds an extension, see
/// [`ArtifactName::file_name`].
///
/// # Examples
///
/// ```
/// use paye_sync::domain::ids::ArtifactName;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
/// let name = ArtifactName::for_date("RPN", date).unwrap();
/// assert_eq!(name.as_str(), "RPN_20240301");
/// assert_eq!(name.file_name("XML"), "RPN_20240301.XML");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct ArtifactName(String);

impl ArtifactName {
    /// Builds the artifact name for a coverage window ending on `date`
    pub fn for_date(prefix: &str, date: NaiveDate) -> Result<Self, String> {
        validate_prefix(prefix)?;
        Ok(Self(format!("{}_{}", prefix, date.format("%Y%m%d"))))
    }

    /// Parses and validates an existing artifact name
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        let (prefix, date) = name
            .rsplit_once('_')
            .ok_or_else(|| format!("Artifact name must be <prefix>_<YYYYMMDD>, got: {name}"))?;
        validate_prefix(prefix)?;
        if date.len() != 8 || !date.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("Artifact name has an invalid date part: {name}"));
        }
        NaiveDate::parse_from_str(date, "%Y%m%d")
            .map_err(|_| format!("Artifact name has an invalid date part: {name}"))?;
        Ok(Self(name))
    }

    /// Returns the artifact name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the rendered file for this artifact
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}.{}", self.0, extension)
    }

    /// Date encoded in the artifact name
    pub fn date(&self) -> Option<NaiveDate> {
        self.0
            .rsplit_once('_')
            .and_then(|(_, d)| NaiveDate::parse_from_str(d, "%Y%m%d").ok())
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

fn validate_prefix(prefix: &str) -> Result<(), String> {
    if prefix.is_empty() {
        return Err("Artifact prefix cannot be empty".to_string());
    }
    if !prefix
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(format!(
            "Artifact prefix may only contain letters, digits and '-', got: {prefix}"
        ));
    }
    Ok(())
}

impl fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ArtifactName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ArtifactName {
    type Error = String;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::new(name)
    }
}

impl AsRef<str> for ArtifactName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Personal Public Service Number of an employee
///
/// 8 to 10 alphanumeric characters, normalised to upper case.
///
/// # Examples
///
/// ```
/// use paye_sync::domain::ids::Ppsn;
///
/// let ppsn = Ppsn::new("1234567fa").unwrap();
/// assert_eq!(ppsn.as_str(), "1234567FA");
/// assert!(Ppsn::new("123").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ppsn(String);

impl Ppsn {
    /// Creates a new Ppsn, upper-casing the input
    pub fn new(value: impl Into<String>) -> Result<Self, String> {
        let value = value.into().trim().to_ascii_uppercase();
        if !(8..=10).contains(&value.len()) {
            return Err(format!("PPSN must be 8 to 10 characters, got: {value}"));
        }
        if !value.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(format!("PPSN must be alphanumeric, got: {value}"));
        }
        Ok(Self(value))
    }

    /// Returns the PPSN as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ppsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Ppsn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
