//! Revenue Payroll Notification (RPN) models
//!
//! [`RpnResponse`] mirrors the tax authority's "look up RPNs" response body.
//! Field names follow the wire format, so the same types serve the JSON API,
//! the stored document and the rendered transfer file.

use crate::domain::ids::{ArtifactName, Ppsn};
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Employer's RPN lookup response
///
/// Contains either RPN details or details of validation errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpnResponse {
    pub employer_name: String,

    pub employer_registration_number: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_tain: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_year: Option<i32>,

    #[serde(rename = "totalRPNCount", default)]
    pub total_rpn_count: u32,

    pub date_time_effective: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_initialised: Option<DateTime<Utc>>,

    #[serde(default)]
    pub rpns: Vec<Rpn>,

    #[serde(rename = "noRPNs", default)]
    pub no_rpns: Vec<EmployeeId>,

    #[serde(default)]
    pub validation_errors: Vec<ValidationError>,
}

/// A single payroll notification for one employment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rpn {
    pub rpn_number: String,

    #[serde(rename = "employeeID")]
    pub employee_id: EmployeeId,

    pub rpn_issue_date: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employer_reference: Option<String>,

    pub name: EmployeeName,

    #[serde(
        rename = "previousEmployeePPSN",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub previous_employee_ppsn: Option<String>,

    pub effective_date: NaiveDate,

    pub end_date: NaiveDate,

    pub income_tax_calculation_basis: IncomeTaxBasis,

    #[serde(default)]
    pub exclusion_order: bool,

    pub yearly_tax_credits: f64,

    #[serde(default)]
    pub tax_rates: Vec<TaxRate>,

    pub pay_for_income_tax_to_date: f64,

    pub income_tax_deducted_to_date: f64,

    pub usc_status: UscStatus,

    #[serde(default)]
    pub usc_rates: Vec<UscRate>,

    #[serde(
        rename = "payForUSCToDate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub pay_for_usc_to_date: Option<f64>,

    #[serde(
        rename = "uscDeductedToDate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub usc_deducted_to_date: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lpt_to_deduct: Option<f64>,

    #[serde(default)]
    pub prsi_exempt: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prsi_class: Option<String>,
}

/// Employee and employment identifiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeId {
    pub employee_ppsn: String,

    #[serde(
        rename = "employmentID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub employment_id: Option<String>,
}

/// Employee name as held by the tax authority
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeName {
    pub first_name: String,
    pub family_name: String,
}

/// Income tax rate band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxRate {
    pub index: u32,
    pub tax_rate_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yearly_rate_cut_off: Option<f64>,
}

/// Universal Social Charge rate band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UscRate {
    pub index: u32,
    pub usc_rate_percent: f64,
    #[serde(
        rename = "yearlyUSCRateCutOff",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub yearly_usc_rate_cut_off: Option<f64>,
}

/// Validation error reported by the tax authority
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub description: String,
}

/// Generates a string-backed enum.
///
/// The enums travel as plain strings through serde so that JSON, the
/// stored document and the XML artifact all carry the same text.
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Wire representation
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                match value.as_str() {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!(
                        concat!("Invalid ", stringify!($name), " '{}'"),
                        other
                    )),
                }
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }
    };
}

string_enum!(
    /// How income tax is computed for the employment
    IncomeTaxBasis {
        Cumulative => "CUMULATIVE",
        Week1 => "WEEK_1",
        Emergency => "EMERGENCY",
    }
);

string_enum!(
    /// USC status of the employment
    UscStatus {
        Ordinary => "ORDINARY",
        Exempt => "EXEMPT",
    }
);

string_enum!(
    /// Outcome of a payroll submission
    AcknowledgementStatus {
        Acknowledged => "ACKNOWLEDGED",
        Rejected => "REJECTED",
    }
);

/// Acknowledgement of a payroll submission, or the reasons it was rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollSubmissionResult {
    pub acknowledgement_status: AcknowledgementStatus,

    #[serde(
        rename = "acknowledgementID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub acknowledgement_id: Option<String>,

    #[serde(default)]
    pub validation_errors: Vec<ValidationError>,
}

fn agent_tain_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]{5}[A-Wa-w]$").expect("static regex"))
}

fn trim(text: &mut String) {
    let trimmed = text.trim();
    if trimmed.len() != text.len() {
        *text = trimmed.to_string();
    }
}

fn trim_opt(text: &mut Option<String>) {
    if let Some(value) = text.as_mut() {
        trim(value);
        if value.is_empty() {
            *text = None;
        }
    }
}

impl RpnResponse {
    /// Checks the response against the tax authority's schema rules and
    /// normalises employee PPSNs to upper case
    ///
    /// # Errors
    ///
    /// Returns every rule violation found, not just the first.
    pub fn validate_and_normalize(&mut self) -> Result<(), Vec<String>> {
        let mut problems = Vec::new();
        self.trim_text();

        if self.employer_name.chars().count() > 100 {
            problems.push("employerName exceeds 100 characters".to_string());
        }
        if self.employer_registration_number.trim().is_empty() {
            problems.push("employerRegistrationNumber is empty".to_string());
        }
        if let Some(year) = self.tax_year {
            if !(2000..=2100).contains(&year) {
                problems.push(format!("taxYear {year} is outside 2000-2100"));
            }
        }
        if let Some(tain) = &self.agent_tain {
            if !agent_tain_pattern().is_match(tain) {
                problems.push(format!("agentTain '{tain}' is not a valid TAIN"));
            }
        }

        let ids = self
            .rpns
            .iter_mut()
            .map(|rpn| &mut rpn.employee_id)
            .chain(self.no_rpns.iter_mut());
        for id in ids {
            match Ppsn::new(id.employee_ppsn.as_str()) {
                Ok(ppsn) => id.employee_ppsn = ppsn.as_str().to_string(),
                Err(e) => problems.push(e),
            }
        }

        for rpn in &mut self.rpns {
            if let Some(previous) = rpn.previous_employee_ppsn.as_mut() {
                match Ppsn::new(previous.as_str()) {
                    Ok(ppsn) => *previous = ppsn.as_str().to_string(),
                    Err(e) => problems.push(format!("previousEmployeePPSN: {e}")),
                }
            }
            if rpn.end_date < rpn.effective_date {
                problems.push(format!(
                    "RPN {} ends ({}) before it takes effect ({})",
                    rpn.rpn_number, rpn.end_date, rpn.effective_date
                ));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }

    /// Trims free text; blank optional text becomes `None`
    ///
    /// The transfer file cannot carry leading or trailing whitespace in text
    /// nodes, so the stored batch must not either.
    fn trim_text(&mut self) {
        trim(&mut self.employer_name);
        trim(&mut self.employer_registration_number);
        trim_opt(&mut self.agent_tain);

        for rpn in &mut self.rpns {
            trim(&mut rpn.rpn_number);
            trim_opt(&mut rpn.employer_reference);
            trim(&mut rpn.name.first_name);
            trim(&mut rpn.name.family_name);
            trim_opt(&mut rpn.prsi_class);
            trim_opt(&mut rpn.employee_id.employment_id);
        }
        for id in &mut self.no_rpns {
            trim_opt(&mut id.employment_id);
        }
        for error in &mut self.validation_errors {
            trim(&mut error.code);
            trim_opt(&mut error.path);
            trim(&mut error.description);
        }
    }

    /// PPSNs of every employee with an RPN in this response
    pub fn employee_ppsns(&self) -> Vec<&str> {
        self.rpns
            .iter()
            .map(|rpn| rpn.employee_id.employee_ppsn.as_str())
            .collect()
    }
}

/// One run's fetched notifications, as persisted and rendered
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationBatch {
    /// Unique artifact name of the run that fetched this batch
    pub artifact: ArtifactName,

    /// When the batch was stored
    pub date_uploaded: DateTime<Utc>,

    /// Number of notifications reported by the response
    pub item_count: u32,

    /// The response as received
    pub response: RpnResponse,
}

impl NotificationBatch {
    /// Wraps a response under the run's artifact name
    pub fn new(artifact: ArtifactName, response: RpnResponse) -> Self {
        Self {
            artifact,
            date_uploaded: Utc::now(),
            item_count: response.total_rpn_count,
            response,
        }
    }
}
