//! Signed client for the PAYE employer REST API

use super::transport::{Transport, TransportResponse};
use crate::core::signing::{RequestDescriptor, RequestSigner, SIGNATURE_HEADER};
use crate::domain::certificate::CertificateContext;
use crate::domain::errors::{ClientError, SigningError, TransportError};
use crate::domain::notification::{PayrollSubmissionResult, RpnResponse};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use url::form_urlencoded;

/// Client for the RPN lookup and payroll endpoints
///
/// Every request is prepared (`host`, `date`, `digest`), signed with the
/// certificate the client was built with, and only then handed to the
/// transport. A signing failure never reaches the network.
///
/// # Examples
///
/// ```no_run
/// use paye_sync::adapters::revenue::{PayeClient, ReqwestTransport};
/// use paye_sync::config::load_config;
/// use paye_sync::core::signing::RequestSigner;
/// use paye_sync::domain::CertificateContext;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config("paye-sync.toml")?;
/// let certificate = CertificateContext::from_config(config.active_certificate()?)?;
/// let transport = Arc::new(ReqwestTransport::new(&config.revenue)?);
/// let client = PayeClient::new(
///     transport,
///     RequestSigner::new(config.revenue.signature_algorithm),
///     certificate,
///     &config.revenue.api_path,
/// );
///
/// let response = client.lookup_rpns_by_employer(2024, None, &[]).await?;
/// println!("{} RPNs", response.total_rpn_count);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PayeClient {
    transport: Arc<dyn Transport>,
    signer: RequestSigner,
    certificate: CertificateContext,
    api_path: String,
}

impl PayeClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        signer: RequestSigner,
        certificate: CertificateContext,
        api_path: &str,
    ) -> Self {
        Self {
            transport,
            signer,
            certificate,
            api_path: api_path.trim_end_matches('/').to_string(),
        }
    }

    pub fn certificate(&self) -> &CertificateContext {
        &self.certificate
    }

    /// Looks up the RPNs of the employer for a tax year
    ///
    /// `date_last_updated` restricts the result to RPNs updated on or after
    /// that date. The response is validated and PPSNs are normalised before
    /// it is returned.
    pub async fn lookup_rpns_by_employer(
        &self,
        tax_year: i32,
        date_last_updated: Option<NaiveDate>,
        employee_ids: &[String],
    ) -> Result<RpnResponse, ClientError> {
        let mut query = Vec::new();
        if let Some(date) = date_last_updated {
            query.push(format!("dateLastUpdated={}", date.format("%Y-%m-%d")));
        }
        if !employee_ids.is_empty() {
            query.push(format!("employeeIDs={}", encode_list(employee_ids)));
        }

        let mut path = self.employer_path("rpn", tax_year);
        if !query.is_empty() {
            path = format!("{}?{}", path, query.join("&"));
        }

        let response = self.execute(RequestDescriptor::get(path)).await?;
        parse_rpn_response(&response)
    }

    /// Looks up the RPN of a single employee
    pub async fn lookup_rpn_by_employee(
        &self,
        tax_year: i32,
        employee_id: &str,
    ) -> Result<RpnResponse, ClientError> {
        let path = format!(
            "{}?employeeIDs={}",
            self.employer_path("rpn", tax_year),
            encode(employee_id)
        );

        let response = self.execute(RequestDescriptor::get(path)).await?;
        parse_rpn_response(&response)
    }

    /// Creates RPNs for new employments
    ///
    /// `payload` is sent as the JSON body with its digest signed. The
    /// response is returned as Revenue sends it, since it carries both the
    /// created RPNs and per-employee errors.
    pub async fn create_rpn(
        &self,
        tax_year: i32,
        payload: &serde_json::Value,
    ) -> Result<serde_json::Value, ClientError> {
        let body = serde_json::to_vec(payload)
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        Ok(self
            .execute(RequestDescriptor::post(self.employer_path("rpn", tax_year), body))
            .await?
            .json()?)
    }

    /// Current status of a payroll run
    pub async fn check_payroll_run(
        &self,
        tax_year: i32,
        run_reference: &str,
    ) -> Result<serde_json::Value, ClientError> {
        let path = format!(
            "{}/{}",
            self.employer_path("payroll", tax_year),
            encode(run_reference)
        );
        Ok(self.execute(RequestDescriptor::get(path)).await?.json()?)
    }

    /// Current status of a payroll submission
    pub async fn check_payroll_submission(
        &self,
        tax_year: i32,
        run_reference: &str,
        submission_id: &str,
    ) -> Result<serde_json::Value, ClientError> {
        let path = format!(
            "{}/{}/{}",
            self.employer_path("payroll", tax_year),
            encode(run_reference),
            encode(submission_id)
        );
        Ok(self.execute(RequestDescriptor::get(path)).await?.json()?)
    }

    /// Submits a payroll run
    ///
    /// `payload` is sent as the JSON body; the body digest is signed.
    pub async fn create_payroll_submission(
        &self,
        tax_year: i32,
        run_reference: &str,
        submission_id: &str,
        payload: &serde_json::Value,
    ) -> Result<PayrollSubmissionResult, ClientError> {
        let path = format!(
            "{}/{}/{}",
            self.employer_path("payroll", tax_year),
            encode(run_reference),
            encode(submission_id)
        );
        let body = serde_json::to_vec(payload)
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        Ok(self
            .execute(RequestDescriptor::post(path, body))
            .await?
            .json()?)
    }

    /// Prepares and signs `request` without sending it
    pub fn sign_request(
        &self,
        mut request: RequestDescriptor,
    ) -> Result<RequestDescriptor, SigningError> {
        request.prepare(self.transport.host(), Utc::now(), self.signer.algorithm());
        let signature = self.signer.sign(&request, &self.certificate)?;
        request
            .headers_mut()
            .insert(SIGNATURE_HEADER, signature.to_string());
        Ok(request)
    }

    /// Signs `request`, then sends it
    pub async fn execute(
        &self,
        request: RequestDescriptor,
    ) -> Result<TransportResponse, ClientError> {
        let request = self.sign_request(request)?;

        tracing::debug!(
            method = %request.method(),
            path = %request.path(),
            key_id = self.certificate.registration_id(),
            "Sending signed request"
        );

        Ok(self.transport.send(&request).await?)
    }

    fn employer_path(&self, resource: &str, tax_year: i32) -> String {
        format!(
            "{}/{}/{}/{}",
            self.api_path,
            resource,
            encode(self.certificate.employer_number()),
            tax_year
        )
    }
}

fn parse_rpn_response(response: &TransportResponse) -> Result<RpnResponse, ClientError> {
    let mut rpn_response: RpnResponse = response.json()?;
    rpn_response.validate_and_normalize().map_err(|errors| {
        TransportError::InvalidResponse(format!(
            "RPN response failed validation: {}",
            errors.join("; ")
        ))
    })?;
    Ok(rpn_response)
}

fn encode(segment: &str) -> String {
    form_urlencoded::byte_serialize(segment.as_bytes()).collect()
}

fn encode_list(values: &[String]) -> String {
    values
        .iter()
        .map(|v| encode(v))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::signing::{SignatureAlgorithm, SigningProfile};
    use crate::domain::certificate::fixtures::test_certificate;
    use crate::domain::notification::fixtures::sample_response_json;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every request and answers with a canned result
    struct RecordingTransport {
        sent: Mutex<Vec<RequestDescriptor>>,
        reply: Result<TransportResponse, TransportError>,
    }

    impl RecordingTransport {
        fn ok(body: serde_json::Value) -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(Vec::new()),
                reply: Ok(TransportResponse {
                    status: 200,
                    body: serde_json::to_vec(&body).unwrap(),
                }),
            })
        }

        fn sent(&self) -> Vec<RequestDescriptor> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        fn host(&self) -> &str {
            "softwaretest.ros.ie"
        }

        async fn send(
            &self,
            request: &RequestDescriptor,
        ) -> Result<TransportResponse, TransportError> {
            self.sent.lock().unwrap().push(request.clone());
            self.reply.clone()
        }
    }

    fn client(transport: Arc<RecordingTransport>) -> PayeClient {
        PayeClient::new(
            transport,
            RequestSigner::new(SignatureAlgorithm::RsaSha512),
            test_certificate(),
            "/paye-employers/v1/rest/",
        )
    }

    #[tokio::test]
    async fn test_lookup_by_employer_builds_signed_request() {
        let transport = RecordingTransport::ok(sample_response_json());
        let since = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        let response = client(transport.clone())
            .lookup_rpns_by_employer(2024, Some(since), &["1234567T".to_string()])
            .await
            .unwrap();

        assert_eq!(response.rpns[0].employee_id.employee_ppsn, "1234567T");

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].path(),
            "/paye-employers/v1/rest/rpn/8000242TH/2024?dateLastUpdated=2024-03-01&employeeIDs=1234567T"
        );
        let signature = sent[0].headers().get("signature").unwrap();
        assert!(signature.starts_with("keyId=\"999963\",algorithm=\"rsa-sha512\""));
        assert!(signature.contains("headers=\"(request-target) host date\""));
        assert_eq!(sent[0].headers().get("host"), Some("softwaretest.ros.ie"));
    }

    #[tokio::test]
    async fn test_lookup_by_employee() {
        let transport = RecordingTransport::ok(sample_response_json());

        client(transport.clone())
            .lookup_rpn_by_employee(2024, "1234567T")
            .await
            .unwrap();

        assert_eq!(
            transport.sent()[0].path(),
            "/paye-employers/v1/rest/rpn/8000242TH/2024?employeeIDs=1234567T"
        );
    }

    #[tokio::test]
    async fn test_invalid_response_is_rejected() {
        let mut body = sample_response_json();
        body["taxYear"] = serde_json::json!(1999);
        let transport = RecordingTransport::ok(body);

        let result = client(transport)
            .lookup_rpns_by_employer(2024, None, &[])
            .await;

        assert!(matches!(
            result,
            Err(ClientError::Transport(TransportError::InvalidResponse(_)))
        ));
    }

    #[tokio::test]
    async fn test_submission_signs_body_digest() {
        let transport = RecordingTransport::ok(serde_json::json!({
            "acknowledgementStatus": "ACKNOWLEDGED",
            "acknowledgementID": "ACK-1",
            "validationErrors": []
        }));

        let result = client(transport.clone())
            .create_payroll_submission(2024, "RUN1", "SUB1", &serde_json::json!({"lineItems": []}))
            .await
            .unwrap();

        assert_eq!(result.acknowledgement_id.as_deref(), Some("ACK-1"));
        let sent = transport.sent();
        assert_eq!(sent[0].method(), "POST");
        assert_eq!(sent[0].path(), "/paye-employers/v1/rest/payroll/8000242TH/2024/RUN1/SUB1");
        assert!(sent[0].headers().get("digest").unwrap().starts_with("SHA-512="));
        assert!(sent[0]
            .headers()
            .get("signature")
            .unwrap()
            .contains("headers=\"(request-target) host date digest\""));
    }

    #[tokio::test]
    async fn test_create_rpn_posts_signed_body() {
        let transport = RecordingTransport::ok(serde_json::json!({
            "rpns": [],
            "errors": []
        }));
        let payload = serde_json::json!({"requests": [{"employeeID": {"employeePpsn": "1234567T"}}]});

        let result = client(transport.clone())
            .create_rpn(2024, &payload)
            .await
            .unwrap();

        assert!(result["errors"].is_array());
        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method(), "POST");
        assert_eq!(sent[0].path(), "/paye-employers/v1/rest/rpn/8000242TH/2024");
        assert_eq!(sent[0].body(), Some(serde_json::to_vec(&payload).unwrap().as_slice()));
        assert!(sent[0]
            .headers()
            .get("signature")
            .unwrap()
            .contains("headers=\"(request-target) host date digest\""));
    }

    #[tokio::test]
    async fn test_signing_failure_sends_nothing() {
        let transport = RecordingTransport::ok(sample_response_json());
        let client = PayeClient::new(
            transport.clone(),
            RequestSigner::default().with_profile(SigningProfile::new([
                "(request-target)",
                "x-request-id",
            ])),
            test_certificate(),
            "/paye-employers/v1/rest",
        );

        let result = client.check_payroll_run(2024, "RUN1").await;

        assert_eq!(
            result.unwrap_err(),
            ClientError::Signing(SigningError::MissingHeader("x-request-id".to_string()))
        );
        assert!(transport.sent().is_empty());
    }
}
