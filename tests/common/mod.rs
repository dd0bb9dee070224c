//! Shared test doubles for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use paye_sync::adapters::revenue::{PayeClient, Transport, TransportResponse};
use paye_sync::adapters::store::MemoryRunStore;
use paye_sync::adapters::transfer::{TransferConnector, TransferSession};
use paye_sync::config::secret_string;
use paye_sync::core::signing::{RequestDescriptor, RequestSigner, SignatureAlgorithm};
use paye_sync::core::state::StateManager;
use paye_sync::core::sync::{SyncEngine, SyncSettings};
use paye_sync::core::transfer::TransferPipeline;
use paye_sync::domain::{CertificateContext, TransferError, TransportError};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

pub const TEST_KEY_PEM: &str = include_str!("../fixtures/test_cert_key.pem");
pub const TEST_KEY_PASSWORD: &str = "test-cert-password";

pub fn test_certificate() -> CertificateContext {
    CertificateContext::new(
        999963,
        "8000242TH",
        "TEST CERT",
        secret_string(TEST_KEY_PASSWORD.to_string()),
        TEST_KEY_PEM,
    )
}

/// An RPN lookup response with one RPN per PPSN
pub fn rpn_response_json(total: u32, ppsns: &[&str]) -> serde_json::Value {
    let rpns: Vec<_> = ppsns
        .iter()
        .enumerate()
        .map(|(i, ppsn)| {
            serde_json::json!({
                "rpnNumber": (i + 1).to_string(),
                "employeeID": { "employeePpsn": ppsn, "employmentID": "1" },
                "rpnIssueDate": "2024-02-28",
                "name": { "firstName": "Seán", "familyName": "Ó Ceallaigh" },
                "effectiveDate": "2024-01-01",
                "endDate": "2024-12-31",
                "incomeTaxCalculationBasis": "CUMULATIVE",
                "yearlyTaxCredits": 3750.0,
                "taxRates": [
                    { "index": 1, "taxRatePercent": 20.0, "yearlyRateCutOff": 42000.0 },
                    { "index": 2, "taxRatePercent": 40.0 }
                ],
                "payForIncomeTaxToDate": 6500.0,
                "incomeTaxDeductedToDate": 675.5,
                "uscStatus": "ORDINARY",
                "uscRates": [
                    { "index": 1, "uscRatePercent": 0.5, "yearlyUSCRateCutOff": 12012.0 }
                ],
                "prsiExempt": false,
                "prsiClass": "A1"
            })
        })
        .collect();

    serde_json::json!({
        "employerName": "Murphy & Sons Ltd",
        "employerRegistrationNumber": "8000242TH",
        "taxYear": 2024,
        "totalRPNCount": total,
        "dateTimeEffective": "2024-03-01T09:30:00Z",
        "rpns": rpns,
        "noRPNs": [],
        "validationErrors": []
    })
}

/// Transport answering from a queue of canned replies
pub struct FakeTransport {
    replies: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    sent: Mutex<Vec<RequestDescriptor>>,
    delay: Option<Duration>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new()
        }
    }

    pub fn push_json(&self, body: serde_json::Value) {
        self.push(Ok(TransportResponse {
            status: 200,
            body: serde_json::to_vec(&body).unwrap(),
        }));
    }

    pub fn push(&self, reply: Result<TransportResponse, TransportError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn sent(&self) -> Vec<RequestDescriptor> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    fn host(&self) -> &str {
        "softwaretest.ros.ie"
    }

    async fn send(&self, request: &RequestDescriptor) -> Result<TransportResponse, TransportError> {
        self.sent.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("no reply queued".to_string())))
    }
}

/// Transfer connector that records uploads in memory
#[derive(Default)]
pub struct RecordingConnector {
    pub uploads: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
    pub closes: Arc<AtomicUsize>,
    pub fail_uploads: Arc<AtomicBool>,
    pub fail_connects: Arc<AtomicBool>,
    pub put_delay: Arc<Mutex<Option<Duration>>>,
}

impl RecordingConnector {
    pub fn uploads(&self) -> Vec<(String, Vec<u8>)> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_uploads.store(failing, Ordering::SeqCst);
    }

    pub fn set_refusing_connections(&self, refusing: bool) {
        self.fail_connects.store(refusing, Ordering::SeqCst);
    }

    /// Makes every upload wait `delay` before completing
    pub fn set_put_delay(&self, delay: Option<Duration>) {
        *self.put_delay.lock().unwrap() = delay;
    }
}

struct RecordingSession {
    uploads: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
    closes: Arc<AtomicUsize>,
    fail_uploads: Arc<AtomicBool>,
    put_delay: Option<Duration>,
}

#[async_trait]
impl TransferConnector for RecordingConnector {
    async fn connect(&self) -> Result<Box<dyn TransferSession>, TransferError> {
        if self.fail_connects.load(Ordering::SeqCst) {
            return Err(TransferError::ConnectFailure(
                "payroll.example.com:21: connection refused".to_string(),
            ));
        }
        Ok(Box::new(RecordingSession {
            uploads: self.uploads.clone(),
            closes: self.closes.clone(),
            fail_uploads: self.fail_uploads.clone(),
            put_delay: *self.put_delay.lock().unwrap(),
        }))
    }
}

#[async_trait]
impl TransferSession for RecordingSession {
    async fn put(&mut self, contents: Vec<u8>, remote_path: &str) -> Result<(), TransferError> {
        if let Some(delay) = self.put_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(TransferError::UploadFailure(format!(
                "550 {}: permission denied",
                remote_path
            )));
        }
        self.uploads
            .lock()
            .unwrap()
            .push((remote_path.to_string(), contents));
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransferError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// An engine wired to in-memory collaborators
pub struct Harness {
    pub store: Arc<MemoryRunStore>,
    pub transport: Arc<FakeTransport>,
    pub connector: Arc<RecordingConnector>,
    pub dir: TempDir,
    pub engine: SyncEngine,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_transport(FakeTransport::new(), Duration::from_secs(5))
    }

    pub fn with_transport(transport: FakeTransport, fetch_timeout: Duration) -> Self {
        Self::build(transport, fetch_timeout, Duration::from_secs(5))
    }

    pub fn with_transfer_timeout(transfer_timeout: Duration) -> Self {
        Self::build(FakeTransport::new(), Duration::from_secs(5), transfer_timeout)
    }

    fn build(transport: FakeTransport, fetch_timeout: Duration, transfer_timeout: Duration) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryRunStore::new());
        let transport = Arc::new(transport);
        let connector = Arc::new(RecordingConnector::default());

        let client = PayeClient::new(
            transport.clone(),
            RequestSigner::new(SignatureAlgorithm::RsaSha512),
            test_certificate(),
            "/paye-employers/v1/rest",
        );
        let transfer = TransferPipeline::new(
            connector.clone(),
            dir.path().join("staging"),
            "/incoming",
            transfer_timeout,
        );
        let settings = SyncSettings {
            artifact_prefix: "RPN".to_string(),
            artifact_extension: "XML".to_string(),
            fetch_timeout,
            lock_file: Some(dir.path().join("paye-sync.lock")),
        };
        let engine = SyncEngine::new(
            client,
            StateManager::new(store.clone()),
            transfer,
            settings,
        );

        Self {
            store,
            transport,
            connector,
            dir,
            engine,
        }
    }

    pub fn staged_path(&self, file_name: &str) -> PathBuf {
        self.dir.path().join("staging").join(file_name)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.dir.path().join("paye-sync.lock")
    }
}
