//! FTP implementation of the transfer session
//!
//! suppaftp's blocking client runs on tokio's blocking pool. Socket read and
//! write timeouts bound every call, so an abandoned blocking call still ends.

use super::traits::{TransferConnector, TransferSession};
use crate::config::{SecretString, TransferConfig};
use crate::domain::errors::TransferError;
use async_trait::async_trait;
use secrecy::ExposeSecret;
use std::io::Cursor;
use std::net::ToSocketAddrs;
use std::time::Duration;
use suppaftp::types::FileType;
use suppaftp::FtpStream;

/// Connects to the payroll server over FTP
#[derive(Clone)]
pub struct FtpConnector {
    host: String,
    port: u16,
    username: String,
    password: SecretString,
    timeout: Duration,
}

impl FtpConnector {
    pub fn from_config(config: &TransferConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            username: config.username.clone(),
            password: config.password.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }

    fn open(&self) -> Result<FtpStream, TransferError> {
        let addr = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| {
                TransferError::ConnectFailure(format!("Failed to resolve {}: {}", self.host, e))
            })?
            .next()
            .ok_or_else(|| {
                TransferError::ConnectFailure(format!("No address found for {}", self.host))
            })?;

        let mut stream = FtpStream::connect_timeout(addr, self.timeout)
            .map_err(|e| TransferError::ConnectFailure(format!("{}: {}", addr, e)))?;

        let socket = stream.get_ref();
        socket
            .set_read_timeout(Some(self.timeout))
            .and_then(|_| socket.set_write_timeout(Some(self.timeout)))
            .map_err(|e| TransferError::ConnectFailure(e.to_string()))?;

        stream
            .login(self.username.as_str(), self.password.expose_secret().as_str())
            .map_err(|e| TransferError::ConnectFailure(format!("Login failed: {}", e)))?;
        stream
            .transfer_type(FileType::Binary)
            .map_err(|e| TransferError::ConnectFailure(e.to_string()))?;

        Ok(stream)
    }
}

#[async_trait]
impl TransferConnector for FtpConnector {
    async fn connect(&self) -> Result<Box<dyn TransferSession>, TransferError> {
        let connector = self.clone();
        let stream = tokio::task::spawn_blocking(move || connector.open())
            .await
            .map_err(|e| TransferError::ConnectFailure(format!("Connect task failed: {}", e)))??;

        tracing::debug!(host = %self.host, port = self.port, "FTP session opened");
        Ok(Box::new(FtpSession {
            stream: Some(stream),
        }))
    }
}

/// Open FTP session
///
/// The stream is moved into the blocking task for each call and put back
/// afterwards.
pub struct FtpSession {
    stream: Option<FtpStream>,
}

#[async_trait]
impl TransferSession for FtpSession {
    async fn put(&mut self, contents: Vec<u8>, remote_path: &str) -> Result<(), TransferError> {
        let mut stream = self
            .stream
            .take()
            .ok_or_else(|| TransferError::UploadFailure("Session is closed".to_string()))?;
        let path = remote_path.to_string();

        let (stream, result) = tokio::task::spawn_blocking(move || {
            let result = stream.put_file(path.as_str(), &mut Cursor::new(contents));
            (stream, result)
        })
        .await
        .map_err(|e| TransferError::UploadFailure(format!("Upload task failed: {}", e)))?;

        self.stream = Some(stream);
        result
            .map(|bytes| tracing::debug!(remote_path, bytes, "FTP upload complete"))
            .map_err(|e| TransferError::UploadFailure(format!("{}: {}", remote_path, e)))
    }

    async fn close(&mut self) -> Result<(), TransferError> {
        let Some(mut stream) = self.stream.take() else {
            return Ok(());
        };

        tokio::task::spawn_blocking(move || stream.quit())
            .await
            .map_err(|e| TransferError::UploadFailure(format!("Close task failed: {}", e)))?
            .map_err(|e| TransferError::UploadFailure(format!("QUIT failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;
    use std::net::TcpListener;

    fn config(port: u16) -> TransferConfig {
        TransferConfig {
            host: "127.0.0.1".to_string(),
            port,
            username: "payroll".to_string(),
            password: secret_string("secret".to_string()),
            remote_directory: "/incoming".to_string(),
            timeout_seconds: 2,
        }
    }

    #[tokio::test]
    async fn test_connect_refused() {
        // Bind then drop to find a port with nothing listening
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();

        let connector = FtpConnector::from_config(&config(port));
        let result = connector.connect().await;
        assert!(matches!(result, Err(TransferError::ConnectFailure(_))));
    }

    #[tokio::test]
    async fn test_closed_session_put_fails() {
        let mut session = FtpSession { stream: None };
        assert!(session.close().await.is_ok());
        assert!(matches!(
            session.put(b"x".to_vec(), "/a").await,
            Err(TransferError::UploadFailure(_))
        ));
    }
}
