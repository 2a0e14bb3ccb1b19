//! mTLS settings for the gRPC listener.
//!
//! - server certificate / key and the client CA bundle are read from PEM files
//! - client certificates are mandatory and verified against the CA bundle
//! - handshakes that do not finish within `HANDSHAKE_TIMEOUT` are dropped

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tonic::transport::{Certificate, Identity, ServerTlsConfig};

use crate::config::TlsPaths;

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum TlsError {
    #[error("failed to read {what} from {}: {source}", path.display())]
    Read {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no PEM data in {what} at {}", path.display())]
    NotPem { what: &'static str, path: PathBuf },
}

/// Build the server TLS config from the configured PEM files.
pub fn server_tls_config(paths: &TlsPaths) -> Result<ServerTlsConfig, TlsError> {
    let cert = read_pem(&paths.cert, "server certificate")?;
    let key = read_pem(&paths.key, "server key")?;
    let ca = read_pem(&paths.ca, "CA bundle")?;

    Ok(mtls_config(cert, key, ca))
}

/// Server identity plus a mandatory client CA.
pub fn mtls_config(
    cert: impl AsRef<[u8]>,
    key: impl AsRef<[u8]>,
    ca: impl AsRef<[u8]>,
) -> ServerTlsConfig {
    ServerTlsConfig::new()
        .identity(Identity::from_pem(cert, key))
        .client_ca_root(Certificate::from_pem(ca))
        .timeout(HANDSHAKE_TIMEOUT)
}

fn read_pem(path: &Path, what: &'static str) -> Result<Vec<u8>, TlsError> {
    let bytes = std::fs::read(path).map_err(|source| TlsError::Read {
        what,
        path: path.to_path_buf(),
        source,
    })?;

    if !String::from_utf8_lossy(&bytes).contains("-----BEGIN ") {
        return Err(TlsError::NotPem {
            what,
            path: path.to_path_buf(),
        });
    }
    Ok(bytes)
}
