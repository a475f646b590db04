//! TLS material: client certificates and custom trust roots
//!
//! Every certificate, key or CA value is either inline PEM text (it starts
//! with a `-----BEGIN` marker) or a path to a PEM file. Material is read and
//! validated once, before any request is sent.

use std::path::PathBuf;

use tracing::debug;

use crate::errors::{Result, VolleyError};

/// Marker that identifies inline PEM text
pub const PEM_MARKER: &str = "-----BEGIN";

/// Where a piece of PEM material comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PemSource {
    Inline(String),
    File(PathBuf),
}

impl PemSource {
    /// Inline when the text starts with the PEM header marker, a path otherwise
    pub fn detect(raw: &str) -> Self {
        if raw.trim_start().starts_with(PEM_MARKER) {
            PemSource::Inline(raw.to_string())
        } else {
            PemSource::File(PathBuf::from(raw.trim()))
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, PemSource::Inline(_))
    }

    /// Short description for logs and errors (never the PEM itself)
    pub fn describe(&self) -> String {
        match self {
            PemSource::Inline(_) => "<inline PEM>".to_string(),
            PemSource::File(path) => path.display().to_string(),
        }
    }

    /// Read the PEM bytes
    pub fn load(&self) -> Result<Vec<u8>> {
        match self {
            PemSource::Inline(text) => Ok(text.as_bytes().to_vec()),
            PemSource::File(path) => std::fs::read(path).map_err(|e| VolleyError::CredentialNotFound {
                path: path.display().to_string(),
                message: e.to_string(),
            }),
        }
    }
}

/// Validated TLS configuration for the shared client
#[derive(Clone)]
pub struct TlsProfile {
    /// Combined certificate chain and private key, PEM encoded
    identity_pem: Option<Vec<u8>>,
    /// Trust roots replacing the system store when non-empty
    roots: Vec<reqwest::Certificate>,
    /// Whether to verify server certificates
    pub verify: bool,
}

impl Default for TlsProfile {
    fn default() -> Self {
        Self { identity_pem: None, roots: Vec::new(), verify: true }
    }
}

impl std::fmt::Debug for TlsProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsProfile")
            .field("client_certificate", &self.identity_pem.is_some())
            .field("roots", &self.roots.len())
            .field("verify", &self.verify)
            .finish()
    }
}

impl TlsProfile {
    /// Load and validate client certificate, key and CA material.
    ///
    /// Certificate and key must be the same kind of source (both inline or
    /// both files); mixing them is rejected before anything is read.
    pub fn load(
        cert: Option<&PemSource>,
        key: Option<&PemSource>,
        ca: Option<&PemSource>,
    ) -> Result<Self> {
        let identity_pem = match (cert, key) {
            (Some(cert), Some(key)) => {
                if cert.is_inline() != key.is_inline() {
                    return Err(VolleyError::MixedCredentialFormat);
                }
                let cert_data = cert.load()?;
                let key_data = key.load()?;
                Some(load_identity(&cert_data, Some(&key_data), &cert.describe())?)
            }
            (Some(cert), None) => {
                let cert_data = cert.load()?;
                Some(load_identity(&cert_data, None, &cert.describe())?)
            }
            (None, Some(key)) => {
                return Err(VolleyError::InvalidClientCertificate(format!(
                    "private key {} given without a certificate",
                    key.describe()
                )))
            }
            (None, None) => None,
        };

        let roots = match ca {
            Some(ca) => {
                let roots = load_ca_bundle(&ca.load()?, &ca.describe())?;
                debug!(ca = %ca.describe(), certificates = roots.len(), "loaded trust roots");
                roots
            }
            None => Vec::new(),
        };

        Ok(Self { identity_pem, roots, verify: true })
    }

    pub fn has_client_certificate(&self) -> bool {
        self.identity_pem.is_some()
    }

    pub fn has_custom_roots(&self) -> bool {
        !self.roots.is_empty()
    }

    /// Apply TLS settings to a reqwest ClientBuilder
    pub fn apply_to_builder(
        &self,
        mut builder: reqwest::ClientBuilder,
    ) -> Result<reqwest::ClientBuilder> {
        if !self.verify {
            builder = builder.danger_accept_invalid_certs(true);
        }

        // A custom bundle replaces the system trust store
        if !self.roots.is_empty() {
            builder = builder.tls_certs_only(self.roots.iter().cloned());
        }

        if let Some(pem) = &self.identity_pem {
            let identity = reqwest::Identity::from_pem(pem)
                .map_err(|e| VolleyError::InvalidClientCertificate(e.to_string()))?;
            builder = builder.identity(identity);
        }

        Ok(builder)
    }
}

/// Validate a certificate chain plus private key and combine them into one
/// PEM document. Without a separate key the certificate PEM must carry one.
fn load_identity(cert_data: &[u8], key_data: Option<&[u8]>, origin: &str) -> Result<Vec<u8>> {
    let chain = rustls_pemfile::certs(&mut &cert_data[..])
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| VolleyError::InvalidClientCertificate(format!("{}: {}", origin, e)))?;
    if chain.is_empty() {
        return Err(VolleyError::InvalidClientCertificate(format!(
            "{}: no certificate found",
            origin
        )));
    }

    let key_source = key_data.unwrap_or(cert_data);
    match rustls_pemfile::private_key(&mut &key_source[..]) {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Err(VolleyError::InvalidClientCertificate(format!(
                "{}: no private key found",
                origin
            )))
        }
        Err(e) => {
            return Err(VolleyError::InvalidClientCertificate(format!("{}: {}", origin, e)))
        }
    }

    let mut combined = cert_data.to_vec();
    if let Some(key) = key_data {
        combined.extend_from_slice(b"\n");
        combined.extend_from_slice(key);
    }

    reqwest::Identity::from_pem(&combined)
        .map_err(|e| VolleyError::InvalidClientCertificate(format!("{}: {}", origin, e)))?;

    Ok(combined)
}

/// Parse every certificate in a PEM bundle
fn load_ca_bundle(data: &[u8], origin: &str) -> Result<Vec<reqwest::Certificate>> {
    let mut certs = Vec::new();

    for cert_result in rustls_pemfile::certs(&mut &data[..]) {
        let cert = cert_result
            .map_err(|e| VolleyError::InvalidCertificate(format!("{}: {}", origin, e)))?;
        let cert = reqwest::Certificate::from_der(&cert)
            .map_err(|e| VolleyError::InvalidCertificate(format!("{}: {}", origin, e)))?;
        certs.push(cert);
    }

    if certs.is_empty() {
        return Err(VolleyError::InvalidCertificate(format!(
            "{}: no PEM certificate found",
            origin
        )));
    }

    Ok(certs)
}
