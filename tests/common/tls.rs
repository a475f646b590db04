//! HTTPS test server
//!
//! A rustls acceptor on its own thread and runtime, so blocking CLI calls in
//! the test body don't stall it. Every request gets `200` with a body naming
//! whether the client presented a certificate signed by the test CA.

use std::io::BufReader;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rustls::server::WebPkiClientVerifier;
use rustls::{RootCertStore, ServerConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_rustls::TlsAcceptor;

pub const ANONYMOUS_BODY: &str = "anonymous";
pub const CLIENT_CERT_BODY: &str = "client-cert";

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

fn read_certs(name: &str) -> Vec<rustls::pki_types::CertificateDer<'static>> {
    let file = std::fs::File::open(fixture(name)).unwrap();
    rustls_pemfile::certs(&mut BufReader::new(file))
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

fn read_key(name: &str) -> rustls::pki_types::PrivateKeyDer<'static> {
    let file = std::fs::File::open(fixture(name)).unwrap();
    rustls_pemfile::private_key(&mut BufReader::new(file)).unwrap().unwrap()
}

fn server_config() -> ServerConfig {
    let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());

    let mut roots = RootCertStore::empty();
    for cert in read_certs("ca.crt") {
        roots.add(cert).unwrap();
    }
    let verifier = WebPkiClientVerifier::builder_with_provider(Arc::new(roots), provider.clone())
        .allow_unauthenticated()
        .build()
        .unwrap();

    ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_client_cert_verifier(verifier)
        .with_single_cert(read_certs("server.crt"), read_key("server.key"))
        .unwrap()
}

/// HTTPS server presenting `server.crt` (issued by `ca.crt` for 127.0.0.1)
pub struct TlsServer {
    addr: SocketAddr,
    served: Arc<AtomicUsize>,
    client_certs: Arc<AtomicUsize>,
}

impl TlsServer {
    pub fn start() -> Self {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let addr = listener.local_addr().unwrap();
        let acceptor = TlsAcceptor::from(Arc::new(server_config()));

        let served = Arc::new(AtomicUsize::new(0));
        let client_certs = Arc::new(AtomicUsize::new(0));
        let (served_in, certs_in) = (served.clone(), client_certs.clone());

        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).unwrap();
                loop {
                    let Ok((stream, _)) = listener.accept().await else { continue };
                    let acceptor = acceptor.clone();
                    let (served, certs) = (served_in.clone(), certs_in.clone());
                    tokio::spawn(async move {
                        // Handshakes rejected by the client end here
                        let Ok(mut tls) = acceptor.accept(stream).await else { return };
                        let presented = tls.get_ref().1.peer_certificates().is_some();
                        if presented {
                            certs.fetch_add(1, Ordering::SeqCst);
                        }

                        let mut request = Vec::new();
                        let mut buf = [0u8; 1024];
                        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                            match tls.read(&mut buf).await {
                                Ok(0) | Err(_) => return,
                                Ok(n) => request.extend_from_slice(&buf[..n]),
                            }
                        }

                        let body = if presented { CLIENT_CERT_BODY } else { ANONYMOUS_BODY };
                        let response = format!(
                            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            body.len(),
                            body
                        );
                        served.fetch_add(1, Ordering::SeqCst);
                        if tls.write_all(response.as_bytes()).await.is_ok() {
                            let _ = tls.shutdown().await;
                        }
                    });
                }
            });
        });

        Self { addr, served, client_certs }
    }

    pub fn uri(&self) -> String {
        format!("https://{}", self.addr)
    }

    /// Requests received after a completed handshake
    pub fn served(&self) -> usize {
        self.served.load(Ordering::SeqCst)
    }

    /// Handshakes where the client presented a verified certificate
    pub fn client_certificates(&self) -> usize {
        self.client_certs.load(Ordering::SeqCst)
    }
}
