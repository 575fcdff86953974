use std::net::TcpStream;

use anyhow::{anyhow, Context as _};
use openssl::{
    ssl::{SslConnector, SslMethod, SslVerifyMode},
    x509::X509,
};

/// The certificates an API server presented, leaf first.
#[derive(Debug, Clone, Default)]
pub struct CertChain {
    certs: Vec<X509>,
}

impl CertChain {
    pub fn new(certs: Vec<X509>) -> Self {
        Self { certs }
    }

    pub fn len(&self) -> usize {
        self.certs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certs.is_empty()
    }

    /// All certificates as concatenated PEM blocks.
    pub fn to_pem(&self) -> anyhow::Result<String> {
        let mut pem = Vec::new();
        for cert in &self.certs {
            pem.extend(cert.to_pem().context("Encoding certificate as PEM")?);
        }
        Ok(String::from_utf8(pem)?)
    }
}

pub trait Probe {
    /// Connects to `host:port` and returns the presented certificate chain.
    /// Any error means the server is treated as unreachable.
    fn fetch_chain(&self, host: &str, port: u16) -> anyhow::Result<CertChain>;
}

/// Fetches certificate chains over a real TLS handshake with verification
/// turned off. Nothing is sent after the handshake.
pub struct TlsProbe {
    connector: SslConnector,
}

impl TlsProbe {
    pub fn new() -> anyhow::Result<Self> {
        let mut builder = SslConnector::builder(SslMethod::tls())?;
        builder.set_verify(SslVerifyMode::NONE);
        Ok(Self {
            connector: builder.build(),
        })
    }
}

impl Probe for TlsProbe {
    fn fetch_chain(&self, host: &str, port: u16) -> anyhow::Result<CertChain> {
        let tcp = TcpStream::connect((host, port))
            .with_context(|| format!("Connecting to {host}:{port}"))?;

        let mut config = self.connector.configure()?;
        // SNI is still sent so virtual-hosted API servers pick the right cert.
        config.set_verify_hostname(false);
        let stream = config
            .connect(host, tcp)
            .map_err(|e| anyhow!("TLS handshake with {host}:{port} failed: {e}"))?;

        let certs: Vec<X509> = stream
            .ssl()
            .peer_cert_chain()
            .map(|chain| chain.iter().map(|cert| cert.to_owned()).collect())
            .unwrap_or_default();

        Ok(CertChain::new(certs))
    }
}
