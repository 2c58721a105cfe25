//! PostgreSQL connection setup.
//!
//! One `execute` call exclusively owns the connection it is given; no
//! pooling is provided here, since the transactional protocol requires
//! a single serially-used connection per run.

use crate::error::{AnonError, Result};
use rustls::ClientConfig;
use std::fmt;
use std::sync::Arc;
use tokio_postgres::{Client, Config as PgConfig, NoTls};
use tokio_postgres_rustls::MakeRustlsConnect;
use tracing::{error, warn};

/// Connection settings, read from the standard `PG*` environment
/// variables.
#[derive(Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    /// One of: disable, require, verify-ca, verify-full.
    pub ssl_mode: String,
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("ssl_mode", &self.ssl_mode)
            .finish()
    }
}

fn env_var(name: &str, fallback: Option<&str>) -> Result<String> {
    match std::env::var(name) {
        Ok(v) => Ok(v),
        Err(_) => fallback
            .map(String::from)
            .ok_or_else(|| AnonError::Config(format!("Missing environment variable: {}", name))),
    }
}

impl DbConfig {
    /// Read connection settings from `PGHOST`, `PGPORT`, `PGDATABASE`,
    /// `PGUSER`, `PGPASSWORD`, and `PGSSLMODE`.
    pub fn from_env() -> Result<Self> {
        let port_raw = env_var("PGPORT", Some("5432"))?;
        let port: u16 = port_raw
            .parse()
            .map_err(|_| AnonError::Config(format!("Invalid PGPORT: {}", port_raw)))?;

        Ok(Self {
            host: env_var("PGHOST", Some("localhost"))?,
            port,
            database: env_var("PGDATABASE", None)?,
            user: env_var("PGUSER", None)?,
            password: env_var("PGPASSWORD", None)?,
            ssl_mode: env_var("PGSSLMODE", Some("disable"))?,
        })
    }

    /// Build the driver configuration.
    ///
    /// Every value goes through the tokio-postgres builder rather than
    /// a keyword/value string, so a password containing spaces, quotes,
    /// or `=` stays a password instead of becoming extra connection
    /// options.
    pub fn pg_config(&self) -> Result<PgConfig> {
        let ssl_mode = if SslMode::parse(&self.ssl_mode)?.requires_tls() {
            tokio_postgres::config::SslMode::Require
        } else {
            tokio_postgres::config::SslMode::Disable
        };

        let mut config = PgConfig::new();
        config
            .host(&self.host)
            .port(self.port)
            .dbname(&self.database)
            .user(&self.user)
            .password(&self.password)
            .ssl_mode(ssl_mode);
        Ok(config)
    }
}

/// Connect and spawn the connection driver task.
pub async fn connect(cfg: &DbConfig) -> Result<Client> {
    let pg_config = cfg.pg_config()?;
    let tls = TlsBuilder::parse(&cfg.ssl_mode)?.build()?;

    let client = match tls {
        Some(tls) => {
            let (client, connection) = pg_config.connect(tls).await?;
            tokio::spawn(async move {
                if let Err(e) = connection.await {
                    error!("Connection error: {}", e);
                }
            });
            client
        }
        None => {
            let (client, connection) = pg_config.connect(NoTls).await?;
            tokio::spawn(async move {
                if let Err(e) = connection.await {
                    error!("Connection error: {}", e);
                }
            });
            client
        }
    };

    Ok(client)
}

/// SSL verification modes, matching PostgreSQL's standard `sslmode`
/// parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SslMode {
    /// No SSL/TLS (plain TCP connection).
    #[default]
    Disable,
    /// Use SSL but don't verify the server certificate.
    /// **Security Warning**: Vulnerable to man-in-the-middle attacks.
    Require,
    /// Verify server certificate against CA roots.
    VerifyCa,
    /// Full certificate and hostname verification.
    VerifyFull,
}

impl SslMode {
    /// Parse an SSL mode from a string.
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "disable" | "" => Ok(SslMode::Disable),
            "require" => Ok(SslMode::Require),
            "verify-ca" => Ok(SslMode::VerifyCa),
            "verify-full" => Ok(SslMode::VerifyFull),
            other => Err(AnonError::Config(format!(
                "Invalid ssl_mode '{}'. Valid values: disable, require, verify-ca, verify-full",
                other
            ))),
        }
    }

    /// Check if this mode requires TLS.
    pub fn requires_tls(&self) -> bool {
        !matches!(self, SslMode::Disable)
    }
}

/// Builder for PostgreSQL TLS connectors.
pub struct TlsBuilder {
    ssl_mode: SslMode,
}

impl TlsBuilder {
    pub fn new(ssl_mode: SslMode) -> Self {
        Self { ssl_mode }
    }

    pub fn parse(ssl_mode: &str) -> Result<Self> {
        Ok(Self::new(SslMode::parse(ssl_mode)?))
    }

    /// Build a MakeRustlsConnect instance, or None if TLS is disabled.
    pub fn build(&self) -> Result<Option<MakeRustlsConnect>> {
        if !self.ssl_mode.requires_tls() {
            return Ok(None);
        }

        let mut root_store = rustls::RootCertStore::empty();
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        let config = match self.ssl_mode {
            SslMode::Disable => unreachable!("requires_tls checked above"),
            SslMode::Require => {
                warn!(
                    "ssl_mode=require enables TLS but does NOT verify the server certificate; \
                     use ssl_mode=verify-full for production"
                );
                ClientConfig::builder()
                    .dangerous()
                    .with_custom_certificate_verifier(Arc::new(NoVerifier))
                    .with_no_client_auth()
            }
            SslMode::VerifyCa | SslMode::VerifyFull => ClientConfig::builder()
                .with_root_certificates(root_store)
                .with_no_client_auth(),
        };

        Ok(Some(MakeRustlsConnect::new(config)))
    }
}

/// Certificate verifier that accepts any certificate.
///
/// Only used for `ssl_mode=require`, where encryption is wanted but
/// certificate validation is not.
#[derive(Debug)]
struct NoVerifier;

impl rustls::client::danger::ServerCertVerifier for NoVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &rustls::pki_types::CertificateDer<'_>,
        _intermediates: &[rustls::pki_types::CertificateDer<'_>],
        _server_name: &rustls::pki_types::ServerName<'_>,
        _ocsp_response: &[u8],
        _now: rustls::pki_types::UnixTime,
    ) -> std::result::Result<rustls::client::danger::ServerCertVerified, rustls::Error> {
        Ok(rustls::client::danger::ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &rustls::pki_types::CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &rustls::pki_types::CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        vec![
            rustls::SignatureScheme::RSA_PKCS1_SHA256,
            rustls::SignatureScheme::RSA_PKCS1_SHA384,
            rustls::SignatureScheme::RSA_PKCS1_SHA512,
            rustls::SignatureScheme::ECDSA_NISTP256_SHA256,
            rustls::SignatureScheme::ECDSA_NISTP384_SHA384,
            rustls::SignatureScheme::ECDSA_NISTP521_SHA512,
            rustls::SignatureScheme::RSA_PSS_SHA256,
            rustls::SignatureScheme::RSA_PSS_SHA384,
            rustls::SignatureScheme::RSA_PSS_SHA512,
            rustls::SignatureScheme::ED25519,
        ]
    }
}
