//! CDDIS archive retrieval over explicit TLS FTP.
use std::io::ErrorKind;
use std::net::ToSocketAddrs;

use log::{debug, info};
use suppaftp::{
    native_tls::TlsConnector, types::FileType, FtpError, NativeTlsConnector, NativeTlsFtpStream,
};

use crate::archive::{lzw, EphemerisSource, GpsWeekDay};
use crate::cfg::ArchiveConfig;
use crate::error::Error;

/// Production [EphemerisSource]: one authenticated control session to the
/// CDDIS archive, one `RETR` per requested key.
pub struct CddisFtp {
    cfg: ArchiveConfig,
    stream: NativeTlsFtpStream,
}

impl CddisFtp {
    /// Establishes the secured control session and logs in with the
    /// archive's public credential pair. Any failure here is fatal for
    /// the whole request: no epoch can be solved without ephemerides.
    pub fn connect(cfg: &ArchiveConfig) -> Result<Self, Error> {
        let addr = (cfg.host.as_str(), cfg.port)
            .to_socket_addrs()
            .map_err(|e| Error::Connection(e.to_string()))?
            .next()
            .ok_or_else(|| Error::Connection(format!("{}: no reachable address", cfg.host)))?;

        debug!("connecting to {} ({})", cfg.host, addr);
        let stream = NativeTlsFtpStream::connect_timeout(addr, cfg.timeout)
            .map_err(classify_transport)?;

        // the archive chain does not verify against common root stores
        let tls = TlsConnector::builder()
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| Error::Connection(e.to_string()))?;

        let mut stream = stream
            .into_secure(NativeTlsConnector::from(tls), &cfg.host)
            .map_err(classify_transport)?;

        stream
            .get_ref()
            .set_read_timeout(Some(cfg.timeout))
            .map_err(|e| Error::Connection(e.to_string()))?;

        stream
            .login(&cfg.username, &cfg.password)
            .map_err(|e| Error::Login(e.to_string()))?;

        stream
            .transfer_type(FileType::Binary)
            .map_err(classify_transport)?;

        info!("logged into {}", cfg.host);
        Ok(Self {
            cfg: cfg.clone(),
            stream,
        })
    }
}

impl EphemerisSource for CddisFtp {
    fn fetch(&mut self, key: GpsWeekDay) -> Result<Vec<u8>, Error> {
        let path = key.remote_path(&self.cfg.product_root);
        debug!("RETR {}", path);
        let compressed = self
            .stream
            .retr_as_buffer(&path)
            .map_err(|e| match e {
                // typically 550: product not published yet for that key
                FtpError::UnexpectedResponse(response) => Error::ProductNotFound {
                    week: key.week,
                    day: key.day,
                    reason: format!("{:?}", response.status),
                },
                other => classify_transport(other),
            })?
            .into_inner();
        debug!("{}: retrieved {} compressed bytes", key, compressed.len());
        lzw::decompress(&compressed)
    }
}

impl Drop for CddisFtp {
    fn drop(&mut self) {
        let _ = self.stream.quit();
    }
}

/// Timeouts are retryable and must stay distinguishable from plain
/// connection errors.
fn classify_transport(e: FtpError) -> Error {
    match &e {
        FtpError::ConnectionError(io)
            if matches!(io.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) =>
        {
            Error::Timeout(e.to_string())
        },
        _ => Error::Connection(e.to_string()),
    }
}
