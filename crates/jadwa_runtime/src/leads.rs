//! Append-only CSV lead log.
//!
//! One row per submitted request under the header `Date,Project,City,Capital`.
//! A new file is staged in a temp file next to the log and linked into place
//! without clobbering, so it only ever appears with its header. Later rows are
//! serialized to a buffer and written with a single append-mode write.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use jadwa_core::Lead;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::error::{AnalysisError, Result};

pub const HEADER: [&str; 4] = ["Date", "Project", "City", "Capital"];

/// Gate for the read path: a SHA-256 digest of the admin token.
#[derive(Clone, Default)]
pub struct AdminAuth {
    digest: Option<[u8; 32]>,
}

impl std::fmt::Debug for AdminAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminAuth")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

impl AdminAuth {
    /// No digest configured: every read is refused.
    pub fn disabled() -> Self {
        Self { digest: None }
    }

    /// Build from a hex-encoded SHA-256 digest (`JADWA_ADMIN_TOKEN_SHA256`).
    pub fn from_hex_digest(hex_digest: &str) -> Result<Self> {
        let bytes = hex::decode(hex_digest.trim())
            .map_err(|e| AnalysisError::Config(format!("admin token digest is not hex: {e}")))?;
        let digest: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
            AnalysisError::Config(format!(
                "admin token digest must be 32 bytes, got {}",
                b.len()
            ))
        })?;
        Ok(Self {
            digest: Some(digest),
        })
    }

    /// Build directly from a plaintext token.
    pub fn from_token(token: &str) -> Self {
        Self {
            digest: Some(digest(token)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.digest.is_some()
    }

    pub fn verify(&self, token: &str) -> Result<()> {
        let Some(expected) = &self.digest else {
            return Err(AnalysisError::Unauthorized(
                "lead log reading is disabled: no admin token digest configured".to_string(),
            ));
        };
        if constant_time_eq(expected, &digest(token)) {
            Ok(())
        } else {
            tracing::warn!("rejected lead log read with invalid admin token");
            Err(AnalysisError::Unauthorized("invalid admin token".to_string()))
        }
    }
}

fn digest(token: &str) -> [u8; 32] {
    Sha256::digest(token.as_bytes()).into()
}

/// Hex digest for a token, as expected in `JADWA_ADMIN_TOKEN_SHA256`.
pub fn digest_token(token: &str) -> String {
    hex::encode(digest(token))
}

fn constant_time_eq(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[derive(Debug, Clone)]
pub struct LeadLog {
    path: PathBuf,
}

impl LeadLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(
        &self,
        project_name: &str,
        city: &str,
        capital: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        self.append_lead(&Lead::new(project_name, city, capital, timestamp))
    }

    pub fn append_lead(&self, lead: &Lead) -> Result<()> {
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                std::fs::create_dir_all(parent)?;
                parent
            }
            None => Path::new("."),
        };

        if !self.path.exists() && self.create_with_header(dir, lead)? {
            tracing::info!(path = %self.path.display(), "created lead log");
        } else {
            let mut file = OpenOptions::new().append(true).open(&self.path)?;
            file.write_all(&encode(lead, false)?)?;
        }

        tracing::debug!(project = %lead.project, city = %lead.city, "lead appended");
        Ok(())
    }

    /// Stage header and first row, then link into place. `false` when another
    /// writer created the log first.
    fn create_with_header(&self, dir: &Path, lead: &Lead) -> Result<bool> {
        let mut staged = NamedTempFile::new_in(dir)?;
        staged.write_all(&encode(lead, true)?)?;
        staged.as_file().sync_all()?;
        match staged.persist_noclobber(&self.path) {
            Ok(_) => Ok(true),
            Err(e) if e.error.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(e.error.into()),
        }
    }

    /// Every row, oldest first. A missing file is an empty log.
    pub fn read_all(&self, auth: &AdminAuth, token: &str) -> Result<Vec<Lead>> {
        auth.verify(token)?;

        let mut reader = match csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)
        {
            Ok(reader) => reader,
            Err(e) if is_not_found(&e) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut leads = Vec::new();
        for row in reader.deserialize::<Lead>() {
            leads.push(row?);
        }
        Ok(leads)
    }
}

fn is_not_found(err: &csv::Error) -> bool {
    matches!(err.kind(), csv::ErrorKind::Io(io) if io.kind() == ErrorKind::NotFound)
}

/// One row, optionally preceded by the header, as a single buffer.
fn encode(lead: &Lead, with_header: bool) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(with_header)
        .from_writer(Vec::new());
    writer.serialize(lead)?;
    writer
        .into_inner()
        .map_err(|e| AnalysisError::LeadLog(e.to_string()))
}
