//! Path-based detection of files that look like secrets, build output or
//! scratch files.
//!
//! Only paths are inspected, never file contents. A secret inside an
//! ordinary-looking file name is not detected.

pub mod rules;

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::changeset::{ChangeSet, FileChange};
use crate::error::SensitiveContentWarning;

/// Why a path was flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitiveReason {
    EnvFile,
    CredentialNameMatch,
    BuildArtifact,
    TempFile,
    CertKeyFile,
}

impl fmt::Display for SensitiveReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SensitiveReason::EnvFile => "environment file",
            SensitiveReason::CredentialNameMatch => "name suggests credentials",
            SensitiveReason::BuildArtifact => "build artifact or dependency directory",
            SensitiveReason::TempFile => "temporary, log or OS metadata file",
            SensitiveReason::CertKeyFile => "certificate or private key",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensitiveFinding {
    pub path: String,
    pub reason: SensitiveReason,
}

impl fmt::Display for SensitiveFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.path, self.reason)
    }
}

/// Reasons a single file matches, in rule order.
pub fn reasons_for(file: &FileChange) -> Vec<SensitiveReason> {
    let name = file.file_name();
    let extension = file.extension();
    let ext = extension.as_deref();
    let mut reasons = Vec::new();

    if rules::is_env_file(name) {
        reasons.push(SensitiveReason::EnvFile);
    }
    if rules::names_credential(name) {
        reasons.push(SensitiveReason::CredentialNameMatch);
    }
    if rules::in_artifact_dir(&file.directories()) {
        reasons.push(SensitiveReason::BuildArtifact);
    }
    if rules::is_temp_file(name, ext) {
        reasons.push(SensitiveReason::TempFile);
    }
    if rules::is_cert_or_key(name, ext) {
        reasons.push(SensitiveReason::CertKeyFile);
    }
    reasons
}

/// Scan every file in the change set. An empty result means no findings.
pub fn scan(change_set: &ChangeSet) -> Vec<SensitiveFinding> {
    let findings: Vec<SensitiveFinding> = change_set
        .files()
        .iter()
        .flat_map(|file| {
            reasons_for(file).into_iter().map(|reason| SensitiveFinding {
                path: file.path.clone(),
                reason,
            })
        })
        .collect();

    debug!(files = change_set.len(), findings = findings.len(), "Sensitive scan complete");
    findings
}

/// Like [`scan`], but as a gate: `Err` carries every finding.
pub fn check(change_set: &ChangeSet) -> Result<(), SensitiveContentWarning> {
    let findings = scan(change_set);
    if findings.is_empty() {
        Ok(())
    } else {
        Err(SensitiveContentWarning { findings })
    }
}
