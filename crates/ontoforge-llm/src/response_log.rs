//! Append-only JSON-lines audit log of LLM calls.
//!
//! One record per call, success or failure. Logging never fails a call: write
//! errors are reported through `tracing` and otherwise ignored.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};

use crate::{CallKind, CompletionRequest, LlmClient, LlmError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseRecord {
    /// RFC 3339, UTC.
    pub timestamp: String,
    pub kind: CallKind,
    pub status: CallStatus,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl ResponseRecord {
    pub fn new(kind: CallKind, model: &str, result: &Result<String, LlmError>) -> Self {
        let (status, output, error) = match result {
            Ok(text) => (CallStatus::Ok, Some(text.clone()), None),
            Err(e) => (CallStatus::Error, None, Some(e.to_string())),
        };
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            kind,
            status,
            model: model.to_string(),
            error,
            output,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResponseLog {
    path: PathBuf,
}

impl ResponseLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &ResponseRecord) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                anyhow!(
                    "failed to open response log `{}`: {e}",
                    self.path.display()
                )
            })?;

        let line = serde_json::to_string(record)?;
        f.write_all(line.as_bytes())?;
        f.write_all(b"\n")?;
        Ok(())
    }

    /// Read every record back (used by tests and tooling).
    pub fn read_all(&self) -> Result<Vec<ResponseRecord>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        text.lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).map_err(Into::into))
            .collect()
    }
}

/// Client decorator that records every call in a [`ResponseLog`].
pub struct LoggedClient<C> {
    inner: C,
    log: ResponseLog,
}

impl<C: LlmClient> LoggedClient<C> {
    pub fn new(inner: C, log: ResponseLog) -> Self {
        Self { inner, log }
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: LlmClient> LlmClient for LoggedClient<C> {
    fn model(&self) -> &str {
        self.inner.model()
    }

    fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let result = self.inner.complete(request);
        match &result {
            Ok(text) => tracing::debug!(kind = %request.kind, chars = text.len(), "llm call ok"),
            Err(e) => tracing::warn!(kind = %request.kind, error = %e, "llm call failed"),
        }
        let record = ResponseRecord::new(request.kind, self.inner.model(), &result);
        if let Err(e) = self.log.append(&record) {
            tracing::warn!(path = %self.log.path().display(), error = %e, "failed to write response log");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::ScriptedLlm;

    #[test]
    fn records_successes_and_failures() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = ResponseLog::new(dir.path().join("logs/llm_responses.jsonl"));
        let llm = ScriptedLlm::new()
            .respond("@prefix : <http://x/> .")
            .fail(LlmError::RateLimited {
                retry_after_secs: Some(3),
            });
        let client = LoggedClient::new(llm, log.clone());

        assert!(client
            .complete(&CompletionRequest::text(CallKind::Generate, "p1"))
            .is_ok());
        assert!(client
            .complete(&CompletionRequest::text(CallKind::Repair, "p2"))
            .is_err());

        let records = log.read_all().expect("read log");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, CallKind::Generate);
        assert_eq!(records[0].status, CallStatus::Ok);
        assert_eq!(records[0].model, "scripted");
        assert_eq!(records[0].output.as_deref(), Some("@prefix : <http://x/> ."));
        assert_eq!(records[1].kind, CallKind::Repair);
        assert_eq!(records[1].status, CallStatus::Error);
        assert!(records[1]
            .error
            .as_deref()
            .is_some_and(|e| e.contains("rate limited")));
    }

    #[test]
    fn unwritable_log_does_not_fail_the_call() {
        let dir = tempfile::tempdir().expect("tempdir");
        // A directory cannot be opened for appending.
        let log = ResponseLog::new(dir.path());
        let client = LoggedClient::new(ScriptedLlm::new().respond("ok"), log);
        assert_eq!(
            client
                .complete(&CompletionRequest::text(CallKind::Validate, "p"))
                .as_deref(),
            Ok("ok")
        );
    }

    #[test]
    fn missing_log_reads_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = ResponseLog::new(dir.path().join("none.jsonl"));
        assert!(log.read_all().expect("read").is_empty());
    }
}
