//! Per-request capture records, one pretty-printed JSON document per request.
//!
//! Records land in `<dump>/<YYYY-MM-DD>/<uuid>.json`. Every file name is fresh,
//! so captures never contend with each other or with the wordlist store.

use crate::error::HoneypotError;
use crate::models::InboundRequest;
use chrono::{Local, SecondsFormat};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use uuid::Uuid;

/// A header as captured: one value collapses to a string, repeats stay a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum HeaderField {
    Single(String),
    Multiple(Vec<String>),
}

#[derive(Debug, Clone, Serialize)]
pub struct CaptureRecord {
    pub time: String,
    pub method: String,
    pub url: String,
    pub proto: String,
    pub remote_addr: String,
    pub headers: BTreeMap<String, HeaderField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl CaptureRecord {
    /// Snapshot of `request`; the body buffer is only read, never consumed.
    pub fn from_request(request: &InboundRequest) -> Self {
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in request.headers.iter() {
            grouped
                .entry(name.as_str().to_string())
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }
        let headers = grouped
            .into_iter()
            .map(|(name, mut values)| {
                let field = if values.len() == 1 {
                    HeaderField::Single(values.remove(0))
                } else {
                    HeaderField::Multiple(values)
                };
                (name, field)
            })
            .collect();

        let body = if request.body.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(&request.body).into_owned())
        };

        Self {
            time: Local::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            method: request.method.to_string(),
            url: request.uri.to_string(),
            proto: request.protocol().to_string(),
            remote_addr: request
                .remote_addr
                .map(|a| a.to_string())
                .unwrap_or_default(),
            headers,
            body,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CaptureWriter {
    root: PathBuf,
}

impl CaptureWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Writes a record for `request` and returns where it went.
    pub async fn capture(&self, request: &InboundRequest) -> Result<PathBuf, HoneypotError> {
        let record = CaptureRecord::from_request(request);
        let mut json = serde_json::to_string_pretty(&record)?;
        json.push('\n');

        let dir = self.root.join(Local::now().format("%Y-%m-%d").to_string());
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| HoneypotError::CaptureWrite {
                path: dir.clone(),
                source,
            })?;

        let path = dir.join(format!("{}.json", Uuid::new_v4()));
        tokio::fs::write(&path, json)
            .await
            .map_err(|source| HoneypotError::CaptureWrite {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}
