//! JSON resources around the engine: `config.json` (documents and limits),
//! `requests.json` (queries) and `answers.json` (ranked results).

use crate::config::{APP_VERSION, DEFAULT_RESPONSES_LIMIT};
use crate::index::DocId;
use crate::search::RelevanceResult;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

pub struct ResourcePaths {
    pub root: PathBuf,
}

impl ResourcePaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn config(&self) -> PathBuf { self.root.join("config.json") }
    pub fn requests(&self) -> PathBuf { self.root.join("requests.json") }
    pub fn answers(&self) -> PathBuf { self.root.join("answers.json") }

    /// Where a document listed in `config.json` actually lives: relative paths
    /// are taken from the resources root, and a path that does not exist falls
    /// back to a file of the same name directly inside the root.
    pub fn resolve_document(&self, listed: &str) -> PathBuf {
        let listed = Path::new(listed);
        let path = if listed.is_relative() { self.root.join(listed) } else { listed.to_path_buf() };
        if !path.exists() {
            if let Some(name) = listed.file_name() {
                let fallback = self.root.join(name);
                if fallback.exists() {
                    return fallback;
                }
            }
        }
        path
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    config: Option<ConfigSection>,
    #[serde(default)]
    files: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct ConfigSection {
    name: Option<String>,
    version: Option<String>,
    max_responses: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub name: Option<String>,
    pub version: Option<String>,
    pub max_responses: usize,
    pub files: Vec<String>,
}

pub fn load_config(paths: &ResourcePaths) -> Result<Config> {
    let path = paths.config();
    if !path.exists() {
        bail!("config file is missing");
    }
    let f = File::open(&path).with_context(|| format!("cannot open {}", path.display()))?;
    let file: ConfigFile = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("cannot parse {}", path.display()))?;
    let Some(section) = file.config else {
        bail!("config file is empty");
    };
    if let Some(version) = &section.version {
        if version != APP_VERSION {
            bail!("config.json has incorrect file version");
        }
    }
    let max_responses = section
        .max_responses
        .as_ref()
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
        .filter(|n| *n > 0)
        .map(|n| n as usize)
        .unwrap_or(DEFAULT_RESPONSES_LIMIT);
    Ok(Config { name: section.name, version: section.version, max_responses, files: file.files.unwrap_or_default() })
}

/// Read every document listed in the config. Files that are missing or
/// unreadable are logged and skipped, so ids follow the loaded files only.
pub fn load_documents(paths: &ResourcePaths, config: &Config) -> Vec<String> {
    let mut docs = Vec::with_capacity(config.files.len());
    for listed in &config.files {
        let path = paths.resolve_document(listed);
        if !path.exists() {
            tracing::error!(path = %path.display(), "document file not found");
            continue;
        }
        // non-UTF-8 bytes only ever separate words, so decode lossily
        match fs::read(&path) {
            Ok(bytes) => docs.push(String::from_utf8_lossy(&bytes).into_owned()),
            Err(err) => tracing::error!(path = %path.display(), error = %err, "cannot read document file"),
        }
    }
    tracing::info!(listed = config.files.len(), loaded = docs.len(), "documents loaded");
    docs
}

#[derive(Debug, Deserialize)]
struct RequestsFile {
    #[serde(default)]
    requests: Option<Vec<String>>,
}

/// Queries from `requests.json`; no file means no queries.
pub fn load_requests(paths: &ResourcePaths) -> Result<Vec<String>> {
    let path = paths.requests();
    if !path.exists() {
        tracing::warn!(path = %path.display(), "requests file not found");
        return Ok(Vec::new());
    }
    let f = File::open(&path).with_context(|| format!("cannot open {}", path.display()))?;
    let file: RequestsFile = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("cannot parse {}", path.display()))?;
    Ok(file.requests.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelevanceEntry {
    pub docid: DocId,
    pub rank: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub result: String, // "true" or "false"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance: Option<Vec<RelevanceEntry>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswersFile {
    pub answers: BTreeMap<String, Answer>,
}

pub fn request_key(position: usize) -> String { format!("request{:03}", position + 1) }

impl AnswersFile {
    pub fn from_results(results: &[Vec<RelevanceResult>]) -> Self {
        let answers = results
            .iter()
            .enumerate()
            .map(|(i, list)| {
                let answer = if list.is_empty() {
                    Answer { result: "false".into(), relevance: None }
                } else {
                    let relevance = list.iter().map(|r| RelevanceEntry { docid: r.doc_id, rank: r.rank }).collect();
                    Answer { result: "true".into(), relevance: Some(relevance) }
                };
                (request_key(i), answer)
            })
            .collect();
        Self { answers }
    }
}

pub fn save_answers(paths: &ResourcePaths, results: &[Vec<RelevanceResult>]) -> Result<()> {
    let path = paths.answers();
    let mut f = File::create(&path).with_context(|| format!("cannot create {}", path.display()))?;
    let json = serde_json::to_string_pretty(&AnswersFile::from_results(results))?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_answers(paths: &ResourcePaths) -> Result<AnswersFile> {
    let path = paths.answers();
    let f = File::open(&path).with_context(|| format!("cannot open {}", path.display()))?;
    let answers = serde_json::from_reader(BufReader::new(f))?;
    Ok(answers)
}
