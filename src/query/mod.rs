//! Archival index query engine.
//!
//! # Responsibilities
//! - Validate index configuration at construction (startup-fatal)
//! - Answer "what captures exist for this URL" against plain-text
//!   CDX index files, or against a remote CDX endpoint
//!
//! # Design Decisions
//! - Construction is synchronous and validating; lookup is async and
//!   deliberately minimal (line scan / single GET); search
//!   sophistication is not this crate's concern
//! - Local vs. remote is a closed `ServerClass` choice made from the
//!   `server_cls` config tag

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_yaml::Value;
use thiserror::Error;
use url::Url;

use crate::config::{ConfigError, LayeredConfig, Result};
use crate::views::View;

/// Which index server implementation backs a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServerClass {
    /// Scan local CDX files.
    #[default]
    Cdx,
    /// Proxy lookups to a remote CDX endpoint.
    RemoteCdx,
}

impl ServerClass {
    /// Resolve a `server_cls` config tag; unset falls back to the
    /// built-in local variant.
    pub fn from_tag(tag: Option<&str>) -> Result<Self> {
        match tag {
            None | Some("cdx") => Ok(ServerClass::Cdx),
            Some("remote-cdx") => Ok(ServerClass::RemoteCdx),
            Some(other) => Err(ConfigError::UnknownClass {
                kind: "server_cls",
                tag: other.to_string(),
            }),
        }
    }
}

/// One line of a CDX index.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CdxCapture {
    pub urlkey: String,
    pub timestamp: String,
    pub original: String,
    pub mimetype: Option<String>,
    pub statuscode: Option<String>,
    pub digest: Option<String>,
    pub filename: Option<String>,
}

impl CdxCapture {
    /// Parse a whitespace-separated CDX line. Lines with fewer than
    /// the three mandatory fields are ignored.
    pub fn parse(line: &str) -> Option<Self> {
        let mut fields = line.split_whitespace();
        let urlkey = fields.next()?.to_string();
        let timestamp = fields.next()?.to_string();
        let original = fields.next()?.to_string();

        let mut rest = fields.map(str::to_string);
        Some(Self {
            urlkey,
            timestamp,
            original,
            mimetype: rest.next(),
            statuscode: rest.next(),
            digest: rest.next(),
            filename: rest.last(),
        })
    }
}

/// Errors raised while answering a query.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("index read failed")]
    Io(#[from] std::io::Error),

    #[error("remote index request failed")]
    Remote(#[from] reqwest::Error),
}

/// Resolves archived captures for a URL against one collection's
/// index locations.
#[derive(Debug)]
pub struct QueryEngine {
    index_paths: Vec<String>,
    server: ServerClass,
    rules_file: Option<PathBuf>,
    html_view: Option<View>,
    client: reqwest::Client,
}

impl QueryEngine {
    /// Construct from a normalized collection config. `index_paths`
    /// must be present; local paths must exist on disk and remote
    /// endpoints must parse as URLs.
    pub fn from_config(
        config: &LayeredConfig,
        rules_file: Option<&str>,
        html_view: Option<View>,
        server: ServerClass,
    ) -> Result<Self> {
        let index_paths = index_paths_value(config.get("index_paths"))?;

        for path in &index_paths {
            match server {
                ServerClass::Cdx => {
                    if !Path::new(path).exists() {
                        return Err(ConfigError::UnreadableIndex { path: path.clone() });
                    }
                }
                ServerClass::RemoteCdx => {
                    if Url::parse(path).is_err() {
                        return Err(ConfigError::UnreadableIndex { path: path.clone() });
                    }
                }
            }
        }

        let rules_file = match rules_file {
            Some(path) => {
                let path = PathBuf::from(path);
                if !path.is_file() {
                    return Err(ConfigError::MissingRulesFile { path });
                }
                Some(path)
            }
            None => None,
        };

        Ok(Self {
            index_paths,
            server,
            rules_file,
            html_view,
            client: reqwest::Client::new(),
        })
    }

    pub fn index_paths(&self) -> &[String] {
        &self.index_paths
    }

    pub fn server_class(&self) -> ServerClass {
        self.server
    }

    pub fn rules_file(&self) -> Option<&Path> {
        self.rules_file.as_deref()
    }

    pub fn html_view(&self) -> Option<&View> {
        self.html_view.as_ref()
    }

    /// Captures for `url`, at most `limit`, oldest first.
    pub async fn lookup(&self, url: &str, limit: usize) -> std::result::Result<Vec<CdxCapture>, QueryError> {
        match self.server {
            ServerClass::Cdx => self.lookup_local(url, limit),
            ServerClass::RemoteCdx => self.lookup_remote(url, limit).await,
        }
    }

    fn lookup_local(&self, url: &str, limit: usize) -> std::result::Result<Vec<CdxCapture>, QueryError> {
        let wanted = normalize_url(url);
        let mut captures = Vec::new();

        for location in &self.index_paths {
            let location = Path::new(location);
            if location.is_dir() {
                let mut files: Vec<PathBuf> = fs::read_dir(location)?
                    .filter_map(|entry| entry.ok())
                    .map(|entry| entry.path())
                    .filter(|path| is_index_file(path))
                    .collect();
                files.sort();
                for file in files {
                    scan_index_file(&file, &wanted, limit, &mut captures)?;
                }
            } else {
                scan_index_file(location, &wanted, limit, &mut captures)?;
            }
            if captures.len() >= limit {
                break;
            }
        }

        captures.truncate(limit);
        Ok(captures)
    }

    async fn lookup_remote(
        &self,
        url: &str,
        limit: usize,
    ) -> std::result::Result<Vec<CdxCapture>, QueryError> {
        let mut captures = Vec::new();

        for endpoint in &self.index_paths {
            let body = self
                .client
                .get(endpoint)
                .query(&[("url", url), ("limit", &limit.to_string())])
                .send()
                .await?
                .error_for_status()?
                .text()
                .await?;

            captures.extend(body.lines().filter_map(CdxCapture::parse));
            if captures.len() >= limit {
                break;
            }
        }

        captures.truncate(limit);
        Ok(captures)
    }
}

/// `index_paths` accepts a single path or a list of paths.
fn index_paths_value(value: Option<&Value>) -> Result<Vec<String>> {
    match value {
        Some(Value::String(path)) => Ok(vec![path.clone()]),
        Some(Value::Sequence(paths)) => paths
            .iter()
            .map(|entry| {
                entry.as_str().map(str::to_string).ok_or(ConfigError::InvalidValue {
                    key: "index_paths".to_string(),
                    expected: "a path or list of paths",
                })
            })
            .collect(),
        _ => Err(ConfigError::InvalidValue {
            key: "index_paths".to_string(),
            expected: "a path or list of paths",
        }),
    }
}

fn is_index_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("cdx") | Some("cdxj")
    )
}

fn scan_index_file(
    path: &Path,
    wanted: &str,
    limit: usize,
    captures: &mut Vec<CdxCapture>,
) -> std::result::Result<(), QueryError> {
    let content = fs::read_to_string(path)?;
    for line in content.lines() {
        if captures.len() >= limit {
            break;
        }
        if let Some(capture) = CdxCapture::parse(line) {
            if normalize_url(&capture.original) == wanted {
                captures.push(capture);
            }
        }
    }
    Ok(())
}

/// Scheme- and trailing-slash-insensitive comparison form.
fn normalize_url(url: &str) -> String {
    let stripped = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    stripped.trim_end_matches('/').to_ascii_lowercase()
}
