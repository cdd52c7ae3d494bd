//! Shared fixtures for assembly and dispatch tests.

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};

/// Create one collection directory with the given subdirectories.
pub fn make_collection(root: &Path, name: &str, subdirs: &[&str]) -> PathBuf {
    let dir = root.join(name);
    for sub in subdirs {
        fs::create_dir_all(dir.join(sub)).unwrap();
    }
    dir
}

/// Write a small CDX index with one capture of `url` per timestamp.
#[allow(dead_code)]
pub fn write_index(dir: &Path, url: &str, timestamps: &[&str]) -> PathBuf {
    let key = url
        .trim_start_matches("http://")
        .trim_start_matches("https://")
        .trim_end_matches('/');
    let lines: String = timestamps
        .iter()
        .map(|ts| format!("{key})/ {ts} {url} text/html 200 DIGEST archive.warc.gz\n"))
        .collect();

    let path = dir.join("captures.cdx");
    fs::write(&path, lines).unwrap();
    path
}

/// Passed-config mapping under construction.
#[derive(Default)]
pub struct ConfigBuilder {
    mapping: Mapping,
    collections: Mapping,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.mapping.insert(key.into(), value.into());
        self
    }

    pub fn collection(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.collections.insert(name.into(), value.into());
        self
    }

    pub fn build(mut self) -> Mapping {
        if !self.collections.is_empty() {
            self.mapping
                .insert("collections".into(), Value::Mapping(self.collections));
        }
        self.mapping
    }
}

/// Route names in dispatch order.
#[allow(dead_code)]
pub fn route_names(router: &replay_gateway::Router) -> Vec<String> {
    router
        .routes()
        .iter()
        .map(|route| route.name().to_string())
        .collect()
}
