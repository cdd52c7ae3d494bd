//! Template views.
//!
//! Rendering proper lives outside this crate's concern; a [`View`] is
//! a template loaded from disk plus a title, with just enough
//! substitution to serve home/error/capture pages. Missing template
//! files fail at startup, not at first request.

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Mapping;

use crate::config::{ConfigError, Result};

/// Owns the `template_globals` table and constructs views against it.
///
/// Globals are merged into every render context, with render-time
/// variables taking priority.
#[derive(Debug, Clone, Default)]
pub struct TemplateEnv {
    globals: Vec<(String, String)>,
}

impl TemplateEnv {
    pub fn new(globals: Option<&Mapping>) -> Self {
        let globals = globals
            .map(|mapping| {
                mapping
                    .iter()
                    .filter_map(|(k, v)| {
                        let key = k.as_str()?.to_string();
                        let value = v.as_str().map(str::to_string).or_else(|| {
                            v.as_u64().map(|n| n.to_string())
                        })?;
                        Some((key, value))
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self { globals }
    }

    /// Build a view from an optional template path. `None` yields no
    /// view; a path that cannot be read is a fatal error.
    pub fn create_template(
        &self,
        path: Option<&str>,
        fallback_title: &str,
    ) -> Result<Option<View>> {
        let Some(path) = path else {
            return Ok(None);
        };

        let path = PathBuf::from(path);
        let source = fs::read_to_string(&path).map_err(|source| ConfigError::Template {
            path: path.clone(),
            source,
        })?;

        Ok(Some(View {
            title: fallback_title.to_string(),
            path,
            source,
            globals: self.globals.clone(),
        }))
    }
}

/// A template loaded from disk.
#[derive(Debug, Clone)]
pub struct View {
    title: String,
    path: PathBuf,
    source: String,
    globals: Vec<(String, String)>,
}

impl View {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Substitute `{{ name }}` placeholders from render-time vars and
    /// the environment globals. Unknown placeholders are left as-is.
    pub fn render(&self, vars: &[(&str, &str)]) -> String {
        let mut out = self.source.clone();
        for (key, value) in vars {
            out = replace_placeholder(&out, key, value);
        }
        for (key, value) in &self.globals {
            out = replace_placeholder(&out, key, value);
        }
        out
    }
}

fn replace_placeholder(source: &str, key: &str, value: &str) -> String {
    source
        .replace(&format!("{{{{ {key} }}}}"), value)
        .replace(&format!("{{{{{key}}}}}"), value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn no_path_means_no_view() {
        let env = TemplateEnv::default();
        assert!(env.create_template(None, "Home Page").unwrap().is_none());
    }

    #[test]
    fn missing_template_fails_at_startup() {
        let env = TemplateEnv::default();
        let result = env.create_template(Some("/nonexistent/home.html"), "Home Page");
        assert!(matches!(result, Err(ConfigError::Template { .. })));
    }

    #[test]
    fn render_applies_vars_then_globals() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("home.html");
        let mut file = fs::File::create(&path).unwrap();
        write!(file, "<h1>{{{{ title }}}}</h1><p>{{{{ brand }}}}</p>").unwrap();

        let mut globals = Mapping::new();
        globals.insert("brand".into(), "replay-gateway".into());
        let env = TemplateEnv::new(Some(&globals));

        let view = env
            .create_template(Some(path.to_str().unwrap()), "Home Page")
            .unwrap()
            .unwrap();

        assert_eq!(view.title(), "Home Page");
        assert_eq!(
            view.render(&[("title", "Archives")]),
            "<h1>Archives</h1><p>replay-gateway</p>"
        );
    }
}
