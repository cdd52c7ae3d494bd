//! Debug echo handlers, enabled by `debug_echo_env` / `debug_echo_req`.

use std::env;

/// Echoes the process environment.
#[derive(Debug, Default)]
pub struct EchoEnvHandler;

impl EchoEnvHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self) -> String {
        let mut vars: Vec<(String, String)> = env::vars().collect();
        vars.sort();
        vars.iter()
            .map(|(key, value)| format!("{key}={value}\n"))
            .collect()
    }
}

/// Echoes the incoming request line and headers.
#[derive(Debug, Default)]
pub struct EchoReqHandler;

impl EchoReqHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, method: &str, path: &str, headers: &[(String, String)]) -> String {
        let mut out = format!("{method} {path}\n");
        for (name, value) in headers {
            out.push_str(&format!("{name}: {value}\n"));
        }
        out
    }
}
