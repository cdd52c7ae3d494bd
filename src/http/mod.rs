//! HTTP transport.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, trace + timeout layers)
//!     → fallback handler: first-match route lookup, in route order
//!     → per-family response mapping (replay, live, cdx, static, echo)
//! ```
//!
//! # Design Decisions
//! - The assembled Router is the single source of dispatch truth; the
//!   transport adds no routes of its own
//! - Everything downstream of the route match is read-only

pub mod server;

pub use server::{serve, serve_on};
