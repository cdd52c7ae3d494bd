//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! merged collection table
//!     → assembler.rs (handler construction, ordered route list)
//!     → reference-resolution pass (complete registry)
//!     → router.rs (archival | proxy variant, router-wide views)
//!     → frozen Router, handed to the transport
//!
//! Request dispatch (at runtime):
//!     path → first route whose name-prefix matches, in route order
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Route order expresses match priority: collections first, each
//!   followed by its CDX siblings, then debug routes, then statics
//! - Prefix matches only on segment boundaries, so overlapping names
//!   (`a` vs `a-cdx`) cannot shadow each other

pub mod assembler;
pub mod route;
pub mod router;

pub use assembler::{create_cdx_router, create_router, create_router_with_handlers};
pub use route::{RequestKind, Route, RouteClass};
pub use router::{Router, RouterKind};
