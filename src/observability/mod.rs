//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Gateway handler and dispatcher produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape), when enabled
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every log line of a gateway call
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
