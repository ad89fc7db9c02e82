//! Core view-virtualization engine for the Mirage proxy.
//!
//! The pieces here sit between untrusted client requests and a rate-limited
//! upstream media server: a pure codec that invents stable identities for
//! items that do not exist upstream, a bounded-concurrency hydrator, a view
//! compositor that merges native and virtual libraries, a deterministic
//! sort/paginate engine, and a single-flight TTL cache for the expensive
//! materialization work.
//!
//! The HTTP front door lives in `mirage-server`; the collection store and
//! the upstream server are consumed through the [`membership::MembershipReader`]
//! and [`upstream::UpstreamClient`] traits.

pub mod cache;
pub mod compositor;
pub mod error;
pub mod hydrator;
pub mod membership;
pub mod options;
pub mod sorting;
pub mod token;
pub mod upstream;

pub use error::{ProxyError, Result};
pub use options::{ProxyOptions, ViewOrder};
