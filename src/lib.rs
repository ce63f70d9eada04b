//! proforma - versioned record keeping for proforma documents
//!
//! Documents are stored as immutable JSON blobs named
//! `<id>--<timestamp>[-v<N>].json`; see [`store`].

pub mod cli;
pub mod http_server;
pub mod observability;
pub mod store;
