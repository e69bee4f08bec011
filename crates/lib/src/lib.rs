//! pvscope core library: inspection service gateway, view routing and configuration
//! used by the CLI.

pub mod api;
pub mod config;
pub mod init;
pub mod router;
