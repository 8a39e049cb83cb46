//! `UploadServer`
//!
//! Application based on the [Abscissa] framework.
//!
//! [Abscissa]: https://github.com/iqlusioninc/abscissa

pub mod acl;
pub mod application;
pub mod auth;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod log;
pub mod naming;
pub mod prelude;
pub mod state;
pub mod storage;
pub mod web;

#[cfg(test)]
pub(crate) mod test_helpers;
