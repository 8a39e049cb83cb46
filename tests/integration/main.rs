//! Integration tests for the `upload-server` binary

mod _impl;
mod acceptance;
