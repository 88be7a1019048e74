//! Integration tests for icap_exporter
//!
//! Each test starts a scripted ICAP peer on loopback and, where the HTTP
//! surface is under test, an exporter instance on an ephemeral port.
//!
//! Run with: cargo test --test integration

mod health;
mod helpers;
mod metrics;
mod probe;
