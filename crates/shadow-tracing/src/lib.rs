//! Reusable tracing setup for shadow-rule services: fmt logging, optional
//! OTLP export, and span builders for rule administration.

pub mod config;
pub mod otlp;
pub mod spans;

pub use config::{LogFormat, OtlpProtocol, TracingConfig};
pub use otlp::{init_tracing, TracingGuard};
