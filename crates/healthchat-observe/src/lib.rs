//! Observability for HealthChat: structured logging with an optional
//! OpenTelemetry span exporter.

pub mod tracing_setup;
