//! Toroidal Governance - recurring exploration/synthesis research cycles
//!
//! A cycle alternates between a divergent LightFace phase, which grows a
//! forest of exploration nodes, and a convergent DarkFace phase, which
//! clusters those nodes and distills them into a scored synthesis.
//! High-quality syntheses are emitted as memory atoms.
//!
//! The crate follows a hexagonal layout: `domain` holds the aggregates and
//! clustering algorithms, `ports` the store/generator/sink contracts,
//! `adapters` their implementations, and `application` the engines.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
