//! Atelier - AI Orchestration Core for the Atelier Artwork Gallery
//!
//! This crate implements the unified AI orchestration layer: persona
//! resolution, provider selection with fallback, task-keyed prompt
//! configuration, concurrent artwork analysis, and the structured-result
//! contract handed to content-creation workflows.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
