//! # Autobind Support
//!
//! Shared text helpers for the autobind crates.
//!
//! This crate provides:
//! - Rendering of inheritance chains for hierarchy errors
//! - Short type names for `describe()` output
//! - "Did you mean?" suggestions for undescribed types

pub mod rendering;
