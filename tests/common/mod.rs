//! Common test utilities for tracemap.
//!
//! This module provides shared fixtures and assertions for the end-to-end tests.

pub mod assertions;
pub mod image_utils;
pub mod test_data;
