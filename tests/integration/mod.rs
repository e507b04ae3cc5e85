//! Integration tests for LabTrack
//!
//! These tests verify the behavior of the core services and API endpoints
//! with a real (in-memory) database and all middleware.

mod audit_tests;
mod notification_tests;
