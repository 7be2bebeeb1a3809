//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep the console and scheduler decoupled from storage details.

pub mod curriculum;
pub mod dashboard_service;
pub mod notification_service;
pub mod sample_data;
pub mod study_service;
