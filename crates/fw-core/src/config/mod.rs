//! # Pure Data Module - Data Transfer Objects Only
//!
//! ## Responsibilities
//!
//! - Define configuration data structures
//! - Provide TOML → DTO mapping
//!
//! ## Prohibited
//!
//! **No business logic, no validation, no default value calculation.**
//! Defaults and environment overrides are applied by the runtime bootstrap.

mod app_config;

pub use app_config::AppConfig;
