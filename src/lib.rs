//! Barrage deploys a contract from every configured account and fires randomized interactions at it.

/// Command line interface.
pub mod cli;

/// Configuration.
pub mod config;

/// Actions.
pub mod actions;

/// Signing accounts.
pub mod account;

/// Contract artifacts.
pub mod artifact;

/// Operation catalog.
pub mod catalog;

/// Chain connector.
pub mod connector;

/// Errors.
pub mod error;

/// Key store.
pub mod keys;

/// Network registry.
pub mod registry;

/// Reporting.
pub mod report;

/// Utilities.
pub mod utils;
