//! Shared helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! `format` turns wire values (timestamps, amounts, statuses) into display
//! strings for pages and the CLI; `timeout` bounds futures on both native and
//! browser runtimes.

pub mod format;
pub mod timeout;
