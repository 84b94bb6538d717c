// SPDX-License-Identifier: LGPL-3.0-or-later

//! Library error taxonomy.

use thiserror::Error;

/// Errors surfaced by the coefficient designers and bank configuration.
///
/// The engine clamps every parameter to its declared range before it
/// reaches a designer, so observing one of these at runtime indicates an
/// internal consistency bug rather than a user-facing failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DesignError {
    /// A design-time input was outside its valid range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),
}
