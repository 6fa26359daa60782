//! Error types for the rewrite pipeline.
//!
//! Every error here is an internal invariant violation: the input is assumed
//! to have passed type checking, so a failure means an earlier phase (or an
//! earlier pass of this pipeline) produced a malformed tree. Passes propagate
//! these with `?` and the first one aborts the whole compilation unit.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompilerError {
    /// A pass found a node kind it cannot accept at this position.
    #[error("AST shape violation: {0}")]
    Shape(String),

    /// A type disagrees with the skeleton it is matched against, or fails a
    /// required predicate.
    #[error("Type shape violation: {0}")]
    TypeShape(String),

    /// The pipeline was configured with something the program does not provide.
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, CompilerError>;

#[macro_export]
macro_rules! err_shape {
    ($($arg:tt)*) => {
        $crate::error::CompilerError::Shape(format!($($arg)*))
    };
}

#[macro_export]
macro_rules! bail_shape {
    ($($arg:tt)*) => {
        return Err($crate::err_shape!($($arg)*))
    };
}

#[macro_export]
macro_rules! err_type_shape {
    ($($arg:tt)*) => {
        $crate::error::CompilerError::TypeShape(format!($($arg)*))
    };
}

#[macro_export]
macro_rules! bail_type_shape {
    ($($arg:tt)*) => {
        return Err($crate::err_type_shape!($($arg)*))
    };
}

#[macro_export]
macro_rules! err_config {
    ($($arg:tt)*) => {
        $crate::error::CompilerError::Config(format!($($arg)*))
    };
}

#[macro_export]
macro_rules! bail_config {
    ($($arg:tt)*) => {
        return Err($crate::err_config!($($arg)*))
    };
}
