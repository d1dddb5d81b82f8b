//! Command implementations

pub mod copy;
