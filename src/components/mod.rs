//! Diagram components.

pub mod topology;
