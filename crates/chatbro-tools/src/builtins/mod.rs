//! Builtins - small utilities available to every agent

mod datetime;

pub use datetime::CurrentDateTimeTool;
