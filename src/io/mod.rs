// src/io/mod.rs

//! Edges of the process: where input events come from and where emissions go.

pub mod input;
pub mod sink;

pub use input::spawn_line_reader;
pub use sink::{OutputSink, StdoutSink};
