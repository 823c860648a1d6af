// src/io/sink.rs

//! Pluggable output abstraction.
//!
//! The runtime hands emissions to an `OutputSink` instead of writing them
//! itself. Production uses [`StdoutSink`]; tests record emissions instead.

use std::future::Future;
use std::pin::Pin;

use tokio::io::{AsyncWrite, AsyncWriteExt, Stdout};

use crate::engine::Emission;
use crate::errors::Result;

/// Trait abstracting where emitted messages go.
pub trait OutputSink: Send {
    fn emit(
        &mut self,
        emissions: Vec<Emission>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Writes each emission as one NDJSON line: `{"output":1,"msg":{...}}`.
pub struct StdoutSink<W = Stdout> {
    out: W,
}

impl StdoutSink<Stdout> {
    pub fn new() -> Self {
        Self {
            out: tokio::io::stdout(),
        }
    }
}

impl Default for StdoutSink<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: AsyncWrite + Unpin + Send> StdoutSink<W> {
    /// Write to any async writer instead of stdout.
    pub fn with_writer(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: AsyncWrite + Unpin + Send> OutputSink for StdoutSink<W> {
    fn emit(
        &mut self,
        emissions: Vec<Emission>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            for emission in emissions {
                let mut line = serde_json::to_vec(&emission.to_json())?;
                line.push(b'\n');
                self.out.write_all(&line).await?;
            }
            self.out.flush().await?;
            Ok(())
        })
    }
}
