//! Output sinks for diff blocks.
//!
//! Blocks are handed to a [`DiffSink`] one at a time, as soon as each is
//! computed, so output streams instead of arriving all at once at the end.

use std::io::{self, Write};

use serde::Serialize;

use crate::block::{ChangeKind, DiffBlock};

/// Receives diff blocks as they are produced.
pub trait DiffSink {
    fn emit(&mut self, block: &DiffBlock) -> io::Result<()>;
}

/// Collects blocks in memory.
impl DiffSink for Vec<DiffBlock> {
    fn emit(&mut self, block: &DiffBlock) -> io::Result<()> {
        self.push(block.clone());
        Ok(())
    }
}

impl<S: DiffSink + ?Sized> DiffSink for &mut S {
    fn emit(&mut self, block: &DiffBlock) -> io::Result<()> {
        (**self).emit(block)
    }
}

/// Writes blocks as plain unified-diff text, one blank line between blocks.
pub struct TextSink<W> {
    out: W,
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DiffSink for TextSink<W> {
    fn emit(&mut self, block: &DiffBlock) -> io::Result<()> {
        writeln!(self.out, "{block}")?;
        self.out.flush()
    }
}

/// Writes one JSON object per line per block.
pub struct JsonSink<W> {
    out: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[derive(Serialize)]
struct JsonBlock<'a> {
    service: &'a str,
    cluster: &'a str,
    environment: &'a str,
    kind: ChangeKind,
    diff: String,
}

impl<W: Write> DiffSink for JsonSink<W> {
    fn emit(&mut self, block: &DiffBlock) -> io::Result<()> {
        let record = JsonBlock {
            service: &block.key.service,
            cluster: &block.key.cluster.name,
            environment: &block.key.cluster.environment,
            kind: block.kind,
            diff: block.body(),
        };
        serde_json::to_writer(&mut self.out, &record)?;
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}
