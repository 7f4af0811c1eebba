use super::{Frame, FrameSource};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Replays frame events recorded one JSON object per line
pub struct JsonLinesSource<R> {
    reader: R,
    line: String,
    line_number: usize,
}

impl JsonLinesSource<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!("Replaying frames from {}", path.display());

        let file = File::open(path)
            .with_context(|| format!("Failed to open frame recording at {}", path.display()))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl JsonLinesSource<BufReader<io::Stdin>> {
    pub fn stdin() -> Self {
        tracing::info!("Reading frames from stdin");
        Self::new(BufReader::new(io::stdin()))
    }
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            line_number: 0,
        }
    }
}

impl<R: BufRead> FrameSource for JsonLinesSource<R> {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        loop {
            self.line.clear();
            let read = self
                .reader
                .read_line(&mut self.line)
                .context("Failed to read frame event")?;
            if read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let trimmed = self.line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let frame = serde_json::from_str(trimmed)
                .with_context(|| format!("Malformed frame event on line {}", self.line_number))?;
            return Ok(Some(frame));
        }
    }
}
