//! CSV writer for per-frame tip coordinates.

use crate::Result;
use orofacial_algorithms::{FrameResult, TipEstimate};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writer for tip time series.
///
/// One row per frame: `frame,x,y,stage`. Frames without a tip keep their
/// row with empty coordinates and the stage `error`, so the series stays
/// aligned with the frame index.
pub struct TipCsvWriter<W: Write = File> {
    writer: BufWriter<W>,
}

impl TipCsvWriter<File> {
    /// Creates a new file writer.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(file))
    }
}

impl<W: Write> TipCsvWriter<W> {
    /// Wraps any writer.
    pub fn new(inner: W) -> Self {
        Self {
            writer: BufWriter::new(inner),
        }
    }

    /// Writes the header row.
    ///
    /// # Errors
    /// Returns an error if the write fails.
    pub fn write_header(&mut self) -> Result<()> {
        writeln!(self.writer, "frame,x,y,stage")?;
        Ok(())
    }

    /// Writes one located tip.
    ///
    /// # Errors
    /// Returns an error if the write fails.
    pub fn write_tip(&mut self, frame: usize, estimate: &TipEstimate) -> Result<()> {
        writeln!(
            self.writer,
            "{},{},{},{}",
            frame, estimate.tip.x, estimate.tip.y, estimate.stage
        )?;
        Ok(())
    }

    /// Writes a tracked frame, successful or not.
    ///
    /// # Errors
    /// Returns an error if the write fails.
    pub fn write_result(&mut self, result: &FrameResult) -> Result<()> {
        match &result.outcome {
            Ok(estimate) => self.write_tip(result.frame, estimate),
            Err(_) => {
                writeln!(self.writer, "{},,,error", result.frame)?;
                Ok(())
            }
        }
    }

    /// Flushes the writer.
    ///
    /// # Errors
    /// Returns an error if the flush fails.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
