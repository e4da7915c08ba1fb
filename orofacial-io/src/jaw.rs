//! Jaw label export conversion (JSON to space-separated CSV).
//!
//! Label exports are a JSON array of records such as
//! `{"image": "img00042.png", "labels": {"jaw": [row, col]}}`. Each record
//! with exactly two jaw values becomes one `Frame X Y Probability` line,
//! with the frame number taken from the digits of the image name and the
//! coordinates swapped into `x = col`, `y = row` order.

use crate::{Error, Result};
use serde::Deserialize;
use serde_json::Number;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// CSV header line.
pub const JAW_CSV_HEADER: &str = "Frame X Y Probability";

#[derive(Debug, Deserialize)]
struct JawRecord {
    image: String,
    #[serde(default)]
    labels: JawLabels,
}

#[derive(Debug, Default, Deserialize)]
struct JawLabels {
    #[serde(default)]
    jaw: Vec<Number>,
}

/// Counts from one conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JawConversionSummary {
    /// Lines written.
    pub written: usize,
    /// Records without exactly two jaw values.
    pub skipped: usize,
}

/// Frame number formed by the decimal digits of an image name.
///
/// # Errors
/// Returns `InvalidFormat` if the name has no digits or the number overflows.
pub fn frame_number(image_name: &str) -> Result<u64> {
    let digits: String = image_name.chars().filter(char::is_ascii_digit).collect();
    digits
        .parse()
        .map_err(|e| Error::InvalidFormat(format!("no frame number in {image_name:?}: {e}")))
}

/// Converts a JSON label export read from `reader` into CSV on `writer`.
///
/// # Errors
/// Returns an error on malformed JSON, an image name without digits, or a
/// write failure.
pub fn convert_jaw_labels<R: Read, W: Write>(
    reader: R,
    writer: W,
) -> Result<JawConversionSummary> {
    let records: Vec<JawRecord> = serde_json::from_reader(reader)?;
    let mut writer = BufWriter::new(writer);
    let mut summary = JawConversionSummary::default();

    writeln!(writer, "{JAW_CSV_HEADER}")?;
    for record in &records {
        let [row, col] = record.labels.jaw.as_slice() else {
            log::warn!(
                "skipping {}: expected 2 jaw values, found {}",
                record.image,
                record.labels.jaw.len()
            );
            summary.skipped += 1;
            continue;
        };
        let frame = frame_number(&record.image)?;
        writeln!(writer, "{frame} {col} {row} 1.00")?;
        summary.written += 1;
    }
    writer.flush()?;
    Ok(summary)
}

/// Converts one JSON file into a CSV file.
///
/// # Errors
/// See [`convert_jaw_labels`]; also fails if either file cannot be opened.
pub fn convert_jaw_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
) -> Result<JawConversionSummary> {
    let reader = BufReader::new(File::open(input.as_ref())?);
    let writer = File::create(output.as_ref())?;
    let summary = convert_jaw_labels(reader, writer)?;
    log::info!(
        "{} -> {}: {} rows, {} skipped",
        input.as_ref().display(),
        output.as_ref().display(),
        summary.written,
        summary.skipped
    );
    Ok(summary)
}

/// Converts every `*.json` file under `root` (recursively) into a sibling
/// `.csv` file with the same stem.
///
/// Returns the converted input paths in sorted order.
///
/// # Errors
/// Stops at the first directory or conversion error.
pub fn convert_jaw_tree<P: AsRef<Path>>(root: P) -> Result<Vec<(PathBuf, JawConversionSummary)>> {
    let mut inputs = Vec::new();
    collect_json_files(root.as_ref(), &mut inputs)?;
    inputs.sort();

    inputs
        .into_iter()
        .map(|input| {
            let output = input.with_extension("csv");
            let summary = convert_jaw_file(&input, &output)?;
            Ok((input, summary))
        })
        .collect()
}

fn collect_json_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_json_files(&path, out)?;
        } else if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        {
            out.push(path);
        }
    }
    Ok(())
}
