//! Encoding registry snapshots into printable files.
//!
//! Records are transformed into the shared world frame, cleaned, optionally
//! welded, and only then scaled to millimeters and turned Z-up by the
//! encoders. Export never mutates the records it reads.

pub mod buffer;
pub mod stl;
pub mod threemf;
pub mod weld;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::model::MeshRecord;

pub use buffer::{ExportBuffer, ExportObject, prepare_record};
pub use threemf::material_color;
pub use weld::{WeldStats, weld};

/// Output file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExportFormat {
    /// 3MF package with per-category materials
    #[default]
    #[serde(rename = "3mf")]
    ThreeMf,
    /// ASCII STL
    #[serde(rename = "stl")]
    Stl,
    #[serde(rename = "stl-binary")]
    StlBinary,
}

impl ExportFormat {
    /// File extension, without the dot
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::ThreeMf => "3mf",
            ExportFormat::Stl | ExportFormat::StlBinary => "stl",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportFormat::ThreeMf => "3mf",
            ExportFormat::Stl => "stl",
            ExportFormat::StlBinary => "stl-binary",
        };
        f.write_str(name)
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "3mf" => Ok(ExportFormat::ThreeMf),
            "stl" => Ok(ExportFormat::Stl),
            "stl-binary" | "binary-stl" => Ok(ExportFormat::StlBinary),
            other => Err(format!(
                "unknown export format '{other}' (expected 3mf, stl or stl-binary)"
            )),
        }
    }
}

/// Encoder settings resolved into generation units
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    pub millimeters_per_unit: f32,
    pub weld: bool,
    /// Weld cell size in generation units
    pub weld_tolerance: f32,
    /// Records with more vertices than this are welded
    pub weld_threshold: usize,
    pub name: String,
}

impl ExportOptions {
    /// Resolve an export config against the projection scale (units per meter)
    pub fn from_config(config: &ExportConfig, scale: f64) -> Self {
        Self {
            millimeters_per_unit: config.millimeters_per_unit as f32,
            weld: config.weld,
            weld_tolerance: (config.weld_tolerance * scale) as f32,
            weld_threshold: config.weld_threshold,
            name: config.name.clone(),
        }
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::from_config(&ExportConfig::default(), 0.1)
    }
}

/// Local Y-up generation units to Z-up millimeters
///
/// `(x, y, z) -> (x, -z, y)` is a rotation, so triangle winding survives.
pub(crate) fn to_print_space(v: [f32; 3], millimeters_per_unit: f32) -> [f32; 3] {
    [
        v[0] * millimeters_per_unit,
        -v[2] * millimeters_per_unit,
        v[1] * millimeters_per_unit,
    ]
}

/// One step of an export
#[derive(Debug, Clone, PartialEq)]
pub enum ExportEvent {
    /// Fraction of records processed, in `0.0..=1.0`
    Progress(f32),
    /// The encoded file
    Finished(Vec<u8>),
}

/// Lazy export: each `next()` prepares one record, the last item is the file
///
/// Callers that don't care about progress use [`ExportStream::finish`].
pub struct ExportStream<'a> {
    records: std::slice::Iter<'a, MeshRecord>,
    total: usize,
    done: usize,
    format: ExportFormat,
    options: ExportOptions,
    buffer: ExportBuffer,
    finished: bool,
}

impl<'a> ExportStream<'a> {
    pub fn new(records: &'a [MeshRecord], format: ExportFormat, options: ExportOptions) -> Self {
        Self {
            records: records.iter(),
            total: records.len(),
            done: 0,
            format,
            options,
            buffer: ExportBuffer::new(),
            finished: false,
        }
    }

    /// Drain the stream and return the encoded bytes
    pub fn finish(self) -> Result<Vec<u8>, ExportError> {
        self.finish_with(|_| {})
    }

    /// Drain the stream, reporting each progress step
    pub fn finish_with(mut self, mut on_progress: impl FnMut(f32)) -> Result<Vec<u8>, ExportError> {
        for event in &mut self {
            match event? {
                ExportEvent::Progress(p) => on_progress(p),
                ExportEvent::Finished(bytes) => return Ok(bytes),
            }
        }
        // the stream always ends with Finished or an error
        Ok(Vec::new())
    }

    fn encode(&mut self) -> Result<Vec<u8>, ExportError> {
        let buffer = std::mem::take(&mut self.buffer);
        let mm = self.options.millimeters_per_unit;
        let bytes = match self.format {
            ExportFormat::ThreeMf => threemf::write_package(&buffer, mm, &self.options.name)?,
            ExportFormat::Stl => stl::write_ascii(&buffer, mm, &self.options.name)?,
            ExportFormat::StlBinary => stl::write_binary(&buffer, mm)?,
        };
        info!(
            format = %self.format,
            objects = buffer.objects.len(),
            skipped = buffer.skipped,
            triangles = buffer.triangle_count(),
            bytes = bytes.len(),
            "export complete"
        );
        Ok(bytes)
    }
}

impl Iterator for ExportStream<'_> {
    type Item = Result<ExportEvent, ExportError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(record) = self.records.next() {
            self.buffer.push_record(record, &self.options);
            self.done += 1;
            return Some(Ok(ExportEvent::Progress(self.done as f32 / self.total as f32)));
        }
        if self.finished {
            return None;
        }
        self.finished = true;
        Some(self.encode().map(ExportEvent::Finished))
    }
}

/// Encode records in the given format
pub fn export(
    records: &[MeshRecord],
    format: ExportFormat,
    options: ExportOptions,
) -> Result<Vec<u8>, ExportError> {
    ExportStream::new(records, format, options).finish()
}

/// 3MF package
pub fn to_container_format(
    records: &[MeshRecord],
    options: ExportOptions,
) -> Result<Vec<u8>, ExportError> {
    export(records, ExportFormat::ThreeMf, options)
}

/// ASCII STL
pub fn to_flat_format(
    records: &[MeshRecord],
    options: ExportOptions,
) -> Result<Vec<u8>, ExportError> {
    export(records, ExportFormat::Stl, options)
}

/// Binary STL
pub fn to_flat_format_binary(
    records: &[MeshRecord],
    options: ExportOptions,
) -> Result<Vec<u8>, ExportError> {
    export(records, ExportFormat::StlBinary, options)
}
