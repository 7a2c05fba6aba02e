//! Polyline files (`.pli` / `.pliz`)
//!
//! A file is a sequence of blocks:
//!
//! ```text
//! * optional comment lines
//! fxw01
//!     3    5
//! 0.0  0.0  1.2  3.5  3.5
//! 5.0  0.0  6.4  3.5  3.5
//! 9.0  1.0  6.4  3.5  3.5
//! ```
//!
//! The header holds the number of rows and the number of columns. The first two
//! columns are x and y; the remaining ones are numeric data columns (file columns
//! 3..=9). A row with x or y equal to -999 splits the block into sub-features named
//! `<name>-1`, `<name>-2`, ...

use crate::{DataError, Result};

use geo::{Coord, LineString};
use rayon::prelude::*;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Maximum number of numeric data columns after x and y
pub const MAX_DATA_COLUMNS: usize = 7;

/// Coordinate value marking a sub-feature separator row
pub const SEPARATOR_VALUE: f64 = -999.0;

/// One polyline with its numeric data columns
#[derive(Clone, Debug, PartialEq)]
pub struct PolylineRecord {
    pub name: String,
    pub geometry: LineString<f64>,
    /// `columns[k]` holds file column `k + 3`, one value per vertex
    pub columns: Vec<Vec<f64>>,
}

impl PolylineRecord {
    pub fn new(name: impl Into<String>, geometry: LineString<f64>) -> Self {
        Self {
            name: name.into(),
            geometry,
            columns: Vec::new(),
        }
    }

    pub fn with_columns(mut self, columns: Vec<Vec<f64>>) -> Self {
        self.columns = columns;
        self
    }
}

/// Scientific notation with 15 decimals and a signed three-digit exponent
///
/// `5.4` is written as `5.400000000000000E+000`, `-0.07` as `-7.000000000000000E-002`.
struct Scientific(f64);

impl fmt::Display for Scientific {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted = format!("{:.15E}", self.0);
        let Some((mantissa, exponent)) = formatted.split_once('E') else {
            // inf / NaN
            return f.write_str(&formatted);
        };
        let (sign, digits) = match exponent.strip_prefix('-') {
            Some(digits) => ('-', digits),
            None => ('+', exponent),
        };
        write!(f, "{mantissa}E{sign}{digits:0>3}")
    }
}

/// Non-comment lines with their 1-based line numbers
struct Lines<R> {
    inner: std::io::Lines<R>,
    line_number: usize,
}

impl<R: BufRead> Lines<R> {
    fn new(reader: R) -> Self {
        Self {
            inner: reader.lines(),
            line_number: 0,
        }
    }

    fn next_line(&mut self) -> Result<Option<(usize, String)>> {
        for line in self.inner.by_ref() {
            let line = line?;
            self.line_number += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('*') {
                continue;
            }
            return Ok(Some((self.line_number, trimmed.to_string())));
        }
        Ok(None)
    }
}

fn parse_error(line: usize, message: impl Into<String>) -> DataError {
    DataError::Parse {
        line,
        message: message.into(),
    }
}

fn parse_f64(field: &str, line: usize) -> Result<f64> {
    field
        .parse::<f64>()
        .map_err(|_| parse_error(line, format!("'{field}' is not a number")))
}

fn parse_count(field: &str, line: usize, what: &str) -> Result<usize> {
    field
        .parse::<usize>()
        .map_err(|_| parse_error(line, format!("invalid {what} '{field}'")))
}

/// Read all polylines from `reader`
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn read<R: BufRead>(reader: R) -> Result<Vec<PolylineRecord>> {
    let mut lines = Lines::new(reader);
    let mut records = Vec::new();
    let mut max_columns = 0;

    while let Some((_, name)) = lines.next_line()? {
        let (header_line, header) = lines.next_line()?.ok_or_else(|| DataError::UnexpectedEof {
            line: lines.line_number,
            expected: format!("number of points and columns for '{name}'"),
        })?;

        let fields: Vec<&str> = header.split_whitespace().collect();
        if fields.len() < 2 {
            return Err(parse_error(header_line, "expected number of points and columns"));
        }
        let num_points = parse_count(fields[0], header_line, "number of points")?;
        let num_columns = parse_count(fields[1], header_line, "number of columns")?;
        if num_columns < 2 {
            return Err(parse_error(
                header_line,
                format!("expected at least 2 columns, got {num_columns}"),
            ));
        }

        let data_columns = (num_columns - 2).min(MAX_DATA_COLUMNS);
        max_columns = max_columns.max(num_columns);

        let mut parts = 0;
        let mut coords: Vec<Coord<f64>> = Vec::with_capacity(num_points);
        let mut columns: Vec<Vec<f64>> = vec![Vec::with_capacity(num_points); data_columns];

        for point in 0..num_points {
            let (row_line, row) = lines.next_line()?.ok_or_else(|| DataError::UnexpectedEof {
                line: lines.line_number,
                expected: format!("point {} of {num_points} for '{name}'", point + 1),
            })?;

            let fields: Vec<&str> = row.split_whitespace().collect();
            if fields.len() < num_columns {
                return Err(parse_error(
                    row_line,
                    format!("expected {num_columns} columns, found {}", fields.len()),
                ));
            }

            let x = parse_f64(fields[0], row_line)?;
            let y = parse_f64(fields[1], row_line)?;

            if x == SEPARATOR_VALUE || y == SEPARATOR_VALUE {
                parts += 1;
                let geometry = LineString::new(std::mem::take(&mut coords));
                records.push(
                    PolylineRecord::new(format!("{name}-{parts}"), geometry)
                        .with_columns(columns.iter_mut().map(std::mem::take).collect()),
                );
                continue;
            }

            coords.push(Coord { x, y });
            for (column, field) in columns.iter_mut().zip(&fields[2..2 + data_columns]) {
                column.push(parse_f64(field, row_line)?);
            }
        }

        // Empty blocks and trailing separators produce no feature
        if coords.is_empty() {
            continue;
        }
        let name = if parts > 0 {
            format!("{name}-{}", parts + 1)
        } else {
            name
        };
        records.push(PolylineRecord::new(name, LineString::new(coords)).with_columns(columns));
    }

    if max_columns > MAX_DATA_COLUMNS + 2 {
        tracing::warn!(
            "columns {} to {max_columns} will be ignored",
            MAX_DATA_COLUMNS + 3
        );
    }

    Ok(records)
}

/// Read a polyline file from disk
pub fn read_file(path: impl AsRef<Path>) -> Result<Vec<PolylineRecord>> {
    let path = path.as_ref();
    let _span = tracing::warn_span!("polyline", path = %path.display()).entered();
    let file = File::open(path)?;
    let records = read(BufReader::new(file))?;
    tracing::debug!(path = %path.display(), records = records.len(), "read polyline file");
    Ok(records)
}

/// Read several polyline files in parallel, keeping file order
pub fn read_files_parallel<P: AsRef<Path> + Send + Sync>(
    paths: Vec<P>,
) -> Result<Vec<PolylineRecord>> {
    #[cfg(feature = "profiling")]
    profiling::scope!("polyline::read_files_parallel");

    let per_file: Result<Vec<Vec<PolylineRecord>>> = paths
        .into_par_iter()
        .map(|path| read_file(path))
        .collect();
    Ok(per_file?.into_iter().flatten().collect())
}

/// Write polylines to `writer`
///
/// Data columns shorter than the geometry are padded with `0.0`.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn write<W: Write>(mut writer: W, records: &[PolylineRecord]) -> Result<()> {
    for record in records {
        let num_points = record.geometry.0.len();
        let num_columns = 2 + record.columns.len();

        for (k, column) in record.columns.iter().enumerate() {
            if column.len() < num_points {
                tracing::warn!(
                    "'{}' has fewer values than points in column {}; filling up remaining entries with zero",
                    record.name,
                    k + 3
                );
            }
        }

        writeln!(writer, "{}", record.name)?;
        writeln!(writer, "    {num_points}    {num_columns}")?;
        for (i, coord) in record.geometry.0.iter().enumerate() {
            write!(writer, "{}  {}", Scientific(coord.x), Scientific(coord.y))?;
            for column in &record.columns {
                let value = column.get(i).copied().unwrap_or(0.0);
                write!(writer, "  {}", Scientific(value))?;
            }
            writeln!(writer)?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Write polylines to a file on disk
pub fn write_file(path: impl AsRef<Path>, records: &[PolylineRecord]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write(BufWriter::new(file), records)?;
    tracing::debug!(path = %path.display(), records = records.len(), "wrote polyline file");
    Ok(())
}
