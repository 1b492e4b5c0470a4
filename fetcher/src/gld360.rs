//! Vaisala GLD360 lightning strokes in UALF2 format.
//!
//! A UALF2 file is tab-separated text without a header line. Every record
//! has the columns in [`COLUMNS`]: record and network type, the timestamp
//! split into year, month, day, hour, minute, second and nanosecond, then
//! location, current and quality fields. The nanosecond field is written
//! without zero padding, so `5000000` means 5 ms past the second.
//!
//! Reading a file yields its strokes with duplicate records removed and the
//! remaining records ordered by time. Each file covers one hour from the
//! start time encoded in its name.

use std::fs::File;
use std::io::Read;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use log::debug;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::component::{DataFileComponent, DataFileDescriptor};
use crate::key::ComponentKind;

/// Column names of a UALF2 record, in file order.
pub const COLUMNS: [&str; 30] = [
    "ualf_record_type",
    "network_type",
    "year",
    "month",
    "day",
    "hour",
    "minute",
    "second",
    "nanosecond",
    "latitude",
    "longitude",
    "altitude",
    "altitude_uncertainty",
    "peak_current",
    "vhf_range",
    "multiplicity_flash",
    "cloud_pulse_count",
    "number_of_sensors",
    "degree_freedom_for_location",
    "error_ellipse_angle",
    "error_ellipse_max_axis_length",
    "error_ellipse_min_axis_length",
    "chi_squared_value_location_optimization",
    "wave_form_rise_time",
    "wave_form_peak_to_zero_time",
    "wave_form_max_rate_of_rise",
    "cloud_indicator",
    "angle_indicator",
    "signal_indicator",
    "timing_indicator",
];

/// Hours covered by one file.
pub const FILE_DURATION_HOURS: i64 = 1;

/// Errors raised while reading UALF2 files.
#[derive(Debug, Error)]
pub enum Ualf2Error {
    /// The file could not be opened.
    #[error("failed to open {path}")]
    Open {
        /// The file being opened.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A line could not be split or a field has the wrong type.
    #[error("malformed UALF2 record: {0}")]
    Record(#[from] csv::Error),

    /// A line has the wrong number of columns.
    #[error("line {line} has {found} columns, expected {expected}", expected = COLUMNS.len())]
    ColumnCount {
        /// One-based line number.
        line: u64,
        /// Number of columns on the line.
        found: usize,
    },

    /// The date and time columns do not form a valid timestamp.
    #[error("line {line} has an invalid timestamp")]
    InvalidTime {
        /// One-based line number.
        line: u64,
    },
}

/// Result type alias using [`Ualf2Error`].
pub type Result<T> = std::result::Result<T, Ualf2Error>;

/// One lightning stroke.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LightningStroke {
    /// UALF record type.
    pub ualf_record_type: u8,
    /// Detection network type.
    pub network_type: u8,
    /// Calendar year.
    pub year: i32,
    /// Month, 1 to 12.
    pub month: u32,
    /// Day of month.
    pub day: u32,
    /// Hour, 0 to 23.
    pub hour: u32,
    /// Minute, 0 to 59.
    pub minute: u32,
    /// Second, 0 to 59.
    pub second: u32,
    /// Nanoseconds past `second`.
    pub nanosecond: u32,
    /// Latitude in degrees.
    pub latitude: f32,
    /// Longitude in degrees.
    pub longitude: f32,
    /// Altitude in metres.
    pub altitude: u16,
    /// Altitude uncertainty in metres.
    pub altitude_uncertainty: u16,
    /// Estimated peak current in kA.
    pub peak_current: i16,
    /// VHF range.
    pub vhf_range: f32,
    /// Number of strokes in the flash.
    pub multiplicity_flash: u8,
    /// Number of cloud pulses.
    pub cloud_pulse_count: i16,
    /// Sensors contributing to the location.
    pub number_of_sensors: u8,
    /// Degrees of freedom of the location fit.
    pub degree_freedom_for_location: u8,
    /// Error ellipse orientation in degrees.
    pub error_ellipse_angle: f32,
    /// Error ellipse semi-major axis in km.
    pub error_ellipse_max_axis_length: f32,
    /// Error ellipse semi-minor axis in km.
    pub error_ellipse_min_axis_length: f32,
    /// Chi-squared value of the location optimisation.
    pub chi_squared_value_location_optimization: f32,
    /// Waveform rise time in microseconds.
    pub wave_form_rise_time: f32,
    /// Waveform peak-to-zero time in microseconds.
    pub wave_form_peak_to_zero_time: f32,
    /// Waveform maximum rate of rise.
    pub wave_form_max_rate_of_rise: f32,
    /// Cloud discharge flag.
    #[serde(deserialize_with = "indicator")]
    pub cloud_indicator: bool,
    /// Angle data flag.
    #[serde(deserialize_with = "indicator")]
    pub angle_indicator: bool,
    /// Signal data flag.
    #[serde(deserialize_with = "indicator")]
    pub signal_indicator: bool,
    /// Timing data flag.
    #[serde(deserialize_with = "indicator")]
    pub timing_indicator: bool,
    /// Stroke time built from the date and time columns.
    #[serde(skip)]
    pub time: NaiveDateTime,
}

impl LightningStroke {
    fn timestamp(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)?.and_hms_nano_opt(
            self.hour,
            self.minute,
            self.second,
            self.nanosecond,
        )
    }
}

/// Indicator columns hold `0` or `1`.
fn indicator<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    u8::deserialize(deserializer).map(|flag| flag != 0)
}

/// Reader for GLD360 UALF2 files.
///
/// # Examples
///
/// ```
/// use auxdata_fetcher::gld360::Ualf2Reader;
///
/// let line = "0\t1\t2021\t7\t1\t12\t0\t5\t5000000\t58.5\t16.1\t0\t0\t-12\t0\t1\t0\t7\t5\t45.0\t1.2\t0.6\t0.9\t8.4\t19.2\t0.0\t0\t1\t1\t1\n";
/// let strokes = Ualf2Reader::new().read(line.as_bytes()).expect("valid record");
/// let first = strokes.first().expect("one stroke");
/// assert_eq!(first.time.to_string(), "2021-07-01 12:00:05.005");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Ualf2Reader {
    data_files: Vec<DataFileDescriptor>,
}

impl Ualf2Reader {
    /// Create a reader that declares no data files.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the data files this reader depends on.
    #[must_use]
    pub fn with_data_files(mut self, data_files: Vec<DataFileDescriptor>) -> Self {
        self.data_files = data_files;
        self
    }

    /// Read every stroke in the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Ualf2Error::Open`] if the file cannot be opened, otherwise as
    /// for [`Self::read`].
    pub fn read_path(&self, path: &Utf8Path) -> Result<Vec<LightningStroke>> {
        let file = File::open(path).map_err(|source| Ualf2Error::Open {
            path: path.to_owned(),
            source,
        })?;
        let strokes = self.read(file)?;
        debug!(target: "auxdata::gld360", "read {} strokes from {path}", strokes.len());
        Ok(strokes)
    }

    /// Read every stroke from `input`, dropping duplicate records and
    /// ordering the rest by time.
    ///
    /// # Errors
    ///
    /// Returns [`Ualf2Error::Record`], [`Ualf2Error::ColumnCount`] or
    /// [`Ualf2Error::InvalidTime`] for the first bad line.
    pub fn read<R: Read>(&self, input: R) -> Result<Vec<LightningStroke>> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(input);
        let mut strokes = Vec::new();
        for record in reader.records() {
            let record = record?;
            let line = record.position().map_or(0, csv::Position::line);
            if record.len() != COLUMNS.len() {
                return Err(Ualf2Error::ColumnCount {
                    line,
                    found: record.len(),
                });
            }
            let mut stroke: LightningStroke = record.deserialize(None)?;
            stroke.time = stroke
                .timestamp()
                .ok_or(Ualf2Error::InvalidTime { line })?;
            strokes.push(stroke);
        }
        Ok(sort_unique(strokes))
    }
}

impl DataFileComponent for Ualf2Reader {
    fn component_kind(&self) -> ComponentKind {
        ComponentKind::Readers
    }

    fn data_files(&self) -> &[DataFileDescriptor] {
        &self.data_files
    }
}

/// Start and end of the hour covered by a file starting at `start_time`.
#[must_use]
pub fn file_time_range(start_time: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    (start_time, start_time + TimeDelta::hours(FILE_DURATION_HOURS))
}

/// Order strokes by time, keeping the first of any identical records.
fn sort_unique(mut strokes: Vec<LightningStroke>) -> Vec<LightningStroke> {
    let total = strokes.len();
    strokes.sort_by_key(|stroke| stroke.time);
    let mut unique: Vec<LightningStroke> = Vec::with_capacity(total);
    for stroke in strokes {
        // Identical records share a time, so only the current run is checked.
        let seen = unique
            .iter()
            .rev()
            .take_while(|kept| kept.time == stroke.time)
            .any(|kept| *kept == stroke);
        if !seen {
            unique.push(stroke);
        }
    }
    if unique.len() < total {
        debug!(
            target: "auxdata::gld360",
            "dropped {} duplicate strokes",
            total - unique.len()
        );
    }
    unique
}

#[cfg(test)]
#[path = "gld360_tests.rs"]
mod tests;
