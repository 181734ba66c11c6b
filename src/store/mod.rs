mod json;
pub(crate) use self::json::{local_now, JsonStore};
use crate::calendar::CalendarSystem;
use crate::debounce::Flush;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;

/// One recorded body temperature
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub(crate) struct Measurement {
    pub(crate) id: Uuid,
    pub(crate) creation_date: PrimitiveDateTime,
    pub(crate) date: PrimitiveDateTime,
    /// Degrees Celsius
    pub(crate) temperature: f64,
}

impl Measurement {
    pub(crate) fn new(date: PrimitiveDateTime, temperature: f64, now: PrimitiveDateTime) -> Self {
        Measurement {
            id: Uuid::new_v4(),
            creation_date: now,
            date,
            temperature,
        }
    }

    /// Measurements sort by when they were created, then by when they were
    /// taken
    pub(crate) fn chronological(&self, other: &Measurement) -> Ordering {
        self.creation_date
            .cmp(&other.creation_date)
            .then_with(|| self.date.cmp(&other.date))
    }
}

/// The record store the application reads & edits measurements through
pub(crate) trait MeasurementStore {
    /// All measurements taken on days in `[start, end)`, in ascending order
    /// of measurement date.  An `end` of `None` leaves the range unbounded.
    fn records_between(&self, start: Date, end: Option<Date>) -> Vec<Measurement>;

    fn get(&self, id: Uuid) -> Option<Measurement>;

    /// Record a new measurement taken at `date` with the given temperature
    fn create(&mut self, date: PrimitiveDateTime, temperature: f64) -> Measurement;

    fn update(&mut self, record: &Measurement) -> Result<(), StoreError>;

    fn delete(&mut self, id: Uuid) -> Result<Measurement, StoreError>;

    fn delete_all(&mut self);

    fn count(&self) -> usize;

    fn has_changes(&self) -> bool;

    /// Write all pending changes to durable storage
    fn save_now(&mut self) -> Result<(), StoreError>;

    fn records_on_date(&self, date: Date) -> Vec<Measurement> {
        self.records_between(date, date.next_day())
    }

    /// Measurements in the month containing `date`, in ascending order of
    /// measurement date
    fn records_in_month<C: CalendarSystem>(&self, date: Date, calendar: &C) -> Vec<Measurement>
    where
        Self: Sized,
    {
        match calendar.start_of_month(date) {
            Some(start) => self.records_between(start, calendar.end_of_month(date)),
            None => Vec::new(),
        }
    }

    /// Five measurements taken now, from 36 °C through 40 °C
    fn create_sample_data(&mut self, now: PrimitiveDateTime) {
        for i in 1..=5u8 {
            self.create(now, 35.0 + f64::from(i));
        }
    }
}

impl<S: MeasurementStore> Flush for S {
    type Error = StoreError;

    fn flush(&mut self) -> Result<(), StoreError> {
        if self.has_changes() {
            self.save_now()
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("no measurement with ID {0}")]
    NotFound(Uuid),
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unsupported data file version {0}")]
    Version(u32),
    #[error("failed to serialize measurements")]
    Serialize(#[source] serde_json::Error),
    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
