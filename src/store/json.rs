use super::{Measurement, MeasurementStore, StoreError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use time::{Date, OffsetDateTime, PrimitiveDateTime};
use uuid::Uuid;

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
struct DataFile {
    version: u32,
    measurements: Vec<Measurement>,
}

#[derive(Debug, Serialize)]
struct DataFileRef<'a> {
    version: u32,
    measurements: &'a [Measurement],
}

/// A measurement store kept in memory and written out as a single JSON
/// document.
///
/// A store without a path lives only in memory; saving it just clears the
/// change flag.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct JsonStore {
    path: Option<PathBuf>,
    // Sorted by measurement date
    measurements: Vec<Measurement>,
    dirty: bool,
}

impl JsonStore {
    pub(crate) fn in_memory() -> JsonStore {
        JsonStore::default()
    }

    /// Load the store at `path`.  A nonexistent file yields an empty store
    /// that will be created on first save.
    pub(crate) fn open<P: AsRef<Path>>(path: P) -> Result<JsonStore, StoreError> {
        let path = path.as_ref().to_path_buf();
        let measurements = match fs::read_to_string(&path) {
            Ok(src) => {
                let data = serde_json::from_str::<DataFile>(&src).map_err(|source| {
                    StoreError::Parse {
                        path: path.clone(),
                        source,
                    }
                })?;
                if data.version != FORMAT_VERSION {
                    return Err(StoreError::Version(data.version));
                }
                data.measurements
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(
                    path = %path.display(),
                    "data file does not exist yet; starting empty"
                );
                Vec::new()
            }
            Err(source) => return Err(StoreError::Read { path, source }),
        };
        let mut store = JsonStore {
            path: Some(path),
            measurements,
            dirty: false,
        };
        store.sort();
        tracing::info!(count = store.measurements.len(), "loaded measurements");
        Ok(store)
    }

    pub(crate) fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn sort(&mut self) {
        self.measurements
            .sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.chronological(b)));
    }

    fn index_of(&self, id: Uuid) -> Result<usize, StoreError> {
        self.measurements
            .iter()
            .position(|m| m.id == id)
            .ok_or(StoreError::NotFound(id))
    }
}

impl MeasurementStore for JsonStore {
    fn records_between(&self, start: Date, end: Option<Date>) -> Vec<Measurement> {
        self.measurements
            .iter()
            .filter(|m| start <= m.date.date() && !end.is_some_and(|end| m.date.date() >= end))
            .copied()
            .collect()
    }

    fn get(&self, id: Uuid) -> Option<Measurement> {
        self.measurements.iter().find(|m| m.id == id).copied()
    }

    fn create(&mut self, date: PrimitiveDateTime, temperature: f64) -> Measurement {
        let m = Measurement::new(date, temperature, local_now());
        let i = self.measurements.partition_point(|other| other.date <= m.date);
        self.measurements.insert(i, m);
        self.dirty = true;
        tracing::debug!(id = %m.id, %date, temperature, "created measurement");
        m
    }

    fn update(&mut self, record: &Measurement) -> Result<(), StoreError> {
        let i = self.index_of(record.id)?;
        let resort = self.measurements[i].date != record.date;
        self.measurements[i] = *record;
        if resort {
            self.sort();
        }
        self.dirty = true;
        Ok(())
    }

    fn delete(&mut self, id: Uuid) -> Result<Measurement, StoreError> {
        let i = self.index_of(id)?;
        self.dirty = true;
        tracing::debug!(%id, "deleted measurement");
        Ok(self.measurements.remove(i))
    }

    fn delete_all(&mut self) {
        if !self.measurements.is_empty() {
            self.measurements.clear();
            self.dirty = true;
        }
    }

    fn count(&self) -> usize {
        self.measurements.len()
    }

    fn has_changes(&self) -> bool {
        self.dirty
    }

    fn save_now(&mut self) -> Result<(), StoreError> {
        if let Some(path) = self.path.as_deref() {
            let data = DataFileRef {
                version: FORMAT_VERSION,
                measurements: &self.measurements,
            };
            let mut src = serde_json::to_string_pretty(&data).map_err(StoreError::Serialize)?;
            src.push('\n');
            let tmp = temp_path(path);
            fs::write(&tmp, src).map_err(|source| StoreError::Write {
                path: tmp.clone(),
                source,
            })?;
            fs::rename(&tmp, path).map_err(|source| StoreError::Write {
                path: path.to_path_buf(),
                source,
            })?;
            tracing::info!(
                path = %path.display(),
                count = self.measurements.len(),
                "saved measurements"
            );
        }
        self.dirty = false;
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// The current local date & time, or UTC if the local offset cannot be
/// determined
pub(crate) fn local_now() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    PrimitiveDateTime::new(now.date(), now.time())
}
