use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::device::{DeviceError, PointHost};
use crate::sensors::records::PointMetadata;
use crate::sensors::{PointId, ReadingValue};

/// Host that logs metadata and completions and keeps the latest value of
/// every point
#[derive(Default)]
pub struct LoggingHost {
    latest: Mutex<BTreeMap<PointId, ReadingValue>>,
    completed: AtomicUsize,
}

impl LoggingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, point: PointId, value: ReadingValue) {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(point, value);
    }

    pub fn latest(&self) -> BTreeMap<PointId, ReadingValue> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Asynchronous reads completed so far, successful or not
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

impl PointHost for LoggingHost {
    fn fill_metadata(&self, point: PointId, metadata: PointMetadata) {
        match &metadata {
            PointMetadata::Ai(m) => log::info!(
                "Point {}: '{}' [{}] range {:?}..{:?}, prec {}",
                point,
                m.desc,
                m.egu,
                m.lopr,
                m.hopr,
                m.prec
            ),
            PointMetadata::MbbiDirect(m) => {
                log::info!("Point {}: '{}', {} state bits", point, m.desc, m.bits)
            }
            PointMetadata::Mbbi(m) => {
                log::info!("Point {}: '{}', {} states", point, m.desc, m.states.len())
            }
        }
    }

    fn read_complete(&self, point: PointId, result: Result<ReadingValue, DeviceError>) {
        match result {
            Ok(value) => {
                log::debug!("Point {} = {:?}", point, value);
                self.record(point, value);
            }
            Err(e) => log::warn!("Point {}: {}", point, e),
        }
        self.completed.fetch_add(1, Ordering::SeqCst);
    }
}
