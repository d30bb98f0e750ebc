//! Background reader serving asynchronous reads
//!
//! A single worker drains a bounded queue. Each job runs under the device lock
//! and completes through the host's callback, outside the lock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use flume::{Receiver, Sender, TrySendError};

use crate::sensors::{PointId, SensorId};

use super::query::QueryFn;
use super::{DeviceError, DeviceInner};

pub(super) struct QueryJob {
    pub sensor: SensorId,
    pub query: QueryFn,
    pub point: PointId,
}

pub(super) struct ReaderThread {
    sender: Mutex<Option<Sender<QueryJob>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
    closing: Arc<AtomicBool>,
}

impl ReaderThread {
    pub fn spawn(device: Arc<DeviceInner>, capacity: usize) -> std::io::Result<Self> {
        let (tx, rx) = flume::bounded(capacity.max(1));
        let closing = Arc::new(AtomicBool::new(false));
        let worker_closing = closing.clone();
        let handle = thread::Builder::new()
            .name(format!("ipmi-reader-{}", device.id))
            .spawn(move || run(device, rx, worker_closing))?;
        Ok(ReaderThread {
            sender: Mutex::new(Some(tx)),
            handle: Mutex::new(Some(handle)),
            closing,
        })
    }

    pub fn queue(&self, job: QueryJob) -> Result<(), DeviceError> {
        let sender = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(tx) = sender.as_ref() else {
            return Err(DeviceError::Cancelled);
        };
        tx.try_send(job).map_err(|e| match e {
            TrySendError::Full(job) => {
                log::warn!("Read queue full, dropping read of point {}", job.point);
                DeviceError::QueueFull
            }
            TrySendError::Disconnected(_) => DeviceError::Cancelled,
        })
    }

    /// Idempotent; returns once the worker has drained the queue
    pub fn shutdown(&self) {
        self.closing.store(true, Ordering::SeqCst);
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let handle = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                log::error!("Reader thread panicked");
            }
        }
    }
}

fn run(device: Arc<DeviceInner>, rx: Receiver<QueryJob>, closing: Arc<AtomicBool>) {
    log::debug!("Device {}: reader started", device.id);
    for job in rx.iter() {
        let result = if closing.load(Ordering::SeqCst) {
            Err(DeviceError::Cancelled)
        } else {
            let mut state = device.lock();
            (job.query)(&mut *state, &job.sensor)
        };
        if let Err(e) = &result {
            log::debug!("Device {}: read of point {} failed: {}", device.id, job.point, e);
        }
        device.host.read_complete(job.point, result);
    }
    log::debug!("Device {}: reader stopped", device.id);
}
