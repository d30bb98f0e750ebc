use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};

use crate::argsets::RunArgs;
use ipmigw::device::ReadStatus;

/// How often a one-shot run polls for outstanding asynchronous completions
const COMPLETION_POLL: Duration = Duration::from_millis(10);

/// Bind configured points, then read them periodically with an active scan
/// every scan interval
pub fn run(args: RunArgs) -> Result<()> {
    let gw = super::open_gateway(&args.config)?;
    gw.connect_with_retry()?;

    for point in &gw.config.points {
        gw.device
            .init_record(&point.def, point.record)
            .map_err(|e| anyhow!("Point {}: {}", point.def.id, e))?;
    }
    log::info!(
        "Registered {} point(s), active IPMBs: {:?}",
        gw.config.points.len(),
        gw.device.active_ipmbs()
    );

    let read_interval = gw.config.read_interval();
    let scan_interval = gw.config.scan_interval();
    let mut last_scan = Instant::now();
    loop {
        let started = Instant::now();
        let completed_before = gw.host.completed();
        let queued = read_all(&gw);

        if args.once {
            let deadline = Instant::now() + read_interval;
            while gw.host.completed() < completed_before + queued && Instant::now() < deadline {
                thread::sleep(COMPLETION_POLL);
            }
            gw.device.shutdown();
            println!("{}", serde_json::to_string_pretty(&gw.host.latest())?);
            return Ok(());
        }

        if last_scan.elapsed() >= scan_interval {
            match gw.device.scan_active_ipmbs() {
                Ok(n) => log::debug!("Active scan refreshed {} sensor(s)", n),
                Err(e) => log::warn!("Active scan failed: {}", e),
            }
            last_scan = Instant::now();
        }
        thread::sleep(read_interval.saturating_sub(started.elapsed()));
    }
}

/// One read of every point; returns how many went to the reader thread
fn read_all(gw: &super::Gateway) -> usize {
    let mut queued = 0;
    for point in &gw.config.points {
        match gw.device.read(point.def.id, point.record) {
            Ok(ReadStatus::Done(value)) => {
                log::debug!("Point {} = {:?}", point.def.id, value);
                gw.host.record(point.def.id, value);
            }
            Ok(ReadStatus::Queued) => queued += 1,
            Err(e) => log::warn!("Point {}: {}", point.def.id, e),
        }
    }
    queued
}
