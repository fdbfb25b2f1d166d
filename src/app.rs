/*
 *  app.rs
 *
 *  sleepcounter - how many sleeps until the big day?
 *
 *  Periodic scheduler: ticks every widget from one background thread.
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use log::{error, info};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::widget::Widget;

/// Granularity of the shutdown check while waiting out the tick interval.
const STOP_POLL: Duration = Duration::from_millis(100);

/// Owns the widgets and ticks them serially at a fixed interval. One tick
/// thread for the whole application; widget updates never overlap. A
/// failing widget is logged and skipped, not fatal to the loop.
pub struct Application {
    widgets: Option<Vec<Box<dyn Widget>>>,
    interval: Duration,
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl Application {
    pub fn new(widgets: Vec<Box<dyn Widget>>, interval: Duration) -> Self {
        Self {
            widgets: Some(widgets),
            interval,
            stop: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    /// Spawn the tick thread. The first tick runs immediately.
    pub fn start(&mut self) {
        let Some(mut widgets) = self.widgets.take() else {
            return; // already started
        };
        info!(
            "starting application with {} widgets, tick every {:?}",
            widgets.len(),
            self.interval
        );
        let stop = self.stop.clone();
        let interval = self.interval;
        let spawned = thread::Builder::new()
            .name("scheduler".to_string())
            .spawn(move || {
                while !stop.load(Ordering::SeqCst) {
                    for widget in widgets.iter_mut() {
                        if let Err(e) = widget.update() {
                            error!("{} widget update failed: {e}", widget.name());
                        }
                    }
                    let deadline = Instant::now() + interval;
                    while !stop.load(Ordering::SeqCst) {
                        let left = deadline.saturating_duration_since(Instant::now());
                        if left.is_zero() {
                            break;
                        }
                        thread::sleep(STOP_POLL.min(left));
                    }
                }
                info!("scheduler thread exiting");
            });
        match spawned {
            Ok(handle) => self.handle = Some(handle),
            Err(e) => error!("failed to spawn scheduler thread: {e}"),
        }
    }

    /// Stop ticking and wait for the thread to finish. Widgets are dropped
    /// with the thread, which also tears down their render workers.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("scheduler thread panicked");
            }
        }
    }
}

impl Drop for Application {
    fn drop(&mut self) {
        self.stop();
    }
}
