/*
 *  render.rs
 *
 *  sleepcounter - how many sleeps until the big day?
 *
 *  Background render worker. Owns the one thread that touches the panel and
 *  drives a playlist of messages onto it, scrolling the long ones, until
 *  told to stop.
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

use log::{debug, error, warn};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::message::Message;
use crate::panel::MatrixPanel;

/// Default scroll rate in pixels per second.
pub const DEFAULT_SCROLL_RATE: u32 = 40;

/// Pause per playlist pass when nothing scrolls. Static frames are cheap to
/// redraw but looping over them back-to-back would peg a core.
const IDLE_REDRAW: Duration = Duration::from_millis(250);

/// Drives one background thread over a playlist. `start` drains any previous
/// thread before spawning, so there is never more than one; `stop` signals
/// the flag and joins, so the panel is quiet by the time it returns. The
/// join blocks for at most one frame sleep, or one idle pause when nothing
/// in the playlist scrolls.
pub struct RenderWorker<P: MatrixPanel + 'static> {
    panel: Arc<Mutex<P>>,
    stop: Arc<AtomicBool>,
    live: Arc<AtomicUsize>,
    handle: Option<thread::JoinHandle<()>>,
    frame: Duration,
}

impl<P: MatrixPanel + 'static> RenderWorker<P> {
    pub fn new(panel: Arc<Mutex<P>>, scroll_rate: u32) -> Self {
        Self {
            panel,
            stop: Arc::new(AtomicBool::new(false)),
            live: Arc::new(AtomicUsize::new(0)),
            handle: None,
            frame: Duration::from_secs_f64(1.0 / f64::from(scroll_rate.max(1))),
        }
    }

    /// Begin rendering `playlist`, replacing any run already in progress.
    /// Returns as soon as the thread is spawned.
    pub fn start(&mut self, playlist: Vec<Message>) {
        self.stop();
        // fresh flag per generation; the old thread may still be observing
        // the previous one as it unwinds
        self.stop = Arc::new(AtomicBool::new(false));
        let stop = self.stop.clone();
        let live = self.live.clone();
        let panel = self.panel.clone();
        let frame = self.frame;
        let spawned = thread::Builder::new()
            .name("render".to_string())
            .spawn(move || {
                live.fetch_add(1, Ordering::SeqCst);
                run(panel, &playlist, &stop, frame);
                live.fetch_sub(1, Ordering::SeqCst);
                debug!("render thread exiting");
            });
        match spawned {
            Ok(handle) => self.handle = Some(handle),
            Err(e) => error!("failed to spawn render thread: {e}"),
        }
    }

    /// Signal the thread and wait for it to finish. No-op when idle. Once
    /// this returns nothing is touching the panel.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            debug!("tearing down render thread");
            if handle.join().is_err() {
                error!("render thread panicked");
            }
        }
    }

    /// Number of live render threads. Always 0 or 1; observable for tests.
    pub fn live_workers(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

impl<P: MatrixPanel + 'static> Drop for RenderWorker<P> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// One playlist pass per outer iteration, repeated until stopped. The stop
/// flag is checked once per frame; cancellation granularity is one frame.
fn run<P: MatrixPanel>(
    panel: Arc<Mutex<P>>,
    playlist: &[Message],
    stop: &AtomicBool,
    frame: Duration,
) {
    loop {
        let mut scrolled = false;
        for msg in playlist {
            if stop.load(Ordering::SeqCst) {
                return;
            }
            let width = panel.lock().unwrap().dimensions().0;
            if msg.is_scrolling(width) {
                scrolled = true;
                // sweep from off the right edge to off the left edge
                let span = width as i32 + msg.pixel_len() as i32;
                for step in 0..span {
                    if stop.load(Ordering::SeqCst) {
                        return;
                    }
                    draw(&panel, msg, width as i32 - step);
                    thread::sleep(frame);
                }
            } else {
                draw(&panel, msg, 0);
            }
        }
        if stop.load(Ordering::SeqCst) {
            return;
        }
        if !scrolled {
            thread::sleep(IDLE_REDRAW);
        }
    }
}

fn draw<P: MatrixPanel>(panel: &Arc<Mutex<P>>, msg: &Message, x: i32) {
    if let Err(e) = panel.lock().unwrap().draw_text(msg.text(), x, 0) {
        warn!("draw failed at offset {x}: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::SimPanel;

    fn worker(width: u32) -> (RenderWorker<SimPanel>, Arc<Mutex<SimPanel>>) {
        let panel = Arc::new(Mutex::new(SimPanel::new(width, 8)));
        // fast frames so tests see plenty of them
        (RenderWorker::new(panel.clone(), 1000), panel)
    }

    fn settle() {
        thread::sleep(Duration::from_millis(50));
    }

    #[test]
    fn static_message_draws_at_origin() {
        let (mut worker, panel) = worker(32);
        worker.start(vec![Message::new("HI", false)]);
        settle();
        worker.stop();
        let panel = panel.lock().unwrap();
        assert!(!panel.draws().is_empty());
        assert!(panel.draws().iter().all(|d| d.x == 0 && d.text == "HI"));
    }

    #[test]
    fn scrolling_message_sweeps_right_to_left() {
        let (mut worker, panel) = worker(32);
        let msg = Message::new("Christmas in 2 sleeps", false);
        worker.start(vec![msg]);
        settle();
        worker.stop();
        let panel = panel.lock().unwrap();
        let xs: Vec<i32> = panel.draws().iter().map(|d| d.x).collect();
        assert!(xs.len() >= 2);
        // first frame starts off the right edge and offsets walk left
        assert_eq!(xs[0], 32);
        assert!(xs.windows(2).all(|w| w[1] < w[0]));
    }

    #[test]
    fn restart_never_leaves_two_threads() {
        let (mut worker, _panel) = worker(32);
        let msg = Message::new("a very long scrolling test message", false);
        worker.start(vec![msg.clone()]);
        settle();
        worker.start(vec![msg]);
        settle();
        assert_eq!(worker.live_workers(), 1);
        worker.stop();
        assert_eq!(worker.live_workers(), 0);
    }

    #[test]
    fn stop_when_idle_is_a_no_op() {
        let (mut worker, _panel) = worker(32);
        worker.stop();
        worker.stop();
        assert_eq!(worker.live_workers(), 0);
    }

    #[test]
    fn stop_quiesces_the_panel() {
        let (mut worker, panel) = worker(32);
        worker.start(vec![Message::new("a very long scrolling test message", false)]);
        settle();
        worker.stop();
        let count = panel.lock().unwrap().draws().len();
        thread::sleep(Duration::from_millis(30));
        assert_eq!(panel.lock().unwrap().draws().len(), count);
    }

    #[test]
    fn all_static_playlist_keeps_cycling() {
        let (mut worker, panel) = worker(128);
        worker.start(vec![Message::new("ONE", false), Message::new("TWO", false)]);
        thread::sleep(Duration::from_millis(300));
        worker.stop();
        let panel = panel.lock().unwrap();
        let ones = panel.draws().iter().filter(|d| d.text == "ONE").count();
        assert!(ones >= 2, "playlist should repeat, saw {ones} passes");
    }
}
