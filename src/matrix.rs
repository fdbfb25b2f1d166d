/*
 *  matrix.rs
 *
 *  sleepcounter - how many sleeps until the big day?
 *
 *  Display facade: builds messages and hands them to the render worker,
 *  hiding the worker lifecycle from the widget layer.
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

use log::info;
use std::sync::{Arc, Mutex};

use crate::message::Message;
use crate::panel::{MatrixPanel, PanelError};
use crate::render::RenderWorker;

/// The panel plus its render worker. Callers only see `show` and `clear`;
/// the facade guarantees the worker is stopped and joined before the panel
/// is blanked or a new playlist starts.
pub struct MatrixDisplay<P: MatrixPanel + 'static> {
    panel: Arc<Mutex<P>>,
    worker: RenderWorker<P>,
    messages: Vec<Message>,
}

impl<P: MatrixPanel + 'static> MatrixDisplay<P> {
    pub fn new(panel: P, scroll_rate: u32) -> Self {
        let panel = Arc::new(Mutex::new(panel));
        let worker = RenderWorker::new(panel.clone(), scroll_rate);
        Self {
            panel,
            worker,
            messages: Vec::new(),
        }
    }

    /// Shared handle to the panel. Safe to inspect whenever the worker is
    /// stopped; tests use this to read back what was drawn.
    pub fn panel(&self) -> Arc<Mutex<P>> {
        self.panel.clone()
    }

    /// Replace whatever is showing with `lines`, one message each. Long
    /// lines scroll; short ones sit still unless `force_scroll` is set.
    pub fn show(&mut self, lines: &[String], force_scroll: bool) -> Result<(), PanelError> {
        self.clear()?;
        let (width, _) = self.panel.lock().unwrap().dimensions();
        self.messages = lines
            .iter()
            .map(|line| Message::new(line, force_scroll))
            .collect();
        for msg in &self.messages {
            if msg.is_scrolling(width) {
                info!("scrolling message <{}>", msg.text());
            } else {
                info!("showing static message <{}>", msg.text());
            }
        }
        self.worker.start(self.messages.clone());
        Ok(())
    }

    /// Stop the worker, then blank the panel. Nothing can write to the
    /// surface mid-clear because `stop` joins first.
    pub fn clear(&mut self) -> Result<(), PanelError> {
        self.worker.stop();
        self.panel.lock().unwrap().clear()?;
        self.messages.clear();
        Ok(())
    }

    #[allow(dead_code)]
    pub fn live_workers(&self) -> usize {
        self.worker.live_workers()
    }
}
