/*
 *  widget/stage.rs
 *
 *  sleepcounter - how many sleeps until the big day?
 *
 *  Stage widget: maps time-to-event onto carriage position. The carriage
 *  starts at home when a countdown begins and arrives at the end of its
 *  travel as the event arrives. Countdown state is persisted so a power cut
 *  resumes mid-travel instead of starting over.
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

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::calendar::{Calendar, Event};
use crate::recovery::{CountdownRecord, RecoveryStore};
use crate::stage::LinearStage;
use crate::widget::{Widget, WidgetError};

/// What one unit of countdown progress means. Same widget either way; only
/// the measurement differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountdownUnit {
    /// Continuous wall-clock seconds. The carriage creeps all day.
    Seconds,
    /// Whole nights. The carriage jumps once per day.
    Sleeps,
}

impl CountdownUnit {
    pub fn label(&self) -> &'static str {
        match self {
            CountdownUnit::Seconds => "seconds",
            CountdownUnit::Sleeps => "sleeps",
        }
    }

    fn remaining(&self, calendar: &dyn Calendar) -> Option<i64> {
        match self {
            CountdownUnit::Seconds => calendar.seconds_to_next_event(),
            CountdownUnit::Sleeps => calendar.sleeps_to_next_event(),
        }
    }
}

pub struct StageWidget<S: LinearStage, R: RecoveryStore> {
    stage: S,
    calendar: Arc<dyn Calendar>,
    store: R,
    unit: CountdownUnit,
    /// Full countdown length in `unit`s, None when no countdown is tracked.
    total: Option<i64>,
    /// The event the countdown runs to.
    tracked: Option<Event>,
}

impl<S: LinearStage, R: RecoveryStore> StageWidget<S, R> {
    /// Recovers any persisted countdown, then homes the stage. Homing is
    /// unconditional: the mechanical reference must be re-found on every
    /// boot even when the logical position is known, and it happens before
    /// any update so a construction-time failure still leaves the carriage
    /// somewhere safe.
    pub fn new(mut stage: S, calendar: Arc<dyn Calendar>, store: R, unit: CountdownUnit) -> Self {
        let (total, tracked) = match store.recover() {
            Some(record) => {
                info!(
                    "counting {} {} to {} in total",
                    record.total,
                    unit.label(),
                    record.event.name
                );
                (Some(record.total), Some(record.event))
            }
            None => (None, None),
        };
        stage.home();
        Self {
            stage,
            calendar,
            store,
            unit,
            total,
            tracked,
        }
    }
}

impl<S: LinearStage, R: RecoveryStore> Widget for StageWidget<S, R> {
    fn name(&self) -> &'static str {
        "stage"
    }

    /// Three cases, in order: the event is today (park at the end and stop
    /// tracking); no valid countdown for the calendar's next event (start
    /// one: home, persist); otherwise scale elapsed time onto the travel.
    fn update(&mut self) -> Result<(), WidgetError> {
        if self.calendar.special_day_today() {
            info!("today is a special day, moving stage to end position");
            self.total = None;
            self.stage.end();
            return Ok(());
        }
        let Some(next) = self.calendar.next_event() else {
            warn!("diary has no upcoming events, leaving stage put");
            return Ok(());
        };
        let Some(remaining) = self.unit.remaining(self.calendar.as_ref()) else {
            return Ok(());
        };
        match (self.total, self.tracked.as_ref()) {
            // steady state: tracked countdown still valid for this event.
            // total > 0 guards the division; a degenerate total recorded
            // from a stale calendar forces a reset instead.
            (Some(total), Some(tracked)) if *tracked == next && total > 0 => {
                let elapsed = total - remaining;
                let position = elapsed * self.stage.max() / total;
                debug!(
                    "{} {} to {}, updating position to {}",
                    remaining,
                    self.unit.label(),
                    next.name,
                    position
                );
                self.stage.set_position(position)?;
            }
            _ => {
                info!(
                    "starting countdown of {} {} to {}, homing stage",
                    remaining,
                    self.unit.label(),
                    next.name
                );
                self.total = Some(remaining);
                self.tracked = Some(next.clone());
                self.stage.home();
                self.store.record(&CountdownRecord {
                    total: remaining,
                    event: next,
                })?;
            }
        }
        Ok(())
    }
}
