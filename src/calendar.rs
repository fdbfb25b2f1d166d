/*
 *  calendar.rs
 *
 *  sleepcounter - how many sleeps until the big day?
 *
 *  Event identities and the calendar capability the widgets consume.
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

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Countdowns to an event target this wall time on the event day, so "2 days
/// to go" means two full nights of sleep rather than two midnights.
const WAKE_UP_HOUR: u32 = 7;

/// A yearly anniversary. Equality is identity: two records with the same
/// name and date are the same event for countdown-tracking purposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    pub month: u32,
    pub day: u32,
}

impl Event {
    pub fn new(name: &str, month: u32, day: u32) -> Self {
        Self {
            name: name.to_string(),
            month,
            day,
        }
    }
}

/// Time source behind the diary. Injectable so tests can pin the date.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock in local time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Calendar state consumed by the widgets. Date arithmetic lives behind this
/// seam; the widgets only ever ask "what is next and how far away is it".
pub trait Calendar: Send + Sync {
    fn events(&self) -> Vec<Event>;

    /// True when one of the tracked events is happening today.
    fn special_day_today(&self) -> bool;

    fn todays_event(&self) -> Option<Event>;

    /// The soonest event strictly in the future. Today's event is never
    /// "next"; it is reported through `special_day_today`.
    fn next_event(&self) -> Option<Event>;

    fn seconds_to_next_event(&self) -> Option<i64>;

    fn sleeps_to_next_event(&self) -> Option<i64>;

    /// Whole nights between now and the next occurrence of `event`.
    fn sleeps_to_event(&self, event: &Event) -> Option<i64>;
}

/// Chrono-backed diary of yearly anniversaries.
pub struct Diary {
    events: Vec<Event>,
    clock: Arc<dyn Clock>,
}

impl Diary {
    pub fn new(events: Vec<Event>, clock: Arc<dyn Clock>) -> Self {
        Self { events, clock }
    }

    fn today(&self) -> NaiveDate {
        self.clock.now().date()
    }

    /// Next calendar date of `event` on or after `from`. Skips years where
    /// the date does not exist (Feb 29).
    fn occurrence_on_or_after(&self, event: &Event, from: NaiveDate) -> Option<NaiveDate> {
        (from.year()..=from.year() + 8)
            .filter_map(|y| NaiveDate::from_ymd_opt(y, event.month, event.day))
            .find(|d| *d >= from)
    }

    fn occurrence_after(&self, event: &Event, from: NaiveDate) -> Option<NaiveDate> {
        self.occurrence_on_or_after(event, from.succ_opt()?)
    }

    fn deadline(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(NaiveTime::from_hms_opt(WAKE_UP_HOUR, 0, 0).unwrap_or(NaiveTime::MIN))
    }
}

impl Calendar for Diary {
    fn events(&self) -> Vec<Event> {
        self.events.clone()
    }

    fn special_day_today(&self) -> bool {
        self.todays_event().is_some()
    }

    fn todays_event(&self) -> Option<Event> {
        let today = self.today();
        self.events
            .iter()
            .find(|e| e.month == today.month() && e.day == today.day())
            .cloned()
    }

    fn next_event(&self) -> Option<Event> {
        let today = self.today();
        self.events
            .iter()
            .filter_map(|e| self.occurrence_after(e, today).map(|d| (d, e)))
            .min_by_key(|(d, _)| *d)
            .map(|(_, e)| e.clone())
    }

    fn seconds_to_next_event(&self) -> Option<i64> {
        let now = self.clock.now();
        let next = self.next_event()?;
        let date = self.occurrence_after(&next, now.date())?;
        Some((self.deadline(date) - now).num_seconds())
    }

    fn sleeps_to_next_event(&self) -> Option<i64> {
        let next = self.next_event()?;
        self.sleeps_to_event(&next)
    }

    fn sleeps_to_event(&self, event: &Event) -> Option<i64> {
        let today = self.today();
        let date = self.occurrence_on_or_after(event, today)?;
        Some((date - today).num_days())
    }
}

/// Settable clock for tests; shared so the test can move time forward while
/// the diary holds a handle to it.
#[cfg(test)]
pub struct FixedClock {
    now: std::sync::Mutex<NaiveDateTime>,
}

#[cfg(test)]
impl FixedClock {
    pub fn at(datetime: NaiveDateTime) -> Arc<Self> {
        Arc::new(Self {
            now: std::sync::Mutex::new(datetime),
        })
    }

    pub fn set(&self, datetime: NaiveDateTime) {
        *self.now.lock().unwrap() = datetime;
    }
}

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap()
    }
}

#[cfg(test)]
pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}
