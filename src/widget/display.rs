/*
 *  widget/display.rs
 *
 *  sleepcounter - how many sleeps until the big day?
 *
 *  Matrix widget: turns calendar state into the playlist of messages the
 *  display facade renders.
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
use std::sync::Arc;

use crate::calendar::Calendar;
use crate::matrix::MatrixDisplay;
use crate::panel::MatrixPanel;
use crate::widget::{Widget, WidgetError};

pub struct MatrixWidget<P: MatrixPanel + 'static> {
    display: MatrixDisplay<P>,
    calendar: Arc<dyn Calendar>,
}

impl<P: MatrixPanel + 'static> MatrixWidget<P> {
    pub fn new(display: MatrixDisplay<P>, calendar: Arc<dyn Calendar>) -> Self {
        Self { display, calendar }
    }

    #[allow(dead_code)]
    pub fn display(&self) -> &MatrixDisplay<P> {
        &self.display
    }
}

/// One line per upcoming event, or a single celebration line on the day.
fn compose(calendar: &dyn Calendar) -> Vec<String> {
    if let Some(event) = calendar.todays_event() {
        return vec![format!("It's {}!", event.name)];
    }
    calendar
        .events()
        .iter()
        .filter_map(|event| {
            let sleeps = calendar.sleeps_to_event(event)?;
            let unit = if sleeps == 1 { "sleep" } else { "sleeps" };
            Some(format!("{} in {} {}", event.name, sleeps, unit))
        })
        .collect()
}

impl<P: MatrixPanel + 'static> Widget for MatrixWidget<P> {
    fn name(&self) -> &'static str {
        "matrix"
    }

    fn update(&mut self) -> Result<(), WidgetError> {
        let lines = compose(self.calendar.as_ref());
        info!("setting messages to {lines:?}");
        self.display.show(&lines, false)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{Diary, Event, FixedClock, at};
    use crate::panel::SimPanel;
    use std::thread;
    use std::time::Duration;

    fn diary(clock: Arc<FixedClock>) -> Arc<dyn Calendar> {
        Arc::new(Diary::new(
            vec![
                Event::new("Christmas", 12, 25),
                Event::new("New Year's Day", 1, 1),
            ],
            clock,
        ))
    }

    #[test]
    fn composes_a_line_per_event() {
        let clock = FixedClock::at(at(2018, 12, 23, 12, 10));
        let lines = compose(diary(clock).as_ref());
        assert_eq!(
            lines,
            vec![
                "Christmas in 2 sleeps".to_string(),
                "New Year's Day in 9 sleeps".to_string(),
            ]
        );
    }

    #[test]
    fn one_sleep_is_singular() {
        let clock = FixedClock::at(at(2018, 12, 24, 12, 10));
        let lines = compose(diary(clock).as_ref());
        assert!(lines.contains(&"Christmas in 1 sleep".to_string()));
    }

    #[test]
    fn special_day_gets_a_celebration_line() {
        let clock = FixedClock::at(at(2018, 12, 25, 17, 9));
        let lines = compose(diary(clock).as_ref());
        assert_eq!(lines, vec!["It's Christmas!".to_string()]);
    }

    #[test]
    fn update_renders_the_playlist() {
        let clock = FixedClock::at(at(2018, 12, 25, 17, 9));
        let display = MatrixDisplay::new(SimPanel::new(32, 8), 1000);
        let panel = display.panel();
        let mut widget = MatrixWidget::new(display, diary(clock));
        widget.update().unwrap();
        thread::sleep(Duration::from_millis(30));
        // normalized text reaches the panel
        assert!(
            panel
                .lock()
                .unwrap()
                .draws()
                .iter()
                .any(|d| d.text == "IT'S CHRISTMAS!")
        );
    }
}
