/*
 *  stage.rs
 *
 *  sleepcounter - how many sleeps until the big day?
 *
 *  Linear translation stage capability and the bounded simulator.
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

use log::{debug, info};
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StageError {
    #[error("cannot go to position {requested}, travel is 0..={max}")]
    OutOfRange { requested: i64, max: i64 },
}

/// A stepper-driven carriage with bounded travel. `home`/`end` are the two
/// mechanical reference moves and always succeed; only arbitrary position
/// writes can be rejected. Real drivers plug in behind this trait.
pub trait LinearStage: Send {
    /// Maximum position index; travel is `0..=max`.
    fn max(&self) -> i64;

    fn position(&self) -> i64;

    /// Move to `steps`. Requests outside the travel range are an error, not
    /// clamped: the caller computes positions that must already be in range.
    fn set_position(&mut self, steps: i64) -> Result<(), StageError>;

    /// Move to the minimum position.
    fn home(&mut self);

    /// Move to the maximum position.
    fn end(&mut self);
}

#[derive(Debug, Default)]
pub struct SimStageState {
    pub position: i64,
    pub home_count: usize,
    pub end_count: usize,
}

/// In-memory stage simulator. State sits behind a shared handle, the same
/// arrangement as the panel mock, so tests keep a clone and watch the
/// carriage move after the widget takes ownership.
#[derive(Debug, Clone)]
pub struct SimStage {
    travel: i64,
    state: Arc<Mutex<SimStageState>>,
}

impl SimStage {
    pub fn new(travel: i64) -> Self {
        info!("simulated stage with travel 0..={travel}");
        Self {
            travel,
            state: Arc::new(Mutex::new(SimStageState::default())),
        }
    }

    #[allow(dead_code)]
    pub fn state(&self) -> Arc<Mutex<SimStageState>> {
        self.state.clone()
    }
}

impl LinearStage for SimStage {
    fn max(&self) -> i64 {
        self.travel
    }

    fn position(&self) -> i64 {
        self.state.lock().unwrap().position
    }

    fn set_position(&mut self, steps: i64) -> Result<(), StageError> {
        if steps < 0 || steps > self.travel {
            return Err(StageError::OutOfRange {
                requested: steps,
                max: self.travel,
            });
        }
        debug!("stage moving to {steps}");
        self.state.lock().unwrap().position = steps;
        Ok(())
    }

    fn home(&mut self) {
        debug!("homing stage");
        let mut state = self.state.lock().unwrap();
        state.position = 0;
        state.home_count += 1;
    }

    fn end(&mut self) {
        debug!("stage moving to end position");
        let mut state = self.state.lock().unwrap();
        state.position = self.travel;
        state.end_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn travel_bounds_are_enforced() {
        let mut stage = SimStage::new(100);
        assert!(stage.set_position(0).is_ok());
        assert!(stage.set_position(100).is_ok());
        let err = stage.set_position(101).unwrap_err();
        assert!(matches!(
            err,
            StageError::OutOfRange {
                requested: 101,
                max: 100
            }
        ));
        assert!(stage.set_position(-1).is_err());
        // failed moves leave the carriage where it was
        assert_eq!(stage.position(), 100);
    }

    #[test]
    fn reference_moves() {
        let mut stage = SimStage::new(4400);
        stage.end();
        assert_eq!(stage.position(), 4400);
        stage.home();
        assert_eq!(stage.position(), 0);
        let state = stage.state();
        assert_eq!(state.lock().unwrap().home_count, 1);
        assert_eq!(state.lock().unwrap().end_count, 1);
    }
}
