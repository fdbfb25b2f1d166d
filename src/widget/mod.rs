/*
 *  widget/mod.rs
 *
 *  sleepcounter - how many sleeps until the big day?
 *
 *  The widget contract: a physical indicator the scheduler ticks.
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

pub mod display;
pub mod stage;

use thiserror::Error;

use crate::panel::PanelError;
use crate::recovery::RecoveryError;
use crate::stage::StageError;

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error(transparent)]
    Stage(#[from] StageError),
    #[error(transparent)]
    Recovery(#[from] RecoveryError),
    #[error(transparent)]
    Panel(#[from] PanelError),
}

/// A physical indicator. The scheduler calls `update` at its own pace from
/// a single thread; calls are serialized, never concurrent. Widgets must
/// not assume anything about when or how often they are ticked.
pub trait Widget: Send {
    fn name(&self) -> &'static str;

    /// Refresh the hardware from current calendar state. Side effects only.
    fn update(&mut self) -> Result<(), WidgetError>;
}
