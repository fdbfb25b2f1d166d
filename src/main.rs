/*
 *  main.rs
 *
 *  sleepcounter - how many sleeps until the big day?
 *
 *  Entry point. Wires the diary, the stage widget and the matrix widget
 *  together and ticks them until a termination signal arrives.
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

mod app;
mod calendar;
mod config;
mod matrix;
mod message;
mod panel;
mod recovery;
mod render;
mod stage;
mod widget;

use anyhow::Result;
use env_logger::Env;
use log::info;
use std::sync::Arc;

use crate::app::Application;
use crate::calendar::{Calendar, Diary, SystemClock};
use crate::matrix::MatrixDisplay;
use crate::panel::SimPanel;
use crate::recovery::FileRecovery;
use crate::stage::SimStage;
use crate::widget::Widget;
use crate::widget::display::MatrixWidget;
use crate::widget::stage::StageWidget;

/// Waits for SIGINT, SIGTERM or SIGHUP, then returns so main can shut the
/// scheduler down gracefully.
async fn wait_for_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut hangup = signal(SignalKind::hangup())?;
    tokio::select! {
        _ = interrupt.recv() => info!("SIGINT received"),
        _ = terminate.recv() => info!("SIGTERM received"),
        _ = hangup.recv() => info!("SIGHUP received"),
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cfg = config::load()?;
    env_logger::Builder::from_env(
        Env::default().default_filter_or(cfg.log_level.as_deref().unwrap_or("info")),
    )
    .init();
    info!(
        "{} {} starting",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let diary: Arc<dyn Calendar> = Arc::new(Diary::new(cfg.diary_events(), Arc::new(SystemClock)));

    // Hardware is simulated: the panel renders into memory and the stage is
    // a bounded carriage model. Real drivers implement MatrixPanel and
    // LinearStage and slot in here.
    let display = MatrixDisplay::new(
        SimPanel::new(cfg.panel_width(), cfg.panel_height()),
        cfg.scroll_rate(),
    );
    let matrix_widget = MatrixWidget::new(display, diary.clone());
    let stage_widget = StageWidget::new(
        SimStage::new(cfg.stage_travel()),
        diary.clone(),
        FileRecovery::new(cfg.recovery_path()),
        cfg.units(),
    );

    let widgets: Vec<Box<dyn Widget>> = vec![Box::new(matrix_widget), Box::new(stage_widget)];
    let mut app = Application::new(widgets, cfg.update_interval());
    app.start();

    wait_for_signal().await?;
    info!("shutting down");
    app.stop();
    Ok(())
}
