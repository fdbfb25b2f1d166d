/*
 *  panel.rs
 *
 *  sleepcounter - how many sleeps until the big day?
 *
 *  Pixel panel capability and a framebuffer-backed simulator. The simulator
 *  records every operation so tests can watch what the render worker drew.
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

use embedded_graphics::{
    Pixel,
    geometry::Size,
    mono_font::MonoTextStyleBuilder,
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};
use thiserror::Error;

use crate::message::PANEL_FONT;

#[derive(Debug, Error)]
pub enum PanelError {
    #[error("drawing failed: {0}")]
    Draw(String),
    #[error("device error: {0}")]
    Device(String),
}

/// An LED dot-matrix panel. Each `draw_text` call replaces the whole frame,
/// which is what makes the scroll animation work: one call per offset.
pub trait MatrixPanel: Send {
    /// (width, height) in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Blank the frame and draw `text` with its top-left corner at (x, y).
    /// X may be negative or past the right edge; off-panel pixels are
    /// simply not lit.
    fn draw_text(&mut self, text: &str, x: i32, y: i32) -> Result<(), PanelError>;

    /// Blank the panel.
    fn clear(&mut self) -> Result<(), PanelError>;
}

/// One recorded `draw_text` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawCall {
    pub text: String,
    pub x: i32,
}

/// In-memory panel. Renders for real through embedded-graphics so pixel
/// counts are meaningful, and keeps a log of draw calls for assertions.
pub struct SimPanel {
    width: u32,
    height: u32,
    framebuffer: Vec<BinaryColor>,
    draws: Vec<DrawCall>,
    clear_count: usize,
}

impl SimPanel {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            framebuffer: vec![BinaryColor::Off; (width * height) as usize],
            draws: Vec::new(),
            clear_count: 0,
        }
    }

    #[allow(dead_code)]
    pub fn draws(&self) -> &[DrawCall] {
        &self.draws
    }

    #[allow(dead_code)]
    pub fn clear_count(&self) -> usize {
        self.clear_count
    }

    #[allow(dead_code)]
    pub fn lit_pixels(&self) -> usize {
        self.framebuffer
            .iter()
            .filter(|&&p| p == BinaryColor::On)
            .count()
    }

    fn blank(&mut self) {
        self.framebuffer.fill(BinaryColor::Off);
    }
}

impl MatrixPanel for SimPanel {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn draw_text(&mut self, text: &str, x: i32, y: i32) -> Result<(), PanelError> {
        self.blank();
        let style = MonoTextStyleBuilder::new()
            .font(&PANEL_FONT)
            .text_color(BinaryColor::On)
            .build();
        Text::with_baseline(text, Point::new(x, y), style, Baseline::Top)
            .draw(self)
            .map_err(|e| PanelError::Draw(format!("{e:?}")))?;
        self.draws.push(DrawCall {
            text: text.to_string(),
            x,
        });
        Ok(())
    }

    fn clear(&mut self) -> Result<(), PanelError> {
        self.blank();
        self.clear_count += 1;
        Ok(())
    }
}

impl DrawTarget for SimPanel {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (w, h) = (self.width as i32, self.height as i32);
        for Pixel(point, color) in pixels {
            if point.x >= 0 && point.x < w && point.y >= 0 && point.y < h {
                self.framebuffer[(point.y * w + point.x) as usize] = color;
            }
        }
        Ok(())
    }
}

impl OriginDimensions for SimPanel {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}
