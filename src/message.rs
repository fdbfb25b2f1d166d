/*
 *  message.rs
 *
 *  sleepcounter - how many sleeps until the big day?
 *
 *  A renderable unit of text: case-normalized, measured once against the
 *  panel font, and carrying its own scroll decision.
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

use embedded_graphics::mono_font::{MonoFont, ascii::FONT_5X8};

/// The one font the panel renders. 8 pixels tall, the full height of a
/// MAX7219-style matrix row.
pub const PANEL_FONT: MonoFont<'static> = FONT_5X8;

/// Width of `text` in pixels under [`PANEL_FONT`].
pub fn text_width(text: &str) -> u32 {
    let cell = PANEL_FONT.character_size.width + PANEL_FONT.character_spacing;
    text.chars().count() as u32 * cell
}

/// One line of display text. The panel font has no lowercase glyphs worth
/// looking at on an 8-pixel matrix, so text is upper-cased on construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    text: String,
    force_scroll: bool,
    pixel_len: u32,
}

impl Message {
    pub fn new(text: &str, force_scroll: bool) -> Self {
        let text = text.to_uppercase();
        let pixel_len = text_width(&text);
        Self {
            text,
            force_scroll,
            pixel_len,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn pixel_len(&self) -> u32 {
        self.pixel_len
    }

    /// Scroll when forced, or when the text simply does not fit.
    pub fn is_scrolling(&self, display_width: u32) -> bool {
        self.force_scroll || self.pixel_len > display_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_upper_cased() {
        let msg = Message::new("It's Christmas!", false);
        assert_eq!(msg.text(), "IT'S CHRISTMAS!");
    }

    #[test]
    fn pixel_length_is_measured_once() {
        let cell = PANEL_FONT.character_size.width + PANEL_FONT.character_spacing;
        let msg = Message::new("HI", false);
        assert_eq!(msg.pixel_len(), 2 * cell);
    }

    #[test]
    fn long_text_scrolls() {
        let msg = Message::new("Christmas in 2 sleeps", false);
        assert!(msg.pixel_len() > 32);
        assert!(msg.is_scrolling(32));
    }

    #[test]
    fn short_text_is_static() {
        let msg = Message::new("HI", false);
        assert!(!msg.is_scrolling(32));
    }

    #[test]
    fn scroll_can_be_forced() {
        let msg = Message::new("HI", true);
        assert!(msg.is_scrolling(32));
    }
}
