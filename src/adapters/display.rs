//! Console display adapter.
//!
//! Stands in for the TFT panel: keeps the current frame and writes it to
//! the log whenever it changes, so an unchanged status line is not
//! re-logged every refresh.

use heapless::String;
use log::info;

use crate::app::ports::DisplayPort;

const FRAME_LEN: usize = 96;

#[derive(Debug, Default)]
pub struct ConsoleDisplay {
    frame: String<FRAME_LEN>,
}

impl ConsoleDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text currently on screen.
    pub fn frame(&self) -> &str {
        &self.frame
    }

    fn show(&mut self, prefix: &str, text: &str) {
        let mut next: String<FRAME_LEN> = String::new();
        for c in prefix.chars().chain(text.chars()) {
            if next.push(c).is_err() {
                break;
            }
        }
        if next != self.frame {
            info!("SCREEN | {}", next);
            self.frame = next;
        }
    }
}

impl DisplayPort for ConsoleDisplay {
    fn render_status(&mut self, text: &str) {
        self.show("", text);
    }

    fn render_alarm(&mut self, title: &str) {
        self.show("ALARM: ", title);
    }
}
