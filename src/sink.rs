use std::io::Write;
use std::time::Duration;

/// Rendering seam between the monitor core and whatever displays it
pub trait PresentationSink {
    /// False once the display surface is gone; the monitor stops
    fn is_open(&self) -> bool;

    /// Rest between two active ticks
    fn frame_interval(&self) -> Duration;

    /// Replace the active-level panel contents
    fn draw_levels(&mut self, text: &str);

    /// Replace the quote panel contents
    fn draw_quotes(&mut self, text: &str);

    /// Proximity alert
    fn raise_alert(&mut self);
}

/// Console renderer: panels go to stdout when they change, the alert rings
/// the terminal bell
pub struct ConsoleSink {
    frame_interval: Duration,
    last_levels: String,
    last_quotes: String,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self {
            frame_interval: Duration::from_millis(33), // ~30 redraws per second
            last_levels: String::new(),
            last_quotes: String::new(),
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl PresentationSink for ConsoleSink {
    fn is_open(&self) -> bool {
        true
    }

    fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    fn draw_levels(&mut self, text: &str) {
        if text != self.last_levels {
            if !text.is_empty() {
                println!("--- active levels ---\n{}", text);
            }
            self.last_levels = text.to_string();
        }
    }

    fn draw_quotes(&mut self, text: &str) {
        if text != self.last_quotes {
            if !text.is_empty() {
                println!("{}", text);
            }
            self.last_quotes = text.to_string();
        }
    }

    fn raise_alert(&mut self) {
        print!("\x07");
        let _ = std::io::stdout().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_sink_defaults() {
        let sink = ConsoleSink::new();
        assert!(sink.is_open());
        assert_eq!(sink.frame_interval(), Duration::from_millis(33));
    }

    #[test]
    fn test_console_sink_tracks_last_frame() {
        let mut sink = ConsoleSink::new();
        sink.draw_quotes("[SBER] price: 250.00");
        assert_eq!(sink.last_quotes, "[SBER] price: 250.00");
        sink.draw_levels("");
        assert_eq!(sink.last_levels, "");
    }
}
