use std::collections::VecDeque;

use super::options::DragOptions;

/// Ring buffer of human-readable engine events, for copy-pasting into bug reports.
#[derive(Debug, Default)]
pub(super) struct DebugLog {
    lines: VecDeque<String>,
    event_serial: u64,
}

impl DebugLog {
    /// Call once per pointer event handed to the engine.
    pub(super) fn begin_event(&mut self) {
        self.event_serial = self.event_serial.wrapping_add(1);
    }

    pub(super) fn event(&mut self, options: &DragOptions, message: impl Into<String>) {
        let message = message.into();
        log::debug!("{message}");
        if !options.debug_event_log {
            return;
        }

        let cap = options.debug_event_log_capacity.clamp(1, 10_000);
        while self.lines.len() >= cap {
            self.lines.pop_front();
        }
        self.lines
            .push_back(format!("[event {}] {}", self.event_serial, message));
    }

    pub(super) fn clear(&mut self) {
        self.lines.clear();
    }

    pub(super) fn text(&self) -> String {
        self.lines
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_log_records_nothing() {
        let mut log = DebugLog::default();
        log.event(&DragOptions::default(), "hello");
        assert_eq!(log.text(), "");
    }

    #[test]
    fn ring_buffer_keeps_latest_lines() {
        let options = DragOptions {
            debug_event_log: true,
            debug_event_log_capacity: 2,
            ..Default::default()
        };
        let mut log = DebugLog::default();
        for i in 0..3 {
            log.begin_event();
            log.event(&options, format!("line {i}"));
        }
        assert_eq!(log.text(), "[event 2] line 1\n[event 3] line 2");

        log.clear();
        assert_eq!(log.text(), "");
    }
}
