use objc_xref_core::events::{EventSink, TracingSink, XrefEvent};

/// Event sink for interactive runs: prints operator lines to stdout and
/// forwards every event to `tracing`.
#[derive(Debug, Default)]
pub struct ConsoleSink {
    print: bool,
    tracing: TracingSink,
}

impl ConsoleSink {
    /// `print = false` keeps stdout clean (e.g. for JSON output).
    pub fn new(print: bool) -> Self {
        Self { print, tracing: TracingSink }
    }
}

impl EventSink for ConsoleSink {
    fn emit(&mut self, event: &XrefEvent) {
        self.tracing.emit(event);
        if self.print {
            if let Some(line) = event.operator_line() {
                println!("{line}");
            }
        }
    }
}
