use std::{
    fs::OpenOptions,
    io::{LineWriter, Write},
    sync::Mutex,
};

use tracing::warn;

use crate::trace::trace::FormTraceEvent;

type Sink = Mutex<LineWriter<Box<dyn Write + Send>>>;

/// JSONL sink for controller transitions. Never fails the caller: a sink
/// that cannot be opened or written only produces a `tracing` warning.
pub struct TraceLogger {
    sink: Option<Sink>,
}

impl TraceLogger {
    /// Append to `path`, creating it if needed.
    pub fn new(path: &str) -> Self {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Self::to_writer(file),
            Err(e) => {
                warn!(path, "trace disabled, cannot open file: {}", e);
                Self::disabled()
            }
        }
    }

    /// Trace into any writer; each event is flushed as one line.
    pub fn to_writer(writer: impl Write + Send + 'static) -> Self {
        let boxed: Box<dyn Write + Send> = Box::new(writer);
        Self {
            sink: Some(Mutex::new(LineWriter::new(boxed))),
        }
    }

    pub fn disabled() -> Self {
        Self { sink: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    pub fn log(&self, event: &FormTraceEvent) {
        let Some(sink) = &self.sink else { return };

        let line = match serde_json::to_string(event) {
            Ok(line) => line,
            Err(e) => {
                warn!(form = %event.form_id, "unserializable trace event: {}", e);
                return;
            }
        };

        let Ok(mut out) = sink.lock() else {
            warn!("trace sink poisoned, event dropped");
            return;
        };
        if let Err(e) = writeln!(out, "{}", line) {
            warn!(form = %event.form_id, "trace write failed: {}", e);
        }
    }
}
