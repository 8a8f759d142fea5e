//! Cache Logging
//!
//! Leveled sink for cache events behind a single on/off gate. The default
//! sink forwards to `tracing`.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use tracing::{error, info, warn};

// == Level ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        f.write_str(name)
    }
}

// == Log Event ==
/// One cache event.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    pub level: LogLevel,
    pub resource_type: String,
    pub message: String,
    /// Structured details, such as the identifier or the entry
    pub context: Value,
}

/// Destination of cache events.
pub trait LogSink {
    fn emit(&self, event: &LogEvent);
}

// == Tracing Sink ==
/// Forwards events to the `tracing` macros.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&self, event: &LogEvent) {
        let resource_type = event.resource_type.as_str();
        let context = &event.context;
        match event.level {
            LogLevel::Info => info!(resource_type, %context, "[memCache] {}", event.message),
            LogLevel::Warn => warn!(resource_type, %context, "[memCache] {}", event.message),
            LogLevel::Error => error!(resource_type, %context, "[memCache] {}", event.message),
        }
    }
}

// == Recording Sink ==
/// Keeps every event in memory. Clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    events: Rc<RefCell<Vec<LogEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.events.borrow().clone()
    }

    pub fn count(&self, level: LogLevel) -> usize {
        self.events.borrow().iter().filter(|e| e.level == level).count()
    }
}

impl LogSink for RecordingSink {
    fn emit(&self, event: &LogEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

// == Cache Logger ==
/// Gated front of a [`LogSink`].
pub struct CacheLogger {
    enabled: bool,
    sink: Box<dyn LogSink>,
}

impl CacheLogger {
    pub fn new(enabled: bool, sink: Box<dyn LogSink>) -> Self {
        Self { enabled, sink }
    }

    pub fn info(&self, resource_type: &str, message: impl Into<String>, context: Value) {
        self.log(LogLevel::Info, resource_type, message.into(), context);
    }

    pub fn warn(&self, resource_type: &str, message: impl Into<String>, context: Value) {
        self.log(LogLevel::Warn, resource_type, message.into(), context);
    }

    pub fn error(&self, resource_type: &str, message: impl Into<String>, context: Value) {
        self.log(LogLevel::Error, resource_type, message.into(), context);
    }

    fn log(&self, level: LogLevel, resource_type: &str, message: String, context: Value) {
        if !self.enabled {
            return;
        }
        self.sink.emit(&LogEvent {
            level,
            resource_type: resource_type.to_string(),
            message,
            context,
        });
    }
}

impl fmt::Debug for CacheLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheLogger")
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}
