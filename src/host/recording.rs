//! A `RenderHost` that records every capability invocation.
//!
//! This is the supported way to unit-test custom renderers and message
//! composition without a terminal; the crate's own tests assert against it.

use super::RenderHost;
use crate::value::{Figure, TableData};

/// One recorded host-capability invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    Text(String),
    Table(TableData),
    Figure(Figure),
    Metric {
        value: String,
        label: Option<String>,
        delta: Option<String>,
    },
    Code {
        source: String,
        language: Option<String>,
    },
    Structured(serde_json::Value),
    Markup(String),
    Error(String),
    DebugPanelStart(String),
    DebugPanelEnd,
    GroupStart {
        role: String,
        avatar: String,
    },
    GroupEnd,
}

/// Test double recording calls in invocation order.
#[derive(Debug, Default)]
pub struct RecordingHost {
    calls: Vec<HostCall>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    pub fn into_calls(self) -> Vec<HostCall> {
        self.calls
    }

    /// Number of recorded `Error` invocations.
    pub fn error_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, HostCall::Error(_)))
            .count()
    }
}

impl RenderHost for RecordingHost {
    fn text(&mut self, text: &str) {
        self.calls.push(HostCall::Text(text.to_string()));
    }

    fn table(&mut self, table: &TableData) {
        self.calls.push(HostCall::Table(table.clone()));
    }

    fn figure(&mut self, figure: &Figure) {
        self.calls.push(HostCall::Figure(figure.clone()));
    }

    fn metric(&mut self, value: &str, label: Option<&str>, delta: Option<&str>) {
        self.calls.push(HostCall::Metric {
            value: value.to_string(),
            label: label.map(str::to_string),
            delta: delta.map(str::to_string),
        });
    }

    fn code(&mut self, source: &str, language: Option<&str>) {
        self.calls.push(HostCall::Code {
            source: source.to_string(),
            language: language.map(str::to_string),
        });
    }

    fn structured(&mut self, value: &serde_json::Value) {
        self.calls.push(HostCall::Structured(value.clone()));
    }

    fn markup(&mut self, markup: &str) {
        self.calls.push(HostCall::Markup(markup.to_string()));
    }

    fn error(&mut self, message: &str) {
        self.calls.push(HostCall::Error(message.to_string()));
    }

    fn debug_panel(&mut self, title: &str, body: &mut dyn FnMut(&mut dyn RenderHost)) {
        self.calls.push(HostCall::DebugPanelStart(title.to_string()));
        body(self);
        self.calls.push(HostCall::DebugPanelEnd);
    }

    fn message_group(&mut self, role: &str, avatar: &str, body: &mut dyn FnMut(&mut dyn RenderHost)) {
        self.calls.push(HostCall::GroupStart {
            role: role.to_string(),
            avatar: avatar.to_string(),
        });
        body(self);
        self.calls.push(HostCall::GroupEnd);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_calls_bracket_their_body() {
        let mut host = RecordingHost::new();
        host.message_group("user", "👤", &mut |h| {
            h.text("hello");
        });
        assert_eq!(
            host.calls(),
            &[
                HostCall::GroupStart {
                    role: "user".to_string(),
                    avatar: "👤".to_string()
                },
                HostCall::Text("hello".to_string()),
                HostCall::GroupEnd,
            ]
        );
    }

    #[test]
    fn test_error_count() {
        let mut host = RecordingHost::new();
        host.error("one");
        host.text("not an error");
        host.error("two");
        assert_eq!(host.error_count(), 2);
    }
}
