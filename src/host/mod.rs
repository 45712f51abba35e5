//! The host rendering capability - the library's only external boundary.
//!
//! Components never draw anything themselves; they call into a `RenderHost`,
//! which the embedding application supplies. Two implementations ship:
//! [`TuiHost`](tui::TuiHost) renders into ratatui lines, and
//! [`RecordingHost`](recording::RecordingHost) records calls for tests.

pub mod recording;
pub mod tui;

pub use recording::{HostCall, RecordingHost};
pub use tui::TuiHost;

use crate::value::{Figure, TableData};

/// Minimal capability surface a hosting UI toolkit must supply.
///
/// The two scoped operations take their body as a closure so the region is
/// guaranteed closed when the call returns, whatever the body does.
pub trait RenderHost {
    /// Display a block of (markdown-capable) text.
    fn text(&mut self, text: &str);

    /// Display tabular data.
    fn table(&mut self, table: &TableData);

    /// Display a chart from one of the supported plotting ecosystems.
    fn figure(&mut self, figure: &Figure);

    /// Display a boxed metric with optional label and delta.
    fn metric(&mut self, value: &str, label: Option<&str>, delta: Option<&str>);

    /// Display a syntax-highlightable code block.
    fn code(&mut self, source: &str, language: Option<&str>);

    /// Display a structured tree of scalars, sequences, and mappings.
    fn structured(&mut self, value: &serde_json::Value);

    /// Display raw markup.
    fn markup(&mut self, markup: &str);

    /// Display a visible error indicator.
    fn error(&mut self, message: &str);

    /// Scoped collapsible region, used by the render-failure path.
    fn debug_panel(&mut self, title: &str, body: &mut dyn FnMut(&mut dyn RenderHost));

    /// Scoped message-grouping region wrapping one conversational turn.
    fn message_group(&mut self, role: &str, avatar: &str, body: &mut dyn FnMut(&mut dyn RenderHost));
}
