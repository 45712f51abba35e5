//! A single renderable content unit inside a message.
//!
//! Components are immutable after construction: the type is resolved once
//! and never re-derived. Rendering owns the failure boundary - whatever a
//! renderer does, `render` returns normally, surfacing problems as an
//! inline error plus a collapsible debug panel.

use tracing::warn;

use crate::error::{RenderError, ResolveError};
use crate::host::RenderHost;
use crate::registry::{ComponentRegistry, ComponentType};
use crate::resolve;
use crate::value::{Options, Value};

/// Longest debug representation shown in the failure panel.
const DEBUG_REPR_MAX_BYTES: usize = 2000;

/// One resolved, renderable content unit.
#[derive(Clone)]
pub struct Component {
    component_type: ComponentType,
    content: Value,
    options: Options,
}

impl Component {
    /// Construct with automatic type resolution.
    ///
    /// Fails only if a custom detector errors; matching itself is total.
    pub fn new(content: Value, options: Options) -> Result<Self, ResolveError> {
        let component_type = resolve::resolve(&content, &options)?;
        Ok(Self {
            component_type,
            content,
            options,
        })
    }

    /// Construct with a known type, bypassing detection entirely.
    pub fn with_type(component_type: ComponentType, content: Value, options: Options) -> Self {
        Self {
            component_type,
            content,
            options,
        }
    }

    pub fn component_type(&self) -> &ComponentType {
        &self.component_type
    }

    pub fn content(&self) -> &Value {
        &self.content
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Render through the host capability. Never fails; repeat calls have
    /// identical effect.
    pub fn render(&self, host: &mut dyn RenderHost) {
        if let Err(err) = self.render_content(host) {
            warn!(
                component_type = %self.component_type,
                error = %err,
                "component rendering failed"
            );
            self.render_failure(host, &err);
        }
    }

    /// Custom renderer if one is registered for this type (including custom
    /// renderers overriding built-in types), else the built-in routine.
    fn render_content(&self, host: &mut dyn RenderHost) -> Result<(), RenderError> {
        if let Some(renderer) = ComponentRegistry::renderer(&self.component_type) {
            return renderer(&self.content, &self.options, host);
        }
        self.render_builtin(host)
    }

    fn render_builtin(&self, host: &mut dyn RenderHost) -> Result<(), RenderError> {
        match self.component_type.name() {
            "text" => {
                host.text(&self.content.to_string());
                Ok(())
            }
            "error" => {
                host.error(&self.content.to_string());
                Ok(())
            }
            "dataframe" | "table" | "series" => {
                let table = self.content.to_table().ok_or_else(|| self.shape_error())?;
                host.table(&table);
                Ok(())
            }
            "matplotlib_figure" | "plotly_figure" => {
                let figure = self.content.as_figure().ok_or_else(|| self.shape_error())?;
                host.figure(figure);
                Ok(())
            }
            "number" | "metric" => {
                host.metric(
                    &self.content.to_string(),
                    self.option_display("label").as_deref(),
                    self.option_display("delta").as_deref(),
                );
                Ok(())
            }
            "code" => {
                host.code(&self.content.to_string(), self.options.get_str("language"));
                Ok(())
            }
            "json" | "dict" | "list" | "tuple" => {
                let tree = self.content.to_json()?;
                host.structured(&tree);
                Ok(())
            }
            "html" => {
                host.markup(&self.content.to_string());
                Ok(())
            }
            // A custom type with no registered renderer has nothing to
            // dispatch to; the failure path reports it.
            other => Err(RenderError::msg(format!(
                "no renderer registered for component type '{}'",
                other
            ))),
        }
    }

    /// Inline error plus collapsible debug panel. The panel carries the
    /// content's type name and a bounded best-effort representation.
    fn render_failure(&self, host: &mut dyn RenderHost, err: &RenderError) {
        host.error(&format!("Failed to render component: {}", err));
        let type_line = format!("content type: {}", self.content.type_name());
        let full_repr = self.content.to_string();
        let repr = truncate_on_char_boundary(&full_repr, DEBUG_REPR_MAX_BYTES);
        host.debug_panel("Debug details", &mut |panel| {
            panel.text(&type_line);
            panel.text(repr);
        });
    }

    fn shape_error(&self) -> RenderError {
        RenderError::UnsupportedContent {
            content: self.content.type_name(),
            component: self.component_type.name().to_string(),
        }
    }

    fn option_display(&self, key: &str) -> Option<String> {
        self.options.get(key).map(|value| match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

impl std::fmt::Debug for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Component")
            .field("component_type", &self.component_type.name())
            .field("content", &self.content.type_name())
            .finish_non_exhaustive()
    }
}

/// Truncate to at most `max_bytes`, backing up to a UTF-8 boundary.
fn truncate_on_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostCall, RecordingHost};
    use crate::registry::test_support::isolated_registry;
    use crate::value::{Figure, FigureEcosystem, TableData};
    use serde_json::json;

    #[test]
    fn test_builtin_text_rendering() {
        let _guard = isolated_registry();
        let component = Component::new(Value::text("hello"), Options::new()).unwrap();
        let mut host = RecordingHost::new();
        component.render(&mut host);
        assert_eq!(host.calls(), &[HostCall::Text("hello".to_string())]);
    }

    #[test]
    fn test_metric_rendering_with_label_and_delta() {
        let _guard = isolated_registry();
        let options = Options::new()
            .with("is_metric", true)
            .with("label", "Score")
            .with("delta", "+3");
        let component = Component::new(Value::number(99.0), options).unwrap();
        let mut host = RecordingHost::new();
        component.render(&mut host);
        assert_eq!(
            host.calls(),
            &[HostCall::Metric {
                value: "99".to_string(),
                label: Some("Score".to_string()),
                delta: Some("+3".to_string()),
            }]
        );
    }

    #[test]
    fn test_structured_rendering_for_map() {
        let _guard = isolated_registry();
        let content = Value::Map(vec![("k".to_string(), Value::number(1.0))]);
        let component = Component::new(content, Options::new()).unwrap();
        let mut host = RecordingHost::new();
        component.render(&mut host);
        assert_eq!(host.calls(), &[HostCall::Structured(json!({"k": 1.0}))]);
    }

    #[test]
    fn test_figure_rendering() {
        let _guard = isolated_registry();
        let figure = Figure::new(FigureEcosystem::Plotly).with_series("a", vec![(0.0, 1.0)]);
        let component = Component::new(Value::Figure(figure.clone()), Options::new()).unwrap();
        let mut host = RecordingHost::new();
        component.render(&mut host);
        assert_eq!(host.calls(), &[HostCall::Figure(figure)]);
    }

    #[test]
    fn test_custom_renderer_overrides_builtin() {
        let _guard = isolated_registry();
        ComponentRegistry::register_renderer(ComponentType::TEXT, |content, _, host| {
            host.text(&format!(">> {}", content));
            Ok(())
        });
        let component = Component::new(Value::text("hi"), Options::new()).unwrap();
        let mut host = RecordingHost::new();
        component.render(&mut host);
        assert_eq!(host.calls(), &[HostCall::Text(">> hi".to_string())]);
    }

    #[test]
    fn test_failing_renderer_never_escapes_render() {
        let _guard = isolated_registry();
        let crash = ComponentRegistry::register_component_type("crash").unwrap();
        ComponentRegistry::register_renderer(crash.clone(), |_, _, _| {
            Err(RenderError::msg("simulated renderer failure"))
        });
        let component = Component::with_type(
            crash,
            Value::Map(vec![("data".to_string(), Value::text("test"))]),
            Options::new(),
        );
        let mut host = RecordingHost::new();
        component.render(&mut host);

        // Exactly one inline error, then the debug panel.
        assert_eq!(host.error_count(), 1);
        assert!(matches!(&host.calls()[0], HostCall::Error(msg) if msg.contains("simulated")));
        assert!(matches!(
            &host.calls()[1],
            HostCall::DebugPanelStart(title) if title == "Debug details"
        ));
        assert!(matches!(host.calls().last(), Some(HostCall::DebugPanelEnd)));
        // Panel carries the content type name.
        assert!(host
            .calls()
            .iter()
            .any(|c| matches!(c, HostCall::Text(t) if t.contains("map"))));
    }

    #[test]
    fn test_shape_mismatch_takes_failure_path() {
        let _guard = isolated_registry();
        // Text forced to TABLE has no tabular form.
        let options = Options::new().with("is_table", true);
        let component = Component::new(Value::text("not a table"), options).unwrap();
        let mut host = RecordingHost::new();
        component.render(&mut host);
        assert_eq!(host.error_count(), 1);
    }

    #[test]
    fn test_custom_type_without_renderer_reports_inline() {
        let _guard = isolated_registry();
        let badge = ComponentRegistry::register_component_type("badge").unwrap();
        let component = Component::with_type(badge, Value::text("new"), Options::new());
        let mut host = RecordingHost::new();
        component.render(&mut host);
        assert!(matches!(&host.calls()[0], HostCall::Error(msg) if msg.contains("badge")));
    }

    #[test]
    fn test_rendering_twice_has_identical_effect() {
        let _guard = isolated_registry();
        let component = Component::new(Value::number(5.0), Options::new()).unwrap();
        let mut first = RecordingHost::new();
        let mut second = RecordingHost::new();
        component.render(&mut first);
        component.render(&mut second);
        component.render(&mut second);
        assert_eq!(second.calls().len(), first.calls().len() * 2);
        assert_eq!(&second.calls()[..first.calls().len()], first.calls());
    }

    #[test]
    fn test_table_aliases_share_the_table_capability() {
        let _guard = isolated_registry();
        let table = TableData::new(["a"], vec![vec!["1".to_string()]]);
        for options in [
            Options::new(),
            Options::new().with("is_table", true),
        ] {
            let component = Component::new(Value::Table(table.clone()), options).unwrap();
            let mut host = RecordingHost::new();
            component.render(&mut host);
            assert_eq!(host.calls(), &[HostCall::Table(table.clone())]);
        }
    }

    #[test]
    fn test_truncate_on_char_boundary() {
        assert_eq!(truncate_on_char_boundary("hello", 10), "hello");
        assert_eq!(truncate_on_char_boundary("日本語", 4), "日");
    }
}
