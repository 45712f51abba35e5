//! One conversational turn: an ordered, append-only sequence of components
//! with fluent builders, plus the registrar that grafts new builder methods
//! onto every message at runtime.
//!
//! Rust has no runtime method injection, so registered builders are reached
//! through [`Message::call`]: a capability lookup against the process-wide
//! registry. Registration is visible to all messages, past and future.

use crate::component::Component;
use crate::error::{MethodError, ResolveError};
use crate::host::RenderHost;
use crate::registry::{ComponentRegistry, ComponentType, MethodEntry};
use crate::resolve;
use crate::value::{Figure, FigureEcosystem, Options, Series, TableData, Value, COMPONENT_TYPE_KEY};

/// One message in a conversation.
#[derive(Debug, Clone)]
pub struct Message {
    role: String,
    avatar: String,
    components: Vec<Component>,
}

impl Message {
    pub fn new(role: impl Into<String>, avatar: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            avatar: avatar.into(),
            components: Vec::new(),
        }
    }

    /// A user turn carrying its initial text.
    pub fn user(avatar: impl Into<String>, text: impl Into<String>) -> Self {
        let mut message = Self::new("user", avatar);
        message.add_text(text);
        message
    }

    /// An empty assistant turn; components are added afterwards.
    pub fn assistant(avatar: impl Into<String>) -> Self {
        Self::new("assistant", avatar)
    }

    /// An assistant turn carrying a single error component.
    pub fn error_message(avatar: impl Into<String>, error_text: impl Into<String>) -> Self {
        let mut message = Self::new("assistant", avatar);
        message.add_error(error_text);
        message
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn avatar(&self) -> &str {
        &self.avatar
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Append a pre-built component.
    pub fn add_component(&mut self, component: Component) -> &mut Self {
        self.components.push(component);
        self
    }

    /// Append content with full automatic type resolution.
    ///
    /// This is the one builder that can fail: a registered custom detector
    /// may error during resolution, and that error belongs to the caller.
    pub fn add(&mut self, content: Value, options: Options) -> Result<&mut Self, ResolveError> {
        let component = Component::new(content, options)?;
        Ok(self.add_component(component))
    }

    pub fn add_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.add_component(Component::with_type(
            ComponentType::TEXT,
            Value::text(text),
            Options::new(),
        ))
    }

    pub fn add_error(&mut self, text: impl Into<String>) -> &mut Self {
        self.add_component(Component::with_type(
            ComponentType::ERROR,
            Value::text(text),
            Options::new().with("is_error", true),
        ))
    }

    pub fn add_metric(
        &mut self,
        value: impl Into<Value>,
        label: Option<&str>,
        delta: Option<&str>,
    ) -> &mut Self {
        let mut options = Options::new().with("is_metric", true);
        if let Some(label) = label {
            options.set("label", label);
        }
        if let Some(delta) = delta {
            options.set("delta", delta);
        }
        self.add_component(Component::with_type(
            ComponentType::METRIC,
            value.into(),
            options,
        ))
    }

    pub fn add_number(&mut self, value: impl Into<f64>) -> &mut Self {
        self.add_component(Component::with_type(
            ComponentType::NUMBER,
            Value::number(value),
            Options::new(),
        ))
    }

    pub fn add_dataframe(&mut self, table: TableData) -> &mut Self {
        self.add_component(Component::with_type(
            ComponentType::DATAFRAME,
            Value::Table(table),
            Options::new(),
        ))
    }

    /// Like `add_dataframe` but rendered as a static table.
    pub fn add_table(&mut self, table: TableData) -> &mut Self {
        self.add_component(Component::with_type(
            ComponentType::TABLE,
            Value::Table(table),
            Options::new().with("is_table", true),
        ))
    }

    pub fn add_series(&mut self, series: Series) -> &mut Self {
        self.add_component(Component::with_type(
            ComponentType::SERIES,
            Value::Series(series),
            Options::new(),
        ))
    }

    /// The figure's ecosystem tag picks between the two figure types.
    pub fn add_figure(&mut self, figure: Figure) -> &mut Self {
        let component_type = match figure.ecosystem {
            FigureEcosystem::Matplotlib => ComponentType::MATPLOTLIB_FIGURE,
            FigureEcosystem::Plotly => ComponentType::PLOTLY_FIGURE,
        };
        self.add_component(Component::with_type(
            component_type,
            Value::Figure(figure),
            Options::new(),
        ))
    }

    pub fn add_code(&mut self, source: impl Into<String>, language: Option<&str>) -> &mut Self {
        let mut options = Options::new().with("is_code", true);
        if let Some(language) = language {
            options.set("language", language);
        }
        self.add_component(Component::with_type(
            ComponentType::CODE,
            Value::text(source),
            options,
        ))
    }

    pub fn add_json(&mut self, value: serde_json::Value) -> &mut Self {
        self.add_component(Component::with_type(
            ComponentType::JSON,
            Value::Json(value),
            Options::new().with("is_json", true),
        ))
    }

    pub fn add_html(&mut self, markup: impl Into<String>) -> &mut Self {
        self.add_component(Component::with_type(
            ComponentType::HTML,
            Value::text(markup),
            Options::new().with("is_html", true),
        ))
    }

    pub fn add_list(&mut self, items: Vec<Value>) -> &mut Self {
        self.add_component(Component::with_type(
            ComponentType::LIST,
            Value::List(items),
            Options::new(),
        ))
    }

    pub fn add_tuple(&mut self, items: Vec<Value>) -> &mut Self {
        self.add_component(Component::with_type(
            ComponentType::TUPLE,
            Value::Tuple(items),
            Options::new(),
        ))
    }

    pub fn add_dict(&mut self, pairs: Vec<(String, Value)>) -> &mut Self {
        self.add_component(Component::with_type(
            ComponentType::DICT,
            Value::Map(pairs),
            Options::new(),
        ))
    }

    /// Append content under an explicitly named type (custom or built-in).
    ///
    /// The name rides along in the options so renderers can see it. Unknown
    /// names fall back to structural detection, then TEXT; custom detectors
    /// are not consulted here, which keeps this builder infallible.
    pub fn add_custom(
        &mut self,
        content: Value,
        component_type: &str,
        options: Options,
    ) -> &mut Self {
        let options = options.with(COMPONENT_TYPE_KEY, component_type);
        let resolved = ComponentRegistry::type_by_name(component_type)
            .or_else(|| resolve::structural_type(&content))
            .unwrap_or(ComponentType::TEXT);
        self.add_component(Component::with_type(resolved, content, options))
    }

    /// Invoke a builder method registered at runtime.
    ///
    /// With no custom function registered, this is exactly
    /// `add_custom(content, <bound type name>, options)`.
    pub fn call(
        &mut self,
        method: &str,
        content: Value,
        options: Options,
    ) -> Result<&mut Self, MethodError> {
        let entry = ComponentRegistry::method(method)
            .ok_or_else(|| MethodError::Unknown(method.to_string()))?;
        match entry.func {
            Some(func) => func(self, content, options),
            None => {
                self.add_custom(content, entry.component_type.name(), options);
            }
        }
        Ok(self)
    }

    /// Register a builder method bound to a component type, reachable from
    /// every message (existing and future) through [`Message::call`].
    ///
    /// Re-registering a name silently overwrites the previous binding; names
    /// shadowing inherent builders only affect `call`.
    pub fn register_component_method(name: &str, component_type: ComponentType) {
        ComponentRegistry::register_method(
            name,
            MethodEntry {
                component_type,
                func: None,
            },
        );
    }

    /// Register a builder method backed by a caller-authored function, which
    /// takes full control of how content and options become components.
    pub fn register_component_method_fn(
        name: &str,
        component_type: ComponentType,
        func: impl Fn(&mut Message, Value, Options) + Send + Sync + 'static,
    ) {
        ComponentRegistry::register_method(
            name,
            MethodEntry {
                component_type,
                func: Some(std::sync::Arc::new(func)),
            },
        );
    }

    /// Render every component in order inside a message-group region.
    ///
    /// A failing component surfaces inline (see `Component::render`) and
    /// never aborts the components after it.
    pub fn render(&self, host: &mut dyn RenderHost) {
        host.message_group(&self.role, &self.avatar, &mut |group| {
            for component in &self.components {
                component.render(group);
            }
        });
    }
}
