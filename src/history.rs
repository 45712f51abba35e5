//! The full ordered transcript of a conversation.
//!
//! Append-only during normal use; `clear` is the only removal operation.
//! The history owns its messages and, transitively, every component.

use crate::error::{DetectorError, RegistryError, RenderError};
use crate::host::RenderHost;
use crate::message::Message;
use crate::registry::{ComponentRegistry, ComponentType};
use crate::value::{Options, Value};

/// Ordered sequence of messages.
#[derive(Debug, Clone, Default)]
pub struct MessageHistory {
    messages: Vec<Message>,
}

impl MessageHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append a pre-built message.
    pub fn add_message(&mut self, message: Message) -> &mut Message {
        self.messages.push(message);
        self.messages.last_mut().expect("just pushed")
    }

    /// Append a pre-built user turn.
    pub fn add_user_message(&mut self, message: Message) -> &mut Message {
        self.add_message(message)
    }

    /// Append a pre-built assistant turn.
    pub fn add_assistant_message(&mut self, message: Message) -> &mut Message {
        self.add_message(message)
    }

    /// Append a user turn with its text, returning it for further building.
    pub fn add_user_message_create(
        &mut self,
        avatar: impl Into<String>,
        text: impl Into<String>,
    ) -> &mut Message {
        self.add_message(Message::user(avatar, text))
    }

    /// Append an empty assistant turn, returning it so components can be
    /// chained on.
    pub fn add_assistant_message_create(&mut self, avatar: impl Into<String>) -> &mut Message {
        self.add_message(Message::assistant(avatar))
    }

    /// Append an assistant turn carrying a single error component.
    pub fn add_error_message(
        &mut self,
        avatar: impl Into<String>,
        error_text: impl Into<String>,
    ) -> &mut Message {
        self.add_message(Message::error_message(avatar, error_text))
    }

    /// Render every message in order.
    pub fn render_all(&self, host: &mut dyn RenderHost) {
        for message in &self.messages {
            message.render(host);
        }
    }

    /// Render only the last `n` messages.
    pub fn render_last(&self, n: usize, host: &mut dyn RenderHost) {
        let start = self.messages.len().saturating_sub(n);
        for message in &self.messages[start..] {
            message.render(host);
        }
    }

    /// Drop every message.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    // Registration pass-throughs, mirroring the registry and the message
    // registrar so embedders can drive everything through one type.

    pub fn register_component_type(name: &str) -> Result<ComponentType, RegistryError> {
        ComponentRegistry::register_component_type(name)
    }

    pub fn register_component_detector(
        component_type: ComponentType,
        detector: impl Fn(&Value, &Options) -> Result<bool, DetectorError> + Send + Sync + 'static,
    ) {
        ComponentRegistry::register_detector(component_type, detector);
    }

    pub fn register_component_renderer(
        component_type: ComponentType,
        renderer: impl Fn(&Value, &Options, &mut dyn RenderHost) -> Result<(), RenderError>
            + Send
            + Sync
            + 'static,
    ) {
        ComponentRegistry::register_renderer(component_type, renderer);
    }

    pub fn register_component_method(name: &str, component_type: ComponentType) {
        Message::register_component_method(name, component_type);
    }

    pub fn register_component_method_fn(
        name: &str,
        component_type: ComponentType,
        func: impl Fn(&mut Message, Value, Options) + Send + Sync + 'static,
    ) {
        Message::register_component_method_fn(name, component_type, func);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostCall, RecordingHost};
    use crate::registry::test_support::isolated_registry;

    #[test]
    fn test_add_message_and_order() {
        let _guard = isolated_registry();
        let mut history = MessageHistory::new();
        history.add_message(Message::new("user", "😈"));
        history.add_message(Message::new("assistant", "☃️"));
        assert_eq!(history.len(), 2);
        assert_eq!(history.messages()[1].role(), "assistant");
    }

    #[test]
    fn test_prebuilt_message_wrappers() {
        let _guard = isolated_registry();
        let mut history = MessageHistory::new();
        history.add_user_message(Message::user("👤", "hi"));
        history
            .add_assistant_message(Message::assistant("🤖"))
            .add_text("hello");
        assert_eq!(history.len(), 2);
        assert_eq!(history.messages()[0].role(), "user");
        assert_eq!(history.messages()[1].role(), "assistant");
        assert_eq!(history.messages()[1].components().len(), 1);
    }

    #[test]
    fn test_facade_method_fn_registration() {
        let _guard = isolated_registry();
        let stamp = MessageHistory::register_component_type("stamp").unwrap();
        {
            let stamp = stamp.clone();
            MessageHistory::register_component_method_fn(
                "add_stamp",
                stamp.clone(),
                move |message, content, options| {
                    let wrapped = Value::Map(vec![("stamped".to_string(), content)]);
                    message.add_custom(wrapped, stamp.name(), options);
                },
            );
        }

        let mut history = MessageHistory::new();
        history
            .add_assistant_message_create("🤖")
            .call("add_stamp", Value::text("payload"), Options::new())
            .unwrap();

        let component = &history.messages()[0].components()[0];
        assert_eq!(component.component_type(), &stamp);
        assert!(matches!(component.content(), Value::Map(pairs) if pairs.len() == 1));
    }

    #[test]
    fn test_clear_then_render_all_renders_nothing() {
        let _guard = isolated_registry();
        let mut history = MessageHistory::new();
        history.add_user_message_create("👤", "hello");
        history.add_assistant_message_create("🤖").add_text("hi");
        history.clear();
        assert!(history.is_empty());

        let mut host = RecordingHost::new();
        history.render_all(&mut host);
        assert!(host.calls().is_empty());
    }

    #[test]
    fn test_render_last_limits_messages() {
        let _guard = isolated_registry();
        let mut history = MessageHistory::new();
        history.add_user_message_create("👤", "one");
        history.add_user_message_create("👤", "two");
        history.add_user_message_create("👤", "three");

        let mut host = RecordingHost::new();
        history.render_last(2, &mut host);
        let texts: Vec<&str> = host
            .calls()
            .iter()
            .filter_map(|c| match c {
                HostCall::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["two", "three"]);

        // Asking for more than exists renders everything.
        let mut host = RecordingHost::new();
        history.render_last(10, &mut host);
        assert_eq!(host.calls().iter().filter(|c| matches!(c, HostCall::GroupStart { .. })).count(), 3);
    }

    #[test]
    fn test_error_message_turn() {
        let _guard = isolated_registry();
        let mut history = MessageHistory::new();
        history.add_error_message("🤖", "something broke");
        let mut host = RecordingHost::new();
        history.render_all(&mut host);
        assert!(host
            .calls()
            .iter()
            .any(|c| matches!(c, HostCall::Error(msg) if msg == "something broke")));
    }

    #[test]
    fn test_end_to_end_custom_video_method() {
        let _guard = isolated_registry();
        use std::sync::{Arc, Mutex};

        // Register type "video", a recording renderer, and the add_video
        // method, then drive it all through the history facade.
        let video = MessageHistory::register_component_type("video").unwrap();
        let seen: Arc<Mutex<Vec<(String, Option<i64>)>>> = Arc::new(Mutex::new(Vec::new()));
        {
            let seen = seen.clone();
            MessageHistory::register_component_renderer(video.clone(), move |content, options, _| {
                seen.lock().unwrap().push((
                    content.to_string(),
                    options.get("start_time").and_then(serde_json::Value::as_i64),
                ));
                Ok(())
            });
        }
        MessageHistory::register_component_method("add_video", video);

        let mut history = MessageHistory::new();
        history
            .add_assistant_message_create("🤖")
            .call(
                "add_video",
                Value::text("url"),
                Options::new().with("start_time", 5),
            )
            .unwrap();

        let mut host = RecordingHost::new();
        history.render_all(&mut host);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.as_slice(), &[("url".to_string(), Some(5))]);
    }

    #[test]
    fn test_rendering_twice_is_behaviorally_identical() {
        let _guard = isolated_registry();
        let mut history = MessageHistory::new();
        history
            .add_assistant_message_create("🤖")
            .add_text("a")
            .add_metric(1.0, Some("m"), None);

        let mut first = RecordingHost::new();
        let mut second = RecordingHost::new();
        history.render_all(&mut first);
        history.render_all(&mut second);
        assert_eq!(first.calls(), second.calls());
    }
}
