//! Rich, multi-component message history for chat-style terminal apps.
//!
//! A conversation is a [`MessageHistory`] of [`Message`]s, and each message is
//! an ordered list of typed [`Component`]s: text, tables, figures, metrics,
//! code, structured data, and anything an application registers on top. The
//! library decides how a piece of content should be displayed (the
//! [`ComponentType`] resolution in [`resolve`]), while the embedding
//! application decides how that display actually happens by implementing
//! [`RenderHost`]. A ratatui-backed [`TuiHost`] ships for terminal use and a
//! [`RecordingHost`] for tests.
//!
//! Rendering one component never takes down the transcript: a renderer error
//! is shown inline with a debug panel, and every other component still
//! renders.
//!
//! ```
//! use rich_message_history::{MessageHistory, RecordingHost};
//!
//! let mut history = MessageHistory::new();
//! history
//!     .add_assistant_message_create("🤖")
//!     .add_text("**Results** are in")
//!     .add_metric("98.4", Some("Accuracy"), Some("+1.2"));
//!
//! let mut host = RecordingHost::new();
//! history.render_all(&mut host);
//! ```
//!
//! # Extension registry
//!
//! [`ComponentRegistry`] holds custom component types, detectors, renderers,
//! and message methods in process-wide state. Registration is expected at
//! startup, before rendering begins; the registry is internally locked so
//! concurrent reads are safe, but interleaving registration with rendering
//! from multiple threads gives no ordering guarantees. Tests isolate
//! themselves with [`ComponentRegistry::snapshot`] and
//! [`ComponentRegistry::restore`].

pub mod component;
pub mod error;
pub mod history;
pub mod host;
pub mod markdown;
pub mod message;
pub mod registry;
pub mod resolve;
pub mod theme;
pub mod value;

pub use component::Component;
pub use error::{DetectorError, MethodError, RegistryError, RenderError, ResolveError};
pub use history::MessageHistory;
pub use host::{HostCall, RecordingHost, RenderHost, TuiHost};
pub use message::Message;
pub use registry::{ComponentRegistry, ComponentType, RegistrySnapshot};
pub use resolve::resolve;
pub use theme::Theme;
pub use value::{
    Figure, FigureEcosystem, FigureSeries, Options, OtherValue, Series, TableData, Value,
    COMPONENT_TYPE_KEY,
};
