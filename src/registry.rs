//! Component type identifiers and the process-wide extension registry.
//!
//! Built-in types are a closed set; custom types are minted at runtime
//! through the registry. Detectors, renderers, and message builder methods
//! all live in one shared state object with explicit snapshot/restore so
//! tests can isolate themselves.
//!
//! The registry assumes a single logical thread of control (see the crate
//! docs); the `RwLock` exists because Rust statics must be `Sync`, not as a
//! concurrency contract. Embedding applications that mutate the registry
//! from multiple threads must serialize those mutations themselves.

use std::fmt;
use std::sync::{Arc, LazyLock, RwLock};

use tracing::debug;

use crate::error::{DetectorError, RegistryError, RenderError};
use crate::host::RenderHost;
use crate::message::Message;
use crate::value::{Options, Value};

/// Predicate deciding whether a type applies to a content value.
pub type Detector = Arc<dyn Fn(&Value, &Options) -> Result<bool, DetectorError> + Send + Sync>;

/// Side-effecting display routine invoked through the host capability.
pub type Renderer =
    Arc<dyn Fn(&Value, &Options, &mut dyn RenderHost) -> Result<(), RenderError> + Send + Sync>;

/// A builder method grafted onto `Message` at runtime.
pub type MethodFn = Arc<dyn Fn(&mut Message, Value, Options) + Send + Sync>;

/// The fifteen built-in component kinds, in fixed declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Builtin {
    Text,
    Dataframe,
    Series,
    MatplotlibFigure,
    PlotlyFigure,
    Number,
    Error,
    Code,
    Metric,
    Table,
    Json,
    Html,
    List,
    Tuple,
    Dict,
}

impl Builtin {
    const ALL: [Builtin; 15] = [
        Builtin::Text,
        Builtin::Dataframe,
        Builtin::Series,
        Builtin::MatplotlibFigure,
        Builtin::PlotlyFigure,
        Builtin::Number,
        Builtin::Error,
        Builtin::Code,
        Builtin::Metric,
        Builtin::Table,
        Builtin::Json,
        Builtin::Html,
        Builtin::List,
        Builtin::Tuple,
        Builtin::Dict,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Builtin::Text => "text",
            Builtin::Dataframe => "dataframe",
            Builtin::Series => "series",
            Builtin::MatplotlibFigure => "matplotlib_figure",
            Builtin::PlotlyFigure => "plotly_figure",
            Builtin::Number => "number",
            Builtin::Error => "error",
            Builtin::Code => "code",
            Builtin::Metric => "metric",
            Builtin::Table => "table",
            Builtin::Json => "json",
            Builtin::Html => "html",
            Builtin::List => "list",
            Builtin::Tuple => "tuple",
            Builtin::Dict => "dict",
        }
    }

    fn from_name(name: &str) -> Option<Builtin> {
        Builtin::ALL.into_iter().find(|b| b.as_str() == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Repr {
    Builtin(Builtin),
    Custom(Arc<str>),
}

/// Opaque identifier naming a kind of renderable content.
///
/// Built-in identifiers are associated constants (`ComponentType::TEXT`,
/// `ComponentType::METRIC`, ...); custom identifiers come from
/// [`ComponentRegistry::register_component_type`]. Compared by value, and
/// displayed as the backing string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentType(Repr);

impl ComponentType {
    pub const TEXT: ComponentType = ComponentType(Repr::Builtin(Builtin::Text));
    pub const DATAFRAME: ComponentType = ComponentType(Repr::Builtin(Builtin::Dataframe));
    pub const SERIES: ComponentType = ComponentType(Repr::Builtin(Builtin::Series));
    pub const MATPLOTLIB_FIGURE: ComponentType =
        ComponentType(Repr::Builtin(Builtin::MatplotlibFigure));
    pub const PLOTLY_FIGURE: ComponentType = ComponentType(Repr::Builtin(Builtin::PlotlyFigure));
    pub const NUMBER: ComponentType = ComponentType(Repr::Builtin(Builtin::Number));
    pub const ERROR: ComponentType = ComponentType(Repr::Builtin(Builtin::Error));
    pub const CODE: ComponentType = ComponentType(Repr::Builtin(Builtin::Code));
    pub const METRIC: ComponentType = ComponentType(Repr::Builtin(Builtin::Metric));
    pub const TABLE: ComponentType = ComponentType(Repr::Builtin(Builtin::Table));
    pub const JSON: ComponentType = ComponentType(Repr::Builtin(Builtin::Json));
    pub const HTML: ComponentType = ComponentType(Repr::Builtin(Builtin::Html));
    pub const LIST: ComponentType = ComponentType(Repr::Builtin(Builtin::List));
    pub const TUPLE: ComponentType = ComponentType(Repr::Builtin(Builtin::Tuple));
    pub const DICT: ComponentType = ComponentType(Repr::Builtin(Builtin::Dict));

    /// The backing string, e.g. `"text"` or a custom name.
    pub fn name(&self) -> &str {
        match &self.0 {
            Repr::Builtin(builtin) => builtin.as_str(),
            Repr::Custom(name) => name,
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self.0, Repr::Builtin(_))
    }

    /// All built-in identifiers in declaration order.
    pub fn builtins() -> impl Iterator<Item = ComponentType> {
        Builtin::ALL
            .into_iter()
            .map(|b| ComponentType(Repr::Builtin(b)))
    }

    /// Look up a built-in identifier by its backing string.
    pub fn builtin_from_name(name: &str) -> Option<ComponentType> {
        Builtin::from_name(name).map(|b| ComponentType(Repr::Builtin(b)))
    }

    fn custom(name: &str) -> ComponentType {
        ComponentType(Repr::Custom(Arc::from(name)))
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A builder method registered against `Message`.
#[derive(Clone)]
pub(crate) struct MethodEntry {
    pub(crate) component_type: ComponentType,
    /// `None` means the synthesized default builder
    /// (`add_custom` bound to `component_type`).
    pub(crate) func: Option<MethodFn>,
}

/// The registry's whole mutable state. Cloneable so it doubles as the
/// snapshot type; the closures inside are `Arc`s, so cloning is cheap.
#[derive(Clone, Default)]
pub struct RegistrySnapshot {
    /// Caller-registered identifiers, in registration order.
    custom_types: Vec<(String, ComponentType)>,
    /// Detectors in registration order; only custom-registered entries are
    /// consulted during resolution, last write per id wins.
    detectors: Vec<(ComponentType, Detector)>,
    /// Renderers, last write per id wins. May target built-in ids to
    /// override default rendering.
    renderers: Vec<(ComponentType, Renderer)>,
    /// Builder methods grafted onto `Message`, keyed by method name.
    methods: Vec<(String, MethodEntry)>,
}

static STATE: LazyLock<RwLock<RegistrySnapshot>> =
    LazyLock::new(|| RwLock::new(RegistrySnapshot::default()));

fn read() -> std::sync::RwLockReadGuard<'static, RegistrySnapshot> {
    STATE.read().unwrap_or_else(|e| e.into_inner())
}

fn write() -> std::sync::RwLockWriteGuard<'static, RegistrySnapshot> {
    STATE.write().unwrap_or_else(|e| e.into_inner())
}

/// Facade over the process-wide registry state.
///
/// All operations act on one shared catalog and persist for the lifetime of
/// the process, or until [`ComponentRegistry::restore`] /
/// [`ComponentRegistry::reset`] rolls them back.
pub struct ComponentRegistry;

impl ComponentRegistry {
    /// Mint a new custom component type.
    ///
    /// Fails with [`RegistryError::DuplicateType`] when `name` collides
    /// (case-sensitive) with a built-in or previously registered custom
    /// name; the earlier registration is left intact.
    pub fn register_component_type(name: &str) -> Result<ComponentType, RegistryError> {
        let mut state = write();
        if Builtin::from_name(name).is_some()
            || state.custom_types.iter().any(|(n, _)| n == name)
        {
            return Err(RegistryError::DuplicateType(name.to_string()));
        }
        let component_type = ComponentType::custom(name);
        state
            .custom_types
            .push((name.to_string(), component_type.clone()));
        debug!(name, "registered custom component type");
        Ok(component_type)
    }

    /// Store or overwrite the detector for a type.
    ///
    /// The detector is not validated here; errors surface when resolution
    /// invokes it.
    pub fn register_detector(
        component_type: ComponentType,
        detector: impl Fn(&Value, &Options) -> Result<bool, DetectorError> + Send + Sync + 'static,
    ) {
        let mut state = write();
        let detector: Detector = Arc::new(detector);
        if let Some(slot) = state
            .detectors
            .iter_mut()
            .find(|(ty, _)| *ty == component_type)
        {
            slot.1 = detector;
        } else {
            state.detectors.push((component_type.clone(), detector));
        }
        debug!(component_type = %component_type, "registered detector");
    }

    /// Store or overwrite the renderer for a type. Attaching a renderer to a
    /// built-in id overrides its default rendering.
    pub fn register_renderer(
        component_type: ComponentType,
        renderer: impl Fn(&Value, &Options, &mut dyn RenderHost) -> Result<(), RenderError>
            + Send
            + Sync
            + 'static,
    ) {
        let mut state = write();
        let renderer: Renderer = Arc::new(renderer);
        if let Some(slot) = state
            .renderers
            .iter_mut()
            .find(|(ty, _)| *ty == component_type)
        {
            slot.1 = renderer;
        } else {
            state.renderers.push((component_type.clone(), renderer));
        }
        debug!(component_type = %component_type, "registered renderer");
    }

    /// Look up a custom type by name.
    pub fn custom_type(name: &str) -> Option<ComponentType> {
        read()
            .custom_types
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, ty)| ty.clone())
    }

    /// Resolve a name against built-ins first, then custom registrations.
    pub fn type_by_name(name: &str) -> Option<ComponentType> {
        ComponentType::builtin_from_name(name).or_else(|| Self::custom_type(name))
    }

    /// Built-ins in declaration order, then customs in registration order.
    pub fn all_types() -> Vec<ComponentType> {
        let state = read();
        ComponentType::builtins()
            .chain(state.custom_types.iter().map(|(_, ty)| ty.clone()))
            .collect()
    }

    pub fn detector(component_type: &ComponentType) -> Option<Detector> {
        read()
            .detectors
            .iter()
            .find(|(ty, _)| ty == component_type)
            .map(|(_, d)| d.clone())
    }

    pub fn renderer(component_type: &ComponentType) -> Option<Renderer> {
        read()
            .renderers
            .iter()
            .find(|(ty, _)| ty == component_type)
            .map(|(_, r)| r.clone())
    }

    /// Detectors for custom types, in registration order. The resolver
    /// consults these as its final tier.
    pub(crate) fn custom_detectors() -> Vec<(ComponentType, Detector)> {
        read()
            .detectors
            .iter()
            .filter(|(ty, _)| !ty.is_builtin())
            .cloned()
            .collect()
    }

    pub(crate) fn register_method(name: &str, entry: MethodEntry) {
        let mut state = write();
        // Silent overwrite, matching the registrar contract.
        if let Some(slot) = state.methods.iter_mut().find(|(n, _)| n == name) {
            slot.1 = entry;
        } else {
            state.methods.push((name.to_string(), entry));
        }
        debug!(name, "registered component method");
    }

    pub(crate) fn method(name: &str) -> Option<MethodEntry> {
        read()
            .methods
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, entry)| entry.clone())
    }

    /// Capture the whole registry state, including registered message
    /// methods.
    pub fn snapshot() -> RegistrySnapshot {
        read().clone()
    }

    /// Replace the registry state with a previously captured snapshot.
    pub fn restore(snapshot: RegistrySnapshot) {
        *write() = snapshot;
    }

    /// Drop every custom type, detector, renderer, and method.
    pub fn reset() {
        *write() = RegistrySnapshot::default();
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Scoped isolation for tests that touch the process-wide registry.
    //!
    //! `cargo test` runs tests on parallel threads; anything mutating the
    //! registry must hold this guard, which serializes access and rolls the
    //! state back on drop.

    use super::*;
    use std::sync::Mutex;

    static TEST_LOCK: Mutex<()> = Mutex::new(());

    pub(crate) struct RegistryGuard {
        _lock: std::sync::MutexGuard<'static, ()>,
        saved: RegistrySnapshot,
    }

    impl Drop for RegistryGuard {
        fn drop(&mut self) {
            ComponentRegistry::restore(std::mem::take(&mut self.saved));
        }
    }

    /// Lock the registry for this test and restore its prior state on drop.
    pub(crate) fn isolated_registry() -> RegistryGuard {
        let lock = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let saved = ComponentRegistry::snapshot();
        ComponentRegistry::reset();
        RegistryGuard { _lock: lock, saved }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::isolated_registry;
    use super::*;

    #[test]
    fn test_builtin_names_roundtrip() {
        for ty in ComponentType::builtins() {
            assert_eq!(ComponentType::builtin_from_name(ty.name()), Some(ty));
        }
        assert_eq!(ComponentType::builtin_from_name("nope"), None);
    }

    #[test]
    fn test_register_component_type() {
        let _guard = isolated_registry();
        let image = ComponentRegistry::register_component_type("image").unwrap();
        assert_eq!(image.name(), "image");
        assert!(!image.is_builtin());
        assert_eq!(ComponentRegistry::custom_type("image"), Some(image));
    }

    #[test]
    fn test_duplicate_name_rejected_first_registration_intact() {
        let _guard = isolated_registry();
        let first = ComponentRegistry::register_component_type("image").unwrap();
        let err = ComponentRegistry::register_component_type("image").unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateType(name) if name == "image"));
        assert_eq!(ComponentRegistry::custom_type("image"), Some(first));
    }

    #[test]
    fn test_builtin_name_collision_rejected() {
        let _guard = isolated_registry();
        let err = ComponentRegistry::register_component_type("text").unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateType(_)));
        // Case-sensitive match: "TEXT" is a distinct, legal name.
        assert!(ComponentRegistry::register_component_type("TEXT").is_ok());
    }

    #[test]
    fn test_all_types_order() {
        let _guard = isolated_registry();
        ComponentRegistry::register_component_type("alpha").unwrap();
        ComponentRegistry::register_component_type("beta").unwrap();
        let all = ComponentRegistry::all_types();
        assert_eq!(all.len(), 17);
        assert_eq!(all[0], ComponentType::TEXT);
        assert_eq!(all[14], ComponentType::DICT);
        assert_eq!(all[15].name(), "alpha");
        assert_eq!(all[16].name(), "beta");
    }

    #[test]
    fn test_last_detector_registration_wins() {
        let _guard = isolated_registry();
        let special = ComponentRegistry::register_component_type("special").unwrap();
        ComponentRegistry::register_detector(special.clone(), |_, _| Ok(false));
        ComponentRegistry::register_detector(special.clone(), |_, _| Ok(true));
        let detector = ComponentRegistry::detector(&special).unwrap();
        assert!(detector(&Value::text("x"), &Options::new()).unwrap());
    }

    #[test]
    fn test_renderer_on_builtin_type_allowed() {
        let _guard = isolated_registry();
        ComponentRegistry::register_renderer(ComponentType::TEXT, |_, _, host| {
            host.text("overridden");
            Ok(())
        });
        assert!(ComponentRegistry::renderer(&ComponentType::TEXT).is_some());
    }

    #[test]
    fn test_snapshot_restore() {
        let _guard = isolated_registry();
        ComponentRegistry::register_component_type("ephemeral").unwrap();
        let snap = ComponentRegistry::snapshot();
        ComponentRegistry::reset();
        assert_eq!(ComponentRegistry::custom_type("ephemeral"), None);
        ComponentRegistry::restore(snap);
        assert!(ComponentRegistry::custom_type("ephemeral").is_some());
    }
}
