//! Component type resolution.
//!
//! Deterministic precedence, first match wins:
//!
//! 1. Explicit `component_type` override naming a known type.
//! 2. Boolean flags, in fixed priority order.
//! 3. Structural checks against the content's shape.
//! 4. Custom detectors, in registration order.
//! 5. TEXT, the terminal fallback - resolution is total.
//!
//! Custom detectors sit beneath the built-in structural tier on purpose: a
//! custom "wide dataframe" detector cannot pre-empt the DATAFRAME match.
//! Detector errors are the one way out of this function; they propagate to
//! whoever triggered component construction.

use crate::error::ResolveError;
use crate::registry::{ComponentRegistry, ComponentType};
use crate::value::{FigureEcosystem, Options, Value};

/// Boolean flags and the types they force, in priority order.
const FLAG_ORDER: [(&str, ComponentType); 6] = [
    ("is_error", ComponentType::ERROR),
    ("is_metric", ComponentType::METRIC),
    ("is_table", ComponentType::TABLE),
    ("is_json", ComponentType::JSON),
    ("is_html", ComponentType::HTML),
    ("is_code", ComponentType::CODE),
];

/// Resolve the component type for a content value.
pub fn resolve(content: &Value, options: &Options) -> Result<ComponentType, ResolveError> {
    // Tier 1: explicit override. Unknown names fall through to detection.
    if let Some(name) = options.component_type() {
        if let Some(component_type) = ComponentRegistry::type_by_name(name) {
            return Ok(component_type);
        }
    }

    // Tier 2: boolean flags.
    for (flag, component_type) in FLAG_ORDER {
        if options.flag(flag) {
            return Ok(component_type);
        }
    }

    // Tier 3: structural shape of the content.
    if let Some(component_type) = structural_type(content) {
        return Ok(component_type);
    }

    // Tier 4: custom detectors, registration order, first true wins.
    for (component_type, detector) in ComponentRegistry::custom_detectors() {
        let matched = detector(content, options).map_err(|source| ResolveError::Detector {
            type_name: component_type.name().to_string(),
            source,
        })?;
        if matched {
            return Ok(component_type);
        }
    }

    // Tier 5: anything displayable is text.
    Ok(ComponentType::TEXT)
}

/// Built-in structural detection. `Text` and `Other` return `None` so custom
/// detectors get a look before the TEXT fallback.
pub(crate) fn structural_type(content: &Value) -> Option<ComponentType> {
    match content {
        Value::Table(_) => Some(ComponentType::DATAFRAME),
        Value::Series(_) => Some(ComponentType::SERIES),
        Value::Figure(figure) => Some(match figure.ecosystem {
            FigureEcosystem::Matplotlib => ComponentType::MATPLOTLIB_FIGURE,
            FigureEcosystem::Plotly => ComponentType::PLOTLY_FIGURE,
        }),
        Value::Number(_) => Some(ComponentType::NUMBER),
        Value::Json(_) => Some(ComponentType::JSON),
        Value::List(items) if is_pair_sequence(items) => Some(ComponentType::DICT),
        Value::List(_) => Some(ComponentType::LIST),
        Value::Tuple(_) => Some(ComponentType::TUPLE),
        Value::Map(_) => Some(ComponentType::DICT),
        Value::Text(_) | Value::Other(_) => None,
    }
}

/// An ordered sequence of (label, value) pairs intended as a dict:
/// non-empty, every element a 2-tuple whose first element is text.
fn is_pair_sequence(items: &[Value]) -> bool {
    !items.is_empty()
        && items.iter().all(|item| {
            matches!(item, Value::Tuple(pair) if pair.len() == 2 && matches!(pair[0], Value::Text(_)))
        })
}
