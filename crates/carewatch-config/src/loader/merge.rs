//! JSON overlay used to stack config layers.

use serde_json::{Map, Value};

/// Overlay `layer` onto `base`, skipping every leaf that `locked` pins.
///
/// Objects merge key by key; any other value replaces what is below it.
pub(super) fn overlay(base: &mut Value, layer: &Value, locked: Option<&Value>) {
    match (base, layer) {
        (Value::Object(base_map), Value::Object(layer_map)) => {
            for (key, value) in layer_map {
                let lock = match locked {
                    Some(Value::Object(map)) => map.get(key),
                    _ => None,
                };
                if lock.is_some_and(|lock| !lock.is_object()) {
                    continue;
                }
                let slot = base_map.entry(key.clone()).or_insert(Value::Null);
                overlay(slot, value, lock);
            }
        }
        (slot, Value::Object(_)) if matches!(locked, Some(Value::Object(_))) => {
            *slot = Value::Object(Map::new());
            overlay(slot, layer, locked);
        }
        (slot, value) => {
            if locked.is_none() {
                *slot = value.clone();
            }
        }
    }
}
