//! Deep merge of config values.

use serde_json::Value;
use serde_json::map::Entry;

/// Fold `overlay` into `base`.
///
/// Only mapping-onto-mapping recurses; any other overlay (scalar, null,
/// sequence) takes the slot as-is.
pub(crate) fn merge_values(base: &mut Value, overlay: Value) {
    let Value::Object(incoming) = overlay else {
        *base = overlay;
        return;
    };
    match base {
        Value::Object(target) => {
            for (key, value) in incoming {
                match target.entry(key) {
                    Entry::Occupied(mut slot) => merge_values(slot.get_mut(), value),
                    Entry::Vacant(slot) => {
                        slot.insert(value);
                    }
                }
            }
        }
        other => *other = Value::Object(incoming),
    }
}
