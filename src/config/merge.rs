//! One-level-deep merge of two parsed configuration trees.
//!
//! For every top-level key of the overlay:
//! - both sides are tables: the overlay's keys are written into the base
//!   table, unlisted base keys survive. Nested tables inside that section are
//!   replaced wholesale.
//! - anything else: the overlay value replaces the base value.

use config::{Map, Value, ValueKind};

pub type Sections = Map<String, Value>;

pub fn merge_sections(base: &mut Sections, overlay: Sections) {
    for (key, value) in overlay {
        let base_is_table = matches!(base.get(&key).map(|v| &v.kind), Some(ValueKind::Table(_)));
        match value.kind {
            ValueKind::Table(overrides) if base_is_table => {
                if let Some(Value {
                    kind: ValueKind::Table(section),
                    ..
                }) = base.get_mut(&key)
                {
                    section.extend(overrides);
                }
            }
            kind => {
                base.insert(key, Value::new(None, kind));
            }
        }
    }
}
