// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Overlay merging.
//!
//! Merge policy: maps merge by key with overlay precedence; scalars and
//! sequences replace wholesale. Overlays are applied in sorted-by-name
//! order by the renderer, so later names override earlier ones.

use serde_yaml::Value;

/// Merge `overlay` into `base` in place.
pub fn merge_value(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(base_value) => merge_value(base_value, overlay_value),
                    None => {
                        base_map.insert(key.clone(), overlay_value.clone());
                    }
                }
            }
        }
        (base, overlay) => {
            *base = overlay.clone();
        }
    }
}

#[cfg(test)]
#[path = "overlay_tests.rs"]
mod tests;
