use crate::model::{Layout, StyleRule};
use serde_json::{Value, json};

/// Layout as a JSON object keyed by image name, for consumers other than CSS.
/// Shape: `{ image, size: {w, h}, sprites: { name: { class, frame: {x, y, w, h} } }, meta }`.
/// `rules` must be the rules emitted for `layout` (same order).
pub fn to_json_manifest(layout: &Layout, rules: &[StyleRule], image_url: &str) -> Value {
    let mut sprites = serde_json::Map::new();
    for (p, r) in layout.placements.iter().zip(rules) {
        let frame = json!({"x": p.frame.x, "y": p.frame.y, "w": p.frame.w, "h": p.frame.h});
        sprites.insert(
            p.name.clone(),
            json!({
                "class": r.class_name,
                "frame": frame,
            }),
        );
    }
    json!({
        "image": image_url,
        "size": {"w": layout.width, "h": layout.height},
        "sprites": sprites,
        "meta": {
            "app": "css-sprite",
            "version": env!("CARGO_PKG_VERSION"),
        },
    })
}
