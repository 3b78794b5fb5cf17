//! Caller attributes and params merged into a substituted render tree.
//!
//! | Target              | Source       |
//! |---------------------|--------------|
//! | `iframe`            | attributes   |
//! | `object.attributes` | attributes   |
//! | `object.embed`      | attributes   |
//! | `object.params`     | params       |
//!
//! Each merge is shallow: caller keys overwrite template keys in place and
//! new keys are appended in caller order. When `width` is given without
//! `height`, a height is derived from the provider's `sizeRatio`.

use indexmap::IndexMap;

use crate::template::{Scalar, TemplateMap, TemplateNode};

/// Ordered caller-supplied attributes or params.
pub type Attributes = IndexMap<String, Scalar>;

/// Merge `attributes` and `params` into a copy of `base`.
///
/// `base` must be the substituted but never-merged render tree; the result
/// depends only on the arguments, so repeated calls are idempotent.
pub fn merge(
    base: &TemplateMap,
    attributes: &Attributes,
    params: &Attributes,
    size_ratio: Option<f64>,
) -> TemplateMap {
    let mut render = base.clone();
    let attributes = with_default_height(attributes, size_ratio);

    if !attributes.is_empty() {
        if let Some(iframe) = render.get_mut("iframe").and_then(TemplateNode::as_map_mut) {
            overlay(iframe, &attributes);
        }
        if let Some(object) = render.get_mut("object").and_then(TemplateNode::as_map_mut) {
            for key in ["attributes", "embed"] {
                if let Some(target) = object.get_mut(key).and_then(TemplateNode::as_map_mut) {
                    overlay(target, &attributes);
                }
            }
        }
    }

    if !params.is_empty() {
        let object_params = render
            .get_mut("object")
            .and_then(TemplateNode::as_map_mut)
            .and_then(|object| object.get_mut("params"))
            .and_then(TemplateNode::as_map_mut);
        if let Some(target) = object_params {
            overlay(target, params);
        }
    }

    render
}

/// Attributes with `height = width / ratio` added when only `width` is set.
fn with_default_height(attributes: &Attributes, size_ratio: Option<f64>) -> Attributes {
    let mut working = attributes.clone();
    if working.contains_key("height") {
        return working;
    }
    let Some(width) = working.get("width").cloned() else {
        return working;
    };

    match (width.as_f64(), size_ratio) {
        (Some(w), Some(ratio)) => {
            let height = w / ratio;
            tracing::trace!(
                "Derived height {} from width {} and ratio {}",
                height,
                w,
                ratio
            );
            working.insert("height".to_string(), Scalar::Float(height));
        }
        (None, _) => {
            tracing::warn!("Cannot derive height from non-numeric width '{}'", width);
        }
        (Some(_), None) => {}
    }
    working
}

fn overlay(target: &mut TemplateMap, values: &Attributes) {
    for (key, value) in values {
        target.insert(key.clone(), TemplateNode::Leaf(value.clone()));
    }
}
