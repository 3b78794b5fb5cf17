//! Markup rendering for a merged render tree.
//!
//! Attribute values are written verbatim in map order. Escaping is left to
//! the caller.

use crate::template::{Scalar, TemplateMap, TemplateNode};

/// `<script ...></script>` if the tree has a `script` map.
pub fn render_script(render: &TemplateMap) -> Option<String> {
    let script = render.get("script")?.as_map()?;

    let mut html = String::from("<script");
    push_attributes(&mut html, script);
    html.push_str("></script>");
    Some(html)
}

/// `<iframe ...></iframe>` followed by the script tag, if any.
pub fn render_iframe(render: &TemplateMap) -> Option<String> {
    let iframe = render.get("iframe")?.as_map()?;

    let mut html = String::from("<iframe");
    push_attributes(&mut html, iframe);
    html.push_str("></iframe>");
    push_script(&mut html, render);
    Some(html)
}

/// `<object>` with nested `<param>` and `<embed>` tags, followed by the
/// script tag, if any.
pub fn render_object(render: &TemplateMap) -> Option<String> {
    let object = render.get("object")?.as_map()?;

    let mut html = String::from("<object");
    if let Some(attributes) = child_map(object, "attributes") {
        push_attributes(&mut html, attributes);
    }
    html.push('>');

    if let Some(params) = child_map(object, "params") {
        for (name, value) in params {
            html.push_str("<param name=\"");
            html.push_str(name);
            html.push_str("\" value=\"");
            push_value(&mut html, value);
            html.push_str("\"></param>");
        }
    }

    // Embed carries the same attributes as the object itself (width, height, ...).
    if let Some(embed) = child_map(object, "embed") {
        html.push_str("<embed");
        push_attributes(&mut html, embed);
        html.push_str("></embed>");
    }

    html.push_str("</object>");
    push_script(&mut html, render);
    Some(html)
}

/// Preferred markup: iframe first, object as fallback.
pub fn render_html(render: &TemplateMap) -> Option<String> {
    render_iframe(render).or_else(|| render_object(render))
}

fn child_map<'a>(map: &'a TemplateMap, key: &str) -> Option<&'a TemplateMap> {
    map.get(key).and_then(TemplateNode::as_map)
}

fn push_script(html: &mut String, render: &TemplateMap) {
    if let Some(script) = render_script(render) {
        html.push_str(&script);
    }
}

fn push_attributes(html: &mut String, attributes: &TemplateMap) {
    for (name, value) in attributes {
        html.push(' ');
        html.push_str(name);
        html.push_str("=\"");
        push_value(html, value);
        html.push('"');
    }
}

fn push_value(html: &mut String, value: &TemplateNode) {
    match value {
        TemplateNode::Leaf(Scalar::Str(s)) => html.push_str(s),
        TemplateNode::Leaf(other) => html.push_str(&other.to_string()),
        // Nested maps have no attribute form.
        TemplateNode::Node(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(toml_str: &str) -> TemplateMap {
        toml::from_str(toml_str).unwrap()
    }

    #[test]
    fn iframe_attributes_in_order() {
        let render = tree(
            r#"
[iframe]
src = "https://youtube.com/embed/abc123"
width = 560
height = 315
frameborder = "0"
"#,
        );
        assert_eq!(
            render_iframe(&render).unwrap(),
            r#"<iframe src="https://youtube.com/embed/abc123" width="560" height="315" frameborder="0"></iframe>"#
        );
    }

    #[test]
    fn iframe_is_followed_by_script() {
        let render = tree(
            r#"
[iframe]
src = "a"
[script]
src = "b.js"
async = true
"#,
        );
        assert_eq!(
            render_iframe(&render).unwrap(),
            r#"<iframe src="a"></iframe><script src="b.js" async="true"></script>"#
        );
    }

    #[test]
    fn object_with_params_and_embed() {
        let render = tree(
            r#"
[object.attributes]
width = 400
data = "movie.swf"
[object.params]
movie = "movie.swf"
allowFullScreen = true
[object.embed]
src = "movie.swf"
allowfullscreen = true
width = 400
"#,
        );
        assert_eq!(
            render_object(&render).unwrap(),
            concat!(
                r#"<object width="400" data="movie.swf">"#,
                r#"<param name="movie" value="movie.swf"></param>"#,
                r#"<param name="allowFullScreen" value="true"></param>"#,
                r#"<embed src="movie.swf" allowfullscreen="true" width="400"></embed>"#,
                "</object>"
            )
        );
    }

    #[test]
    fn embed_renders_false_booleans() {
        let render = tree(
            r#"
[object.embed]
autoplay = false
"#,
        );
        assert_eq!(
            render_object(&render).unwrap(),
            r#"<object><embed autoplay="false"></embed></object>"#
        );
    }

    #[test]
    fn object_without_subsections() {
        let render = tree("[object]\n");
        assert_eq!(render_object(&render).unwrap(), "<object></object>");
    }

    #[test]
    fn absent_structures_render_none() {
        let render = tree("sizeRatio = 1.5\n");
        assert!(render_iframe(&render).is_none());
        assert!(render_object(&render).is_none());
        assert!(render_script(&render).is_none());
        assert!(render_html(&render).is_none());
    }

    #[test]
    fn html_prefers_iframe_over_object() {
        let render = tree(
            r#"
[iframe]
src = "frame"
[object.attributes]
data = "obj"
"#,
        );
        let html = render_html(&render).unwrap();
        assert!(html.starts_with("<iframe"));
        assert!(!html.contains("<object"));
    }

    #[test]
    fn html_falls_back_to_object() {
        let render = tree(
            r#"
[object.attributes]
data = "obj"
[script]
src = "s.js"
"#,
        );
        assert_eq!(
            render_html(&render).unwrap(),
            r#"<object data="obj"></object><script src="s.js"></script>"#
        );
    }

    #[test]
    fn float_values_use_shortest_form() {
        let mut render = tree("[iframe]\n");
        render
            .get_mut("iframe")
            .and_then(TemplateNode::as_map_mut)
            .unwrap()
            .insert("height".into(), TemplateNode::from(361.5));
        assert_eq!(
            render_iframe(&render).unwrap(),
            r#"<iframe height="361.5"></iframe>"#
        );
    }
}
