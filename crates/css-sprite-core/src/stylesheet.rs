//! CSS output: one class per placement, showing its window of the sheet.

use crate::config::SpriteConfig;
use crate::error::{Result, SpriteError};
use crate::model::{Layout, StyleRule};
use std::collections::HashSet;
use std::fmt::Write as _;
use tracing::{debug, instrument};

/// One rule per placement, in placement order.
///
/// Class names are `prefix + name`. A repeated class name is reported as
/// `ClassNameConflict`; upstream name checks normally rule this out.
pub fn style_rules(layout: &Layout, prefix: &str) -> Result<Vec<StyleRule>> {
    let mut seen = HashSet::with_capacity(layout.placements.len());
    let mut rules = Vec::with_capacity(layout.placements.len());
    for p in &layout.placements {
        let class_name = format!("{}{}", prefix, p.name);
        if !seen.insert(class_name.clone()) {
            return Err(SpriteError::ClassNameConflict { class_name });
        }
        rules.push(StyleRule {
            class_name,
            offset_x: -(p.frame.x as i64),
            offset_y: -(p.frame.y as i64),
            width: p.frame.w,
            height: p.frame.h,
        });
    }
    Ok(rules)
}

fn px(v: i64) -> String {
    if v == 0 { "0".into() } else { format!("{}px", v) }
}

/// Quote a URL for `url("...")`.
fn css_url(url: &str) -> String {
    let mut s = String::with_capacity(url.len() + 2);
    s.push('"');
    for c in url.chars() {
        match c {
            '"' => s.push_str("\\\""),
            '\\' => s.push_str("\\\\"),
            '\n' => s.push_str("\\a "),
            '\r' => s.push_str("\\d "),
            c => s.push(c),
        }
    }
    s.push('"');
    s
}

/// Render rules as CSS text referencing `image_url` as the background.
pub fn render_css(rules: &[StyleRule], image_url: &str) -> String {
    let url = css_url(image_url);
    let mut s = String::new();
    for r in rules {
        // writing to a String cannot fail
        let _ = write!(
            s,
            ".{} {{\n  background-image: url({});\n  background-repeat: no-repeat;\n  background-position: {} {};\n  width: {}px;\n  height: {}px;\n}}\n",
            r.class_name,
            url,
            px(r.offset_x),
            px(r.offset_y),
            r.width,
            r.height,
        );
    }
    s
}

#[instrument(skip_all, fields(rules = layout.placements.len()))]
/// Rules plus their rendered CSS for `layout`.
pub fn emit_stylesheet(
    layout: &Layout,
    cfg: &SpriteConfig,
    image_url: &str,
) -> Result<(Vec<StyleRule>, String)> {
    let rules = style_rules(layout, &cfg.class_prefix)?;
    for r in &rules {
        debug!(class = %r.class_name, x = r.offset_x, y = r.offset_y, "rule");
    }
    let css = render_css(&rules, image_url);
    Ok((rules, css))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_offsets_have_no_unit() {
        assert_eq!(px(0), "0");
        assert_eq!(px(-10), "-10px");
    }

    #[test]
    fn url_quotes_are_escaped() {
        assert_eq!(css_url(r#"a"b\c.png"#), r#""a\"b\\c.png""#);
    }
}
