use css_sprite_core::prelude::*;
use css_sprite_core::{descriptors_from_images, emit_stylesheet, render_css, style_rules};
use image::{DynamicImage, RgbaImage};

fn layout_for(sizes: &[(&str, u32, u32)], cfg: &SpriteConfig) -> Layout {
    let inputs = sizes
        .iter()
        .map(|(k, w, h)| InputImage {
            key: (*k).into(),
            image: DynamicImage::ImageRgba8(RgbaImage::new(*w, *h)),
        })
        .collect();
    let descs = descriptors_from_images(inputs, cfg).unwrap();
    pack_layout(&descs, cfg).unwrap()
}

#[test]
fn rules_follow_placements() {
    let cfg = SpriteConfig::default();
    let layout = layout_for(&[("a.png", 10, 20), ("b.png", 5, 5)], &cfg);
    let rules = style_rules(&layout, &cfg.class_prefix).unwrap();
    assert_eq!(
        rules,
        vec![
            StyleRule {
                class_name: "cmp_a".into(),
                offset_x: 0,
                offset_y: 0,
                width: 10,
                height: 20,
            },
            StyleRule {
                class_name: "cmp_b".into(),
                offset_x: -10,
                offset_y: 0,
                width: 5,
                height: 5,
            },
        ]
    );
}

#[test]
fn css_text_has_one_block_per_rule() {
    let cfg = SpriteConfig::builder().class_prefix("icon-").build();
    let layout = layout_for(&[("a.png", 10, 20), ("b.png", 5, 5)], &cfg);
    let (rules, css) = emit_stylesheet(&layout, &cfg, "img/sprites.png").unwrap();
    assert_eq!(rules.len(), 2);

    let expected = "\
.icon-a {
  background-image: url(\"img/sprites.png\");
  background-repeat: no-repeat;
  background-position: 0 0;
  width: 10px;
  height: 20px;
}
.icon-b {
  background-image: url(\"img/sprites.png\");
  background-repeat: no-repeat;
  background-position: -10px 0;
  width: 5px;
  height: 5px;
}
";
    assert_eq!(css, expected);
}

#[test]
fn shelf_rows_produce_vertical_offsets() {
    let cfg = SpriteConfig::builder()
        .layout(LayoutStrategy::Shelf)
        .max_row_width(10)
        .build();
    let layout = layout_for(&[("a.png", 10, 20), ("b.png", 5, 5)], &cfg);
    let rules = style_rules(&layout, "s_").unwrap();
    assert_eq!((rules[1].offset_x, rules[1].offset_y), (0, -20));
    let css = render_css(&rules, "x.png");
    assert!(css.contains("background-position: 0 -20px;"));
}

#[test]
fn repeated_class_name_is_a_conflict() {
    let frame = Rect::new(0, 0, 1, 1);
    let layout = Layout {
        placements: vec![
            PlacedRect { index: 0, name: "dup".into(), frame },
            PlacedRect { index: 1, name: "dup".into(), frame: Rect::new(1, 0, 1, 1) },
        ],
        width: 2,
        height: 1,
    };
    match style_rules(&layout, "cmp_") {
        Err(SpriteError::ClassNameConflict { class_name }) => assert_eq!(class_name, "cmp_dup"),
        other => panic!("expected ClassNameConflict, got {:?}", other),
    }
}

#[test]
fn empty_layout_emits_empty_stylesheet() {
    let (rules, css) = emit_stylesheet(&Layout::default(), &SpriteConfig::default(), "a.png").unwrap();
    assert!(rules.is_empty());
    assert!(css.is_empty());
}

#[test]
fn class_names_are_unique_and_traceable() {
    let cfg = SpriteConfig::default();
    let layout = layout_for(
        &[("home icon.png", 3, 3), ("home-icon.png", 3, 3), ("HOME.png", 2, 2)],
        &cfg,
    );
    let rules = style_rules(&layout, &cfg.class_prefix).unwrap();
    let names: Vec<_> = rules.iter().map(|r| r.class_name.as_str()).collect();
    assert_eq!(names, ["cmp_HOME", "cmp_home-icon", "cmp_home_icon"]);
}
