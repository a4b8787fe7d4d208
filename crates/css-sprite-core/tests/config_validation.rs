use css_sprite_core::prelude::*;

#[test]
fn default_config_is_valid() {
    assert!(SpriteConfig::default().validate().is_ok());
}

#[test]
fn prefix_must_start_a_css_identifier() {
    for bad in ["", "1abc", "-x", "a b", "a.b"] {
        let cfg = SpriteConfig::builder().class_prefix(bad).build();
        match cfg.validate() {
            Err(SpriteError::InvalidConfig(msg)) => assert!(msg.contains("class_prefix")),
            other => panic!("prefix {:?} should be rejected, got {:?}", bad, other),
        }
    }
    for good in ["cmp_", "_", "Icon-", "s"] {
        let cfg = SpriteConfig::builder().class_prefix(good).build();
        assert!(cfg.validate().is_ok(), "prefix {:?}", good);
    }
}

#[test]
fn zero_max_dimension_is_invalid() {
    let cfg = SpriteConfig::builder().max_dimension(0).build();
    assert!(matches!(cfg.validate(), Err(SpriteError::InvalidConfig(_))));
}

#[test]
fn row_width_only_matters_for_shelf() {
    let strip = SpriteConfig::builder().max_row_width(0).build();
    assert!(strip.validate().is_ok());
    let shelf = SpriteConfig::builder()
        .layout(LayoutStrategy::Shelf)
        .max_row_width(0)
        .build();
    assert!(shelf.validate().is_err());
}

#[test]
fn config_round_trips_through_json() {
    let cfg = SpriteConfig::builder()
        .layout(LayoutStrategy::Shelf)
        .name_case(NameCase::Lower)
        .background([1, 2, 3])
        .build();
    let s = serde_json::to_string(&cfg).unwrap();
    assert!(s.contains(r#""layout":"shelf""#));
    assert!(s.contains(r#""name_case":"lower""#));
    let back: SpriteConfig = serde_json::from_str(&s).unwrap();
    assert_eq!(back.layout, LayoutStrategy::Shelf);
    assert_eq!(back.background, [1, 2, 3]);
}
