use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Layout strategies.
///   - `Strip` lays every image in a single row (the classic behaviour)
///   - `Shelf` wraps rows at `max_row_width` and stacks them vertically
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LayoutStrategy {
    /// Single horizontal row; width grows with the input set.
    Strip,
    /// Rows wrapped at `max_row_width`, each as tall as its tallest image.
    Shelf,
}

impl FromStr for LayoutStrategy {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strip" | "row" => Ok(Self::Strip),
            "shelf" => Ok(Self::Shelf),
            _ => Err(()),
        }
    }
}

/// Sorting orders applied by the loader. Ties always fall back to the name.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    NameAsc,
    HeightDesc,
    AreaDesc,
    /// Keep the order the sources were given in.
    None,
}

impl FromStr for SortOrder {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "name_asc" => Ok(Self::NameAsc),
            "height_desc" => Ok(Self::HeightDesc),
            "area_desc" => Ok(Self::AreaDesc),
            "none" => Ok(Self::None),
            _ => Err(()),
        }
    }
}

/// Case policy for image names.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NameCase {
    /// Case-sensitive: `Icon` and `icon` are different names.
    Preserve,
    /// ASCII-lowercase every name, so `Icon` and `icon` collide.
    Lower,
}

impl FromStr for NameCase {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "preserve" => Ok(Self::Preserve),
            "lower" => Ok(Self::Lower),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpriteConfig {
    #[serde(default = "default_layout")]
    pub layout: LayoutStrategy,
    /// Row wrap width for `Shelf` layouts. Ignored by `Strip`.
    #[serde(default = "default_max_row_width")]
    pub max_row_width: u32,
    #[serde(default = "default_sort_order")]
    pub sort_order: SortOrder,

    /// Prepended to every image name to form its CSS class.
    #[serde(default = "default_class_prefix")]
    pub class_prefix: String,
    #[serde(default = "default_name_case")]
    pub name_case: NameCase,

    /// Largest canvas side the compositor will allocate.
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,
    /// RGB fill used when the output format has no alpha channel.
    #[serde(default = "default_background")]
    pub background: [u8; 3],
    /// Draw red outlines around every placement (debug).
    #[serde(default)]
    pub outlines: bool,

    /// Compose the image and emit the stylesheet concurrently when feature "parallel" is on.
    #[serde(default)]
    pub parallel: bool,
}

impl Default for SpriteConfig {
    fn default() -> Self {
        Self {
            layout: default_layout(),
            max_row_width: default_max_row_width(),
            sort_order: default_sort_order(),
            class_prefix: default_class_prefix(),
            name_case: default_name_case(),
            max_dimension: default_max_dimension(),
            background: default_background(),
            outlines: false,
            parallel: false,
        }
    }
}

impl SpriteConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if:
    /// - `max_dimension` or `max_row_width` is zero
    /// - `class_prefix` cannot start a CSS class name
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::SpriteError;

        if self.max_dimension == 0 {
            return Err(SpriteError::InvalidConfig(
                "max_dimension must be greater than zero".into(),
            ));
        }
        if matches!(self.layout, LayoutStrategy::Shelf) && self.max_row_width == 0 {
            return Err(SpriteError::InvalidConfig(
                "max_row_width must be greater than zero for shelf layouts".into(),
            ));
        }

        let mut chars = self.class_prefix.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => {
                return Err(SpriteError::InvalidConfig(format!(
                    "class_prefix '{}' must start with an ASCII letter or '_'",
                    self.class_prefix
                )));
            }
        }
        if !chars.all(is_class_char) {
            return Err(SpriteError::InvalidConfig(format!(
                "class_prefix '{}' may only contain [A-Za-z0-9_-]",
                self.class_prefix
            )));
        }

        Ok(())
    }
}

/// Characters kept verbatim in names and class prefixes.
pub(crate) fn is_class_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn default_layout() -> LayoutStrategy {
    LayoutStrategy::Strip
}
fn default_max_row_width() -> u32 {
    1024
}
fn default_sort_order() -> SortOrder {
    SortOrder::NameAsc
}
fn default_class_prefix() -> String {
    "cmp_".into()
}
fn default_name_case() -> NameCase {
    NameCase::Preserve
}
fn default_max_dimension() -> u32 {
    16384
}
fn default_background() -> [u8; 3] {
    [255, 255, 255]
}

/// Builder for `SpriteConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct SpriteConfigBuilder {
    cfg: SpriteConfig,
}

impl SpriteConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: SpriteConfig::default(),
        }
    }
    pub fn layout(mut self, v: LayoutStrategy) -> Self {
        self.cfg.layout = v;
        self
    }
    pub fn max_row_width(mut self, v: u32) -> Self {
        self.cfg.max_row_width = v;
        self
    }
    pub fn sort_order(mut self, v: SortOrder) -> Self {
        self.cfg.sort_order = v;
        self
    }
    pub fn class_prefix(mut self, v: impl Into<String>) -> Self {
        self.cfg.class_prefix = v.into();
        self
    }
    pub fn name_case(mut self, v: NameCase) -> Self {
        self.cfg.name_case = v;
        self
    }
    pub fn max_dimension(mut self, v: u32) -> Self {
        self.cfg.max_dimension = v;
        self
    }
    pub fn background(mut self, v: [u8; 3]) -> Self {
        self.cfg.background = v;
        self
    }
    pub fn outlines(mut self, v: bool) -> Self {
        self.cfg.outlines = v;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }
    pub fn build(self) -> SpriteConfig {
        self.cfg
    }
}

impl SpriteConfig {
    /// Create a fluent builder for `SpriteConfig`.
    pub fn builder() -> SpriteConfigBuilder {
        SpriteConfigBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_enum_names_case_insensitively() {
        assert_eq!("Shelf".parse(), Ok(LayoutStrategy::Shelf));
        assert_eq!("strip".parse(), Ok(LayoutStrategy::Strip));
        assert_eq!("HEIGHT_DESC".parse(), Ok(SortOrder::HeightDesc));
        assert_eq!("lower".parse(), Ok(NameCase::Lower));
        assert!("diagonal".parse::<LayoutStrategy>().is_err());
    }

    #[test]
    fn yaml_style_partial_config_uses_defaults() {
        let cfg: SpriteConfig = serde_json::from_str(r#"{"layout":"shelf"}"#).unwrap();
        assert_eq!(cfg.layout, LayoutStrategy::Shelf);
        assert_eq!(cfg.class_prefix, "cmp_");
        assert_eq!(cfg.max_row_width, 1024);
    }
}
