use crate::config::{NameCase, SortOrder, SpriteConfig, is_class_char};
use crate::error::{Result, SpriteError};
use crate::layout::ensure_unique_names;
use crate::model::{ImageDescriptor, InputImage};
use image::{DynamicImage, ImageReader};
use std::path::Path;
use tracing::{debug, instrument};

/// Turns a file stem into an image name.
///
/// Every character outside `[A-Za-z0-9_-]` becomes `_`; `NameCase::Lower`
/// additionally lowercases ASCII letters.
pub fn normalize_name(stem: &str, case: NameCase) -> Result<String> {
    let name: String = stem
        .chars()
        .map(|c| if is_class_char(c) { c } else { '_' })
        .map(|c| match case {
            NameCase::Preserve => c,
            NameCase::Lower => c.to_ascii_lowercase(),
        })
        .collect();
    if name.is_empty() {
        return Err(SpriteError::InvalidInput(format!(
            "'{}' yields an empty image name",
            stem
        )));
    }
    Ok(name)
}

/// Name for a file name or path: the stem (text before the last dot), normalized.
pub fn name_for_source(source: &str, case: NameCase) -> Result<String> {
    let file_name = source.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(source);
    let stem = match file_name.rfind('.') {
        Some(0) | None => file_name,
        Some(i) => &file_name[..i],
    };
    normalize_name(stem, case)
}

/// The path as given; the name comes from its last component, the full
/// path keeps collisions from different directories distinguishable.
fn source_label(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn describe(name: String, source: String, image: &DynamicImage) -> Result<ImageDescriptor> {
    let pixels = image.to_rgba8();
    let (width, height) = pixels.dimensions();
    if width == 0 || height == 0 {
        return Err(SpriteError::InvalidInput(format!(
            "'{}' has zero size ({}x{})",
            source, width, height
        )));
    }
    Ok(ImageDescriptor {
        name,
        source,
        width,
        height,
        pixels,
    })
}

/// Reads and decodes one file.
pub fn load_descriptor(path: &Path, cfg: &SpriteConfig) -> Result<ImageDescriptor> {
    let source = source_label(path);
    let name = name_for_source(&source, cfg.name_case)?;
    let reader = ImageReader::open(path)
        .map_err(|e| SpriteError::io(path, e))?
        .with_guessed_format()
        .map_err(|e| SpriteError::io(path, e))?;
    let image = reader.decode().map_err(|e| SpriteError::Decode {
        source_name: source.clone(),
        source: e,
    })?;
    let desc = describe(name, source, &image)?;
    debug!(name = %desc.name, w = desc.width, h = desc.height, "decoded");
    Ok(desc)
}

/// Loads every path; see [`load_descriptors_with`].
pub fn load_descriptors<P: AsRef<Path>>(
    paths: &[P],
    cfg: &SpriteConfig,
) -> Result<Vec<ImageDescriptor>> {
    load_descriptors_with(paths, cfg, |_| {})
}

#[instrument(skip_all, fields(count = paths.len()))]
/// Loads every path, calling `on_loaded` after each successful decode.
///
/// Names are checked for duplicates before anything is decoded. The first
/// failure aborts the whole load; no partial list is returned.
pub fn load_descriptors_with<P, F>(
    paths: &[P],
    cfg: &SpriteConfig,
    mut on_loaded: F,
) -> Result<Vec<ImageDescriptor>>
where
    P: AsRef<Path>,
    F: FnMut(&Path),
{
    let mut names = Vec::with_capacity(paths.len());
    for p in paths {
        let source = source_label(p.as_ref());
        let name = name_for_source(&source, cfg.name_case)?;
        names.push((name, source));
    }
    ensure_unique_names(names.iter().map(|(n, s)| (n.as_str(), s.as_str())))?;

    let mut out = Vec::with_capacity(paths.len());
    for p in paths {
        let p = p.as_ref();
        out.push(load_descriptor(p, cfg)?);
        on_loaded(p);
    }
    order_descriptors(&mut out, cfg.sort_order);
    Ok(out)
}

/// Builds descriptors from already-decoded images.
pub fn descriptors_from_images(
    inputs: Vec<InputImage>,
    cfg: &SpriteConfig,
) -> Result<Vec<ImageDescriptor>> {
    let mut out = Vec::with_capacity(inputs.len());
    for inp in inputs {
        let name = name_for_source(&inp.key, cfg.name_case)?;
        out.push(describe(name, inp.key, &inp.image)?);
    }
    order_descriptors(&mut out, cfg.sort_order);
    Ok(out)
}

/// Stable sort per `order`; ties fall back to name, then source.
pub fn order_descriptors(descriptors: &mut [ImageDescriptor], order: SortOrder) {
    let by_name = |a: &ImageDescriptor, b: &ImageDescriptor| {
        a.name.cmp(&b.name).then_with(|| a.source.cmp(&b.source))
    };
    match order {
        SortOrder::None => {}
        SortOrder::NameAsc => descriptors.sort_by(by_name),
        SortOrder::HeightDesc => {
            descriptors.sort_by(|a, b| b.height.cmp(&a.height).then_with(|| by_name(a, b)))
        }
        SortOrder::AreaDesc => {
            descriptors.sort_by(|a, b| b.area().cmp(&a.area()).then_with(|| by_name(a, b)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_non_identifier_characters() {
        let n = normalize_name("my icon.v2+", NameCase::Preserve).unwrap();
        assert_eq!(n, "my_icon_v2_");
    }

    #[test]
    fn case_policy() {
        assert_eq!(normalize_name("Home", NameCase::Preserve).unwrap(), "Home");
        assert_eq!(normalize_name("Home", NameCase::Lower).unwrap(), "home");
    }

    #[test]
    fn stem_drops_only_last_extension() {
        assert_eq!(
            name_for_source("dir/arrow.left.png", NameCase::Preserve).unwrap(),
            "arrow_left"
        );
        assert_eq!(name_for_source("plain", NameCase::Preserve).unwrap(), "plain");
        assert_eq!(name_for_source(".hidden", NameCase::Preserve).unwrap(), "_hidden");
    }

    #[test]
    fn empty_stem_is_rejected() {
        assert!(matches!(
            normalize_name("", NameCase::Preserve),
            Err(SpriteError::InvalidInput(_))
        ));
    }
}
