use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser};
use css_sprite_core::config::{LayoutStrategy, NameCase, SortOrder};
use css_sprite_core::{
    SpriteConfig, SpriteSheet, build_sprite_sheet, load_descriptors_with, to_json_manifest,
    write_sprite_sheet_with,
};
use globset::{Glob, GlobSet, GlobSetBuilder};
use handlebars::Handlebars;
use serde::{Deserialize, Serialize};
use tracing::info;
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    name = "css-sprite",
    about = "Concatenate a directory of images into one sprite image and a CSS file",
    version,
    author
)]
struct Cli {
    /// Directory of source images
    #[arg(help_heading = "Input/Output")]
    image_dir: PathBuf,
    /// Output path of the combined image (format from the extension)
    #[arg(help_heading = "Input/Output")]
    out_img: PathBuf,
    /// Output path of the stylesheet
    #[arg(help_heading = "Input/Output")]
    out_css: PathBuf,
    /// YAML config file path (values override the flags below)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Include patterns (glob). If set, only files matching any pattern are considered
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob). Files matching any pattern will be ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,
    /// Descend into subdirectories
    #[arg(long, default_value_t = false, help_heading = "Input/Output")]
    recursive: bool,

    // Layout
    /// Layout: strip | shelf
    #[arg(long, value_parser = ["strip", "shelf"], default_value = "strip", help_heading = "Layout")]
    layout: String,
    /// Row width at which shelf layouts wrap
    #[arg(long, default_value_t = 1024, help_heading = "Layout")]
    max_row_width: u32,
    /// Sort order: name_asc|height_desc|area_desc|none
    #[arg(long, default_value = "name_asc", help_heading = "Layout")]
    sort_order: String,
    /// Largest canvas side allowed
    #[arg(long, default_value_t = 16384, help_heading = "Layout")]
    max_dimension: u32,

    // Stylesheet
    /// Class name prefix
    #[arg(long, default_value = "cmp_", help_heading = "Stylesheet")]
    prefix: String,
    /// Name case policy: preserve | lower
    #[arg(long, default_value = "preserve", help_heading = "Stylesheet")]
    name_case: String,
    /// URL of the sprite image inside the CSS (defaults to OUT_IMG as given)
    #[arg(long, help_heading = "Stylesheet")]
    image_url: Option<String>,
    /// Handlebars template used instead of the built-in CSS rendering
    #[arg(long, help_heading = "Stylesheet")]
    template: Option<PathBuf>,

    // Image
    /// Background for formats without alpha, as RRGGBB hex
    #[arg(long, default_value = "ffffff", help_heading = "Image")]
    background: String,
    /// Draw red outlines around every image (debug)
    #[arg(long, default_value_t = false, help_heading = "Image")]
    outlines: bool,
    /// Compose the image and the CSS concurrently (requires core feature `parallel`)
    #[arg(long, default_value_t = false, help_heading = "Image")]
    parallel: bool,

    // Export
    /// Also write a JSON manifest of the layout to this file
    #[arg(long, help_heading = "Export")]
    export_json: Option<PathBuf>,
    /// Export layout stats (JSON) to this file
    #[arg(long, help_heading = "Export")]
    export_stats: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: compute layout and stats but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,

    /// Show a progress bar while decoding (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(short, long, default_value_t = false, help_heading = "Logging/UX")]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    run(&cli, cli.progress && !cli.quiet)
}

fn run(cli: &Cli, show_progress: bool) -> anyhow::Result<()> {
    let mut cfg = config_from_flags(cli)?;
    if let Some(path) = &cli.config {
        let file = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)
            .with_context(|| format!("parse config {}", path.display()))?;
        cfg = y.into_sprite_config(cfg)?;
    }
    cfg.validate()?;

    if cli.print_config {
        match cli.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(());
    }

    let paths = gather_paths(&cli.image_dir, &cli.include, &cli.exclude, cli.recursive)?;
    info!(count = paths.len(), dir = ?cli.image_dir, "found images");
    let descriptors = load_with_progress(&paths, &cfg, show_progress)?;

    let image_url = cli
        .image_url
        .clone()
        .unwrap_or_else(|| cli.out_img.to_string_lossy().replace('\\', "/"));
    let sheet = build_sprite_sheet(&descriptors, &cfg, &image_url).context("build sprite sheet")?;

    let stats = sheet.stats();
    info!(
        images = stats.num_images,
        width = stats.width,
        height = stats.height,
        occupancy = format!("{:.2}%", stats.occupancy * 100.0),
        "stats"
    );

    let rendered = match &cli.template {
        Some(path) => Some(render_template(path, &sheet, &image_url)?),
        None => None,
    };

    if cli.dry_run {
        println!("{}", stats.summary());
        return Ok(());
    }

    let manifest = match &cli.export_json {
        Some(_) => {
            let value = to_json_manifest(&sheet.layout, &sheet.rules, &image_url);
            Some(serde_json::to_string_pretty(&value)?)
        }
        None => None,
    };
    let stats_json = match &cli.export_stats {
        Some(_) => Some(serde_json::to_string_pretty(&stats)?),
        None => None,
    };
    let mut extra: Vec<(&Path, &[u8])> = Vec::new();
    if let (Some(path), Some(text)) = (&cli.export_json, &manifest) {
        extra.push((path.as_path(), text.as_bytes()));
    }
    if let (Some(path), Some(text)) = (&cli.export_stats, &stats_json) {
        extra.push((path.as_path(), text.as_bytes()));
    }

    let written = write_sprite_sheet_with(
        &sheet,
        &cli.out_img,
        &cli.out_css,
        rendered.as_deref(),
        &extra,
        &cfg,
    )
    .context("write outputs")?;
    info!(
        image = ?cli.out_img,
        css = ?cli.out_css,
        rules = sheet.rules.len(),
        files = written.len(),
        "sprite sheet written"
    );
    Ok(())
}

fn config_from_flags(cli: &Cli) -> anyhow::Result<SpriteConfig> {
    Ok(SpriteConfig {
        layout: parse_layout(&cli.layout)?,
        max_row_width: cli.max_row_width,
        sort_order: parse_sort_order(&cli.sort_order)?,
        class_prefix: cli.prefix.clone(),
        name_case: parse_name_case(&cli.name_case)?,
        max_dimension: cli.max_dimension,
        background: parse_hex_rgb(&cli.background)?,
        outlines: cli.outlines,
        parallel: cli.parallel,
    })
}

fn gather_paths(
    dir: &Path,
    include: &[String],
    exclude: &[String],
    recursive: bool,
) -> anyhow::Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("image directory {} does not exist or is not a directory", dir.display());
    }
    let inc_set = build_globset(include)?;
    let exc_set = build_globset(exclude)?;
    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut list: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(dir)
        .follow_links(true)
        .min_depth(1)
        .max_depth(max_depth)
    {
        let entry = entry.with_context(|| format!("list {}", dir.display()))?;
        let p = entry.path();
        if entry.file_type().is_file()
            && !should_skip(p, inc_set.as_ref(), exc_set.as_ref())
            && is_image(p)
        {
            list.push(p.to_path_buf());
        }
    }
    list.sort();
    Ok(list)
}

fn build_globset(patterns: &[String]) -> anyhow::Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut b = GlobSetBuilder::new();
    for pat in patterns {
        b.add(Glob::new(pat).with_context(|| format!("bad glob {}", pat))?);
    }
    Ok(Some(b.build()?))
}

fn should_skip(p: &Path, include: Option<&GlobSet>, exclude: Option<&GlobSet>) -> bool {
    let s = p.to_string_lossy().replace('\\', "/");
    if let Some(ex) = exclude {
        if ex.is_match(&s) {
            return true;
        }
    }
    if let Some(inc) = include {
        if !inc.is_match(&s) {
            return true;
        }
    }
    false
}

fn is_image(p: &Path) -> bool {
    matches!(
        p.extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase()),
        Some(ext) if matches!(
            ext.as_str(),
            "png" | "jpg" | "jpeg" | "gif" | "bmp" | "tga" | "tif" | "tiff" | "webp"
        )
    )
}

fn load_with_progress(
    paths: &[PathBuf],
    cfg: &SpriteConfig,
    progress: bool,
) -> anyhow::Result<Vec<css_sprite_core::ImageDescriptor>> {
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = if progress {
        let b = ProgressBar::new(paths.len() as u64);
        b.set_style(ProgressStyle::with_template(
            "{spinner:.green} decoding {pos}/{len} [{elapsed_precise}] {wide_msg}",
        )?);
        Some(b)
    } else {
        None
    };
    let result = load_descriptors_with(paths, cfg, |p| {
        if let Some(b) = &bar {
            let msg = p.file_name().and_then(|s| s.to_str()).unwrap_or("");
            b.set_message(msg.to_string());
            b.inc(1);
        }
    });
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(result?)
}

fn parse_layout(s: &str) -> anyhow::Result<LayoutStrategy> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown layout: {}", s))
}

fn parse_sort_order(s: &str) -> anyhow::Result<SortOrder> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown sort order: {}", s))
}

fn parse_name_case(s: &str) -> anyhow::Result<NameCase> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown name case: {}", s))
}

fn parse_hex_rgb(s: &str) -> anyhow::Result<[u8; 3]> {
    let hex = s.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        anyhow::bail!("background must be RRGGBB hex, got {}", s);
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .with_context(|| format!("background must be RRGGBB hex, got {}", s))
    };
    Ok([channel(0)?, channel(2)?, channel(4)?])
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[derive(Serialize)]
struct TemplateRule {
    name: String,
    class_name: String,
    x: u32,
    y: u32,
    offset_x: i64,
    offset_y: i64,
    width: u32,
    height: u32,
}

#[derive(Serialize)]
struct TemplateContext {
    image: String,
    width: u32,
    height: u32,
    rules: Vec<TemplateRule>,
}

fn build_template_context(sheet: &SpriteSheet, image_url: &str) -> TemplateContext {
    let rules = sheet
        .layout
        .placements
        .iter()
        .zip(&sheet.rules)
        .map(|(p, r)| TemplateRule {
            name: p.name.clone(),
            class_name: r.class_name.clone(),
            x: p.frame.x,
            y: p.frame.y,
            offset_x: r.offset_x,
            offset_y: r.offset_y,
            width: r.width,
            height: r.height,
        })
        .collect();
    TemplateContext {
        image: image_url.to_string(),
        width: sheet.layout.width,
        height: sheet.layout.height,
        rules,
    }
}

fn render_template(path: &Path, sheet: &SpriteSheet, image_url: &str) -> anyhow::Result<String> {
    let tpl = fs::read_to_string(path)
        .with_context(|| format!("read template {}", path.display()))?;
    let ctx = build_template_context(sheet, image_url);
    let mut reg = Handlebars::new();
    reg.set_strict_mode(true);
    reg.register_escape_fn(handlebars::no_escape);
    reg.register_template_string("tpl", tpl)?;
    Ok(reg.render("tpl", &ctx)?)
}

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    layout: Option<String>,
    max_row_width: Option<u32>,
    sort_order: Option<String>,
    class_prefix: Option<String>,
    name_case: Option<String>,
    max_dimension: Option<u32>,
    background: Option<String>,
    outlines: Option<bool>,
    parallel: Option<bool>,
}

impl YamlConfig {
    fn into_sprite_config(self, mut cfg: SpriteConfig) -> anyhow::Result<SpriteConfig> {
        if let Some(v) = self.layout {
            cfg.layout = parse_layout(&v)?;
        }
        if let Some(v) = self.max_row_width {
            cfg.max_row_width = v;
        }
        if let Some(v) = self.sort_order {
            cfg.sort_order = parse_sort_order(&v)?;
        }
        if let Some(v) = self.class_prefix {
            cfg.class_prefix = v;
        }
        if let Some(v) = self.name_case {
            cfg.name_case = parse_name_case(&v)?;
        }
        if let Some(v) = self.max_dimension {
            cfg.max_dimension = v;
        }
        if let Some(v) = self.background {
            cfg.background = parse_hex_rgb(&v)?;
        }
        if let Some(v) = self.outlines {
            cfg.outlines = v;
        }
        if let Some(v) = self.parallel {
            cfg.parallel = v;
        }
        Ok(cfg)
    }
}
