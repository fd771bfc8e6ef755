//! Rendering template files to disk.
//!
//! Every path is supplied by the caller; nothing here decides where
//! templates live or where output goes.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::scheme::Palette;
use crate::template::{self, Values};

/// Templates shipped with the crate, by output file name.
pub const BUILTIN_TEMPLATES: [(&str, &str); 2] = [
    (
        "colors-wal-dwl.h",
        include_str!("../templates/colors-wal-dwl.h"),
    ),
    (
        "colors-wal-dwm.h",
        include_str!("../templates/colors-wal-dwm.h"),
    ),
];

/// Look up a bundled template by file name.
pub fn builtin(name: &str) -> Option<&'static str> {
    BUILTIN_TEMPLATES
        .iter()
        .find(|(file, _)| *file == name)
        .map(|(_, text)| *text)
}

/// Resolve an export kind (`dwl`, `dwm`) or a bundled file name to
/// `(file name, template text)`.
pub fn builtin_for(kind: &str) -> Option<(&'static str, &'static str)> {
    let file = match kind {
        "dwl" => "colors-wal-dwl.h",
        "dwm" => "colors-wal-dwm.h",
        other => other,
    };
    BUILTIN_TEMPLATES.iter().find(|(f, _)| *f == file).copied()
}

/// Settings for [`export_dir`].
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// File names to skip. A leading `*` matches by suffix.
    pub ignore: Vec<String>,
    /// Also write the palette as a 16x1 `colors.png` swatch.
    pub palette_image: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            ignore: vec![".DS_Store".to_owned(), "*.swp".to_owned()],
            palette_image: false,
        }
    }
}

impl ExportOptions {
    fn is_ignored(&self, file_name: &str) -> bool {
        self.ignore.iter().any(|pattern| match pattern.strip_prefix('*') {
            Some(suffix) => file_name.ends_with(suffix),
            None => file_name == pattern,
        })
    }
}

/// Outcome of a batch export. Failed templates do not stop the batch.
#[derive(Debug, Default)]
pub struct ExportReport {
    pub written: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, anyhow::Error)>,
}

impl ExportReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Read and render one template file.
pub fn render_file<V: Values + ?Sized>(values: &V, template_path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(template_path)
        .with_context(|| format!("failed to read template {}", template_path.display()))?;
    render_text(values, &text)
        .with_context(|| format!("syntax error in template {}", template_path.display()))
}

/// Render one template file and write the result to `output_path`.
///
/// Nothing is written if rendering fails.
pub fn export_file<V: Values + ?Sized>(
    values: &V,
    template_path: &Path,
    output_path: &Path,
) -> Result<()> {
    let content = render_file(values, template_path)?;
    write_output(output_path, &content)
}

/// Render the bundled template for `kind` into `output_dir`.
pub fn export_builtin<V: Values + ?Sized>(
    values: &V,
    kind: &str,
    output_dir: &Path,
) -> Result<PathBuf> {
    let (file, text) =
        builtin_for(kind).with_context(|| format!("no bundled template for '{kind}'"))?;
    let content =
        render_text(values, text).with_context(|| format!("failed to render {file}"))?;
    let path = output_dir.join(file);
    write_output(&path, &content)?;
    log::info!("Exported {kind}.");
    Ok(path)
}

/// Render every bundled template into `output_dir`.
pub fn export_builtins<V: Values + ?Sized>(values: &V, output_dir: &Path) -> Result<Vec<PathBuf>> {
    BUILTIN_TEMPLATES
        .iter()
        .map(|(file, _)| export_builtin(values, file, output_dir))
        .collect()
}

/// Render every file under `template_dir` to the same relative path under
/// `output_dir`.
pub fn export_dir(
    palette: &Palette,
    template_dir: &Path,
    output_dir: &Path,
    options: &ExportOptions,
) -> Result<ExportReport> {
    log::info!("Reading templates from: {}", template_dir.display());

    let mut report = ExportReport::default();
    for entry in WalkDir::new(template_dir).sort_by_file_name() {
        let entry = entry
            .with_context(|| format!("failed to walk {}", template_dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if options.is_ignored(&name) {
            log::debug!("skipping {}", entry.path().display());
            continue;
        }

        let relative = entry.path().strip_prefix(template_dir)?;
        let output = output_dir.join(relative);
        match export_file(palette, entry.path(), &output) {
            Ok(()) => report.written.push(output),
            Err(err) => {
                log::error!("{err:#}");
                report.failed.push((entry.path().to_path_buf(), err));
            }
        }
    }

    if options.palette_image {
        let path = output_dir.join("colors.png");
        match write_palette_image(palette, &path) {
            Ok(()) => report.written.push(path),
            Err(err) => {
                log::error!("{err:#}");
                report.failed.push((path, err));
            }
        }
    }

    log::info!(
        "Exported {} files to {}",
        report.written.len(),
        output_dir.display()
    );
    Ok(report)
}

/// Save the 16 palette slots as a 16x1 image, one pixel per slot.
pub fn write_palette_image(palette: &Palette, path: &Path) -> Result<()> {
    let colors = palette
        .to_colors()
        .context("palette image needs hex color values")?;
    let img = image::RgbImage::from_fn(colors.len() as u32, 1, |x, _| {
        image::Rgb(colors[x as usize].channels())
    });
    create_parent(path)?;
    img.save(path)
        .with_context(|| format!("failed to write palette image to {}", path.display()))?;
    Ok(())
}

fn render_text<V: Values + ?Sized>(values: &V, text: &str) -> Result<String> {
    Ok(template::render_str(text, values)?)
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    create_parent(path)?;
    std::fs::write(path, content)
        .with_context(|| format!("failed to write {}", path.display()))?;
    log::debug!("wrote {}", path.display());
    Ok(())
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    Ok(())
}
