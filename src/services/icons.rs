//! Launcher icon generation.
//!
//! - Locate a source icon in a directory (raster preferred over vector)
//! - Render it into the five Android density buckets, two files per bucket
//! - Pick the renderer from an ordered list by availability, so a missing SVG
//!   capability degrades to the raster path instead of failing outright

use camino::{Utf8Path, Utf8PathBuf};
use image::imageops::FilterType;
use image::{ImageFormat, RgbaImage};
use std::fs;
use thiserror::Error;

use crate::models::icon::{RASTER_EXTENSIONS, VECTOR_EXTENSIONS};
use crate::models::{DensityBucket, IconFormat, IconSpec};

/// Errors that can occur while rendering one icon size
#[derive(Error, Debug)]
pub enum IconError {
    #[error("No renderer available for {0} icons")]
    NoRenderer(IconFormat),

    #[error("Failed to read icon {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode icon {path}: {source}")]
    Decode {
        path: Utf8PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to rasterize vector icon: {0}")]
    Rasterize(String),

    #[error("Failed to write icon {path}: {reason}")]
    Write { path: Utf8PathBuf, reason: String },
}

/// Find the first file in `directory` whose name contains "icon".
///
/// Matching is case-insensitive. Raster files win over vector files; within a
/// format, names are compared in lexicographic order.
pub fn locate_icon(directory: &Utf8Path) -> Option<Utf8PathBuf> {
    let entries = match directory.read_dir_utf8() {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Could not scan {} for an icon: {}", directory, e);
            return None;
        }
    };

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|entry| entry.file_name().to_string())
        .collect();
    names.sort();

    find_named(&names, &RASTER_EXTENSIONS)
        .or_else(|| find_named(&names, &VECTOR_EXTENSIONS))
        .map(|name| directory.join(name))
}

fn find_named<'a>(names: &'a [String], extensions: &[&str]) -> Option<&'a String> {
    names.iter().find(|name| {
        let lower = name.to_lowercase();
        lower.contains("icon")
            && Utf8Path::new(&lower)
                .extension()
                .is_some_and(|ext| extensions.contains(&ext))
    })
}

/// A way of turning a source image into a square RGBA bitmap
pub trait IconRenderer {
    /// Short name used in log messages
    fn name(&self) -> &'static str;

    /// Whether this capability can be used in the current build
    fn is_available(&self) -> bool;

    /// Whether this renderer accepts sources of `format`
    fn supports(&self, format: IconFormat) -> bool;

    /// Render `source` at exactly `size` x `size` pixels
    fn render(&self, source: &Utf8Path, size: u32) -> Result<RgbaImage, IconError>;
}

/// Decodes with the `image` crate and resamples with Lanczos3.
///
/// Also accepts vector sources as a last resort; decoding those usually fails,
/// which surfaces as a per-size warning.
#[derive(Debug, Clone, Default)]
pub struct RasterRenderer;

impl IconRenderer for RasterRenderer {
    fn name(&self) -> &'static str {
        "raster"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn supports(&self, _format: IconFormat) -> bool {
        true
    }

    fn render(&self, source: &Utf8Path, size: u32) -> Result<RgbaImage, IconError> {
        let img = image::open(source).map_err(|source_err| IconError::Decode {
            path: source.to_path_buf(),
            source: source_err,
        })?;
        Ok(img.resize_exact(size, size, FilterType::Lanczos3).to_rgba8())
    }
}

/// Rasterizes SVG directly at the target size with resvg
#[derive(Debug, Clone, Default)]
pub struct SvgRenderer;

impl IconRenderer for SvgRenderer {
    fn name(&self) -> &'static str {
        "svg"
    }

    fn is_available(&self) -> bool {
        cfg!(feature = "svg")
    }

    fn supports(&self, format: IconFormat) -> bool {
        format == IconFormat::Vector
    }

    #[cfg(feature = "svg")]
    fn render(&self, source: &Utf8Path, size: u32) -> Result<RgbaImage, IconError> {
        use resvg::{tiny_skia, usvg};

        let data = fs::read(source).map_err(|e| IconError::Read {
            path: source.to_path_buf(),
            source: e,
        })?;
        let tree = usvg::Tree::from_data(&data, &usvg::Options::default())
            .map_err(|e| IconError::Rasterize(e.to_string()))?;

        let mut pixmap = tiny_skia::Pixmap::new(size, size)
            .ok_or_else(|| IconError::Rasterize(format!("invalid target size {}", size)))?;
        let tree_size = tree.size();
        let transform = tiny_skia::Transform::from_scale(
            size as f32 / tree_size.width(),
            size as f32 / tree_size.height(),
        );
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        // tiny-skia stores premultiplied alpha; PNG output wants straight alpha
        let mut raw = Vec::with_capacity((size * size * 4) as usize);
        for pixel in pixmap.pixels() {
            let c = pixel.demultiply();
            raw.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }

        RgbaImage::from_raw(size, size, raw)
            .ok_or_else(|| IconError::Rasterize("pixel buffer size mismatch".to_string()))
    }

    #[cfg(not(feature = "svg"))]
    fn render(&self, _source: &Utf8Path, _size: u32) -> Result<RgbaImage, IconError> {
        Err(IconError::NoRenderer(IconFormat::Vector))
    }
}

/// A density bucket that could not be produced
#[derive(Debug)]
pub struct SizeFailure {
    pub bucket: DensityBucket,
    pub error: IconError,
}

/// Outcome of rendering one [`IconSpec`]
#[derive(Debug, Default)]
pub struct IconReport {
    /// Files written, two per completed bucket
    pub written: Vec<Utf8PathBuf>,
    pub completed: Vec<DensityBucket>,
    pub failures: Vec<SizeFailure>,
}

impl IconReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Renders icon sets through an ordered list of renderer capabilities
pub struct IconEngine {
    renderers: Vec<Box<dyn IconRenderer>>,
}

impl IconEngine {
    /// Engine with the default priority: direct SVG first, raster fallback second
    pub fn new() -> Self {
        Self::with_renderers(vec![Box::new(SvgRenderer), Box::new(RasterRenderer)])
    }

    pub fn with_renderers(renderers: Vec<Box<dyn IconRenderer>>) -> Self {
        Self { renderers }
    }

    /// First available renderer that accepts `format`
    pub fn select(&self, format: IconFormat) -> Option<&dyn IconRenderer> {
        self.renderers
            .iter()
            .map(|r| r.as_ref())
            .find(|r| r.is_available() && r.supports(format))
    }

    /// Render every target bucket of `spec` into `res_dir`.
    ///
    /// A failing bucket is recorded and skipped; the remaining buckets still run.
    pub fn render_icon_set(&self, spec: &IconSpec, res_dir: &Utf8Path) -> IconReport {
        let mut report = IconReport::default();

        let renderer = match self.select(spec.format) {
            Some(renderer) => renderer,
            None => {
                tracing::warn!("No renderer can handle {} icon {}", spec.format, spec.source);
                for bucket in &spec.targets {
                    report.failures.push(SizeFailure {
                        bucket: *bucket,
                        error: IconError::NoRenderer(spec.format),
                    });
                }
                return report;
            }
        };

        if spec.format == IconFormat::Vector && renderer.name() != "svg" {
            tracing::warn!(
                "SVG rasterizer unavailable, falling back to {} renderer (quality may suffer)",
                renderer.name()
            );
        }

        for bucket in &spec.targets {
            match Self::render_bucket(renderer, spec, bucket, res_dir) {
                Ok(paths) => {
                    for path in &paths {
                        tracing::info!("Generated icon: {}", path);
                    }
                    report.written.extend(paths);
                    report.completed.push(*bucket);
                }
                Err(error) => {
                    tracing::warn!("Failed to generate {} icon: {}", bucket, error);
                    report.failures.push(SizeFailure {
                        bucket: *bucket,
                        error,
                    });
                }
            }
        }

        report
    }

    fn render_bucket(
        renderer: &dyn IconRenderer,
        spec: &IconSpec,
        bucket: &DensityBucket,
        res_dir: &Utf8Path,
    ) -> Result<Vec<Utf8PathBuf>, IconError> {
        let image = renderer.render(&spec.source, bucket.size)?;

        let dir = res_dir.join(bucket.label);
        fs::create_dir_all(&dir).map_err(|e| IconError::Write {
            path: dir.clone(),
            reason: e.to_string(),
        })?;

        let paths = bucket.output_paths(res_dir);
        for path in &paths {
            image
                .save_with_format(path, ImageFormat::Png)
                .map_err(|e| IconError::Write {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
        }

        Ok(paths.to_vec())
    }
}

impl Default for IconEngine {
    fn default() -> Self {
        Self::new()
    }
}
