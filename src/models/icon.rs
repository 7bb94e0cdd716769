use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;

/// File extensions decoded by the raster imaging path
pub const RASTER_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

/// File extensions handled by the vector rasterizer
pub const VECTOR_EXTENSIONS: [&str; 1] = ["svg"];

/// Standard launcher icon file name written into each density directory
pub const LAUNCHER_ICON: &str = "ic_launcher.png";

/// Round launcher icon file name written into each density directory
pub const LAUNCHER_ICON_ROUND: &str = "ic_launcher_round.png";

/// Source image format, as classified from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconFormat {
    Raster,
    Vector,
}

impl IconFormat {
    /// Classify a path by its extension (case-insensitive).
    ///
    /// Unknown extensions are treated as raster and left for the decoder to reject.
    pub fn from_path(path: &Utf8Path) -> Self {
        match path.extension().map(str::to_ascii_lowercase) {
            Some(ext) if VECTOR_EXTENSIONS.contains(&ext.as_str()) => IconFormat::Vector,
            _ => IconFormat::Raster,
        }
    }
}

impl fmt::Display for IconFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IconFormat::Raster => write!(f, "raster"),
            IconFormat::Vector => write!(f, "vector"),
        }
    }
}

/// One Android launcher icon resolution tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DensityBucket {
    pub label: &'static str,
    pub size: u32,
}

/// The five launcher icon tiers, smallest first
pub const DENSITY_BUCKETS: [DensityBucket; 5] = [
    DensityBucket { label: "mipmap-mdpi", size: 48 },
    DensityBucket { label: "mipmap-hdpi", size: 72 },
    DensityBucket { label: "mipmap-xhdpi", size: 96 },
    DensityBucket { label: "mipmap-xxhdpi", size: 144 },
    DensityBucket { label: "mipmap-xxxhdpi", size: 192 },
];

impl DensityBucket {
    /// Output paths (standard, round) under the given resource root
    pub fn output_paths(&self, res_dir: &Utf8Path) -> [Utf8PathBuf; 2] {
        let dir = res_dir.join(self.label);
        [dir.join(LAUNCHER_ICON), dir.join(LAUNCHER_ICON_ROUND)]
    }
}

impl fmt::Display for DensityBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}x{})", self.label, self.size, self.size)
    }
}

/// A source icon and the tiers it must be rendered into.
///
/// Derived fresh from a file-system scan on every run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconSpec {
    pub source: Utf8PathBuf,
    pub format: IconFormat,
    pub targets: Vec<DensityBucket>,
}

impl IconSpec {
    pub fn new(source: impl Into<Utf8PathBuf>) -> Self {
        let source = source.into();
        let format = IconFormat::from_path(&source);
        Self {
            source,
            format,
            targets: DENSITY_BUCKETS.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(IconFormat::from_path(Utf8Path::new("a/icon.SVG")), IconFormat::Vector);
        assert_eq!(IconFormat::from_path(Utf8Path::new("icon.png")), IconFormat::Raster);
        assert_eq!(IconFormat::from_path(Utf8Path::new("icon")), IconFormat::Raster);
    }

    #[test]
    fn test_spec_targets_all_buckets() {
        let spec = IconSpec::new("logo-icon.png");
        let sizes: Vec<u32> = spec.targets.iter().map(|b| b.size).collect();
        assert_eq!(sizes, vec![48, 72, 96, 144, 192]);
    }

    #[test]
    fn test_bucket_output_paths() {
        let [standard, round] = DENSITY_BUCKETS[0].output_paths(Utf8Path::new("res"));
        assert_eq!(standard, Utf8PathBuf::from("res/mipmap-mdpi/ic_launcher.png"));
        assert_eq!(round, Utf8PathBuf::from("res/mipmap-mdpi/ic_launcher_round.png"));
    }
}
