// Setup state module
//
// The project's provisioning state lives entirely on disk. This module derives an
// immutable snapshot of it once per run so the orchestrator's guards can be tested
// without touching a real file system.

use crate::models::layout::{CONFIG_FILE, MANIFEST_FILE, PLATFORM_DIR, WEB_DIR};
use camino::{Utf8Path, Utf8PathBuf};

/// Presence checks against a project root.
///
/// Paths are relative to the project root.
#[cfg_attr(test, mockall::automock)]
pub trait ProjectProbe {
    fn exists(&self, relative: &Utf8Path) -> bool;
}

/// [`ProjectProbe`] backed by the real file system
#[derive(Debug, Clone)]
pub struct FsProbe {
    root: Utf8PathBuf,
}

impl FsProbe {
    pub fn new<P: AsRef<Utf8Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl ProjectProbe for FsProbe {
    fn exists(&self, relative: &Utf8Path) -> bool {
        self.root.join(relative).exists()
    }
}

/// Snapshot of which provisioning artifacts are present
///
/// Each provisioning step is a guarded transition on one of these flags: it only
/// acts when the flag is `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetupState {
    /// `package.json` exists
    pub has_manifest: bool,

    /// `capacitor.config.json` exists
    pub has_config: bool,

    /// `public/` exists
    pub has_web_dir: bool,

    /// `android/` exists
    pub has_platform: bool,
}

impl SetupState {
    /// Probe the project once and capture every presence flag.
    pub fn inspect(probe: &impl ProjectProbe) -> Self {
        let state = Self {
            has_manifest: probe.exists(Utf8Path::new(MANIFEST_FILE)),
            has_config: probe.exists(Utf8Path::new(CONFIG_FILE)),
            has_web_dir: probe.exists(Utf8Path::new(WEB_DIR)),
            has_platform: probe.exists(Utf8Path::new(PLATFORM_DIR)),
        };

        tracing::debug!("Inspected project state: {:?}", state);
        state
    }

    /// True when every guarded step would be a no-op
    pub fn is_fully_provisioned(&self) -> bool {
        self.has_manifest && self.has_config && self.has_web_dir && self.has_platform
    }
}
