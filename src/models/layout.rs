use camino::{Utf8Path, Utf8PathBuf};

/// Build configuration document consumed by the Capacitor CLI
pub const CONFIG_FILE: &str = "capacitor.config.json";

/// npm package manifest
pub const MANIFEST_FILE: &str = "package.json";

/// Canonical web directory (the webview content root)
pub const WEB_DIR: &str = "public";

/// Loader page file name inside the web directory
pub const LOADER_PAGE: &str = "index.html";

/// Platform project directory created by `cap add android`
pub const PLATFORM_DIR: &str = "android";

/// Name of the platform, as passed to `cap add`
pub const PLATFORM_NAME: &str = "android";

/// Fixed locations inside a scaffolded project.
///
/// Every path is derived from the project root; nothing here touches the disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: Utf8PathBuf,
}

impl ProjectLayout {
    pub fn new<P: AsRef<Utf8Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn config_file(&self) -> Utf8PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn manifest_file(&self) -> Utf8PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    pub fn web_dir(&self) -> Utf8PathBuf {
        self.root.join(WEB_DIR)
    }

    pub fn loader_page(&self) -> Utf8PathBuf {
        self.web_dir().join(LOADER_PAGE)
    }

    pub fn platform_dir(&self) -> Utf8PathBuf {
        self.root.join(PLATFORM_DIR)
    }

    /// Android resource root holding the `mipmap-*` density directories
    pub fn icon_res_dir(&self) -> Utf8PathBuf {
        self.platform_dir().join("app").join("src").join("main").join("res")
    }

    /// Debug APK produced by `gradlew assembleDebug`
    pub fn debug_artifact(&self) -> Utf8PathBuf {
        self.platform_dir()
            .join("app")
            .join("build")
            .join("outputs")
            .join("apk")
            .join("debug")
            .join("app-debug.apk")
    }
}
