//! Loader page generation: a static `index.html` that frames the target URL.

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use std::fs;
use tera::{Context as TContext, Tera};
use url::Url;

use crate::models::ProjectLayout;

const LOADER_TEMPLATE: &str = include_str!("../assets/loader.html.tera");

/// Sandbox tokens granted to the embedded frame. Nothing else is allowed.
pub const SANDBOX_POLICY: &str = "allow-scripts allow-same-origin allow-forms allow-popups";

/// Render the loader page for `url`.
///
/// Autoescaping is off: the URL is embedded exactly as [`Url`] serializes it,
/// which already percent-encodes quotes and angle brackets.
pub fn render_loader_page(url: &Url, title: &str) -> Result<String> {
    let mut tera = Tera::default();
    tera.add_raw_template("loader.html", LOADER_TEMPLATE)
        .context("Failed to load loader page template")?;
    tera.autoescape_on(vec![]);

    let mut ctx = TContext::new();
    ctx.insert("url", url.as_str());
    ctx.insert("sandbox", SANDBOX_POLICY);
    ctx.insert("title", &html_text(title));

    tera.render("loader.html", &ctx)
        .context("Failed to render loader page")
}

/// Render the loader page and write it into the canonical web directory.
///
/// # Returns
/// The path of the written page
pub fn write_loader_page(layout: &ProjectLayout, url: &Url, title: &str) -> Result<Utf8PathBuf> {
    let web_dir = layout.web_dir();
    fs::create_dir_all(&web_dir)
        .with_context(|| format!("Failed to create web directory: {}", web_dir))?;

    let html = render_loader_page(url, title)?;
    let path = layout.loader_page();
    fs::write(&path, html).with_context(|| format!("Failed to write loader page: {}", path))?;

    tracing::info!("Created loader page for {} at {}", url, path);
    Ok(path)
}

fn html_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
