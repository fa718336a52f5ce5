//! ReadFocus demo.
//!
//! Opens a few in-process tabs and walks through the extension's features:
//! install, theme changes, focus toggling, ad hiding and article export.
//! Pass an HTML file path to use it as the article page, and `--persist` to
//! keep state in the platform data dir instead of memory.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use readfocus::app::App;
use readfocus::managers::content_script::FOCUS_CLASS;
use readfocus::platform;
use readfocus::services::config_loader::{ConfigLoader, ConfigLoaderTrait};
use readfocus::services::markdown_export::FsDownloader;
use readfocus::services::storage::MemoryStorage;
use readfocus::types::theme::ThemePreference;

const SAMPLE_ARTICLE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Why Slow Reading Matters</title></head>
<body>
  <nav>Home | Archive | About</nav>
  <div class="ad-container">Buy one, get one free!</div>
  <article>
    <h1>Why Slow Reading Matters</h1>
    <p>Reading slowly gives ideas room to settle. Skimming trains the eye to hunt
    for keywords, while careful reading trains the mind to follow an argument.</p>
    <p>A quiet page helps: fewer boxes competing for attention, calmer colours,
    and text set at a comfortable width.</p>
  </article>
  <div id="sponsored-links" class="sponsored">Sponsored: ten tricks</div>
</body>
</html>"#;

fn section(name: &str) {
    println!("───────────────────────────────────────────────────────────────");
    println!("  {}", name);
    println!("───────────────────────────────────────────────────────────────");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("readfocus=info")),
        )
        .init();

    let (flags, paths): (Vec<String>, Vec<String>) =
        std::env::args().skip(1).partition(|arg| arg.starts_with("--"));
    let persist = flags.iter().any(|flag| flag == "--persist");

    let article_html = match paths.first() {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading article page {}", path))?,
        None => SAMPLE_ARTICLE.to_string(),
    };

    let mut loader = ConfigLoader::new(None);
    let config = loader.load().context("loading configuration")?;

    println!();
    println!("  ReadFocus v{} demo", env!("CARGO_PKG_VERSION"));
    println!();

    let export_dir = if persist {
        config
            .download_dir
            .clone()
            .unwrap_or_else(platform::get_download_dir)
    } else {
        std::env::temp_dir().join("readfocus-demo")
    };
    let mut app = if persist {
        App::with_platform_storage(config.clone())
            .await
            .context("opening persistent storage")?
    } else {
        App::new(
            config.clone(),
            Arc::new(MemoryStorage::default()),
            Arc::new(FsDownloader::new(Some(export_dir.clone()))),
        )
    };

    section("Install");
    app.startup().await.context("starting background")?;
    let state = app.store.state().await?;
    println!("  theme = {}, focus mode = {}", state.theme, state.focus_mode_enabled);

    section("Tabs");
    let article = app.tabs.open_tab("https://reading.example/slow", &article_html);
    let settings = app.tabs.open_tab("chrome://settings", "");
    app.tabs.activate(article);
    println!("  article tab {}, internal tab {}", article, settings);

    section("Ad hiding");
    tokio::time::sleep(config.ad_initial_delay() + Duration::from_millis(50)).await;
    let hidden = app
        .tabs
        .with_document(article, |doc| {
            doc.select("[style*=\"display\"]").map(|ids| ids.len()).unwrap_or(0)
        })
        .await
        .unwrap_or(0);
    println!("  hidden elements after first pass: {}", hidden);

    section("Themes");
    let report = app.store.set_theme(ThemePreference::Paper).await?;
    println!(
        "  delivered to {:?}, unreachable {:?}, failed {}",
        report.delivered,
        report.unreachable,
        report.failures.len()
    );
    app.tabs.set_system_prefers_dark(true);

    section("Focus mode");
    let popup = app.open_popup().await;
    popup.click_toggle().await?;
    let focused = app
        .tabs
        .with_document(article, |doc| {
            doc.body().map(|b| doc.has_class(b, FOCUS_CLASS)).unwrap_or(false)
        })
        .await
        .unwrap_or(false);
    let view = popup.view();
    println!("  body marked: {}, button: {}", focused, view.toggle_label());
    println!("  icon: {:?}", app.tabs.icon(article).map(|i| i.path()));

    section("Save article");
    let outcome = popup.click_save().await;
    println!("  {:?}", outcome);
    println!("  status: {}", popup.view().status);
    println!("  export dir: {}", export_dir.display());

    app.shutdown();
    println!();
    Ok(())
}
