//! Live server mode.

use kn_config::Config;
use kn_server::{ServerConfig, run_server};
use kn_site::{FsSnapshotSource, RefreshPolicy, SnapshotCache};

use crate::error::CliError;
use crate::output::Output;

/// Load the content, then serve it until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the initial content load fails or the server fails
/// to start.
pub(crate) async fn execute(config: &Config, version: &str) -> Result<(), CliError> {
    let output = Output::new();

    let policy = RefreshPolicy::from_config(&config.refresh);
    let cache = SnapshotCache::start(FsSnapshotSource::from_config(config), policy).await?;

    output.highlight(&format!(
        "Serving on http://{}:{}",
        config.server.host, config.server.port
    ));
    output.info(&format!(
        "Source directory: {}",
        config.content_resolved.source_dir.display()
    ));
    match policy.interval() {
        Some(interval) => output.info(&format!("Content refresh: every {}s", interval.as_secs())),
        None => output.info("Content refresh: disabled (frozen)"),
    }
    for static_path in &config.static_resolved {
        output.info(&format!(
            "Static path: /{} -> {}",
            static_path.name,
            static_path.path.display()
        ));
    }

    run_server(ServerConfig::from_config(config, version.to_owned()), cache).await?;
    Ok(())
}
