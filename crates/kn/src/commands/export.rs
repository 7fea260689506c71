//! Static export mode.

use kn_config::Config;
use kn_export::Exporter;

use crate::error::CliError;
use crate::output::Output;

/// Export the site to the configured output directory.
///
/// # Errors
///
/// Returns an error if the source cannot be scanned or output cannot be
/// written.
pub(crate) fn execute(config: &Config) -> Result<(), CliError> {
    let output = Output::new();
    output.info(&format!(
        "Exporting {} to {} (base path {})",
        config.content_resolved.source_dir.display(),
        config.export_resolved.output_dir.display(),
        config.export_resolved.base_path,
    ));

    let summary = Exporter::from_config(config).export(&config.site)?;

    output.success(&format!(
        "Exported {} pages, {} documents and {} bundles to {}",
        summary.pages,
        summary.documents,
        summary.bundles,
        config.export_resolved.output_dir.display()
    ));
    Ok(())
}
