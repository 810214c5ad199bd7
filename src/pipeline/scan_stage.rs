//! Plugin execution stage.

use super::PipelineError;
use crate::document::Bom;
use crate::provider::Filesystem;
use crate::scanner::{Plugin, ScanReport};
use anyhow::Result;

/// Run each plugin in order against the same document.
///
/// The first plugin error aborts the run; reports of the plugins that
/// completed are discarded with it.
pub fn run_plugins(
    plugins: &mut [Box<dyn Plugin>],
    fs: &dyn Filesystem,
    bom: &mut Bom,
    quiet: bool,
) -> Result<Vec<ScanReport>> {
    let mut reports = Vec::with_capacity(plugins.len());
    for plugin in plugins.iter_mut() {
        tracing::debug!(plugin = plugin.name(), kind = %plugin.plugin_type(), "Running plugin");
        let report = plugin
            .update_bom(fs, bom)
            .map_err(|e| PipelineError::ScanFailed {
                plugin: plugin.name().to_string(),
                source: e.into(),
            })?;

        if !quiet {
            tracing::info!(
                plugin = %report.plugin,
                files = report.files_visited,
                certificates = report.certificates_found,
                components = report.components_added,
                algorithms_deduplicated = report.merge.algorithms_deduplicated,
                certificates_deduplicated = report.merge.certificates_deduplicated,
                warnings = report.warnings.len(),
                "Plugin finished"
            );
        }
        reports.push(report);
    }
    Ok(reports)
}

/// Number of warnings across all reports
#[must_use]
pub fn total_warnings(reports: &[ScanReport]) -> usize {
    reports.iter().map(|r| r.warnings.len()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CbomError, Result as CbomResult};
    use crate::provider::{PlainFilesystem, WalkOptions};
    use crate::scanner::PluginType;
    use tempfile::TempDir;

    struct Failing;

    impl Plugin for Failing {
        fn name(&self) -> &str {
            "Failing Plugin"
        }

        fn plugin_type(&self) -> PluginType {
            PluginType::Verify
        }

        fn update_bom(&mut self, _fs: &dyn Filesystem, _bom: &mut Bom) -> CbomResult<ScanReport> {
            Err(CbomError::validation("refused"))
        }
    }

    struct Counting(usize);

    impl Plugin for Counting {
        fn name(&self) -> &str {
            "Counting Plugin"
        }

        fn plugin_type(&self) -> PluginType {
            PluginType::Other
        }

        fn update_bom(&mut self, fs: &dyn Filesystem, _bom: &mut Bom) -> CbomResult<ScanReport> {
            let summary = fs.walk_dir(&mut |_| Ok(()))?;
            self.0 += 1;
            let mut report = ScanReport::new(self.name());
            report.files_visited = summary.files_visited;
            Ok(report)
        }
    }

    #[test]
    fn test_reports_in_plugin_order() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "a").unwrap();
        let fs = PlainFilesystem::new(dir.path(), WalkOptions::default()).unwrap();

        let mut plugins: Vec<Box<dyn Plugin>> = vec![Box::new(Counting(0)), Box::new(Counting(0))];
        let mut bom = Bom::skeleton();
        let reports = run_plugins(&mut plugins, &fs, &mut bom, true).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].files_visited, 1);
        assert_eq!(total_warnings(&reports), 0);
    }

    #[test]
    fn test_plugin_error_is_wrapped() {
        let dir = TempDir::new().unwrap();
        let fs = PlainFilesystem::new(dir.path(), WalkOptions::default()).unwrap();
        let mut plugins: Vec<Box<dyn Plugin>> = vec![Box::new(Failing)];
        let mut bom = Bom::skeleton();

        let err = run_plugins(&mut plugins, &fs, &mut bom, true).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::ScanFailed { plugin, .. }) if plugin == "Failing Plugin"
        ));
    }
}
