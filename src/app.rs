use std::fs;
use std::io::{self, Write};

use anyhow::{Context, Result};

use crate::host::{NetworkHost, SnapshotHost};
use crate::model::config::{AppConfig, OutputFormat};
use crate::report::{Invocation, build_report};

/// Host integration layer: loads the network snapshot, runs the report
/// pipeline and delivers the output.
pub struct App {
    config: AppConfig,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, invocation: &Invocation) -> Result<()> {
        let snapshot_path = self.config.snapshot_path()?;
        let host = SnapshotHost::load(&snapshot_path)?;
        let output = self.render(&host, invocation)?;

        match self.config.output_path()? {
            Some(path) => {
                fs::write(&path, output)
                    .with_context(|| format!("writing report to {}", path.display()))?;
                tracing::info!("report written to {}", path.display());
            }
            None => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(output.as_bytes())?;
                stdout.flush()?;
            }
        }

        Ok(())
    }

    /// Produces the report text in the configured format. Nothing is
    /// returned when the invocation is not authorized.
    pub fn render<H: NetworkHost>(&self, host: &H, invocation: &Invocation) -> Result<String> {
        let report_config = &self.config.report;
        let report = build_report(host, invocation, report_config.on_site_error)?;

        let output = match report_config.format {
            OutputFormat::Json => report
                .to_json(&report_config.title)
                .context("serializing report")?,
            OutputFormat::Html => {
                let document = report.to_document(&self.config.render_options());
                if report_config.standalone_page {
                    document.to_html_page()
                } else {
                    document.body
                }
            }
        };

        tracing::info!(
            plugins = report.rows.len(),
            bytes = output.len(),
            "plugin report rendered"
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportError;

    const SNAPSHOT: &str = r#"
        super_admins = ["admin"]
        network_active = ["akismet/akismet.php"]

        [[plugins]]
        basename = "akismet/akismet.php"
        name = "Akismet"

        [[sites]]
        id = 1
        name = "Main"
        home_url = "https://example.com"
    "#;

    fn app(user_layer: &str) -> App {
        let defaults = include_str!("../config/default.toml");
        let config = AppConfig::from_layers(defaults, Some(user_layer));
        App::new(config.expect("config"))
    }

    #[test]
    fn renders_standalone_html_by_default() {
        let host = SnapshotHost::from_toml_str(SNAPSHOT).expect("snapshot");
        let output = app("")
            .render(&host, &Invocation::network("admin"))
            .expect("output");

        assert!(output.starts_with("<!DOCTYPE html>"));
        assert!(output.contains("Main (ID: 1)"));
    }

    #[test]
    fn renders_fragment_when_not_standalone() {
        let host = SnapshotHost::from_toml_str(SNAPSHOT).expect("snapshot");
        let output = app("[report]\nstandalone_page = false\n")
            .render(&host, &Invocation::network("admin"))
            .expect("output");

        assert!(output.starts_with("<div class=\"wrap\">"));
    }

    #[test]
    fn renders_json_when_configured() {
        let host = SnapshotHost::from_toml_str(SNAPSHOT).expect("snapshot");
        let output = app("[report]\nformat = \"json\"\n")
            .render(&host, &Invocation::network("admin"))
            .expect("output");

        let value: serde_json::Value = serde_json::from_str(&output).expect("json");
        assert_eq!(value["plugins"][0]["active_count"], 1);
        assert_eq!(value["plugins"][0]["network_active"], true);
    }

    #[test]
    fn denial_carries_report_error() {
        let host = SnapshotHost::from_toml_str(SNAPSHOT).expect("snapshot");
        let err = app("")
            .render(&host, &Invocation::network("guest"))
            .expect_err("denied");

        assert!(matches!(
            err.downcast_ref::<ReportError>(),
            Some(ReportError::AccessDenied)
        ));
        assert_eq!(err.to_string(), "Access denied.");
    }

    #[test]
    fn run_writes_report_to_output_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let snapshot_path = dir.path().join("network.toml");
        let output_path = dir.path().join("report.html");
        fs::write(&snapshot_path, SNAPSHOT).expect("write snapshot");

        let layer = format!(
            "[general]\nsnapshot_path = '{}'\noutput_path = '{}'\n",
            snapshot_path.display(),
            output_path.display()
        );
        app(&layer).run(&Invocation::network("admin")).expect("run");

        let written = fs::read_to_string(&output_path).expect("report file");
        assert!(written.starts_with("<!DOCTYPE html>"));
        assert!(written.contains("Main (ID: 1)"));
    }
}
