use anyhow::{Context, Result, anyhow};
use clap::ValueEnum;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::report::{RenderOptions, SiteErrorPolicy};

const DEFAULT_CONFIG: &str = include_str!("../../config/default.toml");

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub report: ReportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    pub snapshot_path: String,
    /// Login the report is requested as.
    pub user: String,
    #[serde(default)]
    pub output_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReportConfig {
    pub title: String,
    pub format: OutputFormat,
    pub on_site_error: SiteErrorPolicy,
    pub open_links_in_new_tab: bool,
    /// Emit a full HTML page instead of an embeddable fragment.
    pub standalone_page: bool,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub filter: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Html,
    Json,
}

impl AppConfig {
    /// Load configuration with layering: defaults → user config.
    ///
    /// `explicit` must exist when given; the per-user file is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let user_path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => directories::ProjectDirs::from("", "", "ms-plugins")
                .map(|dirs| dirs.config_dir().join("config.toml"))
                .filter(|path| path.exists()),
        };

        let user_str = user_path
            .as_ref()
            .map(|path| {
                fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))
            })
            .transpose()?;

        Self::from_layers(DEFAULT_CONFIG, user_str.as_deref())
    }

    /// Deep-merges `user` over `defaults`; tables merge key by key, every
    /// other value replaces the default outright.
    pub fn from_layers(defaults: &str, user: Option<&str>) -> Result<Self> {
        let mut merged: toml::Value = toml::from_str(defaults).context("parsing default config")?;

        if let Some(user) = user {
            let overlay: toml::Value = toml::from_str(user).context("parsing user config")?;
            merge(&mut merged, overlay);
        }

        merged.try_into::<AppConfig>().context("invalid configuration")
    }

    pub fn snapshot_path(&self) -> Result<PathBuf> {
        expand_tilde(&self.general.snapshot_path)
    }

    pub fn output_path(&self) -> Result<Option<PathBuf>> {
        self.general
            .output_path
            .as_deref()
            .map(expand_tilde)
            .transpose()
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            title: self.report.title.clone(),
            open_links_in_new_tab: self.report.open_links_in_new_tab,
        }
    }
}

fn merge(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

fn expand_tilde(path: &str) -> Result<PathBuf> {
    if !path.starts_with('~') {
        return Ok(PathBuf::from(path));
    }

    let home = directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .ok_or_else(|| anyhow!("cannot determine home directory"))?;
    Ok(PathBuf::from(path.replacen('~', &home.to_string_lossy(), 1)))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_parse() {
        let config = AppConfig::from_layers(DEFAULT_CONFIG, None);
        let config = config.expect("defaults");

        assert_eq!(config.general.user, "admin");
        assert_eq!(config.report.title, "Multisite Plugin List");
        assert_eq!(config.report.format, OutputFormat::Html);
        assert_eq!(config.report.on_site_error, SiteErrorPolicy::Skip);
        assert!(config.report.open_links_in_new_tab);
        assert!(config.general.output_path.is_none());
    }

    #[test]
    fn user_layer_overrides_single_keys() {
        let config = AppConfig::from_layers(
            DEFAULT_CONFIG,
            Some(
                r#"
                [report]
                on_site_error = "abort"
                format = "json"
                "#,
            ),
        )
        .expect("layered config");

        assert_eq!(config.report.on_site_error, SiteErrorPolicy::Abort);
        assert_eq!(config.report.format, OutputFormat::Json);
        assert_eq!(config.report.title, "Multisite Plugin List");
        assert_eq!(config.general.user, "admin");
    }

    #[test]
    fn invalid_values_are_rejected() {
        let result = AppConfig::from_layers(
            DEFAULT_CONFIG,
            Some("[report]\non_site_error = \"retry\"\n"),
        );
        assert!(result.is_err());
    }

    #[test]
    fn explicit_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[general]\nuser = \"netadmin\"\noutput_path = \"/tmp/report.html\"")
            .expect("write config");

        let config = AppConfig::load(Some(file.path())).expect("config");

        assert_eq!(config.general.user, "netadmin");
        assert_eq!(
            config.output_path().expect("output path"),
            Some(PathBuf::from("/tmp/report.html"))
        );
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("absent.toml");
        assert!(AppConfig::load(Some(&missing)).is_err());
    }

    #[test]
    fn plain_paths_are_not_expanded() {
        assert_eq!(
            expand_tilde("/srv/network.toml").expect("path"),
            PathBuf::from("/srv/network.toml")
        );
    }
}
