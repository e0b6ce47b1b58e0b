//! Config command handler

use crate::commands::ConfigArgs;
use crate::error::{CliError, CliResult};
use swaglabs_e2e::SuiteConfig;

/// Effective configuration as YAML: file (or defaults) plus environment
pub fn render_config(args: &ConfigArgs) -> CliResult<String> {
    let suite = SuiteConfig::discover(args.config.as_deref())?.with_env()?;
    serde_yaml_ng::to_string(&suite).map_err(|e| CliError::config(e.to_string()))
}

/// Execute the config command
pub fn execute_config(args: &ConfigArgs) -> CliResult<()> {
    print!("{}", render_config(args)?);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rendered_config_parses_back() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("swaglabs.yaml");
        std::fs::write(&file, "screenshot_on_failure: false\ntimeouts:\n  expect_ms: 1234\n")
            .unwrap();

        let yaml = render_config(&ConfigArgs { config: Some(file) }).unwrap();
        let parsed = SuiteConfig::from_yaml(&yaml).unwrap();
        assert!(!parsed.screenshot_on_failure);
        assert_eq!(parsed.timeouts.expect_ms, 1234);
        assert!(yaml.contains("base_url:"));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("swaglabs.yaml");
        std::fs::write(&file, "base_url: ftp://example\n").unwrap();
        assert!(render_config(&ConfigArgs { config: Some(file) }).is_err());
    }
}
