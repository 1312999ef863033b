pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::config::toml_config::RunConfig;
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "kyb-flash")]
#[command(about = "Batch-run KYB verification requests and flatten the responses into a CSV report")]
pub struct CliConfig {
    /// Path to the TOML run configuration
    #[arg(short, long, default_value = "kyb-flash.toml")]
    pub config: String,

    /// Override the output directory from the config
    #[arg(long)]
    pub output_path: Option<String>,

    /// Override the number of iterations from the config
    #[arg(long)]
    pub iterations: Option<usize>,

    /// Rebuild the report from a saved responses file instead of calling the API
    #[arg(long, value_name = "FILE")]
    pub replay: Option<String>,

    /// Show what would be executed without sending any request
    #[arg(long)]
    pub dry_run: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 套用命令列覆蓋設定
    pub fn apply_overrides(&self, config: &mut RunConfig) {
        if let Some(output_path) = &self.output_path {
            config.output.path = output_path.clone();
            tracing::info!("🔧 Output path overridden to: {}", output_path);
        }

        if let Some(iterations) = self.iterations {
            config.run.iteration_count = Some(iterations);
            tracing::info!("🔧 Iteration count overridden to: {}", iterations);
        }

        // 重播時不要覆寫自己的輸入檔
        if self.replay.is_some() {
            config.output.responses_file = Some(String::new());
        }
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[run]
name = "cli"

[[requests]]
name = "Verify"
url = "https://api.example.com/verify"

[output]
path = "./output"
"#;

    #[test]
    fn test_parse_cli_arguments() {
        let cli = CliConfig::parse_from([
            "kyb-flash",
            "--config",
            "run.toml",
            "--iterations",
            "3",
            "--dry-run",
        ]);

        assert_eq!(cli.config, "run.toml");
        assert_eq!(cli.iterations, Some(3));
        assert!(cli.dry_run);
        assert!(!cli.verbose);
        assert!(cli.replay.is_none());
    }

    #[test]
    fn test_apply_overrides() {
        let cli = CliConfig::parse_from([
            "kyb-flash",
            "--output-path",
            "/tmp/reports",
            "--iterations",
            "7",
            "--replay",
            "saved.json",
        ]);
        let mut config = RunConfig::from_toml_str(MINIMAL).unwrap();

        cli.apply_overrides(&mut config);

        assert_eq!(config.output.path, "/tmp/reports");
        assert_eq!(config.run.iteration_count, Some(7));
        assert_eq!(config.output.responses_file.as_deref(), Some(""));
    }
}
