use clap::Parser;
use kyb_flash::config::toml_config::RunConfig;
use kyb_flash::core::ConfigProvider;
use kyb_flash::utils::error::EtlError;
use kyb_flash::utils::{logger, validation::Validate};
use kyb_flash::{CliConfig, EtlEngine, HttpBatchRunner, KybPipeline, LocalStorage, ReplayRunner};

#[tokio::main]
async fn main() {
    let args = CliConfig::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting kyb-flash");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = match RunConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    args.apply_overrides(&mut config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    if args.dry_run {
        display_dry_run(&config, &args);
        return;
    }

    let result = run(config, &args).await;

    match result {
        Ok(output_path) => {
            tracing::info!("✅ Report completed successfully!");
            println!("✅ Success! Report saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Batch failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            std::process::exit(e.exit_code());
        }
    }
}

async fn run(config: RunConfig, args: &CliConfig) -> Result<String, EtlError> {
    let storage = LocalStorage::new(config.output_path().to_string());

    match &args.replay {
        Some(responses_file) => {
            let runner = ReplayRunner::new(LocalStorage::new(String::new()), responses_file.clone());
            let engine = EtlEngine::new(KybPipeline::new(storage, runner, config));
            engine.run().await
        }
        None => {
            let runner = HttpBatchRunner::new(&config)?;
            let engine = EtlEngine::new(KybPipeline::new(storage, runner, config));
            engine.run().await
        }
    }
}


fn display_dry_run(config: &RunConfig, args: &CliConfig) {
    println!("🔍 Dry Run Analysis:");
    println!();
    println!("📋 Run: {}", config.run.name);
    if let Some(description) = &config.run.description {
        println!("  {}", description);
    }

    println!();
    if let Some(replay) = &args.replay {
        println!("📼 Replay from: {}", replay);
    } else {
        println!("📡 Request Collection:");
        for request in &config.requests {
            println!("  {} {} ({})", request.method(), request.url, request.name);
            if let Some(headers) = &request.headers {
                println!("    Headers: {} custom headers", headers.len());
            }
            if let Some(timeout) = request.timeout_seconds {
                println!("    Timeout: {}s", timeout);
            }
        }

        println!();
        match config.data_file() {
            Some(path) => println!("📂 Iteration data: {}", path.display()),
            None => println!("📂 Iteration data: none"),
        }
        match config.iteration_count() {
            Some(count) => println!("🔁 Iterations: {}", count),
            None => println!("🔁 Iterations: one per data row"),
        }
    }

    println!();
    println!("💾 Output Configuration:");
    println!("  Path: {}", config.output_path());
    println!("  Report: {}", config.report_file());
    match config.responses_file() {
        Some(file) => println!("  Raw responses: {}", file),
        None => println!("  Raw responses: disabled"),
    }

    println!();
    println!("✅ Dry run analysis complete. No requests were sent.");
}
