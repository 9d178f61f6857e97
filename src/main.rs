use branch_report::cli::args::Args;
use branch_report::config::Config;
use branch_report::github::GitHubClient;
use branch_report::infrastructure::{build_client, setup_logging, LoggingConfig, ReportError};
use branch_report::report::ReportGenerator;
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;

/// 解析配置，所有用法错误都在发出任何网络请求之前返回
fn build_config(args: &Args) -> Result<Config, ReportError> {
    let mut config = Config::load()?;
    config.update_from_args(args)?;
    config.validate()?;
    Ok(config)
}

async fn run(config: Config) -> anyhow::Result<()> {
    let settings = config.report_settings()?;
    let client = build_client(&config.network_config())?;
    let source = GitHubClient::new(client, config.api_url.clone(), config.token.clone());

    debug!(
        repo = %settings.repo,
        mode = ?settings.mode,
        authenticated = config.token.is_some(),
        "Generating branch report"
    );

    let report = ReportGenerator::new(Arc::new(source), settings)
        .generate()
        .await?;

    println!("✅ {}", report);
    if report.degraded > 0 {
        println!(
            "⚠️  {} of {} branches could not be fully fetched and are marked as errors",
            report.degraded, report.branches
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(e.exit_code() as u8);
        }
    };

    if let Err(e) = setup_logging(LoggingConfig::from_debug(config.debug)) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            let code = e
                .downcast_ref::<ReportError>()
                .map(ReportError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code as u8)
        }
    }
}
