use anyhow::Context;
use clap::Parser;
use reqwest::StatusCode;
use triangulator::utils::{logger, validation::Validate};
use triangulator::{
    classify, CliConfig, HttpPointSetFetcher, OutputFormat, OutputSink, TriangulationService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting triangulator");
    tracing::debug!("CLI config: {:?}", cli);

    let config = cli.resolve().context("Failed to load configuration")?;
    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }

    let fetcher = HttpPointSetFetcher::from_config(&config)?;
    let service = TriangulationService::from_config(fetcher, &config);

    let (status, body) = match cli.format {
        OutputFormat::Binary => {
            let response = service.handle(&cli.point_set_id).await;
            (response.status, response.body)
        }
        OutputFormat::Json => match service.triangulate_by_id(&cli.point_set_id).await {
            Ok(result) => (StatusCode::OK, serde_json::to_vec_pretty(&result)?),
            Err(e) => {
                let outcome = classify(&e);
                tracing::error!("Triangulation failed: {} ({})", e, outcome.status);
                (outcome.status, serde_json::to_vec(&outcome)?)
            }
        },
    };

    if status.is_success() {
        let written = OutputSink::new(cli.output.clone()).write(&body)?;
        tracing::info!("Triangulation written to {}", written);
        return Ok(());
    }

    eprintln!("{}", String::from_utf8_lossy(&body));
    std::process::exit(exit_code(status));
}

fn exit_code(status: StatusCode) -> i32 {
    match status {
        StatusCode::BAD_REQUEST => 2,
        StatusCode::NOT_FOUND | StatusCode::BAD_GATEWAY => 3,
        _ => 1,
    }
}
