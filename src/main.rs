use merge_report::config::{ReportConfig, USAGE};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing (logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "merge_report=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Help short-circuits before required-field validation.
    if std::env::args()
        .skip(1)
        .any(|arg| matches!(arg.as_str(), "help" | "-h" | "--help"))
    {
        println!("{USAGE}");
        return;
    }

    let config = match ReportConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e:#}\n\n{USAGE}");
            std::process::exit(1);
        }
    };

    let out_dir = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            tracing::error!("Cannot resolve current directory: {}. Exiting.", e);
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Generating merged PR report for {} ({} to {})",
        config.repo,
        config.start,
        config.end
    );

    match merge_report::generate_report(&config, &out_dir).await {
        Ok(path) => tracing::info!("Report written to {}", path.display()),
        Err(e) => {
            tracing::error!("Report generation failed: {:#}", e);
            std::process::exit(1);
        }
    }
}
