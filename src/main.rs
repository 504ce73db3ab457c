use nav_guard::config::AppConfig;
use nav_guard::scenario::Scenario;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::from_env()?;

    let scenario = match std::env::args().nth(1) {
        Some(path) => Scenario::load(std::path::Path::new(&path)).await?,
        None => Scenario::cold_start_demo(),
    };

    eprintln!("nav-guard v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Auth route: {}", config.guard.auth_route);
    eprintln!("   Onboarding route: {}", config.guard.onboarding_route);
    eprintln!("   Tabs route: {}", config.guard.tabs_route);
    eprintln!(
        "   Scenario: {} ({} steps)",
        scenario.name.as_deref().unwrap_or("unnamed"),
        scenario.steps.len()
    );

    if let Some(path) = &config.session_file {
        eprintln!("   Session file: {}", path.display());
    }

    let outcomes = scenario
        .run_persisted(config.guard, config.session_file.as_deref())
        .await?;
    println!("{}", serde_json::to_string_pretty(&outcomes)?);

    let unsettled = outcomes.iter().filter(|o| !o.settled).count();
    if unsettled > 0 {
        anyhow::bail!("{unsettled} step(s) did not settle after redirect");
    }
    Ok(())
}
