use clap::Parser;
use site_finder::utils::error::ErrorSeverity;
use site_finder::utils::{logger, validation::Validate};
use site_finder::{
    build_session, CliConfig, ConfigProvider, OutputFormat, Reconciliation, Region,
    RegionCatalog, SiteError, TomlConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    if config.list_regions {
        for region in Region::ALL {
            println!("{:<12} {}  ({})", region.display_name(), region.abbreviation(), region.slug());
        }
        return Ok(());
    }

    tracing::info!("Starting site-finder for {}", config.region);
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    let outcome = match &config.config {
        Some(path) => match TomlConfig::from_file(path) {
            Ok(file_config) => run(&file_config, config.region, config.format).await,
            Err(e) => Err(e),
        },
        None => run(&config, config.region, config.format).await,
    };

    if let Err(e) = outcome {
        tracing::error!(
            "❌ Site lookup failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run<C: ConfigProvider + Validate>(
    config: &C,
    region: Region,
    format: OutputFormat,
) -> Result<(), SiteError> {
    config.validate()?;

    let mut session = build_session(config)?;
    session.select_region(region).await?;

    if format == OutputFormat::Text {
        println!(
            "🔎 Locating {} testing sites in {}...",
            session.catalog().sites.len(),
            region
        );
    }

    // 每完成一個地理編碼就輸出一個 pin
    while let Some(outcome) = session.next_completion().await {
        if format != OutputFormat::Text {
            continue;
        }
        if let Reconciliation::Pinned { pin, recentered } = outcome {
            println!(
                "📍 {} | {} | {:.5}, {:.5}{}",
                pin.name,
                pin.phone,
                pin.latitude,
                pin.longitude,
                if recentered { "  (map center)" } else { "" }
            );
        }
    }

    let catalog = session.settle().await;
    match format {
        OutputFormat::Text => print_summary(catalog),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(catalog)?),
    }
    Ok(())
}

fn print_summary(catalog: &RegionCatalog) {
    if catalog.is_empty() {
        println!("No testing sites could be placed on the map for {}.", catalog.region);
    } else {
        println!(
            "✅ {} of {} sites in {} placed on the map",
            catalog.pins.len(),
            catalog.sites.len(),
            catalog.region
        );
    }
    if catalog.unlocated() > 0 {
        println!("⚠️ {} sites could not be geocoded", catalog.unlocated());
    }
    if catalog.dropped_records > 0 {
        println!("⚠️ {} feed records were malformed and skipped", catalog.dropped_records);
    }
}
