use clap::Parser;
use racketpro_web::config::{CarouselConfig, Command, LogFormat};
use racketpro_web::core::SubmissionOutcome;
use racketpro_web::sample;
use racketpro_web::utils::error::ErrorSeverity;
use racketpro_web::utils::{logger, validation::Validate};
use racketpro_web::{CliConfig, ConsoleNotifier, HttpLeadGateway, Site, SiteConfig, SiteError};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    match cli.log_format {
        LogFormat::Compact => logger::init_cli_logger(cli.verbose),
        LogFormat::Json => logger::init_json_logger(),
    }

    tracing::info!("Starting racketpro-web CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Some(e) = cli.missing_config_file() {
        exit_with(&e);
    }

    let config = match cli.site_config().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    match &cli.command {
        Command::Submit {
            name,
            email,
            message,
            fields,
        } => run_submit(&config, name, email, message, fields).await?,
        Command::Carousel { slides, ticks, .. } => {
            if let Err(e) = run_carousel(&config, *slides, *ticks).await {
                exit_with(&e);
            }
        }
        Command::CheckConfig => {
            println!("✅ Configuration is valid");
            println!("{}", config.to_toml_string()?);
        }
    }

    Ok(())
}

fn exit_with(e: &SiteError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

async fn run_submit(
    config: &SiteConfig,
    name: &str,
    email: &str,
    message: &str,
    fields: &[(String, String)],
) -> anyhow::Result<()> {
    let landing = sample::landing_page(1280, 0);
    landing.fill_contact_form(name, email, message);
    for (key, value) in fields {
        landing.set_field(key, value);
    }

    let gateway = Arc::new(HttpLeadGateway::from_config(config)?);
    tracing::info!("📨 Submitting lead to {}", gateway.endpoint());

    // 提示訊息由 ConsoleNotifier 即時輸出到 stderr
    let site = Site::init(&landing.page, config, gateway, Arc::new(ConsoleNotifier));
    let outcome = match site.contact_form() {
        Some(form) => {
            landing.page.click(landing.submit_button);
            form.settle().await.pop()
        }
        None => None,
    };
    site.teardown();

    println!("{}", landing.form_html());

    // 驗證失敗時不會送出請求，因此沒有 outcome
    match outcome {
        Some(SubmissionOutcome::Succeeded { name }) => {
            println!("✅ Lead received for {}", name);
            Ok(())
        }
        Some(SubmissionOutcome::Failed { reason }) => {
            eprintln!("❌ {}", reason);
            std::process::exit(2);
        }
        Some(SubmissionOutcome::Rejected { .. }) | None => std::process::exit(1),
    }
}

async fn run_carousel(config: &SiteConfig, slides: usize, ticks: usize) -> Result<(), SiteError> {
    let landing = sample::landing_page(1280, slides);
    let mut site = Site::init(
        &landing.page,
        &SiteConfig {
            carousel: CarouselConfig {
                autoplay: false,
                ..config.carousel.clone()
            },
            ..config.clone()
        },
        Arc::new(HttpLeadGateway::new(config.lead_endpoint())),
        Arc::new(ConsoleNotifier),
    );

    let Some(carousel) = site.carousel_mut() else {
        return Ok(());
    };
    if carousel.is_inert() {
        println!("⏸️ {} slide(s): carousel stays inert", carousel.slide_count());
        site.teardown();
        return Ok(());
    }

    let period = config.carousel.interval();
    carousel.start(period)?;
    println!("🎠 slide {} active", carousel.active_index().unwrap_or(0));

    // 取樣時間錯開半個週期，避免與切換同時發生
    tokio::time::sleep(period / 2).await;
    for _ in 0..ticks {
        tokio::time::sleep(period).await;
        if let Some(index) = carousel.active_index() {
            println!("🎠 slide {} active", index);
        }
    }
    site.teardown();
    Ok(())
}
