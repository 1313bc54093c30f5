use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const CLI_DEFAULT_FILTER: &str = "racketpro_web=info";
const CLI_VERBOSE_FILTER: &str = "racketpro_web=trace,reqwest=debug,info";

/// Logs go to stderr; stdout carries only command output.
pub fn init_cli_logger(verbose: bool) {
    let default_filter = if verbose {
        CLI_VERBOSE_FILTER
    } else {
        CLI_DEFAULT_FILTER
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // --verbose 時顯示模組路徑，方便分辨 navigation / contact_form / carousel
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose)
                .without_time()
                .compact(),
        )
        .init();
}

/// 部署環境（例如嵌入伺服器端渲染或日誌收集）使用 JSON 格式
pub fn init_json_logger() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("racketpro_web=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .json(),
        )
        .init();
}
