use crate::config::AppConfig;

/// 初始化日志
///
/// 由宿主进程在启动时调用一次：开发环境输出带文件/行号的彩色日志，
/// 生产环境输出 JSON。重复调用会被忽略。
pub fn init_tracing() {
    let config = AppConfig::get();

    let filter = tracing_subscriber::EnvFilter::new(&config.app.log_level);
    let tracing_format = tracing_subscriber::fmt::format()
        .with_level(true)
        .with_ansi(true);

    let tracing_builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .event_format(tracing_format);

    let result = if config.is_development() {
        tracing_builder
            .with_file(true)
            .with_line_number(true)
            .try_init()
    } else {
        tracing_builder.json().try_init()
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber already initialized, skipping");
    }
}
