use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// ログ出力の初期化
///
/// RUST_LOG が設定されていればそちらを優先する
pub fn init(level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(level));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    // 二重初期化（テストなど）は無視する
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .try_init();
}

fn default_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(format!("memo_summary={level},tower_http={level}"))
        .unwrap_or_else(|_| EnvFilter::new("memo_summary=info,tower_http=info"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice_does_not_panic() {
        init("debug");
        init("info");
    }

    #[test]
    fn invalid_level_falls_back() {
        let filter = default_filter("verbose");
        assert!(filter.to_string().contains("memo_summary=info"));
    }
}
