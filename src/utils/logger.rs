use env_logger::Env;

/// Operator-facing output goes to stdout through `log`; `RUST_LOG` overrides the level.
pub fn init_logger() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .write_style(env_logger::WriteStyle::Auto)
        .format_target(false)
        .format_timestamp_secs()
        .init();
}
