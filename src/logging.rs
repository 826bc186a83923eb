use crate::config::Environment;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is not set.
fn default_filter(env: Environment) -> &'static str {
    match env {
        Environment::Dev => "sustainable_design_backend=debug,tower_http=debug,sqlx=warn,info",
        Environment::Staging => "sustainable_design_backend=debug,tower_http=info,sqlx=warn,info",
        Environment::Prod => "sustainable_design_backend=info,tower_http=info,warn",
    }
}

/// Pretty output in dev and staging, JSON lines in prod.
pub fn init_logging(env: Environment) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(env)));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(env.is_dev())
        .with_line_number(env.is_dev());

    if env == Environment::Prod {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.pretty())
            .init();
    }

    tracing::info!(?env, "Logging initialized");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filters_parse() {
        for env in [Environment::Dev, Environment::Staging, Environment::Prod] {
            assert!(EnvFilter::try_new(default_filter(env)).is_ok());
        }
    }
}
