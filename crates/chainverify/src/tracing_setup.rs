//! Tracing / logging initialisation.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use chainverify_core::LogConfig;

/// `EnvFilter` directives for `config`, e.g. `"warn,chainverify_evm=debug"`.
pub fn directives(config: &LogConfig) -> String {
    let mut components: Vec<_> = config.components.iter().collect();
    components.sort();
    components.into_iter().fold(config.level.clone(), |mut acc, (component, level)| {
        acc.push(',');
        acc.push_str(&component.replace('-', "_"));
        acc.push('=');
        acc.push_str(level);
        acc
    })
}

/// Install the global subscriber. Call once at startup; later calls are
/// ignored.
pub fn init_tracing(config: &LogConfig) {
    let filter = EnvFilter::try_new(directives(config)).unwrap_or_else(|_| EnvFilter::new("warn"));

    let result = if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn component_overrides_use_crate_names() {
        let config = LogConfig {
            level: "info".into(),
            components: HashMap::from([
                ("chainverify-evm".to_string(), "debug".to_string()),
                ("chainverify-avax".to_string(), "trace".to_string()),
            ]),
            json: false,
        };
        assert_eq!(directives(&config), "info,chainverify_avax=trace,chainverify_evm=debug");
    }

    #[test]
    fn default_is_warn_only() {
        assert_eq!(directives(&LogConfig::default()), "warn");
    }
}
