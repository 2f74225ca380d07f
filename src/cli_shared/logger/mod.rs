// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use tracing_subscriber::{EnvFilter, Registry, prelude::*};

use crate::cli_shared::cli::{CliOpts, LogConfig};

/// Console logging to stderr, so command output on stdout stays parseable,
/// plus an hourly rolling file when `--log-dir` is given.
pub fn setup_logger(opts: &CliOpts, log: &LogConfig) {
    let mut layers: Vec<Box<dyn tracing_subscriber::layer::Layer<Registry> + Send + Sync>> =
        // console logger
        vec![Box::new(
            tracing_subscriber::fmt::Layer::new()
                .with_ansi(opts.color.coloring_enabled())
                .with_writer(std::io::stderr)
                .with_filter(get_env_filter(default_env_filter(log))),
        )];

    // file logger
    if let Some(log_dir) = &opts.log_dir {
        let file_appender = tracing_appender::rolling::hourly(log_dir, "forest-deal.log");
        layers.push(Box::new(
            tracing_subscriber::fmt::Layer::new()
                .with_ansi(false)
                .with_writer(file_appender)
                .with_filter(get_env_filter(default_env_filter(log))),
        ));
    }

    tracing_subscriber::registry().with(layers).init();
}

/// Returns an [`EnvFilter`] according to the `RUST_LOG` environment variable, or a default
/// - see [`default_env_filter`]
///
/// Note that [`tracing_subscriber::filter::Builder`] only allows a single default directive,
/// whereas we want to provide multiple.
fn get_env_filter(def: EnvFilter) -> EnvFilter {
    use std::env::{
        self,
        VarError::{NotPresent, NotUnicode},
    };
    match env::var(tracing_subscriber::EnvFilter::DEFAULT_ENV) {
        Ok(s) => EnvFilter::new(s),
        Err(NotPresent) => def,
        Err(NotUnicode(_)) => EnvFilter::default(),
    }
}

/// `warn` overall, `info` for this crate, then the configured module filters.
fn default_env_filter(log: &LogConfig) -> EnvFilter {
    let mut directives = vec!["warn".to_string(), "forest_deal=info".to_string()];
    let configured = log.to_filter_string();
    if !configured.is_empty() {
        directives.push(configured);
    }
    EnvFilter::try_new(directives.join(",")).unwrap_or_else(|e| {
        eprintln!("invalid log filters, using defaults: {e}");
        EnvFilter::new("warn,forest_deal=info")
    })
}
