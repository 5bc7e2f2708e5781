use std::io::{self, Stdout};

use tracing_subscriber::{fmt, layer::Layer, registry::LookupSpan};

use crate::logging::config::{LogFormat, LoggingConfig};

/// Слой форматирования по конфигурации. Возвращается boxed trait-объект,
/// чтобы стереть конкретный тип формата.
pub fn build_formatter_from_config<S>(config: &LoggingConfig) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let writer: fn() -> Stdout = io::stdout;

    match config.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(config.with_target)
            .with_writer(writer)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(config.with_target)
            .with_ansi(config.with_ansi)
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_target(config.with_target)
            .with_ansi(config.with_ansi)
            .with_writer(writer)
            .boxed(),
    }
}
