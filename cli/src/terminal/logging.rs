use colored::*;
use indicatif::ProgressStyle;
use tracing::{Event, Level, Subscriber};
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::fmt::FormatEvent;
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// Events on this target are report output rather than diagnostics.
pub const PRINT_TARGET: &str = "leasecheck::print";

const TICK_STRINGS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

pub struct LeaseFormatter;

impl<S, N> FormatEvent<S, N> for LeaseFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> format::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();

        if meta.target() != PRINT_TARGET {
            let (symbol, color_func): (&str, fn(ColoredString) -> ColoredString) = match *meta.level() {
                Level::TRACE => ("[ ]", |s| s.dimmed()),
                Level::DEBUG => ("[?]", |s| s.blue()),
                Level::INFO => ("[+]", |s| s.green().bold()),
                Level::WARN => ("[*]", |s| s.yellow().bold()),
                Level::ERROR => ("[-]", |s| s.red().bold()),
            };
            write!(writer, "{} ", color_func(symbol.into()))?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.blue} {span_name} {span_fields}")
        .map(|style| style.tick_strings(TICK_STRINGS))
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Installs the subscriber: report output on stdout, diagnostics on stderr
/// and a spinner for every span flagged with `indicatif.pb_show`.
///
/// `RUST_LOG` replaces the verbosity derived from `-v`.
pub fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_else(|_| {
        format!("warn,leasecheck_core={level},leasecheck_cli={level}")
    });
    let filter = EnvFilter::new(format!("{directives},{PRINT_TARGET}=info"));

    let indicatif_layer = IndicatifLayer::new().with_progress_style(spinner_style());

    let report_layer = tracing_subscriber::fmt::layer()
        .event_format(LeaseFormatter)
        .with_writer(indicatif_layer.get_stdout_writer())
        .with_filter(filter_fn(|meta| meta.target() == PRINT_TARGET));
    let diagnostics_layer = tracing_subscriber::fmt::layer()
        .event_format(LeaseFormatter)
        .with_writer(indicatif_layer.get_stderr_writer())
        .with_filter(filter_fn(|meta| meta.target() != PRINT_TARGET));

    tracing_subscriber::registry()
        .with(filter)
        .with(report_layer)
        .with(diagnostics_layer)
        .with(indicatif_layer)
        .init();
}
