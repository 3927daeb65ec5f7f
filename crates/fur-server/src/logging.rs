use std::{fmt::Write as _, io::IsTerminal};

use nu_ansi_term::Color::{Blue, DarkGray, Magenta, Red, Yellow};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    fmt::{
        self,
        format::{FmtSpan, Writer},
        FmtContext, FormatEvent, FormatFields,
    },
    registry::LookupSpan,
    EnvFilter,
};

use crate::cli::Args;

/// Collects the message and the remaining fields as `key=value` pairs.
#[derive(Default)]
struct EventVisitor {
    message: Option<String>,
    fields: String,
}

impl tracing::field::Visit for EventVisitor {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

/// Compact single-line format: a colored level tag (none for INFO), the
/// message and then the event fields.
pub struct CustomFormatter {
    color: bool,
}

impl CustomFormatter {
    fn paint(&self, color: nu_ansi_term::Color, text: &str) -> String {
        if self.color {
            color.paint(text).to_string()
        } else {
            text.to_string()
        }
    }
}

impl<S, N> FormatEvent<S, N> for CustomFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        match *event.metadata().level() {
            Level::TRACE => write!(writer, "{} ", self.paint(Magenta, "[TRACE]")),
            Level::DEBUG => write!(writer, "{} ", self.paint(Blue, "[DEBUG]")),
            Level::INFO => Ok(()),
            Level::WARN => write!(writer, "{} ", self.paint(Yellow, "[WARN]")),
            Level::ERROR => write!(writer, "{} ", self.paint(Red, "[ERROR]")),
        }?;

        write!(writer, "{}", visitor.message.unwrap_or_default())?;
        if !visitor.fields.is_empty() {
            write!(writer, "{}", self.paint(DarkGray, &visitor.fields))?;
        }
        writeln!(writer)
    }
}

/// Picks the filter directive: CLI flags win over the configured level.
fn filter_directive(args: &Args, configured: &str) -> String {
    if args.quiet {
        Level::ERROR.to_string()
    } else if args.verbose >= 2 {
        Level::TRACE.to_string()
    } else if args.verbose == 1 {
        Level::DEBUG.to_string()
    } else {
        configured.to_string()
    }
}

pub fn setup_logging(args: &Args, configured_level: &str, json: bool) {
    let directive = filter_directive(args, configured_level);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|err| {
        eprintln!("'{directive}' is not a valid log filter ({err}); falling back to 'info'");
        EnvFilter::new("info")
    });

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(std::io::stderr)
        .compact()
        .without_time();

    let subscriber: Box<dyn Subscriber + Send + Sync> = if args.json || json {
        Box::new(builder.json().flatten_event(true).finish())
    } else {
        Box::new(
            builder
                .event_format(CustomFormatter {
                    color: std::io::stderr().is_terminal(),
                })
                .finish(),
        )
    };

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("a global tracing subscriber is already installed");
    }
}
