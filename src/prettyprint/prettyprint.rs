use tracing::{Event, Subscriber};
use tracing_subscriber::{
    fmt::{
        self,
        format::{Format, FormatEvent, FormatFields, Full, Writer},
        time::{FormatTime, SystemTime},
        FmtContext,
    },
    registry::LookupSpan,
};

/// Event formatter that indents each line by the depth of the span it was
/// emitted in, so nested service calls read as a tree.
pub struct PrettyFormatter<T = SystemTime> {
    inner: Format<Full, T>,
}

impl PrettyFormatter<()> {
    /// Colored, without timestamps or targets. Meant for stderr.
    pub fn terminal() -> Self {
        Self {
            inner: fmt::format()
                .without_time()
                .with_ansi(true)
                .with_target(false)
                .with_level(true)
                .with_source_location(false),
        }
    }
}

impl PrettyFormatter {
    /// Plain text with timestamps, targets and thread ids.
    pub fn log_file() -> Self {
        Self {
            inner: fmt::format()
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_source_location(false),
        }
    }
}

impl<S, N, T> FormatEvent<S, N> for PrettyFormatter<T>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'writer> FormatFields<'writer> + 'static,
    T: FormatTime,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let depth = ctx.event_scope().map(|scope| scope.count()).unwrap_or(0);

        for _ in 1..depth {
            write!(writer, "│  ")?;
        }
        if depth > 0 {
            write!(writer, "└─ ")?;
        }

        self.inner.format_event(ctx, writer, event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(formatter: PrettyFormatter<impl FormatTime + Send + Sync + 'static>) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .event_format(formatter)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("Starting smartfarm CLI");
            let refresh = tracing::info_span!("refresh");
            let _refresh = refresh.enter();
            let load = tracing::info_span!("load_all", worksheet = "Hoja 1");
            let _load = load.enter();
            tracing::info!("Serving 3 records from read cache");
        });

        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_nested_events_are_indented() {
        let output = capture(PrettyFormatter::log_file());
        let lines = output.lines().collect::<Vec<_>>();

        assert_eq!(lines.len(), 2);
        assert!(!lines[0].starts_with(['│', '└']));
        assert!(lines[0].contains("Starting smartfarm CLI"));
        assert!(lines[1].starts_with("│  └─ "));
        assert!(lines[1].contains("Hoja 1"));
        assert!(lines[1].contains("smartfarm_sheets::prettyprint"));
    }

    #[test]
    fn test_terminal_output_has_no_timestamp() {
        let output = capture(PrettyFormatter::terminal());
        let first = output.lines().next().unwrap();
        assert!(!first.starts_with(|c: char| c.is_ascii_digit()));
        assert!(first.contains("Starting smartfarm CLI"));
    }
}
