use tracing::{Event, Subscriber};
use tracing_subscriber::{
    fmt::{
        self,
        format::{Format, FormatEvent, FormatFields, Writer},
        FmtContext,
    },
    registry::LookupSpan,
};

/// Event formatter that indents each event by the depth of the span it was emitted in, so a
/// routine's steps read as a tree under the routine span.
pub struct PrettyFormatter {
    inner: Format,
}

impl PrettyFormatter {
    pub fn new(ansi: bool) -> Self {
        Self {
            inner: fmt::format()
                .with_ansi(ansi)
                .with_target(false)
                .with_file(false)
                .with_line_number(false)
                .with_level(true)
                .with_source_location(false),
        }
    }
}

impl<S, N> FormatEvent<S, N> for PrettyFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let depth = ctx.event_scope().map(|scope| scope.count()).unwrap_or(0);

        for _ in 0..depth.saturating_sub(1) {
            write!(writer, "  ")?;
        }

        if depth > 0 {
            write!(writer, "└─")?;
        }

        self.inner.format_event(ctx, writer, event)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    use tracing::{info, info_span};

    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_events_are_indented_by_span_depth() {
        let buffer = SharedBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .event_format(PrettyFormatter::new(false))
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            info!("top");
            info_span!("routine").in_scope(|| {
                info!("step");
                info_span!("ledger").in_scope(|| info!("query"));
            });
        });

        let output = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        let lines = output.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 3);

        assert!(!lines[0].starts_with(' ') && !lines[0].contains("└─"));
        assert!(lines[0].ends_with("top"));
        assert!(lines[1].starts_with("└─"));
        assert!(lines[1].ends_with("step"));
        assert!(lines[2].starts_with("  └─"));
        assert!(lines[2].ends_with("query"));
    }
}
