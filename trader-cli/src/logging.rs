//! Operational log
//!
//! The log is an explicit `Dispatch` owned by the session and gateway rather
//! than a process-global subscriber. Work that should be recorded runs under
//! it through `scope` (futures) or `in_scope` (synchronous code).

use std::fmt;
use std::fs::OpenOptions;
use std::future::Future;
use std::path::Path;
use std::sync::Mutex;

use chrono::Local;
use tracing::instrument::WithSubscriber;
use tracing::{Dispatch, Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;
use trader_core::{TraderError, TraderResult};

/// `2026-10-16 09:15:02,417 - INFO - message`
pub struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(
            writer,
            "{} - {} - ",
            Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
            event.metadata().level()
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Handle to the append-only operational log
#[derive(Clone)]
pub struct OperationLog {
    dispatch: Dispatch,
}

impl OperationLog {
    /// Open (or create) `path` for appending
    pub fn open(path: &Path, directive: &str) -> TraderResult<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                TraderError::config(format!("Failed to open log file {}: {}", path.display(), e))
            })?;

        let filter = EnvFilter::try_new(directive).map_err(|e| {
            TraderError::config(format!("Invalid log level '{}': {}", directive, e))
        })?;

        Ok(Self::with_writer(Mutex::new(file), filter))
    }

    /// Build a log over any writer, e.g. an in-memory buffer
    pub fn with_writer<W>(make_writer: W, filter: EnvFilter) -> Self
    where
        W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        let layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(make_writer)
            .event_format(LineFormat);

        let subscriber = tracing_subscriber::registry().with(filter).with(layer);

        Self {
            dispatch: Dispatch::new(subscriber),
        }
    }

    /// Run a future with this log as its subscriber
    pub async fn scope<F: Future>(&self, fut: F) -> F::Output {
        fut.with_subscriber(self.dispatch.clone()).await
    }

    /// Run a closure with this log as its subscriber
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }
}

impl fmt::Debug for OperationLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationLog").finish_non_exhaustive()
    }
}
