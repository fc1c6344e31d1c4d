//! Textual emission of step records.
//!
//! Three formats are supported, all consumed by external reporting scripts that parse the text with regular
//! expressions. Decimal formatting is therefore part of the contract:
//!
//! * [`TraceFormat::Trace`] prints each step with three-decimal timestamps, one line per set.
//! * [`TraceFormat::ExecutionOrder`] lists executed events with full-precision timestamps.
//! * [`TraceFormat::Report`] prints one row per step with timestamps truncated, never rounded, to two decimals.

use crate::classifier::DependencyClass;
use crate::events::Event;
use crate::simulation::{RunSummary, StepRecord};

use std::io::{self, Write};

/// Output layout selected for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraceFormat {
    /// Full per-step trace with every classification set.
    #[default]
    Trace,
    /// In-order execution sequence, one executed event per line.
    ExecutionOrder,
    /// Compact per-step rows with truncated timestamps.
    Report,
}

/// Decimal places of reporting output.
pub const REPORT_PRECISION: usize = 2;

/// Render an event as a trace tuple: `('1.637', 'Arrive', 1)`.
pub fn trace_tuple(event: &Event) -> String {
    format!("('{}', '{}', {})", event.timestamp, event.kind, event.station)
}

/// Render events as a bracketed, comma-separated list of trace tuples.
pub fn trace_list(events: &[Event]) -> String {
    let tuples: Vec<String> = events.iter().map(trace_tuple).collect();
    format!("[{}]", tuples.join(", "))
}

/// Render an event for reporting: `(1-A, 1.63)`.
pub fn report_tuple(event: &Event) -> String {
    format!(
        "({}-{}, {})",
        event.station,
        event.kind.initial(),
        event.timestamp.truncated(REPORT_PRECISION)
    )
}

/// The header line of the execution-order format.
pub const EXECUTION_ORDER_HEADER: &str = "event_sequence_num, timestamp, event_type";

/// Writes step records in one of the [`TraceFormat`] layouts.
#[derive(Debug)]
pub struct TraceWriter<W>
where
    W: Write,
{
    out: W,
    format: TraceFormat,
}

impl<W> TraceWriter<W>
where
    W: Write,
{
    /// Wrap `out`. Writes the execution-order header immediately when that format is selected.
    ///
    /// # Errors
    ///
    /// Forwards any I/O error from `out`.
    pub fn new(mut out: W, format: TraceFormat) -> io::Result<Self> {
        if format == TraceFormat::ExecutionOrder {
            writeln!(out, "{EXECUTION_ORDER_HEADER}")?;
        }
        Ok(Self { out, format })
    }

    /// Write one step.
    ///
    /// # Errors
    ///
    /// Forwards any I/O error from the underlying writer.
    pub fn write_step(&mut self, record: &StepRecord) -> io::Result<()> {
        match self.format {
            TraceFormat::Trace => self.write_trace(record),
            TraceFormat::ExecutionOrder => self.write_execution_order(record),
            TraceFormat::Report => self.write_report(record),
        }
    }

    fn write_trace(&mut self, record: &StepRecord) -> io::Result<()> {
        let classification = &record.classification;
        writeln!(
            self.out,
            "i: {}, Time: {}, Event: {} {}, Queue: {:?}, Processing Units: {:?}",
            record.iteration,
            record.executed.timestamp,
            record.executed.kind,
            record.executed.station,
            record.queue_lengths,
            record.free_units,
        )?;
        writeln!(self.out, "Sorted Events: {}", trace_list(record.pending()))?;
        writeln!(
            self.out,
            "EC - Direct Dependencies (D): {}",
            trace_list(&classification.of_class(DependencyClass::Direct))
        )?;
        writeln!(
            self.out,
            "EC - Indirect Dependencies (I): {}",
            trace_list(&classification.of_class(DependencyClass::Indirect))
        )?;
        writeln!(
            self.out,
            "Independent Events (R): {}",
            trace_list(&classification.of_class(DependencyClass::Independent))
        )?;
        writeln!(self.out)
    }

    fn write_execution_order(&mut self, record: &StepRecord) -> io::Result<()> {
        let executed = &record.executed;
        writeln!(
            self.out,
            "{}, {:?}, {}-{}",
            record.iteration,
            executed.timestamp.value(),
            executed.station,
            executed.kind
        )
    }

    fn write_report(&mut self, record: &StepRecord) -> io::Result<()> {
        let pending: Vec<String> = record.pending().iter().map(report_tuple).collect();
        let ready: Vec<String> = record.classification.ready().iter().map(report_tuple).collect();
        writeln!(
            self.out,
            "{} & {} & {} & {}",
            record.iteration,
            record.executed.timestamp.truncated(REPORT_PRECISION),
            pending.join(", "),
            ready.join(", ")
        )
    }

    /// Write the end-of-run line, then flush.
    ///
    /// Only the trace format carries a footer: the total number of Indirect classifications.
    ///
    /// # Errors
    ///
    /// Forwards any I/O error from the underlying writer.
    pub fn finish(mut self, summary: &RunSummary) -> io::Result<W> {
        if self.format == TraceFormat::Trace {
            writeln!(self.out, "{}", summary.indirect_total)?;
        }
        self.out.flush()?;
        Ok(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{Classifier, LookaheadBounds};
    use crate::events::EventKind;
    use crate::simulation::HaltReason;
    use crate::Timestamp;

    fn event(time: f64, kind: EventKind, station: usize) -> Event {
        Event::new(Timestamp::new(time).unwrap(), kind, station)
    }

    fn record() -> StepRecord {
        let pending = [event(0.0, EventKind::Process, 1), event(1.6374, EventKind::Arrive, 1)];
        StepRecord {
            iteration: 0,
            executed: event(0.0, EventKind::Arrive, 1),
            free_units: vec![0, 1, 1, 1],
            queue_lengths: vec![0, 0, 0, 0],
            classification: Classifier::new(LookaheadBounds::new(2.0, 0.1)).classify(&pending),
        }
    }

    fn summary() -> RunSummary {
        RunSummary {
            steps: 1,
            halt_reason: HaltReason::IterationBudget,
            final_time: Timestamp::new(0.0).unwrap(),
            indirect_total: 0,
        }
    }

    fn render(format: TraceFormat) -> String {
        let mut writer = TraceWriter::new(Vec::new(), format).unwrap();
        writer.write_step(&record()).unwrap();
        String::from_utf8(writer.finish(&summary()).unwrap()).unwrap()
    }

    #[test]
    fn trace_layout() {
        let expected = "\
i: 0, Time: 0.000, Event: Arrive 1, Queue: [0, 0, 0, 0], Processing Units: [0, 1, 1, 1]
Sorted Events: [('0.000', 'Process', 1), ('1.637', 'Arrive', 1)]
EC - Direct Dependencies (D): [('1.637', 'Arrive', 1)]
EC - Indirect Dependencies (I): []
Independent Events (R): [('0.000', 'Process', 1)]

0
";
        assert_eq!(expected, render(TraceFormat::Trace));
    }

    #[test]
    fn execution_order_layout() {
        let expected = "event_sequence_num, timestamp, event_type\n0, 0.0, 1-Arrive\n";
        assert_eq!(expected, render(TraceFormat::ExecutionOrder));
    }

    #[test]
    fn report_layout_truncates() {
        let expected = "0 & 0.00 & (1-P, 0.00), (1-A, 1.63) & (1-P, 0.00)\n";
        assert_eq!(expected, render(TraceFormat::Report));
    }
}
