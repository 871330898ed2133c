use onbeat_domain_eval::{classify, AlignmentOutcome, Timing, TimingSummary};
use onbeat_domain_score::{display_name, ReferenceSet};
use onbeat_ports::types::{Bpm, Millis};
use std::fmt::Write;

pub fn reference_report(reference: &ReferenceSet, bpm: Bpm, rhythm_names: bool) -> String {
    let mut out = String::from("Quantized Midi Info:\n");
    for event in reference.events() {
        let _ = writeln!(
            out,
            "Note: {}, ms: {}",
            display_name(event.pitch, rhythm_names),
            event.start_millis(bpm)
        );
    }
    out
}

pub fn analysis_report(
    outcome: &AlignmentOutcome,
    on_time_threshold_ms: Millis,
    rhythm_names: bool,
) -> String {
    let mut out = String::from("Analysis:\n");
    for analyzed in &outcome.analyzed {
        let deviation = analyzed.alignment.deviation_ms;
        let _ = writeln!(
            out,
            "Note: {}, ms Diff: {} ({})",
            display_name(analyzed.event.pitch, rhythm_names),
            deviation,
            timing_label(classify(deviation, on_time_threshold_ms))
        );
    }
    for rejected in &outcome.rejected {
        let _ = writeln!(out, "Skipped event {}: {}", rejected.index, rejected.reason);
    }

    let summary = TimingSummary::from_analyzed(
        &outcome.analyzed,
        outcome.rejected.len(),
        on_time_threshold_ms,
    );
    out.push_str(&summary_line(&summary));
    out.push('\n');
    out
}

pub fn summary_line(summary: &TimingSummary) -> String {
    format!(
        "On time: {}, Late: {}, Early: {}, Mean deviation: {:.1} ms, Mean |deviation|: {:.1} ms",
        summary.on_time,
        summary.late,
        summary.early,
        summary.mean_deviation_ms,
        summary.mean_abs_deviation_ms
    )
}

pub fn timing_label(timing: Timing) -> &'static str {
    match timing {
        Timing::OnTime => "on time",
        Timing::Late => "late",
        Timing::Early => "early",
    }
}
