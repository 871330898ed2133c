use onbeat_domain_score::AnalyzedEvent;
use onbeat_ports::types::Millis;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timing {
    OnTime,
    Late,
    Early,
}

/// The threshold is inclusive: a deviation equal to it is on time.
pub fn classify(deviation_ms: Millis, on_time_threshold_ms: Millis) -> Timing {
    if deviation_ms.abs() <= on_time_threshold_ms {
        Timing::OnTime
    } else if deviation_ms > on_time_threshold_ms {
        Timing::Late
    } else {
        Timing::Early
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingSummary {
    pub on_time: u32,
    pub late: u32,
    pub early: u32,
    pub rejected: u32,
    pub mean_deviation_ms: Millis,
    pub mean_abs_deviation_ms: Millis,
}

impl TimingSummary {
    pub fn from_analyzed(
        analyzed: &[AnalyzedEvent],
        rejected: usize,
        on_time_threshold_ms: Millis,
    ) -> Self {
        let mut summary = TimingSummary {
            rejected: rejected as u32,
            ..Default::default()
        };
        if analyzed.is_empty() {
            return summary;
        }

        let mut sum = 0.0;
        let mut abs_sum = 0.0;
        for event in analyzed {
            let deviation = event.alignment.deviation_ms;
            sum += deviation;
            abs_sum += deviation.abs();
            match classify(deviation, on_time_threshold_ms) {
                Timing::OnTime => summary.on_time += 1,
                Timing::Late => summary.late += 1,
                Timing::Early => summary.early += 1,
            }
        }
        let count = analyzed.len() as f64;
        summary.mean_deviation_ms = sum / count;
        summary.mean_abs_deviation_ms = abs_sum / count;
        summary
    }

    pub fn total(&self) -> u32 {
        self.on_time + self.late + self.early
    }

    pub fn on_time_ratio(&self) -> f32 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.on_time as f32 / total as f32
        }
    }
}
