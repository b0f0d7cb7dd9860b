use chrono::{Duration, NaiveDate};

use crate::models::{Goal, GoalProgress, Metric, MetricPoint, MetricSummary, MetricType, round_dp};

/// Days of weight history used for the goal projection slope.
pub const PROJECTION_WINDOW_DAYS: i64 = 14;

const SPARK_BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Count, min, max, and average of one metric type over `start..=end`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn metric_summary(
    metrics: &[Metric],
    user_id: &str,
    metric_type: MetricType,
    start: NaiveDate,
    end: NaiveDate,
) -> MetricSummary {
    let mut values: Vec<MetricPoint> = metrics
        .iter()
        .filter(|m| {
            m.user_id == user_id && m.metric_type == metric_type && m.date >= start && m.date <= end
        })
        .map(|m| MetricPoint {
            date: m.date,
            value: m.value,
        })
        .collect();
    values.sort_by_key(|p| p.date);

    let (min, max, avg) = if values.is_empty() {
        (None, None, None)
    } else {
        let min = values.iter().map(|p| p.value).fold(f64::INFINITY, f64::min);
        let max = values
            .iter()
            .map(|p| p.value)
            .fold(f64::NEG_INFINITY, f64::max);
        let avg = values.iter().map(|p| p.value).sum::<f64>() / values.len() as f64;
        (
            Some(round_dp(min, 2)),
            Some(round_dp(max, 2)),
            Some(round_dp(avg, 2)),
        )
    };

    MetricSummary {
        metric_type,
        start,
        end,
        count: values.len(),
        min,
        max,
        avg,
        values,
    }
}

/// Trailing moving average. Early points average over the samples available so far.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    if window <= 1 {
        return values.to_vec();
    }
    (0..values.len())
        .map(|i| {
            let chunk = &values[(i + 1).saturating_sub(window)..=i];
            chunk.iter().sum::<f64>() / chunk.len() as f64
        })
        .collect()
}

/// A user's weight metrics as `(date, kg)`, oldest first.
#[must_use]
pub fn weight_series(metrics: &[Metric], user_id: &str) -> Vec<(NaiveDate, f64)> {
    let mut weights: Vec<(NaiveDate, f64)> = metrics
        .iter()
        .filter(|m| m.user_id == user_id && m.metric_type == MetricType::WeightKg)
        .map(|m| (m.date, m.value))
        .collect();
    weights.sort_by_key(|&(d, _)| d);
    weights
}

/// Progress toward a weight goal, with a projected completion date when the recent
/// trend is heading toward the target.
///
/// `weights` must be sorted by date.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn goal_progress(goal: &Goal, weights: &[(NaiveDate, f64)]) -> GoalProgress {
    let goal_type = goal.goal_type;

    let (Some(&(_, start)), Some(&(current_date, current))) = (weights.first(), weights.last())
    else {
        return GoalProgress::NoData { goal_type };
    };

    let target = match goal.target_weight_kg {
        Some(t) if goal_type.is_weight_based() && t != 0.0 => t,
        _ => return GoalProgress::NotApplicable { goal_type },
    };

    let total_needed = (target - start).abs();
    let done = (current - start).abs();
    let progress = if total_needed > 0.0 {
        done / total_needed * 100.0
    } else {
        100.0
    };

    let window_start = current_date - Duration::days(PROJECTION_WINDOW_DAYS);
    let recent: Vec<&(NaiveDate, f64)> = weights
        .iter()
        .filter(|(d, _)| *d >= window_start)
        .collect();
    let daily = match (recent.first(), recent.last()) {
        (Some(first), Some(last)) if recent.len() >= 2 => {
            let days = (last.0 - first.0).num_days().max(1);
            (last.1 - first.1) / days as f64
        }
        _ => 0.0,
    };

    let remaining = target - current;
    let projected_end_date = if daily != 0.0
        && remaining != 0.0
        && remaining.signum() == daily.signum()
    {
        let days_needed = (remaining / daily).abs().trunc() as i64;
        Some(current_date + Duration::days(days_needed))
    } else {
        None
    };

    GoalProgress::Tracking {
        goal_type,
        start_weight_kg: round_dp(start, 2),
        current_weight_kg: round_dp(current, 2),
        target_weight_kg: round_dp(target, 2),
        progress_pct: round_dp(progress.clamp(0.0, 100.0), 1),
        projected_end_date,
    }
}

/// Render a series as a one-line block chart scaled between its min and max.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_sign_loss)]
pub fn sparkline(values: &[f64]) -> String {
    if values.is_empty() {
        return "(no data)".to_string();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if (max - min).abs() < f64::EPSILON {
        return SPARK_BLOCKS[0].to_string().repeat(values.len());
    }
    let top = (SPARK_BLOCKS.len() - 1) as f64;
    values
        .iter()
        .map(|v| SPARK_BLOCKS[((v - min) / (max - min) * top) as usize])
        .collect()
}
