use anyhow::{Result, bail};
use chrono::Duration;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use stride_core::models::{Metric, MetricDraft, MetricType, MetricUpdate};
use stride_core::validate::parse_date as parse_entry_date;

use super::Session;
use super::helpers::{fmt_opt, no_neg_zero, or_not_found, parse_date, resolve_date};

const MOOD_MIN: f64 = 1.0;
const MOOD_MAX: f64 = 10.0;

/// Mood is entered on a 1-10 scale; out-of-range input is pulled onto it.
fn clamp_mood(metric_type: &str, value: f64) -> f64 {
    if MetricType::parse(metric_type) == Some(MetricType::Mood) && !value.is_nan() {
        let clamped = value.clamp(MOOD_MIN, MOOD_MAX);
        if (clamped - value).abs() > f64::EPSILON {
            eprintln!("Mood {value} clamped to {clamped}");
        }
        clamped
    } else {
        value
    }
}

pub(crate) fn cmd_metric_log(
    session: &mut Session,
    metric_type: String,
    value: f64,
    date: Option<String>,
    allow_future: bool,
    json: bool,
) -> Result<()> {
    let user_id = session.user_id()?;
    let today = session.today();

    let draft = MetricDraft {
        id: None,
        user_id: Some(user_id),
        date: Some(resolve_date(date.as_deref(), today)),
        value: Some(clamp_mood(&metric_type, value)),
        metric_type: Some(metric_type),
        allow_future,
    };
    let metric = session.tracker.log_metric(&draft, today)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&metric)?);
    } else {
        println!(
            "Logged {} = {} on {} [{}]",
            metric.metric_type.as_str(),
            metric.value,
            metric.date,
            metric.id
        );
    }

    Ok(())
}

pub(crate) fn cmd_metric_update(
    session: &mut Session,
    id: &str,
    date: Option<String>,
    value: Option<f64>,
    json: bool,
) -> Result<()> {
    let user_id = session.user_id()?;
    let today = session.today();
    let date = date
        .map(|d| parse_entry_date(&resolve_date(Some(&d), today)))
        .transpose()?;

    let metric = or_not_found(
        session
            .tracker
            .update_metric(&user_id, id, MetricUpdate { date, value }),
        json,
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&metric)?);
    } else {
        println!("Updated metric {}", metric.id);
        print_metrics(std::slice::from_ref(&metric));
    }

    Ok(())
}

pub(crate) fn cmd_metric_delete(session: &mut Session, id: &str, json: bool) -> Result<()> {
    let user_id = session.user_id()?;
    let metric = or_not_found(session.tracker.delete_metric(&user_id, id), json)?;

    if json {
        println!("{}", serde_json::json!({ "deleted": metric.id }));
    } else {
        println!(
            "Deleted {} on {} [{}]",
            metric.metric_type.as_str(),
            metric.date,
            metric.id
        );
    }

    Ok(())
}

pub(crate) fn cmd_metric_summary(
    session: &Session,
    metric_type: &str,
    from: Option<String>,
    to: Option<String>,
    json: bool,
) -> Result<()> {
    let Some(parsed_type) = MetricType::parse(metric_type) else {
        let valid: Vec<&str> = MetricType::ALL.iter().map(|t| t.as_str()).collect();
        bail!(
            "Invalid metric type '{metric_type}'. Must be one of: {}",
            valid.join(", ")
        );
    };
    let user_id = session.user_id()?;
    let today = session.today();
    let end = parse_date(to.as_deref(), today)?;
    let start = match from {
        Some(s) => parse_date(Some(&s), today)?,
        None => end - Duration::days(29),
    };
    let summary = session
        .tracker
        .metric_summary(&user_id, parsed_type, start, end);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "=== {} from {} to {} ===\n",
        summary.metric_type.as_str(),
        summary.start,
        summary.end
    );
    println!("  Count: {}", summary.count);
    println!("  Min:   {}", fmt_opt(summary.min, 2));
    println!("  Max:   {}", fmt_opt(summary.max, 2));
    println!("  Avg:   {}", fmt_opt(summary.avg, 2));
    if !summary.values.is_empty() {
        println!();
        for point in &summary.values {
            println!("  {}  {:>8.2}", point.date, no_neg_zero(point.value));
        }
    }

    Ok(())
}

pub(crate) fn cmd_metric_trend(session: &Session, window: usize, json: bool) -> Result<()> {
    let user_id = session.user_id()?;
    let trend = session.tracker.weight_trend(&user_id, window);

    if json {
        println!("{}", serde_json::to_string_pretty(&trend)?);
        return Ok(());
    }

    if trend.values.is_empty() {
        eprintln!("No weight data. Use `stride metric log weight_kg <kg>` to record your weight.");
        return Ok(());
    }

    let list = |values: &[f64]| {
        values
            .iter()
            .map(|v| format!("{v:.2}"))
            .collect::<Vec<_>>()
            .join(", ")
    };
    println!("Weight values: [{}]", list(&trend.values));
    println!("{}-entry MA:    [{}]", trend.window, list(&trend.moving_average));
    println!("Chart: {}", trend.chart);

    Ok(())
}

pub(super) fn print_metrics(metrics: &[Metric]) {
    #[derive(Tabled)]
    struct MetricRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Type")]
        metric_type: &'static str,
        #[tabled(rename = "Value")]
        value: String,
    }

    let rows: Vec<MetricRow> = metrics
        .iter()
        .map(|m| MetricRow {
            id: m.id.clone(),
            date: m.date.to_string(),
            metric_type: m.metric_type.as_str(),
            value: format!("{:.2}", m.value),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(3..4)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_mood() {
        assert!((clamp_mood("mood", 12.0) - 10.0).abs() < f64::EPSILON);
        assert!((clamp_mood("Mood", 0.0) - 1.0).abs() < f64::EPSILON);
        assert!((clamp_mood("mood", 7.5) - 7.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_clamp_mood_leaves_other_types() {
        assert!(clamp_mood("weight_kg", 0.0).abs() < f64::EPSILON);
        assert!((clamp_mood("sleep_hours", 14.0) - 14.0).abs() < f64::EPSILON);
    }
}
