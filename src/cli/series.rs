use super::ui;
use crate::core::config::Indicator;
use crate::core::dashboard::{fetch_derived, lookback_start};
use crate::core::period::ChartPeriod;
use crate::core::provider::SeriesSource;
use crate::core::series::TimeSeries;
use crate::core::transform::Transform;
use crate::providers::fetcher::SeriesFetcher;
use anyhow::Result;
use chrono::{Duration, NaiveDate};
use comfy_table::{Cell, CellAlignment};

/// Extra history fetched ahead of the chart window so lagged transforms still cover it.
const LAG_PADDING_DAYS: i64 = 400;

/// Start date wide enough to cover `period` after applying `transform`.
fn fetch_start(
    indicator: &Indicator,
    period: ChartPeriod,
    transform: Transform,
    today: NaiveDate,
    default_lookback_days: u32,
) -> NaiveDate {
    let start = lookback_start(indicator, today, default_lookback_days);
    let Some(window) = period.to_duration() else {
        return start;
    };
    let padding = if transform.lag() > 0 {
        Duration::days(LAG_PADDING_DAYS)
    } else {
        Duration::zero()
    };
    start.min(today - window - padding)
}

pub fn display_series(
    indicator: &Indicator,
    series: &TimeSeries,
    transform: Transform,
    period: ChartPeriod,
    source: &SeriesSource,
) -> String {
    let prec = indicator.precision;
    let mut output = format!(
        "{}\n{}\n\n",
        ui::style_text(&indicator.name, ui::StyleType::Title),
        ui::style_text(
            &format!("{source} · {transform} · {period}"),
            ui::StyleType::Subtle
        )
    );

    if series.is_empty() {
        output.push_str(&ui::style_text(
            "No data points in this period.",
            ui::StyleType::Warning,
        ));
        return output;
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Date"), ui::header_cell("Value")]);
    for obs in series.observations() {
        table.add_row(vec![
            Cell::new(obs.date.to_string()),
            Cell::new(format!("{:.prec$}{}", obs.value, indicator.unit))
                .set_alignment(CellAlignment::Right),
        ]);
    }
    output.push_str(&table.to_string());

    let mut footer = ui::new_styled_table();
    footer.set_header(vec![
        ui::header_cell("Latest"),
        ui::header_cell("Min"),
        ui::header_cell("Max"),
        ui::header_cell("Points"),
    ]);
    let cell = |v: Option<f64>| match v {
        Some(v) => ui::value_cell(v, prec, &indicator.unit),
        None => ui::placeholder_cell(false),
    };
    footer.add_row(vec![
        cell(series.last().map(|o| o.value)),
        cell(series.min_value()),
        cell(series.max_value()),
        Cell::new(series.len()).set_alignment(CellAlignment::Right),
    ]);
    output.push_str("\n\n");
    output.push_str(&footer.to_string());
    output
}

pub async fn run(
    indicator: &Indicator,
    period: ChartPeriod,
    transform: Option<Transform>,
    fetcher: &SeriesFetcher,
    today: NaiveDate,
    default_lookback_days: u32,
) -> Result<()> {
    let transform = transform.unwrap_or(indicator.transform);
    let start = fetch_start(indicator, period, transform, today, default_lookback_days);

    let pb = ui::new_progress_bar(1);
    pb.set_message(format!("Fetching {}...", indicator.name));
    let result = fetch_derived(indicator, fetcher, Some(transform), start).await;
    pb.finish_and_clear();

    match result {
        Ok((derived, source)) => {
            let windowed = period.filter(&derived);
            println!(
                "\n{}",
                display_series(indicator, &windowed, transform, period, &source)
            );
        }
        Err(e) => println!("\n{}", display_unavailable(indicator, &e.to_string())),
    }
    Ok(())
}

/// Warning shown in place of the chart when no source could serve the indicator.
pub fn display_unavailable(indicator: &Indicator, reason: &str) -> String {
    format!(
        "{}\n\n{}",
        ui::style_text(&indicator.name, ui::StyleType::Title),
        ui::style_text(
            &format!("⚠ Data unavailable: {reason}"),
            ui::StyleType::Warning
        )
    )
}
