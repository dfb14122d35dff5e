use super::{dashboard, ui};
use crate::core::config::Indicator;
use crate::core::signal::{self, Commentary, CommentaryProvider};
use crate::providers::fetcher::SeriesFetcher;
use anyhow::Result;
use chrono::NaiveDate;

pub fn display_commentary(commentary: &Commentary) -> String {
    let mut output = format!(
        "{} {}\n",
        ui::style_text("Signal:", ui::StyleType::Label),
        ui::signal_light(commentary.signal)
    );
    for section in &commentary.sections {
        output.push('\n');
        output.push_str(section);
        output.push('\n');
    }
    output
}

/// Loads every indicator, asks `provider` for commentary on the summary and prints it.
/// Missing data and failed commentary requests are shown as warnings.
pub async fn run(
    indicators: &[Indicator],
    fetcher: &SeriesFetcher,
    provider: &dyn CommentaryProvider,
    today: NaiveDate,
    default_lookback_days: u32,
) -> Result<()> {
    let cards = dashboard::load_cards(indicators, fetcher, today, default_lookback_days).await;
    if !cards.iter().any(|c| c.is_available()) {
        println!("\n{}", display_warning("No indicator data available to summarize"));
        return Ok(());
    }

    let summary = signal::build_summary(&cards);
    tracing::debug!("Commentary summary:\n{}", summary);

    let pb = ui::new_progress_bar(1);
    pb.set_message("Requesting commentary...");
    let result = provider.comment(&summary).await;
    pb.finish_and_clear();

    match result {
        Ok(text) => {
            let commentary = Commentary::parse(&text);
            println!("\n{}", display_commentary(&commentary));
        }
        Err(e) => {
            tracing::warn!("Commentary request failed: {}", e);
            println!("\n{}", display_warning(&format!("Commentary unavailable: {e}")));
        }
    }
    Ok(())
}

pub fn display_warning(message: &str) -> String {
    format!(
        "{} {}",
        ui::signal_light(None),
        ui::style_text(&format!("⚠ {message}"), ui::StyleType::Warning)
    )
}
