use super::ui;
use crate::core::config::Indicator;
use crate::core::dashboard::{self, IndicatorCard};
use crate::providers::fetcher::SeriesFetcher;
use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::Cell;
use std::collections::BTreeMap;

/// Renders one group of cards as a table, followed by a warning line per failed card.
pub fn display_cards(title: &str, cards: &[&IndicatorCard]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Indicator"),
        ui::header_cell("Latest"),
        ui::header_cell("Change"),
        ui::header_cell("As of"),
        ui::header_cell("Source"),
    ]);

    let mut warnings = Vec::new();
    for card in cards {
        let ind = &card.indicator;
        let name = if ind.transform.lag() > 0 {
            format!("{} ({})", ind.name, ind.transform)
        } else {
            ind.name.clone()
        };

        match &card.snapshot {
            Some(s) => table.add_row(vec![
                Cell::new(name),
                ui::value_cell(s.latest, ind.precision, &ind.unit),
                ui::delta_cell(s.delta, ind.precision),
                Cell::new(s.as_of.to_string()),
                Cell::new(card.source.as_ref().map_or("-".to_string(), |s| s.to_string())),
            ]),
            None => table.add_row(vec![
                Cell::new(name),
                ui::placeholder_cell(card.error.is_some()),
                ui::placeholder_cell(card.error.is_some()),
                ui::placeholder_cell(false),
                ui::placeholder_cell(false),
            ]),
        };

        if let Some(e) = &card.error {
            warnings.push(format!("⚠ {}: {}", ind.name, e));
        }
    }

    let mut output = format!("{}\n\n", ui::style_text(title, ui::StyleType::Title));
    output.push_str(&table.to_string());
    for warning in warnings {
        output.push('\n');
        output.push_str(&ui::style_text(&warning, ui::StyleType::Warning));
    }
    output
}

/// Groups cards by their configured group, keeping configuration order inside each group.
fn group_cards(cards: &[IndicatorCard]) -> BTreeMap<String, Vec<&IndicatorCard>> {
    let mut groups: BTreeMap<String, Vec<&IndicatorCard>> = BTreeMap::new();
    for card in cards {
        let group = card
            .indicator
            .group
            .clone()
            .unwrap_or_else(|| "other".to_string());
        groups.entry(group).or_default().push(card);
    }
    groups
}

/// Loads the selected indicators behind a progress bar.
pub async fn load_cards(
    indicators: &[Indicator],
    fetcher: &SeriesFetcher,
    today: NaiveDate,
    default_lookback_days: u32,
) -> Vec<IndicatorCard> {
    let pb = ui::new_progress_bar(indicators.len() as u64);
    pb.set_message("Fetching indicators...");
    let on_done = || pb.inc(1);
    let cards =
        dashboard::load_indicators(indicators, fetcher, today, default_lookback_days, &on_done)
            .await;
    pb.finish_and_clear();
    cards
}

pub async fn run(
    indicators: &[Indicator],
    group: Option<&str>,
    fetcher: &SeriesFetcher,
    today: NaiveDate,
    default_lookback_days: u32,
) -> Result<()> {
    let selected: Vec<Indicator> = indicators
        .iter()
        .filter(|i| group.is_none_or(|g| i.group.as_deref() == Some(g)))
        .cloned()
        .collect();

    if selected.is_empty() {
        match group {
            Some(g) => println!("No indicators configured in group '{g}'."),
            None => println!("No indicators configured."),
        }
        return Ok(());
    }

    let cards = load_cards(&selected, fetcher, today, default_lookback_days).await;

    let groups = group_cards(&cards);
    let num_groups = groups.len();
    for (i, (name, group_cards)) in groups.iter().enumerate() {
        println!("\n{}", display_cards(name, group_cards));
        if i < num_groups - 1 {
            ui::print_separator();
        }
    }

    let available = cards.iter().filter(|c| c.is_available()).count();
    println!(
        "\n{}",
        ui::style_text(
            &format!("{available}/{} indicators loaded", cards.len()),
            ui::StyleType::Subtle
        )
    );
    Ok(())
}
