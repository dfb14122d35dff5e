//! Investment signal parsing and commentary abstractions.

use crate::core::dashboard::IndicatorCard;
use crate::core::error::CommentaryError;
use async_trait::async_trait;
use std::fmt::Display;

/// Coarse three-valued outlook parsed out of free-text commentary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Favorable,
    Neutral,
    Unfavorable,
}

impl Signal {
    /// The token the commentary is asked to use for this signal.
    pub fn token(&self) -> &'static str {
        match self {
            Signal::Favorable => "GREEN",
            Signal::Neutral => "YELLOW",
            Signal::Unfavorable => "RED",
        }
    }

    /// Finds the earliest whole-word signal token in `text`.
    pub fn parse(text: &str) -> Option<Signal> {
        [Signal::Favorable, Signal::Neutral, Signal::Unfavorable]
            .into_iter()
            .filter_map(|signal| find_token(text, signal.token()).map(|pos| (pos, signal)))
            .min_by_key(|(pos, _)| *pos)
            .map(|(_, signal)| signal)
    }
}

impl Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token())
    }
}

fn find_token(text: &str, token: &str) -> Option<usize> {
    let is_word = |c: Option<char>| c.is_some_and(|c| c.is_ascii_alphanumeric());
    text.match_indices(token).map(|(pos, _)| pos).find(|&pos| {
        let before = text[..pos].chars().next_back();
        let after = text[pos + token.len()..].chars().next();
        !is_word(before) && !is_word(after)
    })
}

/// Parsed commentary: the signal, the `---` delimited sections, and the raw answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Commentary {
    pub signal: Option<Signal>,
    pub sections: Vec<String>,
    pub raw: String,
}

impl Commentary {
    pub fn parse(text: &str) -> Self {
        let mut sections = Vec::new();
        let mut current = String::new();
        for line in text.lines() {
            if line.trim() == "---" {
                sections.push(std::mem::take(&mut current));
            } else {
                current.push_str(line);
                current.push('\n');
            }
        }
        sections.push(current);

        Self {
            signal: Signal::parse(text),
            sections: sections
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            raw: text.to_string(),
        }
    }
}

/// Renders the latest readings as the plain-text summary sent for commentary.
pub fn build_summary(cards: &[IndicatorCard]) -> String {
    cards
        .iter()
        .map(|card| {
            let ind = &card.indicator;
            let prec = ind.precision;
            match &card.snapshot {
                Some(s) => format!(
                    "- {}: {:.prec$}{} (change {:+.prec$}, as of {})",
                    ind.name, s.latest, ind.unit, s.delta, s.as_of
                ),
                None => format!("- {}: -", ind.name),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// External collaborator that turns a data summary into free-text commentary.
#[async_trait]
pub trait CommentaryProvider: Send + Sync {
    async fn comment(&self, summary: &str) -> Result<String, CommentaryError>;
}
