//! Reference-range text parser.
//!
//! Recognized notations, tried in order (first match wins):
//! - Bounded: "100-199", "4.0 - 5.6", "Normal: 70–99 mg/dL"
//! - Upper bound only: "<100", "< 5.7", "<=200", "≤200"
//! - Lower bound only: ">60", ">= 40", "≥40"
//!
//! Anything else, including age- or sex-banded text the matchers cannot
//! pick apart, is `Unparsed`.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::EngineConfig;
use crate::models::NormalRange;

/// Tagged result of classifying reference-range text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RangeNotation {
    Bounded { lower: f64, upper: f64 },
    UpperOnly { upper: f64 },
    LowerOnly { lower: f64 },
    Unparsed,
}

impl RangeNotation {
    /// Turn the notation into a numeric interval.
    ///
    /// A lower-bound-only range has no written ceiling, so it is closed at
    /// `max(observed) * headroom`, or `lower * headroom` when nothing was
    /// observed.
    pub fn resolve(self, observed_values: &[f64], headroom: f64) -> Option<NormalRange> {
        match self {
            RangeNotation::Bounded { lower, upper } => Some(NormalRange::new(lower, upper)),
            RangeNotation::UpperOnly { upper } => Some(NormalRange::new(0.0, upper)),
            RangeNotation::LowerOnly { lower } => {
                let ceiling = max_observed(observed_values).unwrap_or(lower);
                Some(NormalRange::new(lower, ceiling * headroom))
            }
            RangeNotation::Unparsed => None,
        }
    }

    pub fn is_parsed(&self) -> bool {
        !matches!(self, RangeNotation::Unparsed)
    }
}

type Matcher = fn(&str) -> Option<RangeNotation>;

/// Matchers in priority order.
const MATCHERS: [(&str, Matcher); 3] = [
    ("bounded", match_bounded),
    ("upper_only", match_upper_only),
    ("lower_only", match_lower_only),
];

/// Parser for free-text reference ranges.
pub struct ReferenceRangeParser<'a> {
    config: &'a EngineConfig,
}

impl<'a> ReferenceRangeParser<'a> {
    /// Create a parser bound to a configuration.
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Classify the notation used by `range_text`.
    pub fn classify(&self, range_text: &str) -> RangeNotation {
        let text = range_text.trim();
        if text.is_empty() || text.eq_ignore_ascii_case(self.config.unspecified_marker.trim()) {
            return RangeNotation::Unparsed;
        }

        for (name, matcher) in MATCHERS {
            if let Some(notation) = matcher(text) {
                trace!(range = text, matcher = name, "reference range matched");
                return notation;
            }
        }

        trace!(range = text, "reference range not recognized");
        RangeNotation::Unparsed
    }

    /// Parse `range_text` into a numeric interval.
    ///
    /// `observed_values` only matter for lower-bound-only ranges. Returns
    /// `None` for empty, unspecified or unrecognized text.
    pub fn parse(&self, range_text: &str, observed_values: &[f64]) -> Option<NormalRange> {
        self.classify(range_text)
            .resolve(observed_values, self.config.lower_bound_headroom)
    }
}

fn match_bounded(text: &str) -> Option<RangeNotation> {
    let mut prev_digit = false;

    for (idx, ch) in text.char_indices() {
        let is_digit = ch.is_ascii_digit();
        if is_digit && !prev_digit {
            if let Some((lower, rest)) = leading_number(&text[idx..]) {
                let upper = rest
                    .trim_start()
                    .strip_prefix(|c: char| c == '-' || c == '–')
                    .and_then(|rest| leading_number(rest.trim_start()));
                if let Some((upper, _)) = upper {
                    return Some(RangeNotation::Bounded { lower, upper });
                }
            }
        }
        prev_digit = is_digit;
    }

    None
}

fn match_upper_only(text: &str) -> Option<RangeNotation> {
    bound_after(text, '<', '≤').map(|upper| RangeNotation::UpperOnly { upper })
}

fn match_lower_only(text: &str) -> Option<RangeNotation> {
    bound_after(text, '>', '≥').map(|lower| RangeNotation::LowerOnly { lower })
}

/// First number following a comparison sign (`<`, `<=`, `≤` and friends).
fn bound_after(text: &str, sign: char, inclusive_sign: char) -> Option<f64> {
    text.char_indices()
        .filter(|(_, ch)| *ch == sign || *ch == inclusive_sign)
        .find_map(|(idx, ch)| {
            let rest = text[idx + ch.len_utf8()..].trim_start();
            let rest = rest.strip_prefix('=').unwrap_or(rest).trim_start();
            leading_number(rest).map(|(value, _)| value)
        })
}

/// Read a non-negative integer or decimal at the start of `text`.
fn leading_number(text: &str) -> Option<(f64, &str)> {
    let int_len = text.bytes().take_while(u8::is_ascii_digit).count();
    if int_len == 0 {
        return None;
    }

    let mut end = int_len;
    if let Some(fraction) = text[int_len..].strip_prefix('.') {
        let frac_len = fraction.bytes().take_while(u8::is_ascii_digit).count();
        if frac_len > 0 {
            end += 1 + frac_len;
        }
    }

    let value = text[..end].parse::<f64>().ok()?;
    Some((value, &text[end..]))
}

fn max_observed(values: &[f64]) -> Option<f64> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
}
