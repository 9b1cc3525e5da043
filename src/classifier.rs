//! Query Classifier
//!
//! Classifies user queries as either:
//! - Currency: exchange rates, conversions, monetary units ("USD to KRW today")
//! - Country: facts, weather and holidays ("What's the capital of France?")
//!
//! and extracts the arguments each orchestrator needs. This is the default
//! directive source when no external reasoning engine is in the loop.

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryDomain {
    Country,
    Currency,
}

/// Currency arguments found in a query; unset sides take configured defaults
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrencyMention {
    pub from: Option<String>,
    pub to: Option<String>,
    pub date: Option<String>,
}

/// Static keyword lists, zero allocation
const CURRENCY_PHRASES: &[&str] = &[
    "exchange rate", "exchange rates", "rate of exchange",
    "conversion rate", "monetary unit",
];

/// Price questions only count as currency questions when a code is present
const PRICE_PHRASES: &[&str] = &["how much is", "how much are", "how much would"];

const CURRENCY_WORDS: &[&str] = &[
    "currency", "currencies", "exchange", "convert", "conversion",
    "forex", "fx", "monetary", "money",
];

const HOLIDAY_WORDS: &[&str] = &[
    "holiday", "holidays", "festival", "festivals", "bayram",
];

const HOLIDAY_PHRASES: &[&str] = &["day off", "days off", "bank holiday", "public holiday"];

/// Currencies quoted by the rate provider
const CURRENCY_CODES: &[&str] = &[
    "AUD", "BGN", "BRL", "CAD", "CHF", "CNY", "CZK", "DKK", "EUR", "GBP",
    "HKD", "HUF", "IDR", "ILS", "INR", "ISK", "JPY", "KRW", "MXN", "MYR",
    "NOK", "NZD", "PHP", "PLN", "RON", "SEK", "SGD", "THB", "TRY", "USD",
    "ZAR",
];

/// Codes that are also English words only count when written upper case
const AMBIGUOUS_CODES: &[&str] = &["TRY", "PHP", "NOK", "RON"];

const COUNTRY_MARKERS: &[&str] = &[" of ", " in ", " for ", " about ", " to ", " visit "];

const TRAILING_PHRASES: &[&str] = &[
    "this year", "next year", "last year", "this week", "next week",
    "this month", "next month", "right now", "today", "tomorrow", "now",
    "please", "currently",
];

const TRAILING_CONNECTORS: &[&str] = &["in", "for", "of", "during", "on", "at", "the"];

/// Query classifier
pub struct QueryClassifier;

impl QueryClassifier {
    /// Classify a query as currency-only or country-domain
    pub fn classify(query: &str) -> QueryDomain {
        let lowered = query.to_lowercase();
        let words = tokenize(&lowered);

        let phrase_hit = CURRENCY_PHRASES.iter().any(|p| lowered.contains(p));
        let word_hit = words.iter().any(|w| CURRENCY_WORDS.contains(&w.as_str()));
        let code_count = currency_codes(query).len();
        let price_hit = code_count >= 1 && PRICE_PHRASES.iter().any(|p| lowered.contains(p));

        if phrase_hit || word_hit || price_hit || code_count >= 2 {
            QueryDomain::Currency
        } else {
            QueryDomain::Country
        }
    }

    /// Did the user explicitly ask about holidays?
    pub fn wants_holidays(query: &str) -> bool {
        let lowered = query.to_lowercase();
        HOLIDAY_PHRASES.iter().any(|p| lowered.contains(p))
            || tokenize(&lowered)
                .iter()
                .any(|w| HOLIDAY_WORDS.contains(&w.as_str()))
    }

    /// Best-effort country name: the text after the last location marker
    pub fn country_name(query: &str) -> String {
        let text = strip_noise(query);
        let candidate = marker_tail(&text).unwrap_or_else(|| strip_leading_article(&text));
        if candidate.is_empty() {
            query.trim().to_string()
        } else {
            candidate
        }
    }

    /// Country named after a location marker ("currency of Japan"), if any
    pub fn named_country(query: &str) -> Option<String> {
        marker_tail(&strip_noise(query)).filter(|name| !name.is_empty())
    }

    /// Currency pair and optional ISO date mentioned in a query
    pub fn currency_mention(query: &str) -> CurrencyMention {
        let mut mention = CurrencyMention {
            date: iso_date(query),
            ..Default::default()
        };

        let codes = currency_codes(query);
        match codes.as_slice() {
            [] => {}
            [(code, preceded_by_target_marker)] => {
                if *preceded_by_target_marker {
                    mention.to = Some(code.clone());
                } else {
                    mention.from = Some(code.clone());
                }
            }
            [(first, _), (second, _), ..] => {
                mention.from = Some(first.clone());
                mention.to = Some(second.clone());
            }
        }

        mention
    }
}

/// Lower-cased alphanumeric words
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Currency codes in order of appearance, each flagged if it follows to/in/into
fn currency_codes(query: &str) -> Vec<(String, bool)> {
    let raw_words: Vec<&str> = query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    let mut found = Vec::new();
    for (i, word) in raw_words.iter().enumerate() {
        if word.len() != 3 {
            continue;
        }
        let upper = word.to_uppercase();
        if !CURRENCY_CODES.contains(&upper.as_str()) {
            continue;
        }
        if AMBIGUOUS_CODES.contains(&upper.as_str()) && *word != upper {
            continue;
        }
        let after_target_marker = i > 0
            && matches!(
                raw_words[i - 1].to_lowercase().as_str(),
                "to" | "in" | "into"
            );
        if !found.iter().any(|(code, _): &(String, bool)| *code == upper) {
            found.push((upper, after_target_marker));
        }
    }
    found
}

fn iso_date(query: &str) -> Option<String> {
    query
        .split(|c: char| c.is_whitespace() || matches!(c, ',' | '?' | '!' | '(' | ')'))
        .map(|w| w.trim_end_matches('.'))
        .find(|w| NaiveDate::parse_from_str(w, "%Y-%m-%d").is_ok())
        .map(str::to_string)
}

fn strip_noise(query: &str) -> String {
    let mut text = strip_punctuation(query).to_string();
    loop {
        let stripped = strip_trailing_noise(&text);
        if stripped == text {
            return text;
        }
        text = stripped;
    }
}

/// Text after the last location marker, leading article removed
fn marker_tail(text: &str) -> Option<String> {
    // ASCII folding keeps byte offsets aligned with `text`
    let padded = format!(" {} ", text.to_ascii_lowercase());
    let cut = COUNTRY_MARKERS
        .iter()
        .filter_map(|m| padded.rfind(m).map(|pos| pos + m.len()))
        .max()?;

    // `padded` carries one leading space relative to `text`
    let tail = text.get((cut - 1).min(text.len())..)?.trim();
    Some(strip_leading_article(tail))
}

fn strip_punctuation(text: &str) -> &str {
    text.trim()
        .trim_end_matches(|c: char| matches!(c, '?' | '!' | '.' | ',' | ';' | ':'))
        .trim()
}

/// Drop one trailing time phrase, 4-digit year, or dangling connector
fn strip_trailing_noise(text: &str) -> String {
    let trimmed = text.trim_end().trim_end_matches(',').trim_end();
    let lowered = trimmed.to_ascii_lowercase();

    for phrase in TRAILING_PHRASES {
        if lowered == *phrase {
            return String::new();
        }
        if lowered.ends_with(&format!(" {}", phrase)) {
            if let Some(head) = trimmed.get(..trimmed.len() - phrase.len()) {
                return head.trim_end().to_string();
            }
        }
    }

    if let Some((head, last)) = trimmed.rsplit_once(' ') {
        let is_year = last.len() == 4 && last.chars().all(|c| c.is_ascii_digit());
        let is_connector = TRAILING_CONNECTORS.contains(&last.to_lowercase().as_str());
        if is_year || is_connector {
            return head.trim_end().to_string();
        }
    }

    trimmed.to_string()
}

fn strip_leading_article(text: &str) -> String {
    let text = text.trim();
    match text.get(..4) {
        Some(prefix) if prefix.eq_ignore_ascii_case("the ") => text[4..].trim().to_string(),
        _ => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_queries() {
        let cases = vec![
            "Exchange rate USD to KRW today",
            "What is the currency of Japan?",
            "How much is 1 USD in EUR?",
            "convert 100 GBP",
            "EUR JPY",
        ];

        for c in cases {
            assert_eq!(
                QueryClassifier::classify(c),
                QueryDomain::Currency,
                "query: {}",
                c
            );
        }
    }

    #[test]
    fn test_country_queries() {
        let cases = vec![
            "What's the capital of France?",
            "Holidays in Turkey this year",
            "Capital of Atlantis",
            "What's the weather like in Japan?",
            "I want to try visiting Peru",
            "How much is a hotel in France?",
        ];

        for c in cases {
            assert_eq!(
                QueryClassifier::classify(c),
                QueryDomain::Country,
                "query: {}",
                c
            );
        }
    }

    #[test]
    fn test_holiday_intent() {
        assert!(QueryClassifier::wants_holidays("Holidays in Turkey this year"));
        assert!(QueryClassifier::wants_holidays("Any public holiday in Korea?"));
        assert!(!QueryClassifier::wants_holidays("What's the capital of France?"));
    }

    #[test]
    fn test_country_name_extraction() {
        let cases = vec![
            ("What's the capital of France?", "France"),
            ("Holidays in Turkey this year", "Turkey"),
            ("Capital of Atlantis", "Atlantis"),
            ("Tell me about South Korea", "South Korea"),
            ("Public holidays in the United States in 2025", "United States"),
            ("Germany", "Germany"),
            ("Flying from İzmir, what's the capital of Greece?", "Greece"),
            ("Weather in Ωmega land for Österreich", "Österreich"),
        ];

        for (query, expected) in cases {
            assert_eq!(QueryClassifier::country_name(query), expected, "query: {}", query);
        }
    }

    #[test]
    fn test_price_question_needs_a_code() {
        assert_eq!(
            QueryClassifier::classify("How much is 1 USD?"),
            QueryDomain::Currency
        );
        assert_eq!(
            QueryClassifier::classify("How much is a hotel in France?"),
            QueryDomain::Country
        );
    }

    #[test]
    fn test_named_country() {
        assert_eq!(
            QueryClassifier::named_country("What is the currency of Japan?").as_deref(),
            Some("Japan")
        );
        assert_eq!(QueryClassifier::named_country("convert 100 GBP"), None);
    }

    #[test]
    fn test_currency_mention() {
        let mention = QueryClassifier::currency_mention("Exchange rate USD to KRW today");
        assert_eq!(mention.from.as_deref(), Some("USD"));
        assert_eq!(mention.to.as_deref(), Some("KRW"));
        assert_eq!(mention.date, None);

        let historical =
            QueryClassifier::currency_mention("What was EUR to TRY on 2023-01-15?");
        assert_eq!(historical.from.as_deref(), Some("EUR"));
        assert_eq!(historical.to.as_deref(), Some("TRY"));
        assert_eq!(historical.date.as_deref(), Some("2023-01-15"));

        let target_only = QueryClassifier::currency_mention("What is 1 dollar in JPY?");
        assert_eq!(target_only.from, None);
        assert_eq!(target_only.to.as_deref(), Some("JPY"));
    }

    #[test]
    fn test_ambiguous_codes_need_upper_case() {
        let mention = QueryClassifier::currency_mention("try usd to eur");
        assert_eq!(mention.from.as_deref(), Some("USD"));
        assert_eq!(mention.to.as_deref(), Some("EUR"));
    }
}
