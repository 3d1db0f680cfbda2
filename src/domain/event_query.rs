use chrono::{DateTime, NaiveDateTime};
use regex::Regex;
use std::sync::OnceLock;

pub const DEFAULT_PAGE_SIZE: u32 = 12;
pub const MAX_PAGE_SIZE: u32 = 50;

const DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.fZ"];

/// Raw query string of `GET /api/events`. Every field is kept as text so a bad
/// value never fails the extractor; [`EventQuery`] decides what survives.
#[derive(Debug, Default)]
pub struct EventSearchParameters {
    pub size: Option<String>,
    pub page: Option<String>,
    pub segment_id: Option<String>,
    pub keyword: Option<String>,
    pub start_date_time: Option<String>,
    pub end_date_time: Option<String>,
    pub price_range: Option<String>,
}

/// Sanitised event search. Invalid optional filters are dropped, never rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    pub size: u32,
    /// Zero based, as seen by our callers.
    pub page: u32,
    pub segment_id: Option<String>,
    pub keyword: Option<String>,
    pub start_date_time: Option<String>,
    pub end_date_time: Option<String>,
    pub price_range: Option<String>,
}

/// Built from the decoded query pairs. The first occurrence of a repeated key
/// wins and unknown keys are ignored.
impl FromIterator<(String, String)> for EventSearchParameters {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(pairs: I) -> Self {
        let mut parameters = EventSearchParameters::default();

        for (key, value) in pairs {
            let slot = match key.as_str() {
                "size" => &mut parameters.size,
                "page" => &mut parameters.page,
                "segmentId" => &mut parameters.segment_id,
                "keyword" => &mut parameters.keyword,
                "startDateTime" => &mut parameters.start_date_time,
                "endDateTime" => &mut parameters.end_date_time,
                "priceRange" => &mut parameters.price_range,
                _ => continue,
            };

            if slot.is_none() {
                *slot = Some(value);
            }
        }

        parameters
    }
}

impl Default for EventQuery {
    fn default() -> Self {
        EventSearchParameters::default().into()
    }
}

impl From<EventSearchParameters> for EventQuery {
    fn from(parameters: EventSearchParameters) -> Self {
        EventQuery {
            size: parse_size(parameters.size.as_deref()),
            page: parse_page(parameters.page.as_deref()),
            segment_id: parameters.segment_id.filter(|id| segment_id_pattern().is_match(id)),
            keyword: parameters.keyword.as_deref().and_then(sanitize_keyword),
            start_date_time: parameters.start_date_time.filter(|value| is_date_time(value)),
            end_date_time: parameters.end_date_time.filter(|value| is_date_time(value)),
            price_range: parameters
                .price_range
                .filter(|range| price_range_pattern().is_match(range)),
        }
    }
}

fn parse_size(size: Option<&str>) -> u32 {
    match size.map(|size| size.trim().parse::<i64>()) {
        Some(Ok(size)) => size.clamp(1, i64::from(MAX_PAGE_SIZE)) as u32,
        _ => DEFAULT_PAGE_SIZE,
    }
}

fn parse_page(page: Option<&str>) -> u32 {
    match page.map(|page| page.trim().parse::<i64>()) {
        Some(Ok(page)) => page.clamp(0, i64::from(u32::MAX)) as u32,
        _ => 0,
    }
}

fn sanitize_keyword(keyword: &str) -> Option<String> {
    let keyword: String = keyword.chars().filter(|c| !matches!(c, '<' | '>')).collect();
    let keyword = keyword.trim();

    if keyword.is_empty() {
        None
    } else {
        Some(keyword.to_string())
    }
}

fn is_date_time(value: &str) -> bool {
    if !date_time_prefix_pattern().is_match(value) {
        return false;
    }

    DateTime::parse_from_rfc3339(value).is_ok()
        || DATE_TIME_FORMATS
            .iter()
            .any(|format| NaiveDateTime::parse_from_str(value, format).is_ok())
}

fn segment_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9]+$").expect("invalid segment id pattern"))
}

fn price_range_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]+-[0-9]+$").expect("invalid price range pattern"))
}

fn date_time_prefix_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}")
            .expect("invalid date time pattern")
    })
}
