//! Business rules attached to form fields
//!
//! Rules are soft: a violation raises a blocking alert and moves focus to the
//! offending field, but the value stays in place and nothing is reverted.

use crate::page::Page;
use crate::utils::parse_integer;
use chrono::{NaiveDate, NaiveTime};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Alert and focus `focus` when the start date is after the end date
    DateOrder {
        start: &'static str,
        end: &'static str,
        focus: &'static str,
        message: &'static str,
    },
    /// Copy the start date into the end date for single-day leave types
    MirrorStartDate {
        selector: &'static str,
        single_day_values: &'static [&'static str],
        start: &'static str,
        end: &'static str,
    },
    /// Start time must precede end time by at least `min_hours`
    TimeWindow {
        start: &'static str,
        end: &'static str,
        min_hours: i64,
        order_message: &'static str,
        duration_message: &'static str,
    },
    /// Date order check that also writes the inclusive day count
    InclusivePeriod {
        start: &'static str,
        end: &'static str,
        days: &'static str,
        message: &'static str,
    },
    IntegerRange {
        field: &'static str,
        min: i64,
        max: i64,
        below_message: &'static str,
        above_message: &'static str,
    },
    /// Trimmed text must have at least `min_chars` characters
    MinLength {
        field: &'static str,
        min_chars: usize,
        message: &'static str,
    },
    /// Two filled fields must differ after trimming; focuses `second`
    Distinct {
        first: &'static str,
        second: &'static str,
        message: &'static str,
    },
    /// Strip non-digits in place and alert above `max`
    DigitsWithCeiling {
        field: &'static str,
        max: i64,
        message: &'static str,
    },
    /// Ask for confirmation when a positive amount is below `floor`
    ConfirmBelow {
        field: &'static str,
        floor: i64,
        message: &'static str,
    },
}

pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).ok()
}

pub fn parse_time(text: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(text.trim(), TIME_FORMAT).ok()
}

fn non_empty<'a>(page: &'a Page, id: &str) -> Option<&'a str> {
    page.value_of(id).filter(|value| !value.is_empty())
}

fn date_of(page: &Page, id: &str) -> Option<NaiveDate> {
    non_empty(page, id).and_then(parse_date)
}

fn time_of(page: &Page, id: &str) -> Option<NaiveTime> {
    non_empty(page, id).and_then(parse_time)
}

/// `Some(false)` when both dates parse and the start is after the end
pub fn dates_in_order(page: &Page, start: &str, end: &str) -> Option<bool> {
    Some(date_of(page, start)? <= date_of(page, end)?)
}

/// Whole minutes from start to end, when both times parse
pub fn minutes_between(page: &Page, start: &str, end: &str) -> Option<i64> {
    Some((time_of(page, end)? - time_of(page, start)?).num_minutes())
}

/// Set a field to `value` unless it already has one
pub fn default_if_empty(page: &mut Page, id: &str, value: &str) {
    if page.value_of(id) == Some("") {
        page.document_mut().set_value(id, value);
        log::debug!("Defaulted {} to {}", id, value);
    }
}

/// Set a date field to today's date unless it already has one
pub fn default_to_today(page: &mut Page, id: &str) {
    let today = page.today().format(DATE_FORMAT).to_string();
    default_if_empty(page, id, &today);
}

impl Rule {
    pub fn apply(&self, page: &mut Page) {
        match *self {
            Rule::DateOrder {
                start,
                end,
                focus,
                message,
            } => {
                if dates_in_order(page, start, end) == Some(false) {
                    page.alert(message);
                    page.focus(focus);
                }
            }
            Rule::MirrorStartDate {
                selector,
                single_day_values,
                start,
                end,
            } => {
                let selected = page.value_of(selector).unwrap_or_default();
                if !single_day_values.iter().any(|value| *value == selected) {
                    return;
                }
                if let Some(start_value) = non_empty(page, start).map(str::to_string) {
                    if page.document().contains(end) {
                        page.document_mut().set_value(end, start_value);
                    }
                }
            }
            Rule::TimeWindow {
                start,
                end,
                min_hours,
                order_message,
                duration_message,
            } => {
                let Some(minutes) = minutes_between(page, start, end) else {
                    return;
                };
                if minutes <= 0 {
                    page.alert(order_message);
                    page.focus(start);
                } else if minutes < min_hours * 60 {
                    page.alert(duration_message);
                }
            }
            Rule::InclusivePeriod {
                start,
                end,
                days,
                message,
            } => {
                let (Some(from), Some(to)) = (date_of(page, start), date_of(page, end)) else {
                    return;
                };
                if from > to {
                    page.alert(message);
                    page.focus(start);
                    return;
                }
                let count = (to - from).num_days() + 1;
                page.document_mut().set_value(days, count.to_string());
            }
            Rule::IntegerRange {
                field,
                min,
                max,
                below_message,
                above_message,
            } => {
                let Some(value) = page.value_of(field).and_then(parse_integer) else {
                    return;
                };
                if value > max as f64 {
                    page.alert(above_message);
                    page.focus(field);
                } else if value < min as f64 {
                    page.alert(below_message);
                    page.focus(field);
                }
            }
            Rule::MinLength {
                field,
                min_chars,
                message,
            } => {
                let Some(value) = page.value_of(field) else {
                    return;
                };
                if value.trim().chars().count() < min_chars {
                    page.alert(message);
                    page.focus(field);
                }
            }
            Rule::Distinct {
                first,
                second,
                message,
            } => {
                let (Some(a), Some(b)) = (non_empty(page, first), non_empty(page, second)) else {
                    return;
                };
                if a.trim() == b.trim() {
                    page.alert(message);
                    page.focus(second);
                }
            }
            Rule::DigitsWithCeiling {
                field,
                max,
                message,
            } => {
                let Some(value) = page.value_of(field) else {
                    return;
                };
                let digits: String = value.chars().filter(char::is_ascii_digit).collect();
                if digits != value {
                    page.document_mut().set_value(field, digits.as_str());
                }
                if parse_integer(&digits).is_some_and(|amount| amount > max as f64) {
                    page.alert(message);
                    page.focus(field);
                }
            }
            Rule::ConfirmBelow {
                field,
                floor,
                message,
            } => {
                let Some(amount) = page.value_of(field).and_then(parse_integer) else {
                    return;
                };
                if amount > 0.0 && amount < floor as f64 && !page.confirm(message) {
                    page.focus(field);
                }
            }
        }
    }
}
