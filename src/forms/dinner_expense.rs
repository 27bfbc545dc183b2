use super::FormHooks;
use crate::page::{Action, EventKind, Page};
use crate::rules::{self, Rule};
use crate::utils::parse_number;

/// Overtime shorter than this does not qualify for a dinner allowance
pub const MIN_OVERTIME_HOURS: i64 = 6;
pub const DEFAULT_MEAL_AMOUNT: &str = "10000";

const WORK_DATE: &str = "work_date";
const START_TIME: &str = "work_start_time";
const END_TIME: &str = "work_end_time";
const MEAL_AMOUNT: &str = "meal_amount";

const WORK_WINDOW: Rule = Rule::TimeWindow {
    start: START_TIME,
    end: END_TIME,
    min_hours: MIN_OVERTIME_HOURS,
    order_message: "The start time cannot be later than the end time.",
    duration_message: "Dinner allowance requires at least 6 hours of overtime.",
};

#[derive(Debug, Clone, Copy, Default)]
pub struct DinnerExpenseHooks;

impl FormHooks for DinnerExpenseHooks {
    fn on_after_init(&self, page: &mut Page) {
        if page.document().contains(START_TIME) && page.document().contains(END_TIME) {
            page.listen(START_TIME, EventKind::Change, Action::Rule(WORK_WINDOW));
            page.listen(END_TIME, EventKind::Change, Action::Rule(WORK_WINDOW));
        }
        rules::default_to_today(page, WORK_DATE);
        // The total mirror has already written "0" into an empty meal amount
        if page.value_of(MEAL_AMOUNT).map(parse_number) == Some(0.0) {
            page.document_mut().set_value(MEAL_AMOUNT, DEFAULT_MEAL_AMOUNT);
        }
    }

    fn validate_form(&self, page: &Page) -> bool {
        match rules::minutes_between(page, START_TIME, END_TIME) {
            Some(minutes) => minutes >= MIN_OVERTIME_HOURS * 60,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PageLayout;
    use crate::processor::{FormProcessor, InitReport};
    use crate::registry::FormKind;
    use chrono::NaiveDate;

    fn dinner_layout() -> PageLayout {
        PageLayout::scaffold(FormKind::DinnerExpense)
    }

    fn init(layout: PageLayout) -> (Page, InitReport) {
        let mut page = layout
            .into_page()
            .with_today(NaiveDate::from_ymd_opt(2024, 7, 15).unwrap());
        let report = FormProcessor::for_kind(FormKind::DinnerExpense)
            .initialize(&mut page)
            .unwrap();
        (page, report)
    }

    #[test]
    fn test_defaults_fill_only_empty_fields() {
        let (page, _) = init(dinner_layout());
        assert_eq!(page.value_of("work_date"), Some("2024-07-15"));
        assert_eq!(page.value_of("meal_amount"), Some("10000"));

        let layout = dinner_layout()
            .with_field_value("work_date", "2024-07-12")
            .with_field_value("meal_amount", "12000");
        let (page, _) = init(layout);
        assert_eq!(page.value_of("work_date"), Some("2024-07-12"));
        assert_eq!(page.value_of("meal_amount"), Some("12000"));
    }

    #[test]
    fn test_report_total_includes_default_meal_amount() {
        let (page, report) = init(dinner_layout());
        assert_eq!(page.value_of("meal_amount"), Some(DEFAULT_MEAL_AMOUNT));
        assert_eq!(report.grand_total, 10000.0);

        let (_, report) = init(dinner_layout().with_field_value("meal_amount", "15000"));
        assert_eq!(report.grand_total, 15000.0);
    }

    #[test]
    fn test_short_overtime_alerts() {
        let (mut page, _) = init(dinner_layout().with_payload(""));
        page.change("work_start_time", "18:00");
        assert!(page.alerts().is_empty());

        page.change("work_end_time", "22:00");
        assert_eq!(
            page.alerts(),
            vec!["Dinner allowance requires at least 6 hours of overtime."]
        );
        assert!(!DinnerExpenseHooks.validate_form(&page));

        page.clear_dialogs();
        page.change("work_start_time", "09:00");
        assert!(page.alerts().is_empty());
        assert!(DinnerExpenseHooks.validate_form(&page));
    }
}
