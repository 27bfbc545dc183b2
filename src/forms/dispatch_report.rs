use super::FormHooks;
use crate::page::{Action, EventKind, Page};
use crate::rules::{dates_in_order, Rule};

const START_DATE: &str = "dispatch_start_date";
const END_DATE: &str = "dispatch_end_date";
const DURATION: &str = "dispatch_duration_days";
const PURPOSE: &str = "dispatch_purpose";
const REPORT_DETAILS: &str = "report_details";

const PERIOD: Rule = Rule::InclusivePeriod {
    start: START_DATE,
    end: END_DATE,
    days: DURATION,
    message: "The start date cannot be later than the end date.",
};

#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchReportHooks;

impl FormHooks for DispatchReportHooks {
    fn on_after_init(&self, page: &mut Page) {
        if page.document().contains(START_DATE) && page.document().contains(END_DATE) {
            page.listen(START_DATE, EventKind::Change, Action::Rule(PERIOD));
            page.listen(END_DATE, EventKind::Change, Action::Rule(PERIOD));
        }

        page.listen(
            DURATION,
            EventKind::Input,
            Action::Rule(Rule::IntegerRange {
                field: DURATION,
                min: 1,
                max: 365,
                below_message: "A dispatch or business trip must last at least 1 day.",
                above_message: "A dispatch or business trip cannot exceed one year (365 days).",
            }),
        );

        page.listen(
            PURPOSE,
            EventKind::Blur,
            Action::Rule(Rule::MinLength {
                field: PURPOSE,
                min_chars: 10,
                message: "Please describe the purpose in at least 10 characters.",
            }),
        );
        page.listen(
            REPORT_DETAILS,
            EventKind::Blur,
            Action::Rule(Rule::MinLength {
                field: REPORT_DETAILS,
                min_chars: 50,
                message: "Please write at least 50 characters of report details.",
            }),
        );
    }

    fn validate_form(&self, page: &Page) -> bool {
        dates_in_order(page, START_DATE, END_DATE) != Some(false)
    }
}
