use super::FormHooks;
use crate::page::{Action, EventKind, Page};
use crate::rules::{dates_in_order, Rule};

/// Leave type value for a half-day leave
pub const HALF_DAY: &str = "반차";
/// Leave type value for a quarter-day leave
pub const QUARTER_DAY: &str = "반반차";

const LEAVE_TYPE: &str = "leave_type";
const START_DATE: &str = "leave_start_date";
const END_DATE: &str = "leave_end_date";

const START_AFTER_END: &str = "The start date cannot be later than the end date.";
const END_BEFORE_START: &str = "The end date cannot be earlier than the start date.";

/// Half and quarter days start and end on the same date; the date pair is
/// checked for order whenever either side changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnualLeaveHooks;

impl FormHooks for AnnualLeaveHooks {
    fn on_after_init(&self, page: &mut Page) {
        page.listen(
            LEAVE_TYPE,
            EventKind::Change,
            Action::Rule(Rule::MirrorStartDate {
                selector: LEAVE_TYPE,
                single_day_values: &[HALF_DAY, QUARTER_DAY],
                start: START_DATE,
                end: END_DATE,
            }),
        );

        if page.document().contains(START_DATE) && page.document().contains(END_DATE) {
            page.listen(
                START_DATE,
                EventKind::Change,
                Action::Rule(Rule::DateOrder {
                    start: START_DATE,
                    end: END_DATE,
                    focus: START_DATE,
                    message: START_AFTER_END,
                }),
            );
            page.listen(
                END_DATE,
                EventKind::Change,
                Action::Rule(Rule::DateOrder {
                    start: START_DATE,
                    end: END_DATE,
                    focus: END_DATE,
                    message: END_BEFORE_START,
                }),
            );
        }
        log::info!("[AnnualLeaveProcessor] Leave-specific features initialized");
    }

    fn validate_form(&self, page: &Page) -> bool {
        dates_in_order(page, START_DATE, END_DATE) != Some(false)
    }
}
