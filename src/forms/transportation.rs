use super::transport_table::initialize_transport_table;
use super::FormHooks;
use crate::page::{Action, EventKind, Page};
use crate::rules::{self, Rule};

/// Largest transportation claim accepted without a warning
pub const MAX_TRANSPORT_AMOUNT: i64 = 1_000_000;
const SMALL_AMOUNT_FLOOR: i64 = 1_000;

const TRANSPORT_DATE: &str = "transport_date";
const DEPARTURE: &str = "departure_location";
const ARRIVAL: &str = "arrival_location";
const AMOUNT: &str = "transport_amount";

const DISTINCT_LOCATIONS: Rule = Rule::Distinct {
    first: DEPARTURE,
    second: ARRIVAL,
    message: "The departure and arrival locations cannot be the same.",
};

#[derive(Debug, Clone, Copy, Default)]
pub struct TransportationHooks;

impl FormHooks for TransportationHooks {
    fn on_after_init(&self, page: &mut Page) {
        if page.document().contains(DEPARTURE) && page.document().contains(ARRIVAL) {
            page.listen(DEPARTURE, EventKind::Blur, Action::Rule(DISTINCT_LOCATIONS));
            page.listen(ARRIVAL, EventKind::Blur, Action::Rule(DISTINCT_LOCATIONS));
        }

        page.listen(
            AMOUNT,
            EventKind::Input,
            Action::Rule(Rule::DigitsWithCeiling {
                field: AMOUNT,
                max: MAX_TRANSPORT_AMOUNT,
                message: "Transportation expenses cannot exceed 1,000,000 won.",
            }),
        );
        page.listen(
            AMOUNT,
            EventKind::Blur,
            Action::Rule(Rule::ConfirmBelow {
                field: AMOUNT,
                floor: SMALL_AMOUNT_FLOOR,
                message: "The transportation expense is under 1,000 won. Continue?",
            }),
        );

        rules::default_to_today(page, TRANSPORT_DATE);

        if initialize_transport_table(page) {
            log::debug!("[TransportationExpenseProcessor] Transportation table initialized");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PageLayout;
    use crate::processor::FormProcessor;
    use crate::registry::FormKind;

    fn transport_page(layout: PageLayout, accept: bool) -> Page {
        let mut page = layout.into_page().with_confirm_answer(accept);
        FormProcessor::for_kind(FormKind::TransportationExpense)
            .initialize(&mut page)
            .unwrap();
        page
    }

    fn scaffold() -> PageLayout {
        PageLayout::scaffold(FormKind::TransportationExpense)
    }

    #[test]
    fn test_same_locations_alert_on_blur() {
        let layout = scaffold()
            .with_field_value("departure_location", "Seoul Station")
            .with_field_value("arrival_location", " Seoul Station");
        let mut page = transport_page(layout, true);
        page.blur("departure_location");
        assert_eq!(page.alerts().len(), 1);
        assert_eq!(page.focused_id(), Some("arrival_location"));
    }

    #[test]
    fn test_amount_is_sanitized_and_capped() {
        let mut page = transport_page(scaffold(), true);
        // The total mirror writes the parsed prefix back before the digits pass
        page.input("transport_amount", "45000원");
        assert_eq!(page.value_of("transport_amount"), Some("45000"));
        assert!(page.alerts().is_empty());

        page.input("transport_amount", "1200000");
        assert_eq!(page.alerts().len(), 1);
        assert_eq!(page.value_of("transport_amount"), Some("1200000"));
    }

    #[test]
    fn test_small_amount_asks_for_confirmation() {
        let mut page = transport_page(scaffold().with_field_value("transport_amount", "800"), false);
        assert_eq!(page.value_of("transport_amount"), Some("800"));
        page.blur("transport_amount");
        assert_eq!(page.dialogs().len(), 1);
        assert!(page.alerts().is_empty());
        assert_eq!(page.focused_id(), Some("transport_amount"));
    }

    #[test]
    fn test_object_payload_populates_nothing() {
        let layout = scaffold().with_payload(r#"{"transport_amount": 800, "departure_location": "Seoul"}"#);
        let mut page = layout.into_page();
        let report = FormProcessor::for_kind(FormKind::TransportationExpense)
            .initialize(&mut page)
            .unwrap();
        assert_eq!(report.items_loaded, 0);
        assert_eq!(page.value_of("departure_location"), Some(""));
        assert_eq!(page.value_of("transport_amount"), Some("0"));
    }

    #[test]
    fn test_table_rows_come_from_slot_data() {
        let layout = scaffold().with_slots(r#"{"type": "버스", "origin": "Gangnam", "amount": 1450}"#);
        let mut page = transport_page(layout, true);
        assert_eq!(page.value_of("transport_type_1"), Some("bus"));
        assert_eq!(page.value_of("origin_1"), Some("Gangnam"));
        assert_eq!(page.value_of("total_amount"), Some("1,450"));

        page.click("add_transport_row_btn");
        page.input("amount_2", "2800");
        assert_eq!(page.value_of("total_amount"), Some("4,250"));
        // The table total is separate from the form's own total
        assert_eq!(page.value_of("transport_amount"), Some("0"));
    }
}
