//! Multi-row transportation table
//!
//! The page ships an empty `transportation_table`. Rows are created when the
//! page starts and by the add button, each with its own remove button, and
//! `total_amount` shows the sum of the row amounts with digit grouping. The
//! first row is filled from the `form-slots-data` script.

use crate::dom::{Element, ElementKind, SelectOption};
use crate::page::{Action, EventKind, Page};
use crate::payload::SLOTS_DATA_SCRIPT_ID;
use crate::utils::{format_grouped, parse_number, value_to_string};
use serde_json::Value;

pub const TRANSPORT_TABLE: &str = "transportation_table";
pub const ADD_TRANSPORT_ROW_BUTTON: &str = "add_transport_row_btn";
pub const TABLE_TOTAL: &str = "total_amount";

const AMOUNT_PREFIX: &str = "amount_";
const REMOVE_BUTTON_PREFIX: &str = "remove_transport_row_";
/// Slot key whose field is `transport_type_1` rather than `type_1`
const TYPE_SLOT: &str = "type";

/// Transport type options as (value, label)
pub const TRANSPORT_TYPES: [(&str, &str); 5] = [
    ("subway", "지하철"),
    ("bus", "버스"),
    ("train", "기차"),
    ("airplane", "비행기"),
    ("other", "기타"),
];

/// Wire the table, create its first row and fill that row from the slot data.
///
/// Returns false, leaving the page alone, when the table, the add button or
/// the total field is missing.
pub fn initialize_transport_table(page: &mut Page) -> bool {
    let doc = page.document();
    let ready = doc.table(TRANSPORT_TABLE).is_some()
        && doc.contains(ADD_TRANSPORT_ROW_BUTTON)
        && doc.contains(TABLE_TOTAL);
    if !ready {
        return false;
    }

    page.listen(ADD_TRANSPORT_ROW_BUTTON, EventKind::Click, Action::AddTransportRow);
    add_transport_row(page);
    populate_first_row(page);
    true
}

fn row_elements(number: usize) -> Vec<Element> {
    let options = TRANSPORT_TYPES
        .iter()
        .map(|(value, label)| SelectOption::new(*value, *label))
        .collect();
    vec![
        Element::new(ElementKind::Select, format!("transport_type_{}", number)).with_options(options),
        Element::new(ElementKind::Text, format!("origin_{}", number)),
        Element::new(ElementKind::Text, format!("destination_{}", number)),
        Element::new(ElementKind::Date, format!("boarding_date_{}", number)),
        Element::new(ElementKind::Number, format!("{}{}", AMOUNT_PREFIX, number)),
        Element::new(ElementKind::Button, format!("{}{}", REMOVE_BUTTON_PREFIX, number)),
    ]
}

/// Append an empty row. Row numbers keep counting up across removals.
///
/// Returns the number of the new row.
pub fn add_transport_row(page: &mut Page) -> Option<usize> {
    let number = page.document().table(TRANSPORT_TABLE)?.row_groups_created() + 1;
    page.document_mut()
        .append_row_group(TRANSPORT_TABLE, row_elements(number))?;

    page.listen(
        &format!("{}{}", AMOUNT_PREFIX, number),
        EventKind::Input,
        Action::UpdateTransportTotal,
    );
    let button_id = format!("{}{}", REMOVE_BUTTON_PREFIX, number);
    page.listen(
        &button_id,
        EventKind::Click,
        Action::RemoveTransportRow {
            button_id: button_id.clone(),
        },
    );
    log::debug!("Transportation row {} added", number);
    Some(number)
}

/// Remove the row holding `button_id`, then refresh the total.
pub fn remove_transport_row(page: &mut Page, button_id: &str) -> bool {
    let position = page.document().by_id(button_id).and_then(|node| {
        page.document()
            .table(TRANSPORT_TABLE)
            .and_then(|table| table.position_of(node))
    });
    let Some(position) = position else {
        return false;
    };
    let removed = page.remove_row_group(TRANSPORT_TABLE, position);
    if removed {
        update_total_amount(page);
    }
    removed
}

fn is_amount_cell(id: &str) -> bool {
    id.strip_prefix(AMOUNT_PREFIX)
        .is_some_and(|number| !number.is_empty() && number.bytes().all(|b| b.is_ascii_digit()))
}

/// Sum of the row amounts; unparsable amounts count as 0
pub fn table_total(page: &Page) -> f64 {
    let doc = page.document();
    let Some(table) = doc.table(TRANSPORT_TABLE) else {
        return 0.0;
    };
    table
        .row_groups()
        .iter()
        .flatten()
        .filter_map(|node| doc.element(*node))
        .filter(|element| is_amount_cell(&element.id))
        .map(|element| parse_number(element.value()))
        .sum()
}

pub fn update_total_amount(page: &mut Page) {
    let total = format_grouped(table_total(page));
    page.document_mut().set_value(TABLE_TOTAL, total);
}

fn slot_field_id(key: &str) -> String {
    if key == TYPE_SLOT {
        "transport_type_1".to_string()
    } else {
        format!("{}_1", key)
    }
}

/// Fill the first row from the slot data script; unknown keys are skipped.
pub fn populate_first_row(page: &mut Page) {
    let Some(text) = page
        .document()
        .get(SLOTS_DATA_SCRIPT_ID)
        .map(|script| script.text_content().to_string())
    else {
        return;
    };

    let slots = match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(slots)) if !slots.is_empty() => slots,
        Ok(_) => return,
        Err(e) => {
            log::error!("Error parsing slot data: {}", e);
            return;
        }
    };

    for (key, value) in &slots {
        let field_id = slot_field_id(key);
        let Some(element) = page.document_mut().get_mut(&field_id) else {
            continue;
        };
        if element.kind == ElementKind::Select {
            // A select only moves when an option matches; otherwise it keeps its choice
            let Value::String(wanted) = value else {
                continue;
            };
            let matched = element
                .options()
                .iter()
                .find(|option| option.value == *wanted || option.label == *wanted)
                .map(|option| option.value.clone());
            if let Some(option_value) = matched {
                element.set_value(option_value);
            }
        } else {
            element.set_value(value_to_string(value));
        }
        log::debug!("Filled {} from slot '{}'", field_id, key);
    }
    update_total_amount(page);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PageLayout;
    use crate::registry::FormKind;

    fn transport_table_page(slots: Option<&str>) -> Page {
        let mut layout = PageLayout::scaffold(FormKind::TransportationExpense);
        layout.slots = slots.map(str::to_string);
        let mut page = layout.into_page();
        assert!(initialize_transport_table(&mut page));
        page
    }

    fn row_count(page: &Page) -> usize {
        page.document().table(TRANSPORT_TABLE).unwrap().row_group_count()
    }

    #[test]
    fn test_first_row_is_created_empty() {
        let page = transport_table_page(None);
        assert_eq!(row_count(&page), 1);
        assert_eq!(page.value_of("transport_type_1"), Some("subway"));
        assert_eq!(page.value_of("origin_1"), Some(""));
        assert!(page.document().contains("remove_transport_row_1"));
        assert_eq!(page.value_of(TABLE_TOTAL), Some(""));
    }

    #[test]
    fn test_rows_sum_into_grouped_total() {
        let mut page = transport_table_page(None);
        page.click(ADD_TRANSPORT_ROW_BUTTON);
        page.click(ADD_TRANSPORT_ROW_BUTTON);
        assert_eq!(row_count(&page), 3);

        page.input("amount_1", "1250");
        page.input("amount_2", "12000.5");
        page.input("amount_3", "bus fare");
        assert_eq!(page.value_of(TABLE_TOTAL), Some("13,250.5"));

        assert!(page.click("remove_transport_row_2"));
        assert_eq!(row_count(&page), 2);
        assert!(!page.document().contains("amount_2"));
        assert_eq!(page.value_of(TABLE_TOTAL), Some("1,250"));

        // Numbers keep counting up after a removal
        page.click(ADD_TRANSPORT_ROW_BUTTON);
        assert!(page.document().contains("amount_4"));
        assert!(!page.document().contains("amount_2"));
    }

    #[test]
    fn test_last_row_can_be_removed() {
        let mut page = transport_table_page(None);
        page.input("amount_1", "900");
        assert!(page.click("remove_transport_row_1"));
        assert_eq!(row_count(&page), 0);
        assert_eq!(page.value_of(TABLE_TOTAL), Some("0"));
        assert!(!remove_transport_row(&mut page, "remove_transport_row_1"));
    }

    #[test]
    fn test_slots_fill_first_row() {
        let page = transport_table_page(Some(
            r#"{"type": "기차", "origin": "Seoul", "destination": "Busan", "boarding_date": "2024-06-03", "amount": 59800, "seat": "12A"}"#,
        ));
        assert_eq!(page.value_of("transport_type_1"), Some("train"));
        assert_eq!(page.value_of("origin_1"), Some("Seoul"));
        assert_eq!(page.value_of("boarding_date_1"), Some("2024-06-03"));
        assert_eq!(page.value_of("amount_1"), Some("59800"));
        assert_eq!(page.value_of(TABLE_TOTAL), Some("59,800"));
    }

    #[test]
    fn test_unmatched_type_keeps_selection() {
        let page = transport_table_page(Some(r#"{"type": "taxi", "amount": 0}"#));
        assert_eq!(page.value_of("transport_type_1"), Some("subway"));
        assert_eq!(page.value_of("amount_1"), Some("0"));

        let page = transport_table_page(Some(r#"{"type": "airplane"}"#));
        assert_eq!(page.value_of("transport_type_1"), Some("airplane"));
    }

    #[test]
    fn test_bad_or_empty_slots_leave_row_blank() {
        for slots in ["{}", "null", "{not json"] {
            let page = transport_table_page(Some(slots));
            assert_eq!(page.value_of("origin_1"), Some(""));
            assert_eq!(page.value_of(TABLE_TOTAL), Some(""));
        }
    }

    #[test]
    fn test_missing_parts_leave_page_alone() {
        let mut page = PageLayout::scaffold(FormKind::DinnerExpense).into_page();
        assert!(!initialize_transport_table(&mut page));
        assert_eq!(page.listener_total(), 0);
    }
}
