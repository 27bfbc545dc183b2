//! Add/remove affordance for repeating row groups in a table
//!
//! The helper keeps no counter of its own. The number of row groups is read
//! back from the table on every click.

use crate::page::{Action, EventKind, Page};
use regex::Regex;
use std::sync::OnceLock;

fn numeric_suffix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"_\d+$").expect("numeric suffix pattern is valid"))
}

/// Replace a trailing `_<digits>` suffix with `_<index>`; other ids are kept.
pub fn renumber(id: &str, index: usize) -> String {
    numeric_suffix_regex()
        .replace(id, regex::NoExpand(&format!("_{}", index)))
        .into_owned()
}

/// Wire the add and remove buttons of a table.
///
/// Returns false when the table or the add button is missing. A missing
/// remove button only disables removal.
pub fn initialize_dynamic_table(
    page: &mut Page,
    table_id: &str,
    add_button_id: &str,
    remove_button_id: &str,
) -> bool {
    log::debug!(
        "initialize_dynamic_table called with: table_id={}, add_button_id={}",
        table_id,
        add_button_id
    );
    if page.document().table(table_id).is_none() {
        log::error!("Table with ID '{}' not found.", table_id);
        return false;
    }
    if !page.document().contains(add_button_id) {
        log::error!("Add button with ID '{}' not found.", add_button_id);
        return false;
    }

    page.listen(
        add_button_id,
        EventKind::Click,
        Action::AddRowGroup {
            table_id: table_id.to_string(),
            remove_button_id: remove_button_id.to_string(),
        },
    );
    page.listen(
        remove_button_id,
        EventKind::Click,
        Action::RemoveRowGroup {
            table_id: table_id.to_string(),
            remove_button_id: remove_button_id.to_string(),
        },
    );

    update_remove_button_state(page, table_id, remove_button_id);
    true
}

/// Append a copy of the last row group with renumbered, cleared fields.
///
/// Returns the 1-based number of the new group.
pub fn add_row_group(page: &mut Page, table_id: &str) -> Option<usize> {
    let doc = page.document_mut();
    let Some(new_nodes) = doc.clone_last_row_group(table_id) else {
        log::error!("No row group found to clone in table '{}'.", table_id);
        return None;
    };
    let new_index = doc.table(table_id).map(|table| table.row_group_count())?;

    for node in new_nodes {
        let Some(element) = doc.element_mut(node) else {
            continue;
        };
        if !element.kind.is_field() {
            continue;
        }
        if !element.id.is_empty() {
            element.id = renumber(&element.id, new_index);
        }
        if !element.name.is_empty() {
            element.name = renumber(&element.name, new_index);
        }
        element.reset();
    }

    log::debug!("Appended row group {} to table '{}'", new_index, table_id);
    Some(new_index)
}

/// Remove the last row group, never going below one.
pub fn remove_row_group(page: &mut Page, table_id: &str) -> bool {
    let count = page
        .document()
        .table(table_id)
        .map(|table| table.row_group_count())
        .unwrap_or(0);
    if count <= 1 {
        return false;
    }
    let removed = page.remove_last_row_group(table_id);
    if removed {
        log::debug!("Last row group of '{}' removed.", table_id);
    }
    removed
}

/// Disable the remove button while only one row group is left
pub fn update_remove_button_state(page: &mut Page, table_id: &str, remove_button_id: &str) {
    let count = page
        .document()
        .table(table_id)
        .map(|table| table.row_group_count())
        .unwrap_or(0);
    if let Some(button) = page.document_mut().get_mut(remove_button_id) {
        button.disabled = count <= 1;
    }
}

pub(crate) fn on_add_click(page: &mut Page, table_id: &str, remove_button_id: &str) {
    add_row_group(page, table_id);
    update_remove_button_state(page, table_id, remove_button_id);
}

pub(crate) fn on_remove_click(page: &mut Page, table_id: &str, remove_button_id: &str) {
    remove_row_group(page, table_id);
    update_remove_button_state(page, table_id, remove_button_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Document, Element, ElementKind, SelectOption};

    fn expense_table_page() -> Page {
        let mut doc = Document::new();
        let category = Element::new(ElementKind::Select, "category_1").with_options(vec![
            SelectOption::new("meal", "Meal"),
            SelectOption::new("taxi", "Taxi"),
        ]);
        let mut receipt = Element::new(ElementKind::Checkbox, "receipt_1").with_value("yes");
        receipt.checked = true;
        doc.append_table(
            "expense_table",
            vec![vec![
                Element::new(ElementKind::Number, "amount_1").with_value("3000"),
                category.with_value("taxi"),
                receipt,
            ]],
        );
        doc.append(Element::new(ElementKind::Button, "add_btn"));
        doc.append(Element::new(ElementKind::Button, "remove_btn"));
        Page::new(doc)
    }

    #[test]
    fn test_renumber_suffix() {
        assert_eq!(renumber("amount_1", 2), "amount_2");
        assert_eq!(renumber("item_total_price_12", 13), "item_total_price_13");
        assert_eq!(renumber("memo", 4), "memo");
        assert_eq!(renumber("row_2_note", 4), "row_2_note");
    }

    #[test]
    fn test_add_then_remove_row_group() {
        let mut page = expense_table_page();
        assert!(initialize_dynamic_table(&mut page, "expense_table", "add_btn", "remove_btn"));
        assert!(page.document().get("remove_btn").unwrap().disabled);

        assert!(page.click("add_btn"));
        assert_eq!(page.value_of("amount_2"), Some(""));
        assert_eq!(page.value_of("category_2"), Some("meal"));
        assert!(!page.document().get("receipt_2").unwrap().checked);
        assert_eq!(page.document().get("amount_2").unwrap().name, "amount_2");
        assert_eq!(page.value_of("amount_1"), Some("3000"));
        assert!(!page.document().get("remove_btn").unwrap().disabled);

        assert!(page.click("remove_btn"));
        assert!(!page.document().contains("amount_2"));
        assert_eq!(page.document().table("expense_table").unwrap().row_group_count(), 1);
        assert!(page.document().get("remove_btn").unwrap().disabled);

        // Disabled button swallows the click; the last group survives
        assert!(!page.click("remove_btn"));
        assert!(!remove_row_group(&mut page, "expense_table"));
        assert!(page.document().contains("amount_1"));
    }

    #[test]
    fn test_group_count_is_read_from_the_table() {
        let mut page = expense_table_page();
        initialize_dynamic_table(&mut page, "expense_table", "add_btn", "remove_btn");
        page.click("add_btn");
        page.click("add_btn");
        page.click("remove_btn");
        page.click("add_btn");
        assert!(page.document().contains("amount_3"));
        assert_eq!(page.document().table("expense_table").unwrap().row_group_count(), 3);
    }

    #[test]
    fn test_add_remove_cycles_do_not_accumulate() {
        let mut page = expense_table_page();
        initialize_dynamic_table(&mut page, "expense_table", "add_btn", "remove_btn");
        page.listen("amount_1", EventKind::Input, Action::UpdateTransportTotal);
        page.click("add_btn");
        page.listen("amount_2", EventKind::Input, Action::UpdateTransportTotal);

        page.click("remove_btn");
        let listeners = page.listener_total();
        let slots = page.document().arena_len();
        for _ in 0..10 {
            page.click("add_btn");
            page.click("remove_btn");
        }
        assert_eq!(page.listener_total(), listeners);
        assert_eq!(page.document().arena_len(), slots);

        // A re-added group never inherits listeners of the removed one
        page.click("add_btn");
        assert_eq!(page.listener_count("amount_2", EventKind::Input), 0);
        assert_eq!(page.listener_count("amount_1", EventKind::Input), 1);
    }

    #[test]
    fn test_missing_parts() {
        let mut page = expense_table_page();
        assert!(!initialize_dynamic_table(&mut page, "nope", "add_btn", "remove_btn"));
        assert!(!initialize_dynamic_table(&mut page, "expense_table", "nope", "remove_btn"));
        assert!(initialize_dynamic_table(&mut page, "expense_table", "add_btn", "nope"));
        assert!(page.click("add_btn"));
        assert!(page.document().contains("amount_2"));
    }
}
