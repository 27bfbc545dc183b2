//! Line-item expense forms with a growable item table

use super::FormHooks;
use crate::dynamic_table::initialize_dynamic_table;
use crate::page::Page;
use crate::rules;

const DRAFT_DATE: &str = "draft_date";
const ADD_ROW_BUTTON: &str = "add_row_btn";
const REMOVE_ROW_BUTTON: &str = "remove_row_btn";

#[derive(Debug, Clone, Copy, Default)]
pub struct PersonalExpenseHooks;

impl FormHooks for PersonalExpenseHooks {
    fn on_after_init(&self, page: &mut Page) {
        rules::default_to_today(page, DRAFT_DATE);
        initialize_dynamic_table(page, "personal_expense_table", ADD_ROW_BUTTON, REMOVE_ROW_BUTTON);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PurchaseApprovalHooks;

impl FormHooks for PurchaseApprovalHooks {
    fn on_after_init(&self, page: &mut Page) {
        initialize_dynamic_table(page, "purchase_table", ADD_ROW_BUTTON, REMOVE_ROW_BUTTON);
        rules::default_to_today(page, DRAFT_DATE);
    }
}
