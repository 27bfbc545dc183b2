//! Form-specific behaviour layered on top of the generic processor
//!
//! Each registered form gets one [`FormHooks`] implementation. Hooks run
//! after population and totals, so defaults they set never overwrite
//! payload values.

mod annual_leave;
mod dinner_expense;
mod dispatch_report;
mod expense;
mod transportation;
pub(crate) mod transport_table;

pub use annual_leave::{AnnualLeaveHooks, HALF_DAY, QUARTER_DAY};
pub use dinner_expense::{DinnerExpenseHooks, DEFAULT_MEAL_AMOUNT, MIN_OVERTIME_HOURS};
pub use dispatch_report::DispatchReportHooks;
pub use expense::{PersonalExpenseHooks, PurchaseApprovalHooks};
pub use transport_table::{initialize_transport_table, TRANSPORT_TYPES};
pub use transportation::{TransportationHooks, MAX_TRANSPORT_AMOUNT};

use crate::page::Page;
use crate::registry::FormKind;

pub trait FormHooks {
    /// Extra wiring once fields are populated and totals computed
    fn on_after_init(&self, _page: &mut Page) {}

    /// Whether the current field values pass the form's own checks
    fn validate_form(&self, _page: &Page) -> bool {
        true
    }
}

/// Hooks for forms without extra behaviour
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl FormHooks for NoHooks {}

pub fn hooks_for(kind: FormKind) -> &'static dyn FormHooks {
    match kind {
        FormKind::AnnualLeave => &AnnualLeaveHooks,
        FormKind::DinnerExpense => &DinnerExpenseHooks,
        FormKind::TransportationExpense => &TransportationHooks,
        FormKind::DispatchReport => &DispatchReportHooks,
        FormKind::PersonalExpense => &PersonalExpenseHooks,
        FormKind::PurchaseApproval => &PurchaseApprovalHooks,
        FormKind::CorporateCard | FormKind::Inventory => &NoHooks,
    }
}
