//! Form configuration registry
//!
//! One declarative [`FormConfig`] per [`FormKind`]. The processor reads
//! nothing else about a form: which fields exist per line item, which of them
//! sum into the grand total, where the total is mirrored and which payload
//! keys feed which field.

use crate::error::FormError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Mapping from a field-id template to the payload keys that may feed it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    pub field_pattern: &'static str,
    /// Tried in order; the first key with a non-null value wins
    pub data_keys: &'static [&'static str],
}

/// Quantity x unit price -> line total wiring for item-calculating forms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemCalculation {
    pub quantity_field: &'static str,
    pub unit_price_field: &'static str,
    pub item_total_field: &'static str,
    /// Payload key whose value overrides the computed line total
    pub item_total_key: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormConfig {
    pub name: &'static str,
    pub form_id: &'static str,
    pub fixed_item_count: usize,
    pub items_key: Option<&'static str>,
    #[serde(flatten)]
    pub item_calculation: Option<ItemCalculation>,
    pub amount_fields: &'static [&'static str],
    pub total_fields: &'static [&'static str],
    pub field_mappings: &'static [FieldMapping],
}

impl FormConfig {
    pub fn has_item_calculation(&self) -> bool {
        self.item_calculation.is_some()
    }

    /// Every 1-based item index the form provides
    pub fn item_indices(&self) -> std::ops::RangeInclusive<usize> {
        1..=self.fixed_item_count.max(1)
    }
}

const fn mapping(field_pattern: &'static str, data_keys: &'static [&'static str]) -> FieldMapping {
    FieldMapping {
        field_pattern,
        data_keys,
    }
}

const LINE_ITEM_TOTALS: ItemCalculation = ItemCalculation {
    quantity_field: "item_quantity_{index}",
    unit_price_field: "item_unit_price_{index}",
    item_total_field: "item_total_price_{index}",
    item_total_key: "item_total_price",
};

pub static ANNUAL_LEAVE: FormConfig = FormConfig {
    name: "AnnualLeaveProcessor",
    form_id: "annual_leave_form",
    fixed_item_count: 1,
    items_key: None,
    item_calculation: None,
    amount_fields: &[],
    total_fields: &[],
    field_mappings: &[
        mapping("leave_type", &["leave_type"]),
        mapping("leave_start_date", &["leave_start_date"]),
        mapping("leave_end_date", &["leave_end_date"]),
        mapping("leave_reason", &["leave_reason"]),
    ],
};

pub static DINNER_EXPENSE: FormConfig = FormConfig {
    name: "DinnerExpenseProcessor",
    form_id: "dinner_expense_form",
    fixed_item_count: 1,
    items_key: None,
    item_calculation: None,
    amount_fields: &["meal_amount"],
    total_fields: &["meal_amount"],
    field_mappings: &[
        mapping("work_date", &["work_date"]),
        mapping("work_start_time", &["work_start_time"]),
        mapping("work_end_time", &["work_end_time"]),
        mapping("meal_amount", &["meal_amount"]),
        mapping("work_reason", &["work_reason"]),
    ],
};

pub static TRANSPORTATION_EXPENSE: FormConfig = FormConfig {
    name: "TransportationExpenseProcessor",
    form_id: "transportation_expense_form",
    fixed_item_count: 1,
    items_key: None,
    item_calculation: None,
    amount_fields: &["transport_amount"],
    total_fields: &["transport_amount"],
    field_mappings: &[
        mapping("transport_date", &["transport_date"]),
        mapping("departure_location", &["departure_location"]),
        mapping("arrival_location", &["arrival_location"]),
        mapping("transport_amount", &["transport_amount"]),
        mapping("transport_details", &["transport_details"]),
    ],
};

pub static DISPATCH_REPORT: FormConfig = FormConfig {
    name: "DispatchReportProcessor",
    form_id: "dispatch_businesstrip_report_form",
    fixed_item_count: 1,
    items_key: None,
    item_calculation: None,
    amount_fields: &[],
    total_fields: &[],
    field_mappings: &[
        mapping("dispatch_start_date", &["dispatch_start_date"]),
        mapping("dispatch_end_date", &["dispatch_end_date"]),
        mapping("dispatch_duration_days", &["dispatch_duration_days"]),
        mapping("dispatch_purpose", &["dispatch_purpose"]),
        mapping("report_details", &["report_details"]),
    ],
};

pub static PERSONAL_EXPENSE: FormConfig = FormConfig {
    name: "PersonalExpenseProcessor",
    form_id: "personal_expense_form",
    fixed_item_count: 6,
    items_key: Some("expense_items"),
    item_calculation: None,
    amount_fields: &["expense_amount_{index}"],
    total_fields: &["total_amount_header", "total_expense_amount"],
    field_mappings: &[
        mapping("expense_date_{index}", &["expense_date"]),
        mapping("expense_category_{index}", &["expense_category"]),
        mapping("expense_description_{index}", &["expense_description"]),
        mapping("expense_amount_{index}", &["expense_amount"]),
        mapping("expense_notes_{index}", &["expense_notes"]),
    ],
};

pub static CORPORATE_CARD: FormConfig = FormConfig {
    name: "CorporateCardProcessor",
    form_id: "corporate_card_form",
    fixed_item_count: 6,
    items_key: Some("card_usage_items"),
    item_calculation: None,
    amount_fields: &["usage_amount_{index}"],
    total_fields: &["total_amount_header", "total_usage_amount"],
    field_mappings: &[
        mapping("usage_date_{index}", &["usage_date"]),
        mapping("usage_category_{index}", &["usage_category"]),
        mapping("merchant_name_{index}", &["merchant_name", "usage_description"]),
        mapping("usage_amount_{index}", &["usage_amount"]),
        mapping("usage_notes_{index}", &["usage_notes"]),
    ],
};

pub static INVENTORY: FormConfig = FormConfig {
    name: "InventoryProcessor",
    form_id: "inventory_purchase_form",
    fixed_item_count: 6,
    items_key: Some("items"),
    item_calculation: Some(LINE_ITEM_TOTALS),
    amount_fields: &["item_total_price_{index}"],
    total_fields: &["total_amount"],
    field_mappings: &[
        mapping("item_name_{index}", &["item_name"]),
        mapping("item_quantity_{index}", &["item_quantity"]),
        mapping("item_unit_price_{index}", &["item_unit_price"]),
        mapping("item_purpose_{index}", &["item_notes"]),
    ],
};

pub static PURCHASE_APPROVAL: FormConfig = FormConfig {
    name: "PurchaseApprovalProcessor",
    form_id: "purchase_approval_form",
    fixed_item_count: 3,
    items_key: Some("items"),
    item_calculation: Some(LINE_ITEM_TOTALS),
    amount_fields: &["item_total_price_{index}"],
    total_fields: &["total_purchase_amount"],
    field_mappings: &[
        mapping("item_name_{index}", &["item_name"]),
        mapping("item_spec_{index}", &["item_spec"]),
        mapping("item_quantity_{index}", &["item_quantity"]),
        mapping("item_unit_price_{index}", &["item_unit_price"]),
        mapping(
            "item_delivery_date_{index}",
            &["item_delivery_date", "item_delivery_request_date"],
        ),
        mapping("item_supplier_{index}", &["item_supplier"]),
        mapping("item_notes_{index}", &["item_notes", "item_purpose"]),
    ],
};

/// Every form the registry knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormKind {
    AnnualLeave,
    DinnerExpense,
    TransportationExpense,
    DispatchReport,
    PersonalExpense,
    CorporateCard,
    Inventory,
    PurchaseApproval,
}

impl FormKind {
    pub const ALL: [FormKind; 8] = [
        FormKind::AnnualLeave,
        FormKind::DinnerExpense,
        FormKind::TransportationExpense,
        FormKind::DispatchReport,
        FormKind::PersonalExpense,
        FormKind::CorporateCard,
        FormKind::Inventory,
        FormKind::PurchaseApproval,
    ];

    /// Form-type identifier used by pages and the CLI
    pub fn form_type(self) -> &'static str {
        match self {
            FormKind::AnnualLeave => "annual_leave",
            FormKind::DinnerExpense => "dinner_expense",
            FormKind::TransportationExpense => "transportation_expense",
            FormKind::DispatchReport => "dispatch_report",
            FormKind::PersonalExpense => "personal_expense",
            FormKind::CorporateCard => "corporate_card",
            FormKind::Inventory => "inventory",
            FormKind::PurchaseApproval => "purchase_approval",
        }
    }

    pub fn config(self) -> &'static FormConfig {
        match self {
            FormKind::AnnualLeave => &ANNUAL_LEAVE,
            FormKind::DinnerExpense => &DINNER_EXPENSE,
            FormKind::TransportationExpense => &TRANSPORTATION_EXPENSE,
            FormKind::DispatchReport => &DISPATCH_REPORT,
            FormKind::PersonalExpense => &PERSONAL_EXPENSE,
            FormKind::CorporateCard => &CORPORATE_CARD,
            FormKind::Inventory => &INVENTORY,
            FormKind::PurchaseApproval => &PURCHASE_APPROVAL,
        }
    }

    pub fn from_form_type(form_type: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.form_type() == form_type)
    }
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.form_type())
    }
}

impl FromStr for FormKind {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_form_type(s).ok_or_else(|| FormError::UnknownFormType {
            form_type: s.to_string(),
        })
    }
}

/// Look up the configuration for a form-type identifier.
pub fn get_form_config(form_type: &str) -> Option<&'static FormConfig> {
    FormKind::from_form_type(form_type).map(FormKind::config)
}

/// Identifiers of every supported form, in registry order
pub fn supported_forms() -> Vec<&'static str> {
    FormKind::ALL.iter().map(|kind| kind.form_type()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::INDEX_PLACEHOLDER;

    #[test]
    fn test_lookup_by_form_type() {
        let config = get_form_config("inventory").unwrap();
        assert_eq!(config.form_id, "inventory_purchase_form");
        assert_eq!(config.fixed_item_count, 6);
        assert!(config.has_item_calculation());

        assert!(get_form_config("vacation").is_none());
        assert!("vacation".parse::<FormKind>().is_err());
    }

    #[test]
    fn test_every_kind_round_trips_its_identifier() {
        for kind in FormKind::ALL {
            assert_eq!(kind.form_type().parse::<FormKind>().unwrap(), kind);
            assert!(std::ptr::eq(get_form_config(kind.form_type()).unwrap(), kind.config()));
        }
        assert_eq!(supported_forms().len(), 8);
    }

    #[test]
    fn test_configs_respect_item_invariants() {
        for kind in FormKind::ALL {
            let config = kind.config();
            assert!(config.fixed_item_count >= 1, "{} has no item slots", config.name);

            // Single-instance forms never template their ids
            if config.items_key.is_none() {
                assert_eq!(config.fixed_item_count, 1);
                for mapping in config.field_mappings {
                    assert!(!mapping.field_pattern.contains(INDEX_PLACEHOLDER));
                }
            }
            if let Some(calc) = config.item_calculation {
                assert!(config.amount_fields.contains(&calc.item_total_field));
            }
        }
    }

    #[test]
    fn test_config_serializes_flat() {
        let json = serde_json::to_value(PURCHASE_APPROVAL).unwrap();
        assert_eq!(json["formId"], "purchase_approval_form");
        assert_eq!(json["itemTotalKey"], "item_total_price");
        assert_eq!(json["fieldMappings"][4]["dataKeys"][1], "item_delivery_request_date");

        let json = serde_json::to_value(ANNUAL_LEAVE).unwrap();
        assert!(json["itemsKey"].is_null());
        assert!(json.get("quantityField").is_none());
    }
}
