//! Configuration-driven population and totals engine
//!
//! A [`FormProcessor`] pairs a [`FormConfig`] with the form's hook set. It
//! keeps no state of its own: every total is re-derived from the current
//! field values, so a processor can be rebuilt from its config at any time
//! (which is exactly what event listeners do).

use crate::error::{FormError, Result};
use crate::forms::{self, FormHooks, NoHooks};
use crate::page::{Action, EventKind, Page};
use crate::payload::{self, Payload, PayloadStatus, ITEMS_DATA_SCRIPT_ID};
use crate::registry::{FormConfig, FormKind};
use crate::utils::{field_text, format_fixed0, parse_float, parse_number, resolve_template, value_to_string};
use serde::Serialize;
use serde_json::Value;

/// Summary of one processor initialization
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitReport {
    pub form_id: &'static str,
    pub payload: PayloadStatus,
    /// Payload items written into the form
    pub items_loaded: usize,
    /// Payload items past the form's fixed item count
    pub items_ignored: usize,
    pub grand_total: f64,
}

#[derive(Clone, Copy)]
pub struct FormProcessor {
    config: &'static FormConfig,
    hooks: &'static dyn FormHooks,
}

impl std::fmt::Debug for FormProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormProcessor")
            .field("config", &self.config.name)
            .finish()
    }
}

impl FormProcessor {
    /// Processor without form-specific behaviour
    pub fn new(config: &'static FormConfig) -> Self {
        Self {
            config,
            hooks: &NoHooks,
        }
    }

    /// Processor for a registered form, wired with that form's hooks
    pub fn for_kind(kind: FormKind) -> Self {
        Self {
            config: kind.config(),
            hooks: forms::hooks_for(kind),
        }
    }

    pub fn with_hooks(mut self, hooks: &'static dyn FormHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn config(&self) -> &'static FormConfig {
        self.config
    }

    /// Wire listeners, load the embedded payload, compute totals and run the
    /// form hooks, in that order.
    ///
    /// Fails only when the form element itself is missing, in which case the
    /// page is left untouched.
    pub fn initialize(&self, page: &mut Page) -> Result<InitReport> {
        let name = self.config.name;
        if !page.document().contains(self.config.form_id) {
            log::error!("[{}] Form with ID \"{}\" not found", name, self.config.form_id);
            return Err(FormError::form_not_found(name, self.config.form_id));
        }

        self.setup_event_listeners(page);
        let (payload, items_loaded, items_ignored) = self.load_initial_data(page);
        self.calculate_overall_total(page);
        self.hooks.on_after_init(page);
        // Hooks may default an amount field that doubles as a total
        let grand_total = self.sum_amount_fields(page);

        log::info!("[{}] Form processor initialized successfully", name);
        Ok(InitReport {
            form_id: self.config.form_id,
            payload,
            items_loaded,
            items_ignored,
            grand_total,
        })
    }

    fn setup_event_listeners(&self, page: &mut Page) {
        let config = self.config;
        for index in config.item_indices() {
            for pattern in config.amount_fields {
                let field_id = resolve_template(pattern, index);
                page.listen(&field_id, EventKind::Input, Action::AmountChanged { config, index });
            }

            if let Some(calc) = config.item_calculation {
                for pattern in [calc.quantity_field, calc.unit_price_field] {
                    let field_id = resolve_template(pattern, index);
                    page.listen(&field_id, EventKind::Input, Action::ItemChanged { config, index });
                }
            }
        }
    }

    /// Populate fields from the embedded payload.
    ///
    /// Returns the payload status with the number of items written and the
    /// number ignored past the fixed item count. A malformed payload is
    /// logged and treated as no data.
    pub fn load_initial_data(&self, page: &mut Page) -> (PayloadStatus, usize, usize) {
        let name = self.config.name;
        let text = page
            .document()
            .get(ITEMS_DATA_SCRIPT_ID)
            .map(|script| script.text_content().to_string());

        let payload = Payload::parse(text.as_deref());
        let parsed = match &payload {
            Payload::Parsed(value) => value,
            Payload::Malformed(message) => {
                log::error!(
                    "[{}] Error parsing initial data: {} Raw content: {}",
                    name,
                    message,
                    text.as_deref().unwrap_or_default()
                );
                return (payload.status(), 0, 0);
            }
            _ => {
                log::info!(
                    "[{}] No valid initial data. Content: \"{}\"",
                    name,
                    text.as_deref().map(str::trim).unwrap_or("script_not_found")
                );
                return (payload.status(), 0, 0);
            }
        };

        let items = payload::extract_items(parsed, self.config.items_key);
        log::debug!("[{}] Items to load: {}", name, items.len());

        let loaded = self.populate_form_fields(page, &items);
        if loaded > 0 {
            self.calculate_overall_total(page);
        }
        (payload.status(), loaded, items.len() - loaded)
    }

    /// Write payload items into their slots. Items past the fixed item count
    /// are skipped. Returns the number of items written.
    pub fn populate_form_fields(&self, page: &mut Page, items: &[&Value]) -> usize {
        let name = self.config.name;
        let slots = self.config.fixed_item_count;

        for (position, &item) in items.iter().take(slots).enumerate() {
            let index = position + 1;
            log::debug!("[{}] Processing item {}: {}", name, index, item);

            for mapping in self.config.field_mappings {
                let field_id = resolve_template(mapping.field_pattern, index);
                let value = payload::lookup_value(item, mapping.data_keys)
                    .map(field_text)
                    .unwrap_or_default();
                if page.document_mut().set_value(&field_id, value.as_str()) {
                    log::debug!("[{}] Filled {} with: {}", name, field_id, value);
                } else {
                    log::warn!("[{}] Element with ID \"{}\" not found", name, field_id);
                }
            }

            if self.config.has_item_calculation() {
                self.calculate_item_total(page, index, Some(item));
            }
        }

        if items.len() > slots {
            log::warn!(
                "[{}] Ignoring {} items beyond the {} available rows",
                name,
                items.len() - slots,
                slots
            );
        }
        items.len().min(slots)
    }

    pub fn on_amount_field_change(&self, page: &mut Page, index: usize) {
        if self.config.has_item_calculation() {
            self.calculate_item_total(page, index, None);
        } else {
            self.calculate_overall_total(page);
        }
    }

    /// Recompute one line total, then the grand total.
    ///
    /// A numeric value under the item-total key of `item` takes precedence
    /// over quantity x unit price.
    pub fn calculate_item_total(&self, page: &mut Page, index: usize, item: Option<&Value>) {
        let Some(calc) = self.config.item_calculation else {
            return;
        };
        let name = self.config.name;
        let total_id = resolve_template(calc.item_total_field, index);

        if !page.document().contains(&total_id) {
            log::warn!("[{}] Total field for item {} not found", name, index);
            self.calculate_overall_total(page);
            return;
        }

        let provided = item
            .and_then(|item| item.get(calc.item_total_key))
            .filter(|value| !value.is_null())
            .and_then(|value| match value {
                Value::Number(n) => n.as_f64(),
                other => parse_float(&value_to_string(other)),
            })
            .filter(|total| !total.is_nan());

        let total = match provided {
            Some(total) => {
                log::debug!("[{}] Used provided total for item {}: {}", name, index, total);
                total
            }
            None => {
                let doc = page.document();
                let quantity = doc
                    .value_of(&resolve_template(calc.quantity_field, index))
                    .map(parse_number)
                    .unwrap_or(0.0);
                let unit_price = doc
                    .value_of(&resolve_template(calc.unit_price_field, index))
                    .map(parse_number)
                    .unwrap_or(0.0);
                quantity * unit_price
            }
        };

        let text = format_fixed0(total);
        log::debug!("[{}] Calculated total for item {}: {}", name, index, text);
        page.document_mut().set_value(&total_id, text);

        self.calculate_overall_total(page);
    }

    /// Unrounded sum of every amount field over all item slots
    pub fn sum_amount_fields(&self, page: &Page) -> f64 {
        let mut overall_total = 0.0;
        for index in self.config.item_indices() {
            for pattern in self.config.amount_fields {
                if let Some(value) = page.document().value_of(&resolve_template(pattern, index)) {
                    overall_total += parse_number(value);
                }
            }
        }
        overall_total
    }

    /// Sum every amount field over all item slots and mirror the result into
    /// each total field. Returns the unrounded sum.
    pub fn calculate_overall_total(&self, page: &mut Page) -> f64 {
        let overall_total = self.sum_amount_fields(page);
        let text = format_fixed0(overall_total);
        for field_id in self.config.total_fields {
            page.document_mut().set_value(field_id, text.as_str());
        }

        log::debug!("[{}] Calculated overall total: {}", self.config.name, overall_total);
        overall_total
    }

    /// Form-specific validation; soft rules never block, this only reports.
    pub fn validate_form(&self, page: &Page) -> bool {
        self.hooks.validate_form(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Document, Element, ElementKind};
    use crate::registry::{FieldMapping, ItemCalculation};
    use serde_json::json;

    static LEDGER: FormConfig = FormConfig {
        name: "LedgerProcessor",
        form_id: "ledger_form",
        fixed_item_count: 3,
        items_key: Some("rows"),
        item_calculation: None,
        amount_fields: &["amount_{index}"],
        total_fields: &["total_top", "total_bottom"],
        field_mappings: &[FieldMapping {
            field_pattern: "amount_{index}",
            data_keys: &["amount"],
        }],
    };

    static ORDER: FormConfig = FormConfig {
        name: "OrderProcessor",
        form_id: "order_form",
        fixed_item_count: 2,
        items_key: Some("items"),
        item_calculation: Some(ItemCalculation {
            quantity_field: "qty_{index}",
            unit_price_field: "price_{index}",
            item_total_field: "line_{index}",
            item_total_key: "line_total",
        }),
        amount_fields: &["line_{index}"],
        total_fields: &["grand"],
        field_mappings: &[
            FieldMapping {
                field_pattern: "qty_{index}",
                data_keys: &["qty"],
            },
            FieldMapping {
                field_pattern: "price_{index}",
                data_keys: &["price"],
            },
        ],
    };

    fn page_for(config: &FormConfig, payload: Option<&str>) -> Page {
        let mut doc = Document::new();
        doc.append(Element::new(ElementKind::Form, config.form_id));
        if let Some(text) = payload {
            doc.append(Element::new(ElementKind::Script, ITEMS_DATA_SCRIPT_ID).with_text(text));
        }
        for index in config.item_indices() {
            for mapping in config.field_mappings {
                doc.append(Element::new(
                    ElementKind::Number,
                    resolve_template(mapping.field_pattern, index),
                ));
            }
            if let Some(calc) = config.item_calculation {
                doc.append(Element::new(
                    ElementKind::Number,
                    resolve_template(calc.item_total_field, index),
                ));
            }
        }
        for field_id in config.total_fields {
            doc.append(Element::new(ElementKind::Number, *field_id));
        }
        Page::new(doc)
    }

    #[test]
    fn test_missing_form_aborts_without_listeners() {
        let mut page = Page::new(Document::new());
        let err = FormProcessor::new(&LEDGER).initialize(&mut page).unwrap_err();
        assert!(matches!(err, FormError::FormNotFound { .. }));
    }

    #[test]
    fn test_grand_total_treats_garbage_as_zero() {
        let mut page = page_for(&LEDGER, None);
        let processor = FormProcessor::new(&LEDGER);
        processor.initialize(&mut page).unwrap();

        page.input("amount_1", "1500");
        page.input("amount_2", "abc");
        page.input("amount_3", "250.6");
        assert_eq!(page.value_of("total_top"), Some("1751"));
        assert_eq!(page.value_of("total_bottom"), Some("1751"));

        let first = processor.calculate_overall_total(&mut page);
        let second = processor.calculate_overall_total(&mut page);
        assert_eq!(first, second);
        assert_eq!(page.value_of("total_top"), Some("1751"));
    }

    #[test]
    fn test_excess_items_are_ignored() {
        let payload = json!({"rows": [
            {"amount": 1}, {"amount": 2}, {"amount": 3}, {"amount": 4}, {"amount": 5}
        ]});
        let mut page = page_for(&LEDGER, Some(&payload.to_string()));
        let report = FormProcessor::new(&LEDGER).initialize(&mut page).unwrap();

        assert_eq!(report.items_loaded, 3);
        assert_eq!(report.items_ignored, 2);
        assert_eq!(report.grand_total, 6.0);
        assert!(!page.document().contains("amount_4"));
    }

    #[test]
    fn test_empty_and_placeholder_payloads_populate_nothing() {
        for (text, status) in [("", PayloadStatus::Absent), ("{items_json}", PayloadStatus::Placeholder)] {
            let mut page = page_for(&LEDGER, Some(text));
            let report = FormProcessor::new(&LEDGER).initialize(&mut page).unwrap();

            assert_eq!(report.payload, status);
            assert_eq!(report.items_loaded, 0);
            assert_eq!(report.grand_total, 0.0);
            for index in LEDGER.item_indices() {
                assert_eq!(page.value_of(&format!("amount_{}", index)), Some(""));
            }
            assert_eq!(page.value_of("total_top"), Some("0"));
            assert_eq!(page.value_of("total_bottom"), Some("0"));
        }
    }

    #[test]
    fn test_malformed_payload_is_no_data() {
        let mut page = page_for(&LEDGER, Some("{\"rows\": [oops"));
        let report = FormProcessor::new(&LEDGER).initialize(&mut page).unwrap();
        assert!(matches!(report.payload, PayloadStatus::Malformed { .. }));
        assert_eq!(report.items_loaded, 0);
        assert_eq!(page.value_of("total_top"), Some("0"));
    }

    #[test]
    fn test_provided_line_total_wins_over_arithmetic() {
        let payload = json!({"items": [
            {"qty": 2, "price": 300, "line_total": "999.6"},
            {"qty": 3, "price": 150.5}
        ]});
        let mut page = page_for(&ORDER, Some(&payload.to_string()));
        let report = FormProcessor::new(&ORDER).initialize(&mut page).unwrap();

        assert_eq!(page.value_of("line_1"), Some("1000"));
        assert_eq!(page.value_of("line_2"), Some("452"));
        assert_eq!(page.value_of("grand"), Some("1452"));
        assert_eq!(report.grand_total, 1452.0);
    }

    #[test]
    fn test_unparsable_line_total_falls_back_to_arithmetic() {
        let payload = json!([{"qty": 4, "price": 25, "line_total": "n/a"}]);
        let mut page = page_for(&ORDER, Some(&payload.to_string()));
        FormProcessor::new(&ORDER).initialize(&mut page).unwrap();
        assert_eq!(page.value_of("line_1"), Some("100"));
    }

    #[test]
    fn test_editing_quantity_recomputes_line_and_grand_total() {
        let mut page = page_for(&ORDER, None);
        FormProcessor::new(&ORDER).initialize(&mut page).unwrap();

        page.input("qty_2", "3");
        page.input("price_2", "1200");
        assert_eq!(page.value_of("line_2"), Some("3600"));
        assert_eq!(page.value_of("grand"), Some("3600"));

        // Typing into a line total recomputes it from quantity x price
        page.input("line_2", "10");
        assert_eq!(page.value_of("line_2"), Some("3600"));
    }

    #[test]
    fn test_missing_fields_are_skipped() {
        let mut doc = Document::new();
        doc.append(Element::new(ElementKind::Form, "ledger_form"));
        doc.append(Element::new(ElementKind::Script, ITEMS_DATA_SCRIPT_ID).with_text(r#"{"rows":[{"amount":7}]}"#));
        doc.append(Element::new(ElementKind::Number, "amount_1"));
        doc.append(Element::new(ElementKind::Number, "total_bottom"));
        let mut page = Page::new(doc);

        let report = FormProcessor::new(&LEDGER).initialize(&mut page).unwrap();
        assert_eq!(report.items_loaded, 1);
        assert_eq!(page.value_of("total_bottom"), Some("7"));
    }
}
