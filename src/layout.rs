//! Declarative page layouts
//!
//! A [`PageLayout`] lists the elements of a form page: the form element, the
//! embedded payload, loose fields and tables of row groups. Layouts load from
//! `.toml` or `.json` files, and [`PageLayout::scaffold`] produces the
//! standard page of every registered form.

use crate::dom::{Document, Element, ElementKind, SelectOption};
use crate::error::{FormError, Result};
use crate::forms::{HALF_DAY, QUARTER_DAY};
use crate::page::Page;
use crate::forms::transport_table::{ADD_TRANSPORT_ROW_BUTTON, TABLE_TOTAL, TRANSPORT_TABLE};
use crate::payload::{ITEMS_DATA_SCRIPT_ID, PAYLOAD_PLACEHOLDER, SLOTS_DATA_SCRIPT_ID};
use crate::registry::{FormConfig, FormKind};
use crate::utils::resolve_template;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const FULL_DAY: &str = "연차";
const DRAFT_DATE: &str = "draft_date";
const ADD_ROW_BUTTON: &str = "add_row_btn";
const REMOVE_ROW_BUTTON: &str = "remove_row_btn";

fn default_kind() -> ElementKind {
    ElementKind::Text
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldLayout {
    pub id: String,
    /// Defaults to the id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default = "default_kind")]
    pub kind: ElementKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Select options; each string is both value and label
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub checked: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,
}

impl FieldLayout {
    pub fn new(kind: ElementKind, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            kind,
            value: None,
            options: Vec::new(),
            checked: false,
            disabled: false,
        }
    }

    /// Field whose kind is guessed from its id
    pub fn inferred(id: &str) -> Self {
        Self::new(infer_kind(id), id)
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_options(mut self, options: &[&str]) -> Self {
        self.options = options.iter().map(|option| option.to_string()).collect();
        self
    }

    pub fn to_element(&self) -> Element {
        let mut element = Element::new(self.kind, self.id.as_str());
        if let Some(name) = &self.name {
            element = element.with_name(name.as_str());
        }
        if !self.options.is_empty() {
            element = element.with_options(
                self.options
                    .iter()
                    .map(|option| SelectOption::new(option.as_str(), option.as_str()))
                    .collect(),
            );
        }
        if let Some(value) = &self.value {
            element = element.with_value(value.as_str());
        }
        element.checked = self.checked;
        element.disabled = self.disabled;
        element
    }
}

/// Element kind for a field id, from the naming conventions of the forms
pub fn infer_kind(id: &str) -> ElementKind {
    if id.contains("date") {
        ElementKind::Date
    } else if id.contains("_time") {
        ElementKind::Time
    } else if ["amount", "quantity", "price", "days"]
        .iter()
        .any(|word| id.contains(word))
    {
        ElementKind::Number
    } else if ["reason", "details", "purpose"]
        .iter()
        .any(|word| id.contains(word))
    {
        ElementKind::Textarea
    } else {
        ElementKind::Text
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowGroupLayout {
    #[serde(default)]
    pub fields: Vec<FieldLayout>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableLayout {
    pub id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub row_groups: Vec<RowGroupLayout>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub form_id: String,
    /// Text of the `items-data` script; no script element when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    /// Text of the `form-slots-data` script; no script element when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slots: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldLayout>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tables: Vec<TableLayout>,
}

impl PageLayout {
    pub fn new(form_id: impl Into<String>) -> Self {
        Self {
            form_id: form_id.into(),
            payload: None,
            slots: None,
            fields: Vec::new(),
            tables: Vec::new(),
        }
    }

    /// Load a layout file, picking the format from its extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| FormError::FileNotFound {
            path: format!("Layout file {}: {}", path.display(), e),
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("toml") => Self::from_toml_str(&content),
            _ => Err(FormError::invalid_format(format!(
                "Layout file {} must be .json or .toml format",
                path.display()
            ))),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| FormError::invalid_format(format!("Invalid TOML layout: {}", e)))
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| FormError::invalid_format(format!("Invalid JSON layout: {}", e)))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| FormError::invalid_format(format!("Cannot write TOML layout: {}", e)))
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| FormError::invalid_format(format!("Cannot write JSON layout: {}", e)))
    }

    /// Write the layout, in JSON for a `.json` path and TOML otherwise.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => self.to_json_string()?,
            _ => self.to_toml_string()?,
        };
        fs::write(path, content)?;
        Ok(())
    }

    /// Standard page for a registered form.
    ///
    /// Every mapped, amount and total field is present for every item slot.
    /// The payload script holds the unsubstituted placeholder.
    pub fn scaffold(kind: FormKind) -> Self {
        let config = kind.config();
        let mut layout = Self::new(config.form_id).with_payload(PAYLOAD_PLACEHOLDER);
        let dynamic = has_dynamic_table(kind);

        if dynamic {
            layout.fields.push(FieldLayout::inferred(DRAFT_DATE));
        }

        let patterns = item_field_patterns(config);
        let mut row_groups = Vec::new();
        for index in config.item_indices() {
            let mut group = RowGroupLayout::default();
            for pattern in &patterns {
                let id = resolve_template(pattern, index);
                if !group.fields.iter().any(|field| field.id == id) {
                    group.fields.push(scaffold_field(&id));
                }
            }
            row_groups.push(group);
        }

        match table_id(kind) {
            Some(id) => layout.tables.push(TableLayout {
                id: id.to_string(),
                row_groups,
            }),
            None => layout
                .fields
                .extend(row_groups.into_iter().flat_map(|group| group.fields)),
        }

        for id in config.total_fields {
            if !layout.has_field(id) {
                layout.fields.push(FieldLayout::new(ElementKind::Number, *id));
            }
        }

        if dynamic {
            layout.fields.push(FieldLayout::new(ElementKind::Button, ADD_ROW_BUTTON));
            layout.fields.push(FieldLayout::new(ElementKind::Button, REMOVE_ROW_BUTTON));
        }

        // Rows of the transportation table are created when the page starts
        if kind == FormKind::TransportationExpense {
            layout.tables.push(TableLayout {
                id: TRANSPORT_TABLE.to_string(),
                row_groups: Vec::new(),
            });
            layout.fields.push(FieldLayout::new(ElementKind::Button, ADD_TRANSPORT_ROW_BUTTON));
            layout.fields.push(FieldLayout::new(ElementKind::Text, TABLE_TOTAL));
        }
        layout
    }

    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn with_slots(mut self, slots: impl Into<String>) -> Self {
        self.slots = Some(slots.into());
        self
    }

    /// Pre-fill a field the way a server-rendered page would.
    ///
    /// Returns false when no loose or table field has this id.
    pub fn set_field_value(&mut self, id: &str, value: impl Into<String>) -> bool {
        let mut fields = self.fields.iter_mut().chain(
            self.tables
                .iter_mut()
                .flat_map(|table| table.row_groups.iter_mut())
                .flat_map(|group| group.fields.iter_mut()),
        );
        match fields.find(|field| field.id == id) {
            Some(field) => {
                field.value = Some(value.into());
                true
            }
            None => false,
        }
    }

    pub fn with_field_value(mut self, id: &str, value: impl Into<String>) -> Self {
        self.set_field_value(id, value);
        self
    }

    /// Registered form whose form id this layout carries
    pub fn form_kind(&self) -> Option<FormKind> {
        FormKind::ALL
            .into_iter()
            .find(|kind| kind.config().form_id == self.form_id)
    }

    /// Whether a loose field or a table field has this id
    pub fn has_field(&self, id: &str) -> bool {
        self.fields.iter().any(|field| field.id == id)
            || self.tables.iter().any(|table| {
                table
                    .row_groups
                    .iter()
                    .any(|group| group.fields.iter().any(|field| field.id == id))
            })
    }

    pub fn build_document(&self) -> Document {
        let mut doc = Document::new();
        doc.append(Element::new(ElementKind::Form, self.form_id.as_str()));
        if let Some(payload) = &self.payload {
            doc.append(Element::new(ElementKind::Script, ITEMS_DATA_SCRIPT_ID).with_text(payload.as_str()));
        }
        if let Some(slots) = &self.slots {
            doc.append(Element::new(ElementKind::Script, SLOTS_DATA_SCRIPT_ID).with_text(slots.as_str()));
        }
        for field in &self.fields {
            doc.append(field.to_element());
        }
        for table in &self.tables {
            let row_groups: Vec<Vec<Element>> = table
                .row_groups
                .iter()
                .map(|group| group.fields.iter().map(FieldLayout::to_element).collect())
                .collect();
            doc.append_table(table.id.as_str(), row_groups);
        }
        doc
    }

    pub fn into_page(self) -> Page {
        Page::new(self.build_document())
    }
}

fn has_dynamic_table(kind: FormKind) -> bool {
    matches!(kind, FormKind::PersonalExpense | FormKind::PurchaseApproval)
}

fn table_id(kind: FormKind) -> Option<&'static str> {
    match kind {
        FormKind::PersonalExpense => Some("personal_expense_table"),
        FormKind::PurchaseApproval => Some("purchase_table"),
        FormKind::CorporateCard => Some("card_usage_table"),
        FormKind::Inventory => Some("inventory_table"),
        _ => None,
    }
}

/// Field patterns of one item slot: mapped fields, then the line total, then
/// amount fields not covered by either.
fn item_field_patterns(config: &FormConfig) -> Vec<&'static str> {
    let mut patterns: Vec<&'static str> = config
        .field_mappings
        .iter()
        .map(|mapping| mapping.field_pattern)
        .collect();
    if let Some(calc) = config.item_calculation {
        patterns.push(calc.item_total_field);
    }
    patterns.extend(config.amount_fields.iter().copied());
    patterns
}

fn scaffold_field(id: &str) -> FieldLayout {
    if id == "leave_type" {
        return FieldLayout::new(ElementKind::Select, id).with_options(&[FULL_DAY, HALF_DAY, QUARTER_DAY]);
    }
    FieldLayout::inferred(id)
}
