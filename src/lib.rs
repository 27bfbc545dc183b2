//! Form population and total calculation engine
//!
//! Expense and approval pages are rendered with a JSON payload embedded in a
//! script element. This crate reads that payload, fills the page's fields,
//! keeps line and grand totals up to date as fields are edited, and wires the
//! per-form business rules (date ranges, time windows, numeric bounds).
//!
//! # Features
//!
//! - Declarative configuration for eight expense and approval forms
//! - Line-item population with payload key fallbacks
//! - Quantity x unit price line totals and mirrored grand totals
//! - Soft business rules that alert and refocus without reverting values
//! - Growable item tables with renumbered row groups
//! - TOML/JSON page layouts and a command-line front end
//!
//! # Basic Usage
//!
//! ```rust
//! use formfill::{initialize_form, FormKind, PageLayout, Result};
//!
//! fn main() -> Result<()> {
//!     let mut page = PageLayout::scaffold(FormKind::Inventory)
//!         .with_payload(r#"{"items": [{"item_quantity": 2, "item_unit_price": 1500}]}"#)
//!         .into_page();
//!     let report = initialize_form("inventory", &mut page)?;
//!     assert_eq!(report.grand_total, 3000.0);
//!     assert_eq!(page.value_of("total_amount"), Some("3000"));
//!     Ok(())
//! }
//! ```
//!
//! # Initialization Order
//!
//! 1. Check that the form element exists
//! 2. Attach input listeners to amount, quantity and unit price fields
//! 3. Parse the embedded payload and populate item slots
//! 4. Compute line totals and the grand total
//! 5. Run the form's own hooks (rules, defaults, dynamic tables)

pub mod cli;
pub mod dom;
pub mod dynamic_table;
pub mod error;
pub mod forms;
pub mod layout;
pub mod page;
pub mod payload;
pub mod processor;
pub mod registry;
pub mod rules;
pub mod utils;

use chrono::NaiveDate;
use serde::Serialize;
use std::fs;
use std::path::Path;

// Re-export commonly used types and functions
pub use cli::FormCli;
pub use dom::{Document, Element, ElementKind, NodeId, SelectOption};
pub use error::{FormError, Result};
pub use forms::{hooks_for, FormHooks};
pub use layout::{FieldLayout, PageLayout, RowGroupLayout, TableLayout};
pub use page::{Action, Dialog, EventKind, Page};
pub use payload::{Payload, PayloadStatus};
pub use processor::{FormProcessor, InitReport};
pub use registry::{get_form_config, supported_forms, FieldMapping, FormConfig, FormKind, ItemCalculation};
pub use rules::Rule;

/// Engine version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// How a page behaves while it is being filled
#[derive(Debug, Clone)]
pub struct FillOptions {
    /// Date used for "today" defaults; the local date when unset
    pub today: Option<NaiveDate>,

    /// Answer given to every confirm dialog
    pub confirm_dialogs: bool,
}

impl Default for FillOptions {
    fn default() -> Self {
        Self {
            today: None,
            confirm_dialogs: true,
        }
    }
}

impl FillOptions {
    pub fn page_for(&self, layout: &PageLayout) -> Page {
        let page = Page::new(layout.build_document()).with_confirm_answer(self.confirm_dialogs);
        match self.today {
            Some(today) => page.with_today(today),
            None => page,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldValue {
    pub id: String,
    pub value: String,
}

/// State of a page after initialization
#[derive(Debug, Clone, Serialize)]
pub struct FilledForm {
    pub form_type: &'static str,
    pub report: InitReport,
    /// Result of the form's own validation
    pub valid: bool,
    pub fields: Vec<FieldValue>,
    pub dialogs: Vec<Dialog>,
}

impl FilledForm {
    pub fn value_of(&self, id: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.id == id)
            .map(|field| field.value.as_str())
    }
}

/// Initialize the processor registered under `form_type` on a page.
pub fn initialize_form(form_type: &str, page: &mut Page) -> Result<InitReport> {
    let Some(kind) = FormKind::from_form_type(form_type) else {
        log::error!("Configuration not found for form type: {}", form_type);
        return Err(FormError::ConfigNotFound {
            form_type: form_type.to_string(),
        });
    };
    FormProcessor::for_kind(kind).initialize(page)
}

/// Initialize `kind` on a page and capture the resulting field values.
pub fn fill_page(kind: FormKind, mut page: Page) -> Result<FilledForm> {
    let processor = FormProcessor::for_kind(kind);
    let report = processor.initialize(&mut page)?;
    let valid = processor.validate_form(&page);

    let fields = page
        .document()
        .elements()
        .filter(|(_, element)| element.kind.is_field())
        .map(|(_, element)| FieldValue {
            id: element.id.clone(),
            value: element.value().to_string(),
        })
        .collect();

    Ok(FilledForm {
        form_type: kind.form_type(),
        report,
        valid,
        fields,
        dialogs: page.dialogs().to_vec(),
    })
}

/// Build a page from `layout` and fill it as `kind`.
pub fn fill_layout(kind: FormKind, layout: &PageLayout, options: &FillOptions) -> Result<FilledForm> {
    fill_page(kind, options.page_for(layout))
}

/// Read the text of a payload file; the content is parsed at initialization.
pub fn read_payload_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|e| FormError::payload(path.display().to_string(), e.to_string()))
}
