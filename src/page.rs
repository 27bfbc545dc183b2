//! A live form page: document, event listeners, dialogs and focus
//!
//! Everything runs on one thread. An event handler runs to completion,
//! including any dialog it raises, before the next event is dispatched.

use crate::dom::{Document, NodeId};
use crate::dynamic_table;
use crate::forms::transport_table;
use crate::processor::FormProcessor;
use crate::registry::FormConfig;
use crate::rules::Rule;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Input,
    Change,
    Blur,
    Click,
}

/// Work a listener performs when its event fires
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// An amount field changed; recompute its line or the grand total
    AmountChanged {
        config: &'static FormConfig,
        index: usize,
    },
    /// Quantity or unit price changed; recompute the line total
    ItemChanged {
        config: &'static FormConfig,
        index: usize,
    },
    Rule(Rule),
    AddRowGroup {
        table_id: String,
        remove_button_id: String,
    },
    RemoveRowGroup {
        table_id: String,
        remove_button_id: String,
    },
    AddTransportRow,
    /// Remove the transportation row holding this button
    RemoveTransportRow {
        button_id: String,
    },
    UpdateTransportTotal,
}

#[derive(Debug, Clone)]
struct Listener {
    node: NodeId,
    event: EventKind,
    action: Action,
}

/// A blocking dialog shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Dialog {
    Alert { message: String },
    Confirm { message: String, accepted: bool },
}

impl Dialog {
    pub fn message(&self) -> &str {
        match self {
            Dialog::Alert { message } | Dialog::Confirm { message, .. } => message,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Page {
    document: Document,
    listeners: Vec<Listener>,
    dialogs: Vec<Dialog>,
    focused: Option<NodeId>,
    confirm_answer: bool,
    today: NaiveDate,
}

impl Page {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            listeners: Vec::new(),
            dialogs: Vec::new(),
            focused: None,
            confirm_answer: true,
            today: chrono::Local::now().date_naive(),
        }
    }

    /// Fix the date used for "today" defaults
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Answer every confirm dialog with `accept`
    pub fn with_confirm_answer(mut self, accept: bool) -> Self {
        self.confirm_answer = accept;
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn value_of(&self, id: &str) -> Option<&str> {
        self.document.value_of(id)
    }

    pub fn add_listener(&mut self, node: NodeId, event: EventKind, action: Action) {
        self.listeners.push(Listener { node, event, action });
    }

    /// Attach a listener by element id; returns false when the id is unknown.
    pub fn listen(&mut self, id: &str, event: EventKind, action: Action) -> bool {
        match self.document.by_id(id) {
            Some(node) => {
                self.add_listener(node, event, action);
                true
            }
            None => false,
        }
    }

    /// Listeners attached anywhere on the page
    pub fn listener_total(&self) -> usize {
        self.listeners.len()
    }

    pub fn listener_count(&self, id: &str, event: EventKind) -> usize {
        match self.document.by_id(id) {
            Some(node) => self
                .listeners
                .iter()
                .filter(|listener| listener.node == node && listener.event == event)
                .count(),
            None => 0,
        }
    }

    /// Fire `event` on the element with `id`, running its listeners in attach
    /// order. Returns the number of listeners run.
    pub fn dispatch(&mut self, id: &str, event: EventKind) -> usize {
        let Some(node) = self.document.by_id(id) else {
            log::warn!("Cannot dispatch {:?}: element \"{}\" not found", event, id);
            return 0;
        };
        let actions: Vec<Action> = self
            .listeners
            .iter()
            .filter(|listener| listener.node == node && listener.event == event)
            .map(|listener| listener.action.clone())
            .collect();

        let count = actions.len();
        for action in actions {
            self.run(action);
        }
        count
    }

    fn run(&mut self, action: Action) {
        match action {
            Action::AmountChanged { config, index } => {
                FormProcessor::new(config).on_amount_field_change(self, index);
            }
            Action::ItemChanged { config, index } => {
                FormProcessor::new(config).calculate_item_total(self, index, None);
            }
            Action::Rule(rule) => rule.apply(self),
            Action::AddRowGroup {
                table_id,
                remove_button_id,
            } => dynamic_table::on_add_click(self, &table_id, &remove_button_id),
            Action::RemoveRowGroup {
                table_id,
                remove_button_id,
            } => dynamic_table::on_remove_click(self, &table_id, &remove_button_id),
            Action::AddTransportRow => {
                transport_table::add_transport_row(self);
            }
            Action::RemoveTransportRow { button_id } => {
                transport_table::remove_transport_row(self, &button_id);
            }
            Action::UpdateTransportTotal => transport_table::update_total_amount(self),
        }
    }

    /// Remove a table row group together with the listeners and focus bound
    /// to its elements.
    pub fn remove_row_group(&mut self, table_id: &str, position: usize) -> bool {
        if !self.document.remove_row_group_at(table_id, position) {
            return false;
        }
        let document = &self.document;
        self.listeners
            .retain(|listener| document.element(listener.node).is_some());
        if self.focused.is_some_and(|node| document.element(node).is_none()) {
            self.focused = None;
        }
        self.document.reclaim_trailing_slots();
        true
    }

    pub fn remove_last_row_group(&mut self, table_id: &str) -> bool {
        match self.document.table(table_id).map(|table| table.row_group_count()) {
            Some(count) if count > 0 => self.remove_row_group(table_id, count - 1),
            _ => false,
        }
    }

    /// Type a value into a field: assign it, then fire `input`.
    pub fn input(&mut self, id: &str, value: &str) -> bool {
        if !self.document.set_value(id, value) {
            log::warn!("Cannot type into \"{}\": element not found", id);
            return false;
        }
        self.dispatch(id, EventKind::Input);
        true
    }

    /// Commit a value to a field: assign it, then fire `input` and `change`.
    pub fn change(&mut self, id: &str, value: &str) -> bool {
        if !self.input(id, value) {
            return false;
        }
        self.dispatch(id, EventKind::Change);
        true
    }

    /// Move focus away from a field and fire `blur` on it.
    pub fn blur(&mut self, id: &str) -> bool {
        let Some(node) = self.document.by_id(id) else {
            return false;
        };
        if self.focused == Some(node) {
            self.focused = None;
        }
        self.dispatch(id, EventKind::Blur);
        true
    }

    /// Click an element. Disabled elements swallow the click.
    pub fn click(&mut self, id: &str) -> bool {
        match self.document.get(id) {
            Some(element) if !element.disabled => {
                self.dispatch(id, EventKind::Click);
                true
            }
            Some(_) => false,
            None => {
                log::warn!("Cannot click \"{}\": element not found", id);
                false
            }
        }
    }

    pub fn alert(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("alert: {}", message);
        self.dialogs.push(Dialog::Alert { message });
    }

    pub fn confirm(&mut self, message: impl Into<String>) -> bool {
        let message = message.into();
        let accepted = self.confirm_answer;
        log::warn!("confirm: {} -> {}", message, if accepted { "ok" } else { "cancel" });
        self.dialogs.push(Dialog::Confirm { message, accepted });
        accepted
    }

    pub fn focus(&mut self, id: &str) {
        if let Some(node) = self.document.by_id(id) {
            self.focused = Some(node);
        }
    }

    pub fn focused_id(&self) -> Option<&str> {
        self.focused
            .and_then(|node| self.document.element(node))
            .map(|element| element.id.as_str())
    }

    pub fn dialogs(&self) -> &[Dialog] {
        &self.dialogs
    }

    /// Messages of every alert raised so far
    pub fn alerts(&self) -> Vec<&str> {
        self.dialogs
            .iter()
            .filter(|dialog| matches!(dialog, Dialog::Alert { .. }))
            .map(Dialog::message)
            .collect()
    }

    pub fn clear_dialogs(&mut self) {
        self.dialogs.clear();
    }
}
