//! In-memory document holding the live state of a form page
//!
//! Elements live in an arena addressed by [`NodeId`]. Removed elements leave
//! a hole so ids handed out earlier never alias a different element, until
//! [`Document::reclaim_trailing_slots`] hands trailing holes back.
//! Tables own ordered row groups of field elements, which is what the
//! dynamic table helper clones and removes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Form,
    Script,
    Text,
    Number,
    Date,
    Time,
    Hidden,
    Textarea,
    Select,
    Checkbox,
    Radio,
    Button,
}

impl ElementKind {
    /// Kinds that hold user-editable data (input, select, textarea)
    pub fn is_field(self) -> bool {
        !matches!(self, ElementKind::Form | ElementKind::Script | ElementKind::Button)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: String,
    pub name: String,
    pub kind: ElementKind,
    value: String,
    pub checked: bool,
    pub disabled: bool,
    options: Vec<SelectOption>,
    selected_index: Option<usize>,
    text_content: String,
}

impl Element {
    pub fn new(kind: ElementKind, id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            kind,
            value: String::new(),
            checked: false,
            disabled: false,
            options: Vec::new(),
            selected_index: None,
            text_content: String::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.set_value(value);
        self
    }

    /// Replace the option list; the first option becomes selected.
    pub fn with_options(mut self, options: Vec<SelectOption>) -> Self {
        self.selected_index = if options.is_empty() { None } else { Some(0) };
        self.options = options;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_content = text.into();
        self
    }

    pub fn value(&self) -> &str {
        match self.kind {
            ElementKind::Select => self
                .selected_index
                .and_then(|i| self.options.get(i))
                .map(|option| option.value.as_str())
                .unwrap_or(""),
            _ => &self.value,
        }
    }

    /// Assign a value. A select picks the first option whose value or label
    /// matches and ends up with nothing selected otherwise.
    pub fn set_value(&mut self, value: impl Into<String>) {
        let value = value.into();
        match self.kind {
            ElementKind::Select => {
                self.selected_index = self
                    .options
                    .iter()
                    .position(|option| option.value == value)
                    .or_else(|| self.options.iter().position(|option| option.label == value));
            }
            _ => self.value = value,
        }
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    pub fn text_content(&self) -> &str {
        &self.text_content
    }

    pub fn set_text_content(&mut self, text: impl Into<String>) {
        self.text_content = text.into();
    }

    /// Clear user state the way a freshly added row expects it
    pub fn reset(&mut self) {
        match self.kind {
            ElementKind::Select => {
                self.selected_index = if self.options.is_empty() { None } else { Some(0) };
            }
            ElementKind::Checkbox | ElementKind::Radio => self.checked = false,
            _ => self.value.clear(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Table {
    pub id: String,
    row_groups: Vec<Vec<NodeId>>,
    created: usize,
}

impl Table {
    pub fn row_group_count(&self) -> usize {
        self.row_groups.len()
    }

    /// Row groups ever added to the table, removed ones included
    pub fn row_groups_created(&self) -> usize {
        self.created
    }

    pub fn row_groups(&self) -> &[Vec<NodeId>] {
        &self.row_groups
    }

    /// Position of the row group holding `node`
    pub fn position_of(&self, node: NodeId) -> Option<usize> {
        self.row_groups.iter().position(|group| group.contains(&node))
    }

    fn push_group(&mut self, group: Vec<NodeId>) {
        self.row_groups.push(group);
        self.created += 1;
    }
}

#[derive(Debug, Clone, Default)]
pub struct Document {
    nodes: Vec<Option<Element>>,
    tables: Vec<Table>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element outside of any table.
    pub fn append(&mut self, element: Element) -> NodeId {
        self.nodes.push(Some(element));
        NodeId(self.nodes.len() - 1)
    }

    /// First live element with the given id, in document order
    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        if id.is_empty() {
            return None;
        }
        self.nodes.iter().enumerate().find_map(|(index, slot)| match slot {
            Some(element) if element.id == id => Some(NodeId(index)),
            _ => None,
        })
    }

    pub fn element(&self, node: NodeId) -> Option<&Element> {
        self.nodes.get(node.0).and_then(Option::as_ref)
    }

    pub fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        self.nodes.get_mut(node.0).and_then(Option::as_mut)
    }

    pub fn get(&self, id: &str) -> Option<&Element> {
        self.by_id(id).and_then(|node| self.element(node))
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Element> {
        let node = self.by_id(id)?;
        self.element_mut(node)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id(id).is_some()
    }

    /// Current value of the element with `id`, if it exists
    pub fn value_of(&self, id: &str) -> Option<&str> {
        self.get(id).map(Element::value)
    }

    /// Assign a value by id. Returns false when no such element exists.
    pub fn set_value(&mut self, id: &str, value: impl Into<String>) -> bool {
        match self.get_mut(id) {
            Some(element) => {
                element.set_value(value);
                true
            }
            None => false,
        }
    }

    /// Live elements in document order
    pub fn elements(&self) -> impl Iterator<Item = (NodeId, &Element)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|element| (NodeId(index), element)))
    }

    /// Register a table; each row group is appended as a list of elements.
    pub fn append_table(&mut self, id: impl Into<String>, row_groups: Vec<Vec<Element>>) {
        let mut table = Table {
            id: id.into(),
            ..Default::default()
        };
        for group in row_groups {
            table.push_group(group.into_iter().map(|element| self.append(element)).collect());
        }
        self.tables.push(table);
    }

    pub fn table(&self, id: &str) -> Option<&Table> {
        self.tables.iter().find(|table| table.id == id)
    }

    fn table_index(&self, id: &str) -> Option<usize> {
        self.tables.iter().position(|table| table.id == id)
    }

    /// Append a new row group built from `elements`.
    ///
    /// Returns the node ids of the appended elements, or `None` when the table
    /// does not exist.
    pub fn append_row_group(&mut self, table_id: &str, elements: Vec<Element>) -> Option<Vec<NodeId>> {
        let table_index = self.table_index(table_id)?;
        let group: Vec<NodeId> = elements.into_iter().map(|element| self.append(element)).collect();
        self.tables[table_index].push_group(group.clone());
        Some(group)
    }

    /// Deep-copy the last row group of a table and append the copy.
    ///
    /// Returns the node ids of the copied elements, or `None` when the table
    /// does not exist or has no row group to copy.
    pub fn clone_last_row_group(&mut self, table_id: &str) -> Option<Vec<NodeId>> {
        let table_index = self.table_index(table_id)?;
        let last = self.tables[table_index].row_groups.last()?.clone();

        let copies: Vec<Element> = last
            .iter()
            .filter_map(|node| self.element(*node).cloned())
            .collect();
        let new_group: Vec<NodeId> = copies.into_iter().map(|element| self.append(element)).collect();

        self.tables[table_index].push_group(new_group.clone());
        Some(new_group)
    }

    /// Detach the row group at `position` and its elements.
    pub fn remove_row_group_at(&mut self, table_id: &str, position: usize) -> bool {
        let Some(table) = self.tables.iter_mut().find(|table| table.id == table_id) else {
            return false;
        };
        if position >= table.row_groups.len() {
            return false;
        }
        for node in table.row_groups.remove(position) {
            if let Some(slot) = self.nodes.get_mut(node.0) {
                *slot = None;
            }
        }
        true
    }

    /// Detach the last row group of a table and its elements.
    pub fn remove_last_row_group(&mut self, table_id: &str) -> bool {
        match self.table(table_id).map(Table::row_group_count) {
            Some(count) if count > 0 => self.remove_row_group_at(table_id, count - 1),
            _ => false,
        }
    }

    /// Drop the holes at the end of the arena so their slots get reused.
    ///
    /// Node ids of removed elements must no longer be held anywhere.
    pub fn reclaim_trailing_slots(&mut self) {
        while matches!(self.nodes.last(), Some(None)) {
            self.nodes.pop();
        }
    }

    /// Arena slots in use, holes included
    pub fn arena_len(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leave_type_select() -> Element {
        Element::new(ElementKind::Select, "leave_type").with_options(vec![
            SelectOption::new("연차", "Annual"),
            SelectOption::new("반차", "Half day"),
        ])
    }

    #[test]
    fn test_select_value_matches_value_or_label() {
        let mut select = leave_type_select();
        assert_eq!(select.value(), "연차");

        select.set_value("반차");
        assert_eq!(select.selected_index(), Some(1));

        select.set_value("Annual");
        assert_eq!(select.value(), "연차");

        select.set_value("sick");
        assert_eq!(select.selected_index(), None);
        assert_eq!(select.value(), "");

        select.reset();
        assert_eq!(select.selected_index(), Some(0));
    }

    #[test]
    fn test_by_id_skips_removed_elements() {
        let mut doc = Document::new();
        doc.append(Element::new(ElementKind::Form, "f"));
        doc.append_table(
            "t",
            vec![vec![Element::new(ElementKind::Number, "amount_1").with_value("5")]],
        );

        let copies = doc.clone_last_row_group("t").unwrap();
        assert_eq!(copies.len(), 1);
        assert_eq!(doc.table("t").unwrap().row_group_count(), 2);
        assert_eq!(doc.element(copies[0]).unwrap().value(), "5");

        assert!(doc.remove_last_row_group("t"));
        assert!(doc.element(copies[0]).is_none());
        assert_eq!(doc.value_of("amount_1"), Some("5"));
        assert!(!doc.remove_last_row_group("missing"));
    }

    #[test]
    fn test_remove_middle_row_group() {
        let mut doc = Document::new();
        doc.append_table("t", Vec::new());
        for index in 1..=3 {
            let amount = Element::new(ElementKind::Number, format!("amount_{}", index));
            doc.append_row_group("t", vec![amount]).unwrap();
        }
        assert!(doc.append_row_group("missing", Vec::new()).is_none());

        let node = doc.by_id("amount_2").unwrap();
        let table = doc.table("t").unwrap();
        assert_eq!(table.position_of(node), Some(1));
        assert_eq!(table.row_groups_created(), 3);

        assert!(doc.remove_row_group_at("t", 1));
        assert!(!doc.remove_row_group_at("t", 5));
        assert!(!doc.contains("amount_2"));
        assert!(doc.contains("amount_3"));
        assert_eq!(doc.table("t").unwrap().row_group_count(), 2);
        assert_eq!(doc.table("t").unwrap().row_groups_created(), 3);

        // Only holes at the end of the arena are reclaimed
        assert_eq!(doc.arena_len(), 3);
        doc.reclaim_trailing_slots();
        assert_eq!(doc.arena_len(), 3);
        assert!(doc.remove_last_row_group("t"));
        doc.reclaim_trailing_slots();
        assert_eq!(doc.arena_len(), 1);
    }

    #[test]
    fn test_reset_by_kind() {
        let mut checkbox = Element::new(ElementKind::Checkbox, "agree").with_value("yes");
        checkbox.checked = true;
        checkbox.reset();
        assert!(!checkbox.checked);
        assert_eq!(checkbox.value(), "yes");

        let mut text = Element::new(ElementKind::Text, "memo").with_value("hello");
        text.reset();
        assert_eq!(text.value(), "");
    }
}
