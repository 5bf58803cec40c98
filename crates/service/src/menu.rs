//! Menu tree snapshot and traversal.
//!
//! The snapshot is built from `menu_buttons` rows for each update; nothing
//! here is cached across updates.

use std::collections::BTreeMap;

use models::menu_button;

pub const BACK_LABEL: &str = "⬅️ Назад";
pub const MAP_MENU_LABEL: &str = "🗺️ Показати на мапі";
pub const CONTACT_MENU_LABEL: &str = "✍️ Зв'язок з адміністратором";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuNode {
    pub id: i32,
    pub text: String,
    pub parent_id: Option<i32>,
}

impl From<menu_button::Model> for MenuNode {
    fn from(m: menu_button::Model) -> Self {
        Self { id: m.id, text: m.text, parent_id: m.parent_id }
    }
}

/// Where "back" leads from a non-root view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Back {
    Root,
    Node(i32),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuView {
    pub children: Vec<MenuNode>,
    pub back: Option<Back>,
}

#[derive(Clone, Debug, Default)]
pub struct MenuTree {
    nodes: BTreeMap<i32, MenuNode>,
}

impl MenuTree {
    /// Nodes whose parent is missing from the snapshot are promoted to roots.
    pub fn from_rows(rows: impl IntoIterator<Item = menu_button::Model>) -> Self {
        let nodes = rows.into_iter().map(|m| (m.id, MenuNode::from(m))).collect();
        Self { nodes }
    }

    pub fn is_empty(&self) -> bool { self.nodes.is_empty() }

    pub fn get(&self, id: i32) -> Option<&MenuNode> { self.nodes.get(&id) }

    fn effective_parent(&self, node: &MenuNode) -> Option<i32> {
        node.parent_id.filter(|p| self.nodes.contains_key(p))
    }

    /// Children of `parent` (`None` = roots), ordered by id.
    pub fn children_of(&self, parent: Option<i32>) -> Vec<MenuNode> {
        self.nodes
            .values()
            .filter(|n| self.effective_parent(n) == parent)
            .cloned()
            .collect()
    }

    pub fn has_children(&self, id: i32) -> bool {
        self.nodes.values().any(|n| self.effective_parent(n) == Some(id))
    }

    /// First node whose label matches `text` after trimming.
    pub fn find_by_text(&self, text: &str) -> Option<&MenuNode> {
        let text = text.trim();
        self.nodes.values().find(|n| n.text.trim() == text)
    }
}

/// View for `current` (`None` = root). Unknown ids yield `None`.
pub fn navigate(tree: &MenuTree, current: Option<i32>) -> Option<MenuView> {
    match current {
        None => Some(MenuView { children: tree.children_of(None), back: None }),
        Some(id) => {
            let node = tree.get(id)?;
            let back = match tree.effective_parent(node) {
                Some(parent) => Back::Node(parent),
                None => Back::Root,
            };
            Some(MenuView { children: tree.children_of(Some(id)), back: Some(back) })
        }
    }
}

/// Root labels used when the menu table is empty.
pub fn default_root_labels(category_labels: &[String]) -> Vec<String> {
    let mut labels = category_labels.to_vec();
    labels.push(MAP_MENU_LABEL.to_string());
    labels.push(CONTACT_MENU_LABEL.to_string());
    labels
}
