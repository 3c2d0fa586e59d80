//! Document tree renderer
//!
//! Turns fully materialized category trees into display rows. Every category
//! has its own expand/collapse toggle, expanded by default. A category
//! renders its header, then its child categories one level deeper, then its
//! own documents.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::models::{Document, DocumentCategory};
use crate::views::format::format_file_size;

/// Per-node expand state; nodes not listed are expanded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandState {
    collapsed: BTreeSet<i64>,
}

impl ExpandState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, category_id: i64) -> bool {
        !self.collapsed.contains(&category_id)
    }

    /// Flip one node; returns the new expanded flag
    pub fn toggle(&mut self, category_id: i64) -> bool {
        if !self.collapsed.remove(&category_id) {
            self.collapsed.insert(category_id);
            return false;
        }
        true
    }

    /// Parse the `collapsed=1,4,9` query form, ignoring junk entries
    pub fn from_query(value: &str) -> Self {
        Self {
            collapsed: value
                .split(',')
                .filter_map(|part| part.trim().parse().ok())
                .collect(),
        }
    }

    pub fn to_query(&self) -> String {
        self.collapsed
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Query string that shows this state with one node flipped
    pub fn toggled_query(&self, category_id: i64) -> String {
        let mut next = self.clone();
        next.toggle(category_id);
        next.to_query()
    }
}

/// One rendered line of the tree
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeRow {
    Category {
        id: i64,
        name: String,
        depth: usize,
        expanded: bool,
        /// False for empty categories: header only, no toggle
        show_indicator: bool,
        /// Collapsed-set query that flips this node
        toggle_query: String,
    },
    Document {
        id: i64,
        title: String,
        filename: String,
        depth: usize,
        download_url: String,
        /// Empty when the size is unknown
        size: String,
    },
}

/// Flatten root categories into rows honouring the expand state
pub fn render_rows(roots: &[DocumentCategory], state: &ExpandState) -> Vec<TreeRow> {
    let mut rows = Vec::new();
    for root in roots {
        render_category(root, 0, state, &mut rows);
    }
    rows
}

fn render_category(
    category: &DocumentCategory,
    depth: usize,
    state: &ExpandState,
    rows: &mut Vec<TreeRow>,
) {
    let expanded = state.is_expanded(category.id);
    rows.push(TreeRow::Category {
        id: category.id,
        name: category.name.clone(),
        depth,
        expanded,
        show_indicator: category.has_contents(),
        toggle_query: state.toggled_query(category.id),
    });

    if !expanded {
        return;
    }

    for child in &category.children {
        render_category(child, depth + 1, state, rows);
    }
    for document in &category.documents {
        rows.push(document_row(document, depth + 1));
    }
}

fn document_row(document: &Document, depth: usize) -> TreeRow {
    TreeRow::Document {
        id: document.id,
        title: document.title.clone(),
        filename: document.filename.clone(),
        depth,
        download_url: document.download_url(),
        size: format_file_size(document.file_size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    fn category(id: i64, children: Vec<DocumentCategory>, docs: Vec<Document>) -> DocumentCategory {
        DocumentCategory {
            id,
            name: format!("Категория {}", id),
            parent_id: None,
            order: 0,
            created_at: Utc::now(),
            children,
            documents: docs,
        }
    }

    fn document(id: i64, category_id: i64, size: Option<i64>) -> Document {
        Document {
            id,
            title: format!("Документ {}", id),
            filename: format!("doc{}.pdf", id),
            file_path: format!("uploads/doc{}.pdf", id),
            file_size: size,
            category_id,
            order: 0,
            is_visible: true,
            created_at: Utc::now(),
        }
    }

    fn document_ids(rows: &[TreeRow]) -> Vec<i64> {
        rows.iter()
            .filter_map(|row| match row {
                TreeRow::Document { id, .. } => Some(*id),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_children_render_before_own_documents() {
        let tree = vec![category(
            1,
            vec![category(2, vec![], vec![document(20, 2, Some(1024))])],
            vec![document(10, 1, None)],
        )];

        let rows = render_rows(&tree, &ExpandState::new());
        assert_eq!(rows.len(), 4);
        assert!(matches!(rows[0], TreeRow::Category { id: 1, depth: 0, .. }));
        assert!(matches!(rows[1], TreeRow::Category { id: 2, depth: 1, .. }));
        match &rows[2] {
            TreeRow::Document { id, depth, size, download_url, .. } => {
                assert_eq!(*id, 20);
                assert_eq!(*depth, 2);
                assert_eq!(size, "1.0 КБ");
                assert_eq!(download_url, "/api/documents/20/download");
            }
            other => panic!("unexpected row {:?}", other),
        }
        match &rows[3] {
            TreeRow::Document { id, depth, size, .. } => {
                assert_eq!(*id, 10);
                assert_eq!(*depth, 1);
                assert_eq!(size, "");
            }
            other => panic!("unexpected row {:?}", other),
        }
    }

    #[test]
    fn test_empty_category_has_no_indicator() {
        let rows = render_rows(&[category(7, vec![], vec![])], &ExpandState::new());
        assert_eq!(rows.len(), 1);
        assert!(matches!(
            rows[0],
            TreeRow::Category { show_indicator: false, expanded: true, .. }
        ));
    }

    #[test]
    fn test_collapse_is_local_to_one_node() {
        let tree = vec![
            category(
                1,
                vec![category(2, vec![], vec![document(20, 2, None)])],
                vec![],
            ),
            category(3, vec![], vec![document(30, 3, None)]),
        ];

        let mut state = ExpandState::new();
        state.toggle(2);
        let rows = render_rows(&tree, &state);
        assert_eq!(document_ids(&rows), vec![30]);

        // Collapsing the parent hides the child; the child keeps its own state
        state.toggle(1);
        assert!(!state.is_expanded(2));
        let rows = render_rows(&tree, &state);
        assert_eq!(rows.len(), 3);

        assert!(state.toggle(1));
        assert!(state.toggle(2));
        assert_eq!(document_ids(&render_rows(&tree, &state)), vec![20, 30]);
    }

    #[test]
    fn test_query_round_trip() {
        let state = ExpandState::from_query("4, 1,x,,9");
        assert!(!state.is_expanded(1));
        assert!(!state.is_expanded(4));
        assert!(state.is_expanded(2));
        assert_eq!(state.to_query(), "1,4,9");
        assert_eq!(state.toggled_query(4), "1,9");
        assert_eq!(state.toggled_query(2), "1,2,4,9");
    }

    #[derive(Debug, Clone)]
    struct Shape {
        children: Vec<Shape>,
        docs: usize,
    }

    fn arb_tree() -> impl Strategy<Value = DocumentCategory> {
        let leaf = (0usize..4).prop_map(|docs| Shape {
            children: Vec::new(),
            docs,
        });
        let shapes = leaf.prop_recursive(6, 48, 4, |inner| {
            (prop::collection::vec(inner, 0..4), 0usize..4)
                .prop_map(|(children, docs)| Shape { children, docs })
        });
        shapes.prop_map(|shape| {
            let mut next_id = 0;
            build(&shape, &mut next_id)
        })
    }

    fn build(shape: &Shape, next_id: &mut i64) -> DocumentCategory {
        *next_id += 1;
        let id = *next_id;
        let children = shape
            .children
            .iter()
            .map(|child| build(child, next_id))
            .collect();
        let documents = (0..shape.docs)
            .map(|_| {
                *next_id += 1;
                document(*next_id, id, Some(*next_id * 100))
            })
            .collect();
        category(id, children, documents)
    }

    proptest! {
        #[test]
        fn prop_expanded_tree_reaches_every_document(tree in arb_tree()) {
            let rows = render_rows(std::slice::from_ref(&tree), &ExpandState::new());
            prop_assert_eq!(document_ids(&rows).len(), tree.document_count());
        }
    }
}
