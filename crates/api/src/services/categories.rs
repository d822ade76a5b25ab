//! Category tree assembly.

use std::collections::HashMap;

use kiosk_core::CategoryId;

use crate::models::{Category, CategoryTree};

/// Assemble a flat category list into a forest of root trees.
///
/// Children keep the input's relative order. A category whose parent is
/// missing from the input is treated as a root rather than dropped, so a
/// partial listing still renders.
#[must_use]
pub fn build_tree(categories: Vec<Category>) -> Vec<CategoryTree> {
    let ids: std::collections::HashSet<CategoryId> = categories.iter().map(|c| c.id).collect();

    let mut children_of: HashMap<CategoryId, Vec<Category>> = HashMap::new();
    let mut roots: Vec<Category> = Vec::new();

    for category in categories {
        match category.parent_id {
            Some(parent) if ids.contains(&parent) => {
                children_of.entry(parent).or_default().push(category);
            }
            _ => roots.push(category),
        }
    }

    roots
        .into_iter()
        .map(|root| attach_children(root, &mut children_of))
        .collect()
}

fn attach_children(
    category: Category,
    children_of: &mut HashMap<CategoryId, Vec<Category>>,
) -> CategoryTree {
    let children = children_of
        .remove(&category.id)
        .unwrap_or_default()
        .into_iter()
        .map(|child| attach_children(child, children_of))
        .collect();
    CategoryTree { category, children }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn category(name: &str, parent_id: Option<CategoryId>) -> Category {
        Category {
            id: CategoryId::generate(),
            name: name.to_string(),
            slug: name.to_lowercase(),
            description: None,
            image_url: None,
            is_active: true,
            parent_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_flat_list_becomes_roots() {
        let list = vec![category("a", None), category("b", None)];
        let tree = build_tree(list);
        assert_eq!(tree.len(), 2);
        assert!(tree.iter().all(|t| t.children.is_empty()));
    }

    #[test]
    fn test_nested_tree_assembly() {
        let root = category("electronics", None);
        let child = category("phones", Some(root.id));
        let grandchild = category("android", Some(child.id));
        let sibling = category("laptops", Some(root.id));

        let tree = build_tree(vec![root, child, sibling, grandchild]);
        assert_eq!(tree.len(), 1);

        let root = &tree[0];
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].category.name, "phones");
        assert_eq!(root.children[0].children.len(), 1);
        assert_eq!(root.children[0].children[0].category.name, "android");
        assert_eq!(root.children[1].category.name, "laptops");
    }

    #[test]
    fn test_orphan_promoted_to_root() {
        let missing_parent = CategoryId::generate();
        let tree = build_tree(vec![category("orphan", Some(missing_parent))]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].category.name, "orphan");
    }

    #[test]
    fn test_empty_input() {
        assert!(build_tree(Vec::new()).is_empty());
    }
}
