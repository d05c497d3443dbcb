//! The field tree and its identity-addressed operations
//!
//! Every operation locates its target by `FieldId` anywhere in the nesting:
//! the root sequence first, then each node's `properties`, then its `item`,
//! in pre-order. A lookup that finds nothing leaves the tree untouched.

use serde_json::Value;

use crate::field::{Field, FieldId, FieldPatch, Slot};
use crate::schema;

/// Ordered collection of root fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldTree {
    roots: Vec<Field>,
}

impl FieldTree {
    pub fn new() -> Self {
        Self { roots: Vec::new() }
    }

    pub fn from_roots(roots: Vec<Field>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[Field] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total number of fields at every depth
    pub fn len(&self) -> usize {
        self.walk().count()
    }

    /// Append a new field to the root sequence and return its id
    pub fn add_root(&mut self) -> FieldId {
        let field = Field::new();
        let id = field.id;
        self.roots.push(field);
        tracing::debug!(%id, "added root field");
        id
    }

    pub fn find(&self, id: FieldId) -> Option<&Field> {
        self.walk().map(|(_, field)| field).find(|field| field.id == id)
    }

    pub fn find_mut(&mut self, id: FieldId) -> Option<&mut Field> {
        self.roots.iter_mut().find_map(|field| find_field_mut(field, id))
    }

    pub fn contains(&self, id: FieldId) -> bool {
        self.find(id).is_some()
    }

    /// Merge `patch` into the field with `id`. Returns false if no field matched.
    pub fn update(&mut self, id: FieldId, patch: FieldPatch) -> bool {
        match self.find_mut(id) {
            Some(field) => {
                tracing::debug!(%id, ?patch, "updating field");
                patch.apply(field);
                true
            }
            None => {
                tracing::debug!(%id, "update skipped, field not found");
                false
            }
        }
    }

    /// Attach a new field under `parent`.
    ///
    /// `Slot::Properties` appends to the parent's properties; `Slot::Items`
    /// replaces the parent's item. The parent's own type is not checked.
    pub fn add_child(&mut self, parent: FieldId, slot: Slot) -> Option<FieldId> {
        let Some(field) = self.find_mut(parent) else {
            tracing::debug!(%parent, ?slot, "add child skipped, parent not found");
            return None;
        };

        let child = Field::new();
        let id = child.id;
        match slot {
            Slot::Properties => field.properties.push(child),
            Slot::Items => field.item = Some(Box::new(child)),
        }
        tracing::debug!(%parent, %id, ?slot, "added child field");
        Some(id)
    }

    /// Delete the field with `id` and its whole subtree. Returns false if
    /// nothing was removed.
    pub fn remove(&mut self, id: FieldId) -> bool {
        let removed = prune(&mut self.roots, id);
        if removed {
            tracing::debug!(%id, "removed field");
        } else {
            tracing::debug!(%id, "remove skipped, field not found");
        }
        removed
    }

    /// Pre-order traversal of every field with its depth (roots are depth 0)
    pub fn walk(&self) -> Walk<'_> {
        Walk::new(&self.roots)
    }

    /// Compile the current tree into a JSON Schema object
    pub fn compile(&self) -> Value {
        schema::compile(&self.roots)
    }
}

fn find_field_mut(field: &mut Field, id: FieldId) -> Option<&mut Field> {
    if field.id == id {
        return Some(field);
    }
    for child in field.properties.iter_mut() {
        if let Some(found) = find_field_mut(child, id) {
            return Some(found);
        }
    }
    field
        .item
        .as_deref_mut()
        .and_then(|item| find_field_mut(item, id))
}

fn prune(fields: &mut Vec<Field>, id: FieldId) -> bool {
    let before = fields.len();
    fields.retain(|field| field.id != id);
    let mut removed = fields.len() != before;
    for field in fields.iter_mut() {
        removed |= prune_children(field, id);
    }
    removed
}

fn prune_children(field: &mut Field, id: FieldId) -> bool {
    let mut removed = prune(&mut field.properties, id);
    if field.item.as_ref().is_some_and(|item| item.id == id) {
        field.item = None;
        removed = true;
    } else if let Some(item) = field.item.as_deref_mut() {
        removed |= prune_children(item, id);
    }
    removed
}

/// Iterator returned by [`FieldTree::walk`]
pub struct Walk<'a> {
    stack: Vec<(usize, &'a Field)>,
}

impl<'a> Walk<'a> {
    fn new(roots: &'a [Field]) -> Self {
        Self {
            stack: roots.iter().rev().map(|field| (0, field)).collect(),
        }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a Field);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, field) = self.stack.pop()?;
        // Pushed in reverse so properties pop in order, then the item
        if let Some(item) = field.item.as_deref() {
            self.stack.push((depth + 1, item));
        }
        for child in field.properties.iter().rev() {
            self.stack.push((depth + 1, child));
        }
        Some((depth, field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldType;
    use std::collections::HashSet;

    /// Root object with one property, and a root array with one item
    fn sample_tree() -> (FieldTree, FieldId, FieldId, FieldId, FieldId) {
        let mut tree = FieldTree::new();
        let object = tree.add_root();
        tree.update(object, FieldPatch::new().name("addr").field_type(FieldType::Object));
        let city = tree.add_child(object, Slot::Properties).unwrap();
        tree.update(city, FieldPatch::new().name("city"));

        let array = tree.add_root();
        tree.update(array, FieldPatch::new().name("tags").field_type(FieldType::Array));
        let item = tree.add_child(array, Slot::Items).unwrap();

        (tree, object, city, array, item)
    }

    #[test]
    fn test_add_root_appends() {
        let mut tree = FieldTree::new();
        let first = tree.add_root();
        let second = tree.add_root();

        assert_eq!(tree.roots().len(), 2);
        assert_eq!(tree.roots()[0].id, first);
        assert_eq!(tree.roots()[1].id, second);
        assert_eq!(tree.roots()[1].field_type, FieldType::String);
    }

    #[test]
    fn test_update_nested_field() {
        let (mut tree, _, city, _, item) = sample_tree();

        assert!(tree.update(city, FieldPatch::new().required(true).description("Town")));
        assert!(tree.update(item, FieldPatch::new().field_type(FieldType::Number)));

        let city = tree.find(city).unwrap();
        assert!(city.required);
        assert_eq!(city.description(), Some("Town"));
        assert_eq!(tree.find(item).unwrap().field_type, FieldType::Number);
    }

    #[test]
    fn test_update_changes_only_target() {
        let (mut tree, object, city, array, item) = sample_tree();
        let before = tree.clone();

        tree.update(city, FieldPatch::new().name("town"));

        assert_eq!(tree.find(array), before.find(array));
        assert_eq!(tree.find(item), before.find(item));
        assert_eq!(tree.roots()[1], before.roots()[1]);

        let mut expected = before.find(city).unwrap().clone();
        expected.name = "town".to_string();
        assert_eq!(tree.find(city), Some(&expected));

        // The parent differs only through the renamed child
        let mut parent = tree.find(object).unwrap().clone();
        parent.properties[0].name = "city".to_string();
        assert_eq!(Some(&parent), before.find(object));
    }

    #[test]
    fn test_update_first_match_in_preorder() {
        let mut shared = Field::new();
        shared.name = "first".to_string();
        let mut duplicate = shared.clone();
        duplicate.name = "second".to_string();
        let mut parent = Field::new();
        parent.properties.push(duplicate);
        let mut tree = FieldTree::from_roots(vec![parent, shared.clone()]);

        tree.update(shared.id, FieldPatch::new().required(true));

        assert!(tree.roots()[0].properties[0].required);
        assert!(!tree.roots()[1].required);
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let (mut tree, ..) = sample_tree();
        let before = tree.clone();
        let missing = FieldId::new();

        assert!(!tree.update(missing, FieldPatch::new().name("x")));
        assert_eq!(tree.add_child(missing, Slot::Properties), None);
        assert_eq!(tree.add_child(missing, Slot::Items), None);
        assert!(!tree.remove(missing));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_add_then_remove_is_identity() {
        let (mut tree, ..) = sample_tree();
        let before = tree.clone();

        let id = tree.add_root();
        assert!(tree.remove(id));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_items_replaced_not_appended() {
        let (mut tree, _, _, array, first) = sample_tree();

        let second = tree.add_child(array, Slot::Items).unwrap();
        let third = tree.add_child(array, Slot::Items).unwrap();

        let array = tree.find(array).unwrap();
        assert_eq!(array.item.as_ref().unwrap().id, third);
        assert!(!tree.contains(first));
        assert!(!tree.contains(second));
    }

    #[test]
    fn test_add_property_preserves_order() {
        let (mut tree, object, city, _, _) = sample_tree();
        let zip = tree.add_child(object, Slot::Properties).unwrap();

        let ids: Vec<_> = tree.find(object).unwrap().properties.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![city, zip]);
    }

    #[test]
    fn test_add_child_ignores_parent_type() {
        let mut tree = FieldTree::new();
        let scalar = tree.add_root();

        let child = tree.add_child(scalar, Slot::Properties);

        assert!(child.is_some());
        assert_eq!(tree.roots()[0].properties.len(), 1);
    }

    #[test]
    fn test_remove_discards_subtree() {
        let (mut tree, object, city, array, item) = sample_tree();
        let deep = tree.add_child(city, Slot::Properties).unwrap();

        assert!(tree.remove(object));

        assert!(!tree.contains(object));
        assert!(!tree.contains(city));
        assert!(!tree.contains(deep));
        assert!(tree.contains(array));
        assert!(tree.contains(item));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_remove_every_field_sharing_an_id() {
        let shared = Field::new();
        let mut object = Field::new();
        object.properties.push(shared.clone());
        let mut array = Field::new();
        array.item = Some(Box::new(shared.clone()));
        let mut tree = FieldTree::from_roots(vec![shared.clone(), object, array]);

        assert!(tree.remove(shared.id));

        assert!(!tree.contains(shared.id));
        assert_eq!(tree.roots().len(), 2);
        assert!(tree.roots()[0].properties.is_empty());
        assert!(tree.roots()[1].item.is_none());
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_remove_item_and_nested_property() {
        let (mut tree, object, city, array, item) = sample_tree();

        assert!(tree.remove(item));
        assert!(tree.find(array).unwrap().item.is_none());

        assert!(tree.remove(city));
        assert!(tree.find(object).unwrap().properties.is_empty());
    }

    #[test]
    fn test_remove_inside_array_item_properties() {
        let mut tree = FieldTree::new();
        let list = tree.add_root();
        let item = tree.add_child(list, Slot::Items).unwrap();
        let name = tree.add_child(item, Slot::Properties).unwrap();
        let age = tree.add_child(item, Slot::Properties).unwrap();

        assert!(tree.remove(name));

        let item = tree.find(item).unwrap();
        assert_eq!(item.properties.len(), 1);
        assert_eq!(item.properties[0].id, age);
    }

    #[test]
    fn test_walk_is_preorder_with_depth() {
        let (tree, object, city, array, item) = sample_tree();

        let visited: Vec<_> = tree.walk().map(|(depth, f)| (depth, f.id)).collect();
        assert_eq!(
            visited,
            vec![(0, object), (1, city), (0, array), (1, item)]
        );
    }

    #[test]
    fn test_ids_stay_unique() {
        let mut tree = FieldTree::new();
        let root = tree.add_root();
        for _ in 0..5 {
            let child = tree.add_child(root, Slot::Properties).unwrap();
            tree.add_child(child, Slot::Items);
            tree.add_child(child, Slot::Items);
        }

        let ids: HashSet<_> = tree.walk().map(|(_, f)| f.id).collect();
        assert_eq!(ids.len(), tree.len());
        assert_eq!(tree.len(), 11);
    }

    #[test]
    fn test_deep_nesting() {
        let mut tree = FieldTree::new();
        let mut parent = tree.add_root();
        for _ in 0..64 {
            parent = tree.add_child(parent, Slot::Properties).unwrap();
        }

        assert!(tree.update(parent, FieldPatch::new().name("leaf")));
        let (depth, leaf) = tree.walk().last().unwrap();
        assert_eq!(depth, 64);
        assert_eq!(leaf.name, "leaf");
    }
}
