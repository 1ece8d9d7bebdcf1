use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::categories::models::Category;
use crate::shared::validation::validate_not_blank;

/// Response DTO for category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponseDto {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponseDto {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            parent_id: c.parent_id,
            name: c.name,
            slug: c.slug,
            description: c.description,
            image_url: c.image_url,
            display_order: c.display_order,
            is_active: c.is_active,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Response DTO for category tree (hierarchical structure)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(no_recursion)]
pub struct CategoryTreeDto {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub display_order: i32,
    pub children: Vec<CategoryTreeDto>,
}

impl CategoryTreeDto {
    /// Build tree from flat list of categories
    ///
    /// Categories whose parent is missing from the list (e.g. an inactive
    /// parent) are promoted to roots so they stay reachable.
    pub fn build_tree(categories: Vec<Category>) -> Vec<CategoryTreeDto> {
        let ids: HashSet<Uuid> = categories.iter().map(|c| c.id).collect();

        let mut children_of: HashMap<Option<Uuid>, Vec<&Category>> = HashMap::new();
        for c in &categories {
            let parent = c.parent_id.filter(|p| ids.contains(p));
            children_of.entry(parent).or_default().push(c);
        }

        let mut visited = HashSet::new();
        Self::build_level(None, &children_of, &mut visited)
    }

    fn build_level(
        parent: Option<Uuid>,
        children_of: &HashMap<Option<Uuid>, Vec<&Category>>,
        visited: &mut HashSet<Uuid>,
    ) -> Vec<CategoryTreeDto> {
        let Some(children) = children_of.get(&parent) else {
            return Vec::new();
        };

        children
            .iter()
            .filter_map(|c| {
                if !visited.insert(c.id) {
                    return None;
                }
                Some(CategoryTreeDto {
                    id: c.id,
                    name: c.name.clone(),
                    slug: c.slug.clone(),
                    description: c.description.clone(),
                    image_url: c.image_url.clone(),
                    display_order: c.display_order,
                    children: Self::build_level(Some(c.id), children_of, visited),
                })
            })
            .collect()
    }
}

/// Ids of `root` and every category below it
pub fn subtree_ids(root: Uuid, parents: &HashMap<Uuid, Option<Uuid>>) -> HashSet<Uuid> {
    let mut result = HashSet::from([root]);
    let mut changed = true;

    while changed {
        changed = false;
        for (id, parent) in parents {
            if let Some(parent) = parent {
                if result.contains(parent) && result.insert(*id) {
                    changed = true;
                }
            }
        }
    }

    result
}

/// Whether making `new_parent` the parent of `id` would put `id` under itself
pub fn creates_cycle(id: Uuid, new_parent: Uuid, parents: &HashMap<Uuid, Option<Uuid>>) -> bool {
    subtree_ids(id, parents).contains(&new_parent)
}

/// Admin form for creating or replacing a category
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CategoryFormDto {
    #[validate(
        length(min = 1, max = 120, message = "name is required"),
        custom(function = "validate_not_blank")
    )]
    pub name: String,

    /// Leave empty to generate from the name
    #[validate(length(max = 140))]
    pub slug: Option<String>,

    pub description: Option<String>,

    #[validate(url(message = "image_url must be a valid URL"))]
    pub image_url: Option<String>,

    pub parent_id: Option<Uuid>,

    #[serde(default)]
    pub display_order: i32,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Candidate parent offered to the category form picker
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ParentOptionDto {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: u128, parent: Option<u128>, name: &str) -> Category {
        Category {
            id: Uuid::from_u128(id),
            parent_id: parent.map(Uuid::from_u128),
            name: name.to_string(),
            slug: name.to_lowercase(),
            description: None,
            image_url: None,
            display_order: 0,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn parents(categories: &[Category]) -> HashMap<Uuid, Option<Uuid>> {
        categories.iter().map(|c| (c.id, c.parent_id)).collect()
    }

    #[test]
    fn test_build_tree_nests_children() {
        let tree = CategoryTreeDto::build_tree(vec![
            category(1, None, "Women"),
            category(2, Some(1), "Dresses"),
            category(3, Some(2), "Maxi"),
            category(4, None, "Men"),
        ]);

        assert_eq!(tree.len(), 2);
        let women = tree.iter().find(|c| c.name == "Women").unwrap();
        assert_eq!(women.children.len(), 1);
        assert_eq!(women.children[0].children[0].name, "Maxi");
    }

    #[test]
    fn test_build_tree_promotes_orphans() {
        let tree = CategoryTreeDto::build_tree(vec![category(2, Some(99), "Orphan")]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].name, "Orphan");
    }

    #[test]
    fn test_creates_cycle() {
        let all = vec![
            category(1, None, "Women"),
            category(2, Some(1), "Dresses"),
            category(3, Some(2), "Maxi"),
            category(4, None, "Men"),
        ];
        let map = parents(&all);
        let id = |n| Uuid::from_u128(n);

        assert!(creates_cycle(id(1), id(1), &map));
        assert!(creates_cycle(id(1), id(3), &map));
        assert!(creates_cycle(id(2), id(3), &map));
        assert!(!creates_cycle(id(3), id(1), &map));
        assert!(!creates_cycle(id(1), id(4), &map));
    }

    #[test]
    fn test_form_requires_name() {
        let form: CategoryFormDto = serde_json::from_value(serde_json::json!({
            "name": "   "
        }))
        .unwrap();
        assert!(form.validate().is_err());

        let form: CategoryFormDto = serde_json::from_value(serde_json::json!({
            "name": "Shoes"
        }))
        .unwrap();
        assert!(form.validate().is_ok());
        assert!(form.is_active);
    }
}
