use std::collections::HashMap;

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use crate::{Category, CategoryNode, CategoryTree, ResultEngine, Wallet, categories};

use super::{Engine, find_wallet};

impl Engine {
    /// Assemble the categories of a wallet into a parent → children forest.
    ///
    /// Roots (no parent) come in creation order, and so do the children of
    /// each node. Depth is unbounded.
    pub async fn category_tree(&self, wallet_id: i64) -> ResultEngine<CategoryTree> {
        let wallet = Wallet::from(find_wallet(&self.database, wallet_id).await?);
        let rows = categories::Entity::find()
            .filter(categories::Column::WalletId.eq(wallet_id))
            .order_by_asc(categories::Column::Id)
            .all(&self.database)
            .await?;

        let roots = assemble(rows.into_iter().map(Category::from).collect());
        Ok(CategoryTree { wallet, roots })
    }
}

fn assemble(categories: Vec<Category>) -> Vec<CategoryNode> {
    let mut by_parent: HashMap<Option<i64>, Vec<Category>> = HashMap::new();
    for category in categories {
        by_parent.entry(category.parent_id).or_default().push(category);
    }
    children_of(&mut by_parent, None)
}

// Each bucket is taken out of the map once, so every category is visited at
// most once.
fn children_of(
    by_parent: &mut HashMap<Option<i64>, Vec<Category>>,
    parent: Option<i64>,
) -> Vec<CategoryNode> {
    by_parent
        .remove(&parent)
        .unwrap_or_default()
        .into_iter()
        .map(|category| {
            let children = children_of(by_parent, Some(category.id));
            CategoryNode { category, children }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: i64, parent_id: Option<i64>, root_id: i64) -> Category {
        Category {
            id,
            wallet_id: 1,
            name: format!("c{id}"),
            icon: String::new(),
            parent_id,
            root_id,
            is_global: false,
        }
    }

    fn ids(nodes: &[CategoryNode]) -> Vec<i64> {
        nodes.iter().map(|node| node.category.id).collect()
    }

    #[test]
    fn builds_nested_levels() {
        let roots = assemble(vec![
            category(1, None, 1),
            category(2, Some(1), 1),
            category(3, Some(1), 1),
            category(4, Some(2), 1),
            category(5, None, 5),
        ]);

        assert_eq!(ids(&roots), vec![1, 5]);
        assert_eq!(ids(&roots[0].children), vec![2, 3]);
        assert_eq!(ids(&roots[0].children[0].children), vec![4]);
        assert!(roots[0].children[1].children.is_empty());
        assert_eq!(roots[0].count(), 4);
    }

    #[test]
    fn detached_cycles_are_left_out() {
        let roots = assemble(vec![
            category(1, None, 1),
            category(2, Some(3), 1),
            category(3, Some(2), 1),
        ]);

        assert_eq!(ids(&roots), vec![1]);
        assert!(roots[0].children.is_empty());
    }
}
