use std::collections::{HashMap, HashSet};
use std::pin::Pin;

use async_stream::try_stream;
use futures_util::{Stream, TryStreamExt};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{entity::menu_item::ParentLink, entity::prelude::*, ids::MenuItemId};

use super::now;

pub type MenuStream<'a> = Pin<Box<dyn Stream<Item = Result<MenuNode, MenuError>> + 'a>>;

#[derive(Debug, Error)]
pub enum MenuError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("menu item not found")]
    ItemNotFound,

    #[error("parent menu item not found")]
    ParentNotFound,

    #[error("menu item {0} is its own ancestor")]
    CycleDetected(MenuItemId),

    #[error("an item cannot be moved under itself or one of its descendants")]
    WouldCreateCycle,
}

/// An item found below a traversal root; `depth` is 1 for direct children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuNode {
    pub item: MenuItemModel,
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuTree {
    pub item: MenuItemModel,
    pub children: Vec<MenuTree>,
}

impl MenuTree {
    /// Number of items in the tree, root included
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(MenuTree::size).sum::<usize>()
    }
}

/// Self-referencing menu items.
///
/// Nothing is loaded implicitly; relatives are fetched with explicit, bounded queries.
#[derive(Clone)]
pub struct MenuService {
    db: DatabaseConnection,
    max_depth: usize,
}

impl MenuService {
    pub fn new(db: DatabaseConnection, max_depth: usize) -> Self {
        Self { db, max_depth }
    }

    pub async fn create_item(
        &self,
        title: String,
        parent: Option<MenuItemId>,
        position: i32,
    ) -> Result<MenuItemModel, MenuError> {
        if let Some(parent) = parent {
            if MenuItem::find_by_id(parent).one(&self.db).await?.is_none() {
                return Err(MenuError::ParentNotFound);
            }
        }

        let item = MenuItemActiveModel {
            title: Set(title),
            position: Set(position),
            parent_id: Set(parent),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        tracing::info!(item_id = %item.id, parent = ?parent, "menu item created");
        Ok(item)
    }

    pub async fn get_item(&self, id: MenuItemId) -> Result<MenuItemModel, MenuError> {
        MenuItem::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(MenuError::ItemNotFound)
    }

    /// Top level items, by position
    pub async fn roots(&self) -> Result<Vec<MenuItemModel>, MenuError> {
        let roots = MenuItem::find()
            .filter(MenuItemColumn::ParentId.is_null())
            .order_by_asc(MenuItemColumn::Position)
            .order_by_asc(MenuItemColumn::Id)
            .all(&self.db)
            .await?;

        Ok(roots)
    }

    /// Direct children, by position
    pub async fn children(&self, id: MenuItemId) -> Result<Vec<MenuItemModel>, MenuError> {
        let children = MenuItem::find()
            .filter(MenuItemColumn::ParentId.eq(id))
            .order_by_asc(MenuItemColumn::Position)
            .order_by_asc(MenuItemColumn::Id)
            .all(&self.db)
            .await?;

        Ok(children)
    }

    pub async fn parent(&self, id: MenuItemId) -> Result<Option<MenuItemModel>, MenuError> {
        let item = self.get_item(id).await?;
        let parent = item.find_linked(ParentLink).one(&self.db).await?;

        Ok(parent)
    }

    /// Path from the item's parent up to its root, nearest first
    pub async fn ancestors(&self, id: MenuItemId) -> Result<Vec<MenuItemModel>, MenuError> {
        let item = self.get_item(id).await?;
        ancestors_of(&self.db, item).await
    }

    /// Re-parent an item, or make it a root with `None`.
    pub async fn move_item(
        &self,
        id: MenuItemId,
        new_parent: Option<MenuItemId>,
    ) -> Result<MenuItemModel, MenuError> {
        let txn = self.db.begin().await?;

        let item = MenuItem::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(MenuError::ItemNotFound)?;

        if let Some(parent_id) = new_parent {
            if parent_id == id {
                return Err(MenuError::WouldCreateCycle);
            }

            let parent = MenuItem::find_by_id(parent_id)
                .one(&txn)
                .await?
                .ok_or(MenuError::ParentNotFound)?;

            let lineage = ancestors_of(&txn, parent).await?;
            if lineage.iter().any(|ancestor| ancestor.id == id) {
                tracing::warn!(item_id = %id, parent = %parent_id, "rejected cyclic move");
                return Err(MenuError::WouldCreateCycle);
            }
        }

        let mut active: MenuItemActiveModel = item.into();
        active.parent_id = Set(new_parent);
        active.updated_at = Set(now());
        let item = active.update(&txn).await?;

        txn.commit().await?;

        tracing::info!(item_id = %id, parent = ?new_parent, "menu item moved");
        Ok(item)
    }

    /// Delete an item together with everything below it.
    pub async fn delete_item(&self, id: MenuItemId) -> Result<(), MenuError> {
        let result = MenuItem::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(MenuError::ItemNotFound);
        }

        tracing::info!(item_id = %id, "menu item deleted");
        Ok(())
    }

    /// Everything below `root`, level by level, down to `max_depth`.
    ///
    /// Each level costs one query. Items come out in breadth-first order and, within a
    /// level, grouped by parent and sorted by position.
    pub fn descendants(&self, root: MenuItemId, max_depth: usize) -> MenuStream<'_> {
        let db = &self.db;

        Box::pin(try_stream! {
            MenuItem::find_by_id(root)
                .one(db)
                .await?
                .ok_or(MenuError::ItemNotFound)?;

            let mut seen = HashSet::from([root]);
            let mut frontier = vec![root];
            let mut depth = 0;

            while !frontier.is_empty() && depth < max_depth {
                depth += 1;

                let level = MenuItem::find()
                    .filter(MenuItemColumn::ParentId.is_in(frontier.iter().copied()))
                    .order_by_asc(MenuItemColumn::ParentId)
                    .order_by_asc(MenuItemColumn::Position)
                    .order_by_asc(MenuItemColumn::Id)
                    .all(db)
                    .await?;

                tracing::debug!(root = %root, depth, items = level.len(), "menu level loaded");

                frontier = Vec::with_capacity(level.len());
                for item in level {
                    mark_seen(&mut seen, item.id)?;
                    frontier.push(item.id);
                    yield MenuNode { item, depth };
                }
            }
        })
    }

    /// `root` with its descendants down to `max_depth`, nested.
    pub async fn load_tree(
        &self,
        root: MenuItemId,
        max_depth: usize,
    ) -> Result<MenuTree, MenuError> {
        let root = self.get_item(root).await?;
        let nodes: Vec<MenuNode> = self.descendants(root.id, max_depth).try_collect().await?;

        let mut by_parent: HashMap<MenuItemId, Vec<MenuItemModel>> = HashMap::new();
        for node in nodes {
            if let Some(parent) = node.item.parent_id {
                by_parent.entry(parent).or_default().push(node.item);
            }
        }

        Ok(assemble(root, &mut by_parent))
    }

    /// Like [`MenuService::load_tree`], bounded by the configured depth
    pub async fn full_tree(&self, root: MenuItemId) -> Result<MenuTree, MenuError> {
        self.load_tree(root, self.max_depth).await
    }
}

fn mark_seen(seen: &mut HashSet<MenuItemId>, id: MenuItemId) -> Result<(), MenuError> {
    if seen.insert(id) {
        Ok(())
    } else {
        tracing::warn!(item_id = %id, "cycle in menu tree");
        Err(MenuError::CycleDetected(id))
    }
}

async fn ancestors_of<C: ConnectionTrait>(
    db: &C,
    item: MenuItemModel,
) -> Result<Vec<MenuItemModel>, MenuError> {
    let mut seen = HashSet::from([item.id]);
    let mut lineage = Vec::new();
    let mut current = item;

    while let Some(parent) = current.find_linked(ParentLink).one(db).await? {
        mark_seen(&mut seen, parent.id)?;
        lineage.push(parent.clone());
        current = parent;
    }

    Ok(lineage)
}

fn assemble(
    item: MenuItemModel,
    by_parent: &mut HashMap<MenuItemId, Vec<MenuItemModel>>,
) -> MenuTree {
    let children = by_parent
        .remove(&item.id)
        .unwrap_or_default()
        .into_iter()
        .map(|child| assemble(child, by_parent))
        .collect();

    MenuTree { item, children }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;
    use sea_orm::sea_query::Expr;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    async fn setup_test_service() -> MenuService {
        let db = test_utils::create_test_db_with_migrations().await;
        MenuService::new(db, 16)
    }

    /// A root with `branching` children per item, `depth` levels deep.
    async fn build_tree(menu: &MenuService, depth: usize, branching: usize) -> MenuItemModel {
        let root = menu
            .create_item("root".to_string(), None, 0)
            .await
            .unwrap();

        let mut level = vec![root.id];
        for d in 1..=depth {
            let mut next = Vec::new();
            for parent in &level {
                for b in 0..branching {
                    let item = menu
                        .create_item(format!("{d}.{b}"), Some(*parent), b as i32)
                        .await
                        .unwrap();
                    next.push(item.id);
                }
            }
            level = next;
        }

        root
    }

    #[tokio::test]
    async fn test_create_item_and_children() {
        let menu = setup_test_service().await;

        let root = menu
            .create_item("Films".to_string(), None, 0)
            .await
            .expect("Failed to create menu item");
        assert_eq!(root.parent_id, None);

        menu.create_item("Coming soon".to_string(), Some(root.id), 2)
            .await
            .unwrap();
        menu.create_item("Now showing".to_string(), Some(root.id), 1)
            .await
            .unwrap();

        let titles: Vec<String> = menu
            .children(root.id)
            .await
            .unwrap()
            .into_iter()
            .map(|item| item.title)
            .collect();
        assert_eq!(titles, vec!["Now showing", "Coming soon"]);

        assert_eq!(menu.roots().await.unwrap().len(), 1);

        let orphan = menu
            .create_item("Orphan".to_string(), Some(MenuItemId::new(404)), 0)
            .await;
        assert!(matches!(orphan, Err(MenuError::ParentNotFound)));
    }

    #[tokio::test]
    async fn test_parent_and_ancestors() {
        let menu = setup_test_service().await;
        let a = menu.create_item("a".to_string(), None, 0).await.unwrap();
        let b = menu.create_item("b".to_string(), Some(a.id), 0).await.unwrap();
        let c = menu.create_item("c".to_string(), Some(b.id), 0).await.unwrap();

        assert_eq!(menu.parent(c.id).await.unwrap().map(|p| p.id), Some(b.id));
        assert_eq!(menu.parent(a.id).await.unwrap(), None);

        let lineage: Vec<MenuItemId> = menu
            .ancestors(c.id)
            .await
            .unwrap()
            .into_iter()
            .map(|item| item.id)
            .collect();
        assert_eq!(lineage, vec![b.id, a.id]);
    }

    #[tokio::test]
    async fn test_descendant_count() {
        let menu = setup_test_service().await;
        let (depth, branching) = (3, 3);
        let root = build_tree(&menu, depth, branching).await;

        let nodes: Vec<MenuNode> = menu.descendants(root.id, 16).try_collect().await.unwrap();

        // 3 + 9 + 27
        assert_eq!(nodes.len(), 39);
        assert!(nodes.windows(2).all(|pair| pair[0].depth <= pair[1].depth));
        assert_eq!(nodes.iter().filter(|node| node.depth == depth).count(), 27);
    }

    #[tokio::test]
    async fn test_descendants_cost_one_query_per_level() {
        let mut db = test_utils::create_test_db_with_migrations().await;
        let statements = Arc::new(AtomicUsize::new(0));
        let counter = statements.clone();
        db.set_metric_callback(move |_info| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let menu = MenuService::new(db, 16);
        let (depth, branching) = (4, 3);
        let root = build_tree(&menu, depth, branching).await;

        statements.store(0, Ordering::SeqCst);
        let nodes: Vec<MenuNode> = menu
            .descendants(root.id, depth)
            .try_collect()
            .await
            .unwrap();

        assert_eq!(nodes.len(), 3 + 9 + 27 + 81);
        // Root lookup, then one select per level regardless of fan-out
        assert_eq!(statements.load(Ordering::SeqCst), depth + 1);
    }

    #[tokio::test]
    async fn test_descendants_respect_depth_bound() {
        let menu = setup_test_service().await;
        let root = build_tree(&menu, 4, 2).await;

        let nodes: Vec<MenuNode> = menu.descendants(root.id, 2).try_collect().await.unwrap();
        assert_eq!(nodes.len(), 2 + 4);
        assert!(nodes.iter().all(|node| node.depth <= 2));

        let none: Vec<MenuNode> = menu.descendants(root.id, 0).try_collect().await.unwrap();
        assert!(none.is_empty());

        let missing: Result<Vec<MenuNode>, MenuError> =
            menu.descendants(MenuItemId::new(404), 3).try_collect().await;
        assert!(matches!(missing, Err(MenuError::ItemNotFound)));
    }

    #[tokio::test]
    async fn test_load_tree() {
        let menu = setup_test_service().await;
        let root = build_tree(&menu, 2, 2).await;

        let tree = menu.load_tree(root.id, 16).await.unwrap();
        assert_eq!(tree.item.id, root.id);
        assert_eq!(tree.size(), 7);
        assert_eq!(tree.children.len(), 2);
        assert!(tree.children.iter().all(|child| child.children.len() == 2));
        assert_eq!(tree.children[0].item.title, "1.0");

        let shallow = menu.load_tree(root.id, 1).await.unwrap();
        assert_eq!(shallow.size(), 3);

        assert_eq!(menu.full_tree(root.id).await.unwrap(), tree);
    }

    #[tokio::test]
    async fn test_cycle_detected_during_traversal() {
        let menu = setup_test_service().await;
        let a = menu.create_item("a".to_string(), None, 0).await.unwrap();
        let b = menu.create_item("b".to_string(), Some(a.id), 0).await.unwrap();
        let c = menu.create_item("c".to_string(), Some(b.id), 0).await.unwrap();

        // Bypass move_item to corrupt the tree: a -> b -> c -> a
        MenuItem::update_many()
            .col_expr(MenuItemColumn::ParentId, Expr::value(c.id))
            .filter(MenuItemColumn::Id.eq(a.id))
            .exec(&menu.db)
            .await
            .unwrap();

        let result: Result<Vec<MenuNode>, MenuError> =
            menu.descendants(a.id, 16).try_collect().await;
        assert!(matches!(result, Err(MenuError::CycleDetected(id)) if id == a.id));

        assert!(matches!(
            menu.ancestors(c.id).await,
            Err(MenuError::CycleDetected(_))
        ));
    }

    #[tokio::test]
    async fn test_move_item() {
        let menu = setup_test_service().await;
        let a = menu.create_item("a".to_string(), None, 0).await.unwrap();
        let b = menu.create_item("b".to_string(), Some(a.id), 0).await.unwrap();
        let c = menu.create_item("c".to_string(), Some(b.id), 0).await.unwrap();
        let d = menu.create_item("d".to_string(), None, 1).await.unwrap();

        assert!(matches!(
            menu.move_item(a.id, Some(a.id)).await,
            Err(MenuError::WouldCreateCycle)
        ));
        assert!(matches!(
            menu.move_item(a.id, Some(c.id)).await,
            Err(MenuError::WouldCreateCycle)
        ));
        assert!(matches!(
            menu.move_item(a.id, Some(MenuItemId::new(404))).await,
            Err(MenuError::ParentNotFound)
        ));

        let moved = menu.move_item(b.id, Some(d.id)).await.unwrap();
        assert_eq!(moved.parent_id, Some(d.id));
        assert!(menu.children(a.id).await.unwrap().is_empty());

        let lineage: Vec<MenuItemId> = menu
            .ancestors(c.id)
            .await
            .unwrap()
            .into_iter()
            .map(|item| item.id)
            .collect();
        assert_eq!(lineage, vec![b.id, d.id]);

        let root = menu.move_item(b.id, None).await.unwrap();
        assert_eq!(root.parent_id, None);
    }

    #[tokio::test]
    async fn test_delete_item_removes_subtree() {
        let menu = setup_test_service().await;
        let root = build_tree(&menu, 2, 2).await;
        let other = menu.create_item("other".to_string(), None, 1).await.unwrap();

        menu.delete_item(root.id).await.unwrap();

        assert_eq!(MenuItem::find().count(&menu.db).await.unwrap(), 1);
        assert!(menu.get_item(other.id).await.is_ok());
        assert!(matches!(
            menu.delete_item(root.id).await,
            Err(MenuError::ItemNotFound)
        ));
    }
}
