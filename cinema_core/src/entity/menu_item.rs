use crate::ids::MenuItemId;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A node of the navigation menu tree.
///
/// Children are never loaded implicitly; walk the tree through
/// `service::menu::MenuService` instead.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "menu_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: MenuItemId,
    pub title: String,
    pub position: i32,
    pub parent_id: Option<MenuItemId>, // NULL for roots
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(belongs_to = "Entity", from = "Column::ParentId", to = "Column::Id")]
    Parent,
}

/// item -> its parent
pub struct ParentLink;

impl Linked for ParentLink {
    type FromEntity = Entity;

    type ToEntity = Entity;

    fn link(&self) -> Vec<RelationDef> {
        vec![Relation::Parent.def()]
    }
}

impl ActiveModelBehavior for ActiveModel {}
