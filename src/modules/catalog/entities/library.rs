use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "libraries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::library_book::Entity")]
    LibraryBook,
    #[sea_orm(has_one = "super::librarian::Entity")]
    Librarian,
}

impl Related<super::book::Entity> for Entity {
    fn to() -> RelationDef {
        super::library_book::Relation::Book.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::library_book::Relation::Library.def().rev())
    }
}

impl Related<super::librarian::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Librarian.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
