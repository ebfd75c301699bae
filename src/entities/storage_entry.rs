//! Storage entry entity - the key-value table that holds the ledger state.
//!
//! The run collection is stored as one JSON blob under a single key and the
//! selected run id as a bare string under another.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Key-value storage model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "local_storage")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Storage key (e.g., `"runs"`, `"selectedRunId"`)
    #[sea_orm(unique)]
    pub key: String,
    /// Stored value, written verbatim
    #[sea_orm(column_type = "Text")]
    pub value: String,
    /// When this key was last written
    pub updated_at: DateTime,
}

/// `StorageEntry` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
