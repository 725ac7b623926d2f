pub mod building;
pub mod contract;
pub mod contract_student;
pub mod enums;
pub mod floor;
pub mod invoice;
pub mod room;
pub mod student;
pub mod user;

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Select};

/// Entities that are hidden rather than removed.
pub trait SoftDelete: EntityTrait {
    fn deleted_flag() -> Self::Column;
}

/// Whether soft-deleted rows take part in a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Live,
    IncludeDeleted,
}

impl Visibility {
    pub fn from_flag(include_deleted: bool) -> Self {
        if include_deleted {
            Visibility::IncludeDeleted
        } else {
            Visibility::Live
        }
    }
}

/// `SELECT` over `E`, restricted to live rows unless asked otherwise.
pub fn scoped<E: SoftDelete>(visibility: Visibility) -> Select<E> {
    match visibility {
        Visibility::Live => E::find().filter(E::deleted_flag().eq(false)),
        Visibility::IncludeDeleted => E::find(),
    }
}

pub fn live<E: SoftDelete>() -> Select<E> {
    scoped::<E>(Visibility::Live)
}
