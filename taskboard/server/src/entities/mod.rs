//! `SeaORM` entities for the taskboard schema.

pub mod sea_orm_active_enums;
pub mod task;
pub mod user;
