//! SeaORM-backed operations grouped by table.

pub mod category_service;
pub mod directory_service;
pub mod menu_service;
