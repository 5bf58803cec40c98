//! Directory use cases on top of `models`.
//! - `db`: SeaORM operations used by the admin API and maintenance tools.
//! - `directory`: repository seam plus the read-side service behind the bot.
//! - `presenter`, `callbacks`, `conversation`, `menu`: transport-neutral bot logic.

pub mod callbacks;
pub mod conversation;
pub mod db;
pub mod directory;
pub mod errors;
pub mod menu;
pub mod pagination;
pub mod presenter;
#[cfg(test)]
pub mod test_support;
