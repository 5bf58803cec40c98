pub mod errors;
pub mod db;
pub mod category;
pub mod service;
pub mod menu_button;

#[cfg(test)]
mod tests;
