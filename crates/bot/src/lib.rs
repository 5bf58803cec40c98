pub mod bootstrap;
pub mod dispatcher;
pub mod errors;
pub mod keyboards;
pub mod observability;
pub mod telegram;
