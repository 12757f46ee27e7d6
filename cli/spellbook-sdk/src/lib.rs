pub mod models;
pub mod session;

pub use spellbook_catalog as catalog;
