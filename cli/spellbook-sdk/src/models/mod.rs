pub mod browser;
pub mod combobox;
pub mod deck;
pub mod filter;
pub mod page;
