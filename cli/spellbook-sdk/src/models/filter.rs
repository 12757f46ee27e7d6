//! Editable draft of the search criteria.
//!
//! A [FilterForm] is created from the committed [FilterCriteria] and only
//! turns back into criteria when submitted.
//! Dropping the form discards every edit made to it.

use indexmap::IndexSet;
use spellbook_catalog::types::{Color, FilterCriteria};
use tracing::debug;

use super::combobox::Combobox;

#[derive(Debug, Clone, PartialEq)]
pub struct FilterForm {
    pub name: String,
    pub colors: Combobox,
    pub types: Combobox,
    pub subtypes: Combobox,
    pub text: String,
}

impl FilterForm {
    /// Draft prefilled from `criteria`.
    ///
    /// Colors are always offered from the fixed [Color] enumeration,
    /// types and subtypes from the option lists loaded from the catalog.
    pub fn new(criteria: &FilterCriteria, types: &[String], subtypes: &[String]) -> Self {
        Self {
            name: criteria.name.clone(),
            colors: Combobox::new(Color::ALL.map(|color| color.to_string()))
                .with_selected(criteria.colors.iter().map(ToString::to_string)),
            types: Combobox::new(types.iter().cloned()).with_selected(criteria.types.iter().cloned()),
            subtypes: Combobox::new(subtypes.iter().cloned())
                .with_selected(criteria.subtypes.iter().cloned()),
            text: criteria.text.clone(),
        }
    }

    /// Capture all fields of the draft as new criteria.
    pub fn submit(self) -> FilterCriteria {
        let colors = self
            .colors
            .into_selected()
            .iter()
            .filter_map(|label| label.parse::<Color>().ok())
            .collect::<IndexSet<_>>();

        let criteria = FilterCriteria {
            name: self.name,
            colors,
            types: self.types.into_selected().into_iter().collect(),
            subtypes: self.subtypes.into_selected().into_iter().collect(),
            text: self.text,
        };
        debug!(?criteria, "submitted filter form");
        criteria
    }
}
