//! Askama template definitions.

use askama::Template;
use cardbox_types::Card;

/// Card detail page.
#[derive(Template)]
#[template(path = "card.html")]
pub struct CardTemplate {
    pub card: Card,
}

impl CardTemplate {
    /// Binds `card` as the template's data model.
    pub fn new(card: Card) -> Self {
        Self { card }
    }
}
