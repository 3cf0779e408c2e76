//! The card model and its create-time validation.

use crate::CardId;
use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use validator::Validate;

/// Minimum length, in characters, of each text field on create.
pub const MIN_FIELD_LENGTH: usize = 2;

/// A stored card.
///
/// Text fields are omitted from the encoding when empty. The id is always
/// present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Identifier assigned at creation.
    #[serde(rename = "_id")]
    pub id: CardId,
    /// Human-readable label.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Width, e.g. `"111px"`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub width: String,
    /// Height, e.g. `"222px"`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub height: String,
}

impl Card {
    /// Creates a card with the given id and fields.
    pub fn new(
        id: CardId,
        name: impl Into<String>,
        width: impl Into<String>,
        height: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            width: width.into(),
            height: height.into(),
        }
    }

    /// Overwrites width and height, leaving the name untouched.
    pub fn set_dimensions(&mut self, dimensions: CardDimensions) {
        self.width = dimensions.width;
        self.height = dimensions.height;
    }
}

/// Payload of a create request.
///
/// Keys match case-insensitively and the last occurrence wins. Any
/// client-supplied `_id` is ignored; the store adapter assigns one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct NewCard {
    #[validate(length(min = 2))]
    pub name: String,
    #[validate(length(min = 2))]
    pub width: String,
    #[validate(length(min = 2))]
    pub height: String,
}

impl<'de> Deserialize<'de> for NewCard {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let [name, width, height] =
            deserializer.deserialize_any(FoldedFields(["name", "width", "height"]))?;
        Ok(Self {
            name,
            width,
            height,
        })
    }
}

impl NewCard {
    /// Builds the card to persist under `id`.
    pub fn into_card(self, id: CardId) -> Card {
        Card {
            id,
            name: self.name,
            width: self.width,
            height: self.height,
        }
    }
}

/// Payload of an update request. Missing fields decode as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CardDimensions {
    pub width: String,
    pub height: String,
}

impl<'de> Deserialize<'de> for CardDimensions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let [width, height] = deserializer.deserialize_any(FoldedFields(["width", "height"]))?;
        Ok(Self { width, height })
    }
}

/// Reads string fields from an object whose keys match `names` ignoring
/// ASCII case. Unknown keys are skipped, a repeated key overwrites the
/// earlier value and `null` leaves a field empty. A bare `null` payload
/// decodes as all-empty.
struct FoldedFields<const N: usize>([&'static str; N]);

impl<'de, const N: usize> Visitor<'de> for FoldedFields<N> {
    type Value = [String; N];

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(std::array::from_fn(|_| String::new()))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut values: [String; N] = std::array::from_fn(|_| String::new());
        while let Some(key) = map.next_key::<String>()? {
            match self.0.iter().position(|name| name.eq_ignore_ascii_case(&key)) {
                Some(slot) => {
                    if let Some(value) = map.next_value::<Option<String>>()? {
                        values[slot] = value;
                    }
                }
                None => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        Ok(values)
    }
}

/// A create payload failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid card: name, width and height must each be at least 2 characters")]
pub struct InvalidCard {
    /// Names of the offending fields, sorted.
    pub fields: Vec<String>,
}

/// Checks that `name`, `width` and `height` each hold at least
/// [`MIN_FIELD_LENGTH`] characters.
pub fn validate_new_card(card: &NewCard) -> Result<(), InvalidCard> {
    card.validate().map_err(|errors| {
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|field| field.to_string())
            .collect();
        fields.sort();
        InvalidCard { fields }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn new_card(name: &str, width: &str, height: &str) -> NewCard {
        NewCard {
            name: name.to_string(),
            width: width.to_string(),
            height: height.to_string(),
        }
    }

    #[test]
    fn test_validate_accepts_complete_card() {
        assert!(validate_new_card(&new_card("Test card", "111px", "222px")).is_ok());
        assert!(validate_new_card(&new_card("ab", "1p", "2p")).is_ok());
    }

    #[test]
    fn test_validate_reports_short_fields() {
        let err = validate_new_card(&new_card("X", "111px", "")).unwrap_err();
        assert_eq!(err.fields, vec!["height".to_string(), "name".to_string()]);
    }

    #[test]
    fn test_validate_counts_characters() {
        // Two characters, four bytes.
        assert!(validate_new_card(&new_card("éé", "ñp", "üp")).is_ok());
        // One character, two bytes.
        assert!(validate_new_card(&new_card("é", "11", "22")).is_err());
    }

    #[test]
    fn test_new_card_decodes_capitalized_keys() {
        let card: NewCard =
            serde_json::from_str(r#"{"Name":"Card","Width":"111px","Height":"222px"}"#).unwrap();
        assert_eq!(card, new_card("Card", "111px", "222px"));
    }

    #[test]
    fn test_new_card_ignores_client_id() {
        let card: NewCard = serde_json::from_str(
            r#"{"_id":"0102030405060708090a0b0c","name":"Card","width":"10px","height":"20px"}"#,
        )
        .unwrap();
        let stored = card.into_card(CardId::from_bytes([7; 12]));
        assert_eq!(stored.id, CardId::from_bytes([7; 12]));
    }

    #[test]
    fn test_partial_payload_decodes_as_empty() {
        let card: NewCard = serde_json::from_str(r#"{"Height":"333px"}"#).unwrap();
        assert!(card.name.is_empty());
        assert!(validate_new_card(&card).is_err());

        let dims: CardDimensions = serde_json::from_str("{}").unwrap();
        assert_eq!(dims, CardDimensions::default());
    }

    #[test]
    fn test_payload_keys_ignore_case() {
        let dims: CardDimensions =
            serde_json::from_str(r#"{"WIDTH":"777px","hEiGhT":"888px"}"#).unwrap();
        assert_eq!(dims.width, "777px");
        assert_eq!(dims.height, "888px");

        let card: NewCard =
            serde_json::from_str(r#"{"NAME":"Card","width":"1px","HEIGHT":"2px"}"#).unwrap();
        assert_eq!(card, new_card("Card", "1px", "2px"));
    }

    #[test]
    fn test_repeated_keys_last_wins() {
        let card: NewCard = serde_json::from_str(
            r#"{"name":"Ab","Name":"Cd","width":"10px","WIDTH":"20px","height":"30px"}"#,
        )
        .unwrap();
        assert_eq!(card, new_card("Cd", "20px", "30px"));
    }

    #[test]
    fn test_null_payload_and_values() {
        let dims: CardDimensions = serde_json::from_str("null").unwrap();
        assert_eq!(dims, CardDimensions::default());

        let card: NewCard =
            serde_json::from_str(r#"{"name":"Ab","name":null,"width":"1px"}"#).unwrap();
        assert_eq!(card, new_card("Ab", "1px", ""));

        assert!(serde_json::from_str::<CardDimensions>(r#"{"width":5}"#).is_err());
        assert!(serde_json::from_str::<CardDimensions>("[]").is_err());
    }

    #[test]
    fn test_card_encoding_omits_empty_fields() {
        let card = Card::new(
            CardId::from_bytes([9, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
            "",
            "111px",
            "222px",
        );
        let json = serde_json::to_string(&card).unwrap();
        assert_eq!(
            json,
            r#"{"_id":"090000000000000000000000","width":"111px","height":"222px"}"#
        );
    }

    #[test]
    fn test_set_dimensions_keeps_name() {
        let mut card = Card::new(CardId::generate(), "Card", "1px", "2px");
        card.set_dimensions(CardDimensions {
            width: "777px".into(),
            height: String::new(),
        });
        assert_eq!(card.name, "Card");
        assert_eq!(card.width, "777px");
        assert!(card.height.is_empty());
    }

    proptest! {
        #[test]
        fn prop_long_fields_are_valid(
            name in "[a-zA-Z ]{2,40}",
            width in "[0-9]{1,4}px",
            height in "[0-9]{1,4}px",
        ) {
            prop_assert!(validate_new_card(&new_card(&name, &width, &height)).is_ok());
        }

        #[test]
        fn prop_short_field_is_invalid(
            short in "[a-z]{0,1}",
            which in 0usize..3,
        ) {
            let mut fields = ["valid".to_string(), "10px".to_string(), "20px".to_string()];
            fields[which] = short;
            let card = new_card(&fields[0], &fields[1], &fields[2]);
            prop_assert!(validate_new_card(&card).is_err());
        }
    }
}
