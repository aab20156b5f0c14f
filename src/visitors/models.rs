use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::storage::schema::visitors;
use crate::storage::{Fields, Predicate, Record, StorageError, Value};
use crate::validation::{validate_not_blank, Flag};

/// A persisted visitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Visitor {
    #[schema(example = 1)]
    pub visitor_id: i64,
    #[schema(example = "Alice")]
    pub firstname: String,
    #[schema(example = "Smith")]
    pub lastname: String,
}

impl Visitor {
    pub fn to_fields(&self) -> Fields {
        vec![
            (visitors::ID, Value::Int(self.visitor_id)),
            (visitors::FIRSTNAME, self.firstname.as_str().into()),
            (visitors::LASTNAME, self.lastname.as_str().into()),
        ]
    }

    pub fn from_record(record: &Record) -> Result<Self, StorageError> {
        Ok(Self {
            visitor_id: record.int(visitors::ID)?,
            firstname: record.text(visitors::FIRSTNAME)?,
            lastname: record.text(visitors::LASTNAME)?,
        })
    }
}

/// Request body for creating or updating a visitor
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisitorInput {
    pub visitor_id: Option<i64>,
    #[validate(
        length(min = 1, max = 200, message = "First name must be 1 to 200 characters"),
        custom = "validate_not_blank"
    )]
    pub firstname: String,
    #[validate(
        length(min = 1, max = 200, message = "Last name must be 1 to 200 characters"),
        custom = "validate_not_blank"
    )]
    pub lastname: String,
}

impl VisitorInput {
    pub fn new(firstname: impl Into<String>, lastname: impl Into<String>) -> Self {
        Self {
            visitor_id: None,
            firstname: firstname.into(),
            lastname: lastname.into(),
        }
    }

    pub fn with_id(mut self, visitor_id: i64) -> Self {
        self.visitor_id = Some(visitor_id);
        self
    }

    /// Natural key: the first and last name together
    pub fn natural_key(&self) -> Predicate {
        Predicate::all_of(vec![
            Predicate::eq(visitors::FIRSTNAME, self.firstname.as_str()),
            Predicate::eq(visitors::LASTNAME, self.lastname.as_str()),
        ])
    }

    pub fn update_fields(&self) -> Fields {
        vec![
            (visitors::FIRSTNAME, self.firstname.as_str().into()),
            (visitors::LASTNAME, self.lastname.as_str().into()),
        ]
    }
}

/// Query string for visitor search
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorSearch {
    pub name: Option<String>,
    pub exact_match: Option<Flag>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation() {
        assert!(VisitorInput::new("Alice", "Smith").validate().is_ok());
        assert!(VisitorInput::new("", "Smith").validate().is_err());
        assert!(VisitorInput::new("Alice", " ").validate().is_err());
        assert!(VisitorInput::new("A".repeat(201), "Smith").validate().is_err());
    }

    #[test]
    fn test_natural_key_matches_both_names() {
        let key = VisitorInput::new("Alice", "Smith").natural_key();
        let visitor = Visitor {
            visitor_id: 1,
            firstname: "Alice".to_string(),
            lastname: "Smith".to_string(),
        };
        let other = Visitor {
            lastname: "Jones".to_string(),
            ..visitor.clone()
        };

        let table = crate::storage::Table::Visitors;
        assert!(key.matches(&Record::from_fields(table, &visitor.to_fields())));
        assert!(!key.matches(&Record::from_fields(table, &other.to_fields())));
    }

    #[test]
    fn test_input_from_json() {
        let input: VisitorInput =
            serde_json::from_str(r#"{"visitorId": 4, "firstname": "Bob", "lastname": "Jones"}"#)
                .unwrap();
        assert_eq!(input.visitor_id, Some(4));
        assert_eq!(input.lastname, "Jones");
    }
}
