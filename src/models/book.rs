//! Book model and request payloads.
//!
//! `BookDocument` is the persisted shape (`_id` ObjectId, camelCase fields) and
//! `Book` is what the API returns, with the identifier rendered as a hex string.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::serde_as;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::cast::{cast, NumberCast, TextCast};
use crate::error::{AppError, AppResult, MISSING_FIELDS};

/// Book document as stored in the `books` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub author: String,
    pub genre: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i64>,
    pub available_copies: i64,
    /// User references; declared but not managed by any endpoint
    #[serde(default)]
    pub borrowed_by: Vec<ObjectId>,
}

/// Book record returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Store-generated identifier
    #[schema(example = "65f1c2a9e4b0a1b2c3d4e5f6")]
    pub id: String,
    pub title: String,
    pub author: String,
    pub genre: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i64>,
    pub available_copies: i64,
    #[serde(default)]
    pub borrowed_by: Vec<String>,
}

impl From<BookDocument> for Book {
    fn from(doc: BookDocument) -> Self {
        Self {
            id: doc.id.to_hex(),
            title: doc.title,
            author: doc.author,
            genre: doc.genre,
            published_year: doc.published_year,
            available_copies: doc.available_copies,
            borrowed_by: doc.borrowed_by.iter().map(|id| id.to_hex()).collect(),
        }
    }
}

/// Create book request.
///
/// Fields are kept as raw JSON until the presence check has passed, so a
/// missing field is a 400 even when another field would not cast.
#[derive(Debug, Default, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBook {
    #[validate(required, custom(function = "truthy"))]
    #[schema(value_type = String)]
    pub title: Option<Value>,
    #[validate(required, custom(function = "truthy"))]
    #[schema(value_type = String)]
    pub author: Option<Value>,
    #[validate(required, custom(function = "truthy"))]
    #[schema(value_type = String)]
    pub genre: Option<Value>,
    #[schema(value_type = Option<i64>)]
    pub published_year: Option<Value>,
    /// Zero is a valid count; only absence is rejected
    #[validate(required)]
    #[schema(value_type = i64)]
    pub available_copies: Option<Value>,
}

/// Empty strings, `0` and `false` count as missing
fn truthy(value: &Value) -> Result<(), ValidationError> {
    let present = match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    };

    if present {
        Ok(())
    } else {
        Err(ValidationError::new("required"))
    }
}

impl CreateBook {
    /// Check required fields, then cast them into a fresh document
    pub fn into_document(self) -> AppResult<BookDocument> {
        let missing = || AppError::Validation(MISSING_FIELDS.to_string());
        self.validate().map_err(|_| missing())?;

        let (Some(title), Some(author), Some(genre), Some(copies)) =
            (self.title, self.author, self.genre, self.available_copies)
        else {
            return Err(missing());
        };

        let published_year = match self.published_year {
            Some(Value::String(s)) if s.is_empty() => None,
            Some(year) => Some(cast::<NumberCast, i64>("publishedYear", year)?),
            None => None,
        };

        Ok(BookDocument {
            id: ObjectId::new(),
            title: cast::<TextCast, String>("title", title)?,
            author: cast::<TextCast, String>("author", author)?,
            genre: cast::<TextCast, String>("genre", genre)?,
            published_year,
            available_copies: cast::<NumberCast, i64>("availableCopies", copies)?,
            borrowed_by: Vec::new(),
        })
    }
}

/// Partial update request; only fields present in the body are applied.
/// Unknown keys, `id` and `borrowedBy` are ignored.
#[serde_as]
#[derive(Debug, Default, Clone, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBook {
    #[serde_as(as = "Option<TextCast>")]
    #[schema(value_type = Option<String>)]
    pub title: Option<String>,
    #[serde_as(as = "Option<TextCast>")]
    #[schema(value_type = Option<String>)]
    pub author: Option<String>,
    #[serde_as(as = "Option<TextCast>")]
    #[schema(value_type = Option<String>)]
    pub genre: Option<String>,
    #[serde_as(as = "Option<NumberCast>")]
    #[schema(value_type = Option<i64>)]
    pub published_year: Option<i64>,
    #[serde_as(as = "Option<NumberCast>")]
    #[schema(value_type = Option<i64>)]
    pub available_copies: Option<i64>,
}

impl UpdateBook {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.genre.is_none()
            && self.published_year.is_none()
            && self.available_copies.is_none()
    }

    /// Merge the present fields into an existing document
    pub fn apply_to(&self, doc: &mut BookDocument) {
        if let Some(ref title) = self.title {
            doc.title = title.clone();
        }
        if let Some(ref author) = self.author {
            doc.author = author.clone();
        }
        if let Some(ref genre) = self.genre {
            doc.genre = genre.clone();
        }
        if let Some(year) = self.published_year {
            doc.published_year = Some(year);
        }
        if let Some(copies) = self.available_copies {
            doc.available_copies = copies;
        }
    }
}

/// Confirmation body for a successful delete
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}
