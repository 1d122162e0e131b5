use std::collections::BTreeMap;

use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub type BookId = i64;
pub type ShelfId = i64;
pub type ReviewId = i64;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Book record as returned by the service
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publication_year: i32,
    pub pages: i32,
    pub genre: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Fields required to create a book. Description is sent as null when absent
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publication_year: i32,
    pub pages: i32,
    pub genre: String,
    pub description: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Partial update of a book. Only the fields that are set are sent
pub struct BookPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Filters accepted by the book listing endpoint
pub struct BookFilter {
    pub author: Option<String>,
    pub genre: Option<String>,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

impl BookFilter {
    pub fn by_author(author: impl Into<String>) -> Self {
        Self {
            author: Some(author.into()),
            ..Self::default()
        }
    }

    pub fn by_genre(genre: impl Into<String>) -> Self {
        Self {
            genre: Some(genre.into()),
            ..Self::default()
        }
    }

    pub fn with_limit(self, limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..self
        }
    }

    pub fn with_skip(self, skip: u32) -> Self {
        Self {
            skip: Some(skip),
            ..self
        }
    }

    /// Key/value pairs of the filters that are set, empty strings are left out
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let text_filters = [("author", &self.author), ("genre", &self.genre)]
            .into_iter()
            .filter_map(|(key, value)| {
                value
                    .as_deref()
                    .filter(|value| !value.is_empty())
                    .map(|value| (key, value.to_string()))
            });
        let numeric_filters = [("skip", self.skip), ("limit", self.limit)]
            .into_iter()
            .filter_map(|(key, value)| value.map(|value| (key, value.to_string())));
        text_filters.chain(numeric_filters).collect()
    }

    /// Form-urlencoded query string, empty when no filter is set
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query_pairs())
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub id: ReviewId,
    pub reviewer: String,
    pub rating: f64,
    #[serde(default)]
    pub comment: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewReview {
    pub reviewer: String,
    /// Between 0 and 5
    pub rating: f64,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Named, owned collection of books. Books keep the order the service returns
pub struct Bookshelf {
    pub id: ShelfId,
    pub name: String,
    pub owner: String,
    #[serde(default)]
    pub books: Vec<Book>,
    pub created_at: String,
}

impl Bookshelf {
    pub fn contains(&self, book_id: BookId) -> bool {
        self.books.iter().any(|book| book.id == book_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewBookshelf {
    pub name: String,
    pub owner: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Statistics computed by the service for a single shelf
pub struct ShelfStats {
    pub bookshelf_id: ShelfId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookshelf_name: Option<String>,
    pub total_books: u64,
    pub total_pages: u64,
    pub avg_pages: f64,
    #[serde(
        serialize_with = "genres_as_map_or_list",
        deserialize_with = "genres_from_map_or_list"
    )]
    pub genres: BTreeMap<String, u64>,
}

/// Shelves without books report their genres as `[]`
fn genres_as_map_or_list<S>(genres: &BTreeMap<String, u64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if genres.is_empty() {
        serializer.serialize_seq(Some(0))?.end()
    } else {
        genres.serialize(serializer)
    }
}

/// Accepts both shapes written by [`genres_as_map_or_list`]
fn genres_from_map_or_list<'de, D>(deserializer: D) -> Result<BTreeMap<String, u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Genres {
        Counts(BTreeMap<String, u64>),
        Empty(Vec<serde_json::Value>),
    }

    match Genres::deserialize(deserializer)? {
        Genres::Counts(counts) => Ok(counts),
        Genres::Empty(values) if values.is_empty() => Ok(BTreeMap::new()),
        Genres::Empty(_) => Err(serde::de::Error::custom(
            "genres must be an object or an empty list",
        )),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusMessage {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookDeleted {
    pub message: String,
    pub book_id: BookId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewDeleted {
    pub message: String,
    pub review_id: ReviewId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShelfCreated {
    pub message: String,
    pub bookshelf: Bookshelf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Health {
    pub status: String,
    pub service: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Body of every error response sent by the service
pub struct ErrorDetail {
    pub detail: String,
}
