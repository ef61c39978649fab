use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Physical condition of a comic book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    New,
    Used,
}

impl Condition {
    /// Accepted wire values, in declaration order.
    pub const VALUES: &'static [&'static str] = &["new", "used"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::New => "new",
            Condition::Used => "used",
        }
    }

    /// Exact, case-sensitive match against [`Condition::VALUES`].
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "new" => Some(Condition::New),
            "used" => Some(Condition::Used),
            _ => None,
        }
    }
}

/// A comic book as stored in the inventory and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComicBook {
    /// Opaque identifier assigned by the store on creation
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub author: String,
    pub year_of_publication: i32,
    pub price: f64,
    pub discount: f64,
    pub number_of_pages: i64,
    pub condition: Condition,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated create request. Text fields are already trimmed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewComic {
    pub name: String,
    pub author: String,
    pub year_of_publication: i32,
    pub price: f64,
    pub discount: f64,
    pub number_of_pages: i64,
    pub condition: Condition,
    pub description: String,
}

impl NewComic {
    /// Materialize the record with a freshly assigned identifier.
    pub fn into_comic(self, id: String, now: DateTime<Utc>) -> ComicBook {
        ComicBook {
            id,
            name: self.name,
            author: self.author,
            year_of_publication: self.year_of_publication,
            price: self.price,
            discount: self.discount,
            number_of_pages: self.number_of_pages,
            condition: self.condition,
            description: self.description,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A validated partial update. `None` means the key was absent from the request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComicPatch {
    pub name: Option<String>,
    pub author: Option<String>,
    pub year_of_publication: Option<i32>,
    pub price: Option<f64>,
    pub discount: Option<f64>,
    pub number_of_pages: Option<i64>,
    pub condition: Option<Condition>,
    pub description: Option<String>,
}

impl ComicPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.author.is_none()
            && self.year_of_publication.is_none()
            && self.price.is_none()
            && self.discount.is_none()
            && self.number_of_pages.is_none()
            && self.condition.is_none()
            && self.description.is_none()
    }

    /// Apply the present fields to `comic` and stamp `updated_at`.
    pub fn apply(self, comic: &mut ComicBook, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            comic.name = name;
        }
        if let Some(author) = self.author {
            comic.author = author;
        }
        if let Some(year) = self.year_of_publication {
            comic.year_of_publication = year;
        }
        if let Some(price) = self.price {
            comic.price = price;
        }
        if let Some(discount) = self.discount {
            comic.discount = discount;
        }
        if let Some(pages) = self.number_of_pages {
            comic.number_of_pages = pages;
        }
        if let Some(condition) = self.condition {
            comic.condition = condition;
        }
        if let Some(description) = self.description {
            comic.description = description;
        }
        // Clock skew must not move updatedAt behind createdAt.
        comic.updated_at = now.max(comic.created_at);
    }
}
