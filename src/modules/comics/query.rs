//! Translation of inventory listing parameters into a storage-agnostic query.

use std::cmp::Ordering;

use serde::Deserialize;

use longbox_kernel::settings::InventorySettings;

use super::models::{ComicBook, Condition};
use super::validation::{Rule, ValidationError};

/// Raw query-string parameters of `GET /inventory`. Everything arrives as text
/// so that malformed numbers produce a field-specific validation error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub author: Option<String>,
    pub year_of_publication: Option<String>,
    pub price: Option<String>,
    pub condition: Option<String>,
}

/// Fields the listing may be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Name,
    Author,
    YearOfPublication,
    Price,
    Discount,
    NumberOfPages,
    Condition,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    pub const VALUES: &'static [&'static str] = &[
        "name",
        "author",
        "yearOfPublication",
        "price",
        "discount",
        "numberOfPages",
        "condition",
        "createdAt",
        "updatedAt",
    ];

    /// Stored document field name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Author => "author",
            SortField::YearOfPublication => "yearOfPublication",
            SortField::Price => "price",
            SortField::Discount => "discount",
            SortField::NumberOfPages => "numberOfPages",
            SortField::Condition => "condition",
            SortField::CreatedAt => "createdAt",
            SortField::UpdatedAt => "updatedAt",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "name" => Some(SortField::Name),
            "author" => Some(SortField::Author),
            "yearOfPublication" => Some(SortField::YearOfPublication),
            "price" => Some(SortField::Price),
            "discount" => Some(SortField::Discount),
            "numberOfPages" => Some(SortField::NumberOfPages),
            "condition" => Some(SortField::Condition),
            "createdAt" => Some(SortField::CreatedAt),
            "updatedAt" => Some(SortField::UpdatedAt),
            _ => None,
        }
    }

    /// Order two records by this field, ascending.
    pub fn compare(&self, a: &ComicBook, b: &ComicBook) -> Ordering {
        match self {
            SortField::Name => a.name.cmp(&b.name),
            SortField::Author => a.author.cmp(&b.author),
            SortField::YearOfPublication => a.year_of_publication.cmp(&b.year_of_publication),
            SortField::Price => a.price.total_cmp(&b.price),
            SortField::Discount => a.discount.total_cmp(&b.discount),
            SortField::NumberOfPages => a.number_of_pages.cmp(&b.number_of_pages),
            SortField::Condition => a.condition.as_str().cmp(b.condition.as_str()),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub const VALUES: &'static [&'static str] = &["asc", "desc"];

    pub fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("asc") {
            Some(SortDirection::Asc)
        } else if value.eq_ignore_ascii_case("desc") {
            Some(SortDirection::Desc)
        } else {
            None
        }
    }

    /// Apply the direction to an ascending ordering.
    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Equality and range constraints. An unset field imposes no constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventoryFilter {
    pub author: Option<String>,
    pub year_of_publication: Option<i32>,
    /// Inclusive upper bound on price.
    pub max_price: Option<f64>,
    pub condition: Option<Condition>,
}

impl InventoryFilter {
    pub fn is_empty(&self) -> bool {
        self.author.is_none()
            && self.year_of_publication.is_none()
            && self.max_price.is_none()
            && self.condition.is_none()
    }

    pub fn matches(&self, comic: &ComicBook) -> bool {
        self.author
            .as_ref()
            .map_or(true, |author| &comic.author == author)
            && self
                .year_of_publication
                .map_or(true, |year| comic.year_of_publication == year)
            && self.max_price.map_or(true, |max| comic.price <= max)
            && self
                .condition
                .map_or(true, |condition| comic.condition == condition)
    }
}

const MAX_OFFSET: u64 = i64::MAX as u64;

/// A 1-based page window. Both numbers are always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u64,
    limit: u64,
}

impl Pagination {
    /// Clamp `page` to at least 1 and `limit` into `[1, max_limit]`.
    pub fn clamped(page: i64, limit: i64, max_limit: u64) -> Self {
        let page = u64::try_from(page.max(1)).unwrap_or(1);
        let limit = u64::try_from(limit.max(1))
            .unwrap_or(1)
            .min(max_limit.max(1));
        Self { page, limit }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Number of matching records to skip, capped at what a storage backend
    /// can express as a signed 64-bit skip.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit).min(MAX_OFFSET)
    }

    /// `ceil(total / limit)`.
    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }
}

/// Everything a repository needs to produce one page of the inventory.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryQuery {
    pub filter: InventoryFilter,
    pub sort_field: SortField,
    pub direction: SortDirection,
    pub pagination: Pagination,
}

impl InventoryQuery {
    /// Parse and bound the raw parameters.
    pub fn from_params(
        params: &InventoryParams,
        settings: &InventorySettings,
    ) -> Result<Self, ValidationError> {
        let page = parse_integer("page", present(&params.page))?.unwrap_or(1);
        let limit = parse_integer("limit", present(&params.limit))?
            .unwrap_or_else(|| i64::try_from(settings.default_page_size).unwrap_or(i64::MAX));

        let sort_field = match present(&params.sort_by) {
            None => SortField::default(),
            Some(value) => SortField::parse(value)
                .ok_or(ValidationError::Invalid {
                    field: "sortBy",
                    rule: Rule::OneOf(SortField::VALUES),
                })?,
        };

        let direction = match present(&params.order) {
            None => SortDirection::default(),
            Some(value) => SortDirection::parse(value)
                .ok_or(ValidationError::Invalid {
                    field: "order",
                    rule: Rule::OneOf(SortDirection::VALUES),
                })?,
        };

        let year_of_publication =
            parse_integer("yearOfPublication", present(&params.year_of_publication))?
                .map(|year| {
                    i32::try_from(year).map_err(|_| ValidationError::Invalid {
                        field: "yearOfPublication",
                        rule: Rule::Integer,
                    })
                })
                .transpose()?;

        let max_price = present(&params.price)
            .map(|value| {
                value
                    .parse::<f64>()
                    .ok()
                    .filter(|price| price.is_finite())
                    .ok_or(ValidationError::Invalid {
                        field: "price",
                        rule: Rule::Number,
                    })
            })
            .transpose()?;

        let condition = present(&params.condition)
            .map(|value| {
                Condition::parse(value).ok_or(ValidationError::Invalid {
                    field: "condition",
                    rule: Rule::OneOf(Condition::VALUES),
                })
            })
            .transpose()?;

        Ok(Self {
            filter: InventoryFilter {
                author: present(&params.author).map(str::to_string),
                year_of_publication,
                max_price,
                condition,
            },
            sort_field,
            direction,
            pagination: Pagination::clamped(page, limit, settings.max_page_size),
        })
    }

    /// Ordering used by in-process evaluation: the sort field, then the
    /// identifier so that pages are stable under ties.
    pub fn compare(&self, a: &ComicBook, b: &ComicBook) -> Ordering {
        self.direction
            .apply(self.sort_field.compare(a, b).then_with(|| a.id.cmp(&b.id)))
    }
}

/// Empty strings count as absent parameters.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_integer(field: &'static str, value: Option<&str>) -> Result<Option<i64>, ValidationError> {
    let Some(value) = value else {
        return Ok(None);
    };

    match value.parse::<i64>() {
        Ok(number) => Ok(Some(number)),
        Err(_) => {
            let rule = match value.parse::<f64>() {
                Ok(number) if number.is_finite() => Rule::Integer,
                _ => Rule::Number,
            };
            Err(ValidationError::Invalid { field, rule })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> InventoryParams {
        let mut params = InventoryParams::default();
        for (key, value) in pairs {
            let slot = match *key {
                "page" => &mut params.page,
                "limit" => &mut params.limit,
                "sortBy" => &mut params.sort_by,
                "order" => &mut params.order,
                "author" => &mut params.author,
                "yearOfPublication" => &mut params.year_of_publication,
                "price" => &mut params.price,
                "condition" => &mut params.condition,
                other => panic!("unknown parameter {}", other),
            };
            *slot = Some(value.to_string());
        }
        params
    }

    fn build(pairs: &[(&str, &str)]) -> Result<InventoryQuery, ValidationError> {
        InventoryQuery::from_params(&params(pairs), &InventorySettings::default())
    }

    #[test]
    fn defaults_produce_open_query() {
        let query = build(&[]).unwrap();
        assert!(query.filter.is_empty());
        assert_eq!(query.sort_field, SortField::Name);
        assert_eq!(query.direction, SortDirection::Asc);
        assert_eq!(query.pagination.page(), 1);
        assert_eq!(query.pagination.limit(), 10);
        assert_eq!(query.pagination.offset(), 0);
    }

    #[test]
    fn filters_include_only_present_parameters() {
        let query = build(&[
            ("author", "Alan Moore"),
            ("price", "20"),
            ("condition", "used"),
            ("yearOfPublication", ""),
        ])
        .unwrap();

        assert_eq!(query.filter.author.as_deref(), Some("Alan Moore"));
        assert_eq!(query.filter.max_price, Some(20.0));
        assert_eq!(query.filter.condition, Some(Condition::Used));
        assert_eq!(query.filter.year_of_publication, None);
    }

    #[test]
    fn offset_follows_page_and_limit() {
        let query = build(&[("page", "3"), ("limit", "10")]).unwrap();
        assert_eq!(query.pagination.offset(), 20);
        assert_eq!(query.pagination.total_pages(25), 3);
        assert_eq!(query.pagination.total_pages(0), 0);
        assert_eq!(query.pagination.total_pages(30), 3);
    }

    #[test]
    fn non_positive_pages_are_clamped_to_first() {
        for page in ["0", "-3"] {
            let query = build(&[("page", page)]).unwrap();
            assert_eq!(query.pagination.page(), 1);
            assert_eq!(query.pagination.offset(), 0);
        }
    }

    #[test]
    fn limit_is_clamped_to_configured_bounds() {
        assert_eq!(build(&[("limit", "0")]).unwrap().pagination.limit(), 1);
        assert_eq!(build(&[("limit", "5000")]).unwrap().pagination.limit(), 100);
    }

    #[test]
    fn huge_page_does_not_overflow_offset() {
        let query = build(&[("page", &i64::MAX.to_string()), ("limit", "100")]).unwrap();
        assert_eq!(query.pagination.offset(), i64::MAX as u64);
        assert_eq!(query.pagination.page(), i64::MAX as u64);

        let query = build(&[("page", "100000000000000000"), ("limit", "100")]).unwrap();
        assert_eq!(query.pagination.offset(), i64::MAX as u64);
    }

    #[test]
    fn malformed_numbers_name_the_parameter() {
        assert_eq!(
            build(&[("limit", "ten")]).unwrap_err().to_string(),
            "\"limit\" must be a number"
        );
        assert_eq!(
            build(&[("page", "1.5")]).unwrap_err().to_string(),
            "\"page\" must be an integer"
        );
        assert_eq!(
            build(&[("price", "cheap")]).unwrap_err().to_string(),
            "\"price\" must be a number"
        );
        assert_eq!(
            build(&[("price", "NaN")]).unwrap_err().to_string(),
            "\"price\" must be a number"
        );
    }

    #[test]
    fn sort_and_order_are_restricted() {
        let query = build(&[("sortBy", "price"), ("order", "DESC")]).unwrap();
        assert_eq!(query.sort_field, SortField::Price);
        assert_eq!(query.direction, SortDirection::Desc);

        let err = build(&[("sortBy", "password")]).unwrap_err();
        assert_eq!(err.field(), Some("sortBy"));
        assert!(build(&[("order", "sideways")]).is_err());
        assert!(build(&[("condition", "mint")]).is_err());
    }
}
