//! Feed arguments, their validation, and in-process evaluation helpers

use crate::core::entity::Link;
use crate::core::error::ValidationError;
use async_graphql::{Enum, InputObject};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// Sort direction
#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sort {
    #[graphql(name = "asc")]
    Asc,
    #[graphql(name = "desc")]
    Desc,
}

impl Sort {
    pub fn name(&self) -> &'static str {
        match self {
            Sort::Asc => "asc",
            Sort::Desc => "desc",
        }
    }

    fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            Sort::Asc => ordering,
            Sort::Desc => ordering.reverse(),
        }
    }
}

/// One `orderBy` entry as sent by the client.
///
/// Each entry must set exactly one field; multi-key ordering is expressed
/// with several entries, applied left to right.
#[derive(InputObject, Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkOrderByInput {
    pub description: Option<Sort>,
    pub url: Option<Sort>,
    pub created_at: Option<Sort>,
}

impl LinkOrderByInput {
    /// Convert into a single validated sort key.
    pub fn to_order(&self, index: usize) -> Result<LinkOrder, ValidationError> {
        let mut keys = [
            (OrderField::Description, self.description),
            (OrderField::Url, self.url),
            (OrderField::CreatedAt, self.created_at),
        ]
        .into_iter()
        .filter_map(|(field, direction)| direction.map(|direction| LinkOrder { field, direction }));

        match (keys.next(), keys.next()) {
            (Some(order), None) => Ok(order),
            (None, _) => Err(ValidationError::InvalidOrderBy {
                index,
                message: "expected exactly one of description, url, createdAt".to_string(),
            }),
            (Some(_), Some(_)) => Err(ValidationError::InvalidOrderBy {
                index,
                message: "only one field may be set per entry; use one entry per sort key"
                    .to_string(),
            }),
        }
    }
}

/// Sortable link fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderField {
    Description,
    Url,
    CreatedAt,
}

impl OrderField {
    /// Field name as it appears in the schema
    pub fn name(&self) -> &'static str {
        match self {
            OrderField::Description => "description",
            OrderField::Url => "url",
            OrderField::CreatedAt => "createdAt",
        }
    }

    fn compare(&self, a: &Link, b: &Link) -> Ordering {
        match self {
            OrderField::Description => a.description.cmp(&b.description),
            OrderField::Url => a.url.cmp(&b.url),
            OrderField::CreatedAt => a.created_at.cmp(&b.created_at),
        }
    }
}

/// A validated sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkOrder {
    pub field: OrderField,
    pub direction: Sort,
}

/// Raw `feed` arguments, exactly as received.
#[derive(Debug, Clone, Default)]
pub struct FeedArgs {
    pub filter: Option<String>,
    pub skip: Option<i32>,
    pub take: Option<i32>,
    pub order_by: Option<Vec<LinkOrderByInput>>,
}

impl FeedArgs {
    /// Validate and normalize the arguments.
    ///
    /// An empty filter becomes `None`, an absent `skip` becomes 0 and an
    /// absent `orderBy` becomes an empty key list.
    pub fn validate(self) -> Result<FeedQuery, ValidationError> {
        let skip = non_negative("skip", self.skip)?.unwrap_or(0);
        let take = non_negative("take", self.take)?;
        if let Some(filter) = &self.filter {
            ValidationError::check_text("filter", filter)?;
        }

        let order_by = self
            .order_by
            .unwrap_or_default()
            .iter()
            .enumerate()
            .map(|(index, entry)| entry.to_order(index))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FeedQuery {
            filter: self.filter.filter(|f| !f.is_empty()),
            skip,
            take,
            order_by,
        })
    }
}

fn non_negative(argument: &str, value: Option<i32>) -> Result<Option<usize>, ValidationError> {
    match value {
        None => Ok(None),
        Some(v) => usize::try_from(v)
            .map(Some)
            .map_err(|_| ValidationError::NegativeArgument {
                argument: argument.to_string(),
                value: i64::from(v),
            }),
    }
}

/// Normalized feed query handed to the data access layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedQuery {
    /// Substring matched against description or url; `None` matches all
    pub filter: Option<String>,
    pub skip: usize,
    /// `None` means unbounded
    pub take: Option<usize>,
    /// Sort keys; an `id asc` tiebreak is always appended
    pub order_by: Vec<LinkOrder>,
}

impl FeedQuery {
    pub fn matches(&self, link: &Link) -> bool {
        matches_filter(self.filter.as_deref(), link)
    }

    /// Total order over links: the requested keys, then ascending id.
    pub fn compare(&self, a: &Link, b: &Link) -> Ordering {
        self.order_by
            .iter()
            .map(|order| order.direction.apply(order.field.compare(a, b)))
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| a.id.cmp(&b.id))
    }

    /// Filter, sort and paginate an in-process collection of links.
    ///
    /// Returns the page together with the total number of filter matches.
    pub fn evaluate<'a, I>(&self, links: I) -> (Vec<Link>, usize)
    where
        I: IntoIterator<Item = &'a Link>,
    {
        let mut matched: Vec<&Link> = links.into_iter().filter(|l| self.matches(l)).collect();
        let count = matched.len();

        matched.sort_by(|a, b| self.compare(a, b));

        let page = matched
            .into_iter()
            .skip(self.skip)
            .take(self.take.unwrap_or(usize::MAX))
            .cloned()
            .collect();

        (page, count)
    }

    /// Deterministic identifier for this query, used by clients as a cache key.
    pub fn feed_id(&self) -> String {
        let order_by: Vec<Value> = self
            .order_by
            .iter()
            .map(|order| {
                let mut entry = Map::new();
                entry.insert(
                    order.field.name().to_string(),
                    Value::String(order.direction.name().to_string()),
                );
                Value::Object(entry)
            })
            .collect();

        // Struct fields serialize in declaration order, unlike a json! map
        #[derive(Serialize)]
        struct FeedKey<'a> {
            filter: Option<&'a str>,
            skip: usize,
            take: Option<usize>,
            #[serde(rename = "orderBy")]
            order_by: Vec<Value>,
        }

        let args = serde_json::to_string(&FeedKey {
            filter: self.filter.as_deref(),
            skip: self.skip,
            take: self.take,
            order_by,
        })
        .unwrap_or_default();

        format!("main-feed:{}", args)
    }
}

/// Case-sensitive substring match on description or url.
pub fn matches_filter(filter: Option<&str>, link: &Link) -> bool {
    match filter {
        None | Some("") => true,
        Some(needle) => link.description.contains(needle) || link.url.contains(needle),
    }
}

/// Result of the `feed` query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed {
    pub links: Vec<Link>,
    /// Number of links matching the filter, ignoring skip/take
    pub count: i64,
    pub id: String,
}
