use crate::{
    config::QueryLimits,
    filtering::{FilterDescriptor, FilterOperator, PageRequest, parse_advanced_filters},
};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::DeserializeOwned};
use serde_json::{Map, Value as JsonValue};
use serde_with::{DeserializeAs, OneOrMany, SerializeAs, serde_as};
use std::collections::HashMap;
use tracing::debug;
use url::form_urlencoded;
use utoipa::IntoParams;

/// Keys that are always decoded as index-aligned arrays.
const ARRAY_KEYS: [&str; 3] = ["f", "o", "v"];

/// Highest accepted position in an indexed key such as `v[3]`.
const MAX_INDEXED_POSITION: usize = 1_000;

/// Search, sorting and pagination parameters shared by every resource.
///
/// # Sorting
/// `sort` names a declared sort key; a leading `-` sorts descending. The
/// React Admin array form is accepted too:
/// ```json
/// ["CreatedDate", "DESC"]
/// ```
/// Unknown keys fall back to the resource's default order.
///
/// # Pagination
/// `pageIndex` is 1-based. Both values are clamped to the configured limits;
/// values that are not positive integers fall back to the defaults.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, IntoParams)]
#[serde(default, rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Free-text term matched as a case-insensitive substring against the
    /// resource's searchable fields.
    ///
    /// Example: `dune`
    #[param(example = "dune")]
    #[serde_as(as = "FirstValue")]
    pub search: Option<String>,
    /// Sort key, optionally prefixed with `-` for descending order.
    ///
    /// Example: `-CreatedDate`
    #[param(example = "-CreatedDate")]
    #[serde_as(as = "FirstValue")]
    pub sort: Option<String>,
    /// Page number (1-based).
    ///
    /// Example: `1`
    #[param(example = 1)]
    #[serde(deserialize_with = "lenient_page_number")]
    pub page_index: Option<u32>,
    /// Number of items per page.
    ///
    /// Example: `10`
    #[param(example = 10)]
    #[serde(deserialize_with = "lenient_page_number")]
    pub page_size: Option<u32>,
}

/// Advanced filters as three index-aligned arrays.
///
/// Index `i` describes one filter: field `f[i]`, operator `o[i]`, raw value
/// `v[i]`. Indices missing an operator or a value are ignored, as are
/// operators that are not recognised.
///
/// ```text
/// ?f=Isbn&o=Includes&v=111,333&f=Price&o=LessThan&v=20
/// ?f[0]=Isbn&o[0]=Includes&v[0]=111&f[1]=Status&o[1]=Equals&v[1]=Available
/// ```
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, IntoParams)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub struct AdvancedFilterParams {
    /// Field names; dotted paths reach related entities.
    ///
    /// Example: `Shelf.ShelfNumber`
    #[param(value_type = Option<Vec<String>>)]
    #[serde_as(as = "OneOrMany<_>")]
    pub f: Vec<String>,
    /// Operators, one of `Includes`, `Equals`, `NotEqualsTo`, `GreaterThan`,
    /// `GreaterThanOrEqualsTo`, `LessThan`, `LessThanOrEqualsTo`.
    #[param(value_type = Option<Vec<FilterOperator>>)]
    #[serde(deserialize_with = "lenient_operators")]
    pub o: Vec<Option<FilterOperator>>,
    /// Raw values; `Includes`/`Equals` accept comma-separated lists.
    #[param(value_type = Option<Vec<String>>)]
    #[serde_as(as = "OneOrMany<_>")]
    pub v: Vec<Option<String>>,
}

/// Placeholder for resources without simple filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct NoFilters {}

/// Everything a list endpoint accepts: search/sort/paging, advanced filters
/// and the resource's own simple filters `F`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct QueryParams<F = NoFilters> {
    #[serde(flatten)]
    pub search: SearchParams,
    #[serde(flatten)]
    pub advanced: AdvancedFilterParams,
    #[serde(flatten)]
    pub filters: F,
}

impl<F> QueryParams<F> {
    /// Decode a raw `application/x-www-form-urlencoded` query string.
    ///
    /// - repeated keys and indexed keys (`v[2]`) become arrays; indexed gaps
    ///   are empty entries
    /// - empty array entries count as missing
    /// - a single-valued key sent more than once keeps its first value
    /// - `PascalCase` keys are accepted (`PageIndex` reads as `pageIndex`)
    ///
    /// # Errors
    ///
    /// Fails only when a value cannot fit the target shape at all, such as a
    /// simple filter type whose own fields reject strings.
    pub fn from_query_str(query: &str) -> Result<Self, serde_json::Error>
    where
        F: DeserializeOwned,
    {
        serde_json::from_value(query_to_json(query))
    }

    /// Page request from the caller's values, clamped to `limits`.
    #[must_use]
    pub fn page_request(&self, limits: &QueryLimits) -> PageRequest {
        PageRequest::from_params(self.search.page_index, self.search.page_size, limits)
    }

    /// Complete advanced-filter triples.
    #[must_use]
    pub fn filter_descriptors(&self) -> Vec<FilterDescriptor> {
        parse_advanced_filters(&self.advanced.f, &self.advanced.o, &self.advanced.v)
    }
}

/// Accept numbers or numeric strings; anything else (including zero) is `None`.
fn lenient_page_number<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(page_number(JsonValue::deserialize(deserializer)?))
}

fn page_number(raw: JsonValue) -> Option<u32> {
    let number = match raw {
        JsonValue::Number(number) => number.as_u64().and_then(|n| u32::try_from(n).ok()),
        JsonValue::String(text) => text.trim().parse::<u32>().ok(),
        JsonValue::Array(items) => {
            debug!(values = items.len(), "page number sent more than once, keeping the first");
            items.into_iter().next().and_then(page_number)
        }
        _ => None,
    };
    number.filter(|n| *n > 0)
}

/// `serde_with` adapter for single-valued query keys.
///
/// A key sent more than once keeps its first non-empty value; an empty value
/// reads as `None`.
///
/// ```ignore
/// #[serde_as(as = "FirstValue")]
/// pub barcode: Option<String>,
/// ```
pub struct FirstValue;

impl<'de> DeserializeAs<'de, Option<String>> for FirstValue {
    fn deserialize_as<D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(first_text(JsonValue::deserialize(deserializer)?))
    }
}

impl SerializeAs<Option<String>> for FirstValue {
    fn serialize_as<S>(source: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        source.serialize(serializer)
    }
}

fn first_text(raw: JsonValue) -> Option<String> {
    match raw {
        JsonValue::String(text) => Some(text).filter(|text| !text.is_empty()),
        JsonValue::Number(number) => Some(number.to_string()),
        JsonValue::Bool(flag) => Some(flag.to_string()),
        JsonValue::Array(items) => {
            debug!(values = items.len(), "single-valued key sent more than once, keeping the first");
            items.into_iter().find_map(first_text)
        }
        JsonValue::Null | JsonValue::Object(_) => None,
    }
}

/// Unknown operator names become `None` so that their triple is dropped.
fn lenient_operators<'de, D>(deserializer: D) -> Result<Vec<Option<FilterOperator>>, D::Error>
where
    D: Deserializer<'de>,
{
    let parse = |item: &JsonValue| item.as_str().and_then(|raw| raw.parse().ok());
    let raw = JsonValue::deserialize(deserializer)?;
    Ok(match &raw {
        JsonValue::Array(items) => items.iter().map(parse).collect(),
        JsonValue::Null => Vec::new(),
        single => vec![parse(single)],
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyPosition {
    Plain,
    Append,
    At(usize),
}

enum Slot {
    Scalar(String),
    List(Vec<Option<String>>),
}

impl Slot {
    fn into_list(self) -> Vec<Option<String>> {
        match self {
            Self::Scalar(value) => vec![Some(value).filter(|v| !v.is_empty())],
            Self::List(items) => items,
        }
    }
}

fn split_key(key: &str) -> Option<(&str, KeyPosition)> {
    if let Some(name) = key.strip_suffix("[]") {
        return Some((name, KeyPosition::Append));
    }
    let Some((name, rest)) = key.split_once('[') else {
        return Some((key, KeyPosition::Plain));
    };
    let position = rest.strip_suffix(']')?.trim().parse::<usize>().ok()?;
    (position <= MAX_INDEXED_POSITION).then_some((name, KeyPosition::At(position)))
}

fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    chars
        .next()
        .map(|first| first.to_lowercase().chain(chars).collect())
        .unwrap_or_default()
}

/// Decode form pairs into a JSON object: single plain keys become strings,
/// repeated or indexed keys become arrays with `null` for missing entries.
/// Gaps in `f` are empty strings so the array stays aligned.
fn query_to_json(query: &str) -> JsonValue {
    let query = query.trim_start_matches('?');
    let mut slots: HashMap<String, Slot> = HashMap::new();

    for (raw_key, raw_value) in form_urlencoded::parse(query.as_bytes()) {
        let Some((name, position)) = split_key(raw_key.trim()) else {
            debug!(key = %raw_key, "ignoring malformed query key");
            continue;
        };
        let name = lower_first(name.trim());
        if name.is_empty() {
            continue;
        }
        let value = raw_value.into_owned();

        let next = match (slots.remove(&name), position) {
            (None, KeyPosition::Plain) if !ARRAY_KEYS.contains(&name.as_str()) => Slot::Scalar(value),
            (existing, position) => {
                let mut items = existing.map(Slot::into_list).unwrap_or_default();
                let item = Some(value).filter(|v| !v.is_empty());
                match position {
                    KeyPosition::At(index) => {
                        if items.len() <= index {
                            items.resize(index + 1, None);
                        }
                        items[index] = item;
                    }
                    KeyPosition::Plain | KeyPosition::Append => items.push(item),
                }
                Slot::List(items)
            }
        };
        slots.insert(name, next);
    }

    let object: Map<String, JsonValue> = slots
        .into_iter()
        .map(|(name, slot)| {
            let value = match slot {
                Slot::Scalar(value) => JsonValue::String(value),
                Slot::List(items) => JsonValue::Array(
                    items
                        .into_iter()
                        .map(|item| match item {
                            Some(value) => JsonValue::String(value),
                            None if name == "f" => JsonValue::String(String::new()),
                            None => JsonValue::Null,
                        })
                        .collect(),
                ),
            };
            (name, value)
        })
        .collect();
    JsonValue::Object(object)
}
