use super::warehouse::{WAREHOUSE_SCHEMA, Warehouse};
use crate::{
    fields::{EntitySchema, FieldDef, FieldEnum},
    filtering::{FilterOperator, Predicate, PredicateBuilder, SortDirection, SortMap},
    models::FirstValue,
    specification::Specification,
    traits::{QueryResource, SimpleFilters, non_blank, present_values},
};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::{OneOrMany, serde_as};
use std::sync::LazyLock;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum ItemStatus {
    Available,
    Borrowed,
    Reserved,
    Lost,
    Damaged,
}

impl FieldEnum for ItemStatus {
    const VARIANTS: &'static [&'static str] = &["Available", "Borrowed", "Reserved", "Lost", "Damaged"];

    fn variant_name(self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Borrowed => "Borrowed",
            Self::Reserved => "Reserved",
            Self::Lost => "Lost",
            Self::Damaged => "Damaged",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Genre {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: Uuid,
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Shelf {
    pub id: Uuid,
    pub shelf_number: String,
    pub floor: i32,
    pub warehouse: Option<Warehouse>,
}

/// A physical copy in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: Uuid,
    pub title: String,
    pub isbn: Option<String>,
    pub barcode: String,
    pub publisher: Option<String>,
    pub status: ItemStatus,
    pub price: Decimal,
    pub page_count: Option<i32>,
    pub rating: Option<f64>,
    pub is_reference: bool,
    pub published_date: Option<NaiveDate>,
    pub created_date: NaiveDateTime,
    pub category: Option<Category>,
    pub shelf: Option<Shelf>,
    pub authors: Vec<Author>,
    pub genres: Vec<Genre>,
}

impl Item {
    /// An available, unshelved item with no optional metadata.
    #[must_use]
    pub fn new(title: impl Into<String>, barcode: impl Into<String>, created_date: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            isbn: None,
            barcode: barcode.into(),
            publisher: None,
            status: ItemStatus::Available,
            price: Decimal::ZERO,
            page_count: None,
            rating: None,
            is_reference: false,
            published_date: None,
            created_date,
            category: None,
            shelf: None,
            authors: Vec::new(),
            genres: Vec::new(),
        }
    }
}

fn item_authors(item: &Item) -> &[Author] {
    &item.authors
}

fn item_genres(item: &Item) -> &[Genre] {
    &item.genres
}

pub static CATEGORY_SCHEMA: LazyLock<EntitySchema<Category>> = LazyLock::new(|| {
    EntitySchema::new("Category")
        .field(FieldDef::uuid("Id", |c: &Category| c.id.into()))
        .field(FieldDef::text("Name", |c: &Category| c.name.as_str().into()).ignore_case())
});

pub static GENRE_SCHEMA: LazyLock<EntitySchema<Genre>> = LazyLock::new(|| {
    EntitySchema::new("Genre")
        .field(FieldDef::uuid("Id", |g: &Genre| g.id.into()))
        .field(FieldDef::text("Name", |g: &Genre| g.name.as_str().into()))
});

pub static AUTHOR_SCHEMA: LazyLock<EntitySchema<Author>> = LazyLock::new(|| {
    EntitySchema::new("Author")
        .field(FieldDef::uuid("Id", |a: &Author| a.id.into()))
        .field(FieldDef::text("FullName", |a: &Author| a.full_name.as_str().into()))
});

pub static SHELF_SCHEMA: LazyLock<EntitySchema<Shelf>> = LazyLock::new(|| {
    EntitySchema::new("Shelf")
        .field(FieldDef::uuid("Id", |s: &Shelf| s.id.into()))
        .field(FieldDef::text("ShelfNumber", |s: &Shelf| s.shelf_number.as_str().into()))
        .field(FieldDef::integer("Floor", |s: &Shelf| s.floor.into()))
        .relation("Warehouse", |s: &Shelf| s.warehouse.as_ref(), &WAREHOUSE_SCHEMA)
});

pub static ITEM_SCHEMA: LazyLock<EntitySchema<Item>> = LazyLock::new(|| {
    EntitySchema::new("Item")
        .field(FieldDef::uuid("Id", |i: &Item| i.id.into()))
        .field(FieldDef::text("Title", |i: &Item| i.title.as_str().into()).ignore_case())
        .field(FieldDef::text("Isbn", |i: &Item| i.isbn.as_deref().into()).nullable())
        .field(FieldDef::text("Barcode", |i: &Item| i.barcode.as_str().into()))
        .field(
            FieldDef::text("Publisher", |i: &Item| i.publisher.as_deref().into())
                .nullable()
                .ignore_case(),
        )
        .field(FieldDef::enumeration("Status", |i: &Item| i.status))
        .field(FieldDef::decimal("Price", |i: &Item| i.price.into()))
        .field(FieldDef::integer("PageCount", |i: &Item| i.page_count.into()).nullable())
        .field(FieldDef::float("Rating", |i: &Item| i.rating.into()).nullable())
        .field(FieldDef::boolean("IsReference", |i: &Item| i.is_reference.into()))
        .field(FieldDef::date("PublishedDate", |i: &Item| i.published_date.into()).nullable())
        .field(FieldDef::date_time("CreatedDate", |i: &Item| i.created_date.into()))
        .relation("Category", |i: &Item| i.category.as_ref(), &CATEGORY_SCHEMA)
        .relation("Shelf", |i: &Item| i.shelf.as_ref(), &SHELF_SCHEMA)
});

pub static ITEM_SORTS: LazyLock<SortMap<Item>> = LazyLock::new(|| {
    SortMap::builder(&ITEM_SCHEMA)
        .key("Title")
        .key("Isbn")
        .key("Price")
        .key("Rating")
        .key("PublishedDate")
        .key("CreatedDate")
        .alias("Shelf", "Shelf.ShelfNumber")
        .alias("Category", "Category.Name")
        .default_order("CreatedDate", SortDirection::Descending)
        .build()
        .expect("item sort map")
});

impl QueryResource for Item {
    const RESOURCE_NAME: &'static str = "items";
    const SPLIT_QUERY: bool = true;

    fn schema() -> &'static EntitySchema<Self> {
        &ITEM_SCHEMA
    }

    fn sort_map() -> &'static SortMap<Self> {
        &ITEM_SORTS
    }

    fn searchable_fields() -> &'static [&'static str] {
        &["Title", "Isbn", "Barcode", "Publisher"]
    }

    fn default_includes() -> &'static [&'static str] {
        &["Authors", "Genres", "Category", "Shelf"]
    }
}

/// Simple filters for the item list.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, IntoParams)]
#[serde(default, rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ItemFilters {
    /// Comma-separated ISBNs; an item matches any of them.
    #[param(value_type = Option<String>, example = "9780441013593,9780553293357")]
    #[serde_as(as = "OneOrMany<_>")]
    pub isbn: Vec<Option<String>>,
    /// Exact barcode.
    #[serde_as(as = "FirstValue")]
    pub barcode: Option<String>,
    /// Part of an author's name, any case.
    #[param(example = "herbert")]
    #[serde_as(as = "FirstValue")]
    pub author: Option<String>,
    #[serde_as(as = "FirstValue")]
    pub category_id: Option<String>,
    /// Shelf number, e.g. `A-12`.
    #[serde_as(as = "FirstValue")]
    pub shelf: Option<String>,
    /// Comma-separated genre names; an item matches if it has any of them.
    #[param(value_type = Option<String>, example = "Fantasy,Science Fiction")]
    #[serde_as(as = "OneOrMany<_>")]
    pub genres: Vec<Option<String>>,
    /// Comma-separated statuses.
    #[param(value_type = Option<String>, example = "Available,Reserved")]
    #[serde_as(as = "OneOrMany<_>")]
    pub status: Vec<Option<String>>,
    #[param(value_type = Option<bool>)]
    #[serde_as(as = "FirstValue")]
    pub is_reference: Option<String>,
    /// `[from, to]`, either end optional.
    #[param(value_type = Option<Vec<String>>)]
    #[serde_as(as = "OneOrMany<_>")]
    pub published_date: Vec<Option<String>>,
    /// `[min, max]`, either end optional.
    #[param(value_type = Option<Vec<String>>)]
    #[serde_as(as = "OneOrMany<_>")]
    pub price: Vec<Option<String>>,
}

impl SimpleFilters<Item> for ItemFilters {
    fn apply(&self, builder: &PredicateBuilder<'_, Item>, spec: &mut Specification<Item>) {
        spec.add_filter_opt(builder.build_lists("Isbn", FilterOperator::Equals, &present_values(&self.isbn)));
        if let Some(barcode) = non_blank(self.barcode.as_ref()) {
            spec.where_field(builder, "Barcode", FilterOperator::Equals, barcode);
        }
        if let Some(author) = non_blank(self.author.as_ref()) {
            // Patrons type author names loosely.
            let inner = builder
                .with_schema(&AUTHOR_SCHEMA)
                .ignoring_case()
                .build("FullName", FilterOperator::Includes, author);
            spec.add_filter(Predicate::related_any("Authors", item_authors, inner));
        }
        if let Some(category) = non_blank(self.category_id.as_ref()) {
            spec.where_field(builder, "Category.Id", FilterOperator::Equals, category);
        }
        if let Some(shelf) = non_blank(self.shelf.as_ref()) {
            spec.where_field(builder, "Shelf.ShelfNumber", FilterOperator::Equals, shelf);
        }
        let genres = builder.with_schema(&GENRE_SCHEMA).ignoring_case().build_lists(
            "Name",
            FilterOperator::Equals,
            &present_values(&self.genres),
        );
        if let Some(inner) = genres {
            spec.add_filter(Predicate::related_any("Genres", item_genres, inner));
        }
        spec.add_filter_opt(builder.build_lists("Status", FilterOperator::Equals, &present_values(&self.status)));
        if let Some(reference) = non_blank(self.is_reference.as_ref()) {
            spec.where_field(builder, "IsReference", FilterOperator::Equals, reference);
        }
        spec.where_range(builder, "PublishedDate", &self.published_date)
            .where_range(builder, "Price", &self.price);
    }
}
