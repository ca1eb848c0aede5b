#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use shelfquery::{
    InMemoryStore, Page, QueryExecutor, QueryLimits, QueryParams, SimpleFilters, build_specification,
    library::{Author, Category, Genre, Item, ItemFilters, ItemStatus, Shelf, Warehouse},
    traits::QueryResource,
};
use uuid::Uuid;

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
    day(y, m, d).and_hms_opt(h, min, s).expect("valid test time")
}

pub fn id(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

/// Install a `debug` subscriber once so fail-closed log lines show up in
/// `cargo test -- --nocapture`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("shelfquery=debug")
        .with_test_writer()
        .try_init();
}

pub fn warehouse(n: u128, name: &str) -> Warehouse {
    Warehouse {
        id: id(0x100 + n),
        name: name.to_string(),
        code: format!("WH-{n}"),
        location: None,
    }
}

pub fn category(n: u128, name: &str) -> Category {
    Category {
        id: id(0x200 + n),
        name: name.to_string(),
    }
}

pub fn shelf(number: &str, floor: i32, warehouse: Option<Warehouse>) -> Shelf {
    Shelf {
        id: Uuid::new_v4(),
        shelf_number: number.to_string(),
        floor,
        warehouse,
    }
}

pub fn author(name: &str) -> Author {
    Author {
        id: Uuid::new_v4(),
        full_name: name.to_string(),
    }
}

pub fn genre(name: &str) -> Genre {
    Genre {
        id: Uuid::new_v4(),
        name: name.to_string(),
    }
}

/// A bare item with id `n` and an ISBN.
pub fn item(n: u128, title: &str, isbn: Option<&str>, created: NaiveDateTime) -> Item {
    let mut item = Item::new(title, format!("LIB-{n:04}"), created);
    item.id = id(n);
    item.isbn = isbn.map(str::to_string);
    item
}

/// Five catalog items, ids 1..=5, created on consecutive days of January 2024
/// (items 3 and 4 share a day).
pub fn catalog_items() -> Vec<Item> {
    let north = warehouse(1, "North Depot");
    let south = warehouse(2, "South Depot");
    let fiction = category(1, "Fiction");

    let mut dune = item(1, "Dune", Some("111"), at(2024, 1, 1, 9, 0, 0));
    dune.publisher = Some("Chilton Books".to_string());
    dune.price = Decimal::new(1250, 2);
    dune.page_count = Some(412);
    dune.rating = Some(4.5);
    dune.published_date = Some(day(1965, 8, 1));
    dune.category = Some(fiction.clone());
    dune.shelf = Some(shelf("A-1", 1, Some(north.clone())));
    dune.authors.push(author("Frank Herbert"));
    dune.genres.push(genre("Science Fiction"));

    let mut foundation = item(2, "Foundation", Some("222"), at(2024, 1, 2, 14, 30, 0));
    foundation.publisher = Some("Gnome Press".to_string());
    foundation.status = ItemStatus::Borrowed;
    foundation.price = Decimal::new(999, 2);
    foundation.page_count = Some(255);
    foundation.rating = Some(4.2);
    foundation.published_date = Some(day(1951, 6, 1));
    foundation.category = Some(fiction.clone());
    foundation.shelf = Some(shelf("A-2", 1, Some(north)));
    foundation.authors.push(author("Isaac Asimov"));
    foundation.genres.push(genre("Science Fiction"));

    let mut hyperion = item(3, "Hyperion", Some("333"), at(2024, 1, 3, 8, 15, 0));
    hyperion.publisher = Some("Doubleday".to_string());
    hyperion.price = Decimal::new(1500, 2);
    hyperion.page_count = Some(482);
    hyperion.published_date = Some(day(1989, 5, 26));
    hyperion.category = Some(fiction);
    hyperion.shelf = Some(shelf("B-7", 2, Some(south)));
    hyperion.authors.push(author("Dan Simmons"));
    hyperion.genres.push(genre("Science Fiction"));
    hyperion.genres.push(genre("Horror"));

    let mut dictionary = item(4, "Oxford English Dictionary", None, at(2024, 1, 3, 17, 45, 0));
    dictionary.publisher = Some("Oxford University Press".to_string());
    dictionary.price = Decimal::new(35000, 2);
    dictionary.rating = Some(4.9);
    dictionary.is_reference = true;
    dictionary.category = Some(category(2, "Reference"));

    let mut brief_history = item(5, "A Brief History of Time", Some("555"), at(2024, 1, 5, 11, 0, 0));
    brief_history.publisher = Some("Bantam".to_string());
    brief_history.status = ItemStatus::Lost;
    brief_history.price = Decimal::new(1800, 2);
    brief_history.page_count = Some(256);
    brief_history.rating = Some(4.7);
    brief_history.published_date = Some(day(1988, 4, 1));
    brief_history.category = Some(category(3, "Science"));
    brief_history.shelf = Some(shelf("C-3", 3, None));
    brief_history.authors.push(author("Stephen Hawking"));
    brief_history.genres.push(genre("Popular Science"));

    vec![dune, foundation, hyperion, dictionary, brief_history]
}

pub fn catalog_store() -> InMemoryStore<Item> {
    InMemoryStore::new(catalog_items())
}

/// Decode `query`, build the item specification and run it.
pub async fn list_items(store: &InMemoryStore<Item>, query: &str) -> Page<Item> {
    list::<Item, ItemFilters>(store, query).await
}

pub async fn list<T, F>(store: &InMemoryStore<T>, query: &str) -> Page<T>
where
    T: QueryResource + Clone,
    F: SimpleFilters<T> + serde::de::DeserializeOwned,
{
    let params = QueryParams::<F>::from_query_str(query).expect("query string decodes");
    let spec = build_specification::<T, F>(&params, &QueryLimits::default());
    store.fetch_page(spec).await.expect("in-memory store never fails")
}

pub fn item_ids(page: &Page<Item>) -> Vec<u128> {
    page.items.iter().map(|item| item.id.as_u128()).collect()
}
