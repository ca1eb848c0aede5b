//! Small in-crate catalog used by the filtering unit tests.

use crate::fields::{EntitySchema, FieldDef, FieldEnum};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Genre {
    Fiction,
    History,
    Science,
}

impl FieldEnum for Genre {
    const VARIANTS: &'static [&'static str] = &["Fiction", "History", "Science"];

    fn variant_name(self) -> &'static str {
        match self {
            Self::Fiction => "Fiction",
            Self::History => "History",
            Self::Science => "Science",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Shelf {
    pub number: String,
    pub floor: i32,
}

#[derive(Debug, Clone)]
pub struct Author {
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub isbn: Option<String>,
    pub price: Decimal,
    pub available: bool,
    pub genre: Genre,
    pub published: NaiveDate,
    pub created: NaiveDateTime,
    pub shelf: Option<Shelf>,
    pub authors: Vec<Author>,
}

pub static SHELF: LazyLock<EntitySchema<Shelf>> = LazyLock::new(|| {
    EntitySchema::new("Shelf")
        .field(FieldDef::text("ShelfNumber", |s: &Shelf| s.number.as_str().into()))
        .field(FieldDef::integer("Floor", |s: &Shelf| s.floor.into()))
});

pub static AUTHOR: LazyLock<EntitySchema<Author>> = LazyLock::new(|| {
    EntitySchema::new("Author").field(FieldDef::text("Name", |a: &Author| a.name.as_str().into()))
});

pub static BOOK: LazyLock<EntitySchema<Book>> = LazyLock::new(|| {
    EntitySchema::new("Book")
        .field(FieldDef::integer("Id", |b: &Book| b.id.into()))
        .field(FieldDef::text("Title", |b: &Book| b.title.as_str().into()).ignore_case())
        .field(FieldDef::text("Isbn", |b: &Book| b.isbn.as_deref().into()).nullable())
        .field(FieldDef::decimal("Price", |b: &Book| b.price.into()))
        .field(FieldDef::boolean("Available", |b: &Book| b.available.into()))
        .field(FieldDef::enumeration("Genre", |b: &Book| b.genre))
        .field(FieldDef::date("PublishedDate", |b: &Book| b.published.into()))
        .field(FieldDef::date_time("CreatedDate", |b: &Book| b.created.into()))
        .relation("Shelf", |b: &Book| b.shelf.as_ref(), &SHELF)
});

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
    day(y, m, d).and_hms_opt(h, min, s).unwrap()
}

pub fn book(id: i64, title: &str, isbn: Option<&str>) -> Book {
    Book {
        id,
        title: title.to_string(),
        isbn: isbn.map(str::to_string),
        price: Decimal::new(1000 + id * 100, 2),
        available: id % 2 == 1,
        genre: Genre::Fiction,
        published: day(2024, 1, 1),
        created: at(2024, 1, 1, 12, 0, 0),
        shelf: None,
        authors: Vec::new(),
    }
}

/// Five books with distinct ids, titles, ISBNs and prices 11.00..15.00.
pub fn catalog() -> Vec<Book> {
    let mut books = vec![
        book(1, "Dune", Some("111")),
        book(2, "Foundation", Some("222")),
        book(3, "Hyperion", Some("333")),
        book(4, "The Guns of August", None),
        book(5, "A Brief History of Time", Some("555")),
    ];
    books[3].genre = Genre::History;
    books[4].genre = Genre::Science;
    books[0].shelf = Some(Shelf {
        number: "A-1".to_string(),
        floor: 1,
    });
    books[2].shelf = Some(Shelf {
        number: "B-7".to_string(),
        floor: 2,
    });
    books[0].authors.push(Author {
        name: "Frank Herbert".to_string(),
    });
    books[1].authors.push(Author {
        name: "Isaac Asimov".to_string(),
    });
    books
}

pub fn ids(books: &[Book], keep: impl Fn(&Book) -> bool) -> Vec<i64> {
    books.iter().filter(|b| keep(b)).map(|b| b.id).collect()
}
