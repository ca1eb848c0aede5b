mod common;

use common::{catalog_items, catalog_store, item_ids, list_items};
use pretty_assertions::assert_eq;
use shelfquery::{
    FilterOperator, Predicate, PredicateBuilder,
    filtering::{FilterDescriptor, any_of, parse_advanced_filters},
    library::{Item, catalog::ITEM_SCHEMA},
};

fn matching(predicate: &Predicate<Item>) -> Vec<u128> {
    catalog_items()
        .iter()
        .filter(|item| predicate.evaluate(item))
        .map(|item| item.id.as_u128())
        .collect()
}

#[test]
fn test_parser_drops_partial_triples() {
    let descriptors = parse_advanced_filters(
        &["a", "b"],
        &[Some(FilterOperator::Equals), None],
        &[Some("1"), Some("2")],
    );
    assert_eq!(descriptors, vec![FilterDescriptor::new("a", FilterOperator::Equals, "1")]);
}

#[test]
fn test_parser_stops_at_field_count() {
    let descriptors = parse_advanced_filters(
        &["Title"],
        &[Some(FilterOperator::Equals), Some(FilterOperator::Equals)],
        &[Some("Dune"), Some("Emma")],
    );
    assert_eq!(descriptors.len(), 1);

    let descriptors = parse_advanced_filters::<&str, &str>(&["Title", "Isbn"], &[Some(FilterOperator::Equals)], &[]);
    assert!(descriptors.is_empty());
}

#[test]
fn test_includes_list_is_or_and_order_independent() {
    let builder = PredicateBuilder::new(&*ITEM_SCHEMA);
    let values = ["111", "333", "555"];
    let permutations = [[0, 1, 2], [2, 1, 0], [1, 2, 0]];

    let mut results = Vec::new();
    for order in permutations {
        let raw = order.map(|i| values[i]).join(",");
        let predicate = builder
            .build_list("Isbn", FilterOperator::Includes, &raw)
            .expect("three values");
        assert_eq!(predicate.leaf_count(), 3);
        assert!(matches!(predicate, Predicate::Any(_)));
        results.push(matching(&predicate));
    }
    assert_eq!(results[0], vec![1, 3, 5]);
    assert!(results.iter().all(|ids| *ids == results[0]));
}

#[test]
fn test_or_combinator_skips_empty_input() {
    assert!(any_of(Vec::<Predicate<Item>>::new()).is_none());

    let builder = PredicateBuilder::new(&*ITEM_SCHEMA);
    assert!(builder.build_list("Isbn", FilterOperator::Equals, " , ,").is_none());
}

#[test]
fn test_not_equals_list_excludes_every_value() {
    let builder = PredicateBuilder::new(&*ITEM_SCHEMA);
    let predicate = builder
        .build_list("Status", FilterOperator::NotEqualsTo, "Borrowed,Lost")
        .unwrap();
    assert_eq!(matching(&predicate), vec![1, 3, 4]);
}

#[test]
fn test_null_literal_on_nullable_fields() {
    let builder = PredicateBuilder::new(&*ITEM_SCHEMA);
    assert_eq!(matching(&builder.build("Isbn", FilterOperator::Equals, "null")), vec![4]);
    assert_eq!(
        matching(&builder.build("PublishedDate", FilterOperator::NotEqualsTo, "NULL")),
        vec![1, 2, 3, 5]
    );
    // `Barcode` is not nullable, so `null` is an ordinary string.
    assert!(matching(&builder.build("Barcode", FilterOperator::Equals, "null")).is_empty());
}

#[test]
fn test_missing_relation_never_matches() {
    let builder = PredicateBuilder::new(&*ITEM_SCHEMA);
    // Item 4 has no shelf; item 5's shelf has no warehouse.
    let predicate = builder.build("Shelf.Warehouse.Name", FilterOperator::NotEqualsTo, "North Depot");
    assert_eq!(matching(&predicate), vec![3]);
    let predicate = builder.build("Shelf.Floor", FilterOperator::GreaterThanOrEqualsTo, "0");
    assert_eq!(matching(&predicate), vec![1, 2, 3, 5]);
}

#[test]
fn test_numeric_and_enum_ordering() {
    let builder = PredicateBuilder::new(&*ITEM_SCHEMA);
    assert_eq!(matching(&builder.build("Price", FilterOperator::LessThan, "15")), vec![1, 2]);
    assert_eq!(matching(&builder.build("PageCount", FilterOperator::GreaterThan, "400")), vec![1, 3]);
    assert_eq!(matching(&builder.build("Rating", FilterOperator::GreaterThanOrEqualsTo, "4.7")), vec![4, 5]);
    // Declaration order: Available, Borrowed, Reserved, Lost, Damaged.
    assert_eq!(matching(&builder.build("Status", FilterOperator::GreaterThan, "borrowed")), vec![5]);
}

#[tokio::test]
async fn test_groups_of_same_field_and_operator_or_together() {
    let store = catalog_store();
    let page = list_items(
        &store,
        "f=Isbn&o=Equals&v=111&f=Isbn&o=Equals&v=333&f=Isbn&o=NotEqualsTo&v=333&sort=CreatedDate",
    )
    .await;
    assert_eq!(item_ids(&page), vec![1]);
}

#[tokio::test]
async fn test_bad_triple_does_not_block_others() {
    let store = catalog_store();
    let page = list_items(
        &store,
        "f=Title&o=Between&v=x&f=Category.Name&o=Equals&v=fiction&f=Price&o=lte&v=&sort=Title",
    )
    .await;
    assert_eq!(item_ids(&page), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_indexed_triples() {
    let store = catalog_store();
    let page = list_items(
        &store,
        "f[0]=Shelf.ShelfNumber&o[0]=Includes&v[0]=A-&f[1]=Rating&o[1]=gt&v[1]=4.3&sort=Title",
    )
    .await;
    assert_eq!(item_ids(&page), vec![1]);
}
