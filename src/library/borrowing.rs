use super::catalog::{ITEM_SCHEMA, Item};
use crate::{
    fields::{EntitySchema, FieldDef, FieldEnum, FieldKind, Value, coerce},
    filtering::{FilterOperator, Predicate, PredicateBuilder, SortDirection, SortMap},
    models::FirstValue,
    specification::Specification,
    traits::{QueryResource, SimpleFilters, non_blank, present_values},
};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::{OneOrMany, serde_as};
use std::sync::LazyLock;
use tracing::debug;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum BorrowStatus {
    Active,
    Returned,
    Overdue,
    Lost,
}

impl FieldEnum for BorrowStatus {
    const VARIANTS: &'static [&'static str] = &["Active", "Returned", "Overdue", "Lost"];

    fn variant_name(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Returned => "Returned",
            Self::Overdue => "Overdue",
            Self::Lost => "Lost",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub membership_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRecord {
    pub id: Uuid,
    pub item: Item,
    pub member: Member,
    pub borrow_date: NaiveDateTime,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDateTime>,
    pub status: BorrowStatus,
    pub fine_amount: Decimal,
}

fn borrowed_item(record: &BorrowRecord) -> Option<&Item> {
    Some(&record.item)
}

fn borrowing_member(record: &BorrowRecord) -> Option<&Member> {
    Some(&record.member)
}

pub static MEMBER_SCHEMA: LazyLock<EntitySchema<Member>> = LazyLock::new(|| {
    EntitySchema::new("Member")
        .field(FieldDef::uuid("Id", |m: &Member| m.id.into()))
        .field(FieldDef::text("FullName", |m: &Member| m.full_name.as_str().into()).ignore_case())
        .field(FieldDef::text("Email", |m: &Member| m.email.as_str().into()).ignore_case())
        .field(FieldDef::text("MembershipNumber", |m: &Member| m.membership_number.as_str().into()))
});

pub static BORROW_SCHEMA: LazyLock<EntitySchema<BorrowRecord>> = LazyLock::new(|| {
    EntitySchema::new("BorrowRecord")
        .field(FieldDef::uuid("Id", |r: &BorrowRecord| r.id.into()))
        .field(FieldDef::date_time("BorrowDate", |r: &BorrowRecord| r.borrow_date.into()))
        .field(FieldDef::date("DueDate", |r: &BorrowRecord| r.due_date.into()))
        .field(FieldDef::date_time("ReturnDate", |r: &BorrowRecord| r.return_date.into()).nullable())
        .field(FieldDef::enumeration("Status", |r: &BorrowRecord| r.status))
        .field(FieldDef::decimal("FineAmount", |r: &BorrowRecord| r.fine_amount.into()))
        .relation("Item", borrowed_item, &ITEM_SCHEMA)
        .relation("Member", borrowing_member, &MEMBER_SCHEMA)
});

pub static BORROW_SORTS: LazyLock<SortMap<BorrowRecord>> = LazyLock::new(|| {
    SortMap::builder(&BORROW_SCHEMA)
        .key("BorrowDate")
        .key("DueDate")
        .key("ReturnDate")
        .key("FineAmount")
        .alias("Member", "Member.FullName")
        .alias("Title", "Item.Title")
        .default_order("BorrowDate", SortDirection::Descending)
        .build()
        .expect("borrow record sort map")
});

impl QueryResource for BorrowRecord {
    const RESOURCE_NAME: &'static str = "borrow_records";

    fn schema() -> &'static EntitySchema<Self> {
        &BORROW_SCHEMA
    }

    fn sort_map() -> &'static SortMap<Self> {
        &BORROW_SORTS
    }

    fn searchable_fields() -> &'static [&'static str] {
        &["Member.FullName", "Member.Email", "Item.Title"]
    }

    fn default_includes() -> &'static [&'static str] {
        &["Item", "Member"]
    }
}

/// Simple filters for the borrow-record list.
///
/// `overdue` compares the due date with `asOf`, which defaults to today (UTC).
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, IntoParams)]
#[serde(default, rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BorrowFilters {
    #[serde_as(as = "FirstValue")]
    pub member_id: Option<String>,
    #[serde_as(as = "FirstValue")]
    pub item_id: Option<String>,
    /// Comma-separated statuses.
    #[param(value_type = Option<String>, example = "Active,Overdue")]
    #[serde_as(as = "OneOrMany<_>")]
    pub status: Vec<Option<String>>,
    /// Not yet returned and due before `asOf`.
    #[param(value_type = Option<bool>)]
    #[serde_as(as = "FirstValue")]
    pub overdue: Option<String>,
    /// Reference day for `overdue`.
    #[param(value_type = Option<String>, example = "2024-06-01")]
    #[serde_as(as = "FirstValue")]
    pub as_of: Option<String>,
    /// `[from, to]`, compared by day.
    #[param(value_type = Option<Vec<String>>)]
    #[serde_as(as = "OneOrMany<_>")]
    pub borrow_date: Vec<Option<String>>,
    /// `[from, to]`, either end optional.
    #[param(value_type = Option<Vec<String>>)]
    #[serde_as(as = "OneOrMany<_>")]
    pub due_date: Vec<Option<String>>,
    #[param(value_type = Option<bool>)]
    #[serde_as(as = "FirstValue")]
    pub returned: Option<String>,
}

impl BorrowFilters {
    fn overdue_filter(&self, builder: &PredicateBuilder<'_, BorrowRecord>, raw: &str) -> Predicate<BorrowRecord> {
        let Some(wanted) = flag(raw) else {
            debug!(field = "overdue", value = raw, "overdue flag is not a boolean, matching nothing");
            return Predicate::Never;
        };
        let as_of = match non_blank(self.as_of.as_ref()) {
            None => Utc::now().date_naive(),
            Some(raw) => match coerce(raw, FieldKind::Date) {
                Ok(Value::Date(day)) => day,
                _ => {
                    debug!(field = "asOf", value = raw, "reference day is not a date, matching nothing");
                    return Predicate::Never;
                }
            },
        };
        let overdue = builder
            .build("ReturnDate", FilterOperator::Equals, "null")
            .and(builder.build("DueDate", FilterOperator::LessThan, &as_of.to_string()));
        if wanted { overdue } else { overdue.negate() }
    }
}

fn flag(raw: &str) -> Option<bool> {
    match coerce(raw, FieldKind::Boolean) {
        Ok(Value::Boolean(flag)) => Some(flag),
        _ => None,
    }
}

impl SimpleFilters<BorrowRecord> for BorrowFilters {
    fn apply(&self, builder: &PredicateBuilder<'_, BorrowRecord>, spec: &mut Specification<BorrowRecord>) {
        if let Some(member) = non_blank(self.member_id.as_ref()) {
            spec.where_field(builder, "Member.Id", FilterOperator::Equals, member);
        }
        if let Some(item) = non_blank(self.item_id.as_ref()) {
            spec.where_field(builder, "Item.Id", FilterOperator::Equals, item);
        }
        spec.add_filter_opt(builder.build_lists("Status", FilterOperator::Equals, &present_values(&self.status)));
        if let Some(overdue) = non_blank(self.overdue.as_ref()) {
            spec.add_filter(self.overdue_filter(builder, overdue));
        }
        spec.where_range(builder, "BorrowDate", &self.borrow_date)
            .where_range(builder, "DueDate", &self.due_date);
        if let Some(returned) = non_blank(self.returned.as_ref()) {
            let filter = match flag(returned) {
                Some(true) => builder.build("ReturnDate", FilterOperator::NotEqualsTo, "null"),
                Some(false) => builder.build("ReturnDate", FilterOperator::Equals, "null"),
                None => {
                    debug!(field = "returned", value = returned, "returned flag is not a boolean, matching nothing");
                    Predicate::Never
                }
            };
            spec.add_filter(filter);
        }
    }
}
