use super::catalog::{ITEM_SCHEMA, Item};
use crate::{
    fields::{EntitySchema, FieldDef, FieldEnum},
    filtering::{FilterOperator, PredicateBuilder, SortDirection, SortMap},
    models::FirstValue,
    specification::Specification,
    traits::{QueryResource, SimpleFilters, non_blank, present_values},
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_with::{OneOrMany, serde_as};
use std::sync::LazyLock;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Warehouse {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum MovementType {
    Inbound,
    Outbound,
    Transfer,
    Adjustment,
}

impl FieldEnum for MovementType {
    const VARIANTS: &'static [&'static str] = &["Inbound", "Outbound", "Transfer", "Adjustment"];

    fn variant_name(self) -> &'static str {
        match self {
            Self::Inbound => "Inbound",
            Self::Outbound => "Outbound",
            Self::Transfer => "Transfer",
            Self::Adjustment => "Adjustment",
        }
    }
}

/// One stock movement of an item in or out of a warehouse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseTracking {
    pub id: Uuid,
    pub item: Item,
    pub warehouse: Warehouse,
    pub movement: MovementType,
    pub quantity: i32,
    pub tracked_at: NaiveDateTime,
    pub note: Option<String>,
}

fn tracked_item(tracking: &WarehouseTracking) -> Option<&Item> {
    Some(&tracking.item)
}

fn tracked_warehouse(tracking: &WarehouseTracking) -> Option<&Warehouse> {
    Some(&tracking.warehouse)
}

pub static WAREHOUSE_SCHEMA: LazyLock<EntitySchema<Warehouse>> = LazyLock::new(|| {
    EntitySchema::new("Warehouse")
        .field(FieldDef::uuid("Id", |w: &Warehouse| w.id.into()))
        .field(FieldDef::text("Name", |w: &Warehouse| w.name.as_str().into()).ignore_case())
        .field(FieldDef::text("Code", |w: &Warehouse| w.code.as_str().into()))
        .field(FieldDef::text("Location", |w: &Warehouse| w.location.as_deref().into()).nullable())
});

pub static TRACKING_SCHEMA: LazyLock<EntitySchema<WarehouseTracking>> = LazyLock::new(|| {
    EntitySchema::new("WarehouseTracking")
        .field(FieldDef::uuid("Id", |t: &WarehouseTracking| t.id.into()))
        .field(FieldDef::enumeration("Movement", |t: &WarehouseTracking| t.movement))
        .field(FieldDef::integer("Quantity", |t: &WarehouseTracking| t.quantity.into()))
        .field(FieldDef::date_time("TrackedAt", |t: &WarehouseTracking| t.tracked_at.into()))
        .field(
            FieldDef::text("Note", |t: &WarehouseTracking| t.note.as_deref().into())
                .nullable()
                .ignore_case(),
        )
        .relation("Item", tracked_item, &ITEM_SCHEMA)
        .relation("Warehouse", tracked_warehouse, &WAREHOUSE_SCHEMA)
});

pub static TRACKING_SORTS: LazyLock<SortMap<WarehouseTracking>> = LazyLock::new(|| {
    SortMap::builder(&TRACKING_SCHEMA)
        .key("TrackedAt")
        .key("Quantity")
        .key("Movement")
        .alias("Warehouse", "Warehouse.Name")
        .alias("Title", "Item.Title")
        .default_order("TrackedAt", SortDirection::Descending)
        .build()
        .expect("warehouse tracking sort map")
});

impl QueryResource for WarehouseTracking {
    const RESOURCE_NAME: &'static str = "warehouse_tracking";

    fn schema() -> &'static EntitySchema<Self> {
        &TRACKING_SCHEMA
    }

    fn sort_map() -> &'static SortMap<Self> {
        &TRACKING_SORTS
    }

    fn searchable_fields() -> &'static [&'static str] {
        &["Item.Title", "Warehouse.Name", "Note"]
    }

    fn default_includes() -> &'static [&'static str] {
        &["Item", "Warehouse"]
    }
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, IntoParams)]
#[serde(default, rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TrackingFilters {
    #[serde_as(as = "FirstValue")]
    pub warehouse_id: Option<String>,
    #[serde_as(as = "FirstValue")]
    pub item_id: Option<String>,
    /// Comma-separated movement types.
    #[param(value_type = Option<String>, example = "Inbound,Transfer")]
    #[serde_as(as = "OneOrMany<_>")]
    pub movement: Vec<Option<String>>,
    /// `[min, max]`, either end optional.
    #[param(value_type = Option<Vec<String>>)]
    #[serde_as(as = "OneOrMany<_>")]
    pub quantity: Vec<Option<String>>,
    /// `[from, to]`, compared by day.
    #[param(value_type = Option<Vec<String>>)]
    #[serde_as(as = "OneOrMany<_>")]
    pub tracked_at: Vec<Option<String>>,
}

impl SimpleFilters<WarehouseTracking> for TrackingFilters {
    fn apply(&self, builder: &PredicateBuilder<'_, WarehouseTracking>, spec: &mut Specification<WarehouseTracking>) {
        if let Some(warehouse) = non_blank(self.warehouse_id.as_ref()) {
            spec.where_field(builder, "Warehouse.Id", FilterOperator::Equals, warehouse);
        }
        if let Some(item) = non_blank(self.item_id.as_ref()) {
            spec.where_field(builder, "Item.Id", FilterOperator::Equals, item);
        }
        spec.add_filter_opt(builder.build_lists(
            "Movement",
            FilterOperator::Equals,
            &present_values(&self.movement),
        ));
        spec.where_range(builder, "Quantity", &self.quantity)
            .where_range(builder, "TrackedAt", &self.tracked_at);
    }
}
