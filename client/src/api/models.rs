//! Entity models mirroring the backend schemas
//!
//! Update payloads serialize only the fields that are set; foreign keys the
//! backend treats as immutable (tree_id, spraying_id, file_batch_id) are
//! absent from the update structs.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Orchard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Orchard {
    pub id: i64,
    pub name: String,
    /// Ids of trees planted in this orchard
    pub trees: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrchard {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct OrchardUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub id: i64,
    pub orchard_id: i64,
    pub genotype_id: i64,
    pub rootstock_id: i64,
    pub row: i64,
    pub field: i64,
    pub number: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub spacing: f64,
    pub growth_type: String,
    pub training_shape: String,
    pub planting_date: String,
    pub initial_age: String,
    pub nursery_tree_type: String,
    pub tree_images: Vec<i64>,
    pub tree_data: Vec<i64>,
    pub harvests: Vec<i64>,
    pub flower_thinnings: Vec<i64>,
    pub fruit_thinnings: Vec<i64>,
    pub sprayings: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTree {
    pub orchard_id: i64,
    pub genotype_id: i64,
    pub rootstock_id: i64,
    pub row: i64,
    pub field: i64,
    pub number: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub spacing: f64,
    pub growth_type: String,
    pub training_shape: String,
    pub planting_date: String,
    pub initial_age: String,
    pub nursery_tree_type: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TreeUpdate {
    // orchard_id is not updatable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genotype_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rootstock_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spacing: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub growth_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub training_shape: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planting_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_age: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nursery_tree_type: Option<String>,
}

// ---------------------------------------------------------------------------
// Tree data (periodic measurements)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeData {
    pub id: i64,
    pub tree_id: i64,
    pub datetime: NaiveDateTime,
    pub one_year_height: i64,
    pub fruiting_wood_height: i64,
    pub total_height: i64,
    pub trunk_girth: i64,
    pub suckering: i64,
    pub summer_pruning_date: NaiveDateTime,
    pub winter_pruning_date: NaiveDateTime,
    pub summer_pruning_note: Option<String>,
    pub winter_pruning_note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTreeData {
    pub tree_id: i64,
    pub datetime: NaiveDateTime,
    pub one_year_height: i64,
    pub fruiting_wood_height: i64,
    pub total_height: i64,
    pub trunk_girth: i64,
    pub suckering: i64,
    pub summer_pruning_date: NaiveDateTime,
    pub winter_pruning_date: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summer_pruning_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winter_pruning_note: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TreeDataUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datetime: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub one_year_height: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fruiting_wood_height: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_height: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trunk_girth: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suckering: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summer_pruning_date: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winter_pruning_date: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summer_pruning_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winter_pruning_note: Option<String>,
}

// ---------------------------------------------------------------------------
// Harvest
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Harvest {
    pub id: i64,
    pub tree_id: i64,
    pub datetime: NaiveDateTime,
    pub elapsed_time: i64,
    pub fruit_under_60mm_quantity: i64,
    pub fruit_under_60mm_weight: i64,
    pub fruit_under_70mm_quantity: i64,
    pub fruit_under_70mm_weight: i64,
    pub fruit_over_70mm_quantity: i64,
    pub fruit_over_70mm_weight: i64,
    pub average_fruit_weight: f64,
    pub aphids_damage_quantity: i64,
    pub aphids_damage_weight: i64,
    pub damaged_percentage: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewHarvest {
    pub tree_id: i64,
    pub datetime: NaiveDateTime,
    pub elapsed_time: i64,
    pub fruit_under_60mm_quantity: i64,
    pub fruit_under_60mm_weight: i64,
    pub fruit_under_70mm_quantity: i64,
    pub fruit_under_70mm_weight: i64,
    pub fruit_over_70mm_quantity: i64,
    pub fruit_over_70mm_weight: i64,
    pub average_fruit_weight: f64,
    pub aphids_damage_quantity: i64,
    pub aphids_damage_weight: i64,
    pub damaged_percentage: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct HarvestUpdate {
    // tree_id is not updatable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datetime: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fruit_under_60mm_quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fruit_under_60mm_weight: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fruit_under_70mm_quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fruit_under_70mm_weight: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fruit_over_70mm_quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fruit_over_70mm_weight: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_fruit_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aphids_damage_quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aphids_damage_weight: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damaged_percentage: Option<i64>,
}

// ---------------------------------------------------------------------------
// Spraying
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spraying {
    pub id: i64,
    pub tree_id: i64,
    pub agent_id: i64,
    pub datetime: NaiveDateTime,
    pub volume: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSpraying {
    pub tree_id: i64,
    pub agent_id: i64,
    pub datetime: NaiveDateTime,
    pub volume: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SprayingUpdate {
    // tree_id is not updatable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datetime: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

// ---------------------------------------------------------------------------
// Flower thinning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowerThinning {
    pub id: i64,
    pub tree_id: i64,
    pub spraying_id: i64,
    pub datetime: NaiveDateTime,
    pub mechanical: bool,
    pub flower_clusters_before_thinning: i64,
    pub flower_clusters_for_thinning: i64,
    pub flower_clusters_after_thinning: i64,
    pub flower_clusters_before_thinning_one_year: i64,
    pub flower_clusters_for_thinning_one_year: i64,
    pub flower_clusters_after_thinning_one_year: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFlowerThinning {
    pub tree_id: i64,
    pub spraying_id: i64,
    pub datetime: NaiveDateTime,
    pub mechanical: bool,
    pub flower_clusters_before_thinning: i64,
    pub flower_clusters_for_thinning: i64,
    pub flower_clusters_after_thinning: i64,
    pub flower_clusters_before_thinning_one_year: i64,
    pub flower_clusters_for_thinning_one_year: i64,
    pub flower_clusters_after_thinning_one_year: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FlowerThinningUpdate {
    // tree_id and spraying_id are not updatable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datetime: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mechanical: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flower_clusters_before_thinning: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flower_clusters_for_thinning: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flower_clusters_after_thinning: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flower_clusters_before_thinning_one_year: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flower_clusters_for_thinning_one_year: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flower_clusters_after_thinning_one_year: Option<i64>,
}

// ---------------------------------------------------------------------------
// Fruit thinning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FruitThinning {
    pub id: i64,
    pub tree_id: i64,
    pub spraying_id: i64,
    pub datetime: NaiveDateTime,
    pub mechanical: bool,
    pub cropload_for_4: i64,
    pub cropload_for_3: i64,
    pub cropload_for_1: i64,
    pub fruit_for_thinning: i64,
    pub fruit_thinning_time: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFruitThinning {
    pub tree_id: i64,
    pub spraying_id: i64,
    pub datetime: NaiveDateTime,
    pub mechanical: bool,
    pub cropload_for_4: i64,
    pub cropload_for_3: i64,
    pub cropload_for_1: i64,
    pub fruit_for_thinning: i64,
    pub fruit_thinning_time: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FruitThinningUpdate {
    // tree_id and spraying_id are not updatable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datetime: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mechanical: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cropload_for_4: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cropload_for_3: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cropload_for_1: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fruit_for_thinning: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fruit_thinning_time: Option<i64>,
}

// ---------------------------------------------------------------------------
// Spraying agent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub sprayings: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAgent {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AgentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// File batches and files
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileBatch {
    pub id: i64,
    pub label: String,
    pub files: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFileBatch {
    pub label: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FileBatchUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// File metadata; content itself is served as raw bytes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: i64,
    pub file_batch_id: i64,
    pub name: String,
    pub datetime: NaiveDateTime,
    pub mime: String,
    pub tree_images: Vec<i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datetime: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,
}

// ---------------------------------------------------------------------------
// Tree images
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeImage {
    pub id: i64,
    pub tree_id: i64,
    pub file_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTreeImage {
    pub tree_id: i64,
    pub file_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TreeImageUpdate {
    pub file_id: i64,
}

// ---------------------------------------------------------------------------
// Reference tables (read-only)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genotype {
    pub id: i64,
    pub name: String,
    pub trees: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rootstock {
    pub id: i64,
    pub name: String,
    pub trees: Vec<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_serializes_only_set_fields() {
        let update = HarvestUpdate {
            elapsed_time: Some(45),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "elapsed_time": 45 }));
    }

    #[test]
    fn test_entity_roundtrip() {
        let body = serde_json::json!({
            "id": 7,
            "tree_id": 3,
            "agent_id": 2,
            "datetime": "2025-06-01T08:30:00",
            "volume": 1.5
        });
        let spraying: Spraying = serde_json::from_value(body).unwrap();
        assert_eq!(spraying.id, 7);
        assert_eq!(spraying.volume, 1.5);
    }
}
