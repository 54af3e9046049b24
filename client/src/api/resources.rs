//! Typed per-resource wrappers over `ApiClient`
//!
//! Thin one-call methods mirroring the backend routes, plus by-id-list join
//! helpers that fetch related entities concurrently and merge them for
//! display. Stale ids (404s) are skipped; other failures propagate.

use bytes::Bytes;
use futures_util::future::join_all;
use serde::de::DeserializeOwned;

use super::client::{ApiClient, ApiError};
use super::models::*;

impl ApiClient {
    /// Concurrent by-id fetch for `/{entity}/{id}` routes; missing ids are
    /// dropped from the merged result
    async fn fetch_by_ids<T: DeserializeOwned>(
        &self,
        entity: &str,
        ids: &[i64],
    ) -> Result<Vec<T>, ApiError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let fetches = ids.iter().map(|id| {
            let path = format!("/{}/{}", entity, id);
            async move { self.get::<T>(&path).await }
        });

        let mut items = Vec::with_capacity(ids.len());
        for result in join_all(fetches).await {
            match result {
                Ok(item) => items.push(item),
                Err(ApiError::Status { status: 404, .. }) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(items)
    }

    // --- Orchards ---

    pub async fn fetch_orchards(&self) -> Result<Vec<Orchard>, ApiError> {
        self.get("/orchard/").await
    }

    pub async fn fetch_orchard(&self, id: i64) -> Result<Orchard, ApiError> {
        self.get(&format!("/orchard/{}", id)).await
    }

    pub async fn create_orchard(&self, orchard: &NewOrchard) -> Result<Orchard, ApiError> {
        self.post("/orchard/", orchard).await
    }

    pub async fn update_orchard(
        &self,
        id: i64,
        update: &OrchardUpdate,
    ) -> Result<Orchard, ApiError> {
        self.put(&format!("/orchard/{}", id), update).await
    }

    pub async fn delete_orchard(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/orchard/{}", id)).await
    }

    // --- Trees ---

    pub async fn fetch_trees(&self) -> Result<Vec<Tree>, ApiError> {
        self.get("/tree/").await
    }

    pub async fn fetch_tree(&self, id: i64) -> Result<Tree, ApiError> {
        self.get(&format!("/tree/{}", id)).await
    }

    pub async fn fetch_trees_by_ids(&self, ids: &[i64]) -> Result<Vec<Tree>, ApiError> {
        self.fetch_by_ids("tree", ids).await
    }

    pub async fn create_tree(&self, tree: &NewTree) -> Result<Tree, ApiError> {
        self.post("/tree/", tree).await
    }

    pub async fn update_tree(&self, id: i64, update: &TreeUpdate) -> Result<Tree, ApiError> {
        self.put(&format!("/tree/{}", id), update).await
    }

    pub async fn delete_tree(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/tree/{}", id)).await
    }

    // --- Tree data (measurements) ---

    pub async fn fetch_tree_data_entry(&self, id: i64) -> Result<TreeData, ApiError> {
        self.get(&format!("/tree_data/{}", id)).await
    }

    pub async fn fetch_tree_data_entries_by_ids(
        &self,
        ids: &[i64],
    ) -> Result<Vec<TreeData>, ApiError> {
        self.fetch_by_ids("tree_data", ids).await
    }

    pub async fn create_tree_data_entry(&self, entry: &NewTreeData) -> Result<TreeData, ApiError> {
        self.post("/tree_data/", entry).await
    }

    pub async fn update_tree_data_entry(
        &self,
        id: i64,
        update: &TreeDataUpdate,
    ) -> Result<TreeData, ApiError> {
        self.put(&format!("/tree_data/{}", id), update).await
    }

    pub async fn delete_tree_data_entry(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/tree_data/{}", id)).await
    }

    // --- Harvests ---

    pub async fn fetch_harvest(&self, id: i64) -> Result<Harvest, ApiError> {
        self.get(&format!("/harvest/{}", id)).await
    }

    pub async fn fetch_harvests_by_ids(&self, ids: &[i64]) -> Result<Vec<Harvest>, ApiError> {
        self.fetch_by_ids("harvest", ids).await
    }

    pub async fn create_harvest(&self, harvest: &NewHarvest) -> Result<Harvest, ApiError> {
        self.post("/harvest/", harvest).await
    }

    pub async fn update_harvest(
        &self,
        id: i64,
        update: &HarvestUpdate,
    ) -> Result<Harvest, ApiError> {
        self.put(&format!("/harvest/{}", id), update).await
    }

    pub async fn delete_harvest(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/harvest/{}", id)).await
    }

    // --- Sprayings ---

    pub async fn fetch_spraying(&self, id: i64) -> Result<Spraying, ApiError> {
        self.get(&format!("/spraying/{}", id)).await
    }

    pub async fn fetch_sprayings_by_ids(&self, ids: &[i64]) -> Result<Vec<Spraying>, ApiError> {
        self.fetch_by_ids("spraying", ids).await
    }

    pub async fn create_spraying(&self, spraying: &NewSpraying) -> Result<Spraying, ApiError> {
        self.post("/spraying/", spraying).await
    }

    pub async fn update_spraying(
        &self,
        id: i64,
        update: &SprayingUpdate,
    ) -> Result<Spraying, ApiError> {
        self.put(&format!("/spraying/{}", id), update).await
    }

    pub async fn delete_spraying(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/spraying/{}", id)).await
    }

    // --- Flower thinnings ---

    pub async fn fetch_flower_thinning(&self, id: i64) -> Result<FlowerThinning, ApiError> {
        self.get(&format!("/flower_thinning/{}", id)).await
    }

    pub async fn fetch_flower_thinnings_by_ids(
        &self,
        ids: &[i64],
    ) -> Result<Vec<FlowerThinning>, ApiError> {
        self.fetch_by_ids("flower_thinning", ids).await
    }

    pub async fn create_flower_thinning(
        &self,
        thinning: &NewFlowerThinning,
    ) -> Result<FlowerThinning, ApiError> {
        self.post("/flower_thinning/", thinning).await
    }

    pub async fn update_flower_thinning(
        &self,
        id: i64,
        update: &FlowerThinningUpdate,
    ) -> Result<FlowerThinning, ApiError> {
        self.put(&format!("/flower_thinning/{}", id), update).await
    }

    pub async fn delete_flower_thinning(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/flower_thinning/{}", id)).await
    }

    // --- Fruit thinnings ---

    pub async fn fetch_fruit_thinning(&self, id: i64) -> Result<FruitThinning, ApiError> {
        self.get(&format!("/fruit_thinning/{}", id)).await
    }

    pub async fn fetch_fruit_thinnings_by_ids(
        &self,
        ids: &[i64],
    ) -> Result<Vec<FruitThinning>, ApiError> {
        self.fetch_by_ids("fruit_thinning", ids).await
    }

    pub async fn create_fruit_thinning(
        &self,
        thinning: &NewFruitThinning,
    ) -> Result<FruitThinning, ApiError> {
        self.post("/fruit_thinning/", thinning).await
    }

    pub async fn update_fruit_thinning(
        &self,
        id: i64,
        update: &FruitThinningUpdate,
    ) -> Result<FruitThinning, ApiError> {
        self.put(&format!("/fruit_thinning/{}", id), update).await
    }

    pub async fn delete_fruit_thinning(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/fruit_thinning/{}", id)).await
    }

    // --- Spraying agents ---

    pub async fn fetch_agents(&self) -> Result<Vec<Agent>, ApiError> {
        self.get("/agent/").await
    }

    pub async fn fetch_agent(&self, id: i64) -> Result<Agent, ApiError> {
        self.get(&format!("/agent/{}", id)).await
    }

    pub async fn create_agent(&self, agent: &NewAgent) -> Result<Agent, ApiError> {
        self.post("/agent/", agent).await
    }

    pub async fn update_agent(&self, id: i64, update: &AgentUpdate) -> Result<Agent, ApiError> {
        self.put(&format!("/agent/{}", id), update).await
    }

    pub async fn delete_agent(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/agent/{}", id)).await
    }

    // --- File batches ---

    pub async fn fetch_file_batches(&self) -> Result<Vec<FileBatch>, ApiError> {
        self.get("/file_batch/").await
    }

    pub async fn fetch_file_batch(&self, id: i64) -> Result<FileBatch, ApiError> {
        self.get(&format!("/file_batch/{}", id)).await
    }

    pub async fn create_file_batch(&self, batch: &NewFileBatch) -> Result<FileBatch, ApiError> {
        self.post("/file_batch/", batch).await
    }

    pub async fn update_file_batch(
        &self,
        id: i64,
        update: &FileBatchUpdate,
    ) -> Result<FileBatch, ApiError> {
        self.put(&format!("/file_batch/{}", id), update).await
    }

    pub async fn delete_file_batch(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/file_batch/{}", id)).await
    }

    // --- Files ---

    pub async fn fetch_files(&self) -> Result<Vec<FileRecord>, ApiError> {
        self.get("/file/").await
    }

    pub async fn fetch_file(&self, id: i64) -> Result<FileRecord, ApiError> {
        self.get(&format!("/file/{}", id)).await
    }

    pub async fn fetch_files_by_ids(&self, ids: &[i64]) -> Result<Vec<FileRecord>, ApiError> {
        self.fetch_by_ids("file", ids).await
    }

    /// Raw file content (images are fetched with the bearer token, not a
    /// public URL)
    pub async fn fetch_file_content(&self, id: i64) -> Result<Bytes, ApiError> {
        self.get_bytes(&format!("/file/{}/content", id)).await
    }

    pub async fn update_file(&self, id: i64, update: &FileUpdate) -> Result<FileRecord, ApiError> {
        self.put(&format!("/file/{}", id), update).await
    }

    pub async fn delete_file(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/file/{}", id)).await
    }

    // --- Tree images ---

    pub async fn fetch_tree_images(&self) -> Result<Vec<TreeImage>, ApiError> {
        self.get("/tree_image/").await
    }

    pub async fn fetch_tree_image(&self, id: i64) -> Result<TreeImage, ApiError> {
        self.get(&format!("/tree_image/{}", id)).await
    }

    pub async fn fetch_tree_images_by_ids(&self, ids: &[i64]) -> Result<Vec<TreeImage>, ApiError> {
        self.fetch_by_ids("tree_image", ids).await
    }

    pub async fn create_tree_image(&self, image: &NewTreeImage) -> Result<TreeImage, ApiError> {
        self.post("/tree_image/", image).await
    }

    pub async fn update_tree_image(
        &self,
        id: i64,
        update: &TreeImageUpdate,
    ) -> Result<TreeImage, ApiError> {
        self.put(&format!("/tree_image/{}", id), update).await
    }

    pub async fn delete_tree_image(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/tree_image/{}", id)).await
    }

    // --- Reference tables ---

    pub async fn fetch_genotypes(&self) -> Result<Vec<Genotype>, ApiError> {
        self.get("/genotype/").await
    }

    pub async fn fetch_rootstocks(&self) -> Result<Vec<Rootstock>, ApiError> {
        self.get("/rootstock/").await
    }
}
