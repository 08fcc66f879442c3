use super::Asset;

/// Asset storage handed to the ingestion pipeline and read by callers of
/// the similarity and clustering functions
pub trait AssetRepository {
    fn get(&self, id: &str) -> Option<&Asset>;

    /// Point-in-time view of every asset, newest first
    fn all(&self) -> &[Asset];

    /// Insert a new asset. Returns false when the insert was rejected.
    fn add(&mut self, asset: Asset) -> bool;

    /// Replace the asset with the same id, or insert it if absent
    fn update(&mut self, asset: Asset);

    fn remove(&mut self, id: &str) -> Option<Asset>;
}

/// Vec-backed repository keeping the newest asset at the front
#[derive(Debug, Clone, Default)]
pub struct InMemoryAssetRepository {
    assets: Vec<Asset>,
}

impl InMemoryAssetRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn into_assets(self) -> Vec<Asset> {
        self.assets
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.assets.iter().position(|a| a.id == id)
    }
}

impl From<Vec<Asset>> for InMemoryAssetRepository {
    fn from(assets: Vec<Asset>) -> Self {
        Self { assets }
    }
}

impl AssetRepository for InMemoryAssetRepository {
    fn get(&self, id: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.id == id)
    }

    fn all(&self) -> &[Asset] {
        &self.assets
    }

    /// Same id replaces in place. A completed asset with the same file name
    /// blocks the insert.
    fn add(&mut self, asset: Asset) -> bool {
        if let Some(index) = self.position(&asset.id) {
            self.assets[index] = asset;
            return true;
        }

        let duplicate_name = self
            .assets
            .iter()
            .any(|a| a.file_name == asset.file_name && a.is_completed());
        if duplicate_name {
            return false;
        }

        self.assets.insert(0, asset);
        true
    }

    fn update(&mut self, asset: Asset) {
        match self.position(&asset.id) {
            Some(index) => self.assets[index] = asset,
            None => self.assets.insert(0, asset),
        }
    }

    fn remove(&mut self, id: &str) -> Option<Asset> {
        let index = self.position(id)?;
        Some(self.assets.remove(index))
    }
}
