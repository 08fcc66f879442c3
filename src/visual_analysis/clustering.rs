use super::config::ClusterConfig;
use super::similarity::cosine_similarity;
use super::{Asset, Cluster};
use log::debug;
use rand::{Rng, SeedableRng, seq::SliceRandom};
use rand_pcg::Pcg32;

/// K-means where assignment follows the most cosine-similar centroid
#[derive(Debug, Clone, Copy, Default)]
pub struct Clusterer {
    config: ClusterConfig,
}

impl Clusterer {
    pub fn new(config: ClusterConfig) -> Self {
        Self { config }
    }

    /// Cluster with the configured seed, or system entropy when unset
    pub fn run<'a>(&self, assets: &'a [Asset]) -> Vec<Cluster<'a>> {
        let mut rng = match self.config.seed {
            Some(seed) => Pcg32::seed_from_u64(seed),
            None => Pcg32::from_entropy(),
        };
        cluster_assets(assets, self.config.k, self.config.max_iterations, &mut rng)
    }
}

/// Partition the embedded assets into at most `k` non-empty clusters.
///
/// Returns nothing when fewer than `k` assets carry an embedding (or `k` is 0).
/// Initial centroids are the embeddings of the first `k` assets after a
/// shuffle drawn from `rng`; the loop stops once a full pass changes no
/// assignment or after `max_iterations` passes. A cap of 0 still runs one
/// assignment pass.
pub fn cluster_assets<'a, R: Rng + ?Sized>(
    assets: &'a [Asset],
    k: usize,
    max_iterations: usize,
    rng: &mut R,
) -> Vec<Cluster<'a>> {
    let mut valid: Vec<(&'a Asset, &'a [f32])> = assets
        .iter()
        .filter_map(|asset| asset.embedding.as_deref().map(|e| (asset, e)))
        .collect();

    if k == 0 || valid.len() < k {
        debug!(
            "Skipping clustering: {} embedded assets for k={}",
            valid.len(),
            k
        );
        return Vec::new();
    }

    valid.shuffle(rng);

    let mut centroids: Vec<Vec<f32>> = valid[..k].iter().map(|(_, e)| e.to_vec()).collect();
    let mut assignments = vec![0usize; valid.len()];

    // at least one assignment pass, so no member is left on an unvisited centroid
    let max_iterations = max_iterations.max(1);
    let mut iterations = 0;
    while iterations < max_iterations {
        if !assign_to_centroids(&valid, &centroids, &mut assignments) {
            break;
        }
        update_centroids(&valid, &assignments, &mut centroids);
        iterations += 1;
    }

    debug!(
        "Clustered {} assets into k={} after {} iterations",
        valid.len(),
        k,
        iterations
    );

    centroids
        .into_iter()
        .enumerate()
        .map(|(cluster_index, centroid)| Cluster {
            centroid,
            assets: valid
                .iter()
                .zip(assignments.iter())
                .filter(|&(_, &assigned)| assigned == cluster_index)
                .map(|(&(asset, _), _)| asset)
                .collect(),
        })
        .filter(|cluster| !cluster.assets.is_empty())
        .collect()
}

/// Move every embedding to its nearest centroid; true when any slot changed
fn assign_to_centroids(
    valid: &[(&Asset, &[f32])],
    centroids: &[Vec<f32>],
    assignments: &mut [usize],
) -> bool {
    let mut changed = false;
    for (slot, (_, embedding)) in assignments.iter_mut().zip(valid.iter()) {
        let best = nearest_centroid(embedding, centroids);
        if best != *slot {
            changed = true;
            *slot = best;
        }
    }
    changed
}

/// Recompute each centroid as the mean of its members
fn update_centroids(
    valid: &[(&Asset, &[f32])],
    assignments: &[usize],
    centroids: &mut [Vec<f32>],
) {
    for (cluster_index, centroid) in centroids.iter_mut().enumerate() {
        let members: Vec<&[f32]> = valid
            .iter()
            .zip(assignments.iter())
            .filter(|&(_, &assigned)| assigned == cluster_index)
            .map(|(&(_, embedding), _)| embedding)
            .collect();

        // empty clusters keep their previous centroid
        if let Some(mean) = mean_vector(&members) {
            *centroid = mean;
        }
    }
}

/// Index of the most similar centroid; ties go to the lowest index
pub fn nearest_centroid(embedding: &[f32], centroids: &[Vec<f32>]) -> usize {
    let mut best = 0;
    let mut best_sim = f32::NEG_INFINITY;
    for (i, centroid) in centroids.iter().enumerate() {
        let sim = cosine_similarity(embedding, centroid);
        if sim > best_sim {
            best_sim = sim;
            best = i;
        }
    }
    best
}

/// Element-wise mean. The first member fixes the dimension; shorter
/// members only contribute over the indices they have.
fn mean_vector(members: &[&[f32]]) -> Option<Vec<f32>> {
    let dimension = members.first()?.len();
    let mut sum = vec![0.0f64; dimension];
    for member in members {
        for (total, &value) in sum.iter_mut().zip(member.iter()) {
            *total += value as f64;
        }
    }
    let count = members.len() as f64;
    Some(sum.into_iter().map(|total| (total / count) as f32).collect())
}
