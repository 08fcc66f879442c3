use super::similarity::cosine_similarity;
use super::taxonomy::{GameGenre, SemanticAnalysis};
use super::{Asset, Cluster};
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::LazyLock;

const SUMMARY_COLORS: usize = 5;
const PROFILE_TOP: usize = 3;

/// Profile bucket for analyses with no project assigned
pub const OTHER_PROJECT: &str = "Other";

static SIZE_SUFFIX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"[_\-\s]*((\d{1,4})\s*[:xX×]\s*(\d{1,4}))$").ok());

static PLACEMENT_SUFFIX: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)[_\-\s]*(post|story|feed|infeed|square|vertical|horizontal)$").ok()
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub name: String,
    pub count: usize,
}

/// Hook and genre distribution across analysed assets
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSummary {
    pub total: usize,
    pub hooks: Vec<LabelCount>,
    pub genres: Vec<LabelCount>,
    /// Percent of assets in the leading genre
    pub top_genre_share: u8,
    /// One hook dominates: more than twice as common as the runner-up
    pub hook_concentration: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSummary {
    pub label: String,
    pub size: usize,
    pub asset_ids: Vec<String>,
    pub top_hook: Option<String>,
    pub top_genre: Option<String>,
    pub dominant_colors: Vec<String>,
}

/// Creative volume and habits of one game project
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameProfile {
    pub project: String,
    pub count: usize,
    /// Mean hook strength, rounded; a missing strength counts as 0
    pub avg_hook_strength: u32,
    pub top_hooks: Vec<LabelCount>,
    pub top_styles: Vec<LabelCount>,
}

/// `None` until at least two assets carry an analysis
pub fn trend_summary(assets: &[Asset]) -> Option<TrendSummary> {
    let analysed: Vec<&Asset> = assets.iter().filter(|a| a.analysis.is_some()).collect();
    if analysed.len() < 2 {
        return None;
    }

    let hooks = count_labels(analysed.iter().filter_map(|a| {
        let label = a.analysis.as_ref()?.marketing.hook_type.label();
        Some(short_hook_name(label).to_string())
    }));

    let mut genres: Vec<LabelCount> = GameGenre::ALL
        .iter()
        .map(|genre| LabelCount {
            name: short_genre_name(genre.label()).to_string(),
            count: analysed
                .iter()
                .filter(|a| a.analysis.as_ref().is_some_and(|an| an.genre == *genre))
                .count(),
        })
        .filter(|entry| entry.count > 0)
        .collect();
    genres.sort_by(|a, b| b.count.cmp(&a.count));

    let top_genre_share = genres
        .first()
        .map(|g| (g.count as f64 / analysed.len() as f64 * 100.0).round() as u8)
        .unwrap_or(0);

    let hook_concentration = hooks.len() > 2 && hooks[0].count > hooks[1].count * 2;

    Some(TrendSummary {
        total: analysed.len(),
        hooks,
        genres,
        top_genre_share,
        hook_concentration,
    })
}

/// Describe each cluster by its most central member and common traits
pub fn summarize_clusters(clusters: &[Cluster]) -> Vec<ClusterSummary> {
    clusters.iter().map(summarize_cluster).collect()
}

fn summarize_cluster(cluster: &Cluster) -> ClusterSummary {
    let representative = cluster
        .assets
        .iter()
        .map(|asset| {
            let score = asset
                .embedding
                .as_deref()
                .map(|e| cosine_similarity(e, &cluster.centroid))
                .unwrap_or(f32::NEG_INFINITY);
            (asset, score)
        })
        .fold(None::<(&&Asset, f32)>, |best, (asset, score)| match best {
            Some((_, best_score)) if best_score >= score => best,
            _ => Some((asset, score)),
        })
        .map(|(asset, _)| extract_base_name(&asset.file_name))
        .unwrap_or_default();

    let top_hook = count_labels(cluster.assets.iter().filter_map(|a| {
        let label = a.analysis.as_ref()?.marketing.hook_type.label();
        Some(short_hook_name(label).to_string())
    }))
    .into_iter()
    .next()
    .map(|entry| entry.name);

    let top_genre = count_labels(cluster.assets.iter().filter_map(|a| {
        let label = a.analysis.as_ref()?.genre.label();
        Some(short_genre_name(label).to_string())
    }))
    .into_iter()
    .next()
    .map(|entry| entry.name);

    let dominant_colors = count_labels(
        cluster
            .assets
            .iter()
            .filter_map(|a| a.computed_meta.as_ref())
            .flat_map(|meta| meta.dominant_colors.iter().cloned()),
    )
    .into_iter()
    .take(SUMMARY_COLORS)
    .map(|entry| entry.name)
    .collect();

    ClusterSummary {
        label: representative,
        size: cluster.assets.len(),
        asset_ids: cluster.assets.iter().map(|a| a.id.clone()).collect(),
        top_hook,
        top_genre,
        dominant_colors,
    }
}

/// One profile per project over completed, analysed assets, largest first.
/// Ties keep the order in which projects first appear.
pub fn game_profiles(assets: &[Asset]) -> Vec<GameProfile> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<&SemanticAnalysis>)> = Vec::new();

    for analysis in assets
        .iter()
        .filter(|a| a.is_completed())
        .filter_map(|a| a.analysis.as_ref())
    {
        let project = match analysis.project.trim() {
            "" => OTHER_PROJECT,
            name => name,
        };
        match index.get(project) {
            Some(&slot) => groups[slot].1.push(analysis),
            None => {
                index.insert(project.to_string(), groups.len());
                groups.push((project.to_string(), vec![analysis]));
            }
        }
    }

    let mut profiles: Vec<GameProfile> = groups
        .into_iter()
        .map(|(project, members)| {
            let strength: f64 = members
                .iter()
                .map(|a| a.marketing.hook_strength.unwrap_or(0.0) as f64)
                .sum();

            let mut top_hooks =
                count_labels(members.iter().map(|a| a.marketing.hook_type.label().to_string()));
            top_hooks.truncate(PROFILE_TOP);

            let mut top_styles = count_labels(members.iter().map(|a| a.style.label().to_string()));
            top_styles.truncate(PROFILE_TOP);

            GameProfile {
                project,
                count: members.len(),
                avg_hook_strength: (strength / members.len() as f64).round().max(0.0) as u32,
                top_hooks,
                top_styles,
            }
        })
        .collect();

    profiles.sort_by(|a, b| b.count.cmp(&a.count));
    profiles
}

/// Extract base name from filename (remove extension, size and placement suffixes)
pub fn extract_base_name(filename: &str) -> String {
    let base = filename
        .rsplit_once('.')
        .map(|(name, _)| name)
        .unwrap_or(filename);

    let base = SIZE_SUFFIX
        .as_ref()
        .map(|re| re.replace(base, "").into_owned())
        .unwrap_or_else(|| base.to_string());

    let base = PLACEMENT_SUFFIX
        .as_ref()
        .map(|re| re.replace(&base, "").into_owned())
        .unwrap_or(base);

    base.trim().to_string()
}

/// "失败挽留 (Fail Run)" -> "失败挽留"
fn short_hook_name(label: &str) -> &str {
    label.split('(').next().unwrap_or(label).trim()
}

/// "SLG (策略)" -> "SLG"
fn short_genre_name(label: &str) -> &str {
    label.split(' ').next().unwrap_or(label)
}

/// Occurrences per name, most common first, ties in first-seen order
fn count_labels<I: IntoIterator<Item = String>>(labels: I) -> Vec<LabelCount> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<LabelCount> = Vec::new();
    for name in labels {
        match index.get(&name) {
            Some(&slot) => counts[slot].count += 1,
            None => {
                index.insert(name.clone(), counts.len());
                counts.push(LabelCount { name, count: 1 });
            }
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visual_analysis::taxonomy::{HookType, VisualStyle};
    use crate::visual_analysis::{AspectRatio, AssetStatus, ComputedMeta};

    fn analysed(name: &str, genre: GameGenre, hook: HookType) -> Asset {
        let mut asset = Asset::new(name);
        let mut analysis = SemanticAnalysis {
            genre,
            ..Default::default()
        };
        analysis.marketing.hook_type = hook;
        asset.analysis = Some(analysis);
        asset
    }

    #[test]
    fn test_extract_base_name() {
        assert_eq!(extract_base_name("summer_sale_1080x1920.png"), "summer_sale");
        assert_eq!(extract_base_name("summer_sale-story.jpg"), "summer_sale");
        assert_eq!(extract_base_name("Hero Banner 16:9.webp"), "Hero Banner");
        assert_eq!(extract_base_name("plain"), "plain");
    }

    #[test]
    fn test_trend_summary_requires_two_assets() {
        let assets = vec![
            analysed("a.png", GameGenre::Rpg, HookType::Gacha),
            Asset::new("unanalysed.png"),
        ];
        assert!(trend_summary(&assets).is_none());
    }

    #[test]
    fn test_trend_summary_counts() {
        let assets = vec![
            analysed("1.png", GameGenre::Puzzle, HookType::FailRun),
            analysed("2.png", GameGenre::Slg, HookType::FailRun),
            analysed("3.png", GameGenre::Puzzle, HookType::FailRun),
            analysed("4.png", GameGenre::Puzzle, HookType::FailRun),
            analysed("5.png", GameGenre::Slg, HookType::Gacha),
            analysed("6.png", GameGenre::Casual, HookType::Crisis),
        ];
        let summary = trend_summary(&assets).unwrap();

        assert_eq!(summary.total, 6);
        assert_eq!(summary.hooks[0], LabelCount { name: "失败挽留".into(), count: 4 });
        assert_eq!(summary.hooks.len(), 3);
        assert!(summary.hook_concentration);

        let genres: Vec<(&str, usize)> = summary
            .genres
            .iter()
            .map(|g| (g.name.as_str(), g.count))
            .collect();
        assert_eq!(genres, vec![("Puzzle", 3), ("SLG", 2), ("Casual", 1)]);
        assert_eq!(summary.top_genre_share, 50);
    }

    fn profiled(project: &str, hook: HookType, style: VisualStyle, strength: Option<f32>) -> Asset {
        let mut asset = analysed("creative.png", GameGenre::Rpg, hook);
        asset.status = AssetStatus::Completed;
        if let Some(analysis) = asset.analysis.as_mut() {
            analysis.project = project.to_string();
            analysis.style = style;
            analysis.marketing.hook_strength = strength;
        }
        asset
    }

    #[test]
    fn test_game_profiles() {
        let mut pending = profiled("Atlas", HookType::Gacha, VisualStyle::Anime, Some(100.0));
        pending.status = AssetStatus::Processing;

        let assets = vec![
            profiled("Atlas", HookType::Gacha, VisualStyle::Anime, Some(80.0)),
            profiled("", HookType::Relax, VisualStyle::Pixel, Some(40.0)),
            profiled("Atlas", HookType::FailRun, VisualStyle::Anime, Some(70.0)),
            profiled("Atlas", HookType::Gacha, VisualStyle::Realistic3d, None),
            profiled("Atlas", HookType::Crisis, VisualStyle::Pixel, Some(75.0)),
            profiled("Atlas", HookType::Social, VisualStyle::Cartoon2d, Some(90.0)),
            profiled("  ", HookType::Relax, VisualStyle::Pixel, Some(61.0)),
            pending,
        ];
        let profiles = game_profiles(&assets);

        assert_eq!(profiles.len(), 2);

        let atlas = &profiles[0];
        assert_eq!(atlas.project, "Atlas");
        assert_eq!(atlas.count, 5);
        assert_eq!(atlas.avg_hook_strength, 63);
        let hooks: Vec<(&str, usize)> = atlas
            .top_hooks
            .iter()
            .map(|h| (h.name.as_str(), h.count))
            .collect();
        assert_eq!(
            hooks,
            vec![
                ("抽卡爽感 (Gacha)", 2),
                ("失败挽留 (Fail Run)", 1),
                ("生存危机 (Crisis)", 1),
            ]
        );
        assert_eq!(atlas.top_styles[0], LabelCount { name: "日韩二次元".into(), count: 2 });
        assert_eq!(atlas.top_styles.len(), 3);

        let other = &profiles[1];
        assert_eq!(other.project, OTHER_PROJECT);
        assert_eq!(other.count, 2);
        assert_eq!(other.avg_hook_strength, 51);
    }

    #[test]
    fn test_game_profiles_order_by_volume() {
        let assets = vec![
            profiled("Small", HookType::Gacha, VisualStyle::Anime, Some(10.0)),
            profiled("Big", HookType::Gacha, VisualStyle::Anime, Some(10.0)),
            profiled("Big", HookType::Gacha, VisualStyle::Anime, Some(10.0)),
            profiled("Tied", HookType::Gacha, VisualStyle::Anime, Some(10.0)),
        ];
        let order: Vec<String> = game_profiles(&assets).into_iter().map(|p| p.project).collect();
        assert_eq!(order, vec!["Big", "Small", "Tied"]);
    }

    #[test]
    fn test_cluster_summary() {
        let mut near = analysed("castle_story.png", GameGenre::Slg, HookType::PowerUp);
        near.embedding = Some(vec![1.0, 0.0]);
        near.computed_meta = Some(ComputedMeta {
            width: 1080,
            height: 1920,
            aspect_ratio: AspectRatio::Portrait9x16,
            dominant_colors: vec!["#202020".into(), "#e0c040".into()],
            brightness: 80,
            contrast: 40,
            fingerprint: None,
        });
        let mut off = analysed("castle_feed.png", GameGenre::Slg, HookType::Crisis);
        off.embedding = Some(vec![0.6, 0.8]);

        let cluster = Cluster {
            centroid: vec![0.9, 0.1],
            assets: vec![&near, &off],
        };
        let summaries = summarize_clusters(&[cluster]);

        assert_eq!(summaries[0].label, "castle");
        assert_eq!(summaries[0].size, 2);
        assert_eq!(summaries[0].top_genre.as_deref(), Some("SLG"));
        assert_eq!(summaries[0].top_hook.as_deref(), Some("战力碾压"));
        assert_eq!(summaries[0].dominant_colors, vec!["#202020", "#e0c040"]);
        assert_eq!(summaries[0].asset_ids, vec![near.id.clone(), off.id.clone()]);
    }
}
