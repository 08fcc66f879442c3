//! Library search and facet filtering over analysed assets.

use super::Asset;
use super::taxonomy::{GameGenre, HookType, SemanticAnalysis, VisualStyle};
use serde::{Deserialize, Serialize};

/// Free-text query plus multi-select facets. Empty facets match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterState {
    pub search: String,
    pub genres: Vec<GameGenre>,
    pub hooks: Vec<HookType>,
    pub styles: Vec<VisualStyle>,
}

impl FilterState {
    pub fn matches(&self, analysis: &SemanticAnalysis) -> bool {
        self.matches_search(analysis)
            && (self.genres.is_empty() || self.genres.contains(&analysis.genre))
            && (self.hooks.is_empty() || self.hooks.contains(&analysis.marketing.hook_type))
            && (self.styles.is_empty() || self.styles.contains(&analysis.style))
    }

    /// Title matches case-insensitively; tags match verbatim
    fn matches_search(&self, analysis: &SemanticAnalysis) -> bool {
        if self.search.is_empty() {
            return true;
        }
        analysis
            .title
            .to_lowercase()
            .contains(&self.search.to_lowercase())
            || analysis.tags.iter().any(|tag| tag.contains(&self.search))
    }
}

/// Assets whose analysis satisfies `filter`, in library order.
/// Assets without an analysis never match.
pub fn filter_assets<'a>(assets: &'a [Asset], filter: &FilterState) -> Vec<&'a Asset> {
    assets
        .iter()
        .filter(|asset| {
            asset
                .analysis
                .as_ref()
                .is_some_and(|analysis| filter.matches(analysis))
        })
        .collect()
}
