//! Closed label sets for the semantic analysis an external model produces.
//!
//! Labels arrive as free text. Each set accepts its canonical display label
//! or the variant name (any case) and folds everything else into `Unknown`,
//! so arbitrary strings never travel further than the parsing boundary.

use super::ColorData;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

macro_rules! taxonomy {
    (@unknown) => { "Unknown" };
    (@unknown $label:literal) => { $label };
    (
        $(#[$meta:meta])*
        $name:ident $(unknown = $unknown:literal)? {
            $($variant:ident => $label:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub enum $name {
            $($variant,)+
            #[default]
            Unknown,
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)+ $name::Unknown];

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                    $name::Unknown => taxonomy!(@unknown $($unknown)?),
                }
            }

            /// Lenient parse; unrecognised text becomes `Unknown`
            pub fn parse(raw: &str) -> Self {
                let raw = raw.trim();
                $(
                    if raw == $label || raw.eq_ignore_ascii_case(stringify!($variant)) {
                        return $name::$variant;
                    }
                )+
                $name::Unknown
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.label())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                Ok($name::parse(&raw))
            }
        }
    };
}

taxonomy! {
    /// Game category the ad promotes
    GameGenre unknown = "Unknown (其他)" {
        Slg => "SLG (策略)",
        Rpg => "RPG (角色扮演)",
        Casual => "Casual (休闲)",
        Puzzle => "Puzzle (益智/三消)",
        Simulation => "Simulation (模拟经营)",
        Action => "Action (动作/射击)",
        Casino => "Casino (博彩/棋牌)",
    }
}

taxonomy! {
    VisualStyle {
        Realistic3d => "写实 3D",
        Cartoon2d => "欧美卡通 2D",
        Anime => "日韩二次元",
        Pixel => "像素风",
        LowPoly => "低多边形 (Low Poly)",
        Minimalist => "扁平极简",
    }
}

taxonomy! {
    CompositionType {
        Centered => "中心聚焦",
        RuleOfThirds => "三分法",
        SplitVs => "左右/上下对冲 (VS)",
        FirstPerson => "第一人称视角",
        Isometric => "等轴测 (2.5D上帝视角)",
        Grid => "网格/宫格布局",
        UiHeavy => "UI 引导主导",
    }
}

taxonomy! {
    /// Core marketing hook of the creative
    HookType {
        FailRun => "失败挽留 (Fail Run)",
        PowerUp => "战力碾压 (Power Up)",
        BeforeAfter => "逆袭/整容 (Before/After)",
        Crisis => "生存危机 (Crisis)",
        Gacha => "抽卡爽感 (Gacha)",
        Relax => "解压/强迫症 (ASMR/Relax)",
        Misleading => "玩法误导 (Misleading)",
        Social => "社交/情缘 (Social)",
    }
}

taxonomy! {
    VisualDensity {
        High => "High",
        Medium => "Medium",
        Low => "Low",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VisualAnalysis {
    pub composition: CompositionType,
    pub main_subject: String,
    pub visual_density: VisualDensity,
    pub camera_angle: String,
    pub ui_elements: Vec<String>,
    /// Filled from pixel sampling, never trusted from the model
    pub real_color_palette: Vec<ColorData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarketingAnalysis {
    pub hook_type: HookType,
    pub hook_strength: Option<f32>,
    pub emotional_trigger: String,
    pub target_audience: String,
    pub pain_points: Vec<String>,
    pub call_to_action: String,
    pub value_proposition: String,
}

/// Semantic description of a creative, as returned by a `Describer`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SemanticAnalysis {
    pub title: String,
    /// Game project the creative belongs to; empty when unassigned
    pub project: String,
    pub genre: GameGenre,
    pub style: VisualStyle,
    pub tags: Vec<String>,
    pub visual: VisualAnalysis,
    pub marketing: MarketingAnalysis,
}

impl SemanticAnalysis {
    /// Text handed to the embedding provider
    pub fn embedding_text(&self) -> String {
        let mut parts = vec![
            self.title.clone(),
            self.genre.label().to_string(),
            self.style.label().to_string(),
            self.marketing.hook_type.label().to_string(),
        ];
        parts.extend(self.tags.iter().cloned());
        parts.retain(|part| !part.trim().is_empty());
        parts.join(" | ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_labels_and_names() {
        assert_eq!(GameGenre::parse("SLG (策略)"), GameGenre::Slg);
        assert_eq!(GameGenre::parse("  puzzle "), GameGenre::Puzzle);
        assert_eq!(HookType::parse("POWERUP"), HookType::PowerUp);
        assert_eq!(VisualDensity::parse("Medium"), VisualDensity::Medium);
        assert_eq!(GameGenre::parse("Racing"), GameGenre::Unknown);
        assert_eq!(CompositionType::parse(""), CompositionType::Unknown);
    }

    #[test]
    fn test_unrecognised_json_values_become_unknown() {
        let raw = r#"{
            "title": "Castle siege",
            "genre": "SLG (策略)",
            "style": "vaporwave",
            "tags": ["army", "castle"],
            "visual": {"composition": "三分法", "visualDensity": "Extreme"},
            "marketing": {"hookType": "Fail Run", "hookStrength": 80}
        }"#;
        let analysis: SemanticAnalysis = serde_json::from_str(raw).unwrap();

        assert_eq!(analysis.genre, GameGenre::Slg);
        assert_eq!(analysis.style, VisualStyle::Unknown);
        assert_eq!(analysis.visual.composition, CompositionType::RuleOfThirds);
        assert_eq!(analysis.visual.visual_density, VisualDensity::Unknown);
        assert_eq!(analysis.marketing.hook_type, HookType::Unknown);
        assert_eq!(analysis.marketing.hook_strength, Some(80.0));
        assert!(analysis.visual.real_color_palette.is_empty());
    }

    #[test]
    fn test_serializes_canonical_labels() {
        let json = serde_json::to_string(&HookType::Gacha).unwrap();
        assert_eq!(json, r#""抽卡爽感 (Gacha)""#);
        assert_eq!(GameGenre::ALL.len(), 8);
    }

    #[test]
    fn test_unknown_label_per_taxonomy() {
        assert_eq!(GameGenre::Unknown.label(), "Unknown (其他)");
        assert_eq!(HookType::Unknown.label(), "Unknown");
        assert_eq!(
            serde_json::to_string(&GameGenre::Unknown).unwrap(),
            r#""Unknown (其他)""#
        );
        assert_eq!(GameGenre::parse("Unknown (其他)"), GameGenre::Unknown);
        assert_eq!(GameGenre::parse("unknown"), GameGenre::Unknown);
    }

    #[test]
    fn test_front_end_fields_survive_round_trip() {
        let raw = r#"{
            "title": "Tower rush",
            "project": "Project Atlas",
            "marketing": {
                "painPoints": ["slow progress"],
                "valueProposition": "instant upgrades"
            }
        }"#;
        let analysis: SemanticAnalysis = serde_json::from_str(raw).unwrap();
        assert_eq!(analysis.project, "Project Atlas");
        assert_eq!(analysis.marketing.pain_points, vec!["slow progress"]);
        assert_eq!(analysis.marketing.value_proposition, "instant upgrades");

        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["project"], "Project Atlas");
        assert_eq!(json["marketing"]["valueProposition"], "instant upgrades");
        assert_eq!(json["genre"], "Unknown (其他)");
    }

    #[test]
    fn test_embedding_text_skips_blank_parts() {
        let analysis = SemanticAnalysis {
            title: "Merge dragons".to_string(),
            genre: GameGenre::Puzzle,
            tags: vec!["merge".to_string(), " ".to_string()],
            ..Default::default()
        };
        assert_eq!(
            analysis.embedding_text(),
            "Merge dragons | Puzzle (益智/三消) | Unknown | Unknown | merge"
        );
    }
}
