//! Feature and model catalog.
//!
//! The registry maps opaque feature and model identifiers to display
//! metadata.  It has no behavior beyond lookup: unknown identifiers fall back
//! to the identifier itself as a label and a generic icon instead of failing.
//! A compiled-in catalog is available through [`Registry::default`]; a
//! different catalog can be injected from YAML.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{FeatureId, KnownModel, Message, ModelId};

/// Icon used for features the catalog does not know.
pub const DEFAULT_FEATURE_ICON: &str = "🎯";

const BUILTIN_FEATURES: &[(&str, &str, &str)] = &[
    ("chat", "💬", "AI Chat"),
    ("autonomous_mode", "🤖", "Autonomous AI"),
    ("quantum_chat", "🚀", "Quantum Chat"),
    ("code_analyzer", "🧠", "Code Analysis"),
    ("code_genius", "💻", "Code Genius"),
    ("web_dev_master", "🌐", "Web Dev"),
    ("bug_detector", "🐛", "Bug Detector"),
    ("data_analyzer", "📊", "Data Analysis"),
    ("data_science_pro", "🔬", "Data Science"),
    ("summary_maker", "📝", "Summarizer"),
    ("idea_generator", "💡", "Idea Generator"),
    ("content_creator", "✍️", "Content Creator"),
    ("file_reader", "📁", "File Reader"),
    ("web_scraper", "🌐", "Web Scraper"),
    ("text_translator", "🔤", "Translator"),
    ("security_scanner", "🔐", "Security Scanner"),
    ("quantum_search", "🪐", "Quantum Search"),
    ("multi_model_chat", "🔄", "Multi-Model Chat"),
    ("quantum_mode", "⚡", "Quantum Mode"),
    ("ai_research", "🤖", "AI Research"),
    ("quantum_computing", "⚛️", "Quantum Computing"),
    ("blockchain_expert", "⛓️", "Blockchain"),
    ("cyber_security", "🛡️", "Cyber Security"),
    ("cloud_architect", "☁️", "Cloud Architect"),
    ("startup_advisor", "🚀", "Startup Advisor"),
    ("business_strategy", "📈", "Business Strategy"),
    ("financial_analysis", "💹", "Financial Analysis"),
    ("marketing_genius", "📢", "Marketing"),
    ("sales_optimizer", "💰", "Sales Optimizer"),
    ("video_producer", "🎥", "Video Producer"),
    ("music_composer", "🎵", "Music Composer"),
    ("game_developer", "🎮", "Game Developer"),
    ("ui_ux_designer", "🎨", "UI/UX Designer"),
    ("scientific_research", "🧪", "Scientific Research"),
    ("medical_expert", "🏥", "Medical Expert"),
    ("engineering_pro", "⚙️", "Engineering Pro"),
    ("math_genius", "🧮", "Math Genius"),
    ("physics_expert", "🌌", "Physics Expert"),
    ("multilingual_expert", "🌐", "Multilingual Expert"),
    ("legal_advisor", "⚖️", "Legal Advisor"),
    ("education_tutor", "🎓", "Education Tutor"),
    ("travel_guide", "✈️", "Travel Guide"),
    ("cooking_chef", "👨‍🍳", "Cooking Chef"),
    ("sentiment_analysis", "😊", "Sentiment Analysis"),
    ("api_generator", "🔌", "API Generator"),
    ("economic_analysis", "💰", "Economic Analysis"),
    ("historian_research", "📚", "Historical Research"),
    ("dr_ai_diagnosis", "🩺", "Medical Analysis"),
    ("system_status", "📈", "System Status"),
    ("code_review", "👨‍💻", "Code Review"),
    ("performance_optimizer", "⚡", "Performance Optimizer"),
    ("code_translator", "🔄", "Code Translator"),
    ("document_analyzer", "📑", "Document Analyzer"),
    ("presentation_maker", "📽️", "Presentation Maker"),
    ("email_writer", "✉️", "Email Writer"),
    ("resume_builder", "📄", "Resume Builder"),
    ("interview_prep", "🎯", "Interview Preparation"),
    ("learning_plan", "🎓", "Learning Plan"),
    ("project_planner", "📅", "Project Planner"),
    ("business_plan", "💼", "Business Plan"),
    ("market_analysis", "📈", "Market Analysis"),
    ("competitor_analysis", "🔍", "Competitor Analysis"),
    ("social_media_manager", "📱", "Social Media Manager"),
    ("seo_optimizer", "🔍", "SEO Optimizer"),
    ("content_strategy", "📝", "Content Strategy"),
    ("brand_identity", "🎨", "Brand Identity"),
    ("logo_designer", "⚡", "Logo Designer"),
    ("color_palette", "🎨", "Color Palette"),
    ("font_pairing", "🔤", "Font Pairing"),
    ("ui_components", "🧩", "UI Components"),
    ("api_documentation", "📖", "API Documentation"),
    ("database_design", "🗄️", "Database Design"),
    ("system_architecture", "🏗️", "System Architecture"),
    ("devops_pipeline", "🔄", "DevOps Pipeline"),
    ("cloud_deployment", "☁️", "Cloud Deployment"),
    ("security_audit", "🔒", "Security Audit"),
    ("performance_testing", "⚡", "Performance Testing"),
    ("load_testing", "📊", "Load Testing"),
    ("api_testing", "🧪", "API Testing"),
    ("unit_test_generator", "✅", "Unit Test Generator"),
    ("integration_testing", "🔗", "Integration Testing"),
    ("zip_extractor", "🗃️", "ZIP Extractor"),
    ("plugin_loader", "🧩", "Plugin Loader"),
];

const BUILTIN_FEATURED: &[&str] = &["chat", "autonomous_mode", "code_analyzer", "file_reader"];

/////////////////////////////////////////// FeatureInfo ///////////////////////////////////////////

/// Display metadata for a feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureInfo {
    /// Feature identifier.
    pub id: FeatureId,

    /// Human-readable name.
    pub name: String,

    /// Emoji shown next to the name.
    pub icon: String,
}

//////////////////////////////////////////// ModelInfo ////////////////////////////////////////////

/// Display metadata for a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier.
    pub id: ModelId,

    /// Human-readable name.
    pub name: String,

    /// Emoji shown next to the name.
    pub icon: String,
}

impl ModelInfo {
    /// Icon and name, the way model badges are shown.
    pub fn label(&self) -> String {
        format!("{} {}", self.icon, self.name)
    }
}

//////////////////////////////////////////// MessageMeta ///////////////////////////////////////////

/// Registry lookups resolved for one rendered unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageMeta {
    /// Display name of the feature.
    pub feature_name: String,

    /// Icon of the feature.
    pub feature_icon: String,

    /// Display label of the model, if one applies.
    pub model_label: Option<String>,
}

///////////////////////////////////////////// Registry /////////////////////////////////////////////

/// Serialized form of a catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    /// Features in display order.
    #[serde(default)]
    pub features: Vec<FeatureInfo>,

    /// Models in display order.
    #[serde(default)]
    pub models: Vec<ModelInfo>,

    /// Features highlighted on the welcome view.
    #[serde(default)]
    pub featured: Vec<FeatureId>,
}

/// Read-only lookup over a [`Catalog`].
#[derive(Debug, Clone)]
pub struct Registry {
    features: Vec<FeatureInfo>,
    models: Vec<ModelInfo>,
    featured: Vec<FeatureId>,
    feature_index: HashMap<FeatureId, usize>,
}

impl Registry {
    /// Build a registry from a catalog.
    ///
    /// Later duplicates of a feature id replace earlier ones.
    pub fn new(catalog: Catalog) -> Self {
        let mut features: Vec<FeatureInfo> = Vec::with_capacity(catalog.features.len());
        let mut feature_index = HashMap::new();
        for feature in catalog.features {
            match feature_index.get(&feature.id) {
                Some(&idx) => features[idx] = feature,
                None => {
                    feature_index.insert(feature.id.clone(), features.len());
                    features.push(feature);
                }
            }
        }
        Self {
            features,
            models: catalog.models,
            featured: catalog.featured,
            feature_index,
        }
    }

    /// Parse a catalog from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let catalog: Catalog = serde_yaml::from_str(yaml)?;
        if catalog.features.is_empty() {
            return Err(Error::config("catalog defines no features"));
        }
        Ok(Self::new(catalog))
    }

    /// Load a YAML catalog from disk.
    pub fn load(path: &str) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|err| Error::io(format!("failed to read catalog {path}"), err))?;
        Self::from_yaml(&yaml)
    }

    /// All features in display order.
    pub fn features(&self) -> &[FeatureInfo] {
        &self.features
    }

    /// All models in display order.
    pub fn models(&self) -> &[ModelInfo] {
        &self.models
    }

    /// Features highlighted on the welcome view.
    pub fn featured(&self) -> Vec<FeatureInfo> {
        self.featured
            .iter()
            .map(|id| {
                self.feature(id).cloned().unwrap_or_else(|| FeatureInfo {
                    id: id.clone(),
                    name: id.to_string(),
                    icon: DEFAULT_FEATURE_ICON.to_string(),
                })
            })
            .collect()
    }

    /// Look up a feature.
    pub fn feature(&self, id: &FeatureId) -> Option<&FeatureInfo> {
        self.feature_index.get(id).map(|&idx| &self.features[idx])
    }

    /// Look up a model.
    pub fn model(&self, id: &ModelId) -> Option<&ModelInfo> {
        self.models.iter().find(|model| &model.id == id)
    }

    /// Display name of a feature, or the id itself.
    pub fn feature_name(&self, id: &FeatureId) -> String {
        self.feature(id)
            .map(|feature| feature.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Icon of a feature, or [`DEFAULT_FEATURE_ICON`].
    pub fn feature_icon(&self, id: &FeatureId) -> &str {
        self.feature(id)
            .map(|feature| feature.icon.as_str())
            .unwrap_or(DEFAULT_FEATURE_ICON)
    }

    /// Display label of a model, or the id itself.
    pub fn model_label(&self, id: &ModelId) -> String {
        self.model(id)
            .map(ModelInfo::label)
            .unwrap_or_else(|| id.to_string())
    }

    /// Features whose display name contains `query`, ignoring case.
    ///
    /// An empty query matches everything.
    pub fn search(&self, query: &str) -> Vec<&FeatureInfo> {
        let query = query.trim().to_lowercase();
        self.features
            .iter()
            .filter(|feature| feature.name.to_lowercase().contains(&query))
            .collect()
    }

    /// Resolve display metadata for a feature/model pair.
    pub fn meta(&self, feature: &FeatureId, model: Option<&ModelId>) -> MessageMeta {
        MessageMeta {
            feature_name: self.feature_name(feature),
            feature_icon: self.feature_icon(feature).to_string(),
            model_label: model.map(|model| self.model_label(model)),
        }
    }

    /// Resolve display metadata for a message.
    ///
    /// Assistant badges show the model id exactly as the backend reported it.
    pub fn meta_for(&self, message: &Message) -> MessageMeta {
        MessageMeta {
            feature_name: self.feature_name(&message.feature),
            feature_icon: self.feature_icon(&message.feature).to_string(),
            model_label: message.model.as_ref().map(ModelId::to_string),
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        let features = BUILTIN_FEATURES
            .iter()
            .map(|(id, icon, name)| FeatureInfo {
                id: FeatureId::from(*id),
                name: name.to_string(),
                icon: icon.to_string(),
            })
            .collect();
        let models = KnownModel::ALL
            .into_iter()
            .map(|known| {
                let (icon, name) = match known {
                    KnownModel::Llama3370bVersatile => ("🦙", "Llama 3.3 70B"),
                    KnownModel::Llama318bInstant => ("⚡", "Llama 3.1 8B Instant"),
                    KnownModel::Qwen332b => ("🎯", "Qwen 3 32B"),
                    KnownModel::GptOss20b => ("💎", "GPT OSS 20B"),
                };
                ModelInfo {
                    id: ModelId::Known(known),
                    name: name.to_string(),
                    icon: icon.to_string(),
                }
            })
            .collect();
        let featured = BUILTIN_FEATURED.iter().map(|id| FeatureId::from(*id)).collect();
        Self::new(Catalog {
            features,
            models,
            featured,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_lookup() {
        let registry = Registry::default();
        let chat = FeatureId::from("chat");
        assert_eq!(registry.feature_name(&chat), "AI Chat");
        assert_eq!(registry.feature_icon(&chat), "💬");
        assert_eq!(
            registry.model_label(&ModelId::default()),
            "🦙 Llama 3.3 70B"
        );
        assert_eq!(registry.models().len(), 4);
    }

    #[test]
    fn unknown_ids_fall_back() {
        let registry = Registry::default();
        let feature = FeatureId::from("time_travel");
        assert_eq!(registry.feature_name(&feature), "time_travel");
        assert_eq!(registry.feature_icon(&feature), DEFAULT_FEATURE_ICON);
        let model = ModelId::from("mixtral-8x7b");
        assert_eq!(registry.model_label(&model), "mixtral-8x7b");
    }

    #[test]
    fn search_is_case_insensitive() {
        let registry = Registry::default();
        let hits: Vec<&str> = registry
            .search("CODE")
            .into_iter()
            .map(|feature| feature.id.as_str())
            .collect();
        assert!(hits.contains(&"code_review"));
        assert!(hits.contains(&"code_translator"));
        assert!(!hits.contains(&"chat"));
        assert_eq!(registry.search("").len(), registry.features().len());
        assert!(registry.search("no such feature").is_empty());
    }

    #[test]
    fn featured_cards() {
        let registry = Registry::default();
        let featured: Vec<String> = registry
            .featured()
            .into_iter()
            .map(|feature| feature.name)
            .collect();
        assert_eq!(
            featured,
            vec!["AI Chat", "Autonomous AI", "Code Analysis", "File Reader"]
        );
    }

    #[test]
    fn yaml_catalog() {
        let yaml = r#"
features:
  - id: chat
    name: Chat
    icon: "💬"
  - id: summarize
    name: Summarize
    icon: "📝"
  - id: chat
    name: Plain Chat
    icon: "🗨️"
models:
  - id: llama-3.1-8b-instant
    name: Small Llama
    icon: "⚡"
featured: [summarize, missing]
"#;
        let registry = Registry::from_yaml(yaml).unwrap();
        assert_eq!(registry.features().len(), 2);
        assert_eq!(registry.feature_name(&"chat".into()), "Plain Chat");
        assert_eq!(
            registry.model_label(&ModelId::Known(KnownModel::Llama318bInstant)),
            "⚡ Small Llama"
        );
        let featured = registry.featured();
        assert_eq!(featured[0].name, "Summarize");
        assert_eq!(featured[1].name, "missing");
        assert_eq!(featured[1].icon, DEFAULT_FEATURE_ICON);
    }

    #[test]
    fn empty_yaml_catalog_is_rejected() {
        assert!(Registry::from_yaml("models: []").is_err());
        assert!(Registry::from_yaml("features: [").is_err());
    }

    #[test]
    fn meta_for_message_keeps_reported_model() {
        let registry = Registry::default();
        let message = Message::assistant(
            "code_analyzer".into(),
            Some(ModelId::from("🚀 Llama 3.3 70B")),
            "looks fine",
        );
        let meta = registry.meta_for(&message);
        assert_eq!(meta.feature_name, "Code Analysis");
        assert_eq!(meta.feature_icon, "🧠");
        assert_eq!(meta.model_label.as_deref(), Some("🚀 Llama 3.3 70B"));
    }
}
