//! Architecture research: analysis and comparison of architecture descriptions,
//! and a batch pass over every node of a knowledge base.

use std::collections::BTreeMap;

use tracing::{debug, info, info_span, warn};

use crate::engine::llm_client::LanguageModel;
use crate::engine::predict::{FieldValue, Predictor};
use crate::engine::signature::{
    analyze_architecture, compare_architectures, ANALYSIS, COMPARISON, DESCRIPTION, DESCRIPTIONS,
};
use crate::error::Result;
use crate::knowledge::KnowledgeBase;

/// Node name to analysis text.
pub type AnalysisResult = BTreeMap<String, String>;

pub struct ArchitectureResearch<E> {
    engine: E,
    analyze_architecture: Predictor,
    compare_architectures: Predictor,
}

impl<E: LanguageModel> ArchitectureResearch<E> {
    pub fn new(engine: E) -> Result<Self> {
        Ok(Self {
            engine,
            analyze_architecture: Predictor::new(analyze_architecture()?),
            compare_architectures: Predictor::new(compare_architectures()?),
        })
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn analyze(&self, architecture_description: &str) -> Result<String> {
        let _span = info_span!("analyze", model = self.engine.model_name()).entered();
        self.analyze_architecture
            .call(
                &self.engine,
                &[(DESCRIPTION, FieldValue::from(architecture_description))],
            )?
            .into_output(ANALYSIS)
    }

    /// One model call covering every description.
    pub fn compare<S: AsRef<str>>(&self, architecture_descriptions: &[S]) -> Result<String> {
        let _span = info_span!(
            "compare",
            model = self.engine.model_name(),
            count = architecture_descriptions.len()
        )
        .entered();
        self.compare_architectures
            .call(
                &self.engine,
                &[(DESCRIPTIONS, FieldValue::from(architecture_descriptions))],
            )?
            .into_output(COMPARISON)
    }

    /// Analyzes every node with content, in the knowledge base's traversal order.
    /// The first failing analysis aborts the whole pass.
    pub fn forward<K>(&self, knowledge_base: &K) -> Result<AnalysisResult>
    where
        K: KnowledgeBase + ?Sized,
    {
        let _span = info_span!("forward", model = self.engine.model_name()).entered();
        let all_nodes = knowledge_base.collect_all_nodes();
        let mut node_to_analysis = AnalysisResult::new();

        for node in all_nodes {
            let Some(node) = node else {
                debug!("skipping null node");
                continue;
            };
            let Some(content) = node.text() else {
                debug!(node = %node.name, "skipping node without content");
                continue;
            };

            let analysis = self.analyze(content)?;
            if node_to_analysis.insert(node.name.clone(), analysis).is_some() {
                warn!(node = %node.name, "duplicate node name, keeping the later analysis");
            }
        }

        info!(analyzed = node_to_analysis.len(), "knowledge base analysis complete");
        Ok(node_to_analysis)
    }
}
