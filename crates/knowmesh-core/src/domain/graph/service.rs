//! Knowledge graph service
//!
//! Wires a [`KnowledgeStore`] and a [`ProjectRegistry`] to the graph builder
//! and analyzer, using [`Config`] for default options.

use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::domain::knowledge::{KnowledgeQuery, KnowledgeStore};
use crate::domain::project::ProjectRegistry;
use crate::error::{Error, Result};

use super::analysis::{AnalysisOptions, AnalysisReport, GraphAnalyzer};
use super::builder::{BuildOptions, GraphBuilder};
use super::model::GraphModel;

/// Knowledge graph service
///
/// Provides high-level operations for:
/// - Building graphs from knowledge queries
/// - Analyzing graphs and annotating their nodes
pub struct KnowledgeGraphService<S: KnowledgeStore + ?Sized, P: ProjectRegistry + ?Sized> {
    builder: GraphBuilder<S, P>,
    analyzer: GraphAnalyzer,
    config: Config,
}

impl<S: KnowledgeStore + ?Sized, P: ProjectRegistry + ?Sized> KnowledgeGraphService<S, P> {
    /// Create a service with default configuration
    pub fn new(store: Arc<S>, registry: Arc<P>) -> Self {
        Self {
            builder: GraphBuilder::new(store, registry),
            analyzer: GraphAnalyzer::new(),
            config: Config::default(),
        }
    }

    /// Use the given configuration for default options
    pub fn with_config(mut self, config: Config) -> Result<Self> {
        config
            .validate()
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        self.analyzer = match config.analyzer.seed {
            Some(seed) => GraphAnalyzer::with_seed(seed),
            None => GraphAnalyzer::new(),
        };
        self.config = config;
        Ok(self)
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build options derived from configuration
    pub fn default_build_options(&self) -> BuildOptions {
        BuildOptions::from(&self.config.builder)
    }

    /// Analysis options derived from configuration
    pub fn default_analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions::from(&self.config.analyzer)
    }

    /// Build a graph with the configured options
    pub async fn build_graph(&self, query: KnowledgeQuery) -> Result<GraphModel> {
        let options = self.default_build_options();
        self.builder.build_graph(query, &options).await
    }

    /// Build a graph with explicit options
    pub async fn build_graph_with(
        &self,
        query: KnowledgeQuery,
        options: &BuildOptions,
    ) -> Result<GraphModel> {
        self.builder.build_graph(query, options).await
    }

    /// Analyze a graph with the configured options and annotate its nodes
    pub async fn analyze_graph(&self, graph: &mut GraphModel) -> Result<AnalysisReport> {
        let options = self.default_analysis_options();
        self.analyze_graph_with(graph, &options).await
    }

    /// Analyze a graph with explicit options and annotate its nodes
    pub async fn analyze_graph_with(
        &self,
        graph: &mut GraphModel,
        options: &AnalysisOptions,
    ) -> Result<AnalysisReport> {
        let report = self.analyzer.analyze_graph(graph, options).await?;
        let annotated = report.annotate(graph);
        info!(graph_id = %graph.id, annotated, "Graph nodes annotated");
        Ok(report)
    }

    /// Build a graph and analyze it in one step
    pub async fn build_and_analyze(
        &self,
        query: KnowledgeQuery,
    ) -> Result<(GraphModel, AnalysisReport)> {
        let mut graph = self.build_graph(query).await?;
        let report = self.analyze_graph(&mut graph).await?;
        Ok((graph, report))
    }
}
