use std::time::Duration;

use serde::Serialize;

use crate::citations::{CitationClient, Citations};
use crate::config::RunConfig;
use crate::domain::Pipeline;
use crate::dumps::DumpClient;
use crate::error::TrendsError;
use crate::merge::{merge, write_trends};
use crate::rank::Snapshot;
use crate::store::Store;
use crate::views::DailyViews;

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub genes: usize,
    pub views_path: String,
    pub citations_path: String,
    pub trends_path: String,
}

pub struct App<D: DumpClient, C: CitationClient> {
    store: Store,
    dumps: D,
    citations: C,
    config: RunConfig,
}

impl<D: DumpClient, C: CitationClient> App<D, C> {
    pub fn new(store: Store, dumps: D, citations: C, config: RunConfig) -> Self {
        Self {
            store,
            dumps,
            citations,
            config,
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run the selected pipelines, then merge the two series files into the
    /// trend table. The merge always reads from disk, so an `--only` run can
    /// reuse the other side's series from an earlier run.
    pub fn run(&self, sink: &dyn ProgressSink) -> Result<RunResult, TrendsError> {
        if self.config.runs(Pipeline::Views) {
            DailyViews::new(&self.store, &self.dumps, &self.config).run(sink)?;
        }
        if self.config.runs(Pipeline::Citations) {
            Citations::new(&self.store, &self.citations, &self.config).run(sink)?;
        }

        sink.event(ProgressEvent {
            message: "phase=Merge; joining citation and view series".to_string(),
            elapsed: None,
        });
        let citations = Snapshot::read_tsv(&self.store.citations_series_path())?;
        let views = Snapshot::read_tsv(&self.store.views_series_path())?;
        let rows = merge(&citations, &views, self.config.sort_by);
        write_trends(&rows, &self.store.trends_path())?;

        Ok(RunResult {
            genes: rows.len(),
            views_path: self.store.views_series_path().to_string(),
            citations_path: self.store.citations_series_path().to_string(),
            trends_path: self.store.trends_path().to_string(),
        })
    }
}
