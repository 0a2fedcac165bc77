use std::fs::File;
use std::io::BufReader;

use chrono::{Duration, NaiveDate, Utc};
use tracing::info;

use crate::aggregate::aggregate_views;
use crate::app::{ProgressEvent, ProgressSink};
use crate::config::RunConfig;
use crate::dumps::DumpClient;
use crate::error::TrendsError;
use crate::page_map::PageMap;
use crate::rank::Snapshot;
use crate::store::Store;

/// The trailing window of calendar days ending at, but excluding, `today`,
/// oldest first.
pub fn window_dates(today: NaiveDate, days: u32) -> Vec<NaiveDate> {
    (1..=i64::from(days))
        .rev()
        .map(|days_ago| today - Duration::days(days_ago))
        .collect()
}

/// Per-day Wikipedia views pipeline: fetch, aggregate, rank, persist. One
/// snapshot per day, oldest first, each day's deltas computed against the
/// day before.
pub struct DailyViews<'a, D: DumpClient> {
    store: &'a Store,
    dumps: &'a D,
    config: &'a RunConfig,
}

impl<'a, D: DumpClient> DailyViews<'a, D> {
    pub fn new(store: &'a Store, dumps: &'a D, config: &'a RunConfig) -> Self {
        Self {
            store,
            dumps,
            config,
        }
    }

    pub fn run(&self, sink: &dyn ProgressSink) -> Result<Snapshot, TrendsError> {
        let page_map = PageMap::load(&self.store.page_map_path())?;
        sink.event(ProgressEvent {
            message: format!(
                "phase=Resolve; {} pages mapped to {} genes",
                page_map.len(),
                page_map.seed_counts().len()
            ),
            elapsed: None,
        });
        self.store.ensure_output_root()?;
        self.store.ensure_cache_root()?;

        // Days are strictly sequential: each day's deltas are only meaningful
        // against the immediately preceding day. The carried state is a local
        // value rebound per iteration, never mutated in place.
        let mut previous = Snapshot::empty();
        let today = Utc::now().date_naive();
        for date in window_dates(today, self.config.window_days) {
            let snapshot = self.process_day(date, &page_map, &previous, sink)?;
            snapshot
                .write_tsv(&self.store.views_day_path(date))
                .map_err(|err| TrendsError::DayProcessing {
                    date,
                    message: err.to_string(),
                })?;
            previous = snapshot;
        }

        // The final day's snapshot is the series the merge step consumes.
        previous.write_tsv(&self.store.views_series_path())?;
        Ok(previous)
    }

    fn process_day(
        &self,
        date: NaiveDate,
        page_map: &PageMap,
        previous: &Snapshot,
        sink: &dyn ProgressSink,
    ) -> Result<Snapshot, TrendsError> {
        let dump_path = self.store.dump_path(date);
        if self.config.debug.cache_downloads() && dump_path.as_std_path().exists() {
            sink.event(ProgressEvent {
                message: format!("phase=Fetch; using cached dump for {date}"),
                elapsed: None,
            });
        } else {
            sink.event(ProgressEvent {
                message: format!("phase=Fetch; downloading pageview dump for {date}"),
                elapsed: None,
            });
            self.dumps.fetch(date, &dump_path)?;
        }

        let file = File::open(dump_path.as_std_path()).map_err(|err| {
            TrendsError::DayProcessing {
                date,
                message: err.to_string(),
            }
        })?;
        let (counts, summary) = aggregate_views(
            BufReader::new(file),
            page_map,
            &self.config.wiki_codes,
            page_map.seed_counts(),
        )
        .map_err(|err| TrendsError::DayProcessing {
            date,
            message: err.to_string(),
        })?;

        info!(
            date = %date,
            lines = summary.lines,
            malformed = summary.malformed,
            lines_per_sec = summary.lines_per_sec(),
            "processed pageview dump"
        );
        sink.event(ProgressEvent {
            message: format!("views.day {date}: {} lines", summary.lines),
            elapsed: Some(summary.elapsed),
        });

        Ok(Snapshot::rank(&counts, previous))
    }
}
