use std::fmt;
use std::str::FromStr;

use crate::models::Resource;

/// Top-level destinations of the navigation shell.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Route {
    /// Bare root: header only.
    #[default]
    Root,
    Athletes,
    Events,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Root => "/",
            Route::Athletes => "/athletes",
            Route::Events => "/events",
        }
    }

    /// Next list view when cycling with Tab. The root cycles to athletes.
    pub(crate) fn next(self) -> Self {
        match self {
            Route::Root | Route::Events => Route::Athletes,
            Route::Athletes => Route::Events,
        }
    }
}

impl FromStr for Route {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().trim_end_matches('/');
        match normalized {
            "" => Ok(Route::Root),
            "/athletes" | "athletes" => Ok(Route::Athletes),
            "/events" | "events" => Ok(Route::Events),
            other => Err(format!(
                "unknown route '{other}' (expected /, /athletes or /events)"
            )),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// What happened when a list response arrived.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum LoadResult {
    /// A newer load was issued after this one; the response was ignored.
    Stale,
    Loaded(usize),
    Failed(String),
}

/// Cached snapshot of one collection plus the card cursor. The snapshot is
/// only ever replaced wholesale by a collection load.
pub(crate) struct ListView<R: Resource> {
    pub(crate) records: Vec<R>,
    pub(crate) selected: usize,
    pub(crate) loading: bool,
    pub(crate) error: Option<String>,
    /// Generation of the most recently issued load.
    generation: Option<u64>,
}

impl<R: Resource> ListView<R> {
    pub(crate) fn new() -> Self {
        Self {
            records: Vec::new(),
            selected: 0,
            loading: false,
            error: None,
            generation: None,
        }
    }

    /// Record that a load with `generation` is in flight.
    pub(crate) fn begin_load(&mut self, generation: u64) {
        self.generation = Some(generation);
        self.loading = true;
    }

    /// Apply a load response unless a newer load superseded it. Failures keep
    /// the previous snapshot.
    pub(crate) fn finish_load(
        &mut self,
        generation: u64,
        result: Result<Vec<R>, String>,
    ) -> LoadResult {
        if self.generation != Some(generation) {
            return LoadResult::Stale;
        }
        self.loading = false;
        match result {
            Ok(records) => {
                self.records = records;
                self.error = None;
                self.clamp_selection();
                LoadResult::Loaded(self.records.len())
            }
            Err(message) => {
                self.error = Some(message.clone());
                LoadResult::Failed(message)
            }
        }
    }

    pub(crate) fn current(&self) -> Option<&R> {
        self.records.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.records.is_empty() {
            return;
        }
        let last = self.records.len() as isize - 1;
        let target = (self.selected as isize + offset).clamp(0, last);
        self.selected = target as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.records.len().saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        if self.selected >= self.records.len() {
            self.selected = self.records.len().saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Event;

    fn event(id: &str) -> Event {
        Event {
            id: id.into(),
            name: format!("Event {id}"),
            event_date: "2024-06-01".into(),
            registration_start: "2024-05-01".into(),
            registration_end: "2024-05-20".into(),
        }
    }

    #[test]
    fn routes_parse_from_paths() {
        assert_eq!("/athletes".parse::<Route>(), Ok(Route::Athletes));
        assert_eq!("/events/".parse::<Route>(), Ok(Route::Events));
        assert_eq!("/".parse::<Route>(), Ok(Route::Root));
        assert!("/boats".parse::<Route>().is_err());
        assert_eq!(Route::Events.to_string(), "/events");
    }

    #[test]
    fn tab_cycles_between_lists() {
        assert_eq!(Route::Root.next(), Route::Athletes);
        assert_eq!(Route::Athletes.next(), Route::Events);
        assert_eq!(Route::Events.next(), Route::Athletes);
    }

    #[test]
    fn stale_load_is_ignored() {
        let mut list = ListView::<Event>::new();
        list.begin_load(1);
        list.begin_load(2);

        assert_eq!(list.finish_load(2, Ok(vec![event("new")])), LoadResult::Loaded(1));
        assert_eq!(
            list.finish_load(1, Ok(vec![event("old"), event("older")])),
            LoadResult::Stale
        );
        assert_eq!(list.records[0].id, "new");
        assert!(!list.loading);
    }

    #[test]
    fn failed_load_keeps_snapshot() {
        let mut list = ListView::<Event>::new();
        list.begin_load(1);
        list.finish_load(1, Ok(vec![event("a")]));
        list.begin_load(2);
        let result = list.finish_load(2, Err("boom".into()));
        assert_eq!(result, LoadResult::Failed("boom".into()));
        assert_eq!(list.records.len(), 1);
        assert_eq!(list.error.as_deref(), Some("boom"));
    }

    #[test]
    fn selection_is_clamped_after_reload() {
        let mut list = ListView::<Event>::new();
        list.begin_load(1);
        list.finish_load(1, Ok(vec![event("a"), event("b"), event("c")]));
        list.select_last();
        assert_eq!(list.current().map(|e| e.id.as_str()), Some("c"));

        list.begin_load(2);
        list.finish_load(2, Ok(vec![event("a")]));
        assert_eq!(list.selected, 0);

        list.move_selection(5);
        assert_eq!(list.selected, 0);
    }
}
