//! Sync orchestration: fetch, parse, plan, then apply.
//!
//! There is no retry and no rollback. The first failing call stops the run and
//! leaves the remote calendar partially updated; running again recomputes the
//! remaining diff from a fresh fetch.

use tracing::{debug, info};

use crate::error::SyncResult;
use crate::plan::{Plan, RemoteEventIndex, plan};
use crate::remote::RemoteCalendar;
use crate::source::EventSource;

/// Counts of remote calls that succeeded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyStats {
    pub removed: usize,
    pub added: usize,
}

pub struct Syncer<R, S> {
    remote: R,
    source: S,
}

impl<R: RemoteCalendar, S: EventSource> Syncer<R, S> {
    pub fn new(remote: R, source: S) -> Self {
        Syncer { remote, source }
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Fetch remote events, parse the source and compute the plan.
    /// Nothing on the remote is changed.
    pub async fn plan(&self) -> SyncResult<Plan> {
        let (_, plan) = self.plan_with_index().await?;
        Ok(plan)
    }

    /// Like [`Syncer::plan`], also returning the fetched remote events so
    /// callers can describe what each removed id refers to.
    pub async fn plan_with_index(&self) -> SyncResult<(RemoteEventIndex, Plan)> {
        let existing = self.remote.fetch_events().await?;
        info!(count = existing.len(), "Fetched remote events");

        let desired = self.source.events()?;
        info!(count = desired.len(), "Parsed desired events");

        let plan = plan(&existing, &desired);
        info!(
            to_remove = plan.to_remove.len(),
            to_add = plan.to_add.len(),
            "Computed plan"
        );

        Ok((existing, plan))
    }

    /// Apply a plan: every removal, then every addition.
    pub async fn apply(&self, plan: &Plan) -> SyncResult<ApplyStats> {
        let mut stats = ApplyStats::default();

        for id in &plan.to_remove {
            debug!(%id, "Removing event");
            self.remote.remove(id).await?;
            stats.removed += 1;
        }

        for event in &plan.to_add {
            debug!(title = event.title(), dates = %event.render_dates(), "Adding event");
            self.remote.add(event).await?;
            stats.added += 1;
        }

        info!(removed = stats.removed, added = stats.added, "Applied plan");

        Ok(stats)
    }

    /// Run all steps.
    pub async fn sync(&self) -> SyncResult<ApplyStats> {
        let plan = self.plan().await?;
        self.apply(&plan).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, HashSet};
    use std::sync::Mutex;

    use chrono::NaiveDate;

    use super::*;
    use crate::error::SyncError;
    use crate::event::{Event, RemoteId};
    use crate::source::parse_events;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Fetch,
        Add(Event),
        Remove(RemoteId),
    }

    #[derive(Default)]
    struct State {
        index: RemoteEventIndex,
        next_id: u32,
        calls: Vec<Call>,
        unavailable_on: Option<RemoteId>,
    }

    /// In-memory calendar that records every call.
    #[derive(Default)]
    struct MockRemote {
        state: Mutex<State>,
    }

    impl MockRemote {
        fn with_events(events: &[(&Event, &str)]) -> Self {
            let remote = MockRemote::default();
            {
                let mut state = remote.state.lock().unwrap();
                for (event, id) in events {
                    state.index.insert((*event).clone(), RemoteId::from(*id));
                }
            }
            remote
        }

        fn failing_on(self, id: &str) -> Self {
            self.state.lock().unwrap().unavailable_on = Some(RemoteId::from(id));
            self
        }

        fn calls(&self) -> Vec<Call> {
            self.state.lock().unwrap().calls.clone()
        }

        fn clear_calls(&self) {
            self.state.lock().unwrap().calls.clear();
        }
    }

    impl RemoteCalendar for MockRemote {
        async fn fetch_events(&self) -> SyncResult<RemoteEventIndex> {
            let mut state = self.state.lock().unwrap();
            state.calls.push(Call::Fetch);
            Ok(state.index.clone())
        }

        async fn add(&self, event: &Event) -> SyncResult<()> {
            let mut state = self.state.lock().unwrap();
            state.calls.push(Call::Add(event.clone()));
            state.next_id += 1;
            let id = RemoteId::new(format!("new-{}", state.next_id));
            state.index.insert(event.clone(), id);
            Ok(())
        }

        async fn remove(&self, id: &RemoteId) -> SyncResult<()> {
            let mut state = self.state.lock().unwrap();
            state.calls.push(Call::Remove(id.clone()));

            if state.unavailable_on.as_ref() == Some(id) {
                return Err(SyncError::RemoteUnavailable("connection reset".into()));
            }

            let before = state.index.len();
            state.index.retain(|_, existing| existing != id);
            if state.index.len() == before {
                return Err(SyncError::StaleIdentifier(id.clone()));
            }
            Ok(())
        }
    }

    struct InlineCsv(&'static str);

    impl EventSource for InlineCsv {
        fn events(&self) -> SyncResult<HashSet<Event>> {
            parse_events(self.0.as_bytes())
        }
    }

    struct Fixed(HashSet<Event>);

    impl EventSource for Fixed {
        fn events(&self) -> SyncResult<HashSet<Event>> {
            Ok(self.0.clone())
        }
    }

    const ONE_ROW: &str = "start_date,end_date,title,website,description\n\
                           2020-03-01,2020-03-02,expected1,https://www.google.com,test conference\n";

    fn event(title: &str, description: &str) -> Event {
        Event::new(
            title,
            NaiveDate::from_ymd_opt(2020, 3, 2).unwrap(),
            NaiveDate::from_ymd_opt(2020, 3, 4).unwrap(),
            Some("https://www.google.com".into()),
            description,
        )
        .unwrap()
    }

    fn expected1() -> Event {
        Event::new(
            "expected1",
            NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2020, 3, 2).unwrap(),
            Some("https://www.google.com".into()),
            "test conference",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn end_to_end_single_addition() {
        let desired = parse_events(ONE_ROW.as_bytes()).unwrap();
        assert_eq!(desired, HashSet::from([expected1()]));

        let plan = plan(&RemoteEventIndex::new(), &desired);
        assert_eq!(plan.to_add, BTreeSet::from([expected1()]));
        assert!(plan.to_remove.is_empty());

        let syncer = Syncer::new(MockRemote::default(), InlineCsv(ONE_ROW));
        let stats = syncer.sync().await.unwrap();

        assert_eq!(stats, ApplyStats { removed: 0, added: 1 });
        assert_eq!(
            syncer.remote().calls(),
            vec![Call::Fetch, Call::Add(expected1())]
        );
    }

    #[tokio::test]
    async fn syncer_obeys_the_plan() {
        let changed = event("changed", "updated description");
        let plan = Plan {
            to_add: BTreeSet::from([changed.clone()]),
            to_remove: BTreeSet::from([RemoteId::from("123")]),
        };

        let original = event("original", "another test conference");
        let remote = MockRemote::with_events(&[(&original, "123")]);
        let syncer = Syncer::new(remote, Fixed(HashSet::new()));

        syncer.apply(&plan).await.unwrap();

        assert_eq!(
            syncer.remote().calls(),
            vec![Call::Remove(RemoteId::from("123")), Call::Add(changed)]
        );
    }

    #[tokio::test]
    async fn every_removal_precedes_every_addition() {
        let old: Vec<Event> = (0..4).map(|i| event(&format!("old{i}"), "")).collect();
        let new: Vec<Event> = (0..4).map(|i| event(&format!("new{i}"), "")).collect();

        let remote = MockRemote::with_events(&[
            (&old[0], "a"),
            (&old[1], "b"),
            (&old[2], "c"),
            (&old[3], "d"),
        ]);
        let syncer = Syncer::new(remote, Fixed(new.iter().cloned().collect()));

        let stats = syncer.sync().await.unwrap();
        assert_eq!(stats, ApplyStats { removed: 4, added: 4 });

        let calls = syncer.remote().calls();
        let last_remove = calls
            .iter()
            .rposition(|c| matches!(c, Call::Remove(_)))
            .unwrap();
        let first_add = calls
            .iter()
            .position(|c| matches!(c, Call::Add(_)))
            .unwrap();
        assert!(last_remove < first_add);
    }

    #[tokio::test]
    async fn field_edit_removes_old_and_adds_new() {
        let unchanged = event("unchanged", "test conference");
        let original = event("talk", "another test conference");
        let edited = event("talk", "updated description");

        let remote = MockRemote::with_events(&[(&unchanged, "1"), (&original, "2")]);
        let syncer = Syncer::new(remote, Fixed(HashSet::from([unchanged, edited.clone()])));

        syncer.sync().await.unwrap();

        assert_eq!(
            syncer.remote().calls(),
            vec![
                Call::Fetch,
                Call::Remove(RemoteId::from("2")),
                Call::Add(edited)
            ]
        );
    }

    #[tokio::test]
    async fn malformed_source_aborts_before_any_mutation() {
        let existing = event("existing", "");
        let remote = MockRemote::with_events(&[(&existing, "1")]);
        let bad = "start_date,end_date,title,website,description\n\
                   2020-13-40,2020-03-02,bad,,\n";
        let syncer = Syncer::new(remote, InlineCsv(bad));

        let result = syncer.sync().await;

        assert!(matches!(result, Err(SyncError::MalformedInput(_))));
        assert_eq!(syncer.remote().calls(), vec![Call::Fetch]);
    }

    #[tokio::test]
    async fn first_remote_failure_halts_remaining_calls() {
        let a = event("a", "");
        let b = event("b", "");
        let remote = MockRemote::with_events(&[(&a, "1"), (&b, "2")]).failing_on("1");
        let syncer = Syncer::new(remote, Fixed(HashSet::from([event("c", "")])));

        let result = syncer.sync().await;

        assert!(matches!(result, Err(SyncError::RemoteUnavailable(_))));
        assert_eq!(
            syncer.remote().calls(),
            vec![Call::Fetch, Call::Remove(RemoteId::from("1"))]
        );
    }

    #[tokio::test]
    async fn stale_identifier_is_surfaced() {
        let plan = Plan {
            to_add: BTreeSet::new(),
            to_remove: BTreeSet::from([RemoteId::from("deleted-out-of-band")]),
        };
        let syncer = Syncer::new(MockRemote::default(), Fixed(HashSet::new()));

        let result = syncer.apply(&plan).await;

        match result {
            Err(SyncError::StaleIdentifier(id)) => assert_eq!(id.as_str(), "deleted-out-of-band"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn planning_returns_the_fetched_events() {
        let stale = event("stale", "");
        let remote = MockRemote::with_events(&[(&stale, "1")]);
        let syncer = Syncer::new(remote, InlineCsv(ONE_ROW));

        let (existing, plan) = syncer.plan_with_index().await.unwrap();

        assert_eq!(existing.get(&stale), Some(&RemoteId::from("1")));
        assert_eq!(plan.to_remove, BTreeSet::from([RemoteId::from("1")]));
        assert_eq!(syncer.remote().calls(), vec![Call::Fetch]);
    }

    #[tokio::test]
    async fn second_run_has_nothing_to_do() {
        let stale = event("stale", "");
        let remote = MockRemote::with_events(&[(&stale, "1")]);
        let syncer = Syncer::new(remote, InlineCsv(ONE_ROW));

        syncer.sync().await.unwrap();
        syncer.remote().clear_calls();

        let plan = syncer.plan().await.unwrap();
        assert!(plan.is_empty());

        let stats = syncer.apply(&plan).await.unwrap();
        assert_eq!(stats, ApplyStats::default());
        assert_eq!(syncer.remote().calls(), vec![Call::Fetch]);
    }

    #[tokio::test]
    async fn rerun_after_partial_failure_finishes_the_job() {
        let a = event("a", "");
        let b = event("b", "");
        let remote = MockRemote::with_events(&[(&a, "1"), (&b, "2")]).failing_on("2");
        let syncer = Syncer::new(remote, InlineCsv(ONE_ROW));

        assert!(syncer.sync().await.is_err());

        syncer.remote().state.lock().unwrap().unavailable_on = None;
        let stats = syncer.sync().await.unwrap();

        assert_eq!(stats, ApplyStats { removed: 1, added: 1 });
        assert!(syncer.plan().await.unwrap().is_empty());
    }
}
