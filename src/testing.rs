//! Test infrastructure: an in-memory store double and a scripted
//! confirmation source, so the pipeline can be exercised without DynamoDB or
//! a terminal.

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::ops::Bound;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::cleanup::ConfirmationInput;
use crate::config::RunConfig;
use crate::course::{Course, CourseKey};
use crate::store::{CourseStore, QueryPage, StoreError};

/// A `RunConfig` for tests, with delays zeroed out.
pub fn test_config(tenant_id: &str) -> RunConfig {
    RunConfig {
        region: "us-east-1".to_string(),
        table: "test_courses".to_string(),
        tenant_id: tenant_id.to_string(),
        total_records: 1000,
        batch_size: 20,
        batch_delay_ms: 0,
        output_dir: PathBuf::from(std::env::temp_dir()),
    }
}

#[derive(Default)]
struct State {
    /// tenant_id -> course_id -> record, ordered for deterministic paging.
    items: BTreeMap<String, BTreeMap<String, Course>>,
    put_calls: u64,
    delete_calls: u64,
    query_calls: u64,
}

/// In-memory [`CourseStore`] with scriptable per-batch failures and an
/// optional page-size cap to simulate the store's per-call result limit.
#[derive(Default)]
pub struct MemoryStore {
    page_size: Option<usize>,
    fail_puts: HashSet<u64>,
    fail_deletes: HashSet<u64>,
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the number of items returned per `query_page` call even when the
    /// caller passes no limit, forcing readers to paginate.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Fail the Nth `put_batch` call (1-based).
    pub fn fail_put_batch(mut self, call: u64) -> Self {
        self.fail_puts.insert(call);
        self
    }

    /// Fail the Nth `delete_batch` call (1-based).
    pub fn fail_delete_batch(mut self, call: u64) -> Self {
        self.fail_deletes.insert(call);
        self
    }

    /// Seed a record directly, bypassing call counting.
    pub fn seed(&self, course: Course) {
        let mut state = self.state.lock().unwrap();
        state
            .items
            .entry(course.tenant_id.clone())
            .or_default()
            .insert(course.course_id.clone(), course);
    }

    pub fn put_batch_calls(&self) -> u64 {
        self.state.lock().unwrap().put_calls
    }

    pub fn delete_batch_calls(&self) -> u64 {
        self.state.lock().unwrap().delete_calls
    }

    pub fn query_page_calls(&self) -> u64 {
        self.state.lock().unwrap().query_calls
    }

    pub fn total_len(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.items.values().map(BTreeMap::len).sum()
    }

    pub fn len_for(&self, tenant_id: &str) -> usize {
        let state = self.state.lock().unwrap();
        state.items.get(tenant_id).map_or(0, BTreeMap::len)
    }
}

#[async_trait]
impl CourseStore for MemoryStore {
    async fn put_batch(&self, courses: &[Course]) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        state.put_calls += 1;
        if self.fail_puts.contains(&state.put_calls) {
            return Err(StoreError::Request("injected put failure".to_string()));
        }
        for course in courses {
            state
                .items
                .entry(course.tenant_id.clone())
                .or_default()
                .insert(course.course_id.clone(), course.clone());
        }
        Ok(())
    }

    async fn delete_batch(&self, keys: &[CourseKey]) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        state.delete_calls += 1;
        if self.fail_deletes.contains(&state.delete_calls) {
            return Err(StoreError::Request("injected delete failure".to_string()));
        }
        for key in keys {
            if let Some(partition) = state.items.get_mut(&key.tenant_id) {
                partition.remove(&key.course_id);
            }
        }
        Ok(())
    }

    async fn query_page(
        &self,
        tenant_id: &str,
        limit: Option<u32>,
        start_key: Option<CourseKey>,
    ) -> Result<QueryPage, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.query_calls += 1;

        let Some(partition) = state.items.get(tenant_id) else {
            return Ok(QueryPage::default());
        };

        let lower = match &start_key {
            Some(key) => Bound::Excluded(key.course_id.clone()),
            None => Bound::Unbounded,
        };
        let cap = limit
            .map(|l| l as usize)
            .unwrap_or(usize::MAX)
            .min(self.page_size.unwrap_or(usize::MAX));

        let items: Vec<Course> = partition
            .range((lower, Bound::Unbounded))
            .take(cap)
            .map(|(_, course)| course.clone())
            .collect();

        let last_key = items.last().and_then(|last| {
            let more = partition
                .range((Bound::Excluded(last.course_id.clone()), Bound::Unbounded))
                .next()
                .is_some();
            more.then(|| last.key())
        });

        Ok(QueryPage { items, last_key })
    }

    async fn count_all(&self) -> Result<u64, StoreError> {
        Ok(self.total_len() as u64)
    }

    async fn count_for_tenant(&self, tenant_id: &str) -> Result<u64, StoreError> {
        Ok(self.len_for(tenant_id) as u64)
    }
}

/// Confirmation source that replays pre-scripted answers and records the
/// prompts it was shown.
#[derive(Default)]
pub struct ScriptedConfirmation {
    answers: VecDeque<String>,
    pub prompts: Vec<String>,
}

impl ScriptedConfirmation {
    pub fn new<I>(answers: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }
}

impl ConfirmationInput for ScriptedConfirmation {
    fn read_line(&mut self, prompt: &str) -> std::io::Result<String> {
        self.prompts.push(prompt.to_string());
        Ok(self.answers.pop_front().unwrap_or_default())
    }
}
