//! Recording fakes for the client contract, shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{Map, Value};
use suspense_query::{
    client::{FetchResolver, ObservableQuery, ObserverFn, PendingFetch, QueryClient},
    reactive::{Rerender, Unsubscribe},
    types::{FetchMoreOptions, QueryResult, SubscribeToMoreOptions, UpdateQueryFn},
    QueryDescriptor, QueryError,
};

/// Hook run inside `FakeObservable::set_options`, after the call is logged.
pub type SetOptionsHook = Arc<dyn Fn(&QueryDescriptor) + Send + Sync>;

pub const GET_USER: &str = "query GetUser($id: ID!) { user(id: $id) { id name } }";

/// A shared call-log for collecting callback invocations.
pub fn make_log<T: Send + 'static>() -> Arc<Mutex<Vec<T>>> {
    Arc::new(Mutex::new(Vec::new()))
}

/// A re-render callback that counts its invocations.
pub fn counting_rerender() -> (Rerender, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&count);
    let rerender: Rerender = Arc::new(move || {
        c.fetch_add(1, Ordering::SeqCst);
    });
    (rerender, count)
}

fn cache_key(descriptor: &QueryDescriptor) -> String {
    format!(
        "{}|{}",
        descriptor.document.source,
        Value::Object(descriptor.variables.clone())
    )
}

// ============================================================================
// FakeClient
// ============================================================================

/// In-memory stand-in for a GraphQL client: a keyed cache plus logs of every
/// entry point call.
#[derive(Default)]
pub struct FakeClient {
    cache: Mutex<HashMap<String, Value>>,
    watched: Mutex<Vec<Arc<FakeObservable>>>,
    queries: Mutex<Vec<QueryDescriptor>>,
    resolvers: Mutex<Vec<FetchResolver>>,
    reads: AtomicUsize,
}

impl FakeClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn write(&self, descriptor: &QueryDescriptor, data: Value) {
        self.cache.lock().unwrap().insert(cache_key(descriptor), data);
    }

    pub fn queries(&self) -> Vec<QueryDescriptor> {
        self.queries.lock().unwrap().clone()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn watched(&self) -> Vec<Arc<FakeObservable>> {
        self.watched.lock().unwrap().clone()
    }

    /// The single observable created so far.
    pub fn observable(&self) -> Arc<FakeObservable> {
        let watched = self.watched.lock().unwrap();
        assert_eq!(watched.len(), 1, "expected exactly one watched query");
        Arc::clone(&watched[0])
    }

    /// Settle the oldest outstanding one-shot fetch.
    pub fn resolve_next(&self, outcome: Result<QueryResult, QueryError>) {
        let resolver = self.resolvers.lock().unwrap().remove(0);
        resolver.settle(outcome);
    }
}

impl QueryClient for FakeClient {
    fn watch_query(&self, descriptor: &QueryDescriptor) -> Arc<dyn ObservableQuery> {
        let initial = match self.cache.lock().unwrap().get(&cache_key(descriptor)) {
            Some(data) => QueryResult::ready(data.clone()),
            None if descriptor.skip => QueryResult::idle(),
            None => QueryResult::loading(),
        };
        let observable = Arc::new(FakeObservable::new(descriptor.clone(), initial));
        self.watched.lock().unwrap().push(Arc::clone(&observable));
        observable
    }

    fn read_query(&self, descriptor: &QueryDescriptor) -> Option<Value> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.cache.lock().unwrap().get(&cache_key(descriptor)).cloned()
    }

    fn query(&self, descriptor: &QueryDescriptor) -> PendingFetch {
        self.queries.lock().unwrap().push(descriptor.clone());
        let (resolver, pending) = PendingFetch::channel(descriptor.clone());
        self.resolvers.lock().unwrap().push(resolver);
        pending
    }
}

// ============================================================================
// FakeObservable
// ============================================================================

/// Observable query with snapshot-on-emit delivery: a listener removed while
/// an emission is running still receives that emission.
pub struct FakeObservable {
    options: Mutex<QueryDescriptor>,
    current: Mutex<QueryResult>,
    listeners: Arc<Mutex<Vec<(u64, Arc<ObserverFn>)>>>,
    next_id: AtomicU64,
    set_options_calls: Mutex<Vec<QueryDescriptor>>,
    calls: Arc<Mutex<Vec<String>>>,
    fail_set_options: AtomicBool,
    set_options_hook: Mutex<Option<SetOptionsHook>>,
}

impl FakeObservable {
    fn new(options: QueryDescriptor, initial: QueryResult) -> Self {
        Self {
            options: Mutex::new(options),
            current: Mutex::new(initial),
            listeners: make_log(),
            next_id: AtomicU64::new(1),
            set_options_calls: Mutex::new(Vec::new()),
            calls: make_log(),
            fail_set_options: AtomicBool::new(false),
            set_options_hook: Mutex::new(None),
        }
    }

    /// Publish `result` to every listener registered at call time.
    pub fn emit(&self, result: QueryResult) {
        *self.current.lock().unwrap() = result.clone();
        let snapshot: Vec<Arc<ObserverFn>> = self
            .listeners
            .lock()
            .unwrap()
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for cb in snapshot {
            cb(&result);
        }
    }

    /// The listeners registered right now, as an in-progress emission would
    /// have captured them.
    pub fn capture_listeners(&self) -> Vec<Arc<ObserverFn>> {
        self.listeners
            .lock()
            .unwrap()
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }

    pub fn set_options_calls(&self) -> Vec<QueryDescriptor> {
        self.set_options_calls.lock().unwrap().clone()
    }

    pub fn options(&self) -> QueryDescriptor {
        self.options.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail_next_set_options(&self, fail: bool) {
        self.fail_set_options.store(fail, Ordering::SeqCst);
    }

    /// Run `hook` on every later `set_options` call, with no fake lock held.
    pub fn on_set_options(&self, hook: impl Fn(&QueryDescriptor) + Send + Sync + 'static) {
        *self.set_options_hook.lock().unwrap() = Some(Arc::new(hook));
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

impl ObservableQuery for FakeObservable {
    fn current_result(&self) -> QueryResult {
        self.current.lock().unwrap().clone()
    }

    fn subscribe(&self, observer: Arc<ObserverFn>) -> Unsubscribe {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.lock().unwrap().push((id, observer));
        self.record("subscribe");

        let listeners = Arc::clone(&self.listeners);
        let calls = Arc::clone(&self.calls);
        Box::new(move || {
            listeners.lock().unwrap().retain(|(lid, _)| *lid != id);
            calls.lock().unwrap().push("unsubscribe".to_string());
        })
    }

    fn set_options(&self, descriptor: &QueryDescriptor) -> Result<(), QueryError> {
        self.set_options_calls.lock().unwrap().push(descriptor.clone());
        let hook = self.set_options_hook.lock().unwrap().clone();
        if let Some(hook) = hook {
            hook(descriptor);
        }
        if self.fail_set_options.swap(false, Ordering::SeqCst) {
            return Err(QueryError::InvalidOptions("rejected by fake".to_string()));
        }
        *self.options.lock().unwrap() = descriptor.clone();
        Ok(())
    }

    fn refetch(&self, variables: Option<Map<String, Value>>) -> PendingFetch {
        let mut options = self.options();
        if let Some(vars) = variables {
            options.variables.extend(vars);
        }
        self.record(format!("refetch:{}", Value::Object(options.variables.clone())));
        PendingFetch::ready(options, Ok(self.current_result()))
    }

    fn fetch_more(&self, options: FetchMoreOptions) -> PendingFetch {
        self.record(format!("fetch_more:{}", Value::Object(options.variables.clone())));
        let page = serde_json::json!({ "page": options.variables.get("page").cloned() });
        let previous = self.current_result();
        let merged = match &options.update_query {
            Some(merge) => merge(previous.data.as_ref(), &page, &options.variables),
            None => page,
        };
        self.emit(QueryResult::ready(merged.clone()));
        PendingFetch::ready(self.options(), Ok(QueryResult::ready(merged)))
    }

    fn update_query(&self, map: &UpdateQueryFn) {
        self.record("update_query");
        let previous = self.current_result();
        let variables = self.options().variables;
        let next = map(previous.data.as_ref(), &variables);
        self.emit(QueryResult::ready(next));
    }

    fn start_polling(&self, interval: Duration) {
        self.record(format!("start_polling:{}", interval.as_millis()));
    }

    fn stop_polling(&self) {
        self.record("stop_polling");
    }

    fn subscribe_to_more(&self, options: SubscribeToMoreOptions) -> Unsubscribe {
        self.record(format!(
            "subscribe_to_more:{}",
            options.document.operation_name().unwrap_or("<anonymous>")
        ));
        let calls = Arc::clone(&self.calls);
        Box::new(move || calls.lock().unwrap().push("unsubscribe_more".to_string()))
    }
}
