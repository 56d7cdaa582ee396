use mnemo_rs_agents::{
    AgentMemory, MemoryAwareSession, PrimaryDeveloperMemory, SentinelMemory,
};
use mnemo_rs_memory::{
    Category, MalformedRecordPolicy, MemoryStore, RecordQuery, collect_stats,
};
use mnemo_rs_test_utils::{FixedClock, InMemoryBackend};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn shared_store(backend: Arc<InMemoryBackend>) -> MemoryStore {
    MemoryStore::new(backend).with_clock(Arc::new(FixedClock::stepping()))
}

#[test]
fn agents_share_one_store_and_stay_attributed() {
    let backend = Arc::new(InMemoryBackend::new());
    let store = shared_store(backend.clone());

    let developer = PrimaryDeveloperMemory::new(store.clone());
    let sentinel = SentinelMemory::new(store.clone());
    developer
        .store_user_preference("alice", "skill_level", "beginner", "onboarding")
        .expect("preference");
    developer
        .store_teaching_success("Invoice validation", "worked examples", 0.9)
        .expect("teaching");
    sentinel
        .store_security_pattern("Hardcoded keys", "sk_live_", "CRITICAL")
        .expect("security");
    assert_eq!(backend.len(), 3);

    let development = store
        .retrieve(&RecordQuery::new().category(Category::Development))
        .expect("retrieve");
    assert_eq!(development.len(), 2);
    // Newest first under the stepping clock.
    assert_eq!(development[0].metadata.agent.as_deref(), Some("sentinel"));

    let stats = collect_stats(&store).expect("stats");
    assert_eq!(stats.by_agent.get("primary_developer"), Some(&2));
    assert_eq!(stats.by_agent.get("sentinel"), Some(&1));

    let context = sentinel.user_context("alice").expect("context");
    assert_eq!(context.len(), 1);
}

#[test]
fn session_start_sees_earlier_keyword_tagged_records() {
    let backend = Arc::new(InMemoryBackend::new());
    let store = shared_store(backend);
    let memory = AgentMemory::new(store.clone(), "primary_developer");
    memory
        .store_user_preference("invoice", "layout", "tables", "")
        .expect("preference");

    let session = MemoryAwareSession::new(memory);
    let started = session.start("invoice screens").expect("start");
    // The preference carries the `invoice` tag; the start record is written after lookup.
    assert_eq!(started.relevant_memories.len(), 1);
    assert_eq!(started.relevant_memories[0].record_type, "preference");
}

#[test]
fn malformed_entries_follow_store_policy() {
    let backend = Arc::new(InMemoryBackend::new());
    backend.insert_malformed(Category::Development, "development_bad_1", "truncated");
    let lenient = shared_store(backend.clone());
    let developer = AgentMemory::new(lenient.clone(), "primary_developer");
    developer
        .store_pattern("Guard", "return early", None)
        .expect("pattern");
    assert_eq!(developer.pattern_memories(10).expect("patterns").len(), 1);

    let strict = lenient.with_malformed_policy(MalformedRecordPolicy::Abort);
    let developer = AgentMemory::new(strict, "primary_developer");
    assert!(developer.pattern_memories(10).is_err());
}
