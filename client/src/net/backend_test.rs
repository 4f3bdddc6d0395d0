use super::*;
use std::sync::atomic::AtomicUsize;

fn counting_listener(counter: &Arc<AtomicUsize>) -> Arc<dyn Fn(&u32) + Send + Sync> {
    let counter = Arc::clone(counter);
    Arc::new(move |_event: &u32| {
        counter.fetch_add(1, Ordering::SeqCst);
    })
}

#[test]
fn emit_reaches_every_listener() {
    let set = ListenerSet::<u32>::default();
    let hits = Arc::new(AtomicUsize::new(0));
    let _a = set.add(counting_listener(&hits));
    let _b = set.add(counting_listener(&hits));
    set.emit(&7);
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[test]
fn released_listener_receives_nothing() {
    let set = ListenerSet::<u32>::default();
    let hits = Arc::new(AtomicUsize::new(0));
    let sub = set.add(counting_listener(&hits));
    sub.release();
    set.emit(&1);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert!(set.is_empty());
}

#[test]
fn dropping_subscription_releases() {
    let set = ListenerSet::<u32>::default();
    let hits = Arc::new(AtomicUsize::new(0));
    {
        let _sub = set.add(counting_listener(&hits));
        assert_eq!(set.len(), 1);
    }
    set.emit(&1);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[test]
fn releasing_one_keeps_others() {
    let set = ListenerSet::<u32>::default();
    let hits = Arc::new(AtomicUsize::new(0));
    let first = set.add(counting_listener(&hits));
    let _second = set.add(counting_listener(&hits));
    first.release();
    set.emit(&1);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn listener_may_emit_registration_changes_without_deadlock() {
    let set = ListenerSet::<u32>::default();
    let inner = set.clone();
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_inner = Arc::clone(&hits);
    let _sub = set.add(Arc::new(move |_: &u32| {
        let nested = inner.add(counting_listener(&hits_inner));
        nested.release();
    }));
    set.emit(&1);
    assert_eq!(set.len(), 1);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[test]
fn subscription_release_runs_once() {
    let runs = Arc::new(AtomicUsize::new(0));
    let runs_inner = Arc::clone(&runs);
    let sub = Subscription::new(move || {
        runs_inner.fetch_add(1, Ordering::SeqCst);
    });
    sub.release();
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[test]
fn noop_subscription_is_inactive() {
    assert_eq!(format!("{:?}", Subscription::noop()), "Subscription { active: false }");
}
