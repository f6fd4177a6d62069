use crate::clock::{Clock, ManualClock};
use crate::codec;
use crate::curve::HillCurve;
use crate::drag::DragSession;
use crate::location::{Location, MemoryLocation};
use crate::model::{ChartPatch, ChartState, Scope, ScopePatch};
use crate::store::{Store, StoreOptions};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

const BASE: &str = "https://example.com/hill/";

fn store_with(location: MemoryLocation) -> (Store<MemoryLocation, ManualClock>, ManualClock) {
    let clock = ManualClock::default();
    let store = Store::init(location, clock.clone(), StoreOptions::default());
    (store, clock)
}

fn fresh_store() -> (Store<MemoryLocation, ManualClock>, ManualClock) {
    store_with(MemoryLocation::parse(BASE).unwrap())
}

fn persisted(store: &Store<MemoryLocation, ManualClock>) -> ChartState {
    let fragment = store.location().fragment().expect("fragment written");
    codec::decode(&fragment).expect("persisted token decodes")
}

fn recorder(
    store: &mut Store<MemoryLocation, ManualClock>,
) -> (Rc<RefCell<Vec<ChartState>>>, crate::store::Subscription) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let sub = store.subscribe(move |state| sink.borrow_mut().push(state.clone()));
    (seen, sub)
}

#[test]
fn init_without_fragment_uses_defaults() {
    let (store, _) = fresh_store();
    assert_eq!(store.get(), ChartState::default());
    assert_eq!(store.location().replacements(), 0);
}

#[test]
fn init_adopts_state_from_fragment() {
    let state = ChartState {
        title: "Roadmap".to_string(),
        scopes: vec![Scope {
            id: "abc123".to_string(),
            name: "Search".to_string(),
            position: 0.5,
        }],
    };
    let href = format!("{BASE}#{}", codec::encode(&state));
    let (store, _) = store_with(MemoryLocation::parse(&href).unwrap());
    assert_eq!(store.get().title, "Roadmap");
    assert_eq!(store.get_scope("abc123").map(|s| s.name), Some("Search".to_string()));
}

#[test]
fn init_with_unreadable_fragment_falls_back_to_defaults() {
    let (store, _) = store_with(MemoryLocation::parse(&format!("{BASE}#!!nope!!")).unwrap());
    assert_eq!(store.get(), ChartState::default());
}

#[test]
fn add_scope_trims_defaults_and_persists_immediately() {
    let (mut store, _) = fresh_store();
    let auth = store.add_scope("  Auth  ", None);
    assert_eq!(auth.name, "Auth");
    assert_eq!(auth.position, 0.0);

    let blank = store.add_scope("   ", Some(0.75));
    assert_eq!(blank.name, "New Scope");
    assert_eq!(blank.position, 0.75);

    let clamped = store.add_scope("Late", Some(4.0));
    assert_eq!(clamped.position, 1.0);

    assert_eq!(store.location().replacements(), 3);
    assert!(!store.has_pending_persist());
    assert_eq!(persisted(&store).scopes.len(), 3);
}

#[test]
fn add_scope_assigns_unique_ids() {
    let (mut store, _) = fresh_store();
    for i in 0..200 {
        store.add_scope(&format!("scope {i}"), None);
    }
    assert_eq!(store.get().duplicate_scope_id(), None);
}

#[test]
fn position_updates_are_debounced_and_coalesced() {
    let (mut store, clock) = fresh_store();
    let scope = store.add_scope("Drag me", None);
    assert_eq!(store.location().replacements(), 1);

    for i in 1..=10 {
        store.update_scope(&scope.id, ScopePatch::position(i as f64 / 10.0));
        clock.advance(Duration::from_millis(50));
        assert!(!store.poll(), "persisted inside the quiet window at step {i}");
    }
    assert_eq!(store.location().replacements(), 1);

    clock.advance(Duration::from_millis(250));
    assert!(store.poll());
    assert!(!store.poll());
    assert_eq!(store.location().replacements(), 2);
    assert_eq!(persisted(&store).scopes[0].position, 1.0);
}

#[test]
fn title_updates_are_debounced() {
    let (mut store, clock) = fresh_store();
    store.update(ChartPatch::title("Sprint 12"));
    assert_eq!(store.get().title, "Sprint 12");
    assert!(store.has_pending_persist());
    assert_eq!(store.location().replacements(), 0);

    clock.advance(Duration::from_millis(300));
    assert!(store.poll());
    assert_eq!(persisted(&store).title, "Sprint 12");
}

#[test]
fn immediate_persist_cancels_pending_debounce() {
    let (mut store, _) = fresh_store();
    store.update(ChartPatch::title("Typing..."));
    assert!(store.has_pending_persist());

    store.add_scope("Auth", None);
    assert!(!store.has_pending_persist());
    assert_eq!(store.location().replacements(), 1);
    assert_eq!(persisted(&store).title, "Typing...");
}

#[test]
fn update_scope_renames_but_ignores_blank_names() {
    let (mut store, _) = fresh_store();
    let scope = store.add_scope("Auth", Some(0.3));

    assert!(store.update_scope(&scope.id, ScopePatch::name("  ")));
    assert_eq!(store.get_scope(&scope.id).unwrap().name, "Auth");

    assert!(store.update_scope(&scope.id, ScopePatch::name(" Login ")));
    let renamed = store.get_scope(&scope.id).unwrap();
    assert_eq!(renamed.name, "Login");
    assert_eq!(renamed.position, 0.3);
}

#[test]
fn unknown_ids_are_silent_no_ops() {
    let (mut store, _) = fresh_store();
    store.add_scope("Auth", None);
    let before = store.get();

    assert!(!store.update_scope("missing", ScopePatch::position(0.9)));
    assert!(!store.remove_scope("missing"));
    assert_eq!(store.get(), before);
    assert_eq!(store.get_scope("missing"), None);
}

#[test]
fn removing_twice_is_idempotent() {
    let (mut store, _) = fresh_store();
    let a = store.add_scope("A", None);
    store.add_scope("B", None);

    assert!(store.remove_scope(&a.id));
    let after_first = store.get();
    assert!(!store.remove_scope(&a.id));
    assert_eq!(store.get(), after_first);
    assert_eq!(persisted(&store), after_first);
}

#[test]
fn every_mutation_notifies_each_subscriber_once() {
    let (mut store, _) = fresh_store();
    let (first, _) = recorder(&mut store);
    let (second, second_sub) = recorder(&mut store);

    let scope = store.add_scope("Auth", None);
    store.update_scope(&scope.id, ScopePatch::position(0.4));
    store.update(ChartPatch::title("Renamed"));
    store.remove_scope(&scope.id);

    assert_eq!(first.borrow().len(), 4);
    assert_eq!(second.borrow().len(), 4);
    assert_eq!(first.borrow()[0].scopes.len(), 1);
    assert_eq!(first.borrow()[1].scopes[0].position, 0.4);
    assert_eq!(first.borrow()[2].title, "Renamed");
    assert!(first.borrow()[3].scopes.is_empty());

    second_sub.unsubscribe();
    assert!(!second_sub.is_active());
    store.add_scope("Billing", None);
    assert_eq!(first.borrow().len(), 5);
    assert_eq!(second.borrow().len(), 4);
}

#[test]
fn snapshots_are_detached_from_live_state() {
    let (mut store, _) = fresh_store();
    let mut snapshot = store.get();
    snapshot.title = "edited copy".to_string();
    snapshot.scopes.push(Scope {
        id: "zzz".to_string(),
        name: "ghost".to_string(),
        position: 0.5,
    });
    assert_eq!(store.get(), ChartState::default());

    store.add_scope("real", None);
    assert_eq!(snapshot.scopes.len(), 1);
}

#[test]
fn shareable_url_flushes_pending_edits() {
    let (mut store, _) = fresh_store();
    store.update(ChartPatch::title("Share me"));
    let url = store.shareable_url();

    assert!(url.starts_with("https://example.com/hill/#"), "{url}");
    assert!(!store.has_pending_persist());
    let token = url.split_once('#').map(|(_, t)| t).unwrap();
    assert_eq!(codec::decode(token).unwrap().title, "Share me");

    // Retrying is harmless.
    assert_eq!(store.shareable_url(), url);
}

#[test]
fn navigation_adopts_changed_state_and_notifies() {
    let (mut store, _) = fresh_store();
    store.add_scope("Auth", Some(0.2));
    let (seen, _) = recorder(&mut store);

    let other = ChartState {
        title: "From history".to_string(),
        scopes: Vec::new(),
    };
    store.location_mut().navigate(Some(codec::encode(&other).as_str()));
    assert!(store.handle_navigation());
    assert_eq!(store.get(), other);
    assert_eq!(seen.borrow().len(), 1);

    // Same token again: nothing to do.
    assert!(!store.handle_navigation());
    assert_eq!(seen.borrow().len(), 1);

    store.location_mut().navigate(Some("garbage!!"));
    assert!(!store.handle_navigation());
    assert_eq!(store.get(), other);

    store.location_mut().navigate(None);
    assert!(!store.handle_navigation());
}

#[test]
fn navigation_drops_stale_pending_persist() {
    let (mut store, clock) = fresh_store();
    store.update(ChartPatch::title("stale edit"));

    let other = ChartState {
        title: "Newer".to_string(),
        scopes: Vec::new(),
    };
    let token = codec::encode(&other);
    store.location_mut().navigate(Some(token.as_str()));
    assert!(store.handle_navigation());
    assert!(!store.has_pending_persist());

    clock.advance(Duration::from_secs(1));
    assert!(!store.poll());
    assert_eq!(store.location().fragment().as_deref(), Some(token.as_str()));
}

#[test]
fn next_deadline_tracks_the_quiet_window() {
    let (mut store, clock) = fresh_store();
    assert_eq!(store.next_deadline(), None);
    let scope = store.add_scope("A", None);
    store.update_scope(&scope.id, ScopePatch::position(0.5));
    assert_eq!(
        store.next_deadline(),
        Some(clock.now() + Duration::from_millis(300))
    );
}

#[test]
fn shutdown_flushes_and_returns_location() {
    let (mut store, _) = fresh_store();
    let scope = store.add_scope("A", None);
    store.update_scope(&scope.id, ScopePatch::position(1.0));
    let location = store.shutdown();
    assert_eq!(location.replacements(), 2);
    let token = location.fragment().unwrap();
    assert_eq!(codec::decode(&token).unwrap().scopes[0].position, 1.0);
}

#[test]
fn drag_session_moves_only_the_active_scope() {
    let (mut store, clock) = fresh_store();
    let curve = HillCurve::default();
    let a = store.add_scope("A", Some(0.1));
    let b = store.add_scope("B", Some(0.9));

    let mut drag = DragSession::default();
    assert!(drag.start(a.id.clone()));
    assert!(!drag.start(b.id.clone()), "second drag must be ignored");
    assert_eq!(drag.active(), Some(a.id.as_str()));

    assert_eq!(drag.move_to(&mut store, &curve, 400.0, 800.0), Some(0.5));
    assert_eq!(drag.move_to(&mut store, &curve, -50.0, 800.0), Some(0.0));
    assert_eq!(drag.move_to(&mut store, &curve, 2000.0, 800.0), Some(1.0));
    assert_eq!(store.get_scope(&a.id).unwrap().position, 1.0);
    assert_eq!(store.get_scope(&b.id).unwrap().position, 0.9);

    assert_eq!(drag.end(), Some(a.id.clone()));
    assert!(!drag.is_dragging());
    assert_eq!(drag.move_to(&mut store, &curve, 40.0, 800.0), None);
    assert_eq!(store.get_scope(&a.id).unwrap().position, 1.0);

    // The last move's debounced persist still lands after release.
    clock.advance(Duration::from_millis(300));
    assert!(store.poll());
    assert_eq!(persisted(&store).scopes[0].position, 1.0);
}
