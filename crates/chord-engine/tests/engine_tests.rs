//! End-to-end tests for registry construction and chord matching.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use chord_engine::{action, Action, DeviceClass, Engine, KeyEvent, Modifiers, Registry};

const KBD: DeviceClass = DeviceClass::X11Keyboard;
const MOUSE: DeviceClass = DeviceClass::X11Mouse;

/// A counting action and its counter.
fn counter() -> (Action, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let c = count.clone();
    (
        action(move || {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }),
        count,
    )
}

/// An action that always fails.
fn failing() -> Action {
    action(|| Err(chord_engine::ActionError::new("player unreachable")))
}

fn press(engine: &mut Engine, device: DeviceClass, code: u32, mods: u16) {
    engine.handle(KeyEvent::press(device, code, mods));
}

fn release(engine: &mut Engine, device: DeviceClass, code: u32, mods: u16) {
    engine.handle(KeyEvent::release(device, code, mods));
}

#[test]
fn exact_primary_press_fires_action_once() {
    let mut reg = Registry::new();
    let (play, play_count) = counter();
    reg.register(KBD, 50, Modifiers::Only(0), None, play);

    let mut engine = Engine::new(reg);
    press(&mut engine, KBD, 50, 0);
    assert_eq!(play_count.load(Ordering::SeqCst), 1);
    assert_eq!(engine.active_count(), 1);

    release(&mut engine, KBD, 50, 0);
    assert_eq!(play_count.load(Ordering::SeqCst), 1);
    assert_eq!(engine.active_count(), 0);
}

#[test]
fn wildcard_matches_any_modifier_state() {
    let mut reg = Registry::new();
    let (a, count) = counter();
    reg.register(KBD, 60, Modifiers::Any, None, a);

    let mut engine = Engine::new(reg);
    press(&mut engine, KBD, 60, 0);
    release(&mut engine, KBD, 60, 0);
    press(&mut engine, KBD, 60, 5);
    release(&mut engine, KBD, 60, 5);
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[test]
fn registration_order_decides_overlapping_bindings() {
    // Specific first: state 4 hits the specific action, other states the
    // wildcard.
    let mut reg = Registry::new();
    let (specific, specific_count) = counter();
    let (wild, wild_count) = counter();
    reg.register(KBD, 60, Modifiers::Only(4), None, specific);
    reg.register(KBD, 60, Modifiers::Any, None, wild);

    let mut engine = Engine::new(reg);
    press(&mut engine, KBD, 60, 4);
    release(&mut engine, KBD, 60, 4);
    assert_eq!(specific_count.load(Ordering::SeqCst), 1);
    assert_eq!(wild_count.load(Ordering::SeqCst), 0);

    press(&mut engine, KBD, 60, 0);
    release(&mut engine, KBD, 60, 0);
    assert_eq!(specific_count.load(Ordering::SeqCst), 1);
    assert_eq!(wild_count.load(Ordering::SeqCst), 1);

    // Wildcard first: it shadows the later specific declaration entirely
    // (the registry reports the duplicate and keeps the first action).
    let mut reg = Registry::new();
    let (wild, wild_count) = counter();
    let (specific, specific_count) = counter();
    reg.register(KBD, 60, Modifiers::Any, None, wild);
    reg.register(KBD, 60, Modifiers::Only(4), None, specific);

    let mut engine = Engine::new(reg);
    press(&mut engine, KBD, 60, 4);
    release(&mut engine, KBD, 60, 4);
    assert_eq!(wild_count.load(Ordering::SeqCst), 1);
    assert_eq!(specific_count.load(Ordering::SeqCst), 0);
}

#[test]
fn subkey_without_parent_held_is_inert() {
    let mut reg = Registry::new();
    let (parent, _) = counter();
    let (sub, sub_count) = counter();
    reg.register(KBD, 50, Modifiers::Only(0), None, parent);
    reg.register(KBD, 50, Modifiers::Only(0), Some(51), sub);

    let mut engine = Engine::new(reg);
    press(&mut engine, KBD, 51, 0);
    release(&mut engine, KBD, 51, 0);
    assert_eq!(sub_count.load(Ordering::SeqCst), 0);

    press(&mut engine, KBD, 50, 0);
    press(&mut engine, KBD, 51, 0);
    assert_eq!(sub_count.load(Ordering::SeqCst), 1);
}

#[test]
fn symmetric_chord_pairs_resolve_independently() {
    // play = f1+f2, stop = f2+f1, declared independently.
    let mut reg = Registry::new();
    let (next, next_count) = counter();
    let (prev, prev_count) = counter();
    reg.register(KBD, 67, Modifiers::Only(0), Some(68), next);
    reg.register(KBD, 68, Modifiers::Only(0), Some(67), prev);

    let mut engine = Engine::new(reg);

    // Hold 67, press 68: only the "next" chord fires.
    press(&mut engine, KBD, 67, 0);
    press(&mut engine, KBD, 68, 0);
    assert_eq!(next_count.load(Ordering::SeqCst), 1);
    assert_eq!(prev_count.load(Ordering::SeqCst), 0);
    release(&mut engine, KBD, 68, 0);
    release(&mut engine, KBD, 67, 0);
    assert_eq!(engine.active_count(), 0);

    // And the reverse order fires only "prev".
    press(&mut engine, KBD, 68, 0);
    press(&mut engine, KBD, 67, 0);
    assert_eq!(next_count.load(Ordering::SeqCst), 1);
    assert_eq!(prev_count.load(Ordering::SeqCst), 1);
    release(&mut engine, KBD, 67, 0);
    release(&mut engine, KBD, 68, 0);
    assert_eq!(engine.active_count(), 0);
}

#[test]
fn release_disarms_subkeys() {
    let mut reg = Registry::new();
    let (parent, _) = counter();
    let (sub, sub_count) = counter();
    reg.register(KBD, 50, Modifiers::Only(0), None, parent);
    reg.register(KBD, 50, Modifiers::Only(0), Some(51), sub);

    let mut engine = Engine::new(reg);
    press(&mut engine, KBD, 50, 0);
    release(&mut engine, KBD, 50, 0);
    press(&mut engine, KBD, 51, 0);
    release(&mut engine, KBD, 51, 0);
    assert_eq!(sub_count.load(Ordering::SeqCst), 0);
}

#[test]
fn failing_action_does_not_stop_processing() {
    let mut reg = Registry::new();
    let (ok, ok_count) = counter();
    reg.register(KBD, 50, Modifiers::Only(0), None, failing());
    reg.register(KBD, 51, Modifiers::Only(0), None, ok);

    let mut engine = Engine::new(reg);
    press(&mut engine, KBD, 50, 0);
    release(&mut engine, KBD, 50, 0);
    press(&mut engine, KBD, 51, 0);
    assert_eq!(ok_count.load(Ordering::SeqCst), 1);
}

#[test]
fn second_primary_while_first_held_also_arms() {
    // Two unrelated primaries can be held at once; each contributes its
    // sub-bindings to the chord context.
    let mut reg = Registry::new();
    let (a, _) = counter();
    let (b, _) = counter();
    let (sub_a, sub_a_count) = counter();
    let (sub_b, sub_b_count) = counter();
    reg.register(KBD, 10, Modifiers::Only(0), None, a);
    reg.register(KBD, 20, Modifiers::Only(0), None, b);
    reg.register(KBD, 10, Modifiers::Only(0), Some(30), sub_a);
    reg.register(KBD, 20, Modifiers::Only(0), Some(31), sub_b);

    let mut engine = Engine::new(reg);
    press(&mut engine, KBD, 10, 0);
    press(&mut engine, KBD, 20, 0);
    assert_eq!(engine.active_count(), 2);

    press(&mut engine, KBD, 31, 0);
    assert_eq!(sub_b_count.load(Ordering::SeqCst), 1);
    press(&mut engine, KBD, 30, 0);
    assert_eq!(sub_a_count.load(Ordering::SeqCst), 1);

    release(&mut engine, KBD, 20, 0);
    press(&mut engine, KBD, 31, 0);
    assert_eq!(sub_b_count.load(Ordering::SeqCst), 1);
}

#[test]
fn mouse_and_keyboard_codes_do_not_collide() {
    let mut reg = Registry::new();
    let (kbd_act, kbd_count) = counter();
    let (mouse_act, mouse_count) = counter();
    reg.register(KBD, 3, Modifiers::Any, None, kbd_act);
    reg.register(MOUSE, 3, Modifiers::Any, None, mouse_act);

    let mut engine = Engine::new(reg);
    press(&mut engine, MOUSE, 3, 0);
    assert_eq!(kbd_count.load(Ordering::SeqCst), 0);
    assert_eq!(mouse_count.load(Ordering::SeqCst), 1);
}

#[test]
fn scenario_single_primary_lifecycle() {
    // register primary (kbd,50,0) -> play. Press fires once and arms; release
    // disarms.
    let mut reg = Registry::new();
    let (play, play_count) = counter();
    reg.register(KBD, 50, Modifiers::Only(0), None, play);

    let mut engine = Engine::new(reg);
    press(&mut engine, KBD, 50, 0);
    assert_eq!(play_count.load(Ordering::SeqCst), 1);
    assert_eq!(engine.active_count(), 1);
    release(&mut engine, KBD, 50, 0);
    assert_eq!(engine.active_count(), 0);
}

#[test]
fn scenario_symmetric_pair_without_primary_actions() {
    // primary (kbd,50,0) with sub (kbd,51,0) -> next, and primary (kbd,51,0)
    // with sub (kbd,50,0) -> prev; neither primary has a direct action.
    let mut reg = Registry::new();
    let (next, next_count) = counter();
    let (prev, prev_count) = counter();
    reg.register(KBD, 50, Modifiers::Only(0), Some(51), next);
    reg.register(KBD, 51, Modifiers::Only(0), Some(50), prev);

    let mut engine = Engine::new(reg);
    press(&mut engine, KBD, 50, 0);
    assert_eq!(engine.active_count(), 1);
    press(&mut engine, KBD, 51, 0);
    assert_eq!(next_count.load(Ordering::SeqCst), 1);
    // The sub press resolves as a chord completion, not a new held primary.
    assert_eq!(engine.active_count(), 1);
    release(&mut engine, KBD, 51, 0);
    release(&mut engine, KBD, 50, 0);
    assert_eq!(engine.active_count(), 0);
    assert_eq!(prev_count.load(Ordering::SeqCst), 0);
}
