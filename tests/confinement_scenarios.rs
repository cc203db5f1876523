//! End-to-end confinement scenarios against the in-memory host.

mod common;

use common::*;
use nav_confine::*;
use std::cell::RefCell;
use std::rc::Rc;

const INSIDE: [&str; 4] = ["/flow/abc", "/flow/def", "/flow/123", "/flow/a-b?step=2"];
const OUTSIDE: [&str; 6] = ["/", "/settings", "/flow", "/flow/", "/flow/abc/detail", "/flows/abc"];

// ============================================================================
// In-app transitions
// ============================================================================

#[test]
fn test_leaving_the_flow_is_blocked() {
    let mut host = MemoryHistory::new("/flow/abc");
    let _controller = mount_flow(&mut host, true);

    let result = host.navigate("/settings");
    assert!(result.is_blocked());
    assert_visible(&host, "/flow/abc");
    assert_eq!(paths(&host), vec!["/flow/abc"]);
}

#[test]
fn test_moving_within_the_flow_is_allowed() {
    let mut host = MemoryHistory::new("/flow/abc");
    let controller = mount_flow(&mut host, true);

    let result = host.navigate("/flow/def");
    assert_eq!(
        result,
        NavigationResult::Success {
            path: "/flow/def".into()
        }
    );
    assert_visible(&host, "/flow/def");
    assert_eq!(controller.last_valid_location(), Some("/flow/def".into()));
}

#[test]
fn test_disabled_never_blocks() {
    let mut host = MemoryHistory::new("/flow/abc");
    let controller = mount_flow(&mut host, false);

    assert!(host.navigate("/settings").is_success());
    assert_visible(&host, "/settings");
    assert_eq!(controller.phase(host.current_path()), GuardPhase::Free);
}

#[test]
fn test_veto_holds_for_every_inside_outside_pair() {
    for from in INSIDE {
        for to in OUTSIDE {
            let mut host = MemoryHistory::new(from);
            let _controller = mount_flow(&mut host, true);
            assert!(host.navigate(to).is_blocked(), "{from} -> {to} should be blocked");
            assert!(host.redirect(to).is_blocked(), "{from} => {to} should be blocked");
            assert_visible(&host, from);
        }
        for to in INSIDE {
            let mut host = MemoryHistory::new(from);
            let _controller = mount_flow(&mut host, true);
            assert!(host.navigate(to).is_success(), "{from} -> {to} should be allowed");
        }
    }
}

#[test]
fn test_entering_the_flow_from_outside() {
    let mut host = MemoryHistory::new("/");
    let controller = mount_flow(&mut host, true);

    assert!(host.navigate("/settings").is_success());
    assert!(host.navigate("/flow/abc").is_success());
    assert_eq!(controller.phase(host.current_path()), GuardPhase::ConfinedValid);
    assert!(host.navigate("/").is_blocked());
}

#[test]
fn test_application_guards_run_after_the_veto() {
    let mut host = MemoryHistory::new("/flow/abc");
    let _controller = mount_flow(&mut host, true);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let _audit = host.install_guard(Rc::new(guard_fn(move |request: &NavigationRequest| {
        sink.borrow_mut().push(request.to.to_string());
        NavigationAction::Continue
    })));

    host.navigate("/settings");
    host.navigate("/flow/def");
    assert_eq!(*seen.borrow(), vec!["/flow/def".to_string()]);
}

// ============================================================================
// Out-of-band navigation
// ============================================================================

#[test]
fn test_native_back_out_of_flow_is_replaced() {
    let mut host = history(&["/", "/flow/abc"], 1);
    let controller = mount_flow(&mut host, true);

    host.back();
    assert_visible(&host, "/flow/abc");
    assert_eq!(paths(&host), vec!["/flow/abc", "/flow/abc"]);
    assert_eq!(
        controller.state(),
        GuardState {
            enabled: true,
            last_valid_location: Some("/flow/abc".into()),
            pending_target: None,
        }
    );
}

#[test]
fn test_repeated_back_attempts_do_not_grow_history() {
    let mut host = history(&["/", "/home", "/settings", "/flow/abc"], 3);
    let _controller = mount_flow(&mut host, true);

    for _ in 0..3 {
        host.back();
        assert_visible(&host, "/flow/abc");
        assert_eq!(host.entries().len(), 4);
    }
    assert_eq!(
        paths(&host),
        vec!["/flow/abc", "/flow/abc", "/flow/abc", "/flow/abc"]
    );
    assert!(!host.can_go_back());
}

#[test]
fn test_native_back_within_flow_is_accepted() {
    let mut host = history(&["/flow/abc", "/flow/def"], 1);
    let controller = mount_flow(&mut host, true);

    host.back();
    assert_visible(&host, "/flow/abc");
    assert_eq!(controller.last_valid_location(), Some("/flow/abc".into()));
    host.forward();
    assert_visible(&host, "/flow/def");
}

#[test]
fn test_edited_address_is_replaced() {
    let mut host = MemoryHistory::new("/flow/abc");
    let _controller = mount_flow(&mut host, true);

    host.external_push("/admin");
    assert_visible(&host, "/flow/abc");
    assert_eq!(paths(&host), vec!["/flow/abc", "/flow/abc"]);
}

#[test]
fn test_boot_outside_steps_back_on_invalid_forward() {
    let mut host = history(&["/settings", "/other"], 0);
    let controller = mount_flow(&mut host, true);
    assert_eq!(controller.last_valid_location(), None);

    host.forward();
    assert_visible(&host, "/settings");
    assert_eq!(host.entries().len(), 2);
    assert_eq!(controller.state().pending_target, None);
}

#[test]
fn test_fixed_fallback_replaces_when_nothing_valid_seen() {
    let mut host = history(&["/settings", "/other"], 0);
    let config = ConfinementConfig::new(FLOW).fallback(FallbackStrategy::Replace("/flow/start".into()));
    let controller = mount_with(&mut host, &config);

    host.forward();
    assert_visible(&host, "/flow/start");
    assert_eq!(controller.last_valid_location(), Some("/flow/start".into()));
}

#[test]
fn test_disabled_accepts_native_navigation() {
    let mut host = history(&["/", "/flow/abc"], 1);
    let _controller = mount_flow(&mut host, false);

    host.back();
    assert_visible(&host, "/");
}

// ============================================================================
// Degraded hosts, safety net, teardown
// ============================================================================

#[test]
fn test_headless_host_passes_everything_through() {
    let mut host = MemoryHistory::headless("/flow/abc");
    let controller = mount_flow(&mut host, true);

    assert!(!controller.is_available());
    assert_eq!(controller.phase(host.current_path()), GuardPhase::Unavailable);
    assert!(host.navigate("/settings").is_success());
    host.back();
    assert_visible(&host, "/flow/abc");
}

#[test]
fn test_safety_net_repairs_direct_stack_writes() {
    let mut host = MemoryHistory::new("/flow/abc");
    let controller = mount_flow(&mut host, true);

    HistoryHost::push(&mut host, Location::from("/settings"));
    assert_eq!(controller.phase(host.current_path()), GuardPhase::ConfinedInvalid);

    let correction = controller.reconcile(&mut host);
    assert_eq!(correction, Correction::Replace("/flow/abc".into()));
    assert_visible(&host, "/flow/abc");
    assert_eq!(controller.phase(host.current_path()), GuardPhase::ConfinedValid);
}

#[test]
fn test_safety_net_targets_newest_valid_location() {
    let mut host = MemoryHistory::new("/flow/abc");
    let controller = mount_flow(&mut host, true);

    let sentinel = controller.sentinel();
    sentinel.reconcile(&HistoryEvent::native("/settings"));
    host.navigate("/flow/def");
    host.navigate("/flow/ghi");

    HistoryHost::replace(&mut host, Location::from("/escape"));
    controller.reconcile(&mut host);
    assert_visible(&host, "/flow/ghi");
}

#[test]
fn test_step_back_outside_dispatch_keeps_tracker_current() {
    let mut host = history(&["/x", "/flow/b", "/flow/c"], 2);
    let controller = mount_flow(&mut host, true);

    assert!(HistoryHost::go_back(&mut host, 1));
    assert_visible(&host, "/flow/b");
    assert_eq!(controller.last_valid_location(), Some("/flow/b".into()));

    // A step-back echo is never corrected by the sentinel; the safety net
    // repairs it to the location the tracker just recorded.
    assert!(HistoryHost::go_back(&mut host, 1));
    assert_visible(&host, "/x");
    assert_eq!(controller.phase(host.current_path()), GuardPhase::ConfinedInvalid);
    controller.reconcile(&mut host);
    assert_visible(&host, "/flow/b");
    assert_eq!(paths(&host), vec!["/flow/b", "/flow/b", "/flow/c"]);
}

#[test]
fn test_unmount_releases_every_subscription() {
    let mut host = history(&["/", "/flow/abc"], 1);
    let controller = mount_flow(&mut host, true);
    controller.unmount();

    host.back();
    assert_visible(&host, "/");
    host.forward();
    assert!(host.navigate("/settings").is_success());
}

#[test]
fn test_remount_replaces_previous_guard() {
    let mut host = MemoryHistory::new("/flow/abc");
    let first = mount_flow(&mut host, true);
    drop(first);
    let _second = mount_flow(&mut host, false);

    assert!(host.navigate("/settings").is_success());
}

#[test]
fn test_nested_subtree_pattern() {
    let mut host = MemoryHistory::new("/flow/abc");
    let _controller = mount_with(
        &mut host,
        &ConfinementConfig::new(ConfinementPattern::nested_subtree("/flow")),
    );

    assert!(host.navigate("/flow/abc/detail").is_success());
    assert!(host.navigate("/flow").is_blocked());
    assert_visible(&host, "/flow/abc/detail");
}

#[test]
fn test_regex_pattern() {
    let mut host = MemoryHistory::new("/flow/42");
    let config = ConfinementConfig::parse(r"^/flow/\d+$").expect("regex compiles");
    let _controller = mount_with(&mut host, &config);

    assert!(host.navigate("/flow/43").is_success());
    assert!(host.navigate("/flow/abc").is_blocked());
}

#[test]
fn test_malformed_patterns_fail_fast() {
    let mut host = MemoryHistory::new("/flow/abc");
    for pattern in ["/flow/{*rest}/tail", "^/flow/("] {
        let config = ConfinementConfig::parse(pattern).expect("pattern parses");
        assert!(GuardController::mount(&config, &mut host).is_err(), "{pattern}");
    }
    assert!(host.navigate("/settings").is_success());
}
