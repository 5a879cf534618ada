//! Integration tests driving an order through its lifecycle.

use parking_lot::Mutex;
use std::sync::Arc;
use transition::changelog::{
    change_logs, last_state_change, ChangeHistory, ChangeLogConfig, MemoryChangeLog,
    MemoryTransaction,
};
use transition::core::{reference_key, HookPhase, HookResult, ReferenceKeyError};
use transition::{impl_stater, Referable, StateMachine, TransitionError};

#[derive(Debug, Default)]
struct Order {
    id: u64,
    address: String,
    state: String,
}

impl_stater!(Order, state);

impl Referable for Order {
    fn table_name(&self) -> Result<String, ReferenceKeyError> {
        Ok("orders".to_string())
    }

    fn reference_key(&self) -> Result<String, ReferenceKeyError> {
        reference_key(&[&self.id])
    }
}

type OrderMachine = StateMachine<Order, MemoryTransaction>;

fn order_machine() -> OrderMachine {
    let mut machine = OrderMachine::new();

    machine.initial("draft");
    machine.state("checkout");
    machine.state("paid");
    machine.state("processed");
    machine.state("delivered");
    machine.state("cancelled");
    machine.state("paid_cancelled");

    machine.event("checkout").to("checkout").from(["draft"]);
    machine.event("pay").to("paid").from(["checkout"]);

    machine
}

fn order(id: u64) -> Order {
    Order {
        id,
        ..Order::default()
    }
}

#[test]
fn state_transition_is_logged() {
    let machine = order_machine();
    let log = MemoryChangeLog::new();
    let mut order = order(1);

    let mut tx = log.begin();
    machine
        .trigger("checkout", &mut order, Some(&mut tx), &[])
        .unwrap();
    tx.commit();

    assert_eq!(order.state, "checkout");

    let logs = change_logs(&order, &log).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].refer_table, "orders");
    assert_eq!(logs[0].refer_id, "1");
    assert_eq!(logs[0].from, "draft");
    assert_eq!(logs[0].to, "checkout");
}

#[test]
fn last_state_change_returns_latest_transition() {
    let machine = order_machine();
    let log = MemoryChangeLog::new();
    let mut order = order(2);

    let mut tx = log.begin();
    machine
        .trigger("checkout", &mut order, Some(&mut tx), &["checkout note"])
        .unwrap();
    machine
        .trigger("pay", &mut order, Some(&mut tx), &["pay note"])
        .unwrap();
    tx.commit();

    assert_eq!(order.state, "paid");

    let logs = change_logs(&order, &log).unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!((logs[0].from.as_str(), logs[0].to.as_str()), ("draft", "checkout"));
    assert_eq!((logs[1].from.as_str(), logs[1].to.as_str()), ("checkout", "paid"));
    assert!(logs[0].created_at <= logs[1].created_at);

    let last = last_state_change(&order, &log).unwrap().unwrap();
    assert_eq!(last.to, "paid");
    assert_eq!(last.from, "checkout");
    assert_eq!(last.note, "pay note");

    let history = ChangeHistory::load(&order, &log).unwrap();
    assert_eq!(history.path(), vec!["draft", "checkout", "paid"]);
}

#[test]
fn unlogged_entity_has_no_last_change() {
    let log = MemoryChangeLog::new();
    assert!(last_state_change(&order(404), &log).unwrap().is_none());
}

#[test]
fn multiple_transitions_on_one_event() {
    let mut machine = order_machine();
    let cancel = machine.event("cancel");
    cancel.to("cancelled").from(["draft", "checkout"]);
    cancel.to("paid_cancelled").from(["paid", "processed"]);

    let mut unpaid = order(1);
    machine.trigger("cancel", &mut unpaid, None, &[]).unwrap();
    assert_eq!(unpaid.state, "cancelled");

    let mut drafted = order(2);
    drafted.state = "draft".to_string();
    machine.trigger("cancel", &mut drafted, None, &[]).unwrap();
    assert_eq!(drafted.state, "cancelled");

    let mut paid = order(3);
    paid.state = "paid".to_string();
    machine.trigger("cancel", &mut paid, None, &[]).unwrap();
    assert_eq!(paid.state, "paid_cancelled");
}

#[test]
fn state_callbacks_run_on_enter_and_exit() {
    const ENTER_ADDRESS: &str = "set when entering checkout";
    const EXIT_ADDRESS: &str = "set when leaving checkout";

    let mut machine = order_machine();
    machine
        .state("checkout")
        .enter(|order: &mut Order, _: Option<&mut MemoryTransaction>| {
            order.address = ENTER_ADDRESS.to_string();
            Ok(())
        })
        .exit(|order: &mut Order, _: Option<&mut MemoryTransaction>| {
            order.address = EXIT_ADDRESS.to_string();
            Ok(())
        });

    let mut order = order(1);
    machine.trigger("checkout", &mut order, None, &[]).unwrap();
    assert_eq!(order.address, ENTER_ADDRESS);

    machine.trigger("pay", &mut order, None, &[]).unwrap();
    assert_eq!(order.address, EXIT_ADDRESS);
}

#[test]
fn event_callbacks_see_state_around_change() {
    let seen = Arc::new(Mutex::new((String::new(), String::new())));
    let before = Arc::clone(&seen);
    let after = Arc::clone(&seen);

    let mut machine = OrderMachine::new();
    machine.initial("draft");
    machine
        .event("checkout")
        .to("checkout")
        .from(["draft"])
        .before(move |order: &mut Order, _: Option<&mut MemoryTransaction>| {
            before.lock().0 = order.state.clone();
            Ok(())
        })
        .after(move |order: &mut Order, _: Option<&mut MemoryTransaction>| {
            after.lock().1 = order.state.clone();
            Ok(())
        });

    let mut order = order(1);
    order.state = "draft".to_string();
    machine.trigger("checkout", &mut order, None, &[]).unwrap();

    let seen = seen.lock();
    assert_eq!(seen.0, "draft");
    assert_eq!(seen.1, "checkout");
}

#[test]
fn enter_hook_error_restores_state() {
    let mut machine = order_machine();
    machine
        .state("checkout")
        .enter(|_: &mut Order, _: Option<&mut MemoryTransaction>| {
            Err("intentional error".into())
        });

    let mut order = order(1);
    let err = machine
        .trigger("checkout", &mut order, None, &[])
        .unwrap_err();

    assert_eq!(err.hook_phase(), Some(HookPhase::Enter));
    assert_eq!(order.state, "draft");
}

#[test]
fn exit_hook_error_keeps_state() {
    let mut machine = order_machine();
    machine
        .state("checkout")
        .exit(|_: &mut Order, _: Option<&mut MemoryTransaction>| {
            Err("intentional error".into())
        });

    let mut order = order(1);
    machine.trigger("checkout", &mut order, None, &[]).unwrap();

    let err = machine.trigger("pay", &mut order, None, &[]).unwrap_err();
    assert_eq!(err.hook_phase(), Some(HookPhase::Exit));
    assert_eq!(order.state, "checkout");
}

#[test]
fn before_hook_error_keeps_state() {
    let mut machine = OrderMachine::new();
    machine.initial("draft");
    machine
        .on("checkout", "checkout")
        .from(["draft"])
        .before(|_: &mut Order, _: Option<&mut MemoryTransaction>| {
            Err("intentional error".into())
        });

    let mut order = order(1);
    let err = machine
        .trigger("checkout", &mut order, None, &[])
        .unwrap_err();

    assert_eq!(err.hook_phase(), Some(HookPhase::Before));
    assert_eq!(order.state, "draft");
}

#[test]
fn after_hook_error_restores_state() {
    let entered = Arc::new(Mutex::new(false));
    let flag = Arc::clone(&entered);

    let mut machine = OrderMachine::new();
    machine.initial("draft");
    machine
        .state("checkout")
        .enter(move |_: &mut Order, _: Option<&mut MemoryTransaction>| {
            *flag.lock() = true;
            Ok(())
        });
    machine
        .on("checkout", "checkout")
        .from(["draft"])
        .after(|_: &mut Order, _: Option<&mut MemoryTransaction>| {
            Err("intentional error".into())
        });

    let log = MemoryChangeLog::new();
    let mut tx = log.begin();
    let mut order = order(1);
    let err = machine
        .trigger("checkout", &mut order, Some(&mut tx), &[])
        .unwrap_err();

    assert!(*entered.lock());
    assert_eq!(err.hook_phase(), Some(HookPhase::After));
    assert_eq!(order.state, "draft");
    assert!(tx.pending().is_empty());
}

#[test]
fn failing_phase_stops_later_hooks() {
    let calls = Arc::new(Mutex::new(Vec::<&'static str>::new()));
    let mut machine = OrderMachine::new();
    machine.initial("draft");

    let exit = Arc::clone(&calls);
    machine
        .state("draft")
        .exit(move |_: &mut Order, _: Option<&mut MemoryTransaction>| {
            exit.lock().push("exit");
            Ok(())
        });
    let enter = Arc::clone(&calls);
    machine
        .state("checkout")
        .enter(move |_: &mut Order, _: Option<&mut MemoryTransaction>| {
            enter.lock().push("enter");
            Ok(())
        });

    let first = Arc::clone(&calls);
    let second = Arc::clone(&calls);
    let after = Arc::clone(&calls);
    machine
        .on("checkout", "checkout")
        .from(["draft"])
        .before(move |_: &mut Order, _: Option<&mut MemoryTransaction>| {
            first.lock().push("before-1");
            Err("rejected".into())
        })
        .before(move |_: &mut Order, _: Option<&mut MemoryTransaction>| {
            second.lock().push("before-2");
            Ok(())
        })
        .after(move |_: &mut Order, _: Option<&mut MemoryTransaction>| {
            after.lock().push("after");
            Ok(())
        });

    let mut order = order(1);
    assert!(machine.trigger("checkout", &mut order, None, &[]).is_err());
    assert_eq!(*calls.lock(), vec!["exit", "before-1"]);
    assert_eq!(order.state, "draft");
}

type Calls = Arc<Mutex<Vec<&'static str>>>;

/// Hook that records `label` and then succeeds or fails.
fn recording(
    calls: &Calls,
    label: &'static str,
    fails: bool,
) -> impl Fn(&mut Order, Option<&mut MemoryTransaction>) -> HookResult + Send + Sync + 'static {
    let calls = Arc::clone(calls);
    move |_: &mut Order, _: Option<&mut MemoryTransaction>| {
        calls.lock().push(label);
        if fails {
            Err(format!("{label} rejected").into())
        } else {
            Ok(())
        }
    }
}

fn fully_hooked_machine(calls: &Calls, failing: &'static str) -> OrderMachine {
    let mut machine = OrderMachine::new();
    machine.initial("draft");
    machine
        .state("draft")
        .exit(recording(calls, "exit", failing == "exit"))
        .exit(recording(calls, "exit2", failing == "exit2"));
    machine
        .state("checkout")
        .enter(recording(calls, "enter", failing == "enter"))
        .enter(recording(calls, "enter2", failing == "enter2"));
    machine
        .on("checkout", "checkout")
        .from(["draft"])
        .before(recording(calls, "before", failing == "before"))
        .after(recording(calls, "after", failing == "after"));
    machine
}

#[test]
fn failing_exit_hook_runs_no_later_hooks() {
    let calls = Calls::default();
    let machine = fully_hooked_machine(&calls, "exit");

    let log = MemoryChangeLog::new();
    let mut tx = log.begin();
    let mut order = order(1);
    let err = machine
        .trigger("checkout", &mut order, Some(&mut tx), &[])
        .unwrap_err();

    assert_eq!(err.hook_phase(), Some(HookPhase::Exit));
    assert_eq!(*calls.lock(), vec!["exit"]);
    assert_eq!(order.state, "draft");
    assert!(tx.pending().is_empty());
}

#[test]
fn failing_enter_hook_skips_remaining_enter_and_after_hooks() {
    let calls = Calls::default();
    let machine = fully_hooked_machine(&calls, "enter");

    let log = MemoryChangeLog::new();
    let mut tx = log.begin();
    let mut order = order(1);
    let err = machine
        .trigger("checkout", &mut order, Some(&mut tx), &[])
        .unwrap_err();

    assert_eq!(err.hook_phase(), Some(HookPhase::Enter));
    assert_eq!(*calls.lock(), vec!["exit", "exit2", "before", "enter"]);
    assert_eq!(order.state, "draft");
    assert!(tx.pending().is_empty());
}

#[test]
fn all_hooks_run_when_none_fail() {
    let calls = Calls::default();
    let machine = fully_hooked_machine(&calls, "");

    let mut order = order(1);
    machine.trigger("checkout", &mut order, None, &[]).unwrap();

    assert_eq!(
        *calls.lock(),
        vec!["exit", "exit2", "before", "enter", "enter2", "after"]
    );
    assert_eq!(order.state, "checkout");
}

#[test]
fn failed_trigger_still_sets_initial_state() {
    let machine = order_machine();
    let mut order = order(1);

    let err = machine.trigger("pay", &mut order, None, &[]).unwrap_err();
    assert!(matches!(err, TransitionError::NoMatchingTransition { .. }));
    assert_eq!(err.to_string(), "failed to perform event pay from state draft");
    assert_eq!(order.state, "draft");
}

#[test]
fn ambiguous_transitions_fail_without_change() {
    let mut machine = order_machine();
    machine.on("cancel", "cancelled").from(["draft", "checkout"]);
    machine.on("cancel", "voided");

    let mut order = order(1);
    order.state = "checkout".to_string();

    let err = machine.trigger("cancel", &mut order, None, &[]).unwrap_err();
    assert!(matches!(
        err,
        TransitionError::AmbiguousTransition { candidates: 2, .. }
    ));
    assert_eq!(err.to_string(), "failed to perform event cancel from state checkout");
    assert_eq!(order.state, "checkout");

    // a state only the wildcard accepts still resolves
    order.state = "paid".to_string();
    machine.trigger("cancel", &mut order, None, &[]).unwrap();
    assert_eq!(order.state, "voided");
}

#[test]
fn trigger_without_scope_writes_nothing() {
    let machine = order_machine();
    let log = MemoryChangeLog::new();
    let mut order = order(1);

    machine.trigger("checkout", &mut order, None, &["ignored"]).unwrap();
    machine.trigger("pay", &mut order, None, &[]).unwrap();

    assert_eq!(order.state, "paid");
    assert!(change_logs(&order, &log).unwrap().is_empty());
    assert!(log.is_empty());
}

#[test]
fn rolled_back_scope_drops_records() {
    let machine = order_machine();
    let log = MemoryChangeLog::new();
    let mut order = order(1);

    let mut tx = log.begin();
    machine
        .trigger("checkout", &mut order, Some(&mut tx), &[])
        .unwrap();
    tx.rollback();

    assert_eq!(order.state, "checkout");
    assert!(change_logs(&order, &log).unwrap().is_empty());
}

#[test]
fn oversized_note_surfaces_log_error_but_keeps_state() {
    let machine = order_machine();
    let log = MemoryChangeLog::with_config(ChangeLogConfig::default().with_note_limit(8));
    let mut order = order(1);

    let mut tx = log.begin();
    let err = machine
        .trigger("checkout", &mut order, Some(&mut tx), &["far too ", "long a note"])
        .unwrap_err();

    assert!(matches!(err, TransitionError::LogPersist { .. }));
    assert!(err.state_applied());
    assert_eq!(order.state, "checkout");
    assert!(tx.pending().is_empty());
}

#[test]
fn records_are_kept_per_entity() {
    let machine = order_machine();
    let log = MemoryChangeLog::new();
    let mut first = order(1);
    let mut second = order(2);

    let mut tx = log.begin();
    machine
        .trigger("checkout", &mut first, Some(&mut tx), &[])
        .unwrap();
    machine
        .trigger("checkout", &mut second, Some(&mut tx), &[])
        .unwrap();
    machine
        .trigger("pay", &mut second, Some(&mut tx), &[])
        .unwrap();
    tx.commit();

    assert_eq!(change_logs(&first, &log).unwrap().len(), 1);
    assert_eq!(change_logs(&second, &log).unwrap().len(), 2);
}

#[test]
fn shared_machine_serves_many_threads() {
    let machine = Arc::new(order_machine());
    let log = MemoryChangeLog::new();

    std::thread::scope(|s| {
        for id in 0..8u64 {
            let machine = Arc::clone(&machine);
            let log = log.clone();
            s.spawn(move || {
                let mut order = order(id);
                let mut tx = log.begin();
                machine
                    .trigger("checkout", &mut order, Some(&mut tx), &[])
                    .unwrap();
                machine
                    .trigger("pay", &mut order, Some(&mut tx), &[])
                    .unwrap();
                tx.commit();
                assert_eq!(order.state, "paid");
            });
        }
    });

    assert_eq!(log.len(), 16);
    for id in 0..8u64 {
        let last = last_state_change(&order(id), &log).unwrap().unwrap();
        assert_eq!(last.to, "paid");
    }
}
