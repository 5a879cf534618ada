//! Order Lifecycle
//!
//! This demo drives an order from draft to delivery with an audit trail.
//!
//! Key concepts:
//! - Defining states, events and guarded transitions
//! - Hooks that veto a transition (payment without an address)
//! - Logging each transition through a transactional scope
//! - Reading the change log back
//!
//! Run with: RUST_LOG=debug cargo run --example order_lifecycle

use stillwater::validation::Validation;
use tracing_subscriber::EnvFilter;
use transition::changelog::{
    ChangeHistory, ChangeLogScope, MemoryChangeLog, MemoryTransaction, StateChangeLog,
};
use transition::core::{reference_key, Referable, ReferenceKeyError};
use transition::{impl_stater, StateMachine, TransitionError};

#[derive(Debug, Default)]
struct Order {
    id: u64,
    address: Option<String>,
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

fn order_machine() -> StateMachine<Order, MemoryTransaction> {
    let mut machine = StateMachine::new();
    machine.initial("draft");

    machine
        .state("paid")
        .enter(|order: &mut Order, _: Option<&mut MemoryTransaction>| {
            if order.address.is_none() {
                return Err("cannot pay for an order without a shipping address".into());
            }
            Ok(())
        });

    machine
        .state("delivered")
        .enter(|order: &mut Order, tx: Option<&mut MemoryTransaction>| {
            // hooks may write through the same scope as the change log
            if let Some(tx) = tx {
                tx.append(StateChangeLog::new(
                    "notifications",
                    order.id.to_string(),
                    "",
                    "sent",
                    "delivery confirmation",
                ))?;
            }
            Ok(())
        });

    machine.on("checkout", "checkout").from(["draft"]);
    machine.on("pay", "paid").from(["checkout"]);
    machine.on("ship", "shipped").from(["paid"]);
    machine.on("deliver", "delivered").from(["shipped"]);
    machine.on("cancel", "cancelled").from(["draft", "checkout"]);
    machine.on("cancel", "paid_cancelled").from(["paid"]);

    machine
}

fn run(
    machine: &StateMachine<Order, MemoryTransaction>,
    order: &mut Order,
    tx: &mut MemoryTransaction,
    event: &str,
    note: &str,
) {
    match machine.trigger(event, order, Some(tx), &[note]) {
        Ok(()) => println!("  {event:<8} -> {}", order.state),
        Err(err @ TransitionError::Hook { .. }) => println!("  {event:<8} vetoed: {err}"),
        Err(err) => println!("  {event:<8} failed: {err}"),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Order Lifecycle Demo ===\n");

    let machine = order_machine();
    if let Validation::Failure(issues) = machine.validate() {
        for issue in issues.iter() {
            println!("definition issue: {issue}");
        }
    }

    let log = MemoryChangeLog::new();
    let mut order = Order {
        id: 1001,
        ..Order::default()
    };

    let mut tx = log.begin_as("demo");
    run(&machine, &mut order, &mut tx, "checkout", "customer checked out");
    run(&machine, &mut order, &mut tx, "pay", "first attempt");
    order.address = Some("1 Harbour Road".to_string());
    run(&machine, &mut order, &mut tx, "pay", "card accepted");
    run(&machine, &mut order, &mut tx, "deliver", "skipping shipping");
    run(&machine, &mut order, &mut tx, "ship", "");
    run(&machine, &mut order, &mut tx, "deliver", "left at door");
    println!("\ncommitted {} records", tx.commit());

    println!(
        "\nPermitted from '{}': {:?}",
        order.state,
        machine.permitted_events(&order.state)
    );

    match ChangeHistory::load(&order, &log) {
        Ok(history) => {
            println!("\nPath: {}", history.path().join(" -> "));
            for record in history.records() {
                println!(
                    "  {} {:>10} -> {:<10} {}",
                    record.created_at.format("%H:%M:%S%.3f"),
                    record.from,
                    record.to,
                    record.note
                );
            }
        }
        Err(err) => println!("could not load history: {err}"),
    }

    println!("\n=== Demo Complete ===");
}
