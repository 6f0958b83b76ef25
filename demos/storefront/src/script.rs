//! The scripted shopping session the demo plays back

use shopbus::cart::CartAction;

use crate::catalog::product;

/// One simulated user interaction
#[derive(Debug, Clone)]
pub enum Step {
    Cart(CartAction),
    Checkout,
    PageView(&'static str),
    Counter(CounterStep),
    /// Press the action button of the newest notification that has one
    Undo,
    DemoNotification(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub enum CounterStep {
    Increment,
    Decrement,
    Reset,
    Relabel(&'static str),
}

fn add(id: &str) -> Step {
    match product(id) {
        Some(p) => Step::Cart(CartAction::add(p.id, p.name, p.price)),
        None => Step::Cart(CartAction::add(id, id, 0.0)),
    }
}

pub fn session() -> Vec<Step> {
    vec![
        Step::PageView("/"),
        add("1"),
        add("4"),
        add("4"),
        Step::Cart(CartAction::update_quantity("1", 3)),
        Step::Cart(CartAction::remove("4")),
        Step::Undo,
        Step::Counter(CounterStep::Increment),
        Step::Counter(CounterStep::Increment),
        Step::Counter(CounterStep::Relabel("Clicks (renamed)")),
        Step::Counter(CounterStep::Decrement),
        Step::DemoNotification("warning"),
        Step::Checkout,
        Step::Cart(CartAction::update_quantity("1", 0)),
        Step::Counter(CounterStep::Reset),
        add("6"),
        Step::Cart(CartAction::ClearCart),
    ]
}
