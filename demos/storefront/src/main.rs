//! Storefront - shopbus example
//!
//! Plays back a scripted shopping session against a fully wired storefront:
//! 1. Steps dispatch cart actions or publish UI events
//! 2. The cart store diffs each committed transition
//! 3. Facades publish the derived events on the bus
//! 4. The notification center and analytics logger react
//! 5. Expiry timers fire on tokio and come back over a channel
//!
//! # Usage
//!
//! ```sh
//! # Run with defaults
//! cargo run -p storefront-demo
//!
//! # Only trace cart events, keep notifications on screen for a second
//! cargo run -p storefront-demo -- --events 'cart:*' --duration-ms 1000
//!
//! # More detail
//! RUST_LOG=debug cargo run -p storefront-demo
//! ```

mod catalog;
mod counter;
mod script;

use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use clap::Parser;
use shopbus::cart::CartStore;
use shopbus::config::{ConfigError, ShopConfig};
use shopbus::events::{ItemRemoved, RestoreRequested};
use shopbus::facades::{Notify, NotifyOptions};
use shopbus::notifications::{NotificationCenter, TokioExpiry};
use shopbus::storefront::Storefront;
use shopbus::{LogFilter, Subscription, SystemClock};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::catalog::product;
use crate::counter::CounterLogger;
use crate::script::{CounterStep, Step};

/// Storefront - shopbus example
#[derive(Parser, Debug)]
#[command(name = "storefront")]
#[command(about = "A scripted shopping session demonstrating shopbus patterns")]
struct Args {
    /// JSON config file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Override the default notification duration
    #[arg(long)]
    duration_ms: Option<u64>,

    /// Override the maximum number of visible notifications
    #[arg(long)]
    max_visible: Option<usize>,

    /// Comma-separated event patterns to trace (e.g. "cart:*,analytics:*")
    #[arg(long)]
    events: Option<String>,

    /// Comma-separated event patterns to leave out of the trace
    #[arg(long)]
    exclude_events: Option<String>,

    /// User id attached to analytics events
    #[arg(long)]
    user: Option<String>,

    /// Pause between scripted steps, in milliseconds
    #[arg(long, default_value = "400")]
    step_ms: u64,
}

impl Args {
    fn load_config(&self) -> Result<ShopConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => ShopConfig::load(path)?,
            None => ShopConfig::default(),
        };
        if let Some(ms) = self.duration_ms {
            config.notifications.default_duration_ms = ms;
        }
        if let Some(max) = self.max_visible {
            config.notifications.max_visible = max;
        }
        if self.events.is_some() || self.exclude_events.is_some() {
            config.logging.events =
                LogFilter::parse(self.events.as_deref(), self.exclude_events.as_deref());
        }
        if let Some(user) = &self.user {
            config.user_id = Some(user.clone());
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,shopbus=debug")),
        )
        .with_target(false)
        .init();

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    run(config, Duration::from_millis(args.step_ms)).await;
}

async fn run(config: ShopConfig, step_delay: Duration) {
    let (expiry, mut expiry_rx) = TokioExpiry::channel();
    let shop = Storefront::new(&config, expiry, Rc::new(SystemClock));
    let _undo = offer_undo(&shop);
    let mut counter = CounterLogger::new("Clicks", shop.ui.clone(), shop.analytics.clone());

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.cancel();
            }
        });
    }

    let mut steps = script::session().into_iter();
    let mut ticker = tokio::time::interval(step_delay);
    let mut script_done = false;

    loop {
        tokio::select! {
            Some(action) = expiry_rx.recv() => {
                shop.handle_expiry(action);
                if script_done && shop.notifications.is_empty() {
                    break;
                }
            }
            _ = ticker.tick(), if !script_done => {
                match steps.next() {
                    Some(step) => play(&shop, &mut counter, step),
                    None => {
                        script_done = true;
                        info!(
                            remaining = shop.notifications.len(),
                            "script finished, waiting for notifications to expire"
                        );
                        if shop.notifications.is_empty() {
                            break;
                        }
                    }
                }
            }
            _ = shutdown.cancelled() => {
                warn!("interrupted");
                break;
            }
        }
    }

    summary(&shop);
}

fn play(shop: &Storefront, counter: &mut CounterLogger, step: Step) {
    match step {
        Step::Cart(action) => {
            shop.cart.dispatch(action);
        }
        Step::Checkout => {
            shop.cart.checkout();
        }
        Step::PageView(page) => {
            shop.analytics.page_view(page, Some("Storefront"), None);
        }
        Step::Counter(CounterStep::Increment) => counter.increment(),
        Step::Counter(CounterStep::Decrement) => counter.decrement(),
        Step::Counter(CounterStep::Reset) => counter.reset(),
        Step::Counter(CounterStep::Relabel(label)) => counter.relabel(label),
        Step::Undo => undo_latest(&shop.notifications),
        Step::DemoNotification(kind) => demo_notification(shop, kind),
    }
    print_cart(&shop.cart);
}

/// Offer an "Undo" button after each removal
///
/// Pressing it publishes `cart:restore-requested`, which the storefront's
/// cart handles.
fn offer_undo(shop: &Storefront) -> Subscription {
    let notify = shop.notify.clone();
    shop.cart_events.on_item_removed(move |removed: &ItemRemoved| {
        let Some(p) = product(&removed.product_id) else {
            return;
        };
        notify.info_with(
            format!("Changed your mind about {}?", p.name),
            NotifyOptions::default().action(
                "Undo",
                RestoreRequested {
                    product_id: p.id.to_string(),
                    product_name: p.name.to_string(),
                    price: p.price,
                },
            ),
        );
    })
}

fn undo_latest(center: &NotificationCenter) {
    let latest = center
        .visible()
        .into_iter()
        .rev()
        .find(|n| n.action.is_some());
    match latest {
        Some(n) => {
            info!(id = %n.id, message = %n.message, "pressing undo");
            center.activate(n.id);
        }
        None => info!("nothing to undo"),
    }
}

fn demo_notification(shop: &Storefront, kind: &str) {
    let notify: &Notify = &shop.notify;
    match kind {
        "success" => notify.success("This is a success message!"),
        "error" => notify.error("This is an error message!"),
        "warning" => notify.warning("This is a warning message!"),
        _ => notify.info("This is an info message!"),
    };
    shop.analytics
        .user_action(&format!("demo_{kind}_clicked"), "demo", None, None);
}

fn print_cart(cart: &CartStore) {
    cart.with_state(|state| {
        let lines: Vec<_> = state
            .items()
            .iter()
            .map(|item| format!("{} x{}", item.name, item.quantity))
            .collect();
        println!(
            "  cart: [{}]  items={}  total=${:.2}",
            lines.join(", "),
            state.total_items(),
            state.total_price()
        );
    });
}

fn summary(shop: &Storefront) {
    println!();
    println!("Session summary");
    println!("  analytics events logged: {}", shop.analytics_logger.len());
    if let Some(traced) = shop.traced_events() {
        println!("  bus events traced:       {traced}");
    }
    if let Some(log) = shop.cart.action_log() {
        println!("  cart actions:");
        for entry in log.entries() {
            let outcome = match entry.state_changed {
                Some(true) => "changed",
                Some(false) => "no-op",
                None => "pending",
            };
            println!("    #{:<3} {:<16} {}", entry.sequence, entry.name, outcome);
        }
    }
    for n in shop.notifications.visible() {
        println!(
            "  still visible: [{}] {} (since {})",
            n.kind,
            n.message,
            n.created_at.format("%H:%M:%S")
        );
    }
}
