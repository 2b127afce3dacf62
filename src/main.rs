use std::str::FromStr;

use anyhow::Context;
use clap::{Parser, Subcommand};
use uuid::Uuid;

use stockroom_approvals::auth::{Session, UserRole};
use stockroom_approvals::client::ApprovalsClient;
use stockroom_approvals::config;
use stockroom_approvals::models::approval_history::ApprovalHistoryEntry;
use stockroom_approvals::models::purchase_order::{PurchaseOrder, PurchaseOrderStatus};
use stockroom_approvals::workflow::lead_time::LeadTimeMetrics;
use stockroom_approvals::workflow::timeline::{build_timeline, CheckpointState};
use stockroom_approvals::workflow::transitions::available_actions;

#[derive(Parser)]
#[command(
    name = "stockroom-po",
    about = "Purchase order approval workflow for the Stockroom inventory API",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List purchase orders, optionally filtered by status
    List {
        #[arg(long)]
        status: Option<PurchaseOrderStatus>,
    },
    /// Show one purchase order with its lead-time summary
    Show { id: Uuid },
    /// Render the five-step lifecycle timeline for one order
    Timeline { id: Uuid },
    /// Show the approval history for one order
    History { id: Uuid },
    /// Show the workflow actions available to the current role
    Actions { id: Uuid },
    /// Submit a draft order for approval
    Submit {
        id: Uuid,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Approve a pending order (admin only)
    Approve {
        id: Uuid,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Reject a pending order (admin only)
    Reject {
        id: Uuid,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Send an approved order to the vendor
    Send {
        id: Uuid,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Mark a sent order as delivered
    Deliver {
        id: Uuid,
        #[arg(long)]
        comment: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Every failure surfaces as a message; the render never panics.
    if let Err(err) = run().await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config().context("loading configuration")?;
    config::init_tracing(cfg.log_level(), cfg.log_json);

    let session = session_from_config(&cfg)?;
    let client = ApprovalsClient::new(&cfg)?;

    match cli.command {
        Commands::List { status } => {
            let mut orders = client.list_purchase_orders(&session).await?;
            if let Some(status) = status {
                orders.retain(|o| o.status == status);
            }
            if orders.is_empty() {
                println!("no purchase orders");
            }
            for order in &orders {
                println!(
                    "{}  [{}]  {}  {}",
                    order.po_number,
                    order.status.label(),
                    order.total_amount,
                    order.order_date.format("%b %d, %Y")
                );
            }
        }
        Commands::Show { id } => {
            let order = client.get_purchase_order(&session, id).await?;
            render_order(&order);
        }
        Commands::Timeline { id } => {
            let order = client.get_purchase_order(&session, id).await?;
            render_timeline(&order);
        }
        Commands::History { id } => {
            let entries = client.get_approval_history(&session, id).await?;
            if entries.is_empty() {
                println!("no approval history");
            }
            for entry in &entries {
                render_history_entry(entry);
            }
        }
        Commands::Actions { id } => {
            let order = client.get_purchase_order(&session, id).await?;
            let actions = available_actions(order.status, session.role);
            if actions.is_empty() {
                println!(
                    "no actions available for role '{}' on a '{}' order",
                    session.role,
                    order.status.label()
                );
            }
            for action in actions {
                println!("{action}");
            }
        }
        Commands::Submit { id, comment } => {
            let order = client
                .submit_for_approval(&session, id, comment.as_deref())
                .await?;
            println!("{} submitted for approval", order.po_number);
        }
        Commands::Approve { id, comment } => {
            let order = client.approve_order(&session, id, comment.as_deref()).await?;
            println!("{} approved", order.po_number);
        }
        Commands::Reject { id, comment } => {
            let order = client.reject_order(&session, id, comment.as_deref()).await?;
            println!("{} rejected", order.po_number);
        }
        Commands::Send { id, comment } => {
            let order = client.send_to_vendor(&session, id, comment.as_deref()).await?;
            println!("{} sent to vendor", order.po_number);
        }
        Commands::Deliver { id, comment } => {
            let order = client.mark_delivered(&session, id, comment.as_deref()).await?;
            println!("{} delivered", order.po_number);
        }
    }

    Ok(())
}

fn session_from_config(cfg: &config::AppConfig) -> anyhow::Result<Session> {
    let role = match cfg.role.as_deref() {
        Some(raw) => UserRole::from_str(raw)
            .with_context(|| format!("unknown role '{raw}' (expected admin, manager or viewer)"))?,
        None => UserRole::Viewer,
    };
    Ok(Session::new(
        cfg.user_id.unwrap_or_else(Uuid::new_v4),
        cfg.username.clone().unwrap_or_else(|| "anonymous".to_string()),
        role,
        cfg.auth_token.clone().unwrap_or_default(),
    ))
}

fn format_days(days: Option<i64>) -> String {
    match days {
        Some(d) => format!("{d}d"),
        None => "-".to_string(),
    }
}

fn render_order(order: &PurchaseOrder) {
    let metrics = LeadTimeMetrics::for_order(order);

    println!("{}  [{}]", order.po_number, order.status.label());
    println!("  total        {}", order.total_amount);
    println!("  ordered      {}", order.order_date.format("%b %d, %Y at %H:%M"));
    if let Some(comments) = &order.comments {
        println!("  comments     {comments}");
    }
    println!(
        "  lead times   approval {}  send {}  delivery {}  total {}",
        format_days(metrics.approval_days),
        format_days(metrics.send_days),
        format_days(metrics.delivery_days),
        format_days(metrics.total_days),
    );
    render_delivery_performance(order, &metrics);
}

fn render_delivery_performance(order: &PurchaseOrder, metrics: &LeadTimeMetrics) {
    if let Some(expected) = order.expected_delivery_date {
        println!("  expected     {}", expected.format("%b %d, %Y"));
    }
    if let Some(actual) = order.actual_delivery_date {
        println!("  actual       {}", actual.format("%b %d, %Y"));
    }
    if let Some(variance) = metrics.variance_days {
        let sign = if variance > 0 { "+" } else { "" };
        let verdict = if metrics.is_late() { "late" } else { "on time" };
        println!("  variance     {sign}{variance} days ({verdict})");
    }
}

fn render_timeline(order: &PurchaseOrder) {
    println!("Timeline for {}", order.po_number);
    for checkpoint in build_timeline(order) {
        let date = match (checkpoint.date, checkpoint.state) {
            (Some(date), _) => date.format("%b %d, %Y at %H:%M").to_string(),
            (None, CheckpointState::InProgress) => "now".to_string(),
            (None, _) => String::new(),
        };
        let days = checkpoint
            .days
            .map(|d| format!("  ({d} days)"))
            .unwrap_or_default();
        println!(
            "  {} {:<16} {}{}",
            checkpoint.state.glyph(),
            checkpoint.label,
            date,
            days
        );
    }
    render_delivery_performance(order, &LeadTimeMetrics::for_order(order));
}

fn render_history_entry(entry: &ApprovalHistoryEntry) {
    let actor = entry.username.as_deref().unwrap_or("unknown");
    let comments = entry
        .comments
        .as_deref()
        .map(|c| format!(": {c}"))
        .unwrap_or_default();
    println!(
        "  {}  {}  {}{}",
        entry.timestamp.format("%b %d, %Y at %H:%M"),
        actor,
        entry.badge(),
        comments
    );
}
