//! **Hive Manager CLI**: `bee status` prints a situation report of the B.E.E.
//! agent; the other subcommands issue the same commands as the control panel.
//!
//! ## Usage
//!
//! ```text
//! bee                         full status report (default)
//! bee status | refresh        same
//! bee heartbeat               toggle the heartbeat, then print refreshed status
//! bee risk 7                  set risk tolerance (1..=10)
//! bee goals "a" "b" "c"       set the three directive goals
//! bee search project status   query EvermemOS
//! bee health                  liveness probe
//! bee meta show|save|patch    conversation metadata
//! ```
//!
//! The agent address comes from `--base-url`, `BEE_BASE_URL`, or config/bee.toml.

use bee_core::view;
use bee_core::{
    ConversationMetaDraft, HivePanel, MemoryQueryState, MetaOp, PanelConfig, StatusSnapshot,
};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "bee")]
#[command(about = "B.E.E. Hive Manager: status report and control for the agent", long_about = None)]
#[command(version)]
struct Cli {
    /// Agent base URL; overrides BEE_BASE_URL and the config file.
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Full status report (default)
    #[command(alias = "refresh")]
    Status,
    /// Toggle the heartbeat relative to the current status
    Heartbeat,
    /// Set risk tolerance
    Risk {
        #[arg(value_parser = clap::value_parser!(i64).range(1..=10))]
        value: i64,
    },
    /// Set the three directive goals
    Goals {
        first: String,
        second: String,
        third: String,
    },
    /// Semantic search over EvermemOS memories
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
        /// Results to request; defaults to the configured limit
        #[arg(short = 'n', long)]
        limit: Option<u32>,
    },
    /// Check that the agent answers
    Health,
    /// EvermemOS conversation metadata
    #[command(subcommand)]
    Meta(MetaCommand),
}

#[derive(Subcommand)]
enum MetaCommand {
    /// Print the stored metadata
    Show {
        /// Defaults to the agent's EvermemOS group
        #[arg(long)]
        group: Option<String>,
    },
    /// Replace the metadata record
    Save(MetaFields),
    /// Update only the given fields
    Patch(MetaFields),
}

#[derive(Args, Default)]
struct MetaFields {
    #[arg(long)]
    group: Option<String>,
    #[arg(long)]
    scene: Option<String>,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    scene_desc: Option<String>,
    #[arg(long)]
    timezone: Option<String>,
    /// Comma separated
    #[arg(long)]
    tags: Option<String>,
    /// JSON object
    #[arg(long)]
    user_details: Option<String>,
}

impl MetaFields {
    fn into_draft(self) -> ConversationMetaDraft {
        let mut draft = ConversationMetaDraft::default();
        let fields = [
            (self.group, &mut draft.group_id),
            (self.scene, &mut draft.scene),
            (self.name, &mut draft.name),
            (self.description, &mut draft.description),
            (self.scene_desc, &mut draft.scene_desc),
            (self.timezone, &mut draft.timezone),
            (self.tags, &mut draft.tags),
            (self.user_details, &mut draft.user_details),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
        draft
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Status);
    if let Err(e) = run(cli.base_url, command).await {
        eprintln!("bee: {}", e);
        std::process::exit(1);
    }
}

async fn run(base_url: Option<String>, command: Command) -> Result<(), String> {
    let mut config = PanelConfig::load().map_err(|e| format!("Config: {}", e))?;
    if let Some(url) = base_url {
        config.base_url = url.trim().trim_end_matches('/').to_string();
    }
    if let Command::Search { limit: Some(n), .. } = &command {
        config.search_result_limit = (*n).max(1);
    }
    let mut panel = HivePanel::connect(&config);

    match command {
        Command::Status => {
            let status = load_status(&mut panel, &config).await?;
            print_banner();
            render_status(&status);
            println!("  Run `bee status` at any time to refresh this report.");
            println!();
        }
        Command::Heartbeat => {
            load_status(&mut panel, &config).await?;
            let action = panel
                .toggle_heartbeat()
                .await
                .ok_or_else(|| unreachable_message(&config))?;
            println!("  Sent heartbeat {}.", action);
            println!();
            match panel.status.current() {
                Some(status) => render_status(&status),
                None => println!("  (status unavailable after toggle)"),
            }
        }
        Command::Risk { value } => {
            panel.status.drafts_mut().risk.set(value);
            panel
                .save_risk()
                .await
                .map_err(|e| format!("risk update failed: {}", e))?;
            println!("  Risk tolerance set to {}.", panel.status.drafts().risk.value());
        }
        Command::Goals { first, second, third } => {
            let goals = &mut panel.status.drafts_mut().goals;
            for (index, goal) in [first, second, third].into_iter().enumerate() {
                goals.set(index, goal);
            }
            panel
                .save_goals()
                .await
                .map_err(|e| format!("goal update failed: {}", e))?;
            println!("  Directive goals saved.");
        }
        Command::Search { query, .. } => {
            let query = query.join(" ");
            match panel.search.search(&query).await {
                MemoryQueryState::Success(results) if results.is_empty() => {
                    println!("  No memories matched \"{}\".", query.trim());
                }
                MemoryQueryState::Success(results) => render_memories(results),
                MemoryQueryState::Error(message) => return Err(message.clone()),
                MemoryQueryState::Idle | MemoryQueryState::Loading => {
                    return Err("empty query".to_string());
                }
            }
        }
        Command::Health => {
            let healthy = panel
                .health()
                .await
                .map_err(|e| format!("{} ({})", unreachable_message(&config), e))?;
            if !healthy {
                return Err(format!("agent at {} reported an unhealthy status", config.base_url));
            }
            println!("  ● Agent at {} is healthy.", config.base_url);
        }
        Command::Meta(meta) => run_meta(&mut panel, meta).await?,
    }
    Ok(())
}

async fn run_meta(panel: &mut HivePanel, command: MetaCommand) -> Result<(), String> {
    let (op, draft) = match command {
        MetaCommand::Show { group } => (
            MetaOp::Load,
            MetaFields {
                group,
                ..MetaFields::default()
            }
            .into_draft(),
        ),
        MetaCommand::Save(fields) => (MetaOp::Save, fields.into_draft()),
        MetaCommand::Patch(fields) => (MetaOp::Patch, fields.into_draft()),
    };
    *panel.meta.draft_mut() = draft;
    if panel.meta.draft().group_id.trim().is_empty() {
        panel.load().await;
    }

    let notice = panel
        .meta
        .run(op)
        .await
        .cloned()
        .ok_or_else(|| "conversation meta request was not sent".to_string())?;
    if notice.is_error() {
        return Err(notice.to_string());
    }
    if op == MetaOp::Load {
        render_meta(panel.meta.draft());
    }
    println!("  {}", notice);
    Ok(())
}

async fn load_status(
    panel: &mut HivePanel,
    config: &PanelConfig,
) -> Result<std::sync::Arc<StatusSnapshot>, String> {
    panel.load().await;
    panel
        .status
        .current()
        .ok_or_else(|| unreachable_message(config))
}

fn unreachable_message(config: &PanelConfig) -> String {
    format!(
        "agent unreachable at {}. Start it or set BEE_BASE_URL / --base-url.",
        config.base_url
    )
}

fn print_banner() {
    let now = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
    println!();
    println!("╔══════════════════════════════════════════════════════════════════════╗");
    println!("║   🐝  B.E.E. HIVE MANAGER v{}  —  Situation Report                  ║", VERSION);
    println!("║   {}                                          ║", now);
    println!("╚══════════════════════════════════════════════════════════════════════╝");
    println!();
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
                .collect::<Vec<_>>(),
        );
    table
}

fn render_status(status: &StatusSnapshot) {
    let status_ref = Some(status);

    println!("  ┌─ HEARTBEAT ─────────────────────────────────────────────────────┐");
    println!();
    let mut table = new_table(&["Property", "Value"]);
    let (state_color, state) = if status.heartbeat_running {
        (Color::Green, "● RUNNING")
    } else {
        (Color::DarkYellow, "○ PAUSED")
    };
    table.add_row(vec![Cell::new("State"), Cell::new(state).fg(state_color)]);
    table.add_row(vec![
        Cell::new("Interval"),
        Cell::new(format!("{}s", view::interval_label(status_ref))),
    ]);
    table.add_row(vec![
        Cell::new("Last tick"),
        Cell::new(view::last_tick_label(status_ref)),
    ]);
    table.add_row(vec![
        Cell::new("Risk tolerance"),
        Cell::new(format!("{} / 10", status.risk_tolerance)),
    ]);
    println!("{table}");
    println!(
        "  Toggle with `bee heartbeat` ({}).",
        view::heartbeat_verb(status_ref).to_lowercase()
    );
    println!();

    println!("  ┌─ EVERMEMOS ─ Long-term memory ──────────────────────────────────┐");
    println!();
    let mut table = new_table(&["Property", "Value"]);
    let pill_color = if status.evermem_enabled {
        Color::Green
    } else {
        Color::Red
    };
    table.add_row(vec![
        Cell::new("Status"),
        Cell::new(view::evermem_label(status_ref)).fg(pill_color),
    ]);
    table.add_row(vec![
        Cell::new("Endpoint"),
        Cell::new(view::endpoint_label(status_ref)),
    ]);
    table.add_row(vec![
        Cell::new("Group"),
        Cell::new(view::group_label(status_ref)),
    ]);
    println!("{table}");
    println!();

    println!("  ┌─ DIRECTIVE GOALS ───────────────────────────────────────────────┐");
    println!();
    let goals = &status.memory_goals.goals;
    if goals.is_empty() {
        println!("  (No goals set. Use `bee goals <g1> <g2> <g3>`.)");
    } else {
        let mut table = new_table(&["#", "Goal"]);
        for (i, goal) in goals.iter().enumerate() {
            table.add_row(vec![
                Cell::new(i + 1).set_alignment(CellAlignment::Right),
                Cell::new(goal),
            ]);
        }
        println!("{table}");
    }
    println!();

    println!("  ┌─ PERSONALITY ───────────────────────────────────────────────────┐");
    println!();
    println!("  {}", view::personality_label(status_ref));
    println!();
}

fn render_memories(results: &[bee_core::MemoryResult]) {
    let mut table = new_table(&["#", "Title", "Content", "Created"]);
    for (index, result) in results.iter().enumerate() {
        let (title, content, stamp) = view::memory_card(index, result);
        table.add_row(vec![
            Cell::new(index + 1).set_alignment(CellAlignment::Right),
            Cell::new(title).add_attribute(Attribute::Bold),
            Cell::new(content),
            Cell::new(stamp.unwrap_or_default()).fg(Color::DarkGrey),
        ]);
    }
    println!("{table}");
}

fn render_meta(draft: &ConversationMetaDraft) {
    let mut table = new_table(&["Field", "Value"]);
    for (field, value) in [
        ("Group ID", &draft.group_id),
        ("Scene", &draft.scene),
        ("Name", &draft.name),
        ("Description", &draft.description),
        ("Scene description", &draft.scene_desc),
        ("Timezone", &draft.timezone),
        ("Tags", &draft.tags),
        ("User details", &draft.user_details),
    ] {
        table.add_row(vec![Cell::new(field), Cell::new(value)]);
    }
    println!("{table}");
}
