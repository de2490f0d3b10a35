use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

use parcel_lifecycle::{
    aggregate_group_status, category_for_code, create_transition_span, format_status,
    generate_correlation_id, group_status_for, impact_for_code, init_telemetry, Classified,
    EntitySnapshot, ImpactLevel, Lifecycle, LifecycleConfig, PackageStatus, StatusCategory,
    StatusMetadata, TransitionRegistry, UnknownStatus,
};

#[derive(Parser)]
#[command(name = "parcel-lifecycle")]
#[command(about = "Inspect and check warehouse package and group status transitions")]
#[command(long_about = "parcel-lifecycle answers questions about the package and shipment-group \
                       status lifecycle: which changes are legal, who may perform them, and what \
                       each status means. Start with 'parcel-lifecycle next pending'.")]
struct Cli {
    /// Operate on shipment group statuses instead of package statuses
    #[arg(long, global = true)]
    group: bool,
    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,
    /// Configuration file (defaults to ./parcel-lifecycle.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Custom rule table replacing the built-in one for the selected status space
    #[arg(long, global = true)]
    rules: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a single status change
    Check {
        from: String,
        to: String,
        /// Role of the user performing the change
        #[arg(long)]
        role: String,
        /// Reason recorded with the change
        #[arg(long)]
        reason: Option<String>,
        /// Satisfied precondition (repeatable)
        #[arg(long = "condition")]
        conditions: Vec<String>,
    },
    /// List statuses reachable in one step
    Next { status: String },
    /// Show metadata and classification for a status
    Describe { status: String },
    /// Print the transition table
    Rules {
        /// Only rules leaving this status
        #[arg(long)]
        from: Option<String>,
    },
    /// Validate a target status for many entities at once
    Batch {
        #[arg(long)]
        target: String,
        #[arg(long)]
        role: String,
        /// Entities as ID=STATUS
        #[arg(required = true)]
        entities: Vec<String>,
    },
    /// Classify a raw status code, tolerating unknown values
    Classify { code: String },
    /// Group status implied by member package statuses
    GroupOf {
        #[arg(required = true)]
        statuses: Vec<String>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => LifecycleConfig::load_from(path)?,
        None => LifecycleConfig::load()?,
    };
    init_telemetry(&config.observability)?;

    let correlation_id = generate_correlation_id();
    let kind = if cli.group { "group" } else { "package" };
    let _span = create_transition_span("cli", kind, None, Some(&correlation_id)).entered();
    debug!("Command started");

    if let Some(rules) = &cli.rules {
        let path = rules.display().to_string();
        if cli.group {
            config.rules.group_rules_path = Some(path);
        } else {
            config.rules.package_rules_path = Some(path);
        }
    }

    if let Commands::GroupOf { statuses } = &cli.command {
        return group_of_command(statuses, cli.json);
    }

    if cli.group {
        let registry = config.group_registry()?;
        run(&*registry, cli.command, cli.json)
    } else {
        let registry = config.package_registry()?;
        run(&*registry, cli.command, cli.json)
    }
}

fn run<S: Classified>(
    registry: &TransitionRegistry<S>,
    command: Commands,
    json: bool,
) -> Result<()> {
    match command {
        Commands::Check {
            from,
            to,
            role,
            reason,
            conditions,
        } => {
            check_command(registry, &from, &to, &role, reason.as_deref(), &conditions, json)
        }
        Commands::Next { status } => next_command(registry, &status, json),
        Commands::Describe { status } => describe_command::<S>(&status, json),
        Commands::Rules { from } => rules_command(registry, from.as_deref(), json),
        Commands::Batch {
            target,
            role,
            entities,
        } => batch_command(registry, &target, &role, &entities, json),
        Commands::Classify { code } => classify_command::<S>(&code, json),
        Commands::GroupOf { statuses } => group_of_command(&statuses, json),
    }
}

fn parse_status<S: Lifecycle>(raw: &str) -> Result<S> {
    S::from_code(raw.trim()).ok_or_else(|| {
        UnknownStatus {
            kind: S::KIND,
            code: raw.to_string(),
        }
        .into()
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn check_command<S: Classified>(
    registry: &TransitionRegistry<S>,
    from: &str,
    to: &str,
    role: &str,
    reason: Option<&str>,
    conditions: &[String],
    json: bool,
) -> Result<()> {
    let from: S = parse_status(from)?;
    let to: S = parse_status(to)?;
    let satisfied: Vec<&str> = conditions.iter().map(String::as_str).collect();
    let result = registry.validate_transition(from, to, role, reason, &satisfied);

    if json {
        return print_json(&result);
    }

    if result.is_valid {
        println!("✅ {} → {} allowed for '{}'", from.label(), to.label(), role);
    } else {
        println!("❌ {} → {} rejected for '{}'", from.label(), to.label(), role);
    }
    for error in &result.errors {
        println!("   • {}", error);
    }
    for warning in &result.warnings {
        println!("   ⚠️  {}", warning);
    }
    if let Some(rule) = registry.rule(from, to) {
        println!();
        println!("📋 {}", rule.description);
        println!("   Roles: {}", rule.allowed_roles.join(", "));
        if !rule.conditions.is_empty() {
            println!("   Conditions: {}", rule.conditions.join(", "));
        }
    }
    Ok(())
}

fn next_command<S: Classified>(
    registry: &TransitionRegistry<S>,
    status: &str,
    json: bool,
) -> Result<()> {
    let status: S = parse_status(status)?;
    let next = registry.valid_next_statuses(status);

    if json {
        return print_json(&next);
    }

    if next.is_empty() {
        println!("🏁 {} is terminal; no further transitions", status.label());
        return Ok(());
    }
    println!("➡️  From {}:", status.label());
    for to in next {
        if let Some(rule) = registry.rule(status, to) {
            let mut flags = Vec::new();
            if rule.automatic {
                flags.push("auto");
            }
            if rule.requires_approval {
                flags.push("approval");
            }
            if rule.requires_reason {
                flags.push("reason");
            }
            let flags = if flags.is_empty() {
                String::new()
            } else {
                format!(" [{}]", flags.join(", "))
            };
            println!("   {} ({}){}", to.label(), to, flags);
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct StatusDescription<S> {
    status: S,
    #[serde(flatten)]
    metadata: StatusMetadata,
    category: StatusCategory,
    impact: ImpactLevel,
}

fn describe_command<S: Classified>(status: &str, json: bool) -> Result<()> {
    let status: S = parse_status(status)?;
    let description = StatusDescription {
        status,
        metadata: status.metadata(),
        category: status.category(),
        impact: status.impact(),
    };

    if json {
        return print_json(&description);
    }

    let meta = description.metadata;
    println!("📦 {} ({})", meta.label, status);
    println!("   {}", meta.description);
    println!("   Phase: {:?}  Colour: {:?}", meta.phase, meta.color);
    println!("   Category: {}  Impact: {}", description.category, description.impact);
    println!(
        "   Terminal: {}  Needs action: {}  Customer visible: {}",
        meta.terminal, meta.requires_action, meta.customer_visible
    );
    if let Some(hours) = meta.typical_duration_hours {
        println!("   Typical duration: {}h", hours);
    }
    Ok(())
}

fn rules_command<S: Classified>(
    registry: &TransitionRegistry<S>,
    from: Option<&str>,
    json: bool,
) -> Result<()> {
    let from: Option<S> = from.map(parse_status::<S>).transpose()?;
    let rules: Vec<_> = registry
        .rules()
        .filter(|rule| from.map_or(true, |f| rule.from == f))
        .collect();

    if json {
        return print_json(&rules);
    }

    println!("📋 {} {} transition rules", rules.len(), S::KIND);
    for rule in rules {
        println!(
            "   {} → {}: {} [{}]",
            rule.from,
            rule.to,
            rule.description,
            rule.allowed_roles.join(", ")
        );
    }
    Ok(())
}

fn batch_command<S: Classified>(
    registry: &TransitionRegistry<S>,
    target: &str,
    role: &str,
    entities: &[String],
    json: bool,
) -> Result<()> {
    let target: S = parse_status(target)?;
    let mut snapshots = Vec::with_capacity(entities.len());
    for raw in entities {
        let Some((id, status)) = raw.split_once('=') else {
            bail!("Expected ID=STATUS, got '{}'", raw);
        };
        let status: S = parse_status(status)
            .with_context(|| format!("Invalid status for entity '{}'", id))?;
        snapshots.push(EntitySnapshot::new(id, status));
    }

    let results = registry.validate_batch_transition(&snapshots, target, role);

    if json {
        return print_json(&results);
    }

    let ready = results.iter().filter(|r| r.validation.is_valid).count();
    println!("📦 {}/{} can move to {}", ready, results.len(), target.label());
    for result in &results {
        if result.validation.is_valid {
            println!("   ✅ {} ({})", result.entity_id, result.current_status);
        } else {
            println!(
                "   ❌ {} ({}): {}",
                result.entity_id,
                result.current_status,
                result.validation.errors.join("; ")
            );
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct Classification {
    code: String,
    label: String,
    category: StatusCategory,
    impact: ImpactLevel,
    known: bool,
}

fn classify_command<S: Classified>(code: &str, json: bool) -> Result<()> {
    let classification = Classification {
        code: code.to_string(),
        label: format_status::<S>(code),
        category: category_for_code::<S>(code),
        impact: impact_for_code::<S>(code),
        known: S::from_code(code).is_some(),
    };

    if json {
        return print_json(&classification);
    }

    let marker = if classification.known { "🏷️ " } else { "❓" };
    println!(
        "{} {}: {} / {} impact",
        marker, classification.label, classification.category, classification.impact
    );
    Ok(())
}

fn group_of_command(statuses: &[String], json: bool) -> Result<()> {
    let members = statuses
        .iter()
        .map(|raw| parse_status::<PackageStatus>(raw))
        .collect::<Result<Vec<_>>>()?;
    let aggregate = aggregate_group_status(&members);

    if json {
        let mapped: Vec<_> = members.iter().map(|s| (s, group_status_for(*s))).collect();
        return print_json(&serde_json::json!({
            "members": mapped,
            "group_status": aggregate,
        }));
    }

    for member in &members {
        println!("   {} → {}", member, group_status_for(*member));
    }
    match aggregate {
        Some(group) => println!("🚚 Group status: {} ({})", group.label(), group),
        None => println!("📭 No members"),
    }
    Ok(())
}
