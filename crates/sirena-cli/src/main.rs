//! Sirena CLI - Call intake and dispatch monitoring
//!
//! Operator console for the Sirena API: take calls, review them, check
//! which destinations can be notified and send manual messages.

mod api;
mod config;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::{ColoredString, Colorize};
use dialoguer::{Confirm, Input, Password};
use tracing_subscriber::EnvFilter;

use sirena::domain::NON_MEDICAL_PRIORITY;
use sirena::{EmergencyType, LocationClass, Priority, TriageAnswers, TriageEvaluator};

use api::{Address, Caller, CreateCallRequest, ManualMessageRequest, SirenaClient, Triage};
use config::Config;

#[derive(Parser)]
#[command(name = "sirena")]
#[command(about = "Sirena CLI - Emergency call intake and dispatch", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Login and store API key
    Login {
        /// API key (will prompt if not provided)
        #[arg(short, long)]
        key: Option<String>,
    },

    /// Take a new emergency call
    Call(CallArgs),

    /// Show a call with its delivery attempts
    Show {
        /// Call number
        id: i64,
    },

    /// List recent calls
    List {
        /// Emergency type filter (medical, fire, security, civil_defense, other)
        #[arg(short = 't', long = "type")]
        emergency_type: Option<String>,
        /// Priority filter (red, yellow, green)
        #[arg(short, long)]
        priority: Option<String>,
        /// Max results
        #[arg(short, long, default_value = "20")]
        limit: u32,
    },

    /// Messaging endpoint and destination configuration
    Status,

    /// Send a test message to the messaging account itself
    Test,

    /// Send a manual message to any phone
    Message {
        /// Destination phone
        phone: String,
        /// Message text (will prompt if not provided)
        text: Option<String>,
        /// Message kind shown in the footer
        #[arg(short, long, default_value = "manual")]
        kind: String,
    },

    /// Set the operator name stamped on calls
    Operator {
        name: String,
    },

    /// Show current configuration
    Config,
}

#[derive(Args)]
struct CallArgs {
    /// Emergency type (medical/medica, fire/bomberos, security/seguridad, civil_defense/defensa, other/otros)
    #[arg(short = 't', long = "type")]
    emergency_type: String,
    /// Location (residence/domicilio, public_road/via_publica)
    #[arg(short, long)]
    location: String,
    #[arg(long)]
    street: Option<String>,
    #[arg(long)]
    number: Option<String>,
    /// Cross streets
    #[arg(long)]
    between: Option<String>,
    #[arg(long)]
    neighborhood: Option<String>,
    /// Caller first name
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    surname: Option<String>,
    /// Caller phone
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    national_id: Option<String>,
    #[arg(short, long)]
    observations: Option<String>,
    /// Escalate priority (red, yellow, green); never lowers the computed one
    #[arg(long)]
    priority: Option<String>,
    /// Medical only: conscious, breathing, no other finding (skips the questions)
    #[arg(long)]
    all_clear: bool,
    /// Submit without confirmation
    #[arg(short, long)]
    yes: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Login { key } => cmd_login(key).await,
        Commands::Call(args) => cmd_call(args).await,
        Commands::Show { id } => cmd_show(id).await,
        Commands::List {
            emergency_type,
            priority,
            limit,
        } => cmd_list(emergency_type, priority, limit).await,
        Commands::Status => cmd_status().await,
        Commands::Test => cmd_test().await,
        Commands::Message { phone, text, kind } => cmd_message(phone, text, kind).await,
        Commands::Operator { name } => cmd_operator(name),
        Commands::Config => cmd_config(),
    }
}

// ============================================
// Command Implementations
// ============================================

async fn cmd_login(key: Option<String>) -> Result<()> {
    let mut config = Config::load_file()?;

    let api_key = match key {
        Some(k) => k,
        None => Password::new()
            .with_prompt("API Key")
            .interact()
            .context("Failed to read API key")?,
    };

    let client = SirenaClient::new(&config.base_url, &api_key);
    print!("Testing connection... ");

    match client.health().await {
        Ok(true) => println!("{}", "OK".green()),
        _ => {
            println!("{}", "Failed".red());
            bail!("Could not reach Sirena API at {}", config.base_url);
        }
    }

    // /health is public, so check the key against a protected endpoint
    if let Err(e) = client.dispatch_status().await {
        bail!("API key rejected: {}", e);
    }

    config.api_key = Some(api_key);
    config.save()?;

    println!("{} API key saved to {:?}", "✓".green(), Config::config_path()?);

    if config.operator.is_none() {
        println!("\n{}", "Tip: set your operator name:".yellow());
        println!("  sirena operator \"<name>\"");
    }

    Ok(())
}

fn prompt_required(value: Option<String>, prompt: &str) -> Result<String> {
    match value.filter(|v| !v.trim().is_empty()) {
        Some(v) => Ok(v),
        None => Input::<String>::new()
            .with_prompt(prompt)
            .interact_text()
            .with_context(|| format!("Failed to read {}", prompt.to_lowercase())),
    }
}

fn ask(prompt: &str, default: bool) -> Result<bool> {
    Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()
        .context("Failed to read answer")
}

fn ask_triage() -> Result<TriageAnswers> {
    Ok(TriageAnswers {
        conscious: ask("Is the patient conscious?", true)?,
        breathing: ask("Is the patient breathing?", true)?,
        severe_bleeding: ask("Severe bleeding?", false)?,
        serious_base_pathology: ask("Serious underlying condition?", false)?,
        disability: ask("Disability?", false)?,
    })
}

async fn cmd_call(args: CallArgs) -> Result<()> {
    let config = Config::load()?;
    let api_key = config.require_api_key()?;

    let emergency_type: EmergencyType = args
        .emergency_type
        .parse()
        .map_err(anyhow::Error::msg)?;
    let location_class: LocationClass = args.location.parse().map_err(anyhow::Error::msg)?;
    let declared: Option<Priority> = args
        .priority
        .as_deref()
        .map(|p| p.parse::<Priority>())
        .transpose()
        .map_err(anyhow::Error::msg)?;

    let triage = if emergency_type.is_medical() {
        Some(if args.all_clear {
            TriageAnswers::all_clear()
        } else {
            ask_triage()?
        })
    } else {
        None
    };

    let street = prompt_required(args.street, "Street")?;
    let caller = Caller {
        name: prompt_required(args.name, "Caller name")?,
        surname: args.surname.unwrap_or_default(),
        phone: prompt_required(args.phone, "Caller phone")?,
        national_id: args.national_id,
    };

    // Same rule the server applies; shown so the operator can double-check
    let computed = triage
        .as_ref()
        .map(|answers| TriageEvaluator::new().evaluate(answers))
        .unwrap_or(NON_MEDICAL_PRIORITY);
    let expected = declared.map_or(computed, |d| computed.escalate(d));

    println!(
        "{} {} {} / {} → {}",
        emergency_type.emoji(),
        emergency_type.to_string().bold(),
        location_class.emoji(),
        location_class,
        priority_label(&expected.to_string())
    );
    if let Some(answers) = &triage {
        for signal in answers.critical_signals() {
            println!("  ⚠️  {}", signal.label().red());
        }
    }

    if !args.yes && !ask("Dispatch this call?", true)? {
        println!("Cancelled.");
        return Ok(());
    }

    let request = CreateCallRequest {
        emergency_type: emergency_type.to_string(),
        location_class: location_class.to_string(),
        triage: triage.map(|t| Triage {
            conscious: t.conscious,
            breathing: t.breathing,
            severe_bleeding: t.severe_bleeding,
            serious_base_pathology: t.serious_base_pathology,
            disability: t.disability,
        }),
        declared_priority: declared.map(|p| p.to_string()),
        caller,
        address: Address {
            street,
            number: args.number,
            between_streets: args.between,
            neighborhood: args.neighborhood,
        },
        observations: args.observations,
        operator: config.operator.clone(),
    };

    let client = SirenaClient::new(&config.base_url, api_key);
    let outcome = client.create_call(&request).await?;

    let state = if outcome.warnings.is_empty() {
        outcome.state.green()
    } else {
        outcome.state.yellow()
    };
    println!(
        "{} Call #{} {} → {} [{}]",
        "✓".green(),
        outcome.call.id.to_string().bold(),
        priority_label(&outcome.call.priority),
        outcome.call.primary_destination.cyan(),
        state
    );
    print_attempts(&outcome.call.attempts);

    for warning in &outcome.warnings {
        println!("  {} {} ({})", "!".yellow().bold(), warning.message.yellow(), warning.kind.dimmed());
    }

    Ok(())
}

async fn cmd_show(id: i64) -> Result<()> {
    let config = Config::load()?;
    let client = SirenaClient::new(&config.base_url, config.require_api_key()?);

    let call = client.get_call(id).await?;

    println!(
        "{} {} {}",
        format!("#{}", call.id).bold(),
        call.emergency_type.to_uppercase(),
        priority_label(&call.priority)
    );
    println!("  Time:        {}", call.timestamp.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("  Location:    {} ({})", call.address_text, call.location_class);
    println!(
        "  Caller:      {} {} 📞 {}",
        call.caller.name, call.caller.surname, call.caller.phone
    );
    if let Some(id) = &call.caller.national_id {
        println!("  National ID: {}", id);
    }
    if let Some(triage) = &call.triage {
        println!(
            "  Triage:      conscious={} breathing={} bleeding={} pathology={} disability={}",
            triage.conscious,
            triage.breathing,
            triage.severe_bleeding,
            triage.serious_base_pathology,
            triage.disability
        );
    }
    if let Some(obs) = &call.observations {
        println!("  Notes:       {}", obs);
    }
    println!("  Operator:    {}", call.operator.as_deref().unwrap_or("-"));
    println!("  Routed to:   {}", call.primary_destination.cyan());
    print_attempts(&call.attempts);

    Ok(())
}

async fn cmd_list(emergency_type: Option<String>, priority: Option<String>, limit: u32) -> Result<()> {
    let config = Config::load()?;
    let client = SirenaClient::new(&config.base_url, config.require_api_key()?);

    let calls = client
        .list_calls(emergency_type.as_deref(), priority.as_deref(), limit)
        .await?;

    if calls.is_empty() {
        println!("No calls found.");
        return Ok(());
    }

    println!("{}", "Calls:".bold());
    for call in calls {
        let delivered = call
            .attempts
            .iter()
            .filter(|a| a.outcome == "success")
            .count();
        println!(
            "  {} {} {} {} {} {}",
            format!("#{}", call.id).dimmed(),
            call.timestamp.format("%d/%m %H:%M"),
            priority_label(&call.priority),
            call.emergency_type.cyan(),
            truncate_string(&call.address_text, 40),
            format!("[{} delivered]", delivered).dimmed()
        );
    }

    Ok(())
}

async fn cmd_status() -> Result<()> {
    let config = Config::load()?;
    let client = SirenaClient::new(&config.base_url, config.require_api_key()?);

    let status = client.dispatch_status().await?;

    println!(
        "{} {}",
        "Endpoint:".bold(),
        if status.endpoint_ready {
            status.endpoint.green()
        } else {
            format!("{} (not configured)", status.endpoint).red()
        }
    );
    println!(
        "  Retries: {} attempts, {}ms per attempt, {}ms deadline",
        status.max_attempts, status.attempt_timeout_ms, status.dispatch_deadline_ms
    );

    println!("{}", "Destinations:".bold());
    for d in status.destinations {
        let mark = if d.configured { "✓".green() } else { "✗".red() };
        println!("  {} {} {}", mark, d.destination, d.config_key.dimmed());
    }

    Ok(())
}

async fn cmd_test() -> Result<()> {
    let config = Config::load()?;
    let client = SirenaClient::new(&config.base_url, config.require_api_key()?);

    print!("Sending test message... ");
    match client.send_test_message().await {
        Ok(sent) => {
            println!("{}", "OK".green());
            println!(
                "  🧪 {} via {} at {}",
                sent.to.cyan(),
                sent.endpoint,
                sent.sent_at.format("%H:%M:%S").to_string().dimmed()
            );
            Ok(())
        }
        Err(e) => {
            println!("{}", "Failed".red());
            Err(e)
        }
    }
}

async fn cmd_message(phone: String, text: Option<String>, kind: String) -> Result<()> {
    let config = Config::load()?;
    let client = SirenaClient::new(&config.base_url, config.require_api_key()?);

    let message = prompt_required(text, "Message")?;
    let sent = client
        .send_manual_message(&ManualMessageRequest {
            phone,
            message,
            kind: Some(kind),
        })
        .await?;

    println!("{} Message sent to {} via {}", "✓".green(), sent.to.cyan(), sent.endpoint);
    println!("{}", sent.text.dimmed());
    Ok(())
}

fn cmd_operator(name: String) -> Result<()> {
    let mut config = Config::load_file()?;
    config.operator = Some(name.clone());
    config.save()?;
    println!("{} Operator set to '{}'", "✓".green(), name);
    Ok(())
}

fn cmd_config() -> Result<()> {
    let config = Config::load()?;

    println!("{}", "Configuration:".bold());
    println!("  Path: {:?}", Config::config_path()?);
    println!("  Base URL: {}", config.base_url);
    println!(
        "  API Key: {}",
        if config.api_key.is_some() { "Set".green() } else { "Not set".red() }
    );
    println!(
        "  Operator: {}",
        config.operator.as_deref().unwrap_or("None").cyan()
    );

    Ok(())
}

fn print_attempts(attempts: &[api::DeliveryAttemptResponse]) {
    for a in attempts {
        let outcome = if a.outcome == "success" {
            a.outcome.green()
        } else {
            a.outcome.red()
        };
        println!(
            "  {} #{} {} {} {}",
            a.timestamp.format("%H:%M:%S").to_string().dimmed(),
            a.attempt_number,
            a.destination,
            outcome,
            a.error_detail.as_deref().unwrap_or("").dimmed()
        );
    }
}

fn priority_label(priority: &str) -> ColoredString {
    let label = priority.to_uppercase();
    match priority.parse::<Priority>() {
        Ok(Priority::Red) => format!("🔴 {}", label).red().bold(),
        Ok(Priority::Yellow) => format!("🟡 {}", label).yellow().bold(),
        Ok(Priority::Green) => format!("🟢 {}", label).green().bold(),
        Err(_) => label.normal(),
    }
}

/// Truncate string safely for UTF-8 (by char count, not bytes)
fn truncate_string(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        format!("{}...", s.chars().take(max_chars).collect::<String>())
    } else {
        s.to_string()
    }
}
