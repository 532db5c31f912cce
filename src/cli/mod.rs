//! Command-line front end: `turbocash_cli <command> [args]`.

mod report;

use std::{fs, io::Write, sync::Arc};

use chrono::NaiveDate;
use turbocash_core::{Clock, FixedClock, SystemClock, UserStore};
use turbocash_domain::{dates::parse_date, Budget, BudgetPeriod, UserProfile};
use turbocash_storage_json::{JsonUserStore, StoragePaths};

use crate::{
    config::{self, Config, ConfigManager},
    errors::CashError,
    session::UserSession,
    utils::{build_info, paths},
    Result,
};

pub use report::{display_currency, render_report, render_report_json, RiskReport};

/// Entry point used by the `turbocash_cli` binary.
pub fn run_cli() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let manager = config::default_manager()?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(&args, &manager, &mut out)
}

/// Dispatches one command, writing its output to `out`.
pub fn run<W: Write>(args: &[String], manager: &ConfigManager, out: &mut W) -> Result<()> {
    let config = &manager.load()?;
    if !config.ui_color_enabled {
        colored::control::set_override(false);
    }

    let Some((command, rest)) = args.split_first() else {
        print_usage(out)?;
        return Ok(());
    };

    match command.as_str() {
        "report" => {
            let request = parse_report_args(rest)?;
            let user = request
                .user
                .or_else(|| config.last_user.clone())
                .ok_or_else(|| usage(REPORT_USAGE))?;
            let clock: Arc<dyn Clock> = match request.as_of {
                Some(date) => Arc::new(FixedClock::on(date)),
                None => Arc::new(SystemClock),
            };
            let store = open_store(config)?.with_clock(Arc::clone(&clock));
            let session = UserSession::open_with_clock(Box::new(store), clock, &user)?;
            if request.json {
                render_report_json(&session, config, out)?;
            } else {
                render_report(&session, config, out)?;
            }
            remember_user(manager, &user)?;
        }
        "create" => {
            let [user, email] = rest else {
                return Err(usage("create <user-id> <email>"));
            };
            let clock: Arc<dyn Clock> = Arc::new(SystemClock);
            let store = open_store(config)?.with_clock(Arc::clone(&clock));
            let mut profile = UserProfile::new(user.as_str(), email.as_str(), clock.now());
            profile.currency = Some(config.currency.clone());
            UserSession::create(Box::new(store), clock, profile)?;
            remember_user(manager, user)?;
            writeln!(out, "Created {user} ({})", config.currency)?;
        }
        "add-budget" => {
            let (user, category, amount, period) = parse_budget_args(rest, config)?;
            let store = open_store(config)?;
            let mut session = UserSession::open(Box::new(store), &user)?;
            let today = session.today();
            let id = session.add_budget(Budget::new(category, amount, period.clone(), today))?;
            writeln!(out, "Added {} budget {id} for {user}", period.as_str())?;
        }
        "export" => {
            let user = single_user(rest, "export <user-id>")?;
            let json = open_store(config)?.export_user(&user)?;
            writeln!(out, "{json}")?;
        }
        "import" => {
            let [user, file] = rest else {
                return Err(usage("import <user-id> <file>"));
            };
            let raw = fs::read_to_string(file)?;
            let loaded = open_store(config)?.import_user(user, &raw)?;
            writeln!(
                out,
                "Imported {user}: {} transactions, {} budgets",
                loaded.data.transactions.len(),
                loaded.data.budgets.len()
            )?;
            for note in &loaded.migrations {
                writeln!(out, "  upgraded: {note}")?;
            }
        }
        "backups" => {
            let user = single_user(rest, "backups <user-id>")?;
            let backups = open_store(config)?.list_backups(&user)?;
            if backups.is_empty() {
                writeln!(out, "No backups for {user}.")?;
            }
            for backup in backups {
                let created = backup
                    .created_at
                    .map(|stamp| stamp.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| "unknown".into());
                writeln!(out, "{}  {}  {} bytes", backup.id, created, backup.size_bytes)?;
            }
        }
        "restore" => {
            let [user, backup] = rest else {
                return Err(usage("restore <user-id> <backup-id>"));
            };
            let data = open_store(config)?.restore_backup(user, backup)?;
            writeln!(
                out,
                "Restored {user} from {backup} ({} budgets)",
                data.budgets.len()
            )?;
        }
        "info" => {
            let user = single_user(rest, "info <user-id>")?;
            let info = open_store(config)?.storage_info(&user)?;
            writeln!(out, "Path: {}", info.path.display())?;
            if info.exists {
                writeln!(out, "Size: {} bytes", info.size_bytes)?;
                if let Some(modified) = info.last_modified {
                    writeln!(out, "Modified: {}", modified.format("%Y-%m-%d %H:%M"))?;
                }
            } else {
                writeln!(out, "No stored document.")?;
            }
            writeln!(out, "Backups: {}", info.backup_count)?;
        }
        "users" => {
            for user in open_store(config)?.list_users()? {
                writeln!(out, "{user}")?;
            }
        }
        "config" => run_config(rest, manager, out)?,
        "version" => {
            writeln!(out, "{}", build_info::current().summary())?;
        }
        "help" | "--help" | "-h" => print_usage(out)?,
        other => {
            return Err(CashError::Usage(format!(
                "unknown command `{other}`; run `turbocash_cli help`"
            )))
        }
    }
    Ok(())
}

fn run_config<W: Write>(args: &[String], manager: &ConfigManager, out: &mut W) -> Result<()> {
    match args {
        [] => {
            let config = manager.load()?;
            writeln!(out, "{}", serde_json::to_string_pretty(&config)?)?;
        }
        [action, key, value] if action == "set" => {
            let updated = manager.update(|config| config.set(key, value))?;
            tracing::info!(key = %key, "configuration updated");
            writeln!(out, "Saved {key}; data root is {}", paths::data_root(&updated).display())?;
        }
        [action] if action == "backups" => {
            let backups = manager.list_backups()?;
            if backups.is_empty() {
                writeln!(out, "No configuration backups.")?;
            }
            for backup in backups {
                writeln!(out, "{}", backup.name)?;
            }
        }
        [action, name] if action == "restore" => {
            manager.restore(name)?;
            writeln!(out, "Configuration restored from {name}")?;
        }
        _ => return Err(usage("config [set <key> <value> | backups | restore <backup>]")),
    }
    Ok(())
}

fn open_store(config: &Config) -> Result<JsonUserStore> {
    let root = paths::data_root(config);
    tracing::debug!(root = %root.display(), "opening user store");
    Ok(JsonUserStore::with_retention(
        StoragePaths::under(root),
        config.backup_retention,
    )?)
}

const REPORT_USAGE: &str = "report [user-id] [--as-of YYYY-MM-DD] [--json]";

/// Options of the `report` command.
#[derive(Debug, Default, PartialEq)]
struct ReportArgs {
    user: Option<String>,
    as_of: Option<NaiveDate>,
    json: bool,
}

fn parse_report_args(args: &[String]) -> Result<ReportArgs> {
    let mut parsed = ReportArgs::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--as-of" => {
                let date = iter.next().ok_or_else(|| usage(REPORT_USAGE))?;
                let day = parse_date(date)
                    .ok_or_else(|| CashError::Usage(format!("invalid date `{date}`")))?;
                parsed.as_of = Some(day);
            }
            "--json" => parsed.json = true,
            flag if flag.starts_with("--") => return Err(usage(REPORT_USAGE)),
            user if parsed.user.is_none() => parsed.user = Some(user.to_string()),
            _ => return Err(usage(REPORT_USAGE)),
        }
    }
    Ok(parsed)
}

fn parse_budget_args(
    args: &[String],
    config: &Config,
) -> Result<(String, String, f64, BudgetPeriod)> {
    const USAGE: &str = "add-budget <user-id> <category> <amount> [weekly|monthly|yearly]";
    let (user, category, amount, period) = match args {
        [user, category, amount] => (user, category, amount, config.default_budget_period.as_str()),
        [user, category, amount, period] => (user, category, amount, period.as_str()),
        _ => return Err(usage(USAGE)),
    };
    let amount: f64 = amount
        .parse()
        .map_err(|_| CashError::Usage(format!("invalid amount `{amount}`")))?;
    let period = BudgetPeriod::from_value(period);
    if !period.is_recognized() {
        return Err(usage(USAGE));
    }
    Ok((user.clone(), category.clone(), amount, period))
}

/// Records `user` as the default for the next `report`.
fn remember_user(manager: &ConfigManager, user: &str) -> Result<()> {
    manager.update(|config| {
        config.last_user = Some(user.to_string());
        Ok(())
    })?;
    Ok(())
}

fn single_user(args: &[String], form: &str) -> Result<String> {
    match args {
        [user] => Ok(user.clone()),
        _ => Err(usage(form)),
    }
}

fn usage(form: &str) -> CashError {
    CashError::Usage(format!("usage: turbocash_cli {form}"))
}

fn print_usage<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "Usage: turbocash_cli <command> [args]")?;
    writeln!(out)?;
    writeln!(out, "Commands:")?;
    writeln!(out, "  report [user-id] [--as-of YYYY-MM-DD] [--json]")?;
    writeln!(out, "                                         Budget risk report, last user by default")?;
    writeln!(out, "  create <user-id> <email>               New user in the configured currency")?;
    writeln!(out, "  add-budget <user-id> <category> <amount> [period]")?;
    writeln!(out, "                                         Budget starting today")?;
    writeln!(out, "  export <user-id>                       Print the stored document")?;
    writeln!(out, "  import <user-id> <file>                Store a document read from file")?;
    writeln!(out, "  backups <user-id>                      List backups, newest first")?;
    writeln!(out, "  restore <user-id> <backup-id>          Replace the document with a backup")?;
    writeln!(out, "  info <user-id>                         Storage details")?;
    writeln!(out, "  users                                  List stored users")?;
    writeln!(out, "  config [set <key> <value>]             Show or change preferences")?;
    writeln!(out, "  config backups | restore <backup>      Manage preference snapshots")?;
    writeln!(out, "  version                                Build information")?;
    writeln!(out)?;
    writeln!(out, "Data lives in ${}, else the configured data root, else ~/.turbocash.", paths::HOME_ENV)?;
    Ok(())
}
