use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use roster_manager_lib::{
    application::{commands, dto::MonthGridDto, session::RosterSession},
    config::RosterConfig,
    domain::models::{DateKey, MonthCursor},
    open_session, Result, RosterError,
};

#[derive(Parser)]
#[command(name = "roster_tools")]
#[command(version = "0.1.0")]
#[command(about = "Shows the duty roster and swaps duty days", long_about = None)]
struct Cli {
    /// Roster configuration (rotation, backend, log file)
    #[arg(short, long, default_value = "roster.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prints one month of the roster
    Show {
        year: i32,
        /// 1-12
        month: u32,
    },

    /// Swaps the duty on FROM (held by ROLE) with the duty on TO
    Swap {
        from: String,
        to: String,

        #[arg(short, long)]
        role: String,

        /// The person on TO has been told about the swap
        #[arg(short, long)]
        acknowledged: bool,

        /// Validate only
        #[arg(long)]
        dry_run: bool,

        /// Where to write the swap log (defaults to log_path from the config)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Regenerates a month from the rotation, dropping swaps made in it
    Reset {
        year: i32,
        month: u32,
    },

    /// Interactive session on stdin
    Session {
        /// Starting month as YYYY-MM, defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
    },
}

// =====================
// Output
// =====================

fn print_grid(grid: &MonthGridDto) {
    println!("{:^63}", grid.title);
    println!(
        "{}",
        ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]
            .map(|d| format!("{:<9}", d))
            .join("")
    );
    for week in &grid.weeks {
        let row: String = week
            .days
            .iter()
            .map(|cell| match cell {
                Some(day) => format!("{:>2} {:<6}", &day.date[8..], day.role.as_deref().unwrap_or("")),
                None => " ".repeat(9),
            })
            .collect();
        println!("{}", row.trim_end());
    }
}

fn write_csv(path: &Path, session: &RosterSession) -> Result<()> {
    fs::write(path, commands::export_history(session))?;
    log::info!("wrote {} swaps to {}", session.history().len(), path.display());
    Ok(())
}

fn parse_month(raw: &str) -> Option<MonthCursor> {
    let (year, month) = raw.trim().split_once('-')?;
    MonthCursor::new(year.parse().ok()?, month.parse().ok()?).ok()
}

// =====================
// Subcommands
// =====================

async fn show(config: &RosterConfig, cursor: MonthCursor) -> Result<()> {
    let mut session = open_session(config, cursor).await?;
    session.load().await;
    print_grid(&commands::show_month(&session));
    Ok(())
}

async fn swap(
    config: &RosterConfig,
    from: &str,
    to: &str,
    role: &str,
    acknowledged: bool,
    dry_run: bool,
    out: Option<PathBuf>,
) -> Result<()> {
    let cursor = DateKey::parse(from)
        .map(|key| MonthCursor::containing(&key))
        .ok_or(RosterError::MissingDate)?;

    let mut session = open_session(config, cursor).await?;
    session.load().await;
    commands::select_role(&mut session, role)?;

    let request = commands::propose_swap(&mut session, from, to, acknowledged)?;
    let with = request
        .counterparty_role
        .as_ref()
        .map(|r| r.to_string())
        .unwrap_or_else(|| "nobody".to_string());

    if dry_run {
        commands::cancel_pending(&mut session)?;
        println!("{} {} -> {} would swap with {}", request.requesting_role, request.from, request.to, with);
        return Ok(());
    }

    commands::confirm_pending(&mut session).await?;
    println!("{} {} -> {} swapped with {}", request.requesting_role, request.from, request.to, with);

    let path = out.unwrap_or_else(|| config.log_path.clone());
    write_csv(&path, &session)
}

async fn reset(config: &RosterConfig, cursor: MonthCursor) -> Result<()> {
    let mut session = open_session(config, cursor).await?;
    session.load().await;
    print_grid(&commands::reset_month(&mut session).await);
    Ok(())
}

const SESSION_HELP: &str = "\
commands:
  next | prev              move one month
  role NAME                act as NAME
  swap FROM TO [ack]       propose a swap (YYYY-MM-DD), ack = person informed
  yes | no                 confirm or cancel the pending swap
  show                     print the month
  load                     reload from the backend
  export [PATH]            write the swap log
  quit";

async fn run_session(config: &RosterConfig, cursor: MonthCursor) -> Result<()> {
    let mut session = open_session(config, cursor).await?;
    session.load().await;
    print_grid(&commands::show_month(&session));
    println!("{}", SESSION_HELP);

    let stdin = io::stdin();
    loop {
        print!("[{}] {}> ", session.cursor(), session.selected_role());
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let words: Vec<&str> = line.split_whitespace().collect();

        // caller errors are reported and the session carries on
        let outcome: Result<()> = match words.as_slice() {
            [] => Ok(()),
            ["quit"] | ["exit"] => break,
            ["next"] => {
                print_grid(&commands::navigate_month(&mut session, 1));
                Ok(())
            }
            ["prev"] => {
                print_grid(&commands::navigate_month(&mut session, -1));
                Ok(())
            }
            ["role", name @ ..] => commands::select_role(&mut session, &name.join(" "))
                .map(|r| println!("acting as {}", r)),
            ["swap", from, to, rest @ ..] => {
                let acknowledged = rest.first() == Some(&"ack");
                commands::propose_swap(&mut session, from, to, acknowledged).map(|req| {
                    let with = req.counterparty_role.map(|r| r.to_string());
                    println!(
                        "{} -> {} with {}. confirm? (yes/no)",
                        req.from,
                        req.to,
                        with.as_deref().unwrap_or("nobody")
                    );
                })
            }
            ["yes"] => commands::confirm_pending(&mut session).await.map(|_| {
                print_grid(&commands::show_month(&session));
            }),
            ["no"] => commands::cancel_pending(&mut session).map(|_| println!("cancelled")),
            ["show"] => {
                print_grid(&commands::show_month(&session));
                Ok(())
            }
            ["load"] => {
                let status = session.load().await;
                println!("{}: {:?}", session.store().backend_name(), status);
                print_grid(&commands::show_month(&session));
                Ok(())
            }
            ["export"] => write_csv(&config.log_path, &session),
            ["export", path] => write_csv(Path::new(path), &session),
            _ => {
                println!("{}", SESSION_HELP);
                Ok(())
            }
        };

        if let Err(e) = outcome {
            eprintln!("{}", e);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = Cli::parse();
    let config = RosterConfig::load(&args.config);

    let result = match args.command {
        Commands::Show { year, month } => match MonthCursor::new(year, month) {
            Ok(cursor) => show(&config, cursor).await,
            Err(e) => Err(e),
        },
        Commands::Swap { from, to, role, acknowledged, dry_run, out } => {
            swap(&config, &from, &to, &role, acknowledged, dry_run, out).await
        }
        Commands::Reset { year, month } => match MonthCursor::new(year, month) {
            Ok(cursor) => reset(&config, cursor).await,
            Err(e) => Err(e),
        },
        Commands::Session { month } => {
            let cursor = month.as_deref().and_then(parse_month).unwrap_or_else(MonthCursor::current);
            run_session(&config, cursor).await
        }
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
