use std::env;
use std::io;

use scanner::analysis::{BatchItem, Submission};
use scanner::inference::EngineStatus;
use scanner::notify::NotificationKind;
use scanner::{Config, Scanner};

const USAGE: &str =
    "usage: scanner <health | scan FILE... | history | clear-history | users [QUERY] | delete-user EMAIL | stats>";

#[tokio::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        io::Error::other(e.to_string())
    })?;

    let scanner = Scanner::from_config(config).map_err(|e| {
        log::error!("Failed to initialize scanner: {}", e);
        io::Error::other(e.to_string())
    })?;

    let status = scanner.check_engine().await;

    let args: Vec<String> = env::args().skip(1).collect();
    let result = match args.first().map(String::as_str) {
        Some("health") => {
            println!("engine: {:?}", status);
            if status == EngineStatus::Online {
                Ok(())
            } else {
                Err(io::Error::other("inference engine unavailable"))
            }
        }
        Some("scan") if args.len() > 1 => scan(&scanner, &args[1..]).await,
        Some("history") => {
            for record in scanner.history().records() {
                println!(
                    "{}  {:<16} {:<4} {}",
                    record.timestamp, record.name, record.result, record.confidence
                );
            }
            Ok(())
        }
        Some("clear-history") => scanner
            .clear_history()
            .map_err(|e| io::Error::other(e.to_string())),
        Some("users") => list_users(&scanner, args.get(1).map(String::as_str).unwrap_or("")),
        Some("delete-user") if args.len() > 1 => match scanner.users().delete_user(&args[1]) {
            Ok(true) => Ok(()),
            Ok(false) => Err(io::Error::new(io::ErrorKind::NotFound, "no such user")),
            Err(e) => Err(io::Error::other(e.to_string())),
        },
        Some("stats") => match scanner.admin_stats() {
            Ok(stats) => {
                println!("users: {}", stats.users);
                println!("scans: {}", stats.scans);
                println!("fake:  {}", stats.fake);
                Ok(())
            }
            Err(e) => Err(io::Error::other(e.to_string())),
        },
        _ => {
            eprintln!("{}", USAGE);
            Err(io::Error::new(io::ErrorKind::InvalidInput, USAGE))
        }
    };

    print_notifications(&scanner);
    scanner.shutdown();
    result
}

async fn scan(scanner: &Scanner, paths: &[String]) -> io::Result<()> {
    let submission = scanner
        .scan_paths(paths)
        .await
        .map_err(|e| io::Error::other(e.to_string()))?;

    match submission {
        Submission::Empty => {}
        Submission::Single(report) => {
            println!("{} -> {} ({})", report.record.name, report.record.result, report.record.confidence);
            println!("{}", report.narrative.title);
            println!("  {}", report.narrative.explanation);
            println!("  {}", report.narrative.technical_details);
            println!("  {}", report.narrative.confidence_reason);
        }
        Submission::Batch { .. } => {
            for item in scanner.batch().items() {
                print_item(&item);
            }
            println!("progress: {:.0}%", scanner.batch().progress());
        }
    }
    Ok(())
}

fn list_users(scanner: &Scanner, query: &str) -> io::Result<()> {
    let users = scanner
        .users()
        .search_users(query)
        .map_err(|e| io::Error::other(e.to_string()))?;
    for user in users {
        println!("{:<24} {}", user.name, user.email);
    }
    Ok(())
}

fn print_item(item: &BatchItem) {
    let result = item
        .result
        .map(|r| format!("{:?}", r).to_uppercase())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{:<32} {:>10} {:<10} {:<5} {}",
        item.name,
        item.size_label,
        format!("{:?}", item.status).to_lowercase(),
        result,
        item.confidence.as_deref().unwrap_or("-")
    );
}

fn print_notifications(scanner: &Scanner) {
    for notification in scanner.notifications().snapshot().iter().rev() {
        let marker = match notification.kind {
            NotificationKind::Info => "i",
            NotificationKind::Success => "+",
            NotificationKind::Error => "!",
        };
        eprintln!("[{}] {}", marker, notification.message);
    }
}
