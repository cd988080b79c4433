use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::Mutex;

use tasksync::backend::factory::create_backend;
use tasksync::backend::BackendError;
use tasksync::config::Config;
use tasksync::constants::ERROR_NO_SESSION;
use tasksync::logger;
use tasksync::session::{Session, SessionStore};
use tasksync::storage::{LocalCache, LocalStorage};
use tasksync::sync::{LoadOutcome, SyncOutcome, TaskSyncController};
use tasksync::task::Priority;

const USAGE: &str = "usage: tasksync [list | add <text> [high|medium|low] | toggle <id> | delete <id> | logout | init-config [path]] [--verbose]";

fn load_failure(error: &BackendError) -> &'static str {
    if error.is_transport() {
        "Server offline"
    } else {
        "Server rejected the request"
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let verbose = args.iter().any(|arg| arg == "--verbose" || arg == "-v");
    args.retain(|arg| arg != "--verbose" && arg != "-v");
    let command = args.first().map(String::as_str).unwrap_or("list");

    if command == "init-config" {
        let path = match args.get(1) {
            Some(path) => path.into(),
            None => Config::get_default_config_path()?,
        };
        return Config::generate_default_config(path);
    }

    let config = Config::load()?;
    let log_buffer = logger::init(&config.logging)?;

    let database_path = config.cache.resolve_database_path()?;
    let storage = Arc::new(Mutex::new(LocalStorage::open(&database_path).await?));
    let sessions = SessionStore::new(storage.clone());

    // Token from the environment wins over the stored session and replaces it
    let session = match std::env::var(&config.backend.token_env) {
        Ok(token) if !token.is_empty() => {
            let session = Session::new(token);
            sessions.save(&session).await?;
            Some(session)
        }
        _ => sessions.load().await?,
    };

    let Some(session) = session else {
        eprintln!("{ERROR_NO_SESSION}");
        eprintln!("\n💡 Set {} to your session token and run again.", config.backend.token_env);
        return Ok(());
    };

    let cache = LocalCache::for_session(storage.clone(), &session, config.cache.scope_by_user);

    if command == "logout" {
        sessions.clear().await?;
        // An install-wide snapshot is shared with other sessions
        if cache.is_user_scoped() {
            cache.clear().await?;
        }
        println!("👋 Logged out");
        return Ok(());
    }

    let backend = create_backend(&config.backend, &session)?;
    let controller = TaskSyncController::new(backend.into(), cache, &config.sync);

    match controller.load().await {
        LoadOutcome::Remote { .. } => {}
        LoadOutcome::Cache { error, .. } => eprintln!("⚠️  {}, showing cached data ({error})", load_failure(&error)),
        LoadOutcome::Unchanged { error } => eprintln!("⚠️  {} and no cached data ({error})", load_failure(&error)),
    }

    let outcome = match command {
        "list" => None,
        "add" => {
            let text = args.get(1).context(USAGE)?;
            let priority = args.get(2).map(|p| Priority::normalize(p));
            Some(controller.add(text, priority).await?)
        }
        "toggle" => Some(controller.toggle_done(args.get(1).context(USAGE)?).await?),
        "delete" => Some(controller.delete(args.get(1).context(USAGE)?).await?),
        _ => {
            eprintln!("{USAGE}");
            return Ok(());
        }
    };

    if let Some(notice) = outcome.as_ref().and_then(SyncOutcome::notice) {
        eprintln!("{notice}");
    }

    let summary = controller.summary().await;
    println!("{} pending • {} done", summary.pending, summary.done);
    for task in controller.tasks().await {
        let mark = if task.done { "✔" } else { " " };
        println!("[{mark}] {:<6} {}  ({})", task.priority, task.text, task.id);
    }

    if verbose {
        for line in log_buffer.get_logs().iter().rev() {
            eprintln!("{line}");
        }
    }

    Ok(())
}
