use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use drips_cli::cli::{Cli, Command, collect_config_overrides, reject_startup_flags};
use drips_cli::logging::init_tracing;
use drips_cli::view::{self, ResizeReporter};
use drips_core::TaskStore;
use drips_core::config::{Config, ConfigOverrides, load_config_with_fallback, merge_overrides};
use drips_core::error::AppError;
use drips_core::input::{clamp_daily_count, parse_time_input, validate_id, validate_title};
use drips_core::model::Task;
use drips_core::notify::{Notifier, StoreEvent, celebrator_from_env};
use drips_core::storage::JsonFileStore;
use std::cell::Cell;
use std::io::{self, BufRead};
use std::rc::Rc;
use tracing::{debug, warn};

/// Prints store events the way the widget shows toasts. Muted for `--json`.
struct ConsoleNotifier {
    muted: Rc<Cell<bool>>,
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, event: &StoreEvent) -> Result<(), AppError> {
        if !self.muted.get() {
            println!("{}", event.message());
        }
        Ok(())
    }
}

struct Session {
    store: TaskStore,
    config: Config,
    muted: Rc<Cell<bool>>,
    resize: ResizeReporter,
}

fn open_session(overrides: &ConfigOverrides) -> Result<Session, AppError> {
    let loaded = load_config_with_fallback();
    if let Some(err) = loaded.error.as_ref() {
        warn!(error = %err, "ignoring unreadable config, using defaults");
    }
    let config = merge_overrides(&loaded.config, overrides);

    let storage = JsonFileStore::from_env()?;
    debug!(dir = %storage.dir().display(), "opening task store");
    let muted = Rc::new(Cell::new(false));
    let store = TaskStore::builder(Box::new(storage))
        .notifier(Box::new(ConsoleNotifier {
            muted: muted.clone(),
        }))
        .celebrator(celebrator_from_env()?)
        .seed_starter_tasks(config.seed_starter_tasks())
        .open();

    Ok(Session {
        store,
        config,
        muted,
        resize: ResizeReporter::new(),
    })
}

fn task_not_found() -> AppError {
    AppError::invalid_input("task not found")
}

fn find_task(store: &TaskStore, id: &str) -> Option<Task> {
    store
        .tasks()
        .iter()
        .find(|task| task.id == id)
        .cloned()
        .or_else(|| {
            store
                .daily_tasks()
                .iter()
                .find(|entry| entry.task.id == id)
                .map(|entry| entry.task.clone())
        })
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn is_help_request(err: &clap::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
    )
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(std::mem::take(&mut current));
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn run_command(session: &mut Session, cli: Cli) -> Result<(), AppError> {
    let overrides =
        collect_config_overrides(&cli.config_override).map_err(AppError::invalid_input)?;
    let config = merge_overrides(&session.config, &overrides);
    let palette = config.palette();
    session.muted.set(cli.json);

    let store = &mut session.store;
    store.roll_over();
    let today = store.today_key();

    match cli.command {
        Command::Add { title } => {
            let title = validate_title(title.as_deref().unwrap_or_default())?;
            let task = store.add_task(&title);
            if cli.json {
                println!("{}", view::task_json(&task, &today));
            } else {
                println!("{} ({})", task.title, task.id);
            }
        }
        Command::Delete { id } => {
            let id = validate_id(&id)?;
            let task = store.delete_task(id).ok_or_else(task_not_found)?;
            if cli.json {
                println!("{}", view::task_json(&task, &today));
            } else {
                println!("{} ({})", task.title, task.id);
            }
        }
        Command::Toggle { id } => {
            let id = validate_id(&id)?;
            let completed = store.toggle_task_completion(id).ok_or_else(task_not_found)?;
            let task = find_task(store, id).ok_or_else(task_not_found)?;
            if cli.json {
                println!("{}", view::task_json(&task, &today));
            } else if !completed {
                println!("Marked as not done: {}", task.title);
            }
        }
        Command::Generate { count } => {
            let count = count.map(clamp_daily_count).unwrap_or_else(|| config.daily_count());
            store.generate_daily_tasks(count);
            if cli.json {
                println!("{}", view::daily_json(store.daily_tasks(), &today));
            } else {
                println!("{}", view::render_daily(store.daily_tasks(), &today, &palette));
            }
        }
        Command::Move { id, direction } => {
            let id = validate_id(&id)?;
            if !store.daily_tasks().iter().any(|entry| entry.task.id == id) {
                return Err(AppError::invalid_input("task is not in today's list"));
            }
            let moved = store.reorder_daily_task(id, direction.into());
            debug!(id, moved, "move requested");
            if cli.json {
                println!("{}", view::daily_json(store.daily_tasks(), &today));
            } else {
                println!("{}", view::render_daily(store.daily_tasks(), &today, &palette));
            }
        }
        Command::Schedule { id, time, clear } => {
            let id = validate_id(&id)?;
            let time = if clear {
                None
            } else {
                Some(parse_time_input(time.as_deref().unwrap_or_default())?)
            };
            if !store.schedule_task(id, time.as_deref()) {
                return Err(task_not_found());
            }
            let task = find_task(store, id).ok_or_else(task_not_found)?;
            if cli.json {
                println!("{}", view::task_json(&task, &today));
            } else {
                let display = drips_core::time_util::format_time(task.scheduled_time.as_deref());
                let display = if display.is_empty() { "-".to_string() } else { display };
                println!("{} ({}) at {}", task.title, task.id, display);
            }
        }
        Command::Bank { sort } => {
            let sort = sort.map(Into::into).unwrap_or_else(|| config.sort());
            let tasks = store.sorted_tasks(sort);
            if cli.json {
                println!("{}", view::tasks_json(&tasks, &today));
            } else {
                println!("{}", view::render_bank(&tasks, sort, &today, &palette));
            }
        }
        Command::Today => {
            if cli.json {
                println!("{}", view::daily_json(store.daily_tasks(), &today));
            } else {
                println!("{}", view::render_daily(store.daily_tasks(), &today, &palette));
            }
        }
        Command::Logbook => {
            let days = store.logbook();
            if cli.json {
                println!("{}", view::logbook_json(&days));
            } else {
                println!("{}", view::render_logbook(&days, &palette));
            }
        }
        Command::Embed { report_height } => {
            let rendered = view::render_embedded(store, &palette);
            if cli.json {
                let payload = serde_json::json!({
                    "daily": view::daily_json(store.daily_tasks(), &today),
                    "bank_size": store.tasks().len(),
                    "has_default_tasks": store.has_default_tasks(),
                    "height": rendered.lines().count(),
                });
                println!("{payload}");
            } else {
                println!("{rendered}");
            }
            if report_height && let Some(message) = session.resize.observe(&rendered) {
                eprintln!("{message}");
            }
        }
        Command::EmbedCode { url } => {
            if url.trim().is_empty() {
                return Err(AppError::invalid_input("url is required"));
            }
            println!("{}", view::embed_code(&url));
        }
        Command::ClearDefaults => {
            let removed = store.clear_default_tasks();
            if cli.json {
                println!("{}", serde_json::json!({ "removed": removed }));
            }
        }
    }

    Ok(())
}

fn run_interactive(session: &mut Session) -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| AppError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("drips".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) if is_help_request(&err) => {
                println!("{err}");
                continue;
            }
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if let Err(message) = reject_startup_flags(&cli) {
            eprintln!("ERROR: {}", AppError::invalid_input(message));
            continue;
        }

        if let Err(err) = run_command(session, cli) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn exit_with(err: AppError) -> ! {
    eprintln!("ERROR: {}", err);
    std::process::exit(1);
}

fn main() {
    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        if let Err(err) = init_tracing(0, 0) {
            exit_with(err);
        }
        let result =
            open_session(&ConfigOverrides::default()).and_then(|mut session| run_interactive(&mut session));
        if let Err(err) = result {
            exit_with(err);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if is_help_request(&err) => {
            print!("{err}");
            return;
        }
        Err(err) => exit_with(normalize_parse_error(err)),
    };

    if let Err(err) = init_tracing(cli.verbose, cli.quiet) {
        exit_with(err);
    }

    let overrides = match collect_config_overrides(&cli.config_override) {
        Ok(overrides) => overrides,
        Err(message) => exit_with(AppError::invalid_input(message)),
    };

    let result = open_session(&overrides).and_then(|mut session| run_command(&mut session, cli));
    if let Err(err) = result {
        exit_with(err);
    }
}
