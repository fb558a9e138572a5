use shelfscan::config::{AppConfig, StoreBackend, load_config};
use shelfscan::extractor::{FieldExtractor, OpenAiExtractor, TextRecognizer, VisionClient};
use shelfscan::matcher;
use shelfscan::model::MatchOutcome;
use shelfscan::normalizer::KnownManufacturers;
use shelfscan::session::{LabelField, Session, SessionEvent, SessionState};
use shelfscan::store::{SheetsStore, SqliteStore, TabularStore};
use shelfscan::workflow;

use std::fs;
use std::io::{self, BufRead};
use std::path::Path;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("😱 Panic occurred: {:?}", panic_info);
    }));

    // Load configuration from file
    let config = match load_config("config.json") {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            return;
        }
    };

    // The canonical manufacturer list is read once; edits require a restart.
    let known = KnownManufacturers::load(Path::new(&config.manufacturers_file));

    let recognizer = VisionClient::new(config.google_api_key.clone());
    let extractor = OpenAiExtractor::new(config.openai_api_key.clone(), config.openai_model.clone());

    let store: Box<dyn TabularStore> = match config.backend {
        StoreBackend::Sheets => Box::new(SheetsStore::new(config.sheets_token.clone())),
        StoreBackend::Sqlite => match SqliteStore::new(&config.database_path) {
            Ok(s) => Box::new(s),
            Err(e) => {
                error!("Failed to initialize storage: {:?}", e);
                return;
            }
        },
    };

    info!("🚀 ShelfScan started");
    run_session(&config, &known, &recognizer, &extractor, store.as_ref()).await;
}

/// Drives one operator session over stdin. Each action runs to completion
/// before the next line is read; there is no concurrent-scan coordination.
async fn run_session(
    config: &AppConfig,
    known: &KnownManufacturers,
    recognizer: &dyn TextRecognizer,
    extractor: &dyn FieldExtractor,
    store: &dyn TabularStore,
) {
    let mut session = Session::new();
    print_state(&session, config);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        let input = line.trim();
        if input.is_empty() {
            print_state(&session, config);
            continue;
        }
        if input == "quit" || input == "exit" {
            break;
        }

        handle_command(&mut session, config, known, recognizer, extractor, store, input).await;
        print_state(&session, config);
    }

    info!("Session ended.");
}

async fn handle_command(
    session: &mut Session,
    config: &AppConfig,
    known: &KnownManufacturers,
    recognizer: &dyn TextRecognizer,
    extractor: &dyn FieldExtractor,
    store: &dyn TabularStore,
    input: &str,
) {
    let (command, rest) = match input.split_once(' ') {
        Some((c, r)) => (c, r.trim()),
        None => (input, ""),
    };

    match session.state() {
        SessionState::SelectingStore => match command {
            "list" => {}
            _ => {
                // A list index, or a pasted raw store id.
                let store_id = if let Ok(index) = input.parse::<usize>() {
                    config
                        .locations
                        .get(index.wrapping_sub(1))
                        .map(|loc| loc.store_id.clone())
                } else if input.len() > 10 {
                    Some(input.to_string())
                } else {
                    None
                };

                match store_id {
                    Some(id) => {
                        info!("Entering store {}", id);
                        apply(session, SessionEvent::StoreSelected(id));
                    }
                    None => println!("⛔ Unknown location. Pick a number from the list or paste a store id."),
                }
            }
        },

        SessionState::AwaitingScan { store_id } => match command {
            "scan" => {
                let store_id = store_id.clone();
                let image = match fs::read(rest) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        println!("⛔ Cannot read image {}: {}", rest, e);
                        return;
                    }
                };

                println!("📖 Reading label...");
                let label =
                    match workflow::scan_label(recognizer, extractor, known, &image).await {
                        Ok(label) => label,
                        Err(e) => {
                            warn!("Scan failed: {}", e);
                            println!("🚫 Could not read label. Try another photo.");
                            return;
                        }
                    };

                apply(session, SessionEvent::ScanCaptured(label.clone()));
                let outcome =
                    matcher::find_matches(store, &store_id, &label.manufacturer, &label.reference)
                        .await;
                if outcome == MatchOutcome::Unavailable {
                    println!("⚠️ Store lookup failed - you can still save this as a new item.");
                }
                apply(session, SessionEvent::MatchesComputed(outcome));
            }
            "back" => apply(session, SessionEvent::StoreClosed),
            _ => println!("Commands: scan <image-path>, back, quit"),
        },

        SessionState::Verifying { .. } => match command {
            "manuf" => edit_and_rematch(session, store, LabelField::Manufacturer, rest).await,
            "ref" => edit_and_rematch(session, store, LabelField::Reference, rest).await,
            "name" => apply(session, SessionEvent::FieldEdited(LabelField::Name, rest.into())),
            "details" => apply(session, SessionEvent::FieldEdited(LabelField::Details, rest.into())),
            "qty" => apply(session, SessionEvent::FieldEdited(LabelField::Qty, rest.into())),
            "update" => {
                let target = match session.state() {
                    SessionState::Verifying { outcome: Some(outcome), .. } => {
                        outcome.preselected().cloned()
                    }
                    _ => None,
                };
                match target {
                    Some(target) => apply(session, SessionEvent::TargetSelected(target)),
                    None => println!("⛔ No single match to update. Use pick <row> or new."),
                }
            }
            "pick" => {
                let target = match (rest.parse::<usize>(), session.state()) {
                    (Ok(row), SessionState::Verifying { outcome: Some(outcome), .. }) => {
                        outcome.rows().iter().find(|m| m.row == row).cloned()
                    }
                    _ => None,
                };
                match target {
                    Some(target) => apply(session, SessionEvent::TargetSelected(target)),
                    None => println!("⛔ No match at that row."),
                }
            }
            "new" => apply(session, SessionEvent::CreateRequested),
            "cancel" => apply(session, SessionEvent::Cancelled),
            _ => println!(
                "Commands: manuf|ref|name|details|qty <value>, update, pick <row>, new, cancel"
            ),
        },

        SessionState::Updating { store_id, label, target } => match command {
            "add" => {
                let add_qty = if rest.is_empty() {
                    label.qty.max(1)
                } else {
                    rest.parse().unwrap_or(0)
                };
                if add_qty == 0 {
                    println!("⛔ Add quantity must be a positive integer.");
                    return;
                }

                match workflow::add_quantity(store, store_id, target, add_qty).await {
                    Ok(total) => {
                        println!("✅ Added {}. New total: {}.", add_qty, total);
                        apply(session, SessionEvent::Saved);
                    }
                    Err(e) => {
                        warn!("Update failed: {}", e);
                        println!("❌ Save did not go through - nothing was recorded. Try again.");
                    }
                }
            }
            "cancel" => apply(session, SessionEvent::Cancelled),
            _ => println!("Commands: add <qty>, cancel"),
        },

        SessionState::Creating { store_id, label, .. } => match command {
            "save" => {
                match workflow::save_new_item(store, store_id, label, &config.default_shelf).await {
                    Ok(()) => {
                        println!("✅ Saved {} / {}.", label.manufacturer, label.reference);
                        apply(session, SessionEvent::Saved);
                    }
                    Err(e) => {
                        warn!("Save failed: {}", e);
                        println!("❌ Save did not go through - nothing was recorded. Try again.");
                    }
                }
            }
            "manuf" => apply(session, SessionEvent::FieldEdited(LabelField::Manufacturer, rest.into())),
            "ref" => apply(session, SessionEvent::FieldEdited(LabelField::Reference, rest.into())),
            "name" => apply(session, SessionEvent::FieldEdited(LabelField::Name, rest.into())),
            "details" => apply(session, SessionEvent::FieldEdited(LabelField::Details, rest.into())),
            "qty" => apply(session, SessionEvent::FieldEdited(LabelField::Qty, rest.into())),
            "cancel" => apply(session, SessionEvent::Cancelled),
            _ => println!("Commands: save, manuf|ref|name|details|qty <value>, cancel"),
        },
    }
}

/// Applies a field edit, then recomputes matches if the edit invalidated
/// the previous lookup.
async fn edit_and_rematch(
    session: &mut Session,
    store: &dyn TabularStore,
    field: LabelField,
    value: &str,
) {
    apply(session, SessionEvent::FieldEdited(field, value.into()));

    if let SessionState::Verifying { store_id, label, outcome: None } = session.state() {
        let outcome =
            matcher::find_matches(store, store_id, &label.manufacturer, &label.reference).await;
        if outcome == MatchOutcome::Unavailable {
            println!("⚠️ Store lookup failed - you can still save this as a new item.");
        }
        apply(session, SessionEvent::MatchesComputed(outcome));
    }
}

fn apply(session: &mut Session, event: SessionEvent) {
    if let Err(e) = session.apply(event) {
        println!("⛔ {}", e);
    }
}

fn print_state(session: &Session, config: &AppConfig) {
    match session.state() {
        SessionState::SelectingStore => {
            println!("\n🏥 Select a location:");
            for (i, loc) in config.locations.iter().enumerate() {
                println!("  {}. {}", i + 1, loc.name);
            }
            println!("Enter a number, or paste a store id.");
        }

        SessionState::AwaitingScan { store_id } => {
            println!("\n📍 Store: {}", store_id);
            println!("scan <image-path> to read a label.");
        }

        SessionState::Verifying { label, outcome, .. } => {
            println!("\n### Item Verification");
            println!("  Manuf.:  {}", label.manufacturer);
            println!("  REF:     {}", label.reference);
            println!("  Name:    {}", label.name);
            println!("  Details: {}", label.details);
            println!("  Qty:     {}", label.qty);

            match outcome {
                Some(MatchOutcome::Matches(rows)) if rows.is_empty() => {
                    println!("✨ New item detected - `new` to create it.");
                }
                Some(MatchOutcome::Matches(rows)) if rows.len() == 1 => {
                    println!(
                        "🔔 Match: row {} ({}x in stock) - `update` or `new`.",
                        rows[0].row, rows[0].current_qty
                    );
                }
                Some(MatchOutcome::Matches(rows)) => {
                    println!("🔔 {} duplicates - pick one:", rows.len());
                    for m in rows {
                        println!(
                            "  row {}: {}x ({})",
                            m.row,
                            m.current_qty,
                            truncate(&m.name, 15)
                        );
                    }
                }
                Some(MatchOutcome::Unavailable) => {
                    println!("⚠️ Lookup failed - `new` to record it anyway.");
                }
                None => {}
            }
        }

        SessionState::Updating { label, target, .. } => {
            println!("\n🔔 Updating row {} - {}", target.row, target.name);
            println!("  In stock: {}", target.current_qty);
            println!("add <qty> to confirm (default {}).", label.qty.max(1));
        }

        SessionState::Creating { label, had_matches, .. } => {
            if *had_matches {
                println!("\n✨ Creating duplicate entry");
            } else {
                println!("\n✨ New item");
            }
            println!("  Manuf.:  {}", label.manufacturer);
            println!("  REF:     {}", label.reference);
            println!("  Name:    {}", label.name);
            println!("  Details: {}", label.details);
            println!("  Qty:     {}", label.qty);
            println!("save to append it, or edit fields first.");
        }
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut)
    }
}
