use anyhow::Result;
use hestia::Config;
use hestia::engine::{DisplayState, EngineCommand, SyncEngine};
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
    hestia::logging::init_logging(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    // Create engine command channel
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<EngineCommand>();

    let mut engine = SyncEngine::from_config(config, cmd_rx)
        .map_err(|e| anyhow::anyhow!("Failed to create engine: {}", e))?;
    let mut display = engine.subscribe();

    info!("Hestia thermostat client starting up");

    // Render published display state
    let render_task = tokio::spawn(async move {
        while display.changed().await.is_ok() {
            let state = display.borrow_and_update().clone();
            render(&state);
        }
    });

    // Read console commands line by line
    let input_tx = cmd_tx.clone();
    let input_task = tokio::spawn(async move {
        let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            match parse_command(line.trim()) {
                Some(cmd) => {
                    let quitting = matches!(cmd, EngineCommand::Shutdown);
                    if input_tx.send(cmd).is_err() || quitting {
                        break;
                    }
                }
                None => {
                    println!(
                        "commands: login <password> | logout | select <id> | toggle | periods <json> | advance | quit"
                    );
                }
            }
        }
    });

    // Run the engine in the current task
    match engine.run().await {
        Ok(_) => {
            info!("Engine shutdown complete");
            render_task.abort();
            input_task.abort();
            Ok(())
        }
        Err(e) => {
            error!("Engine failed with error: {}", e);
            render_task.abort();
            input_task.abort();
            Err(anyhow::anyhow!("Engine error: {}", e))
        }
    }
}

/// Map a console line to an engine command
fn parse_command(line: &str) -> Option<EngineCommand> {
    let (verb, rest) = match line.split_once(' ') {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };
    match verb {
        "login" if !rest.is_empty() => Some(EngineCommand::Login {
            username: None,
            password: rest.to_string(),
        }),
        "logout" => Some(EngineCommand::Logout),
        "select" if !rest.is_empty() => Some(EngineCommand::Select(rest.to_string())),
        "toggle" => Some(EngineCommand::ToggleProgram),
        "periods" if !rest.is_empty() => Some(EngineCommand::SubmitPeriods(rest.to_string())),
        "advance" => Some(EngineCommand::TriggerAdvance),
        "quit" | "exit" => Some(EngineCommand::Shutdown),
        _ => None,
    }
}

/// Print the published state the way the service's own front-end lays it out
fn render(state: &DisplayState) {
    if !state.logged_in {
        println!("-- logged out --");
    }
    for row in &state.readout {
        match row.temperature {
            Some(t) => println!("{}: {}\u{02da}C", row.id, t),
            None => println!("{}: -", row.id),
        }
    }
    if let Some(selected) = &state.selected {
        println!(
            "[{}] Program: {}",
            selected.id,
            if selected.program_enabled { "ON" } else { "OFF" }
        );
        if selected.program_enabled && !selected.periods_text.is_empty() {
            println!("Periods: {}", selected.periods_text);
        }
        let mut line = String::new();
        if let Some(t) = selected.temperature {
            line.push_str(&format!("Temperature: {}\u{02da}C", t));
        }
        if let Some(target) = selected.current_target {
            line.push_str(&format!(" / {}", target));
        }
        if selected.relay_on {
            line.push_str(" \u{1f525}");
        }
        if selected.advance_active {
            line.push_str(" (advance)");
        }
        if !line.is_empty() {
            println!("{}", line);
        }
        if state.controls_disabled {
            println!("controls disabled: live data unavailable");
        }
    }
}
