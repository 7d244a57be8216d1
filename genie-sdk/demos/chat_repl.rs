//! Interactive chat against a genie-home backend
//!
//! Talks to `GENIE_API_URL` when set, otherwise starts the simulated backend
//! in-process. Lines starting with `/` are local commands:
//!
//! - `/devices` lists the device table
//! - `/mood <name>` switches mood
//! - `/theme` prints the current theme variables
//! - `/insights` prints the busiest devices and hours
//! - `/quit` exits
//!
//! Run with: cargo run -p genie-sdk --example chat_repl

use std::io::{self, BufRead, Write};

use genie_backend::BackgroundServer;
use genie_sdk::{GenieConfig, GenieHome, SdkError};
use genie_state::logging::init_logging_from_env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging_from_env()?;

    // Keep the local backend alive for the whole session
    let (config, _backend) = match std::env::var("GENIE_API_URL") {
        Ok(_) => (GenieConfig::from_env()?, None),
        Err(_) => {
            let backend = BackgroundServer::ephemeral()?;
            println!("Started simulated backend at {}", backend.base_url());
            (GenieConfig::new(backend.api_url()), Some(backend))
        }
    };

    let home = GenieHome::connect(config)?;
    println!(
        "Connected: {} devices, mood {}",
        home.engine().len(),
        home.moods().current().unwrap_or_default()
    );
    println!("Type a message, or /devices, /mood <name>, /theme, /insights, /quit");

    let stdin = io::stdin();
    prompt()?;
    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();

        match line.split_once(' ').unwrap_or((line, "")) {
            ("/quit", _) => break,
            ("/devices", _) => print_devices(&home)?,
            ("/theme", _) => {
                for (name, value) in home.themes().current().iter() {
                    println!("  {:<18} {}", name, value);
                }
            }
            ("/insights", _) => match home.insights() {
                Ok(insights) => {
                    println!("  {} recent actions", insights.total_patterns);
                    for (device, count) in &insights.most_used_devices {
                        println!("  {:<18} {}", device, count);
                    }
                    for (hour, count) in &insights.most_active_hours {
                        println!("  {:02}:00              {}", hour, count);
                    }
                }
                Err(e) => println!("{}", e),
            },
            ("/mood", name) => match home.set_mood(name.trim()) {
                Ok(outcome) => println!("Mood is now {}", outcome.mood_name),
                Err(e) => println!("{}", e),
            },
            _ if line.is_empty() => {}
            _ => match home.chat().send(line) {
                Ok(turn) => {
                    println!("Genie: {}", turn.reply);
                    if !turn.devices_updated.is_empty() {
                        println!("  ({} devices updated)", turn.devices_updated.len());
                    }
                }
                // The transcript already holds the apology
                Err(_) => {
                    if let Some(message) = home.transcript().last() {
                        println!("Genie: {}", message.text);
                    }
                }
            },
        }
        prompt()?;
    }
    Ok(())
}

fn prompt() -> io::Result<()> {
    print!("> ");
    io::stdout().flush()
}

fn print_devices(home: &GenieHome) -> Result<(), SdkError> {
    let snapshot = home.devices()?;
    for (device_id, device) in snapshot.iter() {
        let active = if device.as_toggleable().is_active() { "on" } else { "off" };
        println!("  {:<20} {:<20} {}", device_id.as_str(), device.name(), active);
    }
    Ok(())
}
