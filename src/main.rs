use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use triage_intake::app::IntakeController;

const HELP: &str = "\
Type your symptoms and press enter to fill the description field.
Commands:
  /voice            toggle voice recording
  /ayushman on|off  set the Ayushman card flag
  /location on|off  share an approximate location with the submission
  /submit           send the intake for triage
  /health           check backend availability
  /show             show the current intake
  /quit             exit";

#[tokio::main]
async fn main() -> Result<()> {
    let (controller, _log_guard) =
        IntakeController::new().context("failed to initialize intake")?;

    println!("Symptom intake ({})", controller.language().code());
    if !controller.voice_supported() {
        println!("{}", controller.voice_snapshot().status.text);
    }
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(Duration::from_millis(200));

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !handle_line(&controller, line.trim()).await {
                    break;
                }
            }
            _ = ticker.tick(), if controller.voice_active() => {
                if controller.pump_voice() > 0 {
                    let snapshot = controller.voice_snapshot();
                    if !snapshot.status.text.is_empty() {
                        println!("[voice] {}", snapshot.status.text);
                    }
                    if !snapshot.recording && !snapshot.field_text.is_empty() {
                        println!("Symptoms: {}", snapshot.field_text);
                    }
                }
            }
        }
    }

    controller.stop_voice();
    Ok(())
}

async fn handle_line(controller: &IntakeController, line: &str) -> bool {
    match line {
        "" => {}
        "/quit" | "/exit" => return false,
        "/help" => println!("{HELP}"),
        "/voice" => match controller.toggle_voice() {
            Ok(()) => {
                controller.pump_voice();
                println!("[voice] {}", controller.voice_snapshot().toggle.label);
            }
            Err(e) => eprintln!("Voice error: {e}"),
        },
        "/submit" => match controller.submit().await {
            Ok(result) => {
                println!("Severity: {}", result.severity().unwrap_or("unknown"));
                if let Some(advice) = result.advice() {
                    println!("Advice: {advice}");
                }
            }
            Err(e) => eprintln!("{e}"),
        },
        "/health" => match controller.backend_health().await {
            Ok(health) => println!(
                "Backend: {} ({})",
                health.status,
                health.service.as_deref().unwrap_or("unnamed")
            ),
            Err(e) => eprintln!("Backend unreachable: {e}"),
        },
        "/show" => {
            println!("Symptoms: {}", controller.symptom_text());
            println!("Ayushman card: {}", controller.ayushman_card());
            match (controller.share_location(), controller.location()) {
                (false, _) => println!("Location: not shared"),
                (true, Some(c)) => println!("Location: {:.4}, {:.4}", c.lat, c.lng),
                (true, None) => println!("Location: shared, not yet estimated"),
            }
        }
        _ if line.starts_with("/ayushman") => match line.strip_prefix("/ayushman").map(str::trim) {
            Some("on") => controller.set_ayushman_card(true),
            Some("off") => controller.set_ayushman_card(false),
            _ => eprintln!("Usage: /ayushman on|off"),
        },
        _ if line.starts_with("/location") => match line.strip_prefix("/location").map(str::trim) {
            Some("on") => {
                controller.set_share_location(true);
                controller.refresh_location().await;
            }
            Some("off") => controller.set_share_location(false),
            _ => eprintln!("Usage: /location on|off"),
        },
        _ if line.starts_with('/') => eprintln!("Unknown command: {line}"),
        text => {
            controller.set_symptoms(text);
            println!("Symptoms: {text}");
        }
    }
    true
}
