//! Interactive appliance simulator.
//!
//! Commands synthesize raw button sample timelines and push them through
//! the debouncer, so the whole input path is exercised, not just the
//! dispatcher.

use colored::Colorize;
use memento_app::{App, ButtonKind, Config};
use memento_input::{Button, ButtonConfig, Press};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config as LineConfig, Editor};
use std::io::Stdout;
use std::path::Path;
use std::time::{Duration, Instant};

const HELP_TEXT: &str = r#"
Available commands:
  help                      Show this help
  show                      Redraw the current page
  state                     Print the active screen
  settings                  Print the settings record
  errors                    Print sticky collaborator errors

  set | plus | minus | ok   Short-press a button
  hold <set|plus|minus|ok>  Long-press a button
  press <button> <ms>       Press a button for a given duration
  tick [n]                  Advance the control loop n seconds (default 1)

  quit, exit                Leave the simulator
"#;

/// The four physical buttons with their debounce state.
struct Pad {
    set: Button,
    plus: Button,
    minus: Button,
    ok: Button,
    timings: ButtonConfig,
}

impl Pad {
    fn new(timings: ButtonConfig) -> Self {
        Self {
            set: Button::new("SET", timings),
            plus: Button::new("P", timings),
            minus: Button::new("N", timings),
            ok: Button::new("OK", timings),
            timings,
        }
    }

    /// Pushes a synthetic press of roughly `held` through the debouncer
    /// and returns the resulting classification.
    fn press(&mut self, kind: ButtonKind, held: Duration) -> Option<Press> {
        let settle = self.timings.debounce + Duration::from_millis(5);
        let held = held.max(settle + Duration::from_millis(5));
        let button = match kind {
            ButtonKind::Set => &mut self.set,
            ButtonKind::Plus => &mut self.plus,
            ButtonKind::Minus => &mut self.minus,
            ButtonKind::Ok => &mut self.ok,
        };

        let t0 = Instant::now();
        button.sample(true, t0);
        button.sample(true, t0 + settle);
        button.sample(false, t0 + held);
        button.sample(false, t0 + held + settle)
    }

    /// A held duration comfortably past the long-press threshold.
    fn long_hold(&self) -> Duration {
        self.timings.long_press + self.timings.debounce * 4
    }
}

pub fn run(mut app: App<Stdout>, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut pad = Pad::new(config.input.button_config());

    println!("{}", "memento simulator".bold().cyan());
    println!("Type 'help' for available commands.\n");

    let line_config = LineConfig::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .build();
    let mut rl: Editor<(), DefaultHistory> = Editor::with_config(line_config)?;

    let history_path = std::env::var("HOME")
        .map(|h| std::path::PathBuf::from(h).join(".memento_history"))
        .unwrap_or_else(|_| ".memento_history".into());
    let _ = rl.load_history(&history_path);

    loop {
        let prompt = format!("{} ", "memento>".cyan());
        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                match execute_command(&mut app, &mut pad, line) {
                    Ok(Some(output)) => {
                        if !output.is_empty() {
                            println!("{}", output);
                        }
                    }
                    Ok(None) => break,
                    Err(e) => println!("{}: {}", "Error".red(), e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("^D");
                break;
            }
            Err(err) => {
                println!("{}: {:?}", "Error".red(), err);
                break;
            }
        }
    }

    let _ = rl.save_history(&history_path);
    println!("{}", "Bye.".dimmed());

    Ok(())
}

/// Runs simulator commands from a file, one per line; `#` starts a
/// comment.
pub fn run_script(
    mut app: App<Stdout>,
    config: &Config,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut pad = Pad::new(config.input.button_config());
    let content = std::fs::read_to_string(path)?;

    for line in content.lines() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        match execute_command(&mut app, &mut pad, line)? {
            Some(output) => {
                if !output.is_empty() {
                    println!("{}", output);
                }
            }
            None => break,
        }
    }

    Ok(())
}

fn execute_command(
    app: &mut App<Stdout>,
    pad: &mut Pad,
    line: &str,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some((&cmd, args)) = parts.split_first() else {
        return Ok(Some(String::new()));
    };

    match cmd.to_lowercase().as_str() {
        "help" | "?" => Ok(Some(HELP_TEXT.to_string())),

        "quit" | "exit" | "q" => Ok(None),

        "set" | "plus" | "minus" | "ok" | "p" | "n" => {
            let button = parse_button(cmd).ok_or("unknown button")?;
            feed_press(app, pad, button, Duration::from_millis(200))
        }

        "hold" => {
            let name = args.first().copied().ok_or("Usage: hold <set|plus|minus|ok>")?;
            let button = parse_button(name).ok_or("unknown button")?;
            let held = pad.long_hold();
            feed_press(app, pad, button, held)
        }

        "press" => {
            if args.len() < 2 {
                return Ok(Some("Usage: press <button> <ms>".to_string()));
            }
            let button = parse_button(args[0]).ok_or("unknown button")?;
            let ms: u64 = args[1].parse()?;
            feed_press(app, pad, button, Duration::from_millis(ms))
        }

        "tick" | "t" => {
            let n: u32 = args.first().and_then(|s| s.parse().ok()).unwrap_or(1);
            for _ in 0..n {
                app.tick()?;
            }
            Ok(Some(String::new()))
        }

        "show" => {
            app.redraw();
            Ok(Some(String::new()))
        }

        "state" => {
            let name = app
                .screen()
                .map(|s| s.name())
                .unwrap_or("(not started)");
            Ok(Some(name.yellow().to_string()))
        }

        "settings" => {
            let device = app.device().borrow();
            let settings = device.store.settings();
            Ok(Some(format!(
                "birthday {}  sex {}  lifespan {} years",
                settings.birth_date().to_string().cyan(),
                settings.sex.label().cyan(),
                settings.lifespan_years().to_string().cyan(),
            )))
        }

        "errors" => {
            let device = app.device().borrow();
            let messages = device.fault_messages();
            if messages.is_empty() {
                Ok(Some("none".green().to_string()))
            } else {
                Ok(Some(messages.join("\n").red().to_string()))
            }
        }

        _ => Ok(Some(format!(
            "Unknown command: {}. Type 'help' for help.",
            cmd
        ))),
    }
}

fn parse_button(name: &str) -> Option<ButtonKind> {
    match name.to_lowercase().as_str() {
        "set" => Some(ButtonKind::Set),
        "plus" | "p" => Some(ButtonKind::Plus),
        "minus" | "n" => Some(ButtonKind::Minus),
        "ok" => Some(ButtonKind::Ok),
        _ => None,
    }
}

fn feed_press(
    app: &mut App<Stdout>,
    pad: &mut Pad,
    button: ButtonKind,
    held: Duration,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    let Some(press) = pad.press(button, held) else {
        return Ok(Some("press not accepted (debounce)".yellow().to_string()));
    };

    let fired = app.handle_press(button, press)?;
    let name = app.screen().map(|s| s.name()).unwrap_or("?");
    let status = if fired {
        format!("-> {}", name).green().to_string()
    } else {
        "(no change)".dimmed().to_string()
    };
    Ok(Some(format!("{} {:?} {}", button.label().cyan(), press, status)))
}
