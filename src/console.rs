use std::future::Future;
use std::io::{self, BufRead, Write};
use std::time::Duration;

use log::warn;
use tokio::sync::oneshot;

use crate::error::InputError;

/// Line-oriented request/response surface the game talks through.
pub trait Console {
    fn say(&mut self, text: &str);

    /// Shows `prompt` and reads one line. `None` means the input is gone for good.
    fn ask(&mut self, prompt: &str) -> Option<String>;
}

pub struct StdConsole {
    stdin: io::Stdin,
}

impl StdConsole {
    pub fn new() -> Self {
        Self { stdin: io::stdin() }
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for StdConsole {
    fn say(&mut self, text: &str) {
        println!("{}", text);
    }

    fn ask(&mut self, prompt: &str) -> Option<String> {
        print!("{}", prompt);
        let _ = io::stdout().flush();

        let mut line = String::new();
        match self.stdin.lock().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(err) => {
                warn!("Failed to read from stdin: {}", err);
                None
            }
        }
    }
}

/// Keeps asking until `parse` accepts a line. With `max_attempts` set, gives up after that many
/// rejected lines.
pub fn ask_until<C, T, F>(
    console: &mut C,
    prompt: &str,
    retry: &str,
    max_attempts: Option<usize>,
    mut parse: F,
) -> Result<T, InputError>
where
    C: Console + ?Sized,
    F: FnMut(&str) -> Option<T>,
{
    let mut attempts = 0;
    loop {
        let line = console.ask(prompt).ok_or(InputError::Closed)?;
        if let Some(value) = parse(&line) {
            return Ok(value);
        }

        attempts += 1;
        if matches!(max_attempts, Some(max) if attempts >= max) {
            return Err(InputError::Exhausted { attempts });
        }
        console.say(retry);
    }
}

const SPINNER_FRAMES: [&str; 6] = ["( ●    )", "(  ●   )", "(   ●  )", "(    ● )", "(   ●  )", "(  ●   )"];
const SPINNER_TICK: Duration = Duration::from_millis(120);

/// Runs `task` while a spinner animates on stderr. The spinner stops as soon as `task` finishes.
pub async fn with_spinner<F: Future>(label: &str, task: F) -> F::Output {
    let (done_tx, mut done_rx) = oneshot::channel::<()>();
    let spinner_label = label.to_string();

    let spinner = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SPINNER_TICK);
        for frame in SPINNER_FRAMES.iter().cycle() {
            tokio::select! {
                _ = &mut done_rx => break,
                _ = ticker.tick() => {
                    eprint!("\r{} {}", frame, spinner_label);
                    let _ = io::stderr().flush();
                }
            }
        }
        eprint!("\r\x1b[2K");
        let _ = io::stderr().flush();
    });

    let output = task.await;
    let _ = done_tx.send(());
    if let Err(err) = spinner.await {
        warn!("Spinner task failed: {}", err);
    }
    eprintln!("✅ {} done!", label);
    output
}
