use bubbletea_rs::{quit, Cmd, KeyMsg, Model, Msg, Program};
use clap::Parser;
use countdown_widget::key::KeyMap as _;
use countdown_widget::prelude::*;
use crossterm::event::{KeyCode, KeyModifiers};
use lipgloss_extras::prelude::*;
use once_cell::sync::OnceCell;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Countdown timer in the terminal.
#[derive(Parser, Debug, Clone)]
#[command(name = "countdown", version)]
struct Args {
    /// Initial duration in seconds.
    #[arg(short, long, default_value_t = 0)]
    seconds: u64,

    /// Count down to this timestamp instead, e.g. 2030-01-01T00:00:00Z.
    #[arg(short = 't', long = "to-time")]
    to_time: Option<String>,

    /// Write tracing output to this file (filter with RUST_LOG).
    #[arg(long)]
    log_file: Option<String>,
}

static ARGS: OnceCell<Args> = OnceCell::new();

struct App {
    timer: Countdown,
    finished: bool,
}

impl Model for App {
    fn init() -> (Self, Option<Cmd>) {
        let args = ARGS.get().cloned().unwrap_or_else(|| Args::parse_from(["countdown"]));

        let mut opts = vec![with_seconds(args.seconds)];
        if let Some(to_time) = args.to_time {
            opts.push(with_target(to_time));
        }
        let mut timer = countdown_new(&opts);
        timer.focus();
        let cmd = timer.on_mount();

        (
            Self {
                timer,
                finished: false,
            },
            cmd,
        )
    }

    fn update(&mut self, msg: Msg) -> Option<Cmd> {
        if let Some(key) = msg.downcast_ref::<KeyMsg>() {
            let ctrl_c = key.key == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL);
            let q = key.key == KeyCode::Char('q') && !self.timer.input.focused();
            if ctrl_c || q || key.key == KeyCode::Esc {
                self.timer.on_unmount();
                return Some(quit());
            }
        }

        if let Some(ended) = msg.downcast_ref::<EndedMsg>() {
            if ended.id == self.timer.id() {
                tracing::info!("countdown finished");
                self.finished = true;
            }
            return None;
        }

        let cmd = self.timer.update(msg);
        if !self.timer.ended() {
            self.finished = false;
        }
        cmd
    }

    fn view(&self) -> String {
        let help_style = Style::new().foreground(Color::from("241"));
        let help: Vec<String> = self
            .timer
            .key_map
            .short_help()
            .iter()
            .map(|b| format!("{} {}", b.help().key, b.help().desc))
            .chain(std::iter::once("q quit".to_string()))
            .collect();

        let mut out = format!("\n{}\n\n", self.timer.view());
        if self.finished {
            out.push_str(&Style::new().bold(true).render("Time's up!"));
            out.push_str("\n\n");
        }
        out.push_str(&help_style.render(&help.join(" • ")));
        out.push('\n');
        out
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        let file = std::fs::File::create(path)?;
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
    }

    let _ = ARGS.set(args);

    let program = Program::<App>::builder().alt_screen(true).build()?;
    program.run().await?;
    Ok(())
}
