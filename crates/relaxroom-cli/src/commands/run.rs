use std::io::{IsTerminal, Write};
use std::time::Duration;

use chrono::Local;
use clap::Args;
use relaxroom_core::records::{daily_summary, row_for};
use relaxroom_core::session::format_remaining;
use relaxroom_core::{
    Config, DurationUnit, Event, IntervalTicker, RelaxController, RelaxRecords, SessionConfig,
    SessionSnapshot, SystemClock,
};
use tokio::io::{AsyncBufReadExt, BufReader};

/// How often the live status line is redrawn.
const RENDER_INTERVAL: Duration = Duration::from_millis(200);
const PROGRESS_BAR_WIDTH: usize = 20;

#[derive(Args)]
pub struct RunArgs {
    /// Milliseconds per relax token (overrides the config file)
    #[arg(long, conflicts_with_all = ["minutes", "hours", "every"])]
    pub duration_ms: Option<u64>,
    /// Minutes per relax token
    #[arg(long, conflicts_with_all = ["hours", "every"])]
    pub minutes: Option<f64>,
    /// Hours per relax token
    #[arg(long, conflicts_with = "every")]
    pub hours: Option<f64>,
    /// Amount per relax token in the configured `display.duration_unit`
    #[arg(long)]
    pub every: Option<f64>,
    /// Tick cadence in milliseconds
    #[arg(long)]
    pub tick_ms: Option<u64>,
    /// Print events as JSON lines
    #[arg(long)]
    pub json: bool,
    /// Wait for a `start` command instead of starting right away
    #[arg(long)]
    pub idle: bool,
}

#[derive(Debug, PartialEq)]
enum Input {
    Relax,
    Start,
    Stop,
    Status,
    Records,
    Help,
    Quit,
    Unknown(String),
}

impl Input {
    fn parse(line: &str) -> Option<Self> {
        let word = line.trim().to_ascii_lowercase();
        let input = match word.as_str() {
            "" => return None,
            "r" | "relax" => Input::Relax,
            "start" => Input::Start,
            "s" | "stop" => Input::Stop,
            "status" => Input::Status,
            "records" | "record" => Input::Records,
            "h" | "help" | "?" => Input::Help,
            "q" | "quit" | "exit" => Input::Quit,
            _ => Input::Unknown(word),
        };
        Some(input)
    }
}

fn resolve_session(
    args: &RunArgs,
    config: &Config,
) -> Result<SessionConfig, Box<dyn std::error::Error>> {
    let session = if let Some(ms) = args.duration_ms {
        SessionConfig::new(ms)?
    } else if let Some(minutes) = args.minutes {
        SessionConfig::from_amount(minutes, DurationUnit::Minutes)?
    } else if let Some(hours) = args.hours {
        SessionConfig::from_amount(hours, DurationUnit::Hours)?
    } else if let Some(amount) = args.every {
        SessionConfig::from_amount(amount, config.display.duration_unit)?
    } else {
        config.session_config()?
    };
    Ok(session)
}

fn resolve_tick(args: &RunArgs, config: &Config) -> Result<Duration, Box<dyn std::error::Error>> {
    match args.tick_ms {
        Some(0) => Err("tick interval must be greater than zero".into()),
        Some(ms) => Ok(Duration::from_millis(ms)),
        None => {
            config.validate()?;
            Ok(config.tick_interval())
        }
    }
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let session = resolve_session(&args, &config)?;
    let tick = resolve_tick(&args, &config)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let mut out = Output {
        json: args.json,
        live: std::io::stderr().is_terminal(),
        progress_bar: config.display.show_progress_bar,
        unit: config.display.duration_unit,
    };
    let result = runtime.block_on(session_loop(session, tick, !args.idle, &mut out));
    // A pending stdin read would otherwise hold up runtime shutdown.
    runtime.shutdown_timeout(Duration::from_millis(100));
    result
}

async fn session_loop(
    session: SessionConfig,
    tick: Duration,
    autostart: bool,
    out: &mut Output,
) -> Result<(), Box<dyn std::error::Error>> {
    let ticker = IntervalTicker::new(tokio::runtime::Handle::current(), tick);
    let mut controller = RelaxController::new(SystemClock::new(), ticker);
    let mut records = RelaxRecords::new();

    tracing::debug!(
        duration_ms = session.duration_ms(),
        tick_ms = tick.as_millis() as u64,
        "starting session loop"
    );

    if autostart {
        controller.start_with(session);
    } else {
        out.line(&daily_summary(0))?;
    }
    out.events(controller.drain_events(), &mut records)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut render = tokio::time::interval(RENDER_INTERVAL);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let Some(input) = Input::parse(&line) else { continue };
                match input {
                    Input::Relax => {
                        if controller.consume().is_none() {
                            out.refused(&controller.snapshot())?;
                        }
                    }
                    Input::Start => {
                        controller.start_with(session);
                    }
                    Input::Stop => {
                        controller.stop();
                        out.events(controller.drain_events(), &mut records)?;
                        if !out.json {
                            let today = Local::now().date_naive();
                            out.line(&daily_summary(records.count_on(today, &Local)))?;
                        }
                    }
                    Input::Status => out.status(&controller.snapshot())?,
                    Input::Records => out.records(&records)?,
                    Input::Help => {
                        out.line("commands: relax (r), start, stop (s), status, records, quit (q)")?
                    }
                    Input::Quit => break,
                    Input::Unknown(word) => out.line(&format!("unknown command: {word}"))?,
                }
                out.events(controller.drain_events(), &mut records)?;
            }
            _ = render.tick() => {
                out.events(controller.drain_events(), &mut records)?;
                out.live_line(&controller.snapshot());
            }
        }
    }

    controller.stop();
    out.events(controller.drain_events(), &mut records)?;
    out.clear_live();
    Ok(())
}

struct Output {
    json: bool,
    live: bool,
    progress_bar: bool,
    unit: DurationUnit,
}

impl Output {
    fn line(&mut self, text: &str) -> std::io::Result<()> {
        self.clear_live();
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{text}")?;
        stdout.flush()
    }

    fn json_line<T: serde::Serialize>(
        &mut self,
        value: &T,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let text = serde_json::to_string(value)?;
        Ok(self.line(&text)?)
    }

    fn events(
        &mut self,
        events: Vec<Event>,
        records: &mut RelaxRecords,
    ) -> Result<(), Box<dyn std::error::Error>> {
        for event in events {
            if let Event::Relaxed { relax, .. } = &event {
                records.push(relax.clone());
            }
            if self.json {
                self.json_line(&event)?;
            } else {
                let text = describe(&event, self.unit);
                self.line(&text)?;
            }
        }
        Ok(())
    }

    fn refused(&mut self, snap: &SessionSnapshot) -> Result<(), Box<dyn std::error::Error>> {
        let reason = if snap.running {
            "no relax tokens left"
        } else {
            "session is not running"
        };
        if self.json {
            self.json_line(&serde_json::json!({ "type": "relax_refused", "reason": reason }))
        } else if snap.running {
            Ok(self.line(&format!("{reason}: {}", snap.hint))?)
        } else {
            Ok(self.line(reason)?)
        }
    }

    fn status(&mut self, snap: &SessionSnapshot) -> Result<(), Box<dyn std::error::Error>> {
        if self.json {
            return self.json_line(&Event::StateSnapshot(snap.clone()));
        }
        let text = if snap.running {
            format!(
                "{} {} | next in {} of {} | {:.0}% | relaxed {} times",
                snap.prompt,
                snap.balance,
                snap.remaining_display,
                self.unit.describe(snap.duration_ms),
                snap.progress_pct,
                snap.total_consumed
            )
        } else {
            "idle".to_string()
        };
        Ok(self.line(&text)?)
    }

    fn records(&mut self, records: &RelaxRecords) -> Result<(), Box<dyn std::error::Error>> {
        if self.json {
            let entries: Vec<_> = records.iter().collect();
            return self.json_line(&entries);
        }
        if records.is_empty() {
            return Ok(self.line("No records yet")?);
        }
        for row in records.rows(&Local) {
            self.line(&format!("{} {}  RELAX {}", row.date, row.time, row.label))?;
        }
        let today = Local::now().date_naive();
        Ok(self.line(&daily_summary(records.count_on(today, &Local)))?)
    }

    fn live_line(&mut self, snap: &SessionSnapshot) {
        if !self.live || !snap.running {
            return;
        }
        let mut line = format!(
            "\r\x1b[2K{} {} | {}",
            snap.prompt, snap.balance, snap.remaining_display
        );
        if self.progress_bar {
            line.push_str(&format!(" [{}]", progress_bar(snap.progress_pct, PROGRESS_BAR_WIDTH)));
        }
        let mut stderr = std::io::stderr().lock();
        let _ = write!(stderr, "{line}");
        let _ = stderr.flush();
    }

    fn clear_live(&mut self) {
        if self.live {
            let mut stderr = std::io::stderr().lock();
            let _ = write!(stderr, "\r\x1b[2K");
            let _ = stderr.flush();
        }
    }
}

fn describe(event: &Event, unit: DurationUnit) -> String {
    match event {
        Event::SessionStarted { duration_ms, .. } => format!(
            "session started: one relax token every {} ({})",
            format_remaining(*duration_ms),
            unit.describe(*duration_ms)
        ),
        Event::TokenAccrued { balance, .. } => format!("+1 relax token (balance {balance})"),
        Event::Relaxed { relax, balance } => {
            let row = row_for(relax, &Local);
            format!("RELAX {} at {} (balance {balance})", row.label, row.time)
        }
        Event::SessionStopped { total_consumed, .. } => {
            format!("session stopped after {total_consumed} relaxes")
        }
        Event::StateSnapshot(snap) => {
            format!("balance {} | {}", snap.balance, snap.remaining_display)
        }
    }
}

fn progress_bar(pct: f64, width: usize) -> String {
    let filled = ((pct / 100.0) * width as f64).round().clamp(0.0, width as f64) as usize;
    format!("{}{}", "#".repeat(filled), "-".repeat(width - filled))
}
