//! Interactive timer session.
//!
//! This command is the display/controls surface around the engine: a
//! 1-second tokio interval is the external scheduling source calling
//! `tick()` and `poll_switch()`, and stdin lines carry user intents.
//! Timer events go to stdout as text or, with `--json`, as JSON lines.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;

use cosmic_focus_core::{Config, DailyTracker, Event, TaskList, TimerEngine, TimerMode};

const HELP: &str = "\
commands:
  start | pause | reset      control the countdown
  mode focus|short|long      switch timer mode
  status                     show the current timer state
  task add <title>           add a task
  task list                  list tasks
  task done <n>              toggle task n
  goal add <text>            add a daily goal
  goal list                  list daily goals
  goal done <n>              toggle goal n
  help | quit";

#[derive(Args)]
pub struct RunArgs {
    /// Start the focus countdown immediately
    #[arg(long)]
    pub auto_start: bool,
    /// Emit timer events as JSON lines instead of text
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(session(args, config))
}

async fn session(args: RunArgs, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let json = args.json;
    let tracker = Arc::new(Mutex::new(DailyTracker::new(
        config.timer.daily_session_target,
    )));
    let mut tasks = TaskList::new();

    let mut engine = TimerEngine::new(config.durations());
    {
        let tracker = Arc::clone(&tracker);
        engine.on_session_complete(move |total| {
            tracker.lock().unwrap().record_sessions(total);
        });
    }
    engine.on_mode_change(|mode, active| log::debug!("mode change: {mode} (running: {active})"));

    if !json {
        println!("cosmic-focus - type 'help' for commands");
    }
    if args.auto_start {
        if let Some(ev) = engine.start() {
            emit(&ev, json);
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if engine.is_running() {
                    if let Some(ev) = engine.tick() {
                        emit(&ev, json);
                    }
                }
                if let Some(ev) = engine.poll_switch() {
                    emit(&ev, json);
                    // Auto-starting the new countdown is host policy; the
                    // engine always lands in the stopped state.
                    if config.timer.auto_start_breaks && engine.mode().is_break() {
                        if let Some(ev) = engine.start() {
                            emit(&ev, json);
                        }
                    }
                }
            }
            line = lines.next_line() => {
                match line? {
                    None => break,
                    Some(line) => {
                        if !handle_line(&line, &mut engine, &mut tasks, &tracker, json) {
                            break;
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

/// User intents accepted inside a session.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Intent {
    Start,
    Pause,
    Reset,
    Mode(TimerMode),
    Status,
    TaskAdd(String),
    TaskList,
    TaskDone(usize),
    GoalAdd(String),
    GoalList,
    GoalDone(usize),
    Help,
    Quit,
}

impl Intent {
    fn parse(line: &str) -> Option<Self> {
        let (head, rest) = split_word(line.trim());
        match head {
            "start" => Some(Intent::Start),
            "pause" => Some(Intent::Pause),
            "reset" => Some(Intent::Reset),
            "status" => Some(Intent::Status),
            "help" => Some(Intent::Help),
            "quit" | "exit" => Some(Intent::Quit),
            "mode" => match rest {
                "focus" => Some(Intent::Mode(TimerMode::Focus)),
                "short" => Some(Intent::Mode(TimerMode::ShortBreak)),
                "long" => Some(Intent::Mode(TimerMode::LongBreak)),
                _ => None,
            },
            "task" => {
                let (sub, arg) = split_word(rest);
                match sub {
                    "add" if !arg.is_empty() => Some(Intent::TaskAdd(arg.to_string())),
                    "list" => Some(Intent::TaskList),
                    "done" => arg.parse().ok().map(Intent::TaskDone),
                    _ => None,
                }
            }
            "goal" => {
                let (sub, arg) = split_word(rest);
                match sub {
                    "add" if !arg.is_empty() => Some(Intent::GoalAdd(arg.to_string())),
                    "list" => Some(Intent::GoalList),
                    "done" => arg.parse().ok().map(Intent::GoalDone),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

fn split_word(input: &str) -> (&str, &str) {
    match input.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (input, ""),
    }
}

/// Dispatch one stdin line. Returns false when the session should end.
fn handle_line(
    line: &str,
    engine: &mut TimerEngine,
    tasks: &mut TaskList,
    tracker: &Arc<Mutex<DailyTracker>>,
    json: bool,
) -> bool {
    if line.trim().is_empty() {
        return true;
    }
    let Some(intent) = Intent::parse(line) else {
        println!("unknown command (try 'help')");
        return true;
    };

    match intent {
        Intent::Start => match engine.start() {
            Some(ev) => emit(&ev, json),
            None => println!("timer is already running or finished"),
        },
        Intent::Pause => match engine.pause() {
            Some(ev) => emit(&ev, json),
            None => println!("timer is not running"),
        },
        Intent::Reset => {
            if let Some(ev) = engine.reset() {
                emit(&ev, json);
            }
        }
        Intent::Mode(mode) => {
            if let Some(ev) = engine.switch_mode(mode) {
                emit(&ev, json);
            }
        }
        Intent::Status => emit(&engine.snapshot(), json),
        Intent::TaskAdd(title) => match tasks.add(&title) {
            Some(task) => println!("added: {}", task.title),
            None => println!("task title cannot be empty"),
        },
        Intent::TaskList => print_tasks(tasks, json),
        Intent::TaskDone(n) => {
            let id = tasks.tasks().get(n.wrapping_sub(1)).map(|t| t.id.clone());
            match id {
                Some(id) => {
                    tasks.toggle(&id);
                    print_tasks(tasks, json);
                }
                None => println!("no task {n}"),
            }
        }
        Intent::GoalAdd(text) => {
            let mut tracker = tracker.lock().unwrap();
            match tracker.add_goal(&text) {
                Some(goal) => println!("added: {}", goal.text),
                None => println!("goal text cannot be empty"),
            }
        }
        Intent::GoalList => print_goals(&tracker.lock().unwrap(), json),
        Intent::GoalDone(n) => {
            let mut tracker = tracker.lock().unwrap();
            let id = tracker.goals().get(n.wrapping_sub(1)).map(|g| g.id.clone());
            match id {
                Some(id) => {
                    tracker.toggle(&id);
                    print_goals(&tracker, json);
                }
                None => println!("no goal {n}"),
            }
        }
        Intent::Help => println!("{HELP}"),
        Intent::Quit => return false,
    }
    true
}

fn emit(event: &Event, json: bool) {
    if json {
        match serde_json::to_string(event) {
            Ok(line) => println!("{line}"),
            Err(e) => log::error!("failed to serialize event: {e}"),
        }
    } else {
        println!("{}", describe(event));
    }
}

fn describe(event: &Event) -> String {
    match event {
        Event::TimerStarted {
            mode,
            remaining_secs,
            ..
        } => format!("{} started - {} remaining", mode.label(), clock(*remaining_secs)),
        Event::TimerPaused { remaining_secs, .. } => {
            format!("paused at {}", clock(*remaining_secs))
        }
        Event::TimerReset { remaining_secs, .. } => {
            format!("reset - {} on the clock", clock(*remaining_secs))
        }
        Event::ModeSwitched {
            mode,
            duration_secs,
            auto,
            ..
        } => {
            let prefix = if *auto { "auto-" } else { "" };
            format!("{prefix}switched to {} ({})", mode.label(), clock(*duration_secs))
        }
        Event::TimerCompleted {
            mode,
            next_mode,
            completed_sessions,
            ..
        } => {
            if *mode == TimerMode::Focus {
                let kind = if *next_mode == TimerMode::LongBreak {
                    "long"
                } else {
                    "short"
                };
                format!(
                    "Focus session completed! Time for a {kind} break. ({completed_sessions} today)"
                )
            } else {
                "Break time's over! Ready to focus again?".to_string()
            }
        }
        Event::StateSnapshot {
            mode,
            is_running,
            remaining_secs,
            total_secs,
            completed_sessions,
            ..
        } => {
            let state = if *is_running { "running" } else { "paused" };
            format!(
                "{} | {} / {} | {state} | sessions today: {completed_sessions}",
                mode.label(),
                clock(*remaining_secs),
                clock(*total_secs),
            )
        }
    }
}

fn print_tasks(tasks: &TaskList, json: bool) {
    if json {
        if let Ok(line) = serde_json::to_string(tasks.tasks()) {
            println!("{line}");
        }
        return;
    }
    if tasks.is_empty() {
        println!("no tasks");
        return;
    }
    for (i, task) in tasks.tasks().iter().enumerate() {
        let mark = if task.completed { "x" } else { " " };
        println!("{}. [{mark}] {}", i + 1, task.title);
    }
}

fn print_goals(tracker: &DailyTracker, json: bool) {
    if json {
        if let Ok(line) = serde_json::to_string(tracker.goals()) {
            println!("{line}");
        }
        return;
    }
    for (i, goal) in tracker.goals().iter().enumerate() {
        let mark = if goal.completed { "x" } else { " " };
        if goal.target > 1 {
            println!(
                "{}. [{mark}] {} ({}/{})",
                i + 1,
                goal.text,
                goal.current,
                goal.target
            );
        } else {
            println!("{}. [{mark}] {}", i + 1, goal.text);
        }
    }
    println!("today: {:.0}% complete", tracker.progress_pct());
}

/// MM:SS display, zero-padded.
fn clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmic_focus_core::Durations;

    #[test]
    fn clock_formats_zero_padded() {
        assert_eq!(clock(0), "00:00");
        assert_eq!(clock(59), "00:59");
        assert_eq!(clock(60), "01:00");
        assert_eq!(clock(1500), "25:00");
        assert_eq!(clock(3601), "60:01");
    }

    #[test]
    fn parse_simple_intents() {
        assert_eq!(Intent::parse("start"), Some(Intent::Start));
        assert_eq!(Intent::parse("  pause "), Some(Intent::Pause));
        assert_eq!(Intent::parse("quit"), Some(Intent::Quit));
        assert_eq!(Intent::parse("exit"), Some(Intent::Quit));
        assert_eq!(Intent::parse("nonsense"), None);
    }

    #[test]
    fn parse_mode_intents() {
        assert_eq!(Intent::parse("mode focus"), Some(Intent::Mode(TimerMode::Focus)));
        assert_eq!(
            Intent::parse("mode short"),
            Some(Intent::Mode(TimerMode::ShortBreak))
        );
        assert_eq!(
            Intent::parse("mode long"),
            Some(Intent::Mode(TimerMode::LongBreak))
        );
        assert_eq!(Intent::parse("mode"), None);
        assert_eq!(Intent::parse("mode cosmic"), None);
    }

    #[test]
    fn parse_task_intents() {
        assert_eq!(
            Intent::parse("task add Write the report"),
            Some(Intent::TaskAdd("Write the report".to_string()))
        );
        assert_eq!(Intent::parse("task list"), Some(Intent::TaskList));
        assert_eq!(Intent::parse("task done 2"), Some(Intent::TaskDone(2)));
        assert_eq!(Intent::parse("task add"), None);
        assert_eq!(Intent::parse("task done two"), None);
    }

    #[test]
    fn parse_goal_intents() {
        assert_eq!(
            Intent::parse("goal add Plan tomorrow"),
            Some(Intent::GoalAdd("Plan tomorrow".to_string()))
        );
        assert_eq!(Intent::parse("goal list"), Some(Intent::GoalList));
        assert_eq!(Intent::parse("goal done 1"), Some(Intent::GoalDone(1)));
    }

    #[test]
    fn handle_line_drives_engine_and_widgets() {
        let mut engine = TimerEngine::with_settle_delay(Durations::default(), 0);
        let mut tasks = TaskList::new();
        let tracker = Arc::new(Mutex::new(DailyTracker::new(4)));

        assert!(handle_line("start", &mut engine, &mut tasks, &tracker, false));
        assert!(engine.is_running());

        assert!(handle_line(
            "task add Ship the release",
            &mut engine,
            &mut tasks,
            &tracker,
            false
        ));
        assert_eq!(tasks.len(), 1);

        assert!(handle_line("task done 1", &mut engine, &mut tasks, &tracker, false));
        assert!(tasks.tasks()[0].completed);

        assert!(handle_line("mode short", &mut engine, &mut tasks, &tracker, false));
        assert_eq!(engine.mode(), TimerMode::ShortBreak);
        assert!(!engine.is_running());

        assert!(!handle_line("quit", &mut engine, &mut tasks, &tracker, false));
    }

    #[test]
    fn describe_completion_messages() {
        let ev = Event::TimerCompleted {
            mode: TimerMode::Focus,
            next_mode: TimerMode::ShortBreak,
            completed_sessions: 1,
            at: chrono::Utc::now(),
        };
        assert_eq!(
            describe(&ev),
            "Focus session completed! Time for a short break. (1 today)"
        );

        let ev = Event::TimerCompleted {
            mode: TimerMode::LongBreak,
            next_mode: TimerMode::Focus,
            completed_sessions: 4,
            at: chrono::Utc::now(),
        };
        assert_eq!(describe(&ev), "Break time's over! Ready to focus again?");
    }
}
