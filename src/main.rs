mod app;
mod calendar;
mod config;
mod editor;
mod export;
mod grid;
mod help;
mod jumpto;
mod logging;
mod model;
mod popup;
mod score;
mod store;
mod theme;
mod tracker;
use crate::app::App;
use crate::calendar::{CalendarDate, Navigator, ViewMode};
use crate::config::{Config, ConfigError, VIEW_VAR};
use crate::store::DirStore;
use crate::tracker::Tracker;
use anyhow::Context;
use lexopt::{Arg, Parser, ValueExt};
use ratatui::DefaultTerminal;
use std::path::PathBuf;
use time::OffsetDateTime;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct RunOptions {
    date: Option<CalendarDate>,
    view: Option<ViewMode>,
    data_dir: Option<PathBuf>,
    export_dir: Option<PathBuf>,
}

impl RunOptions {
    /// Reads settings through `get` (the process environment when run for
    /// real), with command-line values taking precedence.  An environment
    /// value overridden on the command line is not parsed at all.
    fn resolve<F>(self, mut get: F) -> Result<(Config, Option<CalendarDate>), ConfigError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let view_given = self.view.is_some();
        let config = Config::from_env_with(|key| {
            if view_given && key == VIEW_VAR {
                None
            } else {
                get(key)
            }
        })?;
        Ok(self.apply(config))
    }

    fn apply(self, mut config: Config) -> (Config, Option<CalendarDate>) {
        if let Some(view) = self.view {
            config.view_mode = view;
        }
        if let Some(dir) = self.data_dir {
            config.data_dir = dir;
        }
        if let Some(dir) = self.export_dir {
            config.export_dir = dir;
        }
        (config, self.date)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum Command {
    Run(RunOptions),
    Help,
    Version,
}

impl Command {
    fn from_parser(mut parser: Parser) -> Result<Command, lexopt::Error> {
        let mut opts = RunOptions::default();
        while let Some(arg) = parser.next()? {
            match arg {
                Arg::Short('h') | Arg::Long("help") => return Ok(Command::Help),
                Arg::Short('V') | Arg::Long("version") => return Ok(Command::Version),
                Arg::Long("view") => opts.view = Some(parser.value()?.parse()?),
                Arg::Long("data-dir") => opts.data_dir = Some(PathBuf::from(parser.value()?)),
                Arg::Long("export-dir") => {
                    opts.export_dir = Some(PathBuf::from(parser.value()?));
                }
                Arg::Value(value) if opts.date.is_none() => {
                    opts.date = Some(value.parse()?);
                }
                _ => return Err(arg.unexpected()),
            }
        }
        Ok(Command::Run(opts))
    }

    fn run(self) -> anyhow::Result<()> {
        match self {
            Command::Run(opts) => {
                let (config, date) = opts
                    .resolve(|key| std::env::var(key).ok())
                    .context("invalid configuration")?;
                let _guard = logging::init(&config)?;
                let today = OffsetDateTime::now_local()
                    .context("failed to determine local date")?
                    .date();
                let mut navigator = Navigator::new(CalendarDate::new(today), config.view_mode);
                if let Some(date) = date {
                    navigator = navigator.start_date(date);
                }
                let store = DirStore::open(&config.data_dir).with_context(|| {
                    format!("failed to open data directory {}", config.data_dir.display())
                })?;
                let tracker = Tracker::new(store, navigator);
                let r = with_terminal(|mut terminal| {
                    terminal.hide_cursor().context("failed to hide cursor")?;
                    App::new(tracker, config.export_dir).run(terminal)?;
                    Ok(())
                });
                if let Err(ref e) = r {
                    tracing::error!(error = ?e, "exiting with error");
                } else {
                    tracing::info!("exiting");
                }
                r
            }
            Command::Help => {
                println!("Usage: sleeptrack [OPTIONS] [YYYY-MM-DD]");
                println!();
                println!("Terminal sleep-tracking dashboard with daily ratings and scores");
                println!();
                println!("Options:");
                println!("  --view <week|biweek|month>");
                println!("                    Initial view  [env: SLEEPTRACK_VIEW]");
                println!("  --data-dir <DIR>  Directory holding saved data  [env: SLEEPTRACK_DATA_DIR]");
                println!("  --export-dir <DIR>");
                println!("                    Directory for CSV exports  [env: SLEEPTRACK_EXPORT_DIR]");
                println!("  -h, --help        Display this help message and exit");
                println!("  -V, --version     Show the program version and exit");
                println!();
                println!("Logs are written under <DIR>/logs; set SLEEPTRACK_LOG to adjust the filter.");
                Ok(())
            }
            Command::Version => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    Command::from_parser(Parser::from_env())?.run()
}

fn with_terminal<F, T>(func: F) -> anyhow::Result<T>
where
    F: FnOnce(DefaultTerminal) -> anyhow::Result<T>,
{
    let terminal = ratatui::init();
    let r = func(terminal);
    ratatui::restore();
    r
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn parse(args: &[&str]) -> Result<Command, lexopt::Error> {
        Command::from_parser(Parser::from_args(args.iter().copied()))
    }

    #[test]
    fn test_no_args() {
        assert_eq!(parse(&[]).ok(), Some(Command::Run(RunOptions::default())));
    }

    #[test]
    fn test_all_options() {
        let cmd = parse(&[
            "--view",
            "month",
            "--data-dir",
            "/tmp/data",
            "--export-dir=/tmp/out",
            "2024-06-03",
        ]);
        assert_eq!(
            cmd.ok(),
            Some(Command::Run(RunOptions {
                date: Some(CalendarDate::new(date!(2024 - 06 - 03))),
                view: Some(ViewMode::Month),
                data_dir: Some(PathBuf::from("/tmp/data")),
                export_dir: Some(PathBuf::from("/tmp/out")),
            }))
        );
    }

    #[test]
    fn test_bad_values() {
        assert!(parse(&["06/03/2024"]).is_err());
        assert!(parse(&["--view", "year"]).is_err());
        assert!(parse(&["2024-06-03", "2024-06-04"]).is_err());
    }

    #[test]
    fn test_help_and_version() {
        assert_eq!(parse(&["--help", "2024-06-03"]).ok(), Some(Command::Help));
        assert_eq!(parse(&["-V"]).ok(), Some(Command::Version));
    }

    fn env_view(view: &'static str) -> impl FnMut(&str) -> Option<String> {
        move |k| (k == "SLEEPTRACK_VIEW").then(|| view.to_owned())
    }

    #[test]
    fn test_flags_override_environment() {
        let env = Config::from_env_with(env_view("biweek")).expect("cfg");
        assert_eq!(env.view_mode, ViewMode::Biweek);
        let opts = RunOptions {
            view: Some(ViewMode::Week),
            export_dir: Some(PathBuf::from("out")),
            ..RunOptions::default()
        };
        let (config, date) = opts.resolve(env_view("biweek")).expect("cfg");
        assert_eq!(config.view_mode, ViewMode::Week);
        assert_eq!(config.export_dir, PathBuf::from("out"));
        assert_eq!(config.data_dir, env.data_dir);
        assert_eq!(date, None);
    }

    #[test]
    fn test_view_flag_hides_bad_environment_view() {
        let opts = RunOptions {
            view: Some(ViewMode::Month),
            ..RunOptions::default()
        };
        let (config, _) = opts.resolve(env_view("fortnight")).expect("cfg");
        assert_eq!(config.view_mode, ViewMode::Month);
        assert!(RunOptions::default().resolve(env_view("fortnight")).is_err());
    }
}
