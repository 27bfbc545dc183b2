// FILE: src/cli/mod.rs

mod config;
mod handlers;

pub use config::ConfigFile;

use crate::error::{FormError, Result};
use crate::FillOptions;
use clap::{Arg, ArgAction, ArgMatches, Command, ValueEnum};
use std::ffi::OsString;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

pub struct FormCli {
    config: config::ConfigFile,
}

impl Default for FormCli {
    fn default() -> Self {
        Self::new()
    }
}

impl FormCli {
    pub fn new() -> Self {
        Self {
            config: config::ConfigFile::default(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        let matches = self.build_cli().get_matches();
        self.dispatch(&matches)
    }

    /// Run with explicit arguments; the first one is the program name.
    pub fn run_from<I, T>(&mut self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self
            .build_cli()
            .try_get_matches_from(args)
            .map_err(|e| FormError::invalid_format(e.to_string()))?;
        self.dispatch(&matches)
    }

    fn dispatch(&mut self, matches: &ArgMatches) -> Result<()> {
        if let Some(config_path) = matches.get_one::<String>("config") {
            self.config = config::load(config_path)?;
        }

        self.setup_logging(matches.get_count("verbose"))?;

        match matches.subcommand() {
            Some(("forms", _)) => handlers::handle_forms_command(),
            Some(("config", sub_matches)) => handlers::handle_config_command(sub_matches),
            Some(("fill", sub_matches)) => handlers::handle_fill_command(self, sub_matches),
            Some(("scaffold", sub_matches)) => handlers::handle_scaffold_command(sub_matches),
            Some(("check", sub_matches)) => handlers::handle_check_command(self, sub_matches),
            _ => {
                println!("No subcommand specified. Use --help for usage information.");
                Ok(())
            }
        }
    }

    fn build_cli(&self) -> Command {
        Command::new(crate::NAME)
            .version(crate::VERSION)
            .about(crate::DESCRIPTION)
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("Configuration file path (.json or .toml)")
                    .global(true)
                    .action(ArgAction::Set),
            )
            .arg(
                Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .help("Increase verbosity (can be used multiple times)")
                    .global(true)
                    .action(ArgAction::Count),
            )
            .subcommand(Command::new("forms").about("List the supported form types"))
            .subcommand(
                Command::new("config")
                    .about("Print the configuration of a form as JSON")
                    .arg(Arg::new("form").help("Form type").required(true).index(1)),
            )
            .subcommand(
                Command::new("fill")
                    .about("Fill a form page from its payload and print the result")
                    .arg(Arg::new("form").help("Form type").required(true).index(1))
                    .arg(Arg::new("layout").short('l').long("layout").value_name("FILE").help("Page layout file (.toml or .json)"))
                    .arg(Arg::new("payload").short('p').long("payload").value_name("FILE").help("JSON payload file embedded into the page"))
                    .arg(Arg::new("format").short('f').long("format").value_parser(clap::value_parser!(OutputFormat)).help("Output format"))
                    .arg(Arg::new("today").long("today").value_name("YYYY-MM-DD").help("Date used for today defaults"))
                    .arg(Arg::new("decline").long("decline").help("Answer confirm dialogs with cancel").action(ArgAction::SetTrue))
                    .arg(Arg::new("watch").short('w').long("watch").help("Watch the payload and layout files and refill on change").action(ArgAction::SetTrue)),
            )
            .subcommand(
                Command::new("scaffold")
                    .about("Write the standard page layout of a form")
                    .arg(Arg::new("form").help("Form type").required(true).index(1))
                    .arg(Arg::new("output").short('o').long("output").value_name("FILE").help("Output layout file; printed as TOML when omitted")),
            )
            .subcommand(
                Command::new("check")
                    .about("Initialize layout files and report the ones that fail")
                    .arg(Arg::new("input").help("Layout file or directory").required(true).index(1))
                    .arg(Arg::new("recursive").short('r').long("recursive").help("Check all layout files in directory recursively").action(ArgAction::SetTrue)),
            )
    }

    fn setup_logging(&self, verbose_count: u8) -> Result<()> {
        let log_level = match verbose_count {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };
        // A logger may already be installed when the CLI runs more than once in a process
        let _ = env_logger::Builder::from_default_env()
            .filter_level(log_level)
            .format_timestamp_secs()
            .try_init();
        Ok(())
    }

    pub fn build_fill_options(&self, matches: &ArgMatches) -> Result<FillOptions> {
        let mut options = FillOptions {
            today: self.config.today()?,
            confirm_dialogs: self.config.confirm_dialogs.unwrap_or(true),
        };
        if let Some(text) = matches.get_one::<String>("today") {
            options.today = Some(crate::rules::parse_date(text).ok_or_else(|| {
                FormError::invalid_format(format!("Invalid date: {} (expected YYYY-MM-DD)", text))
            })?);
        }
        if matches.get_flag("decline") {
            options.confirm_dialogs = false;
        }
        Ok(options)
    }

    /// Output format from the command line, then the config file, then text
    pub fn output_format(&self, matches: &ArgMatches) -> Result<OutputFormat> {
        if let Some(format) = matches.get_one::<OutputFormat>("format") {
            return Ok(*format);
        }
        match self.config.output_format.as_deref() {
            Some(name) => OutputFormat::from_str(name, true).map_err(|_| {
                FormError::invalid_format(format!("Unknown output format in config: {}", name))
            }),
            None => Ok(OutputFormat::Text),
        }
    }

    pub fn config(&self) -> &config::ConfigFile {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    fn fill_matches(cli: &FormCli, args: &[&str]) -> ArgMatches {
        let mut argv = vec!["formfill", "fill"];
        argv.extend_from_slice(args);
        let matches = cli.build_cli().try_get_matches_from(argv).unwrap();
        matches.subcommand_matches("fill").unwrap().clone()
    }

    #[test]
    fn test_fill_options_prefer_flags_over_config() {
        let mut cli = FormCli::new();
        cli.config.today = Some("2024-01-02".to_string());
        cli.config.output_format = Some("json".to_string());

        let matches = fill_matches(&cli, &["inventory"]);
        let options = cli.build_fill_options(&matches).unwrap();
        assert_eq!(options.today, NaiveDate::from_ymd_opt(2024, 1, 2));
        assert!(options.confirm_dialogs);
        assert_eq!(cli.output_format(&matches).unwrap(), OutputFormat::Json);

        let matches = fill_matches(&cli, &["inventory", "--today", "2024-03-04", "--decline", "-f", "text"]);
        let options = cli.build_fill_options(&matches).unwrap();
        assert_eq!(options.today, NaiveDate::from_ymd_opt(2024, 3, 4));
        assert!(!options.confirm_dialogs);
        assert_eq!(cli.output_format(&matches).unwrap(), OutputFormat::Text);
    }

    #[test]
    fn test_bad_today_flag() {
        let cli = FormCli::new();
        let matches = fill_matches(&cli, &["inventory", "--today", "tomorrow"]);
        assert!(cli.build_fill_options(&matches).is_err());
    }

    #[test]
    fn test_run_scaffold_then_check() {
        let dir = TempDir::new().unwrap();
        let layout_path = dir.path().join("leave.toml");
        let layout = layout_path.to_str().unwrap();

        FormCli::new()
            .run_from(["formfill", "scaffold", "annual_leave", "-o", layout])
            .unwrap();
        assert!(fs::read_to_string(&layout_path).unwrap().contains("annual_leave_form"));

        FormCli::new().run_from(["formfill", "check", layout]).unwrap();
        FormCli::new()
            .run_from(["formfill", "fill", "annual_leave", "-l", layout, "-f", "json"])
            .unwrap();
    }

    #[test]
    fn test_run_rejects_unknown_form() {
        let err = FormCli::new()
            .run_from(["formfill", "config", "vacation"])
            .unwrap_err();
        assert!(matches!(err, FormError::UnknownFormType { .. }));
        assert!(FormCli::new().run_from(["formfill", "fill"]).is_err());
    }
}
