use clap::{Args, Parser, Subcommand};

use crate::features::reminders::Frequency;

#[derive(Parser, Debug)]
#[command(
    name = "medalarm",
    version,
    about = "Medication reminders and alarms for the signed-in patient"
)]
pub struct Cli {
    /// Use a throwaway in-memory store instead of the reminder API
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll reminders and sound an alarm when one comes due
    Watch {
        /// Seconds between polls (overrides MEDALARM_POLL_SECS)
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Show your reminders
    List,
    /// Add a reminder
    Add(AddArgs),
    /// Delete a reminder by id
    Delete {
        /// Reminder id, as shown by `list`
        id: i64,
    },
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// Medication name
    #[arg(long, short)]
    pub medication: String,
    /// Time of day, 24-hour HH:MM
    #[arg(long, short)]
    pub time: String,
    /// Single date (YYYY-MM-DD); omit to repeat every day
    #[arg(long, short)]
    pub date: Option<String>,
    #[arg(long, short, default_value = "daily", value_parser = parse_frequency)]
    pub frequency: Frequency,
    #[arg(long, short, default_value = "")]
    pub notes: String,
}

fn parse_frequency(raw: &str) -> Result<Frequency, String> {
    raw.parse().map_err(|e: anyhow::Error| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add() {
        let cli = Cli::try_parse_from([
            "medalarm",
            "add",
            "--medication",
            "Metformin",
            "--time",
            "08:00",
            "--frequency",
            "weekly",
        ])
        .unwrap();

        match cli.command {
            Commands::Add(args) => {
                assert_eq!(args.medication, "Metformin");
                assert_eq!(args.time, "08:00");
                assert_eq!(args.date, None);
                assert_eq!(args.frequency, Frequency::Weekly);
                assert_eq!(args.notes, "");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_watch_and_delete() {
        let cli = Cli::try_parse_from(["medalarm", "watch", "--interval", "5"]).unwrap();
        assert!(matches!(cli.command, Commands::Watch { interval: Some(5) }));

        let cli = Cli::try_parse_from(["medalarm", "delete", "12"]).unwrap();
        assert!(matches!(cli.command, Commands::Delete { id: 12 }));
    }

    #[test]
    fn test_dry_run_flag_on_either_side() {
        let cli = Cli::try_parse_from(["medalarm", "--dry-run", "list"]).unwrap();
        assert!(cli.dry_run);
        assert!(matches!(cli.command, Commands::List));

        let cli = Cli::try_parse_from(["medalarm", "delete", "3", "--dry-run"]).unwrap();
        assert!(cli.dry_run);

        let cli = Cli::try_parse_from(["medalarm", "list"]).unwrap();
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_rejects_unknown_frequency() {
        let result = Cli::try_parse_from([
            "medalarm",
            "add",
            "-m",
            "Aspirin",
            "-t",
            "21:00",
            "-f",
            "hourly",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
