//! Text command grammar: `lookup`, `profile` and `stalk`.

use clap::{Args, CommandFactory, Parser, Subcommand};

use crate::csl::TeamRef;
use crate::opendota::HeroFilter;

#[derive(Debug, Parser)]
#[command(
    name = "TangyBot",
    about = "CSL team lookup",
    no_binary_name = true,
    disable_version_flag = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Look up a team
    Lookup(LookupArgs),
    /// Get detailed hero profiles of players
    Profile(ProfileArgs),
    /// Show what users looked up last
    Stalk(StalkArgs),
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct LookupArgs {
    /// The CSL team number or URL to look up
    #[arg(value_parser = parse_team_ref)]
    pub team: Option<TeamRef>,

    /// Use the last team that was looked up by you
    #[arg(short, long)]
    pub last: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct ProfileArgs {
    /// Steam32 IDs of the players
    pub players: Vec<u32>,

    /// Use the last players that were looked up by you
    #[arg(short, long)]
    pub last: bool,

    /// The previous number of games to consider
    #[arg(short = 'n', long, default_value_t = 100)]
    pub num_games: u32,

    /// Report at most the top n heroes played
    #[arg(short, long, default_value_t = 5)]
    pub max_heroes: usize,

    /// Report heroes with at least this many games played
    #[arg(short = 'g', long, default_value_t = 5)]
    pub min_games: u32,

    /// Only consider tournament lobby games
    #[arg(short, long)]
    pub tourney_only: bool,
}

impl ProfileArgs {
    pub fn filter(&self) -> HeroFilter {
        HeroFilter {
            num_games: self.num_games,
            max_heroes: self.max_heroes,
            min_games: self.min_games,
            tourney_only: self.tourney_only,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct StalkArgs {
    /// User names to show session information of
    pub users: Vec<String>,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Lookup(_) => "lookup",
            Self::Profile(_) => "profile",
            Self::Stalk(_) => "stalk",
        }
    }
}

fn parse_team_ref(s: &str) -> Result<TeamRef, String> {
    s.parse().map_err(|e: crate::error::AppError| e.to_string())
}

/// Parse a chat message (without the bot mention). On failure the rendered
/// usage or help text is returned instead.
pub fn parse(text: &str) -> Result<Command, String> {
    Cli::try_parse_from(text.split_whitespace())
        .map(|cli| cli.command)
        .map_err(|e| {
            let mut rendered = e.render().to_string();
            if !rendered.contains("Usage:") {
                rendered.push('\n');
                rendered.push_str(&Cli::command().render_usage().to_string());
            }
            rendered
        })
}

/// Full help text of the command grammar.
pub fn help() -> String {
    Cli::command().render_help().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lookup_forms() {
        assert_eq!(
            parse("lookup 839").unwrap(),
            Command::Lookup(LookupArgs {
                team: Some(TeamRef(839)),
                last: false,
            })
        );
        assert_eq!(
            parse("lookup https://cstarleague.com/dota2/teams/839").unwrap(),
            Command::Lookup(LookupArgs {
                team: Some(TeamRef(839)),
                last: false,
            })
        );
        assert_eq!(
            parse("lookup --last").unwrap(),
            Command::Lookup(LookupArgs {
                team: None,
                last: true,
            })
        );
    }

    #[test]
    fn profile_defaults_and_flags() {
        let Command::Profile(args) = parse("profile 1 2").unwrap() else {
            panic!("expected profile");
        };
        assert_eq!(args.players, vec![1, 2]);
        assert_eq!(args.filter(), HeroFilter::default());

        let Command::Profile(args) =
            parse("profile -l --num-games 20 -m 3 --min-games 2 -t").unwrap()
        else {
            panic!("expected profile");
        };
        assert!(args.last);
        assert_eq!(
            args.filter(),
            HeroFilter {
                num_games: 20,
                max_heroes: 3,
                min_games: 2,
                tourney_only: true,
            }
        );
    }

    #[test]
    fn stalk_takes_optional_users() {
        assert_eq!(
            parse("stalk").unwrap(),
            Command::Stalk(StalkArgs { users: vec![] })
        );
        assert_eq!(
            parse("stalk ann bob").unwrap(),
            Command::Stalk(StalkArgs {
                users: vec!["ann".into(), "bob".into()],
            })
        );
    }

    #[test]
    fn bad_input_yields_usage_text() {
        for input in ["", "dance", "lookup michigan", "profile abc", "profile --bogus"] {
            let usage = parse(input).unwrap_err();
            assert!(usage.contains("Usage"), "{input}: {usage}");
        }
    }

    #[test]
    fn help_lists_every_command() {
        let help = help();
        for name in ["lookup", "profile", "stalk"] {
            assert!(help.contains(name));
        }
    }
}
