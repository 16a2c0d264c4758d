use anyhow::Result;
use anyhow::anyhow;
use anyhow::bail;
use pico_args::Arguments;
use std::ffi::OsStr;
use std::path::PathBuf;
use vocab_srs::Difficulty;
use vocab_srs::Outcome;

const DEFAULT_LIMIT: u32 = 50;

pub const HELP: &str = "\
Track vocabulary mastery with spaced repetition

USAGE:
  vocab-srs [OPTIONS] <COMMAND>

COMMANDS:
  init                              Create the database schema
  review <USER> <ITEM> --correct|--wrong [--time-ms <MS>] [--difficulty <easy|medium|hard>]
                                    Record one answer
  study <USER> [--limit <N>]        Review due items interactively
  due <USER> [--mastered] [--limit <N>]
                                    List items due for review
  show <USER> <ITEM>                Show an item's progress
  stats <USER>                      Show progress statistics
  remove <USER> <ITEM>              Forget an item's progress

OPTIONS:
  -p, --path <PATH>                 Database file [env: SRS_DB] [default: srs.db]
      --no-jitter                   Schedule reviews exactly on their interval
  -h, --help                        Print help
";

#[derive(Debug, PartialEq)]
pub struct Opt {
    pub path: Option<PathBuf>,
    pub no_jitter: bool,
    pub command: Command,
}

#[derive(Debug, PartialEq)]
pub enum Command {
    Init,
    Review {
        user_id: String,
        item_id: String,
        outcome: Outcome,
    },
    Study {
        user_id: String,
        limit: u32,
    },
    Due {
        user_id: String,
        mastered: bool,
        limit: u32,
    },
    Show {
        user_id: String,
        item_id: String,
    },
    Stats {
        user_id: String,
    },
    Remove {
        user_id: String,
        item_id: String,
    },
}

pub fn parse(mut args: Arguments) -> Result<Opt> {
    let path = args.opt_value_from_os_str(["-p", "--path"], parse_path)?;
    let no_jitter = args.contains("--no-jitter");

    let subcommand = args
        .subcommand()?
        .ok_or_else(|| anyhow!("missing command, see --help"))?;

    let command = match subcommand.as_str() {
        "init" => Command::Init,
        "review" => {
            let correct = args.contains("--correct");
            let wrong = args.contains("--wrong");
            let response_time_ms: Option<u32> = args.opt_value_from_str("--time-ms")?;
            let difficulty: Option<Difficulty> = args.opt_value_from_str("--difficulty")?;

            let is_correct = match (correct, wrong) {
                (true, false) => true,
                (false, true) => false,
                _ => bail!("review needs exactly one of --correct or --wrong"),
            };

            Command::Review {
                user_id: args.free_from_str()?,
                item_id: args.free_from_str()?,
                outcome: Outcome {
                    is_correct,
                    response_time_ms,
                    difficulty,
                },
            }
        }
        "study" => Command::Study {
            limit: args.opt_value_from_str("--limit")?.unwrap_or(DEFAULT_LIMIT),
            user_id: args.free_from_str()?,
        },
        "due" => Command::Due {
            mastered: args.contains("--mastered"),
            limit: args.opt_value_from_str("--limit")?.unwrap_or(DEFAULT_LIMIT),
            user_id: args.free_from_str()?,
        },
        "show" => Command::Show {
            user_id: args.free_from_str()?,
            item_id: args.free_from_str()?,
        },
        "stats" => Command::Stats {
            user_id: args.free_from_str()?,
        },
        "remove" => Command::Remove {
            user_id: args.free_from_str()?,
            item_id: args.free_from_str()?,
        },
        other => bail!("unknown command '{other}', see --help"),
    };

    let remaining = args.finish();
    if !remaining.is_empty() {
        bail!("unexpected arguments: {remaining:?}");
    }

    Ok(Opt {
        path,
        no_jitter,
        command,
    })
}

fn parse_path(s: &OsStr) -> Result<PathBuf, &'static str> {
    Ok(s.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    fn parse_args(args: &[&str]) -> Result<Opt> {
        parse(Arguments::from_vec(
            args.iter().map(OsString::from).collect(),
        ))
    }

    #[test]
    fn review() {
        let opt = parse_args(&[
            "-p",
            "words.db",
            "review",
            "ana",
            "abate",
            "--correct",
            "--time-ms",
            "2400",
            "--difficulty",
            "easy",
        ])
        .unwrap();

        assert_eq!(
            opt,
            Opt {
                path: Some(PathBuf::from("words.db")),
                no_jitter: false,
                command: Command::Review {
                    user_id: "ana".to_string(),
                    item_id: "abate".to_string(),
                    outcome: Outcome::correct()
                        .with_response_time(2400)
                        .with_difficulty(Difficulty::Easy),
                },
            }
        );
    }

    #[test]
    fn review_needs_one_outcome() {
        assert!(parse_args(&["review", "ana", "abate"]).is_err());
        assert!(parse_args(&["review", "ana", "abate", "--correct", "--wrong"]).is_err());
    }

    #[test]
    fn due_defaults() {
        let opt = parse_args(&["--no-jitter", "due", "ana"]).unwrap();

        assert!(opt.no_jitter);
        assert_eq!(
            opt.command,
            Command::Due {
                user_id: "ana".to_string(),
                mastered: false,
                limit: DEFAULT_LIMIT,
            }
        );
    }

    #[test]
    fn due_mastered() {
        let opt = parse_args(&["due", "ana", "--mastered", "--limit", "5"]).unwrap();

        assert_eq!(
            opt.command,
            Command::Due {
                user_id: "ana".to_string(),
                mastered: true,
                limit: 5,
            }
        );
    }

    #[test]
    fn rejects_unknown() {
        assert!(parse_args(&["teach", "ana"]).is_err());
        assert!(parse_args(&["stats", "ana", "extra"]).is_err());
        assert!(parse_args(&["review", "ana", "abate", "--wrong", "--difficulty", "trivial"]).is_err());
        assert!(parse_args(&[]).is_err());
    }
}
