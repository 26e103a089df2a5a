use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Parser};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::commands::{expand_command_abbrev, known_command_names};
use crate::config::Config;

#[derive(Debug, Clone)]
pub struct PreprocessedArgs {
    pub cleaned_args: Vec<OsString>,
    pub rc_overrides: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct KeyVal {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for KeyVal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        Ok(Self {
            key: k.trim().to_string(),
            value: v.trim().to_string(),
        })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "ticklist",
    version,
    about = "ticklist: a small persistent to-do checklist",
    disable_help_subcommand = true,
    arg_required_else_help = false
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count)]
    pub quiet: u8,

    #[arg(
        long = "rc",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append
    )]
    pub rc_overrides: Vec<KeyVal>,

    #[arg(long = "ticklistrc")]
    pub ticklistrc: Option<PathBuf>,

    #[arg(long = "data")]
    pub data: Option<PathBuf>,

    /// Answer yes to the clear-all confirmation.
    #[arg(short = 'y', long = "yes")]
    pub yes: bool,

    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub rest: Vec<OsString>,
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

/// Pulls positional `rc.key=value` / `rc.key:value` overrides out of the
/// argument list before clap sees it.
#[tracing::instrument(skip_all)]
pub fn preprocess_args(raw: &[OsString]) -> anyhow::Result<PreprocessedArgs> {
    let mut cleaned = Vec::with_capacity(raw.len());
    let mut overrides: Vec<(String, String)> = Vec::new();

    let mut iter = raw.iter().cloned();
    if let Some(bin) = iter.next() {
        cleaned.push(bin);
    }

    for arg in iter {
        let s = arg.to_string_lossy();
        if let Some(rest) = s.strip_prefix("rc.") {
            let parsed = rest
                .split_once('=')
                .or_else(|| rest.split_once(':'))
                .map(|(k, v)| (format!("rc.{k}"), v.to_string()));

            if let Some((k, v)) = parsed {
                debug!(key = %k, value = %v, "captured positional rc override");
                overrides.push((k, v));
                continue;
            }
        }

        cleaned.push(arg);
    }

    Ok(PreprocessedArgs {
        cleaned_args: cleaned,
        rc_overrides: overrides,
    })
}

/// A resolved command line: the command plus its arguments. Ids written
/// before the command (`ticklist 3 done`) are folded into `args`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: String,
    pub args: Vec<String>,
}

impl Invocation {
    #[tracing::instrument(skip(cfg, rest))]
    pub fn parse(cfg: &Config, rest: Vec<OsString>) -> anyhow::Result<Self> {
        let tokens: Vec<String> = rest
            .into_iter()
            .map(|arg| arg.to_string_lossy().to_string())
            .collect();

        if tokens.is_empty() {
            let cmd = cfg
                .get("default.command")
                .unwrap_or_else(|| "list".to_string());
            debug!(command = %cmd, "no explicit command, using default");
            return Ok(Self {
                command: cmd,
                args: vec![],
            });
        }

        if tokens.len() == 1 && tokens[0].parse::<u64>().is_ok() {
            debug!(token = %tokens[0], "single numeric token interpreted as task info query");
            return Ok(Self {
                command: "info".to_string(),
                args: tokens,
            });
        }

        let known = known_command_names();
        for (i, token) in tokens.iter().enumerate() {
            if let Some(full) = expand_command_abbrev(token, &known) {
                if i > 0 && !tokens[..i].iter().all(|t| looks_like_id_list(t)) {
                    break;
                }
                debug!(
                    token = %token,
                    expanded = %full,
                    split_index = i,
                    "resolved command token"
                );
                let mut args = tokens[..i].to_vec();
                args.extend_from_slice(&tokens[i + 1..]);
                return Ok(Self {
                    command: full.to_string(),
                    args,
                });
            }
        }

        Err(anyhow!(
            "unknown command: {} (try `ticklist help`)",
            tokens[0]
        ))
    }
}

fn looks_like_id_list(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|ch| ch.is_ascii_digit() || ch == ',' || ch == '-')
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use super::{Invocation, preprocess_args};
    use crate::config::Config;

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn positional_rc_overrides_are_extracted() {
        let pre = preprocess_args(&os(&[
            "ticklist",
            "rc.color=off",
            "list",
            "rc.confirmation:off",
        ]))
        .expect("preprocess");

        assert_eq!(pre.cleaned_args, os(&["ticklist", "list"]));
        assert_eq!(
            pre.rc_overrides,
            vec![
                ("rc.color".to_string(), "off".to_string()),
                ("rc.confirmation".to_string(), "off".to_string()),
            ]
        );
    }

    #[test]
    fn empty_invocation_uses_default_command() {
        let cfg = Config::default();
        let inv = Invocation::parse(&cfg, vec![]).expect("parse");
        assert_eq!(inv.command, "list");
        assert!(inv.args.is_empty());
    }

    #[test]
    fn abbreviations_and_leading_ids() {
        let cfg = Config::default();

        let inv = Invocation::parse(&cfg, os(&["del", "4"])).expect("parse");
        assert_eq!(inv.command, "delete");
        assert_eq!(inv.args, vec!["4"]);

        let inv = Invocation::parse(&cfg, os(&["2,3", "done"])).expect("parse");
        assert_eq!(inv.command, "done");
        assert_eq!(inv.args, vec!["2,3"]);

        let inv = Invocation::parse(&cfg, os(&["7"])).expect("parse");
        assert_eq!(inv.command, "info");
        assert_eq!(inv.args, vec!["7"]);
    }

    #[test]
    fn add_keeps_command_words_in_text() {
        let cfg = Config::default();
        let inv = Invocation::parse(&cfg, os(&["add", "clear", "the", "list"])).expect("parse");
        assert_eq!(inv.command, "add");
        assert_eq!(inv.args, vec!["clear", "the", "list"]);
    }

    #[test]
    fn ambiguous_or_unknown_command_fails() {
        let cfg = Config::default();
        assert!(Invocation::parse(&cfg, os(&["d", "1"])).is_err());
        assert!(Invocation::parse(&cfg, os(&["buy", "milk"])).is_err());
    }
}
