//! Command parsing for the interactive front end

use crate::error::{LensError, Result};
use crate::events::ViewId;

/// Parsed command from user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Load a symbol into the main view
    Search { symbol: String },
    /// List the popular symbols
    Popular,
    /// Load a popular symbol by 1-based position
    Quick { index: usize },
    /// Turn auto-refresh on or off
    AutoRefresh { enabled: bool },
    /// Open a correlation view for a 1-based news position
    Analyze { news_index: usize },
    /// Set days shown before the news date
    Before { view: ViewId, days: u32 },
    /// Set days shown after the news date
    After { view: ViewId, days: u32 },
    /// Close a correlation view
    Close { view: ViewId },
    /// List open correlation views
    Views,
    Help,
    Exit,
}

impl Command {
    /// Parse a command from user input. Bare text is a search.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        if input.is_empty() {
            return Err(LensError::CommandError("Empty input".to_string()));
        }

        let Some(rest) = input.strip_prefix('/') else {
            return Ok(Command::Search {
                symbol: input.to_uppercase(),
            });
        };

        let parts: Vec<&str> = rest.split_whitespace().collect();
        let Some((cmd, args)) = parts.split_first() else {
            return Err(LensError::CommandError("Empty command".to_string()));
        };
        let cmd = cmd.to_lowercase();

        match cmd.as_str() {
            "search" | "s" => {
                let symbol = args.first().ok_or_else(|| {
                    LensError::CommandError("Missing symbol for search command".to_string())
                })?;
                Ok(Command::Search {
                    symbol: symbol.to_uppercase(),
                })
            }
            "popular" | "p" => Ok(Command::Popular),
            "quick" | "k" => Ok(Command::Quick {
                index: position(args.first(), "quick")?,
            }),
            "auto" => match args.first().map(|a| a.to_lowercase()).as_deref() {
                Some("on") => Ok(Command::AutoRefresh { enabled: true }),
                Some("off") => Ok(Command::AutoRefresh { enabled: false }),
                _ => Err(LensError::CommandError(
                    "Usage: /auto on|off".to_string(),
                )),
            },
            "news" | "n" => Ok(Command::Analyze {
                news_index: position(args.first(), "news")?,
            }),
            "before" | "b" => {
                let (view, days) = view_and_days(args, "before")?;
                Ok(Command::Before { view, days })
            }
            "after" | "a" => {
                let (view, days) = view_and_days(args, "after")?;
                Ok(Command::After { view, days })
            }
            "close" | "c" => Ok(Command::Close {
                view: number(args.first(), "view id", "close")?,
            }),
            "views" | "v" => Ok(Command::Views),
            "help" | "h" | "?" => Ok(Command::Help),
            "exit" | "quit" | "q" => Ok(Command::Exit),
            _ => Err(LensError::CommandError(format!("Unknown command: {cmd}"))),
        }
    }

    pub fn help_text() -> &'static str {
        r"
tickerlens commands
===================

Main view:
  <symbol>                 Load a symbol (e.g. RELIANCE.NS)
  /search <symbol>         Load a symbol
  /popular                 List popular symbols
  /quick <n>               Load the n-th popular symbol
  /auto on|off             Reload the current symbol every interval

News analysis:
  /news <n>                Open a correlation view for the n-th headline
  /before <view> <days>    Days shown before the news date (1-90)
  /after <view> <days>     Days shown after the news date (1-90)
  /close <view>            Close a correlation view
  /views                   List open correlation views

Other:
  /help                    Show this help
  /exit                    Exit

Aliases:
  /s = /search   /p = /popular   /k = /quick   /n = /news
  /b = /before   /a = /after     /c = /close   /v = /views
  /h = /help     /q = /exit

Indian stocks need an exchange suffix: .NS (NSE) or .BO (BSE).
"
    }
}

fn number<T: std::str::FromStr>(arg: Option<&&str>, what: &str, cmd: &str) -> Result<T> {
    let arg = arg.ok_or_else(|| {
        LensError::CommandError(format!("Missing {what} for {cmd} command"))
    })?;
    arg.parse()
        .map_err(|_| LensError::CommandError(format!("Invalid {what}: {arg}")))
}

/// 1-based list position converted to a 0-based index
fn position(arg: Option<&&str>, cmd: &str) -> Result<usize> {
    let n: usize = number(arg, "position", cmd)?;
    n.checked_sub(1)
        .ok_or_else(|| LensError::CommandError("Positions start at 1".to_string()))
}

fn view_and_days(args: &[&str], cmd: &str) -> Result<(ViewId, u32)> {
    let view = number(args.first(), "view id", cmd)?;
    let days = number(args.get(1), "days", cmd)?;
    Ok((view, days))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_text_is_search() {
        let cmd = Command::parse("  reliance.ns ").unwrap();
        assert_eq!(
            cmd,
            Command::Search {
                symbol: "RELIANCE.NS".to_string()
            }
        );

        let cmd = Command::parse("/s tcs.ns").unwrap();
        assert_eq!(
            cmd,
            Command::Search {
                symbol: "TCS.NS".to_string()
            }
        );
    }

    #[test]
    fn test_positions_are_one_based() {
        assert_eq!(Command::parse("/quick 1").unwrap(), Command::Quick { index: 0 });
        assert_eq!(
            Command::parse("/n 3").unwrap(),
            Command::Analyze { news_index: 2 }
        );
        assert!(Command::parse("/news 0").is_err());
        assert!(Command::parse("/news first").is_err());
    }

    #[test]
    fn test_parse_window_commands() {
        assert_eq!(
            Command::parse("/before 2 45").unwrap(),
            Command::Before { view: 2, days: 45 }
        );
        assert_eq!(
            Command::parse("/a 1 7").unwrap(),
            Command::After { view: 1, days: 7 }
        );
        // clamping is the view's job, the parser passes the number through
        assert_eq!(
            Command::parse("/before 1 500").unwrap(),
            Command::Before { view: 1, days: 500 }
        );
        assert!(Command::parse("/after 1").is_err());
        assert!(Command::parse("/after 1 -3").is_err());
    }

    #[test]
    fn test_parse_auto() {
        assert_eq!(
            Command::parse("/auto ON").unwrap(),
            Command::AutoRefresh { enabled: true }
        );
        assert_eq!(
            Command::parse("/auto off").unwrap(),
            Command::AutoRefresh { enabled: false }
        );
        assert!(Command::parse("/auto maybe").is_err());
    }

    #[test]
    fn test_parse_errors() {
        assert!(Command::parse("").is_err());
        assert!(Command::parse("/").is_err());
        assert!(Command::parse("/search").is_err());
        let err = Command::parse("/analyze AAPL").unwrap_err();
        assert_eq!(err.to_string(), "Command error: Unknown command: analyze");
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(Command::parse("/help").unwrap(), Command::Help);
        assert_eq!(Command::parse("/?").unwrap(), Command::Help);
        assert_eq!(Command::parse("/q").unwrap(), Command::Exit);
        assert_eq!(Command::parse("/views").unwrap(), Command::Views);
        assert_eq!(Command::parse("/p").unwrap(), Command::Popular);
        assert_eq!(Command::parse("/close 4").unwrap(), Command::Close { view: 4 });
    }
}
