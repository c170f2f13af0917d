//! Command-line front end.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use crate::card::cards_from_page;
use crate::config::{ResolverConfig, ToggleConfig};
use crate::convert::{CharTableConverter, LanguageToggle};
use crate::dom::parser::parse_html;
use crate::engine::resolver::{CardBoard, MetadataResolver};
use crate::net::fetch::HttpTransport;

const USAGE: &str = "\
usage: friendlink <command> [options]

commands:
  cards <page.html>                  resolve every .friend-card and print JSON
  convert <page.html> [--toggles N]  toggle Simplified/Traditional N times (default 1)

environment:
  FRIENDLINK_PROXIES        comma separated proxy templates
  FRIENDLINK_BACKOFF_MS     pause after a failed proxy (default 500)
  FRIENDLINK_TIMEOUT_SECS   request timeout (default 15)
  FRIENDLINK_DESC_DENYLIST  '|' separated boilerplate descriptions
  RUST_LOG                  log filter (default info)
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Cards { page: PathBuf },
    Convert { page: PathBuf, toggles: usize },
    Help,
    Version,
}

#[derive(Debug)]
pub enum CliError {
    Usage(String),
    Io { path: PathBuf, source: std::io::Error },
    Output(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{}\n\n{}", msg, USAGE),
            CliError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            CliError::Output(msg) => write!(f, "output failed: {}", msg),
        }
    }
}

impl std::error::Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Output(e.to_string())
    }
}

pub fn parse_args<I, S>(args: I) -> Result<Command, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let args: Vec<String> = args.into_iter().map(Into::into).collect();
    let mut iter = args.iter();
    let Some(command) = iter.next() else {
        return Ok(Command::Help);
    };

    match command.as_str() {
        "-h" | "--help" | "help" => Ok(Command::Help),
        "-V" | "--version" => Ok(Command::Version),
        "cards" => {
            let page = iter
                .next()
                .ok_or_else(|| CliError::Usage("cards: missing <page.html>".into()))?;
            if let Some(extra) = iter.next() {
                return Err(CliError::Usage(format!("cards: unexpected argument {:?}", extra)));
            }
            Ok(Command::Cards {
                page: PathBuf::from(page),
            })
        }
        "convert" => {
            let mut page = None;
            let mut toggles = 1;
            while let Some(arg) = iter.next() {
                match arg.as_str() {
                    "--toggles" => {
                        let raw = iter
                            .next()
                            .ok_or_else(|| CliError::Usage("--toggles needs a value".into()))?;
                        toggles = raw.parse().map_err(|_| {
                            CliError::Usage(format!("--toggles: not a count: {:?}", raw))
                        })?;
                    }
                    other if page.is_none() && !other.starts_with('-') => {
                        page = Some(PathBuf::from(other));
                    }
                    other => {
                        return Err(CliError::Usage(format!(
                            "convert: unexpected argument {:?}",
                            other
                        )))
                    }
                }
            }
            let page =
                page.ok_or_else(|| CliError::Usage("convert: missing <page.html>".into()))?;
            Ok(Command::Convert { page, toggles })
        }
        other => Err(CliError::Usage(format!("unknown command {:?}", other))),
    }
}

fn read_page(path: &PathBuf) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.clone(),
        source,
    })
}

pub fn execute(command: Command, out: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Help => write!(out, "{}", USAGE)?,
        Command::Version => writeln!(out, "friendlink {}", env!("CARGO_PKG_VERSION"))?,
        Command::Cards { page } => {
            let html = read_page(&page)?;
            let cards = cards_from_page(&html);
            log::info!("Found {} cards in {}", cards.len(), page.display());

            let config = ResolverConfig::from_env();
            let transport =
                HttpTransport::new(&config).map_err(|e| CliError::Output(e.to_string()))?;
            let resolver = Arc::new(MetadataResolver::new(&config, Arc::new(transport)));

            let mut board = CardBoard::new(cards);
            board.resolve_all(resolver);

            let json = serde_json::to_string_pretty(board.slots())
                .map_err(|e| CliError::Output(e.to_string()))?;
            writeln!(out, "{}", json)?;
        }
        Command::Convert { page, toggles } => {
            let html = read_page(&page)?;
            let mut tree = parse_html(&html);
            let Some(mut toggle) = LanguageToggle::install(&mut tree, &ToggleConfig::default())
            else {
                writeln!(out, "{}", tree.body_text())?;
                return Ok(());
            };

            let converter = CharTableConverter::default();
            let mut label = toggle.label();
            for _ in 0..toggles {
                label = toggle.toggle(&mut tree, &converter);
            }
            writeln!(out, "[{}] {}", label.text, label.title)?;
            writeln!(out, "{}", tree.body_text())?;
        }
    }
    Ok(())
}

/// Entry point for the binary. Returns the process exit code.
pub fn run_from_env() -> i32 {
    let command = match parse_args(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}", e);
            return 2;
        }
    };
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match execute(command, &mut out) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("friendlink: {}", e);
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn parses_commands() {
        assert_eq!(parse_args(Vec::<String>::new()).unwrap(), Command::Help);
        assert_eq!(
            parse_args(["cards", "friends.html"]).unwrap(),
            Command::Cards {
                page: PathBuf::from("friends.html")
            }
        );
        assert_eq!(
            parse_args(["convert", "--toggles", "3", "p.html"]).unwrap(),
            Command::Convert {
                page: PathBuf::from("p.html"),
                toggles: 3
            }
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(parse_args(["cards"]), Err(CliError::Usage(_))));
        assert!(matches!(
            parse_args(["convert", "p.html", "--toggles", "x"]),
            Err(CliError::Usage(_))
        ));
        assert!(matches!(parse_args(["fetch"]), Err(CliError::Usage(_))));
    }

    #[test]
    fn convert_prints_converted_text() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"<html><body>
                <button id="langToggleBtn"><span id="langLabel">简体中文</span></button>
                <p>这个网站</p>
            </body></html>"#
        )
        .unwrap();

        let mut out = Vec::new();
        execute(
            Command::Convert {
                page: file.path().to_path_buf(),
                toggles: 1,
            },
            &mut out,
        )
        .unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("[繁體中文]"));
        assert!(out.contains("這個網站"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = execute(
            Command::Convert {
                page: PathBuf::from("/nonexistent/friends.html"),
                toggles: 1,
            },
            &mut Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, CliError::Io { .. }));
    }
}
