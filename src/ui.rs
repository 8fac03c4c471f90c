// UI layer: command-line arguments and the handlers behind each
// subcommand. Each handler builds a client from the resolved config,
// performs exactly one request and prints either the tree or raw JSON.

use crate::api::{parse_network_filters, PredictaClient, Transport};
use crate::config::Config;
use crate::tree::{self, Charset, Style};
use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use crossterm::execute;
use crossterm::terminal::SetTitle;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use serde_json::Value;
use std::io::{IsTerminal, Write};
use std::time::Duration;

/// Get the digital footprint from an email or phone number.
#[derive(Parser, Debug)]
#[command(name = "predictasearch", version)]
pub struct Cli {
    /// Comma-separated list of networks to search (e.g. facebook,linkedin)
    #[arg(long, value_name = "NETWORKS", global = true)]
    pub filter: Option<String>,

    /// Print the raw JSON response instead of a tree
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Character set for tree guides: utf8, ascii
    #[arg(long, value_name = "CHARSET", default_value = "utf8", global = true)]
    pub charset: Charset,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// One request against the service.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search for a digital footprint using an email address
    Email {
        /// e.g. johndoe@gmail.com
        email: String,
    },
    /// Search for a digital footprint using a phone number
    Phone {
        /// e.g. +1234567890
        phone: String,
    },
    /// List the networks the service can search
    Networks,
}

/// Terminal window title shown while a command runs.
pub const WINDOW_TITLE: &str = "Predicta Search - Get the digital footprint from an email or phone number.";

/// Output options shared by all subcommands.
pub struct Output {
    pub pretty: bool,
    pub style: Style,
}

impl Output {
    /// Options from the parsed arguments; guides are colored only on a terminal.
    pub fn from_cli(cli: &Cli) -> Self {
        let color = std::io::stdout().is_terminal();
        Output {
            pretty: cli.pretty,
            style: Style::new(cli.charset, color),
        }
    }

    /// Write `body` as indented JSON or as a tree under `root_label`.
    pub fn emit<W: Write>(&self, out: &mut W, root_label: &str, body: &Value) -> Result<()> {
        if self.pretty {
            writeln!(out, "{}", to_json_pretty(body)?)?;
        } else {
            write!(out, "{}", tree::render(root_label, body, &self.style))?;
        }
        Ok(())
    }
}

/// Resolve config from the environment, build the HTTP client and run the
/// selected command against stdout.
pub fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env()?;
    let client = PredictaClient::from_config(&config)?;
    let output = Output::from_cli(&cli);
    let is_terminal = std::io::stdout().is_terminal();
    let mut stdout = std::io::stdout().lock();
    set_window_title(&mut stdout, is_terminal)?;
    dispatch(&client, &cli, &output, &mut stdout)
}

/// Set the terminal window title. Nothing is written when `out` is not a
/// terminal, so piped output carries only the results.
fn set_window_title<W: Write>(out: &mut W, is_terminal: bool) -> Result<()> {
    if is_terminal {
        execute!(out, SetTitle(WINDOW_TITLE)).context("setting the terminal title failed")?;
    }
    Ok(())
}

/// Run one subcommand with an already constructed client.
pub fn dispatch<T: Transport, W: Write>(
    client: &PredictaClient<T>,
    cli: &Cli,
    output: &Output,
    out: &mut W,
) -> Result<()> {
    let networks = parse_network_filters(cli.filter.as_deref());

    match &cli.command {
        Command::Email { email } => {
            let records = with_spinner("Searching...", || client.search_by_email(email, networks.as_deref()))
                .with_context(|| format!("email search for {} failed", email))?;
            let body = Value::Array(records);
            output.emit(out, email, &body)
        }
        Command::Phone { phone } => {
            let records = with_spinner("Searching...", || client.search_by_phone(phone, networks.as_deref()))
                .with_context(|| format!("phone search for {} failed", phone))?;
            let body = Value::Array(records);
            output.emit(out, phone, &body)
        }
        Command::Networks => {
            let catalog = with_spinner("Fetching networks...", || client.get_supported_networks())
                .context("fetching supported networks failed")?;
            output.emit(out, "Networks", &Value::Object(catalog))
        }
    }
}

/// Show a spinner on stderr while `f` runs. Nothing is drawn when stderr is
/// not a terminal.
fn with_spinner<R>(message: &'static str, f: impl FnOnce() -> R) -> R {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    let result = f();
    spinner.finish_and_clear();
    result
}

/// JSON indented by four spaces, keys in the order received.
fn to_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(String::from_utf8(buf)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiRequest, ApiResponse, Method};
    use serde_json::json;
    use std::cell::RefCell;

    struct StubTransport {
        body: String,
        calls: RefCell<Vec<ApiRequest>>,
    }

    impl StubTransport {
        fn new(body: &str) -> Self {
            StubTransport {
                body: body.to_string(),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl Transport for StubTransport {
        fn execute(&self, request: &ApiRequest) -> crate::error::Result<ApiResponse> {
            self.calls.borrow_mut().push(request.clone());
            Ok(ApiResponse {
                status: 200,
                body: self.body.clone(),
            })
        }
    }

    fn run_with(args: &[&str], body: Value) -> (String, Vec<ApiRequest>) {
        run_raw(args, &body.to_string())
    }

    /// Like `run_with`, but the service answers with `body` verbatim.
    fn run_raw(args: &[&str], body: &str) -> (String, Vec<ApiRequest>) {
        let cli = Cli::try_parse_from(args.iter().copied()).unwrap();
        let transport = StubTransport::new(body);
        let output = Output {
            pretty: cli.pretty,
            style: Style::new(cli.charset, false),
        };
        let mut out = Vec::new();
        {
            let client = PredictaClient::new(&Config::with_api_key("sk_test_dummy"), &transport).unwrap();
            dispatch(&client, &cli, &output, &mut out).unwrap();
        }
        (String::from_utf8(out).unwrap(), transport.calls.into_inner())
    }

    #[test]
    fn email_renders_tree_under_identifier() {
        let (out, calls) = run_with(
            &["predictasearch", "email", "e@x.com", "--filter", "google, picsart"],
            json!([{"platform": "google", "user_id": "1"}]),
        );
        assert_eq!(out, "e@x.com\n└── Google\n    └── user_id: 1\n");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, Method::Post);
        assert_eq!(
            calls[0].body,
            Some(json!({"input": "e@x.com", "query_type": "email", "networks": ["google", "picsart"]}))
        );
    }

    #[test]
    fn filter_before_subcommand_is_accepted() {
        let (_, calls) = run_with(
            &["predictasearch", "--filter", "tiktok", "phone", "+1234567890"],
            json!([]),
        );
        assert_eq!(calls[0].body.as_ref().unwrap()["networks"], json!(["tiktok"]));
        assert_eq!(calls[0].body.as_ref().unwrap()["query_type"], "phone");
    }

    #[test]
    fn empty_results_print_notice() {
        let (out, _) = run_with(&["predictasearch", "phone", "+1234567890"], json!([]));
        assert_eq!(out, "No results found.\n");
    }

    #[test]
    fn pretty_prints_indented_json_in_received_order() {
        let (out, calls) = run_with(
            &["predictasearch", "--pretty", "networks"],
            json!({"hibp": {"type": "leak"}, "google": {"type": "social"}}),
        );
        let expected = "\
{
    \"hibp\": {
        \"type\": \"leak\"
    },
    \"google\": {
        \"type\": \"social\"
    }
}
";
        assert_eq!(out, expected);
        assert_eq!(calls[0].method, Method::Get);
    }

    #[test]
    fn networks_tree_uses_fixed_root_label() {
        let (out, _) = run_with(
            &["predictasearch", "networks", "--charset", "ascii"],
            json!({"google": {"type": "social"}}),
        );
        assert_eq!(out, "Networks\n`-- google\n    `-- type: social\n");
    }

    #[test]
    fn rejects_unknown_charset() {
        assert!(Cli::try_parse_from(["predictasearch", "--charset", "latin1", "networks"]).is_err());
    }

    #[test]
    fn large_integers_are_printed_digit_for_digit() {
        let body = r#"[{"platform":"google","user_id":114461178896543099856}]"#;

        let (out, _) = run_raw(&["predictasearch", "email", "e@x.com"], body);
        assert_eq!(out, "e@x.com\n└── Google\n    └── user_id: 114461178896543099856\n");

        let (out, _) = run_raw(&["predictasearch", "--pretty", "email", "e@x.com"], body);
        assert!(out.contains("\"user_id\": 114461178896543099856"), "{out}");
    }

    #[test]
    fn non_mapping_results_are_rendered_not_rejected() {
        let (out, _) = run_raw(
            &["predictasearch", "phone", "+1234567890"],
            r#"[null, "loose", {"source": "chess"}]"#,
        );
        assert_eq!(out, "+1234567890\n├── null\n├── loose\n└── Chess\n    └── source: chess\n");
    }

    #[test]
    fn window_title_only_on_a_terminal() {
        let mut piped = Vec::new();
        set_window_title(&mut piped, false).unwrap();
        assert!(piped.is_empty());

        let mut tty = Vec::new();
        set_window_title(&mut tty, true).unwrap();
        let written = String::from_utf8(tty).unwrap();
        assert!(written.contains(WINDOW_TITLE), "{written:?}");
    }
}
