//! Command templates sent over the control socket
//!
//! A command is a template with `{name}` placeholders. Executing it checks
//! every placeholder has a value, renders the command with runs of spaces
//! collapsed (empty optional clauses leave no gaps), sends it once, and runs
//! the reply text through the command's parser.

use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;
use log::debug;
use regex::{Captures, Regex};

use crate::error::{Error, Result};
use crate::models::{PeerStatus, Reply, Route};
use crate::parse::{parse_protocols, parse_routes};
use crate::socket::Transport;

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\{(\w+)\}").unwrap();
    static ref SPACES: Regex = Regex::new(r" +").unwrap();
}

/// Value bound to a template placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Text(String),
    Flag(bool),
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Param::Text(text) => write!(f, "{}", text),
            Param::Flag(flag) => write!(f, "{}", flag),
        }
    }
}

impl From<&str> for Param {
    fn from(text: &str) -> Self {
        Param::Text(text.to_string())
    }
}

impl From<String> for Param {
    fn from(text: String) -> Self {
        Param::Text(text)
    }
}

impl From<bool> for Param {
    fn from(flag: bool) -> Self {
        Param::Flag(flag)
    }
}

/// Placeholder name -> value
#[derive(Debug, Clone, Default)]
pub struct Params(HashMap<String, Param>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<V: Into<Param>>(mut self, name: &str, value: V) -> Self {
        self.set(name, value);
        self
    }

    pub fn set<V: Into<Param>>(&mut self, name: &str, value: V) {
        self.0.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Param> {
        self.0.get(name)
    }
}

/// Fill `template` from `params`, collapsing repeated spaces
///
/// Fails with [`Error::MissingCommandArgument`] naming the first unbound
/// placeholder; nothing is rendered in that case.
pub fn render(template: &str, params: &Params) -> Result<String> {
    if let Some(missing) = PLACEHOLDER
        .captures_iter(template)
        .map(|caps| caps.get(1).map_or("", |m| m.as_str()))
        .find(|name| params.get(name).is_none())
    {
        return Err(Error::MissingCommandArgument(missing.to_string()));
    }
    let filled = PLACEHOLDER.replace_all(template, |caps: &Captures| {
        let name = caps.get(1).map_or("", |m| m.as_str());
        params.get(name).map(Param::to_string).unwrap_or_default()
    });
    Ok(SPACES.replace_all(&filled, " ").trim_end().to_string())
}

/// A command BIRD understands, plus how to read its reply
pub trait BirdCommand {
    const TEMPLATE: &'static str;
    /// Blank lines are part of the reply rather than its end
    const ALLOW_EMPTY_LINES: bool = false;

    type Output;

    fn parse(text: String) -> Self::Output;
}

/// Render `C` with `params`, send it once over `transport`, and parse a successful reply
///
/// Failed replies pass through untouched.
pub async fn execute<C, T>(transport: &mut T, params: &Params) -> Result<Reply<C::Output>>
where
    C: BirdCommand,
    T: Transport,
{
    let command = render(C::TEMPLATE, params)?;
    debug!("Executing '{}'", command);
    let reply = transport.send(&command, C::ALLOW_EMPTY_LINES).await;
    Ok(reply.map(C::parse))
}

/// `configure check "<file>"`: parse a config file without applying it
pub struct ValidateConfig;

impl BirdCommand for ValidateConfig {
    const TEMPLATE: &'static str = r#"configure check "{config_filename}""#;
    type Output = String;

    fn parse(text: String) -> String {
        text
    }
}

/// `configure "<file>"`: make a config file the live configuration
pub struct Configure;

impl BirdCommand for Configure {
    const TEMPLATE: &'static str = r#"configure "{config_filename}""#;
    type Output = String;

    fn parse(text: String) -> String {
        text
    }
}

pub struct ShowProtocols;

impl BirdCommand for ShowProtocols {
    const TEMPLATE: &'static str = "show protocols all {wildcard}";
    // Protocol blocks are separated by blank lines
    const ALLOW_EMPTY_LINES: bool = true;
    type Output = Vec<PeerStatus>;

    fn parse(text: String) -> Vec<PeerStatus> {
        parse_protocols(&text)
    }
}

pub struct ShowRoute;

impl BirdCommand for ShowRoute {
    const TEMPLATE: &'static str = "show route {prefix} {table} {cond} {detail} {export} {protocol}";
    type Output = Vec<Route>;

    fn parse(text: String) -> Vec<Route> {
        parse_routes(&text)
    }
}
