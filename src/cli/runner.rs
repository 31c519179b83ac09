//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::Config;
use crate::error::{Error, Result, ResultExt};
use crate::form::{FieldValue, Form};
use crate::http::ApiClient;
use crate::pagination::{parse_link_header_strict, FilteredPaginator, Paginator};
use crate::types::QueryData;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Links { header } => self.links(header),
            Commands::Browse { paginator, query } => self.browse(paginator, query).await,
            Commands::Validate { form, values } => self.validate(form, values),
        }
    }

    /// Load the configuration file, or defaults when none was given
    fn load_config(&self) -> Result<Config> {
        match &self.cli.config {
            Some(path) => {
                debug!("Loading config from {}", path.display());
                Config::from_file(path)
            }
            None => Ok(Config::default()),
        }
    }

    /// Parse a header strictly and print the relation map
    fn links(&self, header: &str) -> Result<()> {
        let links: BTreeMap<_, _> = parse_link_header_strict(header)?.into_iter().collect();
        output_message(self.cli.format, &json!(links));
        Ok(())
    }

    /// Browse a paginator, driven by commands on stdin
    async fn browse(&self, name: &str, query: &[String]) -> Result<()> {
        let config = self.load_config()?;
        let mut paginator_config = config.paginator(name)?.clone();
        paginator_config.query.extend(parse_query_pairs(query)?);

        let client = Arc::new(ApiClient::with_config(config.client.to_http_config())?);
        let filtered = match paginator_config.filter_param {
            Some(_) => Some(FilteredPaginator::json(Arc::clone(&client), &paginator_config)?),
            None => None,
        };
        let paginator = match &filtered {
            Some(filtered) => filtered.paginator().clone(),
            None => Paginator::json(client, &paginator_config),
        };

        let format = self.cli.format;
        paginator
            .on_select(move |item| {
                output_message(format, &json!({ "type": "SELECTED", "item": item }));
            })
            .await;

        info!("Browsing '{}' at {}", name, paginator.current_link().await);
        let loaded = paginator.initialize().await;
        self.report(&paginator, loaded).await;

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines
            .next_line()
            .await
            .context("Failed to read command from stdin")?
        {
            let line = line.trim();
            let (command, arg) = line
                .split_once(char::is_whitespace)
                .map_or((line, ""), |(command, arg)| (command, arg.trim()));

            let loaded = match command {
                "n" => paginator.next().await,
                "p" => paginator.prev().await,
                "r" => paginator.refresh().await,
                "f" => match &filtered {
                    Some(filtered) => {
                        let before = paginator.pages_loaded().await;
                        filtered.on_input(arg);
                        filtered.settled().await;
                        paginator.pages_loaded().await > before
                    }
                    None => {
                        warn!("Paginator '{}' has no filter_param", name);
                        continue;
                    }
                },
                "s" => {
                    match arg.parse::<usize>() {
                        Ok(index) if paginator.select(index).await => {}
                        Ok(index) => warn!("No item at index {}", index),
                        Err(_) => warn!("Expected an item index, got '{}'", arg),
                    }
                    continue;
                }
                "q" => break,
                "" => continue,
                other => {
                    warn!("Unknown command '{}' (use n, p, r, f <text>, s <index>, q)", other);
                    continue;
                }
            };

            self.report(&paginator, loaded).await;
        }

        paginator.stop();
        Ok(())
    }

    /// Print the current page after a load, or the error banner when it failed
    async fn report(&self, paginator: &Paginator<Value>, loaded: bool) {
        if loaded {
            output_message(
                self.cli.format,
                &json!({
                    "type": "PAGE",
                    "link": paginator.current_link().await,
                    "next": paginator.has_next().await,
                    "prev": paginator.has_prev().await,
                }),
            );
            for (index, item) in paginator.items().await.into_iter().enumerate() {
                output_message(
                    self.cli.format,
                    &json!({ "type": "ITEM", "index": index, "item": item }),
                );
            }
        } else if paginator.error_output().is_visible() {
            eprintln!(
                "{}",
                json!({ "type": "ERROR", "message": paginator.error_output().text() })
            );
        }
    }

    /// Fill a form from JSON values and submit it
    fn validate(&self, name: &str, values: &str) -> Result<()> {
        let config = self.load_config()?;
        let mut form = Form::new(config.form(name)?)?;

        let values: serde_json::Map<String, Value> =
            serde_json::from_str(values).context("Invalid values JSON")?;
        for (id, value) in values {
            let value = field_value(&id, value)?;
            form.set_value(&id, value)?;
        }

        let is_valid = form.submit();

        for input in form.inputs() {
            output_message(
                self.cli.format,
                &json!({
                    "type": "FIELD",
                    "id": input.id(),
                    "value": input.value(),
                    "errors": input.errors(),
                }),
            );
        }
        output_message(
            self.cli.format,
            &json!({ "type": "RESULT", "valid": is_valid, "data": form.data() }),
        );

        if is_valid {
            Ok(())
        } else {
            Err(Error::Other(format!("Form '{name}' is invalid")))
        }
    }
}

/// Output a message
fn output_message(format: OutputFormat, msg: &Value) {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(msg).unwrap_or_default());
        }
        OutputFormat::Pretty => {
            println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
        }
    }
}

/// Parse `key=value` arguments
fn parse_query_pairs(pairs: &[String]) -> Result<QueryData> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .filter(|(key, _)| !key.is_empty())
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .ok_or_else(|| Error::invalid_value("--query", format!("expected KEY=VALUE, got '{pair}'")))
        })
        .collect()
}

/// Convert a JSON value to a form value
fn field_value(id: &str, value: Value) -> Result<FieldValue> {
    match value {
        Value::Bool(checked) => Ok(FieldValue::Checked(checked)),
        Value::String(text) => Ok(FieldValue::Text(text)),
        Value::Number(number) => Ok(FieldValue::Text(number.to_string())),
        Value::Null => Ok(FieldValue::default()),
        other => Err(Error::invalid_value(
            id,
            format!("expected a string, number or boolean, got {other}"),
        )),
    }
}
