//! Predictive Service CLI — 查询模型、提交反馈、生成客户端配置的命令行工具
//!
//! Usage:
//!   predictive-cli [--config <path>] ping                          Connect and show schema version
//!   predictive-cli [--config <path>] query <uri> [<json>]          Query a predictive object
//!   predictive-cli [--config <path>] feedback <key> <json>         Submit feedback
//!   predictive-cli write-config <path> <endpoint> <api-key>        Write a client config file

use anyhow::{bail, Context};
use predictive_client::{ClientConfig, ServiceClient};
use serde_json::Value;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = run(args) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(args: Vec<String>) -> anyhow::Result<()> {
    let (config_file, args) = take_option(args, "--config")?;
    let Some(command) = args.first() else {
        print_usage();
        std::process::exit(1);
    };

    match command.as_str() {
        "ping" => cmd_ping(config_file),
        "query" => cmd_query(config_file, &args[1..]),
        "feedback" => cmd_feedback(config_file, &args[1..]),
        "write-config" => cmd_write_config(&args[1..]),
        "version" | "--version" | "-V" => {
            println!("predictive-cli {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!(
        r#"predictive-cli — Predictive Service 命令行工具

USAGE:
    predictive-cli [--config <path>] <COMMAND> [OPTIONS]

COMMANDS:
    ping                                    Connect and print the service schema version
    query <uri> [<json>] [--timeout <s>]    Query a predictive object with JSON params
    feedback <key> <json>                   Submit free-form feedback for a query result
    write-config <path> <endpoint> <key> [--verify]
                                            Write a [Service Info] client config file
    version                                 Show version information
    help                                    Show this help message

ENVIRONMENT:
    PREDICTIVE_SERVICE_CONFIG               Config file used when --config is absent
    PREDICTIVE_SERVICE_ENDPOINT             Endpoint used when no config file is given
    PREDICTIVE_SERVICE_API_KEY              API key used when no config file is given
    PREDICTIVE_SERVICE_VERIFY_CERTIFICATE   Verify TLS certificates (default false)
    PREDICTIVE_PROXY_URL                    Route requests through this proxy
    RUST_LOG                                Log filter (default info)"#
    );
}

/// Remove `name <value>` from the argument list.
fn take_option(args: Vec<String>, name: &str) -> anyhow::Result<(Option<String>, Vec<String>)> {
    let mut value = None;
    let mut rest = Vec::with_capacity(args.len());
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        if arg == name {
            match iter.next() {
                Some(v) => value = Some(v),
                None => bail!("{name} requires a value"),
            }
        } else {
            rest.push(arg);
        }
    }
    Ok((value, rest))
}

fn take_flag(args: &[String], name: &str) -> (bool, Vec<String>) {
    let present = args.iter().any(|a| a == name);
    let rest = args.iter().filter(|a| *a != name).cloned().collect();
    (present, rest)
}

fn connect(config_file: Option<String>) -> anyhow::Result<ServiceClient> {
    let config = match config_file {
        Some(path) => ClientConfig::from_file(PathBuf::from(path))?,
        None => ClientConfig::from_env()?,
    };
    Ok(ServiceClient::connect(config)?)
}

fn parse_json(raw: &str) -> anyhow::Result<Value> {
    serde_json::from_str(raw).with_context(|| format!("invalid JSON argument: {raw}"))
}

fn cmd_ping(config_file: Option<String>) -> anyhow::Result<()> {
    let client = connect(config_file)?;
    print!("{client}");
    if client.schema_version().is_known() {
        println!("\tschema version: {}", client.schema_version());
    } else {
        println!("\tschema version: unknown");
    }
    Ok(())
}

fn cmd_query(config_file: Option<String>, args: &[String]) -> anyhow::Result<()> {
    let (timeout, args) = take_option(args.to_vec(), "--timeout")?;
    let Some(uri) = args.first() else {
        bail!("usage: predictive-cli query <uri> [<json>] [--timeout <secs>]");
    };
    let params = match args.get(1) {
        Some(raw) => parse_json(raw)?,
        None => Value::Object(Default::default()),
    };

    let mut client = connect(config_file)?;
    if let Some(raw) = timeout {
        let seconds: i64 = raw
            .parse()
            .with_context(|| format!("--timeout expects whole seconds, got {raw}"))?;
        client.set_query_timeout(seconds)?;
    }

    let response = client.query(uri, &params)?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn cmd_feedback(config_file: Option<String>, args: &[String]) -> anyhow::Result<()> {
    let (Some(key), Some(raw)) = (args.first(), args.get(1)) else {
        bail!("usage: predictive-cli feedback <key> <json>");
    };
    let data = parse_json(raw)?;

    let client = connect(config_file)?;
    let response = client.feedback(key, &data)?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn cmd_write_config(args: &[String]) -> anyhow::Result<()> {
    let (verify, args) = take_flag(args, "--verify");
    let [path, endpoint, api_key] = args.as_slice() else {
        bail!("usage: predictive-cli write-config <path> <endpoint> <api-key> [--verify]");
    };

    let config = ClientConfig::new(endpoint.as_str(), api_key.as_str())?.with_verify_certificate(verify);
    config.save(path)?;
    println!("Wrote {path}");
    Ok(())
}
