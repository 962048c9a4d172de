//! # edi-cli
//!
//! Command-line front end for party EDI identifiers and NAD resolution.
//!
//! Logs go to stderr; command output is JSON (or a bare code) on stdout.

use anyhow::{Context, bail};
use clap::Parser;
use edi_party::{
    IdentifierRegistry, IdentifierType, NadQualifier, PartyEdiConfig, PartyId, PartyMatch,
    PartyResolver, PartyStore, RegistrySnapshot, SupplierEdiRecord, set_identifier_code,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "edi")]
#[command(about = "Party EDI identifiers and NAD supplier resolution")]
#[command(version)]
struct Cli {
    /// Path to configuration file (YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long)]
    verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
enum Commands {
    /// Decode NAD lines and resolve them against a registry
    Resolve {
        /// Input file, one delimited NAD line per row
        input: PathBuf,

        /// Registry snapshot file
        #[arg(short, long)]
        registry: PathBuf,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// List the configured identifier types
    IdentifierTypes,

    /// Print a party's identifier code of the given type
    GetIdentifier {
        /// Registry snapshot file
        #[arg(short, long)]
        registry: PathBuf,

        /// Party id
        #[arg(short, long)]
        party: u64,

        /// Identifier type (vat, edi_head, edi_pay)
        #[arg(short = 't', long = "type", value_parser = parse_identifier_type)]
        kind: IdentifierType,
    },

    /// Write an identifier code on one or more parties
    SetIdentifier {
        /// Registry snapshot file
        #[arg(short, long)]
        registry: PathBuf,

        /// Identifier type (vat, edi_head, edi_pay)
        #[arg(short = 't', long = "type", value_parser = parse_identifier_type)]
        kind: IdentifierType,

        /// Code to write
        #[arg(long)]
        code: String,

        /// Party id; repeat for several parties
        #[arg(short, long = "party", required = true)]
        parties: Vec<u64>,

        /// Where to write the updated snapshot (default: the registry file)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List parties that allow EDI communications
    EdiParties {
        /// Registry snapshot file
        #[arg(short, long)]
        registry: PathBuf,
    },
}

fn parse_identifier_type(value: &str) -> Result<IdentifierType, String> {
    value.parse().map_err(|e: edi_party::Error| e.to_string())
}

/// One resolved input line
#[derive(Serialize)]
struct ResolvedLine {
    line: usize,
    #[serde(flatten)]
    record: SupplierEdiRecord,
    matched_by: Option<PartyMatch>,
}

#[derive(Serialize)]
struct IdentifierTypeEntry {
    code: &'static str,
    label: &'static str,
}

#[derive(Serialize)]
struct EdiPartyEntry<'a> {
    id: PartyId,
    name: &'a str,
    edi_operational_point: Option<&'a str>,
    edi_head: Option<&'a str>,
    edi_pay: Option<&'a str>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => PartyEdiConfig::load_from_file(path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?,
        None => PartyEdiConfig::default(),
    };

    match cli.command {
        Commands::Resolve {
            input,
            registry,
            pretty,
        } => {
            tracing::info!("Resolving {} against {}", input.display(), registry.display());
            let store = load_store(&registry)?;
            let resolved = resolve_file(&input, &store, &config)?;
            print_json(&resolved, pretty)?;
        }
        Commands::IdentifierTypes => {
            let entries: Vec<IdentifierTypeEntry> = config
                .identifier_type_selection()
                .into_iter()
                .map(|(code, label)| IdentifierTypeEntry { code, label })
                .collect();
            print_json(&entries, true)?;
        }
        Commands::GetIdentifier {
            registry,
            party,
            kind,
        } => {
            check_enabled(&config, kind)?;
            let store = load_store(&registry)?;
            let party = store
                .party(PartyId(party))
                .ok_or(edi_party::Error::PartyNotFound(PartyId(party)))?;
            if let Some(code) = edi_party::identifier_code(party, kind) {
                println!("{code}");
            }
        }
        Commands::SetIdentifier {
            registry,
            kind,
            code,
            parties,
            output,
        } => {
            check_enabled(&config, kind)?;
            let mut store = load_store(&registry)?;
            let parties: Vec<PartyId> = parties.into_iter().map(PartyId).collect();
            set_identifier_code(&mut store, &parties, kind, &code)?;

            let target = output.unwrap_or(registry);
            RegistrySnapshot::from_store(&store)
                .save_to_file(&target)
                .with_context(|| format!("failed to write registry {}", target.display()))?;
            tracing::info!(
                "Wrote {} '{}' on {} parties to {}",
                kind,
                code,
                parties.len(),
                target.display()
            );
        }
        Commands::EdiParties { registry } => {
            let store = load_store(&registry)?;
            let entries: Vec<EdiPartyEntry<'_>> = store
                .edi_parties()
                .map(|p| EdiPartyEntry {
                    id: p.id,
                    name: &p.name,
                    edi_operational_point: p.edi_operational_point.as_deref(),
                    edi_head: p.edi_head(),
                    edi_pay: p.edi_pay(),
                })
                .collect();
            print_json(&entries, true)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_store(path: &Path) -> anyhow::Result<PartyStore> {
    let store = RegistrySnapshot::load_from_file(path)
        .and_then(RegistrySnapshot::into_store)
        .with_context(|| format!("failed to load registry {}", path.display()))?;
    Ok(store)
}

fn check_enabled(config: &PartyEdiConfig, kind: IdentifierType) -> anyhow::Result<()> {
    if !config.is_enabled(kind) {
        bail!("identifier type '{kind}' is not enabled in the configuration");
    }
    Ok(())
}

fn resolve_file(
    input: &Path,
    store: &PartyStore,
    config: &PartyEdiConfig,
) -> anyhow::Result<Vec<ResolvedLine>> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let resolver = PartyResolver::new(store).with_config(config);

    let mut resolved = Vec::new();
    let mut unmatched = 0;
    for (index, raw) in content.lines().enumerate() {
        let line = index + 1;
        if raw.trim().is_empty() {
            continue;
        }

        let mut record = decode_line(raw, config.delimiter)
            .with_context(|| format!("{}:{line}", input.display()))?;
        let resolution = resolver.resolve(&mut record);
        if !record.is_resolved() {
            tracing::warn!("line {}: no party for '{}'", line, record.edi_code);
        }
        if resolution.is_unresolved() {
            unmatched += 1;
        }

        resolved.push(ResolvedLine {
            line,
            record,
            matched_by: resolution.party_match,
        });
    }

    tracing::info!(
        "Resolve summary: lines={} unmatched={}",
        resolved.len(),
        unmatched
    );
    Ok(resolved)
}

/// Split a flattened NAD line into its tag and tokens and decode it.
fn decode_line(line: &str, delimiter: char) -> edi_party::Result<SupplierEdiRecord> {
    let mut fields = line.trim_end_matches('\r').split(delimiter);
    let qualifier: NadQualifier = fields.next().unwrap_or_default().trim().parse()?;
    let tokens: Vec<String> = fields.map(str::to_string).collect();
    Ok(SupplierEdiRecord::decode(qualifier, &tokens))
}

fn print_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_line_with_vat() {
        let record = decode_line("NADBIV|8400000000017|ESB12345678", '|').unwrap();
        assert_eq!(record.qualifier, NadQualifier::Biv);
        assert_eq!(record.edi_code, "8400000000017");
        assert_eq!(record.vat.as_deref(), Some("ESB12345678"));
    }

    #[test]
    fn test_decode_line_tag_only() {
        let record = decode_line("NADUC\r", '|').unwrap();
        assert_eq!(record.qualifier, NadQualifier::Uc);
        assert_eq!(record.edi_code, "");
    }

    #[test]
    fn test_decode_line_custom_delimiter() {
        let record = decode_line("NADSH;123;ignored", ';').unwrap();
        assert_eq!(record.edi_code, "123");
        assert_eq!(record.vat, None);
    }

    #[test]
    fn test_decode_line_unknown_tag() {
        assert!(matches!(
            decode_line("NADSU|1", '|'),
            Err(edi_party::Error::UnknownQualifier(tag)) if tag == "NADSU"
        ));
    }

    #[test]
    fn test_identifier_type_argument() {
        assert_eq!(parse_identifier_type("edi_pay"), Ok(IdentifierType::EdiPay));
        assert!(parse_identifier_type("EDI_PAY").is_err());
    }
}
