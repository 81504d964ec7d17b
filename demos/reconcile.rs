use serde::Deserialize;
use statement_reconcile::{FormatHint, Member, OpenFee, ReconciliationConfig, StatementImporter};
use std::{env, path::Path};
use tracing_subscriber::EnvFilter;

/// Member and fee snapshot as exported by the membership database.
#[derive(Debug, Default, Deserialize)]
struct Snapshot {
    #[serde(default)]
    members: Vec<Member>,
    #[serde(default)]
    open_fees: Vec<OpenFee>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let statement_path = if args.len() > 1 {
        &args[1]
    } else {
        println!("Using example MT940 data from demos/sample.sta\n");
        "demos/sample.sta"
    };
    let snapshot_path = args.get(2).map_or("demos/members.json", String::as_str);
    let hint: FormatHint = args.get(3).map_or("auto", String::as_str).parse()?;

    let config = match env::var("RECONCILE_CONFIG") {
        Ok(path) => ReconciliationConfig::from_file(path)?,
        Err(_) => ReconciliationConfig::default(),
    };

    let snapshot: Snapshot = serde_json::from_str(&std::fs::read_to_string(snapshot_path)?)?;
    let content = std::fs::read(statement_path)?;
    let filename = Path::new(statement_path)
        .file_name()
        .and_then(|name| name.to_str());

    let importer = StatementImporter::new(config)?;
    let report = importer.import(
        &content,
        filename,
        hint,
        &snapshot.members,
        &snapshot.open_fees,
    )?;

    println!(
        "{} statement ({}): {} transactions, {} matched, {} unmatched, {} rows skipped\n",
        report.format,
        report.encoding,
        report.total,
        report.matched,
        report.unmatched,
        report.skipped_rows
    );

    for (i, item) in report.proposals.iter().enumerate() {
        let tx = &item.proposal.transaction;
        println!("Transaction {}:", i + 1);
        println!("  Date: {}", tx.date);
        println!("  Amount: {} PLN", tx.amount);
        println!("  Description: {}", tx.description);
        if !tx.counterparty.is_empty() {
            println!("  Counterparty: {}", tx.counterparty);
        }
        match &item.proposal.suggestion {
            Some(s) => {
                println!(
                    "  Member: {} (#{}) via {:?}, confidence {}",
                    s.member_name, s.member_id, s.strategy, s.confidence_tier
                );
                if let Some(fee_id) = s.fee_id {
                    println!("  Fee: #{fee_id}");
                }
            }
            None if tx.is_income() => {
                for candidate in importer.suggest_members(tx, &snapshot.members) {
                    println!(
                        "  Candidate: {} (#{}) score {}",
                        candidate.member_name, candidate.member_id, candidate.score
                    );
                }
            }
            None => {}
        }
        if item.auto_match {
            println!("  [pre-selected]");
        }
        println!();
    }

    Ok(())
}
