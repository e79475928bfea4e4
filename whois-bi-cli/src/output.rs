//! Plain-text rendering for the terminal.

use whois_bi_client::utils::datetime;
use whois_bi_client::{BatchItem, BatchOutcome, Domain, Job, Record, Whois};

/// `-` for unset timestamps.
fn ts(value: &str) -> &str {
    if datetime::is_unset(value) {
        "-"
    } else {
        value
    }
}

pub fn domains(domains: &[Domain]) {
    if domains.is_empty() {
        println!("No domains");
        return;
    }
    println!("{:<6} {:<40} {:<26} LAST UPDATED", "ID", "DOMAIN", "LAST CHECK");
    for d in domains {
        println!(
            "{:<6} {:<40} {:<26} {}",
            d.id,
            d.name,
            ts(&d.last_job_at),
            ts(&d.last_updated_at)
        );
    }
}

pub fn batch(results: &[BatchItem]) {
    for item in results {
        match &item.outcome {
            BatchOutcome::Created(domain) => println!("added   {} (id {})", item.name, domain.id),
            BatchOutcome::Failed { reason } => println!("failed  {}: {reason}", item.name),
        }
    }
}

pub fn domain(domain: &Domain, whois: Option<&Whois>) {
    println!("{} (id {})", domain.name, domain.id);
    println!("  added:        {}", ts(&domain.added_at));
    println!("  last check:   {}", ts(&domain.last_job_at));
    println!("  last change:  {}", ts(&domain.last_updated_at));
    if let Some(w) = whois {
        println!("  expires:      {}", ts(&w.expiration_date));
    }
}

pub fn records(records: &[Record]) {
    if records.is_empty() {
        println!("No records");
        return;
    }
    for r in records {
        println!("{:<30} {:>7} {:<6} {}", r.name, r.ttl, r.rr_type, r.fields);
    }
}

pub fn whois(history: &[Whois]) {
    if history.is_empty() {
        println!("No WHOIS snapshots");
        return;
    }
    for w in history {
        println!(
            "{}  created {}  updated {}  expires {}",
            ts(&w.added_at),
            ts(&w.created_date),
            ts(&w.updated_date),
            ts(&w.expiration_date)
        );
        for e in &w.date_errors {
            println!("    {e}");
        }
    }
}

pub fn jobs(jobs: &[Job]) {
    if jobs.is_empty() {
        println!("No jobs");
        return;
    }
    for j in jobs {
        let status = if j.is_finished() { "done" } else { "running" };
        println!(
            "#{:<6} {:<8} {}  +{} -{}{}",
            j.id,
            status,
            ts(&j.created_at),
            j.additions,
            j.removals,
            if j.whois_updated { "  whois updated" } else { "" }
        );
        for e in &j.errors {
            println!("    {e}");
        }
    }
}
