use anyhow::Result;
use std::process;

use super::Session;
use super::helpers::json_error;

pub(crate) fn cmd_backup(session: &Session, json: bool) -> Result<()> {
    let created = session.tracker.backup()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&created)?);
    } else if created.is_empty() {
        eprintln!("Nothing to back up yet.");
    } else {
        println!("Backed up {} file(s):", created.len());
        for path in &created {
            println!("  {}", path.display());
        }
    }

    Ok(())
}

pub(crate) fn cmd_restore(session: &mut Session, json: bool) -> Result<()> {
    if !session.tracker.restore_latest()? {
        let dir = session.tracker.storage().backup_dir().display().to_string();
        if json {
            println!("{}", json_error(&format!("No backups found in {dir}")));
        } else {
            eprintln!("No backups found in {dir}");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::json!({ "restored": true }));
    } else {
        println!("Restored the latest backup.");
    }

    Ok(())
}
