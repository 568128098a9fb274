//! Backup listing and detail views

use chrono::{DateTime, Utc};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::{format_duration, format_size};
use crate::archive::{ArchiveBody, ArchiveDocument};
use crate::backup::BackupInfo;

#[derive(Tabled)]
struct BackupRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "File")]
    filename: String,
    #[tabled(rename = "Type")]
    archive_type: String,
    #[tabled(rename = "Age")]
    age: String,
    #[tabled(rename = "Size")]
    size: String,
}

#[derive(Tabled)]
struct DetailedBackupRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "File")]
    filename: String,
    #[tabled(rename = "Type")]
    archive_type: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Raw")]
    raw_size: String,
    #[tabled(rename = "Gzip")]
    compressed: String,
    #[tabled(rename = "Encrypted")]
    encrypted: String,
}

fn type_label(backup: &BackupInfo) -> String {
    match (backup.archive_type(), backup.read_failure) {
        (Some(archive_type), _) => archive_type.to_string(),
        (None, Some(failure)) => failure.to_string(),
        (None, None) => "unreadable".to_string(),
    }
}

fn yes_no(flag: Option<bool>) -> String {
    match flag {
        Some(true) => "yes".into(),
        Some(false) => "no".into(),
        None => "?".into(),
    }
}

/// Format archives as a table, newest first as given
pub fn format_backup_list(backups: &[BackupInfo], verbose: bool, now: DateTime<Utc>) -> String {
    if backups.is_empty() {
        return "No backups found.".to_string();
    }

    let mut table = if verbose {
        Table::new(backups.iter().enumerate().map(|(i, b)| DetailedBackupRow {
            index: i + 1,
            filename: b.filename.clone(),
            archive_type: type_label(b),
            created: b.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            size: format_size(b.size_bytes),
            raw_size: b
                .metadata
                .as_ref()
                .map(|m| format_size(m.raw_size))
                .unwrap_or_else(|| "?".into()),
            compressed: yes_no(b.metadata.as_ref().map(|m| m.compressed)),
            encrypted: yes_no(b.metadata.as_ref().map(|m| m.encrypted)),
        }))
    } else {
        Table::new(backups.iter().enumerate().map(|(i, b)| BackupRow {
            index: i + 1,
            filename: b.filename.clone(),
            archive_type: type_label(b),
            age: format_duration(now.signed_duration_since(b.created_at)),
            size: format_size(b.size_bytes),
        }))
    };
    table.with(Style::psql());

    format!("{}\n\nTotal: {} backup(s)", table, backups.len())
}

/// Format the details of one decoded archive
pub fn format_backup_details(backup: &BackupInfo, document: &ArchiveDocument) -> String {
    let metadata = &document.metadata;
    let mut output = String::new();

    output.push_str("Backup Details\n");
    output.push_str("==============\n");
    output.push_str(&format!("File:           {}\n", backup.path.display()));
    output.push_str(&format!("Size:           {}\n", format_size(backup.size_bytes)));
    output.push_str(&format!("Raw size:       {}\n", format_size(metadata.raw_size)));
    output.push_str(&format!(
        "Created:        {}\n",
        metadata.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output.push_str(&format!("Type:           {}\n", metadata.archive_type));
    output.push_str(&format!("Schema version: {}\n", metadata.schema_version));
    output.push_str(&format!("Compressed:     {}\n", yes_no(Some(metadata.compressed))));
    output.push_str(&format!("Encrypted:      {}\n", yes_no(Some(metadata.encrypted))));
    output.push('\n');

    match &document.body {
        ArchiveBody::Snapshot(snapshot) => {
            output.push_str("Contents:\n");
            for collection in snapshot.collections() {
                output.push_str(&format!(
                    "  {:<8} {} record(s)\n",
                    collection.kind().as_str(),
                    collection.len()
                ));
            }
        }
        ArchiveBody::Changeset(changes) => {
            let (added, removed, modified) = changes.summary();
            output.push_str(&format!(
                "Base:           {}\n",
                changes.base_version.as_deref().unwrap_or("(empty)")
            ));
            output.push_str(&format!(
                "Changes:        {} added, {} removed, {} modified\n",
                added, removed, modified
            ));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{ArchiveMetadata, ArchiveType};
    use crate::backup::ReadFailure;
    use crate::models::Snapshot;
    use std::path::PathBuf;

    fn create_test_info(filename: &str, metadata: Option<ArchiveMetadata>) -> BackupInfo {
        BackupInfo {
            filename: filename.to_string(),
            path: PathBuf::from("/backups").join(filename),
            created_at: Utc::now(),
            read_failure: metadata.is_none().then_some(ReadFailure::Corrupt),
            size_bytes: 2048,
            metadata,
        }
    }

    fn full_metadata() -> ArchiveMetadata {
        ArchiveMetadata {
            created_at: Utc::now(),
            schema_version: 1,
            raw_size: 4096,
            archive_type: ArchiveType::Full,
            compressed: true,
            encrypted: false,
        }
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(format_backup_list(&[], false, Utc::now()), "No backups found.");
    }

    #[test]
    fn test_list_marks_unreadable() {
        let backups = vec![
            create_test_info("manuale.gz", Some(full_metadata())),
            create_test_info("rotto.gz", None),
        ];
        let output = format_backup_list(&backups, true, Utc::now());
        assert!(output.contains("manuale.gz"));
        assert!(output.contains("unreadable"));
        assert!(output.contains("Total: 2 backup(s)"));
    }

    #[test]
    fn test_list_marks_locked() {
        let mut locked = create_test_info("settimana.gz.enc", None);
        locked.read_failure = Some(ReadFailure::Locked);
        let output = format_backup_list(&[locked], false, Utc::now());
        assert!(output.contains("locked"));
        assert!(!output.contains("unreadable"));
    }

    #[test]
    fn test_details_list_collections() {
        let info = create_test_info("manuale.gz", Some(full_metadata()));
        let document = ArchiveDocument {
            metadata: full_metadata(),
            body: ArchiveBody::Snapshot(Snapshot::capture(Vec::new(), Vec::new())),
        };
        let output = format_backup_details(&info, &document);
        assert!(output.contains("Type:           full"));
        assert!(output.contains("orders"));
    }
}
