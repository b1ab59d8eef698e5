use crate::{
    bot::embed::Reply,
    model::backup::{BackupArtifact, BackupKind, BackupListing},
    service::backup::BackupService,
};

/// Archives shown per folder in /backup_list.
const LIST_LIMIT: usize = 5;

/// /backup [name]: a labelled custom backup, or an auto backup without a name.
pub async fn run(backups: &BackupService, name: Option<&str>) -> Reply {
    let kind = match name.map(str::trim).filter(|name| !name.is_empty()) {
        Some(label) => BackupKind::Custom(label.to_string()),
        None => BackupKind::Auto,
    };

    match backups.create(kind).await {
        Ok(artifact) => success(&artifact),
        Err(e) => {
            tracing::error!("Manual backup failed: {}", e);
            Reply::failure("Backup", format!("Backup failed: {}", e))
        }
    }
}

/// /backup_list: the newest archives in each folder.
pub async fn list(backups: &BackupService) -> Reply {
    match backups.list().await {
        Ok(listing) => listing_reply(&listing),
        Err(e) => {
            tracing::error!("Listing backups failed: {}", e);
            Reply::failure("Backups", format!("Could not list backups: {}", e))
        }
    }
}

fn listing_reply(listing: &BackupListing) -> Reply {
    Reply::info("Backups", "Newest archives first")
        .field("Custom", list_field(&listing.custom))
        .field("Auto", list_field(&listing.auto))
}

fn list_field(names: &[String]) -> String {
    if names.is_empty() {
        return "*None*".to_string();
    }

    let mut lines: Vec<String> = names
        .iter()
        .take(LIST_LIMIT)
        .map(|name| format!("`{}`", name))
        .collect();
    if names.len() > LIST_LIMIT {
        lines.push(format!("... and {} more", names.len() - LIST_LIMIT));
    }

    lines.join("\n")
}

fn success(artifact: &BackupArtifact) -> Reply {
    let reply = Reply::success("Backup", format!("Backup created: `{}`", artifact.file_name()))
        .field("Files", artifact.files.to_string());

    match artifact.kind {
        BackupKind::Auto => reply.field("Old backups pruned", artifact.pruned.to_string()),
        BackupKind::Custom(_) => reply,
    }
}
