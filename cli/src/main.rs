mod api;
mod files;
mod notify;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use api::{ApiClient, DocumentView, SearchParams, UploadOutcome, UploadResult};
use notify::Notification;

/// Upload, search and inspect documents on a docextract server.
#[derive(Debug, Parser)]
#[command(name = "docextract-cli", version, about)]
struct Cli {
    /// Server base URL.
    #[arg(
        long,
        global = true,
        env = "DOCEXTRACT_SERVER",
        default_value = "http://localhost:5000"
    )]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Upload PDF or Word documents for extraction.
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Search stored documents.
    Search(SearchArgs),
    /// Suggest completions for a partial query.
    Suggest { query: String },
    /// List the most recent documents.
    List,
    /// Show every extracted field of one document.
    Show { id: String },
}

#[derive(Debug, Args)]
struct SearchArgs {
    /// Matches name, email or summary.
    #[arg(default_value = "")]
    query: String,
    #[arg(long, default_value = "")]
    skills: String,
    #[arg(long, default_value = "")]
    experience: String,
    #[arg(long, default_value = "")]
    education: String,
    #[arg(long, default_value = "")]
    projects: String,
}

impl From<SearchArgs> for SearchParams {
    fn from(args: SearchArgs) -> Self {
        Self {
            q: args.query,
            skills: args.skills,
            experience: args.experience,
            education: args.education,
            projects: args.projects,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = ApiClient::new(&cli.server);

    match cli.command {
        Command::Upload { files } => upload(&client, files).await,
        Command::Search(args) => search(&client, args.into()).await,
        Command::Suggest { query } => {
            for suggestion in client.suggest(&query).await? {
                println!("{suggestion}");
            }
            Ok(())
        }
        Command::List => {
            let documents = client.list().await?;
            if documents.is_empty() {
                Notification::info("No documents yet.").emit();
            }
            for doc in documents {
                println!(
                    "{}  {}  {} <{}> {}  {}  [{}]  {}",
                    doc.id,
                    doc.created_at,
                    doc.name,
                    doc.email,
                    doc.phone,
                    doc.location,
                    doc.skills.join(", "),
                    doc.filename
                );
            }
            Ok(())
        }
        Command::Show { id } => match client.document(&id).await? {
            Some(detail) => {
                println!("id:         {}", detail.id);
                println!("filename:   {}", detail.filename);
                println!("created_at: {}", detail.created_at);
                println!("updated_at: {}", detail.updated_at);
                println!("{}", serde_json::to_string_pretty(&detail.raw_data)?);
                Ok(())
            }
            None => {
                Notification::error("Document not found").emit();
                std::process::exit(1);
            }
        },
    }
}

async fn upload(client: &ApiClient, paths: Vec<PathBuf>) -> Result<()> {
    let (allowed, rejected) = files::partition_allowed(paths);
    for path in &rejected {
        Notification::error(format!(
            "{}: file type not allowed (expected one of: {})",
            path.display(),
            files::ALLOWED_EXTENSIONS.join(", ")
        ))
        .emit();
    }

    let mut results = Vec::new();
    if !allowed.is_empty() {
        let mut uploads = Vec::with_capacity(allowed.len());
        for path in &allowed {
            uploads.push(files::read_upload(path).await?);
        }

        match client.upload(uploads).await? {
            UploadOutcome::Results(r) => results = r,
            UploadOutcome::ServerError(message) => {
                Notification::error(message).emit();
                std::process::exit(1);
            }
        }
    }

    for result in &results {
        match result {
            UploadResult::Success { id, filename, data } => {
                let name = data.get("name").and_then(|v| v.as_str()).unwrap_or("");
                println!("{filename} -> {id} {name}");
            }
            UploadResult::Error { filename, error } => eprintln!("{filename}: {error}"),
        }
    }

    for note in notify::upload_notifications(&results, rejected.len()) {
        note.emit();
    }
    Ok(())
}

async fn search(client: &ApiClient, params: SearchParams) -> Result<()> {
    if params.is_empty() {
        Notification::info("Please enter a search query.").emit();
        return Ok(());
    }

    let hits = client.search(&params).await?;
    for hit in &hits {
        print_hit(hit);
    }
    notify::search_summary(hits.len()).emit();
    Ok(())
}

fn print_hit(hit: &DocumentView) {
    println!("{} <{}>  [{}] {}", hit.name, hit.email, hit.id, hit.filename);
    if !hit.phone.is_empty() {
        println!("  phone:    {}", hit.phone);
    }
    if !hit.location.is_empty() {
        println!("  location: {}", hit.location);
    }
    if !hit.skills.is_empty() {
        println!("  skills:   {}", hit.skills.join(", "));
    }
    if let Some(role) = hit.experience.first() {
        println!("  latest:   {role}");
    }
    if let Some(degree) = hit.education.first() {
        println!("  degree:   {degree}");
    }
    if !hit.projects.is_empty() {
        println!("  projects: {}", hit.projects.join("; "));
    }
    println!("  added:    {}", hit.created_at);
    if !hit.summary.is_empty() {
        println!("  {}", hit.summary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_search_filters() {
        let cli = Cli::try_parse_from([
            "docextract-cli",
            "--server",
            "http://example:8080",
            "search",
            "ada",
            "--skills",
            "rust",
        ])
        .unwrap();
        assert_eq!(cli.server, "http://example:8080");
        match cli.command {
            Command::Search(args) => {
                let params = SearchParams::from(args);
                assert_eq!(params.q, "ada");
                assert_eq!(params.skills, "rust");
                assert!(params.projects.is_empty());
            }
            other => panic!("Expected search, got: {:?}", other),
        }
    }

    #[test]
    fn test_upload_requires_files() {
        assert!(Cli::try_parse_from(["docextract-cli", "upload"]).is_err());
    }

    #[test]
    fn test_bare_search_has_no_constraints() {
        let cli = Cli::try_parse_from(["docextract-cli", "search"]).unwrap();
        match cli.command {
            Command::Search(args) => assert!(SearchParams::from(args).is_empty()),
            other => panic!("Expected search, got: {:?}", other),
        }
    }
}
