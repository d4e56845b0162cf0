use clap::{Args, Subcommand};

use kanri_core::id::UserId;
use kanri_core::types::{ChangeDraft, ChangeRequest, ChangeUpdate, ReviewStatus, Reviewer};

use crate::config::{open_engine, resolve_actor};

#[derive(Args)]
pub struct ChangeArgs {
    /// Acting user id (24-hex)
    #[arg(long = "as", value_name = "USER_ID", global = true)]
    actor: Option<String>,

    #[command(subcommand)]
    command: ChangeCommand,
}

#[derive(Subcommand)]
enum ChangeCommand {
    /// File a new change request
    New {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// low, medium, high or critical
        #[arg(long, default_value = "medium")]
        impact: String,
        /// hardware, software, network, security, process or other
        #[arg(long, default_value = "other")]
        category: String,
        /// Initial status (defaults to draft)
        #[arg(long)]
        status: Option<String>,
        /// Planned start, unix milliseconds
        #[arg(long)]
        start: u64,
        /// Planned end, unix milliseconds
        #[arg(long)]
        end: u64,
        /// Reviewer user id, repeatable
        #[arg(long = "reviewer")]
        reviewers: Vec<String>,
    },
    /// Show one change request
    Show { id: String },
    /// List change requests
    List {
        /// Restrict to records owned by the acting user
        #[arg(long)]
        owned: bool,
    },
    /// Update fields on a change request
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        impact: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        assign: Option<String>,
        /// Add a reviewer (repeatable); existing reviewers are kept
        #[arg(long = "add-reviewer")]
        add_reviewers: Vec<String>,
    },
    /// Delete a change request
    Delete { id: String },
    /// Attach a file to a change request
    Upload {
        id: String,
        file: std::path::PathBuf,
        #[arg(long, default_value = "application/octet-stream")]
        content_type: String,
    },
    /// Comment on a change request
    Comment { id: String, text: String },
    /// Record a review verdict on a change request
    Review {
        id: String,
        /// approved or rejected
        #[arg(long)]
        verdict: String,
        #[arg(long)]
        comments: Option<String>,
    },
}

fn require_actor(actor: &Option<String>) -> anyhow::Result<&str> {
    actor
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("--as <USER_ID> is required"))
}

fn pending_reviewer(id: &str) -> anyhow::Result<Reviewer> {
    Ok(Reviewer {
        user: UserId::from_hex(id)?,
        status: ReviewStatus::Pending,
        comments: None,
        reviewed_at_ms: None,
    })
}

fn print_change(cr: &ChangeRequest) {
    println!("Change: {}", cr.id);
    println!("  Title:    {}", cr.title);
    println!("  Status:   {}", cr.status);
    println!("  Impact:   {}", cr.impact);
    println!("  Category: {}", cr.category);
    println!("  Owner:    {}", cr.owner);
    if let Some(assignee) = &cr.assigned_to {
        println!("  Assigned: {assignee}");
    }
    for r in &cr.reviewers {
        println!("  Reviewer: {} {}", r.user, r.status);
    }
    for a in &cr.attachments {
        println!("  File:     {} ({} bytes)", a.name, a.size_bytes);
    }
    for c in &cr.comments {
        println!("  Comment:  [{}] {}", c.author, c.text);
    }
}

pub async fn run(args: ChangeArgs) -> anyhow::Result<()> {
    let (store, engine) = open_engine()?;
    let actor = resolve_actor(&store, require_actor(&args.actor)?)?;

    match args.command {
        ChangeCommand::New {
            title,
            description,
            impact,
            category,
            status,
            start,
            end,
            reviewers,
        } => {
            let reviewers = reviewers
                .iter()
                .map(|r| pending_reviewer(r))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let draft = ChangeDraft {
                title,
                description,
                impact: impact.parse()?,
                status: status.as_deref().map(str::parse).transpose()?,
                category: category.parse()?,
                planned_start_ms: start,
                planned_end_ms: end,
                assigned_to: None,
                reviewers,
            };
            let cr = engine.create(draft, &actor).await?;
            println!("Created change request: {}", cr.id);
        }
        ChangeCommand::Show { id } => {
            let cr = engine.get(&id, &actor)?;
            print_change(&cr);
        }
        ChangeCommand::List { owned } => {
            for cr in engine.list(&actor, owned)? {
                println!("{} {} {} [{}]", cr.id, cr.status, cr.title, cr.impact);
            }
        }
        ChangeCommand::Update {
            id,
            title,
            description,
            impact,
            category,
            status,
            assign,
            add_reviewers,
        } => {
            let reviewers = if add_reviewers.is_empty() {
                None
            } else {
                let mut all = engine.get(&id, &actor)?.reviewers;
                for r in &add_reviewers {
                    all.push(pending_reviewer(r)?);
                }
                Some(all)
            };
            let update = ChangeUpdate {
                title,
                description,
                impact: impact.as_deref().map(str::parse).transpose()?,
                status: status.as_deref().map(str::parse).transpose()?,
                category: category.as_deref().map(str::parse).transpose()?,
                assigned_to: assign.as_deref().map(UserId::from_hex).transpose()?,
                reviewers,
                ..Default::default()
            };
            let cr = engine.update(&id, update, &actor).await?;
            print_change(&cr);
        }
        ChangeCommand::Delete { id } => {
            engine.delete(&id, &actor)?;
            println!("Deleted change request: {id}");
        }
        ChangeCommand::Upload {
            id,
            file,
            content_type,
        } => {
            let bytes = std::fs::read(&file)?;
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| anyhow::anyhow!("invalid file name"))?;
            let cr = engine.upload_attachment(&id, &name, &content_type, &bytes, &actor)?;
            println!("Attached {} to {}", name, cr.id);
        }
        ChangeCommand::Comment { id, text } => {
            let cr = engine.add_comment(&id, &text, &actor).await?;
            println!("Commented on {}", cr.id);
        }
        ChangeCommand::Review {
            id,
            verdict,
            comments,
        } => {
            let cr = engine
                .submit_review(&id, verdict.parse()?, comments, &actor)
                .await?;
            print_change(&cr);
        }
    }
    Ok(())
}
