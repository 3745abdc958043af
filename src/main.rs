// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! SEGMARK - Segment Annotation Timeline
//!
//! Command-line front end for creating, inspecting, editing and exporting
//! segment annotation projects.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use segmark::io::serialization::{read_catalog, read_project, write_project};
use segmark::util::time::format_ms;
use segmark::{EditSession, LabelId, Project, Role, SegmentId};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "segmark")]
#[command(about = "SEGMARK - mark, label and export time segments over media")]
#[command(version)]
struct Cli {
    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty project file
    New {
        /// Output project path (.ann/.json or .yaml/.yml)
        output: PathBuf,

        /// Media file the project annotates
        #[arg(long)]
        media: String,

        /// Label catalog file
        #[arg(long)]
        labels: String,

        /// Annotator role (A, B, C or D)
        #[arg(long, default_value = "A")]
        role: Role,
    },

    /// Print a project's references and segments
    Show {
        project: PathBuf,
    },

    /// Validate a label catalog and list its labels
    Labels {
        catalog: PathBuf,
    },

    /// Create a default-length segment at a point on the timeline
    Add {
        project: PathBuf,

        /// Start point in milliseconds
        #[arg(long)]
        at: i64,

        /// Media duration in milliseconds
        #[arg(long)]
        duration: i64,
    },

    /// Move a segment to a new start, keeping its length
    Move {
        project: PathBuf,

        /// Canonical index of the segment (as listed by `show`)
        #[arg(long)]
        index: usize,

        /// Proposed start in milliseconds
        #[arg(long)]
        to: i64,

        /// Media duration in milliseconds
        #[arg(long)]
        duration: i64,
    },

    /// Move the start boundary of a segment
    ResizeStart {
        project: PathBuf,

        #[arg(long)]
        index: usize,

        /// Proposed start in milliseconds
        #[arg(long)]
        to: i64,
    },

    /// Move the end boundary of a segment
    ResizeEnd {
        project: PathBuf,

        #[arg(long)]
        index: usize,

        /// Proposed end in milliseconds
        #[arg(long)]
        to: i64,

        /// Media duration in milliseconds
        #[arg(long)]
        duration: i64,
    },

    /// Assign a label from the project's catalog
    Label {
        project: PathBuf,

        #[arg(long)]
        index: usize,

        /// Label id; omit to clear the label
        #[arg(long)]
        label: Option<LabelId>,
    },

    /// Set the text of a segment
    Text {
        project: PathBuf,

        #[arg(long)]
        index: usize,

        text: String,
    },

    /// Delete a segment
    Delete {
        project: PathBuf,

        #[arg(long)]
        index: usize,
    },

    /// Export a fully labeled project as CSV
    Export {
        project: PathBuf,

        /// Output CSV path (defaults to <media>_<role>.csv next to the project)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Re-encode a project between JSON and YAML
    Convert {
        input: PathBuf,
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Commands::New {
            output,
            media,
            labels,
            role,
        } => {
            let project = Project::new(media, labels, role);
            write_project(&project, &output)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Created {}", output.display());
        }

        Commands::Show { project } => {
            let session = open_project(&project, None)?;
            print_session(&session);
        }

        Commands::Labels { catalog } => {
            let catalog = read_catalog(&catalog)
                .with_context(|| format!("Failed to load catalog {}", catalog.display()))?;
            println!("version {}", catalog.version);
            for label in catalog.labels() {
                println!("{}\t{}", label.id, label.display);
            }
        }

        Commands::Add {
            project,
            at,
            duration,
        } => {
            let mut session = open_project(&project, Some(duration))?;
            let id = session.create_at(at)?;
            report_segment(&session, id);
            save(&session, &project)?;
        }

        Commands::Move {
            project,
            index,
            to,
            duration,
        } => {
            let mut session = open_project(&project, Some(duration))?;
            let id = segment_at(&session, index)?;
            if !session.move_segment(id, to, None)? {
                println!("No room to move segment {}", index);
            }
            report_segment(&session, id);
            save(&session, &project)?;
        }

        Commands::ResizeStart { project, index, to } => {
            let mut session = open_project(&project, None)?;
            let id = segment_at(&session, index)?;
            session.resize_start(id, to, None)?;
            report_segment(&session, id);
            save(&session, &project)?;
        }

        Commands::ResizeEnd {
            project,
            index,
            to,
            duration,
        } => {
            let mut session = open_project(&project, Some(duration))?;
            let id = segment_at(&session, index)?;
            session.resize_end(id, to, None)?;
            report_segment(&session, id);
            save(&session, &project)?;
        }

        Commands::Label {
            project,
            index,
            label,
        } => {
            let mut session = open_project(&project, None)?;
            attach_catalog(&mut session, &project)?;
            let id = segment_at(&session, index)?;
            session.set_label(id, label)?;
            report_segment(&session, id);
            save(&session, &project)?;
        }

        Commands::Text {
            project,
            index,
            text,
        } => {
            let mut session = open_project(&project, None)?;
            let id = segment_at(&session, index)?;
            session.set_text(id, text)?;
            report_segment(&session, id);
            save(&session, &project)?;
        }

        Commands::Delete { project, index } => {
            let mut session = open_project(&project, None)?;
            let id = segment_at(&session, index)?;
            session.delete(id)?;
            println!("Deleted segment {}, {} remaining", index, session.segments().len());
            save(&session, &project)?;
        }

        Commands::Export { project, output } => {
            let session = open_project(&project, None)?;
            let csv = session.export_csv().context("Cannot export project")?;
            let output = match output {
                Some(path) => path,
                None => {
                    let name = session
                        .export_file_name()
                        .context("Project has no media path")?;
                    project.with_file_name(name)
                }
            };
            std::fs::write(&output, csv)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Exported {} segments to {}", session.segments().len(), output.display());
        }

        Commands::Convert { input, output } => {
            let project = read_project(&input)
                .with_context(|| format!("Failed to load project {}", input.display()))?;
            write_project(&project, &output)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Converted {} to {}", input.display(), output.display());
        }
    }

    Ok(())
}

/// Load a project file into a fresh editing session.
fn open_project(path: &Path, duration_ms: Option<i64>) -> Result<EditSession> {
    let project = read_project(path)
        .with_context(|| format!("Failed to load project {}", path.display()))?;
    let mut session = EditSession::new();
    session.load_project(project);
    if let Some(duration_ms) = duration_ms {
        if duration_ms <= 0 {
            bail!("Media duration must be positive, got {}", duration_ms);
        }
        session.set_duration(duration_ms);
    }
    Ok(session)
}

/// Load the catalog a project refers to. Relative catalog paths are resolved
/// against the project's directory.
fn attach_catalog(session: &mut EditSession, project_path: &Path) -> Result<()> {
    let labels_path = session
        .labels_path()
        .context("Project has no label catalog")?
        .to_string();
    let mut path = PathBuf::from(&labels_path);
    if path.is_relative() && !path.exists() {
        if let Some(dir) = project_path.parent() {
            path = dir.join(path);
        }
    }
    let catalog = read_catalog(&path)
        .with_context(|| format!("Failed to load catalog {}", path.display()))?;
    session.load_catalog(labels_path, catalog);
    Ok(())
}

fn save(session: &EditSession, path: &Path) -> Result<()> {
    let project = session.to_project()?;
    write_project(&project, path).with_context(|| format!("Failed to write {}", path.display()))
}

fn segment_at(session: &EditSession, index: usize) -> Result<SegmentId> {
    match session.segment_at(index) {
        Some(id) => Ok(id),
        None => bail!(
            "No segment at index {} (project has {} segments)",
            index,
            session.segments().len()
        ),
    }
}

fn report_segment(session: &EditSession, id: SegmentId) {
    if let Some(seg) = session.segments().get(id) {
        println!("{} - {}", format_ms(seg.start_ms), format_ms(seg.end_ms));
    }
}

fn print_session(session: &EditSession) {
    println!("media:  {}", session.media_path().unwrap_or(""));
    println!("labels: {}", session.labels_path().unwrap_or(""));
    println!("role:   {}", session.role());
    for (index, seg) in session.segments().iter().enumerate() {
        let label = seg.label_id.map(|id| id.to_string()).unwrap_or_else(|| "-".into());
        let marker = if seg.is_complete() { " " } else { "*" };
        println!(
            "{}{:>3}  {} - {}  [{}] {}",
            marker,
            index,
            format_ms(seg.start_ms),
            format_ms(seg.end_ms),
            label,
            seg.text
        );
    }
    let incomplete = session.incomplete_count();
    if incomplete > 0 {
        println!("{} incomplete segment(s) marked with *", incomplete);
    }
}
