//! Lessonflow command-line entry point.
//!
//! Every invocation loads the draft and the saved session, applies one
//! command, then writes the session back and flushes the draft.

mod cli;
mod offline;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use lessonflow::config::LessonflowConfig;
use lessonflow::core::StageKind;
use lessonflow::draft::{DraftAutosaver, DraftStore, FileStorage};
use lessonflow::errors::{GenerationError, LessonflowError};
use lessonflow::events::LoggingEventSink;
use lessonflow::export::DocxExporter;
use lessonflow::generation::{GeminiClient, GenerationClient};
use lessonflow::model::{LearningModel, LessonInput};
use lessonflow::overlay::FieldPath;
use lessonflow::workflow::{StageRun, WorkflowController, WorkflowState};

use cli::{Cli, Command, DraftCommand, EditCommand};
use offline::OfflineClient;

const SESSION_FILE: &str = "session.json";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    lessonflow::observability::init_tracing(cli.log_json, cli.verbose);

    let config =
        LessonflowConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let data_dir = resolve_data_dir(cli.data_dir.as_deref(), &config)?;
    debug!(data_dir = %data_dir.display(), model = %config.generation.model, "Starting");

    let needs_client = matches!(cli.command, Command::Generate { .. });
    let client = build_client(&config, needs_client)?;
    let session = Session::open(&data_dir, &config, client)?;

    let outcome = dispatch(&session, cli.command).await;
    session.close().await?;
    outcome
}

fn resolve_data_dir(flag: Option<&Path>, config: &LessonflowConfig) -> Result<PathBuf> {
    let dir = match (flag, &config.draft.dir) {
        (Some(dir), _) => dir.to_path_buf(),
        (None, Some(dir)) => dir.clone(),
        (None, None) => dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lessonflow"),
    };
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create data directory {}", dir.display()))?;
    Ok(dir)
}

fn build_client(config: &LessonflowConfig, required: bool) -> Result<Arc<dyn GenerationClient>> {
    match GeminiClient::from_config(&config.generation) {
        Ok(client) => {
            debug!(model = client.model(), "Using Gemini client");
            Ok(Arc::new(client))
        }
        Err(GenerationError::MissingCredential { env }) if !required => {
            debug!(%env, "No credential, generation disabled for this command");
            Ok(Arc::new(OfflineClient::new(env)))
        }
        Err(e) => Err(e).context("Failed to create the generation client"),
    }
}

/// The controller plus the files backing it.
struct Session {
    controller: WorkflowController,
    path: PathBuf,
}

impl Session {
    fn open(
        data_dir: &Path,
        config: &LessonflowConfig,
        client: Arc<dyn GenerationClient>,
    ) -> Result<Self> {
        let store = DraftStore::new(Arc::new(FileStorage::new(data_dir)));
        let (autosaver, lesson) = DraftAutosaver::start(
            store,
            config.draft.debounce(),
            Arc::new(LoggingEventSink::debug()),
        );

        let path = data_dir.join(SESSION_FILE);
        let mut state = match std::fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str::<WorkflowState>(&json).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable session");
                WorkflowState::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => WorkflowState::default(),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };
        // the draft is the source of truth for the form
        state.lesson = lesson;

        let controller = WorkflowController::new(client, config.workflow)
            .with_event_sink(Arc::new(LoggingEventSink::debug()))
            .with_autosaver(autosaver);
        controller.restore(state);

        Ok(Self { controller, path })
    }

    async fn close(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.controller.snapshot())
            .context("Failed to encode session")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        if let Some(autosaver) = self.controller.autosaver() {
            autosaver.flush().await;
        }
        Ok(())
    }
}

async fn dispatch(session: &Session, command: Command) -> Result<()> {
    let controller = &session.controller;
    match command {
        Command::Draft { command } => cmd_draft(controller, command).await,
        Command::Generate { stage, through } => cmd_generate(controller, stage, through).await,
        Command::Status => {
            print_status(&controller.snapshot());
            Ok(())
        }
        Command::Show { stage } => cmd_show(controller, stage),
        Command::Edit { command } => cmd_edit(controller, command),
        Command::Export { out } => cmd_export(controller, &out),
        Command::Reset => {
            controller.reset().await;
            println!("Semua tahap dan draf telah dihapus.");
            Ok(())
        }
    }
}

async fn cmd_draft(controller: &WorkflowController, command: DraftCommand) -> Result<()> {
    match command {
        DraftCommand::Show => {
            let lesson = controller.snapshot().lesson;
            println!("{}", serde_json::to_string_pretty(&lesson)?);
        }
        DraftCommand::Set { field, value } => {
            let mut accepted = true;
            controller.update_lesson(|lesson| accepted = lesson.set_field(&field, value));
            if !accepted {
                bail!("Unknown field or invalid value for '{field}'");
            }
            info!(%field, "Draft field updated");
        }
        DraftCommand::Toggle { category, tag } => {
            if !category.options().contains(&tag.as_str()) {
                bail!(
                    "Unknown tag '{tag}'. Options: {}",
                    category.options().join(", ")
                );
            }
            let mut selected = false;
            controller.update_lesson(|lesson| selected = lesson.toggle_tag(category, &tag));
            println!("{tag}: {}", if selected { "dipilih" } else { "tidak dipilih" });
        }
        DraftCommand::Models => {
            print!("{}", format_models(controller.snapshot().lesson.model_pembelajaran));
        }
        DraftCommand::Clear => {
            controller.update_lesson(|lesson| *lesson = LessonInput::default());
            if let Some(autosaver) = controller.autosaver() {
                autosaver.clear().await;
            }
            println!("Draf dihapus.");
        }
    }
    Ok(())
}

fn format_models(selected: LearningModel) -> String {
    LearningModel::ALL
        .into_iter()
        .map(|model| {
            let mark = if model == selected { '*' } else { ' ' };
            format!("{mark} {}\n    {}\n", model.name(), model.syntax())
        })
        .collect()
}

async fn cmd_generate(
    controller: &WorkflowController,
    stage: Option<StageKind>,
    through: StageKind,
) -> Result<()> {
    let stages: Vec<StageKind> = match stage {
        Some(stage) => vec![stage],
        None => {
            let state = controller.snapshot();
            StageKind::ALL
                .into_iter()
                .filter(|s| *s <= through)
                .skip_while(|s| state.status(*s).is_success())
                .collect()
        }
    };
    if stages.is_empty() {
        println!("Semua tahap sampai {through} sudah selesai.");
        return Ok(());
    }

    for stage in stages {
        println!("{} ...", stage.title());
        match controller.run_stage(stage).await {
            Ok(StageRun::Succeeded) => println!("  selesai"),
            Ok(StageRun::Failed { message }) => bail!(message),
            Ok(other) => bail!("{stage} did not complete: {other:?}"),
            Err(e) => bail!(e.user_message()),
        }
    }

    if let Some(report) = controller.snapshot().alignment.filter(|r| !r.is_clean()) {
        for dangling in report
            .dangling_objectives
            .iter()
            .chain(&report.unselected_tags)
        {
            println!("  peringatan: {} merujuk '{}'", dangling.item, dangling.reference);
        }
    }
    Ok(())
}

fn print_status(state: &WorkflowState) {
    println!("Topik: {} ({})", state.lesson.topik, state.lesson.mapel);
    for stage in StageKind::ALL {
        println!("  {:<40} {}", stage.title(), state.status(stage));
    }
    if let Some(error) = &state.error {
        println!("Pesan: {error}");
    }
}

fn cmd_show(controller: &WorkflowController, stage: StageKind) -> Result<()> {
    let Some(result) = controller.snapshot().result(stage) else {
        bail!("{} belum dihasilkan.", stage.title());
    };
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn cmd_edit(controller: &WorkflowController, command: EditCommand) -> Result<()> {
    match command {
        EditCommand::Objective { id, text } => controller
            .edit_objective(&id, &text)
            .with_context(|| format!("Failed to edit objective {id}"))?,
        EditCommand::Result { stage, path, value } => {
            let path: FieldPath = path.parse().context("Invalid path")?;
            controller
                .edit_result(stage, &path, &value)
                .with_context(|| format!("Failed to edit {stage} at {path}"))?;
        }
    }
    println!("Perubahan disimpan.");
    Ok(())
}

fn cmd_export(controller: &WorkflowController, out: &Path) -> Result<()> {
    let document = match controller.export_with(&DocxExporter::new()) {
        Ok(document) => document,
        Err(LessonflowError::Validation(e)) => bail!(e.user_message()),
        Err(e) => return Err(e).context("Failed to export document"),
    };
    std::fs::create_dir_all(out)
        .with_context(|| format!("Failed to create {}", out.display()))?;
    let path = out.join(&document.filename);
    std::fs::write(&path, &document.bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("{}", path.display());
    Ok(())
}
