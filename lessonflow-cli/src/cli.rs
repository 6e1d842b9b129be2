//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use lessonflow::core::StageKind;
use lessonflow::model::TagCategory;
use std::path::PathBuf;

/// Lessonflow - staged RPP lesson plan generation
#[derive(Debug, Parser)]
#[command(
    name = "lessonflow",
    about = "Generate, edit and export RPP lesson plans stage by stage",
    version
)]
pub struct Cli {
    /// Path to a JSON config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the draft and the session file
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inspect or edit the lesson draft
    Draft {
        #[command(subcommand)]
        command: DraftCommand,
    },

    /// Run generation stages
    Generate {
        /// Run only this stage
        #[arg(long, conflicts_with = "through")]
        stage: Option<StageKind>,

        /// Run every unfinished stage up to and including this one
        #[arg(long, default_value = "assessment")]
        through: StageKind,
    },

    /// Show stage statuses and the last message
    Status,

    /// Print a stage result as JSON
    Show {
        /// Stage whose result to print
        stage: StageKind,
    },

    /// Edit a generated result
    Edit {
        #[command(subcommand)]
        command: EditCommand,
    },

    /// Write the lesson plan as a .docx file
    Export {
        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },

    /// Clear all stages and the draft
    Reset,
}

/// Draft subcommands
#[derive(Debug, Subcommand)]
pub enum DraftCommand {
    /// Print the draft as JSON
    Show,

    /// Set a text field (topik, mapel, kelas, madrasah, namaGuru,
    /// namaKepalaMadrasah, tempat, stimulus_url, model_pembelajaran)
    Set {
        /// Field name as persisted
        field: String,
        /// New value
        value: String,
    },

    /// Select or deselect a KBC or DPL tag
    Toggle {
        /// Tag list: kbc or dpl
        category: TagCategory,
        /// Tag name
        tag: String,
    },

    /// List the learning models and their syntax
    Models,

    /// Remove the saved draft and start from the sample lesson
    Clear,
}

/// Edit subcommands
#[derive(Debug, Subcommand)]
pub enum EditCommand {
    /// Replace the description of a learning objective
    Objective {
        /// Objective id, e.g. tp_1
        id: String,
        /// New description
        text: String,
    },

    /// Replace a text field of a stage result
    Result {
        /// Stage whose result to edit
        #[arg(long)]
        stage: StageKind,
        /// Dotted path, e.g. kegiatan_penutup.refleksi or asesmen_formatif.rubrik.0.skor_4
        #[arg(long)]
        path: String,
        /// New value
        #[arg(long)]
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate() {
        let cli = Cli::parse_from(["lessonflow", "generate", "--through", "scenario"]);
        match cli.command {
            Command::Generate { stage, through } => {
                assert_eq!(stage, None);
                assert_eq!(through, StageKind::Scenario);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_edit_result() {
        let cli = Cli::parse_from([
            "lessonflow",
            "--verbose",
            "edit",
            "result",
            "--stage",
            "assessment",
            "--path",
            "asesmen_formatif.rubrik.0.skor_4",
            "--value",
            "Sangat baik",
        ]);
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Command::Edit {
                command: EditCommand::Result { stage: StageKind::Assessment, .. }
            }
        ));
    }

    #[test]
    fn test_parse_models() {
        let cli = Cli::parse_from(["lessonflow", "draft", "models"]);
        assert!(matches!(
            cli.command,
            Command::Draft {
                command: DraftCommand::Models
            }
        ));
    }

    #[test]
    fn test_parse_toggle() {
        let cli = Cli::parse_from(["lessonflow", "draft", "toggle", "kbc", "Cinta Ilmu"]);
        assert!(matches!(
            cli.command,
            Command::Draft {
                command: DraftCommand::Toggle { category: TagCategory::Kbc, .. }
            }
        ));
    }
}
