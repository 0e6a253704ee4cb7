mod classifier;
mod commands;
mod logging;
mod parser;
mod tree;
mod tui;
mod workspace;

use anyhow::Result;
use clap::{ArgGroup, Parser, Subcommand};

use crate::tree::export::{ExportFormat, ExportOptions, ReviewStyle};

#[derive(Parser)]
#[command(
    name = "ktree",
    about = "A knowledge tree of research problems, solutions and gaps"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an empty knowledge tree in the current directory
    Init,
    /// Classify ktree/papers.json into a fresh tree
    Build {
        /// Give up after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Open the interactive tree view
    View {
        /// Launch with a built-in sample tree (no workspace required)
        #[arg(long)]
        demo: bool,
        /// Start on the timeline tab
        #[arg(long)]
        timeline: bool,
    },
    /// Print the tree grouped by year
    Timeline,
    /// List hierarchy links and connections in snapshot order
    List,
    /// Query the tree for specific conditions
    #[command(
        group(
            ArgGroup::new("inspect_query")
                .args(["dangling", "node", "stats"])
                .multiple(false)
        )
    )]
    Inspect {
        /// List parent links and connections that point at missing nodes
        #[arg(long)]
        dangling: bool,
        /// Show everything known about one node
        #[arg(long)]
        node: Option<String>,
        /// Summarise node, connection, gap and paper counts
        #[arg(long)]
        stats: bool,
    },
    /// Hand the tree to the exporter
    Export {
        /// visual, outline, html or research
        #[arg(long, default_value_t = ExportFormat::Visual)]
        format: ExportFormat,
        #[arg(long)]
        no_nodes: bool,
        #[arg(long)]
        no_descriptions: bool,
        #[arg(long)]
        no_papers: bool,
        #[arg(long)]
        no_gaps: bool,
        /// Include personal annotations
        #[arg(long)]
        annotations: bool,
        /// Skip the generated literature review
        #[arg(long)]
        no_review: bool,
        /// problem-solution, chronological, thematic or methodological
        #[arg(long, default_value_t = ReviewStyle::ProblemSolution)]
        review_style: ReviewStyle,
    },
    /// Open ktree/snapshot.json in your editor
    Edit,
    /// Open the TUI settings panel
    Setup,
    /// Show the welcome tour
    Onboarding {
        /// Show the tour again on the next `ktree view`
        #[arg(long)]
        reset: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if !matches!(cli.command, Command::View { .. } | Command::Setup) {
        logging::init_stderr();
    }

    match cli.command {
        Command::Init => commands::init::run(),
        Command::Build { timeout } => commands::build::run(timeout),
        Command::View { demo, timeline } => commands::view::run(demo, timeline),
        Command::Timeline => commands::timeline::run(),
        Command::List => commands::list::run(),
        Command::Inspect {
            dangling,
            node,
            stats,
        } => {
            if dangling {
                commands::inspect::run_dangling()
            } else if let Some(id) = node {
                commands::inspect::run_node(&id)
            } else if stats {
                commands::inspect::run_stats()
            } else {
                eprintln!("Specify one of: --dangling, --node <id>, --stats");
                Ok(())
            }
        }
        Command::Export {
            format,
            no_nodes,
            no_descriptions,
            no_papers,
            no_gaps,
            annotations,
            no_review,
            review_style,
        } => {
            let options = ExportOptions {
                include_nodes: !no_nodes,
                include_descriptions: !no_descriptions,
                include_papers: !no_papers,
                include_gaps: !no_gaps,
                include_annotations: annotations,
                generate_review: !no_review,
                review_style,
            };
            commands::export::run(format, options)
        }
        Command::Edit => commands::edit::run(),
        Command::Setup => commands::view::run_setup(),
        Command::Onboarding { reset } => commands::onboarding::run(reset),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn inspect_rejects_multiple_query_flags() {
        let parsed = Cli::try_parse_from(["ktree", "inspect", "--dangling", "--stats"]);
        assert!(
            parsed.is_err(),
            "inspect flags should be mutually exclusive"
        );
        let err = parsed.err().expect("expected clap parse error");
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn inspect_accepts_node_query() {
        let cli = Cli::try_parse_from(["ktree", "inspect", "--node", "attn"])
            .expect("single inspect flag should parse");
        match cli.command {
            Command::Inspect { node, .. } => assert_eq!(node.as_deref(), Some("attn")),
            _ => panic!("expected inspect command"),
        }
    }

    #[test]
    fn export_defaults_match_options_default() {
        let cli = Cli::try_parse_from(["ktree", "export"]).expect("bare export should parse");
        match cli.command {
            Command::Export {
                format,
                no_nodes,
                annotations,
                no_review,
                review_style,
                ..
            } => {
                assert_eq!(format, ExportFormat::Visual);
                assert!(!no_nodes && !annotations && !no_review);
                assert_eq!(review_style, ExportOptions::default().review_style);
            }
            _ => panic!("expected export command"),
        }
    }

    #[test]
    fn export_parses_format_and_review_style() {
        let cli = Cli::try_parse_from([
            "ktree",
            "export",
            "--format",
            "research",
            "--review-style",
            "problem-solution",
            "--annotations",
        ])
        .expect("export flags should parse");
        match cli.command {
            Command::Export {
                format,
                annotations,
                review_style,
                ..
            } => {
                assert_eq!(format, ExportFormat::Research);
                assert!(annotations);
                assert_eq!(review_style, ReviewStyle::ProblemSolution);
            }
            _ => panic!("expected export command"),
        }
    }

    #[test]
    fn unknown_export_format_is_rejected() {
        assert!(Cli::try_parse_from(["ktree", "export", "--format", "pdf"]).is_err());
    }

    #[test]
    fn view_flags_parse() {
        let cli = Cli::try_parse_from(["ktree", "view", "--demo", "--timeline"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::View {
                demo: true,
                timeline: true
            }
        ));
    }
}
