use clap::{Args, Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "asset-export")]
#[command(about = "Media listing and spreadsheet export over a digital-asset-management API")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Use built-in sample data instead of the upstream API
    #[arg(long)]
    pub sample: bool,

    /// Override export.output_dir
    #[arg(long)]
    pub output_dir: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Media listing, lookup and export
    #[command(subcommand)]
    Media(MediaCommand),
    /// Metaproperty listing and export
    #[command(subcommand)]
    Metaproperties(MetapropertyCommand),
}

#[derive(Debug, Clone, Subcommand)]
pub enum MediaCommand {
    List(ListArgs),
    Get { id: String },
    Export(ExportArgs),
}

#[derive(Debug, Clone, Subcommand)]
pub enum MetapropertyCommand {
    List {
        /// Skip metaproperty options
        #[arg(long)]
        no_options: bool,
        /// Include media counts per option
        #[arg(long)]
        count: bool,
    },
    Export {
        #[arg(long)]
        name: Option<String>,
    },
}

#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    #[arg(long)]
    pub limit: Option<String>,

    /// Fetch a single upstream page instead of walking all pages
    #[arg(long)]
    pub page: Option<String>,

    /// Upstream filter, e.g. --filter type=image (repeatable)
    #[arg(long = "filter", value_name = "KEY=VALUE")]
    pub filters: Vec<String>,

    /// Ask the upstream for the total count
    #[arg(long)]
    pub total: bool,
}

#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    #[arg(long)]
    pub limit: Option<String>,

    #[arg(long = "filter", value_name = "KEY=VALUE")]
    pub filters: Vec<String>,

    /// Artifact name without extension
    #[arg(long)]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_export_command() {
        let cli = CliConfig::parse_from([
            "asset-export",
            "--sample",
            "media",
            "export",
            "--limit",
            "20",
            "--filter",
            "type=image",
            "--filter",
            "isPublic=true",
        ]);

        assert!(cli.sample);
        match cli.command {
            Command::Media(MediaCommand::Export(args)) => {
                assert_eq!(args.limit.as_deref(), Some("20"));
                assert_eq!(args.filters, vec!["type=image", "isPublic=true"]);
                assert!(args.name.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_metaproperty_list() {
        let cli = CliConfig::parse_from(["asset-export", "metaproperties", "list", "--count"]);
        assert!(matches!(
            cli.command,
            Command::Metaproperties(MetapropertyCommand::List {
                no_options: false,
                count: true
            })
        ));
    }
}
