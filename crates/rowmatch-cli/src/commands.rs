use anyhow::Result;
use comfy_table::Table;
use rowmatch_cli::pipeline::{MatchRequest, MatchRun, load_config, run_match};
use rowmatch_map::CancelToken;
use rowmatch_model::{Limit, MatchConfig, Processor, ScoringModel};
use rowmatch_report::OutputFormat;
use tracing::debug;

use crate::cli::{MatchArgs, OutputFormatArg, ProcessorArg};
use crate::progress::ProgressObserver;
use crate::summary::{apply_table_style, header_cell};

pub fn run_models() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Model"),
        header_cell("Efficiency"),
        header_cell("Description"),
    ]);
    apply_table_style(&mut table);
    for model in ScoringModel::ALL {
        table.add_row(vec![model.label(), model.efficiency(), model.description()]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_match_command(args: &MatchArgs) -> Result<MatchRun> {
    let config = build_config(args)?;
    debug!(?config, "match configuration");
    let request = MatchRequest {
        source: args.source.clone(),
        destination: args.destination.clone(),
        source_column: args.source_column.clone(),
        destination_column: args.destination_column.clone(),
        config,
        output: args.output.clone(),
        format: args.format.map(output_format),
    };
    let progress = ProgressObserver::new(!args.no_progress);
    let result = run_match(&request, &progress, &CancelToken::new());
    progress.finish();
    result
}

/// Defaults, then the config file, then command-line flags.
fn build_config(args: &MatchArgs) -> Result<MatchConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => MatchConfig::default(),
    };
    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }
    if let Some(model) = &args.model {
        config.model = model.parse()?;
    }
    if args.all {
        config.limit = Limit::All;
    } else if let Some(limit) = args.limit {
        config.limit = Limit::Top(limit);
    }
    if !args.source_columns.is_empty() {
        config.source_columns = args.source_columns.clone();
    }
    if !args.destination_columns.is_empty() {
        config.destination_columns = args.destination_columns.clone();
    }
    if let Some(processor) = args.processor {
        config.processor = match processor {
            ProcessorArg::Raw => Processor::Raw,
            ProcessorArg::Normalize => Processor::Normalize,
        };
    }
    config.emit_unmatched |= args.emit_unmatched;
    config.parallel |= args.parallel;
    config.validate()?;
    Ok(config)
}

fn output_format(arg: OutputFormatArg) -> OutputFormat {
    match arg {
        OutputFormatArg::Csv => OutputFormat::Csv,
        OutputFormatArg::Json => OutputFormat::Json,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::Parser;

    use super::*;
    use crate::cli::{Cli, Command};

    fn match_args(extra: &[&str]) -> MatchArgs {
        let mut argv = vec!["rowmatch", "match", "a.csv", "b.csv", "-s", "Name", "-d", "Name"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Command::Match(args) => args,
            Command::Models => unreachable!("match subcommand expected"),
        }
    }

    #[test]
    fn defaults_without_flags() {
        let config = build_config(&match_args(&[])).unwrap();
        assert_eq!(config, MatchConfig::default());
    }

    #[test]
    fn flags_set_every_field() {
        let args = match_args(&[
            "--threshold",
            "65",
            "--model",
            "Token Sort Ratio",
            "--limit",
            "2",
            "--source-columns",
            "Name,Id",
            "--processor",
            "default",
            "--emit-unmatched",
            "--parallel",
        ]);
        let config = build_config(&args).unwrap();
        assert_eq!(config.threshold, 65.0);
        assert_eq!(config.model, ScoringModel::TokenSortRatio);
        assert_eq!(config.limit, Limit::Top(2));
        assert_eq!(config.source_columns, vec!["Name", "Id"]);
        assert!(config.destination_columns.is_empty());
        assert_eq!(config.processor, Processor::Normalize);
        assert!(config.emit_unmatched);
        assert!(config.parallel);
    }

    #[test]
    fn all_flag_means_exhaustive() {
        let config = build_config(&match_args(&["--all"])).unwrap();
        assert_eq!(config.limit, Limit::All);
    }

    #[test]
    fn flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"threshold": 90, "model": "levenshtein", "limit": "all"}}"#
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let config = build_config(&match_args(&["--config", &path, "-t", "70"])).unwrap();
        assert_eq!(config.threshold, 70.0);
        assert_eq!(config.model, ScoringModel::Levenshtein);
        assert_eq!(config.limit, Limit::All);
    }

    #[test]
    fn invalid_values_fail_before_matching() {
        assert!(build_config(&match_args(&["--threshold", "101"])).is_err());
        assert!(build_config(&match_args(&["--limit", "0"])).is_err());
        let err = build_config(&match_args(&["--model", "soundex"])).unwrap_err();
        assert!(err.to_string().contains("unknown model"));
    }

    #[test]
    fn limit_conflicts_with_all() {
        let argv = [
            "rowmatch", "match", "a.csv", "b.csv", "-s", "A", "-d", "B", "--limit", "3", "--all",
        ];
        assert!(Cli::try_parse_from(argv).is_err());
    }
}
