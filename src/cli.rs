use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "image-search")]
#[command(about = "Browse object images by project and cluster and pair them with camera images", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.image-search/config.json)
    pub config: Option<PathBuf>,

    /// Log filter, overrides the config's log_filter
    #[arg(long)]
    pub log_filter: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["image-search"]).unwrap();

        assert!(cli.config.is_none());
        assert!(cli.log_filter.is_none());
    }

    #[test]
    fn test_config_path_and_log_filter() {
        let cli = Cli::try_parse_from([
            "image-search",
            "survey.json",
            "--log-filter",
            "image_search=debug",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("survey.json")));
        assert_eq!(cli.log_filter.as_deref(), Some("image_search=debug"));
    }

    #[test]
    fn test_flags_are_not_taken_as_config_paths() {
        let err = Cli::try_parse_from(["image-search", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);

        assert!(Cli::try_parse_from(["image-search", "--confg", "x.json"]).is_err());
    }
}
