//! Command-line interface definitions for the crawler.
//!
//! One source is crawled per invocation. Everything other than the source has a default, either
//! here or in the YAML configuration.

use clap::Parser;

use crate::scrapers::SourceName;

/// Command-line arguments for one crawl run.
///
/// # Examples
///
/// ```sh
/// # Newest AI Weekly issue into data/ai-weekly.jsonl
/// ai_news_crawler ai-weekly
///
/// # First 20 trending papers to a custom path, with a config file
/// ai_news_crawler hf-papers --limit 20 --out ./papers.jsonl --config ./crawler.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Site to crawl
    #[arg(value_enum)]
    pub source: SourceName,

    /// Maximum number of items to attempt (defaults to the source's own limit)
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Output JSON Lines file (defaults to data/<source>.jsonl)
    #[arg(short, long)]
    pub out: Option<String>,

    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "ai_news_crawler",
            "jiqizhixin",
            "--limit",
            "45",
            "--out",
            "./out.jsonl",
        ]);

        assert_eq!(cli.source, SourceName::Jiqizhixin);
        assert_eq!(cli.limit, Some(45));
        assert_eq!(cli.out.as_deref(), Some("./out.jsonl"));
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["ai_news_crawler", "ai-era", "-l", "5", "-c", "/tmp/c.yaml"]);

        assert_eq!(cli.source, SourceName::AiEra);
        assert_eq!(cli.limit, Some(5));
        assert_eq!(cli.config.as_deref(), Some("/tmp/c.yaml"));
    }

    #[test]
    fn test_cli_rejects_unknown_source() {
        assert!(Cli::try_parse_from(["ai_news_crawler", "cnn"]).is_err());
    }
}
