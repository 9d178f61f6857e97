use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(
    name = "generate-branch-report",
    version,
    about = "Generate a CSV report of repository branches with their last commit and pull request",
    long_about = "generate-branch-report lists a repository's branches through the GitHub REST API, \
looks up each branch's last commit and pull request, classifies it as active or stale, \
and writes the result as a CSV file."
)]
pub struct Args {
    /// Repository owner (user or organization)
    #[arg(short, long)]
    pub owner: Option<String>,

    /// Repository name
    #[arg(short, long)]
    pub repo: Option<String>,

    /// API token; falls back to GITHUB_TOKEN when omitted
    #[arg(short, long)]
    pub token: Option<String>,

    /// API base URL (default: https://api.github.com)
    #[arg(long = "api-url", value_name = "URL")]
    pub api_url: Option<String>,

    /// Branches fetched from the first page, 1-100 (default: 100)
    #[arg(long = "per-page", value_name = "N")]
    pub per_page: Option<u8>,

    /// Branch protection filter: unprotected, protected or all (default: unprotected)
    #[arg(long, value_name = "FILTER")]
    pub protected: Option<String>,

    /// Report mode: enriched or basic (default: enriched)
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Output CSV path (default depends on the mode)
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Days without commits after which a branch is stale (default: 30)
    #[arg(long = "stale-days", value_name = "DAYS")]
    pub stale_days: Option<i64>,

    /// Only keep branches with this status: active or stale
    #[arg(long, value_name = "STATUS")]
    pub only: Option<String>,

    /// Maximum number of branches enriched at the same time (default: 16)
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Per-request timeout in seconds (default: 30)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Enable debug logging
    #[arg(long, default_value_t = false)]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_flags() {
        let args = Args::try_parse_from([
            "generate-branch-report",
            "-o",
            "acme",
            "-r",
            "widgets",
            "-t",
            "secret",
        ])
        .unwrap();
        assert_eq!(args.owner.as_deref(), Some("acme"));
        assert_eq!(args.repo.as_deref(), Some("widgets"));
        assert_eq!(args.token.as_deref(), Some("secret"));
        assert!(!args.debug);
    }

    #[test]
    fn test_long_flags() {
        let args = Args::try_parse_from([
            "generate-branch-report",
            "--owner",
            "acme",
            "--repo",
            "widgets",
            "--per-page",
            "50",
            "--protected",
            "all",
            "--mode",
            "basic",
            "--output",
            "out.csv",
            "--stale-days",
            "14",
            "--only",
            "stale",
            "--concurrency",
            "4",
            "--timeout",
            "10",
            "--debug",
        ])
        .unwrap();
        assert_eq!(args.per_page, Some(50));
        assert_eq!(args.protected.as_deref(), Some("all"));
        assert_eq!(args.mode.as_deref(), Some("basic"));
        assert_eq!(args.output, Some(PathBuf::from("out.csv")));
        assert_eq!(args.stale_days, Some(14));
        assert_eq!(args.only.as_deref(), Some("stale"));
        assert_eq!(args.concurrency, Some(4));
        assert_eq!(args.timeout, Some(10));
        assert!(args.debug);
    }

    #[test]
    fn test_per_page_rejects_non_numbers() {
        let result = Args::try_parse_from(["generate-branch-report", "--per-page", "lots"]);
        assert!(result.is_err());
    }
}
