use anyhow::{Context, Result};
use clap::Parser;
use rpmfetch::cache::CacheLayout;
use rpmfetch::commands::{RunOptions, download};
use rpmfetch::fetch::DEFAULT_JOBS;
use rpmfetch::repository::{DEFAULT_PROJECT, DEFAULT_REPO_URL, DEFAULT_REPOSITORY, RepoLocation};
use rpmfetch::runtime::{RealRuntime, Runtime};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

/// rpmfetch - download cross-compiled MinGW packages from RPM repositories
///
/// Packages are matched by name (glob patterns allowed, the mingw32-/mingw64-
/// prefix is optional) or by exact .rpm filename, downloaded to a cache and
/// extracted into the output directory. 7z must be on the PATH.
///
/// Examples:
///   rpmfetch gtk3 --deps          # gtk3 and everything it needs
///   rpmfetch 'SDL2*' -z -m        # zip the result, with a metadata file
#[derive(Parser, Debug)]
#[command(author, version = env!("RPMFETCH_VERSION"), about)]
struct Cli {
    /// Package names, glob patterns or .rpm filenames
    #[arg(value_name = "PACKAGE", required = true)]
    packages: Vec<String>,

    /// Download from PROJECT
    #[arg(short = 'p', long, value_name = "PROJECT", default_value = DEFAULT_PROJECT)]
    project: String,

    /// Download from REPOSITORY
    #[arg(short = 'r', long, value_name = "REPOSITORY", default_value = DEFAULT_REPOSITORY)]
    repository: String,

    /// Repository URL; PROJECT and REPOSITORY are substituted
    #[arg(short = 'u', long = "repo-url", value_name = "URL", default_value = DEFAULT_REPO_URL)]
    repo_url: String,

    /// Download dependencies
    #[arg(long, overrides_with = "no_deps")]
    deps: bool,

    /// Do not download dependencies [default]
    #[arg(long, overrides_with = "deps")]
    no_deps: bool,

    /// Download source instead of noarch packages
    #[arg(long)]
    src: bool,

    /// Do not remove previously extracted files
    #[arg(long)]
    no_clean: bool,

    /// Zip the extracted packages, named after the first package
    #[arg(short = 'z', long)]
    make_zip: bool,

    /// Add a file listing what the packages provide and require
    #[arg(short = 'm', long)]
    add_metadata: bool,

    /// Only report errors
    #[arg(short, long)]
    quiet: bool,

    /// Cache directory (defaults to the user cache dir)
    #[arg(long, env = "RPMFETCH_CACHE_DIR", value_name = "PATH")]
    cache_dir: Option<PathBuf>,

    /// Extract into PATH instead of the current directory
    #[arg(long, value_name = "PATH")]
    output_dir: Option<PathBuf>,

    /// Concurrent downloads
    #[arg(short = 'j', long, value_name = "N", default_value_t = DEFAULT_JOBS)]
    jobs: usize,
}

impl Cli {
    fn run_options(&self) -> RunOptions {
        RunOptions {
            packages: self.packages.clone(),
            location: RepoLocation::from_template(&self.repo_url, &self.project, &self.repository),
            with_dependencies: self.deps,
            source: self.src,
            clean: !self.no_clean,
            make_zip: self.make_zip,
            add_metadata: self.add_metadata,
            jobs: self.jobs,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let level = if cli.quiet { "error" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> Result<()> {
    let runtime = RealRuntime;
    let cache_root = match &cli.cache_dir {
        Some(path) => path.clone(),
        None => CacheLayout::default_root(&runtime)
            .context("No cache directory available; pass --cache-dir")?,
    };
    let output_dir = match &cli.output_dir {
        Some(path) => path.clone(),
        None => runtime.current_dir()?,
    };

    download(runtime, cli.run_options(), cache_root, output_dir).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["rpmfetch", "zlib"]).unwrap();
        assert_eq!(cli.packages, vec!["zlib"]);
        assert_eq!(cli.jobs, DEFAULT_JOBS);
        assert_eq!(cli.output_dir, None);

        let options = cli.run_options();
        assert!(!options.with_dependencies);
        assert!(!options.source);
        assert!(options.clean);
        assert!(!options.make_zip);
        assert!(!options.add_metadata);
        assert_eq!(
            options.location.base_url(),
            "http://download.opensuse.org/repositories/windows:/mingw:/win32/openSUSE_13.2/"
        );
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "rpmfetch", "--deps", "--src", "--no-clean", "-z", "-m", "-q", "-j", "8", "-p",
            "windows:mingw:win64", "-r", "openSUSE_Leap_15.6", "gtk3", "cairo",
        ])
        .unwrap();

        assert!(cli.quiet);
        let options = cli.run_options();
        assert_eq!(options.packages, vec!["gtk3", "cairo"]);
        assert!(options.with_dependencies);
        assert!(options.source);
        assert!(!options.clean);
        assert!(options.make_zip);
        assert!(options.add_metadata);
        assert_eq!(options.jobs, 8);
        assert_eq!(
            options.location.base_url(),
            "http://download.opensuse.org/repositories/windows:/mingw:/win64/openSUSE_Leap_15.6/"
        );
    }

    #[test]
    fn test_cli_last_deps_flag_wins() {
        let cli = Cli::try_parse_from(["rpmfetch", "--deps", "--no-deps", "zlib"]).unwrap();
        assert!(!cli.run_options().with_dependencies);

        let cli = Cli::try_parse_from(["rpmfetch", "--no-deps", "--deps", "zlib"]).unwrap();
        assert!(cli.run_options().with_dependencies);
    }

    #[test]
    fn test_cli_repo_url_override() {
        let cli =
            Cli::try_parse_from(["rpmfetch", "-u", "http://mirror.example/repo", "zlib"]).unwrap();
        assert_eq!(cli.run_options().location.base_url(), "http://mirror.example/repo/");
    }

    #[test]
    fn test_cli_requires_packages() {
        assert!(Cli::try_parse_from(["rpmfetch"]).is_err());
        assert!(Cli::try_parse_from(["rpmfetch", "--deps"]).is_err());
    }
}
