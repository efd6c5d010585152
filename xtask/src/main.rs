use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};
use zip::result::ZipResult;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const LAMBDA_PACKAGE: &str = "request_recorder_lambda";
const LAMBDA_BINARY: &str = "request_lambda";
const DIST_DIR: &str = "dist";
const ARTIFACT_NAME: &str = "request_recorder.zip";

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the request recorder workspace",
    long_about = "A unified CLI for CI checks and Lambda packaging in the\n\
                  request recorder workspace."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run CI checks (fmt, clippy, tests)
    Ci,
    /// Build the Lambda binary and zip it as `bootstrap`
    LambdaPackage {
        /// Compilation target triple for the Lambda binary
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        /// Build profile used for the binary
        #[arg(value_enum, long, default_value_t = BuildProfile::Release)]
        profile: BuildProfile,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum BuildProfile {
    Debug,
    Release,
}

impl BuildProfile {
    fn dir_name(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }

    fn as_cargo_flag(self) -> Option<&'static str> {
        match self {
            Self::Debug => None,
            Self::Release => Some("--release"),
        }
    }
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo")
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn package_lambda(target: &str, profile: BuildProfile) -> Result<PathBuf, String> {
    check_lambda_target(target)?;

    step("Build request recorder lambda binary");

    let mut cargo_args = vec![
        "build",
        "-p",
        LAMBDA_PACKAGE,
        "--target",
        target,
        "--bin",
        LAMBDA_BINARY,
    ];
    if let Some(flag) = profile.as_cargo_flag() {
        cargo_args.push(flag);
    }
    run_cargo(&cargo_args);

    step("Package request recorder artifact");
    let binary_path = Path::new("target")
        .join(target)
        .join(profile.dir_name())
        .join(binary_name(LAMBDA_BINARY, target));
    let artifact_path = Path::new(DIST_DIR).join(ARTIFACT_NAME);
    write_bootstrap_zip(&binary_path, &artifact_path)?;

    Ok(artifact_path)
}

/// Fails when rustup reports `target` as missing. A missing rustup only warns.
fn check_lambda_target(target: &str) -> Result<(), String> {
    let output = match Command::new("rustup")
        .args(["target", "list", "--installed"])
        .output()
    {
        Ok(value) => value,
        Err(error) => {
            eprintln!("warning: rustup unavailable ({error}); skipping lambda target check");
            return Ok(());
        }
    };

    if !output.status.success() {
        return Err(format!(
            "could not list installed rust targets: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }

    if installed_targets_include(&String::from_utf8_lossy(&output.stdout), target) {
        Ok(())
    } else {
        Err(format!(
            "{LAMBDA_BINARY} needs rust target `{target}`; run `rustup target add {target}` first"
        ))
    }
}

fn installed_targets_include(listing: &str, target: &str) -> bool {
    listing.lines().any(|line| line.trim() == target)
}

fn binary_name(bin_name: &str, target: &str) -> String {
    if target.contains("windows") {
        format!("{bin_name}.exe")
    } else {
        bin_name.to_string()
    }
}

/// Zips `binary_path` as the executable `bootstrap` entry the Lambda
/// custom runtime expects.
fn write_bootstrap_zip(binary_path: &Path, zip_path: &Path) -> Result<(), String> {
    let binary = fs::read(binary_path).map_err(|error| {
        format!(
            "no {LAMBDA_BINARY} binary at '{}': {error}",
            binary_path.display()
        )
    })?;
    if let Some(parent) = zip_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|error| format!("cannot create '{}': {error}", parent.display()))?;
    }

    let file = fs::File::create(zip_path)
        .map_err(|error| format!("cannot create '{}': {error}", zip_path.display()))?;
    zip_bootstrap(file, &binary)
        .map_err(|error| format!("failed to write '{}': {error}", zip_path.display()))
}

fn zip_bootstrap(file: fs::File, binary: &[u8]) -> ZipResult<()> {
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);
    zip.start_file("bootstrap", options)?;
    zip.write_all(binary)?;
    zip.finish()?;
    Ok(())
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_check() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);

    step("Test request_recorder_core");
    run_cargo(&["test", "-p", "request_recorder_core"]);

    step("Test request_recorder_lambda");
    run_cargo(&["test", "-p", LAMBDA_PACKAGE]);

    step("Test xtask");
    run_cargo(&["test", "-p", "xtask"]);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci => {
            ci_check();
            eprintln!("\nCI job passed.");
        }
        Commands::LambdaPackage { target, profile } => match package_lambda(&target, profile) {
            Ok(artifact) => eprintln!("\nPackaged artifact:\n- {}", artifact.display()),
            Err(message) => {
                eprintln!("error: {message}");
                exit(1);
            }
        },
    }
}
