use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use crane_config::CraneConfig;
use crane_testing::schema::{
    CargoPackage, CargoTestListResult, NodeTarget, TestListRequest, TestNode, TestSuiteInfo,
};
use crane_testing::{list_tests, read_request};
use serde::Serialize;
use std::fmt::Write as _;
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "crane", version, about = "Crane CLI (cargo test listings to test trees)")]
struct Cli {
    /// Path to a `crane.toml` configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the test tree built from one package's listings
    Tree(TreeArgs),
    /// Print the test case or suite record for an id
    Lookup(LookupArgs),
}

#[derive(Args)]
struct InputArgs {
    /// JSON test list request (`-` reads stdin)
    #[arg(long, conflicts_with_all = ["package", "listing"])]
    request: Option<PathBuf>,
    /// Package name the listings belong to
    #[arg(long, requires = "listing")]
    package: Option<String>,
    /// Output of `cargo test -- --list` for one target, as `NAME:TYPE=FILE`
    #[arg(
        long,
        value_name = "NAME:TYPE=FILE",
        value_parser = parse_listing,
        requires = "package"
    )]
    listing: Vec<ListingArg>,
}

#[derive(Args)]
struct TreeArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Emit the JSON response instead of a tree
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct LookupArgs {
    /// Test case or suite id (`pkg::lib::lib::tests::adds`)
    id: String,
    #[command(flatten)]
    input: InputArgs,
}

#[derive(Clone, Debug, PartialEq)]
struct ListingArg {
    target: NodeTarget,
    path: PathBuf,
}

fn parse_listing(raw: &str) -> std::result::Result<ListingArg, String> {
    let (target, path) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME:TYPE=FILE, got `{raw}`"))?;
    let target = target.parse::<NodeTarget>().map_err(|err| err.to_string())?;
    if path.is_empty() {
        return Err(format!("missing listing file in `{raw}`"));
    }
    Ok(ListingArg {
        target,
        path: PathBuf::from(path),
    })
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            2
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    let config = match &cli.config {
        Some(path) => CraneConfig::load_from_path(path)?,
        None => CraneConfig::default(),
    };
    crane_config::init_tracing(&config.logging);

    match cli.command {
        Command::Tree(args) => {
            let request = build_request(&args.input)?;
            let response = list_tests(&request);
            if args.json || config.output.json {
                print_json(&response, config.output.pretty)?;
            } else {
                match &response.result {
                    Some(loaded) => {
                        print!("{}", render_tree(&loaded.root_test_suite));
                        println!("{} tests", loaded.test_count());
                    }
                    None => println!("no tests"),
                }
            }
            Ok(0)
        }
        Command::Lookup(args) => {
            let request = build_request(&args.input)?;
            let Some(loaded) = list_tests(&request).result else {
                eprintln!("no tests");
                return Ok(1);
            };

            if let Some(case) = loaded.test_case(&args.id) {
                print_json(
                    &LookupOutput {
                        kind: "testCase",
                        record: case,
                        test_case_ids: None,
                    },
                    config.output.pretty,
                )?;
            } else if let Some(suite) = loaded.test_suite(&args.id) {
                let test_case_ids = loaded
                    .test_cases_under(&args.id)
                    .into_iter()
                    .map(|case| case.id.as_str())
                    .collect();
                print_json(
                    &LookupOutput {
                        kind: "suite",
                        record: suite,
                        test_case_ids: Some(test_case_ids),
                    },
                    config.output.pretty,
                )?;
            } else {
                eprintln!("no test or suite with id `{}`", args.id);
                return Ok(1);
            }
            Ok(0)
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupOutput<'a, T: Serialize> {
    kind: &'static str,
    record: &'a T,
    #[serde(skip_serializing_if = "Option::is_none")]
    test_case_ids: Option<Vec<&'a str>>,
}

fn build_request(input: &InputArgs) -> Result<TestListRequest> {
    if let Some(path) = &input.request {
        if path.as_os_str() == "-" {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read request from stdin")?;
            return serde_json::from_str(&text).context("invalid request on stdin");
        }
        return read_request(path)
            .with_context(|| format!("failed to load request {}", path.display()));
    }

    if input.package.is_none() && input.listing.is_empty() {
        bail!("either `--request` or `--package` with `--listing` is required");
    }

    let mut results = Vec::with_capacity(input.listing.len());
    for listing in &input.listing {
        let output = std::fs::read_to_string(&listing.path)
            .with_context(|| format!("failed to read listing {}", listing.path.display()))?;
        tracing::debug!(
            target: "crane.cli",
            node_target = %listing.target,
            path = %listing.path.display(),
            "loaded test listing"
        );
        results.push(Some(CargoTestListResult {
            output,
            node_target: listing.target.clone(),
        }));
    }

    Ok(TestListRequest {
        package: input.package.as_deref().map(CargoPackage::new),
        results,
    })
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}

fn render_tree(root: &TestSuiteInfo) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", root.label);
    render_children(&root.children, "", &mut out);
    out
}

fn render_children(children: &[TestNode], prefix: &str, out: &mut String) {
    for (idx, child) in children.iter().enumerate() {
        let last = idx + 1 == children.len();
        let branch = if last { "└─ " } else { "├─ " };
        let _ = writeln!(out, "{prefix}{branch}{}", child.label());
        if let TestNode::Suite(suite) = child {
            let continuation = if last { "   " } else { "│  " };
            render_children(&suite.children, &format!("{prefix}{continuation}"), out);
        }
    }
}
