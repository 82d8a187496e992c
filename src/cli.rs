//! 命令行入口：参数定义和各子命令的执行。

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use crate::core::ConfigStore;
use crate::discovery::{PayloadDiscovery, PayloadPaths};
use crate::error::Result;
use crate::generator::DockerRuntime;
use crate::models::{GeneratorType, ProjectInfo};
use crate::preflight::Preflight;
use crate::recommend::Recommender;
use crate::settings::{Settings, DEFAULT_DOCKER_BIN, DEFAULT_IMAGE};
use crate::workflow::{manual_generation_guide, GenerateRequest, Workflow, WorkflowOutcome};

/// Generate typed API clients from Apifox OpenAPI specs
#[derive(Debug, Parser)]
#[command(name = "apifox-gen", version, about)]
pub struct Cli {
    /// Project directory holding apifox.config.json
    #[arg(short = 'C', long, global = true, env = "APIFOX_GEN_WORKDIR")]
    pub workdir: Option<PathBuf>,

    /// openapi-generator container image
    #[arg(long, global = true, env = "APIFOX_GEN_IMAGE", default_value = DEFAULT_IMAGE)]
    pub image: String,

    /// docker binary used to run the generator
    #[arg(long, global = true, env = "APIFOX_GEN_DOCKER", default_value = DEFAULT_DOCKER_BIN)]
    pub docker: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write an empty apifox.config.json
    Init,
    /// Run the environment checks
    Check,
    /// Generate a client and start tracking it
    Generate(GenerateArgs),
    /// Regenerate a tracked client
    Update {
        name: String,
        #[command(flatten)]
        payloads: PayloadArgs,
        #[arg(long)]
        json: bool,
    },
    /// List tracked apis
    List {
        #[arg(long)]
        json: bool,
    },
    /// Stop tracking an api (generated files are kept)
    Remove { name: String },
    /// Validate apifox.config.json
    Validate,
    /// Recommend generator settings for a project
    Recommend {
        #[command(flatten)]
        payloads: PayloadArgs,
        /// Project name used for the output path when no project file is given
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Print the manual generation guide
    Guide {
        name: String,
        #[arg(long)]
        project_id: Option<String>,
        #[arg(long)]
        document_id: Option<String>,
        #[arg(short, long, value_enum, default_value_t = GeneratorType::TypescriptAxios)]
        generator: GeneratorType,
    },
}

/// 外部发现工具落盘的 JSON 文件
#[derive(Debug, Clone, Default, Args)]
pub struct PayloadArgs {
    /// Project metadata JSON
    #[arg(long)]
    pub project: Option<PathBuf>,
    /// API operation list JSON
    #[arg(long)]
    pub apis: Option<PathBuf>,
    /// OpenAPI document JSON
    #[arg(long)]
    pub spec: Option<PathBuf>,
}

impl PayloadArgs {
    fn paths(&self) -> PayloadPaths {
        PayloadPaths {
            project: self.project.clone(),
            apis: self.apis.clone(),
            spec: self.spec.clone(),
        }
    }
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Name of the api source
    pub name: String,
    #[command(flatten)]
    pub payloads: PayloadArgs,
    #[arg(long)]
    pub project_id: Option<String>,
    #[arg(long)]
    pub document_id: Option<String>,
    #[arg(short, long, value_enum)]
    pub generator: Option<GeneratorType>,
    #[arg(short, long)]
    pub output: Option<String>,
    /// Generator option file, relative to the project directory
    #[arg(long)]
    pub config_file: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// 工作目录统一转成绝对路径，docker `-v` 挂载要求绝对路径
    pub fn settings(&self) -> Settings {
        let working_dir = self
            .workdir
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        let working_dir = std::path::absolute(&working_dir).unwrap_or(working_dir);
        let mut settings = Settings::new(working_dir);
        settings.image = self.image.clone();
        settings.docker_bin = self.docker.clone();
        settings
    }
}

/// 执行子命令；返回 false 表示命令完成但结论为失败（进程应以非零退出）
pub fn run(cli: Cli) -> Result<bool> {
    let settings = cli.settings();
    let working_dir = settings.working_dir.clone();

    match cli.command {
        Command::Init => {
            let mut store = ConfigStore::open(&working_dir)?;
            store.init()?;
            println!("created {}", store.path().display());
            Ok(true)
        }
        Command::Check => {
            let runtime = DockerRuntime::new(&settings);
            let report = Preflight::new(&runtime).check(&working_dir);
            print!("{}", report);
            Ok(report.passed)
        }
        Command::Generate(args) => {
            let runtime = DockerRuntime::new(&settings);
            let discovery = PayloadDiscovery::load(&args.payloads.paths())?;
            let mut store = ConfigStore::open(&working_dir)?;
            let request = GenerateRequest {
                api_name: args.name,
                description: args.description,
                project_id: args.project_id,
                document_id: args.document_id,
                generator: args.generator,
                output_path: args.output,
                config_file: args.config_file,
            };
            let outcome = Workflow::new(&runtime, &working_dir).run_generate(&mut store, &request, &discovery);
            print_outcome(&outcome, args.json)
        }
        Command::Update { name, payloads, json } => {
            let runtime = DockerRuntime::new(&settings);
            let discovery = PayloadDiscovery::load(&payloads.paths())?;
            let mut store = ConfigStore::open(&working_dir)?;
            let outcome = Workflow::new(&runtime, &working_dir).run_update(&mut store, &name, &discovery);
            print_outcome(&outcome, json)
        }
        Command::List { json } => {
            let store = ConfigStore::open(&working_dir)?;
            if json {
                let resolved: Vec<_> = store.list().iter().filter_map(|api| store.resolve(&api.name)).collect();
                print_json(&resolved)?;
                return Ok(true);
            }
            let apis = store.list();
            if apis.is_empty() {
                println!("no apis tracked in {}", store.path().display());
            }
            for api in apis {
                let last = api
                    .last_generated
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "never".to_string());
                println!(
                    "{}\t{}\t{}\tproject {}\tlast generated {}",
                    api.name, api.generator.generator_type, api.generator.output_path, api.apifox.project_id, last
                );
            }
            Ok(true)
        }
        Command::Remove { name } => {
            let mut store = ConfigStore::open(&working_dir)?;
            if store.remove(&name)? {
                println!("removed {} (generated files were left in place)", name);
                Ok(true)
            } else {
                println!("api not found: {}", name);
                Ok(true)
            }
        }
        Command::Validate => {
            let store = ConfigStore::open(&working_dir)?;
            let validation = store.validate(None)?;
            for error in &validation.errors {
                println!("error: {}", error);
            }
            for warning in &validation.warnings {
                println!("warning: {}", warning);
            }
            if validation.valid {
                println!("{} is valid", store.path().display());
            }
            Ok(validation.valid)
        }
        Command::Recommend { payloads, name, json } => {
            let discovery = PayloadDiscovery::load(&payloads.paths())?;
            let project = discovery.project().cloned().unwrap_or_else(|| ProjectInfo {
                name: name.clone().unwrap_or_default(),
                ..Default::default()
            });
            let project_name = name.unwrap_or_else(|| project.name.clone());
            let profile = Recommender.recommend(&project_name, &project, discovery.apis(), discovery.spec());
            if json {
                print_json(&profile)?;
            } else {
                println!("generator: {}", profile.generator);
                println!("output:    {}", profile.output_path);
                for reason in &profile.reasons {
                    println!("  - {}", reason);
                }
            }
            Ok(true)
        }
        Command::Guide {
            name,
            project_id,
            document_id,
            generator,
        } => {
            println!(
                "{}",
                manual_generation_guide(&name, project_id.as_deref(), document_id.as_deref(), generator)
            );
            Ok(true)
        }
    }
}

fn print_outcome(outcome: &WorkflowOutcome, json: bool) -> Result<bool> {
    if json {
        print_json(outcome)?;
    } else {
        println!("{}", outcome.message);
    }
    Ok(outcome.success)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
