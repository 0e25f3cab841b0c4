use scaffold_service::{
    about,
    config::{ServiceConfig, DEFAULT_CONFIG_PATH},
    logging,
    protocol::ScaffoldRequest,
    service::{
        IndexedScaffoldService, ScaffoldService, SERVICE_ALIAS, SERVICE_DESCRIPTION,
        SERVICE_NAME,
    },
};
use serde::Serialize;
use std::env;

#[derive(Serialize)]
struct ServiceSummary {
    name: &'static str,
    alias: &'static str,
    description: &'static str,
    index_count: usize,
    provider_namespace: Option<String>,
}

fn usage() {
    eprintln!(
        "Usage:\n  \
  scaffold_cli --version\n  \
  scaffold_cli [--config PATH] info\n  \
  scaffold_cli [--config PATH] indexes\n  \
  scaffold_cli [--config PATH] parameters\n  \
  scaffold_cli [--config PATH] scaffolds STORE\n  \
  scaffold_cli [--config PATH] fetch STORE SCAFFOLD [WRAP_WIDTH]\n\n  \
  STORE is a store id, a provider-qualified store id or a FASTA path.\n  \
  WRAP_WIDTH 0 disables line wrapping."
    );
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Could not serialize JSON output: {e}"))?;
    println!("{text}");
    Ok(())
}

fn parse_global_config_arg(args: &[String]) -> (String, usize) {
    if args.len() >= 3 && args[1] == "--config" {
        return (args[2].clone(), 3);
    }
    (DEFAULT_CONFIG_PATH.to_string(), 1)
}

fn load_service(path: &str) -> Result<IndexedScaffoldService, String> {
    let config = ServiceConfig::from_json_file(path).map_err(|e| e.to_string())?;
    Ok(IndexedScaffoldService::from_config(&config))
}

fn main() {
    logging::init_logging();
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().collect();
    if args.len() <= 1 {
        usage();
        return Err("Missing command".to_string());
    }
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("{}", about::version_cli_text());
        return Ok(());
    }

    let (config_path, cmd_idx) = parse_global_config_arg(&args);
    if args.len() <= cmd_idx {
        usage();
        return Err("Missing command".to_string());
    }
    let command = &args[cmd_idx];
    let rest = &args[cmd_idx + 1..];

    match command.as_str() {
        "info" => {
            let service = load_service(&config_path)?;
            print_json(&ServiceSummary {
                name: SERVICE_NAME,
                alias: SERVICE_ALIAS,
                description: SERVICE_DESCRIPTION,
                index_count: service.registry().len(),
                provider_namespace: service.provider_namespace().map(str::to_string),
            })
        }
        "indexes" => {
            let service = load_service(&config_path)?;
            let (options, _) = service.index_options();
            print_json(&options)
        }
        "parameters" => {
            let service = load_service(&config_path)?;
            print_json(&service.parameters())
        }
        "scaffolds" => {
            let [store] = rest else {
                usage();
                return Err("scaffolds expects STORE".to_string());
            };
            let service = load_service(&config_path)?;
            let scaffolds = service.list_scaffolds(store).map_err(|e| e.to_string())?;
            print_json(&scaffolds)
        }
        "fetch" => {
            let (store, scaffold, wrap_width) = match rest {
                [store, scaffold] => (store, scaffold, None),
                [store, scaffold, wrap] => {
                    let wrap = wrap
                        .parse::<u32>()
                        .map_err(|e| format!("Invalid WRAP_WIDTH '{wrap}': {e}"))?;
                    (store, scaffold, Some(wrap))
                }
                _ => {
                    usage();
                    return Err("fetch expects STORE SCAFFOLD [WRAP_WIDTH]".to_string());
                }
            };
            let service = load_service(&config_path)?;
            let mut request = ScaffoldRequest::new(store, scaffold);
            request.wrap_width = wrap_width;
            let outcome = service.handle(&request);
            if !outcome.succeeded() {
                print_json(&outcome.jobs())?;
                return Err(format!("Could not fetch scaffold '{scaffold}' from '{store}'"));
            }
            for record in outcome.jobs().iter().filter_map(|job| job.result()) {
                print!("{}", record.data);
            }
            Ok(())
        }
        _ => {
            usage();
            Err(format!("Unknown command '{command}'"))
        }
    }
}
