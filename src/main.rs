use clap::Parser;
use serde_json::Value;

use value_processors::builtins::Registry;
use value_processors::{Context, Join, MapCompose, ProcessError, StructuredSearch, TakeFirst, Unique};

/// Normalize a raw value through composable stages.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Raw value: parsed as JSON when possible, otherwise plain text
    value: String,
    /// Comma-separated builtin stage names applied element-wise
    #[arg(long, value_delimiter = ',')]
    map: Vec<String>,
    /// Query path evaluated against each mapped text element
    #[arg(long)]
    search: Option<String>,
    /// Terminal reducer: identity, take_first, join or unique
    #[arg(long, default_value = "identity")]
    reduce: String,
    /// Separator used by the join reducer
    #[arg(long, default_value = " ")]
    separator: String,
    /// Runtime context as a JSON object
    #[arg(long)]
    context: Option<String>,
}

fn main() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let args = Args::parse();
    match run(&args) {
        Ok(out) => println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default()),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

fn run(args: &Args) -> Result<Value, ProcessError> {
    let value: Value = serde_json::from_str(&args.value)
        .unwrap_or_else(|_| Value::String(args.value.clone()));
    let context = match &args.context {
        Some(text) => Some(
            serde_json::from_str::<Context>(text)
                .map_err(|e| ProcessError::usage(format!("invalid context: {e}")))?,
        ),
        None => None,
    };

    let registry = Registry::with_builtins();
    let mut stages = Vec::new();
    for name in &args.map {
        let stage = registry.get(name).ok_or_else(|| {
            ProcessError::usage(format!(
                "unknown stage {name:?}, expected one of {:?}",
                registry.names()
            ))
        })?;
        stages.push(stage);
    }
    let mut values = MapCompose::new(stages).call(value, context.as_ref())?;

    if let Some(path) = &args.search {
        values = StructuredSearch::new(path.clone()).search(values)?;
    }

    match args.reduce.as_str() {
        "identity" => Ok(Value::Array(values)),
        "take_first" => Ok(TakeFirst.first(&values)),
        "join" => Ok(Value::String(Join::new(args.separator.as_str()).join(&values)?)),
        "unique" => Ok(Value::Array(Unique.unique(values))),
        other => Err(ProcessError::usage(format!("unknown reducer {other:?}"))),
    }
}
