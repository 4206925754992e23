use anyhow::{Context, Result};
use clap::Parser;
use push3_vm::program::{read_sexpr, Ast};
use std::path::Path;

fn load_source(input: impl AsRef<Path>) -> Result<Ast> {
    let input = input.as_ref();
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    read_sexpr(&text).with_context(|| format!("in {}", input.display()))
}

fn hex_dump(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

fn compile(input: impl AsRef<Path>, output: Option<&Path>, hex: bool) -> Result<Vec<u8>> {
    let ast = load_source(input)?;
    let data = ast.to_bytecode()?;
    log::info!(
        "{} nodes, nesting depth {}, {} bytes",
        ast.size(),
        ast.depth(),
        data.len()
    );

    if let Some(output) = output {
        std::fs::write(output, &data)
            .with_context(|| format!("Failed to write {}", output.display()))?;
    }
    if hex || output.is_none() {
        println!("{}", hex_dump(&data));
    }

    Ok(data)
}

#[derive(Parser, Debug)]
#[command(version, about = "Assemble S-expression source into push3 bytecode", long_about = None)]
struct Args {
    #[clap(short, long)]
    input: String,
    /// Where to write the bytecode. Without it the bytes are printed as hex.
    #[clap(short, long)]
    output: Option<String>,
    /// Also print the bytes as hex when writing a file.
    #[clap(long)]
    hex: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    let output = args.output.as_deref().map(Path::new);
    if let Err(e) = compile(&args.input, output, args.hex) {
        log::error!("Error: {:#}", e);
        std::process::exit(1);
    }
}
