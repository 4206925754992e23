use anyhow::{Context, Result};
use clap::{Parser as ClapParser, ValueEnum};
use push3_vm::parser::tokens;
use push3_vm::program::{listing, to_sexpr, ListingEntry};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// One token per line, indented by sublist depth
    Text,
    /// The same listing as a YAML sequence
    Yaml,
    /// S-expression source the assembler accepts
    Sexpr,
}

pub struct Disassembler {
    code: Vec<u8>,
}

impl Disassembler {
    pub fn new(input: impl AsRef<Path>) -> Result<Self> {
        let input = input.as_ref();
        let code = std::fs::read(input)
            .with_context(|| format!("Failed to read {}", input.display()))?;
        Ok(Self { code })
    }

    pub fn from_bytes(code: Vec<u8>) -> Self {
        Self { code }
    }

    pub fn entries(&self) -> Vec<ListingEntry> {
        listing(&self.code)
    }

    /// True when the top-level scan ends on a token cut short by end of input.
    pub fn truncated_tail(&self) -> bool {
        let mut scan = tokens(&self.code, 0, self.code.len() as u32);
        scan.by_ref().for_each(drop);
        scan.truncated()
    }

    pub fn render(&self, format: Format) -> Result<String> {
        let out = match format {
            Format::Text => {
                let mut text = String::new();
                for entry in self.entries() {
                    text.push_str(&entry.to_line());
                    text.push('\n');
                }
                text
            }
            Format::Yaml => serde_yaml::to_string(&self.entries())?,
            Format::Sexpr => {
                let mut text = to_sexpr(&self.code);
                text.push('\n');
                text
            }
        };
        Ok(out)
    }

    pub fn write_to(&self, output: Option<&Path>, format: Format) -> Result<()> {
        let rendered = self.render(format)?;
        match output {
            Some(path) => std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?,
            None => std::io::stdout().write_all(rendered.as_bytes())?,
        }
        Ok(())
    }
}

#[derive(ClapParser, Debug)]
#[command(version, about = "Disassemble push3 bytecode", long_about = None)]
struct Args {
    #[arg(short, long, required = true)]
    input: PathBuf,

    /// Defaults to stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value = "text")]
    format: Format,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let disassembler = Disassembler::new(&args.input)?;
    log::debug!("{} tokens", disassembler.entries().len());
    if disassembler.truncated_tail() {
        log::warn!("{} ends inside a token; the partial token is not listed", args.input.display());
    }
    disassembler.write_to(args.output.as_deref(), args.format)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn testcase() -> Result<Disassembler> {
        let input = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/testcase/sum.bin"));
        Disassembler::new(input)
    }

    #[test]
    fn test_text_listing() -> Result<()> {
        let text = testcase()?.render(Format::Text)?;
        let expected = "\
0x0000  SUBLIST 11
0x0003    INT 10
0x0008    INT 32
0x000D    INTEGER.+
";
        assert_eq!(text, expected);
        Ok(())
    }

    #[test]
    fn test_yaml_listing_reads_back() -> Result<()> {
        let disassembler = testcase()?;
        let yaml = disassembler.render(Format::Yaml)?;
        let entries: Vec<ListingEntry> = serde_yaml::from_str(&yaml)?;
        assert_eq!(entries, disassembler.entries());
        assert_eq!(entries[3].mnemonic, "INTEGER.+");
        assert_eq!(entries[3].operand, None);
        Ok(())
    }

    #[test]
    fn test_sexpr() -> Result<()> {
        assert_eq!(testcase()?.render(Format::Sexpr)?, "(10 32 INTEGER.+)\n");
        let junk = Disassembler::from_bytes(vec![0xEE, 0x02, 0x00]);
        assert_eq!(junk.render(Format::Sexpr)?, "NOOP\n");
        Ok(())
    }

    #[test]
    fn test_truncated_tail() {
        assert!(Disassembler::from_bytes(vec![0x10, 0x02, 0x00]).truncated_tail());
        assert!(!Disassembler::from_bytes(vec![0x10, 0x02, 0, 0, 0, 1]).truncated_tail());
    }
}
