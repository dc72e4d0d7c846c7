//! staxc - stream XML documents through the xml-stax event adapters.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};

use clap::{Parser, Subcommand};
use log::info;
use xml_stax::{
    ByteEncoder, CharRead, Charset, EventCursor, EventSerializer, ParserFactory, ParserFeatures,
    XmlEventCharReader, XmlEventInputStream, BUFFER_SIZE,
};

/// Lazy XML event-stream transcoder
#[derive(Parser)]
#[command(name = "staxc")]
#[command(version)]
#[command(about = "Stream XML documents through a pull cursor and re-serialize them", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Re-serialize a document through the byte stream adapter
    #[command(visible_alias = "s")]
    Stream {
        /// Input file
        input: String,
        /// Output file (default: stdout)
        output: Option<String>,

        /// Staging buffer size of the adapter
        #[arg(short, long, default_value_t = BUFFER_SIZE)]
        buffer_size: usize,

        /// Number of bytes requested per read
        #[arg(short, long, default_value = "1024")]
        chunk: usize,

        /// Output encoding
        #[arg(short, long, default_value = "UTF-8")]
        encoding: String,

        /// Write an XML declaration
        #[arg(short, long)]
        declaration: bool,

        #[command(flatten)]
        parser: ParserArgs,
    },

    /// Print the structural events of a document, one per line
    #[command(visible_alias = "e")]
    Events {
        /// Input file
        input: String,

        #[command(flatten)]
        parser: ParserArgs,
    },

    /// Re-serialize a document through the character stream adapter
    #[command(visible_alias = "c")]
    Chars {
        /// Input file
        input: String,
        /// Output file (default: stdout)
        output: Option<String>,

        /// Staging buffer size of the adapter
        #[arg(short, long, default_value_t = BUFFER_SIZE)]
        buffer_size: usize,

        /// Number of characters requested per read
        #[arg(short, long, default_value = "1024")]
        chunk: usize,

        #[command(flatten)]
        parser: ParserArgs,
    },
}

#[derive(clap::Args)]
struct ParserArgs {
    /// Merge CDATA sections into character data
    #[arg(long)]
    coalescing: bool,
    /// Drop comments
    #[arg(long)]
    ignore_comments: bool,
    /// Trim whitespace around text
    #[arg(long)]
    trim_text: bool,
}

impl ParserArgs {
    fn factory(&self) -> ParserFactory {
        let mut features = ParserFeatures::empty();
        features.set(ParserFeatures::COALESCING, self.coalescing);
        features.set(ParserFeatures::IGNORE_COMMENTS, self.ignore_comments);
        features.set(ParserFeatures::TRIM_TEXT, self.trim_text);
        ParserFactory::with_features(features)
    }
}

fn main() -> std::process::ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Stream {
            input,
            output,
            buffer_size,
            chunk,
            encoding,
            declaration,
            parser,
        } => run_stream(
            &input,
            output.as_deref(),
            &parser,
            buffer_size,
            chunk,
            &encoding,
            declaration,
        ),
        Commands::Events { input, parser } => run_events(&input, &parser),
        Commands::Chars {
            input,
            output,
            buffer_size,
            chunk,
            parser,
        } => run_chars(&input, output.as_deref(), &parser, buffer_size, chunk),
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::ExitCode::FAILURE
        }
    }
}

fn open_input(path: &str) -> io::Result<BufReader<File>> {
    Ok(BufReader::new(File::open(path)?))
}

fn open_output(path: Option<&str>) -> io::Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout()),
    })
}

/// Copies a document through the byte stream adapter.
fn run_stream(
    input_path: &str,
    output_path: Option<&str>,
    parser: &ParserArgs,
    buffer_size: usize,
    chunk: usize,
    encoding: &str,
    declaration: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let charset = Charset::for_label(encoding)?;
    let cursor = parser.factory().create_cursor(open_input(input_path)?);
    let serializer = EventSerializer::new(ByteEncoder::new(charset)).with_declaration(declaration);
    let mut stream = XmlEventInputStream::with_serializer(cursor, serializer, buffer_size);
    let mut output = open_output(output_path)?;

    let mut buf = vec![0u8; chunk.max(1)];
    let mut total = 0usize;
    loop {
        let n = stream.read(&mut buf)?;
        if n == 0 {
            break;
        }
        output.write_all(&buf[..n])?;
        total += n;
    }
    output.flush()?;

    info!("Streamed {} bytes in {} encoding", total, charset);
    Ok(())
}

/// Prints every structural event of a document.
fn run_events(input_path: &str, parser: &ParserArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut cursor = parser.factory().create_cursor(open_input(input_path)?);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out, "{}", cursor.current())?;
    let mut count = 1usize;
    while cursor.has_next() {
        cursor.next()?;
        writeln!(out, "{}", cursor.current())?;
        count += 1;
    }

    info!("Printed {} events", count);
    Ok(())
}

/// Copies a document through the character stream adapter.
fn run_chars(
    input_path: &str,
    output_path: Option<&str>,
    parser: &ParserArgs,
    buffer_size: usize,
    chunk: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let cursor = parser.factory().create_cursor(open_input(input_path)?);
    let mut reader = XmlEventCharReader::with_buffer_size(cursor, buffer_size);
    let mut output = open_output(output_path)?;

    let mut buf = vec!['\0'; chunk.max(1)];
    let mut text = String::new();
    let mut total = 0usize;
    loop {
        let n = reader.read_chars(&mut buf)?;
        if n == 0 {
            break;
        }
        text.clear();
        text.extend(&buf[..n]);
        output.write_all(text.as_bytes())?;
        total += n;
    }
    output.flush()?;

    info!("Streamed {} characters", total);
    Ok(())
}
