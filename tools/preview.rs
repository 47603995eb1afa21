/// Preview: realize a RON document against a RON lexicon.
///
/// Usage: preview --lexicon <file|dir> --document <path> [--config <path>] [--fragment]
///
/// Set RUST_LOG=debug to see lexicon misses and per-sentence leaf counts.

use std::path::Path;
use std::process;

use surface_realizer::core::pipeline::{load_lexicon_dir, PipelineError, Realizer};
use surface_realizer::schema::element::Node;
use surface_realizer::schema::lexicon::MemoryLexicon;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

struct Options {
    lexicon: String,
    document: String,
    config: Option<String>,
    fragment: bool,
}

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let mut lexicon = None;
    let mut document = None;
    let mut config = None;
    let mut fragment = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--lexicon" if i + 1 < args.len() => {
                i += 1;
                lexicon = Some(args[i].clone());
            }
            "--document" if i + 1 < args.len() => {
                i += 1;
                document = Some(args[i].clone());
            }
            "--config" if i + 1 < args.len() => {
                i += 1;
                config = Some(args[i].clone());
            }
            "--fragment" => fragment = true,
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let (Some(lexicon), Some(document)) = (lexicon, document) else {
        eprintln!("ERROR: --lexicon and --document are required");
        print_usage();
        process::exit(1);
    };

    let options = Options {
        lexicon,
        document,
        config,
        fragment,
    };
    if let Err(e) = run(&options) {
        eprintln!("ERROR: {}", e);
        process::exit(1);
    }
}

fn run(options: &Options) -> Result<(), PipelineError> {
    let lexicon_path = Path::new(&options.lexicon);
    let lexicon = if lexicon_path.is_dir() {
        load_lexicon_dir(&options.lexicon)?
    } else {
        MemoryLexicon::load_from_ron(lexicon_path)?
    };
    eprintln!("Loaded {} lexicon entries", lexicon.len());

    let mut builder = Realizer::builder(&lexicon);
    if let Some(ref path) = options.config {
        builder = builder.config_path(path);
    }
    let realizer = builder.build()?;

    let contents = std::fs::read_to_string(&options.document)?;
    let node: Node = ron::from_str(&contents)?;

    if options.fragment {
        println!("{}", realizer.realize_fragment(&node)?);
        return Ok(());
    }

    let realized = realizer.realize(&node)?;
    println!("{}", realized);

    for sentence in &realized.sentences {
        if let Some(ref error) = sentence.error {
            eprintln!("sentence {}: {}", sentence.index + 1, error);
        }
    }
    for warning in &realized.warnings {
        eprintln!("warning: {}", warning);
    }
    Ok(())
}

fn init_tracing() {
    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")));

    tracing_subscriber::registry().with(console_layer).init();
}

fn print_usage() {
    println!(
        "Usage: preview --lexicon <file|dir> --document <path> [--config <path>] [--fragment]"
    );
    println!();
    println!("  --lexicon   RON lexicon file, or a directory of them");
    println!("  --document  RON-serialized node tree to realize");
    println!("  --config    RON realizer configuration");
    println!("  --fragment  realize without sentence capitalization and punctuation");
}
