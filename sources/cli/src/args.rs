use clap::Parser;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The classes to analyse, in binary (a.b.C) or internal (a/b/C) form
    #[arg(required = true)]
    pub classes: Vec<String>,

    #[arg(long("cp"))]
    /// A list of paths to add to the classpath
    pub classpath: Vec<String>,

    #[arg(long, default_value = accessors::ACCESSOR_PREFIX)]
    /// Only methods whose name starts with this are treated as accessors
    pub prefix: String,

    #[arg(short, long)]
    /// Log every method that was considered and rejected
    pub verbose: bool,
}
